use eframe::egui::{Pos2, Vec2, pos2};

/// Wheel notches map onto this zoom ratio per 100 units of scroll.
const ZOOM_STEP: f32 = 1.15;
const MIN_SCALE: f32 = 0.0001;
const MAX_SCALE: f32 = 20.0;

/// Mapping between world coordinates and canvas-local screen pixels:
/// `screen = world * scale + offset`. Plain value type; all inputs and
/// outputs are relative to the canvas origin, not the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub offset: Vec2,
    pub scale: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl Camera {
    pub fn screen_to_world(&self, screen: Pos2) -> Pos2 {
        ((screen.to_vec2() - self.offset) / self.scale).to_pos2()
    }

    pub fn world_to_screen(&self, world: Pos2) -> Pos2 {
        (world.to_vec2() * self.scale + self.offset).to_pos2()
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Applies wheel movement, keeping the world point under the
    /// pointer fixed on screen. Positive delta (scrolling down) zooms
    /// out, matching `1.15 ^ (-delta / 100)`.
    pub fn zoom_around(&mut self, pointer: Pos2, wheel_delta: f32) {
        let factor = ZOOM_STEP.powf(-wheel_delta / 100.0);
        let anchor = self.screen_to_world(pointer);
        self.scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        self.offset = pointer.to_vec2() - anchor.to_vec2() * self.scale;
    }

    /// Initial framing: fits `world_extent` world units into the shorter
    /// canvas side and centers `world_center`.
    pub fn fit(&mut self, canvas_size: Vec2, world_center: Pos2, world_extent: f32) {
        if world_extent > 0.0 {
            self.scale = (canvas_size.x.min(canvas_size.y) / world_extent).clamp(MIN_SCALE, MAX_SCALE);
        }
        self.center_on(world_center, canvas_size);
    }

    /// Repositions so `world` lands on the canvas center at the current
    /// scale.
    pub fn center_on(&mut self, world: Pos2, canvas_size: Vec2) {
        self.offset = canvas_size * 0.5 - world.to_vec2() * self.scale;
    }

    /// First node within `threshold` screen pixels of the pointer, in
    /// slice order. Earlier entries shadow later ones, so the result is
    /// stable when nodes overlap.
    pub fn hit_test(&self, pointer: Pos2, positions: &[Pos2], threshold: f32) -> Option<usize> {
        let world = self.screen_to_world(pointer);
        let world_radius = threshold / self.scale;
        positions
            .iter()
            .position(|position| position.distance(world) < world_radius)
    }
}

/// Axis-aligned bounds of the taxonomy anchors, used for the initial
/// fit. Returns the center and the larger span with a visual margin.
pub fn world_frame(positions: impl Iterator<Item = Pos2>) -> (Pos2, f32) {
    let mut min = pos2(f32::MAX, f32::MAX);
    let mut max = pos2(f32::MIN, f32::MIN);
    let mut any = false;
    for position in positions {
        min.x = min.x.min(position.x);
        min.y = min.y.min(position.y);
        max.x = max.x.max(position.x);
        max.y = max.y.max(position.y);
        any = true;
    }
    if !any {
        return (pos2(0.0, 0.0), 1.0);
    }
    let center = pos2((min.x + max.x) * 0.5, (min.y + max.y) * 0.5);
    let span = (max.x - min.x).max(max.y - min.y).max(1.0);
    (center, span * 1.2)
}
