use eframe::egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, vec2};

use super::super::ViewModel;
use super::super::camera::world_frame;
use super::super::encode::{OverlayState, node_style};
use crate::util::format_percent;

const BACKGROUND_COLOR: Color32 = Color32::from_rgb(10, 12, 16);
/// White at 8% opacity, premultiplied.
const LINK_COLOR: Color32 = Color32::from_rgba_premultiplied(20, 20, 20, 20);
const LINK_WIDTH: f32 = 1.0;
/// Labels appear once zoomed past this, except for search matches.
const LABEL_ZOOM_THRESHOLD: f32 = 0.4;
const LABEL_FONT_SIZE: f32 = 14.0;
const LABEL_OFFSET_Y: f32 = 18.0;

impl ViewModel {
    /// Draws the atlas into the central panel and runs the per-frame
    /// update: input handling, one simulation tick, then painting in
    /// screen space. Node sizes, label sizes and link widths are
    /// constant in screen pixels across all zoom levels.
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, BACKGROUND_COLOR);
        self.canvas_size = rect.size();

        if !self.camera_initialized {
            let (center, extent) = world_frame(self.sim.positions().iter().copied());
            self.camera.fit(rect.size(), center, extent);
            self.camera_initialized = true;
        }

        self.handle_zoom(ui, rect, &response);
        self.handle_pointer(ui, rect, &response);

        if self.live_physics {
            let tuning = self.tuning;
            self.sim.tick(&tuning);
        }

        let positions = self.sim.positions();
        let to_screen = |world: Pos2| -> Pos2 { rect.min + self.camera.world_to_screen(world).to_vec2() };

        for link in &self.atlas.links {
            let start = to_screen(positions[link.source]);
            let end = to_screen(positions[link.target]);
            if !edge_visible(rect, start, end) {
                continue;
            }
            painter.line_segment([start, end], Stroke::new(LINK_WIDTH, LINK_COLOR));
        }

        let query = self.search.trim().to_lowercase();
        let own = self.own_scores.as_deref();
        let friend = self.friend_scores.as_deref();
        let overlay = OverlayState {
            has_profile: own.is_some(),
            comparing: self.comparing && friend.is_some(),
            relevance_threshold: self.encoding.relevance_threshold,
        };
        let labels_legible = self.camera.scale > LABEL_ZOOM_THRESHOLD;

        for (index, node) in self.atlas.nodes.iter().enumerate() {
            let screen = to_screen(positions[index]);
            let own_score = own.map_or(0.0, |scores| scores.score_at(index));
            let friend_score = friend.map_or(0.0, |scores| scores.score_at(index));
            let search_match = !query.is_empty() && self.lowered_ids[index].contains(&query);
            let style = node_style(node.color, own_score, friend_score, search_match, &overlay);

            if !circle_visible(rect, screen, style.radius + LABEL_OFFSET_Y) {
                continue;
            }
            painter.circle_filled(screen, style.radius, style.fill);

            if self.selected == Some(index) {
                painter.circle_stroke(
                    screen,
                    style.radius + 3.0,
                    Stroke::new(1.5, Color32::from_rgba_unmultiplied(255, 255, 255, 150)),
                );
            }

            if labels_legible || style.always_label {
                painter.text(
                    screen + vec2(0.0, LABEL_OFFSET_Y),
                    Align2::CENTER_CENTER,
                    &node.id,
                    FontId::proportional(LABEL_FONT_SIZE),
                    style.label,
                );
            }
        }

        if let Some(index) = self.hovered {
            let mut readout = self.atlas.nodes[index].id.clone();
            if let Some(scores) = own {
                let score = scores.score_at(index);
                if score > 0.0 {
                    readout.push_str("  |  match ");
                    readout.push_str(&format_percent(score));
                }
            }
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                readout,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        // The annealing layout and hover feedback want a fresh frame
        // even when nothing changed this one.
        ui.ctx().request_repaint();
    }

    /// Recenters the camera on a node, used by search results and the
    /// details panel.
    pub(in crate::app) fn center_on_node(&mut self, index: usize) {
        if let Some(position) = self.sim.positions().get(index).copied() {
            self.camera.center_on(position, self.canvas_size);
        }
    }
}

fn circle_visible(rect: Rect, center: Pos2, radius: f32) -> bool {
    rect.expand(radius).contains(center)
}

/// A segment is visible when either endpoint is inside the viewport or
/// when it crosses one of the viewport edges.
fn edge_visible(rect: Rect, start: Pos2, end: Pos2) -> bool {
    if rect.contains(start) || rect.contains(end) {
        return true;
    }
    let corners = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
    ];
    (0..4).any(|side| segments_intersect(start, end, corners[side], corners[(side + 1) % 4]))
}

fn segments_intersect(a1: Pos2, a2: Pos2, b1: Pos2, b2: Pos2) -> bool {
    fn orientation(a: Pos2, b: Pos2, c: Pos2) -> f32 {
        (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
    }

    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);
    ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
}
