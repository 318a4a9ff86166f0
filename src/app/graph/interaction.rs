use eframe::egui::{self, CursorIcon, Rect, Ui};

use super::super::ViewModel;

/// Presses grab anything within this many screen pixels.
const PRESS_THRESHOLD: f32 = 25.0;
/// Hover feedback uses a tighter ring than presses.
const HOVER_THRESHOLD: f32 = 15.0;

impl ViewModel {
    pub(in crate::app) fn handle_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        // egui reports wheel-up as positive; the zoom curve expects the
        // opposite sign.
        self.camera.zoom_around(pointer - rect.min.to_vec2(), -scroll);
    }

    /// Primary-button handling. A press on a node selects it and starts
    /// a drag that pins it under the pointer; a press on empty space
    /// clears the selection and pans the camera instead.
    pub(in crate::app) fn handle_pointer(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
        let local = ui
            .input(|input| input.pointer.hover_pos())
            .map(|pointer| pointer - rect.min.to_vec2());

        if self.dragged.is_none() {
            self.hovered = match local {
                Some(point) if response.hovered() => {
                    self.camera
                        .hit_test(point, self.sim.positions(), HOVER_THRESHOLD)
                }
                _ => None,
            };
        }
        if self.hovered.is_some() {
            ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
        }

        if response.drag_started_by(egui::PointerButton::Primary)
            && let Some(point) = local
        {
            match self
                .camera
                .hit_test(point, self.sim.positions(), PRESS_THRESHOLD)
            {
                Some(index) => {
                    self.dragged = Some(index);
                    self.selected = Some(index);
                    self.sim.pin_to(index, self.camera.screen_to_world(point));
                    self.sim.set_alpha_target(self.tuning.drag_alpha_target);
                }
                None => self.selected = None,
            }
        }

        if response.dragged_by(egui::PointerButton::Primary) {
            match (self.dragged, local) {
                (Some(index), Some(point)) => {
                    self.sim.pin_to(index, self.camera.screen_to_world(point));
                }
                (None, _) => self.camera.pan(response.drag_delta()),
                _ => {}
            }
        }

        if response.drag_stopped_by(egui::PointerButton::Primary)
            && let Some(index) = self.dragged.take()
        {
            self.sim.unpin(index);
            self.sim.set_alpha_target(0.0);
        }
    }
}
