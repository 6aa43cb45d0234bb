use eframe::egui::{self, PointerButton, Pos2, Rect, Ui, vec2};
use tracing::warn;

use super::super::ViewModel;
use super::super::render_utils::Viewport;

impl ViewModel {
    pub(in crate::app) fn viewport(&self, rect: Rect) -> Viewport {
        let (x, y) = self.sim.config().center();
        Viewport {
            rect,
            pan: self.pan,
            zoom: self.zoom,
            origin: vec2(x, y),
        }
    }

    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
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
        let viewport = self.viewport(rect);
        let world_before = viewport.to_world(pointer);

        let zoom_factor = (1.0 + scroll * 0.0018).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.1, 8.0);
        self.pan = pointer - rect.center() - (world_before - viewport.origin) * self.zoom;
    }

    /// Secondary and middle drags always pan; a primary drag pans only when
    /// it did not grab a node.
    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        let primary_pan = response.dragged_by(PointerButton::Primary) && self.dragged.is_none();
        if primary_pan
            || response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    /// Feeds primary-button drags on a node to the drag controller. Pins are
    /// written here, before the frame's tick runs.
    pub(in crate::app) fn handle_node_drag(
        &mut self,
        ui: &Ui,
        response: &egui::Response,
        viewport: Viewport,
    ) {
        if response.drag_started_by(PointerButton::Primary) {
            let press = ui.input(|input| input.pointer.press_origin());
            if let Some(index) = press.and_then(|origin| self.node_at(origin)) {
                let pointer = response.interact_pointer_pos().or(press);
                if let Some(pointer) = pointer {
                    match self.drags.drag_start(&mut self.sim, index, viewport.to_world(pointer)) {
                        Ok(()) => {
                            self.dragged = Some(index);
                            self.selected = Some(index);
                        }
                        Err(error) => warn!(%error, "drag start rejected"),
                    }
                }
            }
        }

        if let Some(index) = self.dragged {
            if response.dragged_by(PointerButton::Primary)
                && let Some(pointer) = response.interact_pointer_pos()
                && let Err(error) =
                    self.drags
                        .drag_move(&mut self.sim, index, viewport.to_world(pointer))
            {
                warn!(%error, "drag move rejected");
            }

            if response.drag_stopped() || !ui.input(|input| input.pointer.primary_down()) {
                self.dragged = None;
                if let Err(error) = self.drags.drag_end(&mut self.sim, index) {
                    warn!(%error, "drag end rejected");
                }
            }
        }
    }

    /// Visible node under `pointer` whose center is nearest to it.
    pub(in crate::app) fn node_at(&self, pointer: Pos2) -> Option<usize> {
        let scratch = &self.view_scratch;
        scratch
            .visible_indices
            .iter()
            .filter_map(|&index| {
                let distance = scratch.screen_positions[index].distance(pointer);
                (distance <= scratch.screen_radii[index]).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    pub(in crate::app) fn hovered_index(&self, ui: &Ui, rect: Rect) -> Option<usize> {
        if let Some(index) = self.dragged {
            return Some(index);
        }
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        if !rect.contains(pointer) {
            return None;
        }
        self.node_at(pointer)
    }
}
