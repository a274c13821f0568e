use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use super::render_utils::screen_to_world;
use super::{DragState, ViewModel};

// Alpha held while a node is grabbed; released back toward rest afterwards.
pub(super) const DRAG_ALPHA_TARGET: f32 = 0.3;

impl ViewModel {
    pub(super) fn handle_graph_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
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
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.1, 4.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(super) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    pub(super) fn handle_node_drag(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
        hovered: Option<usize>,
    ) {
        if response.drag_started_by(egui::PointerButton::Primary) {
            if let Some(index) = hovered
                && let Some(pointer) = ui.input(|input| input.pointer.interact_pos())
            {
                let grab = screen_to_world(rect, self.pan, self.zoom, pointer);
                self.drag_node = Some(DragState {
                    index,
                    grab_offset: self.sim.nodes()[index].pos - grab,
                });
                self.sim.set_alpha_target(DRAG_ALPHA_TARGET);
                self.sim.restart();
            }
        }

        if response.dragged_by(egui::PointerButton::Primary) {
            if let Some(drag) = &self.drag_node {
                if let Some(pointer) = ui.input(|input| input.pointer.interact_pos()) {
                    let world = screen_to_world(rect, self.pan, self.zoom, pointer);
                    self.sim.pin(drag.index, world + drag.grab_offset);
                }
            } else {
                self.pan += response.drag_delta();
            }
        }

        if response.drag_stopped()
            && let Some(drag) = self.drag_node.take()
        {
            self.sim.unpin(drag.index);
            self.sim.set_alpha_target(0.0);
        }
    }

    pub(super) fn hovered_index(
        &self,
        ui: &Ui,
        visible_indices: &[usize],
        screen_positions: &[Pos2],
        screen_radii: &[f32],
    ) -> Option<(usize, f32)> {
        let pointer_pos = ui.input(|input| input.pointer.hover_pos());
        pointer_pos.and_then(|pointer| {
            visible_indices
                .iter()
                .filter_map(|index| {
                    let distance = screen_positions[*index].distance(pointer);
                    if distance <= screen_radii[*index] {
                        Some((*index, distance))
                    } else {
                        None
                    }
                })
                .min_by(|a, b| a.1.total_cmp(&b.1))
        })
    }

    pub(super) fn world_viewport_center(&self) -> Vec2 {
        // The view transform keeps the world origin glued to the viewport
        // center, so the centering target never has to chase window size.
        Vec2::ZERO
    }
}
