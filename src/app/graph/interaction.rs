use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use crate::sim::ForceSimulation;

use super::super::render_utils::{distance_sq_to_segment, screen_to_world};
use super::super::{HoverTarget, RenderGraph, ViewModel};

/// Screen-space pick distance for edges.
const EDGE_HOVER_DISTANCE: f32 = 4.0;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !self.enable_zoom || !response.hovered() {
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

        // Zoom anchored on the pointer, so the point under the cursor stays put.
        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.1, 3.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }
    }

    fn node_at(cache: &RenderGraph, pointer: Pos2) -> Option<usize> {
        (0..cache.nodes.len())
            .filter(|&index| {
                cache
                    .view_scratch
                    .visible_mask
                    .get(index)
                    .copied()
                    .unwrap_or(false)
            })
            .filter_map(|index| {
                let distance = cache.view_scratch.screen_positions[index].distance(pointer);
                (distance <= cache.view_scratch.screen_radii[index]).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// Closest edge within the pick distance, measured against the chord
    /// between its endpoints.
    fn edge_at(cache: &RenderGraph, pointer: Pos2) -> Option<usize> {
        let threshold_sq = EDGE_HOVER_DISTANCE * EDGE_HOVER_DISTANCE;
        cache
            .edges
            .iter()
            .enumerate()
            .filter_map(|(index, edge)| {
                let start = *cache.view_scratch.screen_positions.get(edge.source)?;
                let end = *cache.view_scratch.screen_positions.get(edge.target)?;
                let distance_sq = distance_sq_to_segment(pointer, start, end);
                (distance_sq <= threshold_sq).then_some((index, distance_sq))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// Nodes win over edges when both are under the pointer.
    pub(in crate::app) fn hover_target(
        ui: &Ui,
        rect: Rect,
        cache: &RenderGraph,
    ) -> Option<HoverTarget> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        if !rect.contains(pointer) {
            return None;
        }
        if let Some(index) = Self::node_at(cache, pointer) {
            return Some(HoverTarget::Node(index));
        }
        Self::edge_at(cache, pointer).map(HoverTarget::Edge)
    }

    /// Primary-button node dragging: the grabbed body is pinned under the
    /// pointer for the whole gesture and the simulation is reheated so the
    /// rest of the layout re-settles around it.
    pub(in crate::app) fn handle_node_drag(
        rect: Rect,
        response: &egui::Response,
        pan: Vec2,
        zoom: f32,
        cache: &mut RenderGraph,
        dragged: &mut Option<usize>,
        sim: &mut ForceSimulation,
    ) {
        if response.drag_started_by(egui::PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
            && let Some(index) = Self::node_at(cache, pointer)
        {
            cache.bodies[index].pinned = Some(cache.bodies[index].pos);
            *dragged = Some(index);
            sim.reheat();
        }

        if let Some(index) = *dragged {
            if response.dragged_by(egui::PointerButton::Primary)
                && let Some(pointer) = response.interact_pointer_pos()
            {
                let world = screen_to_world(rect, pan, zoom, pointer);
                if let Some(body) = cache.bodies.get_mut(index) {
                    body.pos = world;
                    body.vel = Vec2::ZERO;
                    body.pinned = Some(world);
                }
            }

            if response.drag_stopped() {
                if let Some(body) = cache.bodies.get_mut(index) {
                    body.pinned = None;
                }
                *dragged = None;
                sim.cool();
            }
        }
    }

    pub(in crate::app) fn apply_graph_selection(&mut self, selected: Option<String>) {
        self.set_selected(selected);
    }
}
