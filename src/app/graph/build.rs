use std::collections::HashMap;

use eframe::egui::Vec2;

use crate::data::{self, DisplayedEdge, DisplayedGraph, EdgeKind, KindQuota, PruneParams};
use crate::sim::radial::{pack_regions, place_members};
use crate::sim::{seeded_position, BodyState, ForceScratch, SpringLink};
use crate::util::stable_pair;

use super::super::render_utils::{node_charge, node_radius};
use super::super::{
    EdgeStyle, LayoutMode, RenderEdge, RenderGraph, RenderNode, ViewModel, ViewScratch,
};

pub(in crate::app) fn style_of(kind: &EdgeKind) -> EdgeStyle {
    match kind {
        EdgeKind::Citation { .. } => EdgeStyle::Citation,
        EdgeKind::Authorship { .. } => EdgeStyle::Authorship,
        EdgeKind::Collaboration { .. } => EdgeStyle::Collaboration,
        EdgeKind::Link { .. } => EdgeStyle::Link,
    }
}

/// Rest length and strength per edge style. Repeat collaborations pull
/// harder and sit closer; citations stay the loosest ties.
pub(in crate::app) fn spring_for(style: EdgeStyle, weight: f32) -> (f32, f32) {
    match style {
        EdgeStyle::Citation => (120.0, 0.07),
        EdgeStyle::Authorship => (70.0, 0.11),
        EdgeStyle::Collaboration => {
            let pull = weight.max(1.0).ln_1p();
            ((90.0 - (pull * 10.0)).max(48.0), (0.05 * (1.0 + pull)).min(0.25))
        }
        EdgeStyle::Link => (100.0, (0.05 + (weight * 0.01)).min(0.2)),
    }
}

impl ViewModel {
    /// Prunes the full graph and then force-admits the selected node, so a
    /// selection made from the rankings never points at nothing.
    fn displayed_view(&self) -> DisplayedGraph {
        let params = PruneParams {
            max_nodes: self.max_nodes,
            min_importance: self.min_importance,
            quota: self.balance_kinds.then(KindQuota::default),
        };
        let mut displayed = data::prune(&self.graph, &params);

        let Some(selected_full) = self
            .selected
            .as_deref()
            .and_then(|key| self.graph.node_index(key))
        else {
            return displayed;
        };
        if displayed.node_indices.contains(&selected_full) {
            return displayed;
        }

        let mut displayed_of = vec![usize::MAX; self.graph.node_count()];
        for (position, &full) in displayed.node_indices.iter().enumerate() {
            displayed_of[full] = position;
        }
        let selected_position = displayed.node_indices.len();
        displayed_of[selected_full] = selected_position;
        displayed.node_indices.push(selected_full);

        // Only edges touching the injected node can be new.
        for (edge_index, edge) in self.graph.edges().iter().enumerate() {
            let (Some(source_full), Some(target_full)) = (
                self.graph.node_index(&edge.source),
                self.graph.node_index(&edge.target),
            ) else {
                continue;
            };
            if source_full != selected_full && target_full != selected_full {
                continue;
            }
            let source = displayed_of[source_full];
            let target = displayed_of[target_full];
            if source != usize::MAX && target != usize::MAX {
                displayed.edges.push(DisplayedEdge {
                    source,
                    target,
                    edge_index,
                });
            }
        }

        displayed
    }

    pub(in crate::app) fn rebuild_render_graph(&mut self) {
        self.render_graph_revision = self.render_graph_revision.wrapping_add(1);
        self.search_match_cache = None;
        self.dragged_node = None;

        let displayed = self.displayed_view();
        if displayed.node_count() == 0 {
            self.graph_cache = None;
            self.visible_node_count = 0;
            self.visible_edge_count = 0;
            self.graph_dirty = false;
            return;
        }

        let group_of = data::assign_groups(&self.graph, &displayed, self.grouping);
        let group_count = data::group_count(&group_of);

        let mut min_importance = u64::MAX;
        let mut max_importance = 0u64;
        let mut nodes = Vec::with_capacity(displayed.node_count());
        for &full in &displayed.node_indices {
            let node = &self.graph.nodes()[full];
            let importance = node.importance();
            min_importance = min_importance.min(importance);
            max_importance = max_importance.max(importance);
            nodes.push(RenderNode {
                key: node.key.clone(),
                label: node.label.clone(),
                class: node.kind.class(),
                importance,
            });
        }
        if min_importance == u64::MAX {
            min_importance = 0;
        }

        // Kinetic state survives a rebuild keyed by node key; pins do not.
        let mut prior_bodies = self
            .graph_cache
            .take()
            .map(|cache| {
                cache
                    .nodes
                    .into_iter()
                    .zip(cache.bodies)
                    .map(|(node, body)| (node.key, body))
                    .collect::<HashMap<_, _>>()
            })
            .unwrap_or_default();

        let node_count = nodes.len();
        let mut bodies = Vec::with_capacity(node_count);
        for (index, node) in nodes.iter().enumerate() {
            let radius = node_radius(node.importance, min_importance, max_importance);
            let charge = node_charge(node.importance, min_importance, max_importance);
            let group = group_of[index];

            match prior_bodies.remove(&node.key) {
                Some(prior) => bodies.push(BodyState {
                    pos: prior.pos,
                    vel: prior.vel,
                    pinned: None,
                    radius,
                    charge,
                    group,
                }),
                None => bodies.push(BodyState {
                    pos: seeded_position(stable_pair(&node.key), index, node_count),
                    vel: Vec2::ZERO,
                    pinned: None,
                    radius,
                    charge,
                    group,
                }),
            }
        }

        let mut edges = Vec::with_capacity(displayed.edges.len());
        let mut links = Vec::with_capacity(displayed.edges.len());
        for displayed_edge in &displayed.edges {
            let full = &self.graph.edges()[displayed_edge.edge_index];
            let style = style_of(&full.kind);
            let weight = full.weight();
            let (rest_length, strength) = spring_for(style, weight);

            edges.push(RenderEdge {
                source: displayed_edge.source,
                target: displayed_edge.target,
                style,
                weight,
                full_edge: displayed_edge.edge_index,
            });
            links.push(SpringLink {
                source: displayed_edge.source,
                target: displayed_edge.target,
                rest_length,
                strength,
            });
        }

        let mut neighbors = vec![Vec::new(); node_count];
        let mut incident_edges = vec![Vec::new(); node_count];
        for (edge_index, edge) in edges.iter().enumerate() {
            neighbors[edge.source].push(edge.target);
            neighbors[edge.target].push(edge.source);
            incident_edges[edge.source].push(edge_index);
            incident_edges[edge.target].push(edge_index);
        }

        let mut index_by_key = HashMap::with_capacity(node_count);
        for (index, node) in nodes.iter().enumerate() {
            index_by_key.insert(node.key.clone(), index);
        }

        let regions = match self.layout_mode {
            LayoutMode::Radial => {
                let mut group_sizes = vec![0usize; group_count];
                for &group in &group_of {
                    group_sizes[group] += 1;
                }
                let regions = pack_regions(&group_sizes, &self.radial_params);
                let positions = place_members(&group_of, &regions);
                for (body, position) in bodies.iter_mut().zip(positions) {
                    body.pos = position;
                    body.vel = Vec2::ZERO;
                }
                Some(regions)
            }
            LayoutMode::Force => {
                self.sim.restart();
                None
            }
        };

        self.visible_node_count = nodes.len();
        self.visible_edge_count = edges.len();
        self.graph_cache = Some(RenderGraph {
            nodes,
            bodies,
            links,
            edges,
            index_by_key,
            neighbors,
            incident_edges,
            group_count,
            regions,
            min_importance,
            max_importance,
            force_scratch: ForceScratch::default(),
            view_scratch: ViewScratch::default(),
        });
        self.graph_dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collaboration_springs_tighten_with_repeats() {
        let (single_rest, single_strength) = spring_for(EdgeStyle::Collaboration, 1.0);
        let (repeat_rest, repeat_strength) = spring_for(EdgeStyle::Collaboration, 8.0);

        assert!(repeat_rest < single_rest);
        assert!(repeat_strength > single_strength);
        assert!(repeat_strength <= 0.25);
    }

    #[test]
    fn citation_springs_are_the_loosest() {
        let (citation_rest, citation_strength) = spring_for(EdgeStyle::Citation, 1.0);
        let (authorship_rest, authorship_strength) = spring_for(EdgeStyle::Authorship, 1.0);

        assert!(citation_rest > authorship_rest);
        assert!(citation_strength < authorship_strength);
    }
}
