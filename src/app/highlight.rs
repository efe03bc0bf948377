use std::collections::HashSet;

use super::{HighlightState, HoverTarget, RenderGraph};

/// Neighborhood of the focused target: for a node its incident edges and
/// their far endpoints, for an edge just the edge and its two endpoints.
/// Everything outside the returned sets is drawn dimmed.
pub(super) fn build_highlight_state(cache: &RenderGraph, target: HoverTarget) -> HighlightState {
    let mut nodes = HashSet::new();
    let mut edges = HashSet::new();

    match target {
        HoverTarget::Node(index) => {
            if index < cache.nodes.len() {
                nodes.insert(index);
                for &edge_index in &cache.incident_edges[index] {
                    let edge = &cache.edges[edge_index];
                    edges.insert(edge_index);
                    nodes.insert(edge.source);
                    nodes.insert(edge.target);
                }
            }
        }
        HoverTarget::Edge(edge_index) => {
            if let Some(edge) = cache.edges.get(edge_index) {
                edges.insert(edge_index);
                nodes.insert(edge.source);
                nodes.insert(edge.target);
            }
        }
    }

    HighlightState { nodes, edges }
}

impl HighlightState {
    pub(super) fn contains_node(&self, index: usize) -> bool {
        self.nodes.contains(&index)
    }

    pub(super) fn contains_edge(&self, index: usize) -> bool {
        self.edges.contains(&index)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use eframe::egui::Vec2;

    use super::super::{EdgeStyle, RenderEdge, RenderNode, ViewScratch};
    use super::*;
    use crate::data::NodeClass;
    use crate::sim::{BodyState, ForceScratch};

    /// Triangle 0-1-2 plus an isolated node 3.
    fn fixture() -> RenderGraph {
        let keys = ["P0", "P1", "P2", "P3"];
        let nodes = keys
            .iter()
            .map(|key| RenderNode {
                key: (*key).to_owned(),
                label: (*key).to_owned(),
                class: NodeClass::Paper,
                importance: 1,
            })
            .collect::<Vec<_>>();
        let bodies = (0..nodes.len())
            .map(|_| BodyState {
                pos: Vec2::ZERO,
                vel: Vec2::ZERO,
                pinned: None,
                radius: 8.0,
                charge: 1.0,
                group: 0,
            })
            .collect();
        let edges = [(0usize, 1usize), (1, 2), (2, 0)]
            .iter()
            .enumerate()
            .map(|(full_edge, &(source, target))| RenderEdge {
                source,
                target,
                style: EdgeStyle::Citation,
                weight: 1.0,
                full_edge,
            })
            .collect::<Vec<_>>();

        let mut neighbors = vec![Vec::new(); nodes.len()];
        let mut incident_edges = vec![Vec::new(); nodes.len()];
        for (edge_index, edge) in edges.iter().enumerate() {
            neighbors[edge.source].push(edge.target);
            neighbors[edge.target].push(edge.source);
            incident_edges[edge.source].push(edge_index);
            incident_edges[edge.target].push(edge_index);
        }
        let index_by_key = keys
            .iter()
            .enumerate()
            .map(|(index, key)| ((*key).to_owned(), index))
            .collect::<HashMap<_, _>>();

        RenderGraph {
            nodes,
            bodies,
            links: Vec::new(),
            edges,
            index_by_key,
            neighbors,
            incident_edges,
            group_count: 1,
            regions: None,
            min_importance: 1,
            max_importance: 1,
            force_scratch: ForceScratch::default(),
            view_scratch: ViewScratch::default(),
        }
    }

    #[test]
    fn node_focus_covers_neighbors_and_incident_edges() {
        let cache = fixture();
        let state = build_highlight_state(&cache, HoverTarget::Node(0));

        assert!(state.contains_node(0));
        assert!(state.contains_node(1));
        assert!(state.contains_node(2));
        assert!(!state.contains_node(3));
        assert!(state.contains_edge(0));
        assert!(state.contains_edge(2));
        assert!(!state.contains_edge(1));
    }

    #[test]
    fn edge_focus_covers_only_its_endpoints() {
        let cache = fixture();
        let state = build_highlight_state(&cache, HoverTarget::Edge(1));

        assert_eq!(state.nodes, HashSet::from([1, 2]));
        assert_eq!(state.edges, HashSet::from([1]));
    }

    #[test]
    fn isolated_node_highlights_alone() {
        let cache = fixture();
        let state = build_highlight_state(&cache, HoverTarget::Node(3));

        assert_eq!(state.nodes, HashSet::from([3]));
        assert!(state.edges.is_empty());
    }
}
