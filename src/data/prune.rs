use super::graph::{CitationGraph, NodeClass};

pub const MIN_NODE_BUDGET: usize = 10;
pub const MAX_NODE_BUDGET: usize = 1000;

/// Budget split between node classes when both are present. Shares are of
/// the total budget; a class never exceeds its own share.
#[derive(Clone, Copy, Debug)]
pub struct KindQuota {
    pub author_share: f32,
}

impl Default for KindQuota {
    fn default() -> Self {
        Self { author_share: 0.7 }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PruneParams {
    pub max_nodes: usize,
    /// Nodes below this importance are not even ranked. When the filter
    /// leaves nothing, the single most important node survives instead of an
    /// empty graph.
    pub min_importance: u64,
    pub quota: Option<KindQuota>,
}

impl Default for PruneParams {
    fn default() -> Self {
        Self {
            max_nodes: 300,
            min_importance: 0,
            quota: None,
        }
    }
}

/// Edge of the pruned view: indices into `DisplayedGraph::node_indices`
/// order, plus the position of the originating edge in the full graph.
#[derive(Clone, Copy, Debug)]
pub struct DisplayedEdge {
    pub source: usize,
    pub target: usize,
    pub edge_index: usize,
}

/// Pruned subset of a [`CitationGraph`]. Keeps indices into the full graph
/// so aggregate counters stay computable over everything while only this
/// subset is laid out.
#[derive(Clone, Debug, Default)]
pub struct DisplayedGraph {
    pub node_indices: Vec<usize>,
    pub edges: Vec<DisplayedEdge>,
}

impl DisplayedGraph {
    pub fn node_count(&self) -> usize {
        self.node_indices.len()
    }
}

fn ranked_indices(graph: &CitationGraph, params: &PruneParams, class: Option<NodeClass>) -> Vec<usize> {
    let mut ranked = graph
        .nodes()
        .iter()
        .enumerate()
        .filter(|(_, node)| class.is_none_or(|class| node.kind.class() == class))
        .filter(|(_, node)| node.importance() >= params.min_importance)
        .map(|(index, _)| index)
        .collect::<Vec<_>>();
    // Stable sort keeps insertion order on importance ties.
    ranked.sort_by_key(|&index| std::cmp::Reverse(graph.nodes()[index].importance()));
    ranked
}

pub fn prune(graph: &CitationGraph, params: &PruneParams) -> DisplayedGraph {
    if graph.node_count() == 0 {
        return DisplayedGraph::default();
    }

    let budget = params.max_nodes.clamp(MIN_NODE_BUDGET, MAX_NODE_BUDGET);

    let mut selected = match params.quota {
        Some(quota) => {
            let author_budget =
                ((budget as f32) * quota.author_share.clamp(0.0, 1.0)).round() as usize;
            let paper_budget = budget.saturating_sub(author_budget);

            let mut authors = ranked_indices(graph, params, Some(NodeClass::Author));
            authors.truncate(author_budget);
            let mut papers = ranked_indices(graph, params, Some(NodeClass::Paper));
            papers.truncate(paper_budget);

            authors.extend(papers);
            authors
        }
        None => {
            let mut ranked = ranked_indices(graph, params, None);
            ranked.truncate(budget);
            ranked
        }
    };

    if selected.is_empty() {
        // Nothing passed the importance filter; show the top node alone.
        if let Some(best) = ranked_indices(
            graph,
            &PruneParams {
                min_importance: 0,
                ..*params
            },
            None,
        )
        .first()
        {
            selected.push(*best);
        }
    }

    // Displayed order follows full-graph insertion order, so re-prunes with
    // the same budget are reproducible.
    selected.sort_unstable();
    selected.dedup();

    let mut displayed_index_of = vec![usize::MAX; graph.node_count()];
    for (displayed, &full) in selected.iter().enumerate() {
        displayed_index_of[full] = displayed;
    }

    let mut edges = Vec::new();
    for (edge_index, edge) in graph.edges().iter().enumerate() {
        let (Some(source_full), Some(target_full)) = (
            graph.node_index(&edge.source),
            graph.node_index(&edge.target),
        ) else {
            continue;
        };
        let source = displayed_index_of[source_full];
        let target = displayed_index_of[target_full];
        if source != usize::MAX && target != usize::MAX {
            edges.push(DisplayedEdge {
                source,
                target,
                edge_index,
            });
        }
    }

    DisplayedGraph {
        node_indices: selected,
        edges,
    }
}
