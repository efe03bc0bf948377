use std::collections::HashMap;

/// Discriminant used for kind-balanced pruning quotas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeClass {
    Paper,
    Author,
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Paper {
        year: Option<i32>,
        patent_count: u32,
    },
    Author {
        institution_id: Option<String>,
        first_author_count: u32,
    },
}

impl NodeKind {
    pub fn class(&self) -> NodeClass {
        match self {
            Self::Paper { .. } => NodeClass::Paper,
            Self::Author { .. } => NodeClass::Author,
        }
    }

    pub fn year(&self) -> Option<i32> {
        match self {
            Self::Paper { year, .. } => *year,
            Self::Author { .. } => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub key: String,
    pub label: String,
    pub kind: NodeKind,
    /// Times this paper was cited. Zero for authors.
    pub citation_count: u32,
    /// Papers this author participated in. Zero for papers.
    pub paper_count: u32,
}

impl Node {
    pub fn paper(key: &str) -> Self {
        Self {
            key: key.to_owned(),
            label: key.to_owned(),
            kind: NodeKind::Paper {
                year: None,
                patent_count: 0,
            },
            citation_count: 0,
            paper_count: 0,
        }
    }

    pub fn author(author_id: &str) -> Self {
        Self {
            key: author_key(author_id),
            label: author_id.to_owned(),
            kind: NodeKind::Author {
                institution_id: None,
                first_author_count: 0,
            },
            citation_count: 0,
            paper_count: 0,
        }
    }

    /// Ranking metric for pruning: citations for papers, participation for
    /// authors.
    pub fn importance(&self) -> u64 {
        match self.kind {
            NodeKind::Paper { .. } => u64::from(self.citation_count),
            NodeKind::Author { .. } => u64::from(self.paper_count),
        }
    }
}

pub fn author_key(author_id: &str) -> String {
    format!("author_{author_id}")
}

#[derive(Clone, Debug, PartialEq)]
pub enum EdgeKind {
    Citation {
        year: i32,
        ref_year: i32,
        year_diff: i32,
    },
    Authorship {
        position: u32,
    },
    Collaboration {
        count: u32,
        paper_ids: Vec<String>,
    },
    /// Untyped link from a pre-built graph document.
    Link {
        value: f32,
    },
}

#[derive(Clone, Debug)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn weight(&self) -> f32 {
        match &self.kind {
            EdgeKind::Citation { .. } | EdgeKind::Authorship { .. } => 1.0,
            EdgeKind::Collaboration { count, .. } => *count as f32,
            EdgeKind::Link { value } => value.max(0.0),
        }
    }
}

/// Full graph: insertion-ordered node set with a key index, and edges that
/// reference nodes by key. Edge endpoints always resolve; the builders drop
/// anything else before it gets here.
#[derive(Clone, Debug, Default)]
pub struct CitationGraph {
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    edges: Vec<Edge>,
}

impl CitationGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, key: &str) -> Option<&Node> {
        self.index.get(key).map(|&index| &self.nodes[index])
    }

    pub fn node_index(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the node for `key`, inserting it via `make` on first sight.
    /// First occurrence wins for shared fields; callers accumulate counters
    /// on the returned reference.
    pub fn ensure_node(&mut self, key: &str, make: impl FnOnce() -> Node) -> &mut Node {
        let index = match self.index.get(key) {
            Some(&index) => index,
            None => {
                let index = self.nodes.len();
                let node = make();
                debug_assert_eq!(node.key, key);
                self.nodes.push(node);
                self.index.insert(key.to_owned(), index);
                index
            }
        };
        &mut self.nodes[index]
    }

    /// Adds an edge. Edges with unknown endpoints or identical endpoints are
    /// rejected so the node set stays closed and loop-free.
    pub fn push_edge(&mut self, edge: Edge) -> bool {
        if edge.source == edge.target
            || !self.index.contains_key(&edge.source)
            || !self.index.contains_key(&edge.target)
        {
            return false;
        }
        self.edges.push(edge);
        true
    }

    /// Aggregate over the full graph, independent of any pruned view.
    pub fn total_citations(&self) -> u64 {
        self.nodes
            .iter()
            .map(|node| u64::from(node.citation_count))
            .sum()
    }

    /// Keys ranked by importance descending, stable on ties, optionally
    /// restricted to one node class. Drives the side-panel rankings.
    pub fn top_by_importance(&self, class: Option<NodeClass>, limit: usize) -> Vec<String> {
        let mut ranked = self
            .nodes
            .iter()
            .filter(|node| class.is_none_or(|class| node.kind.class() == class))
            .map(|node| node.key.clone())
            .collect::<Vec<_>>();
        ranked.sort_by_key(|key| {
            std::cmp::Reverse(self.node(key).map(Node::importance).unwrap_or(0))
        });
        ranked.truncate(limit);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_node_dedups_and_accumulates() {
        let mut graph = CitationGraph::new();
        graph.ensure_node("P1", || Node::paper("P1")).citation_count += 1;
        graph.ensure_node("P1", || Node::paper("P1")).citation_count += 1;

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.node("P1").unwrap().citation_count, 2);
    }

    #[test]
    fn push_edge_rejects_self_loops_and_unknown_endpoints() {
        let mut graph = CitationGraph::new();
        graph.ensure_node("P1", || Node::paper("P1"));
        graph.ensure_node("P2", || Node::paper("P2"));

        let citation = |source: &str, target: &str| Edge {
            source: source.to_owned(),
            target: target.to_owned(),
            kind: EdgeKind::Citation {
                year: 2021,
                ref_year: 2020,
                year_diff: 1,
            },
        };

        assert!(graph.push_edge(citation("P1", "P2")));
        assert!(!graph.push_edge(citation("P1", "P1")));
        assert!(!graph.push_edge(citation("P1", "P9")));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn top_by_importance_is_stable_on_ties() {
        let mut graph = CitationGraph::new();
        for key in ["P1", "P2", "P3"] {
            graph.ensure_node(key, || Node::paper(key));
        }
        graph.ensure_node("P2", || Node::paper("P2")).citation_count = 4;

        let ranked = graph.top_by_importance(Some(NodeClass::Paper), 3);
        assert_eq!(ranked, vec!["P2", "P1", "P3"]);
    }
}
