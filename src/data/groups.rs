use std::collections::{HashMap, VecDeque};

use super::graph::CitationGraph;
use super::prune::DisplayedGraph;

/// How displayed nodes are bucketed into groups for coloring and layout
/// cohesion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupingPolicy {
    /// Connected components of the displayed adjacency.
    Components,
    /// Direct mapping from the node's publication year; authors and
    /// year-less papers share one bucket.
    PublicationYear,
}

impl GroupingPolicy {
    pub fn label(self) -> &'static str {
        match self {
            Self::Components => "Components",
            Self::PublicationYear => "Publication year",
        }
    }
}

/// Assigns one dense group id per displayed node, in first-seen order.
pub fn assign_groups(
    graph: &CitationGraph,
    displayed: &DisplayedGraph,
    policy: GroupingPolicy,
) -> Vec<usize> {
    match policy {
        GroupingPolicy::Components => connected_components(displayed),
        GroupingPolicy::PublicationYear => year_buckets(graph, displayed),
    }
}

fn connected_components(displayed: &DisplayedGraph) -> Vec<usize> {
    let node_count = displayed.node_count();
    let mut adjacency = vec![Vec::new(); node_count];
    for edge in &displayed.edges {
        if edge.source < node_count && edge.target < node_count {
            adjacency[edge.source].push(edge.target);
            adjacency[edge.target].push(edge.source);
        }
    }

    let mut group_of = vec![usize::MAX; node_count];
    let mut next_group = 0usize;
    let mut queue = VecDeque::new();

    for seed in 0..node_count {
        if group_of[seed] != usize::MAX {
            continue;
        }
        group_of[seed] = next_group;
        queue.push_back(seed);
        while let Some(current) = queue.pop_front() {
            for &neighbor in &adjacency[current] {
                if group_of[neighbor] == usize::MAX {
                    group_of[neighbor] = next_group;
                    queue.push_back(neighbor);
                }
            }
        }
        next_group += 1;
    }

    group_of
}

fn year_buckets(graph: &CitationGraph, displayed: &DisplayedGraph) -> Vec<usize> {
    let mut group_by_year: HashMap<Option<i32>, usize> = HashMap::new();
    let mut group_of = Vec::with_capacity(displayed.node_count());

    for &full_index in &displayed.node_indices {
        let year = graph.nodes()[full_index].kind.year();
        let next = group_by_year.len();
        let group = *group_by_year.entry(year).or_insert(next);
        group_of.push(group);
    }

    group_of
}

pub fn group_count(group_of: &[usize]) -> usize {
    group_of.iter().copied().max().map_or(0, |max| max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::build::build_citation_graph;
    use crate::data::prune::{prune, PruneParams};
    use crate::data::record::CitationRecord;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn citation(citing: &str, cited: &str, year: i32) -> CitationRecord {
        CitationRecord {
            citing_paperid: citing.to_owned(),
            cited_paperid: cited.to_owned(),
            year,
            ref_year: year - 1,
            year_diff: 1,
        }
    }

    #[test]
    fn two_components_get_two_ids_and_singletons_their_own() {
        let graph = build_citation_graph(&[
            citation("A1", "A2", 2021),
            citation("A2", "A3", 2021),
            citation("B1", "B2", 2022),
        ]);
        let mut displayed = prune(&graph, &PruneParams::default());
        // Drop every edge touching one node to make it a singleton.
        let index = displayed.node_indices.len() - 1;
        displayed
            .edges
            .retain(|edge| edge.source != index && edge.target != index);

        let groups = connected_components(&displayed);
        assert_eq!(groups.len(), displayed.node_count());
        assert_eq!(group_count(&groups), 3);
    }

    #[test]
    fn components_match_path_connectivity_on_random_graphs() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..20 {
            let node_count = rng.gen_range(2..40);
            let edge_count = rng.gen_range(0..node_count * 2);
            let records = (0..edge_count)
                .filter_map(|_| {
                    let a = rng.gen_range(0..node_count);
                    let b = rng.gen_range(0..node_count);
                    (a != b).then(|| citation(&format!("P{a}"), &format!("P{b}"), 2020))
                })
                .collect::<Vec<_>>();
            let mut graph = build_citation_graph(&records);
            for i in 0..node_count {
                graph.ensure_node(&format!("P{i}"), || {
                    crate::data::graph::Node::paper(&format!("P{i}"))
                });
            }
            let displayed = prune(
                &graph,
                &PruneParams {
                    max_nodes: 1000,
                    ..Default::default()
                },
            );

            let groups = connected_components(&displayed);

            // Reference reachability via union-find-free pairwise BFS.
            let n = displayed.node_count();
            let mut adjacency = vec![Vec::new(); n];
            for edge in &displayed.edges {
                adjacency[edge.source].push(edge.target);
                adjacency[edge.target].push(edge.source);
            }
            for start in 0..n {
                let mut reachable = vec![false; n];
                let mut queue = std::collections::VecDeque::from([start]);
                reachable[start] = true;
                while let Some(current) = queue.pop_front() {
                    for &next in &adjacency[current] {
                        if !reachable[next] {
                            reachable[next] = true;
                            queue.push_back(next);
                        }
                    }
                }
                for other in 0..n {
                    assert_eq!(
                        groups[start] == groups[other],
                        reachable[other],
                        "group ids must match path connectivity"
                    );
                }
            }
        }
    }

    #[test]
    fn year_buckets_group_by_publication_year() {
        let graph = build_citation_graph(&[
            citation("P1", "P2", 2021),
            citation("P3", "P4", 2023),
            citation("P5", "P2", 2021),
        ]);
        let displayed = prune(&graph, &PruneParams::default());
        let groups = year_buckets(&graph, &displayed);

        assert_eq!(groups.len(), displayed.node_count());
        // P1 and P5 published the same year share a bucket.
        let index_of = |key: &str| {
            displayed
                .node_indices
                .iter()
                .position(|&full| graph.nodes()[full].key == key)
                .unwrap()
        };
        assert_eq!(groups[index_of("P1")], groups[index_of("P5")]);
        assert_ne!(groups[index_of("P1")], groups[index_of("P3")]);
    }
}
