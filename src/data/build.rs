use std::collections::{HashMap, HashSet};

use super::graph::{author_key, CitationGraph, Edge, EdgeKind, Node, NodeKind};
use super::record::{AffiliationRecord, CitationRecord, GraphDoc, PublicationRecord};

/// Citation records → paper graph. One node per distinct paper id, the cited
/// side's counter bumped per record, one edge per distinct (citing, cited)
/// pair. Self-citations count but never become edges.
pub fn build_citation_graph(records: &[CitationRecord]) -> CitationGraph {
    let mut graph = CitationGraph::new();

    for record in records {
        let citing = graph.ensure_node(&record.citing_paperid, || Node::paper(&record.citing_paperid));
        if let NodeKind::Paper { year, .. } = &mut citing.kind
            && year.is_none()
        {
            *year = Some(record.year);
        }

        let cited = graph.ensure_node(&record.cited_paperid, || Node::paper(&record.cited_paperid));
        cited.citation_count += 1;
        if let NodeKind::Paper { year, .. } = &mut cited.kind
            && year.is_none()
        {
            *year = Some(record.ref_year);
        }
    }

    let mut seen = HashSet::new();
    for record in records {
        if record.citing_paperid == record.cited_paperid {
            continue;
        }
        if !seen.insert((record.citing_paperid.as_str(), record.cited_paperid.as_str())) {
            continue;
        }
        graph.push_edge(Edge {
            source: record.citing_paperid.clone(),
            target: record.cited_paperid.clone(),
            kind: EdgeKind::Citation {
                year: record.year,
                ref_year: record.ref_year,
                year_diff: record.year_diff,
            },
        });
    }

    graph
}

/// Affiliation + publication records → mixed paper/author graph with
/// authorship and collaboration edges. Edges are built only after the
/// paper→authors index is complete, since collaboration weights need every
/// author pair per paper.
pub fn build_coauthor_graph(
    affiliations: &[AffiliationRecord],
    publications: &[PublicationRecord],
) -> CitationGraph {
    let mut graph = CitationGraph::new();

    for publication in publications {
        let paper = graph.ensure_node(&publication.paperid, || Node::paper(&publication.paperid));
        if let NodeKind::Paper { year, patent_count } = &mut paper.kind {
            if year.is_none() {
                *year = Some(publication.year);
            }
            if *patent_count == 0 {
                *patent_count = publication.patent_count;
            }
        }
    }

    // paper key -> ordered (author key, position); duplicates within one
    // paper are collapsed so counters stay per distinct participation.
    let mut paper_authors: HashMap<String, Vec<(String, u32)>> = HashMap::new();

    for affiliation in affiliations {
        graph.ensure_node(&affiliation.paperid, || Node::paper(&affiliation.paperid));

        let key = author_key(&affiliation.authorid);
        let entry = paper_authors.entry(affiliation.paperid.clone()).or_default();
        if entry.iter().any(|(existing, _)| existing == &key) {
            continue;
        }
        entry.push((key.clone(), affiliation.author_position));

        let author = graph.ensure_node(&key, || Node::author(&affiliation.authorid));
        author.paper_count += 1;
        if let NodeKind::Author {
            institution_id,
            first_author_count,
        } = &mut author.kind
        {
            if institution_id.is_none() {
                *institution_id = affiliation.institutionid.clone();
            }
            if affiliation.author_position <= 1 {
                *first_author_count += 1;
            }
        }
    }

    let mut paper_ids = paper_authors.keys().cloned().collect::<Vec<_>>();
    paper_ids.sort();

    for paper_id in &paper_ids {
        let authors = &paper_authors[paper_id];
        for (author, position) in authors {
            graph.push_edge(Edge {
                source: paper_id.clone(),
                target: author.clone(),
                kind: EdgeKind::Authorship {
                    position: *position,
                },
            });
        }
    }

    // Canonicalized author pair -> accumulated collaboration state.
    let mut pairs: HashMap<(String, String), (u32, Vec<String>)> = HashMap::new();
    for paper_id in &paper_ids {
        let authors = &paper_authors[paper_id];
        for i in 0..authors.len() {
            for j in (i + 1)..authors.len() {
                let (a, b) = (&authors[i].0, &authors[j].0);
                let pair = if a <= b {
                    (a.clone(), b.clone())
                } else {
                    (b.clone(), a.clone())
                };
                let entry = pairs.entry(pair).or_insert_with(|| (0, Vec::new()));
                entry.0 += 1;
                if !entry.1.contains(paper_id) {
                    entry.1.push(paper_id.clone());
                }
            }
        }
    }

    let mut pair_keys = pairs.keys().cloned().collect::<Vec<_>>();
    pair_keys.sort();
    for pair in pair_keys {
        let (count, shared) = pairs.remove(&pair).unwrap_or((0, Vec::new()));
        graph.push_edge(Edge {
            source: pair.0,
            target: pair.1,
            kind: EdgeKind::Collaboration {
                count,
                paper_ids: shared,
            },
        });
    }

    graph
}

/// Pre-built graph document → graph. Links with unknown endpoints are
/// dropped, never left dangling.
pub fn from_graph_doc(doc: GraphDoc) -> CitationGraph {
    let mut graph = CitationGraph::new();

    for doc_node in &doc.nodes {
        let kind = match doc_node.kind.as_deref() {
            Some("author") => NodeKind::Author {
                institution_id: None,
                first_author_count: 0,
            },
            _ => NodeKind::Paper {
                year: doc_node.year,
                patent_count: 0,
            },
        };
        let node = graph.ensure_node(&doc_node.id, || Node {
            key: doc_node.id.clone(),
            label: doc_node.label.clone().unwrap_or_else(|| doc_node.id.clone()),
            kind,
            citation_count: doc_node.citation_count,
            paper_count: doc_node.paper_count,
        });
        // First occurrence wins on duplicate ids.
        let _ = node;
    }

    for link in &doc.links {
        graph.push_edge(Edge {
            source: link.source.clone(),
            target: link.target.clone(),
            kind: EdgeKind::Link { value: link.value },
        });
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citation(citing: &str, cited: &str) -> CitationRecord {
        CitationRecord {
            citing_paperid: citing.to_owned(),
            cited_paperid: cited.to_owned(),
            year: 2021,
            ref_year: 2020,
            year_diff: 1,
        }
    }

    fn affiliation(paper: &str, position: u32, author: &str) -> AffiliationRecord {
        AffiliationRecord {
            paperid: paper.to_owned(),
            author_position: position,
            authorid: author.to_owned(),
            institutionid: None,
            raw_affiliation: None,
        }
    }

    #[test]
    fn single_citation_yields_two_nodes_and_one_edge() {
        let graph = build_citation_graph(&[citation("P1", "P2")]);

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node("P1").unwrap().citation_count, 0);
        assert_eq!(graph.node("P2").unwrap().citation_count, 1);

        let edge = &graph.edges()[0];
        assert_eq!(edge.source, "P1");
        assert_eq!(edge.target, "P2");
        assert!(matches!(edge.kind, EdgeKind::Citation { year_diff: 1, .. }));
    }

    #[test]
    fn repeated_ids_dedup_with_accumulated_counters() {
        let graph = build_citation_graph(&[
            citation("P1", "P2"),
            citation("P3", "P2"),
            citation("P1", "P2"),
        ]);

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.node("P2").unwrap().citation_count, 3);
        // Duplicate (P1, P2) pair collapses to one edge.
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn self_citations_never_become_edges() {
        let graph = build_citation_graph(&[citation("P1", "P1")]);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn every_edge_endpoint_resolves() {
        let graph = build_citation_graph(&[
            citation("P1", "P2"),
            citation("P2", "P3"),
            citation("P4", "P1"),
        ]);
        for edge in graph.edges() {
            assert!(graph.contains(&edge.source));
            assert!(graph.contains(&edge.target));
        }
    }

    #[test]
    fn collaboration_pairs_are_canonical_and_accumulated() {
        let graph = build_coauthor_graph(
            &[
                affiliation("X", 1, "A"),
                affiliation("X", 2, "B"),
                affiliation("X", 3, "C"),
                affiliation("Y", 1, "B"),
                affiliation("Y", 2, "A"),
            ],
            &[],
        );

        let collaborations = graph
            .edges()
            .iter()
            .filter(|edge| matches!(edge.kind, EdgeKind::Collaboration { .. }))
            .collect::<Vec<_>>();
        assert_eq!(collaborations.len(), 3);

        let ab = collaborations
            .iter()
            .find(|edge| edge.source == author_key("A") && edge.target == author_key("B"))
            .expect("A-B edge");
        match &ab.kind {
            EdgeKind::Collaboration { count, paper_ids } => {
                assert_eq!(*count, 2);
                assert_eq!(paper_ids, &vec!["X".to_owned(), "Y".to_owned()]);
            }
            other => panic!("unexpected edge kind {other:?}"),
        }
    }

    #[test]
    fn authorship_edges_and_participation_counters() {
        let graph = build_coauthor_graph(
            &[
                affiliation("X", 1, "A"),
                affiliation("X", 2, "B"),
                affiliation("Y", 1, "A"),
            ],
            &[PublicationRecord {
                paperid: "X".to_owned(),
                year: 2020,
                patent_count: 2,
            }],
        );

        let author_a = graph.node(&author_key("A")).unwrap();
        assert_eq!(author_a.paper_count, 2);
        assert_eq!(author_a.importance(), 2);

        let paper_x = graph.node("X").unwrap();
        assert!(matches!(
            paper_x.kind,
            NodeKind::Paper {
                year: Some(2020),
                patent_count: 2
            }
        ));

        let authorships = graph
            .edges()
            .iter()
            .filter(|edge| matches!(edge.kind, EdgeKind::Authorship { .. }))
            .count();
        assert_eq!(authorships, 3);
    }

    #[test]
    fn graph_doc_links_with_unknown_endpoints_are_dropped() {
        let doc: GraphDoc = serde_json::from_str(
            r#"{
                "nodes": [
                    {"id": "P1", "citation_count": 3},
                    {"id": "author_A", "kind": "author", "paper_count": 2}
                ],
                "links": [
                    {"source": "P1", "target": "author_A", "value": 2.0},
                    {"source": "P1", "target": "ghost"}
                ]
            }"#,
        )
        .unwrap();

        let graph = from_graph_doc(doc);
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);
        assert!(matches!(graph.edges()[0].kind, EdgeKind::Link { value } if value == 2.0));
    }
}
