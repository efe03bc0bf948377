mod build;
mod graph;
mod groups;
mod ingest;
mod prune;
mod record;

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;

pub use build::{build_citation_graph, build_coauthor_graph, from_graph_doc};
pub use graph::{author_key, CitationGraph, Edge, EdgeKind, Node, NodeClass, NodeKind};
pub use groups::{assign_groups, group_count, GroupingPolicy};
pub use ingest::IngestError;
pub use prune::{
    prune, DisplayedEdge, DisplayedGraph, KindQuota, PruneParams, MAX_NODE_BUDGET, MIN_NODE_BUDGET,
};

/// Where the graph comes from. Tabular sources run through the builder; a
/// graph document skips it but is still pruned.
#[derive(Clone, Debug)]
pub enum Source {
    Citations {
        path: PathBuf,
    },
    Coauthor {
        affiliations: PathBuf,
        publications: Option<PathBuf>,
    },
    GraphDoc {
        path: PathBuf,
    },
}

impl Source {
    pub fn describe(&self) -> String {
        match self {
            Self::Citations { path } => format!("citations: {}", path.display()),
            Self::Coauthor { affiliations, .. } => {
                format!("co-authorship: {}", affiliations.display())
            }
            Self::GraphDoc { path } => format!("graph document: {}", path.display()),
        }
    }
}

/// Single-attempt load: ingest, validate, build. Runs on the background
/// loader thread; the caller decides whether to retry.
pub fn load(source: &Source) -> Result<CitationGraph> {
    let graph = match source {
        Source::Citations { path } => {
            let records = ingest::load_citations(path)?;
            build_citation_graph(&records)
        }
        Source::Coauthor {
            affiliations,
            publications,
        } => {
            let affiliation_records = ingest::load_affiliations(affiliations)?;
            let publication_records = match publications {
                Some(path) => ingest::load_publications(path)
                    .with_context(|| format!("loading publications from {}", path.display()))?,
                None => Vec::new(),
            };
            build_coauthor_graph(&affiliation_records, &publication_records)
        }
        Source::GraphDoc { path } => from_graph_doc(ingest::load_graph_doc(path)?),
    };

    info!(
        "built graph: {} nodes, {} edges, {} total citations",
        graph.node_count(),
        graph.edge_count(),
        graph.total_citations()
    );
    Ok(graph)
}
