use std::ops::RangeInclusive;

use serde::Deserialize;

/// Publication years the corpus can plausibly contain; rows outside are
/// treated as malformed.
pub const YEAR_RANGE: RangeInclusive<i32> = 2015..=2025;
pub const YEAR_DIFF_RANGE: RangeInclusive<i32> = -5..=10;

/// One citation fact: `citing` cites `cited`.
#[derive(Clone, Debug, PartialEq)]
pub struct CitationRecord {
    pub citing_paperid: String,
    pub cited_paperid: String,
    pub year: i32,
    pub ref_year: i32,
    pub year_diff: i32,
}

/// One authorship fact: `authorid` wrote `paperid` at `author_position`.
#[derive(Clone, Debug, PartialEq)]
pub struct AffiliationRecord {
    pub paperid: String,
    pub author_position: u32,
    pub authorid: String,
    pub institutionid: Option<String>,
    pub raw_affiliation: Option<String>,
}

/// Per-paper publication aggregate.
#[derive(Clone, Debug, PartialEq)]
pub struct PublicationRecord {
    pub paperid: String,
    pub year: i32,
    pub patent_count: u32,
}

/// Pre-built `{nodes, links}` document from the server-backed variant. It
/// bypasses the graph builder but is still pruned like everything else.
#[derive(Debug, Deserialize)]
pub struct GraphDoc {
    pub nodes: Vec<DocNode>,
    #[serde(default)]
    pub links: Vec<DocLink>,
}

#[derive(Debug, Deserialize)]
pub struct DocNode {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub citation_count: u32,
    #[serde(default)]
    pub paper_count: u32,
    #[serde(default)]
    pub year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct DocLink {
    pub source: String,
    pub target: String,
    #[serde(default = "default_link_value")]
    pub value: f32,
}

fn default_link_value() -> f32 {
    1.0
}
