use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{info, warn};
use thiserror::Error;

use super::record::{
    AffiliationRecord, CitationRecord, GraphDoc, PublicationRecord, YEAR_DIFF_RANGE, YEAR_RANGE,
};

/// Ingestion failure taxonomy. Malformed rows are not errors; they are
/// dropped and counted, and only an all-dropped table becomes
/// `NoValidRecords`.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Fetch {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} contained no data")]
    EmptySource { path: String },
    #[error("no valid records in {path}: {detail}")]
    NoValidRecords { path: String, detail: String },
}

struct TableView<'a> {
    columns: HashMap<&'a str, usize>,
}

impl<'a> TableView<'a> {
    fn from_header(header: &'a str, required: &[&str], origin: &str) -> Result<Self, IngestError> {
        let columns = header
            .split(',')
            .enumerate()
            .map(|(index, name)| (name.trim(), index))
            .collect::<HashMap<_, _>>();

        for name in required {
            if !columns.contains_key(name) {
                return Err(IngestError::NoValidRecords {
                    path: origin.to_owned(),
                    detail: format!("missing column '{name}'"),
                });
            }
        }
        Ok(Self { columns })
    }

    fn field<'b>(&self, fields: &[&'b str], name: &str) -> Option<&'b str> {
        let value = fields.get(*self.columns.get(name)?)?.trim();
        if value.is_empty() { None } else { Some(value) }
    }

    fn int_field(&self, fields: &[&str], name: &str) -> Option<i32> {
        self.field(fields, name)?.parse::<i32>().ok()
    }
}

fn read_source(path: &Path) -> Result<String, IngestError> {
    let text = fs::read_to_string(path).map_err(|source| IngestError::Fetch {
        path: path.display().to_string(),
        source,
    })?;
    if text.trim().is_empty() {
        return Err(IngestError::EmptySource {
            path: path.display().to_string(),
        });
    }
    Ok(text)
}

fn parse_table<T>(
    text: &str,
    origin: &str,
    required: &[&str],
    mut parse_row: impl FnMut(&TableView<'_>, &[&str]) -> Option<T>,
) -> Result<Vec<T>, IngestError> {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    let header = lines.next().ok_or_else(|| IngestError::EmptySource {
        path: origin.to_owned(),
    })?;
    let view = TableView::from_header(header, required, origin)?;

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for line in lines {
        let fields = line.split(',').collect::<Vec<_>>();
        match parse_row(&view, &fields) {
            Some(record) => records.push(record),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!("{origin}: dropped {dropped} malformed rows");
    }
    if records.is_empty() {
        return Err(IngestError::NoValidRecords {
            path: origin.to_owned(),
            detail: format!("{dropped} malformed rows dropped"),
        });
    }
    info!("{origin}: {} records ({dropped} dropped)", records.len());
    Ok(records)
}

pub fn parse_citations(text: &str, origin: &str) -> Result<Vec<CitationRecord>, IngestError> {
    parse_table(
        text,
        origin,
        &["citing_paperid", "cited_paperid", "year", "ref_year", "year_diff"],
        |view, fields| {
            let year = view.int_field(fields, "year")?;
            let ref_year = view.int_field(fields, "ref_year")?;
            let year_diff = view.int_field(fields, "year_diff")?;
            if !YEAR_RANGE.contains(&year)
                || !YEAR_RANGE.contains(&ref_year)
                || !YEAR_DIFF_RANGE.contains(&year_diff)
            {
                return None;
            }
            Some(CitationRecord {
                citing_paperid: view.field(fields, "citing_paperid")?.to_owned(),
                cited_paperid: view.field(fields, "cited_paperid")?.to_owned(),
                year,
                ref_year,
                year_diff,
            })
        },
    )
}

pub fn parse_affiliations(text: &str, origin: &str) -> Result<Vec<AffiliationRecord>, IngestError> {
    parse_table(
        text,
        origin,
        &["paperid", "author_position", "authorid"],
        |view, fields| {
            let position = view.int_field(fields, "author_position")?;
            if position < 0 {
                return None;
            }
            Some(AffiliationRecord {
                paperid: view.field(fields, "paperid")?.to_owned(),
                author_position: position as u32,
                authorid: view.field(fields, "authorid")?.to_owned(),
                institutionid: view.field(fields, "institutionid").map(str::to_owned),
                raw_affiliation: view
                    .field(fields, "raw_affiliation_string")
                    .map(str::to_owned),
            })
        },
    )
}

pub fn parse_publications(text: &str, origin: &str) -> Result<Vec<PublicationRecord>, IngestError> {
    parse_table(text, origin, &["paperid", "year"], |view, fields| {
        let year = view.int_field(fields, "year")?;
        let patent_count = view.int_field(fields, "patent_count").unwrap_or(0);
        if !YEAR_RANGE.contains(&year) || patent_count < 0 {
            return None;
        }
        Some(PublicationRecord {
            paperid: view.field(fields, "paperid")?.to_owned(),
            year,
            patent_count: patent_count as u32,
        })
    })
}

pub fn load_citations(path: &Path) -> Result<Vec<CitationRecord>, IngestError> {
    let text = read_source(path)?;
    parse_citations(&text, &path.display().to_string())
}

pub fn load_affiliations(path: &Path) -> Result<Vec<AffiliationRecord>, IngestError> {
    let text = read_source(path)?;
    parse_affiliations(&text, &path.display().to_string())
}

pub fn load_publications(path: &Path) -> Result<Vec<PublicationRecord>, IngestError> {
    let text = read_source(path)?;
    parse_publications(&text, &path.display().to_string())
}

pub fn load_graph_doc(path: &Path) -> Result<GraphDoc, IngestError> {
    let text = read_source(path)?;
    let doc: GraphDoc =
        serde_json::from_str(&text).map_err(|error| IngestError::NoValidRecords {
            path: path.display().to_string(),
            detail: error.to_string(),
        })?;
    if doc.nodes.is_empty() {
        return Err(IngestError::NoValidRecords {
            path: path.display().to_string(),
            detail: "document has no nodes".to_owned(),
        });
    }
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_citation_rows() {
        let text = "citing_paperid,cited_paperid,year,ref_year,year_diff\n\
                    P1,P2,2021,2020,1\n\
                    P3,P1,2022,2021,1\n";
        let records = parse_citations(text, "test").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].citing_paperid, "P1");
        assert_eq!(records[0].year_diff, 1);
    }

    #[test]
    fn drops_rows_with_missing_or_out_of_range_fields() {
        let text = "citing_paperid,cited_paperid,year,ref_year,year_diff\n\
                    P1,P2,2021,2020,1\n\
                    ,P2,2021,2020,1\n\
                    P1,P2,1999,2020,1\n\
                    P1,P2,2021,2020,40\n\
                    P1,P2,not-a-year,2020,1\n";
        let records = parse_citations(text, "test").unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn all_rows_dropped_is_no_valid_records() {
        let text = "citing_paperid,cited_paperid,year,ref_year,year_diff\n\
                    ,,,,\n";
        let error = parse_citations(text, "test").unwrap_err();
        assert!(matches!(error, IngestError::NoValidRecords { .. }));
    }

    #[test]
    fn missing_required_column_is_no_valid_records() {
        let text = "citing_paperid,cited_paperid\nP1,P2\n";
        let error = parse_citations(text, "test").unwrap_err();
        assert!(matches!(error, IngestError::NoValidRecords { .. }));
    }

    #[test]
    fn header_order_does_not_matter() {
        let text = "year_diff,cited_paperid,citing_paperid,ref_year,year\n\
                    1,P2,P1,2020,2021\n";
        let records = parse_citations(text, "test").unwrap();
        assert_eq!(records[0].citing_paperid, "P1");
        assert_eq!(records[0].cited_paperid, "P2");
    }

    #[test]
    fn affiliation_rows_keep_optional_fields() {
        let text = "paperid,author_position,authorid,institutionid,raw_affiliation_string\n\
                    X,1,A,I1,Some University\n\
                    X,2,B,,\n";
        let records = parse_affiliations(text, "test").unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].institutionid.as_deref(), Some("I1"));
        assert_eq!(records[1].institutionid, None);
    }

    #[test]
    fn missing_file_is_fetch_error() {
        let error = load_citations(Path::new("/nonexistent/citations.csv")).unwrap_err();
        assert!(matches!(error, IngestError::Fetch { .. }));
    }
}
