use eframe::egui::{self, RichText, Ui};

use crate::data::{EdgeKind, NodeKind};
use crate::util::{format_count, short_label};

use super::super::{EdgeStyle, ViewModel};

struct ConnectionRow {
    key: String,
    text: String,
    hover: Option<String>,
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected_key) = self.selected.clone() else {
            ui.label("Select a node from the graph or the rankings.");
            return;
        };
        let Some(node) = self.graph.node(&selected_key) else {
            ui.label("Selected node no longer exists in the loaded graph.");
            return;
        };

        ui.label(RichText::new(short_label(&node.label)).strong());
        ui.small(selected_key.as_str());
        ui.add_space(6.0);

        match &node.kind {
            NodeKind::Paper { year, patent_count } => {
                ui.label(format!(
                    "Cited {} times",
                    format_count(u64::from(node.citation_count))
                ));
                match year {
                    Some(year) => ui.label(format!("Published {year}")),
                    None => ui.label("Publication year unknown"),
                };
                if *patent_count > 0 {
                    ui.label(format!("Cited by {patent_count} patents"));
                }
            }
            NodeKind::Author {
                institution_id,
                first_author_count,
            } => {
                ui.label(format!(
                    "Papers: {}",
                    format_count(u64::from(node.paper_count))
                ));
                ui.label(format!("First-author papers: {first_author_count}"));
                if let Some(institution) = institution_id {
                    ui.label(format!("Institution: {institution}"));
                }
            }
        }

        ui.separator();
        ui.label(RichText::new("Connections").strong());

        let rows = self.connection_rows(&selected_key);
        let mut pending_selection = None;
        match rows {
            Some(rows) if rows.is_empty() => {
                ui.label("No connections in the rendered view.");
            }
            Some(rows) => {
                egui::ScrollArea::vertical()
                    .id_salt("connections_scroll")
                    .max_height(360.0)
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        for row in &rows {
                            let link = ui.link(row.text.as_str());
                            let link = match &row.hover {
                                Some(hover) => link.on_hover_text(hover.as_str()),
                                None => link.on_hover_text(row.key.as_str()),
                            };
                            if link.clicked() {
                                pending_selection = Some(row.key.clone());
                            }
                        }
                    });
            }
            None => {
                ui.label("Not currently rendered.");
            }
        }

        ui.add_space(8.0);
        if ui.button("Clear selection").clicked() {
            pending_selection = None;
            self.set_selected(None);
        } else if let Some(key) = pending_selection {
            self.set_selected(Some(key));
        }
    }

    /// One row per incident edge of the selection in the rendered view,
    /// phrased by edge kind and direction.
    fn connection_rows(&self, selected_key: &str) -> Option<Vec<ConnectionRow>> {
        let cache = self.graph_cache.as_ref()?;
        let index = cache.index_by_key.get(selected_key).copied()?;

        let mut rows = Vec::with_capacity(cache.incident_edges[index].len());
        for &edge_index in &cache.incident_edges[index] {
            let edge = &cache.edges[edge_index];
            let is_source = edge.source == index;
            let other = if is_source { edge.target } else { edge.source };
            let other_node = &cache.nodes[other];
            let other_label = short_label(&other_node.label);

            let (text, hover) = match edge.style {
                EdgeStyle::Citation => {
                    let text = if is_source {
                        format!("cites  {other_label}")
                    } else {
                        format!("cited by  {other_label}")
                    };
                    (text, None)
                }
                EdgeStyle::Authorship => {
                    // Authorship edges run paper -> author.
                    let text = if is_source {
                        format!("authored by  {other_label}")
                    } else {
                        format!("author of  {other_label}")
                    };
                    (text, None)
                }
                EdgeStyle::Collaboration => {
                    let shared = match self.graph.edges().get(edge.full_edge).map(|e| &e.kind) {
                        Some(EdgeKind::Collaboration { paper_ids, .. }) => {
                            let mut preview = paper_ids
                                .iter()
                                .take(5)
                                .map(String::as_str)
                                .collect::<Vec<_>>()
                                .join(", ");
                            if paper_ids.len() > 5 {
                                preview.push_str(", ...");
                            }
                            Some(format!("shared papers: {preview}"))
                        }
                        _ => None,
                    };
                    (
                        format!(
                            "collaborates with  {other_label}  ({} papers)",
                            edge.weight as u32
                        ),
                        shared,
                    )
                }
                EdgeStyle::Link => (format!("linked to  {other_label}"), None),
            };

            rows.push(ConnectionRow {
                key: other_node.key.clone(),
                text,
                hover,
            });
        }

        Some(rows)
    }
}
