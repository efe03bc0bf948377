use eframe::egui::{self, Align, Context, Layout, Vec2};

use crate::data::{CitationGraph, GroupingPolicy, NodeClass, Source, MAX_NODE_BUDGET, MIN_NODE_BUDGET};
use crate::sim::radial::RadialParams;
use crate::sim::{seeded_position, BodyState, ForceSimulation, SimParams, SimPhase, SpringLink};
use crate::util::{format_count, stable_pair};

use super::super::graph::{spring_for, style_of};
use super::super::render_utils::{node_charge, node_radius};
use super::super::{AppOptions, LayoutMode, RenderEdge, RenderNode, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(graph: CitationGraph, options: &AppOptions) -> Self {
        let top_papers = graph.top_by_importance(Some(NodeClass::Paper), 100);
        let top_authors = graph.top_by_importance(Some(NodeClass::Author), 100);
        let has_authors = !top_authors.is_empty();
        let importance_ceiling = graph
            .nodes()
            .iter()
            .map(|node| node.importance())
            .max()
            .unwrap_or(0);

        Self {
            graph,
            layout_mode: LayoutMode::Force,
            grouping: GroupingPolicy::Components,
            max_nodes: options.max_nodes.clamp(MIN_NODE_BUDGET, MAX_NODE_BUDGET),
            min_importance: 0,
            importance_ceiling,
            balance_kinds: has_authors,
            has_authors,
            search: String::new(),
            selected: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            enable_zoom: options.enable_zoom,
            sim: ForceSimulation::new(),
            sim_params: SimParams::default(),
            radial_params: RadialParams::default(),
            dragged_node: None,
            graph_dirty: true,
            render_graph_revision: 0,
            graph_cache: None,
            search_match_cache: None,
            top_papers,
            top_authors,
            visible_node_count: 0,
            visible_edge_count: 0,
        }
    }

    fn layout_status_text(&self) -> String {
        match self.layout_mode {
            LayoutMode::Radial => "layout: radial".to_owned(),
            LayoutMode::Force => match self.sim.phase() {
                SimPhase::Stopped => "layout: settled".to_owned(),
                SimPhase::Settling => format!("layout: settling  alpha {:.3}", self.sim.alpha()),
                _ => format!("layout: running  alpha {:.3}", self.sim.alpha()),
            },
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source: &Source,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("citegraph");
                    ui.separator();
                    ui.label(source.describe());
                    ui.label(format!("nodes: {}", self.graph.node_count()));
                    ui.label(format!("edges: {}", self.graph.edge_count()));
                    ui.label(format!(
                        "total citations: {}",
                        format_count(self.graph.total_citations())
                    ));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload data"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if ui.button("Rebuild layout").clicked() {
                        self.graph_dirty = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!(
                            "rendered: {} nodes, {} edges",
                            self.visible_node_count, self.visible_edge_count
                        ));
                        ui.label(self.layout_status_text());
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Loading citation graph...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
            } else {
                self.draw_graph(ui);
            }
        });
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        if self.selected == selected {
            return;
        }

        self.selected = selected;
        if let Some(key) = self.selected.clone() {
            self.include_node_in_view(&key);
        }
    }

    /// Splices a node into the rendered view without a full rebuild, wiring
    /// every edge between it and the nodes already on screen. Used when a
    /// ranking or details click selects something the pruner dropped.
    fn include_node_in_view(&mut self, key: &str) {
        let Some(node) = self.graph.node(key) else {
            return;
        };
        let label = node.label.clone();
        let class = node.kind.class();
        let importance = node.importance();

        let Some(cache) = self.graph_cache.as_mut() else {
            // No cache yet; the upcoming rebuild will admit the selection.
            self.graph_dirty = true;
            return;
        };
        if cache.index_by_key.contains_key(key) {
            return;
        }

        let new_index = cache.nodes.len();
        cache.nodes.push(RenderNode {
            key: key.to_owned(),
            label,
            class,
            importance,
        });
        cache.bodies.push(BodyState {
            pos: seeded_position(stable_pair(key), new_index, new_index + 1),
            vel: Vec2::ZERO,
            pinned: None,
            radius: node_radius(importance, cache.min_importance, cache.max_importance),
            charge: node_charge(importance, cache.min_importance, cache.max_importance),
            group: 0,
        });
        cache.index_by_key.insert(key.to_owned(), new_index);
        cache.neighbors.push(Vec::new());
        cache.incident_edges.push(Vec::new());

        for (full_edge, edge) in self.graph.edges().iter().enumerate() {
            let other_key = if edge.source == key {
                edge.target.as_str()
            } else if edge.target == key {
                edge.source.as_str()
            } else {
                continue;
            };
            let Some(&other_index) = cache.index_by_key.get(other_key) else {
                continue;
            };
            if other_index == new_index {
                continue;
            }

            let (source, target) = if edge.source == key {
                (new_index, other_index)
            } else {
                (other_index, new_index)
            };
            let style = style_of(&edge.kind);
            let weight = edge.weight();
            let (rest_length, strength) = spring_for(style, weight);
            let edge_index = cache.edges.len();

            cache.edges.push(RenderEdge {
                source,
                target,
                style,
                weight,
                full_edge,
            });
            cache.links.push(SpringLink {
                source,
                target,
                rest_length,
                strength,
            });
            cache.neighbors[source].push(target);
            cache.neighbors[target].push(source);
            cache.incident_edges[source].push(edge_index);
            cache.incident_edges[target].push(edge_index);
        }

        // Adopt a neighbor's group so coloring and cohesion stay coherent;
        // an isolated arrival becomes its own group.
        let group = cache.neighbors[new_index]
            .first()
            .map(|&neighbor| cache.bodies[neighbor].group);
        cache.bodies[new_index].group = match group {
            Some(group) => group,
            None => {
                cache.group_count += 1;
                cache.group_count - 1
            }
        };

        self.visible_node_count = cache.nodes.len();
        self.visible_edge_count = cache.edges.len();
        self.sim.reheat();
    }
}
