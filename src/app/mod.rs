use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

use eframe::egui::{self, Context, Pos2, Vec2};

use crate::data::{self, CitationGraph, GroupingPolicy, NodeClass, Source};
use crate::sim::radial::{RadialParams, RegionLayout};
use crate::sim::{BodyState, ForceScratch, ForceSimulation, SimParams, SpringLink};

mod graph;
mod highlight;
mod render_utils;
mod ui;

#[derive(Clone, Copy, Debug)]
pub struct AppOptions {
    pub max_nodes: usize,
    pub enable_zoom: bool,
}

pub struct CiteGraphApp {
    source: Source,
    options: AppOptions,
    state: AppState,
    reload_rx: Option<Receiver<Result<CitationGraph, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<CitationGraph, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LayoutMode {
    Force,
    Radial,
}

struct ViewModel {
    graph: CitationGraph,
    layout_mode: LayoutMode,
    grouping: GroupingPolicy,
    max_nodes: usize,
    min_importance: u64,
    importance_ceiling: u64,
    balance_kinds: bool,
    has_authors: bool,
    search: String,
    selected: Option<String>,
    pan: Vec2,
    zoom: f32,
    enable_zoom: bool,
    sim: ForceSimulation,
    sim_params: SimParams,
    radial_params: RadialParams,
    dragged_node: Option<usize>,
    graph_dirty: bool,
    render_graph_revision: u64,
    graph_cache: Option<RenderGraph>,
    search_match_cache: Option<SearchMatchCache>,
    top_papers: Vec<String>,
    top_authors: Vec<String>,
    visible_node_count: usize,
    visible_edge_count: usize,
}

struct SearchMatchCache {
    query: String,
    graph_revision: u64,
    matches: Arc<HashSet<usize>>,
}

/// Laid-out subset of the full graph. Node metadata, kinetic state and edge
/// springs are parallel vectors; indices below always refer to this subset,
/// never to the full graph.
struct RenderGraph {
    nodes: Vec<RenderNode>,
    bodies: Vec<BodyState>,
    links: Vec<SpringLink>,
    edges: Vec<RenderEdge>,
    index_by_key: HashMap<String, usize>,
    neighbors: Vec<Vec<usize>>,
    incident_edges: Vec<Vec<usize>>,
    group_count: usize,
    /// Packed group regions, present only in the radial layout.
    regions: Option<RegionLayout>,
    min_importance: u64,
    max_importance: u64,
    force_scratch: ForceScratch,
    view_scratch: ViewScratch,
}

#[derive(Default)]
struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
    visible_mask: Vec<bool>,
}

struct RenderNode {
    key: String,
    label: String,
    class: NodeClass,
    importance: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EdgeStyle {
    Citation,
    Authorship,
    Collaboration,
    Link,
}

struct RenderEdge {
    source: usize,
    target: usize,
    style: EdgeStyle,
    weight: f32,
    /// Position of the originating edge in the full graph's edge list.
    full_edge: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum HoverTarget {
    Node(usize),
    Edge(usize),
}

struct HighlightState {
    nodes: HashSet<usize>,
    edges: HashSet<usize>,
}

impl CiteGraphApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, source: Source, options: AppOptions) -> Self {
        let state = Self::start_load(source.clone());
        Self {
            source,
            options,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: Source) -> Receiver<Result<CitationGraph, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = data::load(&source).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: Source) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(source),
        }
    }
}

impl eframe::App for CiteGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(graph) => {
                            AppState::Ready(Box::new(ViewModel::new(graph, &self.options)))
                        }
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading citation graph...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load citation graph");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.source.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.source, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.source.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(match result {
                                Ok(graph) => {
                                    AppState::Ready(Box::new(ViewModel::new(graph, &self.options)))
                                }
                                Err(error) => AppState::Error(error),
                            });
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(AppState::Error("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
