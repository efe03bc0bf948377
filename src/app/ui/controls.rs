use eframe::egui::{self, Ui, Vec2};

use crate::data::{GroupingPolicy, MAX_NODE_BUDGET, MIN_NODE_BUDGET};
use crate::util::{format_count, short_label};

use super::super::{LayoutMode, ViewModel};

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        let mut changed = false;

        ui.label("Search (paper id or author)");
        ui.text_edit_singleline(&mut self.search)
            .on_hover_text("Fuzzy-highlight matching nodes without changing the rendered graph.");

        ui.separator();

        ui.label("Layout");
        ui.horizontal(|ui| {
            changed |= ui
                .selectable_value(&mut self.layout_mode, LayoutMode::Force, "Force-directed")
                .changed();
            changed |= ui
                .selectable_value(&mut self.layout_mode, LayoutMode::Radial, "Radial groups")
                .on_hover_text("Pack each group into its own circular region.")
                .changed();
        });

        ui.label("Grouping");
        ui.horizontal(|ui| {
            for policy in [GroupingPolicy::Components, GroupingPolicy::PublicationYear] {
                changed |= ui
                    .selectable_value(&mut self.grouping, policy, policy.label())
                    .changed();
            }
        });

        ui.separator();

        changed |= ui
            .add(
                egui::Slider::new(&mut self.max_nodes, MIN_NODE_BUDGET..=MAX_NODE_BUDGET)
                    .text("max nodes"),
            )
            .on_hover_text("Node budget; the most important nodes survive pruning.")
            .changed();
        if self.importance_ceiling > 0 {
            changed |= ui
                .add(
                    egui::Slider::new(&mut self.min_importance, 0..=self.importance_ceiling)
                        .text("min importance"),
                )
                .on_hover_text("Hide nodes below this citation or paper count.")
                .changed();
        }
        if self.has_authors {
            changed |= ui
                .checkbox(&mut self.balance_kinds, "Balance authors and papers")
                .on_hover_text("Reserve most of the node budget for authors.")
                .changed();
        }

        if ui.button("Reset view").clicked() {
            self.pan = Vec2::ZERO;
            self.zoom = 1.0;
        }

        ui.separator();

        match self.layout_mode {
            LayoutMode::Force => {
                egui::CollapsingHeader::new("Forces").show(ui, |ui| {
                    let mut forces_changed = false;
                    forces_changed |= ui
                        .add(
                            egui::Slider::new(&mut self.sim_params.repulsion, 4_000.0..=90_000.0)
                                .logarithmic(true)
                                .text("repulsion"),
                        )
                        .changed();
                    forces_changed |= ui
                        .add(
                            egui::Slider::new(
                                &mut self.sim_params.repulsion_cutoff,
                                200.0..=2_000.0,
                            )
                            .text("repulsion cutoff"),
                        )
                        .changed();
                    forces_changed |= ui
                        .add(egui::Slider::new(&mut self.sim_params.spring, 0.1..=2.5).text("springs"))
                        .changed();
                    forces_changed |= ui
                        .add(
                            egui::Slider::new(&mut self.sim_params.collision_padding, 0.0..=16.0)
                                .text("collision padding"),
                        )
                        .changed();
                    forces_changed |= ui
                        .add(
                            egui::Slider::new(&mut self.sim_params.cohesion, 0.0..=0.3)
                                .text("group cohesion"),
                        )
                        .changed();
                    forces_changed |= ui
                        .add(
                            egui::Slider::new(&mut self.sim_params.boundary_radius, 600.0..=3_000.0)
                                .text("boundary radius"),
                        )
                        .changed();
                    forces_changed |= ui
                        .add(
                            egui::Slider::new(&mut self.sim_params.velocity_decay, 0.1..=0.95)
                                .text("velocity decay"),
                        )
                        .changed();
                    forces_changed |= ui
                        .add(
                            egui::Slider::new(&mut self.sim_params.alpha_decay, 0.005..=0.1)
                                .text("alpha decay"),
                        )
                        .changed();

                    if forces_changed {
                        self.sim.reheat();
                    }
                });
            }
            LayoutMode::Radial => {
                egui::CollapsingHeader::new("Radial layout").show(ui, |ui| {
                    changed |= ui
                        .add(
                            egui::Slider::new(
                                &mut self.radial_params.world_radius,
                                400.0..=2_000.0,
                            )
                            .text("world radius"),
                        )
                        .changed();
                    changed |= ui
                        .add(
                            egui::Slider::new(&mut self.radial_params.margin, 0.0..=80.0)
                                .text("region margin"),
                        )
                        .changed();
                    ui.horizontal(|ui| {
                        ui.label("packing seed");
                        changed |= ui
                            .add(egui::DragValue::new(&mut self.radial_params.seed))
                            .changed();
                    });
                });
            }
        }

        ui.separator();

        let mut pending_selection = None;
        Self::draw_ranking(
            ui,
            "Top cited papers",
            &self.top_papers,
            &self.graph,
            &mut pending_selection,
        );
        if self.has_authors {
            Self::draw_ranking(
                ui,
                "Most active authors",
                &self.top_authors,
                &self.graph,
                &mut pending_selection,
            );
        }
        if let Some(key) = pending_selection {
            self.set_selected(Some(key));
        }

        if changed {
            self.graph_dirty = true;
        }
    }

    fn draw_ranking(
        ui: &mut Ui,
        title: &str,
        keys: &[String],
        graph: &crate::data::CitationGraph,
        pending_selection: &mut Option<String>,
    ) {
        egui::CollapsingHeader::new(title)
            .default_open(true)
            .show(ui, |ui| {
                if keys.is_empty() {
                    ui.label("Nothing to rank.");
                    return;
                }

                egui::ScrollArea::vertical()
                    .id_salt(title)
                    .max_height(220.0)
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        for key in keys {
                            let Some(node) = graph.node(key) else {
                                continue;
                            };
                            let row = format!(
                                "{}  ({})",
                                short_label(&node.label),
                                format_count(node.importance())
                            );
                            if ui.link(row).on_hover_text(key.as_str()).clicked() {
                                *pending_selection = Some(key.clone());
                            }
                        }
                    });
            });
    }
}
