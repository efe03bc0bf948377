use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, vec2, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, Vec2};
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

use crate::data::NodeClass;
use crate::sim::SimParams;
use crate::util::{format_count, short_label};

use super::super::highlight::build_highlight_state;
use super::super::render_utils::{
    blend_color, bundled_curve, circle_visible, dim_color, draw_background, draw_polyline,
    group_color, world_to_screen,
};
use super::super::{EdgeStyle, HoverTarget, LayoutMode, RenderGraph, ViewModel};

const BUNDLE_SEGMENTS: usize = 16;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

fn edge_base(style: EdgeStyle, weight: f32) -> (f32, Color32) {
    match style {
        EdgeStyle::Citation => (1.1, Color32::from_rgba_unmultiplied(108, 132, 166, 150)),
        EdgeStyle::Authorship => (1.1, Color32::from_rgba_unmultiplied(118, 168, 128, 150)),
        EdgeStyle::Collaboration => (
            1.0 + (weight.max(1.0).ln_1p() * 0.8),
            Color32::from_rgba_unmultiplied(214, 156, 96, 170),
        ),
        EdgeStyle::Link => (1.0, Color32::from_rgba_unmultiplied(128, 128, 128, 140)),
    }
}

fn segment_touches(rect: Rect, start: Pos2, end: Pos2) -> bool {
    let min = Pos2::new(start.x.min(end.x), start.y.min(end.y));
    let max = Pos2::new(start.x.max(end.x), start.y.max(end.y));
    rect.intersects(Rect::from_min_max(min, max))
}

impl ViewModel {
    fn update_screen_space(rect: Rect, pan: Vec2, zoom: f32, cache: &mut RenderGraph) {
        cache.view_scratch.screen_positions.clear();
        cache.view_scratch.screen_radii.clear();
        cache.view_scratch.visible_mask.clear();

        for body in &cache.bodies {
            let position = world_to_screen(rect, pan, zoom, body.pos);
            let radius = (body.radius * zoom.powf(0.40)).clamp(2.5, 46.0);
            cache
                .view_scratch
                .visible_mask
                .push(circle_visible(rect, position, radius));
            cache.view_scratch.screen_positions.push(position);
            cache.view_scratch.screen_radii.push(radius);
        }
    }

    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        if self.selected.is_some() {
            return None;
        }

        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.graph_revision == self.render_graph_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let cache = self.graph_cache.as_ref()?;
        let matcher = SkimMatcherV2::default();
        let matches = cache
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| {
                fuzzy_match_score(&matcher, &node.label, query).map(|_| index)
            })
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(super::super::SearchMatchCache {
            query: query.to_owned(),
            graph_revision: self.render_graph_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    fn hover_text(
        graph: &crate::data::CitationGraph,
        index: usize,
        cache: &RenderGraph,
    ) -> Option<String> {
        let render_node = cache.nodes.get(index)?;
        let node = graph.node(&render_node.key)?;
        let text = match node.kind.year() {
            Some(year) => format!(
                "{}  |  cited {}  |  published {year}",
                short_label(&node.label),
                format_count(u64::from(node.citation_count)),
            ),
            None if render_node.class == NodeClass::Author => format!(
                "{}  |  {} papers  |  {} collaborators",
                short_label(&node.label),
                format_count(u64::from(node.paper_count)),
                cache.neighbors.get(index).map_or(0, Vec::len),
            ),
            None => format!(
                "{}  |  cited {}",
                short_label(&node.label),
                format_count(u64::from(node.citation_count)),
            ),
        };
        Some(text)
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);

        self.handle_graph_zoom(ui, rect, &response);
        if self.dragged_node.is_none() {
            self.handle_graph_pan(&response);
        }

        let pseudo_matches = self.cached_search_matches();
        let pan = self.pan;
        let zoom = self.zoom;
        let layout_mode = self.layout_mode;
        let selected_key = self.selected.clone();
        let frame_delta_seconds = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);
        let params = SimParams {
            delta_seconds: frame_delta_seconds,
            ..self.sim_params
        };

        let Some(cache) = self.graph_cache.as_mut() else {
            self.visible_node_count = 0;
            self.visible_edge_count = 0;
            ui.label("No nodes pass the current filters.");
            return;
        };

        Self::update_screen_space(rect, pan, zoom, cache);
        Self::handle_node_drag(
            rect,
            &response,
            pan,
            zoom,
            cache,
            &mut self.dragged_node,
            &mut self.sim,
        );

        let mut layout_moving = false;
        if layout_mode == LayoutMode::Force {
            layout_moving = self.sim.step(
                &mut cache.bodies,
                &cache.links,
                cache.group_count,
                &params,
                &mut cache.force_scratch,
            );
        }
        if layout_moving || response.dragged() {
            ui.ctx().request_repaint();
        }

        Self::update_screen_space(rect, pan, zoom, cache);
        self.visible_node_count = cache
            .view_scratch
            .visible_mask
            .iter()
            .filter(|&&visible| visible)
            .count();

        let hovered = Self::hover_target(ui, rect, cache);
        if matches!(hovered, Some(HoverTarget::Node(_))) {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        let pending_selection = if response.clicked_by(egui::PointerButton::Primary) {
            Some(match hovered {
                Some(HoverTarget::Node(index)) => {
                    cache.nodes.get(index).map(|node| node.key.clone())
                }
                _ => None,
            })
        } else {
            None
        };

        // A persistent selection wins over the transient hover focus.
        let highlight = selected_key
            .as_deref()
            .and_then(|key| cache.index_by_key.get(key).copied())
            .map(|index| build_highlight_state(cache, HoverTarget::Node(index)))
            .or_else(|| hovered.map(|target| build_highlight_state(cache, target)));
        let highlight_active = highlight.is_some();
        let pseudo_active = pseudo_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());

        if let Some(regions) = &cache.regions {
            let region_stroke =
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(92, 104, 126, 70));
            for (center, radius) in regions.centers.iter().zip(regions.radii.iter()) {
                painter.circle_stroke(
                    world_to_screen(rect, pan, zoom, *center),
                    radius * zoom,
                    region_stroke,
                );
            }
        }

        let zoom_sqrt = zoom.sqrt();
        let mut visible_edge_count = 0usize;
        for (edge_index, edge) in cache.edges.iter().enumerate() {
            let start = cache.view_scratch.screen_positions[edge.source];
            let end = cache.view_scratch.screen_positions[edge.target];
            let endpoint_visible = cache.view_scratch.visible_mask[edge.source]
                || cache.view_scratch.visible_mask[edge.target];
            if !endpoint_visible && !segment_touches(rect, start, end) {
                continue;
            }

            let emphasized = highlight
                .as_ref()
                .is_some_and(|state| state.contains_edge(edge_index));
            let (base_width, base_color) = edge_base(edge.style, edge.weight);
            let stroke = if emphasized {
                Stroke::new(
                    ((base_width + 1.2) * zoom_sqrt).clamp(1.4, 5.0),
                    blend_color(base_color, Color32::WHITE, 0.35),
                )
            } else if highlight_active || pseudo_active {
                Stroke::new(
                    (base_width * zoom_sqrt).clamp(0.4, 2.4),
                    dim_color(base_color, 0.35),
                )
            } else {
                Stroke::new((base_width * zoom_sqrt).clamp(0.5, 3.2), base_color)
            };

            // Inter-region edges in the radial layout route through both
            // region centers instead of crossing regions directly.
            let bundled = cache.regions.as_ref().and_then(|regions| {
                let group_a = cache.bodies[edge.source].group;
                let group_b = cache.bodies[edge.target].group;
                regions.bundle_controls(group_a, group_b)
            });
            match bundled {
                Some((control_a, control_b)) => {
                    let points = bundled_curve(
                        start,
                        world_to_screen(rect, pan, zoom, control_a),
                        world_to_screen(rect, pan, zoom, control_b),
                        end,
                        BUNDLE_SEGMENTS,
                    );
                    draw_polyline(&painter, &points, stroke);
                }
                None => {
                    painter.line_segment([start, end], stroke);
                }
            }
            visible_edge_count += 1;
        }
        self.visible_edge_count = visible_edge_count;

        let selected_color = Color32::from_rgb(245, 206, 93);
        for index in 0..cache.nodes.len() {
            if !cache.view_scratch.visible_mask[index] {
                continue;
            }

            let render_node = &cache.nodes[index];
            let body = &cache.bodies[index];
            let position = cache.view_scratch.screen_positions[index];
            let radius = cache.view_scratch.screen_radii[index];

            let is_selected = selected_key.as_deref() == Some(render_node.key.as_str());
            let is_hovered = hovered == Some(HoverTarget::Node(index));
            let in_highlight = highlight
                .as_ref()
                .is_some_and(|state| state.contains_node(index));
            let is_pseudo_match = pseudo_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));

            let base_color = group_color(body.group);
            let color = if is_selected {
                blend_color(base_color, selected_color, 0.75)
            } else if is_hovered {
                blend_color(base_color, Color32::from_rgb(255, 164, 101), 0.6)
            } else if is_pseudo_match {
                blend_color(base_color, Color32::from_rgb(103, 196, 255), 0.65)
            } else if highlight_active && !in_highlight {
                dim_color(base_color, 0.4)
            } else if pseudo_active {
                dim_color(base_color, 0.38)
            } else {
                base_color
            };

            painter.circle_filled(position, radius, color);
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(15, 15, 15, 190)),
            );
            // Authors carry an extra ring so the two node kinds read apart
            // even with grouping colors on.
            if render_node.class == NodeClass::Author {
                painter.circle_stroke(
                    position,
                    radius + 2.0,
                    Stroke::new(1.2, Color32::from_rgba_unmultiplied(225, 225, 225, 140)),
                );
            }
            if is_selected {
                painter.circle_stroke(
                    position,
                    radius + 4.0,
                    Stroke::new(1.6, Color32::from_rgba_unmultiplied(245, 206, 93, 170)),
                );
            }

            let should_draw_label = is_selected
                || is_hovered
                || in_highlight
                || (is_pseudo_match && zoom > 0.35)
                || radius > 17.0
                || zoom > 1.35;
            if should_draw_label {
                painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    short_label(&render_node.label),
                    FontId::proportional(12.0),
                    Color32::from_gray(238),
                );
            }
        }

        let hover_line = match hovered {
            Some(HoverTarget::Node(index)) => Self::hover_text(&self.graph, index, cache),
            Some(HoverTarget::Edge(edge_index)) => {
                cache.edges.get(edge_index).map(|edge| {
                    let source = short_label(&cache.nodes[edge.source].label).to_owned();
                    let target = short_label(&cache.nodes[edge.target].label).to_owned();
                    match edge.style {
                        EdgeStyle::Citation => format!("{source} cites {target}"),
                        EdgeStyle::Authorship => format!("{target} authored {source}"),
                        EdgeStyle::Collaboration => format!(
                            "{source} and {target}  |  {} shared papers",
                            edge.weight as u32
                        ),
                        EdgeStyle::Link => format!("{source} - {target}"),
                    }
                })
            }
            None => None,
        };
        if let Some(text) = hover_line {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if let Some(selected) = pending_selection {
            self.apply_graph_selection(selected);
        }
    }
}
