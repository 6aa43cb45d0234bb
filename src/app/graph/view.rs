use std::collections::HashSet;
use std::sync::Arc;

use collab_graph::encoding::{node_radius, snapshot};
use eframe::egui::{self, Align2, Color32, FontId, PointerButton, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::render_utils::{
    Viewport, blend_color, circle_visible, dim_color, draw_background, edge_visible, node_color,
};
use super::super::{SearchMatchCache, ViewModel};

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    fn update_screen_space(&mut self, viewport: Viewport) {
        let scratch = &mut self.view_scratch;
        scratch.screen_positions.clear();
        scratch.screen_radii.clear();
        scratch.visible_indices.clear();

        let graph = &self.network.graph;
        for (index, state) in self.sim.nodes().iter().enumerate().take(graph.node_count()) {
            let position = viewport.to_screen(state.position);
            let centrality = graph.degree_centrality(index);
            let radius = (node_radius(centrality, &self.config.encoding) * viewport.zoom.sqrt())
                .clamp(2.5, 48.0);
            scratch.screen_positions.push(position);
            scratch.screen_radii.push(radius);
            if circle_visible(viewport.rect, position, radius) {
                scratch.visible_indices.push(index);
            }
        }
    }

    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .network
            .graph
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| {
                fuzzy_match_score(&matcher, &node.label, query).is_some()
                    || fuzzy_match_score(&matcher, &node.id, query).is_some()
            })
            .map(|(index, _)| index)
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            matches: Arc::clone(&matches),
        });
        Some(matches)
    }

    /// One frame of the canvas: input, then at most one simulation tick,
    /// then paint from a snapshot of the post-tick state.
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.handle_graph_zoom(ui, rect, &response);
        self.update_screen_space(self.viewport(rect));
        self.handle_node_drag(ui, &response, self.viewport(rect));
        self.handle_graph_pan(&response);

        let hovered = self.hovered_index(ui, rect);
        if response.clicked_by(PointerButton::Primary) {
            self.selected = hovered;
        }
        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = if self.dragged.is_some() {
                    egui::CursorIcon::Grabbing
                } else {
                    egui::CursorIcon::Grab
                };
            });
        }

        if self.sim.is_running() {
            self.sim.tick();
            ui.ctx().request_repaint();
        }

        let viewport = self.viewport(rect);
        draw_background(&painter, viewport);
        self.update_screen_space(viewport);

        let frame = snapshot(&self.network.graph, &self.sim, &self.config.encoding);
        let search_matches = self.cached_search_matches();
        let focus = self.selected.or(hovered);
        let zoom_sqrt = viewport.zoom.sqrt();

        for (edge, geometry) in self.network.graph.edges.iter().zip(&frame.edges) {
            let start = viewport.to_screen(vec2(geometry.x1, geometry.y1));
            let end = viewport.to_screen(vec2(geometry.x2, geometry.y2));
            if !edge_visible(rect, start, end, 2.0) {
                continue;
            }

            let touches_focus =
                focus.is_some_and(|index| edge.source == index || edge.target == index);
            let color = if touches_focus {
                Color32::from_rgba_unmultiplied(51, 65, 85, 220)
            } else if focus.is_some() || search_matches.is_some() {
                Color32::from_rgba_unmultiplied(148, 163, 184, 70)
            } else {
                Color32::from_rgba_unmultiplied(148, 163, 184, 150)
            };
            let width = (geometry.stroke_width * zoom_sqrt).clamp(0.6, 8.0);
            painter.line_segment([start, end], Stroke::new(width, color));
        }

        let search_active = search_matches
            .as_ref()
            .is_some_and(|matches| !matches.is_empty());
        for &index in &self.view_scratch.visible_indices {
            let Some(node) = frame.nodes.get(index) else {
                continue;
            };
            let position = self.view_scratch.screen_positions[index];
            let radius = self.view_scratch.screen_radii[index];

            let is_selected = self.selected == Some(index);
            let is_hovered = hovered == Some(index);
            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));

            let base = node_color(node.category);
            let color = if is_hovered {
                blend_color(base, Color32::WHITE, 0.25)
            } else if search_active && !is_match {
                dim_color(base, 0.45)
            } else {
                base
            };

            painter.circle_filled(position, radius, color);
            let outline = if is_selected {
                Stroke::new(2.4, Color32::from_rgb(15, 23, 42))
            } else if node.pinned {
                Stroke::new(2.0, Color32::from_rgb(234, 88, 12))
            } else if is_match {
                Stroke::new(1.8, Color32::from_rgb(14, 165, 233))
            } else {
                Stroke::new(1.0, Color32::WHITE)
            };
            painter.circle_stroke(position, radius, outline);

            let show_label = is_selected
                || is_hovered
                || (is_match && viewport.zoom > 0.5)
                || radius > 18.0
                || viewport.zoom > 1.6;
            if show_label {
                painter.text(
                    position + vec2(radius + 4.0, 0.0),
                    Align2::LEFT_CENTER,
                    &node.label,
                    FontId::proportional(12.0),
                    Color32::from_rgb(30, 41, 59),
                );
            }
        }

        if let Some(node) = hovered.and_then(|index| self.network.graph.nodes.get(index)) {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!(
                    "{}  |  {}  |  degree {}  |  cluster {}",
                    node.label,
                    node.kind.label(),
                    node.degree,
                    node.cluster
                ),
                FontId::proportional(13.0),
                Color32::from_rgb(15, 23, 42),
            );
        }

        painter.text(
            rect.left_bottom() + vec2(10.0, -10.0),
            Align2::LEFT_BOTTOM,
            format!(
                "tick {}  |  alpha {:.3}  |  {}",
                frame.tick,
                frame.alpha,
                if frame.converged { "settled" } else { "running" }
            ),
            FontId::monospace(11.0),
            Color32::from_rgb(100, 116, 139),
        );
    }
}
