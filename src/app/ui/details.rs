use eframe::egui::{self, Color32, RichText, Ui};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        if let Some(message) = &self.reload_error {
            ui.label(
                RichText::new("Reload failed; showing the previous graph.").color(Color32::RED),
            );
            ui.small(message.as_str());
            ui.separator();
        }

        ui.heading("Network");
        let metrics = self.network.metrics;
        ui.label(format!("Active players: {}", metrics.active_players));
        ui.label(format!("Collaborations: {}", metrics.total_collaborations));
        ui.label(format!("Research clusters: {}", metrics.cluster_count));

        ui.separator();
        ui.label(RichText::new("Key players").strong());
        if self.key_players.is_empty() {
            ui.label("No authors or institutions in this network.");
        }
        let mut clicked = None;
        for player in &self.key_players {
            let Some(node) = self.network.graph.nodes.get(player.index) else {
                continue;
            };
            let text = format!("{}  ({:.3})", node.label, player.score);
            if ui.link(text).on_hover_text(node.id.as_str()).clicked() {
                clicked = Some(player.index);
            }
        }

        ui.separator();
        ui.heading("Selection");
        let selection = self
            .selected
            .and_then(|index| self.network.graph.nodes.get(index).map(|node| (index, node)));
        match selection {
            None => {
                ui.label("Click a node to inspect it.");
            }
            Some((index, node)) => {
                ui.label(RichText::new(node.label.as_str()).strong());
                ui.small(node.id.as_str());
                ui.label(format!("Type: {}", node.kind.label()));
                ui.label(format!("Degree: {}", node.degree));
                ui.label(format!("Cluster: {}", node.cluster));
                if let Some(centrality) = node.centrality {
                    ui.label(format!("Degree centrality: {centrality:.3}"));
                }
                if let Some(betweenness) = node.betweenness {
                    ui.label(format!("Betweenness: {betweenness:.3}"));
                }
                if self.sim.nodes().get(index).is_some_and(|state| state.is_pinned()) {
                    ui.label("Pinned while dragged.");
                }

                ui.add_space(4.0);
                ui.label(RichText::new("Connections").strong());
                egui::ScrollArea::vertical()
                    .id_salt("connections_scroll")
                    .max_height(220.0)
                    .show(ui, |ui| {
                        for edge in &self.network.graph.edges {
                            let other = if edge.source == index {
                                edge.target
                            } else if edge.target == index {
                                edge.source
                            } else {
                                continue;
                            };
                            let Some(neighbor) = self.network.graph.nodes.get(other) else {
                                continue;
                            };
                            let text =
                                format!("{}  {}  (w {})", edge.relation, neighbor.label, edge.weight);
                            if ui.link(text).clicked() {
                                clicked = Some(other);
                            }
                        }
                    });
            }
        }

        if !self.network.warnings.is_empty() {
            ui.separator();
            egui::CollapsingHeader::new(format!("Input warnings ({})", self.network.warnings.len()))
                .id_salt("input_warnings")
                .show(ui, |ui| {
                    egui::ScrollArea::vertical()
                        .id_salt("warnings_scroll")
                        .max_height(200.0)
                        .show(ui, |ui| {
                            for warning in &self.network.warnings {
                                ui.small(warning.to_string());
                            }
                        });
                });
        }

        if clicked.is_some() {
            self.set_selected(clicked);
        }
    }
}
