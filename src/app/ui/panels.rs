use std::path::Path;

use collab_graph::Config;
use collab_graph::interaction::DragController;
use collab_graph::network::{LoadedNetwork, NetworkSource, rank_key_players};
use collab_graph::sim::Simulation;
use eframe::egui::{self, Align, Context, Layout, Vec2};

use super::super::{ViewModel, ViewScratch};

impl ViewModel {
    pub(in crate::app) const KEY_PLAYER_ROWS: usize = 10;

    pub(in crate::app) fn new(network: LoadedNetwork, config: Config) -> Self {
        let sim = Simulation::for_graph(&network.graph, &config);
        let drags = DragController::new(network.graph.node_count(), config.interaction);
        let key_players = rank_key_players(&network.graph, Self::KEY_PLAYER_ROWS);

        Self {
            network,
            config,
            sim,
            drags,
            key_players,
            search: String::new(),
            search_match_cache: None,
            selected: None,
            dragged: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
            reload_error: None,
            view_scratch: ViewScratch::default(),
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        input: &Path,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("collab-graph");
                    ui.separator();
                    ui.label(format!("input: {}", input.display()));
                    ui.label(match self.network.source {
                        NetworkSource::Documents { count } => format!("{count} documents"),
                        NetworkSource::Analysis => "analysis payload".to_owned(),
                    });
                    ui.label(format!("nodes: {}", self.network.graph.node_count()));
                    ui.label(format!("edges: {}", self.network.graph.edge_count()));

                    let reload_button =
                        ui.add_enabled(!is_reloading, egui::Button::new("Reload"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if is_reloading {
                        ui.spinner();
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!(
                            "{} ticks, alpha {:.3}",
                            self.sim.total_ticks(),
                            self.sim.alpha()
                        ));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                if self.network.graph.is_empty() {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("The network is empty.");
                    });
                } else {
                    self.draw_graph(ui);
                }
            });
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<usize>) {
        self.selected = selected.filter(|&index| index < self.network.graph.node_count());
    }
}
