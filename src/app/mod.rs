use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use collab_graph::Config;
use collab_graph::interaction::DragController;
use collab_graph::network::{KeyPlayer, LoadedNetwork, load_network};
use collab_graph::sim::Simulation;
use eframe::egui::{self, Context, Pos2, Vec2};
use tracing::{error, info};

mod graph;
mod render_utils;
mod ui;

type LoadResult = Result<LoadedNetwork, String>;

pub struct CollabGraphApp {
    input: PathBuf,
    config: Config,
    state: AppState,
    reload_rx: Option<Receiver<LoadResult>>,
}

enum AppState {
    Loading { rx: Receiver<LoadResult> },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    network: LoadedNetwork,
    config: Config,
    sim: Simulation,
    drags: DragController,
    key_players: Vec<KeyPlayer>,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    selected: Option<usize>,
    /// Node held by the primary pointer, if any.
    dragged: Option<usize>,
    pan: Vec2,
    zoom: f32,
    /// Last failed reload; the graph on screen is the last one that loaded.
    reload_error: Option<String>,
    view_scratch: ViewScratch,
}

struct SearchMatchCache {
    query: String,
    matches: Arc<HashSet<usize>>,
}

#[derive(Default)]
struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
    visible_indices: Vec<usize>,
}

impl CollabGraphApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, input: PathBuf, config: Config) -> Self {
        let state = Self::start_load(input.clone());
        Self {
            input,
            config,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(input: PathBuf) -> Receiver<LoadResult> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_network(&input).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(input: PathBuf) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(input),
        }
    }
}

impl eframe::App for CollabGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(network)) => {
                        transition = Some(AppState::Ready(Box::new(ViewModel::new(
                            network,
                            self.config,
                        ))));
                    }
                    Ok(Err(message)) => {
                        error!(%message, "initial load failed");
                        transition = Some(AppState::Error(message));
                    }
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition =
                            Some(AppState::Error("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading collaboration network...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(message) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load collaboration network");
                    ui.add_space(6.0);
                    ui.label(message.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.input.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(ctx, &self.input, &mut reload_requested, is_reloading);

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.input.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(Ok(network)) => {
                            info!(nodes = network.graph.node_count(), "network reloaded");
                            let config = model.config;
                            transition =
                                Some(AppState::Ready(Box::new(ViewModel::new(network, config))));
                        }
                        Ok(Err(message)) => {
                            error!(%message, "reload failed; keeping the current graph");
                            model.reload_error = Some(message);
                        }
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            model.reload_error =
                                Some("Background load worker disconnected".to_owned());
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
