mod app;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use collab_graph::Config;
use collab_graph::encoding::layout_report;
use collab_graph::network::load_network;
use collab_graph::sim::Simulation;
use tracing::info;
use tracing_subscriber::EnvFilter;

const REPORT_PLAYERS: usize = 10;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON array of source documents, or a pre-built `{nodes, edges}` payload.
    input: PathBuf,
    /// JSON file overriding any subset of the layout parameters.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    width: Option<f32>,
    #[arg(long)]
    height: Option<f32>,
    #[arg(long)]
    max_ticks: Option<usize>,
    /// Lay out to convergence and print the final snapshot as JSON.
    #[arg(long)]
    headless: bool,
}

impl Args {
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(width) = self.width {
            config.simulation.width = width;
        }
        if let Some(height) = self.height {
            config.simulation.height = height;
        }
        if let Some(max_ticks) = self.max_ticks {
            config.simulation.max_ticks = max_ticks;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = args.resolve_config()?;

    if args.headless {
        return run_headless(&args, &config);
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };
    let input = args.input.clone();
    eframe::run_native(
        "collab-graph",
        options,
        Box::new(move |cc| Ok(Box::new(app::CollabGraphApp::new(cc, input, config)))),
    )
    .map_err(|error| anyhow!("viewer failed: {error}"))
}

fn run_headless(args: &Args, config: &Config) -> Result<()> {
    let network = load_network(&args.input)?;
    let mut sim = Simulation::for_graph(&network.graph, config);
    let ticks = sim.run();
    info!(ticks, alpha = sim.alpha(), "layout finished");

    let report = layout_report(&network, &sim, &config.encoding, REPORT_PLAYERS);
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report).context("failed to write snapshot")?;
    writeln!(stdout).context("failed to write snapshot")?;
    Ok(())
}
