use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Every tunable of the layout pipeline. Missing fields in a config file fall
/// back to the defaults below.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationConfig,
    pub encoding: EncodingConfig,
    pub interaction: InteractionConfig,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid config JSON in {}", path.display()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Canvas size; the centering force pulls toward its midpoint.
    pub width: f32,
    pub height: f32,
    /// Starting energy of a fresh simulation.
    pub alpha: f32,
    pub alpha_min: f32,
    /// Per-tick fraction of the gap between `alpha` and the target that is closed.
    pub alpha_decay: f32,
    pub alpha_target: f32,
    /// Velocity multiplier applied after every integration step.
    pub velocity_decay: f32,
    /// Many-body charge; negative values repel.
    pub charge_strength: f32,
    /// Distance floor for the charge force.
    pub charge_min_distance: f32,
    /// Barnes-Hut opening angle.
    pub theta: f32,
    /// Graphs smaller than this use exact pairwise repulsion and collision.
    pub exact_below: usize,
    /// Link rest length is `link_distance + link_distance_spread / weight`.
    pub link_distance: f32,
    pub link_distance_spread: f32,
    pub link_strength: f32,
    pub center_strength: f32,
    pub collision_padding: f32,
    pub collision_strength: f32,
    /// Tick budget for one run; a restart grants a fresh budget.
    pub max_ticks: usize,
}

impl SimulationConfig {
    pub fn center(&self) -> (f32, f32) {
        (self.width * 0.5, self.height * 0.5)
    }

    pub fn link_rest_length(&self, weight: f32) -> f32 {
        self.link_distance + self.link_distance_spread / weight.max(f32::EPSILON)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let alpha_min = 0.001_f32;
        Self {
            width: 980.0,
            height: 600.0,
            alpha: 1.0,
            alpha_min,
            alpha_decay: 1.0 - alpha_min.powf(1.0 / 300.0),
            alpha_target: 0.0,
            velocity_decay: 0.6,
            charge_strength: -120.0,
            charge_min_distance: 1.0,
            theta: 0.72,
            exact_below: 64,
            link_distance: 30.0,
            link_distance_spread: 20.0,
            link_strength: 1.0,
            center_strength: 0.1,
            collision_padding: 2.0,
            collision_strength: 0.7,
            max_ticks: 1000,
        }
    }
}

/// Constants of `radius = base_radius + min(radius_cap, centrality * degree_scale)`,
/// where centrality is degree centrality in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    pub base_radius: f32,
    pub radius_cap: f32,
    pub degree_scale: f32,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            base_radius: 6.0,
            radius_cap: 10.0,
            degree_scale: 20.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// `alpha_target` while at least one node is being dragged.
    pub drag_alpha_target: f32,
    pub resting_alpha_target: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_alpha_target: 0.3,
            resting_alpha_target: 0.0,
        }
    }
}
