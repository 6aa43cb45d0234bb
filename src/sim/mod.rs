mod forces;
mod quadtree;

use std::f32::consts::PI;

use eframe::egui::{Vec2, vec2};
use tracing::{debug, warn};

use crate::config::{Config, SimulationConfig};
use crate::encoding::node_radii;
use crate::network::GraphModel;
use forces::{
    ChargeParams, CollisionParams, Link, collide_cells, collide_exact, pull_links,
    pull_to_center, repel_approximate, repel_exact,
};
use quadtree::Cell;

const SEED_RADIUS: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimulationStatus {
    /// More ticks should be scheduled.
    Running,
    /// `alpha` fell below `alpha_min` or the tick budget ran out.
    Converged,
    /// Paused by the host; `restart` resumes it.
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimNode {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Set while the node is pinned; integration holds it here.
    pub fixed: Option<Vec2>,
    /// Collision radius, visual radius plus padding.
    pub radius: f32,
}

impl SimNode {
    pub fn is_pinned(&self) -> bool {
        self.fixed.is_some()
    }
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    radii: Vec<f32>,
    pinned: Vec<bool>,
    forces: Vec<Vec2>,
}

/// Owns every node position for one laid-out graph. Ticks are driven by the
/// host, one per call, and never overlap because `tick` takes `&mut self`.
/// Dropping the simulation is cancellation.
pub struct Simulation {
    config: SimulationConfig,
    nodes: Vec<SimNode>,
    links: Vec<Link>,
    alpha: f32,
    alpha_target: f32,
    run_ticks: usize,
    total_ticks: usize,
    status: SimulationStatus,
    scratch: Scratch,
}

impl Simulation {
    /// `radii` are the visual radii per node, in graph order.
    pub fn new(graph: &GraphModel, radii: &[f32], config: SimulationConfig) -> Self {
        let (center_x, center_y) = config.center();
        let center = vec2(center_x, center_y);
        let golden_angle = PI * (3.0 - 5.0_f32.sqrt());

        let nodes = (0..graph.node_count())
            .map(|index| {
                let radius = SEED_RADIUS * (0.5 + index as f32).sqrt();
                let angle = index as f32 * golden_angle;
                SimNode {
                    position: center + vec2(angle.cos(), angle.sin()) * radius,
                    velocity: Vec2::ZERO,
                    fixed: None,
                    radius: radii.get(index).copied().unwrap_or(0.0) + config.collision_padding,
                }
            })
            .collect::<Vec<_>>();

        let mut link_counts = vec![0usize; nodes.len()];
        for edge in graph.edges.iter().filter(|edge| !edge.is_self_loop()) {
            link_counts[edge.source] += 1;
            link_counts[edge.target] += 1;
        }
        let links = graph
            .edges
            .iter()
            .filter(|edge| !edge.is_self_loop())
            .map(|edge| {
                let source_count = link_counts[edge.source] as f32;
                let target_count = link_counts[edge.target] as f32;
                Link {
                    source: edge.source,
                    target: edge.target,
                    weight: edge.weight,
                    stiffness: 1.0 / source_count.min(target_count).max(1.0),
                    bias: source_count / (source_count + target_count),
                }
            })
            .collect::<Vec<_>>();

        let status = if nodes.is_empty() {
            SimulationStatus::Converged
        } else {
            SimulationStatus::Running
        };
        debug!(nodes = nodes.len(), links = links.len(), "simulation created");

        Self {
            alpha: config.alpha.clamp(0.0, 1.0),
            alpha_target: config.alpha_target.clamp(0.0, 1.0),
            config,
            nodes,
            links,
            run_ticks: 0,
            total_ticks: 0,
            status,
            scratch: Scratch::default(),
        }
    }

    /// Sizes collision radii from the degree encoding.
    pub fn for_graph(graph: &GraphModel, config: &Config) -> Self {
        let radii = node_radii(graph, &config.encoding);
        Self::new(graph, &radii, config.simulation)
    }

    /// Advances one tick if the simulation is running and reports whether
    /// another one should be scheduled.
    pub fn tick(&mut self) -> SimulationStatus {
        if self.status != SimulationStatus::Running {
            return self.status;
        }

        self.sanitize();
        self.accumulate_forces();
        self.integrate();
        self.sanitize();

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        self.run_ticks += 1;
        self.total_ticks += 1;

        if self.alpha < self.config.alpha_min {
            self.status = SimulationStatus::Converged;
            debug!(ticks = self.total_ticks, alpha = self.alpha, "simulation converged");
        } else if self.run_ticks >= self.config.max_ticks {
            self.status = SimulationStatus::Converged;
            debug!(
                ticks = self.total_ticks,
                alpha = self.alpha,
                "simulation tick budget exhausted"
            );
        }
        self.status
    }

    /// Ticks until the simulation stops asking for more; returns the number
    /// of ticks taken.
    pub fn run(&mut self) -> usize {
        let start = self.total_ticks;
        while self.tick() == SimulationStatus::Running {}
        self.total_ticks - start
    }

    /// Schedules ticks again with a fresh tick budget. An empty simulation
    /// stays converged.
    pub fn restart(&mut self) {
        if self.nodes.is_empty() {
            return;
        }
        if self.status != SimulationStatus::Running {
            debug!(alpha = self.alpha, "simulation restarted");
        }
        self.status = SimulationStatus::Running;
        self.run_ticks = 0;
    }

    pub fn stop(&mut self) {
        if self.status == SimulationStatus::Running {
            self.status = SimulationStatus::Stopped;
        }
    }

    /// Raises `alpha` to at least `alpha` and restarts.
    pub fn reheat(&mut self, alpha: f32) {
        self.alpha = self.alpha.max(alpha.clamp(0.0, 1.0));
        self.restart();
    }

    pub fn set_alpha_target(&mut self, target: f32) {
        self.alpha_target = target.clamp(0.0, 1.0);
    }

    /// Applies new force parameters; positions and alpha are kept.
    pub fn set_config(&mut self, config: SimulationConfig) {
        let padding_delta = config.collision_padding - self.config.collision_padding;
        for node in &mut self.nodes {
            node.radius += padding_delta;
        }
        self.config = config;
    }

    /// Moves a free node; pinned nodes and non-finite positions are refused.
    pub fn place(&mut self, index: usize, position: Vec2) -> bool {
        match self.nodes.get_mut(index) {
            Some(node) if position.is_finite() && !node.is_pinned() => {
                node.position = position;
                node.velocity = Vec2::ZERO;
                true
            }
            _ => false,
        }
    }

    /// Holds a node at `position` until `unpin`. The node still exerts
    /// forces on the others.
    pub fn pin(&mut self, index: usize, position: Vec2) -> bool {
        match self.nodes.get_mut(index) {
            Some(node) if position.is_finite() => {
                node.fixed = Some(position);
                node.position = position;
                node.velocity = Vec2::ZERO;
                true
            }
            _ => false,
        }
    }

    pub fn unpin(&mut self, index: usize) -> bool {
        match self.nodes.get_mut(index) {
            Some(node) => {
                node.fixed = None;
                true
            }
            None => false,
        }
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn position(&self, index: usize) -> Option<Vec2> {
        self.nodes.get(index).map(|node| node.position)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn status(&self) -> SimulationStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == SimulationStatus::Running
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn total_ticks(&self) -> usize {
        self.total_ticks
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    fn center(&self) -> Vec2 {
        let (x, y) = self.config.center();
        vec2(x, y)
    }

    fn sanitize(&mut self) {
        let center = self.center();
        let mut reset = 0usize;
        for node in &mut self.nodes {
            if !node.position.is_finite() {
                node.position = node.fixed.unwrap_or(center);
                node.velocity = Vec2::ZERO;
                reset += 1;
            } else if !node.velocity.is_finite() {
                node.velocity = Vec2::ZERO;
                reset += 1;
            }
        }
        if reset > 0 {
            warn!(reset, "non-finite node geometry reset");
        }
    }

    fn accumulate_forces(&mut self) {
        let center = self.center();
        let scratch = &mut self.scratch;
        let node_count = self.nodes.len();

        scratch.positions.clear();
        scratch.radii.clear();
        scratch.pinned.clear();
        let mut max_radius = 0.0_f32;
        for node in &self.nodes {
            scratch.positions.push(node.position);
            scratch.radii.push(node.radius);
            scratch.pinned.push(node.is_pinned());
            max_radius = max_radius.max(node.radius);
        }
        scratch.forces.clear();
        scratch.forces.resize(node_count, Vec2::ZERO);

        let positions = &scratch.positions;
        let radii = &scratch.radii;
        let forces = &mut scratch.forces;
        let charge = ChargeParams::from_config(&self.config);

        if node_count < self.config.exact_below {
            repel_exact(positions, charge, forces);
            collide_exact(positions, radii, self.config.collision_strength, forces);
        } else if let Some(root) = Cell::build(positions) {
            for (index, force) in forces.iter_mut().enumerate() {
                repel_approximate(&root, index, positions, charge, force);
            }

            let reach = max_radius * 2.0;
            if reach > 0.0 {
                collide_cells(
                    &root,
                    &root,
                    true,
                    positions,
                    radii,
                    CollisionParams {
                        strength: self.config.collision_strength,
                        reach_sq: reach * reach,
                    },
                    forces,
                );
            }
        }

        pull_links(&self.links, positions, &self.config, forces);
        pull_to_center(
            positions,
            &scratch.pinned,
            center,
            self.config.center_strength,
            forces,
        );
    }

    fn integrate(&mut self) {
        let alpha = self.alpha;
        let decay = self.config.velocity_decay;
        for (node, force) in self.nodes.iter_mut().zip(&self.scratch.forces) {
            if let Some(fixed) = node.fixed {
                node.position = fixed;
                node.velocity = Vec2::ZERO;
                continue;
            }

            node.velocity = (node.velocity + *force * alpha) * decay;
            node.position += node.velocity;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{RawEdge, RawNode, compute_metrics};

    fn graph(node_count: usize, edges: &[(usize, usize)]) -> GraphModel {
        let nodes = (0..node_count).map(|index| RawNode {
            id: format!("n{index}"),
            ..RawNode::default()
        });
        let edges = edges
            .iter()
            .map(|(from, to)| RawEdge::new(format!("n{from}"), format!("n{to}")));
        let (mut graph, _) = GraphModel::build(nodes, edges);
        compute_metrics(&mut graph);
        graph
    }

    fn simulation(node_count: usize, edges: &[(usize, usize)]) -> Simulation {
        Simulation::for_graph(&graph(node_count, edges), &Config::default())
    }

    #[test]
    fn empty_graph_is_converged_without_ticking() {
        let mut sim = simulation(0, &[]);
        assert_eq!(sim.status(), SimulationStatus::Converged);
        assert_eq!(sim.tick(), SimulationStatus::Converged);
        assert_eq!(sim.run(), 0);
        assert_eq!(sim.total_ticks(), 0);

        sim.restart();
        assert_eq!(sim.status(), SimulationStatus::Converged);
    }

    #[test]
    fn alpha_decreases_every_tick_until_converged() {
        let edges = (1..200)
            .map(|index| (index, index / 2))
            .chain((0..60).map(|index| (index, index + 100)))
            .collect::<Vec<_>>();
        let mut sim = simulation(200, &edges);

        let mut previous = sim.alpha();
        let mut ticks = 0;
        while sim.tick() == SimulationStatus::Running {
            assert!(sim.alpha() < previous);
            previous = sim.alpha();
            ticks += 1;
            assert!(ticks <= 500, "did not converge");
        }

        assert!(sim.alpha() < sim.config().alpha_min);
        assert!(sim.nodes().iter().all(|node| node.position.is_finite()));
    }

    #[test]
    fn coincident_nodes_separate_after_one_tick() {
        let mut sim = simulation(2, &[]);
        assert!(sim.place(0, vec2(100.0, 100.0)));
        assert!(sim.place(1, vec2(100.0, 100.0)));

        sim.tick();

        let a = sim.position(0).unwrap();
        let b = sim.position(1).unwrap();
        assert!(a.is_finite() && b.is_finite());
        assert_ne!(a, b);
    }

    #[test]
    fn non_finite_geometry_is_reset_to_center() {
        let mut sim = simulation(3, &[(0, 1), (1, 2)]);
        sim.nodes[1].position = vec2(f32::NAN, 4.0);
        sim.nodes[2].velocity = vec2(f32::INFINITY, 0.0);

        sim.tick();

        assert!(sim.nodes().iter().all(|node| node.position.is_finite()));
        assert!(sim.nodes().iter().all(|node| node.velocity.is_finite()));
    }

    #[test]
    fn non_finite_positions_are_refused() {
        let mut sim = simulation(1, &[]);
        assert!(!sim.place(0, vec2(f32::NAN, 0.0)));
        assert!(!sim.pin(0, vec2(0.0, f32::INFINITY)));
        assert!(!sim.place(7, vec2(0.0, 0.0)));
    }

    #[test]
    fn pinned_node_holds_its_fixed_position() {
        let mut sim = simulation(5, &[(0, 1), (0, 2), (0, 3), (3, 4)]);
        let anchor = vec2(12.5, -40.25);
        assert!(sim.pin(0, anchor));

        for _ in 0..25 {
            sim.tick();
            assert_eq!(sim.position(0), Some(anchor));
        }

        sim.unpin(0);
        sim.tick();
        assert_ne!(sim.position(0), Some(anchor));
    }

    #[test]
    fn links_draw_distant_endpoints_in() {
        let mut sim = simulation(2, &[(0, 1)]);
        sim.place(0, vec2(0.0, 300.0));
        sim.place(1, vec2(900.0, 300.0));

        sim.run();

        let distance = (sim.position(0).unwrap() - sim.position(1).unwrap()).length();
        assert!(distance < 300.0, "distance {distance}");
    }

    #[test]
    fn centroid_settles_on_canvas_center() {
        let mut sim = simulation(10, &[]);
        for index in 0..10 {
            let angle = index as f32 * 0.628;
            sim.place(index, vec2(800.0, 500.0) + vec2(angle.cos(), angle.sin()) * 60.0);
        }

        sim.run();

        let centroid = sim
            .nodes()
            .iter()
            .fold(Vec2::ZERO, |sum, node| sum + node.position)
            / 10.0;
        assert!((centroid - vec2(490.0, 300.0)).length() < 5.0, "{centroid:?}");
    }

    #[test]
    fn stop_halts_ticks_until_restart() {
        let mut sim = simulation(4, &[(0, 1)]);
        sim.tick();
        sim.stop();
        let frozen = sim.nodes().to_vec();

        assert_eq!(sim.tick(), SimulationStatus::Stopped);
        assert_eq!(sim.nodes(), frozen.as_slice());
        assert_eq!(sim.total_ticks(), 1);

        sim.restart();
        assert_eq!(sim.tick(), SimulationStatus::Running);
        assert_eq!(sim.total_ticks(), 2);
    }

    #[test]
    fn tick_budget_caps_a_run() {
        let config = Config {
            simulation: SimulationConfig {
                max_ticks: 10,
                alpha_target: 0.5,
                ..SimulationConfig::default()
            },
            ..Config::default()
        };
        let mut sim = Simulation::for_graph(&graph(3, &[(0, 1)]), &config);

        assert_eq!(sim.run(), 10);
        assert_eq!(sim.status(), SimulationStatus::Converged);
        sim.restart();
        assert_eq!(sim.run(), 10);
    }

    #[test]
    fn reheat_never_lowers_alpha() {
        let mut sim = simulation(3, &[(0, 1)]);
        sim.run();
        let cooled = sim.alpha();

        sim.reheat(0.0);
        assert_eq!(sim.alpha(), cooled);
        sim.reheat(0.5);
        assert_eq!(sim.alpha(), 0.5);
        assert!(sim.is_running());
    }

    #[test]
    fn identical_inputs_produce_identical_layouts() {
        let edges = [(0, 1), (1, 2), (2, 3), (3, 0), (4, 5)];
        let mut first = simulation(8, &edges);
        let mut second = simulation(8, &edges);
        first.run();
        second.run();
        assert_eq!(first.nodes(), second.nodes());
    }
}
