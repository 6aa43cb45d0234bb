use serde::Serialize;

use crate::config::EncodingConfig;
use crate::network::{GraphModel, LoadedNetwork, NetworkMetrics, NodeKind, rank_key_players};
use crate::sim::Simulation;

const PALETTE: [(NodeKind, [u8; 3]); 4] = [
    (NodeKind::Author, [0x25, 0x63, 0xeb]),
    (NodeKind::Institution, [0x16, 0xa3, 0x4a]),
    (NodeKind::Document, [0x93, 0x33, 0xea]),
    (NodeKind::Keyword, [0xf5, 0x9e, 0x0b]),
];

/// `base_radius + min(radius_cap, centrality * degree_scale)`, with the
/// centrality clamped to `[0, 1]`.
pub fn node_radius(centrality: f32, config: &EncodingConfig) -> f32 {
    let centrality = if centrality.is_finite() {
        centrality.clamp(0.0, 1.0)
    } else {
        0.0
    };
    config.base_radius + (centrality * config.degree_scale).min(config.radius_cap)
}

pub fn node_radii(graph: &GraphModel, config: &EncodingConfig) -> Vec<f32> {
    (0..graph.node_count())
        .map(|index| node_radius(graph.degree_centrality(index), config))
        .collect()
}

pub fn stroke_width(weight: f32) -> f32 {
    weight.sqrt().max(1.0)
}

pub fn kind_color(kind: NodeKind) -> [u8; 3] {
    PALETTE
        .iter()
        .find(|(entry, _)| *entry == kind)
        .map(|(_, rgb)| *rgb)
        .unwrap_or([0x94, 0xa3, 0xb8])
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeSnapshot {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub category: NodeKind,
    pub label: String,
    pub cluster: usize,
    pub pinned: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EdgeSnapshot {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub stroke_width: f32,
}

/// Immutable copy of one tick's geometry, in graph order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub tick: usize,
    pub alpha: f32,
    pub converged: bool,
    pub nodes: Vec<NodeSnapshot>,
    pub edges: Vec<EdgeSnapshot>,
}

pub fn snapshot(graph: &GraphModel, sim: &Simulation, config: &EncodingConfig) -> FrameSnapshot {
    let positions = sim.nodes();

    let nodes = graph
        .nodes
        .iter()
        .zip(positions)
        .enumerate()
        .map(|(index, (node, state))| NodeSnapshot {
            id: node.id.clone(),
            x: state.position.x,
            y: state.position.y,
            radius: node_radius(graph.degree_centrality(index), config),
            category: node.kind,
            label: node.label.clone(),
            cluster: node.cluster,
            pinned: state.is_pinned(),
        })
        .collect();

    let edges = graph
        .edges
        .iter()
        .filter_map(|edge| {
            let start = positions.get(edge.source)?.position;
            let end = positions.get(edge.target)?.position;
            Some(EdgeSnapshot {
                x1: start.x,
                y1: start.y,
                x2: end.x,
                y2: end.y,
                stroke_width: stroke_width(edge.weight),
            })
        })
        .collect();

    FrameSnapshot {
        tick: sim.total_ticks(),
        alpha: sim.alpha(),
        converged: !sim.is_running(),
        nodes,
        edges,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedPlayer {
    pub id: String,
    pub label: String,
    pub category: NodeKind,
    pub score: f32,
}

/// Everything the headless mode prints: aggregate metrics, top players,
/// normalization warnings and the final frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LayoutReport {
    pub metrics: NetworkMetrics,
    pub key_players: Vec<RankedPlayer>,
    pub warnings: Vec<String>,
    pub frame: FrameSnapshot,
}

pub fn layout_report(
    network: &LoadedNetwork,
    sim: &Simulation,
    config: &EncodingConfig,
    player_limit: usize,
) -> LayoutReport {
    let graph = &network.graph;
    let key_players = rank_key_players(graph, player_limit)
        .into_iter()
        .filter_map(|player| {
            let node = graph.nodes.get(player.index)?;
            Some(RankedPlayer {
                id: node.id.clone(),
                label: node.label.clone(),
                category: node.kind,
                score: player.score,
            })
        })
        .collect();

    LayoutReport {
        metrics: network.metrics,
        key_players,
        warnings: network.warnings.iter().map(ToString::to_string).collect(),
        frame: snapshot(graph, sim, config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::network::{RawEdge, RawNode, compute_metrics};

    #[test]
    fn radius_is_capped() {
        let config = EncodingConfig {
            base_radius: 4.0,
            radius_cap: 12.0,
            degree_scale: 3.0,
        };
        assert_eq!(node_radius(0.0, &config), 4.0);
        assert_eq!(node_radius(2.0, &config), 7.0);
        assert_eq!(node_radius(f32::NAN, &config), 4.0);

        let wide = EncodingConfig {
            degree_scale: 30.0,
            ..config
        };
        assert_eq!(node_radius(1.0, &wide), 16.0);
    }

    #[test]
    fn default_radius_grows_with_degree() {
        let ids = (0..41).map(|index| format!("n{index}")).collect::<Vec<_>>();
        let mut edges = Vec::new();
        for (hub, degree) in [(0, 1), (1, 2), (2, 5)] {
            for offset in 0..degree {
                edges.push(RawEdge::new(ids[hub].as_str(), ids[10 + hub * 5 + offset].as_str()));
            }
        }
        let nodes = ids.iter().map(|id| RawNode::new(id.as_str(), NodeKind::Author, id.as_str()));
        let (mut graph, _) = GraphModel::build(nodes, edges);
        compute_metrics(&mut graph);

        let config = Config::default();
        let radii = node_radii(&graph, &config.encoding);
        assert_eq!(
            (graph.nodes[0].degree, graph.nodes[1].degree, graph.nodes[2].degree),
            (1, 2, 5)
        );
        assert_eq!(radii[3], config.encoding.base_radius);
        assert!(radii[3] < radii[0] && radii[0] < radii[1] && radii[1] < radii[2]);
        assert!(radii[2] < config.encoding.base_radius + config.encoding.radius_cap);
    }

    #[test]
    fn stroke_width_has_a_floor() {
        assert_eq!(stroke_width(0.25), 1.0);
        assert_eq!(stroke_width(1.0), 1.0);
        assert_eq!(stroke_width(9.0), 3.0);
    }

    #[test]
    fn palette_covers_every_kind() {
        assert_eq!(kind_color(NodeKind::Author), [0x25, 0x63, 0xeb]);
        assert_eq!(kind_color(NodeKind::Keyword), [0xf5, 0x9e, 0x0b]);
        let distinct = NodeKind::ALL
            .iter()
            .map(|kind| kind_color(*kind))
            .collect::<std::collections::HashSet<_>>();
        assert_eq!(distinct.len(), 4);
    }

    #[test]
    fn snapshot_mirrors_simulation_state() {
        let (mut graph, _) = GraphModel::build(
            vec![
                RawNode::new("a", NodeKind::Author, "Ada"),
                RawNode::new("d", NodeKind::Document, "Paper"),
            ],
            vec![RawEdge::new("a", "d").with_weight(4.0)],
        );
        compute_metrics(&mut graph);
        let config = Config::default();
        let mut sim = Simulation::for_graph(&graph, &config);
        sim.tick();

        let frame = snapshot(&graph, &sim, &config.encoding);
        assert_eq!(frame.tick, 1);
        assert_eq!(frame.nodes.len(), 2);
        assert_eq!(frame.nodes[0].label, "Ada");
        assert_eq!(frame.nodes[0].radius, 16.0);
        assert_eq!(frame.nodes[1].category, NodeKind::Document);

        let position = sim.position(1).unwrap();
        assert_eq!((frame.nodes[1].x, frame.nodes[1].y), (position.x, position.y));
        assert_eq!(frame.edges[0].stroke_width, 2.0);
        assert_eq!(frame.edges[0].x2, position.x);

        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["nodes"][0]["category"], "author");
    }

    #[test]
    fn report_names_players_and_warnings() {
        let network = crate::network::network_from_str(
            r#"{"nodes": [{"id": "a", "type": "author", "label": "Ada"}, {"id": "d"}],
                "edges": [{"source": "a", "target": "d"}, {"source": "a", "target": "ghost"}]}"#,
        )
        .unwrap();
        let config = Config::default();
        let mut sim = Simulation::for_graph(&network.graph, &config);
        sim.run();

        let report = layout_report(&network, &sim, &config.encoding, 5);
        assert_eq!(report.key_players.len(), 1);
        assert_eq!(report.key_players[0].label, "Ada");
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("ghost"));
        assert!(report.frame.converged);
        assert_eq!(report.frame.edges.len(), 1);
    }
}
