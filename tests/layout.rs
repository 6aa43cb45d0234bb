use collab_graph::Config;
use collab_graph::encoding::{layout_report, snapshot};
use collab_graph::interaction::DragController;
use collab_graph::network::{
    BuildWarning, GraphModel, RawEdge, RawNode, compute_metrics, network_from_str,
};
use collab_graph::sim::{Simulation, SimulationStatus};
use eframe::egui::vec2;
use tracing_test::traced_test;

fn plain(ids: &[&str]) -> Vec<RawNode> {
    ids.iter()
        .map(|id| RawNode {
            id: (*id).to_owned(),
            ..RawNode::default()
        })
        .collect()
}

#[test]
fn chain_forms_one_cluster_with_expected_degrees() {
    let (mut graph, warnings) = GraphModel::build(
        plain(&["A", "B", "C"]),
        vec![
            RawEdge::new("A", "B").with_weight(1.0),
            RawEdge::new("B", "C").with_weight(1.0),
        ],
    );
    let metrics = compute_metrics(&mut graph);

    assert!(warnings.is_empty());
    let degrees = graph.nodes.iter().map(|node| node.degree).collect::<Vec<_>>();
    assert_eq!(degrees, vec![1, 2, 1]);
    assert!(graph.nodes.iter().all(|node| node.cluster == graph.nodes[0].cluster));
    assert_eq!(metrics.cluster_count, 1);
}

#[test]
#[traced_test]
fn dangling_edge_is_dropped_and_logged() {
    let (graph, warnings) = GraphModel::build(plain(&["A"]), vec![RawEdge::new("A", "Z")]);

    assert_eq!(graph.edge_count(), 0);
    assert!(matches!(
        warnings.as_slice(),
        [BuildWarning::DanglingEdge { missing, .. }] if missing == "Z"
    ));
    assert!(logs_contain("graph input corrected"));
}

#[test]
fn metrics_are_deterministic() {
    let input = r#"[
        {"id": "P1", "authors": ["Ana", "Bo", "Cy"], "institutions": ["MIT"], "topics": [{"topic": "Graphs", "subtopics": ["Layout"]}]},
        {"id": "P2", "authors": ["Bo", "Dee"], "institutions": ["ETH"]},
        {"id": "P3", "authors": ["Eve"]}
    ]"#;
    let first = network_from_str(input).unwrap();
    let second = network_from_str(input).unwrap();

    assert_eq!(first.metrics, second.metrics);
    assert_eq!(first.graph.nodes, second.graph.nodes);
    assert_eq!(first.metrics.cluster_count, 2);
}

#[test]
fn every_normalized_edge_points_at_a_node() {
    let (graph, _) = GraphModel::build(
        plain(&["a", "b", "c"]),
        vec![
            RawEdge::new("a", "b"),
            RawEdge::new("b", "x"),
            RawEdge::new("y", "c"),
            RawEdge::new("c", "a").with_weight(0.0),
        ],
    );
    assert!(graph.edge_count() <= 4);
    assert_eq!(graph.edge_count(), 2);
    assert!(
        graph
            .edges
            .iter()
            .all(|edge| edge.source < graph.node_count() && edge.target < graph.node_count())
    );
}

#[test]
fn empty_input_is_already_converged() {
    let network = network_from_str("[]").unwrap();
    let config = Config::default();
    let mut sim = Simulation::for_graph(&network.graph, &config);

    assert_eq!(sim.status(), SimulationStatus::Converged);
    assert_eq!(sim.run(), 0);
    let frame = snapshot(&network.graph, &sim, &config.encoding);
    assert!(frame.converged);
    assert!(frame.nodes.is_empty() && frame.edges.is_empty());
}

#[test]
#[traced_test]
fn document_network_settles_and_reports() {
    let network = network_from_str(
        r#"[
            {"id": "P1", "authors": ["Ana", "Bo"], "institutions": ["MIT"]},
            {"id": "P2", "authors": ["Ana", "Bo", "Cy"], "institutions": ["MIT", "ETH"]},
            {"id": "P3", "authors": ["Cy", "Dee"], "topics": [{"topic": "Networks", "subtopics": []}]}
        ]"#,
    )
    .unwrap();
    let config = Config::default();
    let mut sim = Simulation::for_graph(&network.graph, &config);

    let ticks = sim.run();
    assert!(ticks <= 500, "took {ticks} ticks");
    assert!(logs_contain("simulation converged"));

    let report = layout_report(&network, &sim, &config.encoding, 3);
    assert_eq!(report.frame.nodes.len(), network.graph.node_count());
    assert!(report.frame.nodes.iter().all(|node| node.x.is_finite() && node.y.is_finite()));
    assert_eq!(report.key_players.len(), 3);
    assert!(serde_json::to_string(&report).unwrap().contains("\"key_players\""));
}

#[test]
fn drag_cycle_pins_reheats_and_cools() {
    let (mut graph, _) = GraphModel::build(
        plain(&["a", "b", "c", "d", "e"]),
        vec![
            RawEdge::new("a", "b"),
            RawEdge::new("a", "c"),
            RawEdge::new("c", "d"),
            RawEdge::new("d", "e"),
        ],
    );
    compute_metrics(&mut graph);
    let config = Config::default();
    let mut sim = Simulation::for_graph(&graph, &config);
    let mut drags = DragController::new(graph.node_count(), config.interaction);

    sim.run();
    assert!(sim.alpha() < config.simulation.alpha_min);

    let anchor = vec2(100.0, 80.0);
    let settled_gap = (sim.position(3).unwrap() - anchor).length();
    drags.drag_start(&mut sim, 2, anchor).unwrap();
    sim.tick();
    assert!(sim.alpha() > config.simulation.alpha_min);
    assert_eq!(sim.position(2), Some(anchor));

    for _ in 0..30 {
        sim.tick();
        assert_eq!(sim.position(2), Some(anchor));
    }
    let dragged_gap = (sim.position(3).unwrap() - anchor).length();
    assert!(dragged_gap < settled_gap, "{dragged_gap} >= {settled_gap}");

    drags.drag_end(&mut sim, 2).unwrap();
    assert_eq!(sim.alpha_target(), 0.0);
    let ticks = sim.run();
    assert!(ticks > 0);
    assert_eq!(sim.status(), SimulationStatus::Converged);
}

#[test]
fn coincident_nodes_never_produce_nan() {
    let (mut graph, _) = GraphModel::build(plain(&["p", "q"]), vec![RawEdge::new("p", "q")]);
    compute_metrics(&mut graph);
    let mut sim = Simulation::for_graph(&graph, &Config::default());
    sim.place(0, vec2(200.0, 200.0));
    sim.place(1, vec2(200.0, 200.0));

    sim.tick();

    let (p, q) = (sim.position(0).unwrap(), sim.position(1).unwrap());
    assert!(p.is_finite() && q.is_finite());
    assert_ne!(p, q);
}
