use serde::{Deserialize, Serialize};
use tracing::debug;

use super::graph::{Edge, GraphModel};

/// Aggregate counters shown alongside the graph.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkMetrics {
    pub active_players: usize,
    pub total_collaborations: u64,
    pub cluster_count: usize,
}

/// Annotates every node with its degree and connected-component id and
/// returns the aggregate counters.
///
/// Degree is undirected: an edge adds one to each endpoint, and a self-loop
/// adds one to its single endpoint. Cluster ids are dense (`0..k`) and
/// numbered in order of the lowest node index in each component, so identical
/// input always yields identical ids.
pub fn compute_metrics(graph: &mut GraphModel) -> NetworkMetrics {
    count_degrees(graph);
    let cluster_count = assign_clusters(graph);
    let metrics = NetworkMetrics {
        active_players: active_players(graph),
        total_collaborations: collaboration_total(&graph.edges),
        cluster_count,
    };
    debug!(?metrics, "network metrics computed");
    metrics
}

pub fn count_degrees(graph: &mut GraphModel) {
    let mut degrees = vec![0usize; graph.nodes.len()];
    for edge in &graph.edges {
        degrees[edge.source] += 1;
        if !edge.is_self_loop() {
            degrees[edge.target] += 1;
        }
    }

    for (node, degree) in graph.nodes.iter_mut().zip(degrees) {
        node.degree = degree;
    }
}

pub fn active_players(graph: &GraphModel) -> usize {
    graph
        .nodes
        .iter()
        .filter(|node| node.kind.is_player())
        .count()
}

/// Each co-authorship or co-institution edge counts its weight (rounded, at
/// least one): a merged edge standing for three co-listings counts three.
pub fn collaboration_total(edges: &[Edge]) -> u64 {
    edges
        .iter()
        .filter(|edge| edge.relation.is_collaboration())
        .map(|edge| edge.weight.round().max(1.0) as u64)
        .sum()
}

/// Uses cluster ids declared by an external analysis when every node has
/// one. Returns the number of distinct clusters, or `None` when the
/// declaration is incomplete and clustering has to run locally.
pub fn adopt_declared_clusters(graph: &mut GraphModel) -> Option<usize> {
    if graph.nodes.is_empty()
        || graph
            .nodes
            .iter()
            .any(|node| node.declared_cluster.is_none())
    {
        return None;
    }

    let mut distinct = Vec::new();
    for node in &mut graph.nodes {
        let cluster = node.declared_cluster?;
        node.cluster = cluster;
        if !distinct.contains(&cluster) {
            distinct.push(cluster);
        }
    }
    Some(distinct.len())
}

fn assign_clusters(graph: &mut GraphModel) -> usize {
    let mut components = DisjointSet::new(graph.nodes.len());
    for edge in &graph.edges {
        components.union(edge.source, edge.target);
    }

    let mut label_by_root: Vec<Option<usize>> = vec![None; graph.nodes.len()];
    let mut next_label = 0usize;
    for index in 0..graph.nodes.len() {
        let root = components.find(index);
        let label = *label_by_root[root].get_or_insert_with(|| {
            next_label += 1;
            next_label - 1
        });
        graph.nodes[index].cluster = label;
    }
    next_label
}

struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    fn find(&mut self, index: usize) -> usize {
        let mut root = index;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        let mut cursor = index;
        while self.parent[cursor] != root {
            let next = self.parent[cursor];
            self.parent[cursor] = root;
            cursor = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return;
        }

        match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => self.parent[root_a] = root_b,
            std::cmp::Ordering::Greater => self.parent[root_b] = root_a,
            std::cmp::Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] += 1;
            }
        }
    }
}
