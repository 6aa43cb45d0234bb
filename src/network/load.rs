use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use super::graph::{BuildWarning, GraphModel};
use super::metrics::{
    NetworkMetrics, active_players, adopt_declared_clusters, collaboration_total, compute_metrics,
    count_degrees,
};
use super::parse::{NetworkInput, PayloadMetrics, parse_network_input};
use super::records::flatten_documents;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetworkSource {
    Documents { count: usize },
    Analysis,
}

/// A normalized, annotated network ready to be laid out.
#[derive(Clone, Debug)]
pub struct LoadedNetwork {
    pub graph: GraphModel,
    pub metrics: NetworkMetrics,
    pub warnings: Vec<BuildWarning>,
    pub source: NetworkSource,
}

impl NetworkInput {
    pub fn into_network(self) -> LoadedNetwork {
        match self {
            Self::Documents(documents) => {
                let (raw_nodes, raw_edges) = flatten_documents(&documents);
                let (mut graph, warnings) = GraphModel::build(raw_nodes, raw_edges);
                let metrics = compute_metrics(&mut graph);
                LoadedNetwork {
                    graph,
                    metrics,
                    warnings,
                    source: NetworkSource::Documents {
                        count: documents.len(),
                    },
                }
            }
            Self::Analysis(payload) => {
                let (mut graph, warnings) = GraphModel::build(payload.nodes, payload.edges);
                let metrics = match adopt_declared_clusters(&mut graph) {
                    Some(distinct) => {
                        count_degrees(&mut graph);
                        declared_metrics(&graph, distinct, payload.clusters, payload.metrics)
                    }
                    None => compute_metrics(&mut graph),
                };
                LoadedNetwork {
                    graph,
                    metrics,
                    warnings,
                    source: NetworkSource::Analysis,
                }
            }
        }
    }
}

/// Metrics for a payload whose cluster ids were adopted. Declared counters
/// win; whatever the payload leaves out is measured on the graph.
fn declared_metrics(
    graph: &GraphModel,
    distinct_clusters: usize,
    clusters: Option<usize>,
    declared: Option<PayloadMetrics>,
) -> NetworkMetrics {
    let cluster_count = declared
        .map(|metrics| metrics.research_clusters)
        .filter(|&count| count > 0)
        .or(clusters)
        .unwrap_or(distinct_clusters);
    if cluster_count != distinct_clusters {
        warn!(
            declared = cluster_count,
            distinct = distinct_clusters,
            "declared cluster count differs from the cluster ids"
        );
    }

    match declared {
        Some(metrics) => NetworkMetrics {
            active_players: metrics.active_players,
            total_collaborations: metrics.total_collaborations,
            cluster_count,
        },
        None => NetworkMetrics {
            active_players: active_players(graph),
            total_collaborations: collaboration_total(&graph.edges),
            cluster_count,
        },
    }
}

pub fn network_from_str(raw: &str) -> Result<LoadedNetwork> {
    let input = parse_network_input(raw).context("failed to parse network input")?;
    Ok(input.into_network())
}

pub fn load_network(path: &Path) -> Result<LoadedNetwork> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read network input {}", path.display()))?;
    let network = network_from_str(&raw)
        .with_context(|| format!("failed to load network from {}", path.display()))?;

    info!(
        path = %path.display(),
        nodes = network.graph.node_count(),
        edges = network.graph.edge_count(),
        clusters = network.metrics.cluster_count,
        warnings = network.warnings.len(),
        "network loaded"
    );
    Ok(network)
}
