use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Author,
    Institution,
    Document,
    Keyword,
}

impl NodeKind {
    pub const ALL: [Self; 4] = [
        Self::Author,
        Self::Institution,
        Self::Document,
        Self::Keyword,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Author => "author",
            Self::Institution => "institution",
            Self::Document => "document",
            Self::Keyword => "keyword",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(value.trim()))
    }

    /// Authors and institutions are the "players" of a collaboration network.
    pub fn is_player(self) -> bool {
        matches!(self, Self::Author | Self::Institution)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Relation {
    Wrote,
    CoAuthor,
    CoInstitution,
    AffiliatedWith,
    ContainsKeyword,
    Other(String),
}

impl Relation {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "WROTE" => Self::Wrote,
            "CO_AUTHOR" => Self::CoAuthor,
            "CO_INSTITUTION" => Self::CoInstitution,
            "AFFILIATED_WITH" => Self::AffiliatedWith,
            "CONTAINS_KEYWORD" => Self::ContainsKeyword,
            _ => Self::Other(value.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Wrote => "WROTE",
            Self::CoAuthor => "CO_AUTHOR",
            Self::CoInstitution => "CO_INSTITUTION",
            Self::AffiliatedWith => "AFFILIATED_WITH",
            Self::ContainsKeyword => "CONTAINS_KEYWORD",
            Self::Other(label) => label,
        }
    }

    pub fn is_collaboration(&self) -> bool {
        matches!(self, Self::CoAuthor | Self::CoInstitution)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node as supplied by the caller, before validation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub cluster: Option<usize>,
    /// Degree centrality computed by an external analysis, if any.
    #[serde(default)]
    pub degree: Option<f32>,
    #[serde(default)]
    pub betweenness: Option<f32>,
}

impl RawNode {
    pub fn new(id: impl Into<String>, kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind: Some(kind.label().to_owned()),
            label: Some(label.into()),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEdge {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub relation: String,
    #[serde(default)]
    pub weight: Option<f32>,
}

impl RawEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            ..Self::default()
        }
    }

    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relation = relation.as_str().to_owned();
        self
    }

    pub fn with_weight(mut self, weight: f32) -> Self {
        self.weight = Some(weight);
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub label: String,
    /// Incident edge count; filled in by the metrics pass.
    pub degree: usize,
    /// Connected-component id; filled in by the metrics pass.
    pub cluster: usize,
    pub declared_cluster: Option<usize>,
    pub centrality: Option<f32>,
    pub betweenness: Option<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    pub relation: Relation,
    pub weight: f32,
}

impl Edge {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Diagnostics produced while normalizing raw input. None of them are fatal.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum BuildWarning {
    #[error("node without an id ignored")]
    MissingId,
    #[error("node `{id}` defined more than once; keeping the last definition")]
    DuplicateNode { id: String },
    #[error("node `{id}` has unknown type `{kind}`; treating it as a document")]
    UnknownKind { id: String, kind: String },
    #[error("edge `{from}` -> `{to}` dropped: node `{missing}` does not exist")]
    DanglingEdge {
        from: String,
        to: String,
        missing: String,
    },
    #[error("edge `{from}` -> `{to}` has invalid weight {weight}; using 1.0")]
    InvalidWeight { from: String, to: String, weight: f32 },
}

/// Canonical in-memory graph: nodes in first-seen order, edges referring to
/// node indices.
#[derive(Clone, Debug, Default)]
pub struct GraphModel {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    index_by_id: HashMap<String, usize>,
}

impl GraphModel {
    /// Deduplicates nodes by id (last definition wins, first position kept),
    /// drops edges with a missing endpoint and normalizes weights.
    pub fn build(
        raw_nodes: impl IntoIterator<Item = RawNode>,
        raw_edges: impl IntoIterator<Item = RawEdge>,
    ) -> (Self, Vec<BuildWarning>) {
        let mut warnings = Vec::new();
        let mut nodes: Vec<Node> = Vec::new();
        let mut index_by_id: HashMap<String, usize> = HashMap::new();

        for raw in raw_nodes {
            if raw.id.trim().is_empty() {
                warnings.push(BuildWarning::MissingId);
                continue;
            }

            let kind = match raw.kind.as_deref() {
                None => NodeKind::Document,
                Some(value) => NodeKind::parse(value).unwrap_or_else(|| {
                    warnings.push(BuildWarning::UnknownKind {
                        id: raw.id.clone(),
                        kind: value.to_owned(),
                    });
                    NodeKind::Document
                }),
            };

            let node = Node {
                label: raw.label.unwrap_or_else(|| raw.id.clone()),
                id: raw.id,
                kind,
                degree: 0,
                cluster: 0,
                declared_cluster: raw.cluster,
                centrality: raw.degree.filter(|value| value.is_finite()),
                betweenness: raw.betweenness.filter(|value| value.is_finite()),
            };

            if let Some(&index) = index_by_id.get(&node.id) {
                warnings.push(BuildWarning::DuplicateNode {
                    id: node.id.clone(),
                });
                nodes[index] = node;
            } else {
                index_by_id.insert(node.id.clone(), nodes.len());
                nodes.push(node);
            }
        }

        let mut edges = Vec::new();
        for raw in raw_edges {
            let source = index_by_id.get(&raw.source).copied();
            let target = index_by_id.get(&raw.target).copied();
            let (Some(source), Some(target)) = (source, target) else {
                let missing = if source.is_none() {
                    raw.source.clone()
                } else {
                    raw.target.clone()
                };
                warnings.push(BuildWarning::DanglingEdge {
                    from: raw.source,
                    to: raw.target,
                    missing,
                });
                continue;
            };

            let weight = match raw.weight {
                None => 1.0,
                Some(weight) if weight.is_finite() && weight > 0.0 => weight,
                Some(weight) => {
                    warnings.push(BuildWarning::InvalidWeight {
                        from: raw.source.clone(),
                        to: raw.target.clone(),
                        weight,
                    });
                    1.0
                }
            };

            edges.push(Edge {
                source,
                target,
                relation: Relation::parse(&raw.relation),
                weight,
            });
        }

        for warning in &warnings {
            warn!(%warning, "graph input corrected");
        }
        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            warnings = warnings.len(),
            "graph model built"
        );

        (
            Self {
                nodes,
                edges,
                index_by_id,
            },
            warnings,
        )
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Degree centrality in `[0, 1]`: the analysis value when supplied,
    /// otherwise `degree / (n - 1)`. Expects degrees to be counted.
    pub fn degree_centrality(&self, index: usize) -> f32 {
        let Some(node) = self.nodes.get(index) else {
            return 0.0;
        };
        node.centrality.unwrap_or_else(|| {
            let normalizer = self.node_count().saturating_sub(1).max(1) as f32;
            node.degree as f32 / normalizer
        })
    }
}
