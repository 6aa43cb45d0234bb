use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use super::graph::{RawEdge, RawNode};
use super::records::SourceDocument;

#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected a JSON array of documents or an object with `nodes` and `edges`")]
    UnrecognizedShape,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct PayloadMetrics {
    #[serde(default)]
    pub active_players: usize,
    #[serde(default)]
    pub total_collaborations: u64,
    #[serde(default)]
    pub research_clusters: usize,
}

/// A network already assembled by the remote analysis service.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AnalysisPayload {
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
    #[serde(default)]
    pub clusters: Option<usize>,
    #[serde(default)]
    pub metrics: Option<PayloadMetrics>,
}

#[derive(Clone, Debug)]
pub enum NetworkInput {
    Documents(Vec<SourceDocument>),
    Analysis(AnalysisPayload),
}

pub fn parse_network_input(raw: &str) -> Result<NetworkInput, PayloadError> {
    let parsed: Value = serde_json::from_str(raw)?;

    if parsed.is_array() {
        return Ok(NetworkInput::Documents(serde_json::from_value(parsed)?));
    }

    let Value::Object(mut object) = parsed else {
        return Err(PayloadError::UnrecognizedShape);
    };

    if object.contains_key("nodes") {
        return Ok(NetworkInput::Analysis(serde_json::from_value(
            Value::Object(object),
        )?));
    }

    match object.remove("documents") {
        Some(documents @ Value::Array(_)) => {
            Ok(NetworkInput::Documents(serde_json::from_value(documents)?))
        }
        _ => Err(PayloadError::UnrecognizedShape),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_is_read_as_documents() {
        let input = parse_network_input(r#"[{"id": "D1", "authors": ["a"]}]"#).unwrap();
        let NetworkInput::Documents(documents) = input else {
            panic!("expected documents");
        };
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].authors, vec!["a".to_string()]);
    }

    #[test]
    fn wrapped_documents_are_accepted() {
        let input = parse_network_input(r#"{"documents": [{"id": "D1"}]}"#).unwrap();
        assert!(matches!(input, NetworkInput::Documents(documents) if documents.len() == 1));
    }

    #[test]
    fn analysis_payload_keeps_centralities_and_metrics() {
        let raw = r#"{
            "nodes": [
                {"id": "author:a", "type": "author", "label": "a", "cluster": 0, "degree": 0.5, "betweenness": 0.25},
                {"id": "document:D1", "type": "document", "label": "D1", "cluster": 0}
            ],
            "edges": [{"source": "author:a", "target": "document:D1", "relation": "WROTE", "weight": 1}],
            "clusters": 1,
            "key_players": [],
            "metrics": {"active_players": 1, "total_collaborations": 0, "research_clusters": 1}
        }"#;

        let NetworkInput::Analysis(payload) = parse_network_input(raw).unwrap() else {
            panic!("expected analysis payload");
        };
        assert_eq!(payload.nodes[0].degree, Some(0.5));
        assert_eq!(payload.nodes[0].betweenness, Some(0.25));
        assert_eq!(payload.edges[0].weight, Some(1.0));
        assert_eq!(payload.metrics.unwrap().active_players, 1);
    }

    #[test]
    fn other_shapes_are_rejected() {
        assert!(matches!(
            parse_network_input(r#"{"graph": 1}"#),
            Err(PayloadError::UnrecognizedShape)
        ));
        assert!(matches!(
            parse_network_input("42"),
            Err(PayloadError::UnrecognizedShape)
        ));
        assert!(matches!(
            parse_network_input("[{"),
            Err(PayloadError::Json(_))
        ));
    }
}
