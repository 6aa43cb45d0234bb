mod graph;
mod load;
mod metrics;
mod parse;
mod players;
mod records;

pub use graph::{BuildWarning, Edge, GraphModel, Node, NodeKind, RawEdge, RawNode, Relation};
pub use load::{LoadedNetwork, NetworkSource, load_network, network_from_str};
pub use metrics::{NetworkMetrics, compute_metrics};
pub use parse::{AnalysisPayload, NetworkInput, PayloadError, PayloadMetrics, parse_network_input};
pub use players::{KeyPlayer, rank_key_players};
pub use records::{SourceDocument, Topic, flatten_documents, node_id};
