use serde::Serialize;

use super::graph::GraphModel;

const DEGREE_WEIGHT: f32 = 0.6;
const BETWEENNESS_WEIGHT: f32 = 0.4;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct KeyPlayer {
    pub index: usize,
    pub score: f32,
}

/// Ranks authors and institutions by `0.6 * degree centrality + 0.4 *
/// betweenness`. Betweenness is only used when the analysis payload
/// supplied it; it is never computed here. Expects degrees to be counted.
pub fn rank_key_players(graph: &GraphModel, limit: usize) -> Vec<KeyPlayer> {
    let mut players = graph
        .nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.kind.is_player())
        .map(|(index, node)| {
            let centrality = graph.degree_centrality(index);
            let betweenness = node.betweenness.unwrap_or(0.0);
            KeyPlayer {
                index,
                score: DEGREE_WEIGHT * centrality + BETWEENNESS_WEIGHT * betweenness,
            }
        })
        .collect::<Vec<_>>();

    players.sort_by(|a, b| b.score.total_cmp(&a.score).then(a.index.cmp(&b.index)));
    players.truncate(limit);
    players
}
