use std::collections::{BTreeSet, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::graph::{NodeKind, RawEdge, RawNode, Relation};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub topic: String,
    #[serde(default)]
    pub subtopics: Vec<String>,
}

/// A publication or patent as delivered by the search backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    pub id: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub institutions: Vec<String>,
    #[serde(default)]
    pub full_text: String,
    #[serde(default)]
    pub topics: Option<Vec<Topic>>,
}

pub fn node_id(kind: NodeKind, value: &str) -> String {
    format!("{}:{value}", kind.label())
}

/// Expands documents into raw nodes and edges.
///
/// Every unordered pair of authors listed on the same document becomes one
/// `CO_AUTHOR` edge, so a document with `k` authors costs `k * (k - 1) / 2`
/// pair insertions. A pair seen again (on the same or a later document) does
/// not create a second edge; its weight grows by one and the relation of the
/// first occurrence is kept.
pub fn flatten_documents(documents: &[SourceDocument]) -> (Vec<RawNode>, Vec<RawEdge>) {
    let mut builder = EdgeListBuilder::default();

    for document in documents {
        let document_node = node_id(NodeKind::Document, &document.id);
        builder.add_node(&document_node, NodeKind::Document, &document.id);

        let authors = unique_in_order(&document.authors);
        let mut author_nodes = Vec::with_capacity(authors.len());
        for author in authors {
            let author_node = node_id(NodeKind::Author, author);
            builder.add_node(&author_node, NodeKind::Author, author);
            builder.add_edge(&author_node, &document_node, Relation::Wrote);
            author_nodes.push(author_node);
        }

        for (offset, first) in author_nodes.iter().enumerate() {
            for second in &author_nodes[offset + 1..] {
                builder.add_edge(first, second, Relation::CoAuthor);
            }
        }

        let institutions = unique_in_order(&document.institutions);
        let mut institution_nodes = Vec::with_capacity(institutions.len());
        for institution in institutions {
            let institution_node = node_id(NodeKind::Institution, institution);
            builder.add_node(&institution_node, NodeKind::Institution, institution);
            institution_nodes.push(institution_node);
        }

        for author_node in &author_nodes {
            for institution_node in &institution_nodes {
                builder.add_edge(author_node, institution_node, Relation::AffiliatedWith);
            }
        }

        let keywords = document
            .topics
            .iter()
            .flatten()
            .flat_map(|topic| std::iter::once(&topic.topic).chain(topic.subtopics.iter()))
            .map(|keyword| keyword.trim())
            .filter(|keyword| !keyword.is_empty())
            .collect::<BTreeSet<_>>();
        for keyword in keywords {
            let keyword_node = node_id(NodeKind::Keyword, keyword);
            builder.add_node(&keyword_node, NodeKind::Keyword, keyword);
            builder.add_edge(&document_node, &keyword_node, Relation::ContainsKeyword);
        }
    }

    (builder.nodes, builder.edges)
}

fn unique_in_order(values: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty() && seen.insert(*value))
        .collect()
}

#[derive(Default)]
struct EdgeListBuilder {
    nodes: Vec<RawNode>,
    edges: Vec<RawEdge>,
    seen_nodes: HashSet<String>,
    edge_by_pair: HashMap<(String, String), usize>,
}

impl EdgeListBuilder {
    fn add_node(&mut self, id: &str, kind: NodeKind, label: &str) {
        if self.seen_nodes.insert(id.to_owned()) {
            self.nodes.push(RawNode::new(id, kind, label));
        }
    }

    fn add_edge(&mut self, from: &str, to: &str, relation: Relation) {
        let key = if from <= to {
            (from.to_owned(), to.to_owned())
        } else {
            (to.to_owned(), from.to_owned())
        };

        if let Some(&index) = self.edge_by_pair.get(&key) {
            let edge = &mut self.edges[index];
            edge.weight = Some(edge.weight.unwrap_or(1.0) + 1.0);
            return;
        }

        self.edge_by_pair.insert(key, self.edges.len());
        self.edges.push(
            RawEdge::new(from, to)
                .with_relation(relation)
                .with_weight(1.0),
        );
    }
}
