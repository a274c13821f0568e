use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

mod fetch;

pub use fetch::{DEFAULT_ENDPOINT, DataSource, LoadedGraph, fallback_graph, load_graph};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "person")]
    Person,
    #[serde(rename = "organization")]
    Organization,
    #[serde(rename = "project")]
    Project,
    #[serde(rename = "technology")]
    Technology,
    #[serde(rename = "portal")]
    Portal,
    #[serde(rename = "Huge", alias = "huge")]
    Huge,
    #[serde(rename = "Large", alias = "large")]
    Large,
    #[serde(rename = "Medium", alias = "medium")]
    Medium,
    #[serde(rename = "Small", alias = "small")]
    Small,
    #[serde(other)]
    Other,
}

impl Default for NodeKind {
    fn default() -> Self {
        NodeKind::Other
    }
}

impl NodeKind {
    pub const LEGEND: [NodeKind; 4] = [
        NodeKind::Person,
        NodeKind::Organization,
        NodeKind::Project,
        NodeKind::Technology,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Person => "Person",
            Self::Organization => "Organization",
            Self::Project => "Project",
            Self::Technology => "Technology",
            Self::Portal => "Portal",
            Self::Huge => "Huge",
            Self::Large => "Large",
            Self::Medium => "Medium",
            Self::Small => "Small",
            Self::Other => "Other",
        }
    }
}

#[derive(Clone, Debug)]
pub struct NodeRecord {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub description: String,
}

#[derive(Clone, Debug)]
pub struct LinkRecord {
    pub source: usize,
    pub target: usize,
    pub relationship: String,
}

#[derive(Clone, Debug)]
pub struct Connection {
    pub other: usize,
    pub relationship: String,
    pub outgoing: bool,
}

#[derive(Clone, Debug)]
pub struct EntityGraph {
    pub nodes: Vec<NodeRecord>,
    pub links: Vec<LinkRecord>,
    pub index_by_id: HashMap<String, usize>,
}

impl EntityGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn connections_of(&self, index: usize) -> Vec<Connection> {
        let mut connections = Vec::new();
        for link in &self.links {
            if link.source == index {
                connections.push(Connection {
                    other: link.target,
                    relationship: link.relationship.clone(),
                    outgoing: true,
                });
            } else if link.target == index {
                connections.push(Connection {
                    other: link.source,
                    relationship: link.relationship.clone(),
                    outgoing: false,
                });
            }
        }
        connections
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphDataError {
    DuplicateId { id: String },
    UnresolvedEndpoint { endpoint: String, relationship: String },
}

impl fmt::Display for GraphDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { id } => {
                write!(f, "duplicate node id {id:?} in graph data")
            }
            Self::UnresolvedEndpoint {
                endpoint,
                relationship,
            } => {
                write!(
                    f,
                    "link {relationship:?} references unknown node id {endpoint:?}"
                )
            }
        }
    }
}

impl std::error::Error for GraphDataError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_graph() -> EntityGraph {
        let raw = serde_json::json!({
            "nodes": [
                { "id": "a", "name": "A", "type": "person", "description": "" },
                { "id": "b", "name": "B", "type": "organization", "description": "" },
                { "id": "c", "name": "C", "type": "project", "description": "" },
            ],
            "links": [
                { "source": "a", "target": "b", "relationship": "works at" },
                { "source": "c", "target": "a", "relationship": "led by" },
            ],
        });
        let raw = serde_json::from_value(raw).expect("sample graph shape");
        fetch::build_graph(raw).expect("sample graph resolves")
    }

    #[test]
    fn connections_list_both_directions() {
        let graph = sample_graph();
        let a = graph.index_of("a").expect("node a");

        let connections = graph.connections_of(a);
        assert_eq!(connections.len(), 2);

        let outgoing = connections
            .iter()
            .find(|connection| connection.outgoing)
            .expect("outgoing connection");
        assert_eq!(outgoing.other, graph.index_of("b").unwrap());
        assert_eq!(outgoing.relationship, "works at");

        let incoming = connections
            .iter()
            .find(|connection| !connection.outgoing)
            .expect("incoming connection");
        assert_eq!(incoming.other, graph.index_of("c").unwrap());
        assert_eq!(incoming.relationship, "led by");
    }

    #[test]
    fn node_kind_labels_are_total() {
        for kind in [
            NodeKind::Person,
            NodeKind::Organization,
            NodeKind::Project,
            NodeKind::Technology,
            NodeKind::Portal,
            NodeKind::Huge,
            NodeKind::Large,
            NodeKind::Medium,
            NodeKind::Small,
            NodeKind::Other,
        ] {
            assert!(!kind.label().is_empty());
        }
    }

    #[test]
    fn unknown_kind_string_maps_to_other() {
        let kind: NodeKind = serde_json::from_str("\"wormhole\"").expect("catch-all variant");
        assert_eq!(kind, NodeKind::Other);
    }
}
