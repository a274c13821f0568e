use std::collections::HashMap;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{error, info, warn};
use serde::Deserialize;

use super::{EntityGraph, GraphDataError, LinkRecord, NodeKind, NodeRecord};

pub const DEFAULT_ENDPOINT: &str =
    "https://qtyh-ctfndserc5ctbha5.centralus-01.azurewebsites.net/api/GetDimensionsGraph";

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct RawGraph {
    #[serde(default)]
    nodes: Vec<RawNode>,
    #[serde(default)]
    links: Vec<RawLink>,
}

#[derive(Clone, Debug, Deserialize)]
struct RawNode {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: NodeKind,
    #[serde(default)]
    description: String,
}

#[derive(Clone, Debug, Deserialize)]
struct RawLink {
    source: String,
    target: String,
    #[serde(default)]
    relationship: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataSource {
    Remote { endpoint: String },
    Fallback,
}

#[derive(Clone, Debug)]
pub struct LoadedGraph {
    pub graph: EntityGraph,
    pub source: DataSource,
}

pub fn load_graph(endpoint: Option<&str>, timeout: Duration) -> Result<LoadedGraph> {
    if let Some(endpoint) = endpoint {
        match fetch_remote(endpoint, timeout) {
            Ok(raw) => {
                info!("fetched graph data from {endpoint}");
                let graph = build_graph(raw)
                    .with_context(|| format!("graph data from {endpoint} failed validation"))
                    .inspect_err(|validation| error!("rejecting remote graph: {validation:#}"))?;
                return Ok(LoadedGraph {
                    graph,
                    source: DataSource::Remote {
                        endpoint: endpoint.to_owned(),
                    },
                });
            }
            Err(error) => {
                warn!("falling back to built-in sample data: {error:#}");
            }
        }
    }

    Ok(LoadedGraph {
        graph: fallback_graph(),
        source: DataSource::Fallback,
    })
}

fn fetch_remote(endpoint: &str, timeout: Duration) -> Result<RawGraph> {
    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build HTTP client")?;

    let response = client
        .get(endpoint)
        .send()
        .with_context(|| format!("request to {endpoint} failed"))?
        .error_for_status()
        .with_context(|| format!("{endpoint} returned an error status"))?;

    response
        .json::<RawGraph>()
        .with_context(|| format!("{endpoint} returned malformed graph JSON"))
}

pub(crate) fn build_graph(raw: RawGraph) -> Result<EntityGraph, GraphDataError> {
    let mut index_by_id = HashMap::with_capacity(raw.nodes.len());
    let mut nodes = Vec::with_capacity(raw.nodes.len());

    for raw_node in raw.nodes {
        let index = nodes.len();
        if index_by_id.insert(raw_node.id.clone(), index).is_some() {
            return Err(GraphDataError::DuplicateId { id: raw_node.id });
        }

        let name = if raw_node.name.is_empty() {
            raw_node.id.clone()
        } else {
            raw_node.name
        };

        nodes.push(NodeRecord {
            id: raw_node.id,
            name,
            kind: raw_node.kind,
            description: raw_node.description,
        });
    }

    let mut links = Vec::with_capacity(raw.links.len());
    for raw_link in raw.links {
        let source = resolve_endpoint(&index_by_id, &raw_link.source, &raw_link.relationship)?;
        let target = resolve_endpoint(&index_by_id, &raw_link.target, &raw_link.relationship)?;
        links.push(LinkRecord {
            source,
            target,
            relationship: raw_link.relationship,
        });
    }

    Ok(EntityGraph {
        nodes,
        links,
        index_by_id,
    })
}

fn resolve_endpoint(
    index_by_id: &HashMap<String, usize>,
    endpoint: &str,
    relationship: &str,
) -> Result<usize, GraphDataError> {
    index_by_id
        .get(endpoint)
        .copied()
        .ok_or_else(|| GraphDataError::UnresolvedEndpoint {
            endpoint: endpoint.to_owned(),
            relationship: relationship.to_owned(),
        })
}

pub fn fallback_graph() -> EntityGraph {
    let raw = serde_json::from_str(FALLBACK_JSON).expect("built-in sample data is valid JSON");
    build_graph(raw).expect("built-in sample data resolves")
}

const FALLBACK_JSON: &str = r#"{
    "nodes": [
        { "id": "alice", "name": "Alice Johnson", "type": "person", "description": "Software Engineer specializing in web development" },
        { "id": "bob", "name": "Bob Smith", "type": "person", "description": "Data Scientist and ML researcher" },
        { "id": "carol", "name": "Carol Williams", "type": "person", "description": "Product Manager with 10 years experience" },
        { "id": "david", "name": "David Brown", "type": "person", "description": "UX Designer and frontend specialist" },

        { "id": "techcorp", "name": "TechCorp Inc.", "type": "organization", "description": "Leading technology company in cloud services" },
        { "id": "innovate", "name": "Innovate Labs", "type": "organization", "description": "Research and development startup" },
        { "id": "university", "name": "Tech University", "type": "organization", "description": "Premier institution for computer science" },

        { "id": "project_alpha", "name": "Project Alpha", "type": "project", "description": "Machine learning pipeline for data analysis" },
        { "id": "project_beta", "name": "Project Beta", "type": "project", "description": "Cloud infrastructure modernization initiative" },
        { "id": "project_gamma", "name": "Project Gamma", "type": "project", "description": "Customer-facing mobile application" },

        { "id": "react", "name": "React", "type": "technology", "description": "JavaScript library for building user interfaces" },
        { "id": "python", "name": "Python", "type": "technology", "description": "High-level programming language" },
        { "id": "d3", "name": "D3.js", "type": "technology", "description": "Data visualization library" },
        { "id": "azure", "name": "Azure", "type": "technology", "description": "Microsoft cloud computing platform" }
    ],
    "links": [
        { "source": "alice", "target": "techcorp", "relationship": "works at" },
        { "source": "bob", "target": "innovate", "relationship": "works at" },
        { "source": "carol", "target": "techcorp", "relationship": "works at" },
        { "source": "david", "target": "innovate", "relationship": "works at" },
        { "source": "bob", "target": "university", "relationship": "alumnus of" },

        { "source": "alice", "target": "project_beta", "relationship": "leads" },
        { "source": "bob", "target": "project_alpha", "relationship": "contributes to" },
        { "source": "carol", "target": "project_gamma", "relationship": "manages" },
        { "source": "david", "target": "project_gamma", "relationship": "designs" },

        { "source": "project_alpha", "target": "innovate", "relationship": "owned by" },
        { "source": "project_beta", "target": "techcorp", "relationship": "owned by" },
        { "source": "project_gamma", "target": "techcorp", "relationship": "owned by" },

        { "source": "project_alpha", "target": "python", "relationship": "uses" },
        { "source": "project_beta", "target": "azure", "relationship": "uses" },
        { "source": "project_gamma", "target": "react", "relationship": "uses" },
        { "source": "alice", "target": "react", "relationship": "expert in" },
        { "source": "alice", "target": "d3", "relationship": "expert in" },
        { "source": "bob", "target": "python", "relationship": "expert in" },
        { "source": "david", "target": "react", "relationship": "expert in" },

        { "source": "innovate", "target": "university", "relationship": "partners with" }
    ]
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_raw(value: serde_json::Value) -> RawGraph {
        serde_json::from_value(value).expect("raw graph shape")
    }

    #[test]
    fn fallback_dataset_has_expected_shape() {
        let graph = fallback_graph();
        assert_eq!(graph.node_count(), 14);
        assert_eq!(graph.link_count(), 20);

        assert_eq!(graph.nodes[0].id, "alice");
        assert_eq!(graph.nodes[0].kind, NodeKind::Person);
        let techcorp = graph.index_of("techcorp").expect("techcorp resolves");
        assert_eq!(graph.nodes[techcorp].kind, NodeKind::Organization);

        for link in &graph.links {
            assert!(link.source < graph.node_count());
            assert!(link.target < graph.node_count());
        }
    }

    #[test]
    fn build_graph_preserves_insertion_order() {
        let graph = fallback_graph();
        for (index, node) in graph.nodes.iter().enumerate() {
            assert_eq!(graph.index_of(&node.id), Some(index));
        }
    }

    #[test]
    fn duplicate_id_is_rejected() {
        let raw = parse_raw(serde_json::json!({
            "nodes": [
                { "id": "a", "name": "A", "type": "person", "description": "" },
                { "id": "a", "name": "A again", "type": "person", "description": "" },
            ],
            "links": [],
        }));

        let error = build_graph(raw).expect_err("duplicate id must fail");
        assert_eq!(error, GraphDataError::DuplicateId { id: "a".to_owned() });
    }

    #[test]
    fn unresolved_endpoint_is_rejected() {
        let raw = parse_raw(serde_json::json!({
            "nodes": [
                { "id": "a", "name": "A", "type": "person", "description": "" },
            ],
            "links": [
                { "source": "a", "target": "ghost", "relationship": "haunts" },
            ],
        }));

        let error = build_graph(raw).expect_err("dangling target must fail");
        assert_eq!(
            error,
            GraphDataError::UnresolvedEndpoint {
                endpoint: "ghost".to_owned(),
                relationship: "haunts".to_owned(),
            }
        );
    }

    #[test]
    fn missing_kind_defaults_to_other() {
        let raw = parse_raw(serde_json::json!({
            "nodes": [
                { "id": "a", "name": "A", "description": "" },
            ],
            "links": [],
        }));

        let graph = build_graph(raw).expect("missing type is tolerated");
        assert_eq!(graph.nodes[0].kind, NodeKind::Other);
    }

    #[test]
    fn unreachable_endpoint_falls_back_to_sample_data() {
        let loaded = load_graph(Some("http://127.0.0.1:9/graph"), Duration::from_millis(250))
            .expect("fallback substitution never fails the caller");

        assert_eq!(loaded.source, DataSource::Fallback);
        assert_eq!(loaded.graph.node_count(), 14);
        assert_eq!(loaded.graph.link_count(), 20);
    }

    #[test]
    fn offline_load_uses_sample_data() {
        let loaded = load_graph(None, Duration::from_secs(1)).expect("offline load");
        assert_eq!(loaded.source, DataSource::Fallback);
        assert_eq!(loaded.graph.node_count(), 14);
    }
}
