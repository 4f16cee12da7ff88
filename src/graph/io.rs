// JSON representation of a graph, validated eagerly on load
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::errors::Result;
use crate::graph::types::{Edge, Graph, Node};

/// On-disk graph document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub directed: bool,
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Graph {
    /// Validate a document into a graph
    pub fn from_document(document: GraphDocument) -> Result<Self> {
        Self::build(document.nodes, document.edges, document.directed)
    }

    /// Copy the graph back into document form (id order)
    pub fn to_document(&self) -> GraphDocument {
        GraphDocument {
            directed: self.is_directed(),
            nodes: self.nodes().to_vec(),
            edges: self.edges().to_vec(),
        }
    }

    /// Parse and validate a JSON graph document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: GraphDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    /// Load and validate a JSON graph document from disk
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let graph = Self::from_json_str(&contents)?;
        tracing::info!(
            path = %path.as_ref().display(),
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Loaded graph"
        );
        Ok(graph)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RetrievalError;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
        "directed": true,
        "nodes": [
            {"id": 1, "label": "paris", "embedding": [1.0, 0.0]},
            {"id": 0, "label": "france", "embedding": [0.0, 1.0]}
        ],
        "edges": [
            {"id": 0, "source": 1, "target": 0, "label": "capital_of", "embedding": [0.5, 0.5], "cost": 1.0}
        ]
    }"#;

    #[test]
    fn test_parse_document() {
        let graph = Graph::from_json_str(SAMPLE).unwrap();
        assert!(graph.is_directed());
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.nodes()[0].label.as_deref(), Some("france"));
        assert_eq!(graph.edges()[0].cost, 1.0);
    }

    #[test]
    fn test_edges_default_to_empty() {
        let graph = Graph::from_json_str(r#"{"nodes": [{"id": 4, "embedding": [1.0]}]}"#).unwrap();
        assert_eq!(graph.edge_count(), 0);
        assert!(!graph.is_directed());
    }

    #[test]
    fn test_malformed_document_rejected() {
        let json = r#"{"nodes": [{"id": 0, "embedding": [1.0]}],
                       "edges": [{"id": 0, "source": 0, "target": 9, "embedding": [1.0]}]}"#;
        let err = Graph::from_json_str(json).unwrap_err();
        assert!(matches!(err, RetrievalError::MalformedGraph(_)));
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("graph.json");
        let graph = Graph::from_json_str(SAMPLE).unwrap();
        std::fs::write(&path, graph.to_json_string().unwrap()).unwrap();

        let loaded = Graph::load_json(&path).unwrap();
        assert_eq!(loaded.nodes(), graph.nodes());
        assert_eq!(loaded.edges(), graph.edges());
    }
}
