// Per-request inputs and outputs of the retrieval pipeline
use serde::{Deserialize, Serialize};

use crate::materialize::Subgraph;

/// Query embedding plus optional raw text, opaque to retrieval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub embedding: Vec<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Query {
    pub fn new(embedding: Vec<f32>) -> Self {
        Self {
            embedding,
            text: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

impl From<Vec<f32>> for Query {
    fn from(embedding: Vec<f32>) -> Self {
        Self::new(embedding)
    }
}

/// Successful result of one retrieval
///
/// `Empty` means nothing in the graph was relevant to the query; callers
/// are expected to fall back to a context-free prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "subgraph", rename_all = "snake_case")]
pub enum RetrievalOutcome {
    Subgraph(Subgraph),
    Empty,
}

impl RetrievalOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, RetrievalOutcome::Empty)
    }

    pub fn subgraph(&self) -> Option<&Subgraph> {
        match self {
            RetrievalOutcome::Subgraph(subgraph) => Some(subgraph),
            RetrievalOutcome::Empty => None,
        }
    }

    pub fn into_subgraph(self) -> Option<Subgraph> {
        match self {
            RetrievalOutcome::Subgraph(subgraph) => Some(subgraph),
            RetrievalOutcome::Empty => None,
        }
    }
}
