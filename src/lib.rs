//! Subgraph Retriever - knowledge-graph context for language models
//!
//! Turns per-node and per-edge relevance into a small, connected subgraph
//! through an approximate Prize-Collecting Steiner Tree, then re-indexes it
//! for downstream prompt construction.
//!
//! # Architecture
//!
//! - **Scoring**: query/element similarity with a shared embedding cache
//! - **Prizes**: rank-based top-k prizes
//! - **PCST**: primal-dual growth, pruning, virtual-root selection
//! - **Materialize**: capped, re-indexed subgraph with an id map
//! - **Retrieval**: per-query pipeline, async batches, lazy streams

// Core data model
pub mod errors;
pub mod graph;
pub mod embedding;

// Re-export commonly used types
pub use errors::{Result, RetrievalError};

// Retrieval pipeline
pub mod scoring;
pub mod prize;
pub mod pcst;
pub mod materialize;
pub mod retrieval;

pub use graph::{Edge, Graph, Node};
pub use materialize::Subgraph;
pub use retrieval::{retrieve, BatchConfig, Query, RetrievalConfig, RetrievalLoader, RetrievalOutcome};

// Interface layer
pub mod telemetry;
pub mod cli;
pub mod config;
