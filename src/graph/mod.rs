//! Knowledge graph data model
//!
//! Nodes and edges carry precomputed embeddings of a uniform dimension.
//! A `Graph` is validated once at construction and is read-only afterwards.

pub mod io;
pub mod types;

pub use io::GraphDocument;
pub use types::{Edge, EdgeId, Graph, Node, NodeId};
