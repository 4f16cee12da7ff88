//! Subgraph materialization
//!
//! Extracts the solver's selection from the source graph, applies the
//! output caps and re-indexes everything to dense local ids with a map
//! back to the original ids.

pub mod materializer;
pub mod types;

pub use materializer::SubgraphMaterializer;
pub use types::{IdMap, Subgraph, SubgraphEdge, SubgraphNode, Triple};
