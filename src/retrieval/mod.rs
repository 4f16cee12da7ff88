//! Retrieval orchestration
//!
//! The loader owns the read-only graph, the embedding cache and the
//! configuration, and runs scorer → prizes → solver → materializer per
//! query. Batches fan out over a bounded pool of blocking workers; large
//! batches can also be consumed lazily through a restartable stream.

pub mod config;
pub mod loader;
pub mod stream;
pub mod types;

pub use config::{BatchConfig, RetrievalConfig};
pub use loader::{retrieve, RetrievalLoader};
pub use stream::RetrievalStream;
pub use types::{Query, RetrievalOutcome};
