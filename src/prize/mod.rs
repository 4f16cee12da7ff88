//! Prize assignment
//!
//! Converts raw similarity scores into non-negative rank-based prizes so
//! that only the top-k most relevant nodes and edges compete in the solver.

pub mod assigner;
pub mod types;

pub use assigner::PrizeAssigner;
pub use types::Prizes;
