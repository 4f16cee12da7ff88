//! Prize-Collecting Steiner Tree solver
//!
//! Goemans-Williamson style primal-dual growth over an arena of clusters,
//! followed by a pruning pass and, optionally, virtual-root selection of a
//! single tree. The result is a 2-approximation of the forest maximizing
//! collected node prizes minus effective edge costs.
//!
//! Components:
//! - Instance: effective edge costs and node prizes for one query
//! - Cluster registry: arena of clusters indexed by integer id
//! - Growth: moat growth until merges and deactivations run out
//! - Pruning: none / simple / strong, plus virtual-root selection
//! - Solver: end-to-end orchestration producing a `PcstResult`

pub mod cluster;
pub mod growth;
pub mod instance;
pub mod prune;
pub mod solver;
pub mod types;

pub use cluster::{Cluster, ClusterRegistry};
pub use growth::{grow, GrowthRecord};
pub use instance::{EdgeCostModel, Instance};
pub use prune::{prune_forest, select_rooted, PrunedTree};
pub use solver::PcstSolver;
pub use types::{PcstResult, PruningStrategy};
