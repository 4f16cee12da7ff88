//! CLI module for the subgraph retriever
//!
//! Handles command-line argument parsing and verbosity control.

pub mod args;

pub use args::{Args, Commands, OutputFormat, Verbosity};
