//! Command-line argument parsing
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Retrieve compact, query-relevant subgraphs from a knowledge graph
#[derive(Parser, Debug)]
#[command(name = "subgraph-retriever")]
#[command(version)]
#[command(about = "Prize-collecting Steiner tree retrieval over knowledge graphs", long_about = None)]
pub struct Args {
    /// Configuration file path (defaults to ~/.subgraph-retriever/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: -q (quiet), default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (warnings and errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Retrieve one subgraph per query embedding
    Retrieve {
        /// Graph JSON document
        #[arg(short, long)]
        graph: PathBuf,

        /// JSON array of queries ({"embedding": [...], "text": "..."})
        #[arg(long)]
        queries: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,

        /// Override the number of batch workers
        #[arg(long)]
        workers: Option<usize>,

        /// Override the per-query timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Load and validate a graph document
    Validate {
        /// Graph JSON document
        #[arg(short, long)]
        graph: PathBuf,
    },

    /// Display the effective configuration
    Config,
}

/// How retrieved subgraphs are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON document with every outcome
    Json,
    /// `source -> relation -> target` lines per query
    Triples,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Default `tracing` filter directive for this level
    pub fn filter_directive(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
            Verbosity::VeryVerbose => "trace",
        }
    }

    /// Check if should print the telemetry summary
    pub fn show_summary(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_verbosity_quiet() {
        let args = parse(&["subgraph-retriever", "-q", "config"]);
        assert_eq!(args.verbosity(), Verbosity::Quiet);
        assert_eq!(args.verbosity().filter_directive(), "warn");
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(parse(&["subgraph-retriever", "config"]).verbosity(), Verbosity::Normal);
        assert_eq!(parse(&["subgraph-retriever", "-v", "config"]).verbosity(), Verbosity::Verbose);
        assert_eq!(
            parse(&["subgraph-retriever", "config", "-vv"]).verbosity(),
            Verbosity::VeryVerbose
        );
    }

    #[test]
    fn test_retrieve_command() {
        let args = parse(&[
            "subgraph-retriever",
            "--config",
            "custom.toml",
            "retrieve",
            "--graph",
            "g.json",
            "--queries",
            "q.json",
            "--format",
            "triples",
            "--workers",
            "4",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("custom.toml")));
        assert_eq!(
            args.command,
            Commands::Retrieve {
                graph: PathBuf::from("g.json"),
                queries: PathBuf::from("q.json"),
                format: OutputFormat::Triples,
                workers: Some(4),
                timeout_ms: None,
            }
        );
    }

    #[test]
    fn test_retrieve_requires_graph() {
        assert!(Args::try_parse_from(["subgraph-retriever", "retrieve", "--queries", "q.json"]).is_err());
    }

    #[test]
    fn test_validate_command() {
        let args = parse(&["subgraph-retriever", "validate", "-g", "g.json"]);
        assert_eq!(
            args.command,
            Commands::Validate {
                graph: PathBuf::from("g.json")
            }
        );
    }

    #[test]
    fn test_verbosity_methods() {
        assert!(!Verbosity::Quiet.show_summary());
        assert!(Verbosity::Normal.show_summary());
        assert_eq!(Verbosity::VeryVerbose.as_str(), "very_verbose");
        assert_eq!(Verbosity::Verbose.filter_directive(), "debug");
    }
}
