//! subgraph-retriever - command-line entry point

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use subgraph_retriever::{
    cli::{Args, Commands, OutputFormat, Verbosity},
    config::Config,
    graph::Graph,
    retrieval::{Query, RetrievalLoader, RetrievalOutcome},
};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &Args) -> Result<Config> {
    match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Config::load().context("Failed to load default config"),
    }
}

fn load_graph(path: &Path) -> Result<Graph> {
    Graph::load_json(path).with_context(|| format!("Failed to load graph {}", path.display()))
}

fn load_queries(path: &Path) -> Result<Vec<Query>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read queries {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse queries {}", path.display()))
}

/// Retrieve a subgraph for every query and print the outcomes
async fn run_retrieve(
    args: &Args,
    mut config: Config,
    graph_path: &Path,
    queries_path: &Path,
    format: OutputFormat,
    workers: Option<usize>,
    timeout_ms: Option<u64>,
) -> Result<()> {
    if let Some(workers) = workers {
        config.batch.workers = workers;
    }
    if timeout_ms.is_some() {
        config.batch.timeout_ms = timeout_ms;
    }

    let graph = load_graph(graph_path)?;
    let queries = load_queries(queries_path)?;
    let loader = RetrievalLoader::new(graph, config.retrieval)
        .context("Invalid retrieval configuration")?
        .with_batch_config(config.batch);

    let results = loader
        .retrieve_batch(queries)
        .await
        .context("Batch aborted")?;

    match format {
        OutputFormat::Json => {
            let report: Vec<serde_json::Value> = results
                .iter()
                .enumerate()
                .map(|(index, result)| match result {
                    Ok(outcome) => serde_json::json!({ "index": index, "result": outcome }),
                    Err(err) => serde_json::json!({ "index": index, "error": err.to_string() }),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Triples => {
            for (index, result) in results.iter().enumerate() {
                println!("# query {}", index);
                match result {
                    Ok(RetrievalOutcome::Subgraph(subgraph)) => println!("{}", subgraph.textualize()),
                    Ok(RetrievalOutcome::Empty) => println!("(no relevant content)"),
                    Err(err) => println!("error: {}", err),
                }
                println!();
            }
        }
    }

    if args.verbosity().show_summary() {
        eprintln!("{}", loader.telemetry().summary());
    }
    Ok(())
}

fn validate_graph(path: &Path) -> Result<()> {
    let graph = load_graph(path)?;
    println!(
        "✓ {}: {} nodes, {} edges, dimension {}, {}",
        path.display(),
        graph.node_count(),
        graph.edge_count(),
        graph.dimension(),
        if graph.is_directed() { "directed" } else { "undirected" }
    );
    Ok(())
}

fn show_config(args: &Args, config: &Config) -> Result<()> {
    let source = match &args.config {
        Some(path) => path.display().to_string(),
        None => Config::config_path()?.display().to_string(),
    };
    println!("# {}", source);
    print!("{}", config.to_toml()?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbosity());
    let config = load_config(&args)?;

    match &args.command {
        Commands::Retrieve {
            graph,
            queries,
            format,
            workers,
            timeout_ms,
        } => {
            run_retrieve(&args, config, graph, queries, *format, *workers, *timeout_ms).await?;
        }
        Commands::Validate { graph } => {
            validate_graph(graph)?;
        }
        Commands::Config => {
            show_config(&args, &config)?;
        }
    }

    Ok(())
}
