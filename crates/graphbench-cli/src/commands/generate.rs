//! Generate command - Generate and cache a random graph

use anyhow::{Context, Result};
use clap::Args;
use graphbench_core::generate::{random_graph, save_graph};
use serde_json::json;

use super::{load_config, load_graph, GraphArgs};
use crate::progress::{finish_spinner, spinner};
use crate::GlobalOptions;

/// Arguments for the generate command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    graph: GraphArgs,

    /// Replace a cached graph with the same parameters
    #[arg(long, short = 'f')]
    force: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the generate command
pub async fn execute(args: GenerateArgs, global: GlobalOptions) -> Result<()> {
    let config = load_config(&global)?;
    let quiet = global.quiet || args.json;
    let spec = args.graph.spec();
    let cache_dir = config.graph_cache_dir();
    let path = cache_dir.join(spec.cache_file_name());

    let graph = if args.force {
        let pb = spinner(&format!("Generating {}...", spec.cache_file_name()), quiet);
        let graph = random_graph(&spec).context("Failed to generate graph")?;
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create {}", cache_dir.display()))?;
        save_graph(&graph, &path).context("Failed to cache graph")?;
        finish_spinner(pb, &format!("Generated {}", spec.cache_file_name()));
        graph
    } else {
        load_graph(&config, &args.graph, quiet)?
    };

    if args.json {
        let output = json!({
            "path": path,
            "database_name": spec.database_name(),
            "num_nodes": graph.num_nodes(),
            "num_edges": graph.num_edges(),
            "feature_dim": graph.feature_dim(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !global.quiet {
        println!("{}", path.display());
    }

    Ok(())
}
