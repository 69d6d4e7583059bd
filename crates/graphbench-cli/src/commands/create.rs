//! Create command - Build a database from a random graph

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;

use super::{load_config, load_graph, open_driver, GraphArgs};
use crate::progress::{finish_spinner, spinner};
use crate::GlobalOptions;

/// Arguments for the create command
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Database name (defaults to Fake_N<nodes>_D<degree>_F<features>)
    #[arg(long)]
    name: Option<String>,

    #[command(flatten)]
    graph: GraphArgs,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the create command
pub async fn execute(args: CreateArgs, global: GlobalOptions) -> Result<()> {
    let config = load_config(&global)?;
    let name = args
        .name
        .clone()
        .unwrap_or_else(|| args.graph.spec().database_name());

    let mut driver = open_driver(&config)?;
    let graph = load_graph(&config, &args.graph, global.quiet || args.json)?;

    let pb = spinner(
        &format!("Creating database '{}'...", name),
        global.quiet || args.json,
    );
    let db_path = driver
        .create(&name, &graph)
        .await
        .with_context(|| format!("Failed to create database '{}'", name))?;
    finish_spinner(pb, &format!("Created database '{}'", name));

    if args.json {
        let output = json!({
            "name": name,
            "backend": driver.kind(),
            "db_path": db_path,
            "num_nodes": graph.num_nodes(),
            "num_edges": graph.num_edges(),
            "feature_dim": graph.feature_dim(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !global.quiet {
        println!("{}", db_path.display());
    }

    Ok(())
}
