//! Status command - Show databases under the data directory

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use graphbench_backend::{validate_name, DatabaseStatus, Driver};
use serde_json::json;

use super::{load_config, open_driver};
use crate::GlobalOptions;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Show a single database
    name: Option<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Execute the status command
pub async fn execute(args: StatusArgs, global: GlobalOptions) -> Result<()> {
    let config = load_config(&global)?;
    let driver = open_driver(&config)?;

    let names = match args.name {
        Some(ref name) => vec![name.clone()],
        None => database_names(&config.storage.data_path, &config.graph_cache_dir())?,
    };

    let mut statuses = Vec::with_capacity(names.len());
    for name in &names {
        statuses.push(status_of(driver.as_ref(), name).await?);
    }

    if args.json {
        let output = json!({
            "backend": config.backend.kind,
            "data_path": config.storage.data_path,
            "port": config.server.port,
            "databases": statuses,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("graphbench Status");
    println!("=================\n");
    println!("Backend:   {}", config.backend.kind);
    println!("Data path: {}", config.storage.data_path.display());
    println!("Port:      {}", config.server.port);
    println!();

    if statuses.is_empty() {
        println!("No databases found.");
        return Ok(());
    }

    for status in &statuses {
        let state = if !status.exists {
            "absent"
        } else if status.server.is_some() {
            "serving"
        } else {
            "created"
        };
        let dump = if status.dump_path.is_some() {
            "dump kept"
        } else {
            "no dump"
        };
        println!("  {:<32} {:<8} {}", status.name, state, dump);
    }

    Ok(())
}

async fn status_of(driver: &dyn Driver, name: &str) -> Result<DatabaseStatus> {
    driver
        .status(name)
        .await
        .with_context(|| format!("Failed to read status of '{}'", name))
}

/// Directories under `data_path` that look like databases, sorted.
fn database_names(data_path: &Path, graph_cache: &Path) -> Result<Vec<String>> {
    if !data_path.is_dir() {
        return Ok(Vec::new());
    }

    let entries = std::fs::read_dir(data_path)
        .with_context(|| format!("Failed to read {}", data_path.display()))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() || path == graph_cache {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if validate_name(name).is_ok() {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}
