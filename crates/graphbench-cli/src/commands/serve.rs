//! Serve command - Run a database server until interrupted

use anyhow::{Context, Result};
use clap::Args;

use super::{load_config, open_driver, print_info};
use crate::progress::{finish_spinner, spinner};
use crate::GlobalOptions;

/// Arguments for the serve command
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Database name
    name: String,
}

/// Execute the serve command
pub async fn execute(args: ServeArgs, global: GlobalOptions) -> Result<()> {
    let config = load_config(&global)?;
    let mut driver = open_driver(&config)?;

    let pb = spinner(
        &format!("Starting server for '{}'...", args.name),
        global.quiet,
    );
    let info = driver
        .start_server(&args.name)
        .await
        .with_context(|| format!("Failed to start server for '{}'", args.name))?;
    finish_spinner(
        pb,
        &format!("Serving '{}' on {}:{}", info.name, info.host, info.port),
    );
    if let Some(pid) = info.pid {
        print_info(&format!("Server pid: {}", pid), global.quiet);
    }
    print_info("Press Ctrl-C to stop", global.quiet);

    let waited = tokio::signal::ctrl_c().await;

    driver
        .stop_server()
        .await
        .context("Failed to stop server")?;
    print_info("Server stopped", global.quiet);

    waited.context("Failed to listen for Ctrl-C")
}
