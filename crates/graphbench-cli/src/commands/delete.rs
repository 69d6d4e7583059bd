//! Delete command - Remove a database and its dump

use anyhow::{Context, Result};
use clap::Args;

use super::{load_config, open_driver, print_info};
use crate::GlobalOptions;

/// Arguments for the delete command
#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Database name
    name: String,
}

/// Execute the delete command
pub async fn execute(args: DeleteArgs, global: GlobalOptions) -> Result<()> {
    let config = load_config(&global)?;
    let mut driver = open_driver(&config)?;

    if !driver.exists(&args.name).await? {
        print_info(
            &format!("Database '{}' does not exist", args.name),
            global.quiet,
        );
        return Ok(());
    }

    driver
        .delete(&args.name)
        .await
        .with_context(|| format!("Failed to delete database '{}'", args.name))?;
    print_info(&format!("Deleted database '{}'", args.name), global.quiet);
    Ok(())
}
