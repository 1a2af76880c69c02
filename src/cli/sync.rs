//! Sync and relink command implementations

use crate::cli::output::{format_calls_json, format_calls_table};
use crate::cli::serve::{build_facade, load_config};
use crate::cli::{RelinkArgs, SyncArgs};
use anyhow::Result;

/// Handle `callsync sync`: one reconciliation pass, print claimed calls.
pub async fn run_sync(args: SyncArgs) -> Result<String> {
    let config = load_config(&args.config)?;
    config.validate()?;

    let facade = build_facade(&config)?;
    let entries = facade.calls_for_admin().await?;

    if args.json {
        Ok(format_calls_json(&entries))
    } else {
        Ok(format_calls_table(&entries))
    }
}

/// Handle `callsync relink`: relink pass, print the outcome counts.
pub async fn run_relink(args: RelinkArgs) -> Result<String> {
    let config = load_config(&args.config)?;
    config.validate()?;

    let facade = build_facade(&config)?;
    let outcome = facade.relink().await?;

    Ok(format!(
        "Relink complete: {} records linked, {} records created",
        outcome.updated, outcome.created
    ))
}
