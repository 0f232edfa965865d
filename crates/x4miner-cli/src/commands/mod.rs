//! Subcommand handlers. `main.rs` parses arguments and dispatches here.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use x4miner_lib::{load_universe, resolve_snapshot_path, LoadOptions, Universe};

use crate::output::OutputFormat;
use crate::terminal::ColorPalette;

pub mod distance;
pub mod duplicates;
pub mod factions;
pub mod locate;
pub mod nearest;
pub mod trades;

/// Settings shared by every subcommand.
#[derive(Debug, Clone, Copy)]
pub struct GlobalOptions<'a> {
    pub snapshot: Option<&'a Path>,
    pub format: OutputFormat,
    pub palette: ColorPalette,
    pub include_wrecks: bool,
}

/// Resolve and load the snapshot named by the global options.
pub fn load_snapshot(options: &GlobalOptions<'_>) -> Result<Universe> {
    let path = resolve_snapshot_path(options.snapshot)
        .context("failed to locate the universe snapshot")?;
    debug!(path = %path.display(), "loading snapshot");
    load_universe(
        &path,
        LoadOptions {
            include_wrecks: options.include_wrecks,
        },
    )
    .with_context(|| format!("failed to load snapshot from {}", path.display()))
}
