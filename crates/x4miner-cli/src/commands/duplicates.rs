//! `duplicates`: station codes shared by more than one station.

use anyhow::Result;
use tracing::debug;

use x4miner_lib::duplicate_codes;

use crate::commands::{load_snapshot, GlobalOptions};
use crate::output::{render_json, OutputFormat, TextRenderer};

/// Report every shared code, or only `code` when given.
pub fn handle_duplicates(options: &GlobalOptions<'_>, code: Option<&str>) -> Result<()> {
    let universe = load_snapshot(options)?;
    let duplicates = duplicate_codes(&universe, code);
    debug!(codes = duplicates.len(), "collected duplicate station codes");

    match options.format {
        OutputFormat::Json => render_json(&duplicates)?,
        OutputFormat::Text => print!(
            "{}",
            TextRenderer::new(options.palette).duplicates(&duplicates)
        ),
    }
    Ok(())
}
