//! `factions`: sectors and stations held by each owner.

use anyhow::Result;

use x4miner_lib::faction_strengths;

use crate::commands::{load_snapshot, GlobalOptions};
use crate::output::{render_json, OutputFormat, TextRenderer};

pub fn handle_factions(options: &GlobalOptions<'_>) -> Result<()> {
    let universe = load_snapshot(options)?;
    let strengths = faction_strengths(&universe);

    match options.format {
        OutputFormat::Json => render_json(&strengths)?,
        OutputFormat::Text => print!("{}", TextRenderer::new(options.palette).factions(&strengths)),
    }
    Ok(())
}
