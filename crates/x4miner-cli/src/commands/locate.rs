//! `locate`: world position of a component id.

use anyhow::Result;

use crate::commands::{load_snapshot, GlobalOptions};
use crate::output::{render_json, LocationSummary, OutputFormat, TextRenderer};

pub fn handle_locate(options: &GlobalOptions<'_>, component: &str) -> Result<()> {
    let universe = load_snapshot(options)?;
    let position = universe.locate_component(component)?;
    let sector = universe.component_sector(component)?;
    let summary = LocationSummary {
        component: component.to_string(),
        sector_name: sector
            .as_deref()
            .map(|code| universe.sector_name(code).to_string()),
        sector,
        position,
    };

    match options.format {
        OutputFormat::Json => render_json(&summary)?,
        OutputFormat::Text => print!("{}", TextRenderer::new(options.palette).location(&summary)),
    }
    Ok(())
}
