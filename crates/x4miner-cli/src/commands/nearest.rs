//! `nearest`: closest stations to a station, a component, or the player.

use anyhow::Result;

use x4miner_lib::{nearest_stations, ProximityTarget, SpatialIndex};

use crate::commands::{load_snapshot, GlobalOptions};
use crate::output::{render_json, OutputFormat, TextRenderer};

/// Arguments for the nearest command.
#[derive(Debug, Clone)]
pub struct NearestArgs {
    pub station: Option<String>,
    pub component: Option<String>,
    pub count: usize,
}

impl NearestArgs {
    pub fn target(&self) -> ProximityTarget {
        match (&self.station, &self.component) {
            (Some(code), _) => ProximityTarget::Station(code.clone()),
            (None, Some(id)) => ProximityTarget::Component(id.clone()),
            (None, None) => ProximityTarget::Player,
        }
    }
}

pub fn handle_nearest(options: &GlobalOptions<'_>, args: &NearestArgs) -> Result<()> {
    let universe = load_snapshot(options)?;
    let spatial = SpatialIndex::build(&universe);
    let report = nearest_stations(&universe, &spatial, &args.target(), args.count)?;

    match options.format {
        OutputFormat::Json => render_json(&report)?,
        OutputFormat::Text => print!("{}", TextRenderer::new(options.palette).proximity(&report)),
    }
    Ok(())
}
