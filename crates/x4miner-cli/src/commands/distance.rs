//! `distance`: shortest path between two stations.

use anyhow::Result;

use x4miner_lib::{AvoidanceVariant, DistanceSummary, RoutingContext};

use crate::commands::{load_snapshot, GlobalOptions};
use crate::output::{render_json, OutputFormat, TextRenderer};

/// Arguments for the distance command.
#[derive(Debug, Clone)]
pub struct DistanceArgs {
    pub from: String,
    pub to: String,
    pub avoid_hostile: bool,
    pub avoid_illegal: bool,
}

pub fn handle_distance(options: &GlobalOptions<'_>, args: &DistanceArgs) -> Result<()> {
    let universe = load_snapshot(options)?;
    let context = RoutingContext::build(&universe);
    let mut engine = context.engine();
    let variant = AvoidanceVariant::from_flags(args.avoid_hostile, args.avoid_illegal);

    let summary = DistanceSummary::between(&universe, &mut engine, &args.from, &args.to, variant)?;

    match options.format {
        OutputFormat::Json => render_json(&summary)?,
        OutputFormat::Text => print!("{}", TextRenderer::new(options.palette).distance(&summary)),
    }
    Ok(())
}
