//! `trades`: rank the most profitable deals in the snapshot.

use anyhow::Result;

use x4miner_lib::{
    rank_deals, DealSummary, Error as LibError, RoutingContext, TradeOrigin, TradeQuery, Universe,
};

use crate::commands::{load_snapshot, GlobalOptions};
use crate::output::{render_json, OutputFormat, TextRenderer};

/// Arguments for the trades command.
#[derive(Debug, Clone, Default)]
pub struct TradesArgs {
    pub limit: usize,
    pub max_cargo: Option<u64>,
    pub by_distance: bool,
    pub avoid_hostile: bool,
    pub avoid_illegal: bool,
    pub from_player: bool,
    pub credits: Option<f64>,
    pub cargo: Option<u64>,
}

impl TradesArgs {
    /// Build a library query, pulling the origin from the player when requested.
    pub fn to_query(&self, universe: &Universe) -> Result<TradeQuery, LibError> {
        let origin = if self.from_player {
            let player = universe.player.as_ref().ok_or(LibError::MissingPlayer)?;
            let mut origin = TradeOrigin::from(player);
            if self.credits.is_some() {
                origin.credits = self.credits;
            }
            if self.cargo.is_some() {
                origin.cargo_capacity = self.cargo;
            }
            Some(origin)
        } else {
            None
        };

        Ok(TradeQuery {
            limit: self.limit,
            max_cargo: self.max_cargo,
            rank_by_distance: self.by_distance,
            avoid_hostile: self.avoid_hostile,
            avoid_illegal: self.avoid_illegal,
            origin,
        })
    }
}

pub fn handle_trades(options: &GlobalOptions<'_>, args: &TradesArgs) -> Result<()> {
    let universe = load_snapshot(options)?;
    let query = args.to_query(&universe)?;

    let context = RoutingContext::build(&universe);
    let mut engine = context.engine();
    let deals = rank_deals(&universe, &mut engine, &query)?;

    let summaries: Vec<DealSummary> = deals
        .iter()
        .enumerate()
        .map(|(index, deal)| DealSummary::from_deal(&universe, &engine, index + 1, deal))
        .collect();

    match options.format {
        OutputFormat::Json => render_json(&summaries)?,
        OutputFormat::Text => {
            print!("{}", TextRenderer::new(options.palette).deals(&summaries));
        }
    }
    Ok(())
}
