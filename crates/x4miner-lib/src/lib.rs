//! x4miner library entry points.
//!
//! This crate loads an X4 universe snapshot into memory, resolves world
//! positions, builds the gate/station navigation graph, classifies hostile
//! and law-enforcing sectors, and ranks profitable trades using a memoized
//! shortest-path engine. Faction holdings and duplicate station codes can be
//! tallied from the same snapshot. Higher-level consumers (the CLI) should only depend
//! on the functions exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod census;
pub mod error;
pub mod graph;
pub mod legality;
pub mod output;
pub mod path;
pub mod placement;
pub mod proximity;
pub mod snapshot;
pub mod spatial;
pub mod trade;
pub mod universe;

pub use census::{duplicate_codes, faction_strengths, DuplicateCode, FactionStrength};
pub use error::{Error, Result};
pub use graph::{build_graph, Edge, EdgeKind, NavGraph, NodeId, NodeKind};
pub use legality::{classify_sectors, AvoidanceSets, AvoidanceVariant, SectorClassification};
pub use output::{DealSummary, DistanceSummary};
pub use path::{CacheStats, PathEngine};
pub use placement::{Component, ComponentTree};
pub use proximity::{nearest_stations, ProximityReport, ProximityTarget};
pub use snapshot::{
    default_snapshot_path, load_universe, parse_universe, resolve_snapshot_path, LoadOptions,
};
pub use spatial::SpatialIndex;
pub use trade::{rank_deals, Deal, TradeOrigin, TradeQuery, DEFAULT_RESULT_LIMIT};
pub use universe::{OfferRole, PlayerState, Position, Universe};

/// Graph, classification and avoid-sets derived from a universe, ready to
/// hand to a [`PathEngine`].
pub struct RoutingContext {
    pub graph: NavGraph,
    pub classification: SectorClassification,
    pub avoidance: AvoidanceSets,
}

impl RoutingContext {
    pub fn build(universe: &Universe) -> Self {
        let graph = build_graph(universe);
        let classification = classify_sectors(universe);
        let avoidance = AvoidanceSets::project(&graph, &classification);
        Self {
            graph,
            classification,
            avoidance,
        }
    }

    /// Fresh path engine borrowing this context's graph.
    pub fn engine(&self) -> PathEngine<'_> {
        PathEngine::new(&self.graph, self.avoidance.clone())
    }
}
