use std::fmt::Write;

use serde::Serialize;

use crate::error::Result;
use crate::graph::NodeId;
use crate::legality::AvoidanceVariant;
use crate::path::PathEngine;
use crate::trade::Deal;
use crate::universe::{Position, Universe, UNITS_PER_KM};

/// Station on one side of a deal or distance query.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StationEndpoint {
    pub code: String,
    pub sector: String,
    pub sector_name: String,
    pub position: Position,
}

impl StationEndpoint {
    fn new(universe: &Universe, station: usize) -> Self {
        let station = &universe.stations[station];
        Self {
            code: station.code.clone(),
            sector: station.sector.clone(),
            sector_name: universe.sector_name(&station.sector).to_string(),
            position: station.position,
        }
    }

    fn label(&self) -> String {
        format!("{} ({})", self.code, self.sector_name)
    }
}

/// Price and amount posted by one side of a deal.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OfferSide {
    pub station: StationEndpoint,
    pub price: f64,
    pub amount: u64,
}

/// Structured representation of a ranked deal.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DealSummary {
    pub rank: usize,
    pub ware: String,
    pub illegal: bool,
    pub seller: OfferSide,
    pub buyer: OfferSide,
    pub quantity: u64,
    pub profit_per_unit: f64,
    pub total_profit: f64,
    pub trade_distance_km: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_distance_km: Option<f64>,
    pub score: f64,
    pub variant: AvoidanceVariant,
    /// Sector names visited between seller and buyer, consecutive repeats removed.
    pub route: Vec<String>,
}

impl DealSummary {
    /// Resolve station and sector names for a ranked deal and render its route.
    pub fn from_deal(
        universe: &Universe,
        engine: &PathEngine<'_>,
        rank: usize,
        deal: &Deal,
    ) -> Self {
        let seller = &universe.offers[deal.seller];
        let buyer = &universe.offers[deal.buyer];
        let graph = engine.graph();
        let nodes = engine.route(
            deal.variant,
            graph.station_node(seller.station),
            graph.station_node(buyer.station),
        );

        Self {
            rank,
            ware: deal.ware.clone(),
            illegal: seller.illegal || buyer.illegal,
            seller: OfferSide {
                station: StationEndpoint::new(universe, seller.station),
                price: seller.price,
                amount: seller.amount,
            },
            buyer: OfferSide {
                station: StationEndpoint::new(universe, buyer.station),
                price: buyer.price,
                amount: buyer.amount,
            },
            quantity: deal.quantity,
            profit_per_unit: deal.profit_per_unit,
            total_profit: deal.total_profit,
            trade_distance_km: deal.trade_distance / UNITS_PER_KM,
            origin_distance_km: deal.origin_distance.map(|d| d / UNITS_PER_KM),
            score: deal.score,
            variant: deal.variant,
            route: sector_route(universe, engine, &nodes),
        }
    }

    /// Plain-text rendering used in logs and non-interactive output.
    pub fn render_plain(&self) -> String {
        let mut buffer = String::new();
        let _ = writeln!(
            buffer,
            "#{} {}{}: {} x{} -> {}",
            self.rank,
            self.ware,
            if self.illegal { " [illegal]" } else { "" },
            self.seller.station.label(),
            self.quantity,
            self.buyer.station.label(),
        );
        let _ = writeln!(
            buffer,
            "    buy at {:.2}, sell at {:.2}, profit {:.2}/unit, {:.2} total",
            self.seller.price, self.buyer.price, self.profit_per_unit, self.total_profit
        );
        let _ = write!(buffer, "    distance {:.1} km", self.trade_distance_km);
        if let Some(origin) = self.origin_distance_km {
            let _ = write!(buffer, " (+{origin:.1} km to pick up)");
        }
        let _ = writeln!(buffer, ", score {:.2}, avoiding {}", self.score, self.variant);
        if !self.route.is_empty() {
            let _ = writeln!(buffer, "    route: {}", self.route.join(" -> "));
        }
        buffer
    }
}

/// Shortest path between two stations.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DistanceSummary {
    pub from: StationEndpoint,
    pub to: StationEndpoint,
    pub variant: AvoidanceVariant,
    pub reachable: bool,
    /// Distance in kilometres; absent when no route exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    pub route: Vec<String>,
}

impl DistanceSummary {
    /// Route between two station codes under `variant`.
    pub fn between(
        universe: &Universe,
        engine: &mut PathEngine<'_>,
        from: &str,
        to: &str,
        variant: AvoidanceVariant,
    ) -> Result<Self> {
        let from_index = universe.require_station(from)?;
        let to_index = universe.require_station(to)?;
        let graph = engine.graph();
        let start = graph.station_node(from_index);
        let goal = graph.station_node(to_index);

        let distance = engine.distance(variant, start, goal);
        let reachable = distance.is_finite();
        let route = if reachable {
            sector_route(universe, engine, &engine.route(variant, start, goal))
        } else {
            Vec::new()
        };

        Ok(Self {
            from: StationEndpoint::new(universe, from_index),
            to: StationEndpoint::new(universe, to_index),
            variant,
            reachable,
            distance_km: reachable.then(|| distance / UNITS_PER_KM),
            route,
        })
    }

    pub fn render_plain(&self) -> String {
        let mut buffer = String::new();
        match self.distance_km {
            Some(km) => {
                let _ = writeln!(
                    buffer,
                    "{} -> {}: {:.1} km (avoiding {})",
                    self.from.label(),
                    self.to.label(),
                    km,
                    self.variant
                );
                let _ = writeln!(buffer, "route: {}", self.route.join(" -> "));
            }
            None => {
                let _ = writeln!(
                    buffer,
                    "{} -> {}: unreachable (avoiding {})",
                    self.from.label(),
                    self.to.label(),
                    self.variant
                );
            }
        }
        buffer
    }
}

/// Collapse a node path into the sequence of sector names it passes through.
pub fn sector_route(universe: &Universe, engine: &PathEngine<'_>, nodes: &[NodeId]) -> Vec<String> {
    let graph = engine.graph();
    let mut route: Vec<String> = Vec::new();
    for &node in nodes {
        let name = universe.sector_name(graph.sector(node));
        if route.last().map(String::as_str) != Some(name) {
            route.push(name.to_string());
        }
    }
    route
}
