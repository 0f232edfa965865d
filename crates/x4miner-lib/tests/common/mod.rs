//! Shared fixtures for the library integration tests.

use std::collections::BTreeSet;
use std::path::PathBuf;

use x4miner_lib::universe::{Faction, Gate, GateLink, Sector, Station, TradeOffer};
use x4miner_lib::{OfferRole, Position, Universe};

/// Path to the checked-in JSON snapshot.
#[allow(dead_code)]
pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures/minimal_snapshot.json")
}

/// Small fluent builder for in-memory universes.
#[allow(dead_code)]
#[derive(Default)]
pub struct UniverseBuilder {
    universe: Universe,
}

#[allow(dead_code)]
impl UniverseBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sector(mut self, code: &str, owner: Option<&str>) -> Self {
        self.universe.sectors.insert(
            code.to_string(),
            Sector {
                code: code.to_string(),
                name: Some(format!("Sector {code}")),
                owner: owner.map(str::to_string),
            },
        );
        self
    }

    pub fn faction(mut self, id: &str, relation: f64, illegal_wares: &[&str]) -> Self {
        self.universe.factions.insert(
            id.to_string(),
            Faction {
                id: id.to_string(),
                relation,
                illegal_wares: illegal_wares
                    .iter()
                    .map(|ware| ware.to_string())
                    .collect::<BTreeSet<_>>(),
            },
        );
        self
    }

    pub fn gate(mut self, id: &str, sector: &str, x: f64, link: Option<&str>) -> Self {
        self.universe.gates.push(Gate {
            id: Some(id.to_string()),
            sector: sector.to_string(),
            position: Position::new(x, 0.0, 0.0),
            group: None,
            link: link.map(|target| GateLink {
                target: target.to_string(),
                one_way: false,
            }),
        });
        self
    }

    pub fn one_way_gate(mut self, id: &str, sector: &str, x: f64, link: &str) -> Self {
        self = self.gate(id, sector, x, Some(link));
        if let Some(gate) = self.universe.gates.last_mut() {
            if let Some(link) = gate.link.as_mut() {
                link.one_way = true;
            }
        }
        self
    }

    pub fn grouped_gate(mut self, id: &str, sector: &str, x: f64, group: &str) -> Self {
        self = self.gate(id, sector, x, None);
        if let Some(gate) = self.universe.gates.last_mut() {
            gate.group = Some(group.to_string());
        }
        self
    }

    pub fn station(mut self, code: &str, sector: &str, x: f64) -> Self {
        let index = self.universe.stations.len();
        self.universe.stations.push(Station {
            code: code.to_string(),
            sector: sector.to_string(),
            owner: None,
            position: Position::new(x, 0.0, 0.0),
        });
        self.universe.code_to_station.insert(code.to_string(), index);
        self
    }

    pub fn offer(
        mut self,
        station: &str,
        ware: &str,
        role: OfferRole,
        price: f64,
        amount: u64,
        illegal: bool,
    ) -> Self {
        let index = self.universe.code_to_station[station];
        let station = &self.universe.stations[index];
        self.universe.offers.push(TradeOffer {
            ware: ware.to_string(),
            station: index,
            role,
            price,
            amount,
            illegal,
            sector: station.sector.clone(),
            position: station.position,
        });
        self
    }

    pub fn build(self) -> Universe {
        self.universe
    }
}

/// Two sectors joined by a gate pair; one station five units from each gate.
///
/// Node layout: gates `GA` (0) and `GB` (1), stations `SA` (2) and `SB` (3).
#[allow(dead_code)]
pub fn two_sector_universe() -> UniverseBuilder {
    UniverseBuilder::new()
        .sector("A", Some("argon"))
        .sector("B", Some("teladi"))
        .faction("argon", 0.5, &[])
        .faction("teladi", 0.2, &[])
        .gate("GA", "A", 0.0, Some("GB"))
        .gate("GB", "B", 0.0, None)
        .station("SA", "A", 5.0)
        .station("SB", "B", -5.0)
}
