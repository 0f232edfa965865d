//! Whole-universe tallies: faction holdings and station code collisions.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::universe::{Position, Universe};

/// Owner label used for sectors and stations without an owner.
pub const UNOWNED: &str = "unowned";

/// Sectors and stations held by one owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactionStrength {
    pub faction: String,
    /// Relation to the player, when the faction table lists the owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relation: Option<f64>,
    pub sectors: usize,
    pub stations: usize,
}

/// Count sectors and stations per owner, ordered by owner id.
pub fn faction_strengths(universe: &Universe) -> Vec<FactionStrength> {
    let mut counts: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for sector in universe.sectors.values() {
        counts
            .entry(sector.owner.as_deref().unwrap_or(UNOWNED))
            .or_default()
            .0 += 1;
    }
    for station in &universe.stations {
        counts
            .entry(station.owner.as_deref().unwrap_or(UNOWNED))
            .or_default()
            .1 += 1;
    }

    counts
        .into_iter()
        .map(|(faction, (sectors, stations))| FactionStrength {
            faction: faction.to_string(),
            relation: universe.factions.get(faction).map(|f| f.relation),
            sectors,
            stations,
        })
        .collect()
}

/// One of several stations sharing a code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateEntry {
    pub sector: String,
    pub sector_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub position: Position,
    /// Whether lookups by code resolve to this station.
    pub resolved: bool,
}

/// A station code used by more than one station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateCode {
    pub code: String,
    pub stations: Vec<DuplicateEntry>,
}

/// Station codes shared by two or more stations, ordered by code.
///
/// With `code` set, only that code is reported (and only if it is shared).
pub fn duplicate_codes(universe: &Universe, code: Option<&str>) -> Vec<DuplicateCode> {
    let mut by_code: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (index, station) in universe.stations.iter().enumerate() {
        if code.is_some_and(|wanted| wanted != station.code) {
            continue;
        }
        by_code.entry(station.code.as_str()).or_default().push(index);
    }

    by_code
        .into_iter()
        .filter(|(_, indices)| indices.len() > 1)
        .map(|(code, indices)| {
            let resolved = universe.station_index(code);
            DuplicateCode {
                code: code.to_string(),
                stations: indices
                    .into_iter()
                    .map(|index| {
                        let station = &universe.stations[index];
                        DuplicateEntry {
                            sector: station.sector.clone(),
                            sector_name: universe.sector_name(&station.sector).to_string(),
                            owner: station.owner.clone(),
                            position: station.position,
                            resolved: resolved == Some(index),
                        }
                    })
                    .collect(),
            }
        })
        .collect()
}
