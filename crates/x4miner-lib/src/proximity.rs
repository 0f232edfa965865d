//! Nearest-station lookups inside a sector.
//!
//! Given a target (a station, a component, or the player), report the
//! closest stations in the same sector together with the direction from
//! each station to the target along the three world axes.

use serde::Serialize;

use crate::error::{Error, Result};
use crate::spatial::SpatialIndex;
use crate::universe::{Position, Universe, UNITS_PER_KM};

/// Station owners never offered as a reference point.
pub const IGNORED_OWNERS: [&str; 2] = ["khaak", "xenon"];

/// What a proximity query is centred on.
#[derive(Debug, Clone, PartialEq)]
pub enum ProximityTarget {
    Station(String),
    Component(String),
    Player,
}

/// Signed offset along one world axis expressed as a compass label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisOffset {
    pub axis: char,
    pub direction: &'static str,
    /// Whole kilometres, truncated toward zero.
    pub km: u64,
}

impl AxisOffset {
    fn new(axis: char, delta: f64, positive: &'static str, negative: &'static str) -> Self {
        Self {
            axis,
            direction: if delta > 0.0 { positive } else { negative },
            km: (delta.abs() / UNITS_PER_KM) as u64,
        }
    }
}

/// Where the target lies relative to a reference point: east/west on X,
/// above/below on Y, north/south on Z.
pub fn axis_offsets(reference: &Position, target: &Position) -> [AxisOffset; 3] {
    [
        AxisOffset::new('x', target.x - reference.x, "east", "west"),
        AxisOffset::new('y', target.y - reference.y, "above", "below"),
        AxisOffset::new('z', target.z - reference.z, "north", "south"),
    ]
}

/// One nearby station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyStation {
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub position: Position,
    pub distance_km: f64,
    pub target_offsets: [AxisOffset; 3],
}

/// Distance from the player to the target, when both share a sector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerProximity {
    pub distance_km: f64,
    pub target_offsets: [AxisOffset; 3],
}

/// Result of a proximity query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProximityReport {
    pub target: String,
    pub sector: String,
    pub sector_name: String,
    pub position: Position,
    pub stations: Vec<NearbyStation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerProximity>,
}

/// Find the `k` closest eligible stations to `target` within its sector.
pub fn nearest_stations(
    universe: &Universe,
    spatial: &SpatialIndex,
    target: &ProximityTarget,
    k: usize,
) -> Result<ProximityReport> {
    let (label, sector, position, exclude) = match target {
        ProximityTarget::Station(code) => {
            let index = universe.require_station(code)?;
            let station = &universe.stations[index];
            (
                station.code.clone(),
                station.sector.clone(),
                station.position,
                Some(index),
            )
        }
        ProximityTarget::Component(id) => {
            let position = universe.locate_component(id)?;
            let sector = universe
                .component_sector(id)?
                .ok_or_else(|| Error::InvalidQuery {
                    message: format!("component {id} is not inside a known sector"),
                })?;
            (id.clone(), sector, position, None)
        }
        ProximityTarget::Player => {
            let player = universe.player.as_ref().ok_or(Error::MissingPlayer)?;
            ("player".to_string(), player.sector.clone(), player.position, None)
        }
    };

    let candidates = spatial.stations_in_sector(&sector).len();
    let stations = spatial
        .nearest_stations(&sector, position, candidates)
        .into_iter()
        .filter(|&(index, _)| Some(index) != exclude)
        .filter(|&(index, _)| {
            universe.stations[index]
                .owner
                .as_deref()
                .is_none_or(|owner| !IGNORED_OWNERS.contains(&owner))
        })
        .take(k)
        .map(|(index, distance)| {
            let station = &universe.stations[index];
            NearbyStation {
                code: station.code.clone(),
                owner: station.owner.clone(),
                position: station.position,
                distance_km: distance / UNITS_PER_KM,
                target_offsets: axis_offsets(&station.position, &position),
            }
        })
        .collect();

    let player = match (target, universe.player.as_ref()) {
        (ProximityTarget::Player, _) | (_, None) => None,
        (_, Some(player)) if player.sector != sector => None,
        (_, Some(player)) => Some(PlayerProximity {
            distance_km: player.position.distance_to(&position) / UNITS_PER_KM,
            target_offsets: axis_offsets(&player.position, &position),
        }),
    };

    Ok(ProximityReport {
        target: label,
        sector_name: universe.sector_name(&sector).to_string(),
        sector,
        position,
        stations,
        player,
    })
}
