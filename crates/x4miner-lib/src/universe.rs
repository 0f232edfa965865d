use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::placement::ComponentTree;

/// World units per kilometre.
pub const UNITS_PER_KM: f64 = 1000.0;

/// Cartesian coordinates in world units (metres).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub z: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Calculate the Euclidean distance to another position.
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Component-wise sum.
    pub fn offset_by(&self, other: &Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }

    /// Truncate every coordinate toward zero.
    pub fn truncated(&self) -> Self {
        Self {
            x: self.x.trunc(),
            y: self.y.trunc(),
            z: self.z.trunc(),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.0}, {:.0}, {:.0})", self.x, self.y, self.z)
    }
}

/// A sector and the faction that owns it.
#[derive(Debug, Clone, PartialEq)]
pub struct Sector {
    pub code: String,
    pub name: Option<String>,
    pub owner: Option<String>,
}

impl Sector {
    /// Human-readable name, falling back to the sector code.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.code)
    }
}

/// A faction's standing toward the player and the wares it polices.
#[derive(Debug, Clone, PartialEq)]
pub struct Faction {
    pub id: String,
    pub relation: f64,
    pub illegal_wares: BTreeSet<String>,
}

/// A station with a resolved world position.
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub code: String,
    pub sector: String,
    pub owner: Option<String>,
    pub position: Position,
}

/// Reference from one gate to its paired counterpart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateLink {
    pub target: String,
    pub one_way: bool,
}

/// A jump gate, accelerator, or other connection point.
#[derive(Debug, Clone, PartialEq)]
pub struct Gate {
    pub id: Option<String>,
    pub sector: String,
    pub position: Position,
    pub group: Option<String>,
    pub link: Option<GateLink>,
}

/// Whether a station sells a ware to the player or buys it from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferRole {
    Buy,
    Sell,
}

/// A single buy or sell offer posted by a station.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeOffer {
    pub ware: String,
    pub station: usize,
    pub role: OfferRole,
    pub price: f64,
    pub amount: u64,
    pub illegal: bool,
    pub sector: String,
    pub position: Position,
}

/// Where the player currently is and what they can carry.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub sector: String,
    pub position: Position,
    pub credits: Option<f64>,
    pub cargo_capacity: Option<u64>,
}

/// In-memory representation of a universe snapshot.
#[derive(Debug, Clone, Default)]
pub struct Universe {
    pub sectors: HashMap<String, Sector>,
    pub factions: HashMap<String, Faction>,
    pub stations: Vec<Station>,
    pub gates: Vec<Gate>,
    pub offers: Vec<TradeOffer>,
    pub player: Option<PlayerState>,
    pub code_to_station: HashMap<String, usize>,
    pub components: ComponentTree,
}

impl Universe {
    /// Lookup a station index by its case-sensitive code.
    pub fn station_index(&self, code: &str) -> Option<usize> {
        self.code_to_station.get(code).copied()
    }

    /// Lookup a station index, suggesting similar codes when it is unknown.
    pub fn require_station(&self, code: &str) -> Result<usize> {
        self.station_index(code)
            .ok_or_else(|| Error::UnknownStation {
                code: code.to_string(),
                suggestions: self.fuzzy_station_matches(code, 3),
            })
    }

    /// World position of a component in the containment tree.
    pub fn locate_component(&self, id: &str) -> Result<Position> {
        self.components.resolve(id)
    }

    /// Sector containing a component: the first ancestor whose id, or
    /// macro name, matches a known sector code.
    pub fn component_sector(&self, id: &str) -> Result<Option<String>> {
        for ancestor in self.components.ancestry(id)? {
            if self.sectors.contains_key(&ancestor) {
                return Ok(Some(ancestor));
            }
            let macro_match = self
                .components
                .get(&ancestor)
                .and_then(|component| component.macro_name.as_deref())
                .and_then(|name| {
                    self.sectors
                        .keys()
                        .find(|code| code.eq_ignore_ascii_case(name))
                });
            if let Some(code) = macro_match {
                return Ok(Some(code.clone()));
            }
        }
        Ok(None)
    }

    /// Display name for a sector code, falling back to the code itself.
    pub fn sector_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.sectors
            .get(code)
            .map(Sector::display_name)
            .unwrap_or(code)
    }

    /// Owning faction of a sector, if known.
    pub fn sector_owner(&self, code: &str) -> Option<&str> {
        self.sectors.get(code).and_then(|s| s.owner.as_deref())
    }

    /// Whether the faction owning `sector` declares `ware` illegal.
    pub fn is_ware_illegal_in(&self, ware: &str, sector: &str) -> bool {
        self.sector_owner(sector)
            .and_then(|owner| self.factions.get(owner))
            .is_some_and(|faction| faction.illegal_wares.contains(ware))
    }

    /// Return up to `limit` station codes that resemble `code`, best match first.
    pub fn fuzzy_station_matches(&self, code: &str, limit: usize) -> Vec<String> {
        let needle = code.to_lowercase();
        let mut scored: Vec<(f64, &str)> = self
            .code_to_station
            .keys()
            .map(|candidate| {
                let score = strsim::jaro_winkler(&needle, &candidate.to_lowercase());
                (score, candidate.as_str())
            })
            .filter(|(score, _)| *score >= FUZZY_MATCH_THRESHOLD)
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        scored
            .into_iter()
            .take(limit)
            .map(|(_, candidate)| candidate.to_string())
            .collect()
    }
}

const FUZZY_MATCH_THRESHOLD: f64 = 0.8;
