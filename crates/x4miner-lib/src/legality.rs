//! Hostile and law-enforcing sector classification.
//!
//! Sectors are classified from the standing of their owning faction toward
//! the player and from the wares that faction polices. The sector sets are
//! then projected onto navigation nodes so the path engine can skip them.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use serde::Serialize;

use crate::graph::{NavGraph, NodeId};
use crate::universe::Universe;

/// Owner relations strictly below this value make a sector hostile.
pub const HOSTILE_RELATION_THRESHOLD: f64 = -0.25;

/// Named avoidance policy selecting which nodes a path may not transit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AvoidanceVariant {
    None,
    Hostile,
    Illegal,
    Both,
}

impl AvoidanceVariant {
    pub const ALL: [AvoidanceVariant; 4] = [
        AvoidanceVariant::None,
        AvoidanceVariant::Hostile,
        AvoidanceVariant::Illegal,
        AvoidanceVariant::Both,
    ];

    /// Combine the two avoidance switches into a variant.
    pub fn from_flags(avoid_hostile: bool, avoid_illegal: bool) -> Self {
        match (avoid_hostile, avoid_illegal) {
            (false, false) => AvoidanceVariant::None,
            (true, false) => AvoidanceVariant::Hostile,
            (false, true) => AvoidanceVariant::Illegal,
            (true, true) => AvoidanceVariant::Both,
        }
    }

    /// Variant for a trade leg: illegality only restricts legs that carry contraband.
    pub fn for_trade(illegal_trade: bool, avoid_hostile: bool, avoid_illegal: bool) -> Self {
        Self::from_flags(avoid_hostile, avoid_illegal && illegal_trade)
    }

    /// Stable slot used to keep per-variant storage apart.
    pub fn slot(self) -> usize {
        match self {
            AvoidanceVariant::None => 0,
            AvoidanceVariant::Hostile => 1,
            AvoidanceVariant::Illegal => 2,
            AvoidanceVariant::Both => 3,
        }
    }
}

impl fmt::Display for AvoidanceVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            AvoidanceVariant::None => "none",
            AvoidanceVariant::Hostile => "hostile",
            AvoidanceVariant::Illegal => "illegal",
            AvoidanceVariant::Both => "both",
        };
        f.write_str(value)
    }
}

/// Sector codes that are hostile to the player or police at least one ware.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SectorClassification {
    pub hostile_sectors: BTreeSet<String>,
    pub illegal_sectors: BTreeSet<String>,
}

impl SectorClassification {
    pub fn is_hostile(&self, sector: &str) -> bool {
        self.hostile_sectors.contains(sector)
    }

    pub fn is_illegal(&self, sector: &str) -> bool {
        self.illegal_sectors.contains(sector)
    }
}

/// Classify every sector of the universe by its owner's standing and laws.
///
/// Sectors without an owner, or whose owner has no faction entry, are
/// treated as neutral and lawless.
pub fn classify_sectors(universe: &Universe) -> SectorClassification {
    let mut classification = SectorClassification::default();

    for sector in universe.sectors.values() {
        let Some(faction) = sector
            .owner
            .as_deref()
            .and_then(|owner| universe.factions.get(owner))
        else {
            continue;
        };

        if faction.relation < HOSTILE_RELATION_THRESHOLD {
            classification.hostile_sectors.insert(sector.code.clone());
        }
        if !faction.illegal_wares.is_empty() {
            classification.illegal_sectors.insert(sector.code.clone());
        }
    }

    classification
}

/// Per-variant node sets that paths may not transit.
#[derive(Debug, Clone, Default)]
pub struct AvoidanceSets {
    sets: [HashSet<NodeId>; 4],
}

impl AvoidanceSets {
    /// Project sector classifications onto graph nodes by sector membership.
    pub fn project(graph: &NavGraph, classification: &SectorClassification) -> Self {
        let mut hostile = HashSet::new();
        let mut illegal = HashSet::new();

        for node in 0..graph.node_count() {
            let sector = graph.sector(node);
            if classification.is_hostile(sector) {
                hostile.insert(node);
            }
            if classification.is_illegal(sector) {
                illegal.insert(node);
            }
        }

        let both = hostile.union(&illegal).copied().collect();
        Self {
            sets: [HashSet::new(), hostile, illegal, both],
        }
    }

    /// Build sets directly, mainly for tests and ad-hoc restrictions.
    pub fn from_nodes(hostile: HashSet<NodeId>, illegal: HashSet<NodeId>) -> Self {
        let both = hostile.union(&illegal).copied().collect();
        Self {
            sets: [HashSet::new(), hostile, illegal, both],
        }
    }

    pub fn nodes(&self, variant: AvoidanceVariant) -> &HashSet<NodeId> {
        &self.sets[variant.slot()]
    }

    pub fn avoids(&self, variant: AvoidanceVariant, node: NodeId) -> bool {
        self.sets[variant.slot()].contains(&node)
    }
}
