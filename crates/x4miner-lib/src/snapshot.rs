//! Snapshot document loading.
//!
//! A snapshot is the JSON rendition of a savegame produced by the archive and
//! XML extraction tooling. Loading converts it into a [`Universe`]: positions
//! are resolved through the component tree, malformed entities are dropped
//! with a diagnostic, and offer legality is derived where the document leaves
//! it out.

use std::collections::{BTreeSet, HashMap};
use std::env;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use flate2::read::GzDecoder;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::placement::{Component, ComponentTree};
use crate::universe::{
    Faction, Gate, GateLink, OfferRole, PlayerState, Position, Sector, Station, TradeOffer,
    Universe,
};

/// Default filename for the snapshot document.
const SNAPSHOT_FILENAME: &str = "snapshot.json";

/// Environment variable overriding the snapshot location.
pub const SNAPSHOT_ENV_VAR: &str = "X4MINER_SNAPSHOT";

const WRECK_STATE: &str = "wreck";

/// Knobs applied while converting a snapshot into a [`Universe`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Keep stations whose state is `wreck`.
    pub include_wrecks: bool,
}

/// Resolve the default snapshot location using platform-specific project directories.
pub fn default_snapshot_path() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("com", "x4miner", "x4miner").ok_or(Error::ProjectDirsUnavailable)?;
    Ok(dirs.data_dir().join(SNAPSHOT_FILENAME))
}

/// Resolve the snapshot path to load.
///
/// The resolution order is:
/// 1. Explicit `target` argument when provided.
/// 2. `X4MINER_SNAPSHOT` environment variable.
/// 3. Platform-specific project data directory.
pub fn resolve_snapshot_path(target: Option<&Path>) -> Result<PathBuf> {
    let path = if let Some(explicit) = target {
        explicit.to_path_buf()
    } else if let Some(env_path) = env::var_os(SNAPSHOT_ENV_VAR) {
        PathBuf::from(env_path)
    } else {
        default_snapshot_path()?
    };

    if !path.is_file() {
        return Err(Error::SnapshotNotFound { path });
    }
    Ok(path)
}

/// Load a snapshot document from disk. Files ending in `.gz` are decompressed.
pub fn load_universe(path: &Path, options: LoadOptions) -> Result<Universe> {
    let file = File::open(path).map_err(|err| match err.kind() {
        std::io::ErrorKind::NotFound => Error::SnapshotNotFound {
            path: path.to_path_buf(),
        },
        _ => Error::Io(err),
    })?;

    let reader: Box<dyn Read> = if path.extension().is_some_and(|ext| ext == "gz") {
        Box::new(GzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let document: SnapshotDocument = serde_json::from_reader(reader)?;
    debug!(path = %path.display(), "decoded snapshot document");
    Ok(build_universe(document, options))
}

/// Parse a snapshot document held in memory.
pub fn parse_universe(json: &str, options: LoadOptions) -> Result<Universe> {
    let document: SnapshotDocument = serde_json::from_str(json)?;
    Ok(build_universe(document, options))
}

/// Top-level shape of a snapshot. Entity lists stay as raw JSON values so
/// each entry is decoded on its own and a malformed one only costs itself.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SnapshotDocument {
    sectors: Vec<Value>,
    factions: Vec<Value>,
    components: Vec<Value>,
    zone_offsets: HashMap<String, Value>,
    stations: Vec<Value>,
    gates: Vec<Value>,
    offers: Vec<Value>,
    player: Option<Value>,
}

/// Decode every entry of an entity list, skipping those that do not fit `T`.
fn decode_entries<T: DeserializeOwned>(kind: &'static str, values: Vec<Value>) -> Vec<T> {
    let total = values.len();
    let decoded: Vec<T> = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| decode_entry(kind, index, value))
        .collect();
    if decoded.len() < total {
        debug!(kind, total, kept = decoded.len(), "dropped malformed entries");
    }
    decoded
}

fn decode_entry<T: DeserializeOwned>(kind: &'static str, index: usize, value: Value) -> Option<T> {
    match serde_json::from_value(value) {
        Ok(entry) => Some(entry),
        Err(err) => {
            warn!(kind, index, error = %err, "skipping malformed entry");
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSector {
    code: String,
    name: Option<String>,
    owner: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFaction {
    id: String,
    #[serde(default)]
    relation: f64,
    #[serde(default)]
    illegal_wares: BTreeSet<String>,
}

#[derive(Debug, Deserialize)]
struct RawComponent {
    id: String,
    parent: Option<String>,
    class: Option<String>,
    #[serde(rename = "macro")]
    macro_name: Option<String>,
    #[serde(default)]
    offset: Position,
}

#[derive(Debug, Deserialize)]
struct RawStation {
    code: Option<String>,
    sector: Option<String>,
    owner: Option<String>,
    position: Option<Position>,
    component: Option<String>,
    state: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawGate {
    id: Option<String>,
    sector: Option<String>,
    position: Option<Position>,
    component: Option<String>,
    group: Option<String>,
    link_id: Option<String>,
    #[serde(default)]
    one_way: bool,
}

#[derive(Debug, Deserialize)]
struct RawOffer {
    station: String,
    ware: String,
    role: OfferRole,
    price: f64,
    #[serde(default)]
    amount: u64,
    illegal: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawPlayer {
    sector: String,
    position: Option<Position>,
    component: Option<String>,
    credits: Option<f64>,
    cargo_capacity: Option<u64>,
}

fn build_universe(document: SnapshotDocument, options: LoadOptions) -> Universe {
    let zone_offsets = document
        .zone_offsets
        .into_iter()
        .filter_map(|(name, value)| match serde_json::from_value::<Position>(value) {
            Ok(offset) => Some((name, offset)),
            Err(err) => {
                warn!(zone = %name, error = %err, "skipping malformed zone offset");
                None
            }
        })
        .collect();
    let tree = ComponentTree::new(
        decode_entries::<RawComponent>("component", document.components)
            .into_iter()
            .map(|raw| Component {
                id: raw.id,
                parent: raw.parent,
                class: raw.class,
                macro_name: raw.macro_name,
                offset: raw.offset,
            })
            .collect(),
        zone_offsets,
    );

    let raw_sectors: Vec<RawSector> = decode_entries("sector", document.sectors);
    let sectors: HashMap<String, Sector> = raw_sectors
        .into_iter()
        .map(|raw| {
            (
                raw.code.clone(),
                Sector {
                    code: raw.code,
                    name: raw.name,
                    owner: raw.owner,
                },
            )
        })
        .collect();

    let raw_factions: Vec<RawFaction> = decode_entries("faction", document.factions);
    let factions: HashMap<String, Faction> = raw_factions
        .into_iter()
        .map(|raw| {
            (
                raw.id.clone(),
                Faction {
                    id: raw.id,
                    relation: raw.relation,
                    illegal_wares: raw.illegal_wares,
                },
            )
        })
        .collect();

    let mut universe = Universe {
        sectors,
        factions,
        ..Universe::default()
    };

    load_stations(
        &mut universe,
        &tree,
        decode_entries("station", document.stations),
        options,
    );
    load_gates(&mut universe, &tree, decode_entries("gate", document.gates));
    load_offers(&mut universe, decode_entries("offer", document.offers));
    universe.player = document
        .player
        .and_then(|value| decode_entry::<RawPlayer>("player", 0, value))
        .and_then(|raw| load_player(&tree, raw));

    info!(
        sectors = universe.sectors.len(),
        stations = universe.stations.len(),
        gates = universe.gates.len(),
        offers = universe.offers.len(),
        components = tree.len(),
        "loaded snapshot"
    );

    universe.components = tree;
    universe
}

fn load_stations(
    universe: &mut Universe,
    tree: &ComponentTree,
    raw_stations: Vec<RawStation>,
    options: LoadOptions,
) {
    for raw in raw_stations {
        let Some(code) = raw.code else {
            warn!("skipping station without a code");
            continue;
        };
        if raw.state.as_deref() == Some(WRECK_STATE) && !options.include_wrecks {
            debug!(code = %code, "skipping wrecked station");
            continue;
        }
        let Some(sector) = raw.sector else {
            warn!(code = %code, "skipping station without a sector");
            continue;
        };
        let Some(position) = entity_position(tree, raw.position, raw.component.as_deref())
        else {
            warn!(code = %code, "skipping station without a resolvable position");
            continue;
        };

        let index = universe.stations.len();
        if universe.code_to_station.contains_key(&code) {
            warn!(code = %code, "duplicate station code; keeping the first for lookups");
        } else {
            universe.code_to_station.insert(code.clone(), index);
        }
        universe.stations.push(Station {
            code,
            sector,
            owner: raw.owner,
            position,
        });
    }
}

fn load_gates(universe: &mut Universe, tree: &ComponentTree, raw_gates: Vec<RawGate>) {
    for raw in raw_gates {
        let label = raw.id.as_deref().unwrap_or("<unnamed>").to_string();
        let Some(sector) = raw.sector else {
            warn!(gate = %label, "skipping gate without a sector");
            continue;
        };
        let Some(position) = entity_position(tree, raw.position, raw.component.as_deref())
        else {
            warn!(gate = %label, "skipping gate without a resolvable position");
            continue;
        };

        universe.gates.push(Gate {
            id: raw.id,
            sector,
            position,
            group: raw.group,
            link: raw.link_id.map(|target| GateLink {
                target,
                one_way: raw.one_way,
            }),
        });
    }
}

fn load_offers(universe: &mut Universe, raw_offers: Vec<RawOffer>) {
    for raw in raw_offers {
        let Some(station_index) = universe.station_index(&raw.station) else {
            warn!(station = %raw.station, ware = %raw.ware, "skipping offer for unknown station");
            continue;
        };
        if !raw.price.is_finite() || raw.price < 0.0 {
            warn!(station = %raw.station, ware = %raw.ware, price = raw.price, "skipping offer with invalid price");
            continue;
        }

        let station = &universe.stations[station_index];
        let illegal = raw
            .illegal
            .unwrap_or_else(|| universe.is_ware_illegal_in(&raw.ware, &station.sector));
        let offer = TradeOffer {
            ware: raw.ware,
            station: station_index,
            role: raw.role,
            price: raw.price,
            amount: raw.amount,
            illegal,
            sector: station.sector.clone(),
            position: station.position,
        };
        universe.offers.push(offer);
    }
}

fn load_player(tree: &ComponentTree, raw: RawPlayer) -> Option<PlayerState> {
    let Some(position) = entity_position(tree, raw.position, raw.component.as_deref()) else {
        warn!("ignoring player location without a resolvable position");
        return None;
    };
    Some(PlayerState {
        sector: raw.sector,
        position,
        credits: raw.credits,
        cargo_capacity: raw.cargo_capacity,
    })
}

fn entity_position(
    tree: &ComponentTree,
    literal: Option<Position>,
    component: Option<&str>,
) -> Option<Position> {
    if literal.is_some() {
        return literal;
    }
    let id = component?;
    match tree.resolve(id) {
        Ok(position) => Some(position),
        Err(err) => {
            warn!(component = %id, error = %err, "failed to resolve component position");
            None
        }
    }
}
