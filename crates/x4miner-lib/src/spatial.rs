//! Resolved positions and sector membership for every navigation node.
//!
//! The index assigns node identifiers in the unified gates-then-stations
//! space used by the navigation graph, records each node's sector and world
//! position, and keeps one KD-tree per sector over station positions so that
//! "closest station" lookups do not have to scan the whole sector. Stations
//! sharing an exact position share one tree point.

use std::collections::HashMap;

use kiddo::float::kdtree::KdTree;
use kiddo::SquaredEuclidean;
use tracing::debug;

use crate::graph::{NodeId, NodeKind};
use crate::universe::{Position, Universe};

/// KD-tree bucket size (kiddo default).
const BUCKET_SIZE: usize = 32;

type StationTree = KdTree<f64, usize, 3, BUCKET_SIZE, u32>;

struct SectorStations {
    tree: StationTree,
    nodes: Vec<NodeId>,
    /// Station nodes at each distinct tree point.
    points: Vec<Vec<NodeId>>,
    point_ids: HashMap<[u64; 3], usize>,
}

impl SectorStations {
    fn new() -> Self {
        Self {
            tree: StationTree::new(),
            nodes: Vec::new(),
            points: Vec::new(),
            point_ids: HashMap::new(),
        }
    }

    fn insert(&mut self, node: NodeId, position: &Position) {
        self.nodes.push(node);
        let key = point_key(position);
        if let Some(&point) = self.point_ids.get(&key) {
            self.points[point].push(node);
            return;
        }
        let point = self.points.len();
        self.tree.add(&to_coords(position), point);
        self.point_ids.insert(key, point);
        self.points.push(vec![node]);
    }
}

/// Node-indexed positions with per-sector membership.
pub struct SpatialIndex {
    gate_count: usize,
    positions: Vec<Position>,
    sectors: Vec<String>,
    gates_by_sector: HashMap<String, Vec<NodeId>>,
    stations_by_sector: HashMap<String, SectorStations>,
}

impl SpatialIndex {
    /// Index every gate and station of the universe.
    pub fn build(universe: &Universe) -> Self {
        let gate_count = universe.gates.len();
        let node_count = gate_count + universe.stations.len();
        let mut positions = Vec::with_capacity(node_count);
        let mut sectors = Vec::with_capacity(node_count);
        let mut gates_by_sector: HashMap<String, Vec<NodeId>> = HashMap::new();
        let mut stations_by_sector: HashMap<String, SectorStations> = HashMap::new();

        for (index, gate) in universe.gates.iter().enumerate() {
            positions.push(gate.position);
            sectors.push(gate.sector.clone());
            gates_by_sector
                .entry(gate.sector.clone())
                .or_default()
                .push(index);
        }

        for (index, station) in universe.stations.iter().enumerate() {
            let node = gate_count + index;
            positions.push(station.position);
            sectors.push(station.sector.clone());

            stations_by_sector
                .entry(station.sector.clone())
                .or_insert_with(SectorStations::new)
                .insert(node, &station.position);
        }

        debug!(
            gates = gate_count,
            stations = universe.stations.len(),
            sectors_with_gates = gates_by_sector.len(),
            sectors_with_stations = stations_by_sector.len(),
            "built spatial index"
        );

        Self {
            gate_count,
            positions,
            sectors,
            gates_by_sector,
            stations_by_sector,
        }
    }

    /// Number of gate nodes; station nodes start at this offset.
    pub fn gate_count(&self) -> usize {
        self.gate_count
    }

    /// Total number of indexed nodes.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Classify a node as a gate or a station.
    pub fn kind(&self, node: NodeId) -> NodeKind {
        if node < self.gate_count {
            NodeKind::Gate(node)
        } else {
            NodeKind::Station(node - self.gate_count)
        }
    }

    /// Node identifier of a station index.
    pub fn station_node(&self, station: usize) -> NodeId {
        self.gate_count + station
    }

    pub fn position(&self, node: NodeId) -> Position {
        self.positions[node]
    }

    pub fn sector(&self, node: NodeId) -> &str {
        &self.sectors[node]
    }

    /// Gate nodes located in `sector`.
    pub fn gates_in_sector(&self, sector: &str) -> &[NodeId] {
        self.gates_by_sector
            .get(sector)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Station nodes located in `sector`.
    pub fn stations_in_sector(&self, sector: &str) -> &[NodeId] {
        self.stations_by_sector
            .get(sector)
            .map(|entry| entry.nodes.as_slice())
            .unwrap_or(&[])
    }

    /// Find the `k` stations in `sector` closest to `point`.
    ///
    /// Returns (station index, distance) pairs sorted by distance.
    pub fn nearest_stations(&self, sector: &str, point: Position, k: usize) -> Vec<(usize, f64)> {
        let Some(entry) = self.stations_by_sector.get(sector) else {
            return Vec::new();
        };
        if k == 0 {
            return Vec::new();
        }

        // Every point holds at least one station, so k points always suffice.
        let points = k.min(entry.points.len());
        entry
            .tree
            .nearest_n::<SquaredEuclidean>(&to_coords(&point), points)
            .into_iter()
            .flat_map(|neighbour| {
                let distance = neighbour.distance.sqrt();
                entry.points[neighbour.item]
                    .iter()
                    .map(move |&node| (node - self.gate_count, distance))
            })
            .take(k)
            .collect()
    }
}

fn to_coords(position: &Position) -> [f64; 3] {
    [position.x, position.y, position.z]
}

/// Bit pattern of a position, with negative zero folded into zero.
fn point_key(position: &Position) -> [u64; 3] {
    to_coords(position).map(|c| (c + 0.0).to_bits())
}
