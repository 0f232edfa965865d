//! Variant-aware shortest paths over the navigation graph.
//!
//! [`PathEngine`] is the routing context for a single run: it borrows the
//! immutable graph, owns the per-variant avoid-sets, and memoizes one full
//! single-source distance table per `(variant, start)` pair. Cache storage
//! is partitioned by variant; a table computed under one variant is never
//! consulted for another.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use tracing::debug;

use crate::graph::{NavGraph, NodeId};
use crate::legality::{AvoidanceSets, AvoidanceVariant};
use crate::universe::Position;

/// Hit/miss counters for the distance caches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Single-source tables computed.
    pub tables: usize,
    /// Lookups answered from the pairwise memo.
    pub pair_hits: usize,
    /// Lookups answered from an existing table.
    pub table_hits: usize,
}

#[derive(Debug, Default)]
struct PathCache {
    tables: HashMap<NodeId, Vec<f64>>,
    pairs: HashMap<(NodeId, NodeId), f64>,
}

/// Shortest-path engine with per-variant memoization.
pub struct PathEngine<'g> {
    graph: &'g NavGraph,
    avoid: AvoidanceSets,
    caches: [PathCache; 4],
    stats: CacheStats,
}

impl<'g> PathEngine<'g> {
    pub fn new(graph: &'g NavGraph, avoid: AvoidanceSets) -> Self {
        Self {
            graph,
            avoid,
            caches: Default::default(),
            stats: CacheStats::default(),
        }
    }

    pub fn graph(&self) -> &'g NavGraph {
        self.graph
    }

    pub fn avoidance(&self) -> &AvoidanceSets {
        &self.avoid
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Shortest path cost from `start` to `goal`, or `f64::INFINITY` when
    /// no path exists under `variant`.
    ///
    /// Avoided nodes may be the start or the goal but are never transited.
    pub fn distance(&mut self, variant: AvoidanceVariant, start: NodeId, goal: NodeId) -> f64 {
        if start >= self.graph.node_count() || goal >= self.graph.node_count() {
            return f64::INFINITY;
        }

        let cache = &mut self.caches[variant.slot()];
        if let Some(&distance) = cache.pairs.get(&(start, goal)) {
            self.stats.pair_hits += 1;
            return distance;
        }

        if cache.tables.contains_key(&start) {
            self.stats.table_hits += 1;
        } else {
            let table = single_source(self.graph, &self.avoid, variant, start, false).0;
            cache.tables.insert(start, table);
            self.stats.tables += 1;
        }

        let distance = cache.tables[&start][goal];
        cache.pairs.insert((start, goal), distance);
        distance
    }

    /// Reconstruct the node sequence of a shortest path, or an empty vector
    /// when `goal` is unreachable. Not memoized.
    pub fn route(&self, variant: AvoidanceVariant, start: NodeId, goal: NodeId) -> Vec<NodeId> {
        if start >= self.graph.node_count() || goal >= self.graph.node_count() {
            return Vec::new();
        }
        if start == goal {
            return vec![start];
        }

        let (distances, parents) = single_source(self.graph, &self.avoid, variant, start, true);
        if !distances[goal].is_finite() {
            return Vec::new();
        }
        reconstruct_path(&parents, start, goal)
    }

    /// Distance from an arbitrary point to a station.
    ///
    /// A direct flight is considered when the point lies in the station's
    /// sector; otherwise (and additionally) the point departs through each
    /// gate of its own sector and the cheapest combination wins.
    pub fn point_to_station_distance(
        &mut self,
        position: Position,
        sector: &str,
        station: usize,
        variant: AvoidanceVariant,
    ) -> f64 {
        let graph = self.graph;
        if station >= graph.station_count() {
            return f64::INFINITY;
        }
        let target = graph.station_node(station);
        let mut best = f64::INFINITY;

        if graph.sector(target) == sector {
            best = position.distance_to(&graph.position(target));
        }

        for &gate in graph.spatial().gates_in_sector(sector) {
            let to_gate = position.distance_to(&graph.position(gate));
            if to_gate >= best {
                continue;
            }
            let total = to_gate + self.distance(variant, gate, target);
            if total < best {
                best = total;
            }
        }

        best
    }

    /// Emit cache statistics at debug level.
    pub fn log_stats(&self) {
        debug!(
            tables = self.stats.tables,
            pair_hits = self.stats.pair_hits,
            table_hits = self.stats.table_hits,
            "path cache statistics"
        );
    }
}

/// Dijkstra from `start` over the whole graph, running until the queue is empty.
fn single_source(
    graph: &NavGraph,
    avoid: &AvoidanceSets,
    variant: AvoidanceVariant,
    start: NodeId,
    track_parents: bool,
) -> (Vec<f64>, Vec<Option<NodeId>>) {
    let node_count = graph.node_count();
    let mut distances = vec![f64::INFINITY; node_count];
    let mut parents = if track_parents {
        vec![None; node_count]
    } else {
        Vec::new()
    };
    let mut queue = BinaryHeap::new();

    distances[start] = 0.0;
    queue.push(QueueEntry::new(start, 0.0));

    while let Some(entry) = queue.pop() {
        if entry.cost.0 > distances[entry.node] {
            continue;
        }
        // Avoided nodes are reachable endpoints but never relay a path.
        if entry.node != start && avoid.avoids(variant, entry.node) {
            continue;
        }

        for edge in graph.neighbours(entry.node) {
            let next_cost = entry.cost.0 + edge.distance;
            if next_cost < distances[edge.target] {
                distances[edge.target] = next_cost;
                if track_parents {
                    parents[edge.target] = Some(entry.node);
                }
                queue.push(QueueEntry::new(edge.target, next_cost));
            }
        }
    }

    (distances, parents)
}

fn reconstruct_path(parents: &[Option<NodeId>], start: NodeId, goal: NodeId) -> Vec<NodeId> {
    let mut path = Vec::new();
    let mut current = Some(goal);
    while let Some(node) = current {
        path.push(node);
        if node == start {
            break;
        }
        current = parents[node];
    }
    path.reverse();
    path
}

#[derive(Copy, Clone, Debug, Default)]
pub(crate) struct FloatOrd(pub(crate) f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: NodeId,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: NodeId, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
