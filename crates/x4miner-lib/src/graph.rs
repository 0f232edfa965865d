use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::spatial::SpatialIndex;
use crate::universe::{Position, Universe};

/// Identifier in the unified node space: gates first, then stations.
pub type NodeId = usize;

/// What a node identifier refers to, carrying the index into the
/// universe's gate or station list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Gate(usize),
    Station(usize),
}

/// Classification for the edge used in the navigation graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EdgeKind {
    /// Explicit gate-to-gate pairing (jump gate, accelerator).
    Link,
    /// Gates sharing a group key.
    Group,
    /// Flight between two gates of the same sector.
    Flight,
    /// Flight between a station and a gate of its sector.
    Dock,
}

impl EdgeKind {
    /// Whether travelling along this edge is modelled as instantaneous.
    pub fn is_instant(self) -> bool {
        matches!(self, EdgeKind::Link | EdgeKind::Group)
    }
}

/// Edge within the navigation graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub target: NodeId,
    pub kind: EdgeKind,
    pub distance: f64,
}

/// Sparse weighted graph over gates and stations.
pub struct NavGraph {
    spatial: SpatialIndex,
    adjacency: Vec<Vec<Edge>>,
}

impl NavGraph {
    /// Number of gate nodes; station nodes start at this offset.
    pub fn gate_count(&self) -> usize {
        self.spatial.gate_count()
    }

    pub fn station_count(&self) -> usize {
        self.node_count() - self.gate_count()
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn kind(&self, node: NodeId) -> NodeKind {
        self.spatial.kind(node)
    }

    /// Node identifier of a station index.
    pub fn station_node(&self, station: usize) -> NodeId {
        self.spatial.station_node(station)
    }

    /// Return the outgoing edges of a node.
    pub fn neighbours(&self, node: NodeId) -> &[Edge] {
        self.adjacency
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn sector(&self, node: NodeId) -> &str {
        self.spatial.sector(node)
    }

    pub fn position(&self, node: NodeId) -> Position {
        self.spatial.position(node)
    }

    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    /// Total number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    fn add_edge(&mut self, from: NodeId, to: NodeId, kind: EdgeKind, distance: f64) {
        self.adjacency[from].push(Edge {
            target: to,
            kind,
            distance,
        });
    }

    fn add_undirected(&mut self, a: NodeId, b: NodeId, kind: EdgeKind, distance: f64) {
        self.add_edge(a, b, kind, distance);
        self.add_edge(b, a, kind, distance);
    }
}

/// Build the navigation graph for a universe.
///
/// Gates sharing a group key and explicitly paired gates are joined by
/// zero-weight edges (paired links keep their one-way direction). Gates in
/// the same sector are joined pairwise by their straight-line distance, and
/// every station is joined to every gate of its sector. Entities without
/// peers in their sector stay isolated.
pub fn build_graph(universe: &Universe) -> NavGraph {
    let spatial = SpatialIndex::build(universe);
    let node_count = spatial.len();
    let mut graph = NavGraph {
        spatial,
        adjacency: vec![Vec::new(); node_count],
    };

    add_group_edges(&mut graph, universe);
    add_link_edges(&mut graph, universe);
    add_sector_edges(&mut graph, universe);
    add_dock_edges(&mut graph, universe);

    debug!(
        nodes = graph.node_count(),
        gates = graph.gate_count(),
        stations = graph.station_count(),
        edges = graph.edge_count(),
        "built navigation graph"
    );

    graph
}

fn add_group_edges(graph: &mut NavGraph, universe: &Universe) {
    let mut groups: HashMap<&str, Vec<NodeId>> = HashMap::new();
    for (node, gate) in universe.gates.iter().enumerate() {
        if let Some(group) = gate.group.as_deref() {
            groups.entry(group).or_default().push(node);
        }
    }

    for members in groups.values() {
        for (i, &a) in members.iter().enumerate() {
            for &b in &members[i + 1..] {
                graph.add_undirected(a, b, EdgeKind::Group, 0.0);
            }
        }
    }
}

fn add_link_edges(graph: &mut NavGraph, universe: &Universe) {
    let by_id: HashMap<&str, NodeId> = universe
        .gates
        .iter()
        .enumerate()
        .filter_map(|(node, gate)| gate.id.as_deref().map(|id| (id, node)))
        .collect();
    // Gates that name each other would otherwise push every edge twice.
    let mut linked: HashSet<(NodeId, NodeId)> = HashSet::new();

    for (node, gate) in universe.gates.iter().enumerate() {
        let Some(link) = gate.link.as_ref() else {
            continue;
        };
        let Some(&target) = by_id.get(link.target.as_str()) else {
            warn!(
                gate = gate.id.as_deref().unwrap_or("<unnamed>"),
                target = %link.target,
                "gate link points at an unknown gate"
            );
            continue;
        };
        if target == node {
            continue;
        }

        let mut pairs = vec![(node, target)];
        if !link.one_way {
            pairs.push((target, node));
        }
        for (from, to) in pairs {
            if linked.insert((from, to)) {
                graph.add_edge(from, to, EdgeKind::Link, 0.0);
            }
        }
    }
}

fn add_sector_edges(graph: &mut NavGraph, universe: &Universe) {
    let mut sectors: HashMap<&str, Vec<NodeId>> = HashMap::new();
    for (node, gate) in universe.gates.iter().enumerate() {
        sectors.entry(gate.sector.as_str()).or_default().push(node);
    }

    for gates in sectors.values() {
        for (i, &a) in gates.iter().enumerate() {
            for &b in &gates[i + 1..] {
                let distance = graph.position(a).distance_to(&graph.position(b));
                graph.add_undirected(a, b, EdgeKind::Flight, distance);
            }
        }
    }
}

fn add_dock_edges(graph: &mut NavGraph, universe: &Universe) {
    for (index, station) in universe.stations.iter().enumerate() {
        let node = graph.station_node(index);
        let gates = graph.spatial.gates_in_sector(&station.sector).to_vec();
        for gate in gates {
            let distance = station.position.distance_to(&graph.position(gate));
            graph.add_undirected(node, gate, EdgeKind::Dock, distance);
        }
    }
}
