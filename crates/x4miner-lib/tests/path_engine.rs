mod common;

use std::collections::HashSet;

use common::{two_sector_universe, UniverseBuilder};
use x4miner_lib::{
    build_graph, AvoidanceSets, AvoidanceVariant, NavGraph, PathEngine, RoutingContext,
};

fn route_weight(graph: &NavGraph, route: &[usize]) -> f64 {
    route
        .windows(2)
        .map(|pair| {
            graph
                .neighbours(pair[0])
                .iter()
                .filter(|edge| edge.target == pair[1])
                .map(|edge| edge.distance)
                .fold(f64::INFINITY, f64::min)
        })
        .sum()
}

/// Three sectors in a row, plus a detour sector `D` between `A` and `C`.
///
/// A --- B --- C
///  \         /
///   --- D ---
fn corridor() -> x4miner_lib::Universe {
    UniverseBuilder::new()
        .sector("A", None)
        .sector("B", None)
        .sector("C", None)
        .sector("D", None)
        .gate("A-B", "A", 0.0, Some("B-A"))
        .gate("A-D", "A", 100.0, Some("D-A"))
        .gate("B-A", "B", 0.0, None)
        .gate("B-C", "B", 10.0, Some("C-B"))
        .gate("C-B", "C", 0.0, None)
        .gate("C-D", "C", 100.0, None)
        .gate("D-A", "D", 0.0, None)
        .gate("D-C", "D", 1000.0, Some("C-D"))
        .station("SA", "A", 0.0)
        .station("SC", "C", 0.0)
        .build()
}

#[test]
fn two_linked_sectors_sum_both_flights() {
    let universe = two_sector_universe().build();
    let context = RoutingContext::build(&universe);
    let mut engine = context.engine();

    let sa = context.graph.station_node(0);
    let sb = context.graph.station_node(1);
    assert_eq!(engine.distance(AvoidanceVariant::None, sa, sb), 10.0);
    assert_eq!(engine.distance(AvoidanceVariant::None, sb, sa), 10.0);
}

#[test]
fn distance_to_self_is_zero_for_every_variant() {
    let universe = corridor();
    let graph = build_graph(&universe);
    let everything: HashSet<usize> = (0..graph.node_count()).collect();
    let avoid = AvoidanceSets::from_nodes(everything.clone(), everything);
    let mut engine = PathEngine::new(&graph, avoid);

    for variant in AvoidanceVariant::ALL {
        for node in 0..graph.node_count() {
            assert_eq!(engine.distance(variant, node, node), 0.0);
            assert_eq!(engine.route(variant, node, node), vec![node]);
        }
    }
}

#[test]
fn undirected_distances_are_symmetric() {
    let universe = two_sector_universe().station("SA2", "A", 40.0).build();
    let graph = build_graph(&universe);
    let mut engine = PathEngine::new(&graph, AvoidanceSets::default());

    for a in 0..graph.node_count() {
        for b in 0..graph.node_count() {
            let forward = engine.distance(AvoidanceVariant::None, a, b);
            let backward = engine.distance(AvoidanceVariant::None, b, a);
            assert_eq!(forward, backward, "asymmetric between {a} and {b}");
        }
    }
}

#[test]
fn one_way_links_are_directional() {
    let universe = UniverseBuilder::new()
        .sector("A", None)
        .sector("B", None)
        .one_way_gate("GA", "A", 0.0, "GB")
        .gate("GB", "B", 0.0, None)
        .station("SA", "A", 5.0)
        .station("SB", "B", 5.0)
        .build();
    let graph = build_graph(&universe);
    let mut engine = PathEngine::new(&graph, AvoidanceSets::default());
    let sa = graph.station_node(0);
    let sb = graph.station_node(1);

    assert_eq!(engine.distance(AvoidanceVariant::None, sa, sb), 10.0);
    assert!(engine.distance(AvoidanceVariant::None, sb, sa).is_infinite());
    assert!(engine.route(AvoidanceVariant::None, sb, sa).is_empty());
}

#[test]
fn avoided_sector_forces_the_detour() {
    let universe = corridor();
    let graph = build_graph(&universe);
    let b_nodes: HashSet<usize> = (0..graph.node_count())
        .filter(|&node| graph.sector(node) == "B")
        .collect();
    let mut engine = PathEngine::new(&graph, AvoidanceSets::from_nodes(b_nodes, HashSet::new()));
    let sa = graph.station_node(0);
    let sc = graph.station_node(1);

    assert_eq!(engine.distance(AvoidanceVariant::None, sa, sc), 10.0);
    // SA -> A-D (100), D-A -> D-C (1000), C-D -> SC (100).
    assert_eq!(engine.distance(AvoidanceVariant::Hostile, sa, sc), 1200.0);
    assert_eq!(engine.distance(AvoidanceVariant::Illegal, sa, sc), 10.0);
    assert_eq!(engine.distance(AvoidanceVariant::Both, sa, sc), 1200.0);
}

#[test]
fn enlarging_the_avoid_set_never_shortens_paths() {
    let universe = corridor();
    let graph = build_graph(&universe);
    let d_nodes: HashSet<usize> = (0..graph.node_count())
        .filter(|&node| graph.sector(node) == "D")
        .collect();
    let b_nodes: HashSet<usize> = (0..graph.node_count())
        .filter(|&node| graph.sector(node) == "B")
        .collect();
    let avoid = AvoidanceSets::from_nodes(d_nodes.clone(), b_nodes.clone());
    let mut engine = PathEngine::new(&graph, avoid);
    let avoided_by_both: HashSet<usize> = d_nodes.union(&b_nodes).copied().collect();

    for a in 0..graph.node_count() {
        for b in 0..graph.node_count() {
            let free = engine.distance(AvoidanceVariant::None, a, b);
            let hostile = engine.distance(AvoidanceVariant::Hostile, a, b);
            let illegal = engine.distance(AvoidanceVariant::Illegal, a, b);
            let both = engine.distance(AvoidanceVariant::Both, a, b);

            assert!(hostile >= free);
            assert!(illegal >= free);
            if !avoided_by_both.contains(&a) && !avoided_by_both.contains(&b) {
                assert!(both >= hostile);
                assert!(both >= illegal);
            }
        }
    }
}

#[test]
fn avoided_endpoints_are_reachable_but_not_transited() {
    let universe = corridor();
    let graph = build_graph(&universe);
    let c_nodes: HashSet<usize> = (0..graph.node_count())
        .filter(|&node| graph.sector(node) == "C")
        .collect();
    let c_gate = (0..graph.gate_count())
        .find(|&node| graph.sector(node) == "C")
        .expect("gate in C");
    let mut engine = PathEngine::new(&graph, AvoidanceSets::from_nodes(c_nodes, HashSet::new()));
    let sa = graph.station_node(0);
    let sc = graph.station_node(1);

    // The gate into C is itself avoided but still reachable as a goal.
    assert!(engine.distance(AvoidanceVariant::Hostile, sa, c_gate).is_finite());
    // Reaching the station requires flying through an avoided gate.
    assert!(engine.distance(AvoidanceVariant::Hostile, sa, sc).is_infinite());
    // Leaving the sector from inside also needs an avoided gate.
    assert!(engine.distance(AvoidanceVariant::Hostile, sc, sa).is_infinite());
    assert_eq!(engine.distance(AvoidanceVariant::None, sc, sa), 10.0);
}

#[test]
fn route_weights_sum_to_distance() {
    let universe = corridor();
    let graph = build_graph(&universe);
    let b_nodes: HashSet<usize> = (0..graph.node_count())
        .filter(|&node| graph.sector(node) == "B")
        .collect();
    let mut engine = PathEngine::new(&graph, AvoidanceSets::from_nodes(b_nodes, HashSet::new()));

    for variant in [AvoidanceVariant::None, AvoidanceVariant::Hostile] {
        for a in 0..graph.node_count() {
            for b in 0..graph.node_count() {
                let distance = engine.distance(variant, a, b);
                let route = engine.route(variant, a, b);
                if distance.is_infinite() {
                    assert!(route.is_empty());
                } else {
                    assert_eq!(route.first(), Some(&a));
                    assert_eq!(route.last(), Some(&b));
                    assert!((route_weight(&graph, &route) - distance).abs() < 1e-9);
                }
            }
        }
    }
}

#[test]
fn repeated_queries_hit_the_cache() {
    let universe = corridor();
    let graph = build_graph(&universe);
    let mut engine = PathEngine::new(&graph, AvoidanceSets::default());
    let sa = graph.station_node(0);
    let sc = graph.station_node(1);

    engine.distance(AvoidanceVariant::None, sa, sc);
    engine.distance(AvoidanceVariant::None, sa, sc);
    engine.distance(AvoidanceVariant::None, sa, 0);
    engine.distance(AvoidanceVariant::Hostile, sa, sc);

    let stats = engine.stats();
    assert_eq!(stats.tables, 2, "one table per (variant, start)");
    assert_eq!(stats.pair_hits, 1);
    assert_eq!(stats.table_hits, 1);
}

#[test]
fn out_of_range_nodes_are_unreachable() {
    let universe = corridor();
    let graph = build_graph(&universe);
    let mut engine = PathEngine::new(&graph, AvoidanceSets::default());

    assert!(engine.distance(AvoidanceVariant::None, 0, 999).is_infinite());
    assert!(engine.route(AvoidanceVariant::None, 999, 0).is_empty());
}

#[test]
fn point_to_station_prefers_direct_flight_in_sector() {
    let universe = two_sector_universe().build();
    let graph = build_graph(&universe);
    let mut engine = PathEngine::new(&graph, AvoidanceSets::default());

    let here = x4miner_lib::Position::new(8.0, 0.0, 0.0);
    assert_eq!(
        engine.point_to_station_distance(here, "A", 0, AvoidanceVariant::None),
        3.0
    );
    // 8 to gate A, then 5 from gate B.
    assert_eq!(
        engine.point_to_station_distance(here, "A", 1, AvoidanceVariant::None),
        13.0
    );
    assert!(engine
        .point_to_station_distance(here, "nowhere", 1, AvoidanceVariant::None)
        .is_infinite());
}
