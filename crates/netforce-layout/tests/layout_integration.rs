use std::collections::HashMap;

use netforce_layout::{
    layout, run_layout, Graph, LayoutConfig, LayoutContext, LayoutError, LayoutRequest, SetupKind,
    SimulationParameters, StopReason, Vector2D,
};

fn diamond() -> Graph<&'static str> {
    [
        ("vl1", "vl2"),
        ("vl2", "a"),
        ("vl2", "b"),
        ("a", "c"),
        ("b", "c"),
    ]
    .into_iter()
    .collect()
}

#[test]
fn every_vertex_gets_a_position() {
    let mut graph = diamond();
    graph.add_vertex("isolated");
    let outcome = layout(&graph, &LayoutConfig::default(), LayoutRequest::default()).unwrap();

    assert_eq!(outcome.positions.len(), 6);
    for v in graph.vertices() {
        assert!(outcome.positions[v].is_finite(), "{v} has no finite position");
    }
    assert!(outcome.stats.iterations <= SimulationParameters::default().max_iterations);
}

#[test]
fn diamond_layout_is_spread_out() {
    let config = LayoutConfig::default();
    let outcome = layout(&diamond(), &config, LayoutRequest::default()).unwrap();
    let p = &outcome.positions;

    let names: Vec<&str> = p.keys().copied().collect();
    for (i, a) in names.iter().enumerate() {
        for b in &names[i + 1..] {
            assert!(p[a].distance_to(&p[b]) > 1.0, "{a} and {b} overlap");
        }
    }

    let netforce_layout::Algorithm::Spring(spring) = &config.algorithm else {
        unreachable!()
    };
    let length = spring.spring_length;
    for (a, b) in diamond().edges() {
        let d = p[a].distance_to(&p[b]);
        assert!(d > 0.1 * length && d < 5.0 * length, "edge {a}-{b} has length {d}");
    }
}

#[test]
fn same_seed_same_layout() {
    let config = LayoutConfig {
        setup: SetupKind::SquareRandom {
            seed: 42,
            side: 200.0,
        },
        ..Default::default()
    };
    let first = layout(&diamond(), &config, LayoutRequest::default()).unwrap();
    let second = layout(&diamond(), &config, LayoutRequest::default()).unwrap();
    assert_eq!(first.positions, second.positions);
    assert_eq!(first.stats.iterations, second.stats.iterations);
}

#[test]
fn fixed_vertices_stay_and_free_vertices_move() {
    let request = LayoutRequest {
        fixed_positions: HashMap::from([
            ("vl1", Vector2D::new(0.123456789, -98.7654321)),
            ("c", Vector2D::new(300.0, 300.0)),
        ]),
        initial_positions: HashMap::from([("a", Vector2D::new(50.0, 50.0))]),
        ..Default::default()
    };
    let outcome = layout(&diamond(), &LayoutConfig::default(), request).unwrap();
    assert_eq!(outcome.positions["vl1"], Vector2D::new(0.123456789, -98.7654321));
    assert_eq!(outcome.positions["c"], Vector2D::new(300.0, 300.0));
    assert!(outcome.positions["a"].distance_to(&Vector2D::new(50.0, 50.0)) > 1e-6);
}

#[test]
fn all_fixed_graph_returns_input_without_iterating() {
    let graph: Graph<&str> = [("p", "q")].into_iter().collect();
    let request = LayoutRequest {
        fixed_positions: HashMap::from([
            ("p", Vector2D::new(1.0, 0.0)),
            ("q", Vector2D::new(2.0, 1.0)),
        ]),
        ..Default::default()
    };
    let outcome = layout(&graph, &LayoutConfig::default(), request).unwrap();
    assert_eq!(outcome.stats.iterations, 0);
    assert_eq!(outcome.stats.stop_reason, StopReason::NothingToMove);
    assert_eq!(outcome.positions["p"], Vector2D::new(1.0, 0.0));
    assert_eq!(outcome.positions["q"], Vector2D::new(2.0, 1.0));
}

#[test]
fn two_points_terminate() {
    let graph: Graph<u32> = [(1, 2)].into_iter().collect();
    let outcome = layout(&graph, &LayoutConfig::default(), LayoutRequest::default()).unwrap();
    assert!(matches!(
        outcome.stats.stop_reason,
        StopReason::Converged | StopReason::MaxIterations
    ));
    assert!(outcome.positions[&1].distance_to(&outcome.positions[&2]) > 1.0);
}

#[test]
fn atlas2_settles_around_the_center() {
    let config = LayoutConfig {
        simulation: SimulationParameters {
            max_iterations: 3000,
            ..LayoutConfig::atlas2().simulation
        },
        ..LayoutConfig::atlas2()
    };
    let outcome = layout(&diamond(), &config, LayoutRequest::default()).unwrap();
    assert_eq!(outcome.positions.len(), 5);
    assert_eq!(outcome.stats.stop_reason, StopReason::Converged);
    for p in outcome.positions.values() {
        assert!(p.is_finite());
    }

    let centroid = outcome
        .positions
        .values()
        .fold(Vector2D::ZERO, |acc, p| acc + *p)
        / outcome.positions.len() as f64;
    assert!(
        centroid.magnitude() < 50.0,
        "layout drifted to {centroid:?}"
    );
}

#[test]
fn passthrough_setup_needs_every_position() {
    let config = LayoutConfig {
        setup: SetupKind::Passthrough,
        ..Default::default()
    };
    let request = LayoutRequest {
        initial_positions: HashMap::from([("vl1", Vector2D::ZERO)]),
        ..Default::default()
    };
    let err = layout(&diamond(), &config, request).unwrap_err();
    assert!(matches!(err, LayoutError::MissingInitialPosition { .. }));
}

#[test]
fn run_layout_returns_the_context() {
    let mut ctx = LayoutContext::new(&diamond());
    ctx.set_fixed_positions([("vl1", Vector2D::new(5.0, 5.0))]);
    let (ctx, stats) = run_layout(ctx, &LayoutConfig::default()).unwrap();
    assert!(ctx.is_fixed(&"vl1"));
    assert_eq!(ctx.point(&"vl1").unwrap().position(), Vector2D::new(5.0, 5.0));
    assert_eq!(ctx.moving_points().len(), 4);
    assert!(stats.iterations > 0);
}
