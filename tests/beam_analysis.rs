use approx::assert_relative_eq;
use rc_beam::prelude::*;

fn env_usize(name: &str, default_val: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&v| v > 0)
        .unwrap_or(default_val)
}

fn simple_span(length: f64, loads: Vec<Load>) -> Beam {
    Beam::from_nodes(
        vec![Node::simple(0.0), Node::simple(length)],
        Material::elastic(2500.0),
        Section::rectangular(20.0, 50.0),
        LoadSet::new(loads).unwrap(),
    )
    .unwrap()
}

/// Two spans with every load type, fixed at the left end
fn mixed_beam() -> Beam {
    let loads = vec![
        Load::point_force(150.0, -25.0),
        Load::point_moment(420.0, 300.0),
        Load::uniform(-0.15, 0.0, 600.0),
        Load::linear(320.0, 560.0, -0.1, -0.4),
    ];
    Beam::from_nodes(
        vec![Node::fixed(0.0), Node::simple(300.0), Node::simple(600.0)],
        Material::elastic(2500.0),
        Section::rectangular(20.0, 50.0),
        LoadSet::new(loads).unwrap(),
    )
    .unwrap()
}

#[test]
fn simply_supported_point_load_end_to_end() {
    let beam = simple_span(400.0, vec![Load::point_force(200.0, -20.0)]);
    let solution = beam.solve(&AnalysisOptions::default()).unwrap();

    assert!(solution.is_clean(), "warnings: {:?}", solution.warnings);
    assert_relative_eq!(solution.node_at(0.0).unwrap().reaction_force, 10.0, epsilon = 1e-9);
    assert_relative_eq!(solution.node_at(400.0).unwrap().reaction_force, 10.0, epsilon = 1e-9);
    assert_relative_eq!(solution.diagrams.moment(200.0), 2000.0, epsilon = 1e-6);

    let peak = solution.diagrams.peak(DiagramKind::Moment).unwrap();
    assert_relative_eq!(peak.x, 200.0, epsilon = 1e-9);
    assert_relative_eq!(peak.value, 2000.0, epsilon = 1e-6);

    // shear jumps by the load at midspan
    assert_relative_eq!(solution.diagrams.left(DiagramKind::Shear, 200.0), 10.0, epsilon = 1e-9);
    assert_relative_eq!(solution.diagrams.right(DiagramKind::Shear, 200.0), -10.0, epsilon = 1e-9);
}

#[test]
fn point_load_moment_matches_closed_form() {
    let length = 500.0;
    let force = -12.0;
    for a in [50.0, 125.0, 250.0, 410.0] {
        let beam = simple_span(length, vec![Load::point_force(a, force)]);
        let solution = beam.solve(&AnalysisOptions::default()).unwrap();
        let expected = -force * a * (length - a) / length;
        assert_relative_eq!(solution.diagrams.moment(a), expected, max_relative = 1e-9);
    }

    // P·L/4 at midspan
    let beam = simple_span(length, vec![Load::point_force(250.0, force)]);
    let solution = beam.solve(&AnalysisOptions::default()).unwrap();
    assert_relative_eq!(solution.diagrams.moment(250.0), -force * length / 4.0, max_relative = 1e-9);
}

#[test]
fn mixed_loads_satisfy_equilibrium() {
    let beam = mixed_beam();
    let solution = beam.solve(&AnalysisOptions::default()).unwrap();
    assert!(solution.is_clean(), "warnings: {:?}", solution.warnings);

    let loads = beam.loads();
    let force_scale: f64 = loads.iter().map(|l| l.resultant().abs()).sum();
    let vertical = loads.total_vertical() + solution.total_reaction();
    assert!(vertical.abs() < 1e-8 * force_scale);

    let reaction_moment: f64 = solution
        .nodes
        .iter()
        .map(|n| n.reaction_force * n.x + n.reaction_moment)
        .sum();
    let residual = loads.moment_about(0.0) + reaction_moment;
    assert!(residual.abs() < 1e-8 * force_scale * beam.length());

    // free end of the diagrams closes to zero
    let end = beam.x_end();
    let end_shear = solution.diagrams.left(DiagramKind::Shear, end) + solution.node_at(end).unwrap().reaction_force;
    assert!(end_shear.abs() < 1e-8);
}

#[test]
fn diagrams_are_consistent_derivatives() {
    let beam = mixed_beam();
    let solution = beam.solve(&AnalysisOptions::default()).unwrap();
    let diagrams = &solution.diagrams;
    let ei = beam.elements()[0].flexural_rigidity();

    let scale = |kind: DiagramKind| diagrams.peak(kind).map(|e| e.value.abs()).unwrap_or(0.0);
    let (shear_scale, moment_scale, rotation_scale) = (
        scale(DiagramKind::Shear),
        scale(DiagramKind::Moment),
        scale(DiagramKind::Rotation),
    );

    let n = env_usize("RC_BEAM_FD_POINTS", 40);
    let h = 1e-3;
    let breakpoints: Vec<f64> = beam.nodes().iter().map(|n| n.x).collect();
    let (x0, x1) = (beam.x_begin(), beam.x_end());

    for i in 1..n {
        let x = x0 + (x1 - x0) * (i as f64 + 0.37) / n as f64;
        if breakpoints.iter().any(|b| (b - x).abs() < 10.0 * h) || x + h >= x1 {
            continue;
        }
        let d = |kind: DiagramKind| (diagrams.at(kind, x + h) - diagrams.at(kind, x - h)) / (2.0 * h);

        assert_relative_eq!(d(DiagramKind::Moment), diagrams.shear(x), epsilon = 1e-6 * shear_scale);
        assert_relative_eq!(
            d(DiagramKind::Rotation),
            diagrams.moment(x) / ei,
            epsilon = 1e-6 * moment_scale / ei
        );
        assert_relative_eq!(d(DiagramKind::Displacement), diagrams.rotation(x), epsilon = 1e-6 * rotation_scale);
    }
}

#[test]
fn supports_hold_prescribed_values() {
    let beam = mixed_beam();
    let solution = beam.solve(&AnalysisOptions::default()).unwrap();
    let scale = solution.diagrams.peak(DiagramKind::Displacement).unwrap().value.abs();
    for x in [0.0, 300.0, 600.0] {
        assert!(solution.diagrams.displacement(x).abs() < 1e-9 * scale);
    }
    assert_eq!(solution.diagrams.rotation(0.0), 0.0);
}

#[test]
fn solve_is_idempotent_and_linear() {
    let beam = mixed_beam();
    let first = beam.solve(&AnalysisOptions::default()).unwrap();
    let second = beam.solve(&AnalysisOptions::default()).unwrap();
    assert_eq!(first.nodes, second.nodes);
    assert_eq!(first.diagrams, second.diagrams);

    let doubled = beam.scaled_loads(2.0).unwrap().solve(&AnalysisOptions::default()).unwrap();
    for x in [75.0, 222.0, 333.0, 512.0] {
        assert_relative_eq!(doubled.diagrams.moment(x), 2.0 * first.diagrams.moment(x), max_relative = 1e-9);
        assert_relative_eq!(
            doubled.diagrams.displacement(x),
            2.0 * first.diagrams.displacement(x),
            max_relative = 1e-9
        );
    }
    // the original is untouched
    assert_eq!(beam.solve(&AnalysisOptions::default()).unwrap().nodes, first.nodes);
}

#[test]
fn imposed_settlement_produces_moments_without_loads() {
    let beam = Beam::from_nodes(
        vec![Node::simple(0.0), Node::imposed(300.0, -1.0), Node::simple(600.0)],
        Material::elastic(2500.0),
        Section::rectangular(20.0, 50.0),
        LoadSet::empty(),
    )
    .unwrap();
    let solution = beam.solve(&AnalysisOptions::default()).unwrap();
    assert_relative_eq!(solution.diagrams.displacement(300.0), -1.0, epsilon = 1e-12);
    let largest = solution.nodes.iter().map(|n| n.reaction_force.abs()).fold(0.0, f64::max);
    assert!(solution.total_reaction().abs() < 1e-9 * largest);
    assert!(solution.diagrams.moment(300.0).abs() > 0.0);
}

#[test]
fn unsupported_beam_is_unstable() {
    let beam = Beam::from_nodes(
        vec![Node::free(0.0), Node::free(300.0)],
        Material::elastic(2500.0),
        Section::rectangular(20.0, 50.0),
        LoadSet::new(vec![Load::point_force(150.0, -1.0)]).unwrap(),
    )
    .unwrap();
    let err = beam.solve(&AnalysisOptions::default()).unwrap_err();
    assert!(matches!(err, BeamError::StructuralInstability(_)));
}

#[test]
fn outside_span_is_zero() {
    let beam = simple_span(400.0, vec![Load::uniform(-0.1, 0.0, 400.0)]);
    let solution = beam.solve(&AnalysisOptions::default()).unwrap();
    for kind in DiagramKind::ALL {
        assert_eq!(solution.diagrams.at(kind, -1.0), 0.0);
        assert_eq!(solution.diagrams.at(kind, 401.0), 0.0);
    }
}

#[test]
fn load_next_to_a_support_keeps_the_solve_accurate() {
    // a tiny element between the support and the first load
    let beam = simple_span(400.0, vec![Load::point_force(0.0001, -10.0), Load::point_force(200.0, -10.0)]);
    assert!(beam.solve(&AnalysisOptions::default()).is_ok());

    let beam = simple_span(400.0, vec![Load::point_force(0.01, -10.0), Load::point_force(200.0, -10.0)]);
    let solution = beam.solve(&AnalysisOptions::default()).unwrap();
    assert_relative_eq!(solution.total_reaction(), 20.0, epsilon = 1e-4);
    // P·L/4 from the midspan load plus P·a·(L - x)/L from the one at a = 0.01
    assert_relative_eq!(solution.diagrams.moment(200.0), 1000.0 + 10.0 * 0.01 * 200.0 / 400.0, max_relative = 1e-6);
}
