use approx::assert_relative_eq;
use rc_beam::concrete::{long_steel, transv_steel};
use rc_beam::prelude::*;

fn simple_beam(section: Section, loads: Vec<Load>) -> Beam {
    Beam::from_nodes(
        vec![Node::simple(0.0), Node::simple(400.0)],
        Material::default(),
        section,
        LoadSet::new(loads).unwrap(),
    )
    .unwrap()
}

/// Three spans with hogging moments over the inner supports
fn continuous_beam() -> Beam {
    let loads = vec![
        Load::uniform(-0.08, 0.0, 113.0),
        Load::uniform(-0.25, 113.0, 583.0),
        Load::uniform(-0.21, 583.0, 1188.0),
    ];
    Beam::from_nodes(
        vec![
            Node::simple(0.0),
            Node::simple(113.0),
            Node::simple(583.0),
            Node::simple(1188.0),
        ],
        Material::default(),
        Section::rectangular(25.0, 56.0),
        LoadSet::new(loads).unwrap(),
    )
    .unwrap()
}

fn c25() -> ConcreteClass {
    ConcreteClass::new(25.0, 331.65)
}

#[test]
fn point_load_design_end_to_end() {
    let beam = simple_beam(Section::rectangular(20.0, 50.0), vec![Load::point_force(200.0, -20.0)]);
    let concrete_beam = ConcreteBeam::new(&beam, ConcreteClass::new(30.0, 353.30), DesignParameters::default()).unwrap();
    let report = concrete_beam.design().unwrap();

    assert!(report.feasible);
    assert!(report.warnings.is_empty());
    assert!(report.bars_on(Face::Top).next().is_none());
    assert!(report.bars_on(Face::Bottom).count() >= 1);

    // concrete: 20 x 50 x 400 cm
    assert_relative_eq!(report.cost.concrete, 0.4 * 353.30, max_relative = 1e-12);
    assert_relative_eq!(
        report.total_cost,
        report.cost.concrete + report.cost.longitudinal + report.cost.transverse,
        max_relative = 1e-12
    );

    let first = &report.transverse[0];
    let last = &report.transverse[report.transverse.len() - 1];
    assert_relative_eq!(first.x_begin, 0.0);
    assert_relative_eq!(last.x_end, 400.0);
}

#[test]
fn continuous_beam_needs_top_steel_over_supports() {
    let concrete_beam = ConcreteBeam::new(&continuous_beam(), c25(), DesignParameters::default()).unwrap();
    let report = concrete_beam.design().unwrap();

    let top: Vec<&LongSteelBar> = report.bars_on(Face::Top).collect();
    assert!(!top.is_empty());
    for x in [113.0, 583.0] {
        assert!(top.iter().any(|bar| bar.covers(x)), "no top bar over x={}", x);
    }
    for bar in &report.long_bars {
        assert!(bar.x_begin >= 0.0 && bar.x_end <= 1188.0);
        assert!(bar.cumulative_count >= 2);
        assert_relative_eq!(bar.length, bar.x_end - bar.x_begin);
    }
}

#[test]
fn required_area_stays_within_bounds() {
    let concrete_beam = ConcreteBeam::new(&continuous_beam(), c25(), DesignParameters::default()).unwrap();
    let solution = concrete_beam.analyze().unwrap();
    let rules = concrete_beam.rules();
    let ac = 25.0 * 56.0;
    let a_min = rules.rho_min(25.0) * ac;
    let a_max = rules.rho_max * ac;

    for face in [Face::Bottom, Face::Top] {
        let demand = long_steel::demand(&concrete_beam, &solution.diagrams, face).unwrap();
        assert!(demand.iter().any(|sample| sample.area > 0.0));
        for sample in demand {
            if sample.area > 0.0 {
                assert!(sample.area >= a_min - 1e-12 && sample.area <= a_max);
            } else {
                assert!(sample.moment < 1e-3);
            }
        }
    }
}

#[test]
fn provided_longitudinal_steel_covers_demand() {
    let concrete_beam = ConcreteBeam::new(&continuous_beam(), c25(), DesignParameters::default()).unwrap();
    let solution = concrete_beam.analyze().unwrap();
    let report = concrete_beam.design().unwrap();

    for face in [Face::Bottom, Face::Top] {
        for sample in long_steel::demand(&concrete_beam, &solution.diagrams, face).unwrap() {
            let provided: f64 = report
                .bars_on(face)
                .filter(|bar| bar.covers(sample.x))
                .map(|bar| bar.area)
                .sum();
            assert!(provided + 1e-9 >= sample.area, "{} face short at x={}", face, sample.x);
        }
    }
}

#[test]
fn strut_capacity_is_independent_of_load_and_steel() {
    let section = Section::rectangular(20.0, 50.0);
    let light = simple_beam(section.clone(), vec![Load::uniform(-0.1, 0.0, 400.0)]);
    let heavy = simple_beam(section, vec![Load::uniform(-0.6, 0.0, 400.0)]);

    let capacities = |beam: &Beam, catalog: StirrupCatalog| {
        let concrete_beam = ConcreteBeam::new(beam, c25(), DesignParameters::default().without_serviceability())
            .unwrap()
            .with_stirrups(catalog);
        let solution = concrete_beam.analyze().unwrap();
        transv_steel::demand(&concrete_beam, &solution.diagrams)
            .unwrap()
            .iter()
            .map(|d| d.capacity)
            .collect::<Vec<f64>>()
    };

    let base = capacities(&light, StirrupCatalog::standard());
    assert_eq!(base, capacities(&heavy, StirrupCatalog::standard()));
    assert_eq!(base, capacities(&light, StirrupCatalog::standard().subset(&[12.5]).unwrap()));
}

#[test]
fn strut_failure_is_monotonic_in_load() {
    let section = Section::rectangular(20.0, 50.0);
    let params = DesignParameters::default().without_serviceability();
    let fails = |q: f64| {
        let beam = simple_beam(section.clone(), vec![Load::uniform(q, 0.0, 400.0)]);
        let concrete_beam = ConcreteBeam::new(&beam, c25(), params.clone()).unwrap();
        matches!(concrete_beam.design(), Err(BeamError::CompressionStrutFailure { .. }))
    };

    let loads = [-0.5, -1.0, -1.5, -2.0, -3.0, -4.0, -6.0];
    let outcomes: Vec<bool> = loads.iter().map(|&q| fails(q)).collect();
    assert!(!outcomes[0]);
    assert!(outcomes[outcomes.len() - 1]);
    // once the strut fails it keeps failing
    let first_failure = outcomes.iter().position(|&f| f).unwrap();
    assert!(outcomes[first_failure..].iter().all(|&f| f));
}

#[test]
fn wider_web_raises_strut_capacity() {
    let capacity = |width: f64| {
        let beam = simple_beam(Section::rectangular(width, 50.0), vec![Load::uniform(-0.2, 0.0, 400.0)]);
        let concrete_beam = ConcreteBeam::new(&beam, c25(), DesignParameters::default()).unwrap();
        concrete_beam.strut_capacity_at(200.0).unwrap()
    };
    assert!(capacity(15.0) < capacity(20.0));
    assert!(capacity(20.0) < capacity(30.0));
}

#[test]
fn design_is_idempotent() {
    let concrete_beam = ConcreteBeam::new(&continuous_beam(), c25(), DesignParameters::default()).unwrap();
    let first = concrete_beam.design().unwrap();
    let second = concrete_beam.design().unwrap();
    assert_eq!(first.long_bars, second.long_bars);
    assert_eq!(first.transverse, second.transverse);
    assert_eq!(first.total_cost, second.total_cost);
}

#[test]
fn deflection_limit_reports_infeasible() {
    let beam = simple_beam(Section::rectangular(15.0, 25.0), vec![Load::uniform(-1.0, 0.0, 400.0)]);
    let concrete_beam = ConcreteBeam::new(&beam, c25(), DesignParameters::default()).unwrap();
    match concrete_beam.design() {
        Err(BeamError::ServiceabilityLimitExceeded { limit, .. }) => assert_relative_eq!(limit, 400.0 / 250.0),
        other => panic!("expected a serviceability failure, got {:?}", other.map(|r| r.total_cost)),
    }
}

#[test]
fn search_never_gets_worse_with_a_larger_catalog() {
    let beam = continuous_beam();
    let materials = AvailableMaterials::default();
    let small = DesignSpace {
        sections: Vec::new(),
        concrete_classes: vec![c25()],
        long_diameter_sets: vec![vec![12.5], vec![16.0]],
        transverse_diameter_sets: vec![vec![6.3]],
    };
    let mut large = small.clone();
    large.concrete_classes.push(ConcreteClass::new(30.0, 353.30));
    large.long_diameter_sets.push(vec![10.0]);
    large.long_diameter_sets.push(vec![10.0, 12.5, 16.0]);
    large.transverse_diameter_sets.push(vec![8.0]);

    let best = |space: DesignSpace| {
        DesignSearch::new(beam.clone(), materials.clone())
            .with_space(space)
            .run()
            .unwrap()
            .best
            .total_cost
    };
    assert!(best(large) <= best(small));
}

#[test]
fn mixed_diameter_set_picks_per_region() {
    let concrete_beam = ConcreteBeam::new(&continuous_beam(), c25(), DesignParameters::default())
        .unwrap()
        .with_long_bars(SteelBarCatalog::ca50().subset(&[10.0, 12.5, 16.0]).unwrap());
    let mixed = concrete_beam.design().unwrap();

    for diameter in [10.0, 12.5, 16.0] {
        let single = ConcreteBeam::new(&continuous_beam(), c25(), DesignParameters::default())
            .unwrap()
            .with_long_bars(SteelBarCatalog::ca50().subset(&[diameter]).unwrap());
        if let Ok(report) = single.design() {
            assert!(mixed.cost.longitudinal <= report.cost.longitudinal + 1e-9);
        }
    }
}
