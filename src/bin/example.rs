//! rc-beam example - three-span continuous beam
//!
//! Usage: `beam-example [problem.json]`. Without an argument a built-in
//! continuous beam is analysed, designed and searched.

use std::time::Duration;

use anyhow::Context;
use rc_beam::prelude::*;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Some(path) = std::env::args().nth(1) {
        let json = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path))?;
        let problem = Problem::from_json(&json)?;
        let outcome = problem.solve()?;
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!("=== rc-beam example: three-span continuous beam ===\n");

    //   ___________________________________________
    //   ^            ^                 ^           ^
    //   0           113               583         1188   (cm)
    let loads = LoadSet::new(vec![
        Load::uniform(-0.1622, 0.0, 113.0),
        Load::uniform(-0.4994, 113.0, 583.0),
        Load::uniform(-0.4196, 583.0, 1188.0),
    ])?;
    let section = Section::rectangular(25.0, 70.0);
    let beam = Beam::from_nodes(
        vec![
            Node::simple(0.0),
            Node::simple(113.0),
            Node::simple(583.0),
            Node::simple(1188.0),
        ],
        Material::default(),
        section,
        loads,
    )?;

    let class = ConcreteClass::new(25.0, 331.65);
    let concrete_beam = ConcreteBeam::new(&beam, class, DesignParameters::default())?;

    let solution = concrete_beam.analyze()?;
    println!("Support reactions:");
    for node in solution.reactions() {
        println!("  x={:7.1} cm: R={:8.2} kN", node.x, node.reaction_force);
    }
    let summary = concrete_beam.beam().summary(&solution);
    println!("\nSummary:");
    println!("  Max displacement: {:.4} cm at x={:.1}", summary.max_displacement, summary.max_displacement_x);
    println!("  Max moment: {:.2} kN·cm at x={:.1}", summary.max_moment, summary.max_moment_x);
    println!("  Max shear: {:.2} kN at x={:.1}", summary.max_shear, summary.max_shear_x);

    let report = concrete_beam.design()?;
    println!("\nLongitudinal bars ({}):", class);
    for bar in &report.long_bars {
        println!(
            "  {:6} {:2} x {:4.1} mm  [{:7.1}, {:7.1}]  lb,nec={:5.1} cm",
            bar.face.to_string(),
            bar.count,
            bar.diameter * 10.0,
            bar.x_begin,
            bar.x_end,
            bar.anchorage_length
        );
    }
    println!("\nStirrups:");
    for segment in &report.transverse {
        println!(
            "  {:3} x {:4.1} mm every {:4.1} cm  [{:7.1}, {:7.1}]",
            segment.count,
            segment.diameter * 10.0,
            segment.spacing,
            segment.x_begin,
            segment.x_end
        );
    }
    println!("\nCost:");
    println!("  Concrete:      {:10.2}", report.cost.concrete);
    println!("  Longitudinal:  {:10.2}", report.cost.longitudinal);
    println!("  Transverse:    {:10.2}", report.cost.transverse);
    println!("  Total:         {:10.2}", report.total_cost);

    println!("\n=== Design search ===\n");
    let materials = AvailableMaterials::default();
    let space = DesignSpace::from_materials(&materials).with_rectangles(&[20.0, 25.0, 30.0], &[60.0, 70.0, 80.0]);
    let options = SearchOptions::default()
        .with_max_steps_without_improvement(200)
        .with_time_budget(Duration::from_secs(60))
        .sorted_by_area();
    let outcome = DesignSearch::new(beam, materials)
        .with_space(space)
        .with_options(options)
        .run()?;

    println!(
        "Best of {} evaluated ({} feasible, stopped: {:?}): {}",
        outcome.evaluations.len(),
        outcome.feasible_count(),
        outcome.stop_reason,
        outcome.best_candidate
    );
    println!("  Total cost: {:.2}", outcome.best.total_cost);

    Ok(())
}
