//! Transverse reinforcement: strut check and stirrup placement

use serde::{Deserialize, Serialize};

use super::beam::ConcreteBeam;
use super::catalog::BarSize;
use crate::diagram::Diagrams;
use crate::elements::Section;
use crate::error::{BeamError, BeamResult, Face};

/// Stirrups of one diameter at one spacing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransvSteelSegment {
    pub x_begin: f64,
    pub x_end: f64,
    /// Stirrup diameter (cm)
    pub diameter: f64,
    /// Centre-to-centre spacing (cm)
    pub spacing: f64,
    /// Stirrups placed in the segment
    pub count: usize,
    /// Provided Asw/s (cm²/cm)
    pub area_per_length: f64,
    /// Developed length of one stirrup (cm)
    pub stirrup_length: f64,
    pub cost: f64,
}

/// Shear demand at one design position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShearDemand {
    pub x: f64,
    /// Factored shear magnitude
    pub shear: f64,
    /// Strut capacity V_Rd2
    pub capacity: f64,
    /// Required Asw/s (cm²/cm), minimum included
    pub area_per_length: f64,
    /// Largest allowed spacing (cm)
    pub max_spacing: f64,
}

/// Shear demand along the span.
///
/// Fails with [`BeamError::CompressionStrutFailure`] at the first position
/// where the factored shear exceeds the strut capacity.
pub fn demand(beam: &ConcreteBeam, diagrams: &Diagrams) -> BeamResult<Vec<ShearDemand>> {
    let rules = beam.rules();
    let concrete = beam.concrete();
    let fywk = beam.stirrups().fywk;

    beam.sample_positions()
        .into_iter()
        .map(|x| {
            let section = &beam.element_at(x)?.section;
            let vsd = beam.design_shear(diagrams, x);
            let (vc0, vrd2) = beam.shear_capacity(section);
            if vsd > vrd2 {
                return Err(BeamError::CompressionStrutFailure {
                    x,
                    shear: vsd,
                    capacity: vrd2,
                });
            }
            let d = beam.shear_depth(section);
            let vc = rules.concrete_shear(vsd, vc0, vrd2);
            Ok(ShearDemand {
                x,
                shear: vsd,
                capacity: vrd2,
                area_per_length: rules.stirrup_area(
                    vsd,
                    vc,
                    d,
                    section.web_width(),
                    concrete.fctm,
                    fywk,
                    beam.stirrup_angle(),
                    beam.strut_angle(),
                ),
                max_spacing: rules.max_stirrup_spacing(vsd, vrd2, d),
            })
        })
        .collect()
}

/// Closed stirrup around the section, hooks included
pub fn stirrup_length(beam: &ConcreteBeam, section: &Section, diameter: f64) -> f64 {
    let cover = beam.cover();
    2.0 * (section.web_width() - 2.0 * cover)
        + 2.0 * (section.height() - 2.0 * cover)
        + 2.0 * beam.rules().stirrup_hook(diameter)
}

#[derive(Debug, Clone, Copy)]
struct Placement {
    x: f64,
    size: BarSize,
    spacing: f64,
    stirrup_length: f64,
}

/// Walk the span placing the cheapest stirrup that satisfies the demand up
/// to the next one, then merge equal neighbours into segments
pub(crate) fn solve(beam: &ConcreteBeam, diagrams: &Diagrams) -> BeamResult<Vec<TransvSteelSegment>> {
    let increment = beam.stirrups().spacing_increment;
    if !(increment > 0.0) {
        return Err(BeamError::InvalidInput(format!(
            "stirrup spacing increment must be positive, got {}",
            increment
        )));
    }
    let demand = demand(beam, diagrams)?;
    let (x0, xn) = (beam.beam().x_begin(), beam.beam().x_end());
    let tolerance = 1e-9 * (xn - x0);

    let mut placements: Vec<Placement> = Vec::new();
    let mut x = x0;
    while x < xn - tolerance {
        let placement = place(beam, &demand, x)?;
        x += placement.spacing;
        placements.push(placement);
    }

    let segments = merge(beam, &placements, xn);
    log::debug!(
        "{} stirrups in {} segments",
        segments.iter().map(|s| s.count).sum::<usize>(),
        segments.len()
    );
    Ok(segments)
}

/// Cheapest (diameter, spacing) starting at `x`
fn place(beam: &ConcreteBeam, demand: &[ShearDemand], x: f64) -> BeamResult<Placement> {
    let stirrups = beam.stirrups();
    let rules = beam.rules();
    let legs = beam.params().stirrup_legs as f64;
    let section = &beam.element_at(x)?.section;
    let cap = rules.stirrup_spacing_low.max(rules.stirrup_spacing_high);
    let steps = (cap / stirrups.spacing_increment + 1e-9).floor() as usize;

    let mut best: Option<(f64, Placement)> = None;
    let mut worst_required: f64 = 0.0;
    for size in &stirrups.bars {
        let length = stirrup_length(beam, section, size.diameter());
        let unit_cost = length / 100.0 * size.cost_per_m;
        for k in 1..=steps {
            let spacing = k as f64 * stirrups.spacing_increment;
            let (required, max_spacing) = window(demand, x, spacing);
            worst_required = worst_required.max(required);
            if spacing > max_spacing + 1e-9 || legs * size.area_cm2 / spacing < required {
                continue;
            }
            let cost_per_length = unit_cost / spacing;
            if best.as_ref().map_or(true, |(best_cost, _)| cost_per_length < *best_cost) {
                best = Some((
                    cost_per_length,
                    Placement {
                        x,
                        size: *size,
                        spacing,
                        stirrup_length: length,
                    },
                ));
            }
        }
    }

    best.map(|(_, placement)| placement)
        .ok_or_else(|| {
            let capacity = stirrups
                .bars
                .iter()
                .map(|size| legs * size.area_cm2 / stirrups.spacing_increment)
                .fold(0.0, f64::max);
            BeamError::ReinforcementAreaOutOfBounds {
                face: Face::Transverse,
                x,
                required: worst_required,
                limit: capacity,
            }
        })
}

/// Largest required Asw/s and smallest allowed spacing over `[x, x + spacing]`
fn window(demand: &[ShearDemand], x: f64, spacing: f64) -> (f64, f64) {
    if demand.is_empty() {
        return (0.0, f64::INFINITY);
    }
    let lo = demand.partition_point(|d| d.x < x).min(demand.len() - 1);
    let hi = demand.partition_point(|d| d.x <= x + spacing).max(lo + 1);
    let samples = &demand[lo..hi];
    samples.iter().fold((0.0, f64::INFINITY), |(required, max_spacing), d| {
        (required.max(d.area_per_length), max_spacing.min(d.max_spacing))
    })
}

fn merge(beam: &ConcreteBeam, placements: &[Placement], xn: f64) -> Vec<TransvSteelSegment> {
    let legs = beam.params().stirrup_legs as f64;
    let mut segments: Vec<TransvSteelSegment> = Vec::new();

    for placement in placements {
        let diameter = placement.size.diameter();
        let unit_cost = placement.stirrup_length / 100.0 * placement.size.cost_per_m;
        match segments.last_mut() {
            Some(last) if last.diameter == diameter && last.spacing == placement.spacing => {
                last.count += 1;
                last.x_end = (placement.x + placement.spacing).min(xn);
                last.cost += unit_cost;
            }
            _ => segments.push(TransvSteelSegment {
                x_begin: placement.x,
                x_end: (placement.x + placement.spacing).min(xn),
                diameter,
                spacing: placement.spacing,
                count: 1,
                area_per_length: legs * placement.size.area_cm2 / placement.spacing,
                stirrup_length: placement.stirrup_length,
                cost: unit_cost,
            }),
        }
    }

    // closing stirrup at the far end
    if let (Some(last), Some(placement)) = (segments.last_mut(), placements.last()) {
        last.count += 1;
        last.x_end = xn;
        last.cost += placement.stirrup_length / 100.0 * placement.size.cost_per_m;
    }
    segments
}
