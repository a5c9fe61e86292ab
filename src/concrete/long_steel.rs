//! Longitudinal reinforcement: required area and staggered bar layout

use std::ops::Range;

use serde::{Deserialize, Serialize};

use super::beam::ConcreteBeam;
use super::catalog::BarSize;
use crate::diagram::{DiagramKind, Diagrams};
use crate::elements::Section;
use crate::error::{BeamError, BeamResult, Face};

/// A group of identical longitudinal bars on one face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongSteelBar {
    pub face: Face,
    pub x_begin: f64,
    pub x_end: f64,
    /// Bar diameter (cm)
    pub diameter: f64,
    /// Bars in this group
    pub count: usize,
    /// Bars on the face wherever this group is present
    pub cumulative_count: usize,
    /// Steel area of this group (cm²)
    pub area: f64,
    pub cumulative_area: f64,
    /// Anchorage length lb,nec added at both ends (cm)
    pub anchorage_length: f64,
    /// Length of each bar (cm)
    pub length: f64,
    pub cost: f64,
}

impl LongSteelBar {
    pub fn covers(&self, x: f64) -> bool {
        x >= self.x_begin && x <= self.x_end
    }

    /// Summed length of the bars of the group (cm)
    pub fn total_length(&self) -> f64 {
        self.count as f64 * self.length
    }
}

/// Required steel at one design position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaDemand {
    pub x: f64,
    /// Factored moment magnitude after the decalage shift
    pub moment: f64,
    /// Required area, minimum included (0 where the face is not in tension)
    pub area: f64,
}

/// Area demand along the span for one face
pub fn demand(beam: &ConcreteBeam, diagrams: &Diagrams, face: Face) -> BeamResult<Vec<AreaDemand>> {
    let xs = beam.sample_positions();
    let moments = shifted_moments(beam, diagrams, &xs, face)?;
    let threshold = zero_threshold(beam, diagrams);

    xs.iter()
        .zip(moments)
        .map(|(&x, moment)| {
            let area = if moment > threshold {
                required_area(beam, face, x, moment)?
            } else {
                0.0
            };
            Ok(AreaDemand { x, moment, area })
        })
        .collect()
}

/// Lay out the cheapest bars meeting the demand on both faces
pub(crate) fn solve(beam: &ConcreteBeam, diagrams: &Diagrams, stirrup_diameter: f64) -> BeamResult<Vec<LongSteelBar>> {
    let mut bars = Vec::new();
    for face in [Face::Bottom, Face::Top] {
        let demand = demand(beam, diagrams, face)?;
        for region in tension_regions(&demand) {
            bars.extend(design_region(beam, face, &demand, region, stirrup_diameter)?);
        }
    }
    bars.sort_by(|a, b| {
        a.x_begin
            .total_cmp(&b.x_begin)
            .then_with(|| face_order(a.face).cmp(&face_order(b.face)))
    });
    Ok(bars)
}

fn face_order(face: Face) -> u8 {
    match face {
        Face::Bottom => 0,
        Face::Top => 1,
        Face::Transverse => 2,
    }
}

/// Moments below this are treated as no tension
fn zero_threshold(beam: &ConcreteBeam, diagrams: &Diagrams) -> f64 {
    let peak = diagrams
        .peak(DiagramKind::Moment)
        .map(|e| e.value.abs())
        .unwrap_or(0.0);
    1e-9 * beam.params().design_factor * peak
}

/// Factored moment magnitude tensioning `face`, enveloped over ±a_l
fn shifted_moments(beam: &ConcreteBeam, diagrams: &Diagrams, xs: &[f64], face: Face) -> BeamResult<Vec<f64>> {
    let factor = beam.params().design_factor;
    let sign = match face {
        Face::Top => -1.0,
        _ => 1.0,
    };
    let moments: Vec<f64> = xs
        .iter()
        .map(|&x| {
            let left = sign * diagrams.left(DiagramKind::Moment, x);
            let right = sign * diagrams.right(DiagramKind::Moment, x);
            factor * left.max(right).max(0.0)
        })
        .collect();

    let shifts = decalage_lengths(beam, diagrams)?;
    let elements = beam.beam().user_elements();

    xs.iter()
        .map(|&x| {
            let index = elements
                .iter()
                .rposition(|e| e.contains(x))
                .ok_or_else(|| BeamError::InvalidGeometry(format!("no element covers x={}", x)))?;
            let al = shifts[index];
            let lo = xs.partition_point(|&s| s < x - al);
            let hi = xs.partition_point(|&s| s <= x + al);
            Ok(moments[lo..hi].iter().copied().fold(0.0, f64::max))
        })
        .collect()
}

/// Decalage length a_l of each user element
fn decalage_lengths(beam: &ConcreteBeam, diagrams: &Diagrams) -> BeamResult<Vec<f64>> {
    let factor = beam.params().design_factor;
    beam.beam()
        .user_elements()
        .iter()
        .map(|element| {
            let section = &element.section;
            let vsd = factor * diagrams.max_abs_between(DiagramKind::Shear, element.x_begin, element.x_end);
            let (vc0, _) = beam.shear_capacity(section);
            Ok(beam.rules().decalage_length(
                beam.decalage_depth(section),
                vsd,
                vc0,
                beam.stirrup_angle(),
                beam.strut_angle(),
            ))
        })
        .collect()
}

/// Steel area for moment `m` (> 0) tensioning `face` at `x`
fn required_area(beam: &ConcreteBeam, face: Face, x: f64, m: f64) -> BeamResult<f64> {
    let section = &beam.element_at(x)?.section;
    let rules = beam.rules();
    let concrete = beam.concrete();
    let steel = beam.long_bars();

    let d = beam.effective_depth(section, face);
    // compressed flange is on the opposite face
    let b = match face {
        Face::Top => section.bottom_width(),
        _ => section.top_width(),
    };
    let fyd = steel.fyd(rules.gamma_s);
    let ductility_limit = rules.limit_flexural_area(b, d, concrete.fcd, fyd, steel.es);

    let area = match rules.flexural_area(m, b, d, concrete.fcd, fyd, steel.es) {
        Some(result) if result.beta_x <= rules.beta_x_limit => result.area,
        Some(result) => {
            return Err(BeamError::ReinforcementAreaOutOfBounds {
                face,
                x,
                required: result.area,
                limit: ductility_limit,
            })
        }
        None => {
            return Err(BeamError::ReinforcementAreaOutOfBounds {
                face,
                x,
                required: f64::INFINITY,
                limit: ductility_limit,
            })
        }
    };

    let ac = section.area();
    let area = area.max(rules.rho_min(concrete.fck_mpa()) * ac);
    let max_area = rules.rho_max * ac;
    if area > max_area {
        return Err(BeamError::ReinforcementAreaOutOfBounds {
            face,
            x,
            required: area,
            limit: max_area,
        });
    }
    Ok(area)
}

/// Index ranges of contiguous samples with demand
fn tension_regions(demand: &[AreaDemand]) -> Vec<Range<usize>> {
    runs(demand.len(), |i| demand[i].area > 0.0)
}

/// Maximal runs of indices in `0..len` where `pred` holds
fn runs(len: usize, pred: impl Fn(usize) -> bool) -> Vec<Range<usize>> {
    let mut result = Vec::new();
    let mut start = None;
    for i in 0..len {
        match (pred(i), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                result.push(s..i);
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        result.push(s..len);
    }
    result
}

/// Cheapest layout of one region over the catalog diameters
fn design_region(
    beam: &ConcreteBeam,
    face: Face,
    demand: &[AreaDemand],
    region: Range<usize>,
    stirrup_diameter: f64,
) -> BeamResult<Vec<LongSteelBar>> {
    let mut best: Option<(f64, Vec<LongSteelBar>)> = None;
    let mut capacity: f64 = 0.0;

    for size in &beam.long_bars().bars {
        let fit = bars_per_layer_in(beam, face, demand, region.clone(), size, stirrup_diameter)?;
        capacity = capacity.max(fit as f64 * size.area_cm2);
        let Some(bars) = layout(beam, face, demand, region.clone(), size, fit) else {
            continue;
        };
        let cost: f64 = bars.iter().map(|bar| bar.cost).sum();
        if best.as_ref().map_or(true, |(best_cost, _)| cost < *best_cost) {
            best = Some((cost, bars));
        }
    }

    match best {
        Some((cost, bars)) => {
            log::debug!(
                "{} region [{:.1}, {:.1}]: {} groups of {} cm bars, cost {:.2}",
                face,
                demand[region.start].x,
                demand[region.end - 1].x,
                bars.len(),
                bars[0].diameter,
                cost
            );
            Ok(bars)
        }
        None => {
            let worst = demand[region]
                .iter()
                .copied()
                .max_by(|a, b| a.area.total_cmp(&b.area))
                .unwrap_or(AreaDemand {
                    x: beam.beam().x_begin(),
                    moment: 0.0,
                    area: 0.0,
                });
            Err(BeamError::ReinforcementAreaOutOfBounds {
                face,
                x: worst.x,
                required: worst.area,
                limit: capacity,
            })
        }
    }
}

/// Fewest bars of `size` that fit in one layer anywhere in the region
fn bars_per_layer_in(
    beam: &ConcreteBeam,
    face: Face,
    demand: &[AreaDemand],
    region: Range<usize>,
    size: &BarSize,
    stirrup_diameter: f64,
) -> BeamResult<usize> {
    let mut fit = usize::MAX;
    for sample in &demand[region] {
        let section = &beam.element_at(sample.x)?.section;
        fit = fit.min(bars_per_layer(beam, section, face, size.diameter(), stirrup_diameter));
    }
    Ok(fit)
}

/// Bars of diameter `phi` that fit side by side on `face`
pub fn bars_per_layer(beam: &ConcreteBeam, section: &Section, face: Face, phi: f64, stirrup_diameter: f64) -> usize {
    let width = match face {
        Face::Top => section.top_width(),
        _ => section.bottom_width(),
    };
    let available = width - 2.0 * beam.cover() - 2.0 * stirrup_diameter;
    if available < phi {
        return 0;
    }
    let gap = beam
        .rules()
        .bar_clear_spacing(phi, beam.params().aggregate_size);
    ((available + gap) / (phi + gap)).floor() as usize
}

/// Stagger levels: cumulative bar counts from the base count up to `n_max`
fn stagger_levels(base: usize, n_max: usize, step: usize, max_levels: usize) -> Vec<usize> {
    let mut levels = Vec::new();
    let mut level = base;
    while level < n_max && levels.len() + 1 < max_levels.max(1) {
        levels.push(level);
        level += step;
    }
    levels.push(n_max);
    levels
}

/// Staggered groups of one diameter covering the region, or `None` if the
/// peak count does not fit in a layer
fn layout(
    beam: &ConcreteBeam,
    face: Face,
    demand: &[AreaDemand],
    region: Range<usize>,
    size: &BarSize,
    fit: usize,
) -> Option<Vec<LongSteelBar>> {
    let params = beam.params();
    let rules = beam.rules();
    let concrete = beam.concrete();
    let steel = beam.long_bars();
    let phi = size.diameter();

    let counts: Vec<usize> = demand[region.clone()]
        .iter()
        .map(|sample| ((sample.area / size.area_cm2 - 1e-9).ceil().max(0.0) as usize).max(params.min_bars))
        .collect();
    let n_max = counts.iter().copied().max()?;
    let base = counts.iter().copied().min()?;
    if n_max > fit {
        return None;
    }

    let (x0, xn) = (beam.beam().x_begin(), beam.beam().x_end());
    let xs: Vec<f64> = demand[region.clone()].iter().map(|sample| sample.x).collect();
    let as_calc = demand[region].iter().map(|sample| sample.area).fold(0.0, f64::max);
    let as_ef = n_max as f64 * size.area_cm2;

    let fyd = steel.fyd(rules.gamma_s);
    let fbd = rules.bond_strength(steel.surface, face, phi, concrete.fctd);
    let (lb, lb_min) = rules.anchorage(phi, fyd, fbd);
    let cover = beam.cover();
    let hooked = xs[0] <= x0 + cover || xs[xs.len() - 1] >= xn - cover;
    let alpha = if hooked { rules.hook_factor } else { 1.0 };
    let anchorage = (alpha * lb * as_calc / as_ef).max(lb_min);

    let levels = stagger_levels(base, n_max, params.removal_step, params.max_removals);
    let mut bars = Vec::new();
    for (k, &level) in levels.iter().enumerate() {
        let previous = if k == 0 { 0 } else { levels[k - 1] };
        let count = level - previous;

        let mut intervals: Vec<(f64, f64)> = Vec::new();
        for run in runs(counts.len(), |i| counts[i] > previous) {
            let (begin, end) = (xs[run.start], xs[run.end - 1]);
            match intervals.last_mut() {
                Some(last) if begin - last.1 <= 2.0 * anchorage => last.1 = end,
                _ => intervals.push((begin, end)),
            }
        }

        for (begin, end) in intervals {
            let x_begin = (begin - anchorage).max(x0);
            let x_end = (end + anchorage).min(xn);
            let length = x_end - x_begin;
            bars.push(LongSteelBar {
                face,
                x_begin,
                x_end,
                diameter: phi,
                count,
                cumulative_count: level,
                area: count as f64 * size.area_cm2,
                cumulative_area: level as f64 * size.area_cm2,
                anchorage_length: anchorage,
                length,
                cost: count as f64 * length / 100.0 * size.cost_per_m,
            });
        }
    }
    Some(bars)
}
