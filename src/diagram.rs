//! Internal force and displacement diagrams
//!
//! A [`Diagrams`] value is an ordered arena of [`DiagramSegment`]s, one per
//! refined beam element. Every segment stores shear, moment, rotation and
//! displacement as polynomials in the local coordinate `t = x - x_begin`, and
//! every query goes through the same locate-then-evaluate routine.

use serde::{Deserialize, Serialize};

use crate::elements::BeamElement;
use crate::error::ToleranceWarning;
use crate::loads::LoadSet;
use crate::math::Polynomial;
use crate::results::NodeResult;

/// Quantity carried by a diagram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagramKind {
    Shear,
    Moment,
    Rotation,
    Displacement,
}

impl DiagramKind {
    pub const ALL: [DiagramKind; 4] = [
        DiagramKind::Shear,
        DiagramKind::Moment,
        DiagramKind::Rotation,
        DiagramKind::Displacement,
    ];
}

/// Closed-form description of one interval between breakpoints
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiagramSegment {
    pub x_begin: f64,
    pub x_end: f64,
    pub shear: Polynomial,
    pub moment: Polynomial,
    pub rotation: Polynomial,
    pub displacement: Polynomial,
}

impl DiagramSegment {
    pub fn length(&self) -> f64 {
        self.x_end - self.x_begin
    }

    pub fn field(&self, kind: DiagramKind) -> &Polynomial {
        match kind {
            DiagramKind::Shear => &self.shear,
            DiagramKind::Moment => &self.moment,
            DiagramKind::Rotation => &self.rotation,
            DiagramKind::Displacement => &self.displacement,
        }
    }

    /// Evaluate at a global position (not clamped to the segment)
    pub fn eval(&self, kind: DiagramKind, x: f64) -> f64 {
        self.field(kind).eval(x - self.x_begin)
    }

    /// Minimum and maximum of one field over the segment
    fn extrema(&self, kind: DiagramKind) -> (Extremum, Extremum) {
        let p = self.field(kind);
        let length = self.length();
        let mut candidates = vec![0.0, length];
        candidates.extend(p.derivative().roots_in(0.0, length));

        let mut min = Extremum::new(self.x_begin, p.eval(0.0));
        let mut max = min;
        for t in candidates {
            let value = p.eval(t);
            if value < min.value {
                min = Extremum::new(self.x_begin + t, value);
            }
            if value > max.value {
                max = Extremum::new(self.x_begin + t, value);
            }
        }
        (min, max)
    }
}

/// A diagram value and where it occurs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extremum {
    pub x: f64,
    pub value: f64,
}

impl Extremum {
    pub fn new(x: f64, value: f64) -> Self {
        Self { x, value }
    }
}

/// Queryable diagrams over the whole span
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagrams {
    segments: Vec<DiagramSegment>,
}

impl Diagrams {
    /// Integrate the diagrams from the solved nodal values.
    ///
    /// `nodes[k]` must sit at `elements[k].x_begin` (and the last node at the
    /// last `x_end`). Shear starts from the concentrated forces and reactions
    /// left of each segment and integrates the line load; moment integrates
    /// shear and jumps at point moments; rotation and displacement integrate
    /// `M/EI` starting from the nodal solution. The displacement and rotation
    /// reached at each segment end are compared against the next node.
    pub fn build(
        elements: &[BeamElement],
        loads: &LoadSet,
        nodes: &[NodeResult],
        node_tolerance: f64,
        tolerance: f64,
    ) -> (Self, Vec<ToleranceWarning>) {
        let mut segments = Vec::with_capacity(elements.len());
        let mut warnings = Vec::new();

        let max_displacement = nodes.iter().map(|n| n.displacement.abs()).fold(0.0, f64::max);
        let max_rotation = nodes.iter().map(|n| n.rotation.abs()).fold(0.0, f64::max);

        let mut shear = 0.0;
        let mut moment = 0.0;
        for (k, element) in elements.iter().enumerate() {
            let (node, next) = (&nodes[k], &nodes[k + 1]);
            shear += loads.point_force_at(node.x, node_tolerance) + node.reaction_force;
            moment -= loads.point_moment_at(node.x, node_tolerance) + node.reaction_moment;

            let length = element.length();
            let ei = element.flexural_rigidity();
            let q = loads.distributed_on(element.x_begin, element.x_end);

            let shear_poly = q.integral(shear);
            let moment_poly = shear_poly.integral(moment);
            let rotation_poly = (moment_poly * (1.0 / ei)).integral(node.rotation);
            let displacement_poly = rotation_poly.integral(node.displacement);

            // Magnitudes the integrals could reach on this segment
            let rotation_bound = abs_bound(&moment_poly, length) * length / ei.abs();
            let rotation_scale = max_rotation.max(rotation_bound).max(f64::MIN_POSITIVE);
            let displacement_scale = max_displacement
                .max((node.rotation.abs() + rotation_bound) * length)
                .max(f64::MIN_POSITIVE);

            let v_gap = (displacement_poly.eval(length) - next.displacement).abs();
            if v_gap > tolerance * displacement_scale {
                warnings.push(ToleranceWarning::new(
                    "displacement continuity",
                    Some(next.x),
                    v_gap,
                    tolerance * displacement_scale,
                ));
            }
            let theta_gap = (rotation_poly.eval(length) - next.rotation).abs();
            if theta_gap > tolerance * rotation_scale {
                warnings.push(ToleranceWarning::new(
                    "rotation continuity",
                    Some(next.x),
                    theta_gap,
                    tolerance * rotation_scale,
                ));
            }

            shear = shear_poly.eval(length);
            moment = moment_poly.eval(length);

            segments.push(DiagramSegment {
                x_begin: element.x_begin,
                x_end: element.x_end,
                shear: shear_poly,
                moment: moment_poly,
                rotation: rotation_poly,
                displacement: displacement_poly,
            });
        }

        (Self { segments }, warnings)
    }

    pub fn segments(&self) -> &[DiagramSegment] {
        &self.segments
    }

    pub fn x_begin(&self) -> f64 {
        self.segments.first().map(|s| s.x_begin).unwrap_or(0.0)
    }

    pub fn x_end(&self) -> f64 {
        self.segments.last().map(|s| s.x_end).unwrap_or(0.0)
    }

    /// Index of the segment owning `x` from the right.
    ///
    /// The span is closed: the last segment also owns `x_end`.
    fn locate(&self, x: f64) -> Option<usize> {
        if self.segments.is_empty() || x < self.x_begin() || x > self.x_end() {
            return None;
        }
        let idx = self.segments.partition_point(|s| s.x_begin <= x);
        Some(idx.saturating_sub(1))
    }

    /// Right-continuous value at `x`; zero outside the span
    pub fn at(&self, kind: DiagramKind, x: f64) -> f64 {
        self.locate(x)
            .map(|i| self.segments[i].eval(kind, x))
            .unwrap_or(0.0)
    }

    /// Limit approaching `x` from the right
    pub fn right(&self, kind: DiagramKind, x: f64) -> f64 {
        self.at(kind, x)
    }

    /// Limit approaching `x` from the left; zero at or before the span start
    pub fn left(&self, kind: DiagramKind, x: f64) -> f64 {
        if x <= self.x_begin() || x > self.x_end() {
            return 0.0;
        }
        let idx = self.segments.partition_point(|s| s.x_begin < x);
        self.segments[idx.saturating_sub(1)].eval(kind, x)
    }

    pub fn shear(&self, x: f64) -> f64 {
        self.at(DiagramKind::Shear, x)
    }

    pub fn moment(&self, x: f64) -> f64 {
        self.at(DiagramKind::Moment, x)
    }

    pub fn rotation(&self, x: f64) -> f64 {
        self.at(DiagramKind::Rotation, x)
    }

    pub fn displacement(&self, x: f64) -> f64 {
        self.at(DiagramKind::Displacement, x)
    }

    /// Minimum and maximum over `[a, b]`, including one-sided limits at
    /// interior breakpoints
    pub fn extrema_between(&self, kind: DiagramKind, a: f64, b: f64) -> Option<(Extremum, Extremum)> {
        let mut result: Option<(Extremum, Extremum)> = None;
        for segment in &self.segments {
            let lo = segment.x_begin.max(a);
            let hi = segment.x_end.min(b);
            if hi < lo {
                continue;
            }
            let clipped = DiagramSegment {
                x_begin: lo,
                x_end: hi,
                ..segment.shifted_to(lo)
            };
            let (min, max) = clipped.extrema(kind);
            result = Some(match result {
                None => (min, max),
                Some((cur_min, cur_max)) => (
                    if min.value < cur_min.value { min } else { cur_min },
                    if max.value > cur_max.value { max } else { cur_max },
                ),
            });
        }
        result
    }

    /// Minimum and maximum over the whole span
    pub fn extrema(&self, kind: DiagramKind) -> Option<(Extremum, Extremum)> {
        self.extrema_between(kind, self.x_begin(), self.x_end())
    }

    /// Largest absolute value over `[a, b]` (0 if the interval misses the span)
    pub fn max_abs_between(&self, kind: DiagramKind, a: f64, b: f64) -> f64 {
        self.extrema_between(kind, a, b)
            .map(|(min, max)| min.value.abs().max(max.value.abs()))
            .unwrap_or(0.0)
    }

    /// Position and value of the largest absolute value over the span
    pub fn peak(&self, kind: DiagramKind) -> Option<Extremum> {
        self.extrema(kind).map(|(min, max)| {
            if min.value.abs() > max.value.abs() {
                min
            } else {
                max
            }
        })
    }

    /// Evenly spaced `(x, value)` pairs for plotting, with both one-sided
    /// limits at every breakpoint so jumps stay visible
    pub fn sample(&self, kind: DiagramKind, n: usize) -> Vec<(f64, f64)> {
        let (x0, x1) = (self.x_begin(), self.x_end());
        let mut xs: Vec<f64> = (0..=n.max(1))
            .map(|i| x0 + (x1 - x0) * i as f64 / n.max(1) as f64)
            .collect();
        xs.extend(self.segments.iter().map(|s| s.x_begin));
        xs.sort_by(f64::total_cmp);
        xs.dedup();

        let mut points = Vec::with_capacity(xs.len() * 2);
        for x in xs {
            let left = self.left(kind, x);
            let right = self.at(kind, x);
            if x > x0 && left != right {
                points.push((x, left));
            }
            points.push((x, right));
        }
        points
    }
}

impl DiagramSegment {
    /// Same polynomials re-expressed about a new local origin
    fn shifted_to(&self, x_begin: f64) -> DiagramSegment {
        let dt = x_begin - self.x_begin;
        DiagramSegment {
            x_begin,
            x_end: self.x_end,
            shear: shift(&self.shear, dt),
            moment: shift(&self.moment, dt),
            rotation: shift(&self.rotation, dt),
            displacement: shift(&self.displacement, dt),
        }
    }
}

/// Upper bound of `|p(t)|` over `[0, length]`
fn abs_bound(p: &Polynomial, length: f64) -> f64 {
    p.coeffs
        .iter()
        .enumerate()
        .map(|(k, c)| c.abs() * length.powi(k as i32))
        .sum()
}

/// `p(t + dt)` expanded in powers of `t`
fn shift(p: &Polynomial, dt: f64) -> Polynomial {
    if dt == 0.0 {
        return *p;
    }
    let mut out = [0.0; 6];
    for (k, &c) in p.coeffs.iter().enumerate() {
        // binomial expansion of c·(t + dt)^k
        let mut binom = 1.0;
        for j in 0..=k {
            out[j] += c * binom * dt.powi((k - j) as i32);
            binom = binom * (k - j) as f64 / (j + 1) as f64;
        }
    }
    Polynomial::new(out)
}
