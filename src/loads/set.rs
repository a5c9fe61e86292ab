//! Aggregated load collection

use serde::{Deserialize, Serialize};

use super::Load;
use crate::elements::Node;
use crate::error::BeamResult;
use crate::math::Polynomial;

/// Loads acting on one beam, ordered by their first position
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoadSet {
    loads: Vec<Load>,
}

impl LoadSet {
    /// Create a validated, position-ordered load set
    pub fn new(loads: Vec<Load>) -> BeamResult<Self> {
        for load in &loads {
            load.validate()?;
        }
        let mut set = Self { loads };
        set.sort();
        Ok(set)
    }

    pub fn empty() -> Self {
        Self::default()
    }

    fn sort(&mut self) {
        self.loads.sort_by(|a, b| a.x_begin().total_cmp(&b.x_begin()));
    }

    /// Add a load, keeping the set ordered
    pub fn add(&mut self, load: Load) -> BeamResult<()> {
        load.validate()?;
        self.loads.push(load);
        self.sort();
        Ok(())
    }

    pub fn loads(&self) -> &[Load] {
        &self.loads
    }

    pub fn iter(&self) -> impl Iterator<Item = &Load> {
        self.loads.iter()
    }

    pub fn len(&self) -> usize {
        self.loads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loads.is_empty()
    }

    /// Every position where some load starts or ends
    pub fn breakpoints(&self) -> Vec<f64> {
        let mut points: Vec<f64> = self.loads.iter().flat_map(|l| l.breakpoints()).collect();
        points.sort_by(f64::total_cmp);
        points.dedup();
        points
    }

    /// Sum of all transverse forces
    pub fn total_vertical(&self) -> f64 {
        self.loads.iter().map(Load::resultant).sum()
    }

    /// Sum of load moments about `x0`
    pub fn moment_about(&self, x0: f64) -> f64 {
        self.loads.iter().map(|l| l.moment_about(x0)).sum()
    }

    /// Same set with every load multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            loads: self.loads.iter().map(|l| l.scaled(factor)).collect(),
        }
    }

    /// Concentrated force acting within `tolerance` of `x`
    pub fn point_force_at(&self, x: f64, tolerance: f64) -> f64 {
        self.loads
            .iter()
            .filter_map(|l| match *l {
                Load::PointForce { x: xl, force } if (xl - x).abs() <= tolerance => Some(force),
                _ => None,
            })
            .sum()
    }

    /// Concentrated moment acting within `tolerance` of `x`
    pub fn point_moment_at(&self, x: f64, tolerance: f64) -> f64 {
        self.loads
            .iter()
            .filter_map(|l| match *l {
                Load::PointMoment { x: xl, moment } if (xl - x).abs() <= tolerance => Some(moment),
                _ => None,
            })
            .sum()
    }

    /// Combined line load over `[x_begin, x_end]` as a polynomial in
    /// `t = x - x_begin`.
    ///
    /// The interval must not straddle a load boundary; refined beam elements
    /// guarantee that.
    pub fn distributed_on(&self, x_begin: f64, x_end: f64) -> Polynomial {
        let mid = 0.5 * (x_begin + x_end);
        let length = x_end - x_begin;
        self.loads
            .iter()
            .filter(|l| l.is_distributed() && l.x_begin() <= mid && l.x_end() >= mid)
            .fold(Polynomial::zero(), |acc, l| {
                let q_i = l.intensity_at(x_begin.max(l.x_begin()));
                let q_j = l.intensity_at(x_end.min(l.x_end()));
                acc + Polynomial::linear(q_i, (q_j - q_i) / length)
            })
    }

    /// Imposed displacements expressed as nodes with prescribed supports
    pub fn imposed_displacement_nodes(&self) -> Vec<Node> {
        self.loads
            .iter()
            .filter_map(|l| match *l {
                Load::Displacement { x, value } => Some(Node::imposed(x, value)),
                _ => None,
            })
            .collect()
    }
}

impl FromIterator<Load> for LoadSet {
    /// Collects without validation; use [`LoadSet::new`] for untrusted input
    fn from_iter<I: IntoIterator<Item = Load>>(iter: I) -> Self {
        let mut set = Self {
            loads: iter.into_iter().collect(),
        };
        set.sort();
        set
    }
}
