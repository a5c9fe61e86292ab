//! Loads acting on the beam axis

use serde::{Deserialize, Serialize};

use crate::error::{BeamError, BeamResult};

/// A load on the beam.
///
/// Forces are positive upward and moments positive counter-clockwise, so
/// gravity loads are negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Load {
    /// Concentrated transverse force
    PointForce { x: f64, force: f64 },
    /// Concentrated moment
    PointMoment { x: f64, moment: f64 },
    /// Linearly varying line load, uniform when `q_begin == q_end`
    Distributed {
        x_begin: f64,
        x_end: f64,
        q_begin: f64,
        q_end: f64,
    },
    /// Imposed transverse displacement (support settlement)
    Displacement { x: f64, value: f64 },
}

impl Load {
    pub fn point_force(x: f64, force: f64) -> Self {
        Load::PointForce { x, force }
    }

    pub fn point_moment(x: f64, moment: f64) -> Self {
        Load::PointMoment { x, moment }
    }

    /// Uniform line load between two positions
    pub fn uniform(q: f64, x_begin: f64, x_end: f64) -> Self {
        Self::linear(x_begin, x_end, q, q)
    }

    pub fn linear(x_begin: f64, x_end: f64, q_begin: f64, q_end: f64) -> Self {
        Load::Distributed {
            x_begin,
            x_end,
            q_begin,
            q_end,
        }
    }

    /// Triangular load, zero at `x_begin` and `q_max` at `x_end`
    pub fn triangular(q_max: f64, x_begin: f64, x_end: f64) -> Self {
        Self::linear(x_begin, x_end, 0.0, q_max)
    }

    pub fn displacement(x: f64, value: f64) -> Self {
        Load::Displacement { x, value }
    }

    /// First position the load touches
    pub fn x_begin(&self) -> f64 {
        match *self {
            Load::PointForce { x, .. } | Load::PointMoment { x, .. } | Load::Displacement { x, .. } => x,
            Load::Distributed { x_begin, .. } => x_begin,
        }
    }

    /// Last position the load touches
    pub fn x_end(&self) -> f64 {
        match *self {
            Load::Distributed { x_end, .. } => x_end,
            _ => self.x_begin(),
        }
    }

    /// Positions where the load introduces a discontinuity
    pub fn breakpoints(&self) -> Vec<f64> {
        match *self {
            Load::Distributed { x_begin, x_end, .. } => vec![x_begin, x_end],
            _ => vec![self.x_begin()],
        }
    }

    pub fn validate(&self) -> BeamResult<()> {
        let finite = match *self {
            Load::PointForce { x, force } => x.is_finite() && force.is_finite(),
            Load::PointMoment { x, moment } => x.is_finite() && moment.is_finite(),
            Load::Displacement { x, value } => x.is_finite() && value.is_finite(),
            Load::Distributed {
                x_begin,
                x_end,
                q_begin,
                q_end,
            } => {
                if x_end <= x_begin {
                    return Err(BeamError::InvalidInput(format!(
                        "distributed load [{}, {}] must have a positive length",
                        x_begin, x_end
                    )));
                }
                [x_begin, x_end, q_begin, q_end].iter().all(|v| v.is_finite())
            }
        };
        if finite {
            Ok(())
        } else {
            Err(BeamError::InvalidInput(format!("non-finite load {:?}", self)))
        }
    }

    /// Line load intensity at `x` (0 outside the loaded interval)
    pub fn intensity_at(&self, x: f64) -> f64 {
        match *self {
            Load::Distributed {
                x_begin,
                x_end,
                q_begin,
                q_end,
            } if x >= x_begin && x <= x_end => {
                q_begin + (q_end - q_begin) * (x - x_begin) / (x_end - x_begin)
            }
            _ => 0.0,
        }
    }

    /// Total transverse force
    pub fn resultant(&self) -> f64 {
        match *self {
            Load::PointForce { force, .. } => force,
            Load::Distributed {
                x_begin,
                x_end,
                q_begin,
                q_end,
            } => (q_begin + q_end) / 2.0 * (x_end - x_begin),
            Load::PointMoment { .. } | Load::Displacement { .. } => 0.0,
        }
    }

    /// Moment of the load about `x0`, counter-clockwise positive
    pub fn moment_about(&self, x0: f64) -> f64 {
        match *self {
            Load::PointForce { x, force } => force * (x - x0),
            Load::PointMoment { moment, .. } => moment,
            Load::Distributed {
                x_begin,
                x_end,
                q_begin,
                q_end,
            } => {
                let l = x_end - x_begin;
                let w = q_end - q_begin;
                // ∫ q(s)·(s - x_begin) ds + (x_begin - x0)·∫ q(s) ds
                q_begin * l * l / 2.0 + w * l * l / 3.0 + (x_begin - x0) * self.resultant()
            }
            Load::Displacement { .. } => 0.0,
        }
    }

    /// Same load with its magnitude multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        match *self {
            Load::PointForce { x, force } => Load::PointForce {
                x,
                force: force * factor,
            },
            Load::PointMoment { x, moment } => Load::PointMoment {
                x,
                moment: moment * factor,
            },
            Load::Distributed {
                x_begin,
                x_end,
                q_begin,
                q_end,
            } => Load::Distributed {
                x_begin,
                x_end,
                q_begin: q_begin * factor,
                q_end: q_end * factor,
            },
            Load::Displacement { x, value } => Load::Displacement {
                x,
                value: value * factor,
            },
        }
    }

    pub fn is_distributed(&self) -> bool {
        matches!(self, Load::Distributed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_uniform_resultant() {
        let load = Load::uniform(-0.4994, 113.0, 583.0);
        assert_relative_eq!(load.resultant(), -0.4994 * 470.0, epsilon = 1e-9);
        assert_relative_eq!(load.intensity_at(300.0), -0.4994);
        assert_eq!(load.intensity_at(600.0), 0.0);
    }

    #[test]
    fn test_triangular_moment() {
        // Resultant q·L/2 acting at 2L/3 from the zero end
        let load = Load::triangular(-3.0, 0.0, 6.0);
        assert_relative_eq!(load.resultant(), -9.0, epsilon = 1e-12);
        assert_relative_eq!(load.moment_about(0.0), -9.0 * 4.0, epsilon = 1e-12);
        assert_relative_eq!(load.moment_about(4.0), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_scaled() {
        let load = Load::point_force(200.0, -20.0).scaled(2.0);
        assert_eq!(load, Load::point_force(200.0, -40.0));
    }

    #[test]
    fn test_invalid_distributed() {
        assert!(Load::uniform(-1.0, 5.0, 5.0).validate().is_err());
        assert!(Load::point_force(f64::NAN, 1.0).validate().is_err());
    }
}
