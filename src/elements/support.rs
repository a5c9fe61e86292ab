//! Support conditions

use serde::{Deserialize, Serialize};

use crate::error::{BeamError, BeamResult};

/// Support condition at a node.
///
/// Each variant maps to a constraint row over the two nodal DOFs
/// `[displacement, rotation]`: `None` leaves the DOF free, `Some(value)`
/// prescribes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type")]
pub enum Support {
    /// No restraint
    #[default]
    Free,
    /// Displacement restrained, rotation free
    Simple,
    /// Displacement and rotation restrained (crimped)
    Fixed,
    /// Prescribed non-zero displacement and/or rotation
    Imposed {
        displacement: Option<f64>,
        rotation: Option<f64>,
    },
}

impl Support {
    /// Imposed transverse displacement with free rotation
    pub fn imposed_displacement(value: f64) -> Self {
        Support::Imposed {
            displacement: Some(value),
            rotation: None,
        }
    }

    /// Constraint row `[displacement, rotation]`
    pub fn constraints(&self) -> [Option<f64>; 2] {
        match *self {
            Support::Free => [None, None],
            Support::Simple => [Some(0.0), None],
            Support::Fixed => [Some(0.0), Some(0.0)],
            Support::Imposed {
                displacement,
                rotation,
            } => [displacement, rotation],
        }
    }

    /// Rebuild the canonical variant from a constraint row
    pub fn from_constraints(row: [Option<f64>; 2]) -> Self {
        match row {
            [None, None] => Support::Free,
            [Some(v), None] if v == 0.0 => Support::Simple,
            [Some(v), Some(r)] if v == 0.0 && r == 0.0 => Support::Fixed,
            [displacement, rotation] => Support::Imposed {
                displacement,
                rotation,
            },
        }
    }

    /// Merge two conditions found at the same position.
    ///
    /// A prescribed DOF wins over a free one; two different prescribed values
    /// for the same DOF cannot both hold.
    pub fn combine(&self, other: &Support) -> BeamResult<Support> {
        let a = self.constraints();
        let b = other.constraints();
        let mut row = [None, None];
        for dof in 0..2 {
            row[dof] = match (a[dof], b[dof]) {
                (None, v) | (v, None) => v,
                (Some(x), Some(y)) if (x - y).abs() <= 1e-12 * x.abs().max(y.abs()).max(1.0) => Some(x),
                (Some(x), Some(y)) => {
                    return Err(BeamError::InvalidGeometry(format!(
                        "conflicting prescribed values {} and {} on the same node",
                        x, y
                    )))
                }
            };
        }
        Ok(Support::from_constraints(row))
    }

    /// Returns true if the transverse displacement is prescribed
    pub fn restrains_displacement(&self) -> bool {
        self.constraints()[0].is_some()
    }

    /// Returns true if the rotation is prescribed
    pub fn restrains_rotation(&self) -> bool {
        self.constraints()[1].is_some()
    }

    /// Count number of restrained DOFs
    pub fn num_restrained(&self) -> usize {
        self.constraints().iter().filter(|c| c.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_support() {
        let support = Support::Fixed;
        assert!(support.restrains_displacement() && support.restrains_rotation());
        assert_eq!(support.num_restrained(), 2);
    }

    #[test]
    fn test_simple_support() {
        let support = Support::Simple;
        assert!(support.restrains_displacement());
        assert!(!support.restrains_rotation());
        assert_eq!(support.constraints(), [Some(0.0), None]);
    }

    #[test]
    fn test_combine_simple_with_free_rotation_lock() {
        let guided = Support::Imposed {
            displacement: None,
            rotation: Some(0.0),
        };
        assert_eq!(Support::Simple.combine(&guided).unwrap(), Support::Fixed);
        assert_eq!(Support::Free.combine(&Support::Simple).unwrap(), Support::Simple);
    }

    #[test]
    fn test_combine_imposed_displacement() {
        let settled = Support::imposed_displacement(-0.5);
        let merged = Support::Free.combine(&settled).unwrap();
        assert_eq!(merged.constraints(), [Some(-0.5), None]);
        assert!(Support::Simple.combine(&settled).is_err());
    }
}
