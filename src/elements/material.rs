//! Material properties

use serde::{Deserialize, Serialize};

/// Elastic material properties for structural analysis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Modulus of elasticity (Young's modulus)
    pub e: f64,
    /// Poisson's ratio
    pub nu: f64,
    /// Coefficient of thermal expansion
    pub alpha: f64,
}

impl Material {
    /// Create a new material with given properties
    pub fn new(e: f64, nu: f64, alpha: f64) -> Self {
        Self { e, nu, alpha }
    }

    /// Material with only a modulus, for pure stiffness studies
    pub fn elastic(e: f64) -> Self {
        Self::new(e, 0.0, 0.0)
    }

    /// Unit-less reference material (E = 1e6)
    pub fn unitary() -> Self {
        Self::new(1e6, 1.0, 1.0)
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::unitary()
    }
}

