//! Beam element - a 2-node Euler-Bernoulli bending element

use serde::{Deserialize, Serialize};

use super::{Material, Section};
use crate::error::{BeamError, BeamResult};
use crate::math::{beam_local_stiffness, Mat4};

/// A straight beam element between two positions on the axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamElement {
    /// Start position (i-node)
    pub x_begin: f64,
    /// End position (j-node)
    pub x_end: f64,
    /// Elastic material
    #[serde(default)]
    pub material: Material,
    /// Cross-section
    #[serde(default)]
    pub section: Section,
}

impl BeamElement {
    /// Create a new element
    pub fn new(x_begin: f64, x_end: f64, material: Material, section: Section) -> Self {
        Self {
            x_begin,
            x_end,
            material,
            section,
        }
    }

    /// Element length
    pub fn length(&self) -> f64 {
        self.x_end - self.x_begin
    }

    /// Flexural rigidity EI
    pub fn flexural_rigidity(&self) -> f64 {
        self.material.e * self.section.inertia()
    }

    /// Local stiffness matrix over `[v_i, θ_i, v_j, θ_j]`
    pub fn local_stiffness(&self) -> Mat4 {
        beam_local_stiffness(self.flexural_rigidity(), self.length())
    }

    /// True if `x` lies within the element (ends included)
    pub fn contains(&self, x: f64) -> bool {
        x >= self.x_begin && x <= self.x_end
    }

    /// Copy of this element restricted to `[x_begin, x_end]`
    pub fn restricted(&self, x_begin: f64, x_end: f64) -> Self {
        Self {
            x_begin,
            x_end,
            ..self.clone()
        }
    }

    /// Check the element has a positive, finite length
    pub fn validate(&self) -> BeamResult<()> {
        if !(self.x_begin.is_finite() && self.x_end.is_finite()) || self.length() <= 0.0 {
            return Err(BeamError::InvalidGeometry(format!(
                "element [{}, {}] must have a positive length",
                self.x_begin, self.x_end
            )));
        }
        if self.flexural_rigidity() <= 0.0 {
            return Err(BeamError::InvalidGeometry(format!(
                "element [{}, {}] has no flexural rigidity",
                self.x_begin, self.x_end
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_element_creation() {
        let element = BeamElement::new(0.0, 113.0, Material::unitary(), Section::rectangular(25.0, 56.0));
        assert_relative_eq!(element.length(), 113.0);
        assert_relative_eq!(element.flexural_rigidity(), 1e6 * 25.0 * 56.0_f64.powi(3) / 12.0, max_relative = 1e-12);
        assert!(element.validate().is_ok());
    }

    #[test]
    fn test_zero_length_rejected() {
        let element = BeamElement::new(10.0, 10.0, Material::unitary(), Section::default());
        assert!(matches!(element.validate(), Err(BeamError::InvalidGeometry(_))));
    }
}
