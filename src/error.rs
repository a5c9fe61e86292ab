//! Error types for rc-beam

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tensile face of a longitudinal reinforcement layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Face {
    /// Bottom face, tensioned by positive (sagging) moment
    Bottom,
    /// Top face, tensioned by negative (hogging) moment
    Top,
    /// Stirrups (transverse reinforcement)
    Transverse,
}

impl std::fmt::Display for Face {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Face::Bottom => "bottom",
            Face::Top => "top",
            Face::Transverse => "transverse",
        };
        write!(f, "{}", name)
    }
}

/// Main error type for beam analysis and design
#[derive(Error, Debug)]
pub enum BeamError {
    #[error("Structure is unstable: {0}")]
    StructuralInstability(String),

    #[error("Required {face} steel area at x={x:.2} is {required:.3}, outside the allowed limit {limit:.3}")]
    ReinforcementAreaOutOfBounds {
        face: Face,
        x: f64,
        required: f64,
        limit: f64,
    },

    #[error("Shear {shear:.2} at x={x:.2} exceeds the compression strut capacity {capacity:.2}")]
    CompressionStrutFailure { x: f64, shear: f64, capacity: f64 },

    #[error("Displacement {displacement:.4} between x={x_begin:.2} and x={x_end:.2} exceeds the limit {limit:.4}")]
    ServiceabilityLimitExceeded {
        x_begin: f64,
        x_end: f64,
        displacement: f64,
        limit: f64,
    },

    #[error("No feasible design found after evaluating {evaluated} combinations")]
    CatalogExhausted { evaluated: usize },

    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// A swept section that cannot hold reinforcement
    #[error("Section {section} rejected: {reason}")]
    SectionRejected { section: String, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Material out of range: {0}")]
    MaterialOutOfRange(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl BeamError {
    /// True for errors that only invalidate one catalog combination.
    ///
    /// The design search records these as infeasible candidates and moves on;
    /// everything else is a property of the geometry and aborts the search.
    pub fn is_candidate_local(&self) -> bool {
        matches!(
            self,
            BeamError::ReinforcementAreaOutOfBounds { .. }
                | BeamError::CompressionStrutFailure { .. }
                | BeamError::ServiceabilityLimitExceeded { .. }
                | BeamError::SectionRejected { .. }
                | BeamError::MaterialOutOfRange(_)
        )
    }

    /// Short error code for programmatic handling
    pub fn code(&self) -> &'static str {
        match self {
            BeamError::StructuralInstability(_) => "STRUCTURAL_INSTABILITY",
            BeamError::ReinforcementAreaOutOfBounds { .. } => "AREA_OUT_OF_BOUNDS",
            BeamError::CompressionStrutFailure { .. } => "STRUT_FAILURE",
            BeamError::ServiceabilityLimitExceeded { .. } => "SERVICEABILITY",
            BeamError::CatalogExhausted { .. } => "CATALOG_EXHAUSTED",
            BeamError::InvalidGeometry(_) => "INVALID_GEOMETRY",
            BeamError::SectionRejected { .. } => "SECTION_REJECTED",
            BeamError::InvalidInput(_) => "INVALID_INPUT",
            BeamError::MaterialOutOfRange(_) => "MATERIAL_OUT_OF_RANGE",
            BeamError::SerializationError(_) => "SERIALIZATION",
        }
    }
}

/// Result type for beam operations
pub type BeamResult<T> = Result<T, BeamError>;

/// Numeric check that exceeded its tolerance.
///
/// Not fatal: the solver logs it and keeps it on the solution so callers
/// (and tests) can inspect it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToleranceWarning {
    /// Which check tripped
    pub check: String,
    /// Position along the beam, when the check is local
    pub x: Option<f64>,
    /// Absolute residual
    pub residual: f64,
    /// Tolerance the residual was compared against
    pub tolerance: f64,
}

impl ToleranceWarning {
    pub fn new(check: impl Into<String>, x: Option<f64>, residual: f64, tolerance: f64) -> Self {
        let warning = Self {
            check: check.into(),
            x,
            residual,
            tolerance,
        };
        log::warn!("{}", warning);
        warning
    }
}

impl std::fmt::Display for ToleranceWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.x {
            Some(x) => write!(
                f,
                "{} residual {:.3e} at x={} exceeds tolerance {:.1e}",
                self.check, self.residual, x, self.tolerance
            ),
            None => write!(
                f,
                "{} residual {:.3e} exceeds tolerance {:.1e}",
                self.check, self.residual, self.tolerance
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_local_classification() {
        let strut = BeamError::CompressionStrutFailure {
            x: 10.0,
            shear: 500.0,
            capacity: 300.0,
        };
        assert!(strut.is_candidate_local());
        assert!(!BeamError::StructuralInstability("no supports".into()).is_candidate_local());
        assert!(!BeamError::CatalogExhausted { evaluated: 3 }.is_candidate_local());
    }

    #[test]
    fn test_error_message_mentions_face() {
        let err = BeamError::ReinforcementAreaOutOfBounds {
            face: Face::Top,
            x: 113.0,
            required: 30.0,
            limit: 20.0,
        };
        assert!(err.to_string().contains("top"));
        assert_eq!(err.code(), "AREA_OUT_OF_BOUNDS");
    }
}
