//! Analysis options

use serde::{Deserialize, Serialize};

/// Options for the structural solve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Check for topological stability before assembling
    pub check_stability: bool,
    /// Check static equilibrium after analysis
    pub check_statics: bool,
    /// Relative tolerance for equilibrium and continuity checks
    pub tolerance: f64,
    /// Enable debug logging of the assembled system
    pub log: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            check_stability: true,
            check_statics: true,
            tolerance: 1e-6,
            log: false,
        }
    }
}

impl AnalysisOptions {
    /// Create options for linear analysis
    pub fn linear() -> Self {
        Self::default()
    }

    /// Enable logging
    pub fn with_logging(mut self) -> Self {
        self.log = true;
        self
    }

    /// Set check tolerance
    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    /// Skip the equilibrium check
    pub fn without_statics(mut self) -> Self {
        self.check_statics = false;
        self
    }
}
