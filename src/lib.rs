//! rc-beam - continuous beam analysis and reinforced concrete design
//!
//! This library solves linear continuous beams with the stiffness method and
//! designs their reinforcement:
//! - Euler-Bernoulli beam elements on a single axis
//! - Point forces, point moments, linearly distributed loads and imposed
//!   displacements
//! - Continuous shear, moment, rotation and displacement diagrams
//! - Longitudinal and transverse reinforcement (NBR 6118 by default)
//! - Lowest-cost search over concrete classes and bar catalogs
//!
//! ## Example
//! ```rust
//! use rc_beam::prelude::*;
//!
//! let loads = LoadSet::new(vec![Load::point_force(200.0, -20.0)]).unwrap();
//! let beam = Beam::from_nodes(
//!     vec![Node::simple(0.0), Node::simple(400.0)],
//!     Material::default(),
//!     Section::rectangular(20.0, 50.0),
//!     loads,
//! )
//! .unwrap();
//!
//! // Structural analysis
//! let solution = beam.solve(&AnalysisOptions::default()).unwrap();
//! assert!((solution.diagrams.moment(200.0) - 2000.0).abs() < 1e-6);
//!
//! // Reinforcement for one concrete class
//! let concrete_beam = ConcreteBeam::new(&beam, ConcreteClass::new(30.0, 353.30), DesignParameters::default()).unwrap();
//! let report = concrete_beam.design().unwrap();
//! println!("cost: {:.2}", report.total_cost);
//! ```

pub mod analysis;
pub mod concrete;
pub mod diagram;
pub mod elements;
pub mod error;
pub mod loads;
pub mod math;
pub mod model;
pub mod problem;
pub mod results;
pub mod search;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::AnalysisOptions;
    pub use crate::concrete::{
        AvailableMaterials, CodeRules, ConcreteBeam, ConcreteClass, CostBreakdown, DesignParameters, DesignReport,
        LongSteelBar, SteelBarCatalog, StirrupCatalog, TransvSteelSegment,
    };
    pub use crate::diagram::{DiagramKind, Diagrams};
    pub use crate::elements::{BeamElement, Material, Node, Section, Support};
    pub use crate::error::{BeamError, BeamResult, Face, ToleranceWarning};
    pub use crate::loads::{Load, LoadSet};
    pub use crate::model::Beam;
    pub use crate::problem::{Problem, ProblemOutcome};
    pub use crate::results::{BeamSolution, NodeResult};
    pub use crate::search::{DesignSearch, DesignSpace, SearchOptions, SearchOutcome};
}
