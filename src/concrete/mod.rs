//! Reinforced concrete design on top of the beam solver
//!
//! Units: kN and cm. `fck` is given in MPa and converted on construction.

pub mod beam;
pub mod catalog;
pub mod cost;
pub mod long_steel;
pub mod material;
pub mod rules;
pub mod transv_steel;

pub use beam::{ConcreteBeam, DesignParameters, DesignReport};
pub use catalog::{AvailableMaterials, BarSize, ConcreteClass, SteelBarCatalog, StirrupCatalog, SurfaceType};
pub use cost::{CostBreakdown, CostCategory, CostItem};
pub use long_steel::{AreaDemand, LongSteelBar};
pub use material::{Aggregate, Aggressiveness, Concrete};
pub use rules::CodeRules;
pub use transv_steel::{ShearDemand, TransvSteelSegment};
