//! Load types and load aggregation

mod load;
mod set;

pub use load::Load;
pub use set::LoadSet;
