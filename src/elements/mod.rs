//! Structural elements module

mod element;
mod material;
mod node;
mod section;
mod support;

pub use element::BeamElement;
pub use material::Material;
pub use node::{merge_nodes, Node};
pub use section::Section;
pub use support::Support;
