//! Node element - a point on the beam axis

use serde::{Deserialize, Serialize};

use super::Support;
use crate::error::BeamResult;

/// A node on the beam axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Position along the beam axis
    pub x: f64,
    /// Support condition
    #[serde(default)]
    pub support: Support,
}

impl Node {
    /// Create a new node at the given position
    pub fn new(x: f64, support: Support) -> Self {
        Self { x, support }
    }

    /// Unsupported node
    pub fn free(x: f64) -> Self {
        Self::new(x, Support::Free)
    }

    /// Simple support (displacement restrained)
    pub fn simple(x: f64) -> Self {
        Self::new(x, Support::Simple)
    }

    /// Crimped/fixed support (displacement and rotation restrained)
    pub fn fixed(x: f64) -> Self {
        Self::new(x, Support::Fixed)
    }

    /// Node with an imposed transverse displacement
    pub fn imposed(x: f64, displacement: f64) -> Self {
        Self::new(x, Support::imposed_displacement(displacement))
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::free(0.0)
    }
}

/// Sort nodes by position and merge the ones closer than `tolerance`.
///
/// Merged nodes carry the combined support condition.
pub fn merge_nodes(mut nodes: Vec<Node>, tolerance: f64) -> BeamResult<Vec<Node>> {
    nodes.sort_by(|a, b| a.x.total_cmp(&b.x));

    let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        match merged.last_mut() {
            Some(last) if (node.x - last.x).abs() <= tolerance => {
                last.support = last.support.combine(&node.support)?;
            }
            _ => merged.push(node),
        }
    }
    Ok(merged)
}
