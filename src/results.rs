//! Result types for beam analysis

use serde::{Deserialize, Serialize};

use crate::diagram::{DiagramKind, Diagrams};
use crate::error::ToleranceWarning;

/// Solved values at a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NodeResult {
    /// Node position
    pub x: f64,
    /// Transverse displacement (positive upward)
    pub displacement: f64,
    /// Rotation (positive counter-clockwise)
    pub rotation: f64,
    /// Support reaction force (0 where the displacement is free)
    pub reaction_force: f64,
    /// Support reaction moment (0 where the rotation is free)
    pub reaction_moment: f64,
}

impl NodeResult {
    /// Create from a DOF pair and its reaction pair
    pub fn from_dofs(x: f64, dofs: [f64; 2], reactions: [f64; 2]) -> Self {
        Self {
            x,
            displacement: dofs[0],
            rotation: dofs[1],
            reaction_force: reactions[0],
            reaction_moment: reactions[1],
        }
    }

    /// True if the node carries any reaction
    pub fn has_reaction(&self) -> bool {
        self.reaction_force != 0.0 || self.reaction_moment != 0.0
    }
}

/// Outcome of [`Beam::solve`](crate::model::Beam::solve)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeamSolution {
    /// One entry per refined node, ordered by position
    pub nodes: Vec<NodeResult>,
    /// Continuous diagrams over the span
    pub diagrams: Diagrams,
    /// Checks that exceeded their tolerance
    pub warnings: Vec<ToleranceWarning>,
}

impl BeamSolution {
    /// Result of the node closest to `x`
    pub fn node_at(&self, x: f64) -> Option<&NodeResult> {
        self.nodes
            .iter()
            .min_by(|a, b| (a.x - x).abs().total_cmp(&(b.x - x).abs()))
    }

    /// Nodes carrying reactions
    pub fn reactions(&self) -> impl Iterator<Item = &NodeResult> {
        self.nodes.iter().filter(|n| n.has_reaction())
    }

    /// Sum of reaction forces
    pub fn total_reaction(&self) -> f64 {
        self.nodes.iter().map(|n| n.reaction_force).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    /// Get analysis summary
    pub fn summary(&self, free_dofs: usize) -> AnalysisSummary {
        let peak = |kind| {
            self.diagrams
                .peak(kind)
                .map(|e| (e.value, e.x))
                .unwrap_or((0.0, 0.0))
        };
        let (max_displacement, max_displacement_x) = peak(DiagramKind::Displacement);
        let (max_moment, max_moment_x) = peak(DiagramKind::Moment);
        let (max_shear, max_shear_x) = peak(DiagramKind::Shear);

        let mut summary = AnalysisSummary {
            max_displacement,
            max_displacement_x,
            max_moment,
            max_moment_x,
            max_shear,
            max_shear_x,
            num_nodes: self.nodes.len(),
            num_segments: self.diagrams.segments().len(),
            total_dofs: self.nodes.len() * 2,
            free_dofs,
            num_warnings: self.warnings.len(),
            ..Default::default()
        };

        for node in &self.nodes {
            if node.reaction_force.abs() > summary.max_reaction.abs() {
                summary.max_reaction = node.reaction_force;
                summary.max_reaction_x = node.x;
            }
        }

        summary
    }
}

/// Summary of analysis results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisSummary {
    /// Displacement with the largest magnitude
    pub max_displacement: f64,
    /// Where it occurs
    pub max_displacement_x: f64,
    /// Bending moment with the largest magnitude
    pub max_moment: f64,
    pub max_moment_x: f64,
    /// Shear with the largest magnitude
    pub max_shear: f64,
    pub max_shear_x: f64,
    /// Reaction force with the largest magnitude
    pub max_reaction: f64,
    pub max_reaction_x: f64,
    /// Total number of nodes
    pub num_nodes: usize,
    /// Total number of diagram segments
    pub num_segments: usize,
    /// Total DOFs
    pub total_dofs: usize,
    /// Free DOFs (unknown)
    pub free_dofs: usize,
    pub num_warnings: usize,
}
