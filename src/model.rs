//! Beam model - geometry, refinement and the stiffness solve

use crate::analysis::AnalysisOptions;
use crate::diagram::Diagrams;
use crate::elements::{merge_nodes, BeamElement, Material, Node, Section};
use crate::error::{BeamError, BeamResult, ToleranceWarning};
use crate::loads::LoadSet;
use crate::math::{self, Mat, Vec as FEVec};
use crate::results::{AnalysisSummary, BeamSolution, NodeResult};

/// Node merge tolerance, relative to the span length
pub const MERGE_TOLERANCE: f64 = 1e-9;

/// A continuous beam on a single axis.
///
/// Keeps the elements and nodes as given plus a refined copy split at every
/// node and load boundary, so that point loads always sit on nodes and
/// distributed loads never start or stop inside an element.
#[derive(Debug, Clone)]
pub struct Beam {
    user_nodes: Vec<Node>,
    user_elements: Vec<BeamElement>,
    loads: LoadSet,
    nodes: Vec<Node>,
    elements: Vec<BeamElement>,
}

impl Beam {
    /// Create a beam from supports/nodes, elements tiling the span, and loads
    pub fn new(nodes: Vec<Node>, mut elements: Vec<BeamElement>, loads: LoadSet) -> BeamResult<Self> {
        if elements.is_empty() {
            return Err(BeamError::InvalidGeometry(
                "a beam needs at least one element".to_string(),
            ));
        }
        elements.sort_by(|a, b| a.x_begin.total_cmp(&b.x_begin));
        for element in &elements {
            element.validate()?;
        }

        let x_begin = elements[0].x_begin;
        let x_end = elements[elements.len() - 1].x_end;
        let tolerance = MERGE_TOLERANCE * (x_end - x_begin);

        for pair in elements.windows(2) {
            if (pair[1].x_begin - pair[0].x_end).abs() > tolerance {
                return Err(BeamError::InvalidGeometry(format!(
                    "elements must be contiguous: one ends at {} and the next starts at {}",
                    pair[0].x_end, pair[1].x_begin
                )));
            }
        }
        for node in &nodes {
            if node.x < x_begin - tolerance || node.x > x_end + tolerance {
                return Err(BeamError::InvalidGeometry(format!(
                    "node at x={} lies outside the beam [{}, {}]",
                    node.x, x_begin, x_end
                )));
            }
        }
        for load in loads.iter() {
            if load.x_begin() < x_begin - tolerance || load.x_end() > x_end + tolerance {
                return Err(BeamError::InvalidInput(format!(
                    "load {:?} lies outside the beam [{}, {}]",
                    load, x_begin, x_end
                )));
            }
        }

        let (refined_nodes, refined_elements) = Self::refine(&nodes, &elements, &loads, tolerance)?;
        log::debug!(
            "Beam [{}, {}]: {} elements refined into {}",
            x_begin,
            x_end,
            elements.len(),
            refined_elements.len()
        );

        Ok(Self {
            user_nodes: nodes,
            user_elements: elements,
            loads,
            nodes: refined_nodes,
            elements: refined_elements,
        })
    }

    /// Create a beam with one element between each pair of consecutive nodes
    pub fn from_nodes(nodes: Vec<Node>, material: Material, section: Section, loads: LoadSet) -> BeamResult<Self> {
        let mut positions: Vec<f64> = nodes.iter().map(|n| n.x).collect();
        positions.sort_by(f64::total_cmp);
        let span = match (positions.first(), positions.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        };
        positions.dedup_by(|a, b| (*a - *b).abs() <= MERGE_TOLERANCE * span);
        if positions.len() < 2 {
            return Err(BeamError::InvalidGeometry(
                "a beam needs at least two distinct node positions".to_string(),
            ));
        }

        let elements = positions
            .windows(2)
            .map(|w| BeamElement::new(w[0], w[1], material, section.clone()))
            .collect();
        Self::new(nodes, elements, loads)
    }

    /// Split the user elements at every node and load boundary
    fn refine(
        nodes: &[Node],
        elements: &[BeamElement],
        loads: &LoadSet,
        tolerance: f64,
    ) -> BeamResult<(Vec<Node>, Vec<BeamElement>)> {
        let mut candidates: Vec<Node> = elements
            .iter()
            .flat_map(|e| [Node::free(e.x_begin), Node::free(e.x_end)])
            .collect();
        candidates.extend_from_slice(nodes);
        candidates.extend(loads.breakpoints().into_iter().map(Node::free));
        candidates.extend(loads.imposed_displacement_nodes());

        let refined_nodes = merge_nodes(candidates, tolerance)?;

        let refined_elements = refined_nodes
            .windows(2)
            .map(|w| {
                let mid = 0.5 * (w[0].x + w[1].x);
                elements
                    .iter()
                    .find(|e| e.contains(mid))
                    .map(|e| e.restricted(w[0].x, w[1].x))
                    .ok_or_else(|| {
                        BeamError::InvalidGeometry(format!("no element covers x={}", mid))
                    })
            })
            .collect::<BeamResult<Vec<_>>>()?;

        Ok((refined_nodes, refined_elements))
    }

    // ========================
    // Accessors
    // ========================

    /// Refined nodes, ordered by position
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Refined elements, ordered by position
    pub fn elements(&self) -> &[BeamElement] {
        &self.elements
    }

    /// Nodes as given at construction
    pub fn user_nodes(&self) -> &[Node] {
        &self.user_nodes
    }

    /// Elements as given at construction
    pub fn user_elements(&self) -> &[BeamElement] {
        &self.user_elements
    }

    pub fn loads(&self) -> &LoadSet {
        &self.loads
    }

    pub fn x_begin(&self) -> f64 {
        self.elements[0].x_begin
    }

    pub fn x_end(&self) -> f64 {
        self.elements[self.elements.len() - 1].x_end
    }

    pub fn length(&self) -> f64 {
        self.x_end() - self.x_begin()
    }

    pub fn num_dofs(&self) -> usize {
        self.nodes.len() * 2
    }

    /// Number of DOFs left unknown by the supports
    pub fn free_dofs(&self) -> usize {
        self.num_dofs()
            - self
                .nodes
                .iter()
                .map(|n| n.support.num_restrained())
                .sum::<usize>()
    }

    /// User element containing `x` (the later one at a shared boundary)
    pub fn user_element_at(&self, x: f64) -> Option<&BeamElement> {
        self.user_elements.iter().rev().find(|e| e.contains(x))
    }

    fn node_tolerance(&self) -> f64 {
        MERGE_TOLERANCE * self.length()
    }

    // ========================
    // Pure transforms
    // ========================

    /// Same geometry and loads with every element made of `material`
    pub fn with_material(&self, material: Material) -> Beam {
        let mut beam = self.clone();
        for element in beam.user_elements.iter_mut().chain(beam.elements.iter_mut()) {
            element.material = material;
        }
        beam
    }

    /// Same geometry and loads with every element given `section`
    pub fn with_section(&self, section: Section) -> Beam {
        let mut beam = self.clone();
        for element in beam.user_elements.iter_mut().chain(beam.elements.iter_mut()) {
            element.section = section.clone();
        }
        beam
    }

    /// Same geometry with another load set
    pub fn with_loads(&self, loads: LoadSet) -> BeamResult<Beam> {
        Beam::new(self.user_nodes.clone(), self.user_elements.clone(), loads)
    }

    /// Same geometry with every load multiplied by `factor`
    pub fn scaled_loads(&self, factor: f64) -> BeamResult<Beam> {
        self.with_loads(self.loads.scaled(factor))
    }

    // ========================
    // Analysis
    // ========================

    /// Reject supports that leave a rigid-body mode.
    ///
    /// The rigid modes `v = a + b·x` vanish with displacement restraints at
    /// two nodes, or one displacement restraint plus a rotation restraint at
    /// any node.
    pub fn check_stability(&self) -> BeamResult<()> {
        let displacement_restraints = self
            .nodes
            .iter()
            .filter(|n| n.support.restrains_displacement())
            .count();
        let rotation_restraints = self
            .nodes
            .iter()
            .filter(|n| n.support.restrains_rotation())
            .count();

        if displacement_restraints >= 2 || (displacement_restraints >= 1 && rotation_restraints >= 1) {
            Ok(())
        } else {
            Err(BeamError::StructuralInstability(format!(
                "{} displacement and {} rotation restraint(s) leave a rigid-body mode",
                displacement_restraints, rotation_restraints
            )))
        }
    }

    /// Build the global stiffness matrix
    fn build_global_stiffness(&self) -> Mat {
        let n_dofs = self.num_dofs();
        let mut k_global = Mat::zeros(n_dofs, n_dofs);

        for (i, element) in self.elements.iter().enumerate() {
            let k_local = element.local_stiffness();
            let base = 2 * i;
            for a in 0..4 {
                for b in 0..4 {
                    k_global[(base + a, base + b)] += k_local[(a, b)];
                }
            }
        }

        k_global
    }

    /// Build the nodal load vector (point loads + consistent distributed loads)
    fn build_load_vector(&self) -> FEVec {
        let mut p_global = FEVec::zeros(self.num_dofs());
        let tolerance = self.node_tolerance();

        for (i, element) in self.elements.iter().enumerate() {
            let length = element.length();
            let q = self.loads.distributed_on(element.x_begin, element.x_end);
            let fer = math::equivalent_loads_linear(q.eval(0.0), q.eval(length), length);
            for a in 0..4 {
                p_global[2 * i + a] += fer[a];
            }
        }

        for (i, node) in self.nodes.iter().enumerate() {
            p_global[2 * i] += self.loads.point_force_at(node.x, tolerance);
            p_global[2 * i + 1] += self.loads.point_moment_at(node.x, tolerance);
        }

        p_global
    }

    /// Solve for nodal displacements, reactions and diagrams
    pub fn solve(&self, options: &AnalysisOptions) -> BeamResult<BeamSolution> {
        if options.check_stability {
            self.check_stability()?;
        }

        let n_dofs = self.num_dofs();
        let k_global = self.build_global_stiffness();
        let p_global = self.build_load_vector();

        // Identify free and restrained DOFs
        let mut free_dofs: Vec<usize> = Vec::new();
        let mut enforced: Vec<(usize, f64)> = Vec::new();
        for (i, node) in self.nodes.iter().enumerate() {
            for (dof, constraint) in node.support.constraints().iter().enumerate() {
                match constraint {
                    Some(value) => enforced.push((2 * i + dof, *value)),
                    None => free_dofs.push(2 * i + dof),
                }
            }
        }

        let mut d_full = FEVec::zeros(n_dofs);
        for &(di, val) in &enforced {
            d_full[di] = val;
        }

        if !free_dofs.is_empty() {
            // Partition stiffness matrix and load vector
            let n_free = free_dofs.len();
            let mut k11 = Mat::zeros(n_free, n_free);
            let mut p1 = FEVec::zeros(n_free);

            for (i, &di) in free_dofs.iter().enumerate() {
                p1[i] = p_global[di];
                for (j, &dj) in free_dofs.iter().enumerate() {
                    k11[(i, j)] = k_global[(di, dj)];
                }
                // Account for enforced displacements
                for &(dj, val) in &enforced {
                    p1[i] -= k_global[(di, dj)] * val;
                }
            }

            let d1 = math::solve_linear_system(&k11, &p1).ok_or_else(|| {
                BeamError::StructuralInstability(
                    "reduced stiffness matrix is singular".to_string(),
                )
            })?;

            for (i, &di) in free_dofs.iter().enumerate() {
                d_full[di] = d1[i];
            }
        }

        // R = K·U - F, kept only where the DOF is prescribed
        let residual = &k_global * &d_full - &p_global;
        let mut reactions = FEVec::zeros(n_dofs);
        for &(di, _) in &enforced {
            reactions[di] = residual[di];
        }

        let nodes: Vec<NodeResult> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| {
                NodeResult::from_dofs(
                    node.x,
                    [d_full[2 * i], d_full[2 * i + 1]],
                    [reactions[2 * i], reactions[2 * i + 1]],
                )
            })
            .collect();

        if options.log {
            log::info!(
                "Solved {} DOFs ({} free) over {} elements",
                n_dofs,
                free_dofs.len(),
                self.elements.len()
            );
        }

        let (diagrams, mut warnings) = Diagrams::build(
            &self.elements,
            &self.loads,
            &nodes,
            self.node_tolerance(),
            options.tolerance,
        );

        if options.check_statics {
            warnings.extend(self.check_equilibrium(&nodes, options.tolerance));
        }

        Ok(BeamSolution {
            nodes,
            diagrams,
            warnings,
        })
    }

    /// Compare the applied loads against the reactions
    fn check_equilibrium(&self, nodes: &[NodeResult], tolerance: f64) -> Vec<ToleranceWarning> {
        let x0 = self.x_begin();
        let mut warnings = Vec::new();

        let force_residual = self.loads.total_vertical() + nodes.iter().map(|n| n.reaction_force).sum::<f64>();
        let force_scale = self.loads.iter().map(|l| l.resultant().abs()).sum::<f64>()
            + nodes.iter().map(|n| n.reaction_force.abs()).sum::<f64>();

        let moment_residual = self.loads.moment_about(x0)
            + nodes
                .iter()
                .map(|n| n.reaction_force * (n.x - x0) + n.reaction_moment)
                .sum::<f64>();
        let moment_scale = force_scale * self.length()
            + self.loads.iter().map(|l| l.moment_about(x0).abs()).sum::<f64>()
            + nodes.iter().map(|n| n.reaction_moment.abs()).sum::<f64>();

        if force_residual.abs() > tolerance * force_scale.max(f64::MIN_POSITIVE) {
            warnings.push(ToleranceWarning::new(
                "vertical equilibrium",
                None,
                force_residual.abs(),
                tolerance * force_scale,
            ));
        }
        if moment_residual.abs() > tolerance * moment_scale.max(f64::MIN_POSITIVE) {
            warnings.push(ToleranceWarning::new(
                "moment equilibrium",
                None,
                moment_residual.abs(),
                tolerance * moment_scale,
            ));
        }
        warnings
    }

    /// Get analysis summary
    pub fn summary(&self, solution: &BeamSolution) -> AnalysisSummary {
        solution.summary(self.free_dofs())
    }
}
