//! JSON problem description
//!
//! ```json
//! {
//!   "nodes": [{"x": 0, "support": {"type": "Simple"}}, {"x": 400, "support": {"type": "Simple"}}],
//!   "elements": [{"x_begin": 0, "x_end": 400, "section": {"type": "Rectangle", "width": 20, "height": 50}}],
//!   "loads": [{"type": "PointForce", "x": 200, "force": -20}],
//!   "concrete_class": {"fck": 30, "cost_per_m3": 353.3}
//! }
//! ```
//!
//! With `concrete_class` set the problem designs that one beam; without it
//! the problem searches `space` (or the whole catalog).

use serde::{Deserialize, Serialize};

use crate::concrete::{AvailableMaterials, CodeRules, ConcreteBeam, ConcreteClass, DesignParameters, DesignReport};
use crate::elements::{BeamElement, Node};
use crate::error::{BeamError, BeamResult};
use crate::loads::LoadSet;
use crate::model::Beam;
use crate::search::{DesignSearch, DesignSpace, SearchOptions, SearchOutcome};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Problem {
    pub nodes: Vec<Node>,
    pub elements: Vec<BeamElement>,
    #[serde(default)]
    pub loads: LoadSet,
    #[serde(default)]
    pub concrete_class: Option<ConcreteClass>,
    #[serde(default)]
    pub materials: AvailableMaterials,
    #[serde(default)]
    pub parameters: DesignParameters,
    #[serde(default)]
    pub rules: CodeRules,
    #[serde(default)]
    pub space: Option<DesignSpace>,
    #[serde(default)]
    pub search: SearchOptions,
}

/// Result of [`Problem::solve`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProblemOutcome {
    Design(DesignReport),
    Search(SearchOutcome),
}

impl Problem {
    pub fn from_json(json: &str) -> BeamResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> BeamResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Structural model; loads are re-validated since JSON bypasses
    /// [`LoadSet::new`]
    pub fn beam(&self) -> BeamResult<Beam> {
        let loads = LoadSet::new(self.loads.loads().to_vec())?;
        Beam::new(self.nodes.clone(), self.elements.clone(), loads)
    }

    /// The single beam of `concrete_class`
    pub fn concrete_beam(&self) -> BeamResult<ConcreteBeam> {
        let class = self.concrete_class.ok_or_else(|| {
            BeamError::InvalidInput("a single design needs a concrete_class".to_string())
        })?;
        Ok(
            ConcreteBeam::with_rules(&self.beam()?, class, self.parameters.clone(), self.rules.clone())?
                .with_long_bars(self.materials.long_bars.clone())
                .with_stirrups(self.materials.stirrups.clone()),
        )
    }

    pub fn design_search(&self) -> BeamResult<DesignSearch> {
        let space = self
            .space
            .clone()
            .unwrap_or_else(|| DesignSpace::from_materials(&self.materials));
        Ok(DesignSearch::new(self.beam()?, self.materials.clone())
            .with_parameters(self.parameters.clone())
            .with_rules(self.rules.clone())
            .with_space(space)
            .with_options(self.search.clone()))
    }

    pub fn solve(&self) -> BeamResult<ProblemOutcome> {
        match self.concrete_class {
            Some(_) => Ok(ProblemOutcome::Design(self.concrete_beam()?.report()?)),
            None => Ok(ProblemOutcome::Search(self.design_search()?.run()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::Support;

    const SIMPLE: &str = r#"{
        "nodes": [
            {"x": 0, "support": {"type": "Simple"}},
            {"x": 400, "support": {"type": "Simple"}}
        ],
        "elements": [
            {"x_begin": 0, "x_end": 400, "section": {"type": "Rectangle", "width": 20, "height": 50}}
        ],
        "loads": [{"type": "PointForce", "x": 200, "force": -20}],
        "concrete_class": {"fck": 30, "cost_per_m3": 353.3},
        "parameters": {"aggressiveness": 2}
    }"#;

    #[test]
    fn test_parse_problem() {
        let problem = Problem::from_json(SIMPLE).unwrap();
        assert_eq!(problem.nodes[0].support, Support::Simple);
        assert_eq!(problem.loads.len(), 1);
        assert_eq!(problem.parameters.design_factor, 1.4);
        assert_eq!(problem.materials.long_bars.bars.len(), 8);
        let beam = problem.beam().unwrap();
        assert_eq!(beam.nodes().len(), 3);
    }

    #[test]
    fn test_single_design() {
        let problem = Problem::from_json(SIMPLE).unwrap();
        match problem.solve().unwrap() {
            ProblemOutcome::Design(report) => {
                assert!(report.feasible);
                assert!(report.total_cost > 0.0);
            }
            ProblemOutcome::Search(_) => panic!("expected a single design"),
        }
    }

    #[test]
    fn test_missing_class_for_single_design() {
        let mut problem = Problem::from_json(SIMPLE).unwrap();
        problem.concrete_class = None;
        assert!(matches!(problem.concrete_beam(), Err(BeamError::InvalidInput(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            Problem::from_json("{\"nodes\": 3}"),
            Err(BeamError::SerializationError(_))
        ));
    }

    #[test]
    fn test_malformed_catalog_is_rejected() {
        let json = SIMPLE.replace(
            "\"parameters\"",
            r#""materials": {"stirrups": {"bars": [{"diameter_mm": 6.3, "area_cm2": 0.312, "cost_per_m": 2.3}], "fywk": 50, "spacing_increment": 0}},
        "parameters""#,
        );
        assert!(matches!(Problem::from_json(&json), Err(BeamError::SerializationError(_))));
    }
}
