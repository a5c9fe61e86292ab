//! Lowest-cost design search over the material catalogs

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::concrete::{AvailableMaterials, CodeRules, ConcreteBeam, ConcreteClass, DesignParameters, DesignReport};
use crate::elements::Section;
use crate::error::{BeamError, BeamResult};
use crate::model::Beam;

/// One point of the design space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Section for every element; `None` keeps the beam's own sections
    pub section: Option<Section>,
    pub concrete_class: ConcreteClass,
    /// Longitudinal diameters (mm) the bar layout may pick from
    pub long_diameters: Vec<f64>,
    /// Stirrup diameters (mm)
    pub transverse_diameters: Vec<f64>,
}

impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(section) = &self.section {
            write!(f, "{}x{} ", section.web_width(), section.height())?;
        }
        write!(
            f,
            "{} long {:?} stirrups {:?}",
            self.concrete_class, self.long_diameters, self.transverse_diameters
        )
    }
}

/// Dimensions of the Cartesian search
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignSpace {
    /// Empty keeps the beam's sections
    pub sections: Vec<Section>,
    pub concrete_classes: Vec<ConcreteClass>,
    pub long_diameter_sets: Vec<Vec<f64>>,
    pub transverse_diameter_sets: Vec<Vec<f64>>,
}

impl DesignSpace {
    /// Every concrete class, each longitudinal and each stirrup diameter on
    /// its own
    pub fn from_materials(materials: &AvailableMaterials) -> Self {
        Self {
            sections: Vec::new(),
            concrete_classes: materials.concrete_classes.clone(),
            long_diameter_sets: materials.long_bars.diameters_mm().into_iter().map(|d| vec![d]).collect(),
            transverse_diameter_sets: materials.stirrups.diameters_mm().into_iter().map(|d| vec![d]).collect(),
        }
    }

    /// Also sweep rectangular sections of every width × height
    pub fn with_rectangles(mut self, widths: &[f64], heights: &[f64]) -> Self {
        self.sections = widths
            .iter()
            .flat_map(|&w| heights.iter().map(move |&h| Section::rectangular(w, h)))
            .collect();
        self
    }

    pub fn with_sections(mut self, sections: Vec<Section>) -> Self {
        self.sections = sections;
        self
    }

    pub fn len(&self) -> usize {
        self.sections.len().max(1)
            * self.concrete_classes.len()
            * self.long_diameter_sets.len()
            * self.transverse_diameter_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Candidates in order: section, concrete class, longitudinal set,
    /// stirrup set (the last varies fastest)
    pub fn candidates(&self) -> impl Iterator<Item = Candidate> + '_ {
        let sections: Vec<Option<&Section>> = if self.sections.is_empty() {
            vec![None]
        } else {
            self.sections.iter().map(Some).collect()
        };
        sections.into_iter().flat_map(move |section| {
            self.concrete_classes.iter().flat_map(move |class| {
                self.long_diameter_sets.iter().flat_map(move |long| {
                    self.transverse_diameter_sets.iter().map(move |transverse| Candidate {
                        section: section.cloned(),
                        concrete_class: *class,
                        long_diameters: long.clone(),
                        transverse_diameters: transverse.clone(),
                    })
                })
            })
        })
    }
}

/// Termination and ordering options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Stop after this many evaluations without a cheaper design, counted
    /// once a feasible design exists
    pub max_steps_without_improvement: Option<usize>,
    /// Wall-clock limit for the whole search
    pub time_budget: Option<Duration>,
    /// Evaluate smaller sections first
    pub sort_by_area: bool,
}

impl SearchOptions {
    pub fn with_max_steps_without_improvement(mut self, steps: usize) -> Self {
        self.max_steps_without_improvement = Some(steps);
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }

    pub fn sorted_by_area(mut self) -> Self {
        self.sort_by_area = true;
        self
    }
}

/// Outcome of one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub step: usize,
    pub candidate: Candidate,
    /// Total cost when feasible
    pub cost: Option<f64>,
    pub concrete_cost: Option<f64>,
    pub longitudinal_cost: Option<f64>,
    pub transverse_cost: Option<f64>,
    /// Error code and message when infeasible
    pub error_code: Option<String>,
    pub error: Option<String>,
}

impl EvaluationRecord {
    pub fn is_feasible(&self) -> bool {
        self.cost.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StopReason {
    /// Every candidate was evaluated
    Exhausted,
    NoImprovement,
    TimeBudget,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub best: DesignReport,
    pub best_candidate: Candidate,
    pub evaluations: Vec<EvaluationRecord>,
    pub stop_reason: StopReason,
}

impl SearchOutcome {
    pub fn feasible_count(&self) -> usize {
        self.evaluations.iter().filter(|r| r.is_feasible()).count()
    }

    pub fn to_json(&self) -> BeamResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Search for the cheapest feasible design of a beam geometry
#[derive(Debug, Clone)]
pub struct DesignSearch {
    beam: Beam,
    materials: AvailableMaterials,
    params: DesignParameters,
    rules: CodeRules,
    space: DesignSpace,
    options: SearchOptions,
}

impl DesignSearch {
    /// Search the whole catalog with default parameters
    pub fn new(beam: Beam, materials: AvailableMaterials) -> Self {
        let space = DesignSpace::from_materials(&materials);
        Self {
            beam,
            materials,
            params: DesignParameters::default(),
            rules: CodeRules::default(),
            space,
            options: SearchOptions::default(),
        }
    }

    pub fn with_parameters(mut self, params: DesignParameters) -> Self {
        self.params = params;
        self
    }

    pub fn with_rules(mut self, rules: CodeRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_space(mut self, space: DesignSpace) -> Self {
        self.space = space;
        self
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn space(&self) -> &DesignSpace {
        &self.space
    }

    /// Design one candidate from scratch
    pub fn evaluate(&self, candidate: &Candidate) -> BeamResult<DesignReport> {
        let beam = match &candidate.section {
            Some(section) => self.beam.with_section(section.clone()),
            None => self.beam.clone(),
        };
        let long_bars = self.materials.long_bars.subset(&candidate.long_diameters)?;
        let stirrups = self.materials.stirrups.subset(&candidate.transverse_diameters)?;
        let concrete_beam =
            ConcreteBeam::with_rules(&beam, candidate.concrete_class, self.params.clone(), self.rules.clone())
                .map_err(|err| match (&candidate.section, err) {
                    (Some(section), BeamError::InvalidGeometry(reason)) => BeamError::SectionRejected {
                        section: format!("{:?}", section),
                        reason,
                    },
                    (_, err) => err,
                })?;
        concrete_beam.with_long_bars(long_bars).with_stirrups(stirrups).design()
    }

    /// Evaluate candidates in order, keeping the cheapest feasible one
    pub fn run(&self) -> BeamResult<SearchOutcome> {
        self.beam.check_stability()?;

        let mut space = self.space.clone();
        if self.options.sort_by_area {
            space.sections.sort_by(|a, b| a.area().total_cmp(&b.area()));
        }
        let total = space.len();
        log::info!("Searching {} candidate designs", total);

        let start = Instant::now();
        let mut evaluations = Vec::new();
        let mut best: Option<(DesignReport, Candidate)> = None;
        let mut steps_without_improvement = 0;
        let mut stop_reason = StopReason::Exhausted;

        for (step, candidate) in space.candidates().enumerate() {
            if let Some(budget) = self.options.time_budget {
                if start.elapsed() >= budget {
                    stop_reason = StopReason::TimeBudget;
                    break;
                }
            }

            let mut record = EvaluationRecord {
                step,
                candidate: candidate.clone(),
                cost: None,
                concrete_cost: None,
                longitudinal_cost: None,
                transverse_cost: None,
                error_code: None,
                error: None,
            };

            let improved = match self.evaluate(&candidate) {
                Ok(report) => {
                    record.cost = Some(report.total_cost);
                    record.concrete_cost = Some(report.cost.concrete);
                    record.longitudinal_cost = Some(report.cost.longitudinal);
                    record.transverse_cost = Some(report.cost.transverse);
                    log::debug!("[{}/{}] {}: cost {:.2}", step + 1, total, candidate, report.total_cost);

                    let cheaper = best
                        .as_ref()
                        .map_or(true, |(current, _)| report.total_cost < current.total_cost);
                    if cheaper {
                        log::info!("New best design {} with cost {:.2}", candidate, report.total_cost);
                        best = Some((report, candidate));
                    }
                    cheaper
                }
                Err(err) if err.is_candidate_local() => {
                    log::debug!("[{}/{}] {}: {}", step + 1, total, candidate, err);
                    record.error_code = Some(err.code().to_string());
                    record.error = Some(err.to_string());
                    false
                }
                Err(err) => return Err(err),
            };
            evaluations.push(record);

            if improved {
                steps_without_improvement = 0;
            } else if best.is_some() {
                steps_without_improvement += 1;
                if let Some(limit) = self.options.max_steps_without_improvement {
                    if steps_without_improvement >= limit {
                        stop_reason = StopReason::NoImprovement;
                        break;
                    }
                }
            }
        }

        let evaluated = evaluations.len();
        match best {
            Some((report, candidate)) => {
                log::info!(
                    "Search finished ({:?}) after {} of {} candidates: best cost {:.2}",
                    stop_reason,
                    evaluated,
                    total,
                    report.total_cost
                );
                Ok(SearchOutcome {
                    best: report,
                    best_candidate: candidate,
                    evaluations,
                    stop_reason,
                })
            }
            None => {
                log::info!("Search finished without a feasible design after {} candidates", evaluated);
                Err(BeamError::CatalogExhausted { evaluated })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Material, Node};
    use crate::loads::{Load, LoadSet};

    fn beam() -> Beam {
        let loads = LoadSet::new(vec![Load::uniform(-0.2, 0.0, 400.0)]).unwrap();
        Beam::from_nodes(
            vec![Node::simple(0.0), Node::simple(400.0)],
            Material::default(),
            Section::rectangular(20.0, 50.0),
            loads,
        )
        .unwrap()
    }

    #[test]
    fn test_space_size_and_order() {
        let materials = AvailableMaterials::default();
        let space = DesignSpace::from_materials(&materials);
        assert_eq!(space.len(), 4 * 8 * 4);
        let candidates: Vec<Candidate> = space.candidates().collect();
        assert_eq!(candidates.len(), space.len());
        assert_eq!(candidates[0].transverse_diameters, vec![6.3]);
        assert_eq!(candidates[1].transverse_diameters, vec![8.0]);
        assert_eq!(candidates[0].concrete_class.fck, 25.0);

        let space = space.with_rectangles(&[15.0, 20.0], &[40.0, 50.0, 60.0]);
        assert_eq!(space.len(), 6 * 4 * 8 * 4);
    }

    #[test]
    fn test_finds_feasible_design() {
        let materials = AvailableMaterials::default();
        let space = DesignSpace {
            sections: Vec::new(),
            concrete_classes: vec![ConcreteClass::new(25.0, 331.65)],
            long_diameter_sets: vec![vec![10.0], vec![12.5]],
            transverse_diameter_sets: vec![vec![6.3]],
        };
        let outcome = DesignSearch::new(beam(), materials).with_space(space).run().unwrap();
        assert_eq!(outcome.stop_reason, StopReason::Exhausted);
        assert_eq!(outcome.evaluations.len(), 2);
        assert!(outcome.best.feasible);
        let cheapest = outcome
            .evaluations
            .iter()
            .filter_map(|r| r.cost)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(outcome.best.total_cost, cheapest);
    }

    #[test]
    fn test_catalog_exhausted() {
        // strut fails for every candidate
        let loads = LoadSet::new(vec![Load::uniform(-20.0, 0.0, 400.0)]).unwrap();
        let heavy = beam().with_loads(loads).unwrap();
        let params = DesignParameters::default().without_serviceability();
        let space = DesignSpace {
            sections: Vec::new(),
            concrete_classes: vec![ConcreteClass::new(25.0, 331.65)],
            long_diameter_sets: vec![vec![10.0]],
            transverse_diameter_sets: vec![vec![6.3]],
        };
        let err = DesignSearch::new(heavy, AvailableMaterials::default())
            .with_parameters(params)
            .with_space(space)
            .run()
            .unwrap_err();
        assert!(matches!(err, BeamError::CatalogExhausted { evaluated: 1 }));
    }

    #[test]
    fn test_unstable_beam_aborts() {
        let unstable = Beam::from_nodes(
            vec![Node::simple(0.0), Node::free(400.0)],
            Material::default(),
            Section::rectangular(20.0, 50.0),
            LoadSet::empty(),
        )
        .unwrap();
        let err = DesignSearch::new(unstable, AvailableMaterials::default()).run().unwrap_err();
        assert!(matches!(err, BeamError::StructuralInstability(_)));
    }

    #[test]
    fn test_early_stop_counts_after_first_feasible() {
        let space = DesignSpace::from_materials(&AvailableMaterials::default());
        let options = SearchOptions::default().with_max_steps_without_improvement(3);
        let outcome = DesignSearch::new(beam(), AvailableMaterials::default())
            .with_space(space.clone())
            .with_options(options)
            .run()
            .unwrap();
        assert!(outcome.evaluations.len() < space.len());
        assert_eq!(outcome.stop_reason, StopReason::NoImprovement);
        let last_three = &outcome.evaluations[outcome.evaluations.len() - 3..];
        let best_cost = outcome.best.total_cost;
        assert!(last_three.iter().all(|r| r.cost.map_or(true, |c| c >= best_cost)));
    }

    #[test]
    fn test_narrow_section_is_skipped() {
        let space = DesignSpace {
            sections: Vec::new(),
            concrete_classes: vec![ConcreteClass::new(25.0, 331.65)],
            long_diameter_sets: vec![vec![12.5]],
            transverse_diameter_sets: vec![vec![6.3]],
        }
        .with_rectangles(&[6.0, 20.0], &[50.0]);
        let outcome = DesignSearch::new(beam(), AvailableMaterials::default())
            .with_space(space)
            .run()
            .unwrap();

        assert_eq!(outcome.evaluations.len(), 2);
        assert_eq!(outcome.evaluations[0].error_code.as_deref(), Some("SECTION_REJECTED"));
        assert!(outcome.evaluations[1].is_feasible());
        assert_eq!(outcome.best_candidate.section, Some(Section::rectangular(20.0, 50.0)));
    }
}
