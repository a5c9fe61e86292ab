//! Reinforced concrete beam: structural model + design parameters

use serde::{Deserialize, Serialize};

use super::catalog::{ConcreteClass, SteelBarCatalog, StirrupCatalog};
use super::cost::CostBreakdown;
use super::long_steel::{self, LongSteelBar};
use super::material::{Aggregate, Aggressiveness, Concrete};
use super::rules::CodeRules;
use super::transv_steel::{self, TransvSteelSegment};
use crate::analysis::AnalysisOptions;
use crate::diagram::{DiagramKind, Diagrams};
use crate::elements::{BeamElement, Section};
use crate::error::{BeamError, BeamResult, Face, ToleranceWarning};
use crate::model::Beam;
use crate::results::BeamSolution;

/// Design settings of a [`ConcreteBeam`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignParameters {
    pub aggressiveness: Aggressiveness,
    pub aggregate: Aggregate,
    /// Overrides the cover of the aggressiveness class (cm)
    pub cover: Option<f64>,
    /// Maximum coarse aggregate size (cm)
    pub aggregate_size: f64,
    /// Load factor applied to the internal forces for the ultimate limit state
    pub design_factor: f64,
    /// Stirrup inclination α (degrees)
    pub stirrup_angle: f64,
    /// Compression strut inclination θ (degrees)
    pub strut_angle: f64,
    /// Vertical legs per stirrup
    pub stirrup_legs: usize,
    /// Effective depth as a fraction of the section height
    pub effective_depth_ratio: f64,
    /// Explicit effective depth of the bottom layer (cm)
    pub bottom_effective_depth: Option<f64>,
    /// Explicit effective depth of the top layer (cm)
    pub top_effective_depth: Option<f64>,
    /// Allowed displacement as a fraction of each element length
    pub max_displacement_ratio: f64,
    /// Uniform sampling density of the design diagrams
    pub division: usize,
    /// Bars dropped per stagger level
    pub removal_step: usize,
    /// Maximum number of stagger levels per region
    pub max_removals: usize,
    /// Fewest bars in any longitudinal group
    pub min_bars: usize,
    pub check_serviceability: bool,
    pub design_transverse: bool,
    pub design_longitudinal: bool,
}

impl Default for DesignParameters {
    fn default() -> Self {
        Self {
            aggressiveness: Aggressiveness::default(),
            aggregate: Aggregate::default(),
            cover: None,
            aggregate_size: 1.5,
            design_factor: 1.4,
            stirrup_angle: 90.0,
            strut_angle: 45.0,
            stirrup_legs: 2,
            effective_depth_ratio: 0.8,
            bottom_effective_depth: None,
            top_effective_depth: None,
            max_displacement_ratio: 1.0 / 250.0,
            division: 1000,
            removal_step: 2,
            max_removals: 100,
            min_bars: 2,
            check_serviceability: true,
            design_transverse: true,
            design_longitudinal: true,
        }
    }
}

impl DesignParameters {
    pub fn with_aggressiveness(mut self, aggressiveness: Aggressiveness) -> Self {
        self.aggressiveness = aggressiveness;
        self
    }

    pub fn with_cover(mut self, cover: f64) -> Self {
        self.cover = Some(cover);
        self
    }

    pub fn with_design_factor(mut self, factor: f64) -> Self {
        self.design_factor = factor;
        self
    }

    pub fn with_division(mut self, division: usize) -> Self {
        self.division = division;
        self
    }

    pub fn with_effective_depths(mut self, bottom: f64, top: f64) -> Self {
        self.bottom_effective_depth = Some(bottom);
        self.top_effective_depth = Some(top);
        self
    }

    pub fn with_max_displacement_ratio(mut self, ratio: f64) -> Self {
        self.max_displacement_ratio = ratio;
        self
    }

    /// Skip the serviceability check
    pub fn without_serviceability(mut self) -> Self {
        self.check_serviceability = false;
        self
    }

    fn validate(&self) -> BeamResult<()> {
        let angles_ok = self.stirrup_angle >= 45.0
            && self.stirrup_angle <= 90.0
            && self.strut_angle >= 30.0
            && self.strut_angle <= 45.0;
        if !angles_ok {
            return Err(BeamError::InvalidInput(format!(
                "stirrup angle must be in [45, 90] and strut angle in [30, 45], got {} and {}",
                self.stirrup_angle, self.strut_angle
            )));
        }
        if self.design_factor <= 0.0 || self.division == 0 || self.removal_step == 0 || self.stirrup_legs == 0 {
            return Err(BeamError::InvalidInput(
                "design factor, division, removal step and stirrup legs must be positive".to_string(),
            ));
        }
        if !(self.effective_depth_ratio > 0.0 && self.effective_depth_ratio <= 1.0) {
            return Err(BeamError::InvalidInput(format!(
                "effective depth ratio must be in (0, 1], got {}",
                self.effective_depth_ratio
            )));
        }
        if self.max_displacement_ratio <= 0.0 || self.aggregate_size < 0.0 {
            return Err(BeamError::InvalidInput(
                "displacement ratio must be positive and aggregate size non-negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Outcome of designing one [`ConcreteBeam`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DesignReport {
    pub concrete_class: ConcreteClass,
    /// Section of each user element
    pub sections: Vec<Section>,
    /// Longitudinal bar groups, ordered by start position
    pub long_bars: Vec<LongSteelBar>,
    /// Stirrup segments, ordered along the span
    pub transverse: Vec<TransvSteelSegment>,
    pub cost: CostBreakdown,
    pub total_cost: f64,
    /// Largest service displacement magnitude
    pub max_displacement: f64,
    /// Allowed crack width for the aggressiveness class (cm)
    pub crack_width: f64,
    pub feasible: bool,
    /// Why the design is infeasible
    pub reason: Option<String>,
    pub warnings: Vec<ToleranceWarning>,
}

impl DesignReport {
    fn infeasible(beam: &ConcreteBeam, error: &BeamError) -> Self {
        Self {
            concrete_class: beam.concrete_class,
            sections: beam.sections(),
            long_bars: Vec::new(),
            transverse: Vec::new(),
            cost: CostBreakdown::default(),
            total_cost: 0.0,
            max_displacement: 0.0,
            crack_width: beam.concrete.crack_width,
            feasible: false,
            reason: Some(error.to_string()),
            warnings: Vec::new(),
        }
    }

    /// Longitudinal bars on one face
    pub fn bars_on(&self, face: Face) -> impl Iterator<Item = &LongSteelBar> {
        self.long_bars.iter().filter(move |bar| bar.face == face)
    }

    pub fn to_json(&self) -> BeamResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A [`Beam`] made of one concrete class, with the catalogs and settings
/// its reinforcement is designed from.
///
/// The structural model is the beam itself with the concrete's secant
/// modulus; nothing else is duplicated.
#[derive(Debug, Clone)]
pub struct ConcreteBeam {
    beam: Beam,
    concrete: Concrete,
    concrete_class: ConcreteClass,
    long_bars: SteelBarCatalog,
    stirrups: StirrupCatalog,
    params: DesignParameters,
    rules: CodeRules,
}

impl ConcreteBeam {
    /// Concrete beam with the default catalogs and NBR 6118 coefficients
    pub fn new(beam: &Beam, concrete_class: ConcreteClass, params: DesignParameters) -> BeamResult<Self> {
        Self::with_rules(beam, concrete_class, params, CodeRules::default())
    }

    pub fn with_rules(
        beam: &Beam,
        concrete_class: ConcreteClass,
        params: DesignParameters,
        rules: CodeRules,
    ) -> BeamResult<Self> {
        params.validate()?;
        let concrete = Concrete::new(concrete_class.fck, params.aggressiveness, params.aggregate, &rules)?;
        let concrete_beam = Self {
            beam: beam.with_material(concrete.material()),
            concrete,
            concrete_class,
            long_bars: SteelBarCatalog::default(),
            stirrups: StirrupCatalog::default(),
            params,
            rules,
        };
        concrete_beam.check_geometry()?;
        Ok(concrete_beam)
    }

    pub fn with_long_bars(mut self, long_bars: SteelBarCatalog) -> Self {
        self.long_bars = long_bars;
        self
    }

    pub fn with_stirrups(mut self, stirrups: StirrupCatalog) -> Self {
        self.stirrups = stirrups;
        self
    }

    /// Cover, depths and widths must leave room for reinforcement
    fn check_geometry(&self) -> BeamResult<()> {
        let cover = self.cover();
        for element in self.beam.user_elements() {
            let section = &element.section;
            let h = section.height();
            for face in [Face::Bottom, Face::Top] {
                let d = self.effective_depth(section, face);
                if !(d > 0.0 && d <= h) {
                    return Err(BeamError::InvalidGeometry(format!(
                        "effective depth {} of the {} layer does not fit a section of height {}",
                        d, face, h
                    )));
                }
            }
            let narrowest = section.bottom_width().min(section.top_width());
            if 2.0 * cover >= narrowest || 2.0 * cover >= h {
                return Err(BeamError::InvalidGeometry(format!(
                    "cover {} leaves no room in the section of element [{}, {}]",
                    cover, element.x_begin, element.x_end
                )));
            }
        }
        Ok(())
    }

    // ========================
    // Accessors
    // ========================

    pub fn beam(&self) -> &Beam {
        &self.beam
    }

    pub fn concrete(&self) -> &Concrete {
        &self.concrete
    }

    pub fn concrete_class(&self) -> ConcreteClass {
        self.concrete_class
    }

    pub fn long_bars(&self) -> &SteelBarCatalog {
        &self.long_bars
    }

    pub fn stirrups(&self) -> &StirrupCatalog {
        &self.stirrups
    }

    pub fn params(&self) -> &DesignParameters {
        &self.params
    }

    pub fn rules(&self) -> &CodeRules {
        &self.rules
    }

    pub fn sections(&self) -> Vec<Section> {
        self.beam.user_elements().iter().map(|e| e.section.clone()).collect()
    }

    pub fn cover(&self) -> f64 {
        self.params.cover.unwrap_or(self.concrete.cover)
    }

    /// Distance from the compressed fibre to the layer on `face`
    pub fn effective_depth(&self, section: &Section, face: Face) -> f64 {
        let explicit = match face {
            Face::Bottom => self.params.bottom_effective_depth,
            Face::Top => self.params.top_effective_depth,
            Face::Transverse => None,
        };
        explicit.unwrap_or(self.params.effective_depth_ratio * section.height())
    }

    /// Depth used by the shear checks (the smaller layer depth)
    pub fn shear_depth(&self, section: &Section) -> f64 {
        self.effective_depth(section, Face::Bottom)
            .min(self.effective_depth(section, Face::Top))
    }

    /// Depth used by the decalage shift (the larger layer depth)
    pub fn decalage_depth(&self, section: &Section) -> f64 {
        self.effective_depth(section, Face::Bottom)
            .max(self.effective_depth(section, Face::Top))
    }

    pub(crate) fn stirrup_angle(&self) -> f64 {
        self.params.stirrup_angle.to_radians()
    }

    pub(crate) fn strut_angle(&self) -> f64 {
        self.params.strut_angle.to_radians()
    }

    pub(crate) fn element_at(&self, x: f64) -> BeamResult<&BeamElement> {
        self.beam
            .user_element_at(x)
            .ok_or_else(|| BeamError::InvalidGeometry(format!("no element covers x={}", x)))
    }

    /// Uniform design grid plus every refined node position
    pub(crate) fn sample_positions(&self) -> Vec<f64> {
        let (x0, x1) = (self.beam.x_begin(), self.beam.x_end());
        let n = self.params.division;
        let mut xs: Vec<f64> = (0..=n).map(|i| x0 + (x1 - x0) * i as f64 / n as f64).collect();
        xs.extend(self.beam.nodes().iter().map(|node| node.x));
        xs.sort_by(f64::total_cmp);
        let tolerance = 1e-9 * (x1 - x0);
        xs.dedup_by(|a, b| (*a - *b).abs() <= tolerance);
        xs
    }

    /// Factored shear magnitude at `x`, worst of both one-sided limits
    pub(crate) fn design_shear(&self, diagrams: &Diagrams, x: f64) -> f64 {
        let left = diagrams.left(DiagramKind::Shear, x).abs();
        let right = diagrams.right(DiagramKind::Shear, x).abs();
        self.params.design_factor * left.max(right)
    }

    /// Shear strength figures of the section at `x`: (V_c0, V_Rd2)
    pub(crate) fn shear_capacity(&self, section: &Section) -> (f64, f64) {
        let bw = section.web_width();
        let d = self.shear_depth(section);
        let vc0 = self.rules.concrete_shear_base(self.concrete.fctd, bw, d);
        let vrd2 = self.rules.strut_capacity(
            self.concrete.fck,
            self.concrete.fcd,
            bw,
            d,
            self.stirrup_angle(),
            self.strut_angle(),
        );
        (vc0, vrd2)
    }

    /// Compression strut capacity V_Rd2 of the section at `x`
    pub fn strut_capacity_at(&self, x: f64) -> BeamResult<f64> {
        let (_, vrd2) = self.shear_capacity(&self.element_at(x)?.section);
        Ok(vrd2)
    }

    // ========================
    // Limit states
    // ========================

    /// Structural solve under the characteristic loads
    pub fn analyze(&self) -> BeamResult<BeamSolution> {
        self.beam.solve(&AnalysisOptions::default())
    }

    /// Compare the largest displacement on each user element against its
    /// allowed value; returns the largest displacement magnitude
    pub fn check_serviceability(&self, solution: &BeamSolution) -> BeamResult<f64> {
        let mut worst: f64 = 0.0;
        for element in self.beam.user_elements() {
            let displacement =
                solution
                    .diagrams
                    .max_abs_between(DiagramKind::Displacement, element.x_begin, element.x_end);
            let limit = element.length() * self.params.max_displacement_ratio;
            if displacement > limit {
                return Err(BeamError::ServiceabilityLimitExceeded {
                    x_begin: element.x_begin,
                    x_end: element.x_end,
                    displacement,
                    limit,
                });
            }
            worst = worst.max(displacement);
        }
        Ok(worst)
    }

    /// Design the reinforcement; any failed check is returned as the error
    pub fn design(&self) -> BeamResult<DesignReport> {
        let solution = self.analyze()?;
        let max_displacement = if self.params.check_serviceability {
            self.check_serviceability(&solution)?
        } else {
            solution.diagrams.max_abs_between(
                DiagramKind::Displacement,
                self.beam.x_begin(),
                self.beam.x_end(),
            )
        };

        let transverse = if self.params.design_transverse {
            transv_steel::solve(self, &solution.diagrams)?
        } else {
            Vec::new()
        };
        let stirrup_diameter = transverse
            .iter()
            .map(|segment| segment.diameter)
            .fold(0.0, f64::max);

        let long_bars = if self.params.design_longitudinal {
            long_steel::solve(self, &solution.diagrams, stirrup_diameter)?
        } else {
            Vec::new()
        };

        let cost = CostBreakdown::new(self, &long_bars, &transverse);
        log::debug!(
            "{} designed: {} bar groups, {} stirrup segments, cost {:.2}",
            self.concrete_class,
            long_bars.len(),
            transverse.len(),
            cost.total
        );

        Ok(DesignReport {
            concrete_class: self.concrete_class,
            sections: self.sections(),
            long_bars,
            transverse,
            total_cost: cost.total,
            cost,
            max_displacement,
            crack_width: self.concrete.crack_width,
            feasible: true,
            reason: None,
            warnings: solution.warnings,
        })
    }

    /// Like [`design`](Self::design), but a failed limit state becomes an
    /// infeasible report instead of an error
    pub fn report(&self) -> BeamResult<DesignReport> {
        match self.design() {
            Err(err) if err.is_candidate_local() => Ok(DesignReport::infeasible(self, &err)),
            other => other,
        }
    }
}
