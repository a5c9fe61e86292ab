//! Concrete properties derived from the characteristic strength

use serde::{Deserialize, Serialize};

use super::CodeRules;
use crate::elements::Material;
use crate::error::{BeamError, BeamResult};

/// Coarse aggregate rock type, sets the modulus factor αe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    Basalt,
    Diabase,
    #[default]
    Granite,
    Gneiss,
    Limestone,
    Sandstone,
}

impl Aggregate {
    pub fn alpha_e(&self) -> f64 {
        match self {
            Aggregate::Basalt | Aggregate::Diabase => 1.2,
            Aggregate::Granite | Aggregate::Gneiss => 1.0,
            Aggregate::Limestone => 0.9,
            Aggregate::Sandstone => 0.7,
        }
    }
}

/// Environmental aggressiveness class (1 = weak ... 4 = very strong)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Aggressiveness {
    Weak,
    #[default]
    Moderate,
    Strong,
    VeryStrong,
}

impl Aggressiveness {
    /// Index into the per-class tables of [`CodeRules`]
    pub fn index(&self) -> usize {
        match self {
            Aggressiveness::Weak => 0,
            Aggressiveness::Moderate => 1,
            Aggressiveness::Strong => 2,
            Aggressiveness::VeryStrong => 3,
        }
    }
}

impl TryFrom<u8> for Aggressiveness {
    type Error = BeamError;

    fn try_from(class: u8) -> BeamResult<Self> {
        match class {
            1 => Ok(Aggressiveness::Weak),
            2 => Ok(Aggressiveness::Moderate),
            3 => Ok(Aggressiveness::Strong),
            4 => Ok(Aggressiveness::VeryStrong),
            _ => Err(BeamError::InvalidInput(format!(
                "aggressiveness class must be between 1 and 4, got {}",
                class
            ))),
        }
    }
}

impl From<Aggressiveness> for u8 {
    fn from(class: Aggressiveness) -> u8 {
        class.index() as u8 + 1
    }
}

/// Concrete with every derived property in kN and cm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Concrete {
    /// Characteristic compressive strength (kN/cm²)
    pub fck: f64,
    /// Initial tangent modulus (kN/cm²)
    pub e_ci: f64,
    /// Secant modulus (kN/cm²), used for the structural analysis
    pub e_cs: f64,
    /// Mean tensile strength (kN/cm²)
    pub fctm: f64,
    pub fctk_inf: f64,
    pub fctk_sup: f64,
    /// Design compressive strength (kN/cm²)
    pub fcd: f64,
    /// Design tensile strength (kN/cm²)
    pub fctd: f64,
    /// Nominal cover (cm)
    pub cover: f64,
    /// Characteristic crack width limit (cm)
    pub crack_width: f64,
    pub nu: f64,
    pub alpha: f64,
    pub aggressiveness: Aggressiveness,
    pub aggregate: Aggregate,
}

impl Concrete {
    /// Derive the properties of a concrete of strength `fck_mpa`
    pub fn new(
        fck_mpa: f64,
        aggressiveness: Aggressiveness,
        aggregate: Aggregate,
        rules: &CodeRules,
    ) -> BeamResult<Self> {
        if !(rules.fck_min..=rules.fck_max).contains(&fck_mpa) {
            return Err(BeamError::MaterialOutOfRange(format!(
                "fck must be between {} MPa and {} MPa, got {}",
                rules.fck_min, rules.fck_max, fck_mpa
            )));
        }

        let fck = fck_mpa;
        let alpha_e = aggregate.alpha_e();
        let e_ci = if fck <= 50.0 {
            alpha_e * 5600.0 * fck.sqrt()
        } else {
            alpha_e * 21500.0 * (fck / 10.0 + 1.25).powf(1.0 / 3.0)
        };
        let alpha_i = (0.8 + 0.2 * fck / 80.0).min(1.0);
        let e_cs = alpha_i * e_ci;
        let fctm = if fck <= 50.0 {
            0.3 * fck.powf(2.0 / 3.0)
        } else {
            2.12 * (1.0 + 0.11 * fck).log10()
        };
        let fctk_inf = 0.7 * fctm;
        let fctk_sup = 1.3 * fctm;

        // MPa → kN/cm²
        let to_kn_cm2 = |mpa: f64| mpa / 10.0;

        Ok(Self {
            fck: to_kn_cm2(fck),
            e_ci: to_kn_cm2(e_ci),
            e_cs: to_kn_cm2(e_cs),
            fctm: to_kn_cm2(fctm),
            fctk_inf: to_kn_cm2(fctk_inf),
            fctk_sup: to_kn_cm2(fctk_sup),
            fcd: to_kn_cm2(fck / rules.gamma_c),
            fctd: to_kn_cm2(fctk_inf / rules.gamma_c),
            cover: rules.cover[aggressiveness.index()],
            crack_width: rules.crack_width[aggressiveness.index()],
            nu: 0.2,
            alpha: 1e-5,
            aggressiveness,
            aggregate,
        })
    }

    /// Characteristic strength in MPa
    pub fn fck_mpa(&self) -> f64 {
        self.fck * 10.0
    }

    /// Elastic material for the structural model
    pub fn material(&self) -> Material {
        Material::new(self.e_cs, self.nu, self.alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_c30_granite() {
        let concrete = Concrete::new(30.0, Aggressiveness::Strong, Aggregate::Granite, &CodeRules::default()).unwrap();
        let e_ci = 5600.0 * 30.0_f64.sqrt() / 10.0;
        assert_relative_eq!(concrete.e_ci, e_ci, max_relative = 1e-12);
        assert_relative_eq!(concrete.e_cs, 0.875 * e_ci, max_relative = 1e-12);
        assert_relative_eq!(concrete.fcd, 3.0 / 1.4, max_relative = 1e-12);
        assert_relative_eq!(concrete.fctm, 0.3 * 30.0_f64.powf(2.0 / 3.0) / 10.0, max_relative = 1e-12);
        assert_relative_eq!(concrete.cover, 4.0);
        assert_relative_eq!(concrete.crack_width, 0.03);
    }

    #[test]
    fn test_high_strength_branch() {
        let concrete = Concrete::new(70.0, Aggressiveness::Weak, Aggregate::Basalt, &CodeRules::default()).unwrap();
        let e_ci = 1.2 * 21500.0 * (7.0_f64 + 1.25).powf(1.0 / 3.0) / 10.0;
        assert_relative_eq!(concrete.e_ci, e_ci, max_relative = 1e-12);
        assert_relative_eq!(concrete.e_cs, e_ci, max_relative = 1e-12);
        assert_relative_eq!(concrete.fctm, 2.12 * (1.0_f64 + 7.7).log10() / 10.0, max_relative = 1e-12);
    }

    #[test]
    fn test_out_of_range() {
        let err = Concrete::new(15.0, Aggressiveness::Weak, Aggregate::Granite, &CodeRules::default()).unwrap_err();
        assert!(matches!(err, BeamError::MaterialOutOfRange(_)));
    }

    #[test]
    fn test_aggressiveness_from_class() {
        assert_eq!(Aggressiveness::try_from(4).unwrap(), Aggressiveness::VeryStrong);
        assert!(Aggressiveness::try_from(5).is_err());
        assert_eq!(u8::from(Aggressiveness::Moderate), 2);
    }
}
