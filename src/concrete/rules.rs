//! Code coefficients and formulas (NBR 6118 defaults)
//!
//! Every number the design solvers take from the code lives on
//! [`CodeRules`], so another code (or a sensitivity study) is a different
//! value of this struct rather than a different solver.

use serde::{Deserialize, Serialize};

use super::catalog::SurfaceType;
use crate::error::Face;

/// Result of the rectangular stress-block formula
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlexuralArea {
    /// Steel area (cm²)
    pub area: f64,
    /// Relative neutral axis depth x/d
    pub beta_x: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeRules {
    /// Concrete partial factor
    pub gamma_c: f64,
    /// Steel partial factor
    pub gamma_s: f64,
    /// Valid fck range (MPa)
    pub fck_min: f64,
    pub fck_max: f64,
    /// Nominal cover per aggressiveness class (cm)
    pub cover: [f64; 4],
    /// Crack width limit per aggressiveness class (cm)
    pub crack_width: [f64; 4],
    /// Stress-block depth ratio λ
    pub lambda: f64,
    /// Stress-block intensity αc
    pub alpha_c: f64,
    /// Ultimate concrete strain
    pub eps_cu: f64,
    /// Neutral axis ductility limit x/d
    pub beta_x_limit: f64,
    /// Minimum flexural ratio (%) at fck = 20, 25, ..., 90 MPa
    pub rho_min: Vec<f64>,
    /// Maximum total longitudinal ratio
    pub rho_max: f64,
    /// Minimum clear spacing between bars of a layer (cm)
    pub min_bar_spacing: f64,
    /// Minimum clear spacing as a multiple of the aggregate size
    pub aggregate_spacing_factor: f64,
    /// Straight anchorage lower bound, in diameters
    pub anchorage_diameters: f64,
    /// Anchorage reduction with end hooks
    pub hook_factor: f64,
    /// Stirrup hook length, in diameters
    pub stirrup_hook_diameters: f64,
    /// Lower bound on the stirrup hook (cm)
    pub stirrup_hook_min: f64,
    /// Lever arm factor of the truss model (z = factor·d)
    pub lever_arm: f64,
    /// Spacing caps when V_sd ≤ 0.67 V_Rd2 and above (cm)
    pub stirrup_spacing_low: f64,
    pub stirrup_spacing_high: f64,
}

impl Default for CodeRules {
    fn default() -> Self {
        Self {
            gamma_c: 1.4,
            gamma_s: 1.15,
            fck_min: 20.0,
            fck_max: 90.0,
            cover: [2.5, 3.0, 4.0, 5.0],
            crack_width: [0.04, 0.03, 0.03, 0.02],
            lambda: 0.8,
            alpha_c: 0.85,
            eps_cu: 0.0035,
            beta_x_limit: 0.45,
            rho_min: vec![
                0.150, 0.150, 0.150, 0.164, 0.179, 0.194, 0.208, 0.211, 0.219, 0.226, 0.233, 0.239,
                0.245, 0.251, 0.256,
            ],
            rho_max: 0.04,
            min_bar_spacing: 2.0,
            aggregate_spacing_factor: 1.2,
            anchorage_diameters: 25.0,
            hook_factor: 0.7,
            stirrup_hook_diameters: 5.0,
            stirrup_hook_min: 5.0,
            lever_arm: 0.9,
            stirrup_spacing_low: 30.0,
            stirrup_spacing_high: 20.0,
        }
    }
}

impl CodeRules {
    /// Minimum longitudinal ratio for `fck_mpa`, interpolated in the table
    pub fn rho_min(&self, fck_mpa: f64) -> f64 {
        let table = &self.rho_min;
        if table.is_empty() {
            return 0.0;
        }
        let pos = ((fck_mpa - 20.0) / 5.0).clamp(0.0, (table.len() - 1) as f64);
        let i = pos.floor() as usize;
        let value = if i + 1 < table.len() {
            let t = pos - i as f64;
            table[i] + t * (table[i + 1] - table[i])
        } else {
            table[i]
        };
        value / 100.0
    }

    /// Steel area for a moment `m` (≥ 0) on compression width `b`.
    ///
    /// Returns `None` when the stress block cannot carry the moment at all.
    /// The ductility limit is left to the caller through `beta_x`.
    pub fn flexural_area(&self, m: f64, b: f64, d: f64, fcd: f64, fyd: f64, es: f64) -> Option<FlexuralArea> {
        if m <= 0.0 {
            return Some(FlexuralArea { area: 0.0, beta_x: 0.0 });
        }
        let mu = m / (b * d * d * fcd);
        let discriminant = 1.0 - 2.0 * mu / (self.alpha_c * self.lambda);
        if discriminant < 0.0 {
            return None;
        }
        let beta_x = (1.0 - discriminant.sqrt()) / self.lambda;
        let area = m / (self.steel_stress(beta_x, fyd, es) * d * (1.0 - 0.5 * self.lambda * beta_x));
        Some(FlexuralArea { area, beta_x })
    }

    /// Largest area the section takes without compression steel
    pub fn limit_flexural_area(&self, b: f64, d: f64, fcd: f64, fyd: f64, es: f64) -> f64 {
        let beta = self.beta_x_limit;
        // resultant of the stress block at the limit depth equals the steel force
        self.alpha_c * fcd * b * self.lambda * beta * d / self.steel_stress(beta, fyd, es)
    }

    fn steel_stress(&self, beta_x: f64, fyd: f64, es: f64) -> f64 {
        if beta_x <= 0.0 {
            return fyd;
        }
        fyd.min(es * self.eps_cu * (1.0 / beta_x - 1.0))
    }

    /// Design bond stress fbd
    pub fn bond_strength(&self, surface: SurfaceType, face: Face, diameter: f64, fctd: f64) -> f64 {
        let eta1 = match surface {
            SurfaceType::Plain => 1.0,
            SurfaceType::Carved => 1.4,
            SurfaceType::Ribbed => 2.25,
        };
        let eta2 = match face {
            Face::Top => 0.7,
            _ => 1.0,
        };
        let eta3 = if diameter < 3.2 { 1.0 } else { (13.2 - diameter) / 10.0 };
        eta1 * eta2 * eta3 * fctd
    }

    /// Basic anchorage length lb and its lower bound lb,min
    pub fn anchorage(&self, diameter: f64, fyd: f64, fbd: f64) -> (f64, f64) {
        let lb = (diameter * fyd / (4.0 * fbd)).max(self.anchorage_diameters * diameter);
        let lb_min = (0.3 * lb).max(10.0 * diameter).max(10.0);
        (lb, lb_min)
    }

    /// Shift of the moment diagram a_l
    pub fn decalage_length(&self, d: f64, vsd: f64, vc0: f64, stirrup_angle: f64, strut_angle: f64) -> f64 {
        if vsd <= vc0 {
            return d;
        }
        let cot_alpha = cot(stirrup_angle);
        let al = d * (vsd * (1.0 + cot_alpha) / (2.0 * (vsd - vc0)) - cot_alpha);
        let lower = if (stirrup_angle - std::f64::consts::FRAC_PI_2).abs() < 1e-6 {
            0.5 * d
        } else {
            0.2 * d
        };
        // model II bound from the strut inclination
        let upper = d.max(0.5 * d * (cot(strut_angle) - cot_alpha));
        al.clamp(lower, upper)
    }

    /// Compression strut capacity V_Rd2
    pub fn strut_capacity(&self, fck: f64, fcd: f64, bw: f64, d: f64, stirrup_angle: f64, strut_angle: f64) -> f64 {
        let alpha_v2 = 1.0 - fck * 10.0 / 250.0;
        0.54 * alpha_v2 * fcd * bw * d * strut_angle.sin().powi(2) * (cot(stirrup_angle) + cot(strut_angle))
    }

    /// Concrete contribution V_c0 for flexural members
    pub fn concrete_shear_base(&self, fctd: f64, bw: f64, d: f64) -> f64 {
        0.6 * fctd * bw * d
    }

    /// Concrete contribution V_c, interpolated between V_c0 and zero at V_Rd2
    pub fn concrete_shear(&self, vsd: f64, vc0: f64, vrd2: f64) -> f64 {
        if vsd <= vc0 {
            vc0
        } else if vsd >= vrd2 || vrd2 <= vc0 {
            0.0
        } else {
            vc0 * (vrd2 - vsd) / (vrd2 - vc0)
        }
    }

    /// Required stirrup area per length Asw/s (cm²/cm), minimum included
    #[allow(clippy::too_many_arguments)]
    pub fn stirrup_area(
        &self,
        vsd: f64,
        vc: f64,
        d: f64,
        bw: f64,
        fctm: f64,
        fywk: f64,
        stirrup_angle: f64,
        strut_angle: f64,
    ) -> f64 {
        let fywd = fywk / self.gamma_s;
        let sin_alpha = stirrup_angle.sin();
        let required = (vsd - vc).max(0.0)
            / (self.lever_arm * d * fywd * sin_alpha * (cot(stirrup_angle) + cot(strut_angle)));
        let minimum = 0.2 * fctm * bw * sin_alpha / fywk;
        required.max(minimum)
    }

    /// Maximum stirrup spacing s_max (cm)
    pub fn max_stirrup_spacing(&self, vsd: f64, vrd2: f64, d: f64) -> f64 {
        if vsd <= 0.67 * vrd2 {
            (0.6 * d).min(self.stirrup_spacing_low)
        } else {
            (0.3 * d).min(self.stirrup_spacing_high)
        }
    }

    /// Minimum clear spacing between bars of diameter `diameter` in one layer
    pub fn bar_clear_spacing(&self, diameter: f64, aggregate_size: f64) -> f64 {
        self.min_bar_spacing
            .max(diameter)
            .max(self.aggregate_spacing_factor * aggregate_size)
    }

    /// Stirrup hook length
    pub fn stirrup_hook(&self, diameter: f64) -> f64 {
        (self.stirrup_hook_diameters * diameter).max(self.stirrup_hook_min)
    }
}

fn cot(angle: f64) -> f64 {
    let tan = angle.tan();
    if tan.abs() > 1e12 {
        0.0
    } else {
        1.0 / tan
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn test_rho_min_interpolation() {
        let rules = CodeRules::default();
        assert_relative_eq!(rules.rho_min(20.0), 0.0015);
        assert_relative_eq!(rules.rho_min(35.0), 0.00164);
        assert_relative_eq!(rules.rho_min(37.5), 0.001715, max_relative = 1e-12);
        assert_relative_eq!(rules.rho_min(90.0), 0.00256);
    }

    #[test]
    fn test_flexural_area_small_moment() {
        let rules = CodeRules::default();
        // 20x50 section, d = 40, C25, CA-50
        let fcd = 2.5 / 1.4;
        let fyd = 50.0 / 1.15;
        let result = rules.flexural_area(5000.0, 20.0, 40.0, fcd, fyd, 21000.0).unwrap();
        assert!(result.beta_x > 0.0 && result.beta_x < 0.45);
        // lever arm between 0.8d and d
        assert!(result.area > 5000.0 / (fyd * 40.0));
        assert!(result.area < 5000.0 / (fyd * 0.8 * 40.0));
    }

    #[test]
    fn test_flexural_area_exceeds_block() {
        let rules = CodeRules::default();
        assert!(rules.flexural_area(1e6, 20.0, 40.0, 2.5 / 1.4, 50.0 / 1.15, 21000.0).is_none());
    }

    #[test]
    fn test_flexural_area_monotonic_in_moment() {
        let rules = CodeRules::default();
        let area = |m| rules.flexural_area(m, 20.0, 40.0, 2.5 / 1.4, 50.0 / 1.15, 21000.0).unwrap().area;
        assert!(area(2000.0) < area(4000.0));
        assert!(area(4000.0) < area(8000.0));
    }

    #[test]
    fn test_strut_capacity_vertical_stirrups() {
        let rules = CodeRules::default();
        let fcd = 2.5 / 1.4;
        let vrd2 = rules.strut_capacity(2.5, fcd, 20.0, 40.0, FRAC_PI_2, FRAC_PI_4);
        // 0.27 αv2 fcd bw d for α = 90°, θ = 45°
        assert_relative_eq!(vrd2, 0.27 * 0.9 * fcd * 800.0, max_relative = 1e-9);
    }

    #[test]
    fn test_concrete_shear_interpolation() {
        let rules = CodeRules::default();
        assert_relative_eq!(rules.concrete_shear(10.0, 50.0, 300.0), 50.0);
        assert_relative_eq!(rules.concrete_shear(175.0, 50.0, 300.0), 25.0);
        assert_relative_eq!(rules.concrete_shear(300.0, 50.0, 300.0), 0.0);
    }

    #[test]
    fn test_stirrup_area_minimum_governs_low_shear() {
        let rules = CodeRules::default();
        let fctm = 0.3 * 25.0_f64.powf(2.0 / 3.0) / 10.0;
        let asw = rules.stirrup_area(1.0, 50.0, 40.0, 20.0, fctm, 50.0, FRAC_PI_2, FRAC_PI_4);
        assert_relative_eq!(asw, 0.2 * fctm * 20.0 / 50.0, max_relative = 1e-12);
    }

    #[test]
    fn test_anchorage_lower_bounds() {
        let rules = CodeRules::default();
        let (lb, lb_min) = rules.anchorage(1.0, 50.0 / 1.15, 0.3);
        assert_relative_eq!(lb, 1.0 * 50.0 / 1.15 / 1.2, max_relative = 1e-12);
        assert_relative_eq!(lb_min, 0.3 * lb);
        let (lb, lb_min) = rules.anchorage(0.5, 1.0, 10.0);
        assert_relative_eq!(lb, 12.5);
        assert_relative_eq!(lb_min, 10.0);
    }

    #[test]
    fn test_decalage_bounds() {
        let rules = CodeRules::default();
        assert_relative_eq!(rules.decalage_length(40.0, 10.0, 20.0, FRAC_PI_2, FRAC_PI_4), 40.0);
        let al = rules.decalage_length(40.0, 100.0, 20.0, FRAC_PI_2, FRAC_PI_4);
        assert!((20.0..=40.0).contains(&al));
    }

    #[test]
    fn test_spacing_caps() {
        let rules = CodeRules::default();
        assert_relative_eq!(rules.max_stirrup_spacing(10.0, 100.0, 40.0), 24.0);
        assert_relative_eq!(rules.max_stirrup_spacing(10.0, 100.0, 60.0), 30.0);
        assert_relative_eq!(rules.max_stirrup_spacing(90.0, 100.0, 40.0), 12.0);
        assert_relative_eq!(rules.max_stirrup_spacing(90.0, 100.0, 80.0), 20.0);
    }
}
