//! Fixed-degree polynomials used by the diagram engine

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

/// Highest supported degree. Linear load → cubic moment → quintic displacement.
pub const MAX_DEGREE: usize = 5;

/// Polynomial `c0 + c1·t + ... + c5·t⁵` in a local coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Polynomial {
    pub coeffs: [f64; MAX_DEGREE + 1],
}

impl Polynomial {
    pub fn new(coeffs: [f64; MAX_DEGREE + 1]) -> Self {
        Self { coeffs }
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn constant(c: f64) -> Self {
        let mut p = Self::zero();
        p.coeffs[0] = c;
        p
    }

    /// `c0 + c1·t`
    pub fn linear(c0: f64, c1: f64) -> Self {
        let mut p = Self::constant(c0);
        p.coeffs[1] = c1;
        p
    }

    /// Evaluate with Horner's scheme
    pub fn eval(&self, t: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, &c| acc * t + c)
    }

    pub fn derivative(&self) -> Self {
        let mut d = Self::zero();
        for k in 1..=MAX_DEGREE {
            d.coeffs[k - 1] = self.coeffs[k] * k as f64;
        }
        d
    }

    /// Antiderivative taking the value `c0` at t = 0.
    ///
    /// The top coefficient must be zero; callers integrate at most five times
    /// starting from a linear load.
    pub fn integral(&self, c0: f64) -> Self {
        debug_assert!(self.coeffs[MAX_DEGREE] == 0.0, "polynomial degree overflow");
        let mut p = Self::constant(c0);
        for k in 0..MAX_DEGREE {
            p.coeffs[k + 1] = self.coeffs[k] / (k + 1) as f64;
        }
        p
    }

    /// Real roots in `[a, b]`, located by subdivision and bisection.
    ///
    /// Touching roots without a sign change are only reported when a
    /// subdivision point lands on them.
    pub fn roots_in(&self, a: f64, b: f64) -> std::vec::Vec<f64> {
        const PIECES: usize = 32;
        let mut roots = std::vec::Vec::new();
        if b <= a || self.coeffs.iter().all(|&c| c == 0.0) {
            return roots;
        }

        let step = (b - a) / PIECES as f64;
        let mut t0 = a;
        let mut f0 = self.eval(t0);
        if f0 == 0.0 {
            roots.push(t0);
        }
        for i in 1..=PIECES {
            let t1 = if i == PIECES { b } else { a + step * i as f64 };
            let f1 = self.eval(t1);
            if f1 == 0.0 {
                roots.push(t1);
            } else if f0 != 0.0 && f0.signum() != f1.signum() {
                roots.push(self.bisect(t0, t1, f0));
            }
            t0 = t1;
            f0 = f1;
        }
        roots
    }

    fn bisect(&self, mut lo: f64, mut hi: f64, mut f_lo: f64) -> f64 {
        for _ in 0..60 {
            let mid = 0.5 * (lo + hi);
            let f_mid = self.eval(mid);
            if f_mid == 0.0 {
                return mid;
            }
            if f_mid.signum() == f_lo.signum() {
                lo = mid;
                f_lo = f_mid;
            } else {
                hi = mid;
            }
        }
        0.5 * (lo + hi)
    }
}

impl Add for Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: Polynomial) -> Polynomial {
        let mut p = self;
        for (c, r) in p.coeffs.iter_mut().zip(rhs.coeffs) {
            *c += r;
        }
        p
    }
}

impl Sub for Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: Polynomial) -> Polynomial {
        self + (-rhs)
    }
}

impl Neg for Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        self * -1.0
    }
}

impl Mul<f64> for Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: f64) -> Polynomial {
        let mut p = self;
        p.coeffs.iter_mut().for_each(|c| *c *= rhs);
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_eval_and_derivative() {
        // 1 + 2t + 3t²
        let p = Polynomial::new([1.0, 2.0, 3.0, 0.0, 0.0, 0.0]);
        assert_relative_eq!(p.eval(2.0), 17.0);
        assert_relative_eq!(p.derivative().eval(2.0), 14.0);
    }

    #[test]
    fn test_integral_inverts_derivative() {
        let p = Polynomial::new([4.0, -1.0, 0.5, 2.0, 0.0, 0.0]);
        let back = p.integral(7.0).derivative();
        for k in 0..=MAX_DEGREE {
            assert_relative_eq!(back.coeffs[k], p.coeffs[k], epsilon = 1e-12);
        }
        assert_relative_eq!(p.integral(7.0).eval(0.0), 7.0);
    }

    #[test]
    fn test_roots_in_interval() {
        // (t - 1)(t - 3) = t² - 4t + 3
        let p = Polynomial::new([3.0, -4.0, 1.0, 0.0, 0.0, 0.0]);
        let roots = p.roots_in(0.0, 5.0);
        assert_eq!(roots.len(), 2);
        assert_relative_eq!(roots[0], 1.0, epsilon = 1e-9);
        assert_relative_eq!(roots[1], 3.0, epsilon = 1e-9);
        assert!(p.roots_in(1.5, 2.5).is_empty());
    }
}
