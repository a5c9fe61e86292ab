//! Mathematical utilities for beam analysis

pub mod polynomial;

use nalgebra::{DMatrix, DVector, SMatrix, SVector};

pub use polynomial::Polynomial;

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;

/// 4x4 matrix for element stiffness
pub type Mat4 = SMatrix<f64, 4, 4>;
/// 4-element vector for element forces/displacements `[v_i, θ_i, v_j, θ_j]`
pub type Vec4 = SVector<f64, 4>;

/// Smallest accepted ratio between the smallest and largest LU pivot
pub const PIVOT_RATIO: f64 = 1e-12;

/// Compute the local stiffness matrix for an Euler-Bernoulli beam element
///
/// # Arguments
/// * `ei` - Flexural rigidity
/// * `length` - Element length
///
/// # Returns
/// 4x4 stiffness matrix over `[v_i, θ_i, v_j, θ_j]`
pub fn beam_local_stiffness(ei: f64, length: f64) -> Mat4 {
    let l = length;
    let l2 = l * l;
    let k = ei / (l2 * l);

    #[rustfmt::skip]
    let data = [
        12.0,    6.0*l,    -12.0,   6.0*l,
        6.0*l,   4.0*l2,   -6.0*l,  2.0*l2,
        -12.0,   -6.0*l,   12.0,    -6.0*l,
        6.0*l,   2.0*l2,   -6.0*l,  4.0*l2,
    ];

    Mat4::from_row_slice(&data) * k
}

/// Consistent equivalent nodal loads for a linearly distributed load
/// spanning a whole element.
///
/// `q_i` and `q_j` are the intensities at the element ends (positive upward).
/// The load is split into a uniform part `q_i` and a triangular part rising
/// from 0 to `q_j - q_i`.
pub fn equivalent_loads_linear(q_i: f64, q_j: f64, length: f64) -> Vec4 {
    let l = length;
    let l2 = l * l;
    let w = q_j - q_i;

    let uniform = Vec4::new(q_i * l / 2.0, q_i * l2 / 12.0, q_i * l / 2.0, -q_i * l2 / 12.0);
    let triangular = Vec4::new(
        3.0 * w * l / 20.0,
        w * l2 / 30.0,
        7.0 * w * l / 20.0,
        -w * l2 / 20.0,
    );

    uniform + triangular
}

/// Solve a linear system using LU decomposition.
///
/// The system is symmetrically scaled by `1/sqrt(|a_ii|)` first, so very
/// short elements next to long ones do not skew the pivots. Returns `None`
/// when the scaled matrix is singular or its pivot ratio falls under
/// [`PIVOT_RATIO`].
pub fn solve_linear_system(a: &Mat, b: &Vec) -> Option<Vec> {
    let n = a.nrows();
    if n == 0 {
        return Some(Vec::zeros(0));
    }
    let scale = Vec::from_iterator(
        n,
        a.diagonal().iter().map(|&d| if d != 0.0 { 1.0 / d.abs().sqrt() } else { 1.0 }),
    );
    let scaled = Mat::from_fn(n, n, |i, j| scale[i] * a[(i, j)] * scale[j]);

    let lu = scaled.lu();
    let pivots = lu.u().diagonal().map(f64::abs);
    let max_pivot = pivots.max();
    let min_pivot = pivots.min();
    if max_pivot == 0.0 || min_pivot / max_pivot < PIVOT_RATIO {
        return None;
    }
    let y = lu.solve(&b.component_mul(&scale))?;
    Some(y.component_mul(&scale))
}
