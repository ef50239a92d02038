// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Finite-Difference Derivatives
// Mirrors: src/utility/NumericalDerivatives.cpp
// ─────────────────────────────────────────────────────────────────────
//! Central-difference stencils for a scalar function of the fields.
//!
//!   ∂_i f   ≈ [-f(+2ε) + 8f(+ε) - 8f(-ε) + f(-2ε)] / 12ε
//!   ∂_i² f  ≈ [f(+2ε) - 2f + f(-2ε)] / 4ε²
//!   ∂_i∂_j f ≈ [f(++) - f(+-) - f(-+) + f(--)] / 4ε²
//!   ∂_i∂_j∂_k f ≈ [H_ij(+ε e_k) - H_ij(-ε e_k)] / 2ε, then symmetrised
//!
//! The evaluated function may fail; errors propagate unchanged.

use bsmpt_types::BsmptResult;

use crate::one_loop::symmetrise3;

/// Five-point gradient.
pub fn nabla_numerical<F>(f: F, x: &[f64], eps: f64) -> BsmptResult<Vec<f64>>
where
    F: Fn(&[f64]) -> BsmptResult<f64>,
{
    let dim = x.len();
    let mut grad = vec![0.0; dim];
    let mut shifted = x.to_vec();

    for i in 0..dim {
        let mut at = |step: f64| -> BsmptResult<f64> {
            shifted[i] = x[i] + step;
            let value = f(&shifted);
            shifted[i] = x[i];
            value
        };
        let p2 = at(2.0 * eps)?;
        let p1 = at(eps)?;
        let m1 = at(-eps)?;
        let m2 = at(-2.0 * eps)?;
        grad[i] = (-p2 + 8.0 * p1 - 8.0 * m1 + m2) / (12.0 * eps);
    }

    Ok(grad)
}

/// Symmetric Hessian, row-major.
pub fn hessian_numerical<F>(f: F, x: &[f64], eps: f64) -> BsmptResult<Vec<f64>>
where
    F: Fn(&[f64]) -> BsmptResult<f64>,
{
    let dim = x.len();
    let mut hess = vec![0.0; dim * dim];
    let mut shifted = x.to_vec();
    let centre = f(x)?;

    for i in 0..dim {
        for j in i..dim {
            let value = if i == j {
                shifted[i] = x[i] + 2.0 * eps;
                let plus = f(&shifted)?;
                shifted[i] = x[i] - 2.0 * eps;
                let minus = f(&shifted)?;
                shifted[i] = x[i];
                (plus - 2.0 * centre + minus) / (4.0 * eps * eps)
            } else {
                let mut corner = |si: f64, sj: f64| -> BsmptResult<f64> {
                    shifted[i] = x[i] + si * eps;
                    shifted[j] = x[j] + sj * eps;
                    let value = f(&shifted);
                    shifted[i] = x[i];
                    shifted[j] = x[j];
                    value
                };
                let pp = corner(1.0, 1.0)?;
                let pm = corner(1.0, -1.0)?;
                let mp = corner(-1.0, 1.0)?;
                let mm = corner(-1.0, -1.0)?;
                (pp - pm - mp + mm) / (4.0 * eps * eps)
            };
            hess[i * dim + j] = value;
            hess[j * dim + i] = value;
        }
    }

    Ok(hess)
}

/// Third derivative as the central difference of the numerical Hessian.
pub fn third_numerical<F>(f: F, x: &[f64], eps: f64) -> BsmptResult<Vec<f64>>
where
    F: Fn(&[f64]) -> BsmptResult<f64>,
{
    let dim = x.len();
    let mut raw = vec![0.0; dim * dim * dim];
    let mut shifted = x.to_vec();

    for k in 0..dim {
        shifted[k] = x[k] + eps;
        let plus = hessian_numerical(&f, &shifted, eps)?;
        shifted[k] = x[k] - eps;
        let minus = hessian_numerical(&f, &shifted, eps)?;
        shifted[k] = x[k];
        for ij in 0..dim * dim {
            raw[ij * dim + k] = (plus[ij] - minus[ij]) / (2.0 * eps);
        }
    }

    Ok(symmetrise3(&raw, dim))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bsmpt_types::BsmptError;

    fn cubic(x: &[f64]) -> BsmptResult<f64> {
        Ok(x[0].powi(3) * x[1] + 2.0 * x[1] * x[1] - x[0])
    }

    #[test]
    fn test_gradient_exact_for_polynomial() {
        let g = nabla_numerical(cubic, &[1.5, -0.5], 1e-3).unwrap();
        assert!((g[0] - (3.0 * 2.25 * -0.5 - 1.0)).abs() < 1e-9, "{g:?}");
        assert!((g[1] - (3.375 - 2.0)).abs() < 1e-9, "{g:?}");
    }

    #[test]
    fn test_hessian_symmetric_and_accurate() {
        let h = hessian_numerical(cubic, &[1.5, -0.5], 1e-3).unwrap();
        assert!((h[0] - 6.0 * 1.5 * -0.5).abs() < 1e-5, "{h:?}");
        assert!((h[1] - 3.0 * 2.25).abs() < 1e-5, "{h:?}");
        assert!((h[3] - 4.0).abs() < 1e-5, "{h:?}");
        assert_eq!(h[1], h[2]);
    }

    #[test]
    fn test_third_derivative_of_cubic() {
        // ∂³/∂x²∂y = 6x, ∂³/∂x³ = 6y
        let t = third_numerical(cubic, &[1.5, -0.5], 1e-2).unwrap();
        let at = |i: usize, j: usize, k: usize| t[(i * 2 + j) * 2 + k];
        assert!((at(0, 0, 0) - (-3.0)).abs() < 1e-4, "{t:?}");
        assert!((at(0, 0, 1) - 9.0).abs() < 1e-4, "{t:?}");
        assert!((at(1, 0, 0) - 9.0).abs() < 1e-4, "{t:?}");
        assert!(at(1, 1, 1).abs() < 1e-4, "{t:?}");
    }

    #[test]
    fn test_error_propagates() {
        let failing = |_: &[f64]| -> BsmptResult<f64> {
            Err(BsmptError::Numerical("boom".to_string()))
        };
        assert!(nabla_numerical(failing, &[0.0], 1e-3).is_err());
        assert!(hessian_numerical(failing, &[0.0], 1e-3).is_err());
    }
}
