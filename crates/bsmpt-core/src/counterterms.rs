// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Counterterm Solver
// Mirrors: src/models/ClassPotentialOrigin.cpp
// ─────────────────────────────────────────────────────────────────────
//! Closed-form on-shell counterterms.
//!
//! The renormalisation conditions demand that the counterterm potential
//! cancels the first and second field derivatives of V_CW at the tree
//! VEV. Each model supplies the linear solution as a
//! [`CountertermScheme`]; this module only validates the inputs and
//! outputs around it.

use bsmpt_types::{BsmptError, BsmptResult};

use crate::tensors::CurvatureTensors;

/// Derivatives of V_CW at the tree-level VEV.
#[derive(Debug, Clone, PartialEq)]
pub struct CountertermInput {
    pub nabla: Vec<f64>,
    /// Row-major N×N.
    pub hesse: Vec<f64>,
    pub vev: Vec<f64>,
}

impl CountertermInput {
    pub fn n(&self) -> usize {
        self.nabla.len()
    }

    #[inline]
    pub fn hesse(&self, i: usize, j: usize) -> f64 {
        self.hesse[i * self.n() + j]
    }
}

/// A renormalisation scheme: counterterm names, the closed-form solve,
/// and how the parameters enter the counterterm potential.
pub trait CountertermScheme {
    fn n_params(&self) -> usize;

    fn names(&self) -> Vec<String>;

    fn solve(&self, input: &CountertermInput) -> BsmptResult<Vec<f64>>;

    /// Write the counterterm potential for `params` into `tensors`.
    fn apply(&self, params: &[f64], tensors: &mut CurvatureTensors) -> BsmptResult<()>;
}

/// Validate `input`, run the scheme, and reject malformed output.
pub fn solve_counterterms<S>(scheme: &S, input: &CountertermInput) -> BsmptResult<Vec<f64>>
where
    S: CountertermScheme + ?Sized,
{
    let n = input.n();
    BsmptError::check_len("counterterm hesse", input.hesse.len(), n * n)?;
    BsmptError::check_len("counterterm vev", input.vev.len(), n)?;
    if input
        .nabla
        .iter()
        .chain(&input.hesse)
        .chain(&input.vev)
        .any(|x| !x.is_finite())
    {
        return Err(BsmptError::Numerical(
            "non-finite one-loop derivative in counterterm input".to_string(),
        ));
    }

    let params = scheme.solve(input)?;
    BsmptError::check_len("counterterm parameters", params.len(), scheme.n_params())?;
    if let Some(pos) = params.iter().position(|x| !x.is_finite()) {
        let names = scheme.names();
        let name = names.get(pos).map(String::as_str).unwrap_or("?");
        log::warn!("counterterm {name} is not finite");
        return Err(BsmptError::Numerical(format!(
            "counterterm {name} evaluated to {}",
            params[pos]
        )));
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One field, V_CT = dT·φ + ½ dm²·φ².
    struct Linear;

    impl CountertermScheme for Linear {
        fn n_params(&self) -> usize {
            2
        }

        fn names(&self) -> Vec<String> {
            vec!["dm2".to_string(), "dT".to_string()]
        }

        fn solve(&self, input: &CountertermInput) -> BsmptResult<Vec<f64>> {
            let dm2 = -input.hesse(0, 0);
            let dt = -input.nabla[0] - dm2 * input.vev[0];
            Ok(vec![dm2, dt])
        }

        fn apply(&self, params: &[f64], tensors: &mut CurvatureTensors) -> BsmptResult<()> {
            tensors.clear();
            tensors.set_l2(0, 0, params[0]);
            tensors.set_l1(0, params[1]);
            Ok(())
        }
    }

    fn input() -> CountertermInput {
        CountertermInput {
            nabla: vec![3.0],
            hesse: vec![-7.0],
            vev: vec![2.0],
        }
    }

    #[test]
    fn test_counterterms_cancel_derivatives() {
        let params = solve_counterterms(&Linear, &input()).unwrap();
        let mut ct = CurvatureTensors::new(1);
        Linear.apply(&params, &mut ct).unwrap();
        let g = ct.gradient(&[2.0]).unwrap();
        let h = ct.hessian(&[2.0]).unwrap();
        assert!((g[0] + 3.0).abs() < 1e-14);
        assert!((h[0] - 7.0).abs() < 1e-14);
    }

    #[test]
    fn test_repeated_solve_is_identical() {
        let first = solve_counterterms(&Linear, &input()).unwrap();
        let second = solve_counterterms(&Linear, &input()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let mut bad = input();
        bad.nabla[0] = f64::NAN;
        assert!(matches!(
            solve_counterterms(&Linear, &bad),
            Err(BsmptError::Numerical(_))
        ));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let mut bad = input();
        bad.hesse.push(0.0);
        assert!(matches!(
            solve_counterterms(&Linear, &bad),
            Err(BsmptError::Dimension(_))
        ));
    }
}
