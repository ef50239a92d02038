// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Derivative Engine
// Mirrors: src/models/ClassPotentialOrigin.cpp
// ─────────────────────────────────────────────────────────────────────
//! Field derivatives of the zero-temperature effective potential
//! V_eff = V_tree + V_CT + V_CW.
//!
//! Tree and counterterm pieces are contracted from the curvature
//! tensors. The one-loop piece uses the closed forms in `one_loop` or
//! finite differences of V_CW, as configured.

use bsmpt_types::{BsmptResult, DerivativeMethod, EngineConfig};

use crate::couplings::PhysicalCouplings;
use crate::loops::LoopFunctions;
use crate::numerical::{hessian_numerical, nabla_numerical, third_numerical};
use crate::one_loop::{
    v1_loop, weinberg_first_derivative, weinberg_second_derivative, weinberg_third_derivative,
};
use crate::tensors::ModelTensors;

/// Which pieces of the effective potential to include.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contributions {
    pub tree: bool,
    pub counterterm: bool,
    pub one_loop: bool,
}

impl Contributions {
    pub const ALL: Self = Self {
        tree: true,
        counterterm: true,
        one_loop: true,
    };
    pub const TREE: Self = Self {
        tree: true,
        counterterm: false,
        one_loop: false,
    };
    pub const COUNTERTERM: Self = Self {
        tree: false,
        counterterm: true,
        one_loop: false,
    };
    pub const ONE_LOOP: Self = Self {
        tree: false,
        counterterm: false,
        one_loop: true,
    };
}

/// Stateless view over populated tensors.
pub struct DerivativeEngine<'a> {
    tensors: &'a ModelTensors,
    config: &'a EngineConfig,
    loops: LoopFunctions,
}

fn add_into(acc: &mut [f64], part: &[f64]) {
    for (a, p) in acc.iter_mut().zip(part) {
        *a += p;
    }
}

impl<'a> DerivativeEngine<'a> {
    pub fn new(tensors: &'a ModelTensors, config: &'a EngineConfig, scale: f64) -> Self {
        Self {
            tensors,
            config,
            loops: LoopFunctions::new(scale),
        }
    }

    fn one_loop_value(&self, x: &[f64]) -> BsmptResult<f64> {
        v1_loop(self.tensors, x, self.config, &self.loops)
    }

    /// V_eff at `fields`.
    pub fn potential(&self, fields: &[f64], parts: Contributions) -> BsmptResult<f64> {
        let mut total = 0.0;
        if parts.tree {
            total += self.tensors.higgs.value(fields)?;
        }
        if parts.counterterm {
            total += self.tensors.counterterm.value(fields)?;
        }
        if parts.one_loop {
            total += self.one_loop_value(fields)?;
        }
        Ok(total)
    }

    pub fn first_derivative(&self, fields: &[f64], parts: Contributions) -> BsmptResult<Vec<f64>> {
        let mut out = vec![0.0; self.tensors.n_higgs()];
        if parts.tree {
            add_into(&mut out, &self.tensors.higgs.gradient(fields)?);
        }
        if parts.counterterm {
            add_into(&mut out, &self.tensors.counterterm.gradient(fields)?);
        }
        if parts.one_loop {
            let cw = match self.config.derivative_method {
                DerivativeMethod::Analytic => {
                    let c = PhysicalCouplings::compute(self.tensors, fields, self.config)?;
                    weinberg_first_derivative(&c, self.config, &self.loops)
                }
                DerivativeMethod::FiniteDifference => {
                    nabla_numerical(|x| self.one_loop_value(x), fields, self.config.fd_eps)?
                }
            };
            add_into(&mut out, &cw);
        }
        Ok(out)
    }

    pub fn second_derivative(
        &self,
        fields: &[f64],
        parts: Contributions,
    ) -> BsmptResult<Vec<f64>> {
        let n = self.tensors.n_higgs();
        let mut out = vec![0.0; n * n];
        if parts.tree {
            add_into(&mut out, &self.tensors.higgs.hessian(fields)?);
        }
        if parts.counterterm {
            add_into(&mut out, &self.tensors.counterterm.hessian(fields)?);
        }
        if parts.one_loop {
            let cw = match self.config.derivative_method {
                DerivativeMethod::Analytic => {
                    let c = PhysicalCouplings::compute(self.tensors, fields, self.config)?;
                    weinberg_second_derivative(&c, self.config, &self.loops)
                }
                DerivativeMethod::FiniteDifference => {
                    hessian_numerical(|x| self.one_loop_value(x), fields, self.config.fd_eps)?
                }
            };
            add_into(&mut out, &cw);
        }
        Ok(out)
    }

    pub fn third_derivative(&self, fields: &[f64], parts: Contributions) -> BsmptResult<Vec<f64>> {
        let n = self.tensors.n_higgs();
        let mut out = vec![0.0; n * n * n];
        if parts.tree {
            add_into(&mut out, &self.tensors.higgs.third(fields)?);
        }
        if parts.counterterm {
            add_into(&mut out, &self.tensors.counterterm.third(fields)?);
        }
        if parts.one_loop {
            let cw = match self.config.derivative_method {
                DerivativeMethod::Analytic => {
                    let c = PhysicalCouplings::compute(self.tensors, fields, self.config)?;
                    weinberg_third_derivative(&c, self.config, &self.loops)
                }
                DerivativeMethod::FiniteDifference => {
                    third_numerical(|x| self.one_loop_value(x), fields, self.config.fd_eps)?
                }
            };
            add_into(&mut out, &cw);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> ModelTensors {
        let mut t = ModelTensors::new(2, 1, 1, 1);
        t.higgs.set_l2(0, 0, 4.0);
        t.higgs.set_l2(1, 1, 9.0);
        t.higgs.set_l4([0, 0, 0, 0], 6.0);
        t.counterterm.set_l1(1, -0.5);
        t.counterterm.set_l2(0, 1, 0.25);
        t
    }

    #[test]
    fn test_tree_first_derivative_toy_quartic() {
        let t = toy();
        let cfg = EngineConfig::default();
        let engine = DerivativeEngine::new(&t, &cfg, 100.0);
        let g = engine.first_derivative(&[1.0, 1.0], Contributions::TREE).unwrap();
        // ∂(2x² + 4.5y² + x⁴/4) at (1, 1)
        assert!((g[0] - 5.0).abs() < 1e-14);
        assert!((g[1] - 9.0).abs() < 1e-14);
    }

    #[test]
    fn test_counterterm_contribution_adds() {
        let t = toy();
        let cfg = EngineConfig::default();
        let engine = DerivativeEngine::new(&t, &cfg, 100.0);
        let parts = Contributions {
            tree: true,
            counterterm: true,
            one_loop: false,
        };
        let g = engine.first_derivative(&[1.0, 1.0], parts).unwrap();
        assert!((g[0] - 5.25).abs() < 1e-14);
        assert!((g[1] - 8.75).abs() < 1e-14);
    }

    #[test]
    fn test_second_derivative_symmetric() {
        let t = toy();
        let cfg = EngineConfig::default();
        let engine = DerivativeEngine::new(&t, &cfg, 100.0);
        let h = engine
            .second_derivative(&[0.3, -0.8], Contributions::ALL)
            .unwrap();
        assert!((h[1] - h[2]).abs() < 1e-12 * h[1].abs().max(1.0));
    }

    #[test]
    fn test_third_derivative_permutation_symmetric() {
        let t = toy();
        let cfg = EngineConfig::default();
        let engine = DerivativeEngine::new(&t, &cfg, 100.0);
        let d3 = engine.third_derivative(&[0.3, -0.8], Contributions::ALL).unwrap();
        let at = |i: usize, j: usize, k: usize| d3[(i * 2 + j) * 2 + k];
        assert!((at(0, 0, 1) - at(1, 0, 0)).abs() < 1e-12);
        assert!((at(0, 1, 1) - at(1, 1, 0)).abs() < 1e-12);
    }

    #[test]
    fn test_finite_difference_one_loop_agrees_with_analytic() {
        let t = toy();
        let analytic_cfg = EngineConfig::default();
        let fd_cfg = EngineConfig {
            derivative_method: DerivativeMethod::FiniteDifference,
            fd_eps: 1e-3,
            ..EngineConfig::default()
        };
        let point = [1.2, 0.7];
        let a = DerivativeEngine::new(&t, &analytic_cfg, 10.0)
            .first_derivative(&point, Contributions::ONE_LOOP)
            .unwrap();
        let n = DerivativeEngine::new(&t, &fd_cfg, 10.0)
            .first_derivative(&point, Contributions::ONE_LOOP)
            .unwrap();
        for i in 0..2 {
            assert!((a[i] - n[i]).abs() < 1e-7, "{a:?} vs {n:?}");
        }
    }

    #[test]
    fn test_potential_sums_parts() {
        let t = toy();
        let cfg = EngineConfig::default();
        let engine = DerivativeEngine::new(&t, &cfg, 100.0);
        let x = [0.4, 0.9];
        let total = engine.potential(&x, Contributions::ALL).unwrap();
        let split = engine.potential(&x, Contributions::TREE).unwrap()
            + engine.potential(&x, Contributions::COUNTERTERM).unwrap()
            + engine.potential(&x, Contributions::ONE_LOOP).unwrap();
        assert!((total - split).abs() < 1e-12);
    }
}
