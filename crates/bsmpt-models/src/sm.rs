// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Standard Model
// Mirrors: src/models/ClassPotentialSM.cpp
// ─────────────────────────────────────────────────────────────────────
//! One Higgs doublet, fields (ρ, η, ζ, ψ) = (0, 1, 2, 3), VEV along ζ.
//!
//!   V = μ² Φ†Φ + λ (Φ†Φ)²,  μ² = -m_H²/2,  λ = m_H²/(2 v0²)
//!
//! Counterterms (δμ², δλ, δT1..δT4) follow from the on-shell conditions
//! on the neutral CP-even and CP-odd directions.

use bsmpt_core::{
    minimize_order_vev, CountertermInput, CountertermScheme, CurvatureTensors, MixingBlock,
    MixingLayout, ModelDefinition, ModelTensors,
};
use bsmpt_types::{BsmptError, BsmptResult, SmConstants};

use crate::doublet::{self, Doublet, N_LEPTONS, N_QUARKS};

const DOUBLET: Doublet = Doublet::new(0, 1, 2, 3);
const N_HIGGS: usize = 4;
const VEV_ORDER: [usize; 1] = [2];

#[derive(Debug, Clone)]
pub struct Sm {
    sm: SmConstants,
    v0: f64,
    mu_sq: f64,
    lambda: f64,
}

impl Sm {
    pub fn new(sm: SmConstants) -> BsmptResult<Self> {
        sm.validate()?;
        let v0 = sm.vev0();
        let mu_sq = -sm.mass_higgs.powi(2) / 2.0;
        let lambda = -mu_sq / (v0 * v0);
        Ok(Self {
            sm,
            v0,
            mu_sq,
            lambda,
        })
    }

    pub fn mu_sq(&self) -> f64 {
        self.mu_sq
    }

    pub fn lambda(&self) -> f64 {
        self.lambda
    }
}

/// μ² Φ†Φ + λ (Φ†Φ)² in curvature form.
fn write_potential(t: &mut CurvatureTensors, mu_sq: f64, lambda: f64) {
    for i in 0..N_HIGGS {
        t.set_l2(i, i, mu_sq);
        t.set_l4([i, i, i, i], 6.0 * lambda);
        for j in i + 1..N_HIGGS {
            t.set_l4([i, i, j, j], 2.0 * lambda);
        }
    }
}

impl CountertermScheme for Sm {
    fn n_params(&self) -> usize {
        6
    }

    fn names(&self) -> Vec<String> {
        ["dmuSq", "dlambda", "dT1", "dT2", "dT3", "dT4"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn solve(&self, input: &CountertermInput) -> BsmptResult<Vec<f64>> {
        BsmptError::check_len("SM loop gradient", input.n(), N_HIGGS)?;
        let v = input.vev[2];
        if v.abs() < f64::EPSILON {
            return Err(BsmptError::precondition("SM counterterms", "vacuum with v != 0"));
        }
        let (h22, h33) = (input.hesse(2, 2), input.hesse(3, 3));
        let n = &input.nabla;
        Ok(vec![
            h22 / 2.0 - 1.5 * h33,
            (h33 - h22) / (2.0 * v * v),
            -n[0],
            -n[1],
            h33 * v - n[2],
            -n[3],
        ])
    }

    fn apply(&self, params: &[f64], tensors: &mut CurvatureTensors) -> BsmptResult<()> {
        BsmptError::check_len("SM counterterms", params.len(), 6)?;
        tensors.clear();
        write_potential(tensors, params[0], params[1]);
        for (i, dt) in params[2..].iter().enumerate() {
            tensors.set_l1(i, *dt);
        }
        Ok(())
    }
}

impl ModelDefinition for Sm {
    fn name(&self) -> &str {
        "SM"
    }

    fn n_higgs(&self) -> usize {
        N_HIGGS
    }

    fn n_quarks(&self) -> usize {
        N_QUARKS
    }

    fn n_leptons(&self) -> usize {
        N_LEPTONS
    }

    fn vev_order(&self) -> Vec<usize> {
        VEV_ORDER.to_vec()
    }

    fn vev_labels(&self) -> Vec<String> {
        vec!["omega".to_string()]
    }

    fn scale(&self) -> f64 {
        self.v0
    }

    fn tree_vev(&self) -> Vec<f64> {
        minimize_order_vev(&VEV_ORDER, N_HIGGS, &[self.v0])
    }

    fn sm(&self) -> &SmConstants {
        &self.sm
    }

    fn parameters(&self) -> Vec<(String, f64)> {
        vec![
            ("muSq".to_string(), self.mu_sq),
            ("lambda".to_string(), self.lambda),
            ("v0".to_string(), self.v0),
        ]
    }

    fn set_curvature(&self, tensors: &mut ModelTensors) -> BsmptResult<()> {
        tensors.higgs.clear();
        write_potential(&mut tensors.higgs, self.mu_sq, self.lambda);

        let sm = &self.sm;
        let ckm = sm.ckm();
        doublet::add_gauge(&mut tensors.gauge, DOUBLET, sm.g(), sm.g_prime());
        doublet::add_up_quarks(&mut tensors.quark, DOUBLET, self.v0, sm.up_masses(), &ckm);
        doublet::add_down_quarks(&mut tensors.quark, DOUBLET, self.v0, sm.down_masses(), &ckm);
        doublet::add_leptons(&mut tensors.lepton, DOUBLET, self.v0, sm.lepton_masses());
        Ok(())
    }

    fn mixing_layout(&self) -> BsmptResult<MixingLayout> {
        MixingLayout::new(
            N_HIGGS,
            vec![
                MixingBlock::new("charged+", &[0], &["G+"]).with_signs(&[Some(0)]),
                MixingBlock::new("charged-", &[1], &["G-"]).with_signs(&[Some(1)]),
                MixingBlock::new("CP-even", &[2], &["H"]).with_signs(&[Some(2)]),
                MixingBlock::new("CP-odd", &[3], &["G0"]).with_signs(&[Some(3)]),
            ],
            &["G+", "G-", "G0", "H"],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_from_higgs_mass() {
        let sm = Sm::new(SmConstants::default()).unwrap();
        let v0 = SmConstants::default().vev0();
        assert!((sm.mu_sq() + 125.09f64.powi(2) / 2.0).abs() < 1e-9);
        assert!((sm.lambda() * v0 * v0 + sm.mu_sq()).abs() < 1e-9);
    }

    #[test]
    fn test_tree_vacuum_is_stationary() {
        let sm = Sm::new(SmConstants::default()).unwrap();
        let mut tensors = ModelTensors::new(4, 4, N_QUARKS, N_LEPTONS);
        sm.set_curvature(&mut tensors).unwrap();
        let grad = tensors.higgs.gradient(&sm.tree_vev()).unwrap();
        assert!(grad.iter().all(|g| g.abs() < 1e-7), "{grad:?}");
    }

    #[test]
    fn test_higgs_mass_at_tree_vacuum() {
        let sm = Sm::new(SmConstants::default()).unwrap();
        let mut tensors = ModelTensors::new(4, 4, N_QUARKS, N_LEPTONS);
        sm.set_curvature(&mut tensors).unwrap();
        let hess = tensors.higgs.hessian(&sm.tree_vev()).unwrap();
        assert!((hess[2 * 4 + 2] - 125.09f64.powi(2)).abs() < 1e-6);
        for i in [0, 1, 3] {
            assert!(hess[i * 4 + i].abs() < 1e-8);
        }
    }

    #[test]
    fn test_counterterms_cancel_synthetic_loop_terms() {
        let sm = Sm::new(SmConstants::default()).unwrap();
        let v = sm.tree_vev();
        // Hesse consistent with the doublet symmetry: Goldstones share h33.
        let (h22, h33) = (-310.0, 45.0);
        let mut hesse = vec![0.0; 16];
        for (i, h) in [h33, h33, h22, h33].into_iter().enumerate() {
            hesse[i * 4 + i] = h;
        }
        let input = CountertermInput {
            nabla: vec![0.0, 0.0, 12.5, 0.0],
            hesse: hesse.clone(),
            vev: v.clone(),
        };
        let params = sm.solve(&input).unwrap();
        let mut ct = CurvatureTensors::new(4);
        sm.apply(&params, &mut ct).unwrap();
        let grad = ct.gradient(&v).unwrap();
        let hess = ct.hessian(&v).unwrap();
        assert!((grad[2] + 12.5).abs() < 1e-9);
        for (got, h) in hess.iter().zip(&hesse) {
            assert!((got + h).abs() < 1e-9);
        }
    }

    #[test]
    fn test_counterterm_names_match_count() {
        let sm = Sm::new(SmConstants::default()).unwrap();
        assert_eq!(sm.names().len(), sm.n_params());
    }
}
