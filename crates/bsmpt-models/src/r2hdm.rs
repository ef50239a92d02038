// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Real Two-Higgs-Doublet Model
// Mirrors: src/models/ClassPotentialR2HDM.cpp
// ─────────────────────────────────────────────────────────────────────
//! CP-conserving 2HDM with a softly broken Z₂:
//!
//!   V = m11² Φ1†Φ1 + m22² Φ2†Φ2 - m12² (Φ1†Φ2 + h.c.)
//!     + λ1/2 (Φ1†Φ1)² + λ2/2 (Φ2†Φ2)² + λ3 (Φ1†Φ1)(Φ2†Φ2)
//!     + λ4 (Φ1†Φ2)(Φ2†Φ1) + λ5/2 [(Φ1†Φ2)² + h.c.]
//!
//! Field basis: Φ1 = (0, 1, 4, 5), Φ2 = (2, 3, 6, 7) as (ρ, η, ζ, ψ).
//! m11² and m22² are fixed by the tadpole conditions at
//! (v1, v2) = v0 (cos β, sin β). Up-type quarks always couple to Φ2;
//! the Yukawa type decides where down-type quarks and leptons go.

use serde::{Deserialize, Serialize};

use bsmpt_core::{
    minimize_order_vev, CountertermInput, CountertermScheme, CurvatureTensors, DebyeCorrections,
    MixingBlock, MixingLayout, ModelDefinition, ModelTensors, SmLikeRule,
};
use bsmpt_types::{BsmptError, BsmptResult, SmConstants};

use crate::doublet::{self, Doublet, N_LEPTONS, N_QUARKS};

const PHI1: Doublet = Doublet::new(0, 1, 4, 5);
const PHI2: Doublet = Doublet::new(2, 3, 6, 7);
const N_HIGGS: usize = 8;
/// Charge-breaking, CP-even 1, CP-even 2, CP-violating direction.
const VEV_ORDER: [usize; 4] = [2, 4, 6, 7];
const N_COUNTERTERMS: usize = 11;

/// Loop Hesse entries at or below this are treated as zero.
const HESSE_CUT: f64 = 1e-3;
/// Tadpole counterterms below this are set to zero.
const TADPOLE_CUT: f64 = 1e-9;
/// δλ4 is not fixed by the renormalisation conditions and is set to
/// this value.
const FREE_DL4: f64 = 0.0;

/// Fermion coupling pattern of the Z₂ assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum YukawaType {
    TypeI,
    TypeII,
    LeptonSpecific,
    Flipped,
}

impl YukawaType {
    pub fn from_i64(value: i64) -> BsmptResult<Self> {
        match value {
            1 => Ok(Self::TypeI),
            2 => Ok(Self::TypeII),
            3 => Ok(Self::LeptonSpecific),
            4 => Ok(Self::Flipped),
            other => Err(BsmptError::InvalidModelType(other)),
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            Self::TypeI => 1,
            Self::TypeII => 2,
            Self::LeptonSpecific => 3,
            Self::Flipped => 4,
        }
    }

    /// Down-type quarks couple to Φ2.
    fn down_on_phi2(self) -> bool {
        matches!(self, Self::TypeI | Self::LeptonSpecific)
    }

    /// Charged leptons couple to Φ2.
    fn leptons_on_phi2(self) -> bool {
        matches!(self, Self::TypeI | Self::Flipped)
    }
}

impl TryFrom<i64> for YukawaType {
    type Error = BsmptError;

    fn try_from(value: i64) -> BsmptResult<Self> {
        Self::from_i64(value)
    }
}

/// Lagrangian input of one R2HDM point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct R2hdmParams {
    pub lambda1: f64,
    pub lambda2: f64,
    pub lambda3: f64,
    pub lambda4: f64,
    pub re_lambda5: f64,
    /// Re m12², GeV².
    pub m12_sq: f64,
    pub tan_beta: f64,
    pub yukawa: YukawaType,
}

impl R2hdmParams {
    /// From `[λ1, λ2, λ3, λ4, Re λ5, Re m12², tan β, type]`.
    pub fn from_slice(par: &[f64]) -> BsmptResult<Self> {
        BsmptError::check_len("R2HDM parameters", par.len(), 8)?;
        let kind = par[7];
        if !kind.is_finite() || kind.fract() != 0.0 {
            return Err(BsmptError::Config(format!(
                "Yukawa type must be an integer, got {kind}"
            )));
        }
        Ok(Self {
            lambda1: par[0],
            lambda2: par[1],
            lambda3: par[2],
            lambda4: par[3],
            re_lambda5: par[4],
            m12_sq: par[5],
            tan_beta: par[6],
            yukawa: YukawaType::from_i64(kind as i64)?,
        })
    }

    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            self.lambda1,
            self.lambda2,
            self.lambda3,
            self.lambda4,
            self.re_lambda5,
            self.m12_sq,
            self.tan_beta,
            self.yukawa.as_i64() as f64,
        ]
    }
}

#[derive(Debug, Clone)]
pub struct R2hdm {
    params: R2hdmParams,
    sm: SmConstants,
    v0: f64,
    cos_beta: f64,
    sin_beta: f64,
    /// m11²
    u1: f64,
    /// m22²
    u2: f64,
    identify_sm_like: bool,
}

/// Quartic couplings of the potential; the counterterm potential has the
/// same shape in the δλ.
#[derive(Debug, Clone, Copy)]
struct Quartics {
    l1: f64,
    l2: f64,
    l3: f64,
    l4: f64,
    rl5: f64,
}

impl R2hdm {
    pub fn new(params: R2hdmParams, sm: SmConstants) -> BsmptResult<Self> {
        sm.validate()?;
        let tb = params.tan_beta;
        if !(tb.is_finite() && tb > 0.0) {
            return Err(BsmptError::Config(format!(
                "tan_beta must be finite and > 0, got {tb}"
            )));
        }
        let couplings = [
            params.lambda1,
            params.lambda2,
            params.lambda3,
            params.lambda4,
            params.re_lambda5,
            params.m12_sq,
        ];
        if couplings.iter().any(|x| !x.is_finite()) {
            return Err(BsmptError::Config(
                "R2HDM couplings must be finite".to_string(),
            ));
        }

        let v0 = sm.vev0();
        let cb2 = 1.0 / (1.0 + tb * tb);
        let sb2 = tb * tb * cb2;
        let (cos_beta, sin_beta) = (cb2.sqrt(), sb2.sqrt());
        let l345 = params.lambda3 + params.lambda4 + params.re_lambda5;
        let v0_sq = v0 * v0;
        let u1 = params.m12_sq * tb - v0_sq * (sb2 * l345 + cb2 * params.lambda1) / 2.0;
        let u2 = params.m12_sq / tb - v0_sq * (cb2 * l345 + sb2 * params.lambda2) / 2.0;

        Ok(Self {
            params,
            sm,
            v0,
            cos_beta,
            sin_beta,
            u1,
            u2,
            identify_sm_like: false,
        })
    }

    pub fn from_slice(par: &[f64], sm: SmConstants) -> BsmptResult<Self> {
        Self::new(R2hdmParams::from_slice(par)?, sm)
    }

    /// Name the CP-even state closest to the SM Higgs mass `h` instead of
    /// the lighter one.
    pub fn with_sm_like_identification(mut self) -> Self {
        self.identify_sm_like = true;
        self
    }

    pub fn params(&self) -> &R2hdmParams {
        &self.params
    }

    pub fn v1(&self) -> f64 {
        self.v0 * self.cos_beta
    }

    pub fn v2(&self) -> f64 {
        self.v0 * self.sin_beta
    }

    /// Tadpole-fixed (m11², m22²).
    pub fn mass_parameters(&self) -> (f64, f64) {
        (self.u1, self.u2)
    }

    fn quartics(&self) -> Quartics {
        let p = &self.params;
        Quartics {
            l1: p.lambda1,
            l2: p.lambda2,
            l3: p.lambda3,
            l4: p.lambda4,
            rl5: p.re_lambda5,
        }
    }

    /// VEV seen by the down-type quarks and by the charged leptons.
    fn fermion_vevs(&self) -> (f64, f64) {
        let y = self.params.yukawa;
        let down = if y.down_on_phi2() { self.v2() } else { self.v1() };
        let lepton = if y.leptons_on_phi2() { self.v2() } else { self.v1() };
        (down, lepton)
    }
}

fn write_quadratic(t: &mut CurvatureTensors, u1: f64, u2: f64, m12: f64) {
    for f in [0, 1, 4, 5] {
        t.set_l2(f, f, u1);
    }
    for f in [2, 3, 6, 7] {
        t.set_l2(f, f, u2);
    }
    for (i, j) in [(0, 2), (1, 3), (4, 6), (5, 7)] {
        t.set_l2(i, j, -m12);
    }
}

fn write_quartic(t: &mut CurvatureTensors, q: Quartics) {
    let Quartics {
        l1,
        l2,
        l3,
        l4,
        rl5,
    } = q;
    let plus = l3 + l4 + rl5;
    let minus = l3 + l4 - rl5;
    let half_plus = (l4 + rl5) / 2.0;
    let half_minus = (l4 - rl5) / 2.0;
    let entries: [([usize; 4], f64); 46] = [
        ([0, 0, 0, 0], 3.0 * l1),
        ([0, 0, 1, 1], l1),
        ([0, 0, 2, 2], plus),
        ([0, 0, 3, 3], minus),
        ([0, 0, 4, 4], l1),
        ([0, 0, 5, 5], l1),
        ([0, 0, 6, 6], l3),
        ([0, 0, 7, 7], l3),
        ([0, 1, 2, 3], rl5),
        ([0, 2, 4, 6], half_plus),
        ([0, 2, 5, 7], half_plus),
        ([0, 3, 4, 7], half_minus),
        ([0, 3, 5, 6], -half_minus),
        ([1, 1, 1, 1], 3.0 * l1),
        ([1, 1, 2, 2], minus),
        ([1, 1, 3, 3], plus),
        ([1, 1, 4, 4], l1),
        ([1, 1, 5, 5], l1),
        ([1, 1, 6, 6], l3),
        ([1, 1, 7, 7], l3),
        ([1, 2, 4, 7], -half_minus),
        ([1, 2, 5, 6], half_minus),
        ([1, 3, 4, 6], half_plus),
        ([1, 3, 5, 7], half_plus),
        ([2, 2, 2, 2], 3.0 * l2),
        ([2, 2, 3, 3], l2),
        ([2, 2, 4, 4], l3),
        ([2, 2, 5, 5], l3),
        ([2, 2, 6, 6], l2),
        ([2, 2, 7, 7], l2),
        ([3, 3, 3, 3], 3.0 * l2),
        ([3, 3, 4, 4], l3),
        ([3, 3, 5, 5], l3),
        ([3, 3, 6, 6], l2),
        ([3, 3, 7, 7], l2),
        ([4, 4, 4, 4], 3.0 * l1),
        ([4, 4, 5, 5], l1),
        ([4, 4, 6, 6], plus),
        ([4, 4, 7, 7], minus),
        ([4, 5, 6, 7], rl5),
        ([5, 5, 5, 5], 3.0 * l1),
        ([5, 5, 6, 6], minus),
        ([5, 5, 7, 7], plus),
        ([6, 6, 6, 6], 3.0 * l2),
        ([6, 6, 7, 7], l2),
        ([7, 7, 7, 7], 3.0 * l2),
    ];
    for (idx, value) in entries {
        t.set_l4(idx, value);
    }
}

impl CountertermScheme for R2hdm {
    fn n_params(&self) -> usize {
        N_COUNTERTERMS
    }

    fn names(&self) -> Vec<String> {
        [
            "Dm11sq", "Dm22sq", "Dm12sq", "DL1", "DL2", "DL3", "DL4", "DL5", "DT1", "DT2", "DT3",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    fn solve(&self, input: &CountertermInput) -> BsmptResult<Vec<f64>> {
        BsmptError::check_len("R2HDM loop gradient", input.n(), N_HIGGS)?;
        let h = |i: usize, j: usize| {
            let x = input.hesse(i, j);
            if x.abs() <= HESSE_CUT {
                0.0
            } else {
                x
            }
        };
        let tadpole = |x: f64| if x.abs() < TADPOLE_CUT { 0.0 } else { x };
        let n = &input.nabla;
        // Conditions are imposed at the vacuum the loop input was taken at.
        let (v1, v2) = (input.vev[4], input.vev[6]);
        if v1.abs() < TADPOLE_CUT
            || v2.abs() < TADPOLE_CUT
            || input.vev[2].abs() >= TADPOLE_CUT
            || input.vev[7].abs() >= TADPOLE_CUT
        {
            return Err(BsmptError::precondition(
                "R2HDM counterterms",
                "vacuum with v1, v2 != 0 and no charged or CP-odd vev",
            ));
        }
        let fp = FREE_DL4;
        let (h00, h13, h33, h44, h45, h46, h47, h55, h66) = (
            h(0, 0),
            h(1, 3),
            h(3, 3),
            h(4, 4),
            h(4, 5),
            h(4, 6),
            h(4, 7),
            h(5, 5),
            h(6, 6),
        );

        let du1 = -((-2.0 * fp * v1 * v2 * v2 + 5.0 * h00 * v1 + h13 * v2
            - h46 * v2
            - h44 * v1
            - 2.0 * h55 * v1)
            / v1)
            / 2.0;
        let du2 = (2.0 * fp * v1 * v1 * v2 * v2 + h66 * v2 * v2
            - 2.0 * h00 * v1 * v1
            - h13 * v1 * v2
            - 3.0 * h33 * v2 * v2
            + h46 * v1 * v2
            + 2.0 * v1 * v1 * h55)
            / (v2 * v2)
            / 2.0;
        let dru3 = -(-fp * v1 * v2 * v2 + h00 * v1 - h13 * v2 - h55 * v1) / v2;
        let dl1 = (-fp * v2 * v2 + 2.0 * h00 - h44 - h55) / (v1 * v1);
        let dl2 = -(fp * v1 * v1 * v2 * v2 + h66 * v2 * v2 - h00 * v1 * v1 - h33 * v2 * v2
            + v1 * v1 * h55)
            / v2.powi(4);
        let dl3 = (-fp * v1 * v2 * v2 + h00 * v1 + h13 * v2 - h46 * v2 - h55 * v1) / v1 / (v2 * v2);
        let drl5 = -(-fp * v2 * v2 + 2.0 * h00 - 2.0 * h55) / (v2 * v2);
        let dt1 = tadpole(h13 * v2 + h00 * v1 - n[4]);
        let dt2 = tadpole(h13 * v1 + h33 * v2 - n[6]);
        let dt3 = tadpole(-(-v1 * v1 * h45 - h47 * v1 * v2 + n[7] * v2) / v2);

        Ok(vec![
            du1, du2, dru3, dl1, dl2, dl3, fp, drl5, dt1, dt2, dt3,
        ])
    }

    fn apply(&self, params: &[f64], tensors: &mut CurvatureTensors) -> BsmptResult<()> {
        BsmptError::check_len("R2HDM counterterms", params.len(), N_COUNTERTERMS)?;
        tensors.clear();
        write_quadratic(tensors, params[0], params[1], params[2]);
        write_quartic(
            tensors,
            Quartics {
                l1: params[3],
                l2: params[4],
                l3: params[5],
                l4: params[6],
                rl5: params[7],
            },
        );
        tensors.set_l1(4, params[8]);
        tensors.set_l1(6, params[9]);
        tensors.set_l1(7, params[10]);
        Ok(())
    }
}

impl ModelDefinition for R2hdm {
    fn name(&self) -> &str {
        "R2HDM"
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
        ["omega_CB", "omega_1", "omega_2", "omega_CP"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    fn scale(&self) -> f64 {
        self.v0
    }

    fn tree_vev(&self) -> Vec<f64> {
        minimize_order_vev(&VEV_ORDER, N_HIGGS, &[0.0, self.v1(), self.v2(), 0.0])
    }

    fn sm(&self) -> &SmConstants {
        &self.sm
    }

    fn parameters(&self) -> Vec<(String, f64)> {
        let p = &self.params;
        vec![
            ("lambda1".to_string(), p.lambda1),
            ("lambda2".to_string(), p.lambda2),
            ("lambda3".to_string(), p.lambda3),
            ("lambda4".to_string(), p.lambda4),
            ("Re_lambda5".to_string(), p.re_lambda5),
            ("Re_m12sq".to_string(), p.m12_sq),
            ("tanbeta".to_string(), p.tan_beta),
            ("type".to_string(), p.yukawa.as_i64() as f64),
            ("m11sq".to_string(), self.u1),
            ("m22sq".to_string(), self.u2),
        ]
    }

    fn set_curvature(&self, tensors: &mut ModelTensors) -> BsmptResult<()> {
        tensors.higgs.clear();
        write_quadratic(&mut tensors.higgs, self.u1, self.u2, self.params.m12_sq);
        write_quartic(&mut tensors.higgs, self.quartics());

        let sm = &self.sm;
        let (g, g_prime) = (sm.g(), sm.g_prime());
        doublet::add_gauge(&mut tensors.gauge, PHI1, g, g_prime);
        doublet::add_gauge(&mut tensors.gauge, PHI2, g, g_prime);

        let ckm = sm.ckm();
        let yukawa = self.params.yukawa;
        let (v_down, v_lepton) = self.fermion_vevs();
        let down = if yukawa.down_on_phi2() { PHI2 } else { PHI1 };
        let lepton = if yukawa.leptons_on_phi2() { PHI2 } else { PHI1 };
        doublet::add_up_quarks(&mut tensors.quark, PHI2, self.v2(), sm.up_masses(), &ckm);
        doublet::add_down_quarks(&mut tensors.quark, down, v_down, sm.down_masses(), &ckm);
        doublet::add_leptons(&mut tensors.lepton, lepton, v_lepton, sm.lepton_masses());
        log::debug!(
            "R2HDM type {}: m11² = {:.6e}, m22² = {:.6e}",
            yukawa.as_i64(),
            self.u1,
            self.u2
        );
        Ok(())
    }

    fn mixing_layout(&self) -> BsmptResult<MixingLayout> {
        let mut cp_even =
            MixingBlock::new("CP-even", &[4, 6], &["h", "H"]).with_signs(&[Some(4), Some(6)]);
        if self.identify_sm_like {
            cp_even = cp_even.with_sm_like(SmLikeRule {
                mass: self.sm.mass_higgs,
                label: "h".to_string(),
                others: vec!["H".to_string()],
            });
        }
        MixingLayout::new(
            N_HIGGS,
            vec![
                MixingBlock::new("charged+", &[0, 2], &["G^+", "H^+"])
                    .with_goldstone()
                    .with_signs(&[Some(0), Some(2)]),
                MixingBlock::new("charged-", &[1, 3], &["G^-", "H^-"])
                    .with_goldstone()
                    .with_signs(&[Some(1), Some(3)]),
                MixingBlock::new("CP-odd", &[5, 7], &["G^0", "A"])
                    .with_goldstone()
                    .with_signs(&[Some(5), Some(7)]),
                cp_even,
            ],
            &["G^+", "G^-", "H^+", "H^-", "G^0", "A", "h", "H"],
        )
    }

    /// Leading T² masses from the high-temperature expansion.
    fn debye_simplified(&self) -> Option<DebyeCorrections> {
        let sm = &self.sm;
        let p = &self.params;
        let (g, gp) = (sm.g(), sm.g_prime());
        let sqrt2 = std::f64::consts::SQRT_2;
        let cb = if p.yukawa.down_on_phi2() {
            sqrt2 * sm.mass_bottom / self.v2()
        } else {
            sqrt2 * sm.mass_bottom / self.v1()
        };
        let ct = sqrt2 * sm.mass_top / self.v2();
        let gauge_part = 3.0 * (3.0 * g * g + gp * gp);
        let mut c1 = (12.0 * p.lambda1 + 8.0 * p.lambda3 + 4.0 * p.lambda4 + gauge_part) / 48.0;
        let mut c2 =
            (12.0 * p.lambda2 + 8.0 * p.lambda3 + 4.0 * p.lambda4 + gauge_part + 12.0 * ct * ct)
                / 48.0;
        if p.yukawa.down_on_phi2() {
            c2 += 12.0 / 48.0 * cb * cb;
        } else {
            c1 += 12.0 / 48.0 * cb * cb;
        }
        Some(DebyeCorrections::from_diagonals(
            &[c1, c1, c2, c2, c1, c1, c2, c2],
            &[2.0 * g * g, 2.0 * g * g, 2.0 * g * g, 2.0 * gp * gp],
        ))
    }
}
