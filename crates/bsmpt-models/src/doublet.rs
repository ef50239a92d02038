// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Doublet Tensor Builders
// Mirrors: src/models/ClassPotentialSM.cpp + ClassPotentialR2HDM.cpp
// ─────────────────────────────────────────────────────────────────────
//! Gauge and Yukawa curvature entries contributed by one SU(2) doublet
//!
//!   Φ = ((ρ + iη)/√2, (ζ + iψ)/√2)ᵀ
//!
//! written into the model's field basis.
//!
//! Fermion basis (quarks, 12 states):
//!   0..2 = u_R c_R t_R, 3..5 = d_R s_R b_R,
//!   6..8 = u_L c_L t_L, 9..11 = d_L s_L b_L.
//! Leptons (9 states): (e_R, e_L, μ_R, μ_L, τ_R, τ_L, ν_e, ν_μ, ν_τ).

use num_complex::Complex64;

use bsmpt_core::{GaugeCurvature, YukawaCurvature};

pub const N_QUARKS: usize = 12;
pub const N_LEPTONS: usize = 9;

const UP_R: usize = 0;
const DOWN_R: usize = 3;
const UP_L: usize = 6;
const DOWN_L: usize = 9;
const NEUTRINO: usize = 6;

const I: Complex64 = Complex64::new(0.0, 1.0);

/// Field indices of the four real components of a doublet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Doublet {
    /// Re of the charged component.
    pub rho: usize,
    /// Im of the charged component.
    pub eta: usize,
    /// Re of the neutral component (carries the VEV).
    pub zeta: usize,
    /// Im of the neutral component.
    pub psi: usize,
}

impl Doublet {
    pub const fn new(rho: usize, eta: usize, zeta: usize, psi: usize) -> Self {
        Self {
            rho,
            eta,
            zeta,
            psi,
        }
    }

    pub fn fields(&self) -> [usize; 4] {
        [self.rho, self.eta, self.zeta, self.psi]
    }
}

/// SU(2)×U(1) couplings G2H2 of the doublet: g²/2 on the W directions,
/// g'²/2 on B, and the ±gg'/2 W³-B mixing.
pub fn add_gauge(gauge: &mut GaugeCurvature, d: Doublet, g: f64, g_prime: f64) {
    let (ww, bb, wb) = (g * g / 2.0, g_prime * g_prime / 2.0, g * g_prime / 2.0);
    for f in d.fields() {
        for a in 0..3 {
            gauge.set(a, a, f, f, ww);
        }
        gauge.set(3, 3, f, f, bb);
    }
    gauge.set(0, 3, d.rho, d.zeta, wb);
    gauge.set(0, 3, d.eta, d.psi, wb);
    gauge.set(1, 3, d.rho, d.psi, wb);
    gauge.set(1, 3, d.eta, d.zeta, -wb);
    gauge.set(2, 3, d.rho, d.rho, wb);
    gauge.set(2, 3, d.eta, d.eta, wb);
    gauge.set(2, 3, d.zeta, d.zeta, -wb);
    gauge.set(2, 3, d.psi, d.psi, -wb);
}

/// Up-type Yukawas of a doublet with VEV `v`. `ckm` is V[up][down].
pub fn add_up_quarks(
    quark: &mut YukawaCurvature,
    d: Doublet,
    v: f64,
    masses: [f64; 3],
    ckm: &[[Complex64; 3]; 3],
) {
    for (i, m) in masses.into_iter().enumerate() {
        let y = Complex64::new(m / v, 0.0);
        quark.set(UP_R + i, UP_L + i, d.zeta, y);
        quark.set(UP_R + i, UP_L + i, d.psi, -I * y);
        for (j, vij) in ckm[i].iter().enumerate() {
            let r = -vij.conj() * y;
            quark.set(UP_R + i, DOWN_L + j, d.rho, r);
            quark.set(UP_R + i, DOWN_L + j, d.eta, -I * r);
        }
    }
}

/// Down-type Yukawas of a doublet with VEV `v`.
pub fn add_down_quarks(
    quark: &mut YukawaCurvature,
    d: Doublet,
    v: f64,
    masses: [f64; 3],
    ckm: &[[Complex64; 3]; 3],
) {
    for (j, m) in masses.into_iter().enumerate() {
        let y = Complex64::new(m / v, 0.0);
        quark.set(DOWN_R + j, DOWN_L + j, d.zeta, y);
        quark.set(DOWN_R + j, DOWN_L + j, d.psi, I * y);
        for (i, row) in ckm.iter().enumerate() {
            let r = row[j] * y;
            quark.set(DOWN_R + j, UP_L + i, d.rho, r);
            quark.set(DOWN_R + j, UP_L + i, d.eta, I * r);
        }
    }
}

/// Charged-lepton Yukawas of a doublet with VEV `v`; neutrinos stay
/// massless.
pub fn add_leptons(lepton: &mut YukawaCurvature, d: Doublet, v: f64, masses: [f64; 3]) {
    for (g, m) in masses.into_iter().enumerate() {
        let y = Complex64::new(m / v, 0.0);
        let (right, left) = (2 * g, 2 * g + 1);
        lepton.set(right, left, d.zeta, y);
        lepton.set(right, left, d.psi, I * y);
        lepton.set(left, NEUTRINO + g, d.rho, y);
        lepton.set(left, NEUTRINO + g, d.eta, I * y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bsmpt_core::spectral::hermitian_eigenvalues;
    use bsmpt_types::SmConstants;

    const SM_DOUBLET: Doublet = Doublet::new(0, 1, 2, 3);

    fn vacuum(v: f64) -> Vec<f64> {
        vec![0.0, 0.0, v, 0.0]
    }

    #[test]
    fn test_gauge_masses_of_single_doublet() {
        let sm = SmConstants::default();
        let mut gauge = GaugeCurvature::new(4, 4);
        add_gauge(&mut gauge, SM_DOUBLET, sm.g(), sm.g_prime());
        let m2 = gauge.mass_matrix(&vacuum(sm.vev0()));
        // W¹, W² decouple; W³-B has a zero eigenvalue (photon)
        assert!((m2[0] - sm.mass_w.powi(2)).abs() < 1e-8);
        assert!((m2[5] - sm.mass_w.powi(2)).abs() < 1e-8);
        let (a, b, c) = (m2[10], m2[11], m2[15]);
        assert!((a * c - b * b).abs() < 1e-6 * a * c);
        assert!((a + c - sm.mass_z.powi(2)).abs() < 1e-8);
    }

    #[test]
    fn test_gauge_symmetry() {
        let mut gauge = GaugeCurvature::new(4, 4);
        add_gauge(&mut gauge, SM_DOUBLET, 0.65, 0.35);
        assert_eq!(gauge.get(1, 3, 1, 2), gauge.get(3, 1, 2, 1));
        assert!(gauge.get(1, 3, 1, 2) < 0.0);
        assert!(gauge.get(2, 3, 3, 3) < 0.0);
    }

    #[test]
    fn test_quark_masses_appear_twice() {
        let sm = SmConstants::default();
        let v = sm.vev0();
        let mut quark = YukawaCurvature::new(N_QUARKS, 4);
        add_up_quarks(&mut quark, SM_DOUBLET, v, sm.up_masses(), &sm.ckm());
        add_down_quarks(&mut quark, SM_DOUBLET, v, sm.down_masses(), &sm.ckm());
        let mut got = hermitian_eigenvalues(&quark.squared_mass_matrix(&vacuum(v)), N_QUARKS)
            .unwrap();
        got.sort_by(f64::total_cmp);
        let mut expected: Vec<f64> = sm
            .up_masses()
            .into_iter()
            .chain(sm.down_masses())
            .flat_map(|m| [m * m, m * m])
            .collect();
        expected.sort_by(f64::total_cmp);
        for (g, e) in got.iter().zip(&expected) {
            assert!((g - e).abs() < 1e-6 * e.max(1.0), "{g} vs {e}");
        }
    }

    #[test]
    fn test_neutrinos_massless() {
        let sm = SmConstants::default();
        let v = sm.vev0();
        let mut lepton = YukawaCurvature::new(N_LEPTONS, 4);
        add_leptons(&mut lepton, SM_DOUBLET, v, sm.lepton_masses());
        let mut got =
            hermitian_eigenvalues(&lepton.squared_mass_matrix(&vacuum(v)), N_LEPTONS).unwrap();
        got.sort_by(f64::total_cmp);
        assert!(got[..3].iter().all(|m| m.abs() < 1e-14));
        let tau2 = sm.mass_tau.powi(2);
        assert!((got[8] - tau2).abs() < 1e-10);
        assert!((got[7] - tau2).abs() < 1e-10);
    }

    #[test]
    fn test_charged_yukawa_is_mirrored() {
        let sm = SmConstants::default();
        let mut quark = YukawaCurvature::new(N_QUARKS, 4);
        add_up_quarks(&mut quark, SM_DOUBLET, 246.0, sm.up_masses(), &sm.ckm());
        assert_eq!(quark.get(2, 11, 0), quark.get(11, 2, 0));
        assert_eq!(quark.get(2, 11, 1), -I * quark.get(2, 11, 0));
    }
}
