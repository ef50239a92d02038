// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Standard-Model Input Parameters
// Mirrors: src/models/SMparam.h
// ─────────────────────────────────────────────────────────────────────
//! Measured SM inputs and the quantities derived from them.
//!
//! Masses in GeV, Fermi constant in GeV⁻². The CKM matrix is built from
//! the Wolfenstein parameters through the standard parametrisation.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{BsmptError, BsmptResult};

/// Standard-Model input parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmConstants {
    pub mass_w: f64,
    pub mass_z: f64,
    pub mass_higgs: f64,
    pub mass_up: f64,
    pub mass_down: f64,
    pub mass_strange: f64,
    pub mass_charm: f64,
    pub mass_bottom: f64,
    pub mass_top: f64,
    pub mass_electron: f64,
    pub mass_muon: f64,
    pub mass_tau: f64,
    /// Fermi constant.
    pub g_fermi: f64,
    pub wolfenstein_lambda: f64,
    pub wolfenstein_a: f64,
    pub wolfenstein_rho: f64,
    pub wolfenstein_eta: f64,
}

impl Default for SmConstants {
    fn default() -> Self {
        Self {
            mass_w: 80.385,
            mass_z: 91.1876,
            mass_higgs: 125.09,
            mass_up: 0.1,
            mass_down: 0.1,
            mass_strange: 0.1,
            mass_charm: 1.51,
            mass_bottom: 4.92,
            mass_top: 172.5,
            mass_electron: 0.510998928e-3,
            mass_muon: 0.1056583715,
            mass_tau: 1.77682,
            g_fermi: 1.1663787e-5,
            wolfenstein_lambda: 0.22537,
            wolfenstein_a: 0.814,
            wolfenstein_rho: 0.117,
            wolfenstein_eta: 0.353,
        }
    }
}

impl SmConstants {
    pub fn validate(&self) -> BsmptResult<()> {
        let masses = [
            ("mass_w", self.mass_w),
            ("mass_z", self.mass_z),
            ("mass_higgs", self.mass_higgs),
            ("mass_top", self.mass_top),
            ("g_fermi", self.g_fermi),
        ];
        for (name, value) in masses {
            if !(value.is_finite() && value > 0.0) {
                return Err(BsmptError::Config(format!(
                    "{name} must be finite and > 0, got {value}"
                )));
            }
        }
        if self.mass_z <= self.mass_w {
            return Err(BsmptError::Config(format!(
                "mass_z must exceed mass_w, got {} <= {}",
                self.mass_z, self.mass_w
            )));
        }
        Ok(())
    }

    /// Electroweak VEV v0 = (√2 G_F)^(-1/2) ≈ 246.22 GeV.
    pub fn vev0(&self) -> f64 {
        (1.0 / std::f64::consts::SQRT_2 / self.g_fermi).sqrt()
    }

    /// SU(2)_L coupling g = 2 m_W / v0.
    pub fn g(&self) -> f64 {
        2.0 * self.mass_w / self.vev0()
    }

    /// U(1)_Y coupling g' = 2 √(m_Z² - m_W²) / v0.
    pub fn g_prime(&self) -> f64 {
        2.0 * (self.mass_z.powi(2) - self.mass_w.powi(2)).sqrt() / self.vev0()
    }

    pub fn sin2_weinberg(&self) -> f64 {
        1.0 - self.mass_w.powi(2) / self.mass_z.powi(2)
    }

    /// SM triple Higgs coupling 3 m_H² / v0.
    pub fn sm_triple_higgs(&self) -> f64 {
        3.0 * self.mass_higgs.powi(2) / self.vev0()
    }

    /// Up-type quark masses (u, c, t).
    pub fn up_masses(&self) -> [f64; 3] {
        [self.mass_up, self.mass_charm, self.mass_top]
    }

    /// Down-type quark masses (d, s, b).
    pub fn down_masses(&self) -> [f64; 3] {
        [self.mass_down, self.mass_strange, self.mass_bottom]
    }

    /// Charged lepton masses (e, μ, τ).
    pub fn lepton_masses(&self) -> [f64; 3] {
        [self.mass_electron, self.mass_muon, self.mass_tau]
    }

    /// CKM matrix V[up][down] in the standard parametrisation.
    pub fn ckm(&self) -> [[Complex64; 3]; 3] {
        let lambda = self.wolfenstein_lambda;
        let a = self.wolfenstein_a;
        let rho_eta = Complex64::new(self.wolfenstein_rho, self.wolfenstein_eta);
        let ub = rho_eta * (a * lambda.powi(3));

        let theta12 = lambda.asin();
        let theta23 = (a * lambda.powi(2)).asin();
        let theta13 = ub.norm().asin();
        let delta = ub.arg();

        let (s12, c12) = theta12.sin_cos();
        let (s23, c23) = theta23.sin_cos();
        let (s13, c13) = theta13.sin_cos();
        let phase = Complex64::from_polar(1.0, delta);
        let re = |x: f64| Complex64::new(x, 0.0);

        [
            [re(c12 * c13), re(s12 * c13), phase.conj() * s13],
            [
                re(-s12 * c23) - phase * (c12 * s23 * s13),
                re(c12 * c23) - phase * (s12 * s23 * s13),
                re(s23 * c13),
            ],
            [
                re(s12 * s23) - phase * (c12 * c23 * s13),
                re(-c12 * s23) - phase * (s12 * c23 * s13),
                re(c23 * c13),
            ],
        ]
    }
}
