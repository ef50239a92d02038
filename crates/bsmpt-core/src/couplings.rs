// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Physical Couplings
// Mirrors: src/models/ClassPotentialOrigin.cpp
// ─────────────────────────────────────────────────────────────────────
//! Field-dependent masses and mass-basis couplings of every species
//! at one field point.
//!
//! For each species the squared-mass matrix is diagonalised and its
//! first (Λ³) and second (Λ⁴) field derivatives are rotated into the
//! mass basis. All scalar indices are rotated with the scalar rotation
//! matrix too, so the one-loop derivatives are computed in the scalar
//! mass basis and rotated back at the end.
//!
//! Complex fermion matrices enter through their real 2n×2n embedding:
//! every mass appears twice and every trace is twice the real part of
//! the complex one. The species weights compensate for that.

use num_complex::Complex64;

use bsmpt_types::{BsmptResult, EngineConfig, MassSpectrum};

use crate::spectral::{hermitian_embedding, symmetric_eigen};
use crate::tensors::{ModelTensors, YukawaCurvature};

/// Particle species running in the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Species {
    Higgs,
    Gauge,
    Quark,
    Lepton,
}

impl Species {
    pub const ALL: [Species; 4] = [Species::Higgs, Species::Gauge, Species::Quark, Species::Lepton];

    /// CW scheme constant.
    pub fn cb(self, config: &EngineConfig) -> f64 {
        match self {
            Species::Higgs => config.cb_higgs,
            Species::Gauge => config.cb_gauge,
            Species::Quark | Species::Lepton => config.cb_fermion,
        }
    }

    /// Weight of a single-state loop relative to ½ per real scalar,
    /// already halved for the doubled fermion embedding.
    pub fn weight(self, config: &EngineConfig) -> f64 {
        match self {
            Species::Higgs => 0.5,
            Species::Gauge => 1.5,
            Species::Quark => -(config.n_colour as f64) / 2.0,
            Species::Lepton => -0.5,
        }
    }
}

/// Rotate one axis of a flat tensor: t'[.., p, ..] = Σ_q R[p][q] t[.., q, ..].
pub(crate) fn rotate_axis(data: &[f64], dims: &[usize], axis: usize, r: &[f64]) -> Vec<f64> {
    let outer: usize = dims[..axis].iter().product();
    let mid = dims[axis];
    let inner: usize = dims[axis + 1..].iter().product();
    let mut out = vec![0.0; data.len()];
    for o in 0..outer {
        for p in 0..mid {
            for q in 0..mid {
                let w = r[p * mid + q];
                if w == 0.0 {
                    continue;
                }
                let src = (o * mid + q) * inner;
                let dst = (o * mid + p) * inner;
                for k in 0..inner {
                    out[dst + k] += w * data[src + k];
                }
            }
        }
    }
    out
}

/// Mass-basis data for one species.
#[derive(Debug, Clone)]
pub struct SpeciesCouplings {
    pub species: Species,
    pub n_states: usize,
    pub n_higgs: usize,
    /// Squared masses, ascending, small values set to zero.
    pub masses: Vec<f64>,
    /// ∂M²_ab/∂φ_i in the mass basis, `[a][b][i]`.
    pub triple: Vec<f64>,
    /// ∂²M²_ab/∂φ_i∂φ_j in the mass basis, `[a][b][i][j]`.
    pub quartic: Vec<f64>,
}

impl SpeciesCouplings {
    #[inline]
    pub fn c21(&self, a: usize, b: usize, i: usize) -> f64 {
        self.triple[(a * self.n_states + b) * self.n_higgs + i]
    }

    #[inline]
    pub fn c22(&self, a: usize, b: usize, i: usize, j: usize) -> f64 {
        self.quartic[((a * self.n_states + b) * self.n_higgs + i) * self.n_higgs + j]
    }
}

/// Masses and mass-basis couplings at one field point.
#[derive(Debug, Clone)]
pub struct PhysicalCouplings {
    pub n_higgs: usize,
    /// Scalar rotation, mass eigenstates as rows.
    pub higgs_rotation: Vec<f64>,
    pub higgs: SpeciesCouplings,
    pub gauge: SpeciesCouplings,
    pub quark: SpeciesCouplings,
    pub lepton: SpeciesCouplings,
}

fn zero_small(values: &mut [f64], threshold: f64) {
    for v in values.iter_mut() {
        if v.abs() < threshold {
            *v = 0.0;
        }
    }
}

impl PhysicalCouplings {
    /// Diagonalise all tree-level mass matrices at `point` (T = 0).
    pub fn compute(
        tensors: &ModelTensors,
        point: &[f64],
        config: &EngineConfig,
    ) -> BsmptResult<Self> {
        let nh = tensors.n_higgs();

        // Scalars
        let hessian = tensors.higgs.hessian(point)?;
        let eig = symmetric_eigen(&hessian, nh)?;
        let mut higgs_masses = eig.values.clone();
        zero_small(&mut higgs_masses, config.zero_mass_threshold);
        let mut hr = eig.rotation_rows();
        zero_small(&mut hr, config.numerical_zero);

        // L3 + L4·φ
        let mut triple = tensors.higgs.third(point)?;
        for axis in 0..3 {
            triple = rotate_axis(&triple, &[nh, nh, nh], axis, &hr);
        }
        let mut quartic = tensors.higgs.l4_data().to_vec();
        for axis in 0..4 {
            quartic = rotate_axis(&quartic, &[nh, nh, nh, nh], axis, &hr);
        }
        let higgs = SpeciesCouplings {
            species: Species::Higgs,
            n_states: nh,
            n_higgs: nh,
            masses: higgs_masses,
            triple,
            quartic,
        };

        // Gauge bosons
        let ng = tensors.gauge.n_gauge();
        let gauge_eig = symmetric_eigen(&tensors.gauge.mass_matrix(point), ng)?;
        let mut gauge_masses = gauge_eig.values.clone();
        zero_small(&mut gauge_masses, config.zero_mass_threshold);
        let mut gr = gauge_eig.rotation_rows();
        zero_small(&mut gr, config.numerical_zero);

        let dims3 = [ng, ng, nh];
        let mut triple = tensors.gauge.cubic(point);
        triple = rotate_axis(&triple, &dims3, 0, &gr);
        triple = rotate_axis(&triple, &dims3, 1, &gr);
        triple = rotate_axis(&triple, &dims3, 2, &hr);
        let dims4 = [ng, ng, nh, nh];
        let mut quartic = tensors.gauge.data().to_vec();
        quartic = rotate_axis(&quartic, &dims4, 0, &gr);
        quartic = rotate_axis(&quartic, &dims4, 1, &gr);
        quartic = rotate_axis(&quartic, &dims4, 2, &hr);
        quartic = rotate_axis(&quartic, &dims4, 3, &hr);
        let gauge = SpeciesCouplings {
            species: Species::Gauge,
            n_states: ng,
            n_higgs: nh,
            masses: gauge_masses,
            triple,
            quartic,
        };

        let quark = fermion_couplings(Species::Quark, &tensors.quark, point, &hr, config)?;
        let lepton = fermion_couplings(Species::Lepton, &tensors.lepton, point, &hr, config)?;

        Ok(Self {
            n_higgs: nh,
            higgs_rotation: hr,
            higgs,
            gauge,
            quark,
            lepton,
        })
    }

    pub fn species(&self, species: Species) -> &SpeciesCouplings {
        match species {
            Species::Higgs => &self.higgs,
            Species::Gauge => &self.gauge,
            Species::Quark => &self.quark,
            Species::Lepton => &self.lepton,
        }
    }

    /// Squared masses of every species; fermion doublets collapsed.
    pub fn spectrum(&self) -> MassSpectrum {
        MassSpectrum {
            higgs: self.higgs.masses.clone(),
            gauge: self.gauge.masses.clone(),
            quark: self.quark.masses.iter().step_by(2).copied().collect(),
            lepton: self.lepton.masses.iter().step_by(2).copied().collect(),
        }
    }
}

/// Embedded (2n×2n) mass-basis couplings of a fermion species.
fn fermion_couplings(
    species: Species,
    yukawa: &YukawaCurvature,
    point: &[f64],
    hr: &[f64],
    config: &EngineConfig,
) -> BsmptResult<SpeciesCouplings> {
    let nf = yukawa.n_fermion();
    let nh = point.len();
    let ne = 2 * nf;
    let zero = Complex64::new(0.0, 0.0);

    let squared = yukawa.squared_mass_matrix(point);
    let eig = symmetric_eigen(&hermitian_embedding(&squared, nf), ne)?;
    let mut masses = eig.values.clone();
    zero_small(&mut masses, config.fermion_zero_threshold);
    let ur = eig.rotation_rows();

    let m = yukawa.mass_matrix(point);

    // Λ³[i][j][k] = Σ_l conj(Y_ilk) M_lj + conj(M_il) Y_ljk
    let mut triple = vec![0.0; ne * ne * nh];
    let mut block = vec![zero; nf * nf];
    for k in 0..nh {
        for i in 0..nf {
            for j in 0..nf {
                block[i * nf + j] = (0..nf)
                    .map(|l| {
                        yukawa.get(i, l, k).conj() * m[l * nf + j]
                            + m[i * nf + l].conj() * yukawa.get(l, j, k)
                    })
                    .sum();
            }
        }
        let emb = hermitian_embedding(&block, nf);
        for (pq, value) in emb.iter().enumerate() {
            triple[pq * nh + k] = *value;
        }
    }

    // Λ⁴[i][j][k][n] = Σ_l conj(Y_ilk) Y_ljn + conj(Y_iln) Y_ljk
    let mut quartic = vec![0.0; ne * ne * nh * nh];
    for k in 0..nh {
        for n in 0..nh {
            for i in 0..nf {
                for j in 0..nf {
                    block[i * nf + j] = (0..nf)
                        .map(|l| {
                            yukawa.get(i, l, k).conj() * yukawa.get(l, j, n)
                                + yukawa.get(i, l, n).conj() * yukawa.get(l, j, k)
                        })
                        .sum();
                }
            }
            let emb = hermitian_embedding(&block, nf);
            for (pq, value) in emb.iter().enumerate() {
                quartic[(pq * nh + k) * nh + n] = *value;
            }
        }
    }

    let dims3 = [ne, ne, nh];
    triple = rotate_axis(&triple, &dims3, 0, &ur);
    triple = rotate_axis(&triple, &dims3, 1, &ur);
    triple = rotate_axis(&triple, &dims3, 2, hr);
    let dims4 = [ne, ne, nh, nh];
    quartic = rotate_axis(&quartic, &dims4, 0, &ur);
    quartic = rotate_axis(&quartic, &dims4, 1, &ur);
    quartic = rotate_axis(&quartic, &dims4, 2, hr);
    quartic = rotate_axis(&quartic, &dims4, 3, hr);

    Ok(SpeciesCouplings {
        species,
        n_states: ne,
        n_higgs: nh,
        masses,
        triple,
        quartic,
    })
}
