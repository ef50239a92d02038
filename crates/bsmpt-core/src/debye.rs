// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Debye Masses
// Mirrors: src/models/ClassPotentialOrigin.cpp
// ─────────────────────────────────────────────────────────────────────
//! Leading thermal (T²) corrections to the scalar and gauge mass
//! matrices. Computed from the curvature tensors unless the model
//! supplies closed forms.

use crate::tensors::{CurvatureTensors, GaugeCurvature, YukawaCurvature};

/// Entries with |x| at or below this are dropped.
const DEBYE_ZERO: f64 = 1e-5;

#[derive(Debug, Clone, PartialEq)]
pub struct DebyeCorrections {
    n_higgs: usize,
    n_gauge: usize,
    /// n_higgs × n_higgs, coefficient of T².
    pub higgs: Vec<f64>,
    /// n_gauge × n_gauge, coefficient of T².
    pub gauge: Vec<f64>,
}

impl DebyeCorrections {
    pub fn zero(n_higgs: usize, n_gauge: usize) -> Self {
        Self {
            n_higgs,
            n_gauge,
            higgs: vec![0.0; n_higgs * n_higgs],
            gauge: vec![0.0; n_gauge * n_gauge],
        }
    }

    /// Diagonal closed forms, as models with simple spectra provide them.
    pub fn from_diagonals(higgs: &[f64], gauge: &[f64]) -> Self {
        let mut out = Self::zero(higgs.len(), gauge.len());
        for (i, &h) in higgs.iter().enumerate() {
            out.higgs[i * out.n_higgs + i] = h;
        }
        for (a, &g) in gauge.iter().enumerate() {
            out.gauge[a * out.n_gauge + a] = g;
        }
        out
    }

    /// Generic one-loop Debye masses from the tensors.
    pub fn from_tensors(
        higgs: &CurvatureTensors,
        gauge: &GaugeCurvature,
        quark: &YukawaCurvature,
        lepton: &YukawaCurvature,
    ) -> Self {
        let nh = higgs.n();
        let ng = gauge.n_gauge();
        let mut out = Self::zero(nh, ng);

        let fermion_sum = |y: &YukawaCurvature, i: usize, j: usize| -> f64 {
            let nf = y.n_fermion();
            let mut sum = 0.0;
            for a in 0..nf {
                for b in 0..nf {
                    let (yi, yj) = (y.get(a, b, i), y.get(a, b, j));
                    sum += 0.5 * (yj.conj() * yi + yi.conj() * yj).re;
                }
            }
            sum
        };

        for i in 0..nh {
            for j in i..nh {
                let mut value = 0.0;
                for k in 0..nh {
                    value += higgs.l4(i, j, k, k) / 24.0;
                }
                for a in 0..ng {
                    value += 3.0 * gauge.get(a, a, i, j) / 24.0;
                }
                value += 6.0 / 24.0 * fermion_sum(quark, i, j);
                value += 2.0 / 24.0 * fermion_sum(lepton, i, j);
                if value.abs() <= DEBYE_ZERO {
                    value = 0.0;
                }
                out.higgs[i * nh + j] = value;
                out.higgs[j * nh + i] = value;
            }
        }

        // Scalars coupling to the first gauge boson.
        let n_gauge_higgs = (0..nh).filter(|&i| gauge.get(0, 0, i, i) != 0.0).count();
        if n_gauge_higgs > 0 {
            let count = n_gauge_higgs as f64;
            for a in 0..ng {
                let trace: f64 = (0..nh).map(|k| gauge.get(a, a, k, k)).sum();
                let value = 2.0 / 3.0 * (count / 8.0 + 5.0) * trace / count;
                out.gauge[a * ng + a] = if value.abs() <= DEBYE_ZERO { 0.0 } else { value };
            }
        }
        out
    }

    pub fn higgs_entry(&self, i: usize, j: usize) -> f64 {
        self.higgs[i * self.n_higgs + j]
    }

    pub fn gauge_entry(&self, a: usize, b: usize) -> f64 {
        self.gauge[a * self.n_gauge + b]
    }
}
