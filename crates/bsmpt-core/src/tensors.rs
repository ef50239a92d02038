// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Curvature Tensor Store
// Mirrors: include/BSMPT/models/ClassPotentialOrigin.h
// ─────────────────────────────────────────────────────────────────────
//! Taylor coefficients of the scalar potential in the gauge basis,
//!
//!   V(φ) = L1·φ + ½ L2·φφ + ⅙ L3·φφφ + 1/24 L4·φφφφ,
//!
//! plus the gauge-scalar (G2H2) and fermion-scalar (F2H1) couplings.
//!
//! Storage is flat row-major. Setters take one canonical index tuple
//! and write every permutation of it, so a model only ever lists the
//! independent entries.

use num_complex::Complex64;

use bsmpt_types::{BsmptError, BsmptResult};

use crate::debye::DebyeCorrections;

/// Contract the last index of a rank-r tensor with `phi`.
fn contract_last(data: &[f64], n: usize, phi: &[f64]) -> Vec<f64> {
    data.chunks_exact(n)
        .map(|row| row.iter().zip(phi).map(|(t, p)| t * p).sum())
        .collect()
}

/// Every ordering of `idx`, duplicates included (24 for rank 4).
fn permutations<const R: usize>(idx: [usize; R]) -> Vec<[usize; R]> {
    fn heap<const R: usize>(k: usize, a: &mut [usize; R], out: &mut Vec<[usize; R]>) {
        if k <= 1 {
            out.push(*a);
            return;
        }
        heap(k - 1, a, out);
        for i in 0..k - 1 {
            if k % 2 == 0 {
                a.swap(i, k - 1);
            } else {
                a.swap(0, k - 1);
            }
            heap(k - 1, a, out);
        }
    }
    let mut a = idx;
    let mut out = Vec::with_capacity(24);
    heap(R, &mut a, &mut out);
    out
}

/// Rank-1 to rank-4 scalar curvature tensors for `n` fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CurvatureTensors {
    n: usize,
    l1: Vec<f64>,
    l2: Vec<f64>,
    l3: Vec<f64>,
    l4: Vec<f64>,
}

impl CurvatureTensors {
    pub fn new(n: usize) -> Self {
        Self {
            n,
            l1: vec![0.0; n],
            l2: vec![0.0; n * n],
            l3: vec![0.0; n * n * n],
            l4: vec![0.0; n * n * n * n],
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn clear(&mut self) {
        for t in [&mut self.l1, &mut self.l2, &mut self.l3, &mut self.l4] {
            t.iter_mut().for_each(|x| *x = 0.0);
        }
    }

    fn flat(&self, idx: &[usize]) -> usize {
        idx.iter().fold(0, |acc, &i| acc * self.n + i)
    }

    pub fn set_l1(&mut self, i: usize, value: f64) {
        self.l1[i] = value;
    }

    pub fn set_l2(&mut self, i: usize, j: usize, value: f64) {
        let n = self.n;
        self.l2[i * n + j] = value;
        self.l2[j * n + i] = value;
    }

    pub fn set_l3(&mut self, idx: [usize; 3], value: f64) {
        for p in permutations(idx) {
            let k = self.flat(&p);
            self.l3[k] = value;
        }
    }

    pub fn set_l4(&mut self, idx: [usize; 4], value: f64) {
        for p in permutations(idx) {
            let k = self.flat(&p);
            self.l4[k] = value;
        }
    }

    pub fn l1(&self, i: usize) -> f64 {
        self.l1[i]
    }

    pub fn l2(&self, i: usize, j: usize) -> f64 {
        self.l2[i * self.n + j]
    }

    pub fn l3(&self, i: usize, j: usize, k: usize) -> f64 {
        self.l3[self.flat(&[i, j, k])]
    }

    pub fn l4(&self, i: usize, j: usize, k: usize, l: usize) -> f64 {
        self.l4[self.flat(&[i, j, k, l])]
    }

    pub fn l4_data(&self) -> &[f64] {
        &self.l4
    }

    fn check_point(&self, phi: &[f64]) -> BsmptResult<()> {
        BsmptError::check_len("field point", phi.len(), self.n)
    }

    /// V(φ).
    pub fn value(&self, phi: &[f64]) -> BsmptResult<f64> {
        self.check_point(phi)?;
        let n = self.n;
        let dot = |a: &[f64]| -> f64 { a.iter().zip(phi).map(|(x, p)| x * p).sum() };

        let l4_3 = contract_last(&self.l4, n, phi);
        let l4_2 = contract_last(&l4_3, n, phi);
        let l4_1 = contract_last(&l4_2, n, phi);
        let l3_2 = contract_last(&self.l3, n, phi);
        let l3_1 = contract_last(&l3_2, n, phi);
        let l2_1 = contract_last(&self.l2, n, phi);

        Ok(dot(&self.l1) + 0.5 * dot(&l2_1) + dot(&l3_1) / 6.0 + dot(&l4_1) / 24.0)
    }

    /// ∂V/∂φ_i = L1 + L2·φ + ½ L3·φφ + ⅙ L4·φφφ.
    pub fn gradient(&self, phi: &[f64]) -> BsmptResult<Vec<f64>> {
        self.check_point(phi)?;
        let n = self.n;
        let l4_3 = contract_last(&self.l4, n, phi);
        let l4_2 = contract_last(&l4_3, n, phi);
        let l4_1 = contract_last(&l4_2, n, phi);
        let l3_2 = contract_last(&self.l3, n, phi);
        let l3_1 = contract_last(&l3_2, n, phi);
        let l2_1 = contract_last(&self.l2, n, phi);

        Ok((0..n)
            .map(|i| self.l1[i] + l2_1[i] + 0.5 * l3_1[i] + l4_1[i] / 6.0)
            .collect())
    }

    /// ∂²V/∂φ_i∂φ_j = L2 + L3·φ + ½ L4·φφ.
    pub fn hessian(&self, phi: &[f64]) -> BsmptResult<Vec<f64>> {
        self.check_point(phi)?;
        let n = self.n;
        let l4_3 = contract_last(&self.l4, n, phi);
        let l4_2 = contract_last(&l4_3, n, phi);
        let l3_2 = contract_last(&self.l3, n, phi);

        Ok((0..n * n)
            .map(|ij| self.l2[ij] + l3_2[ij] + 0.5 * l4_2[ij])
            .collect())
    }

    /// ∂³V/∂φ_i∂φ_j∂φ_k = L3 + L4·φ.
    pub fn third(&self, phi: &[f64]) -> BsmptResult<Vec<f64>> {
        self.check_point(phi)?;
        let l4_3 = contract_last(&self.l4, self.n, phi);
        Ok(self.l3.iter().zip(&l4_3).map(|(a, b)| a + b).collect())
    }

    /// Largest |T[p] - T[σ(p)]| over all tensors and index permutations.
    pub fn symmetry_defect(&self) -> f64 {
        let n = self.n;
        let mut defect: f64 = 0.0;
        for i in 0..n {
            for j in 0..n {
                defect = defect.max((self.l2(i, j) - self.l2(j, i)).abs());
                for k in 0..n {
                    let base = self.l3(i, j, k);
                    for p in permutations([i, j, k]) {
                        defect = defect.max((self.l3[self.flat(&p)] - base).abs());
                    }
                    for l in 0..n {
                        let base = self.l4(i, j, k, l);
                        for p in permutations([i, j, k, l]) {
                            defect = defect.max((self.l4[self.flat(&p)] - base).abs());
                        }
                    }
                }
            }
        }
        defect
    }
}

/// Gauge-scalar couplings G2H2[a][b][i][j], symmetric in (a,b) and (i,j).
#[derive(Debug, Clone, PartialEq)]
pub struct GaugeCurvature {
    n_gauge: usize,
    n_higgs: usize,
    data: Vec<f64>,
}

impl GaugeCurvature {
    pub fn new(n_gauge: usize, n_higgs: usize) -> Self {
        Self {
            n_gauge,
            n_higgs,
            data: vec![0.0; n_gauge * n_gauge * n_higgs * n_higgs],
        }
    }

    pub fn n_gauge(&self) -> usize {
        self.n_gauge
    }

    #[inline]
    fn idx(&self, a: usize, b: usize, i: usize, j: usize) -> usize {
        ((a * self.n_gauge + b) * self.n_higgs + i) * self.n_higgs + j
    }

    pub fn get(&self, a: usize, b: usize, i: usize, j: usize) -> f64 {
        self.data[self.idx(a, b, i, j)]
    }

    pub fn set(&mut self, a: usize, b: usize, i: usize, j: usize, value: f64) {
        for (x, y) in [(a, b), (b, a)] {
            for (p, q) in [(i, j), (j, i)] {
                let k = self.idx(x, y, p, q);
                self.data[k] = value;
            }
        }
    }

    /// M²[a][b] = ½ Σ_ij G2H2[a][b][i][j] φ_i φ_j.
    pub fn mass_matrix(&self, phi: &[f64]) -> Vec<f64> {
        let (ng, nh) = (self.n_gauge, self.n_higgs);
        let mut out = vec![0.0; ng * ng];
        for a in 0..ng {
            for b in 0..ng {
                let mut sum = 0.0;
                for i in 0..nh {
                    for j in 0..nh {
                        sum += self.get(a, b, i, j) * phi[i] * phi[j];
                    }
                }
                out[a * ng + b] = 0.5 * sum;
            }
        }
        out
    }

    /// Λ[a][b][i] = Σ_j G2H2[a][b][i][j] φ_j.
    pub fn cubic(&self, phi: &[f64]) -> Vec<f64> {
        contract_last(&self.data, self.n_higgs, phi)
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }
}

/// Fermion-scalar couplings F2H1[a][b][k], symmetric in (a,b).
#[derive(Debug, Clone, PartialEq)]
pub struct YukawaCurvature {
    n_fermion: usize,
    n_higgs: usize,
    data: Vec<Complex64>,
}

impl YukawaCurvature {
    pub fn new(n_fermion: usize, n_higgs: usize) -> Self {
        Self {
            n_fermion,
            n_higgs,
            data: vec![Complex64::new(0.0, 0.0); n_fermion * n_fermion * n_higgs],
        }
    }

    pub fn n_fermion(&self) -> usize {
        self.n_fermion
    }

    #[inline]
    fn idx(&self, a: usize, b: usize, k: usize) -> usize {
        (a * self.n_fermion + b) * self.n_higgs + k
    }

    pub fn get(&self, a: usize, b: usize, k: usize) -> Complex64 {
        self.data[self.idx(a, b, k)]
    }

    /// Set entry (a, b, k) and its mirror (b, a, k).
    pub fn set(&mut self, a: usize, b: usize, k: usize, value: Complex64) {
        let (x, y) = (self.idx(a, b, k), self.idx(b, a, k));
        self.data[x] = value;
        self.data[y] = value;
    }

    /// M[a][b] = Σ_k F2H1[a][b][k] φ_k.
    pub fn mass_matrix(&self, phi: &[f64]) -> Vec<Complex64> {
        self.data
            .chunks_exact(self.n_higgs)
            .map(|row| row.iter().zip(phi).map(|(y, p)| y * p).sum())
            .collect()
    }

    /// M†M, the Hermitian squared-mass matrix.
    pub fn squared_mass_matrix(&self, phi: &[f64]) -> Vec<Complex64> {
        let n = self.n_fermion;
        let m = self.mass_matrix(phi);
        let mut out = vec![Complex64::new(0.0, 0.0); n * n];
        for i in 0..n {
            for j in 0..n {
                out[i * n + j] = (0..n).map(|l| m[i * n + l].conj() * m[l * n + j]).sum();
            }
        }
        out
    }
}

/// Everything a model populates, in one place.
#[derive(Debug, Clone)]
pub struct ModelTensors {
    pub higgs: CurvatureTensors,
    pub counterterm: CurvatureTensors,
    pub gauge: GaugeCurvature,
    pub quark: YukawaCurvature,
    pub lepton: YukawaCurvature,
    pub debye: DebyeCorrections,
}

impl ModelTensors {
    pub fn new(n_higgs: usize, n_gauge: usize, n_quarks: usize, n_leptons: usize) -> Self {
        Self {
            higgs: CurvatureTensors::new(n_higgs),
            counterterm: CurvatureTensors::new(n_higgs),
            gauge: GaugeCurvature::new(n_gauge, n_higgs),
            quark: YukawaCurvature::new(n_quarks, n_higgs),
            lepton: YukawaCurvature::new(n_leptons, n_higgs),
            debye: DebyeCorrections::zero(n_higgs, n_gauge),
        }
    }

    pub fn n_higgs(&self) -> usize {
        self.higgs.n()
    }
}
