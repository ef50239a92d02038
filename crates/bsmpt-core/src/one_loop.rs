// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Coleman-Weinberg Potential and Derivatives
// Mirrors: src/models/ClassPotentialOrigin.cpp
// ─────────────────────────────────────────────────────────────────────
//! Zero-temperature one-loop potential in the MS-bar scheme and its
//! closed-form first, second and third field derivatives.
//!
//! The derivatives are evaluated from `PhysicalCouplings` (mass basis)
//! and rotated back into the gauge basis of the scalar fields.

use std::f64::consts::PI;

use bsmpt_types::{BsmptResult, EngineConfig};

use crate::couplings::{PhysicalCouplings, Species, SpeciesCouplings};
use crate::loops::LoopFunctions;
use crate::spectral::{hermitian_embedding, symmetric_eigen};
use crate::tensors::ModelTensors;

/// 1/(16π²).
const EPSILON: f64 = 1.0 / (16.0 * PI * PI);

fn zero_small(values: &mut [f64], threshold: f64) {
    for v in values.iter_mut() {
        if v.abs() < threshold {
            *v = 0.0;
        }
    }
}

/// Tree-level squared masses of every species at `point`, with
/// fermion masses listed twice (embedding order).
fn field_dependent_masses(
    tensors: &ModelTensors,
    point: &[f64],
) -> BsmptResult<[(Species, Vec<f64>); 4]> {
    let nh = tensors.n_higgs();
    let higgs = symmetric_eigen(&tensors.higgs.hessian(point)?, nh)?.values;
    let ng = tensors.gauge.n_gauge();
    let gauge = symmetric_eigen(&tensors.gauge.mass_matrix(point), ng)?.values;
    let nq = tensors.quark.n_fermion();
    let quark = symmetric_eigen(
        &hermitian_embedding(&tensors.quark.squared_mass_matrix(point), nq),
        2 * nq,
    )?
    .values;
    let nl = tensors.lepton.n_fermion();
    let lepton = symmetric_eigen(
        &hermitian_embedding(&tensors.lepton.squared_mass_matrix(point), nl),
        2 * nl,
    )?
    .values;
    Ok([
        (Species::Higgs, higgs),
        (Species::Gauge, gauge),
        (Species::Quark, quark),
        (Species::Lepton, lepton),
    ])
}

/// V_CW(φ) at T = 0.
///
/// Σ_scalars + 3 Σ_gauge - 2 N_c Σ_quarks - 2 Σ_leptons of
/// m⁴/(64π²)(ln(m²/μ²) - cb).
pub fn v1_loop(
    tensors: &ModelTensors,
    point: &[f64],
    config: &EngineConfig,
    loops: &LoopFunctions,
) -> BsmptResult<f64> {
    let mut total = 0.0;
    for (species, masses) in field_dependent_masses(tensors, point)? {
        let cb = species.cb(config);
        let dof = match species {
            Species::Higgs => 1.0,
            Species::Gauge => 3.0,
            // Embedded fermion states come in pairs.
            Species::Quark => -(config.n_colour as f64),
            Species::Lepton => -1.0,
        };
        let sum: f64 = masses
            .iter()
            .map(|&m2| loops.cw_term(m2, cb, config.cw_threshold))
            .sum();
        total += dof * sum;
    }
    Ok(total)
}

/// Σ_a m²_a C21[a][a][i] (ln(m²_a/μ²) - cb + ½) for one species.
fn first_species(s: &SpeciesCouplings, cb: f64, loops: &LoopFunctions) -> Vec<f64> {
    let mut out = vec![0.0; s.n_higgs];
    for (a, &m2) in s.masses.iter().enumerate() {
        if m2 == 0.0 {
            continue;
        }
        let factor = m2 * (loops.log_ratio(m2) - cb + 0.5);
        for (i, o) in out.iter_mut().enumerate() {
            *o += factor * s.c21(a, a, i);
        }
    }
    out
}

fn second_species(s: &SpeciesCouplings, cb: f64, loops: &LoopFunctions) -> Vec<f64> {
    let (m, nh) = (s.n_states, s.n_higgs);
    let mut fb = vec![0.0; m * m];
    for a in 0..m {
        for b in 0..m {
            fb[a * m + b] = loops.f_base(s.masses[a], s.masses[b]) - cb + 0.5;
        }
    }
    let mut out = vec![0.0; nh * nh];
    for i in 0..nh {
        for j in 0..nh {
            let mut sum = 0.0;
            for a in 0..m {
                for b in 0..m {
                    sum += s.c21(a, b, i) * s.c21(b, a, j) * fb[a * m + b];
                }
                let m2 = s.masses[a];
                if m2 != 0.0 {
                    sum += m2 * s.c22(a, a, i, j) * (loops.log_ratio(m2) - cb + 0.5);
                }
            }
            out[i * nh + j] = sum;
        }
    }
    out
}

fn third_species(s: &SpeciesCouplings, cb: f64, loops: &LoopFunctions) -> Vec<f64> {
    let (m, nh) = (s.n_states, s.n_higgs);
    let mut fb = vec![0.0; m * m];
    let mut ft = vec![0.0; m * m * m];
    for a in 0..m {
        for b in 0..m {
            fb[a * m + b] = loops.f_base(s.masses[a], s.masses[b]) - cb + 0.5;
            for c in 0..m {
                ft[(a * m + b) * m + c] =
                    loops.f_base_tri(s.masses[a], s.masses[b], s.masses[c]);
            }
        }
    }

    let mut raw = vec![0.0; nh * nh * nh];
    for i in 0..nh {
        for j in 0..nh {
            for k in 0..nh {
                let mut sum = 0.0;
                for a in 0..m {
                    for b in 0..m {
                        let ab_i = s.c21(a, b, i);
                        if ab_i != 0.0 {
                            for c in 0..m {
                                sum += 2.0
                                    * ft[(a * m + b) * m + c]
                                    * ab_i
                                    * s.c21(b, c, j)
                                    * s.c21(c, a, k);
                            }
                        }
                        sum += 3.0 * s.c22(a, b, i, j) * s.c21(b, a, k) * fb[a * m + b];
                    }
                }
                raw[(i * nh + j) * nh + k] = sum;
            }
        }
    }
    symmetrise3(&raw, nh)
}

/// Average over the six orderings of a rank-3 tensor.
pub(crate) fn symmetrise3(t: &[f64], n: usize) -> Vec<f64> {
    let at = |i: usize, j: usize, k: usize| t[(i * n + j) * n + k];
    let mut out = vec![0.0; n * n * n];
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                out[(i * n + j) * n + k] = (at(i, j, k)
                    + at(i, k, j)
                    + at(j, i, k)
                    + at(j, k, i)
                    + at(k, i, j)
                    + at(k, j, i))
                    / 6.0;
            }
        }
    }
    out
}

/// ∂V_CW/∂φ_i in the gauge basis.
pub fn weinberg_first_derivative(
    couplings: &PhysicalCouplings,
    config: &EngineConfig,
    loops: &LoopFunctions,
) -> Vec<f64> {
    let nh = couplings.n_higgs;
    let mut mass_basis = vec![0.0; nh];
    for species in Species::ALL {
        let part = first_species(couplings.species(species), species.cb(config), loops);
        let w = species.weight(config);
        for (acc, p) in mass_basis.iter_mut().zip(&part) {
            *acc += w * p;
        }
    }

    let r = &couplings.higgs_rotation;
    let mut out = vec![0.0; nh];
    for (l, o) in out.iter_mut().enumerate() {
        *o = EPSILON * (0..nh).map(|i| r[i * nh + l] * mass_basis[i]).sum::<f64>();
    }
    zero_small(&mut out, config.numerical_zero);
    out
}

/// ∂²V_CW/∂φ_i∂φ_j in the gauge basis.
pub fn weinberg_second_derivative(
    couplings: &PhysicalCouplings,
    config: &EngineConfig,
    loops: &LoopFunctions,
) -> Vec<f64> {
    let nh = couplings.n_higgs;
    let mut mass_basis = vec![0.0; nh * nh];
    for species in Species::ALL {
        let part = second_species(couplings.species(species), species.cb(config), loops);
        let w = species.weight(config);
        for (acc, p) in mass_basis.iter_mut().zip(&part) {
            *acc += w * p;
        }
    }

    let r = &couplings.higgs_rotation;
    let mut out = vec![0.0; nh * nh];
    for l in 0..nh {
        for m in 0..nh {
            let mut sum = 0.0;
            for i in 0..nh {
                for j in 0..nh {
                    let sym = 0.5 * (mass_basis[i * nh + j] + mass_basis[j * nh + i]);
                    sum += r[i * nh + l] * sym * r[j * nh + m];
                }
            }
            out[l * nh + m] = EPSILON * sum;
        }
    }
    zero_small(&mut out, config.numerical_zero);
    out
}

/// ∂³V_CW/∂φ_i∂φ_j∂φ_k in the gauge basis.
pub fn weinberg_third_derivative(
    couplings: &PhysicalCouplings,
    config: &EngineConfig,
    loops: &LoopFunctions,
) -> Vec<f64> {
    let nh = couplings.n_higgs;
    let mut mass_basis = vec![0.0; nh * nh * nh];
    for species in Species::ALL {
        let part = third_species(couplings.species(species), species.cb(config), loops);
        let w = species.weight(config);
        for (acc, p) in mass_basis.iter_mut().zip(&part) {
            *acc += w * p;
        }
    }

    let r = &couplings.higgs_rotation;
    let dims = [nh, nh, nh];
    let mut rt = vec![0.0; nh * nh];
    for i in 0..nh {
        for j in 0..nh {
            rt[i * nh + j] = r[j * nh + i];
        }
    }
    let mut out = mass_basis;
    for axis in 0..3 {
        out = crate::couplings::rotate_axis(&out, &dims, axis, &rt);
    }
    for v in out.iter_mut() {
        *v *= EPSILON;
    }
    zero_small(&mut out, config.numerical_zero);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numerical::{hessian_numerical, nabla_numerical};

    /// Single real scalar with V = m²/2 φ² + λ/24 φ⁴, no gauge or fermions.
    fn single_scalar(m2: f64, lambda: f64) -> ModelTensors {
        let mut t = ModelTensors::new(1, 1, 1, 1);
        t.higgs.set_l2(0, 0, m2);
        t.higgs.set_l4([0, 0, 0, 0], lambda);
        t
    }

    #[test]
    fn test_v1_loop_single_scalar_closed_form() {
        let t = single_scalar(100.0, 0.6);
        let cfg = EngineConfig::default();
        let loops = LoopFunctions::new(50.0);
        let phi = 30.0;
        let m2: f64 = 100.0 + 0.3 * phi * phi;
        let expected = m2 * m2 / (64.0 * PI * PI) * ((m2 / 2500.0).ln() - 1.5);
        let got = v1_loop(&t, &[phi], &cfg, &loops).unwrap();
        assert!((got - expected).abs() < 1e-10 * expected.abs(), "{got} vs {expected}");
    }

    #[test]
    fn test_analytic_first_derivative_matches_finite_difference() {
        let t = single_scalar(100.0, 0.6);
        let cfg = EngineConfig::default();
        let loops = LoopFunctions::new(50.0);
        let point = [30.0];
        let c = PhysicalCouplings::compute(&t, &point, &cfg).unwrap();
        let analytic = weinberg_first_derivative(&c, &cfg, &loops);
        let numeric =
            nabla_numerical(|x| v1_loop(&t, x, &cfg, &loops), &point, 1e-3).unwrap();
        assert!(
            (analytic[0] - numeric[0]).abs() < 1e-6 * numeric[0].abs().max(1.0),
            "{analytic:?} vs {numeric:?}"
        );
    }

    #[test]
    fn test_analytic_second_derivative_matches_finite_difference() {
        // Two coupled scalars so that mixing enters the result.
        let mut t = ModelTensors::new(2, 1, 1, 1);
        t.higgs.set_l2(0, 0, 200.0);
        t.higgs.set_l2(1, 1, 500.0);
        t.higgs.set_l2(0, 1, 40.0);
        t.higgs.set_l4([0, 0, 0, 0], 0.9);
        t.higgs.set_l4([0, 0, 1, 1], 0.4);
        t.higgs.set_l4([1, 1, 1, 1], 1.1);
        let cfg = EngineConfig::default();
        let loops = LoopFunctions::new(40.0);
        let point = [20.0, 12.0];
        let c = PhysicalCouplings::compute(&t, &point, &cfg).unwrap();
        let analytic = weinberg_second_derivative(&c, &cfg, &loops);
        let numeric =
            hessian_numerical(|x| v1_loop(&t, x, &cfg, &loops), &point, 1e-2).unwrap();
        for idx in 0..4 {
            assert!(
                (analytic[idx] - numeric[idx]).abs() < 1e-4 * numeric[idx].abs().max(1.0),
                "entry {idx}: {} vs {}",
                analytic[idx],
                numeric[idx]
            );
        }
        assert_eq!(analytic[1], analytic[2]);
    }

    #[test]
    fn test_third_derivative_is_permutation_symmetric() {
        let mut t = ModelTensors::new(2, 1, 1, 1);
        t.higgs.set_l2(0, 0, 200.0);
        t.higgs.set_l2(1, 1, 500.0);
        t.higgs.set_l4([0, 0, 0, 0], 0.9);
        t.higgs.set_l4([0, 0, 0, 1], 0.2);
        t.higgs.set_l4([0, 1, 1, 1], 0.3);
        let cfg = EngineConfig::default();
        let loops = LoopFunctions::new(40.0);
        let c = PhysicalCouplings::compute(&t, &[15.0, -7.0], &cfg).unwrap();
        let d3 = weinberg_third_derivative(&c, &cfg, &loops);
        let at = |i: usize, j: usize, k: usize| d3[(i * 2 + j) * 2 + k];
        for i in 0..2 {
            for j in 0..2 {
                for k in 0..2 {
                    let v = at(i, j, k);
                    for w in [at(i, k, j), at(j, i, k), at(j, k, i), at(k, i, j), at(k, j, i)] {
                        assert!((v - w).abs() <= 1e-12 * v.abs().max(1.0));
                    }
                }
            }
        }
    }

    #[test]
    fn test_third_derivative_matches_finite_difference_of_hessian() {
        let t = single_scalar(150.0, 0.8);
        let cfg = EngineConfig::default();
        let loops = LoopFunctions::new(40.0);
        let phi = 25.0;
        let h = 1e-3;
        let hess_at = |x: f64| {
            let c = PhysicalCouplings::compute(&t, &[x], &cfg).unwrap();
            weinberg_second_derivative(&c, &cfg, &loops)[0]
        };
        let numeric = (hess_at(phi + h) - hess_at(phi - h)) / (2.0 * h);
        let c = PhysicalCouplings::compute(&t, &[phi], &cfg).unwrap();
        let analytic = weinberg_third_derivative(&c, &cfg, &loops)[0];
        assert!(
            (analytic - numeric).abs() < 1e-5 * numeric.abs().max(1e-3),
            "{analytic} vs {numeric}"
        );
    }

    #[test]
    fn test_symmetrise3_fixed_point() {
        let t = vec![1.0, 2.0, 2.0, 3.0, 2.0, 3.0, 3.0, 4.0];
        assert_eq!(symmetrise3(&t, 2), t);
    }
}
