// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Triple-Coupling Calculator
// Mirrors: src/models/ClassPotentialOrigin.cpp
// ─────────────────────────────────────────────────────────────────────
//! Rotation of gauge-basis third derivatives into physical triple-scalar
//! couplings:
//!
//! λ_ijk = Σ_lmn R_il R_jm R_kn T_lmn
//!
//! with R the sign-fixed rotation matrix whose rows are already in the
//! canonical particle order.

use bsmpt_types::{BsmptError, BsmptResult, TripleCouplings};

/// Full O(N⁶) contraction of one rank-3 tensor.
pub fn rotate_triple(rotation: &[f64], t: &[f64], n: usize) -> Vec<f64> {
    let mut out = vec![0.0; n * n * n];
    for i in 0..n {
        for j in 0..n {
            for k in 0..n {
                let mut sum = 0.0;
                for l in 0..n {
                    for m in 0..n {
                        for o in 0..n {
                            let rot = rotation[i * n + l] * rotation[j * n + m] * rotation[k * n + o];
                            sum += rot * t[(l * n + m) * n + o];
                        }
                    }
                }
                out[(i * n + j) * n + k] = sum;
            }
        }
    }
    out
}

/// Gauge-basis third derivatives at the vacuum.
#[derive(Debug, Clone)]
pub struct GaugeBasisTriples {
    pub tree: Vec<f64>,
    pub counterterm: Vec<f64>,
    pub one_loop: Vec<f64>,
}

pub fn physical_triple_couplings(
    sorted_rotation: &[f64],
    labels: &[String],
    gauge: &GaugeBasisTriples,
) -> BsmptResult<TripleCouplings> {
    let n = labels.len();
    BsmptError::check_len("sorted rotation", sorted_rotation.len(), n * n)?;
    let n3 = n * n * n;
    BsmptError::check_len("tree triple tensor", gauge.tree.len(), n3)?;
    BsmptError::check_len("counterterm triple tensor", gauge.counterterm.len(), n3)?;
    BsmptError::check_len("one-loop triple tensor", gauge.one_loop.len(), n3)?;

    Ok(TripleCouplings {
        n,
        labels: labels.to_vec(),
        tree: rotate_triple(sorted_rotation, &gauge.tree, n),
        counterterm: rotate_triple(sorted_rotation, &gauge.counterterm, n),
        one_loop: rotate_triple(sorted_rotation, &gauge.one_loop, n),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_rotation_is_noop() {
        let t: Vec<f64> = (0..8).map(|x| x as f64).collect();
        let id = [1.0, 0.0, 0.0, 1.0];
        assert_eq!(rotate_triple(&id, &t, 2), t);
    }

    #[test]
    fn test_rotation_of_single_axis_tensor() {
        // T = e0⊗e0⊗e0 rotated by 90°: only λ_111 survives, sign from R_10³.
        let mut t = vec![0.0; 8];
        t[0] = 2.0;
        let r = [0.0, 1.0, -1.0, 0.0];
        let out = rotate_triple(&r, &t, 2);
        assert!((out[7] + 2.0).abs() < 1e-15);
        assert_eq!(out.iter().filter(|x| **x != 0.0).count(), 1);
    }

    #[test]
    fn test_shape_checked() {
        let gauge = GaugeBasisTriples {
            tree: vec![0.0; 8],
            counterterm: vec![0.0; 8],
            one_loop: vec![0.0; 7],
        };
        let labels = vec!["h".to_string(), "H".to_string()];
        let err = physical_triple_couplings(&[1.0, 0.0, 0.0, 1.0], &labels, &gauge).unwrap_err();
        assert!(matches!(err, BsmptError::Dimension(_)));
    }
}
