// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Symmetric Eigensolver
// ─────────────────────────────────────────────────────────────────────
//! Pure-Rust cyclic Jacobi eigensolver for real symmetric matrices, and
//! the real embedding used for Hermitian fermion mass matrices.
//!
//! Mass matrices here are small (N ≤ 24 after embedding), so Jacobi's
//! O(N³ × sweeps) cost is negligible and its exactly-zero off-diagonal
//! handling keeps decoupled blocks decoupled.

use num_complex::Complex64;

use bsmpt_types::{BsmptError, BsmptResult};

/// Ascending eigenvalues with eigenvectors stored as columns.
#[derive(Debug, Clone)]
pub struct SymmetricEigen {
    pub n: usize,
    pub values: Vec<f64>,
    /// n×n row-major, column c is the eigenvector of `values[c]`.
    pub vectors: Vec<f64>,
}

impl SymmetricEigen {
    /// Rotation matrix with mass eigenstates as rows: R = Vᵀ.
    pub fn rotation_rows(&self) -> Vec<f64> {
        let n = self.n;
        let mut r = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..n {
                r[i * n + j] = self.vectors[j * n + i];
            }
        }
        r
    }
}

/// Diagonalise a real symmetric n×n matrix (row-major).
///
/// The input is symmetrised as ½(A + Aᵀ) first; non-finite entries are a
/// numerical error.
pub fn symmetric_eigen(a: &[f64], n: usize) -> BsmptResult<SymmetricEigen> {
    BsmptError::check_len("symmetric matrix", a.len(), n * n)?;
    if let Some(pos) = a.iter().position(|x| !x.is_finite()) {
        return Err(BsmptError::Numerical(format!(
            "non-finite matrix entry at ({}, {})",
            pos / n,
            pos % n
        )));
    }

    let mut work = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            work[i * n + j] = 0.5 * (a[i * n + j] + a[j * n + i]);
        }
    }
    let mut values = vec![0.0; n];
    let mut vectors = vec![0.0; n * n];
    jacobi_eigen_symmetric(&mut work, n, &mut values, &mut vectors);
    sort_eigenpairs(&mut values, &mut vectors, n);
    Ok(SymmetricEigen { n, values, vectors })
}

/// Real 2n×2n image [[Re H, -Im H], [Im H, Re H]] of a complex n×n matrix.
///
/// Symmetric when H is Hermitian; every eigenvalue of H appears twice.
/// Products and traces carry over: tr(emb(X)) = 2 Re tr(X).
pub fn hermitian_embedding(h: &[Complex64], n: usize) -> Vec<f64> {
    let m = 2 * n;
    let mut out = vec![0.0; m * m];
    for i in 0..n {
        for j in 0..n {
            let z = h[i * n + j];
            out[i * m + j] = z.re;
            out[i * m + (j + n)] = -z.im;
            out[(i + n) * m + j] = z.im;
            out[(i + n) * m + (j + n)] = z.re;
        }
    }
    out
}

/// Eigenvalues of a Hermitian matrix, ascending, each listed once.
pub fn hermitian_eigenvalues(h: &[Complex64], n: usize) -> BsmptResult<Vec<f64>> {
    BsmptError::check_len("hermitian matrix", h.len(), n * n)?;
    let eig = symmetric_eigen(&hermitian_embedding(h, n), 2 * n)?;
    Ok(eig.values.iter().step_by(2).copied().collect())
}

/// Largest |(R·Rᵀ - 1)_ij|.
pub fn orthogonality_defect(r: &[f64], n: usize) -> f64 {
    let mut worst: f64 = 0.0;
    for i in 0..n {
        for j in 0..n {
            let dot: f64 = (0..n).map(|k| r[i * n + k] * r[j * n + k]).sum();
            let expected = if i == j { 1.0 } else { 0.0 };
            worst = worst.max((dot - expected).abs());
        }
    }
    worst
}

/// Determinant by partial-pivot elimination; used on small sub-blocks.
pub fn determinant(a: &[f64], n: usize) -> f64 {
    let mut m = a.to_vec();
    let mut det = 1.0;
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&x, &y| {
                m[x * n + col]
                    .abs()
                    .partial_cmp(&m[y * n + col].abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .unwrap_or(col);
        if m[pivot * n + col] == 0.0 {
            return 0.0;
        }
        if pivot != col {
            for k in 0..n {
                m.swap(pivot * n + k, col * n + k);
            }
            det = -det;
        }
        let p = m[col * n + col];
        det *= p;
        for row in (col + 1)..n {
            let factor = m[row * n + col] / p;
            for k in col..n {
                m[row * n + k] -= factor * m[col * n + k];
            }
        }
    }
    det
}

/// Sort eigenvalues ascending, rearranging eigenvector columns accordingly.
pub fn sort_eigenpairs(eigvals: &mut [f64], eigvecs: &mut [f64], n: usize) {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.sort_by(|&a, &b| {
        eigvals[a]
            .partial_cmp(&eigvals[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let sorted_vals: Vec<f64> = indices.iter().map(|&i| eigvals[i]).collect();
    eigvals[..n].copy_from_slice(&sorted_vals);

    let old_vecs = eigvecs.to_vec();
    for (new_col, &old_col) in indices.iter().enumerate() {
        for row in 0..n {
            eigvecs[row * n + new_col] = old_vecs[row * n + old_col];
        }
    }
}

/// Cyclic Jacobi eigendecomposition for symmetric n×n matrix.
///
/// `a` is n×n row-major (destroyed: the diagonal becomes the eigenvalues).
/// `eigvals_out` receives the n eigenvalues (unsorted).
/// `v_out` receives the n×n eigenvector matrix (columns = eigvectors).
///
/// Off-diagonal entries that are exactly zero are never rotated, so a
/// block-diagonal input yields block-diagonal eigenvectors even inside
/// degenerate subspaces.
pub fn jacobi_eigen_symmetric(
    a: &mut [f64],
    n: usize,
    eigvals_out: &mut [f64],
    v_out: &mut [f64],
) {
    const MAX_SWEEPS: usize = 100;
    const TOL: f64 = 1e-15;

    for i in 0..n {
        for j in 0..n {
            v_out[i * n + j] = if i == j { 1.0 } else { 0.0 };
        }
    }

    let scale = a.iter().fold(0.0_f64, |m, x| m.max(x.abs())).max(1e-300);

    for sweep in 0..MAX_SWEEPS {
        let mut max_off = 0.0;
        for p in 0..n {
            for q in (p + 1)..n {
                let v = a[p * n + q].abs();
                if v > max_off {
                    max_off = v;
                }
            }
        }
        if max_off <= TOL * scale {
            break;
        }

        // Skip small rotations during the first sweeps.
        let threshold = if sweep < 4 {
            0.2 * max_off / (n * n) as f64
        } else {
            0.0
        };

        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[p * n + q];
                if apq.abs() <= threshold {
                    continue;
                }

                let app = a[p * n + p];
                let aqq = a[q * n + q];
                let diff = aqq - app;

                let t = if diff.abs() < 1e-300 {
                    if apq > 0.0 {
                        1.0
                    } else {
                        -1.0
                    }
                } else {
                    let tau = diff / (2.0 * apq);
                    if tau >= 0.0 {
                        1.0 / (tau + (1.0 + tau * tau).sqrt())
                    } else {
                        -1.0 / (-tau + (1.0 + tau * tau).sqrt())
                    }
                };

                let c = 1.0 / (1.0 + t * t).sqrt();
                let s = t * c;
                let tau_rot = s / (1.0 + c); // Rutishauser form

                a[p * n + p] -= t * apq;
                a[q * n + q] += t * apq;
                a[p * n + q] = 0.0;
                a[q * n + p] = 0.0;

                for r in 0..n {
                    if r == p || r == q {
                        continue;
                    }
                    let arp = a[r * n + p];
                    let arq = a[r * n + q];
                    a[r * n + p] = arp - s * (arq + tau_rot * arp);
                    a[p * n + r] = a[r * n + p];
                    a[r * n + q] = arq + s * (arp - tau_rot * arq);
                    a[q * n + r] = a[r * n + q];
                }

                for r in 0..n {
                    let vrp = v_out[r * n + p];
                    let vrq = v_out[r * n + q];
                    v_out[r * n + p] = vrp - s * (vrq + tau_rot * vrp);
                    v_out[r * n + q] = vrq + s * (vrp - tau_rot * vrq);
                }
            }
        }
    }

    for i in 0..n {
        eigvals_out[i] = a[i * n + i];
    }
}
