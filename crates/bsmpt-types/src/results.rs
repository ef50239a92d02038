// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Result Types
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{BsmptError, BsmptResult};

/// Squared masses of every species at one field point, ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MassSpectrum {
    pub higgs: Vec<f64>,
    pub gauge: Vec<f64>,
    pub quark: Vec<f64>,
    pub lepton: Vec<f64>,
}

impl MassSpectrum {
    /// Physical masses √|m²| of the scalars, keeping the sign of m².
    pub fn higgs_masses(&self) -> Vec<f64> {
        self.higgs
            .iter()
            .map(|&m2| m2.signum() * m2.abs().sqrt())
            .collect()
    }

    /// True if any scalar squared mass is below `-threshold`.
    pub fn has_tachyon(&self, threshold: f64) -> bool {
        self.higgs.iter().any(|&m2| m2 < -threshold)
    }
}

/// Solved counterterm parameters, in scheme order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountertermSet {
    pub names: Vec<String>,
    pub values: Vec<f64>,
}

impl CountertermSet {
    pub fn new(names: Vec<String>, values: Vec<f64>) -> BsmptResult<Self> {
        BsmptError::check_len("counterterm names", names.len(), values.len())?;
        Ok(Self { names, values })
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.values[idx])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Which source tensor a triple coupling came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriplePart {
    Tree,
    Counterterm,
    OneLoop,
}

impl TriplePart {
    pub fn prefix(self) -> &'static str {
        match self {
            TriplePart::Tree => "Tree",
            TriplePart::Counterterm => "CT",
            TriplePart::OneLoop => "CW",
        }
    }
}

/// Physical triple-scalar couplings, indexed in the canonical particle
/// order given by `labels`. Each tensor is n×n×n row-major.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripleCouplings {
    pub n: usize,
    pub labels: Vec<String>,
    pub tree: Vec<f64>,
    pub counterterm: Vec<f64>,
    pub one_loop: Vec<f64>,
}

impl TripleCouplings {
    #[inline]
    fn idx(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.n + j) * self.n + k
    }

    pub fn part(&self, part: TriplePart) -> &[f64] {
        match part {
            TriplePart::Tree => &self.tree,
            TriplePart::Counterterm => &self.counterterm,
            TriplePart::OneLoop => &self.one_loop,
        }
    }

    pub fn get(&self, part: TriplePart, i: usize, j: usize, k: usize) -> f64 {
        self.part(part)[self.idx(i, j, k)]
    }

    /// Tree + counterterm + one-loop.
    pub fn total(&self, i: usize, j: usize, k: usize) -> f64 {
        let idx = self.idx(i, j, k);
        self.tree[idx] + self.counterterm[idx] + self.one_loop[idx]
    }

    /// Column names for every independent coupling (i ≤ j ≤ k), grouped
    /// by part, e.g. `Tree_hhH`.
    pub fn legend(&self) -> Vec<String> {
        let mut out = Vec::new();
        for part in [TriplePart::Tree, TriplePart::Counterterm, TriplePart::OneLoop] {
            for i in 0..self.n {
                for j in i..self.n {
                    for k in j..self.n {
                        out.push(format!(
                            "{}_{}{}{}",
                            part.prefix(),
                            self.labels[i],
                            self.labels[j],
                            self.labels[k]
                        ));
                    }
                }
            }
        }
        out
    }

    /// Values matching `legend()` entry by entry.
    pub fn flat_values(&self) -> Vec<f64> {
        let mut out = Vec::new();
        for part in [TriplePart::Tree, TriplePart::Counterterm, TriplePart::OneLoop] {
            let data = self.part(part);
            for i in 0..self.n {
                for j in i..self.n {
                    for k in j..self.n {
                        out.push(data[self.idx(i, j, k)]);
                    }
                }
            }
        }
        out
    }
}
