// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Mixing Classification
// Mirrors: src/models/ClassPotentialN2HDM.cpp + ClassPotentialC2HDM.cpp
// ─────────────────────────────────────────────────────────────────────
//! Assigns mass eigenstates to named physical particles and fixes the
//! sign freedom of the eigensolver.
//!
//! A model describes its scalar sector as a [`MixingLayout`]: blocks of
//! gauge directions that mix among themselves and with nothing else.
//! Each row of the rotation matrix (mass state, ascending mass) is
//! matched to the first block it overlaps with. Within a block the first
//! massless row is the Goldstone (the lightest row when none is massless,
//! as happens away from the minimum) and the remaining rows are physical
//! states in ascending mass.

use std::collections::BTreeMap;

use bsmpt_types::{BsmptError, BsmptResult, EngineConfig};

use crate::spectral::{determinant, orthogonality_defect};

/// Selects the state closest to a reference mass within a block.
#[derive(Debug, Clone, PartialEq)]
pub struct SmLikeRule {
    /// Reference mass in GeV.
    pub mass: f64,
    /// Position name given to the selected state.
    pub label: String,
    /// Position names for the remaining states, ascending in mass.
    pub others: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MixingBlock {
    pub name: String,
    /// Gauge directions spanning the block.
    pub directions: Vec<usize>,
    /// Whether the first massless row of the block is a Goldstone.
    pub goldstone: bool,
    /// State labels; the Goldstone label comes first when present.
    pub labels: Vec<String>,
    /// Per label, the gauge direction whose component must be ≥ 0.
    pub sign_reference: Vec<Option<usize>>,
    /// Label index flipped when the block sub-matrix has det < 0.
    pub determinant_flip: Option<usize>,
    pub sm_like: Option<SmLikeRule>,
}

impl MixingBlock {
    pub fn new(name: &str, directions: &[usize], labels: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            directions: directions.to_vec(),
            goldstone: false,
            labels: labels.iter().map(|s| s.to_string()).collect(),
            sign_reference: vec![None; labels.len()],
            determinant_flip: None,
            sm_like: None,
        }
    }

    pub fn with_goldstone(mut self) -> Self {
        self.goldstone = true;
        self
    }

    pub fn with_signs(mut self, references: &[Option<usize>]) -> Self {
        self.sign_reference = references.to_vec();
        self
    }

    pub fn with_determinant_flip(mut self, label_index: usize) -> Self {
        self.determinant_flip = Some(label_index);
        self
    }

    pub fn with_sm_like(mut self, rule: SmLikeRule) -> Self {
        self.sm_like = Some(rule);
        self
    }

    fn overlap(&self, row: &[f64]) -> f64 {
        self.directions.iter().map(|&d| row[d].abs()).sum()
    }
}

/// Block structure of a model's scalar sector plus the canonical order
/// of physical states.
#[derive(Debug, Clone, PartialEq)]
pub struct MixingLayout {
    pub n: usize,
    pub blocks: Vec<MixingBlock>,
    pub order: Vec<String>,
}

impl MixingLayout {
    /// Checks that blocks partition the fields and that every label in
    /// `order` belongs to exactly one block.
    pub fn new(n: usize, blocks: Vec<MixingBlock>, order: &[&str]) -> BsmptResult<Self> {
        let mut covered = vec![false; n];
        let mut state_count = 0;
        for block in &blocks {
            BsmptError::check_len(
                &format!("sign references of block {}", block.name),
                block.sign_reference.len(),
                block.labels.len(),
            )?;
            for &d in &block.directions {
                if d >= n || covered[d] {
                    return Err(BsmptError::Mixing(format!(
                        "direction {d} of block {} is out of range or shared",
                        block.name
                    )));
                }
                covered[d] = true;
            }
            if block.labels.len() != block.directions.len() {
                return Err(BsmptError::Mixing(format!(
                    "block {} has {} labels for {} directions",
                    block.name,
                    block.labels.len(),
                    block.directions.len()
                )));
            }
            if let Some(flip) = block.determinant_flip {
                if flip >= block.labels.len() {
                    return Err(BsmptError::Mixing(format!(
                        "determinant flip index {flip} outside block {}",
                        block.name
                    )));
                }
            }
            state_count += block.labels.len();
        }
        if covered.iter().any(|c| !c) || state_count != n {
            return Err(BsmptError::Mixing(
                "blocks do not partition the scalar fields".to_string(),
            ));
        }
        BsmptError::check_len("physical order", order.len(), n)?;
        for label in order {
            let hits = blocks
                .iter()
                .filter(|b| b.labels.iter().any(|l| l == label))
                .count();
            if hits != 1 {
                return Err(BsmptError::Mixing(format!(
                    "label {label} must belong to exactly one block"
                )));
            }
        }
        Ok(Self {
            n,
            blocks,
            order: order.iter().map(|s| s.to_string()).collect(),
        })
    }
}

/// Classified spectrum with a sign-fixed rotation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Mixing {
    pub n: usize,
    /// Squared masses, ascending.
    pub masses: Vec<f64>,
    /// Rows are mass states in ascending mass, signs fixed.
    pub rotation: Vec<f64>,
    /// Label → row of `rotation`.
    pub positions: BTreeMap<String, usize>,
    /// Rows of `rotation` in canonical physical order.
    pub order: Vec<usize>,
    /// Labels in canonical physical order.
    pub labels: Vec<String>,
}

impl Mixing {
    pub fn position(&self, label: &str) -> Option<usize> {
        self.positions.get(label).copied()
    }

    /// Rotation matrix with rows permuted into canonical order.
    pub fn sorted_rotation(&self) -> Vec<f64> {
        let n = self.n;
        let mut out = Vec::with_capacity(n * n);
        for &row in &self.order {
            out.extend_from_slice(&self.rotation[row * n..(row + 1) * n]);
        }
        out
    }

    /// Squared masses in canonical order.
    pub fn sorted_masses(&self) -> Vec<f64> {
        self.order.iter().map(|&row| self.masses[row]).collect()
    }
}

fn mixing_error(msg: String) -> BsmptError {
    log::debug!("{msg}");
    BsmptError::Mixing(msg)
}

/// Negate one row of `rotation`. Zeros stay `+0.0`.
fn flip_row(rotation: &mut [f64], n: usize, row: usize) {
    for v in &mut rotation[row * n..(row + 1) * n] {
        *v = if *v == 0.0 { 0.0 } else { -*v };
    }
}

/// Classify the mass eigenstates of `rotation` (rows, ascending masses)
/// according to `layout`.
pub fn classify(
    masses: &[f64],
    rotation: &[f64],
    layout: &MixingLayout,
    config: &EngineConfig,
) -> BsmptResult<Mixing> {
    let n = layout.n;
    BsmptError::check_len("masses", masses.len(), n)?;
    BsmptError::check_len("rotation matrix", rotation.len(), n * n)?;

    let deviation = orthogonality_defect(rotation, n);
    if !(deviation <= config.orthogonality_tolerance) {
        return Err(BsmptError::NonOrthogonal { deviation });
    }

    let threshold = config.mixing_threshold;
    // members[b] = mass rows of block b, ascending in mass
    let mut members: Vec<Vec<usize>> = vec![Vec::new(); layout.blocks.len()];
    let mut owner = vec![0usize; n];
    for i in 0..n {
        let row = &rotation[i * n..(i + 1) * n];
        let Some(b) = layout
            .blocks
            .iter()
            .position(|block| block.overlap(row) > threshold)
        else {
            return Err(mixing_error(format!(
                "invalid mixing matrix containing row {i} with all zeroes"
            )));
        };
        members[b].push(i);
        owner[i] = b;
    }

    // rows[b][l] = mass row carrying label l of block b
    let mut rows: Vec<Vec<Option<usize>>> = Vec::with_capacity(layout.blocks.len());
    for (block, mut found) in layout.blocks.iter().zip(members) {
        if found.len() > block.labels.len() {
            return Err(mixing_error(format!(
                "{} submatrix mixing with other components",
                block.name
            )));
        }
        let mut slots = vec![None; block.labels.len()];
        let mut first_physical = 0;
        if block.goldstone && !found.is_empty() {
            // Off the minimum no row is massless; the lightest one stands in.
            let k = found
                .iter()
                .position(|&i| masses[i].abs() < config.zero_mass_threshold)
                .unwrap_or(0);
            slots[0] = Some(found.remove(k));
            first_physical = 1;
        }
        for (slot, i) in slots[first_physical..].iter_mut().zip(found) {
            *slot = Some(i);
        }
        rows.push(slots);
    }

    let mut positions = BTreeMap::new();
    for (block, slots) in layout.blocks.iter().zip(&rows) {
        for (label, slot) in block.labels.iter().zip(slots) {
            let Some(row) = slot else {
                return Err(mixing_error(format!(
                    "position of {label} in block {} not set",
                    block.name
                )));
            };
            positions.insert(label.clone(), *row);
        }
    }

    for i in 0..n {
        let block = &layout.blocks[owner[i]];
        for j in 0..n {
            if !block.directions.contains(&j) && rotation[i * n + j].abs() > threshold {
                return Err(mixing_error(format!(
                    "invalid rotation matrix: state {i} of block {} has component {:e} along field {j}",
                    block.name,
                    rotation[i * n + j]
                )));
            }
        }
    }

    let mut fixed = rotation.to_vec();
    for (block, slots) in layout.blocks.iter().zip(&rows) {
        for (reference, slot) in block.sign_reference.iter().zip(slots) {
            if let (Some(dir), Some(row)) = (reference, slot) {
                if fixed[row * n + dir] < 0.0 {
                    flip_row(&mut fixed, n, *row);
                }
            }
        }
        if let Some(flip) = block.determinant_flip {
            let m = block.directions.len();
            let mut sub = Vec::with_capacity(m * m);
            for row in slots.iter().flatten() {
                for &d in &block.directions {
                    sub.push(fixed[row * n + d]);
                }
            }
            if determinant(&sub, m) < 0.0 {
                if let Some(row) = slots[flip] {
                    flip_row(&mut fixed, n, row);
                }
            }
        }
        if let Some(rule) = &block.sm_like {
            let physical: Vec<usize> = slots
                .iter()
                .skip(usize::from(block.goldstone))
                .flatten()
                .copied()
                .collect();
            let distance = |row: usize| (masses[row].max(0.0).sqrt() - rule.mass).abs();
            let mut best = 0;
            for (k, &row) in physical.iter().enumerate() {
                if distance(row) < distance(physical[best]) {
                    best = k;
                }
            }
            if let Some(&sm_row) = physical.get(best) {
                positions.insert(rule.label.clone(), sm_row);
                let rest = physical
                    .iter()
                    .enumerate()
                    .filter(|&(k, _)| k != best)
                    .map(|(_, &row)| row);
                for (name, row) in rule.others.iter().zip(rest) {
                    positions.insert(name.clone(), row);
                }
            }
        }
    }

    let mut order = Vec::with_capacity(n);
    for label in &layout.order {
        let Some(&row) = positions.get(label) else {
            return Err(mixing_error(format!("no state carries label {label}")));
        };
        order.push(row);
    }

    Ok(Mixing {
        n,
        masses: masses.to_vec(),
        rotation: fixed,
        positions,
        order,
        labels: layout.order.clone(),
    })
}
