// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Model Definition Contract
// Mirrors: include/BSMPT/models/ClassPotentialOrigin.h
// ─────────────────────────────────────────────────────────────────────
//! The interface a concrete scalar-sector model implements to plug into
//! the engine.
//!
//! A model owns its Lagrangian parameters and knows how to turn them
//! into curvature tensors, how its mass eigenstates are grouped and
//! named, and how its counterterms follow from the one-loop derivatives.

use bsmpt_types::{BsmptResult, SmConstants};

use crate::counterterms::CountertermScheme;
use crate::debye::DebyeCorrections;
use crate::mixing::MixingLayout;
use crate::tensors::ModelTensors;

pub trait ModelDefinition: CountertermScheme + Send {
    fn name(&self) -> &str;

    /// Number of real scalar fields.
    fn n_higgs(&self) -> usize;

    fn n_gauge(&self) -> usize {
        4
    }

    /// Size of the quark mass matrix.
    fn n_quarks(&self) -> usize;

    /// Size of the lepton mass matrix.
    fn n_leptons(&self) -> usize;

    /// Field index of each VEV direction.
    fn vev_order(&self) -> Vec<usize>;

    /// Names of the VEV directions, same length as `vev_order`.
    fn vev_labels(&self) -> Vec<String>;

    /// MS-bar renormalisation scale μ.
    fn scale(&self) -> f64;

    /// Tree-level vacuum as a full field vector.
    fn tree_vev(&self) -> Vec<f64>;

    fn sm(&self) -> &SmConstants;

    /// Lagrangian input parameters and their names, for reporting.
    fn parameters(&self) -> Vec<(String, f64)>;

    /// Fill the tree-level tensors. Counterterm tensors stay untouched.
    fn set_curvature(&self, tensors: &mut ModelTensors) -> BsmptResult<()>;

    fn mixing_layout(&self) -> BsmptResult<MixingLayout>;

    /// Closed-form thermal masses, if the model provides them.
    fn debye_simplified(&self) -> Option<DebyeCorrections> {
        None
    }
}

/// Spread VEV components over a full field vector according to `order`.
pub fn minimize_order_vev(order: &[usize], n_higgs: usize, values: &[f64]) -> Vec<f64> {
    let mut out = vec![0.0; n_higgs];
    for (&field, &v) in order.iter().zip(values) {
        if field < n_higgs {
            out[field] = v;
        }
    }
    out
}

/// Inverse of [`minimize_order_vev`].
pub fn vev_components(order: &[usize], fields: &[f64]) -> Vec<f64> {
    order
        .iter()
        .map(|&i| fields.get(i).copied().unwrap_or(0.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimize_order_vev_roundtrip() {
        let order = [2, 4, 6, 7];
        let full = minimize_order_vev(&order, 8, &[0.0, 50.0, 240.0, 0.0]);
        assert_eq!(full, vec![0.0, 0.0, 0.0, 0.0, 50.0, 0.0, 240.0, 0.0]);
        assert_eq!(vev_components(&order, &full), vec![0.0, 50.0, 240.0, 0.0]);
    }
}
