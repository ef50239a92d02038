// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Core
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Effective-potential and renormalisation engine.
//!
//! Models fill curvature tensors; the engine differentiates the
//! tree-level, counterterm and Coleman-Weinberg potentials, diagonalises
//! and classifies the scalar spectrum, solves on-shell counterterms and
//! rotates third derivatives into physical triple couplings.

pub mod checks;
pub mod counterterms;
pub mod couplings;
pub mod debye;
pub mod derivatives;
pub mod loops;
pub mod mixing;
pub mod model;
pub mod numerical;
pub mod one_loop;
pub mod potential;
pub mod scan;
pub mod spectral;
pub mod tensors;
pub mod triple;

pub use checks::CheckOutcome;
pub use counterterms::{solve_counterterms, CountertermInput, CountertermScheme};
pub use couplings::{PhysicalCouplings, Species};
pub use debye::DebyeCorrections;
pub use derivatives::{Contributions, DerivativeEngine};
pub use loops::LoopFunctions;
pub use mixing::{classify, Mixing, MixingBlock, MixingLayout, SmLikeRule};
pub use model::{minimize_order_vev, vev_components, ModelDefinition};
pub use potential::{DiagonalizedMasses, LoopOrder, ModelStage, Potential};
pub use scan::run_points;
pub use tensors::{CurvatureTensors, GaugeCurvature, ModelTensors, YukawaCurvature};
