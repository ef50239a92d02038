// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Models
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Concrete scalar sectors for the engine: the Standard Model and the
//! CP-conserving two-Higgs-doublet model in its four Yukawa types.

pub mod doublet;
pub mod r2hdm;
pub mod registry;
pub mod sm;

pub use doublet::{Doublet, N_LEPTONS, N_QUARKS};
pub use r2hdm::{R2hdm, R2hdmParams, YukawaType};
pub use registry::{build_model, ModelId};
pub use sm::Sm;
