// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Types
// (C) 1998-2026 Miroslav Sotek. All rights reserved.
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
#![deny(unsafe_code)]
//! Type definitions, configuration, Standard-Model inputs and the error
//! hierarchy shared by every crate of the BSMPT engine.

pub mod config;
pub mod error;
pub mod results;
pub mod sm;

pub use config::{DerivativeMethod, EngineConfig};
pub use error::{BsmptError, BsmptResult};
pub use results::{CountertermSet, MassSpectrum, TripleCouplings, TriplePart};
pub use sm::SmConstants;
