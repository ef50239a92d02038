// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Engine Configuration
// ─────────────────────────────────────────────────────────────────────

use serde::{Deserialize, Serialize};

use crate::error::{BsmptError, BsmptResult};

/// How the one-loop (Coleman-Weinberg) derivatives are obtained.
///
/// Tree-level and counterterm pieces are always contracted from the
/// curvature tensors; only the one-loop piece has a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DerivativeMethod {
    /// Closed-form expressions in the mass-basis couplings.
    Analytic,
    /// Central differences of the one-loop potential.
    FiniteDifference,
}

/// Numerical thresholds and loop constants for the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Source of the one-loop derivatives.
    /// Default: `Analytic`.
    pub derivative_method: DerivativeMethod,

    /// Step used by every finite-difference stencil.
    /// Default: 1e-4.
    pub fd_eps: f64,

    /// Squared masses below this do not enter the CW potential.
    /// Default: 1e-4.
    pub cw_threshold: f64,

    /// Scalar and gauge squared masses below this are treated as zero.
    /// Default: 1e-5.
    pub zero_mass_threshold: f64,

    /// Fermion squared masses below this are treated as zero.
    /// Default: 1e-10.
    pub fermion_zero_threshold: f64,

    /// Rotation-matrix entries and loop-derivative entries below this
    /// are set to zero.
    /// Default: 1e-10.
    pub numerical_zero: f64,

    /// Max allowed |R·Rᵀ - 1| entry.
    /// Default: 1e-10.
    pub orthogonality_tolerance: f64,

    /// Overlap separating "mixes with this block" from "does not".
    /// Default: 1e-5.
    pub mixing_threshold: f64,

    /// CW constant for scalars.
    /// Default: 1.5.
    pub cb_higgs: f64,

    /// CW constant for gauge bosons.
    /// Default: 5/6.
    pub cb_gauge: f64,

    /// CW constant for fermions.
    /// Default: 1.5.
    pub cb_fermion: f64,

    /// Number of quark colours.
    /// Default: 3.
    pub n_colour: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            derivative_method: DerivativeMethod::Analytic,
            fd_eps: 1e-4,
            cw_threshold: 1e-4,
            zero_mass_threshold: 1e-5,
            fermion_zero_threshold: 1e-10,
            numerical_zero: 1e-10,
            orthogonality_tolerance: 1e-10,
            mixing_threshold: 1e-5,
            cb_higgs: 1.5,
            cb_gauge: 5.0 / 6.0,
            cb_fermion: 1.5,
            n_colour: 3,
        }
    }
}

impl EngineConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> BsmptResult<()> {
        let positive = [
            ("fd_eps", self.fd_eps),
            ("cw_threshold", self.cw_threshold),
            ("zero_mass_threshold", self.zero_mass_threshold),
            ("fermion_zero_threshold", self.fermion_zero_threshold),
            ("orthogonality_tolerance", self.orthogonality_tolerance),
            ("mixing_threshold", self.mixing_threshold),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(BsmptError::Config(format!(
                    "{name} must be finite and > 0, got {value}"
                )));
            }
        }
        if !(self.numerical_zero.is_finite() && self.numerical_zero >= 0.0) {
            return Err(BsmptError::Config(format!(
                "numerical_zero must be finite and >= 0, got {}",
                self.numerical_zero
            )));
        }
        if self.fd_eps >= 1.0 {
            return Err(BsmptError::Config(format!(
                "fd_eps must be < 1, got {}",
                self.fd_eps
            )));
        }
        for (name, value) in [
            ("cb_higgs", self.cb_higgs),
            ("cb_gauge", self.cb_gauge),
            ("cb_fermion", self.cb_fermion),
        ] {
            if !value.is_finite() {
                return Err(BsmptError::Config(format!(
                    "{name} must be finite, got {value}"
                )));
            }
        }
        if self.n_colour == 0 {
            return Err(BsmptError::Config("n_colour must be >= 1".to_string()));
        }
        Ok(())
    }

    /// Load from JSON string.
    pub fn from_json(json: &str) -> BsmptResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| BsmptError::Config(format!("JSON parse error: {e}")))
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> BsmptResult<String> {
        serde_json::to_string(self)
            .map_err(|e| BsmptError::Config(format!("JSON encode error: {e}")))
    }
}
