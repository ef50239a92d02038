// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Error Hierarchy
// ─────────────────────────────────────────────────────────────────────

use thiserror::Error;

/// Root error type for all engine failures.
///
/// Every variant is fatal for the call that produced it. Negative
/// squared masses are diagnostics, not errors, and never show up here.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BsmptError {
    /// A routine was called before the setup step it depends on.
    #[error("precondition violated in {routine}: {requirement}")]
    Precondition {
        routine: &'static str,
        requirement: &'static str,
    },

    /// Rotation matrix failed the R·Rᵀ = 1 check.
    #[error("rotation matrix is not orthogonal: max |R·Rᵀ - 1| = {deviation:e}")]
    NonOrthogonal { deviation: f64 },

    /// A mass eigenstate could not be assigned to a mixing block.
    #[error("mixing classification failed: {0}")]
    Mixing(String),

    /// Unknown Yukawa scheme enumerator.
    #[error("invalid model type: {0}")]
    InvalidModelType(i64),

    /// Input vector/tensor has the wrong shape.
    #[error("dimension mismatch: {0}")]
    Dimension(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Numerical error (NaN/Inf in computation).
    #[error("numerical error: {0}")]
    Numerical(String),
}

pub type BsmptResult<T> = Result<T, BsmptError>;

impl BsmptError {
    pub fn precondition(routine: &'static str, requirement: &'static str) -> Self {
        Self::Precondition {
            routine,
            requirement,
        }
    }

    /// Fail unless `got == expected`.
    pub fn check_len(what: &str, got: usize, expected: usize) -> BsmptResult<()> {
        if got != expected {
            return Err(Self::Dimension(format!(
                "{what}: expected length {expected}, got {got}"
            )));
        }
        Ok(())
    }
}
