// ─────────────────────────────────────────────────────────────────────
// BSMPT Engine — Model Registry
// Mirrors: src/utility/ModelIDs.cpp + src/models/IncludeAllModels.cpp
// ─────────────────────────────────────────────────────────────────────
//! Model selection by name, for callers that only carry a string and a
//! flat parameter vector (bindings, scan drivers).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use bsmpt_core::ModelDefinition;
use bsmpt_types::{BsmptError, BsmptResult, SmConstants};

use crate::r2hdm::R2hdm;
use crate::sm::Sm;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModelId {
    Sm,
    R2hdm,
}

impl ModelId {
    pub const ALL: [ModelId; 2] = [ModelId::Sm, ModelId::R2hdm];

    pub fn as_str(self) -> &'static str {
        match self {
            ModelId::Sm => "sm",
            ModelId::R2hdm => "r2hdm",
        }
    }

    /// Length of the flat parameter vector the model reads.
    pub fn n_inputs(self) -> usize {
        match self {
            ModelId::Sm => 0,
            ModelId::R2hdm => 8,
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = BsmptError;

    fn from_str(s: &str) -> BsmptResult<Self> {
        let lower = s.trim().to_ascii_lowercase();
        ModelId::ALL
            .into_iter()
            .find(|id| id.as_str() == lower)
            .ok_or_else(|| BsmptError::Config(format!("unknown model '{s}'")))
    }
}

/// Instantiate `id` from its flat parameter vector. The SM takes no
/// inputs beyond `sm`; extra entries are ignored.
pub fn build_model(
    id: ModelId,
    params: &[f64],
    sm: SmConstants,
) -> BsmptResult<Box<dyn ModelDefinition>> {
    let model: Box<dyn ModelDefinition> = match id {
        ModelId::Sm => Box::new(Sm::new(sm)?),
        ModelId::R2hdm => Box::new(R2hdm::from_slice(params, sm)?),
    };
    log::debug!("built model {id} from {} inputs", params.len());
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("R2HDM".parse::<ModelId>().unwrap(), ModelId::R2hdm);
        assert_eq!(" sm ".parse::<ModelId>().unwrap(), ModelId::Sm);
        assert!(matches!("c2hdm".parse::<ModelId>(), Err(BsmptError::Config(_))));
    }

    #[test]
    fn test_build_checks_inputs() {
        let sm = SmConstants::default();
        let short = build_model(ModelId::R2hdm, &[1.0; 7], sm.clone());
        assert!(matches!(short, Err(BsmptError::Dimension(_))));
        let model = build_model(ModelId::Sm, &[], sm).unwrap();
        assert_eq!(model.n_higgs(), 4);
    }
}
