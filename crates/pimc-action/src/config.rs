use std::path::Path;

use indexmap::IndexMap;
use pimc_core::errors::ErrorInfo;
use pimc_core::PimcError;
use serde::{Deserialize, Serialize};

use crate::coulomb::{CoulombLinkAction, CoulombParameters};

/// YAML-configurable set of pair actions sharing one time step.
///
/// ```yaml
/// delta_tau: 0.1
/// pairs:
///   electron-hole:
///     q1q2: -1.0
///     epsilon: 12.0
///     mu: 1.0
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Imaginary time step shared by all pairs.
    pub delta_tau: f64,
    /// Pair parameters keyed by pair name, in declaration order.
    #[serde(default)]
    pub pairs: IndexMap<String, PairParameters>,
}

/// Per-pair physical parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PairParameters {
    /// Product of the two charges.
    pub q1q2: f64,
    /// Dielectric constant.
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    /// Reduced mass.
    pub mu: f64,
}

fn default_epsilon() -> f64 {
    1.0
}

impl ActionConfig {
    /// Parses a YAML document.
    pub fn from_yaml_str(text: &str) -> Result<Self, PimcError> {
        serde_yaml::from_str(text).map_err(|err| {
            PimcError::Config(ErrorInfo::new("action-config-parse", err.to_string()))
        })
    }

    /// Reads and parses a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PimcError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|err| {
            PimcError::Io(
                ErrorInfo::new("action-config-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        Self::from_yaml_str(&text)
    }

    /// Constructs every configured pair action in declaration order.
    ///
    /// Stops at the first invalid pair; the error context names it.
    pub fn build(&self) -> Result<IndexMap<String, CoulombLinkAction>, PimcError> {
        let mut actions = IndexMap::with_capacity(self.pairs.len());
        for (name, pair) in &self.pairs {
            let params = CoulombParameters {
                q1q2: pair.q1q2,
                epsilon: pair.epsilon,
                mu: pair.mu,
                delta_tau: self.delta_tau,
            };
            let action = CoulombLinkAction::from_parameters(params).map_err(|err| match err {
                PimcError::Action(info) => {
                    PimcError::Action(info.with_context("pair", name.clone()))
                }
                other => other,
            })?;
            tracing::debug!(pair = %name, "pair action built");
            actions.insert(name.clone(), action);
        }
        Ok(actions)
    }
}
