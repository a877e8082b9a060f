#![deny(missing_docs)]
#![doc = "Pair link actions for path integral Monte Carlo of charged particles."]

/// YAML pair-action configuration.
pub mod config;
/// Coulomb pair action with short-distance correction.
pub mod coulomb;
pub mod origin;

use pimc_core::Vec3;

pub use config::{ActionConfig, PairParameters};
pub use coulomb::{CoulombLinkAction, CoulombParameters};
pub use origin::exact_origin_action;

/// Interaction contribution of one pair to the action of one time step.
///
/// `delta1` and `delta2` are the relative displacements of the pair at the
/// start and end of the step. Implementations are immutable after
/// construction and safe to share across threads.
pub trait LinkAction: Send + Sync {
    /// Action for the given pair of relative displacements.
    fn value(&self, delta1: &Vec3, delta2: &Vec3) -> f64;
}
