//! Concrete amoebot algorithms.
//!
//! Client state machines built purely on the engine's public contract:
//! the disco color-cycling demo and the static energy distribution
//! algorithm, each with a system builder that lays out its initial
//! configuration.

use thiserror::Error;

pub mod disco;
pub mod energy;

pub use disco::{build_disco_system, build_hexagon_system, DiscoColor, DiscoParticle};
pub use energy::{build_energy_system, EnergyParams, EnergyParticle, EnergyState};

/// A failed system setup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// More particles requested than the enclosure can hold.
    #[error("{requested} particles requested but the enclosure holds {capacity}")]
    TooManyParticles { requested: usize, capacity: usize },

    /// An engine operation failed during setup.
    #[error(transparent)]
    Engine(#[from] amoebot_core::Error),
}
