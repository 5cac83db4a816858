//! Amoebot model simulation engine.
//!
//! Particles occupy nodes of a triangular lattice, move by a local
//! expand/contract protocol, and coordinate only through constant-size state
//! exchanged with lattice-adjacent neighbors. The engine owns all particles
//! and static objects, enforces single-occupancy and atomic-motion
//! invariants, and drives execution by activating particles in a fresh
//! random order every round.
//!
//! Concrete algorithms implement [`Algorithm`] and act on the system through
//! the [`Activation`] view handed to them; everything else (visualization,
//! command parsing, persistence) consumes read-only [snapshots].
//!
//! [snapshots]: amoebot_snapshot

pub mod activation;
pub mod algorithm;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod occupancy;
pub mod scheduler;
pub mod system;

pub use activation::Activation;
pub use algorithm::{Algorithm, AsAny};
pub use entity::{EntityRef, Object, ObjectId, ParticleBody, ParticleId};
pub use error::Error;
pub use geometry::{Direction, Node, DIRECTION_COUNT};
pub use occupancy::OccupancyMap;
pub use scheduler::{FaultReport, Scheduler, SchedulerState};
pub use system::{SimRng, System};
