//! Snapshot types for the amoebot simulator.
//!
//! Plain serialization structs describing the state of a particle system at a
//! point in time, decoupled from engine internals. Snapshots are the sole
//! channel consumed by visualization and analysis tooling.

pub mod snapshot;

pub use snapshot::{
    generate_snapshot_id, NodeSnapshot, ObjectSnapshot, ParticleSnapshot, SystemSnapshot,
};
