//! Engine error taxonomy.
//!
//! Every variant is a local, recoverable condition signaled synchronously to
//! the algorithm that invoked the operation. A well-behaved algorithm checks
//! preconditions (`can_expand`, `has_nbr_at_label`) first and never observes
//! these. Operations are deterministic given the lattice state, so nothing in
//! the engine retries a failed call.

use crate::geometry::Node;
use thiserror::Error;

/// A failed engine operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A claim targeted a node that already has an occupant.
    #[error("site {0} is already occupied")]
    SiteOccupied(Node),

    /// A release targeted a node with no occupant.
    #[error("site {0} is empty")]
    SiteEmpty(Node),

    /// A label outside the particle's current label range.
    #[error("label {label} is out of range ({limit} labels in this state)")]
    InvalidLabel { label: usize, limit: usize },

    /// Expansion attempted while expanded, or into an occupied node.
    #[error("particle at {head} cannot expand")]
    InvalidExpansion { head: Node },

    /// Contraction attempted while contracted.
    #[error("particle at {head} is not expanded")]
    InvalidContraction { head: Node },

    /// A typed neighbor access found no matching entity at the label.
    #[error("no neighbor at label {0}")]
    NoSuchNeighbor(usize),
}
