//! Activation View
//!
//! The window through which an algorithm acts on the system while it is
//! being activated: movement protocol, neighbor queries and the
//! engine-provided randomness primitives. A view lives only for the duration
//! of one activation; neighbor handles obtained through it are short-lived
//! query results resolved by node lookup, never retained references.

use crate::algorithm::Algorithm;
use crate::entity::{EntityRef, ParticleBody};
use crate::error::Error;
use crate::geometry::{Direction, Node};
use crate::system::System;
use std::any::Any;

/// Exclusive access to the system on behalf of one particle.
pub struct Activation<'a> {
    system: &'a mut System,
    index: usize,
}

impl<'a> Activation<'a> {
    pub(crate) fn new(system: &'a mut System, index: usize) -> Self {
        Self { system, index }
    }

    fn body(&self) -> &ParticleBody {
        self.system.body_of(self.index)
    }

    /// The particle's head node.
    pub fn head(&self) -> Node {
        self.body().head()
    }

    /// The particle's tail node; equal to the head while contracted.
    pub fn tail(&self) -> Node {
        self.body().tail()
    }

    /// The particle's fixed orientation.
    pub fn orientation(&self) -> Direction {
        self.body().orientation()
    }

    pub fn is_contracted(&self) -> bool {
        self.body().is_contracted()
    }

    pub fn is_expanded(&self) -> bool {
        self.body().is_expanded()
    }

    /// Number of valid labels in the current contraction state.
    pub fn label_count(&self) -> usize {
        self.body().label_count()
    }

    /// Valid labels adjacent to the head, ascending.
    pub fn head_labels(&self) -> Vec<usize> {
        self.body().head_labels()
    }

    /// Valid labels adjacent to the tail, ascending.
    pub fn tail_labels(&self) -> Vec<usize> {
        self.body().tail_labels()
    }

    /// Absolute lattice direction of a label.
    pub fn label_to_direction(&self, label: usize) -> Result<Direction, Error> {
        self.body().label_to_direction(label)
    }

    /// True iff the particle is contracted and the node behind `label` is
    /// unoccupied. Pure query, no mutation.
    pub fn can_expand(&self, label: usize) -> bool {
        self.system.can_expand(self.index, label)
    }

    /// Expands across the edge behind `label`: the head stays fixed and the
    /// target node is claimed as the new tail.
    pub fn expand(&mut self, label: usize) -> Result<(), Error> {
        self.system.expand(self.index, label)
    }

    /// Contracts into the head, giving up the tail node.
    pub fn contract_head(&mut self) -> Result<(), Error> {
        self.system.contract_head(self.index)
    }

    /// Contracts into the tail: the former tail becomes the sole head.
    pub fn contract_tail(&mut self) -> Result<(), Error> {
        self.system.contract_tail(self.index)
    }

    /// True if a particle occupies the node behind `label`.
    pub fn has_nbr_at_label(&self, label: usize) -> bool {
        matches!(
            self.system.occupant_at_label(self.index, label),
            Ok(Some(EntityRef::Particle(_)))
        )
    }

    /// True if a static object occupies the node behind `label`.
    pub fn nbr_is_object(&self, label: usize) -> bool {
        matches!(
            self.system.occupant_at_label(self.index, label),
            Ok(Some(EntityRef::Object(_)))
        )
    }

    /// The movement-relevant state of the neighboring particle at `label`.
    pub fn nbr_body_at_label(&self, label: usize) -> Result<ParticleBody, Error> {
        match self.system.occupant_at_label(self.index, label)? {
            Some(EntityRef::Particle(id)) => Ok(*self.system.body_of(id.index())),
            _ => Err(Error::NoSuchNeighbor(label)),
        }
    }

    /// Type-asserting access to the neighboring particle's algorithm state.
    ///
    /// Fails with `NoSuchNeighbor` when no particle occupies the node behind
    /// `label` or when the occupant runs a different algorithm type. The
    /// returned borrow is the live entity occupying that node at the moment
    /// of the call.
    pub fn nbr_at_label<A: Algorithm + Any>(&self, label: usize) -> Result<&A, Error> {
        match self.system.occupant_at_label(self.index, label)? {
            Some(EntityRef::Particle(id)) => self
                .system
                .nbr_algorithm(id.index())
                .and_then(|alg| alg.as_any().downcast_ref::<A>())
                .ok_or(Error::NoSuchNeighbor(label)),
            _ => Err(Error::NoSuchNeighbor(label)),
        }
    }

    /// Mutable counterpart of [`nbr_at_label`](Self::nbr_at_label), for
    /// algorithms that write into a neighbor's public state (e.g. energy
    /// transfer through a shared buffer).
    pub fn nbr_at_label_mut<A: Algorithm + Any>(&mut self, label: usize) -> Result<&mut A, Error> {
        let occupant = self.system.occupant_at_label(self.index, label)?;
        match occupant {
            Some(EntityRef::Particle(id)) => self
                .system
                .nbr_algorithm_mut(id.index())
                .and_then(|alg| alg.as_any_mut().downcast_mut::<A>())
                .ok_or(Error::NoSuchNeighbor(label)),
            _ => Err(Error::NoSuchNeighbor(label)),
        }
    }

    /// A uniformly random local direction in 0..6.
    pub fn random_direction(&mut self) -> usize {
        self.system.rng_mut().random_direction()
    }

    /// A uniformly random integer in `[low, high)`. Requires `low < high`.
    pub fn random_int(&mut self, low: i32, high: i32) -> i32 {
        self.system.rng_mut().random_int(low, high)
    }
}
