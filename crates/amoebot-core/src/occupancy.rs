//! Occupancy Map
//!
//! The single source of truth for which entity claims which lattice node.
//! `claim` and `release` are the only primitives that mutate lattice state;
//! every higher-level operation (insertion, expansion, contraction) validates
//! its preconditions fully before touching the map, so at most one entity
//! ever holds a node and no transient double-occupancy is observable.

use crate::entity::EntityRef;
use crate::error::Error;
use crate::geometry::Node;
use std::collections::HashMap;

/// Mapping from lattice node to at most one occupant.
#[derive(Debug, Default)]
pub struct OccupancyMap {
    sites: HashMap<Node, EntityRef>,
}

impl OccupancyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the occupant of a node, if any.
    pub fn occupant_at(&self, node: Node) -> Option<EntityRef> {
        self.sites.get(&node).copied()
    }

    /// True if any entity claims the node.
    pub fn is_occupied(&self, node: Node) -> bool {
        self.sites.contains_key(&node)
    }

    /// Claims a node for an entity. Fails if the node is already claimed.
    pub fn claim(&mut self, node: Node, entity: EntityRef) -> Result<(), Error> {
        if self.sites.contains_key(&node) {
            return Err(Error::SiteOccupied(node));
        }
        self.sites.insert(node, entity);
        Ok(())
    }

    /// Releases a node, returning its former occupant. Fails if unclaimed.
    pub fn release(&mut self, node: Node) -> Result<EntityRef, Error> {
        self.sites.remove(&node).ok_or(Error::SiteEmpty(node))
    }

    /// Number of claimed nodes.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
