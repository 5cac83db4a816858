//! Entity Model
//!
//! Movement-relevant state for the two occupant kinds: particles, which own a
//! head node, a fixed orientation and (while expanded) a global tail
//! direction, and objects, which are immovable single-node occupants.
//!
//! Label resolution lives here because it depends on the particle's
//! contraction state. A contracted particle exposes 6 port labels, one per
//! direction. An expanded particle exposes 10: five around the head and five
//! around the tail, enumerated in rotational order around the two-node shape;
//! the two ports along the head-tail edge do not exist.

use crate::error::Error;
use crate::geometry::{Direction, Node};

/// Labels exposed by a contracted particle.
pub const CONTRACTED_LABEL_COUNT: usize = 6;
/// Labels exposed by an expanded particle.
pub const EXPANDED_LABEL_COUNT: usize = 10;

/// Index of a particle in its system, stable for the system's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticleId(pub(crate) usize);

impl ParticleId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of an object in its system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub(crate) usize);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Reference to whichever entity occupies a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    Particle(ParticleId),
    Object(ObjectId),
}

/// An immovable lattice occupant used as a boundary or obstacle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Object {
    node: Node,
}

impl Object {
    pub fn new(node: Node) -> Self {
        Self { node }
    }

    pub fn node(&self) -> Node {
        self.node
    }
}

/// A particle's movement-relevant state.
///
/// The particle is contracted (occupies `head` only) or expanded (occupies
/// `head` and the adjacent node in `tail_dir`); these are the only phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParticleBody {
    head: Node,
    orientation: Direction,
    tail_dir: Option<Direction>,
}

impl ParticleBody {
    /// Creates a contracted body at `head` with the given orientation.
    pub fn new(head: Node, orientation: Direction) -> Self {
        Self {
            head,
            orientation,
            tail_dir: None,
        }
    }

    pub fn head(&self) -> Node {
        self.head
    }

    /// The local rotation of the particle's label frame, fixed at creation.
    pub fn orientation(&self) -> Direction {
        self.orientation
    }

    /// Global direction from head to tail while expanded.
    pub fn tail_dir(&self) -> Option<Direction> {
        self.tail_dir
    }

    /// The tail node; equal to the head while contracted.
    pub fn tail(&self) -> Node {
        match self.tail_dir {
            Some(dir) => self.head.neighbor(dir),
            None => self.head,
        }
    }

    pub fn is_contracted(&self) -> bool {
        self.tail_dir.is_none()
    }

    pub fn is_expanded(&self) -> bool {
        self.tail_dir.is_some()
    }

    /// The nodes this particle currently claims.
    pub fn occupied_nodes(&self) -> (Node, Option<Node>) {
        (self.head, self.tail_dir.map(|d| self.head.neighbor(d)))
    }

    /// Number of valid labels in the current contraction state.
    pub fn label_count(&self) -> usize {
        if self.is_contracted() {
            CONTRACTED_LABEL_COUNT
        } else {
            EXPANDED_LABEL_COUNT
        }
    }

    /// Tail direction in the particle's local frame.
    fn local_tail_dir(&self) -> Option<Direction> {
        self.tail_dir
            .map(|d| d.rotated(-(self.orientation.index() as i32)))
    }

    /// Maps a label to its direction in the local frame.
    ///
    /// Expanded labels enumerate the ports counterclockwise around the
    /// two-node shape starting just past the tail edge: with local tail
    /// direction `t`, head label `i` maps to `t + 1 + i` and tail label
    /// `5 + i` maps to `t + 4 + i` (mod 6). The head-tail edge itself has
    /// no port on either side.
    fn label_to_local_dir(&self, label: usize) -> Result<Direction, Error> {
        let limit = self.label_count();
        if label >= limit {
            return Err(Error::InvalidLabel { label, limit });
        }
        match self.local_tail_dir() {
            None => Ok(Direction::new(label as i32)),
            Some(t) => {
                if label < 5 {
                    Ok(t.rotated(1 + label as i32))
                } else {
                    Ok(t.rotated(4 + (label - 5) as i32))
                }
            }
        }
    }

    /// Maps a label to its absolute lattice direction.
    ///
    /// For a contracted particle this is `(label + orientation) mod 6`.
    pub fn label_to_direction(&self, label: usize) -> Result<Direction, Error> {
        let local = self.label_to_local_dir(label)?;
        Ok(local.rotated(self.orientation.index() as i32))
    }

    /// True if the label is a port of the head node.
    pub fn label_is_head(&self, label: usize) -> Result<bool, Error> {
        let limit = self.label_count();
        if label >= limit {
            return Err(Error::InvalidLabel { label, limit });
        }
        Ok(self.is_contracted() || label < 5)
    }

    /// The adjacent node addressed by a label.
    pub fn neighbor_at_label(&self, label: usize) -> Result<Node, Error> {
        let dir = self.label_to_direction(label)?;
        let base = if self.label_is_head(label)? {
            self.head
        } else {
            self.tail()
        };
        Ok(base.neighbor(dir))
    }

    /// Valid labels adjacent to the head, in ascending canonical order.
    pub fn head_labels(&self) -> Vec<usize> {
        if self.is_contracted() {
            (0..CONTRACTED_LABEL_COUNT).collect()
        } else {
            (0..5).collect()
        }
    }

    /// Valid labels adjacent to the tail, in ascending canonical order.
    ///
    /// For a contracted particle the tail is the head, so this equals
    /// `head_labels()`.
    pub fn tail_labels(&self) -> Vec<usize> {
        if self.is_contracted() {
            (0..CONTRACTED_LABEL_COUNT).collect()
        } else {
            (5..EXPANDED_LABEL_COUNT).collect()
        }
    }

    pub(crate) fn set_expanded(&mut self, tail_dir: Direction) {
        self.tail_dir = Some(tail_dir);
    }

    /// Contract into the head: the tail node is given up.
    pub(crate) fn contract_to_head(&mut self) {
        self.tail_dir = None;
    }

    /// Contract into the tail: the former tail becomes the sole head.
    pub(crate) fn contract_to_tail(&mut self) {
        if let Some(dir) = self.tail_dir.take() {
            self.head = self.head.neighbor(dir);
        }
    }
}
