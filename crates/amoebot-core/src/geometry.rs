//! Lattice Geometry
//!
//! Axial coordinates on the triangular lattice and the six-direction port
//! system. Directions are numbered 0-5 counterclockwise and wrap modulo 6;
//! every node has exactly one neighbor per direction.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of lattice directions.
pub const DIRECTION_COUNT: usize = 6;

/// Unit vectors for directions 0-5, counterclockwise starting at east.
const UNIT_VECTORS: [(i32, i32); DIRECTION_COUNT] =
    [(1, 0), (0, 1), (-1, 1), (-1, 0), (0, -1), (1, -1)];

/// One of the six lattice directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Direction(u8);

impl Direction {
    /// Creates a direction from any integer, wrapping modulo 6.
    pub fn new(index: i32) -> Self {
        Self(index.rem_euclid(DIRECTION_COUNT as i32) as u8)
    }

    /// The direction's index in 0..6.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// This direction rotated counterclockwise by `offset` steps.
    pub fn rotated(self, offset: i32) -> Self {
        Self::new(self.0 as i32 + offset)
    }

    /// The opposite direction.
    pub fn opposite(self) -> Self {
        self.rotated(3)
    }

    /// All six directions in ascending index order.
    pub fn all() -> impl Iterator<Item = Direction> {
        (0..DIRECTION_COUNT as i32).map(Direction::new)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node of the triangular lattice in axial coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Node {
    pub x: i32,
    pub y: i32,
}

impl Node {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The unique adjacent node in the given direction. Pure and total.
    pub fn neighbor(self, dir: Direction) -> Node {
        let (dx, dy) = UNIT_VECTORS[dir.index()];
        Node::new(self.x + dx, self.y + dy)
    }

    /// All six adjacent nodes in ascending direction order.
    pub fn neighbors(self) -> impl Iterator<Item = Node> {
        Direction::all().map(move |d| self.neighbor(d))
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_wraps_modulo_six() {
        assert_eq!(Direction::new(6), Direction::new(0));
        assert_eq!(Direction::new(-1), Direction::new(5));
        assert_eq!(Direction::new(2).rotated(5), Direction::new(1));
        assert_eq!(Direction::new(4).opposite(), Direction::new(1));
    }

    #[test]
    fn test_neighbor_round_trip() {
        let node = Node::new(3, -2);
        for dir in Direction::all() {
            let back = node.neighbor(dir).neighbor(dir.opposite());
            assert_eq!(back, node);
        }
    }

    #[test]
    fn test_neighbors_are_distinct() {
        let node = Node::new(0, 0);
        let neighbors: Vec<Node> = node.neighbors().collect();
        assert_eq!(neighbors.len(), 6);
        for (i, a) in neighbors.iter().enumerate() {
            assert_ne!(*a, node);
            for b in neighbors.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_walking_a_hexagon_closes() {
        // Following each direction once traces a closed hexagon.
        let mut node = Node::new(0, 0);
        for dir in Direction::all() {
            node = node.neighbor(dir);
        }
        // Adjacent unit vectors sum pairwise to zero around the ring.
        assert_eq!(node, Node::new(0, 0));
    }
}
