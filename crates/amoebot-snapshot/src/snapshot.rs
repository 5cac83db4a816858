//! Snapshot Types
//!
//! Serialization structs for system snapshots published after each round.
//!
//! Snapshots capture every live entity's lattice position together with its
//! presentation state (display colors, port marker, inspection text). They
//! carry no references back into the engine, so they can cross thread
//! boundaries and be persisted as JSON.

use serde::{Deserialize, Serialize};

/// Generates a snapshot ID with the given sequence number.
pub fn generate_snapshot_id(sequence: u64) -> String {
    format!("snap_{:06}", sequence)
}

/// A lattice node as a plain coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub x: i32,
    pub y: i32,
}

impl NodeSnapshot {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One particle's externally visible state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleSnapshot {
    /// Name of the algorithm driving this particle
    pub algorithm: String,
    /// Head node (always occupied)
    pub head: NodeSnapshot,
    /// Tail node, present iff the particle is expanded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tail: Option<NodeSnapshot>,
    /// Orientation index, one of 6 rotations
    pub orientation: u8,
    /// Global direction from head to tail while expanded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tail_dir: Option<u8>,
    /// Head ring color as 0xRRGGBB
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_color: Option<u32>,
    /// Tail ring color as 0xRRGGBB
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tail_color: Option<u32>,
    /// Label of the port carrying the head marker
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_mark_label: Option<u8>,
    /// Free-text dump of the particle's algorithm-local state
    #[serde(default)]
    pub inspection: String,
}

impl ParticleSnapshot {
    /// Creates a contracted particle snapshot with required fields.
    pub fn new(algorithm: impl Into<String>, head: NodeSnapshot, orientation: u8) -> Self {
        Self {
            algorithm: algorithm.into(),
            head,
            tail: None,
            orientation,
            tail_dir: None,
            head_color: None,
            tail_color: None,
            head_mark_label: None,
            inspection: String::new(),
        }
    }

    /// True if the particle occupied two nodes when captured.
    pub fn is_expanded(&self) -> bool {
        self.tail.is_some()
    }

    /// Formats the head color as a hex string, if any.
    pub fn head_color_hex(&self) -> Option<String> {
        self.head_color.map(|c| format!("#{:06x}", c))
    }
}

/// One static object's position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSnapshot {
    pub node: NodeSnapshot,
}

impl ObjectSnapshot {
    pub fn new(node: NodeSnapshot) -> Self {
        Self { node }
    }
}

/// Complete system snapshot published at a round boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub snapshot_id: String,
    /// Rounds completed when this snapshot was taken
    pub round: u64,
    /// What caused the snapshot ("round", "step", "manual")
    pub triggered_by: String,
    pub particles: Vec<ParticleSnapshot>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<ObjectSnapshot>,
}

impl SystemSnapshot {
    /// Creates an empty snapshot with required fields.
    pub fn new(snapshot_id: impl Into<String>, round: u64, triggered_by: impl Into<String>) -> Self {
        Self {
            snapshot_id: snapshot_id.into(),
            round,
            triggered_by: triggered_by.into(),
            particles: Vec::new(),
            objects: Vec::new(),
        }
    }

    /// Finds the particle whose head or tail occupies the given node.
    pub fn particle_at(&self, x: i32, y: i32) -> Option<&ParticleSnapshot> {
        let node = NodeSnapshot::new(x, y);
        self.particles
            .iter()
            .find(|p| p.head == node || p.tail == Some(node))
    }

    /// Returns the number of expanded particles.
    pub fn expanded_count(&self) -> usize {
        self.particles.iter().filter(|p| p.is_expanded()).count()
    }

    /// Returns the number of lattice nodes claimed by any entity.
    pub fn occupied_node_count(&self) -> usize {
        let particle_nodes: usize = self
            .particles
            .iter()
            .map(|p| if p.is_expanded() { 2 } else { 1 })
            .sum();
        particle_nodes + self.objects.len()
    }

    /// Serializes the snapshot to pretty JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serializes the snapshot to compact JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes a snapshot from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
