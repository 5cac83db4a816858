//! Particle System
//!
//! Owns the occupancy map, the insertion-ordered particle and object
//! collections, the seeded random number generator and the round counter.
//! Entities are inserted at setup time and live until the system is dropped.
//!
//! Movement operations validate every precondition before the first
//! claim/release, so the occupancy map never passes through a state where
//! two entities hold one node or a logically occupied node is unclaimed.

use crate::activation::Activation;
use crate::algorithm::Algorithm;
use crate::entity::{EntityRef, Object, ObjectId, ParticleBody, ParticleId};
use crate::error::Error;
use crate::geometry::{Direction, Node, DIRECTION_COUNT};
use crate::occupancy::OccupancyMap;
use amoebot_snapshot::{
    generate_snapshot_id, NodeSnapshot, ObjectSnapshot, ParticleSnapshot, SystemSnapshot,
};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::any::Any;

/// Seeded random number generator owned by the system.
///
/// All randomness in a run flows through this one generator: round
/// shuffling as well as the algorithm-facing primitives. A fixed seed
/// therefore reproduces an identical run.
pub struct SimRng(pub SmallRng);

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(SmallRng::seed_from_u64(seed))
    }

    /// A uniformly random direction label in 0..6.
    pub fn random_direction(&mut self) -> usize {
        self.0.gen_range(0..DIRECTION_COUNT)
    }

    /// A uniformly random integer in `[low, high)`. Requires `low < high`.
    pub fn random_int(&mut self, low: i32, high: i32) -> i32 {
        self.0.gen_range(low..high)
    }

    /// Shuffles a slice in place with a fresh uniform permutation.
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        items.shuffle(&mut self.0);
    }
}

struct ParticleSlot {
    body: ParticleBody,
    /// Taken out for the duration of the particle's own activation.
    algorithm: Option<Box<dyn Algorithm>>,
}

/// The simulation system: all entities plus the lattice they occupy.
pub struct System {
    occupancy: OccupancyMap,
    particles: Vec<ParticleSlot>,
    objects: Vec<Object>,
    rounds: u64,
    rng: SimRng,
}

impl System {
    /// Creates an empty system with a seeded generator.
    pub fn new(seed: u64) -> Self {
        Self {
            occupancy: OccupancyMap::new(),
            particles: Vec::new(),
            objects: Vec::new(),
            rounds: 0,
            rng: SimRng::seeded(seed),
        }
    }

    /// Inserts a contracted particle at `head`. Setup-time only.
    pub fn insert_particle(
        &mut self,
        head: Node,
        orientation: Direction,
        algorithm: Box<dyn Algorithm>,
    ) -> Result<ParticleId, Error> {
        let id = ParticleId(self.particles.len());
        self.occupancy.claim(head, EntityRef::Particle(id))?;
        tracing::debug!(algorithm = algorithm.name(), %head, "inserted particle");
        self.particles.push(ParticleSlot {
            body: ParticleBody::new(head, orientation),
            algorithm: Some(algorithm),
        });
        Ok(id)
    }

    /// Inserts a static object at `node`. Setup-time only.
    pub fn insert_object(&mut self, node: Node) -> Result<ObjectId, Error> {
        let id = ObjectId(self.objects.len());
        self.occupancy.claim(node, EntityRef::Object(id))?;
        self.objects.push(Object::new(node));
        Ok(id)
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Rounds completed so far.
    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    /// The occupant of a node, if any.
    pub fn occupant_at(&self, node: Node) -> Option<EntityRef> {
        self.occupancy.occupant_at(node)
    }

    /// Number of lattice nodes currently claimed.
    pub fn occupied_node_count(&self) -> usize {
        self.occupancy.len()
    }

    /// All particle IDs in insertion order.
    pub fn particle_ids(&self) -> impl Iterator<Item = ParticleId> + '_ {
        (0..self.particles.len()).map(ParticleId)
    }

    /// A particle's movement-relevant state.
    pub fn particle_body(&self, id: ParticleId) -> Option<&ParticleBody> {
        self.particles.get(id.index()).map(|slot| &slot.body)
    }

    /// All objects in insertion order.
    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        self.objects.iter()
    }

    /// Typed access to a particle's algorithm state, for inspection between
    /// activations.
    pub fn algorithm_as<A: Algorithm + Any>(&self, id: ParticleId) -> Option<&A> {
        self.particles
            .get(id.index())?
            .algorithm
            .as_deref()?
            .as_any()
            .downcast_ref::<A>()
    }

    /// The system's random number generator.
    pub fn rng_mut(&mut self) -> &mut SimRng {
        &mut self.rng
    }

    pub(crate) fn advance_round(&mut self) {
        self.rounds += 1;
    }

    pub(crate) fn body_of(&self, index: usize) -> &ParticleBody {
        &self.particles[index].body
    }

    pub(crate) fn nbr_algorithm(&self, index: usize) -> Option<&dyn Algorithm> {
        self.particles.get(index)?.algorithm.as_deref()
    }

    pub(crate) fn nbr_algorithm_mut(
        &mut self,
        index: usize,
    ) -> Option<&mut (dyn Algorithm + 'static)> {
        self.particles.get_mut(index)?.algorithm.as_deref_mut()
    }

    pub(crate) fn algorithm_name(&self, index: usize) -> &'static str {
        self.nbr_algorithm(index).map(|a| a.name()).unwrap_or("?")
    }

    /// Runs one particle's activation with exclusive system access.
    pub(crate) fn activate(&mut self, index: usize) -> Result<(), Error> {
        let Some(mut algorithm) = self.particles[index].algorithm.take() else {
            return Ok(());
        };
        let mut view = Activation::new(self, index);
        let result = algorithm.activate(&mut view);
        self.particles[index].algorithm = Some(algorithm);
        result
    }

    pub(crate) fn occupant_at_label(
        &self,
        index: usize,
        label: usize,
    ) -> Result<Option<EntityRef>, Error> {
        let node = self.particles[index].body.neighbor_at_label(label)?;
        Ok(self.occupancy.occupant_at(node))
    }

    pub(crate) fn can_expand(&self, index: usize, label: usize) -> bool {
        let body = &self.particles[index].body;
        if body.is_expanded() {
            return false;
        }
        match body.label_to_direction(label) {
            Ok(dir) => !self.occupancy.is_occupied(body.head().neighbor(dir)),
            Err(_) => false,
        }
    }

    pub(crate) fn expand(&mut self, index: usize, label: usize) -> Result<(), Error> {
        let body = *self.body_of(index);
        if body.is_expanded() {
            return Err(Error::InvalidExpansion { head: body.head() });
        }
        let dir = body.label_to_direction(label)?;
        let target = body.head().neighbor(dir);
        if self.occupancy.is_occupied(target) {
            // Objects and other particles are rejected identically.
            return Err(Error::InvalidExpansion { head: body.head() });
        }
        self.occupancy.claim(target, EntityRef::Particle(ParticleId(index)))?;
        self.particles[index].body.set_expanded(dir);
        Ok(())
    }

    pub(crate) fn contract_head(&mut self, index: usize) -> Result<(), Error> {
        let body = *self.body_of(index);
        if body.is_contracted() {
            return Err(Error::InvalidContraction { head: body.head() });
        }
        self.occupancy.release(body.tail())?;
        self.particles[index].body.contract_to_head();
        Ok(())
    }

    pub(crate) fn contract_tail(&mut self, index: usize) -> Result<(), Error> {
        let body = *self.body_of(index);
        if body.is_contracted() {
            return Err(Error::InvalidContraction { head: body.head() });
        }
        self.occupancy.release(body.head())?;
        self.particles[index].body.contract_to_tail();
        Ok(())
    }

    /// Captures the read-only view of every live entity.
    pub fn snapshot(&self, triggered_by: &str) -> SystemSnapshot {
        let mut snap = SystemSnapshot::new(
            generate_snapshot_id(self.rounds),
            self.rounds,
            triggered_by,
        );
        for slot in &self.particles {
            let body = &slot.body;
            let head = body.head();
            let mut particle = ParticleSnapshot::new(
                slot.algorithm.as_deref().map(|a| a.name()).unwrap_or("?"),
                NodeSnapshot::new(head.x, head.y),
                body.orientation().index() as u8,
            );
            if let Some(dir) = body.tail_dir() {
                let tail = body.tail();
                particle.tail = Some(NodeSnapshot::new(tail.x, tail.y));
                particle.tail_dir = Some(dir.index() as u8);
            }
            if let Some(alg) = slot.algorithm.as_deref() {
                particle.head_color = alg.head_color();
                particle.tail_color = if body.is_expanded() {
                    alg.tail_color()
                } else {
                    None
                };
                particle.head_mark_label = alg.head_mark_label().map(|l| l as u8);
                particle.inspection = alg.inspection_text();
            }
            snap.particles.push(particle);
        }
        for object in &self.objects {
            let node = object.node();
            snap.objects
                .push(ObjectSnapshot::new(NodeSnapshot::new(node.x, node.y)));
        }
        snap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test algorithm: expands in a fixed direction when possible,
    /// otherwise contracts into its tail.
    struct Walker {
        dir: usize,
        moves: u32,
    }

    impl Walker {
        fn new(dir: usize) -> Self {
            Self { dir, moves: 0 }
        }
    }

    impl Algorithm for Walker {
        fn activate(&mut self, view: &mut Activation<'_>) -> Result<(), Error> {
            if view.is_contracted() {
                if view.can_expand(self.dir) {
                    view.expand(self.dir)?;
                    self.moves += 1;
                }
            } else {
                view.contract_tail()?;
            }
            Ok(())
        }

        fn name(&self) -> &'static str {
            "walker"
        }

        fn head_color(&self) -> Option<u32> {
            Some(0x00ff00)
        }

        fn inspection_text(&self) -> String {
            format!("moves: {}", self.moves)
        }
    }

    fn single_walker(dir: usize) -> (System, ParticleId) {
        let mut system = System::new(7);
        let id = system
            .insert_particle(Node::new(0, 0), Direction::new(0), Box::new(Walker::new(dir)))
            .unwrap();
        (system, id)
    }

    #[test]
    fn test_insert_rejects_occupied_site() {
        let (mut system, _) = single_walker(0);
        let err = system
            .insert_particle(Node::new(0, 0), Direction::new(1), Box::new(Walker::new(0)))
            .unwrap_err();
        assert_eq!(err, Error::SiteOccupied(Node::new(0, 0)));

        let err = system.insert_object(Node::new(0, 0)).unwrap_err();
        assert_eq!(err, Error::SiteOccupied(Node::new(0, 0)));
        assert_eq!(system.particle_count(), 1);
        assert_eq!(system.object_count(), 0);
    }

    #[test]
    fn test_expansion_then_tail_contraction_moves_particle() {
        // expand(2) from (0,0), then contract the tail: the particle ends
        // up contracted on the former tail node (-1,1).
        let (mut system, id) = single_walker(2);

        system.activate(0).unwrap();
        let body = system.particle_body(id).unwrap();
        assert!(body.is_expanded());
        assert_eq!(body.head(), Node::new(0, 0));
        assert_eq!(body.tail(), Node::new(-1, 1));
        assert_eq!(body.tail_dir(), Some(Direction::new(2)));
        assert_eq!(system.occupied_node_count(), 2);

        system.activate(0).unwrap();
        let body = system.particle_body(id).unwrap();
        assert!(body.is_contracted());
        assert_eq!(body.head(), Node::new(-1, 1));
        assert!(system.occupant_at(Node::new(0, 0)).is_none());
        assert_eq!(system.occupied_node_count(), 1);
    }

    #[test]
    fn test_expand_into_particle_is_rejected() {
        let (mut system, a) = single_walker(0);
        // Direction 0 from (0,0) is (1,0); occupy it.
        system
            .insert_particle(Node::new(1, 0), Direction::new(0), Box::new(Walker::new(0)))
            .unwrap();

        assert!(!system.can_expand(0, 0));
        let err = system.expand(0, 0).unwrap_err();
        assert_eq!(err, Error::InvalidExpansion { head: Node::new(0, 0) });

        // Occupancy unchanged.
        assert!(system.particle_body(a).unwrap().is_contracted());
        assert_eq!(system.occupied_node_count(), 2);
    }

    #[test]
    fn test_expand_into_object_is_rejected() {
        let (mut system, _) = single_walker(0);
        system.insert_object(Node::new(1, 0)).unwrap();

        assert!(!system.can_expand(0, 0));
        assert_eq!(
            system.expand(0, 0).unwrap_err(),
            Error::InvalidExpansion { head: Node::new(0, 0) }
        );
    }

    #[test]
    fn test_expand_while_expanded_is_rejected() {
        let (mut system, _) = single_walker(1);
        system.expand(0, 1).unwrap();
        assert_eq!(
            system.expand(0, 3).unwrap_err(),
            Error::InvalidExpansion { head: Node::new(0, 0) }
        );
    }

    #[test]
    fn test_contract_while_contracted_is_rejected() {
        let (mut system, _) = single_walker(0);
        assert_eq!(
            system.contract_head(0).unwrap_err(),
            Error::InvalidContraction { head: Node::new(0, 0) }
        );
        assert_eq!(
            system.contract_tail(0).unwrap_err(),
            Error::InvalidContraction { head: Node::new(0, 0) }
        );
    }

    #[test]
    fn test_head_contraction_restores_original_site() {
        let (mut system, id) = single_walker(4);
        system.expand(0, 4).unwrap();
        let target = Node::new(0, -1);
        assert!(system.occupant_at(target).is_some());

        system.contract_head(0).unwrap();
        let body = system.particle_body(id).unwrap();
        assert!(body.is_contracted());
        assert_eq!(body.head(), Node::new(0, 0));
        assert!(system.occupant_at(target).is_none());
    }

    /// Test algorithm: writes into adjacent walkers' state.
    struct Nudger;

    impl Algorithm for Nudger {
        fn activate(&mut self, view: &mut Activation<'_>) -> Result<(), Error> {
            for label in view.head_labels() {
                if let Ok(nbr) = view.nbr_at_label_mut::<Walker>(label) {
                    nbr.moves += 1;
                }
            }
            Ok(())
        }

        fn name(&self) -> &'static str {
            "nudger"
        }
    }

    #[test]
    fn test_neighbor_state_mutation() {
        let mut system = System::new(2);
        system
            .insert_particle(Node::new(0, 0), Direction::new(0), Box::new(Nudger))
            .unwrap();
        let walker = system
            .insert_particle(Node::new(1, 0), Direction::new(0), Box::new(Walker::new(0)))
            .unwrap();

        system.activate(0).unwrap();
        assert_eq!(system.algorithm_as::<Walker>(walker).unwrap().moves, 1);
    }

    #[test]
    fn test_algorithm_downcast() {
        let (mut system, id) = single_walker(0);
        system.activate(0).unwrap();

        let walker: &Walker = system.algorithm_as::<Walker>(id).unwrap();
        assert_eq!(walker.moves, 1);
    }

    #[test]
    fn test_snapshot_reflects_expansion() {
        let (mut system, _) = single_walker(2);
        system.insert_object(Node::new(5, 5)).unwrap();
        system.activate(0).unwrap();

        let snap = system.snapshot("manual");
        assert_eq!(snap.round, 0);
        assert_eq!(snap.triggered_by, "manual");
        assert_eq!(snap.particles.len(), 1);
        assert_eq!(snap.objects.len(), 1);

        let p = &snap.particles[0];
        assert_eq!(p.algorithm, "walker");
        assert!(p.is_expanded());
        assert_eq!(p.tail_dir, Some(2));
        assert_eq!(p.head_color, Some(0x00ff00));
        assert_eq!(p.tail_color, Some(0x00ff00));
        assert_eq!(p.inspection, "moves: 1");
    }

    #[test]
    fn test_single_occupancy_invariant_over_many_activations() {
        let mut system = System::new(3);
        for i in 0..4 {
            system
                .insert_particle(
                    Node::new(i, 0),
                    Direction::new(0),
                    Box::new(Walker::new(1)),
                )
                .unwrap();
        }

        for step in 0..50 {
            system.activate(step % 4).unwrap();
            // Every particle's claimed nodes map back to it, and the claim
            // count matches the sum of per-particle footprints.
            let mut expected = 0;
            for id in system.particle_ids().collect::<Vec<_>>() {
                let body = system.particle_body(id).unwrap();
                let (head, tail) = body.occupied_nodes();
                assert_eq!(system.occupant_at(head), Some(EntityRef::Particle(id)));
                expected += 1;
                if let Some(tail) = tail {
                    assert_eq!(system.occupant_at(tail), Some(EntityRef::Particle(id)));
                    expected += 1;
                }
            }
            assert_eq!(system.occupied_node_count(), expected);
        }
    }
}
