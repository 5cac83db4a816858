//! Static Energy Distribution
//!
//! A stationary particle system distributes energy from an external source
//! attached to a single root. Idle particles join a spanning tree by
//! adopting a rooted neighbor as parent; energy then flows down the tree
//! through per-particle transfer buffers. A stress signal propagates up from
//! particles whose batteries are not full, and the root broadcasts an
//! inhibit signal down once nothing is stressed, pausing the harvest.
//!
//! Particles never move here, so a stored parent label stays valid forever.

use crate::BuildError;
use amoebot_core::{Activation, Algorithm, Direction, Error, Node, System};

/// Tree role of an energy particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnergyState {
    /// The unique particle attached to the external energy source.
    Root,
    /// Not yet part of the spanning tree.
    Idle,
    /// In the tree, with a parent toward the root.
    Active,
}

/// Tuning shared by every particle in an energy system.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergyParams {
    /// Energy moved per transfer step, source-to-root or parent-to-child.
    pub harvest_rate: f64,
    /// Maximum battery and buffer fill.
    pub capacity: f64,
    /// Energy cost of one action when `is_dynamic` is set.
    pub threshold: f64,
    /// Total energy in the external source. Infinite by default.
    pub source_energy: f64,
    /// Whether particles spend energy on actions or only accumulate it.
    pub is_dynamic: bool,
}

impl Default for EnergyParams {
    fn default() -> Self {
        Self {
            harvest_rate: 1.0,
            capacity: 10.0,
            threshold: 5.0,
            source_energy: f64::INFINITY,
            is_dynamic: false,
        }
    }
}

/// One particle of the energy distribution system.
pub struct EnergyParticle {
    params: EnergyParams,
    state: EnergyState,
    /// Label of the parent in the spanning tree; `None` for root and idle.
    parent_label: Option<usize>,
    battery: f64,
    buffer: f64,
    stress: bool,
    inhibit: bool,
    /// Energy remaining in the external source. Meaningful on the root only.
    source_pool: f64,
    actions: u64,
}

impl EnergyParticle {
    pub fn root(params: EnergyParams) -> Self {
        Self {
            params,
            state: EnergyState::Root,
            parent_label: None,
            battery: 0.0,
            buffer: 0.0,
            stress: false,
            inhibit: false,
            source_pool: params.source_energy,
            actions: 0,
        }
    }

    pub fn idle(params: EnergyParams) -> Self {
        Self {
            state: EnergyState::Idle,
            source_pool: 0.0,
            ..Self::root(params)
        }
    }

    pub fn state(&self) -> EnergyState {
        self.state
    }

    pub fn battery(&self) -> f64 {
        self.battery
    }

    pub fn buffer(&self) -> f64 {
        self.buffer
    }

    pub fn actions(&self) -> u64 {
        self.actions
    }

    pub fn source_pool(&self) -> f64 {
        self.source_pool
    }

    /// True if the particle behind `label` claims this particle as parent.
    fn is_child(&self, view: &Activation<'_>, label: usize) -> bool {
        let Ok(nbr) = view.nbr_at_label::<EnergyParticle>(label) else {
            return false;
        };
        let Some(parent) = nbr.parent_label else {
            return false;
        };
        let Ok(body) = view.nbr_body_at_label(label) else {
            return false;
        };
        body.neighbor_at_label(parent)
            .map(|node| node == view.head())
            .unwrap_or(false)
    }

    /// Adopt the first rooted neighbor as parent, if any.
    fn try_join_tree(&mut self, view: &Activation<'_>) {
        for label in view.head_labels() {
            if let Ok(nbr) = view.nbr_at_label::<EnergyParticle>(label) {
                if nbr.state != EnergyState::Idle {
                    self.parent_label = Some(label);
                    self.state = EnergyState::Active;
                    tracing::trace!(parent = label, "particle joined energy tree");
                    return;
                }
            }
        }
    }

    /// Refresh the stress and inhibit signals from children and parent.
    fn communicate(&mut self, view: &Activation<'_>) -> Result<(), Error> {
        let child_stressed = view.head_labels().into_iter().any(|label| {
            self.is_child(view, label)
                && view
                    .nbr_at_label::<EnergyParticle>(label)
                    .map(|nbr| nbr.stress)
                    .unwrap_or(false)
        });
        self.stress = self.battery < self.params.capacity || child_stressed;
        self.inhibit = match self.parent_label {
            Some(label) => view.nbr_at_label::<EnergyParticle>(label)?.inhibit,
            None => !self.stress,
        };
        Ok(())
    }

    /// Pull one dose of energy toward this particle, then top up the
    /// battery. Whatever stays in the buffer is there for children to take.
    fn harvest_energy(&mut self, view: &mut Activation<'_>) -> Result<(), Error> {
        if !self.inhibit {
            let room = self.params.capacity - self.buffer;
            let take = match self.parent_label {
                None => {
                    let take = self.params.harvest_rate.min(self.source_pool).min(room);
                    self.source_pool -= take;
                    take
                }
                Some(label) => {
                    let parent = view.nbr_at_label_mut::<EnergyParticle>(label)?;
                    let take = self.params.harvest_rate.min(parent.buffer).min(room);
                    parent.buffer -= take;
                    take
                }
            };
            self.buffer += take;
        }

        let fill = (self.params.capacity - self.battery).min(self.buffer);
        self.battery += fill;
        self.buffer -= fill;
        Ok(())
    }

    /// Spend a threshold's worth of energy on an action, if affordable.
    fn use_energy(&mut self) {
        if self.params.is_dynamic && self.battery >= self.params.threshold {
            self.battery -= self.params.threshold;
            self.actions += 1;
        }
    }
}

impl Algorithm for EnergyParticle {
    fn activate(&mut self, view: &mut Activation<'_>) -> Result<(), Error> {
        if self.state == EnergyState::Idle {
            self.try_join_tree(view);
            if self.state == EnergyState::Idle {
                return Ok(());
            }
        }
        self.communicate(view)?;
        self.harvest_energy(view)?;
        self.use_energy();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "energy"
    }

    fn head_color(&self) -> Option<u32> {
        let fill = self.battery / self.params.capacity;
        match self.state {
            EnergyState::Idle => None,
            EnergyState::Root => Some(energy_color(0x000000, 0xff0000, fill)),
            EnergyState::Active => Some(energy_color(0x000000, 0x00ff00, fill)),
        }
    }

    fn head_mark_label(&self) -> Option<usize> {
        self.parent_label
    }

    fn inspection_text(&self) -> String {
        format!(
            "state: {:?}\nbattery: {:.2}\nbuffer: {:.2}\nstress: {}\ninhibit: {}\nactions: {}",
            self.state, self.battery, self.buffer, self.stress, self.inhibit, self.actions
        )
    }
}

/// Channel-wise blend of two 0xRRGGBB colors; `frac` 0.0 gives `color1`,
/// 1.0 gives `color2`.
pub fn energy_color(color1: u32, color2: u32, frac: f64) -> u32 {
    let f = frac.clamp(0.0, 1.0);
    let mut blended = 0u32;
    for shift in [16u32, 8, 0] {
        let a = ((color1 >> shift) & 0xff) as f64;
        let b = ((color2 >> shift) & 0xff) as f64;
        let channel = (a + (b - a) * f).round() as u32;
        blended |= (channel & 0xff) << shift;
    }
    blended
}

/// Builds an energy system: the root at the origin with `num_particles - 1`
/// idle particles packed around it in concentric hexagonal rings, each with
/// a random orientation.
pub fn build_energy_system(
    seed: u64,
    num_particles: usize,
    params: EnergyParams,
) -> Result<System, BuildError> {
    let mut system = System::new(seed);
    if num_particles == 0 {
        return Ok(system);
    }

    system.insert_particle(
        Node::new(0, 0),
        Direction::new(0),
        Box::new(EnergyParticle::root(params)),
    )?;

    let mut placed = 1;
    let mut radius = 1;
    'rings: while placed < num_particles {
        let mut node = Node::new(radius, 0);
        for dir in [2, 3, 4, 5, 0, 1] {
            for _ in 0..radius {
                if placed == num_particles {
                    break 'rings;
                }
                let orientation = Direction::new(system.rng_mut().random_direction() as i32);
                system.insert_particle(node, orientation, Box::new(EnergyParticle::idle(params)))?;
                placed += 1;
                node = node.neighbor(Direction::new(dir));
            }
        }
        radius += 1;
    }

    tracing::debug!(num_particles, rings = radius, "energy system built");
    Ok(system)
}

#[cfg(test)]
mod tests {
    use super::*;
    use amoebot_core::Scheduler;

    fn states(system: &System) -> Vec<EnergyState> {
        system
            .particle_ids()
            .map(|id| system.algorithm_as::<EnergyParticle>(id).unwrap().state())
            .collect()
    }

    #[test]
    fn test_build_places_root_at_origin() {
        let system = build_energy_system(5, 7, EnergyParams::default()).unwrap();
        assert_eq!(system.particle_count(), 7);

        let root_id = system
            .particle_ids()
            .find(|&id| system.algorithm_as::<EnergyParticle>(id).unwrap().state() == EnergyState::Root)
            .unwrap();
        assert_eq!(
            system.particle_body(root_id).unwrap().head(),
            Node::new(0, 0)
        );
        assert_eq!(
            states(&system)
                .iter()
                .filter(|&&s| s == EnergyState::Idle)
                .count(),
            6
        );
    }

    #[test]
    fn test_idle_particles_join_the_tree() {
        let mut scheduler = Scheduler::new(build_energy_system(3, 19, EnergyParams::default()).unwrap());
        // Tree growth needs at most one round per ring; 19 particles span
        // two rings around the root.
        scheduler.run(5).unwrap();

        let system = scheduler.system();
        for id in system.particle_ids().collect::<Vec<_>>() {
            let p = system.algorithm_as::<EnergyParticle>(id).unwrap();
            match p.state() {
                EnergyState::Root => assert!(p.head_mark_label().is_none()),
                EnergyState::Active => assert!(p.head_mark_label().is_some()),
                EnergyState::Idle => panic!("particle still idle after 5 rounds"),
            }
        }
    }

    #[test]
    fn test_energy_reaches_every_battery() {
        let params = EnergyParams::default();
        let mut scheduler = Scheduler::new(build_energy_system(11, 7, params).unwrap());
        scheduler.run(400).unwrap();

        let system = scheduler.system();
        for id in system.particle_ids().collect::<Vec<_>>() {
            let p = system.algorithm_as::<EnergyParticle>(id).unwrap();
            assert!(
                p.battery() >= params.capacity - 1e-9,
                "battery at {:.2} after 400 rounds",
                p.battery()
            );
        }
    }

    #[test]
    fn test_finite_source_is_conserved() {
        let params = EnergyParams {
            source_energy: 5.0,
            ..EnergyParams::default()
        };
        let mut scheduler = Scheduler::new(build_energy_system(2, 7, params).unwrap());
        scheduler.run(100).unwrap();

        let system = scheduler.system();
        let mut total = 0.0;
        for id in system.particle_ids().collect::<Vec<_>>() {
            let p = system.algorithm_as::<EnergyParticle>(id).unwrap();
            total += p.battery() + p.buffer() + p.source_pool();
        }
        assert!((total - 5.0).abs() < 1e-9, "energy total drifted to {total}");
    }

    #[test]
    fn test_dynamic_particles_spend_energy() {
        let params = EnergyParams {
            is_dynamic: true,
            ..EnergyParams::default()
        };
        let mut scheduler = Scheduler::new(build_energy_system(4, 7, params).unwrap());
        scheduler.run(400).unwrap();

        let system = scheduler.system();
        let total_actions: u64 = system
            .particle_ids()
            .map(|id| system.algorithm_as::<EnergyParticle>(id).unwrap().actions())
            .sum();
        assert!(total_actions > 0);
    }

    #[test]
    fn test_root_inhibits_once_saturated() {
        let mut scheduler = Scheduler::new(build_energy_system(6, 7, EnergyParams::default()).unwrap());
        scheduler.run(400).unwrap();

        let system = scheduler.system();
        let root_id = system
            .particle_ids()
            .find(|&id| system.algorithm_as::<EnergyParticle>(id).unwrap().state() == EnergyState::Root)
            .unwrap();
        let root = system.algorithm_as::<EnergyParticle>(root_id).unwrap();
        assert!(root.inhibit, "root still harvesting with all batteries full");
    }

    #[test]
    fn test_energy_color_blend() {
        assert_eq!(energy_color(0x000000, 0x00ff00, 0.0), 0x000000);
        assert_eq!(energy_color(0x000000, 0x00ff00, 1.0), 0x00ff00);
        assert_eq!(energy_color(0x000000, 0x00ff00, 0.5), 0x008000);
        // Out-of-range fractions clamp.
        assert_eq!(energy_color(0x102030, 0x405060, 2.0), 0x405060);
    }
}
