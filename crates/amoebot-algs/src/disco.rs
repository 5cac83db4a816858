//! Disco Demo
//!
//! Particles perform a random walk inside a hexagonal enclosure of static
//! objects, cycling their color every few activations. Two twists keep it
//! interesting: a fraction of particles roll a permanent color at creation,
//! and a particle that finds a same-colored neighbor while trying to move
//! freezes in place and keeps that color forever.

use crate::BuildError;
use amoebot_core::{Activation, Algorithm, Direction, Error, Node, SimRng, System};

/// The rainbow palette a recolorable particle cycles through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoColor {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Indigo,
    Violet,
}

impl DiscoColor {
    pub const ALL: [DiscoColor; 7] = [
        DiscoColor::Red,
        DiscoColor::Orange,
        DiscoColor::Yellow,
        DiscoColor::Green,
        DiscoColor::Blue,
        DiscoColor::Indigo,
        DiscoColor::Violet,
    ];

    /// 0xRRGGBB value used in snapshots.
    pub fn rgb(self) -> u32 {
        match self {
            DiscoColor::Red => 0xff0000,
            DiscoColor::Orange => 0xff9000,
            DiscoColor::Yellow => 0xffff00,
            DiscoColor::Green => 0x00ff00,
            DiscoColor::Blue => 0x0000ff,
            DiscoColor::Indigo => 0x4b0082,
            DiscoColor::Violet => 0xbb00ff,
        }
    }

    fn random(rng: &mut SimRng) -> Self {
        let i = rng.random_int(0, Self::ALL.len() as i32);
        Self::ALL[i as usize]
    }
}

/// One disco particle: a color, whether that color may still change, and a
/// countdown until the next recoloring.
pub struct DiscoParticle {
    color: DiscoColor,
    recolorable: bool,
    counter: u32,
    counter_max: u32,
}

impl DiscoParticle {
    /// Rolls the initial color: one in three particles is permanently red,
    /// one in three permanently blue, the rest start on a random color and
    /// keep recoloring.
    pub fn new(rng: &mut SimRng, counter_max: u32) -> Self {
        let counter_max = counter_max.max(1);
        let (color, recolorable) = match rng.random_int(0, 3) {
            0 => (DiscoColor::Red, false),
            1 => (DiscoColor::Blue, false),
            _ => (DiscoColor::random(rng), true),
        };
        Self {
            color,
            recolorable,
            counter: counter_max,
            counter_max,
        }
    }

    pub fn color(&self) -> DiscoColor {
        self.color
    }

    pub fn is_recolorable(&self) -> bool {
        self.recolorable
    }

    /// True if any particle adjacent to the head wears this particle's color.
    fn sees_same_color_nbr(&self, view: &Activation<'_>) -> bool {
        view.head_labels().into_iter().any(|label| {
            matches!(view.nbr_at_label::<DiscoParticle>(label),
                     Ok(nbr) if nbr.color == self.color)
        })
    }
}

impl Algorithm for DiscoParticle {
    fn activate(&mut self, view: &mut Activation<'_>) -> Result<(), Error> {
        if view.is_contracted() {
            let dir = view.random_direction();
            if view.can_expand(dir) {
                if self.sees_same_color_nbr(view) {
                    // Caught matching a neighbor: stay put, color locks in.
                    self.recolorable = false;
                } else {
                    view.expand(dir)?;
                }
            }
        } else {
            view.contract_tail()?;
        }

        self.counter -= 1;
        if self.counter == 0 {
            self.counter = self.counter_max;
            if self.recolorable {
                let i = view.random_int(0, DiscoColor::ALL.len() as i32);
                self.color = DiscoColor::ALL[i as usize];
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "disco"
    }

    fn head_color(&self) -> Option<u32> {
        Some(self.color.rgb())
    }

    fn inspection_text(&self) -> String {
        format!(
            "color: {:?}\nrecolorable: {}\ncounter: {}/{}",
            self.color, self.recolorable, self.counter, self.counter_max
        )
    }
}

/// Nodes strictly inside the hexagon traced by [`build_disco_system`].
///
/// With side length `s` and the boundary walk starting at the origin, the
/// interior is exactly the nodes with `-s < x < s`, `0 < y < 2s` and
/// `0 < x + y < 2s`.
fn in_hexagon(node: Node, side_len: i32) -> bool {
    node.x > -side_len
        && node.x < side_len
        && node.y > 0
        && node.y < 2 * side_len
        && node.x + node.y > 0
        && node.x + node.y < 2 * side_len
}

fn hexagon_capacity(side_len: i32) -> usize {
    let mut count = 0;
    for x in (-side_len + 1)..side_len {
        for y in 1..(2 * side_len) {
            if in_hexagon(Node::new(x, y), side_len) {
                count += 1;
            }
        }
    }
    count
}

/// Boundary side length of the standard disco enclosure.
const SIDE_LEN: i32 = 10;

/// Builds a disco system: a hexagonal object boundary of side length 10,
/// with `num_particles` particles scattered uniformly inside at random
/// orientations.
pub fn build_disco_system(
    seed: u64,
    num_particles: usize,
    counter_max: u32,
) -> Result<System, BuildError> {
    build_hexagon_system(seed, num_particles, counter_max, SIDE_LEN)
}

/// Same as [`build_disco_system`] but with an explicit enclosure size.
pub fn build_hexagon_system(
    seed: u64,
    num_particles: usize,
    counter_max: u32,
    side_len: i32,
) -> Result<System, BuildError> {
    let side_len = side_len.max(1);
    let capacity = hexagon_capacity(side_len);
    if num_particles > capacity {
        return Err(BuildError::TooManyParticles {
            requested: num_particles,
            capacity,
        });
    }

    let mut system = System::new(seed);

    // Trace the closed boundary: six sides of `side_len` objects each.
    let mut bound = Node::new(0, 0);
    for dir in 0..6 {
        for _ in 0..side_len {
            system.insert_object(bound)?;
            bound = bound.neighbor(Direction::new(dir));
        }
    }

    // Rejection-sample interior positions until every particle is placed.
    let mut placed = 0;
    while placed < num_particles {
        let x = system.rng_mut().random_int(-side_len + 1, side_len);
        let y = system.rng_mut().random_int(1, 2 * side_len);
        let node = Node::new(x, y);
        if in_hexagon(node, side_len) && system.occupant_at(node).is_none() {
            let orientation = Direction::new(system.rng_mut().random_direction() as i32);
            let particle = DiscoParticle::new(system.rng_mut(), counter_max);
            system.insert_particle(node, orientation, Box::new(particle))?;
            placed += 1;
        }
    }

    tracing::debug!(num_particles, side_len, "disco system built");
    Ok(system)
}
