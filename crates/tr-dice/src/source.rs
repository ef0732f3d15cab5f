//! Random sources for dice.

use rand::Rng;

/// Anything that can produce a single die face.
///
/// Every [`rand::Rng`] is a dice source. Tests and replays use
/// [`FixedRolls`] instead.
pub trait DiceSource {
    /// Roll one die with `sides` faces, returning a value in `1..=sides`.
    fn roll_die(&mut self, sides: u32) -> u32;
}

impl<R: Rng> DiceSource for R {
    fn roll_die(&mut self, sides: u32) -> u32 {
        self.random_range(1..=sides.max(1))
    }
}

/// A rigged source that replays a fixed list of faces in draw order.
///
/// The list repeats once exhausted. Each face is clamped into
/// `1..=sides` of the die being rolled.
#[derive(Debug, Clone)]
pub struct FixedRolls {
    faces: Vec<u32>,
    next: usize,
}

impl FixedRolls {
    /// Create a source replaying `faces`. An empty list always rolls 1.
    pub fn new(faces: Vec<u32>) -> Self {
        Self {
            faces,
            next: 0,
        }
    }

    /// Number of faces drawn so far.
    pub fn draws(&self) -> usize {
        self.next
    }
}

impl DiceSource for FixedRolls {
    fn roll_die(&mut self, sides: u32) -> u32 {
        let face = if self.faces.is_empty() {
            1
        } else {
            self.faces[self.next % self.faces.len()]
        };
        self.next += 1;
        face.clamp(1, sides.max(1))
    }
}
