//! Random sources for die faces.

use rand::Rng;
use rand::rngs::{StdRng, ThreadRng};

/// Supplies uniform samples for rolling dice.
///
/// Implementations only need [`uniform`](Self::uniform); the face of a die is
/// `floor(u * sides) + 1`.
pub trait RandomSource {
    /// A sample in `[0, 1)`.
    fn uniform(&mut self) -> f64;

    /// Roll one die with `sides` faces, returning a value in `[1, sides]`.
    fn roll_die(&mut self, sides: u32) -> u32 {
        let sides = sides.max(1);
        let face = ((self.uniform() * f64::from(sides)).floor() as u32).saturating_add(1);
        face.clamp(1, sides)
    }
}

impl RandomSource for StdRng {
    fn uniform(&mut self) -> f64 {
        self.random::<f64>()
    }
}

impl RandomSource for ThreadRng {
    fn uniform(&mut self) -> f64 {
        self.random::<f64>()
    }
}

/// A fixed sequence of samples, repeated once exhausted.
#[derive(Debug, Clone, Default)]
pub struct SequenceSource {
    values: Vec<f64>,
    next: usize,
}

impl SequenceSource {
    /// Cycle through the given samples. An empty sequence always yields 0.
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, next: 0 }
    }

    /// Samples that make dice with `sides` faces land on `faces`, in order.
    pub fn for_faces(faces: &[u32], sides: u32) -> Self {
        let sides = f64::from(sides.max(1));
        let values = faces
            .iter()
            .map(|&face| (f64::from(face.max(1)) - 0.5) / sides)
            .collect();
        Self::new(values)
    }
}

impl RandomSource for SequenceSource {
    fn uniform(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.next % self.values.len()];
        self.next = (self.next + 1) % self.values.len();
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn roll_die_maps_uniform_to_faces() {
        let mut src = SequenceSource::new(vec![0.0, 0.49, 0.5, 0.999_999]);
        assert_eq!(src.roll_die(6), 1);
        assert_eq!(src.roll_die(6), 3);
        assert_eq!(src.roll_die(6), 4);
        assert_eq!(src.roll_die(6), 6);
    }

    #[test]
    fn roll_die_clamps_out_of_range_samples() {
        let mut src = SequenceSource::new(vec![1.0, -0.3, f64::NAN]);
        assert_eq!(src.roll_die(8), 8);
        assert_eq!(src.roll_die(8), 1);
        assert_eq!(src.roll_die(8), 1);
        assert_eq!(SequenceSource::new(vec![1.0]).roll_die(u32::MAX), u32::MAX);
    }

    #[test]
    fn sequence_cycles() {
        let mut src = SequenceSource::new(vec![0.1, 0.2]);
        assert_eq!(src.uniform(), 0.1);
        assert_eq!(src.uniform(), 0.2);
        assert_eq!(src.uniform(), 0.1);
    }

    #[test]
    fn empty_sequence_yields_zero() {
        let mut src = SequenceSource::default();
        assert_eq!(src.uniform(), 0.0);
        assert_eq!(src.roll_die(20), 1);
    }

    #[test]
    fn for_faces_hits_requested_faces() {
        let mut src = SequenceSource::for_faces(&[1, 6, 3], 6);
        assert_eq!(src.roll_die(6), 1);
        assert_eq!(src.roll_die(6), 6);
        assert_eq!(src.roll_die(6), 3);
    }

    #[test]
    fn std_rng_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let u = rng.uniform();
            assert!((0.0..1.0).contains(&u));
            assert!((1..=20).contains(&rng.roll_die(20)));
        }
    }
}
