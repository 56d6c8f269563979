//! Injectable source of uniform draws

use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Uniform draws over [0, 1)
pub trait RandomSource {
    fn next_unit(&mut self) -> f64;
}

impl RandomSource for ChaCha8Rng {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Replays a fixed sequence of draws, cycling when exhausted, and counts how
/// many were taken.
#[derive(Debug, Clone)]
pub struct ScriptedDraws {
    draws: Vec<f64>,
    drawn: usize,
}

impl ScriptedDraws {
    pub fn new(draws: Vec<f64>) -> Self {
        Self { draws, drawn: 0 }
    }

    /// Number of draws consumed so far
    pub fn drawn(&self) -> usize {
        self.drawn
    }
}

impl RandomSource for ScriptedDraws {
    fn next_unit(&mut self) -> f64 {
        let value = if self.draws.is_empty() {
            0.0
        } else {
            self.draws[self.drawn % self.draws.len()]
        };
        self.drawn += 1;
        value
    }
}
