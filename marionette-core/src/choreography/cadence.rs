//! Randomized pacing

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Uniform random delays in an inclusive millisecond range
#[derive(Debug, Clone)]
pub struct Cadence {
    rng: SmallRng,
    min_ms: u32,
    max_ms: u32,
}

impl Cadence {
    /// Create a cadence with its own random stream
    ///
    /// Bounds given in the wrong order are swapped.
    pub fn new(seed: u64, min_ms: u32, max_ms: u32) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }

    /// Seed for one node's cadence
    ///
    /// Mixing the address into the seed keeps nodes that boot together from
    /// blinking in lockstep.
    pub fn seed_for(address: u8, uptime_us: u64) -> u64 {
        uptime_us ^ (u64::from(address) << 56) ^ (u64::from(address) * 0x9E37_79B9)
    }

    /// Next delay in `[min_ms, max_ms]`
    pub fn next_delay_ms(&mut self) -> u32 {
        self.rng.gen_range(self.min_ms..=self.max_ms)
    }

    pub fn min_ms(&self) -> u32 {
        self.min_ms
    }

    pub fn max_ms(&self) -> u32 {
        self.max_ms
    }
}
