//! Registry of named, independently seeded random streams.
//!
//! Each stochastic decision point draws from its own stream so that changing
//! how often one process draws never shifts another process's sequence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Uniform};
use std::collections::BTreeMap;

/// A name that selects a random stream. The offset is added to the base
/// seed of the registry, so it must be unique per stream.
pub trait StreamKey: Copy + Ord {
    fn seed_offset(&self) -> u64;
}

/// Named stream -> seeded generator, created once per run
#[derive(Debug, Clone)]
pub struct RandomStreams<K: StreamKey> {
    base_seed: u64,
    streams: BTreeMap<K, StdRng>,
}

impl<K: StreamKey> RandomStreams<K> {
    pub fn new(base_seed: u64) -> Self {
        Self {
            base_seed,
            streams: BTreeMap::new(),
        }
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Generator for `key`, seeded with `base_seed + offset` on first use
    pub fn stream(&mut self, key: K) -> &mut StdRng {
        let seed = self.base_seed.wrapping_add(key.seed_offset());
        self.streams
            .entry(key)
            .or_insert_with(|| StdRng::seed_from_u64(seed))
    }

    /// Uniform draw in `[low, high]`; returns `low` when the range is empty
    pub fn uniform(&mut self, key: K, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        Uniform::new_inclusive(low, high).sample(self.stream(key))
    }

    /// Uniform integer in `[low, high]`; returns `low` when the range is empty
    pub fn int_inclusive(&mut self, key: K, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        self.stream(key).gen_range(low..=high)
    }
}
