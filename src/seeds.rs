//! Seed management for the procedural world behind magic maps
//!
//! Each generation system gets its own seed derived from a master seed, so the
//! biome layout can be varied without moving landmarks and the other way round.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Seeds for the world systems a magic map reads from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorldSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Biome climate noise (temperature, moisture, elevation)
    pub biomes: u64,
    /// Stream channels cut through the biome layout
    pub rivers: u64,
    /// Landmark selection per landmark cell
    pub landmarks: u64,
}

impl WorldSeeds {
    /// Create seeds from a master seed, deriving all sub-seeds deterministically.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            biomes: derive_seed(master, "biomes"),
            rivers: derive_seed(master, "rivers"),
            landmarks: derive_seed(master, "landmarks"),
        }
    }

    /// Create a builder for customizing individual seeds
    pub fn builder(master: u64) -> WorldSeedsBuilder {
        WorldSeedsBuilder::new(master)
    }
}

impl Default for WorldSeeds {
    fn default() -> Self {
        Self::from_master(rand::random())
    }
}

/// Builder for customizing individual seeds while deriving others from master
pub struct WorldSeedsBuilder {
    seeds: WorldSeeds,
}

impl WorldSeedsBuilder {
    pub fn new(master: u64) -> Self {
        Self {
            seeds: WorldSeeds::from_master(master),
        }
    }

    pub fn biomes(mut self, seed: u64) -> Self {
        self.seeds.biomes = seed;
        self
    }

    pub fn rivers(mut self, seed: u64) -> Self {
        self.seeds.rivers = seed;
        self
    }

    pub fn landmarks(mut self, seed: u64) -> Self {
        self.seeds.landmarks = seed;
        self
    }

    pub fn build(self) -> WorldSeeds {
        self.seeds
    }
}

/// Derive a sub-seed from a master seed and a system name.
fn derive_seed(master: u64, system: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    system.hash(&mut hasher);
    hasher.finish()
}

/// Seed for one cell of a coarse grid, e.g. a landmark cell.
///
/// Pure function of its inputs, so any thread computing the same cell gets
/// the same stream of random numbers.
pub fn cell_seed(seed: u64, cell_x: i32, cell_z: i32) -> u64 {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    cell_x.hash(&mut hasher);
    cell_z.hash(&mut hasher);
    hasher.finish()
}

impl std::fmt::Display for WorldSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "WorldSeeds {{ master: {}, biomes: {}, rivers: {}, landmarks: {} }}",
            self.master, self.biomes, self.rivers, self.landmarks,
        )
    }
}
