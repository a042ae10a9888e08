//! Landmarks and where they are placed
//!
//! Landmarks sit at the centers of a coarse grid of landmark cells. Which
//! landmark (if any) a cell holds is a pure function of the world seed and the
//! cell coordinates, so lookups can run on any thread and be cached forever.

use std::fmt;

use rand::distributions::{Distribution, WeightedIndex};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::LandmarkError;
use crate::seeds::cell_seed;

/// A point of interest that can show up as a map decoration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Landmark {
    SmallHollowHill,
    MediumHollowHill,
    LargeHollowHill,
    HedgeMaze,
    QuestGrove,
    MushroomTower,
    NagaCourtyard,
    LichTower,
    IceTower,
    QuestIsland,
    HydraLair,
    Labyrinth,
    DarkTower,
    KnightStronghold,
    YetiCave,
    TrollCave,
    FinalCastle,
}

impl Landmark {
    pub fn name(&self) -> &'static str {
        match self {
            Landmark::SmallHollowHill => "small_hollow_hill",
            Landmark::MediumHollowHill => "medium_hollow_hill",
            Landmark::LargeHollowHill => "large_hollow_hill",
            Landmark::HedgeMaze => "hedge_maze",
            Landmark::QuestGrove => "quest_grove",
            Landmark::MushroomTower => "mushroom_tower",
            Landmark::NagaCourtyard => "naga_courtyard",
            Landmark::LichTower => "lich_tower",
            Landmark::IceTower => "ice_tower",
            Landmark::QuestIsland => "quest_island",
            Landmark::HydraLair => "hydra_lair",
            Landmark::Labyrinth => "labyrinth",
            Landmark::DarkTower => "dark_tower",
            Landmark::KnightStronghold => "knight_stronghold",
            Landmark::YetiCave => "yeti_cave",
            Landmark::TrollCave => "troll_cave",
            Landmark::FinalCastle => "final_castle",
        }
    }
}

impl fmt::Display for Landmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Outcome of a landmark lookup; `None` means the chunk holds no landmark.
pub type LandmarkResult = Option<Landmark>;

/// Oracle deciding where landmarks are and which one a chunk holds.
///
/// Implementations must be deterministic: the same chunk always yields the
/// same answer.
pub trait LandmarkPlacement: Send + Sync {
    /// Whether the world column lies in the footprint of a landmark center.
    fn is_landmark_center(&self, world_x: i32, world_z: i32) -> bool;

    /// The landmark whose center is in this chunk, if any.
    fn landmark_for_chunk(&self, chunk_x: i32, chunk_z: i32) -> Result<LandmarkResult, LandmarkError>;
}

/// Chunks per landmark cell along each axis.
pub const LANDMARK_CELL_CHUNKS: i32 = 16;

/// Relative odds of each outcome for a landmark cell, with the minimum ring
/// (Chebyshev distance from the origin cell, in cells) it may appear in.
const LANDMARK_ODDS: &[(LandmarkResult, u32, i32)] = &[
    (None, 6, 1),
    (Some(Landmark::SmallHollowHill), 10, 1),
    (Some(Landmark::MediumHollowHill), 8, 1),
    (Some(Landmark::LargeHollowHill), 4, 2),
    (Some(Landmark::HedgeMaze), 6, 1),
    (Some(Landmark::MushroomTower), 5, 1),
    (Some(Landmark::QuestIsland), 2, 1),
    (Some(Landmark::NagaCourtyard), 4, 1),
    (Some(Landmark::LichTower), 4, 2),
    (Some(Landmark::Labyrinth), 3, 2),
    (Some(Landmark::HydraLair), 3, 3),
    (Some(Landmark::KnightStronghold), 3, 3),
    (Some(Landmark::DarkTower), 3, 3),
    (Some(Landmark::YetiCave), 2, 3),
    (Some(Landmark::IceTower), 2, 4),
    (Some(Landmark::TrollCave), 2, 4),
    (Some(Landmark::FinalCastle), 1, 5),
];

/// Landmark placement driven by the world's landmark seed.
///
/// Landmark centers are the chunks whose coordinates are both multiples of
/// [`LANDMARK_CELL_CHUNKS`]. The origin cell always holds the quest grove.
#[derive(Clone, Debug)]
pub struct SeededLandmarkPlacement {
    seed: u64,
}

impl SeededLandmarkPlacement {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    pub fn is_center_chunk(chunk_x: i32, chunk_z: i32) -> bool {
        chunk_x.rem_euclid(LANDMARK_CELL_CHUNKS) == 0 && chunk_z.rem_euclid(LANDMARK_CELL_CHUNKS) == 0
    }

    fn pick_for_cell(&self, cell_x: i32, cell_z: i32) -> Result<LandmarkResult, LandmarkError> {
        if cell_x == 0 && cell_z == 0 {
            return Ok(Some(Landmark::QuestGrove));
        }

        let ring = cell_x.abs().max(cell_z.abs());
        let candidates: Vec<_> = LANDMARK_ODDS
            .iter()
            .filter(|(_, _, min_ring)| ring >= *min_ring)
            .collect();

        let weights = WeightedIndex::new(candidates.iter().map(|(_, weight, _)| *weight)).map_err(|e| {
            LandmarkError::Generation {
                chunk_x: cell_x * LANDMARK_CELL_CHUNKS,
                chunk_z: cell_z * LANDMARK_CELL_CHUNKS,
                reason: e.to_string(),
            }
        })?;

        let mut rng = ChaCha8Rng::seed_from_u64(cell_seed(self.seed, cell_x, cell_z));
        Ok(candidates[weights.sample(&mut rng)].0)
    }
}

impl LandmarkPlacement for SeededLandmarkPlacement {
    fn is_landmark_center(&self, world_x: i32, world_z: i32) -> bool {
        Self::is_center_chunk(world_x >> 4, world_z >> 4)
    }

    fn landmark_for_chunk(&self, chunk_x: i32, chunk_z: i32) -> Result<LandmarkResult, LandmarkError> {
        if !Self::is_center_chunk(chunk_x, chunk_z) {
            return Ok(None);
        }
        self.pick_for_cell(
            chunk_x.div_euclid(LANDMARK_CELL_CHUNKS),
            chunk_z.div_euclid(LANDMARK_CELL_CHUNKS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_footprint() {
        let placement = SeededLandmarkPlacement::new(1);

        assert!(placement.is_landmark_center(0, 0));
        assert!(placement.is_landmark_center(15, 15));
        assert!(!placement.is_landmark_center(16, 0));
        assert!(placement.is_landmark_center(256, -256));
        assert!(placement.is_landmark_center(-250, 0));
        assert!(!placement.is_landmark_center(-257, 0));
    }

    #[test]
    fn test_origin_cell_is_quest_grove() {
        let placement = SeededLandmarkPlacement::new(42);
        assert_eq!(placement.landmark_for_chunk(0, 0), Ok(Some(Landmark::QuestGrove)));
    }

    #[test]
    fn test_non_center_chunk_has_nothing() {
        let placement = SeededLandmarkPlacement::new(42);
        assert_eq!(placement.landmark_for_chunk(3, 0), Ok(None));
    }

    #[test]
    fn test_deterministic_per_seed() {
        let a = SeededLandmarkPlacement::new(42);
        let b = SeededLandmarkPlacement::new(42);

        for cell_x in -4..=4 {
            for cell_z in -4..=4 {
                let (cx, cz) = (cell_x * LANDMARK_CELL_CHUNKS, cell_z * LANDMARK_CELL_CHUNKS);
                assert_eq!(a.landmark_for_chunk(cx, cz), b.landmark_for_chunk(cx, cz));
            }
        }
    }

    #[test]
    fn test_inner_ring_excludes_late_landmarks() {
        let placement = SeededLandmarkPlacement::new(7);
        for (cell_x, cell_z) in [(1, 0), (-1, 1), (0, -1), (1, 1)] {
            let found = placement
                .landmark_for_chunk(cell_x * LANDMARK_CELL_CHUNKS, cell_z * LANDMARK_CELL_CHUNKS)
                .unwrap();
            assert!(!matches!(
                found,
                Some(Landmark::FinalCastle | Landmark::HydraLair | Landmark::IceTower)
            ));
        }
    }
}
