//! The world a magic map looks at
//!
//! Bundles what rendering needs to know about one dimension: its identity,
//! which generator built it, a biome sampler and a landmark placement oracle.
//! Also provides the noise-based biome layout used by the demo binary.

use std::sync::Arc;

use noise::{NoiseFn, Perlin, Seedable};

use crate::biomes::{Biome, BiomeSample};
use crate::landmark_cache::DimensionId;
use crate::landmarks::{LandmarkPlacement, SeededLandmarkPlacement};
use crate::sampling::BiomeSampler;
use crate::seeds::WorldSeeds;

/// Generator behind a dimension. Only twilight terrain has key biome cells
/// and landmarks a magic map can make sense of.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GeneratorKind {
    Twilight,
    Other,
}

impl GeneratorKind {
    pub fn supports_magic_maps(&self) -> bool {
        matches!(self, GeneratorKind::Twilight)
    }
}

/// Everything the engine needs from one dimension.
#[derive(Clone)]
pub struct WorldContext {
    pub dimension: DimensionId,
    pub generator: GeneratorKind,
    pub sampler: Arc<dyn BiomeSampler>,
    pub placement: Arc<dyn LandmarkPlacement>,
    /// Where maps created without a holder position are centered.
    pub spawn: (i32, i32),
}

impl WorldContext {
    /// A twilight dimension laid out from `seeds`.
    pub fn twilight(seeds: &WorldSeeds) -> Self {
        Self {
            dimension: DimensionId::twilight(),
            generator: GeneratorKind::Twilight,
            sampler: Arc::new(NoiseBiomeSampler::new(seeds)),
            placement: Arc::new(SeededLandmarkPlacement::new(seeds.landmarks)),
            spawn: (0, 0),
        }
    }

    pub fn supports_magic_maps(&self) -> bool {
        self.generator.supports_magic_maps()
    }
}

impl std::fmt::Debug for WorldContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldContext")
            .field("dimension", &self.dimension)
            .field("generator", &self.generator)
            .field("spawn", &self.spawn)
            .finish_non_exhaustive()
    }
}

// Noise scales in world columns per noise unit
const CLIMATE_SCALE: f64 = 1400.0;
const DETAIL_SCALE: f64 = 380.0;
const RIVER_SCALE: f64 = 900.0;

/// Half width of a stream channel in river-noise units.
const STREAM_WIDTH: f64 = 0.018;

/// Biome layout from layered Perlin noise.
///
/// Temperature and moisture pick the broad biome family, a finer detail
/// layer varies the forests, and streams follow the zero crossings of a
/// separate river field so they come out as thin winding channels.
#[derive(Clone, Debug)]
pub struct NoiseBiomeSampler {
    temperature: Perlin,
    moisture: Perlin,
    detail: Perlin,
    rivers: Perlin,
    /// Columns farther than this from the origin (Chebyshev) have no biome.
    border: Option<i32>,
}

impl NoiseBiomeSampler {
    pub fn new(seeds: &WorldSeeds) -> Self {
        Self {
            temperature: Perlin::new(1).set_seed(seeds.biomes as u32),
            moisture: Perlin::new(1).set_seed(seeds.biomes.wrapping_add(1) as u32),
            detail: Perlin::new(1).set_seed(seeds.biomes.wrapping_add(2) as u32),
            rivers: Perlin::new(1).set_seed(seeds.rivers as u32),
            border: None,
        }
    }

    /// Stop reporting biomes past `radius` columns from the origin.
    pub fn with_border(mut self, radius: i32) -> Self {
        self.border = Some(radius);
        self
    }

    /// Classify a column, ignoring the border.
    pub fn classify(&self, world_x: i32, world_z: i32) -> Biome {
        let x = world_x as f64;
        let z = world_z as f64;

        let river = self.rivers.get([x / RIVER_SCALE, z / RIVER_SCALE]);
        if river.abs() < STREAM_WIDTH {
            return Biome::Stream;
        }

        let temperature = self.temperature.get([x / CLIMATE_SCALE, z / CLIMATE_SCALE]);
        let moisture = self.moisture.get([x / CLIMATE_SCALE, z / CLIMATE_SCALE]);
        let detail = self.detail.get([x / DETAIL_SCALE, z / DETAIL_SCALE]);

        if moisture > 0.45 {
            return Biome::Lake;
        }

        if temperature < -0.35 {
            return if temperature < -0.5 {
                Biome::Glacier
            } else {
                Biome::SnowyForest
            };
        }

        if temperature > 0.4 {
            return if moisture > 0.15 {
                Biome::FireSwamp
            } else if temperature > 0.55 {
                Biome::FinalPlateau
            } else if detail > 0.0 {
                Biome::Highlands
            } else {
                Biome::Thornlands
            };
        }

        if moisture > 0.25 {
            return Biome::Swamp;
        }

        if moisture < -0.35 {
            return if detail > 0.3 {
                Biome::DarkForestCenter
            } else {
                Biome::DarkForest
            };
        }

        match detail {
            d if d > 0.45 => Biome::Clearing,
            d if d > 0.3 => Biome::OakSavannah,
            d if d > 0.15 => Biome::FireflyForest,
            d if d > 0.0 => Biome::Forest,
            d if d > -0.15 => Biome::DenseForest,
            d if d > -0.3 => Biome::MushroomForest,
            d if d > -0.4 => Biome::DenseMushroomForest,
            d if d > -0.5 => Biome::EnchantedForest,
            _ => Biome::SpookyForest,
        }
    }
}

impl BiomeSampler for NoiseBiomeSampler {
    fn biome_at(&self, world_x: i32, world_z: i32) -> BiomeSample {
        match self.border {
            Some(radius) if world_x.abs().max(world_z.abs()) > radius => BiomeSample::Unknown,
            _ => BiomeSample::Known(self.classify(world_x, world_z)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::BiomePalette;
    use std::collections::HashSet;

    #[test]
    fn test_sampler_is_deterministic() {
        let seeds = WorldSeeds::from_master(42);
        let a = NoiseBiomeSampler::new(&seeds);
        let b = NoiseBiomeSampler::new(&seeds);

        for i in -50..50 {
            let (x, z) = (i * 97, i * -61);
            assert_eq!(a.biome_at(x, z), b.biome_at(x, z));
        }
    }

    #[test]
    fn test_border_reports_unknown() {
        let sampler = NoiseBiomeSampler::new(&WorldSeeds::from_master(3)).with_border(1000);

        assert!(sampler.biome_at(1000, -1000).is_known());
        assert_eq!(sampler.biome_at(1001, 0), BiomeSample::Unknown);
        assert_eq!(sampler.biome_at(0, -5000), BiomeSample::Unknown);
    }

    #[test]
    fn test_layout_is_varied_and_paintable() {
        let sampler = NoiseBiomeSampler::new(&WorldSeeds::from_master(12345));
        let palette = BiomePalette::twilight();
        let mut seen = HashSet::new();

        for x in (-8192..8192).step_by(64) {
            for z in (-8192..8192).step_by(256) {
                let biome = sampler.classify(x, z);
                assert!(palette.get(biome).is_some(), "{biome} has no map color");
                seen.insert(biome);
            }
        }

        assert!(seen.contains(&Biome::Stream));
        assert!(seen.len() >= 5, "only {} biomes", seen.len());
    }

    #[test]
    fn test_twilight_context() {
        let world = WorldContext::twilight(&WorldSeeds::from_master(9));

        assert!(world.supports_magic_maps());
        assert_eq!(world.dimension, DimensionId::twilight());
        assert!(world.placement.is_landmark_center(0, 0));
        assert!(!GeneratorKind::Other.supports_magic_maps());
    }
}
