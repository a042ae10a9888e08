//! Biomes a magic map knows how to read.
//!
//! The set mirrors the twilight dimension's biome layout. A world sampler may
//! also report [`BiomeSample::Unknown`] for columns with no biome information.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Biome of a twilight world column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Biome {
    Forest,
    DenseForest,
    FireflyForest,
    Clearing,
    OakSavannah,
    Stream,
    Lake,
    MushroomForest,
    DenseMushroomForest,
    EnchantedForest,
    SpookyForest,
    Swamp,
    FireSwamp,
    DarkForest,
    DarkForestCenter,
    SnowyForest,
    Glacier,
    Highlands,
    Thornlands,
    FinalPlateau,
    /// Below-ground biome; has no surface color of its own.
    Underground,
}

impl Biome {
    pub const ALL: [Biome; 21] = [
        Biome::Forest,
        Biome::DenseForest,
        Biome::FireflyForest,
        Biome::Clearing,
        Biome::OakSavannah,
        Biome::Stream,
        Biome::Lake,
        Biome::MushroomForest,
        Biome::DenseMushroomForest,
        Biome::EnchantedForest,
        Biome::SpookyForest,
        Biome::Swamp,
        Biome::FireSwamp,
        Biome::DarkForest,
        Biome::DarkForestCenter,
        Biome::SnowyForest,
        Biome::Glacier,
        Biome::Highlands,
        Biome::Thornlands,
        Biome::FinalPlateau,
        Biome::Underground,
    ];

    /// Registry-style name, e.g. `dense_forest`.
    pub fn name(&self) -> &'static str {
        match self {
            Biome::Forest => "forest",
            Biome::DenseForest => "dense_forest",
            Biome::FireflyForest => "firefly_forest",
            Biome::Clearing => "clearing",
            Biome::OakSavannah => "oak_savannah",
            Biome::Stream => "stream",
            Biome::Lake => "lake",
            Biome::MushroomForest => "mushroom_forest",
            Biome::DenseMushroomForest => "dense_mushroom_forest",
            Biome::EnchantedForest => "enchanted_forest",
            Biome::SpookyForest => "spooky_forest",
            Biome::Swamp => "swamp",
            Biome::FireSwamp => "fire_swamp",
            Biome::DarkForest => "dark_forest",
            Biome::DarkForestCenter => "dark_forest_center",
            Biome::SnowyForest => "snowy_forest",
            Biome::Glacier => "glacier",
            Biome::Highlands => "highlands",
            Biome::Thornlands => "thornlands",
            Biome::FinalPlateau => "final_plateau",
            Biome::Underground => "underground",
        }
    }
}

impl fmt::Display for Biome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// What the world reports for one sampled column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BiomeSample {
    /// No biome information for this column.
    #[default]
    Unknown,
    Known(Biome),
}

impl BiomeSample {
    pub fn biome(self) -> Option<Biome> {
        match self {
            BiomeSample::Known(biome) => Some(biome),
            BiomeSample::Unknown => None,
        }
    }

    /// True when this sample is exactly `biome`.
    pub fn is(self, biome: Biome) -> bool {
        self == BiomeSample::Known(biome)
    }

    pub fn is_known(self) -> bool {
        matches!(self, BiomeSample::Known(_))
    }
}

impl From<Biome> for BiomeSample {
    fn from(biome: Biome) -> Self {
        BiomeSample::Known(biome)
    }
}
