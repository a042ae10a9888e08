//! Biome to pixel color classification.

use crate::biomes::{Biome, BiomeSample};
use crate::palette::{BiomePalette, ColorBrightness, MapColor};

/// Color for columns the world has no biome for.
pub const NO_BIOME_COLOR: ColorBrightness = ColorBrightness::normal(MapColor::COLOR_BLACK);

/// Color for biomes the palette does not list. Deliberately loud.
pub const MISSING_BIOME_COLOR: ColorBrightness = ColorBrightness::normal(MapColor::COLOR_MAGENTA);

/// Biome that wins over its neighbors when it shows up one sample away.
pub const OVERRIDE_BIOME: Biome = Biome::Stream;

/// Maps sampled biomes to the color a pixel should be painted with.
#[derive(Clone, Debug)]
pub struct PixelColorResolver {
    palette: BiomePalette,
}

impl PixelColorResolver {
    pub fn new(palette: BiomePalette) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> &BiomePalette {
        &self.palette
    }

    /// Resolve the color of a pixel from its own sample and the samples one
    /// step over and one step down.
    ///
    /// Streams are narrower than a pixel, so a stream in either neighbor
    /// sample paints the pixel as stream.
    pub fn resolve(
        &self,
        biome: BiomeSample,
        biome_above: BiomeSample,
        biome_below: BiomeSample,
    ) -> ColorBrightness {
        let BiomeSample::Known(base) = biome else {
            return NO_BIOME_COLOR;
        };

        let biome = if biome_above.is(OVERRIDE_BIOME) || biome_below.is(OVERRIDE_BIOME) {
            OVERRIDE_BIOME
        } else {
            base
        };

        self.palette.get(biome).unwrap_or(MISSING_BIOME_COLOR)
    }
}

impl Default for PixelColorResolver {
    fn default() -> Self {
        Self::new(BiomePalette::twilight())
    }
}
