//! Image export of rendered maps
//!
//! Pixels are looked up in the map color table and shaded by their
//! brightness. Color 0 means "never painted" and comes out transparent.

use std::path::Path;

use image::{imageops, ImageBuffer, Rgba, RgbaImage};

use crate::biomes::Biome;
use crate::error::ExportError;
use crate::map_data::{MapDecoration, MapGrid, MAP_SIZE};
use crate::palette::{BiomePalette, MapColor, PixelValue};

const DECORATION_RGBA: [u8; 4] = [0xFF, 0x20, 0x20, 0xFF];

/// RGBA color of one stored pixel.
pub fn pixel_rgba(pixel: PixelValue) -> [u8; 4] {
    let (id, brightness) = pixel.decode();
    match MapColor::by_id(id) {
        Some(color) if id != MapColor::NONE.id => {
            let [r, g, b] = color.shaded_rgb(brightness);
            [r, g, b, 0xFF]
        }
        _ => [0, 0, 0, 0],
    }
}

/// The color a biome is painted with at full detail, black when the palette
/// has no entry for it.
pub fn biome_preview_rgb(palette: &BiomePalette, biome: Biome) -> [u8; 3] {
    palette
        .get(biome)
        .map(|entry| entry.shaded_rgb())
        .unwrap_or([0, 0, 0])
}

/// Map grid as a 128x128 image.
pub fn grid_to_image(grid: &MapGrid) -> RgbaImage {
    ImageBuffer::from_fn(MAP_SIZE as u32, MAP_SIZE as u32, |x, z| {
        Rgba(pixel_rgba(grid.get(x as usize, z as usize)))
    })
}

/// Map grid with a marker over each decoration.
pub fn map_image(grid: &MapGrid, decorations: &[MapDecoration]) -> RgbaImage {
    let mut img = grid_to_image(grid);
    let half = MAP_SIZE as i32 / 2;

    for decoration in decorations {
        // Decoration coordinates are in half pixels from the center.
        let cx = half + decoration.x as i32 / 2;
        let cz = half + decoration.z as i32 / 2;
        for dz in -1..=1 {
            for dx in -1..=1 {
                let (x, z) = (cx + dx, cz + dz);
                if (0..MAP_SIZE as i32).contains(&x) && (0..MAP_SIZE as i32).contains(&z) {
                    img.put_pixel(x as u32, z as u32, Rgba(DECORATION_RGBA));
                }
            }
        }
    }

    img
}

/// Write a map as PNG, enlarged `scale` times with nearest-neighbor sampling.
pub fn export_map_png<P: AsRef<Path>>(
    grid: &MapGrid,
    decorations: &[MapDecoration],
    path: P,
    scale: u32,
) -> Result<(), ExportError> {
    if scale == 0 {
        return Err(ExportError::InvalidScale);
    }

    let img = map_image(grid, decorations);
    let img = if scale == 1 {
        img
    } else {
        let size = MAP_SIZE as u32 * scale;
        imageops::resize(&img, size, size, imageops::FilterType::Nearest)
    };
    img.save(path)?;
    Ok(())
}
