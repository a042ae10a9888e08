//! Debug script to print the biome palette with shaded colors

use magic_map::biomes::Biome;
use magic_map::export::biome_preview_rgb;
use magic_map::palette::{BiomePalette, Brightness, MapColor};

fn main() {
    let palette = BiomePalette::twilight();

    println!("=== BIOME PALETTE ({} entries) ===", palette.len());
    println!("{:<24} {:<6} {:<8} {:<8}", "biome", "color", "shade", "rgb");
    for biome in Biome::ALL {
        let [r, g, b] = biome_preview_rgb(&palette, biome);
        match palette.get(biome) {
            Some(entry) => println!(
                "{:<24} {:<6} {:<8} #{:02X}{:02X}{:02X}",
                biome,
                entry.color.id,
                format!("{:?}", entry.brightness),
                r,
                g,
                b
            ),
            None => println!("{:<24} (none, paints magenta)", biome),
        }
    }

    println!();
    println!("=== MAP COLORS ===");
    for color in MapColor::TABLE {
        let shades: Vec<String> = Brightness::ALL
            .iter()
            .map(|brightness| {
                let [r, g, b] = color.shaded_rgb(*brightness);
                format!("#{:02X}{:02X}{:02X}", r, g, b)
            })
            .collect();
        println!("{:>2}: {}", color.id, shades.join(" "));
    }
}
