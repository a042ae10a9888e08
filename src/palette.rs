//! Map colors, brightness levels and the biome palette table.
//!
//! A map pixel is one byte: `color_id * 4 + brightness`. Color ids index the
//! fixed map color table below (ids 0-63); brightness selects one of four
//! shading levels.

use std::collections::BTreeMap;

use crate::biomes::Biome;

/// Highest color id a pixel byte can carry.
pub const MAX_COLOR_ID: u8 = 63;

/// One entry of the map color table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MapColor {
    pub id: u8,
    /// Base color as `0xRRGGBB`.
    pub rgb: u32,
}

impl MapColor {
    pub const NONE: MapColor = MapColor::new(0, 0x000000);
    pub const GRASS: MapColor = MapColor::new(1, 0x7FB238);
    pub const SAND: MapColor = MapColor::new(2, 0xF7E9A3);
    pub const WOOL: MapColor = MapColor::new(3, 0xC7C7C7);
    pub const FIRE: MapColor = MapColor::new(4, 0xFF0000);
    pub const ICE: MapColor = MapColor::new(5, 0xA0A0FF);
    pub const METAL: MapColor = MapColor::new(6, 0xA7A7A7);
    pub const PLANT: MapColor = MapColor::new(7, 0x007C00);
    pub const SNOW: MapColor = MapColor::new(8, 0xFFFFFF);
    pub const CLAY: MapColor = MapColor::new(9, 0xA4A8B8);
    pub const DIRT: MapColor = MapColor::new(10, 0x976D4D);
    pub const STONE: MapColor = MapColor::new(11, 0x707070);
    pub const WATER: MapColor = MapColor::new(12, 0x4040FF);
    pub const WOOD: MapColor = MapColor::new(13, 0x8F7748);
    pub const QUARTZ: MapColor = MapColor::new(14, 0xFFFCF5);
    pub const COLOR_ORANGE: MapColor = MapColor::new(15, 0xD87F33);
    pub const COLOR_MAGENTA: MapColor = MapColor::new(16, 0xB24CD8);
    pub const COLOR_LIGHT_BLUE: MapColor = MapColor::new(17, 0x6699D8);
    pub const COLOR_YELLOW: MapColor = MapColor::new(18, 0xE5E533);
    pub const COLOR_LIGHT_GREEN: MapColor = MapColor::new(19, 0x7FCC19);
    pub const COLOR_PINK: MapColor = MapColor::new(20, 0xF27FA5);
    pub const COLOR_GRAY: MapColor = MapColor::new(21, 0x4C4C4C);
    pub const COLOR_LIGHT_GRAY: MapColor = MapColor::new(22, 0x999999);
    pub const COLOR_CYAN: MapColor = MapColor::new(23, 0x4C7F99);
    pub const COLOR_PURPLE: MapColor = MapColor::new(24, 0x7F3FB2);
    pub const COLOR_BLUE: MapColor = MapColor::new(25, 0x334CB2);
    pub const COLOR_BROWN: MapColor = MapColor::new(26, 0x664C33);
    pub const COLOR_GREEN: MapColor = MapColor::new(27, 0x667F33);
    pub const COLOR_RED: MapColor = MapColor::new(28, 0x993333);
    pub const COLOR_BLACK: MapColor = MapColor::new(29, 0x191919);
    pub const GOLD: MapColor = MapColor::new(30, 0xFAEE4D);
    pub const DIAMOND: MapColor = MapColor::new(31, 0x5CDBD5);
    pub const LAPIS: MapColor = MapColor::new(32, 0x4A80FF);
    pub const EMERALD: MapColor = MapColor::new(33, 0x00D93A);
    pub const PODZOL: MapColor = MapColor::new(34, 0x815631);
    pub const NETHER: MapColor = MapColor::new(35, 0x700200);

    /// Every color in id order.
    pub const TABLE: [MapColor; 36] = [
        MapColor::NONE,
        MapColor::GRASS,
        MapColor::SAND,
        MapColor::WOOL,
        MapColor::FIRE,
        MapColor::ICE,
        MapColor::METAL,
        MapColor::PLANT,
        MapColor::SNOW,
        MapColor::CLAY,
        MapColor::DIRT,
        MapColor::STONE,
        MapColor::WATER,
        MapColor::WOOD,
        MapColor::QUARTZ,
        MapColor::COLOR_ORANGE,
        MapColor::COLOR_MAGENTA,
        MapColor::COLOR_LIGHT_BLUE,
        MapColor::COLOR_YELLOW,
        MapColor::COLOR_LIGHT_GREEN,
        MapColor::COLOR_PINK,
        MapColor::COLOR_GRAY,
        MapColor::COLOR_LIGHT_GRAY,
        MapColor::COLOR_CYAN,
        MapColor::COLOR_PURPLE,
        MapColor::COLOR_BLUE,
        MapColor::COLOR_BROWN,
        MapColor::COLOR_GREEN,
        MapColor::COLOR_RED,
        MapColor::COLOR_BLACK,
        MapColor::GOLD,
        MapColor::DIAMOND,
        MapColor::LAPIS,
        MapColor::EMERALD,
        MapColor::PODZOL,
        MapColor::NETHER,
    ];

    const fn new(id: u8, rgb: u32) -> Self {
        Self { id, rgb }
    }

    pub fn by_id(id: u8) -> Option<MapColor> {
        MapColor::TABLE.get(id as usize).copied()
    }

    /// Base color scaled by the brightness modifier, as `[r, g, b]`.
    pub fn shaded_rgb(&self, brightness: Brightness) -> [u8; 3] {
        let modifier = brightness.modifier();
        let shade = |channel: u32| ((channel & 0xFF) * modifier / 255) as u8;
        [
            shade(self.rgb >> 16),
            shade(self.rgb >> 8),
            shade(self.rgb),
        ]
    }
}

/// Shading level stored in the low two bits of a pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Brightness {
    Low = 0,
    Normal = 1,
    High = 2,
    Lowest = 3,
}

impl Brightness {
    pub const ALL: [Brightness; 4] = [
        Brightness::Low,
        Brightness::Normal,
        Brightness::High,
        Brightness::Lowest,
    ];

    /// Decode the low two bits of a pixel byte.
    pub const fn from_bits(bits: u8) -> Brightness {
        match bits & 3 {
            0 => Brightness::Low,
            1 => Brightness::Normal,
            2 => Brightness::High,
            _ => Brightness::Lowest,
        }
    }

    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Channel multiplier out of 255.
    pub const fn modifier(self) -> u32 {
        match self {
            Brightness::Low => 180,
            Brightness::Normal => 220,
            Brightness::High => 255,
            Brightness::Lowest => 135,
        }
    }
}

/// Encoded map pixel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct PixelValue(pub u8);

impl PixelValue {
    pub const fn encode(color: MapColor, brightness: Brightness) -> PixelValue {
        PixelValue(color.id * 4 + brightness.index())
    }

    pub const fn decode(self) -> (u8, Brightness) {
        (self.color_id(), self.brightness())
    }

    pub const fn color_id(self) -> u8 {
        self.0 >> 2
    }

    pub const fn brightness(self) -> Brightness {
        Brightness::from_bits(self.0)
    }
}

/// A palette entry: which color and how bright.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ColorBrightness {
    pub color: MapColor,
    pub brightness: Brightness,
}

impl ColorBrightness {
    pub const fn new(color: MapColor, brightness: Brightness) -> Self {
        Self { color, brightness }
    }

    pub const fn normal(color: MapColor) -> Self {
        Self::new(color, Brightness::Normal)
    }

    pub const fn pixel(&self) -> PixelValue {
        PixelValue::encode(self.color, self.brightness)
    }

    pub fn shaded_rgb(&self) -> [u8; 3] {
        self.color.shaded_rgb(self.brightness)
    }
}

/// Biome to color lookup table.
///
/// Built once up front and handed to the resolver; never mutated while
/// rendering.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BiomePalette {
    colors: BTreeMap<Biome, ColorBrightness>,
}

impl BiomePalette {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, biome: Biome, color: MapColor, brightness: u8) -> Self {
        self.insert(biome, ColorBrightness::new(color, Brightness::from_bits(brightness)));
        self
    }

    pub fn insert(&mut self, biome: Biome, entry: ColorBrightness) {
        self.colors.insert(biome, entry);
    }

    pub fn get(&self, biome: Biome) -> Option<ColorBrightness> {
        self.colors.get(&biome).copied()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Biome, ColorBrightness)> + '_ {
        self.colors.iter().map(|(b, c)| (*b, *c))
    }

    /// The standard twilight biome palette.
    pub fn twilight() -> Self {
        BiomePalette::empty()
            .with(Biome::Forest, MapColor::PLANT, 1)
            .with(Biome::DenseForest, MapColor::PLANT, 0)
            .with(Biome::Lake, MapColor::WATER, 3)
            .with(Biome::Stream, MapColor::WATER, 1)
            .with(Biome::Swamp, MapColor::DIAMOND, 3)
            .with(Biome::FireSwamp, MapColor::NETHER, 1)
            .with(Biome::Clearing, MapColor::GRASS, 2)
            .with(Biome::OakSavannah, MapColor::GRASS, 0)
            .with(Biome::Highlands, MapColor::DIRT, 0)
            .with(Biome::Thornlands, MapColor::WOOD, 3)
            .with(Biome::FinalPlateau, MapColor::COLOR_LIGHT_GRAY, 2)
            .with(Biome::FireflyForest, MapColor::EMERALD, 1)
            .with(Biome::DarkForest, MapColor::COLOR_GREEN, 3)
            .with(Biome::DarkForestCenter, MapColor::COLOR_ORANGE, 3)
            .with(Biome::SnowyForest, MapColor::SNOW, 1)
            .with(Biome::Glacier, MapColor::ICE, 1)
            .with(Biome::MushroomForest, MapColor::COLOR_ORANGE, 0)
            .with(Biome::DenseMushroomForest, MapColor::COLOR_PINK, 0)
            .with(Biome::EnchantedForest, MapColor::COLOR_CYAN, 2)
            .with(Biome::SpookyForest, MapColor::COLOR_PURPLE, 0)
    }
}
