//! Per-map state: the pixel grid, landmark search state and the map store.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::cooldown::GameTick;
use crate::landmark_cache::DimensionId;
use crate::landmarks::Landmark;
use crate::palette::PixelValue;
use crate::tilemap::Tilemap;

/// Map width and height in pixels.
pub const MAP_SIZE: usize = 128;

/// World columns covered by one pixel along each axis.
pub const BLOCKS_PER_PIXEL: i32 = 16;

/// Magic map centers snap to this grid so one map covers one key biome cell.
pub const KEY_BIOME_GRID: i32 = 2048;

/// Icon size of landmark decorations.
pub const DECORATION_SIZE: u8 = 8;

/// Scale new maps are created with.
pub const DEFAULT_SCALE: u8 = 3;

/// Inclusive bounding box of pixels changed since the last flush.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirtyRect {
    pub min_x: usize,
    pub min_z: usize,
    pub max_x: usize,
    pub max_z: usize,
}

impl DirtyRect {
    fn point(x: usize, z: usize) -> Self {
        Self {
            min_x: x,
            min_z: z,
            max_x: x,
            max_z: z,
        }
    }

    fn include(&mut self, x: usize, z: usize) {
        self.min_x = self.min_x.min(x);
        self.min_z = self.min_z.min(z);
        self.max_x = self.max_x.max(x);
        self.max_z = self.max_z.max(z);
    }
}

/// The 128x128 pixel buffer of one map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapGrid {
    pixels: Tilemap<PixelValue>,
    dirty: Option<DirtyRect>,
}

impl MapGrid {
    pub fn new() -> Self {
        Self {
            pixels: Tilemap::new(MAP_SIZE, MAP_SIZE),
            dirty: None,
        }
    }

    pub fn get(&self, x: usize, z: usize) -> PixelValue {
        *self.pixels.get(x, z)
    }

    /// Write a pixel, marking the grid dirty when the value changes.
    /// Returns whether it changed.
    pub fn set(&mut self, x: usize, z: usize, value: PixelValue) -> bool {
        if self.get(x, z) == value {
            return false;
        }
        self.pixels.set(x, z, value);
        match self.dirty.as_mut() {
            Some(rect) => rect.include(x, z),
            None => self.dirty = Some(DirtyRect::point(x, z)),
        }
        true
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_some()
    }

    /// Hand the dirty region to whoever persists or broadcasts the map and
    /// reset it.
    pub fn take_dirty(&mut self) -> Option<DirtyRect> {
        self.dirty.take()
    }
}

impl Default for MapGrid {
    fn default() -> Self {
        Self::new()
    }
}

/// A landmark icon to draw on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MapDecoration {
    pub landmark: Landmark,
    /// Position in half-pixel units relative to the map center.
    pub x: i8,
    pub z: i8,
    pub size: u8,
}

impl MapDecoration {
    pub fn new(landmark: Landmark, x: i8, z: i8) -> Self {
        Self {
            landmark,
            x,
            z,
            size: DECORATION_SIZE,
        }
    }
}

/// Landmark search bookkeeping for one map.
#[derive(Clone, Debug, Default)]
pub struct SearchState {
    pub last_search_tick: Option<GameTick>,
    pub pending_decorations: Vec<MapDecoration>,
    scan_epoch: u64,
}

impl SearchState {
    /// Start a new scan pass at `now`: forget the previous decorations and
    /// return the epoch that this pass's results must carry.
    pub fn begin_scan(&mut self, now: GameTick) -> u64 {
        self.pending_decorations.clear();
        self.last_search_tick = Some(now);
        self.scan_epoch += 1;
        self.scan_epoch
    }

    pub fn scan_epoch(&self) -> u64 {
        self.scan_epoch
    }

    /// Append a decoration found by the scan pass `epoch`. Results of older
    /// passes are dropped.
    pub fn push_decoration(&mut self, epoch: u64, decoration: MapDecoration) -> bool {
        if epoch != self.scan_epoch {
            return false;
        }
        self.pending_decorations.push(decoration);
        true
    }
}

/// Search state shared between a map and its outstanding landmark callbacks.
pub type SharedSearchState = Rc<RefCell<SearchState>>;

/// Numeric id of a map item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapId(pub u32);

impl MapId {
    /// Storage key of the map, e.g. `magicmap_3`.
    pub fn storage_name(&self) -> String {
        format!("magicmap_{}", self.0)
    }
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything a magic map remembers.
#[derive(Debug)]
pub struct MagicMapData {
    pub id: MapId,
    pub center_x: i32,
    pub center_z: i32,
    pub scale: u8,
    pub dimension: DimensionId,
    pub grid: MapGrid,
    search: SharedSearchState,
}

impl MagicMapData {
    pub fn new(id: MapId, center_x: i32, center_z: i32, scale: u8, dimension: DimensionId) -> Self {
        Self {
            id,
            center_x,
            center_z,
            scale,
            dimension,
            grid: MapGrid::new(),
            search: Rc::new(RefCell::new(SearchState::default())),
        }
    }

    /// Create a map whose center snaps to the key biome grid around `(x, z)`.
    pub fn aligned(id: MapId, x: i32, z: i32, scale: u8, dimension: DimensionId) -> Self {
        let (center_x, center_z) = aligned_center(x, z);
        Self::new(id, center_x, center_z, scale, dimension)
    }

    pub fn search(&self) -> &SharedSearchState {
        &self.search
    }

    pub fn last_search_tick(&self) -> Option<GameTick> {
        self.search.borrow().last_search_tick
    }

    /// Snapshot of the decorations found so far.
    pub fn decorations(&self) -> Vec<MapDecoration> {
        self.search.borrow().pending_decorations.clone()
    }
}

/// Snap a world position to the center of its key biome cell. Cells span
/// `KEY_BIOME_GRID` columns and are centered on odd multiples of half a cell,
/// so `(0, 0)` to `(2048, 2048)` is one map.
pub fn aligned_center(x: i32, z: i32) -> (i32, i32) {
    let grid = i64::from(KEY_BIOME_GRID);
    let half = grid / 2;
    let snap = |v: i32| {
        // Round half up.
        let cells = ((i64::from(v) - half) as f64 / grid as f64 + 0.5).floor() as i64;
        // Every i32 snaps to a center that is itself an i32.
        (cells * grid + half) as i32
    };
    (snap(x), snap(z))
}

/// String-keyed storage for map data, standing in for the world's saved data.
#[derive(Debug, Default)]
pub struct MapDataStore {
    maps: HashMap<String, MagicMapData>,
    next_id: u32,
}

impl MapDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next unused map id.
    pub fn free_id(&mut self) -> MapId {
        while self.maps.contains_key(&MapId(self.next_id).storage_name()) {
            self.next_id += 1;
        }
        let id = MapId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Create and register a new map around `(x, z)`.
    pub fn create(&mut self, x: i32, z: i32, scale: u8, dimension: DimensionId) -> MapId {
        let id = self.free_id();
        self.insert(MagicMapData::aligned(id, x, z, scale, dimension));
        id
    }

    /// Register map data under its storage name, replacing any previous map
    /// with the same id. Callbacks still pointing at the replaced map are
    /// invalidated with it.
    pub fn insert(&mut self, data: MagicMapData) -> Option<MagicMapData> {
        self.maps.insert(data.id.storage_name(), data)
    }

    pub fn get(&self, id: MapId) -> Option<&MagicMapData> {
        self.maps.get(&id.storage_name())
    }

    pub fn get_mut(&mut self, id: MapId) -> Option<&mut MagicMapData> {
        self.maps.get_mut(&id.storage_name())
    }

    /// Look a map up, creating it around the world spawn if it has never
    /// been stored.
    pub fn get_or_create(
        &mut self,
        id: MapId,
        spawn: (i32, i32),
        dimension: &DimensionId,
    ) -> &mut MagicMapData {
        self.maps.entry(id.storage_name()).or_insert_with(|| {
            MagicMapData::aligned(id, spawn.0, spawn.1, DEFAULT_SCALE, dimension.clone())
        })
    }

    pub fn remove(&mut self, id: MapId) -> Option<MagicMapData> {
        self.maps.remove(&id.storage_name())
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}
