//! Map rendering pass
//!
//! One call paints the part of a map visible around a viewer from a region
//! snapshot. Pixels near the edge of the visible disc are repainted on a
//! checkerboard so the explored area fades out instead of ending in a hard
//! circle. When the cooldown allows it, the same pass also asks the landmark
//! search for every landmark center it paints.

use std::rc::{Rc, Weak};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::MagicMapConfig;
use crate::cooldown::{should_search, GameTick};
use crate::landmark_cache::LandmarkKey;
use crate::landmarks::{LandmarkPlacement, LandmarkResult};
use crate::map_data::{MagicMapData, MapDecoration, SharedSearchState, BLOCKS_PER_PIXEL, MAP_SIZE};
use crate::resolver::PixelColorResolver;
use crate::sampling::RegionSnapshot;
use crate::scheduler::LandmarkRequester;

/// How far a viewer sees, in world columns.
pub const VIEW_RADIUS_BLOCKS: i32 = 512;

/// World position of the player holding the map.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewerPos {
    pub x: f64,
    pub z: f64,
}

impl ViewerPos {
    pub fn new(x: f64, z: f64) -> Self {
        Self { x, z }
    }

    /// Pixel the viewer stands on for a map centered at `(center_x, center_z)`.
    /// May lie outside the map. The block offset is divided with truncation,
    /// so the first partial pixel west or north of the center maps to 64.
    pub fn pixel(&self, center_x: i32, center_z: i32) -> (i32, i32) {
        let half = MAP_SIZE as i32 / 2;
        let to_pixel = |pos: f64, center: i32| {
            (pos - center as f64).floor() as i32 / BLOCKS_PER_PIXEL + half
        };
        (to_pixel(self.x, center_x), to_pixel(self.z, center_z))
    }
}

/// Where a scanning pass sends its landmark lookups.
pub struct LandmarkScan<'a> {
    pub placement: &'a Arc<dyn LandmarkPlacement>,
    pub requester: &'a mut dyn LandmarkRequester,
}

/// What a render pass did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderSummary {
    /// Pixels considered for painting this pass.
    pub painted: usize,
    /// Pixels whose value actually changed.
    pub changed: usize,
    /// Whether the pass scanned for landmarks.
    pub scanned: bool,
    /// Landmark lookups issued.
    pub requests: usize,
}

/// Paints maps. Holds nothing but the color resolver; all per-map state
/// lives in the map data.
#[derive(Clone, Debug, Default)]
pub struct MapRenderer {
    resolver: PixelColorResolver,
}

impl MapRenderer {
    pub fn new(resolver: PixelColorResolver) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &PixelColorResolver {
        &self.resolver
    }

    /// Render the part of `map` visible from `viewer`.
    ///
    /// `snapshot` must be the region snapshot for the map's center.
    pub fn render(
        &self,
        map: &mut MagicMapData,
        viewer: ViewerPos,
        snapshot: &RegionSnapshot,
        now: GameTick,
        config: &MagicMapConfig,
        scan: LandmarkScan<'_>,
    ) -> RenderSummary {
        let half = MAP_SIZE as i32 / 2;
        let radius = VIEW_RADIUS_BLOCKS / BLOCKS_PER_PIXEL;
        let fuzz_radius = radius - 2;
        let (vx, vz) = viewer.pixel(map.center_x, map.center_z);

        let epoch = begin_scan(map.search(), now, config);
        let search = Rc::downgrade(map.search());
        let LandmarkScan { placement, requester } = scan;

        let mut summary = RenderSummary {
            scanned: epoch.is_some(),
            ..RenderSummary::default()
        };

        for x in (vx - radius + 1)..(vx + radius) {
            for z in (vz - radius - 1)..(vz + radius) {
                if !in_bounds(x) || !in_bounds(z) {
                    continue;
                }

                let dx = x - vx;
                let dz = z - vz;
                let dist_sq = dx * dx + dz * dz;
                let should_fuzz = dist_sq > fuzz_radius * fuzz_radius;
                if dist_sq >= radius * radius || (should_fuzz && (x + z) % 2 == 0) {
                    continue;
                }

                let (px, pz) = (x as usize, z as usize);
                let (base, over, down) = snapshot.pixel_samples(px, pz);
                let color = self.resolver.resolve(base, over, down);

                summary.painted += 1;
                if map.grid.set(px, pz, color.pixel()) {
                    summary.changed += 1;
                }

                let Some(epoch) = epoch else { continue };
                if !base.is_known() {
                    continue;
                }

                let world_x = (map.center_x.div_euclid(BLOCKS_PER_PIXEL) + x - half) * BLOCKS_PER_PIXEL;
                let world_z = (map.center_z.div_euclid(BLOCKS_PER_PIXEL) + z - half) * BLOCKS_PER_PIXEL;
                if !placement.is_landmark_center(world_x, world_z) {
                    continue;
                }

                let key = LandmarkKey::for_column(map.dimension.clone(), world_x, world_z);
                let map_x = decoration_offset(world_x, map.center_x);
                let map_z = decoration_offset(world_z, map.center_z);
                let target = Weak::clone(&search);
                trace!(key = %key, map_x, map_z, "landmark center in view");

                requester.request_async(
                    key,
                    placement,
                    Box::new(move |result: LandmarkResult| {
                        let Some(landmark) = result else { return };
                        let Some(state) = target.upgrade() else {
                            trace!(%landmark, "map gone, dropping landmark");
                            return;
                        };
                        let decoration = MapDecoration::new(landmark, map_x, map_z);
                        if !state.borrow_mut().push_decoration(epoch, decoration) {
                            trace!(%landmark, "stale scan, dropping landmark");
                        }
                    }),
                );
                summary.requests += 1;
            }
        }

        debug!(
            map = %map.id,
            painted = summary.painted,
            changed = summary.changed,
            scanned = summary.scanned,
            requests = summary.requests,
            "rendered map"
        );
        summary
    }
}

/// Decide whether this pass scans and, if so, open a new scan epoch.
fn begin_scan(search: &SharedSearchState, now: GameTick, config: &MagicMapConfig) -> Option<u64> {
    if !config.landmark_search_enabled {
        return None;
    }
    let mut state = search.borrow_mut();
    if !should_search(now, state.last_search_tick, config.landmark_search_cooldown_ticks) {
        return None;
    }
    Some(state.begin_scan(now))
}

fn in_bounds(p: i32) -> bool {
    (0..MAP_SIZE as i32).contains(&p)
}

/// Decoration coordinate of a world column, in half pixels from the center.
fn decoration_offset(world: i32, center: i32) -> i8 {
    ((world - center) as f32 / BLOCKS_PER_PIXEL as f32 * 2.0) as i8
}
