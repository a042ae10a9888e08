//! Biome region snapshots
//!
//! A map reads four biome samples per pixel along each axis. Sampling the
//! world is far more expensive than reading an array, so the full grid for a
//! map's region is captured once and kept around: regions are revisited every
//! tick by every viewer holding the map.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::biomes::BiomeSample;
use crate::map_data::{BLOCKS_PER_PIXEL, MAP_SIZE};
use crate::tilemap::Tilemap;

/// Biome samples per pixel along each axis.
pub const SAMPLES_PER_PIXEL: usize = 4;

/// World columns between two neighboring samples.
pub const SAMPLE_STRIDE: i32 = BLOCKS_PER_PIXEL / SAMPLES_PER_PIXEL as i32;

/// Samples per region along each axis.
pub const REGION_SAMPLES: usize = MAP_SIZE * SAMPLES_PER_PIXEL;

/// Source of biome information for world columns.
pub trait BiomeSampler: Send + Sync {
    fn biome_at(&self, world_x: i32, world_z: i32) -> BiomeSample;
}

impl<F> BiomeSampler for F
where
    F: Fn(i32, i32) -> BiomeSample + Send + Sync,
{
    fn biome_at(&self, world_x: i32, world_z: i32) -> BiomeSample {
        self(world_x, world_z)
    }
}

/// World column of the first sample of a region.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegionOrigin {
    pub x: i32,
    pub z: i32,
}

impl RegionOrigin {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Origin of the region shown by a map centered at `(center_x, center_z)`.
    pub fn for_map_center(center_x: i32, center_z: i32) -> Self {
        let half = MAP_SIZE as i32 / 2;
        let corner = |c: i32| (c.div_euclid(BLOCKS_PER_PIXEL) - half) * BLOCKS_PER_PIXEL;
        Self::new(corner(center_x), corner(center_z))
    }
}

/// Immutable biome grid for one region.
#[derive(Clone, Debug)]
pub struct RegionSnapshot {
    origin: RegionOrigin,
    samples: Tilemap<BiomeSample>,
}

impl RegionSnapshot {
    /// Sample every point of the region. Rows are sampled in parallel.
    pub fn capture(origin: RegionOrigin, sampler: &dyn BiomeSampler) -> Self {
        let samples = Tilemap::from_fn_par(REGION_SAMPLES, REGION_SAMPLES, |sx, sz| {
            sampler.biome_at(
                origin.x + sx as i32 * SAMPLE_STRIDE,
                origin.z + sz as i32 * SAMPLE_STRIDE,
            )
        });
        Self { origin, samples }
    }

    /// Sample at sample coordinates; `Unknown` outside the region.
    pub fn sample(&self, sx: usize, sz: usize) -> BiomeSample {
        if self.samples.contains(sx, sz) {
            *self.samples.get(sx, sz)
        } else {
            BiomeSample::Unknown
        }
    }

    /// The three samples a pixel's color depends on: its own, the next one
    /// along x and the next one along z.
    pub fn pixel_samples(&self, px: usize, pz: usize) -> (BiomeSample, BiomeSample, BiomeSample) {
        let sx = px * SAMPLES_PER_PIXEL;
        let sz = pz * SAMPLES_PER_PIXEL;
        (self.sample(sx, sz), self.sample(sx + 1, sz), self.sample(sx, sz + 1))
    }
}

/// Cache statistics for monitoring
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

impl CacheStats {
    /// Calculate hit rate (0.0 to 1.0)
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f32 / total as f32
        }
    }
}

/// Memoized region snapshots for one world, keyed by region origin.
///
/// Snapshots are never evicted; terrain is final by the time a map looks at it.
#[derive(Debug, Default)]
pub struct BiomeSampleCache {
    snapshots: HashMap<RegionOrigin, Arc<RegionSnapshot>>,
    stats: CacheStats,
}

impl BiomeSampleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the region at `origin`, capturing it on first use.
    pub fn sample(&mut self, origin: RegionOrigin, sampler: &dyn BiomeSampler) -> Arc<RegionSnapshot> {
        if let Some(snapshot) = self.snapshots.get(&origin) {
            self.stats.hits += 1;
            return Arc::clone(snapshot);
        }

        self.stats.misses += 1;
        debug!(origin_x = origin.x, origin_z = origin.z, "capturing biome region");
        let snapshot = Arc::new(RegionSnapshot::capture(origin, sampler));
        self.snapshots.insert(origin, Arc::clone(&snapshot));
        snapshot
    }

    pub fn is_cached(&self, origin: RegionOrigin) -> bool {
        self.snapshots.contains_key(&origin)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biomes::Biome;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_origin_for_map_center() {
        assert_eq!(RegionOrigin::for_map_center(1024, 1024), RegionOrigin::new(0, 0));
        assert_eq!(RegionOrigin::for_map_center(0, 0), RegionOrigin::new(-1024, -1024));
        assert_eq!(RegionOrigin::for_map_center(-1024, 3072), RegionOrigin::new(-2048, 2048));
    }

    #[test]
    fn test_capture_sample_positions() {
        let origin = RegionOrigin::new(-1024, 512);
        let sampler = move |x: i32, z: i32| {
            if x == origin.x + 4 && z == origin.z {
                BiomeSample::Known(Biome::Stream)
            } else if x == origin.x && z == origin.z + 4 {
                BiomeSample::Known(Biome::Lake)
            } else {
                BiomeSample::Known(Biome::Forest)
            }
        };
        let snapshot = RegionSnapshot::capture(origin, &sampler);

        assert_eq!(
            snapshot.pixel_samples(0, 0),
            (
                BiomeSample::Known(Biome::Forest),
                BiomeSample::Known(Biome::Stream),
                BiomeSample::Known(Biome::Lake),
            )
        );
        assert_eq!(snapshot.sample(REGION_SAMPLES, 0), BiomeSample::Unknown);
    }

    #[test]
    fn test_cache_memoizes_by_origin() {
        let calls = AtomicUsize::new(0);
        let sampler = |_: i32, _: i32| {
            calls.fetch_add(1, Ordering::Relaxed);
            BiomeSample::Known(Biome::Clearing)
        };
        let mut cache = BiomeSampleCache::new();
        let origin = RegionOrigin::new(0, 0);

        let first = cache.sample(origin, &sampler);
        let second = cache.sample(origin, &sampler);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::Relaxed), REGION_SAMPLES * REGION_SAMPLES);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
        assert_eq!(cache.stats().hit_rate(), 0.5);

        cache.sample(RegionOrigin::new(2048, 0), &sampler);
        assert_eq!(cache.len(), 2);
        assert!(cache.is_cached(origin));
    }
}
