//! Magic map engine
//!
//! Owns the long-lived pieces (region caches, the landmark search pool, the
//! map store) and wires them into one `update` call per held map per tick.

use std::collections::HashMap;

use tracing::{info, trace};

use crate::config::MagicMapConfig;
use crate::cooldown::GameTick;
use crate::error::EngineError;
use crate::landmark_cache::DimensionId;
use crate::map_data::{MagicMapData, MapDataStore, MapId, DEFAULT_SCALE};
use crate::renderer::{LandmarkScan, MapRenderer, RenderSummary, ViewerPos};
use crate::resolver::PixelColorResolver;
use crate::sampling::{BiomeSampleCache, RegionOrigin};
use crate::scheduler::LandmarkSearchScheduler;
use crate::world::WorldContext;

pub struct MagicMapEngine {
    config: MagicMapConfig,
    renderer: MapRenderer,
    regions: HashMap<DimensionId, BiomeSampleCache>,
    scheduler: LandmarkSearchScheduler,
    maps: MapDataStore,
}

impl MagicMapEngine {
    pub fn new(config: MagicMapConfig) -> Result<Self, EngineError> {
        Self::with_resolver(config, PixelColorResolver::default())
    }

    /// Engine painting with a custom palette.
    pub fn with_resolver(config: MagicMapConfig, resolver: PixelColorResolver) -> Result<Self, EngineError> {
        config.validate()?;
        let scheduler = LandmarkSearchScheduler::new(config.search_workers)?;
        info!(
            workers = config.search_workers,
            search_enabled = config.landmark_search_enabled,
            cooldown_ticks = config.landmark_search_cooldown_ticks,
            "magic map engine ready"
        );

        Ok(Self {
            config,
            renderer: MapRenderer::new(resolver),
            regions: HashMap::new(),
            scheduler,
            maps: MapDataStore::new(),
        })
    }

    pub fn config(&self) -> &MagicMapConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &LandmarkSearchScheduler {
        &self.scheduler
    }

    pub fn maps(&self) -> &MapDataStore {
        &self.maps
    }

    /// Region cache of a dimension, if anything there has been rendered.
    pub fn region_cache(&self, dimension: &DimensionId) -> Option<&BiomeSampleCache> {
        self.regions.get(dimension)
    }

    /// Create a map in `world` covering the key biome cell around `(x, z)`.
    pub fn create_map(&mut self, world: &WorldContext, x: i32, z: i32) -> MapId {
        let id = self.maps.create(x, z, DEFAULT_SCALE, world.dimension.clone());
        if let Some(map) = self.maps.get(id) {
            info!(map = %id, center_x = map.center_x, center_z = map.center_z, "created magic map");
        }
        id
    }

    pub fn map(&self, id: MapId) -> Option<&MagicMapData> {
        self.maps.get(id)
    }

    pub fn map_mut(&mut self, id: MapId) -> Option<&mut MagicMapData> {
        self.maps.get_mut(id)
    }

    /// Forget a map. Landmark results still on their way to it are dropped.
    pub fn remove_map(&mut self, id: MapId) -> Option<MagicMapData> {
        self.maps.remove(id)
    }

    /// Render map `id` for a viewer standing in `world`.
    ///
    /// Returns `None` without touching anything when the world's generator
    /// has no magic map support or the map belongs to another dimension.
    /// Maps that were never stored are created around the world spawn.
    pub fn update(
        &mut self,
        id: MapId,
        world: &WorldContext,
        viewer: ViewerPos,
        now: GameTick,
    ) -> Option<RenderSummary> {
        if !world.supports_magic_maps() {
            trace!(map = %id, dimension = %world.dimension, "generator has no magic maps");
            return None;
        }

        let map = self.maps.get_or_create(id, world.spawn, &world.dimension);
        if map.dimension != world.dimension {
            trace!(map = %id, dimension = %world.dimension, "map belongs to another dimension");
            return None;
        }

        let origin = RegionOrigin::for_map_center(map.center_x, map.center_z);
        let snapshot = self
            .regions
            .entry(world.dimension.clone())
            .or_default()
            .sample(origin, world.sampler.as_ref());

        let summary = self.renderer.render(
            map,
            viewer,
            &snapshot,
            now,
            &self.config,
            LandmarkScan {
                placement: &world.placement,
                requester: &mut self.scheduler,
            },
        );
        Some(summary)
    }

    /// Deliver landmark results that have arrived. Call once per tick.
    pub fn run_pending(&mut self) -> usize {
        self.scheduler.run_pending()
    }

    /// Wait for every outstanding landmark search and deliver it.
    pub fn settle(&mut self) -> usize {
        self.scheduler.settle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Landmark;
    use crate::map_data::MapDecoration;
    use crate::seeds::WorldSeeds;
    use crate::world::GeneratorKind;
    use std::rc::Rc;

    fn engine() -> MagicMapEngine {
        MagicMapEngine::new(MagicMapConfig::default()).unwrap()
    }

    fn twilight() -> WorldContext {
        WorldContext::twilight(&WorldSeeds::from_master(2024))
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = MagicMapConfig {
            search_workers: 0,
            ..MagicMapConfig::default()
        };
        assert!(matches!(MagicMapEngine::new(config), Err(EngineError::Config(_))));
    }

    #[test]
    fn test_unsupported_generator_is_noop() {
        let mut engine = engine();
        let world = WorldContext {
            generator: GeneratorKind::Other,
            ..twilight()
        };

        assert_eq!(engine.update(MapId(0), &world, ViewerPos::new(0.0, 0.0), 0), None);
        assert!(engine.maps().is_empty());
        assert!(engine.region_cache(&world.dimension).is_none());
    }

    #[test]
    fn test_map_from_other_dimension_is_skipped() {
        let mut engine = engine();
        let world = twilight();
        let id = engine.create_map(&world, 0, 0);
        let elsewhere = WorldContext {
            dimension: DimensionId::new("twilightforest:skylight"),
            ..twilight()
        };

        assert_eq!(engine.update(id, &elsewhere, ViewerPos::new(0.0, 0.0), 0), None);
        assert!(!engine.map(id).unwrap().grid.is_dirty());
    }

    #[test]
    fn test_finds_quest_grove_at_origin() {
        let mut engine = engine();
        let world = twilight();
        let id = engine.create_map(&world, 0, 0);
        let grove = MapDecoration::new(Landmark::QuestGrove, -128, -128);

        let summary = engine.update(id, &world, ViewerPos::new(0.0, 0.0), 0).unwrap();
        assert!(summary.scanned);
        assert!(summary.requests >= 1);
        assert!(engine.map(id).unwrap().grid.is_dirty());

        engine.settle();
        assert_eq!(engine.scheduler().in_flight(), 0);
        assert!(engine.map(id).unwrap().decorations().contains(&grove));

        // Past the cooldown the same chunks come straight from the cache.
        let cooldown = engine.config().landmark_search_cooldown_ticks;
        let rescan = engine.update(id, &world, ViewerPos::new(0.0, 0.0), cooldown).unwrap();
        assert!(rescan.scanned);
        assert_eq!(engine.scheduler().in_flight(), 0);
        assert!(engine.scheduler().stats().cache_hits >= rescan.requests);
        assert!(engine.map(id).unwrap().decorations().contains(&grove));
    }

    #[test]
    fn test_region_snapshot_is_reused() {
        let mut engine = engine();
        let world = twilight();
        let id = engine.create_map(&world, 0, 0);

        engine.update(id, &world, ViewerPos::new(100.0, 100.0), 0);
        engine.update(id, &world, ViewerPos::new(900.0, 700.0), 1);

        let cache = engine.region_cache(&world.dimension).unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn test_unknown_map_is_created_at_spawn() {
        let mut engine = engine();
        let world = twilight();

        assert!(engine.update(MapId(5), &world, ViewerPos::new(0.0, 0.0), 0).is_some());
        let map = engine.map(MapId(5)).unwrap();
        assert_eq!((map.center_x, map.center_z), (1024, 1024));
    }

    #[test]
    fn test_removed_map_drops_late_results() {
        let mut engine = engine();
        let world = twilight();
        let id = engine.create_map(&world, 0, 0);

        let summary = engine.update(id, &world, ViewerPos::new(0.0, 0.0), 0).unwrap();
        assert!(summary.requests >= 1);
        let search = Rc::downgrade(engine.map(id).unwrap().search());

        assert!(engine.remove_map(id).is_some());
        assert!(search.upgrade().is_none());

        // Every callback still runs, against a map that is gone.
        assert_eq!(engine.settle(), summary.requests);
        assert_eq!(engine.scheduler().in_flight(), 0);
        assert_eq!(engine.scheduler().stats().delivered, summary.requests);
        assert!(search.upgrade().is_none());
        assert!(engine.map(id).is_none());
    }
}
