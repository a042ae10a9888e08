//! Process-wide cache of resolved landmark lookups.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

use crate::landmarks::LandmarkResult;

/// Registry name of a dimension, e.g. `twilightforest:twilight_forest`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DimensionId(Arc<str>);

impl DimensionId {
    pub fn new(name: &str) -> Self {
        Self(Arc::from(name))
    }

    pub fn twilight() -> Self {
        Self::new("twilightforest:twilight_forest")
    }

    pub fn overworld() -> Self {
        Self::new("minecraft:overworld")
    }
}

impl fmt::Display for DimensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One unit of landmark lookup work.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct LandmarkKey {
    pub dimension: DimensionId,
    pub chunk_x: i32,
    pub chunk_z: i32,
}

impl LandmarkKey {
    pub fn new(dimension: DimensionId, chunk_x: i32, chunk_z: i32) -> Self {
        Self {
            dimension,
            chunk_x,
            chunk_z,
        }
    }

    /// Key of the chunk containing a world column.
    pub fn for_column(dimension: DimensionId, world_x: i32, world_z: i32) -> Self {
        Self::new(dimension, world_x >> 4, world_z >> 4)
    }
}

impl fmt::Display for LandmarkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{},{}", self.dimension, self.chunk_x, self.chunk_z)
    }
}

/// Concurrent map from chunk to landmark, shared by the search workers and
/// the owning thread.
///
/// Entries are written once: placement is deterministic, so the first result
/// stored for a key is the only one it will ever have.
#[derive(Debug, Default)]
pub struct LandmarkCache {
    entries: DashMap<LandmarkKey, LandmarkResult>,
}

impl LandmarkCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &LandmarkKey) -> Option<LandmarkResult> {
        self.entries.get(key).map(|entry| *entry.value())
    }

    /// Store `result` unless the key already has one. Returns the value the
    /// cache holds afterwards.
    pub fn insert(&self, key: LandmarkKey, result: LandmarkResult) -> LandmarkResult {
        *self.entries.entry(key).or_insert(result).value()
    }

    pub fn contains(&self, key: &LandmarkKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
