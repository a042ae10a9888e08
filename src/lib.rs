//! Magic map library
//!
//! Renders top-down biome maps of a procedurally generated world around a
//! moving viewer and discovers landmarks for them on a background worker pool.
//! Re-exports modules for use by binaries and tools.

pub mod biomes;
pub mod config;
pub mod cooldown;
pub mod engine;
pub mod error;
pub mod export;
pub mod landmark_cache;
pub mod landmarks;
pub mod map_data;
pub mod palette;
pub mod renderer;
pub mod resolver;
pub mod sampling;
pub mod scheduler;
pub mod seeds;
pub mod tilemap;
pub mod world;
