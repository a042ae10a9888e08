use std::error::Error;

use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use magic_map::config::MagicMapConfig;
use magic_map::engine::MagicMapEngine;
use magic_map::export::export_map_png;
use magic_map::renderer::ViewerPos;
use magic_map::seeds::WorldSeeds;
use magic_map::world::WorldContext;

#[derive(Parser, Debug)]
#[command(name = "magic_map")]
#[command(about = "Walk a viewer across a twilight world and draw its magic map")]
struct Args {
    /// World seed (uses random seed if not specified)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of ticks to simulate
    #[arg(short, long, default_value = "600")]
    ticks: u64,

    /// Blocks the viewer walks east per tick
    #[arg(short, long, default_value = "2.0")]
    walk: f64,

    /// Viewer start position X
    #[arg(long, default_value = "0")]
    start_x: i32,

    /// Viewer start position Z
    #[arg(long, default_value = "0")]
    start_z: i32,

    /// JSON config file (defaults used if not specified)
    #[arg(short, long)]
    config: Option<String>,

    /// Output PNG path
    #[arg(short, long, default_value = "magic_map.png")]
    output: String,

    /// Scale factor for the exported PNG
    #[arg(long, default_value = "4")]
    scale: u32,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if let Err(err) = run(args) {
        error!(error = %err, "magic map run failed");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => MagicMapConfig::load(path)?,
        None => MagicMapConfig::default(),
    };

    let seeds = match args.seed {
        Some(seed) => WorldSeeds::from_master(seed),
        None => WorldSeeds::default(),
    };
    info!(%seeds, "world seeds");

    let world = WorldContext::twilight(&seeds);
    let mut engine = MagicMapEngine::new(config)?;
    let id = engine.create_map(&world, args.start_x, args.start_z);

    let mut changed = 0;
    for tick in 0..args.ticks {
        let viewer = ViewerPos::new(
            args.start_x as f64 + args.walk * tick as f64,
            args.start_z as f64,
        );
        if let Some(summary) = engine.update(id, &world, viewer, tick) {
            changed += summary.changed;
        }
        engine.run_pending();

        // Stand-in for sending the changed part of the map to its holder.
        if let Some(rect) = engine.map_mut(id).and_then(|map| map.grid.take_dirty()) {
            debug!(tick, ?rect, "map region changed");
        }
    }
    engine.settle();

    let stats = engine.scheduler().stats();
    let region_hit_rate = engine
        .region_cache(&world.dimension)
        .map(|cache| cache.stats().hit_rate())
        .unwrap_or(0.0);
    info!(
        ticks = args.ticks,
        changed,
        region_hit_rate,
        cache_hits = stats.cache_hits,
        searches = stats.spawned,
        faults = stats.faults,
        "walk finished"
    );

    let Some(map) = engine.map(id) else {
        return Err(format!("map {id} disappeared").into());
    };

    let decorations = map.decorations();
    println!(
        "Map {} centered at ({}, {}), {} landmark(s):",
        id,
        map.center_x,
        map.center_z,
        decorations.len()
    );
    for decoration in &decorations {
        println!("  {:<20} at ({:4}, {:4})", decoration.landmark, decoration.x, decoration.z);
    }

    export_map_png(&map.grid, &decorations, &args.output, args.scale)?;
    println!("Exported map to {}", args.output);
    Ok(())
}
