//! town — commuters crossing a synthetic grid town.
//!
//! Builds the town's street + transit network, prepares (or reloads) the
//! nearest-road and road-feature caches, then runs agents back and forth
//! between a home and a work building for a number of ticks.  One extra
//! agent runs a bulls-eye search around the town centre.
//!
//! ```text
//! RUST_LOG=nav_route=debug cargo run -p town -- --agents 200 --ticks 96
//! ```

mod network;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nav_core::{AgentId, AgentRng, Coord, NavConfig, TransportMode, TransportSet};
use nav_route::{BullsEyeSearch, Planner};
use nav_spatial::{
    CacheStore, Fingerprint, JsonFileStore, LocatorParams, NearestRoadCache, NoStore, SourceStamp,
};
use nav_travel::{AwarenessLog, FeatureIndex, TravelEngine};

use network::{Building, build_town};

const BLOCK_SPACING: f64 = 100.0;

#[derive(Parser, Debug)]
#[command(about = "Run commuters across a synthetic grid town")]
struct Args {
    /// TOML file with `NavConfig` overrides.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 50)]
    agents: usize,

    #[arg(long, default_value_t = 48)]
    ticks: u32,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Town size in blocks per side.
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(2..=64))]
    blocks: u32,
}

struct Commuter {
    home:    Coord,
    work:    Coord,
    modes:   TransportSet,
    at_work: bool,
    trips:   u32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;
    info!(?config, "configuration loaded");

    // 1. Network.
    let started = Instant::now();
    let (network, buildings) = build_town(args.blocks as usize, BLOCK_SPACING, LocatorParams::from(&config))?;
    let network = Arc::new(network);
    info!(
        junctions = network.junction_count(),
        roads = network.road_count(),
        edges = network.edge_count(),
        buildings = buildings.len(),
        elapsed_ms = started.elapsed().as_millis(),
        "town built"
    );

    // 2. Derived caches.
    let fingerprint = fingerprint(&args)?;
    let (snap_store, feature_store) = stores(&config);
    let snap_status = network.prepare_nearest_cache(
        snap_store.as_ref(),
        &fingerprint,
        buildings.iter().map(|&(_, pos, _)| pos),
    )?;
    let (features, feature_status) =
        FeatureIndex::load_or_build(&network, feature_store.as_ref(), &fingerprint, &buildings)?;
    info!(?snap_status, ?feature_status, roads_with_features = features.len(), "caches ready");

    // 3. Agents.
    let searcher = AgentId(args.agents as u32);
    let mut engine = TravelEngine::new(Planner::from_config(config.planner, network.clone()), args.agents + 1)
        .with_features(features);
    let mut commuters = Vec::with_capacity(args.agents);
    for i in 0..args.agents {
        let agent = AgentId(i as u32);
        let mut rng = AgentRng::new(args.seed, agent);
        let commuter = pick_commuter(&buildings, &mut rng);
        engine.place(agent, commuter.home)?;
        if let Err(e) = engine.begin_travel(agent, commuter.work, commuter.modes) {
            warn!(%agent, error = %e, "could not start commute");
        }
        commuters.push(commuter);
    }

    let centre = Coord::new(
        f64::from(args.blocks) * BLOCK_SPACING / 2.0 + 7.0,
        f64::from(args.blocks) * BLOCK_SPACING / 2.0 + 3.0,
    );
    let search = BullsEyeSearch::from_config(network.clone(), &config);
    let mut rng = AgentRng::new(args.seed, searcher);
    let search_route = search.search(centre, args.ticks / 2, config.travel_per_tick, &mut rng)?;
    let search_length = search_route.length();
    engine.place(searcher, search_route.front().map_or(centre, |w| w.coord))?;
    engine.assign_route(searcher, search_route)?;

    // 4. Run.
    let mut log = AwarenessLog::default();
    let mut failed = 0;
    let started = Instant::now();
    for tick in 0..args.ticks {
        let summary = engine.tick(config.travel_per_tick, &mut log);
        failed += summary.failed;

        for (i, c) in commuters.iter_mut().enumerate() {
            let agent = AgentId(i as u32);
            if c.home == c.work || engine.store.travelling(agent) {
                continue;
            }
            if engine.store.position(agent) == Some(if c.at_work { c.home } else { c.work }) {
                c.at_work = !c.at_work;
                c.trips += 1;
            }
            let next = if c.at_work { c.home } else { c.work };
            if let Err(e) = engine.begin_travel(agent, next, c.modes) {
                warn!(%agent, tick, error = %e, "could not start commute");
            }
        }
        if tick % 12 == 0 {
            info!(tick, ?summary, "tick");
        }
    }

    // 5. Summary.
    let trips: u32 = commuters.iter().map(|c| c.trips).sum();
    let stats = engine.routes.stats();
    println!();
    println!("=== town: {} agents, {} ticks, {} blocks ===", args.agents, args.ticks, args.blocks);
    println!("Completed trips:      {trips}");
    println!("Failed steps:         {failed}");
    println!("Roads noticed:        {}", log.events.len());
    println!("Buildings noticed:    {}", log.buildings_seen);
    println!(
        "Route cache:          {} routes, {} hits / {} misses",
        engine.routes.route_count(),
        stats.hits,
        stats.misses
    );
    println!("Bulls-eye route:      {search_length:.1} long, searcher ends at {:?}", engine.store.position(searcher));
    println!("Run time:             {:.2?}", started.elapsed());
    Ok(())
}

fn load_config(path: Option<&PathBuf>) -> Result<NavConfig> {
    let config = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            toml::from_str(&text).with_context(|| format!("parsing {}", p.display()))?
        }
        None => NavConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

/// The town is generated, not read from files: its identity is its size
/// (plus the config file, whose search settings shape the snaps).
fn fingerprint(args: &Args) -> Result<Fingerprint> {
    let mut sources = vec![SourceStamp {
        path:           format!("synthetic:town:{}x{}", args.blocks, BLOCK_SPACING),
        modified_secs:  0,
        modified_nanos: 0,
    }];
    if let Some(p) = &args.config {
        sources.extend(Fingerprint::from_paths(&[p])?.sources);
    }
    Ok(Fingerprint::from_stamps(sources))
}

type Stores = (Box<dyn CacheStore<NearestRoadCache>>, Box<dyn CacheStore<FeatureIndex>>);

fn stores(config: &NavConfig) -> Stores {
    match &config.cache_dir {
        Some(dir) => (
            Box::new(JsonFileStore::new(dir.join("nearest_roads.json"))),
            Box::new(JsonFileStore::new(dir.join("road_features.json"))),
        ),
        None => (Box::new(NoStore), Box::new(NoStore)),
    }
}

fn pick_commuter(buildings: &[Building], rng: &mut AgentRng) -> Commuter {
    let home = rng.choose(buildings).map_or(Coord::new(0.0, 0.0), |b| b.1);
    let work = rng.choose(buildings).map_or(home, |b| b.1);
    let modes = match rng.gen_range(0..3) {
        0 => TransportSet::walk_only(),
        1 => TransportSet::walk_only().with(TransportMode::Car),
        _ => TransportSet::walk_only().with(TransportMode::Bus).with(TransportMode::Train),
    };
    Commuter { home, work, modes, at_work: false, trips: 0 }
}
