//! unload — a truck drives to a drop site and unloads its crate.
//!
//! Usage: `unload [config.json]`.  Without an argument a built-in 16x16
//! configuration is used.  Set `RUST_LOG=debug` to follow the docking
//! state machine.

use std::fs;
use std::time::Instant;

use anyhow::{Context, Result};

use dk_core::{CPos, CVec, SimConfig, Tick, WAngle, WorldConfig};
use dk_sim::{SimBuilder, SimObserver};
use dk_spatial::{Locomotor, TerrainMap, TerrainType};
use dk_world::{ActivityEvent, World};

// ── Constants ─────────────────────────────────────────────────────────────────

const SEED:        u64 = 42;
const MAP_SIZE:    i32 = 16;
const TOTAL_TICKS: u64 = 2_000;
const TRUCK_SPEED: i32 = 64;

// ── Observer ──────────────────────────────────────────────────────────────────

#[derive(Default)]
struct Report {
    ticks:  u64,
    events: Vec<ActivityEvent>,
}

impl SimObserver for Report {
    fn on_activity_finished(&mut self, event: &ActivityEvent) {
        println!("  [{}] {} finished {}: {:?}", event.tick, event.actor, event.activity, event.outcome);
        self.events.push(event.clone());
    }

    fn on_tick_end(&mut self, _tick: Tick, _world: &World) {
        self.ticks += 1;
    }
}

// ── Setup ─────────────────────────────────────────────────────────────────────

fn load_config() -> Result<SimConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(SimConfig {
            world: WorldConfig { seed: SEED, width: MAP_SIZE, height: MAP_SIZE, ..WorldConfig::default() },
            total_ticks: TOTAL_TICKS,
        });
    };
    let text = fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let config = serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;
    Ok(config)
}

/// A clear field crossed by a band of rough ground, with a short rock wall
/// north of it.
fn build_map(width: i32, height: i32) -> Result<TerrainMap> {
    let mut map = TerrainMap::open(width, height);
    for x in 0..width {
        map.set_terrain(CPos::new(x, height / 2), TerrainType::Rough)?;
    }
    for y in 2..(height / 2).min(6) {
        map.set_terrain(CPos::new(width / 2, y), TerrainType::Rock)?;
    }
    Ok(map)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config()?;
    let (width, height) = (config.world.width, config.world.height);
    println!("=== unload ===");
    println!("Map: {width}x{height}  |  Seed: {}  |  Max ticks: {}", config.world.seed, config.total_ticks);

    let map = build_map(width, height)?;
    let mut sim = SimBuilder::new(config).map(map).build()?;

    let depot = CPos::new(1, 1);
    let drop_site = CPos::new(width - 3, height / 2 + 2);

    let truck = sim
        .world
        .spawn_carrier("truck", depot, WAngle::ZERO, Locomotor::wheeled(TRUCK_SPEED))?;
    let cargo = sim.world.spawn_sub_actor("crate", depot, WAngle::ZERO, Some(truck))?;
    // Parked next to the drop site; gets nudged if it stands on the staging cell.
    let bystander = sim.world.spawn_mobile(
        "jeep",
        drop_site + CVec::new(-1, 0),
        WAngle::ZERO,
        Locomotor::wheeled(TRUCK_SPEED),
    )?;
    log::info!("{truck} carries {cargo} from {depot} to {drop_site}; {bystander} parked nearby");

    sim.unload(truck, drop_site)?;

    let start = Instant::now();
    let mut report = Report::default();
    let ticks = sim.run_until_idle(&mut report)?;
    let elapsed = start.elapsed();

    println!();
    println!("Settled after {ticks} ticks ({:.2?})", elapsed);
    println!("Activities finished: {}", report.events.len());
    let landed = sim.world.sub_actor(cargo)?;
    println!("Crate {cargo}: {:?} at {}", landed.mount(), landed.own_location());
    if let Some(at) = sim.world.location(truck) {
        println!("Truck {truck}: parked at {at}");
    }
    if let Some(at) = sim.world.location(bystander) {
        println!("Jeep {bystander}: at {at}");
    }
    println!("Random draws: {}", sim.world.shared_random().draws());
    debug_assert_eq!(ticks, report.ticks);
    Ok(())
}
