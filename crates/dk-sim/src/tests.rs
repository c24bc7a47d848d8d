//! Integration tests for dk-sim: full unload scenarios.

use dk_core::{ActorId, CPos, SimConfig, Tick, WAngle, WPos, WVec, WorldConfig};
use dk_spatial::{Locomotor, TerrainMap, TerrainType};
use dk_world::{AbortReason, ActivityOutcome, Mount, World};

use crate::{EventRecorder, NoopObserver, Sim, SimBuilder, SimError, SimObserver};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn test_config(size: i32, seed: u64, total_ticks: u64) -> SimConfig {
    SimConfig {
        world: WorldConfig { seed, width: size, height: size, ..WorldConfig::default() },
        total_ticks,
    }
}

fn rock_except(size: i32, open: &[CPos]) -> TerrainMap {
    let mut map = TerrainMap::open(size, size);
    for y in 0..size {
        for x in 0..size {
            let cell = CPos::new(x, y);
            if !open.contains(&cell) {
                map.set_terrain(cell, TerrainType::Rock).unwrap();
            }
        }
    }
    map
}

/// Spawn a carrier on `at` with a crate loaded.
fn with_loaded_carrier(sim: &mut Sim, at: CPos) -> (ActorId, ActorId) {
    let carrier = sim
        .world
        .spawn_carrier("truck", at, WAngle::ZERO, Locomotor::wheeled(64))
        .unwrap();
    let cargo = sim
        .world
        .spawn_sub_actor("crate", at, WAngle::ZERO, Some(carrier))
        .unwrap();
    (carrier, cargo)
}

/// Carrier on (10,10), target (10,9), nothing else passable.
fn corridor() -> (Sim, ActorId, ActorId) {
    let map = rock_except(20, &[CPos::new(10, 10), CPos::new(10, 9)]);
    let mut sim = SimBuilder::new(test_config(20, 1, 500)).map(map).build().unwrap();
    let (carrier, cargo) = with_loaded_carrier(&mut sim, CPos::new(10, 10));
    sim.unload(carrier, CPos::new(10, 9)).unwrap();
    (sim, carrier, cargo)
}

fn assert_delivered(world: &World, cargo: ActorId, target: CPos) {
    let sub = world.sub_actor(cargo).unwrap();
    assert_eq!(sub.mount(), Mount::Detached);
    assert!(!sub.is_unloading());
    assert_eq!(sub.own_location(), target);
    assert!(world.is_in_world(cargo));
    assert_eq!(world.occupied_cells(cargo), vec![target]);
    assert_eq!(world.spatial().occurrences(cargo), 1);
}

fn assert_still_carried(world: &World, carrier: ActorId, cargo: ActorId) {
    assert_eq!(world.parent_of(cargo), Some(carrier));
    assert!(!world.is_in_world(cargo));
    assert!(!world.sub_actor(cargo).unwrap().is_unloading());
    assert_eq!(world.spatial().occurrences(cargo), 0);
    let transporter = world.actor(carrier).unwrap().transporter.as_ref().unwrap();
    assert_eq!(transporter.cargo(), Some(cargo));
}

/// Records every center the carrier passes through.
struct Track {
    carrier: ActorId,
    centers: Vec<WPos>,
}

impl SimObserver for Track {
    fn on_tick_end(&mut self, _tick: Tick, world: &World) {
        if let Some(c) = world.center_position(self.carrier) {
            self.centers.push(c);
        }
    }
}

/// Checks after every tick that the crate is registered exactly where it
/// says it is, and only while it is in the world.
struct IndexCheck {
    cargo:   ActorId,
    checked: u64,
}

impl SimObserver for IndexCheck {
    fn on_tick_end(&mut self, tick: Tick, world: &World) {
        let registered = world.spatial().registration(self.cargo).map(<[CPos]>::to_vec);
        if world.is_in_world(self.cargo) {
            assert_eq!(world.spatial().occurrences(self.cargo), 1, "at {tick}");
            assert_eq!(registered, Some(world.occupied_cells(self.cargo)), "at {tick}");
        } else {
            assert_eq!(world.spatial().occurrences(self.cargo), 0, "at {tick}");
        }
        self.checked += 1;
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn builds_open_map_by_default() {
        let sim = SimBuilder::new(test_config(12, 0, 10)).build().unwrap();
        assert_eq!(sim.world.map().width(), 12);
        assert_eq!(sim.current_tick(), Tick::ZERO);
    }

    #[test]
    fn map_size_mismatch_errors() {
        let result = SimBuilder::new(test_config(20, 0, 10)).map(TerrainMap::open(10, 10)).build();
        assert!(matches!(result, Err(SimError::MapSizeMismatch { .. })));
    }

    #[test]
    fn invalid_config_errors() {
        let result = SimBuilder::new(test_config(20, 0, 0)).build();
        assert!(matches!(result, Err(SimError::Config(_))));
    }
}

// ── Run loop ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod run_tests {
    use super::*;

    struct Counter {
        starts: u64,
        ends:   u64,
        final_tick: Option<Tick>,
    }

    impl SimObserver for Counter {
        fn on_tick_start(&mut self, _tick: Tick) {
            self.starts += 1;
        }
        fn on_tick_end(&mut self, _tick: Tick, _world: &World) {
            self.ends += 1;
        }
        fn on_sim_end(&mut self, final_tick: Tick) {
            self.final_tick = Some(final_tick);
        }
    }

    #[test]
    fn run_stops_at_total_ticks() {
        let mut sim = SimBuilder::new(test_config(8, 0, 30)).build().unwrap();
        let mut counter = Counter { starts: 0, ends: 0, final_tick: None };
        sim.run(&mut counter).unwrap();
        assert_eq!(counter.starts, 30);
        assert_eq!(counter.ends, 30);
        assert_eq!(counter.final_tick, Some(Tick(30)));
    }

    #[test]
    fn run_ticks_ignores_total() {
        let mut sim = SimBuilder::new(test_config(8, 0, 5)).build().unwrap();
        sim.run_ticks(12, &mut NoopObserver).unwrap();
        assert_eq!(sim.current_tick(), Tick(12));
    }

    #[test]
    fn idle_world_settles_immediately() {
        let mut sim = SimBuilder::new(test_config(8, 0, 5)).build().unwrap();
        assert_eq!(sim.run_until_idle(&mut NoopObserver).unwrap(), 0);
    }

    #[test]
    fn unsettled_run_reports_error() {
        let (mut sim, _carrier, _cargo) = corridor();
        sim.config.total_ticks = 10;
        assert!(matches!(
            sim.run_until_idle(&mut NoopObserver),
            Err(SimError::NotSettled { ticks: 10 })
        ));
    }
}

// ── Unload scenarios ──────────────────────────────────────────────────────────

#[cfg(test)]
mod unload_tests {
    use super::*;

    #[test]
    fn orthogonal_unload_docks_405_units_out() {
        let (mut sim, carrier, cargo) = corridor();
        let mut track = Track { carrier, centers: Vec::new() };
        sim.run_until_idle(&mut track).unwrap();

        let dock_point = CPos::new(10, 10).center() + WVec::new(0, -405, 0);
        assert!(track.centers.contains(&dock_point));
        assert_eq!(track.centers.last(), Some(&CPos::new(10, 10).center()));
        assert_delivered(&sim.world, cargo, CPos::new(10, 9));
    }

    #[test]
    fn diagonal_unload_docks_570_units_out_per_axis() {
        let map = rock_except(12, &[CPos::new(5, 5), CPos::new(6, 4)]);
        let mut sim = SimBuilder::new(test_config(12, 3, 500)).map(map).build().unwrap();
        let (carrier, cargo) = with_loaded_carrier(&mut sim, CPos::new(5, 5));
        sim.unload(carrier, CPos::new(6, 4)).unwrap();

        let mut track = Track { carrier, centers: Vec::new() };
        sim.run_until_idle(&mut track).unwrap();

        let dock_point = CPos::new(5, 5).center() + WVec::new(570, -570, 0);
        assert!(track.centers.contains(&dock_point));
        assert_delivered(&sim.world, cargo, CPos::new(6, 4));
    }

    #[test]
    fn open_map_unload_completes_and_reports() {
        let mut sim = SimBuilder::new(test_config(16, 7, 500)).build().unwrap();
        let (carrier, cargo) = with_loaded_carrier(&mut sim, CPos::new(8, 8));
        sim.unload(carrier, CPos::new(9, 8)).unwrap();

        let mut recorder = EventRecorder::default();
        let ticks = sim.run_until_idle(&mut recorder).unwrap();
        assert!(ticks < 200, "took {ticks} ticks");

        assert_eq!(recorder.events.len(), 1);
        assert_eq!(recorder.events[0].actor, carrier);
        assert_eq!(recorder.events[0].activity, "CrateUnload");
        assert!(recorder.events[0].outcome.is_completed());
        assert_delivered(&sim.world, cargo, CPos::new(9, 8));

        let transporter = sim.world.actor(carrier).unwrap().transporter.as_ref().unwrap();
        assert_eq!(transporter.cargo(), None);
    }

    #[test]
    fn boxed_in_carrier_keeps_its_crate() {
        let map = rock_except(6, &[CPos::new(2, 2)]);
        let mut sim = SimBuilder::new(test_config(6, 0, 100)).map(map).build().unwrap();
        let (carrier, cargo) = with_loaded_carrier(&mut sim, CPos::new(2, 2));
        sim.unload(carrier, CPos::new(3, 2)).unwrap();

        let mut recorder = EventRecorder::default();
        sim.run_until_idle(&mut recorder).unwrap();

        assert_eq!(
            recorder.events[0].outcome,
            ActivityOutcome::Aborted(AbortReason::NoStagingCell)
        );
        assert_still_carried(&sim.world, carrier, cargo);
    }

    #[test]
    fn occupied_target_is_not_unloaded_onto() {
        let mut sim = SimBuilder::new(test_config(16, 2, 500)).build().unwrap();
        let (carrier, cargo) = with_loaded_carrier(&mut sim, CPos::new(8, 8));
        sim.world
            .spawn_sub_actor("rubble", CPos::new(8, 6), WAngle::ZERO, None)
            .unwrap();
        sim.unload(carrier, CPos::new(8, 6)).unwrap();

        let mut recorder = EventRecorder::default();
        sim.run_until_idle(&mut recorder).unwrap();

        assert_eq!(
            recorder.events[0].outcome,
            ActivityOutcome::Aborted(AbortReason::UnloadBlocked)
        );
        assert_still_carried(&sim.world, carrier, cargo);
    }

    #[test]
    fn cancel_before_loop_keeps_crate_attached() {
        let (mut sim, carrier, cargo) = corridor();
        sim.run_ticks(5, &mut NoopObserver).unwrap();
        sim.world.cancel_activity(carrier).unwrap();

        let mut recorder = EventRecorder::default();
        sim.run_until_idle(&mut recorder).unwrap();

        assert_eq!(
            recorder.events[0].outcome,
            ActivityOutcome::Aborted(AbortReason::Canceled)
        );
        assert_still_carried(&sim.world, carrier, cargo);
    }

    #[test]
    fn cancel_after_loop_still_delivers() {
        let (mut sim, carrier, cargo) = corridor();
        // The release poll runs from tick 51 to tick 59.
        sim.run_ticks(55, &mut NoopObserver).unwrap();
        sim.world.cancel_activity(carrier).unwrap();

        let mut recorder = EventRecorder::default();
        sim.run_until_idle(&mut recorder).unwrap();

        assert!(recorder.events[0].outcome.is_completed());
        assert_delivered(&sim.world, cargo, CPos::new(10, 9));
    }

    #[test]
    fn index_stays_consistent_throughout() {
        let (mut sim, _carrier, cargo) = corridor();
        let mut check = IndexCheck { cargo, checked: 0 };
        let ticks = sim.run_until_idle(&mut check).unwrap();
        assert_eq!(check.checked, ticks);
        assert_delivered(&sim.world, cargo, CPos::new(10, 9));
    }

    #[test]
    fn index_stays_consistent_when_canceled() {
        let (mut sim, carrier, cargo) = corridor();
        let mut check = IndexCheck { cargo, checked: 0 };
        sim.run_ticks(40, &mut check).unwrap();
        sim.world.cancel_activity(carrier).unwrap();
        sim.run_until_idle(&mut check).unwrap();
        assert_still_carried(&sim.world, carrier, cargo);
    }
}

// ── Carrier destruction ───────────────────────────────────────────────────────

#[cfg(test)]
mod destruction_tests {
    use super::*;

    #[test]
    fn carrier_destroyed_mid_dock_leaves_crate_on_target() {
        let (mut sim, carrier, cargo) = corridor();
        sim.run_ticks(40, &mut NoopObserver).unwrap();
        assert!(sim.world.sub_actor(cargo).unwrap().is_unloading());

        sim.world.destroy_actor(carrier).unwrap();
        sim.run_ticks(1, &mut NoopObserver).unwrap();

        assert!(sim.world.actor(carrier).is_none());
        assert_delivered(&sim.world, cargo, CPos::new(10, 9));
        assert_eq!(sim.run_until_idle(&mut NoopObserver).unwrap(), 0);
    }

    #[test]
    fn carrier_destroyed_en_route_drops_crate_where_it_was() {
        let (mut sim, carrier, cargo) = corridor();
        // Five ticks into the first 16-tick step north.
        sim.run_ticks(5, &mut NoopObserver).unwrap();

        sim.world.destroy_actor(carrier).unwrap();
        sim.run_ticks(1, &mut NoopObserver).unwrap();

        let sub = sim.world.sub_actor(cargo).unwrap();
        assert_eq!(sub.mount(), Mount::Detached);
        assert_eq!(sub.own_location(), CPos::new(10, 10));
        assert!(sim.world.is_in_world(cargo));
        assert_eq!(sim.world.spatial().occupants(CPos::new(10, 10)), &[cargo]);
        assert_eq!(sim.world.spatial().occurrences(cargo), 1);
    }
}

// ── Determinism ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod replay_tests {
    use super::*;

    fn replay(seed: u64) -> (Vec<dk_world::ActivityEvent>, CPos, WPos, u64) {
        let mut sim = SimBuilder::new(test_config(16, seed, 500)).build().unwrap();
        let (carrier, cargo) = with_loaded_carrier(&mut sim, CPos::new(8, 8));
        let (other, _) = with_loaded_carrier(&mut sim, CPos::new(3, 3));
        sim.unload(carrier, CPos::new(9, 7)).unwrap();
        sim.unload(other, CPos::new(3, 4)).unwrap();

        let mut recorder = EventRecorder::default();
        sim.run_until_idle(&mut recorder).unwrap();

        let landed = sim.world.sub_actor(cargo).unwrap().own_location();
        let parked = sim.world.center_position(carrier).unwrap();
        let draws = sim.world.shared_random().draws();
        (recorder.events, landed, parked, draws)
    }

    #[test]
    fn same_seed_same_outcome() {
        let a = replay(11);
        let b = replay(11);
        assert_eq!(a, b);
        assert_eq!(a.1, CPos::new(9, 7));
        assert_eq!(a.0.len(), 2);
    }
}
