//! Unit tests for dk-dock.

use dk_core::{ActorId, CPos, WAngle, WorldConfig};
use dk_spatial::{Locomotor, TerrainMap, TerrainType};
use dk_world::World;

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Carrier with a loaded crate at `at` on `map`.
fn loaded_carrier(map: TerrainMap, at: CPos) -> (World, ActorId, ActorId) {
    let mut world = World::with_map(WorldConfig::default(), map).unwrap();
    let carrier = world
        .spawn_carrier("truck", at, WAngle::ZERO, Locomotor::wheeled(64))
        .unwrap();
    let cargo = world
        .spawn_sub_actor("crate", at, WAngle::ZERO, Some(carrier))
        .unwrap();
    (world, carrier, cargo)
}

/// A map of rock with only `open` cells passable.
fn rock_except(width: i32, height: i32, open: &[CPos]) -> TerrainMap {
    let mut map = TerrainMap::open(width, height);
    for y in 0..height {
        for x in 0..width {
            let cell = CPos::new(x, y);
            if !open.contains(&cell) {
                map.set_terrain(cell, TerrainType::Rock).unwrap();
            }
        }
    }
    map
}

fn run_until_idle(world: &mut World, actor: ActorId, max_ticks: u32) -> u32 {
    let mut ticks = 0;
    while !world.is_idle(actor) {
        assert!(ticks < max_ticks, "{actor} still busy after {max_ticks} ticks");
        world.tick().unwrap();
        ticks += 1;
    }
    ticks
}

// ── Geometry ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod geometry {
    use dk_core::{CVec, DockConfig, WVec};

    use super::*;
    use crate::{dock_distance, dock_offset, dock_position, dock_speed, ticks_to_dock};

    #[test]
    fn diagonal_and_orthogonal_distances() {
        let config = DockConfig::default();
        assert_eq!(dock_distance(&config, CVec::new(1, 1)), 570);
        assert_eq!(dock_distance(&config, CVec::new(-1, 1)), 570);
        assert_eq!(dock_distance(&config, CVec::new(1, 0)), 405);
        assert_eq!(dock_distance(&config, CVec::new(0, 1)), 405);
    }

    #[test]
    fn offset_points_at_target() {
        let config = DockConfig::default();
        let staging = CPos::new(5, 5);
        assert_eq!(dock_offset(&config, staging, CPos::new(6, 6)), WVec::new(570, 570, 0));
        assert_eq!(dock_offset(&config, staging, CPos::new(6, 5)), WVec::new(405, 0, 0));
        assert_eq!(dock_offset(&config, staging, CPos::new(5, 4)), WVec::new(0, -405, 0));
        assert_eq!(dock_offset(&config, staging, CPos::new(4, 6)), WVec::new(-570, 570, 0));
        // Only the direction matters, not how far away the target is.
        assert_eq!(dock_offset(&config, staging, CPos::new(7, 5)), WVec::new(405, 0, 0));
        assert_eq!(dock_offset(&config, staging, staging), WVec::ZERO);
    }

    #[test]
    fn dock_position_is_offset_from_staging_center() {
        let config = DockConfig::default();
        let staging = CPos::new(10, 10);
        assert_eq!(
            dock_position(&config, staging, CPos::new(10, 9)),
            staging.center() + WVec::new(0, -405, 0)
        );
    }

    #[test]
    fn dock_speed_is_thirty_percent() {
        let config = DockConfig::default();
        assert_eq!(dock_speed(&config, 100), 30);
        assert_eq!(dock_speed(&config, 64), 19);
        assert_eq!(dock_speed(&config, 3), 0);
    }

    #[test]
    fn tick_budget_rounds_down() {
        let from = CPos::new(10, 10).center();
        let to = from + WVec::new(0, -405, 0);
        assert_eq!(ticks_to_dock(from, to, 19), Some(21));
        assert_eq!(ticks_to_dock(from, to, 30), Some(13));
        assert_eq!(ticks_to_dock(from, to, 500), Some(0));
        assert_eq!(ticks_to_dock(from, to, 0), None);
    }
}

// ── UnloadOrder ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod order {
    use super::*;
    use crate::{DockError, UnloadOrder};

    #[test]
    fn validation() {
        let (mut world, carrier, _cargo) = loaded_carrier(TerrainMap::open(8, 8), CPos::new(2, 2));

        assert!(UnloadOrder::new(carrier, CPos::new(2, 1)).validate(&world).is_ok());
        assert!(matches!(
            UnloadOrder::new(carrier, CPos::new(8, 1)).validate(&world),
            Err(DockError::TargetOffMap(_))
        ));
        assert!(matches!(
            UnloadOrder::new(ActorId(42), CPos::new(2, 1)).validate(&world),
            Err(DockError::UnknownCarrier(_))
        ));

        let plain = world
            .spawn_mobile("jeep", CPos::new(5, 5), WAngle::ZERO, Locomotor::wheeled(64))
            .unwrap();
        assert!(matches!(
            UnloadOrder::new(plain, CPos::new(5, 4)).validate(&world),
            Err(DockError::NotATransporter(_))
        ));

        let empty = world
            .spawn_carrier("empty", CPos::new(6, 6), WAngle::ZERO, Locomotor::wheeled(64))
            .unwrap();
        assert!(matches!(
            UnloadOrder::new(empty, CPos::new(6, 5)).validate(&world),
            Err(DockError::NoCargo(_))
        ));
    }

    #[test]
    fn issue_queues_unload() {
        let (mut world, carrier, _cargo) = loaded_carrier(TerrainMap::open(8, 8), CPos::new(2, 2));
        UnloadOrder::new(carrier, CPos::new(2, 1)).issue(&mut world).unwrap();
        assert_eq!(
            world.actor(carrier).unwrap().current_activity(),
            Some("CrateUnload")
        );
    }
}

// ── CrateUnload ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod unload {
    use dk_core::{DockConfig, WPos, WVec};
    use dk_world::{AbortReason, ActivityOutcome, Mount};

    use super::*;
    use crate::CrateUnload;

    #[test]
    fn boxed_in_carrier_aborts_without_touching_cargo() {
        let map = rock_except(5, 5, &[CPos::new(2, 2)]);
        let (mut world, carrier, cargo) = loaded_carrier(map, CPos::new(2, 2));
        world.queue_activity(carrier, CrateUnload::new(CPos::new(2, 1))).unwrap();

        assert_eq!(run_until_idle(&mut world, carrier, 10), 1);
        let events = world.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].outcome, ActivityOutcome::Aborted(AbortReason::NoStagingCell));

        assert_eq!(world.parent_of(cargo), Some(carrier));
        assert!(!world.is_in_world(cargo));
        assert!(!world.sub_actor(cargo).unwrap().is_unloading());
        assert_eq!(world.shared_random().draws(), 0);
    }

    /// Carrier at (10,10), target (10,9), everything else rock.  The carrier
    /// first drives onto the target; the only way back out is (10,10), which
    /// becomes the staging cell.
    #[test]
    fn corridor_unload_timeline() {
        let map = rock_except(20, 20, &[CPos::new(10, 10), CPos::new(10, 9)]);
        let (mut world, carrier, cargo) = loaded_carrier(map, CPos::new(10, 10));
        world.queue_activity(carrier, CrateUnload::new(CPos::new(10, 9))).unwrap();

        // 16 + 16 move, 21 dock drag, 8 release polls + 1, undock,
        // complete, 20 settle.
        assert_eq!(run_until_idle(&mut world, carrier, 200), 81);

        let events = world.drain_events();
        assert_eq!(events.len(), 1);
        assert!(events[0].outcome.is_completed());
        assert_eq!(events[0].tick.0, 80);

        assert_eq!(world.location(carrier), Some(CPos::new(10, 10)));
        assert_eq!(world.center_position(carrier), Some(CPos::new(10, 10).center()));

        let sub = world.sub_actor(cargo).unwrap();
        assert_eq!(sub.mount(), Mount::Detached);
        assert!(!sub.is_unloading());
        assert_eq!(sub.own_location(), CPos::new(10, 9));
        assert_eq!(world.center_position(cargo), Some(CPos::new(10, 9).center()));
        assert!(world.is_in_world(cargo));
        assert_eq!(world.spatial().occupants(CPos::new(10, 9)), &[cargo]);
        assert_eq!(world.spatial().occurrences(cargo), 1);
        assert_eq!(world.spatial().occupants(CPos::new(10, 10)), &[carrier]);
    }

    /// Runs the corridor unload under `dock`, recording the carrier's center
    /// after every tick.
    fn corridor_with(dock: DockConfig) -> (World, ActorId, ActorId, Vec<WPos>) {
        let map = rock_except(20, 20, &[CPos::new(10, 10), CPos::new(10, 9)]);
        let config = WorldConfig { dock, ..WorldConfig::default() };
        let mut world = World::with_map(config, map).unwrap();
        let carrier = world
            .spawn_carrier("truck", CPos::new(10, 10), WAngle::ZERO, Locomotor::wheeled(64))
            .unwrap();
        let cargo = world
            .spawn_sub_actor("crate", CPos::new(10, 10), WAngle::ZERO, Some(carrier))
            .unwrap();
        world.queue_activity(carrier, CrateUnload::new(CPos::new(10, 9))).unwrap();

        let mut centers = Vec::new();
        while !world.is_idle(carrier) {
            assert!(centers.len() < 200, "unload did not settle");
            world.tick().unwrap();
            centers.push(world.center_position(carrier).unwrap());
        }
        (world, carrier, cargo, centers)
    }

    /// Without a dock drag the carrier sits on the staging cell center from
    /// the end of the approach until it is done, and every later phase moves
    /// up by the 21 ticks the drag would have taken.
    fn assert_undragged_delivery(world: &mut World, cargo: ActorId, centers: &[WPos]) {
        // 16 + 16 move, Dock on the next tick, 8 release polls + 1, undock,
        // complete, 20 settle.
        assert_eq!(centers.len(), 62);
        let staging = CPos::new(10, 10).center();
        assert!(centers[30..].iter().all(|&c| c == staging));

        let events = world.drain_events();
        assert_eq!(events.len(), 1);
        assert!(events[0].outcome.is_completed());
        assert_eq!(events[0].tick.0, 61);

        let sub = world.sub_actor(cargo).unwrap();
        assert_eq!(sub.mount(), Mount::Detached);
        assert_eq!(sub.own_location(), CPos::new(10, 9));
        assert_eq!(world.spatial().occupants(CPos::new(10, 9)), &[cargo]);
    }

    #[test]
    fn dock_point_within_one_tick_queues_no_drag() {
        // Dock speed 64 * 30% = 19 covers a 15-unit push in 0 whole ticks.
        let dock = DockConfig { orthogonal_dock_distance: 15, ..DockConfig::default() };
        let (mut world, _carrier, cargo, centers) = corridor_with(dock);

        let dock_point = CPos::new(10, 10).center() + WVec::new(0, -15, 0);
        assert!(!centers.contains(&dock_point));
        assert_undragged_delivery(&mut world, cargo, &centers);
    }

    #[test]
    fn zero_dock_speed_skips_drag_and_still_delivers() {
        // 64 * 1% rounds down to a dock speed of 0.
        let dock = DockConfig { dock_speed_percent: 1, ..DockConfig::default() };
        let (mut world, _carrier, cargo, centers) = corridor_with(dock);

        let dock_point = CPos::new(10, 10).center() + WVec::new(0, -405, 0);
        assert!(!centers.contains(&dock_point));
        assert_undragged_delivery(&mut world, cargo, &centers);
    }

    #[test]
    fn cancel_during_dock_drag_undocks() {
        let map = rock_except(20, 20, &[CPos::new(10, 10), CPos::new(10, 9)]);
        let (mut world, carrier, cargo) = loaded_carrier(map, CPos::new(10, 10));
        world.queue_activity(carrier, CrateUnload::new(CPos::new(10, 9))).unwrap();

        // Ticks 30..=50 are the dock drag.
        for _ in 0..40 {
            world.tick().unwrap();
        }
        assert!(world.sub_actor(cargo).unwrap().is_unloading());
        world.cancel_activity(carrier).unwrap();
        run_until_idle(&mut world, carrier, 100);

        assert_eq!(
            world.drain_events()[0].outcome,
            ActivityOutcome::Aborted(AbortReason::Canceled)
        );
        assert_eq!(world.parent_of(cargo), Some(carrier));
        assert!(!world.is_in_world(cargo));
        assert!(!world.sub_actor(cargo).unwrap().is_unloading());
        assert_eq!(world.spatial().occurrences(cargo), 0);

        let transporter = world.actor(carrier).unwrap().transporter.as_ref().unwrap();
        assert_eq!(transporter.cargo(), Some(cargo));
        assert_eq!(transporter.reserved(), None);
        assert_eq!(world.center_position(carrier), Some(CPos::new(10, 10).center()));
    }
}
