//! The `Sim` struct and its tick loop.

use dk_core::{ActorId, CPos, SimConfig, Tick};
use dk_dock::UnloadOrder;
use dk_world::World;

use crate::{SimError, SimObserver, SimResult};

/// The simulation runner.
///
/// `Sim` owns the [`World`] and drives it one tick at a time, reporting to a
/// [`SimObserver`]:
///
/// 1. `on_tick_start`
/// 2. [`World::tick`]: activities, then sub-actor followers, then frame-end tasks
/// 3. `on_activity_finished` for each top-level activity that ended
/// 4. `on_tick_end`
///
/// Create via [`SimBuilder`][crate::SimBuilder].
#[derive(Debug)]
pub struct Sim {
    pub config: SimConfig,
    pub world:  World,
}

impl Sim {
    // ── Orders ────────────────────────────────────────────────────────────

    /// Order `carrier` to unload its crate at `target`, replacing whatever
    /// it is doing.
    pub fn unload(&mut self, carrier: ActorId, target: CPos) -> SimResult<()> {
        UnloadOrder::new(carrier, target).issue(&mut self.world)?;
        Ok(())
    }

    // ── Running ───────────────────────────────────────────────────────────

    pub fn current_tick(&self) -> Tick {
        self.world.current_tick()
    }

    /// Run from the current tick up to `config.total_ticks`.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.current_tick().0 < self.config.total_ticks {
            self.step(observer)?;
        }
        observer.on_sim_end(self.current_tick());
        Ok(())
    }

    /// Run exactly `n` ticks (ignores `total_ticks`).
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.step(observer)?;
        }
        Ok(())
    }

    /// Tick until no actor has anything left to do.  Gives up with
    /// [`SimError::NotSettled`] after `total_ticks` ticks.  Returns the
    /// number of ticks run.
    pub fn run_until_idle<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<u64> {
        let mut ticks = 0;
        while self.world.actors().any(|a| !a.is_idle()) {
            if ticks >= self.config.total_ticks {
                return Err(SimError::NotSettled { ticks });
            }
            self.step(observer)?;
            ticks += 1;
        }
        Ok(ticks)
    }

    /// Run one tick.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.current_tick();
        observer.on_tick_start(now);

        let result = self.world.tick();
        for event in self.world.drain_events() {
            observer.on_activity_finished(&event);
        }
        result?;

        observer.on_tick_end(now, &self.world);
        Ok(())
    }
}
