//! Simulation observer trait for progress reporting and data collection.

use dk_core::Tick;
use dk_world::{ActivityEvent, World};

/// Callbacks invoked by [`Sim`][crate::Sim] at key points in the tick loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: delivery printer
///
/// ```rust,ignore
/// struct Deliveries;
///
/// impl SimObserver for Deliveries {
///     fn on_activity_finished(&mut self, event: &ActivityEvent) {
///         if event.activity == "CrateUnload" {
///             println!("{}: {} {:?}", event.tick, event.actor, event.outcome);
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called for every top-level activity that finished during the tick,
    /// in the order they finished.
    fn on_activity_finished(&mut self, _event: &ActivityEvent) {}

    /// Called once the tick is fully applied, frame-end tasks included.
    fn on_tick_end(&mut self, _tick: Tick, _world: &World) {}

    /// Called once after the final tick of [`Sim::run`][crate::Sim::run].
    fn on_sim_end(&mut self, _final_tick: Tick) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// Keeps every activity event it sees.
#[derive(Default, Debug)]
pub struct EventRecorder {
    pub events: Vec<ActivityEvent>,
}

impl SimObserver for EventRecorder {
    fn on_activity_finished(&mut self, event: &ActivityEvent) {
        self.events.push(event.clone());
    }
}
