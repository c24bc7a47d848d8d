//! `dk-sim` — run loop for the dock simulation.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                   |
//! |--------------|------------------------------------------------------------|
//! | [`builder`]  | `SimBuilder` — config + terrain → `Sim`                    |
//! | [`sim`]      | `Sim` — owns the `World`, `run` / `run_ticks` / `run_until_idle` |
//! | [`observer`] | `SimObserver` hooks, `NoopObserver`, `EventRecorder`       |
//! | [`error`]    | `SimError`, `SimResult<T>`                                 |
//!
//! # Determinism
//!
//! Two sims built from the same `SimConfig` and terrain, given the same
//! spawns and orders in the same order, produce identical event streams and
//! identical final positions.  The world's shared random source is the only
//! randomness and actors always tick in id order.

pub mod builder;
pub mod error;
pub mod observer;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use observer::{EventRecorder, NoopObserver, SimObserver};
pub use sim::Sim;
