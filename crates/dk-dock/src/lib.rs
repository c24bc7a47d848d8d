//! `dk-dock` — the crate unload docking sequence.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                     |
//! |--------------|--------------------------------------------------------------|
//! | [`unload`]   | `CrateUnload` activity, `DockingState`                       |
//! | [`geometry`] | Dock point, dock speed, and tick budget                      |
//! | [`order`]    | `UnloadOrder` — validate and issue an unload                 |
//! | [`error`]    | `DockError`, `DockResult<T>`                                 |
//!
//! # Usage
//!
//! ```rust,ignore
//! let carrier = world.spawn_carrier("truck", CPos::new(10, 10), WAngle::ZERO, Locomotor::wheeled(64))?;
//! world.spawn_sub_actor("crate", CPos::new(10, 10), WAngle::ZERO, Some(carrier))?;
//! UnloadOrder::new(carrier, CPos::new(10, 9)).issue(&mut world)?;
//! while !world.is_idle(carrier) {
//!     world.tick()?;
//! }
//! ```

pub mod error;
pub mod geometry;
pub mod order;
pub mod unload;

#[cfg(test)]
mod tests;

pub use error::{DockError, DockResult};
pub use geometry::{dock_distance, dock_offset, dock_position, dock_speed, ticks_to_dock};
pub use order::UnloadOrder;
pub use unload::{CrateUnload, DockingState};
