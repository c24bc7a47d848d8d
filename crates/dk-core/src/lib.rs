//! `dk-core` — foundational types for the dock simulation.
//!
//! This crate is a dependency of every other `dk-*` crate.  It intentionally
//! has no `dk-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `ActorId`                                             |
//! | [`geo`]         | `CPos`, `CVec`, `WPos`, `WVec`, `WAngle`, `WRot`      |
//! | [`time`]        | `Tick`                                                |
//! | [`rng`]         | `SharedRandom` (world-wide deterministic source)      |
//! | [`config`]      | `DockConfig`, `WorldConfig`, `SimConfig`              |
//! | [`error`]       | `DkError`, `DkResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to geometry and config.     |
//!
//! # Determinism
//!
//! Nothing in the simulation uses floating point.  World positions are
//! integer "world units" (1024 per cell) and every length, interpolation and
//! speed computation is done in integer arithmetic so replays are bit-exact.

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{DockConfig, SimConfig, WorldConfig};
pub use error::{DkError, DkResult};
pub use geo::{CELL_SIZE, CPos, CVec, WAngle, WPos, WRot, WVec};
pub use ids::ActorId;
pub use rng::SharedRandom;
pub use time::Tick;
