//! `dk-world` — actors, attached positioning, activities, and the tick driver.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`world`]       | `World` — actor table, spatial state, tick order          |
//! | [`actor`]       | `Actor`, `Body` (`Mobile` / `SubActor`)                   |
//! | [`positioning`] | `SubActor`, `Mount` — attached vs. detached positioning   |
//! | [`mobile`]      | Cell moves, movement cost, `BlockedByActor`, blockers     |
//! | [`activity`]    | `Activity` trait, `ActivityRunner`, outcomes and events   |
//! | [`move_to`]     | `MoveTo` — greedy cell-by-cell movement                   |
//! | [`drag`]        | `Drag` — fixed-duration straight-line slide               |
//! | [`transporter`] | `CrateTransporter` — carrier side of an unload            |
//! | [`frame`]       | `FrameEndTask` — deferred add/remove from the live set    |
//! | [`error`]       | `WorldError`, `WorldResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Forwards to `dk-core/serde` and `dk-spatial/serde`.          |

pub mod activity;
pub mod actor;
pub mod drag;
pub mod error;
pub mod frame;
pub mod mobile;
pub mod move_to;
pub mod positioning;
pub mod transporter;
pub mod world;


pub use activity::{
    AbortReason, Activity, ActivityContext, ActivityEvent, ActivityOutcome, ActivityRunner,
    ActivityStatus,
};
pub use actor::{Actor, Body, Mobile};
pub use drag::Drag;
pub use error::{WorldError, WorldResult};
pub use frame::FrameEndTask;
pub use mobile::BlockedByActor;
pub use move_to::{MAX_BLOCKED_TICKS, MoveTo};
pub use positioning::{Mount, SubActor};
pub use transporter::CrateTransporter;
pub use world::World;
