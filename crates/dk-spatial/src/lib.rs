//! `dk-spatial` — terrain, movement cost lookup, and cell occupancy.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                  |
//! |---------------|-----------------------------------------------------------|
//! | [`terrain`]   | `TerrainType`, `TerrainMap` (row-major grid)              |
//! | [`locomotor`] | `Locomotor` — terrain-dependent movement speed            |
//! | [`index`]     | `SpatialIndex` — cell → occupants, tracked centers         |
//! | [`error`]     | `SpatialError`, `SpatialResult<T>`                        |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on terrain and locomotors. |

pub mod error;
pub mod index;
pub mod locomotor;
pub mod terrain;


pub use error::{SpatialError, SpatialResult};
pub use index::SpatialIndex;
pub use locomotor::Locomotor;
pub use terrain::{TerrainMap, TerrainType};
