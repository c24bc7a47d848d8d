//! Spatial-subsystem error type.

use thiserror::Error;

use dk_core::CPos;

/// Errors produced by `dk-spatial`.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("cell {0} is outside the map")]
    OutOfBounds(CPos),

    #[error("terrain grid has {got} cells, expected {expected} for a {width}x{height} map")]
    BadDimensions {
        width:    i32,
        height:   i32,
        expected: usize,
        got:      usize,
    },
}

pub type SpatialResult<T> = Result<T, SpatialError>;
