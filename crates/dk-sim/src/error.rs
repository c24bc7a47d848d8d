use dk_core::DkError;
use dk_dock::DockError;
use dk_world::WorldError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] DkError),

    #[error("map is {got_width}x{got_height} but the configuration says {width}x{height}")]
    MapSizeMismatch {
        width:      i32,
        height:     i32,
        got_width:  i32,
        got_height: i32,
    },

    #[error("actors still busy after {ticks} ticks")]
    NotSettled { ticks: u64 },

    #[error(transparent)]
    World(#[from] WorldError),

    #[error(transparent)]
    Dock(#[from] DockError),
}

pub type SimResult<T> = Result<T, SimError>;
