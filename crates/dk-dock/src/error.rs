use dk_core::{ActorId, CPos};
use dk_world::WorldError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DockError {
    #[error("carrier {0} does not exist")]
    UnknownCarrier(ActorId),

    #[error("actor {0} cannot carry crates")]
    NotATransporter(ActorId),

    #[error("carrier {0} has no crate to unload")]
    NoCargo(ActorId),

    #[error("unload target {0} is off the map")]
    TargetOffMap(CPos),

    #[error(transparent)]
    World(#[from] WorldError),
}

pub type DockResult<T> = Result<T, DockError>;
