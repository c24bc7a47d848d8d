use dk_core::{ActorId, DkError};
use dk_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorldError {
    #[error("actor {0} does not exist")]
    UnknownActor(ActorId),

    #[error("actor {0} has no mobile body")]
    NotMobile(ActorId),

    #[error("actor {0} is not an attachable sub-actor")]
    NotSubActor(ActorId),

    #[error("actor {0} has no crate transporter")]
    NoTransporter(ActorId),

    #[error("actor table is full")]
    TooManyActors,

    #[error("attaching {actor} to {parent} would make it its own ancestor")]
    ParentCycle { actor: ActorId, parent: ActorId },

    #[error("transporter {carrier} already carries {cargo}")]
    TransporterFull { carrier: ActorId, cargo: ActorId },

    /// A state machine reached a state it cannot legally be in.  Always a
    /// bug, never a gameplay condition.
    #[error("activity {activity} on {actor} reached invalid state: {state}")]
    InvalidActivityState {
        actor:    ActorId,
        activity: &'static str,
        state:    String,
    },

    #[error(transparent)]
    Config(#[from] DkError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),
}

pub type WorldResult<T> = Result<T, WorldError>;
