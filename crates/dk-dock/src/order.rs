//! Issuing unload orders.

use dk_core::{ActorId, CPos};
use dk_world::World;

use crate::{CrateUnload, DockError, DockResult};

/// "Unload your crate at `target`."
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct UnloadOrder {
    pub carrier: ActorId,
    pub target:  CPos,
    /// Append to the carrier's queue instead of replacing what it is doing.
    pub queued:  bool,
}

impl UnloadOrder {
    pub fn new(carrier: ActorId, target: CPos) -> Self {
        Self { carrier, target, queued: false }
    }

    pub fn queued(mut self) -> Self {
        self.queued = true;
        self
    }

    /// Check the order against the current world.
    pub fn validate(&self, world: &World) -> DockResult<()> {
        let actor = world.actor(self.carrier).ok_or(DockError::UnknownCarrier(self.carrier))?;
        if actor.mobile().is_none() {
            return Err(DockError::NotATransporter(self.carrier));
        }
        let transporter = actor
            .transporter
            .as_ref()
            .ok_or(DockError::NotATransporter(self.carrier))?;
        if transporter.cargo().is_none() {
            return Err(DockError::NoCargo(self.carrier));
        }
        if !world.map().contains(self.target) {
            return Err(DockError::TargetOffMap(self.target));
        }
        Ok(())
    }

    /// Validate and hand the carrier a [`CrateUnload`].  Unless queued, the
    /// carrier's current activities are asked to cancel first.
    pub fn issue(self, world: &mut World) -> DockResult<()> {
        self.validate(world)?;
        if !self.queued {
            world.cancel_activity(self.carrier)?;
        }
        world.queue_activity(self.carrier, CrateUnload::new(self.target))?;
        log::info!("{} ordered to unload at {}", self.carrier, self.target);
        Ok(())
    }
}
