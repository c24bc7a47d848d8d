//! Crate transporter: the carrier side of an unload.
//!
//! A transporter holds at most one crate (a [`SubActor`](crate::SubActor)
//! attached to the carrier).  Unloading is a handshake:
//!
//! 1. [`World::can_unload_at`] checks the target cell.
//! 2. [`World::reserve_unload_location`] claims the cell: the crate starts
//!    unloading onto it and enters the world at the next frame boundary.
//! 3. [`World::unload_crate`] is polled every tick.  It returns the crate
//!    once the release delay has elapsed, detached from the carrier.
//! 4. [`World::cancel_unload`] abandons a reservation; the crate goes back
//!    out of the world but stays attached.

use dk_core::{ActorId, CPos};

use crate::{Body, FrameEndTask, World, WorldError, WorldResult};

#[derive(Clone, Debug, Default)]
pub struct CrateTransporter {
    cargo:             Option<ActorId>,
    reserved:          Option<CPos>,
    release_countdown: Option<u32>,
    unload_delay:      u32,
}

impl CrateTransporter {
    pub fn new(unload_delay: u32) -> Self {
        Self { unload_delay, ..Self::default() }
    }

    pub fn cargo(&self) -> Option<ActorId> {
        self.cargo
    }

    /// Cell claimed by an unload in progress.
    pub fn reserved(&self) -> Option<CPos> {
        self.reserved
    }

    pub(crate) fn forget(&mut self, cargo: ActorId) {
        if self.cargo == Some(cargo) {
            *self = Self::new(self.unload_delay);
        }
    }
}

impl World {
    fn transporter(&self, carrier: ActorId) -> WorldResult<&CrateTransporter> {
        self.actor(carrier)
            .ok_or(WorldError::UnknownActor(carrier))?
            .transporter
            .as_ref()
            .ok_or(WorldError::NoTransporter(carrier))
    }

    fn transporter_mut(&mut self, carrier: ActorId) -> WorldResult<&mut CrateTransporter> {
        self.actor_mut(carrier)
            .ok_or(WorldError::UnknownActor(carrier))?
            .transporter
            .as_mut()
            .ok_or(WorldError::NoTransporter(carrier))
    }

    /// Put `cargo` on `carrier`.  The crate is attached and taken out of the
    /// world.  Scenario setup only; there is no loading activity.
    pub fn load_crate(&mut self, carrier: ActorId, cargo: ActorId) -> WorldResult<()> {
        if let Some(current) = self.transporter(carrier)?.cargo {
            return Err(WorldError::TransporterFull { carrier, cargo: current });
        }
        self.sub_actor(cargo)?;

        self.set_parent(cargo, Some(carrier))?;
        if self.is_in_world(cargo) {
            self.add_frame_end_task(FrameEndTask::RemoveFromWorld(cargo));
        }
        self.transporter_mut(carrier)?.cargo = Some(cargo);
        log::debug!("{carrier} loaded {cargo}");
        Ok(())
    }

    /// Whether the carried crate could be put down on `cell`: the carrier
    /// has a crate, the cell is on the map and passable, and nothing but the
    /// carrier or its crate stands there.
    pub fn can_unload_at(&self, carrier: ActorId, cell: CPos) -> bool {
        let Ok(transporter) = self.transporter(carrier) else {
            return false;
        };
        let Some(cargo) = transporter.cargo else {
            return false;
        };
        if transporter.reserved.is_some_and(|r| r != cell) {
            return false;
        }
        let passable = self
            .actor(carrier)
            .and_then(|a| match &a.body {
                Body::Mobile(m) => Some(m.locomotor.can_traverse(&self.map, cell)),
                Body::Sub(_) => None,
            })
            .unwrap_or(false);
        passable && self.spatial.is_free(cell, &[carrier, cargo])
    }

    /// Claim `cell` for the carried crate and start the release countdown.
    pub fn reserve_unload_location(&mut self, carrier: ActorId, cell: CPos) -> WorldResult<()> {
        let transporter = self.transporter_mut(carrier)?;
        let Some(cargo) = transporter.cargo else {
            return Ok(());
        };
        transporter.reserved = Some(cell);
        transporter.release_countdown = Some(transporter.unload_delay);
        self.begin_unloading(cargo, cell)
    }

    /// Drop the current reservation, if any.
    pub fn cancel_unload(&mut self, carrier: ActorId) -> WorldResult<()> {
        let transporter = self.transporter_mut(carrier)?;
        transporter.release_countdown = None;
        let (Some(cargo), Some(_)) = (transporter.cargo, transporter.reserved.take()) else {
            return Ok(());
        };
        self.cancel_unloading(cargo)
    }

    /// Poll for the crate.  Returns it, detached, once the release delay of
    /// a reserved unload has run out; `None` until then.
    pub fn unload_crate(&mut self, carrier: ActorId) -> WorldResult<Option<ActorId>> {
        let transporter = self.transporter_mut(carrier)?;
        let Some(remaining) = transporter.release_countdown else {
            return Ok(None);
        };
        if remaining > 0 {
            transporter.release_countdown = Some(remaining - 1);
            return Ok(None);
        }

        transporter.release_countdown = None;
        transporter.reserved = None;
        let Some(cargo) = transporter.cargo.take() else {
            return Ok(None);
        };
        self.set_parent(cargo, None)?;
        log::info!("{carrier} released {cargo}");
        Ok(Some(cargo))
    }
}
