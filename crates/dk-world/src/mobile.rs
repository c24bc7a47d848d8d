//! Mobile bodies: cell occupancy, movement cost and blocking.

use dk_core::{ActorId, CPos, WPos};

use crate::{Body, MoveTo, World, WorldError, WorldResult};

/// Which actors count as obstacles in [`World::can_enter_cell`].
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum BlockedByActor {
    /// Only terrain matters.
    None,
    /// Only actors that cannot be asked to move (anything but a mobile).
    Immovable,
    /// Every other actor blocks.
    #[default]
    All,
}

impl World {
    /// Cell a mobile actor stands on.
    pub fn location(&self, actor: ActorId) -> Option<CPos> {
        self.actor(actor)?.mobile().map(|m| m.location)
    }

    /// Move a mobile actor's center without changing its cell.
    pub fn set_center_position(&mut self, actor: ActorId, center: WPos) -> WorldResult<()> {
        let mobile = self
            .actor_mut(actor)
            .ok_or(WorldError::UnknownActor(actor))?
            .mobile_mut()
            .ok_or(WorldError::NotMobile(actor))?;
        mobile.center = center;
        self.spatial.update_position(actor, center);
        Ok(())
    }

    /// Move a mobile actor onto `cell`, keeping its center.  The index is
    /// updated in the same call.
    pub fn set_location(&mut self, actor: ActorId, cell: CPos) -> WorldResult<()> {
        let mobile = self
            .actor_mut(actor)
            .ok_or(WorldError::UnknownActor(actor))?
            .mobile_mut()
            .ok_or(WorldError::NotMobile(actor))?;
        if mobile.location == cell {
            return Ok(());
        }
        mobile.location = cell;
        self.update_maps(actor);
        Ok(())
    }

    /// Locomotor speed of `actor` on `cell`.  `0` for impassable cells and
    /// for actors without a mobile body.
    pub fn movement_speed_for_cell(&self, actor: ActorId, cell: CPos) -> i32 {
        self.actor(actor)
            .and_then(|a| a.mobile())
            .map_or(0, |m| m.locomotor.movement_speed_for_cell(&self.map, cell))
    }

    /// Whether `actor` may move onto `cell`.  The actor itself and the cargo
    /// it carries never block it.
    pub fn can_enter_cell(&self, actor: ActorId, cell: CPos, check: BlockedByActor) -> bool {
        if self.movement_speed_for_cell(actor, cell) <= 0 {
            return false;
        }
        let cargo = self
            .actor(actor)
            .and_then(|a| a.transporter.as_ref())
            .and_then(|t| t.cargo());
        self.spatial.occupants(cell).iter().all(|&other| {
            if other == actor || Some(other) == cargo {
                return true;
            }
            match check {
                BlockedByActor::None => true,
                BlockedByActor::Immovable => {
                    self.actor(other).is_some_and(|a| matches!(a.body, Body::Mobile(_)))
                }
                BlockedByActor::All => false,
            }
        })
    }

    /// Ask idle mobile actors standing on `cell` to get out of the way.
    /// Each one is sent to a random free neighbouring cell, if any.
    pub fn notify_blocker(&mut self, from: ActorId, cell: CPos) {
        let blockers: Vec<ActorId> = self
            .spatial
            .occupants(cell)
            .iter()
            .copied()
            .filter(|&a| a != from)
            .filter(|&a| self.actor(a).is_some_and(|a| a.mobile().is_some() && a.is_idle()))
            .collect();

        for blocker in blockers {
            let candidates: Vec<CPos> = cell
                .expand_footprint(false)
                .into_iter()
                .filter(|&c| self.can_enter_cell(blocker, c, BlockedByActor::All))
                .collect();
            match self.shared_random.choose(&candidates) {
                Some(to) => {
                    log::debug!("{from} nudges {blocker} from {cell} to {to}");
                    if let Err(e) = self.queue_activity(blocker, MoveTo::new(to)) {
                        log::warn!("could not nudge {blocker}: {e}");
                    }
                }
                None => log::debug!("{blocker} blocks {cell} with nowhere to go"),
            }
        }
    }
}
