//! Attached-entity positioning.
//!
//! A [`SubActor`] is either **attached** to a parent actor or **detached**.
//!
//! - Attached: center, orientation and footprint are derived from the parent
//!   on every read (`parent center + parent.sub_actor_offset`).  The
//!   sub-actor registers no influence of its own; the parent's registration
//!   covers the combined occupancy.  Every tick the stored transform is
//!   refreshed from the parent so it can serve as a fallback once detached.
//! - Detached: the stored cell, center and orientation are authoritative and
//!   the sub-actor registers its own single-cell footprint.
//!
//! The `unloading` flag may be set in either mode.  While set, the reported
//! footprint is always the unload target cell, which lets the index and
//! collision queries see the claim before the entity is fully placed.
//!
//! The parent link is a handle, never an owning reference.  A handle to an
//! actor that no longer exists reads exactly like `Detached`.
//!
//! Every footprint change is a single `&mut World` call that removes the old
//! registration, mutates, and re-registers, so no other actor's logic can run
//! in between.

use dk_core::{ActorId, CPos, WAngle, WPos, WRot};

use crate::{Body, FrameEndTask, World, WorldError, WorldResult};

/// How a sub-actor's position is computed.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum Mount {
    #[default]
    Detached,
    Attached {
        parent: ActorId,
    },
}

/// Dual-mode position state of an attachable actor.
#[derive(Clone, Debug, Default)]
pub struct SubActor {
    pub(crate) mount:       Mount,
    pub(crate) location:    CPos,
    pub(crate) center:      WPos,
    pub(crate) orientation: WRot,
    pub(crate) unloading:   bool,
}

impl SubActor {
    /// A detached sub-actor standing on `location`.
    pub fn at(location: CPos, facing: WAngle) -> Self {
        Self {
            mount:       Mount::Detached,
            location,
            center:      location.center(),
            orientation: WRot::from_yaw(facing),
            unloading:   false,
        }
    }

    pub fn mount(&self) -> Mount {
        self.mount
    }

    pub fn is_unloading(&self) -> bool {
        self.unloading
    }

    /// The stored cell.  Authoritative only while detached or unloading.
    pub fn own_location(&self) -> CPos {
        self.location
    }

    /// The stored center.  Authoritative only while detached.
    pub fn own_center(&self) -> WPos {
        self.center
    }
}

impl World {
    // ── Parent link ───────────────────────────────────────────────────────

    /// The live parent of `actor`, if it is an attached sub-actor whose
    /// parent still exists.
    pub fn parent_of(&self, actor: ActorId) -> Option<ActorId> {
        match self.actor(actor)?.sub_actor()?.mount {
            Mount::Attached { parent } if self.actor(parent).is_some() => Some(parent),
            _ => None,
        }
    }

    /// Bind `actor` to `parent`, or detach it with `None`.
    ///
    /// Binding snapshots the parent's center as the fallback position used
    /// once detached again.  Rebinding to the current parent is a no-op.
    /// An actor can never become its own ancestor.
    pub fn set_parent(&mut self, actor: ActorId, parent: Option<ActorId>) -> WorldResult<()> {
        let current = self.sub_actor(actor)?.mount;
        let wanted = match parent {
            Some(p) => Mount::Attached { parent: p },
            None => Mount::Detached,
        };
        if current == wanted {
            return Ok(());
        }
        if let Some(p) = parent {
            let mut ancestor = Some(p);
            while let Some(a) = ancestor {
                if a == actor {
                    return Err(WorldError::ParentCycle { actor, parent: p });
                }
                ancestor = self.parent_of(a);
            }
        }

        let snapshot = match parent {
            Some(p) => Some(self.center_position(p).ok_or(WorldError::UnknownActor(p))?),
            None => None,
        };

        self.remove_influence(actor);
        let sub = self.sub_actor_mut(actor)?;
        if let Some(center) = snapshot {
            sub.center = center;
        }
        sub.mount = wanted;
        self.add_influence(actor);
        log::debug!("{actor} mount {current:?} -> {wanted:?}");
        Ok(())
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// Current center position of any actor.
    pub fn center_position(&self, actor: ActorId) -> Option<WPos> {
        match &self.actor(actor)?.body {
            Body::Mobile(m) => Some(m.center),
            Body::Sub(sub) => {
                if let Some(parent) = self.parent_of(actor) {
                    let offset = self.actor(parent).and_then(|p| p.sub_actor_offset);
                    if let (Some(offset), Some(center)) = (offset, self.center_position(parent)) {
                        return Some(center + offset);
                    }
                }
                Some(sub.center)
            }
        }
    }

    /// Current orientation of any actor.
    pub fn orientation(&self, actor: ActorId) -> Option<WRot> {
        match &self.actor(actor)?.body {
            Body::Mobile(m) => Some(m.orientation),
            Body::Sub(sub) => match self.parent_of(actor) {
                Some(parent) => self.orientation(parent),
                None => Some(sub.orientation),
            },
        }
    }

    /// Current facing (yaw) of any actor.
    pub fn facing(&self, actor: ActorId) -> Option<WAngle> {
        self.orientation(actor).map(|o| o.yaw)
    }

    /// Top-left cell of the reported footprint.
    pub fn top_left(&self, actor: ActorId) -> Option<CPos> {
        match &self.actor(actor)?.body {
            Body::Mobile(m) => Some(m.location),
            Body::Sub(sub) => {
                if sub.unloading {
                    return Some(sub.location);
                }
                match self.parent_of(actor) {
                    Some(parent) => self.top_left(parent),
                    None => Some(sub.center.cell()),
                }
            }
        }
    }

    /// Cells the actor reports as occupied.
    pub fn occupied_cells(&self, actor: ActorId) -> Vec<CPos> {
        let Some(a) = self.actor(actor) else {
            return Vec::new();
        };
        match &a.body {
            Body::Mobile(m) => vec![m.location],
            Body::Sub(sub) => {
                if sub.unloading {
                    return vec![sub.location];
                }
                match self.parent_of(actor) {
                    Some(parent) => self.occupied_cells(parent),
                    None => vec![sub.location],
                }
            }
        }
    }

    /// Footprint the actor registers in the spatial index itself.  Attached
    /// sub-actors that are not unloading register nothing.
    pub(crate) fn influence_footprint(&self, actor: ActorId) -> Vec<CPos> {
        match self.actor(actor).map(|a| &a.body) {
            Some(Body::Sub(sub)) if !sub.unloading && self.parent_of(actor).is_some() => Vec::new(),
            Some(_) => self.occupied_cells(actor),
            None => Vec::new(),
        }
    }

    // ── Writes ────────────────────────────────────────────────────────────

    /// Turn an actor.  Attached sub-actors cannot turn on their own: the
    /// write is forwarded to the parent and the result re-cached.
    pub fn set_facing(&mut self, actor: ActorId, facing: WAngle) -> WorldResult<()> {
        if let Some(parent) = self.parent_of(actor) {
            self.set_facing(parent, facing)?;
            let orientation = self.orientation(parent).ok_or(WorldError::UnknownActor(parent))?;
            self.sub_actor_mut(actor)?.orientation = orientation;
            return Ok(());
        }
        let a = self.actor_mut(actor).ok_or(WorldError::UnknownActor(actor))?;
        match &mut a.body {
            Body::Mobile(m) => m.orientation = m.orientation.with_yaw(facing),
            Body::Sub(sub) => sub.orientation = sub.orientation.with_yaw(facing),
        }
        Ok(())
    }

    /// Authoritatively place a sub-actor on `cell`, at `center` or the cell
    /// center.  Valid whether attached or not.
    pub fn relocate(&mut self, actor: ActorId, cell: CPos, center: Option<WPos>) -> WorldResult<()> {
        self.sub_actor(actor)?;
        self.remove_influence(actor);
        let sub = self.sub_actor_mut(actor)?;
        sub.location = cell;
        sub.center = center.unwrap_or_else(|| cell.center());
        self.add_influence(actor);
        Ok(())
    }

    /// Claim `target` for an in-progress unload and make sure the actor
    /// enters the world by the next frame boundary.  The claim is in the
    /// spatial index as soon as this returns.
    pub fn begin_unloading(&mut self, actor: ActorId, target: CPos) -> WorldResult<()> {
        self.sub_actor(actor)?;
        self.remove_influence(actor);

        let sub = self.sub_actor_mut(actor)?;
        sub.location = target;
        sub.center = target.center();
        sub.unloading = true;

        // Queued unconditionally: a removal recorded earlier this tick must
        // not win.  Adding an actor already in the world is a refresh.
        self.add_frame_end_task(FrameEndTask::AddToWorld(actor));
        self.add_influence(actor);
        log::debug!("{actor} unloading onto {target}");
        Ok(())
    }

    /// Abandon an unload: drop the claim and leave the world at the next
    /// frame boundary.
    pub fn cancel_unloading(&mut self, actor: ActorId) -> WorldResult<()> {
        self.sub_actor(actor)?;
        self.remove_influence(actor);
        self.sub_actor_mut(actor)?.unloading = false;
        self.add_frame_end_task(FrameEndTask::RemoveFromWorld(actor));
        log::debug!("{actor} unload canceled");
        Ok(())
    }

    /// Finish an unload.  The stored footprint becomes authoritative.
    pub fn complete_unloading(&mut self, actor: ActorId) -> WorldResult<()> {
        self.sub_actor_mut(actor)?.unloading = false;
        self.update_maps(actor);
        Ok(())
    }

    /// Follower step: copy the parent's transform while attached.
    pub(crate) fn tick_sub_actor(&mut self, actor: ActorId) {
        let Some(parent) = self.parent_of(actor) else {
            return;
        };
        if self.actor(actor).and_then(|a| a.sub_actor()).is_none_or(|s| s.unloading) {
            return;
        }
        let (Some(orientation), Some(center), Some(location)) = (
            self.orientation(parent),
            self.center_position(parent),
            self.top_left(parent),
        ) else {
            return;
        };
        if let Ok(sub) = self.sub_actor_mut(actor) {
            sub.orientation = orientation;
            sub.center = center;
            sub.location = location;
        }
    }

    /// Detach `actor` from its parent, leaving it where it currently
    /// appears.  Used when the parent goes away.
    ///
    /// A crate that is mid-unload stays on its target cell; anything else is
    /// dropped on the cell under its last computed center.
    pub(crate) fn detach_in_place(&mut self, actor: ActorId) -> WorldResult<()> {
        let unloading = self.sub_actor(actor)?.unloading;
        let center = if unloading {
            self.sub_actor(actor)?.center
        } else {
            self.center_position(actor).ok_or(WorldError::UnknownActor(actor))?
        };
        let orientation = self.orientation(actor).ok_or(WorldError::UnknownActor(actor))?;

        self.remove_influence(actor);
        let sub = self.sub_actor_mut(actor)?;
        sub.mount = Mount::Detached;
        sub.center = center;
        sub.orientation = orientation;
        if !unloading {
            sub.location = center.cell();
        }
        sub.unloading = false;
        self.add_influence(actor);
        log::info!("{actor} dropped at {} after losing its parent", center.cell());
        Ok(())
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    pub fn sub_actor(&self, actor: ActorId) -> WorldResult<&SubActor> {
        self.actor(actor)
            .ok_or(WorldError::UnknownActor(actor))?
            .sub_actor()
            .ok_or(WorldError::NotSubActor(actor))
    }

    pub(crate) fn sub_actor_mut(&mut self, actor: ActorId) -> WorldResult<&mut SubActor> {
        self.actor_mut(actor)
            .ok_or(WorldError::UnknownActor(actor))?
            .sub_actor_mut()
            .ok_or(WorldError::NotSubActor(actor))
    }
}
