//! `CrateUnload` — deliver a carried crate onto a target cell.
//!
//! # Phases
//!
//! ```text
//! (first run)     queue MoveTo(target)
//! MovingToUnload  pick a random enterable neighbour as staging cell,
//!                 nudge whoever stands there, queue MoveTo(staging)  → Drag
//! Drag            checkpoint: staging cell set, not canceling, target
//!                 still usable.  Reserve the target, queue a Drag into
//!                 the dock point (skipped if it would take 0 ticks)   → Dock
//! Dock            checkpoint: not canceling, staging cell set         → Loop
//!                 otherwise cancel the reservation                    → Undock
//! Loop            poll the transporter each tick; once the crate is
//!                 released, place it on the target and finish it     → Undock
//! Undock                                                              → Complete
//! Complete        queue the settle Drag back to the cell center, finish
//! ```
//!
//! Cancellation is only looked at in `Drag` and `Dock`.  Once `Loop` is
//! reached the crate is delivered no matter what.
//!
//! Failed checks end the activity with [`ActivityOutcome::Aborted`]; the
//! crate stays attached to the carrier in every abort path.

use std::fmt;

use dk_core::{ActorId, CPos};
use dk_world::{
    AbortReason, Activity, ActivityContext, ActivityOutcome, ActivityStatus, BlockedByActor, Drag,
    MoveTo, WorldError, WorldResult,
};

use crate::geometry::{dock_position, dock_speed, ticks_to_dock};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DockingState {
    MovingToUnload,
    Drag,
    Dock,
    Loop,
    Undock,
    Complete,
}

impl fmt::Display for DockingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug)]
pub struct CrateUnload {
    target:    CPos,
    state:     DockingState,
    staging:   Option<CPos>,
    delivered: Option<ActorId>,
    /// Set when the Dock checkpoint sent the activity down the undock path.
    canceled:  bool,
    finished:  bool,
}

impl CrateUnload {
    pub fn new(target: CPos) -> Self {
        Self {
            target,
            state:     DockingState::MovingToUnload,
            staging:   None,
            delivered: None,
            canceled:  false,
            finished:  false,
        }
    }

    pub fn target(&self) -> CPos {
        self.target
    }

    pub fn state(&self) -> DockingState {
        self.state
    }

    pub fn staging_cell(&self) -> Option<CPos> {
        self.staging
    }

    /// The crate placed on the target, once released.
    pub fn delivered(&self) -> Option<ActorId> {
        self.delivered
    }

    fn transition(&mut self, actor: ActorId, next: DockingState) {
        log::debug!("{actor} unload to {}: {} -> {next}", self.target, self.state);
        self.state = next;
    }

    fn abort(&self, actor: ActorId, reason: AbortReason) -> WorldResult<ActivityStatus> {
        log::warn!("{actor} unload to {} aborted in {}: {reason}", self.target, self.state);
        Ok(ActivityStatus::Done(ActivityOutcome::Aborted(reason)))
    }

    /// A random enterable neighbour of the carrier's cell.
    fn pick_staging_cell(ctx: &mut ActivityContext<'_>) -> WorldResult<Option<CPos>> {
        let here = ctx.world.location(ctx.actor).ok_or(WorldError::NotMobile(ctx.actor))?;
        let candidates: Vec<CPos> = here
            .expand_footprint(false)
            .into_iter()
            .filter(|&c| ctx.world.can_enter_cell(ctx.actor, c, BlockedByActor::All))
            .collect();
        Ok(ctx.world.shared_random().choose(&candidates))
    }

    fn start_drag(&mut self, ctx: &mut ActivityContext<'_>, staging: CPos) -> WorldResult<()> {
        let actor = ctx.actor;
        let dock = ctx.world.config.dock.clone();
        let from = ctx.world.center_position(actor).ok_or(WorldError::UnknownActor(actor))?;
        let to = dock_position(&dock, staging, self.target);
        let speed = dock_speed(&dock, ctx.world.movement_speed_for_cell(actor, staging));

        match ticks_to_dock(from, to, speed) {
            Some(0) => log::debug!("{actor} already at dock point {to}"),
            Some(ticks) => ctx.queue_child(Drag::new(from, to, ticks)),
            None => log::warn!("{actor} has no dock speed on {staging}; skipping drag"),
        }
        Ok(())
    }
}

impl Activity for CrateUnload {
    fn name(&self) -> &'static str {
        "CrateUnload"
    }

    fn on_first_run(&mut self, ctx: &mut ActivityContext<'_>) -> WorldResult<()> {
        ctx.queue_child(MoveTo::new(self.target));
        self.state = DockingState::MovingToUnload;
        Ok(())
    }

    fn tick(&mut self, ctx: &mut ActivityContext<'_>) -> WorldResult<ActivityStatus> {
        let actor = ctx.actor;
        if self.finished {
            return Err(WorldError::InvalidActivityState {
                actor,
                activity: "CrateUnload",
                state:    format!("{} after completion", self.state),
            });
        }

        match self.state {
            DockingState::MovingToUnload => {
                let Some(staging) = Self::pick_staging_cell(ctx)? else {
                    return self.abort(actor, AbortReason::NoStagingCell);
                };
                self.staging = Some(staging);
                ctx.world.notify_blocker(actor, staging);
                ctx.queue_child(MoveTo::new(staging));
                self.transition(actor, DockingState::Drag);
            }
            DockingState::Drag => {
                let Some(staging) = self.staging else {
                    return self.abort(actor, AbortReason::StagingCellLost);
                };
                if ctx.is_canceling() {
                    return self.abort(actor, AbortReason::Canceled);
                }
                if !ctx.world.can_unload_at(actor, self.target) {
                    return self.abort(actor, AbortReason::UnloadBlocked);
                }
                ctx.world.reserve_unload_location(actor, self.target)?;
                self.start_drag(ctx, staging)?;
                self.transition(actor, DockingState::Dock);
            }
            DockingState::Dock => {
                if !ctx.is_canceling() && self.staging.is_some() {
                    self.transition(actor, DockingState::Loop);
                } else {
                    ctx.world.cancel_unload(actor)?;
                    self.canceled = true;
                    self.transition(actor, DockingState::Undock);
                }
            }
            DockingState::Loop => {
                let carrying = ctx
                    .world
                    .actor(actor)
                    .and_then(|a| a.transporter.as_ref())
                    .is_some_and(|t| t.cargo().is_some());
                if !carrying {
                    return self.abort(actor, AbortReason::UnloadBlocked);
                }
                let Some(cargo) = ctx.world.unload_crate(actor)? else {
                    return Ok(ActivityStatus::Running);
                };
                ctx.world.relocate(cargo, self.target, None)?;
                ctx.world.complete_unloading(cargo)?;
                self.delivered = Some(cargo);
                log::info!("{actor} delivered {cargo} to {}", self.target);
                self.transition(actor, DockingState::Undock);
            }
            DockingState::Undock => {
                self.transition(actor, DockingState::Complete);
            }
            DockingState::Complete => {
                let from = ctx.world.center_position(actor).ok_or(WorldError::UnknownActor(actor))?;
                let home = ctx.world.location(actor).ok_or(WorldError::NotMobile(actor))?;
                let ticks = ctx.world.config.dock.settle_drag_ticks;
                ctx.queue_child(Drag::new(from, home.center(), ticks));
                self.finished = true;

                let outcome = if self.canceled {
                    ActivityOutcome::Aborted(AbortReason::Canceled)
                } else {
                    ActivityOutcome::Completed
                };
                return Ok(ActivityStatus::Done(outcome));
            }
        }
        Ok(ActivityStatus::Running)
    }
}
