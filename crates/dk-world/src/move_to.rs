//! Cell-by-cell movement toward a destination.
//!
//! `MoveTo` is a greedy stepper, not a pathfinder: each step it picks the
//! enterable neighbouring cell that brings the actor strictly closer to the
//! destination (squared center distance, first in row-major order on ties).
//! The actor claims the new cell at the start of a step and slides its
//! center there over `ceil(step_length / speed)` ticks, with `speed` taken
//! from the locomotor on the cell being entered.
//!
//! When no neighbour is both enterable and closer, the move waits.  It gives
//! up with [`AbortReason::Blocked`] once it is next to the destination, or
//! after [`MAX_BLOCKED_TICKS`] ticks elsewhere.  Cancellation is honoured
//! between steps.

use dk_core::{CPos, WPos};

use crate::{
    AbortReason, Activity, ActivityContext, ActivityOutcome, ActivityStatus, BlockedByActor,
    WorldResult,
};

pub const MAX_BLOCKED_TICKS: u32 = 30;

#[derive(Debug)]
struct Step {
    from:  WPos,
    to:    WPos,
    total: u32,
    done:  u32,
}

#[derive(Debug)]
pub struct MoveTo {
    destination:   CPos,
    step:          Option<Step>,
    blocked_ticks: u32,
}

impl MoveTo {
    pub fn new(destination: CPos) -> Self {
        Self { destination, step: None, blocked_ticks: 0 }
    }

    pub fn destination(&self) -> CPos {
        self.destination
    }

    fn next_cell(&self, ctx: &ActivityContext<'_>, here: CPos) -> Option<CPos> {
        let dist = |c: CPos| (self.destination.center() - c.center()).length_squared();
        let current = dist(here);
        here.expand_footprint(false)
            .into_iter()
            .filter(|&c| dist(c) < current)
            .filter(|&c| ctx.world.can_enter_cell(ctx.actor, c, BlockedByActor::All))
            .min_by_key(|&c| dist(c))
    }

    /// Advance the current step by one tick.  Returns `true` once the center
    /// has reached the step's end.
    fn advance(&mut self, ctx: &mut ActivityContext<'_>) -> WorldResult<bool> {
        let Some(step) = self.step.as_mut() else {
            return Ok(true);
        };
        step.done += 1;
        let pos = WPos::lerp(step.from, step.to, step.done as i64, step.total as i64);
        ctx.world.set_center_position(ctx.actor, pos)?;
        if step.done >= step.total {
            self.step = None;
            return Ok(true);
        }
        Ok(false)
    }
}

impl Activity for MoveTo {
    fn name(&self) -> &'static str {
        "MoveTo"
    }

    fn tick(&mut self, ctx: &mut ActivityContext<'_>) -> WorldResult<ActivityStatus> {
        if self.step.is_some() {
            if !self.advance(ctx)? {
                return Ok(ActivityStatus::Running);
            }
            if ctx.world.location(ctx.actor) == Some(self.destination) {
                return Ok(ActivityStatus::Done(ActivityOutcome::Completed));
            }
            if ctx.is_canceling() {
                return Ok(ActivityStatus::Done(ActivityOutcome::Aborted(AbortReason::Canceled)));
            }
            return Ok(ActivityStatus::Running);
        }

        let Some(here) = ctx.world.location(ctx.actor) else {
            return Ok(ActivityStatus::Done(ActivityOutcome::Aborted(AbortReason::Blocked)));
        };
        if here == self.destination {
            return Ok(ActivityStatus::Done(ActivityOutcome::Completed));
        }
        if ctx.is_canceling() {
            return Ok(ActivityStatus::Done(ActivityOutcome::Aborted(AbortReason::Canceled)));
        }

        let Some(next) = self.next_cell(ctx, here) else {
            self.blocked_ticks += 1;
            let adjacent = (self.destination - here).chebyshev() <= 1;
            if adjacent || self.blocked_ticks >= MAX_BLOCKED_TICKS {
                log::debug!(
                    "{} gives up moving to {} from {here} after {} blocked ticks",
                    ctx.actor,
                    self.destination,
                    self.blocked_ticks
                );
                return Ok(ActivityStatus::Done(ActivityOutcome::Aborted(AbortReason::Blocked)));
            }
            return Ok(ActivityStatus::Running);
        };
        self.blocked_ticks = 0;

        let from = ctx
            .world
            .center_position(ctx.actor)
            .unwrap_or_else(|| here.center());
        let to = next.center();
        let speed = ctx.world.movement_speed_for_cell(ctx.actor, next).max(1);
        let length = (to - from).horizontal_length().max(0) as u32;
        let total = length.div_ceil(speed as u32).max(1);

        ctx.world.set_facing(ctx.actor, (next - here).facing())?;
        ctx.world.set_location(ctx.actor, next)?;
        self.step = Some(Step { from, to, total, done: 0 });

        if self.advance(ctx)? && ctx.world.location(ctx.actor) == Some(self.destination) {
            return Ok(ActivityStatus::Done(ActivityOutcome::Completed));
        }
        Ok(ActivityStatus::Running)
    }
}
