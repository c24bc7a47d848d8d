//! Straight-line motion over a fixed number of ticks.

use dk_core::WPos;

use crate::{Activity, ActivityContext, ActivityOutcome, ActivityStatus, WorldResult};

/// Slides a mobile actor's center from `start` to `end`.
///
/// Tick `i` (0-based) places the actor at `lerp(start, end, i, length - 1)`,
/// so the first tick lands on `start`, the last on `end`, and the activity
/// finishes on exactly the `length`-th tick.  The cell is never changed.
/// Drags cannot be canceled.
#[derive(Debug)]
pub struct Drag {
    start:  WPos,
    end:    WPos,
    length: u32,
    ticks:  u32,
}

impl Drag {
    pub fn new(start: WPos, end: WPos, length: u32) -> Self {
        Self { start, end, length, ticks: 0 }
    }

    pub fn length(&self) -> u32 {
        self.length
    }

    pub fn end(&self) -> WPos {
        self.end
    }
}

impl Activity for Drag {
    fn name(&self) -> &'static str {
        "Drag"
    }

    fn interruptible(&self) -> bool {
        false
    }

    fn tick(&mut self, ctx: &mut ActivityContext<'_>) -> WorldResult<ActivityStatus> {
        let pos = if self.length > 1 {
            WPos::lerp(self.start, self.end, self.ticks as i64, self.length as i64 - 1)
        } else {
            self.end
        };
        ctx.world.set_center_position(ctx.actor, pos)?;

        self.ticks += 1;
        if self.ticks >= self.length {
            return Ok(ActivityStatus::Done(ActivityOutcome::Completed));
        }
        Ok(ActivityStatus::Running)
    }
}
