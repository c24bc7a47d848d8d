//! Cooperative, resumable activities with explicit child delegation.
//!
//! # Model
//!
//! An [`Activity`] is a state machine advanced once per tick.  Each tick it
//! returns [`ActivityStatus::Running`] to be resumed next tick, or
//! [`ActivityStatus::Done`] with an [`ActivityOutcome`].  An activity can
//! delegate work by queueing children through
//! [`ActivityContext::queue_child`]; while any child is pending the parent's
//! own `tick` is not called.
//!
//! [`ActivityRunner`] owns one activity plus its pending children and
//! implements the scheduling rules:
//!
//! ```text
//! tick_outer:
//!   first tick     → on_first_run
//!   children first → tick front child; parent ticks only once all are done
//!   finishing      → a parent that returned Done while queueing children
//!                    waits for them, without ticking itself again
//!   new child      → a child queued during this tick also ticks this tick
//! ```
//!
//! Cancellation is a flag.  [`ActivityRunner::cancel`] marks the runner and
//! its front child as canceling (non-interruptible activities ignore it);
//! activities decide for themselves at which checkpoints to honour it.

use std::collections::VecDeque;
use std::fmt;

use dk_core::{ActorId, Tick};

use crate::{World, WorldError, WorldResult};

// ── Status and outcome ────────────────────────────────────────────────────────

/// Why an activity stopped without doing its job.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum AbortReason {
    /// Cancellation was requested and honoured at a checkpoint.
    Canceled,
    /// No adjacent cell could be used to stage the unload.
    NoStagingCell,
    /// The chosen staging cell was lost between phases.
    StagingCellLost,
    /// The cargo can no longer be unloaded at the target.
    UnloadBlocked,
    /// Movement made no progress for too long.
    Blocked,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AbortReason::Canceled        => "canceled",
            AbortReason::NoStagingCell   => "no staging cell",
            AbortReason::StagingCellLost => "staging cell lost",
            AbortReason::UnloadBlocked   => "unload blocked",
            AbortReason::Blocked         => "blocked",
        };
        f.write_str(s)
    }
}

/// How a finished activity ended.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ActivityOutcome {
    Completed,
    Aborted(AbortReason),
}

impl ActivityOutcome {
    pub fn is_completed(self) -> bool {
        matches!(self, ActivityOutcome::Completed)
    }
}

/// Result of one `Activity::tick`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ActivityStatus {
    Running,
    Done(ActivityOutcome),
}

/// Emitted by the world whenever a top-level activity finishes.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ActivityEvent {
    pub actor:    ActorId,
    pub tick:     Tick,
    pub activity: &'static str,
    pub outcome:  ActivityOutcome,
}

// ── Activity trait ────────────────────────────────────────────────────────────

/// A resumable unit of actor behaviour.
pub trait Activity: fmt::Debug {
    /// Short name for logs and events.
    fn name(&self) -> &'static str;

    /// Called once, on the first tick, before anything else.
    fn on_first_run(&mut self, _ctx: &mut ActivityContext<'_>) -> WorldResult<()> {
        Ok(())
    }

    /// Advance by one tick.  Only called when no child is pending.
    fn tick(&mut self, ctx: &mut ActivityContext<'_>) -> WorldResult<ActivityStatus>;

    /// Non-interruptible activities ignore cancellation entirely.
    fn interruptible(&self) -> bool {
        true
    }
}

/// What an activity sees while it runs.
pub struct ActivityContext<'a> {
    /// The actor running the activity.
    pub actor: ActorId,
    pub world: &'a mut World,
    canceling: bool,
    children:  &'a mut VecDeque<ActivityRunner>,
}

impl ActivityContext<'_> {
    /// `true` once cancellation has been requested.
    #[inline]
    pub fn is_canceling(&self) -> bool {
        self.canceling
    }

    /// Delegate to `child`.  The caller's own `tick` is suspended until the
    /// child (and any children queued after it) have finished.
    pub fn queue_child(&mut self, child: impl Activity + 'static) {
        self.children.push_back(ActivityRunner::new(Box::new(child)));
    }
}

// ── ActivityRunner ────────────────────────────────────────────────────────────

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum RunState {
    Queued,
    Active,
    Canceling,
    Done,
}

/// Drives one activity and its pending children.
#[derive(Debug)]
pub struct ActivityRunner {
    activity:  Box<dyn Activity>,
    state:     RunState,
    children:  VecDeque<ActivityRunner>,
    finishing: bool,
    outcome:   Option<ActivityOutcome>,
}

impl ActivityRunner {
    pub fn new(activity: Box<dyn Activity>) -> Self {
        Self {
            activity,
            state:     RunState::Queued,
            children:  VecDeque::new(),
            finishing: false,
            outcome:   None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.activity.name()
    }

    pub fn is_done(&self) -> bool {
        self.state == RunState::Done
    }

    pub fn is_canceling(&self) -> bool {
        self.state == RunState::Canceling
    }

    /// Outcome once done.  Runners canceled before their first tick finish as
    /// `Aborted(Canceled)`.
    pub fn outcome(&self) -> Option<ActivityOutcome> {
        self.outcome
    }

    /// Name of the innermost activity currently being run, for diagnostics.
    pub fn current_leaf(&self) -> &'static str {
        self.children
            .iter()
            .find(|c| !c.is_done())
            .map(ActivityRunner::current_leaf)
            .unwrap_or_else(|| self.name())
    }

    /// Request cancellation.  Pending children beyond the front one are
    /// dropped.  Returns `false` if the activity is not interruptible.
    pub fn cancel(&mut self) -> bool {
        if !self.activity.interruptible() {
            return false;
        }
        if let Some(front) = self.children.front_mut() {
            front.cancel();
        }
        self.children.truncate(1);
        self.state = match self.state {
            RunState::Queued => {
                self.outcome = Some(ActivityOutcome::Aborted(AbortReason::Canceled));
                RunState::Done
            }
            RunState::Done => RunState::Done,
            _ => RunState::Canceling,
        };
        true
    }

    /// Advance this runner by one tick.  Returns `true` once it is done.
    pub fn tick_outer(&mut self, actor: ActorId, world: &mut World) -> WorldResult<bool> {
        if self.state == RunState::Done {
            return Err(WorldError::InvalidActivityState {
                actor,
                activity: self.name(),
                state:    "ticked after completion".into(),
            });
        }

        if self.state == RunState::Queued {
            let mut ctx = ActivityContext {
                actor,
                world: &mut *world,
                canceling: false,
                children: &mut self.children,
            };
            self.activity.on_first_run(&mut ctx)?;
            self.state = RunState::Active;
        }

        let mut last_run = self.tick_children(actor, world)?;
        if last_run && !self.finishing {
            last_run = self.tick_self(actor, world)?;
        }
        self.finishing |= last_run;

        // A child queued during this tick runs immediately.
        if self.children.front().is_some_and(|c| c.state == RunState::Queued) {
            last_run = self.tick_children(actor, world)? && self.finishing;
        }

        if last_run {
            self.state = RunState::Done;
            self.outcome.get_or_insert(ActivityOutcome::Completed);
        }
        Ok(last_run)
    }

    fn tick_self(&mut self, actor: ActorId, world: &mut World) -> WorldResult<bool> {
        let canceling = self.state == RunState::Canceling;
        let mut ctx = ActivityContext {
            actor,
            world,
            canceling,
            children: &mut self.children,
        };
        match self.activity.tick(&mut ctx)? {
            ActivityStatus::Running => Ok(false),
            ActivityStatus::Done(outcome) => {
                self.outcome = Some(outcome);
                Ok(true)
            }
        }
    }

    /// Run pending children in order until one is still running.  Returns
    /// `true` when no children remain.
    fn tick_children(&mut self, actor: ActorId, world: &mut World) -> WorldResult<bool> {
        run_queue(&mut self.children, &mut Vec::new(), actor, world)?;
        Ok(self.children.is_empty())
    }
}

/// Tick the front of `queue`, moving on to the next entry in the same tick
/// whenever the front finishes.  Finished runners are pushed onto `finished`
/// in order, including those that finished before an error stopped the run;
/// the failing runner stays at the front of `queue`.
pub(crate) fn run_queue(
    queue: &mut VecDeque<ActivityRunner>,
    finished: &mut Vec<ActivityRunner>,
    actor: ActorId,
    world: &mut World,
) -> WorldResult<()> {
    while let Some(front) = queue.front_mut() {
        // Canceled before ever running.
        let done = front.is_done() || front.tick_outer(actor, world)?;
        if !done {
            break;
        }
        if let Some(runner) = queue.pop_front() {
            finished.push(runner);
        }
    }
    Ok(())
}
