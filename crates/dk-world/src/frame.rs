//! Deferred world mutations applied at the end of a tick.
//!
//! Adding or removing an actor from the live set while other actors are
//! still ticking would change what their queries see mid-tick.  Such changes
//! are recorded as [`FrameEndTask`]s and applied once every actor has run,
//! in the order they were recorded.

use dk_core::ActorId;

use crate::{World, WorldResult};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum FrameEndTask {
    AddToWorld(ActorId),
    RemoveFromWorld(ActorId),
}

impl World {
    pub fn add_frame_end_task(&mut self, task: FrameEndTask) {
        log::trace!("frame end task recorded: {task:?}");
        self.frame_end.push(task);
    }

    /// Tasks recorded so far this tick.
    pub fn pending_frame_end_tasks(&self) -> &[FrameEndTask] {
        &self.frame_end
    }

    pub(crate) fn apply_frame_end_tasks(&mut self) -> WorldResult<()> {
        let tasks = std::mem::take(&mut self.frame_end);
        for task in tasks {
            let (FrameEndTask::AddToWorld(actor) | FrameEndTask::RemoveFromWorld(actor)) = task;
            if self.actor(actor).is_none() {
                log::debug!("dropping {task:?}: {actor} was destroyed");
                continue;
            }
            match task {
                FrameEndTask::AddToWorld(actor) => self.add_to_world(actor)?,
                FrameEndTask::RemoveFromWorld(actor) => self.remove_from_world(actor)?,
            }
        }
        Ok(())
    }
}
