//! The `World`: actor table, spatial state, and the tick driver.

use std::collections::VecDeque;
use std::mem;

use dk_core::{ActorId, CPos, SharedRandom, Tick, WAngle, WRot, WorldConfig};
use dk_spatial::{Locomotor, SpatialIndex, TerrainMap};

use crate::activity::run_queue;
use crate::{
    Activity, ActivityEvent, ActivityOutcome, ActivityRunner, Actor, Body, CrateTransporter,
    FrameEndTask, Mobile, Mount, SubActor, WorldError, WorldResult,
};

/// All simulation state for one map.
///
/// Every mutation goes through `&mut World`, so a footprint change
/// (deregister, mutate, re-register) is a single call that no other actor's
/// logic can interleave with.
///
/// # Tick order
///
/// 1. Activities of every in-world actor, ascending `ActorId`.
/// 2. Attached sub-actors copy their parent's transform.
/// 3. Frame-end tasks, in recording order.
/// 4. The tick counter advances.
#[derive(Debug)]
pub struct World {
    pub config: WorldConfig,

    pub(crate) map:           TerrainMap,
    pub(crate) spatial:       SpatialIndex,
    pub(crate) shared_random: SharedRandom,
    pub(crate) tick:          Tick,

    /// Indexed by `ActorId`.  Slots of destroyed actors stay `None` so ids
    /// are never reused.
    pub(crate) actors:    Vec<Option<Actor>>,
    pub(crate) frame_end: Vec<FrameEndTask>,
    events:               Vec<ActivityEvent>,
}

impl World {
    /// An open map of the configured size.
    pub fn new(config: WorldConfig) -> WorldResult<Self> {
        let map = TerrainMap::open(config.width, config.height);
        Self::with_map(config, map)
    }

    pub fn with_map(config: WorldConfig, map: TerrainMap) -> WorldResult<Self> {
        config.validate()?;
        let shared_random = SharedRandom::new(config.seed);
        Ok(Self {
            config,
            map,
            spatial: SpatialIndex::new(),
            shared_random,
            tick: Tick::ZERO,
            actors: Vec::new(),
            frame_end: Vec::new(),
            events: Vec::new(),
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn map(&self) -> &TerrainMap {
        &self.map
    }

    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }

    /// The world-wide random source.  Anything that affects simulation
    /// state must draw from here.
    pub fn shared_random(&mut self) -> &mut SharedRandom {
        &mut self.shared_random
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.actors.get(id.index())?.as_ref()
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.actors.get_mut(id.index())?.as_mut()
    }

    /// Live actors in id order.
    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.iter().flatten()
    }

    pub fn is_in_world(&self, id: ActorId) -> bool {
        self.actor(id).is_some_and(|a| a.in_world)
    }

    // ── Spawning ──────────────────────────────────────────────────────────

    fn push_actor(&mut self, name: &str, body: Body) -> WorldResult<ActorId> {
        let id = ActorId::try_from(self.actors.len()).map_err(|_| WorldError::TooManyActors)?;
        self.actors.push(Some(Actor::new(id, name, body)));
        Ok(id)
    }

    /// Spawn a mobile actor on `cell`.  It enters the world immediately.
    pub fn spawn_mobile(
        &mut self,
        name: &str,
        cell: CPos,
        facing: WAngle,
        locomotor: Locomotor,
    ) -> WorldResult<ActorId> {
        let body = Body::Mobile(Mobile::new(cell, WRot::from_yaw(facing), locomotor));
        let id = self.push_actor(name, body)?;
        self.add_to_world(id)?;
        log::debug!("spawned mobile {name} as {id} at {cell}");
        Ok(id)
    }

    /// Spawn a mobile actor with an empty crate transporter.
    pub fn spawn_carrier(
        &mut self,
        name: &str,
        cell: CPos,
        facing: WAngle,
        locomotor: Locomotor,
    ) -> WorldResult<ActorId> {
        let id = self.spawn_mobile(name, cell, facing, locomotor)?;
        let delay = self.config.dock.unload_delay_ticks;
        if let Some(actor) = self.actor_mut(id) {
            actor.transporter = Some(CrateTransporter::new(delay));
        }
        Ok(id)
    }

    /// Spawn an attachable actor.
    ///
    /// Without a parent it enters the world on `cell` and registers its own
    /// footprint.  With one it is attached straight away and stays out of
    /// the world, carried by the parent's transporter if it has one.
    pub fn spawn_sub_actor(
        &mut self,
        name: &str,
        cell: CPos,
        facing: WAngle,
        parent: Option<ActorId>,
    ) -> WorldResult<ActorId> {
        if let Some(p) = parent {
            self.actor(p).ok_or(WorldError::UnknownActor(p))?;
        }
        let id = self.push_actor(name, Body::Sub(SubActor::at(cell, facing)))?;
        match parent {
            Some(p) if self.actor(p).is_some_and(|a| a.transporter.is_some()) => {
                self.load_crate(p, id)?;
            }
            Some(p) => self.set_parent(id, Some(p))?,
            None => self.add_to_world(id)?,
        }
        log::debug!("spawned sub-actor {name} as {id}");
        Ok(id)
    }

    /// Remove an actor for good.
    ///
    /// Sub-actors attached to it are detached where they currently appear
    /// (a crate mid-unload stays on its target cell) and brought into the
    /// world at the next frame boundary.  The actor's activities are
    /// discarded.
    pub fn destroy_actor(&mut self, id: ActorId) -> WorldResult<()> {
        self.actor(id).ok_or(WorldError::UnknownActor(id))?;

        let children: Vec<ActorId> = self
            .actors()
            .filter(|a| a.sub_actor().is_some_and(|s| s.mount == Mount::Attached { parent: id }))
            .map(|a| a.id)
            .collect();
        for child in children {
            self.detach_in_place(child)?;
            self.add_frame_end_task(FrameEndTask::AddToWorld(child));
        }

        // A crate destroyed while carried no longer counts as cargo.
        for actor in self.actors.iter_mut().flatten() {
            if let Some(t) = actor.transporter.as_mut() {
                t.forget(id);
            }
        }

        self.spatial.remove_from_maps(id);
        if let Some(slot) = self.actors.get_mut(id.index()) {
            *slot = None;
        }
        log::info!("{id} destroyed");
        Ok(())
    }

    // ── Live set and index ────────────────────────────────────────────────

    /// Put an actor in the live set and register it.  Adding an actor that
    /// is already in the world only refreshes its registration.
    pub fn add_to_world(&mut self, id: ActorId) -> WorldResult<()> {
        let actor = self.actor_mut(id).ok_or(WorldError::UnknownActor(id))?;
        actor.in_world = true;
        let center = self.center_position(id).ok_or(WorldError::UnknownActor(id))?;
        let footprint = self.influence_footprint(id);
        self.spatial.add_to_maps(id, center, &footprint);
        Ok(())
    }

    pub fn remove_from_world(&mut self, id: ActorId) -> WorldResult<()> {
        let actor = self.actor_mut(id).ok_or(WorldError::UnknownActor(id))?;
        actor.in_world = false;
        self.spatial.remove_from_maps(id);
        Ok(())
    }

    /// Register the actor's footprint.  Only in-world actors register,
    /// except a crate claiming its unload target, which must be visible to
    /// other carriers before it joins the live set at the frame boundary.
    pub(crate) fn add_influence(&mut self, id: ActorId) {
        let claiming = self
            .actor(id)
            .and_then(Actor::sub_actor)
            .is_some_and(|s| s.unloading);
        if self.is_in_world(id) || claiming {
            let footprint = self.influence_footprint(id);
            self.spatial.add_influence(id, &footprint);
        }
    }

    pub(crate) fn remove_influence(&mut self, id: ActorId) {
        self.spatial.remove_influence(id);
    }

    pub(crate) fn update_maps(&mut self, id: ActorId) {
        let Some(center) = self.center_position(id) else {
            return;
        };
        let footprint = self.influence_footprint(id);
        self.spatial.update_maps(id, center, &footprint);
    }

    // ── Activities ────────────────────────────────────────────────────────

    /// Append `activity` to the actor's queue.
    pub fn queue_activity(
        &mut self,
        id: ActorId,
        activity: impl Activity + 'static,
    ) -> WorldResult<()> {
        let actor = self.actor_mut(id).ok_or(WorldError::UnknownActor(id))?;
        actor.activities.push_back(ActivityRunner::new(Box::new(activity)));
        Ok(())
    }

    /// Request cancellation of everything the actor is doing.  Activities
    /// decide for themselves when to honour it.
    pub fn cancel_activity(&mut self, id: ActorId) -> WorldResult<()> {
        let actor = self.actor_mut(id).ok_or(WorldError::UnknownActor(id))?;
        for runner in actor.activities.iter_mut() {
            runner.cancel();
        }
        Ok(())
    }

    pub fn is_idle(&self, id: ActorId) -> bool {
        self.actor(id).is_none_or(Actor::is_idle)
    }

    /// Take the activity events recorded since the last call.
    pub fn drain_events(&mut self) -> Vec<ActivityEvent> {
        mem::take(&mut self.events)
    }

    // ── Tick ──────────────────────────────────────────────────────────────

    /// Advance the world by one tick.
    ///
    /// An activity that reports an invalid internal state is dropped and the
    /// error returned once the rest of the tick has run.
    pub fn tick(&mut self) -> WorldResult<()> {
        let ticking: Vec<ActorId> = self.actors().filter(|a| a.in_world).map(|a| a.id).collect();

        let mut failure = None;
        for id in ticking {
            if let Err(e) = self.tick_activities(id) {
                log::error!("{}: {e}", self.tick);
                failure.get_or_insert(e);
            }
        }

        let followers: Vec<ActorId> = self
            .actors()
            .filter(|a| a.sub_actor().is_some_and(|s| matches!(s.mount, Mount::Attached { .. })))
            .map(|a| a.id)
            .collect();
        for id in followers {
            self.tick_sub_actor(id);
        }

        self.apply_frame_end_tasks()?;
        self.tick = self.tick.next();

        failure.map_or(Ok(()), Err)
    }

    fn tick_activities(&mut self, id: ActorId) -> WorldResult<()> {
        let Some(actor) = self.actor_mut(id) else {
            return Ok(());
        };
        let mut queue = mem::take(&mut actor.activities);
        if queue.is_empty() {
            return Ok(());
        }

        let mut finished = Vec::new();
        let result = run_queue(&mut queue, &mut finished, id, self);
        if let Err(e) = &result {
            if let Some(bad) = queue.pop_front() {
                log::error!("{id} dropping {}: {e}", bad.name());
            }
        }

        for runner in &finished {
            self.record_finished(id, runner);
        }
        self.restore_queue(id, queue);
        result
    }

    fn record_finished(&mut self, id: ActorId, runner: &ActivityRunner) {
        let outcome = runner.outcome().unwrap_or(ActivityOutcome::Completed);
        log::debug!("{id} finished {} ({outcome:?}) at {}", runner.name(), self.tick);
        self.events.push(ActivityEvent {
            actor:    id,
            tick:     self.tick,
            activity: runner.name(),
            outcome,
        });
    }

    /// Put a taken queue back, ahead of anything queued while it ran.
    fn restore_queue(&mut self, id: ActorId, mut queue: VecDeque<ActivityRunner>) {
        if let Some(actor) = self.actor_mut(id) {
            queue.append(&mut actor.activities);
            actor.activities = queue;
        }
    }
}
