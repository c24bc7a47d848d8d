//! Actors and their bodies.
//!
//! An actor's spatial behaviour is a tagged variant rather than a trait
//! object: [`Body::Mobile`] actors own their transform and move themselves;
//! [`Body::Sub`] actors may be attached to a parent and derive their
//! transform from it (see [`crate::positioning`]).

use std::collections::VecDeque;

use dk_core::{ActorId, CPos, WPos, WRot, WVec};
use dk_spatial::Locomotor;

use crate::{ActivityRunner, CrateTransporter, SubActor};

/// Self-propelled body occupying a single cell.
#[derive(Clone, Debug)]
pub struct Mobile {
    pub location:    CPos,
    pub center:      WPos,
    pub orientation: WRot,
    pub locomotor:   Locomotor,
}

impl Mobile {
    pub fn new(location: CPos, orientation: WRot, locomotor: Locomotor) -> Self {
        Self { location, center: location.center(), orientation, locomotor }
    }
}

#[derive(Clone, Debug)]
pub enum Body {
    Mobile(Mobile),
    Sub(SubActor),
}

/// One entry of the world's actor table.
#[derive(Debug)]
pub struct Actor {
    pub id:   ActorId,
    pub name: String,

    pub body: Body,

    /// Present on actors that can carry and unload a crate.
    pub transporter: Option<CrateTransporter>,

    /// Offset applied to the center of sub-actors attached to this actor.
    /// Actors without one do not project a position onto their children.
    pub sub_actor_offset: Option<WVec>,

    pub(crate) in_world:   bool,
    pub(crate) activities: VecDeque<ActivityRunner>,
}

impl Actor {
    pub(crate) fn new(id: ActorId, name: impl Into<String>, body: Body) -> Self {
        Self {
            id,
            name: name.into(),
            body,
            transporter: None,
            sub_actor_offset: None,
            in_world: false,
            activities: VecDeque::new(),
        }
    }

    pub fn in_world(&self) -> bool {
        self.in_world
    }

    /// `true` when no activity is running or queued.
    pub fn is_idle(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn mobile(&self) -> Option<&Mobile> {
        match &self.body {
            Body::Mobile(m) => Some(m),
            Body::Sub(_) => None,
        }
    }

    pub fn mobile_mut(&mut self) -> Option<&mut Mobile> {
        match &mut self.body {
            Body::Mobile(m) => Some(m),
            Body::Sub(_) => None,
        }
    }

    pub fn sub_actor(&self) -> Option<&SubActor> {
        match &self.body {
            Body::Sub(s) => Some(s),
            Body::Mobile(_) => None,
        }
    }

    pub fn sub_actor_mut(&mut self) -> Option<&mut SubActor> {
        match &mut self.body {
            Body::Sub(s) => Some(s),
            Body::Mobile(_) => None,
        }
    }

    /// Name of the activity currently at the head of the queue.
    pub fn current_activity(&self) -> Option<&'static str> {
        self.activities.front().map(ActivityRunner::current_leaf)
    }
}
