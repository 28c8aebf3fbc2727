//! Walk-face-act as an explicit resumable state machine.
//!
//! A task is polled once when submitted and then once per tick. Every poll
//! first checks the task still holds its entity's ticket; a superseded task
//! ends silently without touching the world.

use std::sync::Arc;

use tracing::debug;
use walkto_core::{route_to_object, ObjectDef, ObjectFootprint, ObjectInstance, Tile};

use super::actions::ActionRegistry;
use crate::world::{EntityId, WorldState};

pub const CANT_REACH: &str = "I can't reach that!";
pub const NOTHING_INTERESTING: &str = "Nothing interesting happens.";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    Routing,
    /// `destination` is None when the entity was already on an accepted tile.
    Walking { destination: Option<Tile>, reached: bool },
    Facing { reached: bool },
    /// Facing has been sent; act on the next poll.
    Acting,
    Done,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Done,
}

pub struct InteractionTask {
    pub(crate) entity: EntityId,
    pub(crate) ticket: u64,
    object: ObjectInstance,
    def: Arc<ObjectDef>,
    option: u8,
    stage: Stage,
    footprint: Option<ObjectFootprint>,
}

impl InteractionTask {
    pub fn new(entity: EntityId, ticket: u64, object: ObjectInstance, def: Arc<ObjectDef>, option: u8) -> Self {
        Self { entity, ticket, object, def, option, stage: Stage::Routing, footprint: None }
    }

    pub fn stage(&self) -> &Stage { &self.stage }

    /// Runs stages until the task has to wait for a later tick or finishes.
    /// `current` reports whether this task still owns its entity.
    pub fn resume(&mut self, world: &mut WorldState, actions: &ActionRegistry, current: impl Fn(EntityId, u64) -> bool) -> TaskState {
        loop {
            if self.stage == Stage::Done {
                return TaskState::Done;
            }
            if !current(self.entity, self.ticket) {
                debug!(entity = self.entity.0, ticket = self.ticket, stage = ?self.stage, "interaction superseded");
                self.stage = Stage::Done;
                return TaskState::Done;
            }
            if world.entity(self.entity).is_none() {
                self.stage = Stage::Done;
                return TaskState::Done;
            }
            match self.stage {
                Stage::Routing => self.route(world),
                Stage::Walking { destination, reached } => {
                    let Some(entity) = world.entity(self.entity) else { continue };
                    let arrived = destination.map_or(true, |d| entity.tile.same_as(d));
                    if arrived {
                        self.stage = Stage::Facing { reached };
                    } else if entity.is_moving() {
                        return TaskState::Pending;
                    } else {
                        debug!(entity = self.entity.0, tile = %entity.tile, "walk ended short of destination");
                        world.notify(self.entity, CANT_REACH);
                        self.stage = Stage::Done;
                    }
                }
                Stage::Facing { reached } => {
                    self.face(world);
                    if reached {
                        self.stage = Stage::Acting;
                        return TaskState::Pending;
                    }
                    world.notify(self.entity, CANT_REACH);
                    self.stage = Stage::Done;
                }
                Stage::Acting => {
                    self.act(world, actions);
                    self.stage = Stage::Done;
                }
                Stage::Done => {}
            }
        }
    }

    fn route(&mut self, world: &mut WorldState) {
        let collision = world.collision();
        let Some(entity) = world.entity(self.entity) else { return };
        let (footprint, route) = route_to_object(
            collision.as_ref(),
            world.options(),
            entity.tile,
            (entity.width, entity.length),
            entity.traversal,
            &self.object,
            &self.def,
        );
        debug!(
            entity = self.entity.0, object = self.object.id, success = route.success,
            steps = route.len(), expanded = route.expanded, "interaction routed"
        );
        self.footprint = Some(footprint);
        if route.is_unreachable() {
            world.notify(self.entity, CANT_REACH);
            self.stage = Stage::Done;
            return;
        }
        let destination = route.last();
        if let Some(entity) = world.entity_mut(self.entity) {
            entity.walk(&route.path);
        }
        self.stage = Stage::Walking { destination, reached: route.success };
    }

    fn face(&self, world: &mut WorldState) {
        let Some(footprint) = self.footprint.as_ref() else { return };
        if let Some(entity) = world.entity_mut(self.entity) {
            let target = footprint.facing_tile(entity.tile);
            entity.face_tile(target);
        }
    }

    fn act(&self, world: &mut WorldState, actions: &ActionRegistry) {
        debug!(entity = self.entity.0, object = self.object.id, option = self.option, "interaction acting");
        if actions.execute(world, self.entity, &self.object, self.option) {
            return;
        }
        world.notify(self.entity, NOTHING_INTERESTING);
        if world.debug_objects() {
            let o = &self.object;
            let line = format!(
                "Unhandled object action: [opt={}, id={}, type={}, rot={}, x={}, z={}]",
                self.option,
                o.id,
                o.kind.raw(),
                o.rotation,
                o.tile.x,
                o.tile.z
            );
            world.notify(self.entity, &line);
        }
    }
}
