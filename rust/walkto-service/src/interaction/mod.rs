use rustc_hash::FxHashMap;
use tracing::debug;
use walkto_core::Tile;

use crate::errors::InteractError;
use crate::world::{EntityId, WorldState};

pub mod actions;
pub mod task;

pub use actions::{ActionHandler, ActionRegistry};
pub use task::{InteractionTask, Stage, TaskState, CANT_REACH, NOTHING_INTERESTING};

/// Owns in-flight interaction tasks and the per-entity ticket that decides
/// which of them is still live. At most one task per entity holds its ticket.
#[derive(Default)]
pub struct Scheduler {
    tasks: Vec<InteractionTask>,
    active: FxHashMap<EntityId, u64>,
    next_ticket: u64,
}

impl Scheduler {
    pub fn new() -> Self { Self::default() }

    /// Supersedes any task the entity already has and polls the new one at once,
    /// so routing and the first walk step are queued before the next tick.
    pub fn submit(
        &mut self,
        world: &mut WorldState,
        actions: &ActionRegistry,
        entity: EntityId,
        object_id: u32,
        tile: Tile,
        option: u8,
    ) -> Result<u64, InteractError> {
        if world.entity(entity).is_none() {
            return Err(InteractError::UnknownEntity(entity));
        }
        let object = world
            .object(object_id, tile)
            .cloned()
            .ok_or(InteractError::UnknownObject { id: object_id, tile })?;
        let def = world.definition(object_id).ok_or(InteractError::MissingDefinition(object_id))?;

        self.next_ticket += 1;
        let ticket = self.next_ticket;
        if let Some(previous) = self.active.insert(entity, ticket) {
            debug!(entity = entity.0, previous, ticket, "interaction replaced");
        }

        let mut task = InteractionTask::new(entity, ticket, object, def, option);
        let active = &self.active;
        let state = task.resume(world, actions, |e, t| active.get(&e) == Some(&t));
        match state {
            TaskState::Pending => self.tasks.push(task),
            TaskState::Done => self.release(entity, ticket),
        }
        Ok(ticket)
    }

    /// Invalidates the entity's current task, if any. Its next poll is a no-op.
    pub fn cancel(&mut self, entity: EntityId) -> bool { self.active.remove(&entity).is_some() }

    /// Polls every pending task once, in submission order. Returns how many finished.
    pub fn resume_all(&mut self, world: &mut WorldState, actions: &ActionRegistry) -> usize {
        let mut finished = 0;
        let tasks = std::mem::take(&mut self.tasks);
        for mut task in tasks {
            let active = &self.active;
            match task.resume(world, actions, |e, t| active.get(&e) == Some(&t)) {
                TaskState::Pending => self.tasks.push(task),
                TaskState::Done => {
                    self.release(task.entity, task.ticket);
                    finished += 1;
                }
            }
        }
        finished
    }

    pub fn pending(&self) -> usize { self.tasks.len() }

    pub fn is_busy(&self, entity: EntityId) -> bool { self.active.contains_key(&entity) }

    fn release(&mut self, entity: EntityId, ticket: u64) {
        if self.active.get(&entity) == Some(&ticket) {
            self.active.remove(&entity);
        }
    }
}
