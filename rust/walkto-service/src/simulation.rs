use serde::Serialize;
use tracing::trace;
use walkto_core::Tile;

use crate::errors::InteractError;
use crate::interaction::{ActionRegistry, Scheduler};
use crate::world::{EntityId, WorldState};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    pub tick: u64,
    pub collision_changes: usize,
    pub tasks_finished: usize,
    pub entities_moved: usize,
}

/// One scheduling domain: the world, its scripted actions, and the tasks acting on it.
pub struct Simulation {
    world: WorldState,
    actions: ActionRegistry,
    scheduler: Scheduler,
}

impl Simulation {
    pub fn new(world: WorldState, actions: ActionRegistry) -> Self {
        Self { world, actions, scheduler: Scheduler::new() }
    }

    pub fn world(&self) -> &WorldState { &self.world }

    pub fn world_mut(&mut self) -> &mut WorldState { &mut self.world }

    pub fn actions_mut(&mut self) -> &mut ActionRegistry { &mut self.actions }

    pub fn scheduler(&self) -> &Scheduler { &self.scheduler }

    /// Starts walk-face-act toward object `object_id` anchored at `tile`,
    /// replacing whatever interaction `entity` had in flight.
    pub fn interact(&mut self, entity: EntityId, object_id: u32, tile: Tile, option: u8) -> Result<u64, InteractError> {
        self.scheduler.submit(&mut self.world, &self.actions, entity, object_id, tile, option)
    }

    pub fn cancel(&mut self, entity: EntityId) -> bool {
        if let Some(e) = self.world.entity_mut(entity) {
            e.stop();
        }
        self.scheduler.cancel(entity)
    }

    /// Collision boundary, then task resumption in submission order, then one
    /// movement step per entity in id order.
    pub fn tick(&mut self) -> TickReport {
        let collision_changes = self.world.begin_tick();
        let tasks_finished = self.scheduler.resume_all(&mut self.world, &self.actions);
        let entities_moved = self.world.move_entities();
        let report = TickReport { tick: self.world.tick(), collision_changes, tasks_finished, entities_moved };
        trace!(?report, "tick");
        report
    }

    pub fn run_ticks(&mut self, n: u64) {
        for _ in 0..n {
            self.tick();
        }
    }
}
