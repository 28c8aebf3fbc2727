use std::sync::Arc;

use rustc_hash::FxHashMap;
use walkto_core::ObjectInstance;

use crate::world::{EntityId, WorldState};

/// Scripted content for one (object id, option) pair. Returns false when the
/// handler declined, which is reported the same way as a missing handler.
pub type ActionHandler = Arc<dyn Fn(&mut WorldState, EntityId, &ObjectInstance) -> bool + Send + Sync>;

#[derive(Clone, Default)]
pub struct ActionRegistry {
    handlers: FxHashMap<(u32, u8), ActionHandler>,
}

impl ActionRegistry {
    pub fn new() -> Self { Self::default() }

    /// Registers `handler`, replacing any earlier one for the same pair.
    pub fn register<F>(&mut self, object_id: u32, option: u8, handler: F)
    where
        F: Fn(&mut WorldState, EntityId, &ObjectInstance) -> bool + Send + Sync + 'static,
    {
        self.handlers.insert((object_id, option), Arc::new(handler));
    }

    pub fn contains(&self, object_id: u32, option: u8) -> bool { self.handlers.contains_key(&(object_id, option)) }

    pub fn len(&self) -> usize { self.handlers.len() }

    pub fn is_empty(&self) -> bool { self.handlers.is_empty() }

    pub fn execute(&self, world: &mut WorldState, entity: EntityId, object: &ObjectInstance, option: u8) -> bool {
        match self.handlers.get(&(object.id, option)) {
            Some(handler) => handler(world, entity, object),
            None => false,
        }
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRegistry").field("handlers", &self.handlers.len()).finish()
    }
}
