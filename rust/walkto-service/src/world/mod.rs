//! Authoritative world state: entities, placed objects, collision and feedback.
//!
//! Everything here is mutated from one scheduling domain at a time; the only
//! shared piece is the collision snapshot, which readers load lock-free.

use std::collections::BTreeMap;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;
use walkto_core::collision::{CollisionChange, GridCollision, SharedCollision};
use walkto_core::{ObjectDef, ObjectDefinitions, ObjectInstance, SearchOptions, Tile};

use crate::errors::InteractError;

pub mod entity;
pub mod notify;

pub use entity::{Entity, EntityId, Step};
pub use notify::{Notifier, RecordingNotifier, TracingNotifier};

type TileKey = (i32, i32, i32);

fn key(tile: Tile) -> TileKey { (tile.x, tile.z, tile.height) }

pub struct WorldState {
    tick: u64,
    next_entity: u32,
    entities: BTreeMap<EntityId, Entity>,
    objects: FxHashMap<TileKey, Vec<ObjectInstance>>,
    collision: Arc<SharedCollision>,
    definitions: Arc<dyn ObjectDefinitions>,
    notifier: Arc<dyn Notifier>,
    options: SearchOptions,
    debug_objects: bool,
}

impl WorldState {
    pub fn new(definitions: Arc<dyn ObjectDefinitions>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            tick: 0,
            next_entity: 1,
            entities: BTreeMap::new(),
            objects: FxHashMap::default(),
            collision: Arc::new(SharedCollision::default()),
            definitions,
            notifier,
            options: SearchOptions::default(),
            debug_objects: false,
        }
    }

    pub fn with_collision(mut self, grid: GridCollision) -> Self {
        self.collision = Arc::new(SharedCollision::new(grid));
        self
    }

    pub fn with_options(mut self, options: SearchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_debug_objects(mut self, on: bool) -> Self {
        self.debug_objects = on;
        self
    }

    pub fn tick(&self) -> u64 { self.tick }

    pub fn options(&self) -> &SearchOptions { &self.options }

    pub fn debug_objects(&self) -> bool { self.debug_objects }

    /// Snapshot valid for the rest of the current tick.
    pub fn collision(&self) -> Arc<GridCollision> { self.collision.load() }

    pub fn shared_collision(&self) -> &Arc<SharedCollision> { &self.collision }

    pub fn definition(&self, id: u32) -> Option<Arc<ObjectDef>> { self.definitions.get(id) }

    pub fn notify(&self, entity: EntityId, text: &str) { self.notifier.notify(entity, text); }

    pub fn spawn_entity(&mut self, tile: Tile, width: i32, length: i32) -> EntityId {
        let id = EntityId(self.next_entity);
        self.next_entity += 1;
        self.entities.insert(id, Entity::new(id, tile).with_size(width, length));
        debug!(entity = id.0, tile = %tile, "entity spawned");
        id
    }

    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> { self.entities.remove(&id) }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> { self.entities.get(&id) }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> { self.entities.get_mut(&id) }

    pub fn entity_count(&self) -> usize { self.entities.len() }

    /// Records an object whose collision is already part of the loaded grid.
    pub fn register_object(&mut self, object: ObjectInstance) {
        self.objects.entry(key(object.tile)).or_default().push(object);
    }

    /// Places an object; its clipping lands at the next tick boundary.
    pub fn spawn_object(&mut self, object: ObjectInstance) -> Result<(), InteractError> {
        let def = self.definition(object.id).ok_or(InteractError::MissingDefinition(object.id))?;
        self.collision.queue(CollisionChange::Spawn { object: object.clone(), def });
        self.register_object(object);
        Ok(())
    }

    /// Removes the object with `id` anchored at `tile`. Returns false if there was none.
    pub fn despawn_object(&mut self, id: u32, tile: Tile) -> Result<bool, InteractError> {
        let k = key(tile);
        let Some(pos) = self.objects.get(&k).and_then(|l| l.iter().position(|o| o.id == id)) else {
            return Ok(false);
        };
        let def = self.definition(id).ok_or(InteractError::MissingDefinition(id))?;
        let Some(list) = self.objects.get_mut(&k) else { return Ok(false) };
        let object = list.remove(pos);
        if list.is_empty() {
            self.objects.remove(&k);
        }
        self.collision.queue(CollisionChange::Despawn { object, def });
        Ok(true)
    }

    pub fn object(&self, id: u32, tile: Tile) -> Option<&ObjectInstance> {
        self.objects.get(&key(tile))?.iter().find(|o| o.id == id)
    }

    pub fn objects_at(&self, tile: Tile) -> &[ObjectInstance] {
        self.objects.get(&key(tile)).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn object_count(&self) -> usize { self.objects.values().map(Vec::len).sum() }

    /// Advances the clock and publishes queued collision changes. Returns how many were applied.
    pub(crate) fn begin_tick(&mut self) -> usize {
        self.tick += 1;
        self.collision.apply_pending()
    }

    /// One queued step per entity, in id order, against this tick's snapshot.
    pub(crate) fn move_entities(&mut self) -> usize {
        let snapshot = self.collision.load();
        let mut moved = 0;
        for entity in self.entities.values_mut() {
            match entity.advance(snapshot.as_ref()) {
                Step::Moved(_) => moved += 1,
                Step::Blocked => debug!(entity = entity.id.0, tile = %entity.tile, "walk interrupted"),
                Step::Idle => {}
            }
        }
        moved
    }
}
