//! Tick-scoped collision snapshots.
//!
//! Readers take an `Arc<GridCollision>` once per tick and never lock. Writers only
//! queue changes; `apply_pending` folds them into a fresh copy at the tick boundary
//! and publishes it atomically.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use arc_swap::ArcSwap;
use tracing::{debug, warn};

use super::GridCollision;
use crate::geometry::Tile;
use crate::object::{ObjectDef, ObjectInstance};

#[derive(Clone, Debug, PartialEq)]
pub enum CollisionChange {
    Spawn { object: ObjectInstance, def: Arc<ObjectDef> },
    Despawn { object: ObjectInstance, def: Arc<ObjectDef> },
    SetFlags { tile: Tile, flags: u32 },
}

pub struct SharedCollision {
    current: ArcSwap<GridCollision>,
    pending: Mutex<Vec<CollisionChange>>,
    generation: AtomicU64,
}

impl SharedCollision {
    pub fn new(grid: GridCollision) -> Self {
        Self {
            current: ArcSwap::from_pointee(grid),
            pending: Mutex::new(Vec::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// The snapshot every reader in the current tick should use.
    pub fn load(&self) -> Arc<GridCollision> { self.current.load_full() }

    pub fn generation(&self) -> u64 { self.generation.load(Ordering::Acquire) }

    pub fn queue(&self, change: CollisionChange) { self.pending_changes("queue").push(change); }

    pub fn pending(&self) -> usize { self.pending_changes("pending").len() }

    /// A panic while holding the queue cannot leave a half-pushed change behind,
    /// so a poisoned lock is recovered rather than dropping writes.
    fn pending_changes(&self, operation: &'static str) -> MutexGuard<'_, Vec<CollisionChange>> {
        match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!(operation, "collision queue lock poisoned; recovered inner value");
                poisoned.into_inner()
            }
        }
    }

    /// Applies queued changes copy-on-write. Returns how many were applied; the
    /// generation only advances when something changed.
    pub fn apply_pending(&self) -> usize {
        let changes = std::mem::take(&mut *self.pending_changes("apply"));
        if changes.is_empty() {
            return 0;
        }
        let mut next = GridCollision::clone(&self.current.load());
        for change in &changes {
            match change {
                CollisionChange::Spawn { object, def } => next.add_object(object, def),
                CollisionChange::Despawn { object, def } => next.remove_object(object, def),
                CollisionChange::SetFlags { tile, flags } => next.set_flags(*tile, *flags),
            }
        }
        self.current.store(Arc::new(next));
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(applied = changes.len(), generation, "collision snapshot published");
        changes.len()
    }
}

impl Default for SharedCollision {
    fn default() -> Self { Self::new(GridCollision::new()) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{CollisionMap, TraversalType, BLOCKED};
    use crate::geometry::Direction;
    use crate::object::ObjectType;

    #[test]
    fn queued_changes_are_invisible_until_applied() {
        let shared = SharedCollision::default();
        let before = shared.load();
        shared.queue(CollisionChange::SetFlags { tile: Tile::new(1, 1), flags: BLOCKED });
        assert_eq!(shared.load().flags(Tile::new(1, 1)), 0);
        assert_eq!(shared.pending(), 1);

        assert_eq!(shared.apply_pending(), 1);
        assert_eq!(shared.generation(), 1);
        assert_eq!(shared.load().flags(Tile::new(1, 1)), BLOCKED);
        // A snapshot taken earlier keeps its view.
        assert_eq!(before.flags(Tile::new(1, 1)), 0);
    }

    #[test]
    fn empty_boundary_keeps_generation() {
        let shared = SharedCollision::default();
        assert_eq!(shared.apply_pending(), 0);
        assert_eq!(shared.generation(), 0);
    }

    #[test]
    fn spawn_then_despawn_restores_open_tile() {
        let shared = SharedCollision::default();
        let def = Arc::new(ObjectDef::new(9, 1, 1, 0));
        let obj = ObjectInstance::new(9, Tile::new(2, 2), 0, ObjectType::Plain);
        shared.queue(CollisionChange::Spawn { object: obj.clone(), def: Arc::clone(&def) });
        shared.apply_pending();
        assert!(!shared.load().can_traverse(Tile::new(2, 2), Direction::North, TraversalType::Walk));
        shared.queue(CollisionChange::Despawn { object: obj, def });
        shared.apply_pending();
        assert!(shared.load().can_traverse(Tile::new(2, 2), Direction::North, TraversalType::Walk));
        assert_eq!(shared.generation(), 2);
    }

    #[test]
    fn poisoned_queue_still_accepts_and_applies_changes() {
        let shared = Arc::new(SharedCollision::default());
        let holder = Arc::clone(&shared);
        let joined = std::thread::spawn(move || {
            let _guard = holder.pending.lock().unwrap();
            panic!("writer died holding the queue");
        })
        .join();
        assert!(joined.is_err());
        assert!(shared.pending.is_poisoned());

        shared.queue(CollisionChange::SetFlags { tile: Tile::new(4, 4), flags: BLOCKED });
        assert_eq!(shared.pending(), 1);
        assert_eq!(shared.apply_pending(), 1);
        assert_eq!(shared.load().flags(Tile::new(4, 4)), BLOCKED);
    }
}
