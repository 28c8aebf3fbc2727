use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};
use walkto_core::collision::{CollisionMap, TraversalType};
use walkto_core::pathfinder::footprint_can_step;
use walkto_core::{Direction, Tile};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.0) }
}

/// Result of advancing an entity's movement queue by one tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Step {
    Idle,
    Moved(Tile),
    /// The next step was no longer traversable; the queue was dropped.
    Blocked,
}

#[derive(Clone, Debug, Serialize)]
pub struct Entity {
    pub id: EntityId,
    pub tile: Tile,
    pub width: i32,
    pub length: i32,
    pub traversal: TraversalType,
    pub facing: Option<Direction>,
    #[serde(skip)]
    queue: VecDeque<Tile>,
}

impl Entity {
    pub fn new(id: EntityId, tile: Tile) -> Self {
        Self { id, tile, width: 1, length: 1, traversal: TraversalType::Walk, facing: None, queue: VecDeque::new() }
    }

    pub fn with_size(mut self, width: i32, length: i32) -> Self {
        self.width = width.max(1);
        self.length = length.max(1);
        self
    }

    /// Replaces whatever walk was queued.
    pub fn walk(&mut self, path: &[Tile]) {
        self.queue.clear();
        self.queue.extend(path.iter().copied());
    }

    pub fn stop(&mut self) { self.queue.clear(); }

    pub fn is_moving(&self) -> bool { !self.queue.is_empty() }

    pub fn queued(&self) -> impl Iterator<Item = &Tile> { self.queue.iter() }

    pub fn face_tile(&mut self, target: Tile) {
        if let Some(dir) = Direction::towards(self.tile, target) {
            self.facing = Some(dir);
        }
    }

    /// Takes one queued step if the collision snapshot still allows it.
    pub fn advance<C: CollisionMap + ?Sized>(&mut self, collision: &C) -> Step {
        let Some(next) = self.queue.front().copied() else { return Step::Idle };
        let Some(dir) = Direction::from_delta(next.x - self.tile.x, next.z - self.tile.z)
            .filter(|_| self.tile.distance(next) == 1)
        else {
            self.queue.clear();
            return Step::Blocked;
        };
        if !footprint_can_step(collision, self.tile, dir, self.width, self.length, self.traversal) {
            self.queue.clear();
            return Step::Blocked;
        }
        self.queue.pop_front();
        self.tile = next;
        self.facing = Some(dir);
        Step::Moved(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use walkto_core::collision::GridCollision;

    #[test]
    fn advances_one_tile_per_call() {
        let grid = GridCollision::new();
        let mut e = Entity::new(EntityId(1), Tile::new(0, 0));
        e.walk(&[Tile::new(1, 0), Tile::new(2, 1)]);
        assert_eq!(e.advance(&grid), Step::Moved(Tile::new(1, 0)));
        assert_eq!(e.facing, Some(Direction::East));
        assert_eq!(e.advance(&grid), Step::Moved(Tile::new(2, 1)));
        assert_eq!(e.facing, Some(Direction::NorthEast));
        assert_eq!(e.advance(&grid), Step::Idle);
        assert!(!e.is_moving());
    }

    #[test]
    fn blocked_step_drops_queue() {
        let mut grid = GridCollision::new();
        grid.block(Tile::new(1, 0));
        let mut e = Entity::new(EntityId(1), Tile::new(0, 0));
        e.walk(&[Tile::new(1, 0), Tile::new(2, 0)]);
        assert_eq!(e.advance(&grid), Step::Blocked);
        assert_eq!(e.tile, Tile::new(0, 0));
        assert!(!e.is_moving());
    }

    #[test]
    fn non_adjacent_step_is_rejected() {
        let grid = GridCollision::new();
        let mut e = Entity::new(EntityId(1), Tile::new(0, 0));
        e.walk(&[Tile::new(3, 0)]);
        assert_eq!(e.advance(&grid), Step::Blocked);
    }

    #[test]
    fn facing_own_tile_keeps_previous_direction() {
        let mut e = Entity::new(EntityId(1), Tile::new(4, 4));
        e.face_tile(Tile::new(4, 5));
        assert_eq!(e.facing, Some(Direction::North));
        e.face_tile(Tile::new(4, 4));
        assert_eq!(e.facing, Some(Direction::North));
    }
}
