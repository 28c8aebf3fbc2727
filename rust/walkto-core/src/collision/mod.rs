//! Per-tile, per-direction collision flags and traversal rules.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::geometry::{Direction, Tile};
use crate::object::{ObjectDef, ObjectInstance, ObjectType};

pub mod snapshot;

pub use snapshot::{CollisionChange, SharedCollision};

/// Which collision layer a mover is checked against.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraversalType {
    #[default]
    Walk,
    Projectile,
}

impl TraversalType {
    pub fn is_projectile(self) -> bool { matches!(self, TraversalType::Projectile) }
}

pub trait CollisionMap {
    /// True when something standing on `tile` may leave it toward `direction`.
    fn can_traverse(&self, tile: Tile, direction: Direction, traversal: TraversalType) -> bool;

    /// True when `tile` has a wall on its `direction` side.
    fn is_blocked(&self, tile: Tile, direction: Direction, projectile: bool) -> bool;
}

impl<C: CollisionMap + ?Sized> CollisionMap for &C {
    fn can_traverse(&self, tile: Tile, direction: Direction, traversal: TraversalType) -> bool {
        (**self).can_traverse(tile, direction, traversal)
    }

    fn is_blocked(&self, tile: Tile, direction: Direction, projectile: bool) -> bool {
        (**self).is_blocked(tile, direction, projectile)
    }
}

// Walk layer bits. The projectile layer is the same layout shifted by PROJECTILE_SHIFT.
pub const WALL_NORTH: u32 = 1 << 0;
pub const WALL_EAST: u32 = 1 << 1;
pub const WALL_SOUTH: u32 = 1 << 2;
pub const WALL_WEST: u32 = 1 << 3;
pub const WALL_NORTH_EAST: u32 = 1 << 4;
pub const WALL_SOUTH_EAST: u32 = 1 << 5;
pub const WALL_SOUTH_WEST: u32 = 1 << 6;
pub const WALL_NORTH_WEST: u32 = 1 << 7;
pub const BLOCKED: u32 = 1 << 8;
pub const PROJECTILE_SHIFT: u32 = 9;
pub const LAYER_MASK: u32 = (1 << PROJECTILE_SHIFT) - 1;

#[inline]
pub const fn wall_bit(direction: Direction) -> u32 {
    match direction {
        Direction::North => WALL_NORTH,
        Direction::East => WALL_EAST,
        Direction::South => WALL_SOUTH,
        Direction::West => WALL_WEST,
        Direction::NorthEast => WALL_NORTH_EAST,
        Direction::SouthEast => WALL_SOUTH_EAST,
        Direction::SouthWest => WALL_SOUTH_WEST,
        Direction::NorthWest => WALL_NORTH_WEST,
    }
}

#[inline]
const fn layer(bits: u32, projectile: bool) -> u32 {
    if projectile { bits << PROJECTILE_SHIFT } else { bits }
}

/// Both layers of `bits`.
#[inline]
pub const fn both_layers(bits: u32) -> u32 { bits | (bits << PROJECTILE_SHIFT) }

/// Sparse flag grid; tiles with no entry are open.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridCollision {
    flags: FxHashMap<(i32, i32, i32), u32>,
}

impl GridCollision {
    pub fn new() -> Self { Self::default() }

    #[inline]
    fn key(tile: Tile) -> (i32, i32, i32) { (tile.x, tile.z, tile.height) }

    pub fn flags(&self, tile: Tile) -> u32 {
        self.flags.get(&Self::key(tile)).copied().unwrap_or(0)
    }

    pub fn set_flags(&mut self, tile: Tile, flags: u32) {
        if flags == 0 {
            self.flags.remove(&Self::key(tile));
        } else {
            self.flags.insert(Self::key(tile), flags);
        }
    }

    pub fn add_flags(&mut self, tile: Tile, bits: u32) {
        *self.flags.entry(Self::key(tile)).or_insert(0) |= bits;
    }

    pub fn remove_flags(&mut self, tile: Tile, bits: u32) {
        let key = Self::key(tile);
        if let Some(f) = self.flags.get_mut(&key) {
            *f &= !bits;
            if *f == 0 { self.flags.remove(&key); }
        }
    }

    /// Blocks the tile entirely on both layers.
    pub fn block(&mut self, tile: Tile) { self.add_flags(tile, both_layers(BLOCKED)); }

    /// Places a wall on the `direction` edge of `tile`, mirrored on the neighbour.
    pub fn add_wall(&mut self, tile: Tile, direction: Direction, projectile: bool) {
        let bits = if projectile { both_layers(wall_bit(direction)) } else { wall_bit(direction) };
        let mirrored = if projectile { both_layers(wall_bit(direction.opposite())) } else { wall_bit(direction.opposite()) };
        self.add_flags(tile, bits);
        self.add_flags(tile.step(direction), mirrored);
    }

    pub fn remove_wall(&mut self, tile: Tile, direction: Direction) {
        self.remove_flags(tile, both_layers(wall_bit(direction)));
        self.remove_flags(tile.step(direction), both_layers(wall_bit(direction.opposite())));
    }

    pub fn add_object(&mut self, obj: &ObjectInstance, def: &ObjectDef) {
        self.clip_object(obj, def, true);
    }

    pub fn remove_object(&mut self, obj: &ObjectInstance, def: &ObjectDef) {
        self.clip_object(obj, def, false);
    }

    fn clip_object(&mut self, obj: &ObjectInstance, def: &ObjectDef, add: bool) {
        match obj.kind {
            ObjectType::LengthwiseWall => {
                let Some(dir) = wall_direction(obj.rotation) else { return };
                if add { self.add_wall(obj.tile, dir, def.solid) } else { self.remove_wall(obj.tile, dir) }
            }
            ObjectType::WallDecoration | ObjectType::InteractableWall => {}
            ObjectType::DiagonalInteractable | ObjectType::Interactable | ObjectType::Plain => {
                if !def.solid { return; }
                let (width, length) = def.effective_size(obj.rotation);
                for x in 0..width {
                    for z in 0..length {
                        let t = obj.tile.transform(x, z);
                        if add { self.block(t) } else { self.remove_flags(t, both_layers(BLOCKED)) }
                    }
                }
            }
        }
    }

    pub fn len(&self) -> usize { self.flags.len() }

    pub fn is_empty(&self) -> bool { self.flags.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (Tile, u32)> + '_ {
        self.flags.iter().map(|(&(x, z, h), &f)| (Tile::with_height(x, z, h), f))
    }

    #[inline]
    fn fully_blocked(&self, tile: Tile, projectile: bool) -> bool {
        self.flags(tile) & layer(BLOCKED, projectile) != 0
    }
}

/// The edge a lengthwise wall occupies at each rotation.
pub fn wall_direction(rotation: u8) -> Option<Direction> {
    match rotation {
        0 => Some(Direction::West),
        1 => Some(Direction::North),
        2 => Some(Direction::East),
        3 => Some(Direction::South),
        _ => None,
    }
}

impl CollisionMap for GridCollision {
    fn can_traverse(&self, tile: Tile, direction: Direction, traversal: TraversalType) -> bool {
        let projectile = traversal.is_projectile();
        if self.fully_blocked(tile, projectile) || self.is_blocked(tile, direction, projectile) {
            return false;
        }
        if !direction.is_diagonal() {
            return true;
        }
        // A diagonal step must also clear both corners it cuts past.
        let (h, v) = direction.components();
        if self.is_blocked(tile, h, projectile) || self.is_blocked(tile, v, projectile) {
            return false;
        }
        let th = tile.step(h);
        let tv = tile.step(v);
        if self.fully_blocked(th, projectile) || self.fully_blocked(tv, projectile) {
            return false;
        }
        !(self.is_blocked(th, v, projectile) || self.is_blocked(tv, h, projectile))
    }

    fn is_blocked(&self, tile: Tile, direction: Direction, projectile: bool) -> bool {
        self.flags(tile) & layer(wall_bit(direction), projectile) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_grid_allows_every_direction() {
        let grid = GridCollision::new();
        for d in Direction::RS_ORDER {
            assert!(grid.can_traverse(Tile::new(0, 0), d, TraversalType::Walk));
        }
    }

    #[test]
    fn walls_are_mirrored_on_the_neighbour() {
        let mut grid = GridCollision::new();
        grid.add_wall(Tile::new(5, 5), Direction::North, false);
        assert!(grid.is_blocked(Tile::new(5, 5), Direction::North, false));
        assert!(grid.is_blocked(Tile::new(5, 6), Direction::South, false));
        assert!(!grid.can_traverse(Tile::new(5, 5), Direction::North, TraversalType::Walk));
        assert!(!grid.can_traverse(Tile::new(5, 6), Direction::South, TraversalType::Walk));
        // Walk-only wall leaves the projectile layer open.
        assert!(grid.can_traverse(Tile::new(5, 5), Direction::North, TraversalType::Projectile));
    }

    #[test]
    fn diagonal_cannot_cut_blocked_corner() {
        let mut grid = GridCollision::new();
        grid.block(Tile::new(1, 0));
        assert!(!grid.can_traverse(Tile::new(0, 0), Direction::NorthEast, TraversalType::Walk));
        assert!(grid.can_traverse(Tile::new(0, 0), Direction::North, TraversalType::Walk));
        assert!(grid.can_traverse(Tile::new(0, 0), Direction::NorthWest, TraversalType::Walk));
    }

    #[test]
    fn diagonal_blocked_by_wall_between_corners() {
        let mut grid = GridCollision::new();
        // Wall on the east side of (0,1): stepping NE from (0,0) would clip it.
        grid.add_wall(Tile::new(0, 1), Direction::East, false);
        assert!(!grid.can_traverse(Tile::new(0, 0), Direction::NorthEast, TraversalType::Walk));
    }

    #[test]
    fn object_clipping_round_trips() {
        let mut grid = GridCollision::new();
        let def = ObjectDef::new(1, 2, 1, 0);
        let obj = ObjectInstance::new(1, Tile::new(3, 3), 1, ObjectType::Interactable);
        grid.add_object(&obj, &def);
        // rotation 1 swaps to 1x2
        assert_ne!(grid.flags(Tile::new(3, 3)) & BLOCKED, 0);
        assert_ne!(grid.flags(Tile::new(3, 4)) & BLOCKED, 0);
        assert_eq!(grid.flags(Tile::new(4, 3)), 0);
        grid.remove_object(&obj, &def);
        assert!(grid.is_empty());
    }

    #[test]
    fn lengthwise_wall_clips_its_edge() {
        let mut grid = GridCollision::new();
        let def = ObjectDef::new(2, 1, 1, 0);
        let door = ObjectInstance::new(2, Tile::new(10, 10), 0, ObjectType::LengthwiseWall);
        grid.add_object(&door, &def);
        assert!(grid.is_blocked(Tile::new(10, 10), Direction::West, false));
        assert!(grid.is_blocked(Tile::new(9, 10), Direction::East, true));
        grid.remove_object(&door, &def);
        assert!(grid.is_empty());
    }

    #[test]
    fn non_solid_objects_do_not_clip() {
        let mut grid = GridCollision::new();
        let mut def = ObjectDef::new(3, 1, 1, 0);
        def.solid = false;
        grid.add_object(&ObjectInstance::new(3, Tile::new(0, 0), 0, ObjectType::Plain), &def);
        assert!(grid.is_empty());
    }
}
