//! Interaction footprints of placed objects.
//!
//! An object's footprint answers two questions for the pathfinder: which tiles an
//! entity may interact from (`is_valid`), and which of those are cut off by the
//! object's rotated clip mask or its approach geometry (`is_blocked`).

use rustc_hash::FxHashSet;

use crate::collision::CollisionMap;
use crate::geometry::{Direction, Tile};
use crate::object::{ObjectDef, ObjectInstance, ObjectType};

pub const CLIP_NORTH: u8 = 0x1;
pub const CLIP_EAST: u8 = 0x2;
pub const CLIP_SOUTH: u8 = 0x4;
pub const CLIP_WEST: u8 = 0x8;
const CLIP_BITS: u8 = 4;
const CLIP_FULL: u8 = 0xF;

/// Rotates a 4-bit clip mask left by `rotation` quarter turns.
/// Rotations outside 0..=3 are treated as fully blocked.
pub fn rotate_clip_mask(mask: u8, rotation: u8) -> u8 {
    if rotation >= CLIP_BITS {
        return CLIP_FULL;
    }
    let m = mask & CLIP_FULL;
    ((m << rotation) & CLIP_FULL) | (m >> (CLIP_BITS - rotation))
}

/// Which side of a `width` x `length` rectangle a ring tile at offset (x, z) sits on.
/// Edge tiles report the direction facing back toward the object; corners report
/// their own diagonal. Offsets inside the rectangle or off the ring give None.
pub fn ring_face(x: i32, z: i32, width: i32, length: i32) -> Option<Direction> {
    let on_x_edge = z != -1 && z != length;
    let on_z_edge = x != -1 && x != width;
    let face = match (x, z) {
        _ if x == -1 && on_x_edge => Direction::East,
        _ if x == width && on_x_edge => Direction::West,
        _ if z == -1 && on_z_edge => Direction::North,
        _ if z == length && on_z_edge => Direction::South,
        (-1, -1) => Direction::SouthWest,
        _ if x == -1 && z == length => Direction::NorthWest,
        _ if x == width && z == -1 => Direction::SouthEast,
        _ if x == width && z == length => Direction::NorthEast,
        _ => return None,
    };
    Some(face)
}

#[derive(Clone, Debug)]
pub struct ObjectFootprint {
    object: ObjectInstance,
    width: i32,
    length: i32,
    blocked: FxHashSet<(i32, i32)>,
}

impl ObjectFootprint {
    pub fn resolve<C: CollisionMap + ?Sized>(object: &ObjectInstance, def: &ObjectDef, collision: &C) -> Self {
        let (width, length) = def.effective_size(object.rotation);
        let origin = object.tile;
        let mut blocked = FxHashSet::default();

        let clip = rotate_clip_mask(def.clip_mask, object.rotation);
        if clip & CLIP_NORTH != 0 {
            for x in 0..width { blocked.insert(origin.transform(x, length).planar()); }
        }
        if clip & CLIP_EAST != 0 {
            for z in 0..length { blocked.insert(origin.transform(width, z).planar()); }
        }
        if clip & CLIP_SOUTH != 0 {
            for x in 0..width { blocked.insert(origin.transform(x, -1).planar()); }
        }
        if clip & CLIP_WEST != 0 {
            for z in 0..length { blocked.insert(origin.transform(-1, z).planar()); }
        }

        if object.kind.blocks_diagonal_approach() {
            for x in -1..=width {
                for z in -1..=length {
                    let Some(face) = ring_face(x, z, width, length) else { continue };
                    let tile = origin.transform(x, z);
                    if face.is_diagonal() || collision.is_blocked(tile, face, false) {
                        blocked.insert(tile.planar());
                    }
                }
            }
        }

        Self { object: object.clone(), width, length, blocked }
    }

    pub fn object(&self) -> &ObjectInstance { &self.object }

    /// Effective (width, length) after rotation.
    pub fn size(&self) -> (i32, i32) { (self.width, self.length) }

    /// Whether `tile` is a place this object may be interacted with from,
    /// before clip-mask blocking is considered.
    pub fn is_valid(&self, tile: Tile) -> bool {
        let o = self.object.tile;
        match self.object.kind {
            ObjectType::LengthwiseWall => match self.object.rotation {
                0 => {
                    tile.x >= o.x - self.width
                        && tile.x <= o.x
                        && tile.z >= o.z - self.length
                        && tile.z <= o.z + self.length
                }
                1 => tile.same_as(o) || tile.same_as(o.transform(0, 1)),
                2 => tile.same_as(o) || tile.same_as(o.transform(1, 0)),
                3 => tile.same_as(o) || tile.same_as(o.transform(0, -1)) || tile.same_as(o.transform(-1, 0)),
                _ => false,
            },
            ObjectType::InteractableWall | ObjectType::WallDecoration => tile.same_as(o),
            _ => !self.covers(tile),
        }
    }

    pub fn is_blocked(&self, tile: Tile) -> bool { self.blocked.contains(&tile.planar()) }

    /// Border predicate handed to the pathfinder.
    pub fn accepts(&self, tile: Tile) -> bool { self.is_valid(tile) && !self.is_blocked(tile) }

    /// True when `tile` lies inside the object's own rectangle.
    pub fn covers(&self, tile: Tile) -> bool {
        let o = self.object.tile;
        tile.x >= o.x && tile.x < o.x + self.width && tile.z >= o.z && tile.z < o.z + self.length
    }

    pub fn blocked_tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        let h = self.object.tile.height;
        self.blocked.iter().map(move |&(x, z)| Tile::with_height(x, z, h))
    }

    /// Accepted tiles of the one-wider ring (interior included), in x-major order.
    pub fn border_tiles(&self) -> Vec<Tile> {
        let mut out = Vec::new();
        for x in -1..=self.width {
            for z in -1..=self.length {
                let tile = self.object.tile.transform(x, z);
                if self.accepts(tile) { out.push(tile); }
            }
        }
        out
    }

    /// Tile an entity should turn toward once it has arrived next to the object.
    pub fn facing_tile(&self, entity_tile: Tile) -> Tile {
        let o = self.object.tile;
        match self.object.kind {
            ObjectType::LengthwiseWall => match self.object.rotation {
                0 => o.transform(if entity_tile.x == o.x { -1 } else { 0 }, 0),
                1 => o.transform(0, 1),
                2 => o.transform(1, 0),
                _ => o.transform(0, -1),
            },
            _ => o.transform(self.width >> 1, self.length >> 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::GridCollision;

    fn resolve(kind: ObjectType, rot: u8, def: ObjectDef, at: Tile) -> ObjectFootprint {
        let obj = ObjectInstance::new(def.id, at, rot, kind);
        ObjectFootprint::resolve(&obj, &def, &GridCollision::new())
    }

    #[test]
    fn clip_mask_rotation_has_order_four() {
        for mask in 0u8..16 {
            let mut m = mask;
            for _ in 0..4 { m = rotate_clip_mask(m, 1); }
            assert_eq!(m, mask, "mask {mask:#x}");
            assert_eq!(rotate_clip_mask(mask, 0), mask);
            assert_eq!(rotate_clip_mask(rotate_clip_mask(mask, 1), 3), mask);
        }
        assert_eq!(rotate_clip_mask(CLIP_NORTH, 1), CLIP_EAST);
        assert_eq!(rotate_clip_mask(CLIP_WEST, 1), CLIP_NORTH);
        assert_eq!(rotate_clip_mask(CLIP_NORTH, 7), 0xF);
    }

    #[test]
    fn plain_one_by_one_borders_are_its_eight_neighbours() {
        let fp = resolve(ObjectType::Plain, 0, ObjectDef::new(1, 1, 1, 0), Tile::new(10, 10));
        let tiles = fp.border_tiles();
        assert_eq!(tiles.len(), 8);
        for t in &tiles {
            assert_eq!(t.distance(Tile::new(10, 10)), 1);
        }
        assert!(!fp.accepts(Tile::new(10, 10)));
    }

    #[test]
    fn interactable_drops_corners() {
        let fp = resolve(ObjectType::Interactable, 0, ObjectDef::new(1, 2, 2, 0), Tile::new(0, 0));
        let tiles = fp.border_tiles();
        // 4x4 ring minus 2x2 interior minus 4 corners
        assert_eq!(tiles.len(), 8);
        assert!(fp.is_blocked(Tile::new(-1, -1)));
        assert!(fp.is_blocked(Tile::new(2, 2)));
        assert!(fp.accepts(Tile::new(-1, 0)));
    }

    #[test]
    fn interactable_respects_walls_facing_the_object() {
        let mut grid = GridCollision::new();
        // Wall on the east edge of (-1,0), i.e. between it and the object.
        grid.add_wall(Tile::new(-1, 0), Direction::East, false);
        let def = ObjectDef::new(1, 1, 1, 0);
        let obj = ObjectInstance::new(1, Tile::new(0, 0), 0, ObjectType::Interactable);
        let fp = ObjectFootprint::resolve(&obj, &def, &grid);
        assert!(!fp.accepts(Tile::new(-1, 0)));
        assert!(fp.accepts(Tile::new(1, 0)));
        assert_eq!(fp.border_tiles().len(), 3);
    }

    #[test]
    fn clip_mask_strips_follow_rotation() {
        // 2x1 def rotated once becomes 1x2; north bit rotates to east.
        let fp = resolve(ObjectType::Plain, 1, ObjectDef::new(1, 2, 1, CLIP_NORTH), Tile::new(5, 5));
        assert_eq!(fp.size(), (1, 2));
        assert!(fp.is_blocked(Tile::new(6, 5)));
        assert!(fp.is_blocked(Tile::new(6, 6)));
        assert!(!fp.is_blocked(Tile::new(5, 7)));
        assert!(fp.accepts(Tile::new(4, 5)));
    }

    #[test]
    fn lengthwise_wall_rotation_one_accepts_only_its_pair() {
        let at = Tile::new(20, 20);
        let fp = resolve(ObjectType::LengthwiseWall, 1, ObjectDef::new(1, 1, 1, 0), at);
        let tiles = fp.border_tiles();
        assert_eq!(tiles, vec![at, at.transform(0, 1)]);
        for x in -1..=1 {
            for z in -1..=1 {
                let t = at.transform(x, z);
                if t != at && t != at.transform(0, 1) {
                    assert!(!fp.accepts(t), "{t} should be rejected");
                }
            }
        }
    }

    #[test]
    fn lengthwise_wall_rotations_are_distinct() {
        let at = Tile::new(0, 0);
        let def = ObjectDef::new(1, 1, 1, 0);
        let r0 = resolve(ObjectType::LengthwiseWall, 0, def.clone(), at).border_tiles();
        let r2 = resolve(ObjectType::LengthwiseWall, 2, def.clone(), at).border_tiles();
        let r3 = resolve(ObjectType::LengthwiseWall, 3, def.clone(), at).border_tiles();
        assert_eq!(r0.len(), 6);
        assert_eq!(r2, vec![at, at.transform(1, 0)]);
        assert_eq!(r3, vec![at.transform(-1, 0), at.transform(0, -1), at]);
        assert!(resolve(ObjectType::LengthwiseWall, 5, def, at).border_tiles().is_empty());
    }

    #[test]
    fn wall_decorations_accept_only_own_tile() {
        let at = Tile::new(3, 3);
        for kind in [ObjectType::WallDecoration, ObjectType::InteractableWall] {
            let fp = resolve(kind, 2, ObjectDef::new(1, 1, 1, 0), at);
            assert_eq!(fp.border_tiles(), vec![at]);
        }
    }

    #[test]
    fn facing_uses_centroid_or_wall_rules() {
        let fp = resolve(ObjectType::Plain, 0, ObjectDef::new(1, 3, 2, 0), Tile::new(10, 10));
        assert_eq!(fp.facing_tile(Tile::new(9, 9)), Tile::new(11, 11));

        let door = resolve(ObjectType::LengthwiseWall, 0, ObjectDef::new(2, 1, 1, 0), Tile::new(10, 10));
        assert_eq!(door.facing_tile(Tile::new(10, 10)), Tile::new(9, 10));
        assert_eq!(door.facing_tile(Tile::new(9, 10)), Tile::new(10, 10));
        let door3 = resolve(ObjectType::LengthwiseWall, 3, ObjectDef::new(2, 1, 1, 0), Tile::new(10, 10));
        assert_eq!(door3.facing_tile(Tile::new(10, 10)), Tile::new(10, 9));
    }

    #[test]
    fn ring_faces_point_back_at_the_object() {
        assert_eq!(ring_face(-1, 0, 1, 1), Some(Direction::East));
        assert_eq!(ring_face(1, 0, 1, 1), Some(Direction::West));
        assert_eq!(ring_face(0, -1, 1, 1), Some(Direction::North));
        assert_eq!(ring_face(0, 1, 1, 1), Some(Direction::South));
        assert_eq!(ring_face(-1, -1, 1, 1), Some(Direction::SouthWest));
        assert_eq!(ring_face(1, 1, 1, 1), Some(Direction::NorthEast));
        assert_eq!(ring_face(0, 0, 1, 1), None);
    }
}
