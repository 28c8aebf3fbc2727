//! Tile coordinates and the eight compass directions.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tile {
    pub x: i32,
    pub z: i32,
    #[serde(default)]
    pub height: i32,
}

impl Tile {
    pub const fn new(x: i32, z: i32) -> Self { Self { x, z, height: 0 } }

    pub const fn with_height(x: i32, z: i32, height: i32) -> Self { Self { x, z, height } }

    #[inline]
    pub fn transform(self, dx: i32, dz: i32) -> Tile {
        Tile { x: self.x + dx, z: self.z + dz, height: self.height }
    }

    #[inline]
    pub fn step(self, direction: Direction) -> Tile {
        self.transform(direction.dx(), direction.dz())
    }

    /// Chebyshev distance, ignoring height.
    #[inline]
    pub fn distance(self, other: Tile) -> i32 {
        (self.x - other.x).abs().max((self.z - other.z).abs())
    }

    /// Manhattan distance, ignoring height.
    #[inline]
    pub fn delta(self, other: Tile) -> i32 {
        (self.x - other.x).abs() + (self.z - other.z).abs()
    }

    #[inline]
    pub fn within_radius(self, other: Tile, radius: i32) -> bool {
        self.distance(other) <= radius
    }

    /// Planar identity used by the pathfinder.
    #[inline]
    pub fn same_as(self, other: Tile) -> bool {
        self.x == other.x && self.z == other.z
    }

    #[inline]
    pub fn planar(self) -> (i32, i32) { (self.x, self.z) }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.z, self.height)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// Canonical order used as the stable tie-break while searching.
    pub const RS_ORDER: [Direction; 8] = [
        Direction::West,
        Direction::East,
        Direction::South,
        Direction::North,
        Direction::SouthWest,
        Direction::SouthEast,
        Direction::NorthWest,
        Direction::NorthEast,
    ];

    pub const CARDINALS: [Direction; 4] = [Direction::North, Direction::East, Direction::South, Direction::West];

    pub const fn dx(self) -> i32 {
        match self {
            Direction::East | Direction::NorthEast | Direction::SouthEast => 1,
            Direction::West | Direction::NorthWest | Direction::SouthWest => -1,
            Direction::North | Direction::South => 0,
        }
    }

    pub const fn dz(self) -> i32 {
        match self {
            Direction::North | Direction::NorthEast | Direction::NorthWest => 1,
            Direction::South | Direction::SouthEast | Direction::SouthWest => -1,
            Direction::East | Direction::West => 0,
        }
    }

    pub const fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
        }
    }

    pub const fn is_diagonal(self) -> bool {
        matches!(self, Direction::NorthEast | Direction::SouthEast | Direction::SouthWest | Direction::NorthWest)
    }

    /// The two cardinals a diagonal step is made of, (horizontal, vertical).
    /// Cardinals return themselves twice.
    pub const fn components(self) -> (Direction, Direction) {
        match self {
            Direction::NorthEast => (Direction::East, Direction::North),
            Direction::SouthEast => (Direction::East, Direction::South),
            Direction::SouthWest => (Direction::West, Direction::South),
            Direction::NorthWest => (Direction::West, Direction::North),
            d => (d, d),
        }
    }

    /// Direction of the single step from `from` that best heads toward `to`.
    /// None when both tiles share the same planar position.
    pub fn towards(from: Tile, to: Tile) -> Option<Direction> {
        Self::from_delta((to.x - from.x).signum(), (to.z - from.z).signum())
    }

    pub fn from_delta(dx: i32, dz: i32) -> Option<Direction> {
        let dir = match (dx.signum(), dz.signum()) {
            (0, 1) => Direction::North,
            (1, 1) => Direction::NorthEast,
            (1, 0) => Direction::East,
            (1, -1) => Direction::SouthEast,
            (0, -1) => Direction::South,
            (-1, -1) => Direction::SouthWest,
            (-1, 0) => Direction::West,
            (-1, 1) => Direction::NorthWest,
            _ => return None,
        };
        Some(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_is_chebyshev_and_delta_is_manhattan() {
        let a = Tile::new(0, 0);
        let b = Tile::new(3, -5);
        assert_eq!(a.distance(b), 5);
        assert_eq!(a.delta(b), 8);
        assert!(a.within_radius(b, 5));
        assert!(!a.within_radius(b, 4));
    }

    #[test]
    fn height_is_ignored_by_planar_identity() {
        let a = Tile::with_height(4, 4, 0);
        let b = Tile::with_height(4, 4, 2);
        assert!(a.same_as(b));
        assert_ne!(a, b);
        assert_eq!(a.distance(b), 0);
    }

    #[test]
    fn opposites_cancel_out() {
        for d in Direction::RS_ORDER {
            let t = Tile::new(7, 7).step(d).step(d.opposite());
            assert_eq!(t, Tile::new(7, 7));
            assert_eq!(d.opposite().opposite(), d);
            assert_eq!(d.is_diagonal(), d.opposite().is_diagonal());
        }
    }

    #[test]
    fn rs_order_covers_every_direction_once() {
        let mut seen = std::collections::HashSet::new();
        for d in Direction::RS_ORDER { assert!(seen.insert(d)); }
        assert_eq!(seen.len(), 8);
        assert_eq!(Direction::RS_ORDER.iter().filter(|d| d.is_diagonal()).count(), 4);
    }

    #[test]
    fn towards_picks_sign_of_delta() {
        let o = Tile::new(10, 10);
        assert_eq!(Direction::towards(o, Tile::new(10, 20)), Some(Direction::North));
        assert_eq!(Direction::towards(o, Tile::new(3, 2)), Some(Direction::SouthWest));
        assert_eq!(Direction::towards(o, Tile::with_height(10, 10, 1)), None);
        assert_eq!(Direction::NorthWest.components(), (Direction::West, Direction::North));
    }
}
