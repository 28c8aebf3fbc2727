use serde::{Deserialize, Serialize};

use crate::collision::{CollisionMap, TraversalType};
use crate::geometry::{Direction, Tile};

pub mod bfs;

pub use bfs::{BfsPathfinder, SearchOutcome};

/// Everything a single route calculation needs besides collision and the border predicate.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRequest {
    pub start: Tile,
    pub end: Tile,
    #[serde(default = "one")]
    pub source_width: i32,
    #[serde(default = "one")]
    pub source_length: i32,
    #[serde(default)]
    pub traversal: TraversalType,
    #[serde(default)]
    pub target_width: i32,
    #[serde(default)]
    pub target_length: i32,
}

fn one() -> i32 { 1 }

impl PathRequest {
    /// A 1x1 walker heading for exactly `end`.
    pub fn new(start: Tile, end: Tile) -> Self {
        Self {
            start,
            end,
            source_width: 1,
            source_length: 1,
            traversal: TraversalType::Walk,
            target_width: 0,
            target_length: 0,
        }
    }

    pub fn with_source_size(mut self, width: i32, length: i32) -> Self {
        self.source_width = width;
        self.source_length = length;
        self
    }

    pub fn with_target_size(mut self, width: i32, length: i32) -> Self {
        self.target_width = width;
        self.target_length = length;
        self
    }

    pub fn with_traversal(mut self, traversal: TraversalType) -> Self {
        self.traversal = traversal;
        self
    }

    pub fn has_target_footprint(&self) -> bool { self.target_width > 0 || self.target_length > 0 }
}

/// Whether a `width` x `length` mover anchored at `from` can take one step in
/// `direction`: every occupied cell must be able to leave, and every cell it
/// lands on must accept entry from the opposite side.
pub fn footprint_can_step<C: CollisionMap + ?Sized>(
    collision: &C,
    from: Tile,
    direction: Direction,
    width: i32,
    length: i32,
    traversal: TraversalType,
) -> bool {
    let to = from.step(direction);
    let back = direction.opposite();
    for x in 0..width.max(1) {
        for z in 0..length.max(1) {
            if !collision.can_traverse(from.transform(x, z), direction, traversal)
                || !collision.can_traverse(to.transform(x, z), back, traversal)
            {
                return false;
            }
        }
    }
    true
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Steps to take, start tile excluded.
    pub path: Vec<Tile>,
    /// False when the path is only the closest approach.
    pub success: bool,
    pub expanded: u64,
}

impl Route {
    pub fn last(&self) -> Option<Tile> { self.path.last().copied() }

    pub fn len(&self) -> usize { self.path.len() }

    pub fn is_empty(&self) -> bool { self.path.is_empty() }

    /// Neither arrived nor got any closer.
    pub fn is_unreachable(&self) -> bool { !self.success && self.path.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_defaults_to_single_tile_walker() {
        let req: PathRequest = serde_json::from_value(json!({
            "start": {"x": 1, "z": 2},
            "end": {"x": 3, "z": 4, "height": 0}
        })).unwrap();
        assert_eq!(req, PathRequest::new(Tile::new(1, 2), Tile::new(3, 4)));
        assert!(!req.has_target_footprint());
    }

    #[test]
    fn partial_route_is_not_unreachable() {
        let r = Route { path: vec![Tile::new(1, 0)], success: false, expanded: 3 };
        assert!(!r.is_unreachable());
        assert_eq!(r.last(), Some(Tile::new(1, 0)));
        assert!(Route::default().is_unreachable());
    }
}
