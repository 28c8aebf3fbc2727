//! Tile geometry, collision, object footprints and bounded route search.
//!
//! Everything here is synchronous and free of world state; the service crate
//! owns entities, ticks and interactions.

pub mod geometry;
pub mod collision;
pub mod object;
pub mod footprint;
pub mod options;
pub mod pathfinder;
pub mod db;

pub use collision::{CollisionMap, GridCollision, SharedCollision, TraversalType};
pub use footprint::ObjectFootprint;
pub use geometry::{Direction, Tile};
pub use object::{ObjectDef, ObjectDefinitions, ObjectInstance, ObjectType, StaticDefinitions};
pub use options::{DirectionOrder, SearchOptions};
pub use pathfinder::{BfsPathfinder, PathRequest, Route};

pub fn version() -> &'static str { env!("CARGO_PKG_VERSION") }

/// Resolves the object's footprint against `collision` and routes a mover of
/// `source_size` from `start` to the nearest tile that can interact with it,
/// searching on the mover's `traversal` layer.
pub fn route_to_object<C: CollisionMap + ?Sized>(
    collision: &C,
    options: &SearchOptions,
    start: Tile,
    source_size: (i32, i32),
    traversal: TraversalType,
    object: &ObjectInstance,
    def: &ObjectDef,
) -> (ObjectFootprint, Route) {
    let footprint = ObjectFootprint::resolve(object, def, collision);
    let (width, length) = footprint.size();
    let request = PathRequest::new(start, object.tile)
        .with_source_size(source_size.0, source_size.1)
        .with_target_size(width, length)
        .with_traversal(traversal);
    let route = BfsPathfinder::new(collision, options).find_route(&request, |t| footprint.accepts(t));
    (footprint, route)
}
