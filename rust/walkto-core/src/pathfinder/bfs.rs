//! Bounded breadth-first route search.
//!
//! Candidates at each expansion are visited in the canonical direction order,
//! stably re-sorted by `d(candidate, end) + d(candidate, current)`. That local
//! reorder decides which of several equal-length paths wins and is visible to
//! players, so it is kept as-is rather than swapped for a real heuristic.

use std::collections::VecDeque;

use itertools::Itertools;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{trace, warn};

use super::{footprint_can_step, PathRequest, Route};
use crate::collision::CollisionMap;
use crate::geometry::{Direction, Tile};
use crate::options::SearchOptions;

#[derive(Copy, Clone, Debug)]
struct Node {
    tile: Tile,
    parent: Option<usize>,
    cost: u32,
}

/// A route plus every tile the search discovered, in discovery order.
#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub route: Route,
    pub explored: Vec<Tile>,
}

pub struct BfsPathfinder<'a, C: CollisionMap + ?Sized> {
    collision: &'a C,
    options: &'a SearchOptions,
}

impl<'a, C: CollisionMap + ?Sized> BfsPathfinder<'a, C> {
    pub fn new(collision: &'a C, options: &'a SearchOptions) -> Self { Self { collision, options } }

    pub fn find_route<F>(&self, request: &PathRequest, accepts: F) -> Route
    where
        F: Fn(Tile) -> bool,
    {
        self.search(request, accepts).route
    }

    pub fn search<F>(&self, request: &PathRequest, accepts: F) -> SearchOutcome
    where
        F: Fn(Tile) -> bool,
    {
        let start = request.start;
        let end = request.end;
        let goals = acceptance_set(request, &accepts);

        let mut nodes: Vec<Node> = vec![Node { tile: start, parent: None, cost: 0 }];
        let mut closed: FxHashMap<(i32, i32), usize> = FxHashMap::default();
        closed.insert(start.planar(), 0);
        let mut frontier: VecDeque<usize> = VecDeque::from([0]);

        let mut expanded: u64 = 0;
        let mut tail: Option<usize> = None;

        while let Some(&head_idx) = frontier.front() {
            if expanded >= self.options.max_expansions {
                warn!(
                    start = %start, end = %end, distance = start.distance(end), expanded,
                    "search budget exhausted before reaching target"
                );
                break;
            }
            frontier.pop_front();
            expanded += 1;

            let head = nodes[head_idx];
            if goals.contains(&head.tile.planar()) {
                tail = Some(head_idx);
                break;
            }

            for direction in self.ordered_directions(head.tile, end) {
                let next = head.tile.step(direction);
                if closed.contains_key(&next.planar()) {
                    continue;
                }
                if let Some(radius) = self.options.max_radius {
                    if !start.within_radius(next, radius) {
                        continue;
                    }
                }
                if !footprint_can_step(
                    self.collision, head.tile, direction, request.source_width, request.source_length, request.traversal,
                ) {
                    continue;
                }
                let idx = nodes.len();
                nodes.push(Node { tile: next, parent: Some(head_idx), cost: head.cost + 1 });
                closed.insert(next.planar(), idx);
                frontier.push_back(idx);
            }
        }

        let success = tail.is_some();
        let tail = tail.or_else(|| closest_approach(&nodes, start, end));
        let path = unwind(&nodes, tail);
        trace!(success, expanded, steps = path.len(), explored = nodes.len(), "route search finished");

        SearchOutcome {
            route: Route { path, success, expanded },
            explored: nodes.iter().map(|n| n.tile).collect(),
        }
    }

    fn ordered_directions(&self, current: Tile, end: Tile) -> impl Iterator<Item = Direction> {
        let order = self.options.order;
        Direction::RS_ORDER.into_iter().sorted_by_key(move |&d| {
            let candidate = current.step(d);
            order.measure(candidate, end) + order.measure(candidate, current)
        })
    }
}

fn acceptance_set<F: Fn(Tile) -> bool>(request: &PathRequest, accepts: &F) -> FxHashSet<(i32, i32)> {
    let mut goals = FxHashSet::default();
    if request.has_target_footprint() {
        for x in -1..=request.target_width {
            for z in -1..=request.target_length {
                let tile = request.end.transform(x, z);
                if accepts(tile) {
                    goals.insert(tile.planar());
                }
            }
        }
    } else {
        goals.insert(request.end.planar());
    }
    goals
}

/// Closest discovered node to `end`; ties go to the one nearest `start`, then to
/// the earliest discovered.
fn closest_approach(nodes: &[Node], start: Tile, end: Tile) -> Option<usize> {
    nodes
        .iter()
        .enumerate()
        .min_by_key(|(_, n)| (n.tile.distance(end), n.tile.delta(start)))
        .map(|(i, _)| i)
}

fn unwind(nodes: &[Node], tail: Option<usize>) -> Vec<Tile> {
    let mut path = Vec::new();
    let mut cursor = tail;
    while let Some(idx) = cursor {
        let node = nodes[idx];
        if node.parent.is_none() {
            break;
        }
        path.push(node.tile);
        cursor = node.parent;
    }
    path.reverse();
    path
}
