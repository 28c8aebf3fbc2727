use serde::{Deserialize, Serialize};

use crate::geometry::Tile;

pub const DEFAULT_MAX_EXPANSIONS: u64 = 256 * 10;

/// Metric used when locally reordering candidate directions during a search.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionOrder {
    /// max(|dx|, |dz|)
    #[default]
    Chebyshev,
    /// |dx| + |dz|; penalises diagonal candidates by one.
    Manhattan,
}

impl DirectionOrder {
    #[inline]
    pub fn measure(self, a: Tile, b: Tile) -> i32 {
        match self {
            DirectionOrder::Chebyshev => a.distance(b),
            DirectionOrder::Manhattan => a.delta(b),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Nodes polled before the search gives up and falls back to the closest approach.
    pub max_expansions: u64,
    /// Optional bound on how far (Chebyshev) from the start candidates may be.
    pub max_radius: Option<i32>,
    pub order: DirectionOrder,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self { max_expansions: DEFAULT_MAX_EXPANSIONS, max_radius: None, order: DirectionOrder::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_bound_search_at_2560() {
        let o = SearchOptions::default();
        assert_eq!(o.max_expansions, 2560);
        assert_eq!(o.max_radius, None);
        assert_eq!(o.order, DirectionOrder::Chebyshev);
    }

    #[test]
    fn deserializes_with_defaults_when_missing_fields() {
        let o: SearchOptions = serde_json::from_value(json!({ "max_expansions": 10 })).unwrap();
        assert_eq!(o.max_expansions, 10);
        assert_eq!(o.order, DirectionOrder::Chebyshev);

        let o2: SearchOptions = serde_json::from_value(json!({ "order": "manhattan", "max_radius": 16 })).unwrap();
        assert_eq!(o2.order, DirectionOrder::Manhattan);
        assert_eq!(o2.max_radius, Some(16));
        assert_eq!(o2.max_expansions, DEFAULT_MAX_EXPANSIONS);
    }

    #[test]
    fn metrics_differ_on_diagonals() {
        let a = Tile::new(0, 0);
        let b = Tile::new(1, 1);
        assert_eq!(DirectionOrder::Chebyshev.measure(a, b), 1);
        assert_eq!(DirectionOrder::Manhattan.measure(a, b), 2);
    }
}
