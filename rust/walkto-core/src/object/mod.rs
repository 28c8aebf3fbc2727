//! World objects: placed instances and their immutable definitions.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::geometry::Tile;

pub mod cache;

pub use cache::{DefinitionCache, DefinitionCacheConfig, DefinitionLoader};

/// Object shape classes that change how footprints are derived.
/// Raw codes follow the engine's object type ids.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    LengthwiseWall,
    WallDecoration,
    InteractableWall,
    DiagonalInteractable,
    Interactable,
    Plain,
}

impl ObjectType {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => ObjectType::LengthwiseWall,
            4 => ObjectType::WallDecoration,
            5 => ObjectType::InteractableWall,
            10 => ObjectType::DiagonalInteractable,
            11 => ObjectType::Interactable,
            _ => ObjectType::Plain,
        }
    }

    pub fn raw(self) -> u8 {
        match self {
            ObjectType::LengthwiseWall => 0,
            ObjectType::WallDecoration => 4,
            ObjectType::InteractableWall => 5,
            ObjectType::DiagonalInteractable => 10,
            ObjectType::Interactable => 11,
            ObjectType::Plain => 22,
        }
    }

    /// Types whose surrounding ring is filtered by diagonal faces and walls.
    pub fn blocks_diagonal_approach(self) -> bool {
        matches!(self, ObjectType::DiagonalInteractable | ObjectType::Interactable)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDef {
    pub id: u32,
    pub width: i32,
    pub length: i32,
    /// Bits: north=1, east=2, south=4, west=8.
    pub clip_mask: u8,
    #[serde(default = "default_solid")]
    pub solid: bool,
}

fn default_solid() -> bool { true }

impl ObjectDef {
    pub fn new(id: u32, width: i32, length: i32, clip_mask: u8) -> Self {
        Self { id, width, length, clip_mask, solid: true }
    }

    /// Width and length after applying `rotation`; odd rotations swap the axes.
    pub fn effective_size(&self, rotation: u8) -> (i32, i32) {
        if rotation == 1 || rotation == 3 { (self.length, self.width) } else { (self.width, self.length) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectInstance {
    pub id: u32,
    pub tile: Tile,
    pub rotation: u8,
    #[serde(rename = "type")]
    pub kind: ObjectType,
}

impl ObjectInstance {
    pub fn new(id: u32, tile: Tile, rotation: u8, kind: ObjectType) -> Self {
        Self { id, tile, rotation, kind }
    }
}

/// Read access to object definitions. Implementations are expected to cache.
pub trait ObjectDefinitions: Send + Sync {
    fn get(&self, id: u32) -> Option<Arc<ObjectDef>>;
}

/// Fixed in-memory definition table.
#[derive(Clone, Debug, Default)]
pub struct StaticDefinitions {
    defs: FxHashMap<u32, Arc<ObjectDef>>,
}

impl StaticDefinitions {
    pub fn new() -> Self { Self::default() }

    pub fn insert(&mut self, def: ObjectDef) {
        self.defs.insert(def.id, Arc::new(def));
    }

    pub fn with(mut self, def: ObjectDef) -> Self {
        self.insert(def);
        self
    }

    pub fn len(&self) -> usize { self.defs.len() }

    pub fn is_empty(&self) -> bool { self.defs.is_empty() }
}

impl FromIterator<ObjectDef> for StaticDefinitions {
    fn from_iter<I: IntoIterator<Item = ObjectDef>>(iter: I) -> Self {
        let mut out = Self::new();
        for def in iter { out.insert(def); }
        out
    }
}

impl ObjectDefinitions for StaticDefinitions {
    fn get(&self, id: u32) -> Option<Arc<ObjectDef>> {
        self.defs.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_rotations_swap_dimensions() {
        let def = ObjectDef::new(1, 3, 1, 0);
        assert_eq!(def.effective_size(0), (3, 1));
        assert_eq!(def.effective_size(1), (1, 3));
        assert_eq!(def.effective_size(2), (3, 1));
        assert_eq!(def.effective_size(3), (1, 3));
    }

    #[test]
    fn raw_codes_round_trip_for_known_types() {
        for kind in [
            ObjectType::LengthwiseWall,
            ObjectType::WallDecoration,
            ObjectType::InteractableWall,
            ObjectType::DiagonalInteractable,
            ObjectType::Interactable,
            ObjectType::Plain,
        ] {
            assert_eq!(ObjectType::from_raw(kind.raw()), kind);
        }
        assert_eq!(ObjectType::from_raw(9), ObjectType::Plain);
    }

    #[test]
    fn solid_defaults_to_true_when_missing() {
        let def: ObjectDef = serde_json::from_str(r#"{"id":7,"width":2,"length":2,"clip_mask":0}"#).unwrap();
        assert!(def.solid);
    }
}
