use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, Row};
use thiserror::Error;

use crate::collision::GridCollision;
use crate::db::queries::*;
use crate::geometry::Tile;
use crate::object::{DefinitionLoader, ObjectDef, ObjectInstance, ObjectType};

pub mod open;
pub mod queries;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Read-only handle on a world database.
pub struct Database {
    conn: Connection,
}

fn is_no_such_table(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(_, Some(msg)) => msg.contains("no such table"),
        _ => false,
    }
}

fn map_object_def(r: &Row) -> Result<ObjectDef, DbError> {
    let id: i64 = r.get("id")?;
    let width: i32 = r.get("width")?;
    let length: i32 = r.get("length")?;
    let clip_mask: i64 = r.get("clip_mask")?;
    let solid: bool = r.get("solid")?;
    let id = u32::try_from(id).map_err(|_| DbError::Corrupt(format!("object_defs.id {}", id)))?;
    if width < 1 || length < 1 {
        return Err(DbError::Corrupt(format!("object_defs {} has size {}x{}", id, width, length)));
    }
    let clip_mask = u8::try_from(clip_mask)
        .ok()
        .filter(|m| *m <= 0xF)
        .ok_or_else(|| DbError::Corrupt(format!("object_defs {} clip_mask {}", id, clip_mask)))?;
    Ok(ObjectDef { id, width, length, clip_mask, solid })
}

fn map_object(r: &Row) -> Result<ObjectInstance, DbError> {
    let id: i64 = r.get("id")?;
    let tile = Tile::with_height(r.get("x")?, r.get("z")?, r.get("height")?);
    let rot: i64 = r.get("rot")?;
    let kind: i64 = r.get("type")?;
    let id = u32::try_from(id).map_err(|_| DbError::Corrupt(format!("objects.id {}", id)))?;
    let rotation = u8::try_from(rot).map_err(|_| DbError::Corrupt(format!("object {} at {} rot {}", id, tile, rot)))?;
    let kind = u8::try_from(kind).map_err(|_| DbError::Corrupt(format!("object {} at {} type {}", id, tile, kind)))?;
    Ok(ObjectInstance::new(id, tile, rotation, ObjectType::from_raw(kind)))
}

impl Database {
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self, DbError> {
        let cfg = open::DbOpenConfig::from_env();
        let conn = open::open_read_only_with_config(path, &cfg)?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self { Self { conn } }

    /// Collision flags for one height level. A world without a collision table is open ground.
    pub fn load_collision(&self, height: i32) -> Result<GridCollision, DbError> {
        let mut grid = GridCollision::new();
        let mut stmt = match self.conn.prepare_cached(COLLISION_BY_HEIGHT) {
            Ok(s) => s,
            Err(e) if is_no_such_table(&e) => return Ok(grid),
            Err(e) => return Err(e.into()),
        };
        let mut rows = stmt.query(params![height])?;
        while let Some(r) = rows.next()? {
            let tile = Tile::with_height(r.get("x")?, r.get("z")?, r.get("height")?);
            let flags: i64 = r.get("flags")?;
            let flags = u32::try_from(flags).map_err(|_| DbError::Corrupt(format!("collision at {} flags {}", tile, flags)))?;
            grid.set_flags(tile, flags);
        }
        Ok(grid)
    }

    pub fn fetch_object_def(&self, id: u32) -> Result<Option<ObjectDef>, DbError> {
        let mut stmt = self.conn.prepare_cached(OBJECT_DEF_BY_ID)?;
        let mut rows = stmt.query(params![id])?;
        match rows.next()? {
            Some(r) => Ok(Some(map_object_def(r)?)),
            None => Ok(None),
        }
    }

    pub fn iter_objects(&self, height: i32) -> Result<Vec<ObjectInstance>, DbError> {
        let mut stmt = match self.conn.prepare_cached(OBJECTS_BY_HEIGHT) {
            Ok(s) => s,
            Err(e) if is_no_such_table(&e) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut rows = stmt.query(params![height])?;
        let mut out = Vec::new();
        while let Some(r) = rows.next()? {
            out.push(map_object(r)?);
        }
        Ok(out)
    }

    pub fn objects_at(&self, tile: Tile) -> Result<Vec<ObjectInstance>, DbError> {
        let mut stmt = self.conn.prepare_cached(OBJECTS_AT)?;
        let mut rows = stmt.query(params![tile.x, tile.z, tile.height])?;
        let mut out = Vec::new();
        while let Some(r) = rows.next()? {
            out.push(map_object(r)?);
        }
        Ok(out)
    }

    /// Whether the definitions table exists at all.
    pub fn has_definitions(&self) -> Result<bool, DbError> {
        let found: Option<String> = self
            .conn
            .query_row("SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'object_defs'", [], |r| r.get(0))
            .optional()?;
        Ok(found.is_some())
    }

    #[cfg(test)]
    pub fn conn(&self) -> &Connection { &self.conn }
}

impl DefinitionLoader for Database {
    fn load(&mut self, id: u32) -> Result<Option<ObjectDef>, DbError> { self.fetch_object_def(id) }
}
