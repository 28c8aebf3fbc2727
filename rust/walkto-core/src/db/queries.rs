pub const COLLISION_BY_HEIGHT: &str = "SELECT x, z, height, flags FROM collision WHERE height = ?1 ORDER BY z ASC, x ASC";

pub const OBJECT_DEF_BY_ID: &str = "SELECT id, width, length, clip_mask, solid FROM object_defs WHERE id = ?1";

pub const OBJECTS_BY_HEIGHT: &str = "SELECT id, x, z, height, rot, type FROM objects WHERE height = ?1 ORDER BY z ASC, x ASC, id ASC";

pub const OBJECTS_AT: &str = "SELECT id, x, z, height, rot, type FROM objects WHERE x = ?1 AND z = ?2 AND height = ?3 ORDER BY id ASC";
