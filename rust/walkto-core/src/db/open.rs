use std::env;
use std::fmt::{Display, Formatter};
use std::path::Path;

use rusqlite::{Connection, OpenFlags};

/// PRAGMA toggles applied when opening a world database.
#[derive(Clone, Debug)]
pub struct DbOpenConfig {
    /// If true, set PRAGMA query_only=ON.
    pub query_only: bool,
    /// If Some(kb) and kb > 0, set PRAGMA cache_size = -kb (KB units).
    pub cache_size_kb: Option<i64>,
    pub mmap_size_bytes: Option<i64>,
    pub temp_store: Option<TempStore>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TempStore { Memory, File }

impl Display for TempStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self { TempStore::Memory => write!(f, "MEMORY"), TempStore::File => write!(f, "FILE"), }
    }
}

impl Default for DbOpenConfig {
    fn default() -> Self {
        // World files are small next to a full map dump; keep the page cache modest.
        Self { query_only: true, cache_size_kb: Some(32_000), mmap_size_bytes: None, temp_store: Some(TempStore::Memory) }
    }
}

impl DbOpenConfig {
    /// Missing or invalid values fall back to defaults.
    ///
    /// - WALKTO_SQLITE_QUERY_ONLY: "1"/"0" (default 1)
    /// - WALKTO_SQLITE_CACHE_SIZE_KB: integer KB; 0 disables
    /// - WALKTO_SQLITE_MMAP_SIZE: integer bytes; 0 disables
    /// - WALKTO_SQLITE_TEMP_STORE: "MEMORY" or "FILE"; anything else disables
    pub fn from_env() -> Self {
        Self::from_lookup(|k| env::var(k).ok())
    }

    pub(crate) fn from_lookup<F: Fn(&str) -> Option<String>>(get: F) -> Self {
        let mut cfg = Self::default();
        if let Some(v) = get("WALKTO_SQLITE_QUERY_ONLY") { cfg.query_only = v.trim() != "0"; }
        if let Some(v) = get("WALKTO_SQLITE_CACHE_SIZE_KB") {
            cfg.cache_size_kb = v.trim().parse::<i64>().ok().filter(|n| *n > 0);
        }
        if let Some(v) = get("WALKTO_SQLITE_MMAP_SIZE") {
            cfg.mmap_size_bytes = v.trim().parse::<i64>().ok().filter(|n| *n > 0);
        }
        if let Some(v) = get("WALKTO_SQLITE_TEMP_STORE") {
            cfg.temp_store = match v.trim().to_ascii_uppercase().as_str() {
                "MEMORY" => Some(TempStore::Memory),
                "FILE" => Some(TempStore::File),
                _ => None,
            };
        }
        cfg
    }
}

/// Opens read-only where the platform allows it, then applies PRAGMAs. PRAGMA errors are ignored.
pub fn open_read_only_with_config<P: AsRef<Path>>(path: P, cfg: &DbOpenConfig) -> rusqlite::Result<Connection> {
    let path_ref = path.as_ref();
    let conn = match Connection::open_with_flags(path_ref, OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI) {
        Ok(c) => c,
        Err(_) => Connection::open_with_flags(path_ref, OpenFlags::SQLITE_OPEN_READ_ONLY)?,
    };
    apply_pragmas(&conn, cfg);
    Ok(conn)
}

fn apply_pragmas(conn: &Connection, cfg: &DbOpenConfig) {
    if cfg.query_only { let _ = conn.execute_batch("PRAGMA query_only = ON"); }
    if let Some(kb) = cfg.cache_size_kb { let _ = conn.execute_batch(&format!("PRAGMA cache_size = -{}", kb)); }
    if let Some(bytes) = cfg.mmap_size_bytes { let _ = conn.execute_batch(&format!("PRAGMA mmap_size = {}", bytes)); }
    if let Some(ts) = cfg.temp_store { let _ = conn.execute_batch(&format!("PRAGMA temp_store = {}", ts)); }
}
