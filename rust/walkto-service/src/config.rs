use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use walkto_core::options::DEFAULT_MAX_EXPANSIONS;

#[derive(Clone, Debug)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: Option<PathBuf>,
    pub tick: Duration,
    pub debug_objects: bool,
    pub max_expansions: u64,
    /// Height level loaded from the world database.
    pub height: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            db_path: None,
            tick: Duration::from_millis(600),
            debug_objects: false,
            max_expansions: DEFAULT_MAX_EXPANSIONS,
            height: 0,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|k| env::var(k).ok())
    }

    pub fn from_lookup<F: Fn(&str) -> Option<String>>(get: F) -> anyhow::Result<Self> {
        let mut cfg = Self::default();
        if let Some(v) = get("WALKTO_HOST") { cfg.host = v; }
        if let Some(v) = get("WALKTO_PORT") {
            cfg.port = v.trim().parse().with_context(|| format!("WALKTO_PORT={v}"))?;
        }
        cfg.db_path = get("WALKTO_DB").filter(|s| !s.is_empty()).map(PathBuf::from);
        if let Some(v) = get("WALKTO_TICK_MS") {
            let ms: u64 = v.trim().parse().with_context(|| format!("WALKTO_TICK_MS={v}"))?;
            anyhow::ensure!(ms > 0, "WALKTO_TICK_MS must be positive");
            cfg.tick = Duration::from_millis(ms);
        }
        if let Some(v) = get("WALKTO_DEBUG_OBJECTS") {
            cfg.debug_objects = matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
        }
        if let Some(v) = get("WALKTO_MAX_EXPANSIONS") {
            cfg.max_expansions = v.trim().parse().with_context(|| format!("WALKTO_MAX_EXPANSIONS={v}"))?;
        }
        if let Some(v) = get("WALKTO_HEIGHT") {
            cfg.height = v.trim().parse().with_context(|| format!("WALKTO_HEIGHT={v}"))?;
        }
        Ok(cfg)
    }

    pub fn addr(&self) -> String { format!("{}:{}", self.host, self.port) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_without_env() {
        let cfg = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.addr(), "127.0.0.1:8080");
        assert_eq!(cfg.tick, Duration::from_millis(600));
        assert_eq!(cfg.max_expansions, 2560);
        assert!(!cfg.debug_objects);
        assert!(cfg.db_path.is_none());
    }

    #[test]
    fn reads_overrides() {
        let cfg = Config::from_lookup(lookup(&[
            ("WALKTO_PORT", "9000"),
            ("WALKTO_TICK_MS", "50"),
            ("WALKTO_DEBUG_OBJECTS", "true"),
            ("WALKTO_DB", "/tmp/world.db"),
            ("WALKTO_HEIGHT", "1"),
        ])).unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.tick, Duration::from_millis(50));
        assert!(cfg.debug_objects);
        assert_eq!(cfg.db_path, Some(PathBuf::from("/tmp/world.db")));
        assert_eq!(cfg.height, 1);
    }

    #[test]
    fn rejects_garbage_numbers() {
        assert!(Config::from_lookup(lookup(&[("WALKTO_PORT", "eighty")])).is_err());
        assert!(Config::from_lookup(lookup(&[("WALKTO_TICK_MS", "0")])).is_err());
    }
}
