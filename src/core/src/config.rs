use std::path::PathBuf;

use serde::Deserialize;

use crate::paths::{tutor_config_path, tutor_db_path, tutor_home_dir, user_home_dir};

/// Default size bound, matching common browser storage quotas.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TutorConfig {
    pub version: u32,
    pub storage: StorageConfig,
    pub debug: DebugConfig,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            version: 1,
            storage: StorageConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl TutorConfig {
    /// Read `config.toml` from the tutor home, or defaults when it is absent.
    pub fn load() -> Result<Self, String> {
        let path = tutor_config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| format!("read config.toml: {e}"))?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, String> {
        toml::from_str(raw).map_err(|e| format!("parse config.toml: {e}"))
    }

    pub fn debug_enabled(&self) -> bool {
        matches!(
            std::env::var(&self.debug.debug_env).as_deref(),
            Ok("1" | "true" | "TRUE" | "yes" | "YES")
        )
    }
}

/// Which key-value backend a profile opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    Sqlite,
    Memory,
    /// No storage at all; every store degrades to empty no-ops.
    None,
}

impl BackendKind {
    pub fn from_label(s: &str) -> Option<Self> {
        match s {
            "sqlite" => Some(Self::Sqlite),
            "memory" => Some(Self::Memory),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: BackendKind,
    /// Database file for the sqlite backend; relative paths resolve against
    /// the tutor home.
    pub path: Option<String>,
    /// Upper bound on stored bytes; 0 disables the bound.
    pub quota_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::Sqlite,
            path: None,
            quota_bytes: DEFAULT_QUOTA_BYTES,
        }
    }
}

impl StorageConfig {
    pub fn db_path(&self) -> Result<PathBuf, String> {
        match self.path.as_deref() {
            Some(path) => resolve_path(path),
            None => tutor_db_path(),
        }
    }

    pub fn quota(&self) -> Option<usize> {
        (self.quota_bytes > 0).then_some(self.quota_bytes)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    pub debug_env: String,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            debug_env: "TUTOR_DEBUG".to_string(),
        }
    }
}

fn resolve_path(value: &str) -> Result<PathBuf, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("path override is empty".to_string());
    }
    if trimmed == "~" {
        return user_home_dir().ok_or_else(|| "failed to resolve user home".to_string());
    }
    if let Some(rest) = trimmed.strip_prefix("~/") {
        if let Some(home) = user_home_dir() {
            return Ok(home.join(rest));
        }
    }
    let path = PathBuf::from(trimmed);
    if path.is_relative() {
        return Ok(tutor_home_dir()?.join(path));
    }
    Ok(path)
}
