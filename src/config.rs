//! Global configuration for scrye.
//!
//! Resolution order, low to high precedence: built-in defaults, an optional
//! `config.json` (at `$SCRYE_CONFIG_PATH` or `~/.config/scrye/config.json`),
//! then `SCRYE_*` environment variables. All fields are optional in the
//! on-disk/env representation so partial configuration is possible; the
//! resolved view ([`ResolvedConfig`]) always carries concrete defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ScryeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indexing: Option<IndexingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IndexingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hamming_threshold: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct QueryConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_k: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_dir: Option<String>,
}

/// Fully resolved configuration: every field has a concrete value.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub batch_size: usize,
    pub hamming_threshold: u32,
    pub default_k: usize,
    pub log_level: String,
    pub default_index_dir: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            batch_size: 10_000,
            hamming_threshold: 2,
            default_k: 5,
            log_level: "info".to_string(),
            default_index_dir: PathBuf::from("index_dir"),
        }
    }
}

fn config_file_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("SCRYE_CONFIG_PATH") {
        return Some(PathBuf::from(custom));
    }
    dirs::config_dir().map(|d| d.join("scrye").join("config.json"))
}

fn load_file_config(path: &Path) -> Result<Option<ScryeConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let cfg: ScryeConfig = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(Some(cfg))
}

fn apply_env_overrides(mut cfg: ScryeConfig) -> ScryeConfig {
    let indexing = cfg.indexing.get_or_insert_with(IndexingConfig::default);
    if let Ok(val) = env::var("SCRYE_BATCH_SIZE") {
        if let Ok(n) = val.parse() {
            indexing.batch_size = Some(n);
        }
    }
    if let Ok(val) = env::var("SCRYE_HAMMING_THRESHOLD") {
        if let Ok(n) = val.parse() {
            indexing.hamming_threshold = Some(n);
        }
    }

    let query = cfg.query.get_or_insert_with(QueryConfig::default);
    if let Ok(val) = env::var("SCRYE_DEFAULT_K") {
        if let Ok(n) = val.parse() {
            query.default_k = Some(n);
        }
    }

    let defaults = cfg.defaults.get_or_insert_with(DefaultsConfig::default);
    if let Ok(val) = env::var("SCRYE_LOG_LEVEL") {
        defaults.log_level = Some(val);
    }
    if let Ok(val) = env::var("SCRYE_INDEX_DIR") {
        defaults.index_dir = Some(val);
    }

    cfg
}

fn resolve(cfg: ScryeConfig) -> ResolvedConfig {
    let base = ResolvedConfig::default();
    let indexing = cfg.indexing.unwrap_or_default();
    let query = cfg.query.unwrap_or_default();
    let defaults = cfg.defaults.unwrap_or_default();

    ResolvedConfig {
        batch_size: indexing.batch_size.unwrap_or(base.batch_size),
        hamming_threshold: indexing.hamming_threshold.unwrap_or(base.hamming_threshold),
        default_k: query.default_k.unwrap_or(base.default_k),
        log_level: defaults.log_level.unwrap_or(base.log_level),
        default_index_dir: defaults
            .index_dir
            .map(PathBuf::from)
            .unwrap_or(base.default_index_dir),
    }
}

/// Load and resolve configuration once per process.
pub fn get_config() -> &'static ResolvedConfig {
    static RESOLVED: OnceLock<ResolvedConfig> = OnceLock::new();
    RESOLVED.get_or_init(|| {
        let file_cfg = config_file_path()
            .and_then(|p| load_file_config(&p).ok().flatten())
            .unwrap_or_default();
        resolve(apply_env_overrides(file_cfg))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_any_override() {
        let resolved = resolve(ScryeConfig::default());
        assert_eq!(resolved.batch_size, 10_000);
        assert_eq!(resolved.hamming_threshold, 2);
        assert_eq!(resolved.default_k, 5);
    }

    #[test]
    fn file_values_fill_in_missing_fields() {
        let cfg = ScryeConfig {
            indexing: Some(IndexingConfig {
                batch_size: Some(500),
                hamming_threshold: None,
            }),
            query: None,
            defaults: None,
        };
        let resolved = resolve(cfg);
        assert_eq!(resolved.batch_size, 500);
        assert_eq!(resolved.hamming_threshold, 2);
    }
}
