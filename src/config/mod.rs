use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::index::{DEFAULT_SUMMARY_LIMIT, IndexOptions};

pub const CONFIG_FILE_NAME: &str = "hwreport.toml";

#[derive(Debug, Clone, Serialize)]
pub struct EffectiveConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_path: Option<String>,
    pub paths: PathsConfig,
    pub index: IndexConfig,
    pub logs: LogsConfig,
}

/// Relative paths resolve against the working root.
#[derive(Debug, Clone, Serialize)]
pub struct PathsConfig {
    pub reports_dir: PathBuf,
    pub results_dir: PathBuf,
    pub site_index: PathBuf,
    pub database: PathBuf,
    pub catalog: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
pub struct IndexConfig {
    pub summary_limit: usize,
    pub database_title: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LogsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            paths: PathsConfig {
                reports_dir: PathBuf::from("data/reports"),
                results_dir: PathBuf::from("docs/results"),
                site_index: PathBuf::from("docs/index.md"),
                database: PathBuf::from("DATABASE.md"),
                catalog: PathBuf::from("docs/index.json"),
            },
            index: IndexConfig {
                summary_limit: DEFAULT_SUMMARY_LIMIT,
                database_title: "🖥️ M&E Hardware Compatibility Database".to_string(),
            },
            logs: LogsConfig::default(),
        }
    }
}

/// Absolute locations derived from an [`EffectiveConfig`] and a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub root: PathBuf,
    pub reports_dir: PathBuf,
    pub results_dir: PathBuf,
    pub site_index: PathBuf,
    pub database: PathBuf,
    pub catalog: PathBuf,
    pub logs_dir: Option<PathBuf>,
}

impl EffectiveConfig {
    pub fn layout(&self, root: &Path) -> Layout {
        let resolve = |p: &Path| root.join(p);
        Layout {
            root: root.to_path_buf(),
            reports_dir: resolve(&self.paths.reports_dir),
            results_dir: resolve(&self.paths.results_dir),
            site_index: resolve(&self.paths.site_index),
            database: resolve(&self.paths.database),
            catalog: resolve(&self.paths.catalog),
            logs_dir: self.logs.dir.as_deref().map(resolve),
        }
    }

    pub fn index_options(&self, layout: &Layout) -> IndexOptions {
        IndexOptions {
            results_dir: layout.results_dir.clone(),
            site_index: layout.site_index.clone(),
            database: layout.database.clone(),
            catalog: layout.catalog.clone(),
            summary_limit: self.index.summary_limit,
            database_title: self.index.database_title.clone(),
        }
    }
}

impl Layout {
    /// `path` relative to the root when it lives under it, for display.
    pub fn display(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| path.display().to_string())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    paths: Option<RawPathsConfig>,
    index: Option<RawIndexConfig>,
    logs: Option<RawLogsConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPathsConfig {
    reports_dir: Option<PathBuf>,
    results_dir: Option<PathBuf>,
    site_index: Option<PathBuf>,
    database: Option<PathBuf>,
    catalog: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawIndexConfig {
    summary_limit: Option<usize>,
    database_title: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLogsConfig {
    dir: Option<PathBuf>,
}

pub fn default_config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE_NAME)
}

/// Defaults, then the TOML file, then `HWREPORT_*` environment variables.
/// An explicitly named file must exist; the default one is optional.
pub fn load(config_path: Option<&Path>, root: &Path) -> Result<EffectiveConfig> {
    let mut cfg = EffectiveConfig::default();

    let (path, required) = match config_path {
        Some(p) => (p.to_path_buf(), true),
        None => (default_config_path(root), false),
    };

    if required || path.exists() {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let raw: RawConfig = toml::from_str(&s)
            .with_context(|| format!("failed to parse config file (TOML): {}", path.display()))?;
        apply_raw_config(&mut cfg, raw);
        cfg.config_path = Some(path.display().to_string());
    }

    apply_env_overrides(&mut cfg)?;

    Ok(cfg)
}

fn apply_raw_config(cfg: &mut EffectiveConfig, raw: RawConfig) {
    if let Some(paths) = raw.paths {
        if let Some(v) = paths.reports_dir {
            cfg.paths.reports_dir = v;
        }
        if let Some(v) = paths.results_dir {
            cfg.paths.results_dir = v;
        }
        if let Some(v) = paths.site_index {
            cfg.paths.site_index = v;
        }
        if let Some(v) = paths.database {
            cfg.paths.database = v;
        }
        if let Some(v) = paths.catalog {
            cfg.paths.catalog = v;
        }
    }

    if let Some(index) = raw.index {
        if let Some(v) = index.summary_limit {
            cfg.index.summary_limit = v;
        }
        if let Some(v) = index.database_title {
            cfg.index.database_title = v;
        }
    }

    if let Some(logs) = raw.logs {
        if let Some(dir) = logs.dir {
            cfg.logs.dir = Some(dir);
        }
    }
}

fn apply_env_overrides(cfg: &mut EffectiveConfig) -> Result<()> {
    if let Some(v) = env_path("HWREPORT_REPORTS_DIR") {
        cfg.paths.reports_dir = v;
    }
    if let Some(v) = env_path("HWREPORT_RESULTS_DIR") {
        cfg.paths.results_dir = v;
    }
    if let Some(v) = env_path("HWREPORT_SITE_INDEX") {
        cfg.paths.site_index = v;
    }
    if let Some(v) = env_path("HWREPORT_DATABASE") {
        cfg.paths.database = v;
    }
    if let Some(v) = env_path("HWREPORT_CATALOG") {
        cfg.paths.catalog = v;
    }
    if let Ok(v) = std::env::var("HWREPORT_INDEX_SUMMARY_LIMIT") {
        cfg.index.summary_limit = v
            .trim()
            .parse::<usize>()
            .with_context(|| "HWREPORT_INDEX_SUMMARY_LIMIT")?;
    }
    if let Some(v) = env_path("HWREPORT_LOGS_DIR") {
        cfg.logs.dir = Some(v);
    }

    Ok(())
}

fn env_path(name: &str) -> Option<PathBuf> {
    let v = std::env::var(name).ok()?;
    let v = v.trim();
    if v.is_empty() {
        None
    } else {
        Some(PathBuf::from(v))
    }
}
