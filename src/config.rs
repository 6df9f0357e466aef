use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MosaicError, Result};
use crate::iter::View;
use crate::layout::template::{Catalog, BUILTIN_CATALOG};
use crate::layout::{LayoutConfig, LayoutMode};

/// Everything a presenter needs to open layout sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MosaicConfig {
    pub layout: LayoutConfig,
    pub mode: LayoutMode,
    /// Smallest album preview window
    pub preview_min: usize,
    /// Largest album preview window
    pub preview_max: usize,
    /// Largest per-album window in day clusters
    pub cluster_max: usize,
    /// Seed for template draws and preview windows
    pub seed: u64,
    /// JSON template catalog replacing the built-in one
    pub catalog_path: Option<PathBuf>,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            mode: LayoutMode::Rows,
            preview_min: 2,
            preview_max: 5,
            cluster_max: 6,
            seed: 0x5eed,
            catalog_path: None,
        }
    }
}

impl MosaicConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: MosaicConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        tracing::info!("Loaded mosaic config from {}", path.display());
        Ok(config)
    }

    /// Apply `MOSAIC_*` environment overrides.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_vars(|key| env::var(key).ok())
    }

    fn apply_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(v) = lookup("MOSAIC_MIN_GROUP_WIDTH") {
            self.layout.min_group_width = parse("MOSAIC_MIN_GROUP_WIDTH", &v)?;
        }
        if let Some(v) = lookup("MOSAIC_MAX_GROUPS") {
            self.layout.max_groups_per_row = parse("MOSAIC_MAX_GROUPS", &v)?;
        }
        if let Some(v) = lookup("MOSAIC_MODE") {
            self.mode = match v.trim() {
                "rows" => LayoutMode::Rows,
                "gallery" => LayoutMode::Gallery,
                other => {
                    return Err(MosaicError::InvalidConfig {
                        key: "MOSAIC_MODE",
                        message: format!("expected 'rows' or 'gallery', got '{other}'"),
                    })
                }
            };
        }
        if let Some(v) = lookup("MOSAIC_SEED") {
            self.seed = parse("MOSAIC_SEED", &v)?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |key: &'static str, message: &str| MosaicError::InvalidConfig {
            key,
            message: message.to_string(),
        };
        if !(self.layout.min_group_width > 0.0) {
            return Err(invalid("min_group_width", "must be positive"));
        }
        if !(self.layout.row_height_ratio > 0.0) {
            return Err(invalid("row_height_ratio", "must be positive"));
        }
        if self.layout.max_groups_per_row == 0 || self.layout.gallery_max_groups == 0 {
            return Err(invalid("max_groups_per_row", "must be at least 1"));
        }
        if self.layout.selector.max_attempts == 0 {
            return Err(invalid("selector.max_attempts", "must be at least 1"));
        }
        if self.preview_min == 0 || self.preview_min > self.preview_max {
            return Err(invalid("preview_min", "must be between 1 and preview_max"));
        }
        Ok(())
    }

    /// The configured catalog, or the built-in one.
    pub fn catalog(&self) -> Result<Catalog> {
        match &self.catalog_path {
            Some(path) => Catalog::from_json(&std::fs::read_to_string(path)?),
            None => Ok(BUILTIN_CATALOG.clone()),
        }
    }

    pub fn preview_view(&self) -> View {
        View::Preview {
            min: self.preview_min,
            max: self.preview_max,
        }
    }

    pub fn days_view(&self) -> View {
        View::Days {
            max: self.cluster_max,
        }
    }
}

fn parse<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| MosaicError::InvalidConfig {
            key,
            message: e.to_string(),
        })
}
