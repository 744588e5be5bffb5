//! Dashboard configuration
//!
//! Optional JSON file; every field falls back to the built-in default.
//!
//! ```json
//! {
//!   "data_dir": "data",
//!   "files": { "health": "health.csv" },
//!   "viewport": { "width": 960, "height": 540 },
//!   "debounce_ms": 300,
//!   "initial": { "page": "behavior", "filters": { "day_type": "weekend" } }
//! }
//! ```

use crate::charts::Viewport;
use crate::debounce::DEFAULT_QUIET;
use crate::error::DashboardError;
use crate::loader::DatasetPaths;
use crate::state::{FilterSelection, Page};
use crate::types::Dataset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File-name overrides; unset entries use the dataset's default name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetFiles {
    pub health: Option<PathBuf>,
    pub behavior: Option<PathBuf>,
    pub social: Option<PathBuf>,
    pub global: Option<PathBuf>,
}

impl DatasetFiles {
    fn get(&self, dataset: Dataset) -> Option<&PathBuf> {
        match dataset {
            Dataset::Health => self.health.as_ref(),
            Dataset::Behavior => self.behavior.as_ref(),
            Dataset::Social => self.social.as_ref(),
            Dataset::Global => self.global.as_ref(),
        }
    }
}

/// Page and filters the dashboard opens with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialView {
    pub page: Page,
    pub filters: FilterSelection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub data_dir: PathBuf,
    pub files: DatasetFiles,
    pub viewport: Viewport,
    pub debounce_ms: u64,
    pub initial: InitialView,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            files: DatasetFiles::default(),
            viewport: Viewport::default(),
            debounce_ms: DEFAULT_QUIET.as_millis() as u64,
            initial: InitialView::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_json(json: &str) -> Result<Self, DashboardError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, DashboardError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json).map_err(|e| match e {
            DashboardError::JsonError(inner) => {
                DashboardError::Config(format!("{}: {inner}", path.display()))
            }
            other => other,
        })
    }

    pub fn to_json(&self) -> Result<String, DashboardError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), DashboardError> {
        let Viewport { width, height } = self.viewport;
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(DashboardError::Config(format!(
                "viewport must be positive, got {width}x{height}"
            )));
        }
        Ok(())
    }

    /// Resolved file locations: overrides are joined to `data_dir` unless absolute
    pub fn dataset_paths(&self) -> DatasetPaths {
        let mut paths = DatasetPaths::in_dir(&self.data_dir);
        for dataset in Dataset::ALL {
            if let Some(file) = self.files.get(dataset) {
                let resolved = self.data_dir.join(file);
                match dataset {
                    Dataset::Health => paths.health = resolved,
                    Dataset::Behavior => paths.behavior = resolved,
                    Dataset::Social => paths.social = resolved,
                    Dataset::Global => paths.global = resolved,
                }
            }
        }
        paths
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
