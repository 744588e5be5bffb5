//! Dataset loading
//!
//! Reads the four CSV sources and hands them to the normalizer behind an
//! all-or-nothing barrier: if any source fails, nothing is normalized and a
//! single load error lists every failed source.

use crate::error::{DashboardError, SourceFailure};
use crate::normalizer::{normalize_rows, NormalizationReport, RawRow};
use crate::types::{Dataset, Datasets};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Locations of the four dataset files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetPaths {
    pub health: PathBuf,
    pub behavior: PathBuf,
    pub social: PathBuf,
    pub global: PathBuf,
}

impl Default for DatasetPaths {
    fn default() -> Self {
        Self::in_dir(".")
    }
}

impl DatasetPaths {
    /// Default file names resolved against a data directory
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            health: dir.join(Dataset::Health.default_file_name()),
            behavior: dir.join(Dataset::Behavior.default_file_name()),
            social: dir.join(Dataset::Social.default_file_name()),
            global: dir.join(Dataset::Global.default_file_name()),
        }
    }

    pub fn path(&self, dataset: Dataset) -> &Path {
        match dataset {
            Dataset::Health => &self.health,
            Dataset::Behavior => &self.behavior,
            Dataset::Social => &self.social,
            Dataset::Global => &self.global,
        }
    }
}

/// Raw rows for all four datasets, before normalization
#[derive(Debug, Clone, Default)]
pub struct RawTables {
    pub health: Vec<RawRow>,
    pub behavior: Vec<RawRow>,
    pub social: Vec<RawRow>,
    pub global: Vec<RawRow>,
}

/// Read CSV rows from any reader; the header line supplies the keys
pub fn read_rows_from<R: Read>(reader: R) -> Result<Vec<RawRow>, DashboardError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

/// Read CSV rows from a file path
pub fn read_rows(path: &Path) -> Result<Vec<RawRow>, DashboardError> {
    let file = std::fs::File::open(path)?;
    read_rows_from(file)
}

/// Load all four datasets from disk.
///
/// Every source is attempted so the error names all failures at once.
pub fn load_datasets(paths: &DatasetPaths) -> Result<Datasets, DashboardError> {
    let mut failures = Vec::new();
    let mut read = |dataset: Dataset| match read_rows(paths.path(dataset)) {
        Ok(rows) => rows,
        Err(e) => {
            failures.push(SourceFailure {
                dataset: dataset.as_str().to_string(),
                reason: format!("{} ({})", e, paths.path(dataset).display()),
            });
            Vec::new()
        }
    };

    let tables = RawTables {
        health: read(Dataset::Health),
        behavior: read(Dataset::Behavior),
        social: read(Dataset::Social),
        global: read(Dataset::Global),
    };

    if !failures.is_empty() {
        log::error!("dataset load failed for {} source(s)", failures.len());
        return Err(DashboardError::Load { failures });
    }

    Datasets::from_raw(tables)
}

impl Datasets {
    /// Normalize four raw tables into typed datasets.
    ///
    /// A malformed table (missing column) fails the whole load.
    pub fn from_raw(tables: RawTables) -> Result<Self, DashboardError> {
        let mut failures = Vec::new();

        let health = collect(normalize_rows(&tables.health), Dataset::Health, &mut failures);
        let behavior = collect(
            normalize_rows(&tables.behavior),
            Dataset::Behavior,
            &mut failures,
        );
        let social = collect(normalize_rows(&tables.social), Dataset::Social, &mut failures);
        let global = collect(normalize_rows(&tables.global), Dataset::Global, &mut failures);

        if !failures.is_empty() {
            return Err(DashboardError::Load { failures });
        }

        let datasets = Self {
            health,
            behavior,
            social,
            global,
        };

        log::info!(
            "loaded datasets: {} health, {} behavior, {} social, {} global",
            datasets.health.len(),
            datasets.behavior.len(),
            datasets.social.len(),
            datasets.global.len()
        );

        Ok(datasets)
    }

    /// Hygiene report for each dataset
    pub fn reports(&self) -> Vec<NormalizationReport> {
        vec![
            NormalizationReport::for_records(&self.health),
            NormalizationReport::for_records(&self.behavior),
            NormalizationReport::for_records(&self.social),
            NormalizationReport::for_records(&self.global),
        ]
    }
}

fn collect<T>(
    result: Result<Vec<T>, DashboardError>,
    dataset: Dataset,
    failures: &mut Vec<SourceFailure>,
) -> Vec<T> {
    result.unwrap_or_else(|e| {
        failures.push(SourceFailure {
            dataset: dataset.as_str().to_string(),
            reason: e.to_string(),
        });
        Vec::new()
    })
}
