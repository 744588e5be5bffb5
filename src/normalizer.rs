//! Record normalization
//!
//! This module maps raw rows (column name → string) into typed records.
//! - Numeric fields use a fail-fast parse: anything non-numeric becomes NaN
//! - Categorical fields collapse known spellings and pass unknown ones through
//! - Missing columns reject the whole dataset

use crate::error::DashboardError;
use crate::types::{
    AgeGroup, BehaviorSample, BmiCategory, Category, CountryStat, Dataset, DayType, Gender,
    HealthRecord, SleepDisorder, SocialMediaRecord,
};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// One raw row as handed over by the loader
pub type RawRow = HashMap<String, String>;

/// Typed record that can be built from a raw row
pub trait NormalizeRow: Sized {
    /// Dataset the record belongs to
    const DATASET: Dataset;

    /// Columns that must be present in every row
    const COLUMNS: &'static [&'static str];

    /// Build the record; never fails, bad numbers surface as NaN
    fn from_row(row: &RawRow) -> Self;

    /// Count of NaN numeric fields and unrecognized category values
    fn audit(&self) -> RecordAudit;
}

/// Per-record hygiene findings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordAudit {
    pub nan_fields: usize,
    pub unrecognized: Vec<String>,
}

impl RecordAudit {
    fn numbers(values: &[f64]) -> Self {
        Self {
            nan_fields: values.iter().filter(|v| v.is_nan()).count(),
            unrecognized: Vec::new(),
        }
    }

    fn category<C: Category>(mut self, value: &C) -> Self {
        if value.is_other() {
            self.unrecognized.push(value.label().to_string());
        }
        self
    }
}

/// Hygiene summary for one normalized dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizationReport {
    pub dataset: Dataset,
    pub records: usize,
    pub nan_fields: usize,
    pub unrecognized_categories: BTreeSet<String>,
}

impl NormalizationReport {
    pub fn for_records<T: NormalizeRow>(records: &[T]) -> Self {
        let mut nan_fields = 0;
        let mut unrecognized_categories = BTreeSet::new();

        for record in records {
            let audit = record.audit();
            nan_fields += audit.nan_fields;
            unrecognized_categories.extend(audit.unrecognized);
        }

        Self {
            dataset: T::DATASET,
            records: records.len(),
            nan_fields,
            unrecognized_categories,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.nan_fields == 0 && self.unrecognized_categories.is_empty()
    }
}

/// Normalize every row of a dataset.
///
/// Fails only when a row lacks one of the required columns; value-level
/// problems are tolerated and reported through [`NormalizationReport`].
pub fn normalize_rows<T: NormalizeRow>(rows: &[RawRow]) -> Result<Vec<T>, DashboardError> {
    for row in rows {
        if let Some(column) = T::COLUMNS.iter().find(|c| !row.contains_key(**c)) {
            return Err(DashboardError::MissingColumn {
                dataset: T::DATASET.as_str().to_string(),
                column: column.to_string(),
            });
        }
    }

    let records: Vec<T> = rows.iter().map(T::from_row).collect();
    let report = NormalizationReport::for_records(&records);
    if !report.unrecognized_categories.is_empty() {
        log::warn!(
            "{} dataset: unrecognized categories {:?}",
            T::DATASET.as_str(),
            report.unrecognized_categories
        );
    }
    log::debug!(
        "normalized {} {} records",
        records.len(),
        T::DATASET.as_str()
    );
    Ok(records)
}

/// Parse a numeric cell. Empty, malformed or non-finite input yields NaN.
pub fn parse_number(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(f64::NAN)
}

fn text(row: &RawRow, column: &str) -> String {
    row.get(column).map(|v| v.trim().to_string()).unwrap_or_default()
}

fn number(row: &RawRow, dataset: Dataset, column: &str) -> f64 {
    let raw = row.get(column).map(String::as_str).unwrap_or("");
    let value = parse_number(raw);
    if value.is_nan() {
        log::warn!(
            "{} dataset: non-numeric value {:?} in column '{}'",
            dataset.as_str(),
            raw,
            column
        );
    }
    value
}

impl NormalizeRow for HealthRecord {
    const DATASET: Dataset = Dataset::Health;
    const COLUMNS: &'static [&'static str] = &[
        "Person ID",
        "Gender",
        "Age",
        "Occupation",
        "Sleep Duration",
        "Quality of Sleep",
        "Physical Activity Level",
        "Stress Level",
        "BMI Category",
        "Heart Rate",
        "Daily Steps",
        "Sleep Disorder",
    ];

    fn from_row(row: &RawRow) -> Self {
        let ds = Self::DATASET;
        Self {
            id: text(row, "Person ID"),
            gender: Gender::from(text(row, "Gender")),
            age: number(row, ds, "Age"),
            occupation: text(row, "Occupation"),
            sleep_duration: number(row, ds, "Sleep Duration"),
            sleep_quality: number(row, ds, "Quality of Sleep"),
            activity_level: number(row, ds, "Physical Activity Level"),
            stress_level: number(row, ds, "Stress Level"),
            bmi_category: BmiCategory::from(text(row, "BMI Category")),
            heart_rate: number(row, ds, "Heart Rate"),
            daily_steps: number(row, ds, "Daily Steps"),
            sleep_disorder: SleepDisorder::from(text(row, "Sleep Disorder")),
        }
    }

    fn audit(&self) -> RecordAudit {
        RecordAudit::numbers(&[
            self.age,
            self.sleep_duration,
            self.sleep_quality,
            self.activity_level,
            self.stress_level,
            self.heart_rate,
            self.daily_steps,
        ])
        .category(&self.gender)
        .category(&self.bmi_category)
        .category(&self.sleep_disorder)
    }
}

impl NormalizeRow for BehaviorSample {
    const DATASET: Dataset = Dataset::Behavior;
    const COLUMNS: &'static [&'static str] = &[
        "hour",
        "day_type",
        "social_media",
        "gaming",
        "work_study",
        "video_streaming",
        "browsing",
        "caffeine_consumed",
        "people_count",
    ];

    fn from_row(row: &RawRow) -> Self {
        let ds = Self::DATASET;
        Self {
            hour: number(row, ds, "hour"),
            day_type: DayType::from(text(row, "day_type")),
            social_media: number(row, ds, "social_media"),
            gaming: number(row, ds, "gaming"),
            work_study: number(row, ds, "work_study"),
            video_streaming: number(row, ds, "video_streaming"),
            browsing: number(row, ds, "browsing"),
            caffeine_consumed: number(row, ds, "caffeine_consumed"),
            people_count: number(row, ds, "people_count"),
        }
    }

    fn audit(&self) -> RecordAudit {
        RecordAudit::numbers(&[
            self.hour,
            self.social_media,
            self.gaming,
            self.work_study,
            self.video_streaming,
            self.browsing,
            self.caffeine_consumed,
            self.people_count,
        ])
        .category(&self.day_type)
    }
}

impl NormalizeRow for SocialMediaRecord {
    const DATASET: Dataset = Dataset::Social;
    const COLUMNS: &'static [&'static str] = &[
        "age_group",
        "platform",
        "daily_hours",
        "late_night_usage",
        "sleep_quality_score",
        "addiction_level",
        "avg_sleep_hours",
    ];

    fn from_row(row: &RawRow) -> Self {
        let ds = Self::DATASET;
        Self {
            age_group: AgeGroup::from(text(row, "age_group")),
            platform: text(row, "platform"),
            daily_hours: number(row, ds, "daily_hours"),
            late_night_usage_pct: number(row, ds, "late_night_usage"),
            sleep_quality_score: number(row, ds, "sleep_quality_score"),
            addiction_level: number(row, ds, "addiction_level"),
            avg_sleep_hours: number(row, ds, "avg_sleep_hours"),
        }
    }

    fn audit(&self) -> RecordAudit {
        RecordAudit::numbers(&[
            self.daily_hours,
            self.late_night_usage_pct,
            self.sleep_quality_score,
            self.addiction_level,
            self.avg_sleep_hours,
        ])
        .category(&self.age_group)
    }
}

impl NormalizeRow for CountryStat {
    const DATASET: Dataset = Dataset::Global;
    const COLUMNS: &'static [&'static str] = &[
        "country",
        "region",
        "avg_sleep_hours",
        "late_night_rate",
        "work_hours_per_week",
        "stress_level",
        "internet_hours",
        "sleep_disorder_rate",
    ];

    fn from_row(row: &RawRow) -> Self {
        let ds = Self::DATASET;
        Self {
            country: text(row, "country"),
            region: text(row, "region"),
            avg_sleep_hours: number(row, ds, "avg_sleep_hours"),
            late_night_rate_pct: number(row, ds, "late_night_rate"),
            work_hours_per_week: number(row, ds, "work_hours_per_week"),
            stress_level: number(row, ds, "stress_level"),
            internet_hours_per_day: number(row, ds, "internet_hours"),
            sleep_disorder_rate_pct: number(row, ds, "sleep_disorder_rate"),
        }
    }

    fn audit(&self) -> RecordAudit {
        RecordAudit::numbers(&[
            self.avg_sleep_hours,
            self.late_night_rate_pct,
            self.work_hours_per_week,
            self.stress_level,
            self.internet_hours_per_day,
            self.sleep_disorder_rate_pct,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RawRow {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn health_row(bmi: &str, disorder: &str, age: &str) -> RawRow {
        row(&[
            ("Person ID", "7"),
            ("Gender", "Female"),
            ("Age", age),
            ("Occupation", "Nurse"),
            ("Sleep Duration", "6.1"),
            ("Quality of Sleep", "6"),
            ("Physical Activity Level", "42"),
            ("Stress Level", "8"),
            ("BMI Category", bmi),
            ("Heart Rate", "77"),
            ("Daily Steps", "4200"),
            ("Sleep Disorder", disorder),
        ])
    }

    #[test]
    fn test_health_row_normalization() {
        let record = HealthRecord::from_row(&health_row("Normal Weight", "None", "29"));

        assert_eq!(record.id, "7");
        assert_eq!(record.gender, Gender::Female);
        assert_eq!(record.age, 29.0);
        assert_eq!(record.bmi_category, BmiCategory::Normal);
        assert_eq!(record.sleep_disorder, SleepDisorder::NoDisorder);
        assert!((record.sleep_duration - 6.1).abs() < 1e-9);
        assert!(record.audit().nan_fields == 0);
    }

    #[test]
    fn test_non_numeric_becomes_nan() {
        let record = HealthRecord::from_row(&health_row("Obese", "Insomnia", "twenty"));
        assert!(record.age.is_nan());
        assert_eq!(record.audit().nan_fields, 1);

        assert!(parse_number("").is_nan());
        assert!(parse_number("abc").is_nan());
        assert_eq!(parse_number(" 12.5 "), 12.5);
    }

    #[test]
    fn test_infinity_text_becomes_nan() {
        assert!(parse_number("inf").is_nan());
        assert!(parse_number("-Infinity").is_nan());
        assert!(parse_number("NaN").is_nan());
        assert_eq!(parse_number("1e3"), 1000.0);

        let mut raw = health_row("Normal", "None", "35");
        raw.insert("Daily Steps".to_string(), "infinity".to_string());
        let records: Vec<HealthRecord> = normalize_rows(&[raw]).unwrap();
        assert!(records[0].daily_steps.is_nan());

        let report = NormalizationReport::for_records(&records);
        assert!(!report.is_clean());
        assert_eq!(report.nan_fields, 1);
    }

    #[test]
    fn test_unknown_category_is_reported_not_rejected() {
        let rows = vec![health_row("Underweight", "Narcolepsy", "40")];
        let records: Vec<HealthRecord> = normalize_rows(&rows).unwrap();
        let report = NormalizationReport::for_records(&records);

        assert_eq!(report.records, 1);
        assert!(!report.is_clean());
        assert!(report.unrecognized_categories.contains("Underweight"));
        assert!(report.unrecognized_categories.contains("Narcolepsy"));
    }

    #[test]
    fn test_missing_column_rejects_dataset() {
        let rows = vec![row(&[("hour", "23"), ("day_type", "weekday")])];
        let result: Result<Vec<BehaviorSample>, _> = normalize_rows(&rows);

        match result {
            Err(DashboardError::MissingColumn { dataset, column }) => {
                assert_eq!(dataset, "behavior");
                assert_eq!(column, "social_media");
            }
            other => panic!("expected missing column, got {other:?}"),
        }
    }

    #[test]
    fn test_social_and_global_rows() {
        let social = SocialMediaRecord::from_row(&row(&[
            ("age_group", "18-24"),
            ("platform", "TikTok"),
            ("daily_hours", "4.5"),
            ("late_night_usage", "68"),
            ("sleep_quality_score", "5.2"),
            ("addiction_level", "7.8"),
            ("avg_sleep_hours", "6.3"),
        ]));
        assert_eq!(social.age_group, AgeGroup::Age18To24);
        assert_eq!(social.late_night_usage_pct, 68.0);

        let country = CountryStat::from_row(&row(&[
            ("country", "Japan"),
            ("region", "Asia"),
            ("avg_sleep_hours", "6.2"),
            ("late_night_rate", "45"),
            ("work_hours_per_week", "48"),
            ("stress_level", "7"),
            ("internet_hours", "5.5"),
            ("sleep_disorder_rate", "21"),
        ]));
        assert_eq!(country.region, "Asia");
        assert_eq!(country.internet_hours_per_day, 5.5);
    }
}
