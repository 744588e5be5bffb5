//! Core record types for the Sleepscope pipeline
//!
//! This module defines the typed, immutable records produced by the normalizer
//! and the open-world categorical enums they carry. Every categorical enum keeps
//! an `Other(raw)` variant so unrecognized values survive normalization instead
//! of being rejected.

use serde::{Deserialize, Serialize};

/// A categorical value with a stable display label.
///
/// Labels are what the color scales and group counters key on, so they must
/// not change between redraws.
pub trait Category {
    fn label(&self) -> &str;

    /// Whether the value fell outside the declared set
    fn is_other(&self) -> bool;
}

/// Dataset identifier used for provenance and error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Health,
    Behavior,
    Social,
    Global,
}

impl Dataset {
    pub const ALL: [Dataset; 4] = [
        Dataset::Health,
        Dataset::Behavior,
        Dataset::Social,
        Dataset::Global,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::Health => "health",
            Dataset::Behavior => "behavior",
            Dataset::Social => "social",
            Dataset::Global => "global",
        }
    }

    /// File name the dashboard ships the dataset under
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Dataset::Health => "Sleep_health_and_lifestyle_dataset.csv",
            Dataset::Behavior => "late_night_behavior.csv",
            Dataset::Social => "social_media_sleep_impact.csv",
            Dataset::Global => "global_sleep_stats.csv",
        }
    }
}

/// Respondent gender
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Male,
    Female,
    Other(String),
}

impl From<&str> for Gender {
    fn from(raw: &str) -> Self {
        match raw.trim() {
            "Male" => Gender::Male,
            "Female" => Gender::Female,
            other => Gender::Other(other.to_string()),
        }
    }
}

impl Category for Gender {
    fn label(&self) -> &str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other(raw) => raw,
        }
    }

    fn is_other(&self) -> bool {
        matches!(self, Gender::Other(_))
    }
}

/// Body-mass-index classification bucket.
///
/// The source data spells the first bucket both "Normal" and "Normal Weight";
/// both collapse to [`BmiCategory::Normal`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BmiCategory {
    Normal,
    Overweight,
    Obese,
    Other(String),
}

impl BmiCategory {
    /// Declared order; bottom-to-top legend order and stacked-bar x order
    pub const DECLARED: [BmiCategory; 3] = [
        BmiCategory::Normal,
        BmiCategory::Overweight,
        BmiCategory::Obese,
    ];
}

impl From<&str> for BmiCategory {
    fn from(raw: &str) -> Self {
        match raw.trim() {
            "Normal" | "Normal Weight" => BmiCategory::Normal,
            "Overweight" => BmiCategory::Overweight,
            "Obese" => BmiCategory::Obese,
            other => BmiCategory::Other(other.to_string()),
        }
    }
}

impl Category for BmiCategory {
    fn label(&self) -> &str {
        match self {
            BmiCategory::Normal => "Normal",
            BmiCategory::Overweight => "Overweight",
            BmiCategory::Obese => "Obese",
            BmiCategory::Other(raw) => raw,
        }
    }

    fn is_other(&self) -> bool {
        matches!(self, BmiCategory::Other(_))
    }
}

/// Diagnosed sleep disorder ("None" in the source collapses to `NoDisorder`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SleepDisorder {
    NoDisorder,
    SleepApnea,
    Insomnia,
    Other(String),
}

impl SleepDisorder {
    /// Declared stacking order (first entry sits at the bottom of each bar)
    pub const DECLARED: [SleepDisorder; 3] = [
        SleepDisorder::NoDisorder,
        SleepDisorder::SleepApnea,
        SleepDisorder::Insomnia,
    ];
}

impl From<&str> for SleepDisorder {
    fn from(raw: &str) -> Self {
        match raw.trim() {
            "None" | "No Disorder" => SleepDisorder::NoDisorder,
            "Sleep Apnea" => SleepDisorder::SleepApnea,
            "Insomnia" => SleepDisorder::Insomnia,
            other => SleepDisorder::Other(other.to_string()),
        }
    }
}

impl Category for SleepDisorder {
    fn label(&self) -> &str {
        match self {
            SleepDisorder::NoDisorder => "No Disorder",
            SleepDisorder::SleepApnea => "Sleep Apnea",
            SleepDisorder::Insomnia => "Insomnia",
            SleepDisorder::Other(raw) => raw,
        }
    }

    fn is_other(&self) -> bool {
        matches!(self, SleepDisorder::Other(_))
    }
}

/// Weekday / weekend split of the behavior samples
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DayType {
    #[default]
    Weekday,
    Weekend,
    Other(String),
}

impl From<&str> for DayType {
    fn from(raw: &str) -> Self {
        match raw.trim() {
            "weekday" => DayType::Weekday,
            "weekend" => DayType::Weekend,
            other => DayType::Other(other.to_string()),
        }
    }
}

impl Category for DayType {
    fn label(&self) -> &str {
        match self {
            DayType::Weekday => "weekday",
            DayType::Weekend => "weekend",
            DayType::Other(raw) => raw,
        }
    }

    fn is_other(&self) -> bool {
        matches!(self, DayType::Other(_))
    }
}

/// Social-media survey age bracket
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AgeGroup {
    Age18To24,
    Age25To34,
    Age35To44,
    Age45Plus,
    Other(String),
}

impl AgeGroup {
    /// Youngest first; the age-usage chart always uses this order
    pub const DECLARED: [AgeGroup; 4] = [
        AgeGroup::Age18To24,
        AgeGroup::Age25To34,
        AgeGroup::Age35To44,
        AgeGroup::Age45Plus,
    ];

    /// Position in the declared order; unrecognized brackets sort last
    pub fn rank(&self) -> usize {
        Self::DECLARED
            .iter()
            .position(|g| g == self)
            .unwrap_or(Self::DECLARED.len())
    }
}

impl From<&str> for AgeGroup {
    fn from(raw: &str) -> Self {
        match raw.trim() {
            "18-24" => AgeGroup::Age18To24,
            "25-34" => AgeGroup::Age25To34,
            "35-44" => AgeGroup::Age35To44,
            "45+" => AgeGroup::Age45Plus,
            other => AgeGroup::Other(other.to_string()),
        }
    }
}

impl Category for AgeGroup {
    fn label(&self) -> &str {
        match self {
            AgeGroup::Age18To24 => "18-24",
            AgeGroup::Age25To34 => "25-34",
            AgeGroup::Age35To44 => "35-44",
            AgeGroup::Age45Plus => "45+",
            AgeGroup::Other(raw) => raw,
        }
    }

    fn is_other(&self) -> bool {
        matches!(self, AgeGroup::Other(_))
    }
}

macro_rules! string_conversions {
    ($($ty:ty),*) => {
        $(
            impl From<String> for $ty {
                fn from(raw: String) -> Self {
                    <$ty>::from(raw.as_str())
                }
            }

            impl From<$ty> for String {
                fn from(value: $ty) -> Self {
                    value.label().to_string()
                }
            }

            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(self.label())
                }
            }
        )*
    };
}

string_conversions!(Gender, BmiCategory, SleepDisorder, DayType, AgeGroup);

/// Late-night activity categories tracked per behavior sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activity {
    SocialMedia,
    Gaming,
    WorkStudy,
    VideoStreaming,
    Browsing,
}

impl Activity {
    pub const ALL: [Activity; 5] = [
        Activity::SocialMedia,
        Activity::Gaming,
        Activity::WorkStudy,
        Activity::VideoStreaming,
        Activity::Browsing,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Activity::SocialMedia => "Social Media",
            Activity::Gaming => "Gaming",
            Activity::WorkStudy => "Work/Study",
            Activity::VideoStreaming => "Video",
            Activity::Browsing => "Browsing",
        }
    }
}

/// One respondent of the sleep health and lifestyle survey
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecord {
    pub id: String,
    pub gender: Gender,
    /// Age in years
    pub age: f64,
    pub occupation: String,
    /// Sleep duration (hours)
    pub sleep_duration: f64,
    /// Self-reported sleep quality (1-10)
    pub sleep_quality: f64,
    /// Physical activity (minutes/day)
    pub activity_level: f64,
    /// Stress level (1-10)
    pub stress_level: f64,
    pub bmi_category: BmiCategory,
    /// Resting heart rate (bpm)
    pub heart_rate: f64,
    pub daily_steps: f64,
    pub sleep_disorder: SleepDisorder,
}

/// Share of online activity for one hour of one day type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorSample {
    /// Hour of day (0-23)
    pub hour: f64,
    pub day_type: DayType,
    /// Activity shares (0-100)
    pub social_media: f64,
    pub gaming: f64,
    pub work_study: f64,
    pub video_streaming: f64,
    pub browsing: f64,
    pub caffeine_consumed: f64,
    /// Estimated concurrent people online
    pub people_count: f64,
}

impl BehaviorSample {
    pub fn share(&self, activity: Activity) -> f64 {
        match activity {
            Activity::SocialMedia => self.social_media,
            Activity::Gaming => self.gaming,
            Activity::WorkStudy => self.work_study,
            Activity::VideoStreaming => self.video_streaming,
            Activity::Browsing => self.browsing,
        }
    }
}

/// Social-media usage survey row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialMediaRecord {
    pub age_group: AgeGroup,
    pub platform: String,
    pub daily_hours: f64,
    /// Share of usage after midnight (0-100)
    pub late_night_usage_pct: f64,
    /// Sleep quality score (1-10)
    pub sleep_quality_score: f64,
    /// Addiction level (0-10)
    pub addiction_level: f64,
    pub avg_sleep_hours: f64,
}

/// Per-country sleep statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryStat {
    pub country: String,
    pub region: String,
    pub avg_sleep_hours: f64,
    /// Late-night rate (0-100)
    pub late_night_rate_pct: f64,
    pub work_hours_per_week: f64,
    /// Stress level (1-10)
    pub stress_level: f64,
    pub internet_hours_per_day: f64,
    /// Sleep disorder rate (0-100)
    pub sleep_disorder_rate_pct: f64,
}

/// All four datasets, loaded once and held read-only for the session
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Datasets {
    pub health: Vec<HealthRecord>,
    pub behavior: Vec<BehaviorSample>,
    pub social: Vec<SocialMediaRecord>,
    pub global: Vec<CountryStat>,
}

impl Datasets {
    /// Look up a health record by its id
    pub fn health_record(&self, id: &str) -> Option<&HealthRecord> {
        self.health.iter().find(|r| r.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi_collapses_normal_weight() {
        assert_eq!(BmiCategory::from("Normal Weight"), BmiCategory::Normal);
        assert_eq!(BmiCategory::from("Normal"), BmiCategory::Normal);
        assert_eq!(BmiCategory::from("Obese").label(), "Obese");
    }

    #[test]
    fn test_disorder_collapses_none() {
        assert_eq!(SleepDisorder::from("None"), SleepDisorder::NoDisorder);
        assert_eq!(SleepDisorder::NoDisorder.label(), "No Disorder");
    }

    #[test]
    fn test_unknown_category_passes_through() {
        let bmi = BmiCategory::from("Underweight");
        assert_eq!(bmi, BmiCategory::Other("Underweight".to_string()));
        assert!(bmi.is_other());
        assert_eq!(bmi.label(), "Underweight");

        let group = AgeGroup::from("65+");
        assert!(group.is_other());
        assert_eq!(group.rank(), AgeGroup::DECLARED.len());
    }

    #[test]
    fn test_category_serializes_as_label() {
        let json = serde_json::to_string(&SleepDisorder::SleepApnea).unwrap();
        assert_eq!(json, "\"Sleep Apnea\"");

        let back: SleepDisorder = serde_json::from_str("\"None\"").unwrap();
        assert_eq!(back, SleepDisorder::NoDisorder);
    }

    #[test]
    fn test_age_group_rank_follows_declared_order() {
        assert!(AgeGroup::Age18To24.rank() < AgeGroup::Age25To34.rank());
        assert!(AgeGroup::Age35To44.rank() < AgeGroup::Age45Plus.rank());
    }

    #[test]
    fn test_day_type_default_and_labels() {
        assert_eq!(DayType::default(), DayType::Weekday);
        assert_eq!(DayType::from(" weekend "), DayType::Weekend);
        assert!(DayType::from("holiday").is_other());
        assert_eq!(DayType::from("holiday").label(), "holiday");
    }
}
