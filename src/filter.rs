//! Filter engine
//!
//! Narrows a record collection to the subset matching one categorical
//! selector. Filtering never mutates its input and preserves insertion order.

use crate::types::{BehaviorSample, Category, DayType, HealthRecord, SocialMediaRecord};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Value of one dropdown: everything, or an exact match on a single field
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Selector {
    #[default]
    All,
    Only(String),
}

impl Selector {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "" | "all" => Selector::All,
            value => Selector::Only(value.to_string()),
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selector::All => true,
            Selector::Only(wanted) => wanted == value,
        }
    }
}

impl From<String> for Selector {
    fn from(raw: String) -> Self {
        Selector::parse(&raw)
    }
}

impl From<Selector> for String {
    fn from(selector: Selector) -> Self {
        match selector {
            Selector::All => "all".to_string(),
            Selector::Only(value) => value,
        }
    }
}

/// Direction of the country ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Keep the records whose key matches the selector.
///
/// `Selector::All` returns the collection unchanged.
pub fn filter_by<R, F>(records: &[R], selector: &Selector, key: F) -> Vec<R>
where
    R: Clone,
    F: Fn(&R) -> &str,
{
    match selector {
        Selector::All => records.to_vec(),
        Selector::Only(_) => records
            .iter()
            .filter(|r| selector.matches(key(r)))
            .cloned()
            .collect(),
    }
}

pub fn by_occupation(records: &[HealthRecord], selector: &Selector) -> Vec<HealthRecord> {
    filter_by(records, selector, |r| r.occupation.as_str())
}

pub fn by_age_group(records: &[SocialMediaRecord], selector: &Selector) -> Vec<SocialMediaRecord> {
    filter_by(records, selector, |r| r.age_group.label())
}

pub fn by_day_type(samples: &[BehaviorSample], day_type: &DayType) -> Vec<BehaviorSample> {
    filter_by(samples, &Selector::Only(day_type.label().to_string()), |s| {
        s.day_type.label()
    })
}

/// Distinct occupations, alphabetically, for the occupation dropdown
pub fn occupation_options(records: &[HealthRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.occupation.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Stable sort by a numeric key. NaN keys sort after every number.
pub fn rank_by<R, F>(records: &[R], order: SortOrder, key: F) -> Vec<R>
where
    R: Clone,
    F: Fn(&R) -> f64,
{
    let mut ranked = records.to_vec();
    ranked.sort_by(|a, b| {
        let (ka, kb) = (key(a), key(b));
        match (ka.is_nan(), kb.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => match order {
                SortOrder::Ascending => ka.total_cmp(&kb),
                SortOrder::Descending => kb.total_cmp(&ka),
            },
        }
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::fixtures;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_all_is_identity() {
        let datasets = fixtures::datasets();
        assert_eq!(by_occupation(&datasets.health, &Selector::All), datasets.health);
    }

    #[test]
    fn test_filter_preserves_order() {
        let datasets = fixtures::datasets();
        let nurses = by_occupation(&datasets.health, &Selector::parse("Nurse"));

        let ids: Vec<_> = nurses.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "4"]);
    }

    #[test]
    fn test_unknown_value_yields_empty_subset() {
        let datasets = fixtures::datasets();
        assert!(by_occupation(&datasets.health, &Selector::parse("Astronaut")).is_empty());
        assert!(by_age_group(&datasets.social, &Selector::parse("65+")).is_empty());
    }

    #[test]
    fn test_filter_by_day_type() {
        let datasets = fixtures::datasets();
        let weekend = by_day_type(&datasets.behavior, &DayType::Weekend);

        assert_eq!(weekend.len(), 3);
        assert!(weekend.iter().all(|s| s.day_type == DayType::Weekend));
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!(Selector::parse("all"), Selector::All);
        assert_eq!(Selector::parse(""), Selector::All);
        assert_eq!(Selector::parse("Doctor"), Selector::Only("Doctor".into()));
    }

    #[test]
    fn test_occupation_options_sorted_distinct() {
        let datasets = fixtures::datasets();
        assert_eq!(
            occupation_options(&datasets.health),
            vec!["Doctor", "Nurse", "Software Engineer", "Teacher"]
        );
    }

    #[test]
    fn test_rank_by_both_directions() {
        let datasets = fixtures::datasets();

        let asc = rank_by(&datasets.global, SortOrder::Ascending, |c| c.avg_sleep_hours);
        let names: Vec<_> = asc.iter().map(|c| c.country.as_str()).collect();
        assert_eq!(names, vec!["Japan", "South Korea", "United States", "Netherlands"]);

        let desc = rank_by(&datasets.global, SortOrder::Descending, |c| c.avg_sleep_hours);
        assert_eq!(desc[0].country, "Netherlands");
        assert_eq!(datasets.global[0].country, "Japan");
    }

    proptest! {
        #[test]
        fn prop_filter_is_idempotent(
            occupations in proptest::collection::vec(0usize..4, 0..40),
            pick in 0usize..5,
        ) {
            let names = ["Nurse", "Doctor", "Teacher", "Engineer", "Pilot"];
            let base = fixtures::datasets().health[0].clone();
            let records: Vec<HealthRecord> = occupations
                .iter()
                .enumerate()
                .map(|(i, o)| HealthRecord {
                    id: i.to_string(),
                    occupation: names[*o].to_string(),
                    ..base.clone()
                })
                .collect();

            let selector = Selector::parse(names[pick]);
            let once = by_occupation(&records, &selector);
            let twice = by_occupation(&once, &selector);
            prop_assert_eq!(&once, &twice);
            prop_assert!(once.iter().all(|r| r.occupation == names[pick]));
            prop_assert_eq!(by_occupation(&records, &Selector::All), records);
        }
    }
}
