//! Grouped statistics
//!
//! Pure aggregation functions over record subsets:
//! - Means, sums, maxima (empty subsets yield `None`, never NaN)
//! - Dense group × subgroup counts and their stacked bands
//! - Rates, bucket counts, grouped means, hourly means, KPI summaries

use crate::error::DashboardError;
use crate::types::{Activity, BehaviorSample, HealthRecord, SleepDisorder};
use serde::Serialize;

/// Arithmetic mean of a field. `None` for an empty subset.
///
/// NaN values are not skipped: a malformed input makes the mean NaN so the
/// problem stays visible.
pub fn mean<R, F>(subset: &[R], field: F) -> Option<f64>
where
    F: Fn(&R) -> f64,
{
    if subset.is_empty() {
        return None;
    }
    Some(sum(subset, field) / subset.len() as f64)
}

pub fn sum<R, F>(subset: &[R], field: F) -> f64
where
    F: Fn(&R) -> f64,
{
    subset.iter().map(field).sum()
}

/// Largest finite value of a field, if any
pub fn max<R, F>(subset: &[R], field: F) -> Option<f64>
where
    F: Fn(&R) -> f64,
{
    subset
        .iter()
        .map(field)
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| Some(acc.map_or(v, |m: f64| m.max(v))))
}

/// Distinct keys in order of first appearance
pub fn distinct<R, K, F>(subset: &[R], key: F) -> Vec<K>
where
    K: PartialEq,
    F: Fn(&R) -> K,
{
    let mut keys: Vec<K> = Vec::new();
    for record in subset {
        let k = key(record);
        if !keys.contains(&k) {
            keys.push(k);
        }
    }
    keys
}

/// Counts for one group across every declared subgroup
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupCounts<G, S> {
    pub group: G,
    /// One entry per declared subgroup, in declaration order
    pub counts: Vec<(S, usize)>,
}

impl<G, S: PartialEq> GroupCounts<G, S> {
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    pub fn count(&self, subgroup: &S) -> usize {
        self.counts
            .iter()
            .find(|(s, _)| s == subgroup)
            .map(|(_, c)| *c)
            .unwrap_or(0)
    }
}

/// Count records per (group, subgroup) pair over a fixed grid.
///
/// Every declared pair is present; combinations with no records count zero.
/// Records whose group or subgroup is not declared are not counted.
pub fn group_counts<R, G, S, FG, FS>(
    subset: &[R],
    groups: &[G],
    subgroups: &[S],
    group_of: FG,
    subgroup_of: FS,
) -> Vec<GroupCounts<G, S>>
where
    G: Clone + PartialEq,
    S: Clone + PartialEq,
    FG: Fn(&R) -> &G,
    FS: Fn(&R) -> &S,
{
    groups
        .iter()
        .map(|group| {
            let counts = subgroups
                .iter()
                .map(|sub| {
                    let n = subset
                        .iter()
                        .filter(|r| group_of(r) == group && subgroup_of(r) == sub)
                        .count();
                    (sub.clone(), n)
                })
                .collect();
            GroupCounts {
                group: group.clone(),
                counts,
            }
        })
        .collect()
}

/// One stacked segment: `[start, end)` along the count axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackBand<G> {
    pub group: G,
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// All bands for one subgroup, one per group (series-major, like a stack layout)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackSeries<G, S> {
    pub key: S,
    /// Position of this series in the stacking order (0 = bottom)
    pub index: usize,
    pub bands: Vec<StackBand<G>>,
}

/// Stack grouped counts in the given subgroup order.
///
/// The first key sits at the bottom of each bar; order is never re-sorted.
pub fn stack<G, S>(grouped: &[GroupCounts<G, S>], order: &[S]) -> Vec<StackSeries<G, S>>
where
    G: Clone,
    S: Clone + PartialEq,
{
    let mut baselines = vec![0.0_f64; grouped.len()];

    order
        .iter()
        .enumerate()
        .map(|(index, key)| {
            let bands = grouped
                .iter()
                .zip(baselines.iter_mut())
                .map(|(g, base)| {
                    let count = g.count(key);
                    let start = *base;
                    *base += count as f64;
                    StackBand {
                        group: g.group.clone(),
                        start,
                        end: *base,
                        count,
                    }
                })
                .collect();
            StackSeries {
                key: key.clone(),
                index,
                bands,
            }
        })
        .collect()
}

/// Percentage of records satisfying a predicate. 0.0 for an empty subset.
pub fn rate<R, P>(subset: &[R], predicate: P) -> f64
where
    P: Fn(&R) -> bool,
{
    if subset.is_empty() {
        return 0.0;
    }
    let hits = subset.iter().filter(|r| predicate(r)).count();
    hits as f64 / subset.len() as f64 * 100.0
}

/// Rate rounded to one decimal for display ("0.0" when empty)
pub fn format_rate<R, P>(subset: &[R], predicate: P) -> String
where
    P: Fn(&R) -> bool,
{
    format!("{:.1}", rate(subset, predicate))
}

/// One labelled band `low..=high` of an integer scale
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub low: i64,
    pub high: i64,
}

/// Contiguous bands over an integer domain.
///
/// Values are resolved by upper bound, so fractional values between two
/// bands (4.5 on the stress scale) fall into the higher one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Buckets {
    buckets: Vec<Bucket>,
}

impl Buckets {
    /// Build from `(label, low, high)` triples, checking there are no gaps or overlaps
    pub fn new(bounds: &[(&str, i64, i64)]) -> Result<Self, DashboardError> {
        if bounds.is_empty() {
            return Err(DashboardError::InvalidBuckets("no buckets".to_string()));
        }

        let mut buckets = Vec::with_capacity(bounds.len());
        for (i, (label, low, high)) in bounds.iter().enumerate() {
            if low > high {
                return Err(DashboardError::InvalidBuckets(format!(
                    "bucket '{label}' has low {low} above high {high}"
                )));
            }
            if i > 0 {
                let prev_high = bounds[i - 1].2;
                if *low != prev_high + 1 {
                    return Err(DashboardError::InvalidBuckets(format!(
                        "bucket '{label}' starts at {low}, expected {}",
                        prev_high + 1
                    )));
                }
            }
            buckets.push(Bucket {
                label: label.to_string(),
                low: *low,
                high: *high,
            });
        }

        Ok(Self { buckets })
    }

    /// Stress bands: low [1,4], medium [5,7], high [8,10]
    pub fn stress() -> Self {
        Self {
            buckets: vec![
                Bucket {
                    label: "Low Stress (1-4)".to_string(),
                    low: 1,
                    high: 4,
                },
                Bucket {
                    label: "Medium Stress (5-7)".to_string(),
                    low: 5,
                    high: 7,
                },
                Bucket {
                    label: "High Stress (8-10)".to_string(),
                    low: 8,
                    high: 10,
                },
            ],
        }
    }

    pub fn labels(&self) -> Vec<String> {
        self.buckets.iter().map(|b| b.label.clone()).collect()
    }

    /// Index of the first bucket whose upper bound is at or above `value`.
    /// NaN and values outside `[first.low, last.high]` have no bucket.
    pub fn index_of(&self, value: f64) -> Option<usize> {
        let first = self.buckets.first()?;
        if !value.is_finite() || value < first.low as f64 {
            return None;
        }
        self.buckets.iter().position(|b| value <= b.high as f64)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketCount {
    pub label: String,
    pub count: usize,
}

/// Count records per bucket, in bucket order.
///
/// Values outside the declared domain (or NaN) are left uncounted.
pub fn bucketize<R, F>(subset: &[R], field: F, buckets: &Buckets) -> Vec<BucketCount>
where
    F: Fn(&R) -> f64,
{
    let mut counts: Vec<BucketCount> = buckets
        .iter()
        .map(|b| BucketCount {
            label: b.label.clone(),
            count: 0,
        })
        .collect();

    let mut outside = 0usize;
    for record in subset {
        match buckets.index_of(field(record)) {
            Some(i) => counts[i].count += 1,
            None => outside += 1,
        }
    }
    if outside > 0 {
        log::debug!("{outside} value(s) fell outside every bucket");
    }

    counts
}

/// Means of several fields for one group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMeans<K> {
    pub key: K,
    pub count: usize,
    /// One mean per requested field, in request order
    pub means: Vec<f64>,
}

/// Group by key (first-appearance order) and average each field.
///
/// Groups are never empty, so every mean is defined.
pub fn grouped_means<R, K, FK>(
    subset: &[R],
    key: FK,
    fields: &[&dyn Fn(&R) -> f64],
) -> Vec<GroupMeans<K>>
where
    R: Clone,
    K: Clone + PartialEq,
    FK: Fn(&R) -> K,
{
    distinct(subset, &key)
        .into_iter()
        .map(|k| {
            let members: Vec<R> = subset.iter().filter(|r| key(r) == k).cloned().collect();
            let means = fields
                .iter()
                .map(|f| mean(&members, |r| f(r)).unwrap_or(0.0))
                .collect();
            GroupMeans {
                key: k,
                count: members.len(),
                means,
            }
        })
        .collect()
}

/// Late-night window: 22:00 through 03:59
pub fn is_late_night(hour: f64) -> bool {
    hour >= 22.0 || hour <= 3.0
}

/// Mean of a field per hour of day, 0..24. Hours without samples yield 0.0.
pub fn hourly_mean<F>(samples: &[BehaviorSample], field: F) -> Vec<(u32, f64)>
where
    F: Fn(&BehaviorSample) -> f64,
{
    (0..24u32)
        .map(|hour| {
            let at_hour: Vec<&BehaviorSample> = samples
                .iter()
                .filter(|s| s.hour == hour as f64)
                .collect();
            (hour, mean(&at_hour, |s| field(s)).unwrap_or(0.0))
        })
        .collect()
}

/// Summed activity shares over the late-night window, in [`Activity::ALL`] order
pub fn activity_totals(samples: &[BehaviorSample]) -> Vec<(Activity, f64)> {
    let late: Vec<&BehaviorSample> = samples.iter().filter(|s| is_late_night(s.hour)).collect();
    Activity::ALL
        .iter()
        .map(|a| (*a, sum(&late, |s| s.share(*a))))
        .collect()
}

/// One heatmap column: activity shares for one hour
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourRow {
    pub hour: f64,
    /// Shares in [`Activity::ALL`] order
    pub shares: Vec<f64>,
    pub people_count: f64,
    /// Samples merged into this row (more than one means duplicates were averaged)
    pub samples: usize,
}

/// Collapse samples to one row per hour, averaging duplicates.
///
/// Hours keep their first-appearance order.
pub fn hour_rows(samples: &[BehaviorSample]) -> Vec<HourRow> {
    distinct(samples, |s| s.hour)
        .into_iter()
        .map(|hour| {
            let at_hour: Vec<&BehaviorSample> =
                samples.iter().filter(|s| s.hour == hour).collect();
            if at_hour.len() > 1 {
                log::debug!("averaging {} samples for hour {hour}", at_hour.len());
            }
            HourRow {
                hour,
                shares: Activity::ALL
                    .iter()
                    .map(|a| mean(&at_hour, |s| s.share(*a)).unwrap_or(0.0))
                    .collect(),
                people_count: mean(&at_hour, |s| s.people_count).unwrap_or(0.0),
                samples: at_hour.len(),
            }
        })
        .collect()
}

/// Headline numbers for the overview page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Kpis {
    pub total: usize,
    pub avg_sleep_hours: Option<f64>,
    pub avg_stress: Option<f64>,
    pub avg_daily_steps: Option<f64>,
    /// Share of records with any sleep disorder (0-100)
    pub disorder_rate_pct: f64,
}

/// Placeholder shown for a KPI that has no data
pub const NO_DATA: &str = "-";

impl Kpis {
    pub fn compute(subset: &[HealthRecord]) -> Self {
        Self {
            total: subset.len(),
            avg_sleep_hours: mean(subset, |r| r.sleep_duration),
            avg_stress: mean(subset, |r| r.stress_level),
            avg_daily_steps: mean(subset, |r| r.daily_steps).map(f64::round),
            disorder_rate_pct: rate(subset, |r| r.sleep_disorder != SleepDisorder::NoDisorder),
        }
    }

    /// Display strings: total, sleep, stress, steps, disorder rate
    pub fn display(&self) -> KpiDisplay {
        KpiDisplay {
            total: self.total.to_string(),
            avg_sleep_hours: display_one_decimal(self.avg_sleep_hours),
            avg_stress: display_one_decimal(self.avg_stress),
            avg_daily_steps: self
                .avg_daily_steps
                .map(format_thousands)
                .unwrap_or_else(|| NO_DATA.to_string()),
            disorder_rate_pct: format!("{:.1}", self.disorder_rate_pct),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiDisplay {
    pub total: String,
    pub avg_sleep_hours: String,
    pub avg_stress: String,
    pub avg_daily_steps: String,
    pub disorder_rate_pct: String,
}

fn display_one_decimal(value: Option<f64>) -> String {
    value
        .map(|v| format!("{v:.1}"))
        .unwrap_or_else(|| NO_DATA.to_string())
}

/// Integer with thousands separators ("6,817")
pub fn format_thousands(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0 {
        out.insert(0, '-');
    }
    out
}
