//! Health & social media page

use super::{
    format_percent, format_tick, vertical_bar, Axis, Circle, Margin, PlotArea, Rect, Viewport,
    AXIS_TICKS,
};
use crate::aggregate::{distinct, grouped_means, max, GroupMeans};
use crate::error::DashboardError;
use crate::filter::{by_age_group, rank_by, SortOrder};
use crate::radial::Point;
use crate::scale::{
    domains, palette, BandScale, LegendEntry, LinearScale, OrdinalColorScale,
    SequentialColorScale,
};
use crate::state::FilterSelection;
use crate::types::{AgeGroup, Category, SocialMediaRecord};
use serde::Serialize;

const IMPACT_MARGIN: Margin = Margin::new(20.0, 30.0, 60.0, 60.0);
const AGE_MARGIN: Margin = Margin::new(20.0, 30.0, 40.0, 60.0);
const HOURS_MARGIN: Margin = Margin::new(20.0, 30.0, 50.0, 60.0);
const ADDICTION_MARGIN: Margin = Margin::new(20.0, 30.0, 40.0, 100.0);
const IMPACT_POINT_RADIUS: f64 = 5.0;
const HOURS_POINT_RADIUS: f64 = 4.0;
/// Headroom past the heaviest user on the hours axis
const HOURS_HEADROOM: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthPage {
    pub age_group: String,
    /// Age-group dropdown entries in bracket order
    pub age_groups: Vec<String>,
    pub social_impact: SocialImpactChart,
    pub age_usage: AgeUsageChart,
    pub hours_vs_sleep: HoursSleepChart,
    pub addiction: AddictionChart,
}

pub fn build(
    records: &[SocialMediaRecord],
    filters: &FilterSelection,
    viewport: Viewport,
) -> Result<HealthPage, DashboardError> {
    let mut age_groups = distinct(records, |r| r.age_group.clone());
    age_groups.sort_by_key(|g| g.rank());

    Ok(HealthPage {
        age_group: String::from(filters.age_group.clone()),
        age_groups: age_groups.iter().map(|g| g.label().to_string()).collect(),
        social_impact: social_impact(&by_age_group(records, &filters.age_group), viewport)?,
        age_usage: age_usage(records, viewport)?,
        hours_vs_sleep: hours_vs_sleep(records, viewport)?,
        addiction: addiction(records, viewport)?,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformImpact {
    pub platform: String,
    pub avg_late_night_pct: f64,
    pub avg_sleep_quality: f64,
    pub bar: Rect,
    pub point: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SocialImpactChart {
    pub area: PlotArea,
    pub x_axis: Axis,
    /// Left axis: late-night usage (%)
    pub y_axis: Axis,
    /// Right axis: sleep quality score
    pub y2_axis: Axis,
    pub platforms: Vec<PlatformImpact>,
    pub legend: Vec<LegendEntry>,
    pub point_radius: f64,
}

/// Per-platform late-night usage (bars) against sleep quality (line)
pub fn social_impact(
    subset: &[SocialMediaRecord],
    viewport: Viewport,
) -> Result<SocialImpactChart, DashboardError> {
    let area = PlotArea::new(&viewport, IMPACT_MARGIN);
    let groups = grouped_means(
        subset,
        |r| r.platform.clone(),
        &[&|r: &SocialMediaRecord| r.late_night_usage_pct, &|r: &SocialMediaRecord| {
            r.sleep_quality_score
        }],
    );

    let x = BandScale::new(
        groups.iter().map(|g| g.key.clone()).collect(),
        (0.0, area.width),
        0.3,
    );
    let y1 = LinearScale::new(domains::PERCENT, (area.height, 0.0))?;
    let y2 = LinearScale::new(domains::SCORE, (area.height, 0.0))?;

    let platforms = groups
        .iter()
        .map(|g| {
            let (usage, quality) = (g.means[0], g.means[1]);
            let left = x.position(&g.key).unwrap_or(0.0);
            PlatformImpact {
                platform: g.key.clone(),
                avg_late_night_pct: usage,
                avg_sleep_quality: quality,
                bar: vertical_bar(left, x.bandwidth(), 0.0, usage, &y1, palette::PINK),
                point: Point {
                    x: left + x.bandwidth() / 2.0,
                    y: y2.scale(quality),
                },
            }
        })
        .collect();

    Ok(SocialImpactChart {
        area,
        x_axis: Axis::band(&x),
        y_axis: Axis::linear(&y1, AXIS_TICKS, format_percent).titled("Late-Night Usage (%)"),
        y2_axis: Axis::linear(&y2, AXIS_TICKS, format_tick).titled("Sleep Quality"),
        platforms,
        legend: vec![
            LegendEntry {
                label: "Late-Night Usage".to_string(),
                color: palette::PINK,
            },
            LegendEntry {
                label: "Sleep Quality".to_string(),
                color: palette::SUCCESS,
            },
        ],
        point_radius: IMPACT_POINT_RADIUS,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeUsageBar {
    pub age_group: String,
    pub avg_late_night_pct: f64,
    pub bar: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeUsageChart {
    pub area: PlotArea,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub bars: Vec<AgeUsageBar>,
}

/// Mean late-night usage per age bracket, youngest first
pub fn age_usage(
    records: &[SocialMediaRecord],
    viewport: Viewport,
) -> Result<AgeUsageChart, DashboardError> {
    let area = PlotArea::new(&viewport, AGE_MARGIN);
    let mut groups: Vec<GroupMeans<AgeGroup>> = grouped_means(
        records,
        |r| r.age_group.clone(),
        &[&|r: &SocialMediaRecord| r.late_night_usage_pct],
    );
    groups.sort_by_key(|g| g.key.rank());

    let x = BandScale::new(
        groups.iter().map(|g| g.key.label().to_string()).collect(),
        (0.0, area.width),
        0.4,
    );
    let y = LinearScale::new(domains::PERCENT, (area.height, 0.0))?;
    let colors = SequentialColorScale::new(domains::PERCENT, palette::SUCCESS, palette::DANGER)?;

    let bars = groups
        .iter()
        .map(|g| {
            let usage = g.means[0];
            AgeUsageBar {
                age_group: g.key.label().to_string(),
                avg_late_night_pct: usage,
                bar: vertical_bar(
                    x.position(g.key.label()).unwrap_or(0.0),
                    x.bandwidth(),
                    0.0,
                    usage,
                    &y,
                    colors.color(usage),
                ),
            }
        })
        .collect();

    Ok(AgeUsageChart {
        area,
        x_axis: Axis::band(&x).titled("Age Group"),
        y_axis: Axis::linear(&y, AXIS_TICKS, format_percent),
        bars,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoursSleepChart {
    pub area: PlotArea,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub points: Vec<Circle>,
    pub legend: Vec<LegendEntry>,
}

/// Daily hours on social media against sleep quality, colored by age bracket
pub fn hours_vs_sleep(
    records: &[SocialMediaRecord],
    viewport: Viewport,
) -> Result<HoursSleepChart, DashboardError> {
    let area = PlotArea::new(&viewport, HOURS_MARGIN);
    let upper = max(records, |r| r.daily_hours).unwrap_or(0.0) + HOURS_HEADROOM;
    let x = LinearScale::new((0.0, upper), (0.0, area.width))?;
    let y = LinearScale::new(domains::SCORE, (area.height, 0.0))?;

    let labels: Vec<String> = AgeGroup::DECLARED
        .iter()
        .map(|g| g.label().to_string())
        .collect();
    let colors = OrdinalColorScale::new(
        &labels,
        &[
            palette::DANGER,
            palette::TERTIARY,
            palette::SECONDARY,
            palette::SUCCESS,
        ],
    );

    let points = records
        .iter()
        .map(|r| Circle {
            key: format!("{} {}", r.platform, r.age_group.label()),
            cx: x.scale(r.daily_hours),
            cy: y.scale(r.sleep_quality_score),
            r: HOURS_POINT_RADIUS,
            color: colors.color(r.age_group.label()),
        })
        .collect();

    Ok(HoursSleepChart {
        area,
        x_axis: Axis::linear(&x, AXIS_TICKS, format_tick).titled("Daily Usage (hours)"),
        y_axis: Axis::linear(&y, AXIS_TICKS, format_tick).titled("Sleep Quality"),
        points,
        legend: colors.legend(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddictionBar {
    pub platform: String,
    pub avg_addiction: f64,
    pub bar: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddictionChart {
    pub area: PlotArea,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub bars: Vec<AddictionBar>,
}

/// Platforms ranked by mean addiction level, highest first
pub fn addiction(
    records: &[SocialMediaRecord],
    viewport: Viewport,
) -> Result<AddictionChart, DashboardError> {
    let area = PlotArea::new(&viewport, ADDICTION_MARGIN);
    let groups = grouped_means(
        records,
        |r| r.platform.clone(),
        &[&|r: &SocialMediaRecord| r.addiction_level],
    );
    let ranked = rank_by(&groups, SortOrder::Descending, |g| g.means[0]);

    let x = LinearScale::new(domains::SCORE, (0.0, area.width))?;
    let y = BandScale::new(
        ranked.iter().map(|g| g.key.clone()).collect(),
        (0.0, area.height),
        0.3,
    );
    let colors = SequentialColorScale::new(domains::SCORE, palette::SUCCESS, palette::DANGER)?;

    let bars = ranked
        .iter()
        .map(|g| {
            let level = g.means[0];
            AddictionBar {
                platform: g.key.clone(),
                avg_addiction: level,
                bar: Rect {
                    x: 0.0,
                    y: y.position(&g.key).unwrap_or(0.0),
                    width: x.scale(level),
                    height: y.bandwidth(),
                    color: colors.color(level),
                },
            }
        })
        .collect();

    Ok(AddictionChart {
        area,
        x_axis: Axis::linear(&x, AXIS_TICKS, format_tick).titled("Addiction Level"),
        y_axis: Axis::band(&y),
        bars,
    })
}
