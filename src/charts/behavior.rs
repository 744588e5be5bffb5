//! Late-night behavior page
//!
//! The heatmap follows the day-type toggle; the clock, activity pie and
//! trend lines always use every sample.

use super::{arc_marks, format_tick, ArcMark, Axis, Margin, PlotArea, Rect, Viewport, AXIS_TICKS};
use crate::aggregate::{activity_totals, hour_rows, hourly_mean, is_late_night, max};
use crate::error::DashboardError;
use crate::filter::by_day_type;
use crate::radial::{ArcShape, ClockLayout, Point, NIGHT_HOURS};
use crate::scale::{
    domains, palette, BandScale, Color, LegendEntry, LinearScale, OrdinalColorScale,
    SequentialColorScale,
};
use crate::state::FilterSelection;
use crate::types::{Activity, BehaviorSample, Category, DayType};
use serde::Serialize;

const HEATMAP_MARGIN: Margin = Margin::new(40.0, 80.0, 40.0, 80.0);
const TREND_MARGIN: Margin = Margin::new(20.0, 30.0, 50.0, 60.0);
const CLOCK_PADDING: f64 = 30.0;
const PIE_PADDING: f64 = 20.0;
/// Pie labels sit further out than the arc centroid
const PIE_LABEL_OFFSET: f64 = 1.4;
/// Slices at or below this share (percent) get no label
const PIE_LABEL_MIN_PERCENT: f64 = 5.0;
const CELL_PADDING: f64 = 0.05;
/// Early-morning hours are drawn after midnight on the trend axis
const TREND_WRAP_HOUR: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BehaviorPage {
    pub day_type: String,
    pub heatmap: Heatmap,
    pub clock: ClockChart,
    pub activity_pie: ActivityPie,
    pub hourly_trend: TrendChart,
}

pub fn build(
    samples: &[BehaviorSample],
    filters: &FilterSelection,
    viewport: Viewport,
) -> Result<BehaviorPage, DashboardError> {
    Ok(BehaviorPage {
        day_type: filters.day_type.label().to_string(),
        heatmap: heatmap(samples, &filters.day_type, viewport)?,
        clock: clock(samples, viewport)?,
        activity_pie: activity_pie(samples, viewport),
        hourly_trend: hourly_trend(samples, viewport)?,
    })
}

fn hour_label(hour: f64) -> String {
    format!("{hour:.0}:00")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatCell {
    pub hour: f64,
    pub activity: Activity,
    /// Activity share (0-100)
    pub value: f64,
    pub people_count: f64,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub area: PlotArea,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub cells: Vec<HeatCell>,
    /// Gradient stops for the legend bar
    pub gradient: [Color; 2],
}

/// Hour × activity grid for one day type. Duplicate hours are averaged.
pub fn heatmap(
    samples: &[BehaviorSample],
    day_type: &DayType,
    viewport: Viewport,
) -> Result<Heatmap, DashboardError> {
    let area = PlotArea::new(&viewport, HEATMAP_MARGIN);
    let rows = hour_rows(&by_day_type(samples, day_type));

    let x = BandScale::new(
        rows.iter().map(|r| hour_label(r.hour)).collect(),
        (0.0, area.width),
        CELL_PADDING,
    );
    let y = BandScale::new(
        Activity::ALL.iter().map(|a| a.label().to_string()).collect(),
        (0.0, area.height),
        CELL_PADDING,
    );
    let colors = SequentialColorScale::new(domains::PERCENT, palette::SLATE, palette::DANGER)?;

    let mut cells = Vec::with_capacity(rows.len() * Activity::ALL.len());
    for (i, activity) in Activity::ALL.iter().enumerate() {
        for row in &rows {
            let value = row.shares[i];
            cells.push(HeatCell {
                hour: row.hour,
                activity: *activity,
                value,
                people_count: row.people_count,
                rect: Rect {
                    x: x.position(&hour_label(row.hour)).unwrap_or(0.0),
                    y: y.position(activity.label()).unwrap_or(0.0),
                    width: x.bandwidth(),
                    height: y.bandwidth(),
                    color: colors.color(value),
                },
            });
        }
    }

    Ok(Heatmap {
        area,
        x_axis: Axis::band(&x),
        y_axis: Axis::band(&y),
        cells,
        gradient: colors.stops(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClockTick {
    pub hour: u32,
    pub from: Point,
    pub to: Point,
    pub label_at: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClockPoint {
    pub hour: u32,
    /// Mean people online at this hour
    pub value: f64,
    pub point: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClockChart {
    pub radius: f64,
    pub ticks: Vec<ClockTick>,
    /// Closed outline, one point per hour
    pub outline: Vec<ClockPoint>,
    /// Highlighted late-night hours
    pub night_markers: Vec<ClockPoint>,
}

/// Mean people online per hour on a 24-hour dial
pub fn clock(samples: &[BehaviorSample], viewport: Viewport) -> Result<ClockChart, DashboardError> {
    let hourly = hourly_mean(samples, |s| s.people_count);
    let layout = ClockLayout::new(viewport.radius(CLOCK_PADDING), max(&hourly, |h| h.1))?;

    let outline: Vec<ClockPoint> = hourly
        .iter()
        .map(|(hour, value)| ClockPoint {
            hour: *hour,
            value: *value,
            point: layout.point(*hour as f64, *value),
        })
        .collect();

    let night_markers = NIGHT_HOURS
        .iter()
        .filter_map(|h| outline.iter().find(|p| p.hour == *h).cloned())
        .collect();

    let ticks = (0..24u32)
        .map(|hour| {
            let (from, to) = layout.tick(hour);
            ClockTick {
                hour,
                from,
                to,
                label_at: layout.label_anchor(hour),
            }
        })
        .collect();

    Ok(ClockChart {
        radius: layout.radius,
        ticks,
        outline,
        night_markers,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieLabel {
    pub text: String,
    pub at: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityPie {
    pub shape: ArcShape,
    pub hover_shape: ArcShape,
    pub slices: Vec<ArcMark>,
    /// Labels for slices large enough to carry one
    pub labels: Vec<PieLabel>,
}

fn activity_colors() -> OrdinalColorScale {
    let labels: Vec<&str> = Activity::ALL.iter().map(|a| a.label()).collect();
    OrdinalColorScale::new(
        &labels,
        &[
            palette::PINK,
            palette::DANGER,
            palette::TERTIARY,
            palette::SECONDARY,
            palette::SUCCESS,
        ],
    )
}

/// Share of each activity across the late-night window
pub fn activity_pie(samples: &[BehaviorSample], viewport: Viewport) -> ActivityPie {
    let totals = activity_totals(samples);
    let labels: Vec<String> = totals.iter().map(|(a, _)| a.label().to_string()).collect();
    let values: Vec<f64> = totals.iter().map(|(_, v)| *v).collect();
    let shape = ArcShape::pie(viewport.radius(PIE_PADDING));
    let slices = arc_marks(&labels, &values, &activity_colors(), &shape);

    let labels = slices
        .iter()
        .filter(|s| s.percent > PIE_LABEL_MIN_PERCENT)
        .map(|s| PieLabel {
            text: s.label.clone(),
            at: Point {
                x: s.centroid.x * PIE_LABEL_OFFSET,
                y: s.centroid.y * PIE_LABEL_OFFSET,
            },
        })
        .collect();

    ActivityPie {
        hover_shape: shape.hovered(),
        shape,
        slices,
        labels,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub hour: f64,
    pub people_count: f64,
    pub point: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendLine {
    pub key: String,
    pub color: Color,
    pub dashed: bool,
    pub points: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendChart {
    pub area: PlotArea,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub lines: Vec<TrendLine>,
    pub legend: Vec<LegendEntry>,
}

/// Position of an hour on the continuous 22 → 27 axis
fn trend_hour(hour: f64) -> f64 {
    if hour <= TREND_WRAP_HOUR {
        hour + 24.0
    } else {
        hour
    }
}

fn trend_label(value: f64) -> String {
    if value > 23.0 {
        hour_label(value - 24.0)
    } else {
        hour_label(value)
    }
}

/// People online across the late-night window, weekday vs weekend.
///
/// Samples outside the window are left off the lines so they stay on the axis.
pub fn hourly_trend(
    samples: &[BehaviorSample],
    viewport: Viewport,
) -> Result<TrendChart, DashboardError> {
    let area = PlotArea::new(&viewport, TREND_MARGIN);
    let x = LinearScale::new(domains::LATE_NIGHT_HOURS, (0.0, area.width))?;
    let y = LinearScale::zero_based(max(samples, |s| s.people_count), (area.height, 0.0))?;

    let line = |day_type: DayType, color: Color, dashed: bool| {
        let mut points: Vec<TrendPoint> = by_day_type(samples, &day_type)
            .iter()
            .filter(|s| is_late_night(s.hour))
            .map(|s| TrendPoint {
                hour: s.hour,
                people_count: s.people_count,
                point: Point {
                    x: x.scale(trend_hour(s.hour)),
                    y: y.scale(s.people_count),
                },
            })
            .collect();
        points.sort_by(|a, b| trend_hour(a.hour).total_cmp(&trend_hour(b.hour)));
        TrendLine {
            key: day_type.label().to_string(),
            color,
            dashed,
            points,
        }
    };

    let lines = vec![
        line(DayType::Weekday, palette::PRIMARY, false),
        line(DayType::Weekend, palette::PINK, true),
    ];
    let legend = lines
        .iter()
        .map(|l| LegendEntry {
            label: l.key.clone(),
            color: l.color,
        })
        .collect();

    Ok(TrendChart {
        area,
        x_axis: Axis::linear(&x, 5, trend_label).titled("Time"),
        y_axis: Axis::linear(&y, AXIS_TICKS, format_tick).titled("People Online"),
        lines,
        legend,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::fixtures;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_heatmap_follows_day_type() {
        let datasets = fixtures::datasets();
        let weekday = heatmap(&datasets.behavior, &DayType::Weekday, Viewport::default()).unwrap();
        let weekend = heatmap(&datasets.behavior, &DayType::Weekend, Viewport::default()).unwrap();

        assert_eq!(weekday.cells.len(), 5 * 5);
        assert_eq!(weekend.cells.len(), 3 * 5);
        let hours: Vec<_> = weekend.x_axis.ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(hours, vec!["22:00", "23:00", "0:00"]);
    }

    #[test]
    fn test_heatmap_colors() {
        let datasets = fixtures::datasets();
        let map = heatmap(&datasets.behavior, &DayType::Weekday, Viewport::default()).unwrap();

        assert_eq!(map.gradient, [palette::SLATE, palette::DANGER]);
        let cell = map
            .cells
            .iter()
            .find(|c| c.hour == 0.0 && c.activity == Activity::SocialMedia)
            .unwrap();
        assert_eq!(cell.value, 50.0);
        assert_eq!(cell.rect.color, palette::SLATE.lerp(&palette::DANGER, 0.5));
    }

    #[test]
    fn test_heatmap_averages_duplicate_hours() {
        let mut samples = fixtures::datasets().behavior;
        let mut dup = samples[0].clone();
        dup.social_media = 60.0;
        samples.push(dup);

        let map = heatmap(&samples, &DayType::Weekday, Viewport::default()).unwrap();
        let cell = map
            .cells
            .iter()
            .find(|c| c.hour == 22.0 && c.activity == Activity::SocialMedia)
            .unwrap();
        assert_eq!(cell.value, 50.0);
        assert_eq!(map.x_axis.ticks.len(), 5);
    }

    #[test]
    fn test_clock_uses_mean_people() {
        let datasets = fixtures::datasets();
        let chart = clock(&datasets.behavior, Viewport::new(260.0, 260.0)).unwrap();

        assert_eq!(chart.radius, 100.0);
        assert_eq!(chart.outline.len(), 24);
        assert_eq!(chart.ticks.len(), 24);

        // hour 23: (1500 + 1800) / 2 is the maximum, so it reaches the rim
        let eleven = &chart.outline[23];
        assert_eq!(eleven.value, 1650.0);
        let r = (eleven.point.x.powi(2) + eleven.point.y.powi(2)).sqrt();
        assert!((r - 100.0).abs() < 1e-9);

        let marked: Vec<_> = chart.night_markers.iter().map(|p| p.hour).collect();
        assert_eq!(marked, vec![22, 23, 0, 1, 2, 3]);
        assert_eq!(chart.night_markers[4].value, 0.0);
    }

    #[test]
    fn test_activity_pie_labels_only_large_slices() {
        let datasets = fixtures::datasets();
        let pie = activity_pie(&datasets.behavior, Viewport::new(240.0, 240.0));

        assert_eq!(pie.shape.outer_radius, 100.0);
        assert_eq!(pie.hover_shape.outer_radius, 108.0);
        let order: Vec<_> = pie.slices.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(order, vec!["Social Media", "Gaming", "Work/Study", "Video", "Browsing"]);

        let total: f64 = pie.slices.iter().map(|s| s.percent).sum();
        assert!((total - 100.0).abs() < 1e-9);
        assert_eq!(pie.labels.len(), pie.slices.iter().filter(|s| s.percent > 5.0).count());
    }

    #[test]
    fn test_activity_pie_ignores_daytime() {
        let datasets = fixtures::datasets();
        let pie = activity_pie(&datasets.behavior, Viewport::default());

        // hour 12 (work_study 50) is excluded; late-night work_study sums to 47
        assert_eq!(pie.slices[2].value, 47.0);
    }

    #[test]
    fn test_trend_wraps_early_hours() {
        let datasets = fixtures::datasets();
        let chart = hourly_trend(&datasets.behavior, Viewport::new(590.0, 370.0)).unwrap();

        let weekday = &chart.lines[0];
        assert_eq!(weekday.key, "weekday");
        let hours: Vec<_> = weekday.points.iter().map(|p| p.hour).collect();
        assert_eq!(hours, vec![22.0, 23.0, 0.0, 1.0]);
        // 500 wide over [22, 27]: midnight sits at 24 → 200
        assert_eq!(weekday.points[2].point.x, 200.0);

        let weekend = &chart.lines[1];
        assert!(weekend.dashed);
        assert_eq!(weekend.color, palette::PINK);
        assert_eq!(chart.x_axis.ticks.last().map(|t| t.label.as_str()), Some("3:00"));
    }
}
