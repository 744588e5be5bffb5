//! Overview page: KPIs and the four health charts, all driven by the
//! occupation filter.

use super::{
    arc_marks, format_tick, vertical_bar, ArcMark, Axis, Circle, Margin, PlotArea, Rect,
    Viewport, AXIS_TICKS,
};
use crate::aggregate::{bucketize, group_counts, stack, Buckets, KpiDisplay, Kpis};
use crate::error::DashboardError;
use crate::filter::{by_occupation, occupation_options};
use crate::radial::{ArcShape, Point, RadarAxis, RadarLayout};
use crate::scale::{
    domains, palette, BandScale, Color, LegendEntry, LinearScale, OrdinalColorScale,
};
use crate::selection::RadarPanel;
use crate::state::FilterSelection;
use crate::types::{BmiCategory, Category, HealthRecord, SleepDisorder};
use serde::Serialize;

const SCATTER_MARGIN: Margin = Margin::new(20.0, 20.0, 60.0, 60.0);
const STACK_MARGIN: Margin = Margin::new(20.0, 100.0, 40.0, 60.0);
const RADAR_PADDING: f64 = 40.0;
const DONUT_PADDING: f64 = 30.0;
const DONUT_HOLE: f64 = 0.6;
/// Bubble radius per hour of sleep
const SLEEP_RADIUS_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewPage {
    pub kpis: Kpis,
    pub kpi_display: KpiDisplay,
    /// Occupation dropdown entries (always the full list)
    pub occupations: Vec<String>,
    pub scatter: ScatterChart,
    pub radar: RadarChart,
    pub stacked_bar: StackedBarChart,
    pub stress_donut: DonutChart,
}

pub fn build(
    records: &[HealthRecord],
    filters: &FilterSelection,
    radar: &RadarPanel,
    viewport: Viewport,
) -> Result<OverviewPage, DashboardError> {
    let subset = by_occupation(records, &filters.occupation);
    let kpis = Kpis::compute(&subset);

    Ok(OverviewPage {
        kpi_display: kpis.display(),
        kpis,
        occupations: occupation_options(records),
        scatter: scatter(&subset, viewport)?,
        radar: radar_chart(radar, viewport)?,
        stacked_bar: stacked_bar(&subset, viewport)?,
        stress_donut: stress_donut(&subset, viewport),
    })
}

fn bmi_colors() -> OrdinalColorScale {
    let labels: Vec<String> = BmiCategory::DECLARED
        .iter()
        .map(|c| c.label().to_string())
        .collect();
    OrdinalColorScale::new(&labels, &palette::TRAFFIC_LIGHT)
}

/// Activity vs sleep quality, bubble size by sleep duration, color by BMI
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScatterChart {
    pub area: PlotArea,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub points: Vec<Circle>,
    pub legend: Vec<LegendEntry>,
}

pub fn scatter(subset: &[HealthRecord], viewport: Viewport) -> Result<ScatterChart, DashboardError> {
    let area = PlotArea::new(&viewport, SCATTER_MARGIN);
    let x = LinearScale::new(domains::ACTIVITY, (0.0, area.width))?;
    let y = LinearScale::new(domains::SLEEP_QUALITY, (area.height, 0.0))?;
    let colors = bmi_colors();

    let points = subset
        .iter()
        .map(|r| Circle {
            key: r.id.clone(),
            cx: x.scale(r.activity_level),
            cy: y.scale(r.sleep_quality),
            r: r.sleep_duration * SLEEP_RADIUS_FACTOR,
            color: colors.color(r.bmi_category.label()),
        })
        .collect();

    Ok(ScatterChart {
        area,
        x_axis: Axis::linear(&x, AXIS_TICKS, format_tick).titled("Physical Activity (min/day)"),
        y_axis: Axis::linear(&y, AXIS_TICKS, format_tick).titled("Sleep Quality (1-10)"),
        points,
        legend: colors.legend(),
    })
}

/// Overlay polygon for the focused record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarFocusShape {
    pub id: String,
    pub occupation: String,
    pub values: Vec<f64>,
    pub polygon: Vec<Point>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarChart {
    pub radius: f64,
    pub grid_radii: Vec<f64>,
    pub axes: Vec<RadarAxis>,
    /// Mean profile of the filtered subset; absent when the subset is empty
    pub baseline: Option<Vec<Point>>,
    pub baseline_values: Option<Vec<f64>>,
    pub focus: Option<RadarFocusShape>,
}

pub fn radar_chart(panel: &RadarPanel, viewport: Viewport) -> Result<RadarChart, DashboardError> {
    let layout = RadarLayout::new(viewport.radius(RADAR_PADDING))?;

    Ok(RadarChart {
        radius: layout.radius,
        grid_radii: layout.grid_radii(),
        axes: layout.axes(),
        baseline: panel.baseline().map(|p| layout.polygon(p)),
        baseline_values: panel.baseline().map(|p| p.values.clone()),
        focus: panel.overlay().map(|o| RadarFocusShape {
            id: o.id.clone(),
            occupation: o.occupation.clone(),
            values: o.profile.values.clone(),
            polygon: layout.polygon(&o.profile),
        }),
    })
}

/// Bars for one disorder, stacked across BMI categories
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackLayer {
    pub key: String,
    pub color: Color,
    pub bars: Vec<StackedRect>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedRect {
    pub group: String,
    pub count: usize,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StackedBarChart {
    pub area: PlotArea,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub layers: Vec<StackLayer>,
    pub legend: Vec<LegendEntry>,
}

/// BMI category × sleep disorder counts, disorders stacked in declared order
pub fn stacked_bar(
    subset: &[HealthRecord],
    viewport: Viewport,
) -> Result<StackedBarChart, DashboardError> {
    let area = PlotArea::new(&viewport, STACK_MARGIN);
    let grouped = group_counts(
        subset,
        &BmiCategory::DECLARED,
        &SleepDisorder::DECLARED,
        |r| &r.bmi_category,
        |r| &r.sleep_disorder,
    );
    let series = stack(&grouped, &SleepDisorder::DECLARED);

    let groups: Vec<String> = BmiCategory::DECLARED
        .iter()
        .map(|c| c.label().to_string())
        .collect();
    let x = BandScale::new(groups, (0.0, area.width), 0.3);
    let max_total = grouped.iter().map(|g| g.total()).max().map(|m| m as f64);
    let y = LinearScale::zero_based(max_total, (area.height, 0.0))?;

    let disorder_labels: Vec<String> = SleepDisorder::DECLARED
        .iter()
        .map(|d| d.label().to_string())
        .collect();
    let colors = OrdinalColorScale::new(&disorder_labels, &palette::TRAFFIC_LIGHT);

    let layers = series
        .iter()
        .map(|s| {
            let color = colors.color(s.key.label());
            StackLayer {
                key: s.key.label().to_string(),
                color,
                bars: s
                    .bands
                    .iter()
                    .map(|band| StackedRect {
                        group: band.group.label().to_string(),
                        count: band.count,
                        rect: vertical_bar(
                            x.position(band.group.label()).unwrap_or(0.0),
                            x.bandwidth(),
                            band.start,
                            band.end,
                            &y,
                            color,
                        ),
                    })
                    .collect(),
            }
        })
        .collect();

    Ok(StackedBarChart {
        area,
        x_axis: Axis::band(&x),
        y_axis: Axis::linear(&y, AXIS_TICKS, format_tick),
        layers,
        legend: colors.legend(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonutChart {
    pub shape: ArcShape,
    pub hover_shape: ArcShape,
    pub slices: Vec<ArcMark>,
}

/// Stress band shares; bands stay in low → high order
pub fn stress_donut(subset: &[HealthRecord], viewport: Viewport) -> DonutChart {
    let buckets = Buckets::stress();
    let counts = bucketize(subset, |r| r.stress_level, &buckets);
    let labels = buckets.labels();
    let values: Vec<f64> = counts.iter().map(|c| c.count as f64).collect();
    let colors = OrdinalColorScale::new(&labels, &palette::TRAFFIC_LIGHT);
    let shape = ArcShape::donut(viewport.radius(DONUT_PADDING), DONUT_HOLE);

    DonutChart {
        hover_shape: shape.hovered(),
        slices: arc_marks(&labels, &values, &colors, &shape),
        shape,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Selector;
    use crate::loader::fixtures;
    use crate::selection::FocusListener;
    use pretty_assertions::assert_eq;

    fn panel_for(subset: &[HealthRecord]) -> RadarPanel {
        let mut panel = RadarPanel::new();
        panel.set_subset(subset);
        panel
    }

    #[test]
    fn test_build_full_page() {
        let datasets = fixtures::datasets();
        let page = build(
            &datasets.health,
            &FilterSelection::default(),
            &panel_for(&datasets.health),
            Viewport::default(),
        )
        .unwrap();

        assert_eq!(page.kpis.total, 6);
        assert_eq!(page.kpi_display.avg_stress, "5.7");
        assert_eq!(page.kpi_display.disorder_rate_pct, "50.0");
        assert_eq!(page.occupations.len(), 4);
        assert_eq!(page.scatter.points.len(), 6);
        assert!(page.radar.baseline.is_some());
        assert!(page.radar.focus.is_none());
    }

    #[test]
    fn test_filter_narrows_charts_not_dropdown() {
        let datasets = fixtures::datasets();
        let filters = FilterSelection {
            occupation: Selector::parse("Teacher"),
            ..Default::default()
        };
        let subset = by_occupation(&datasets.health, &filters.occupation);
        let page = build(&datasets.health, &filters, &panel_for(&subset), Viewport::default())
            .unwrap();

        assert_eq!(page.kpis.total, 2);
        assert_eq!(page.scatter.points.len(), 2);
        assert_eq!(page.occupations.len(), 4);
    }

    #[test]
    fn test_category_colors_stable_across_filters() {
        let datasets = fixtures::datasets();
        let viewport = Viewport::default();
        let full = build(
            &datasets.health,
            &FilterSelection::default(),
            &panel_for(&datasets.health),
            viewport,
        )
        .unwrap();

        for occupation in ["Nurse", "Teacher", "Doctor"] {
            let filters = FilterSelection {
                occupation: Selector::parse(occupation),
                ..Default::default()
            };
            let subset = by_occupation(&datasets.health, &filters.occupation);
            let page = build(&datasets.health, &filters, &panel_for(&subset), viewport).unwrap();

            assert!(!page.scatter.points.is_empty());
            for point in &page.scatter.points {
                let same = full.scatter.points.iter().find(|p| p.key == point.key).unwrap();
                assert_eq!(point.color, same.color);
            }
            assert_eq!(page.scatter.legend, full.scatter.legend);

            let layer_colors: Vec<_> = page.stacked_bar.layers.iter().map(|l| l.color).collect();
            let full_layer_colors: Vec<_> =
                full.stacked_bar.layers.iter().map(|l| l.color).collect();
            assert_eq!(layer_colors, full_layer_colors);
            assert_eq!(page.stacked_bar.legend, full.stacked_bar.legend);

            let slice_colors: Vec<_> = page.stress_donut.slices.iter().map(|s| s.color).collect();
            let full_slice_colors: Vec<_> =
                full.stress_donut.slices.iter().map(|s| s.color).collect();
            assert_eq!(slice_colors, full_slice_colors);
        }
    }

    #[test]
    fn test_scatter_encoding() {
        let datasets = fixtures::datasets();
        let chart = scatter(&datasets.health, Viewport::new(480.0, 400.0)).unwrap();

        // 400 wide plot over [20, 100]; activity 60 sits halfway
        let doctor = chart.points.iter().find(|p| p.key == "2").unwrap();
        assert_eq!(doctor.cx, 200.0);
        assert!((doctor.r - 6.2 * 1.5).abs() < 1e-9);
        assert_eq!(doctor.color, palette::SUCCESS);

        let obese = chart.points.iter().find(|p| p.key == "5").unwrap();
        assert_eq!(obese.color, palette::DANGER);
        assert_eq!(chart.legend.len(), 3);
    }

    #[test]
    fn test_stacked_bar_is_dense_and_ordered() {
        let datasets = fixtures::datasets();
        let chart = stacked_bar(&datasets.health, Viewport::default()).unwrap();

        let keys: Vec<_> = chart.layers.iter().map(|l| l.key.as_str()).collect();
        assert_eq!(keys, vec!["No Disorder", "Sleep Apnea", "Insomnia"]);
        assert!(chart.layers.iter().all(|l| l.bars.len() == 3));

        // Obese has no "No Disorder" records but still gets a zero-height bar
        let obese = &chart.layers[0].bars[2];
        assert_eq!(obese.group, "Obese");
        assert_eq!(obese.count, 0);
        assert_eq!(obese.rect.height, 0.0);
    }

    #[test]
    fn test_stress_donut_order_and_shares() {
        let datasets = fixtures::datasets();
        let donut = stress_donut(&datasets.health, Viewport::new(300.0, 300.0));

        assert_eq!(donut.shape.outer_radius, 120.0);
        assert_eq!(donut.shape.inner_radius, 72.0);
        assert_eq!(donut.hover_shape.outer_radius, 128.0);

        let counts: Vec<_> = donut.slices.iter().map(|s| s.value).collect();
        // stress 6, 8, 8, 4, 5, 3
        assert_eq!(counts, vec![2.0, 2.0, 2.0]);
        assert_eq!(donut.slices[0].label, "Low Stress (1-4)");
        assert_eq!(donut.slices[2].color, palette::DANGER);
    }

    #[test]
    fn test_radar_focus_overlay() {
        let datasets = fixtures::datasets();
        let mut panel = panel_for(&datasets.health);
        panel.on_focus(datasets.health_record("4"));

        let chart = radar_chart(&panel, Viewport::new(300.0, 300.0)).unwrap();
        assert_eq!(chart.radius, 110.0);
        assert_eq!(chart.grid_radii.len(), 5);
        let focus = chart.focus.unwrap();
        assert_eq!(focus.id, "4");
        assert_eq!(focus.polygon.len(), 5);
    }

    #[test]
    fn test_empty_subset() {
        let page = build(
            &[],
            &FilterSelection::default(),
            &panel_for(&[]),
            Viewport::default(),
        )
        .unwrap();

        assert_eq!(page.kpi_display.avg_sleep_hours, "-");
        assert!(page.radar.baseline.is_none());
        assert!(page.stress_donut.slices.iter().all(|s| s.percent == 0.0));
    }
}
