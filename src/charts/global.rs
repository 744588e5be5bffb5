//! Global comparison page

use super::{
    format_percent, format_tick, vertical_bar, Axis, Circle, Margin, PlotArea, Rect, Viewport,
    AXIS_TICKS,
};
use crate::aggregate::{distinct, grouped_means, max};
use crate::error::DashboardError;
use crate::filter::{rank_by, SortOrder};
use crate::scale::{
    domains, palette, BandScale, LegendEntry, LinearScale, OrdinalColorScale,
    SequentialColorScale,
};
use crate::state::FilterSelection;
use crate::types::CountryStat;
use serde::Serialize;

const RANKING_MARGIN: Margin = Margin::new(20.0, 30.0, 40.0, 120.0);
const REGION_MARGIN: Margin = Margin::new(20.0, 30.0, 50.0, 60.0);
const BUBBLE_MARGIN: Margin = Margin::new(20.0, 30.0, 60.0, 70.0);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlobalPage {
    pub sort: SortOrder,
    pub ranking: RankingChart,
    pub regions: RegionChart,
    pub bubble: BubbleChart,
}

pub fn build(
    countries: &[CountryStat],
    filters: &FilterSelection,
    viewport: Viewport,
) -> Result<GlobalPage, DashboardError> {
    Ok(GlobalPage {
        sort: filters.sort,
        ranking: ranking(countries, filters.sort, viewport)?,
        regions: regions(countries, viewport)?,
        bubble: bubble(countries, viewport)?,
    })
}

/// Regions in first-appearance order, each with a fixed palette slot
fn region_colors(countries: &[CountryStat]) -> OrdinalColorScale {
    let regions = distinct(countries, |c| c.region.clone());
    OrdinalColorScale::new(&regions, &palette::CATEGORICAL)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryBar {
    pub country: String,
    pub avg_sleep_hours: f64,
    pub late_night_rate_pct: f64,
    pub bar: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingChart {
    pub area: PlotArea,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub bars: Vec<CountryBar>,
}

/// Countries by average sleep, in the requested direction
pub fn ranking(
    countries: &[CountryStat],
    order: SortOrder,
    viewport: Viewport,
) -> Result<RankingChart, DashboardError> {
    let area = PlotArea::new(&viewport, RANKING_MARGIN);
    let ranked = rank_by(countries, order, |c| c.avg_sleep_hours);

    let x = LinearScale::new(domains::RANKING_SLEEP, (0.0, area.width))?;
    let y = BandScale::new(
        ranked.iter().map(|c| c.country.clone()).collect(),
        (0.0, area.height),
        0.2,
    );
    let colors =
        SequentialColorScale::new(domains::COUNTRY_SLEEP, palette::DANGER, palette::SUCCESS)?;

    let bars = ranked
        .iter()
        .map(|c| CountryBar {
            country: c.country.clone(),
            avg_sleep_hours: c.avg_sleep_hours,
            late_night_rate_pct: c.late_night_rate_pct,
            bar: Rect {
                x: 0.0,
                y: y.position(&c.country).unwrap_or(0.0),
                width: x.scale(c.avg_sleep_hours),
                height: y.bandwidth(),
                color: colors.color(c.avg_sleep_hours),
            },
        })
        .collect();

    Ok(RankingChart {
        area,
        x_axis: Axis::linear(&x, AXIS_TICKS, format_tick).titled("Average Sleep (hours)"),
        y_axis: Axis::band(&y),
        bars,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionBar {
    pub region: String,
    pub countries: usize,
    pub avg_late_night_pct: f64,
    pub avg_sleep_hours: f64,
    pub bar: Rect,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionChart {
    pub area: PlotArea,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub bars: Vec<RegionBar>,
}

/// Mean late-night rate per region, highest first
pub fn regions(countries: &[CountryStat], viewport: Viewport) -> Result<RegionChart, DashboardError> {
    let area = PlotArea::new(&viewport, REGION_MARGIN);
    let groups = grouped_means(
        countries,
        |c| c.region.clone(),
        &[&|c: &CountryStat| c.late_night_rate_pct, &|c: &CountryStat| {
            c.avg_sleep_hours
        }],
    );
    let ranked = rank_by(&groups, SortOrder::Descending, |g| g.means[0]);

    let x = BandScale::new(
        ranked.iter().map(|g| g.key.clone()).collect(),
        (0.0, area.width),
        0.3,
    );
    let y = LinearScale::new(domains::PERCENT, (area.height, 0.0))?;
    let colors = region_colors(countries);

    let bars = ranked
        .iter()
        .map(|g| RegionBar {
            region: g.key.clone(),
            countries: g.count,
            avg_late_night_pct: g.means[0],
            avg_sleep_hours: g.means[1],
            bar: vertical_bar(
                x.position(&g.key).unwrap_or(0.0),
                x.bandwidth(),
                0.0,
                g.means[0],
                &y,
                colors.color(&g.key),
            ),
        })
        .collect();

    Ok(RegionChart {
        area,
        x_axis: Axis::band(&x).titled("Region"),
        y_axis: Axis::linear(&y, AXIS_TICKS, format_percent),
        bars,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BubbleChart {
    pub area: PlotArea,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub bubbles: Vec<Circle>,
    pub legend: Vec<LegendEntry>,
}

/// Work hours vs sleep per country; bubble size tracks internet hours
pub fn bubble(countries: &[CountryStat], viewport: Viewport) -> Result<BubbleChart, DashboardError> {
    let area = PlotArea::new(&viewport, BUBBLE_MARGIN);
    let x = LinearScale::new(domains::WORK_HOURS, (0.0, area.width))?;
    let y = LinearScale::new(domains::COUNTRY_SLEEP, (area.height, 0.0))?;
    let size = LinearScale::zero_based(
        max(countries, |c| c.internet_hours_per_day),
        domains::BUBBLE_RADIUS,
    )?;
    let colors = region_colors(countries);

    let bubbles = countries
        .iter()
        .map(|c| Circle {
            key: c.country.clone(),
            cx: x.scale(c.work_hours_per_week),
            cy: y.scale(c.avg_sleep_hours),
            r: size.scale(c.internet_hours_per_day),
            color: colors.color(&c.region),
        })
        .collect();

    Ok(BubbleChart {
        area,
        x_axis: Axis::linear(&x, AXIS_TICKS, format_tick).titled("Work Hours per Week"),
        y_axis: Axis::linear(&y, AXIS_TICKS, format_tick).titled("Average Sleep (hours)"),
        bubbles,
        legend: colors.legend(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::fixtures;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ranking_sort_toggle() {
        let datasets = fixtures::datasets();

        let asc = ranking(&datasets.global, SortOrder::Ascending, Viewport::default()).unwrap();
        assert_eq!(asc.bars[0].country, "Japan");
        assert_eq!(asc.y_axis.ticks[0].label, "Japan");

        let desc = ranking(&datasets.global, SortOrder::Descending, Viewport::default()).unwrap();
        assert_eq!(desc.bars[0].country, "Netherlands");
    }

    #[test]
    fn test_ranking_bar_encoding() {
        let datasets = fixtures::datasets();
        let chart = ranking(&datasets.global, SortOrder::Ascending, Viewport::new(550.0, 300.0))
            .unwrap();

        // 400 wide over [0, 8]
        let netherlands = chart.bars.iter().find(|b| b.country == "Netherlands").unwrap();
        assert!((netherlands.bar.width - 380.0).abs() < 1e-9);
        assert_eq!(
            netherlands.bar.color,
            palette::DANGER.lerp(&palette::SUCCESS, 0.8)
        );
    }

    #[test]
    fn test_regions_ranked_by_late_night_rate() {
        let datasets = fixtures::datasets();
        let chart = regions(&datasets.global, Viewport::default()).unwrap();

        let order: Vec<_> = chart.bars.iter().map(|b| b.region.as_str()).collect();
        assert_eq!(order, vec!["Asia", "North America", "Europe"]);
        assert_eq!(chart.bars[0].countries, 2);
        assert_eq!(chart.bars[0].avg_late_night_pct, 47.5);
    }

    #[test]
    fn test_region_colors_stable_across_charts() {
        let datasets = fixtures::datasets();
        let region_chart = regions(&datasets.global, Viewport::default()).unwrap();
        let bubble_chart = bubble(&datasets.global, Viewport::default()).unwrap();

        let europe_bar = region_chart.bars.iter().find(|b| b.region == "Europe").unwrap();
        let europe_bubble = bubble_chart.bubbles.iter().find(|b| b.key == "Netherlands").unwrap();
        assert_eq!(europe_bar.bar.color, europe_bubble.color);
        assert_eq!(europe_bubble.color, palette::CATEGORICAL[1]);
    }

    #[test]
    fn test_bubble_size_range() {
        let datasets = fixtures::datasets();
        let chart = bubble(&datasets.global, Viewport::default()).unwrap();

        // United States has the most internet hours
        let us = chart.bubbles.iter().find(|b| b.key == "United States").unwrap();
        assert_eq!(us.r, 25.0);
        assert!(chart.bubbles.iter().all(|b| b.r >= 5.0 && b.r <= 25.0));
    }

    #[test]
    fn test_build_keeps_sort() {
        let datasets = fixtures::datasets();
        let filters = FilterSelection {
            sort: SortOrder::Descending,
            ..Default::default()
        };
        let page = build(&datasets.global, &filters, Viewport::default()).unwrap();
        assert_eq!(page.sort, SortOrder::Descending);
        assert_eq!(page.ranking.bars.len(), 4);
    }
}
