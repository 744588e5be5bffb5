//! Chart builders
//!
//! Each builder is a pure function from a data subset and a container
//! [`Viewport`] to renderer-ready geometry: positioned marks, axis ticks and
//! colors. Nothing here touches a drawing surface.
//!
//! - [`overview`]: KPIs, activity/quality scatter, radar, BMI × disorder stack, stress donut
//! - [`behavior`]: activity heatmap, 24-hour clock, late-night activity pie, hourly trend
//! - [`health`]: platform impact, age usage, hours vs sleep, addiction ranking
//! - [`global`]: sleep ranking, region comparison, work-hours bubble

pub mod behavior;
pub mod global;
pub mod health;
pub mod overview;

use crate::error::DashboardError;
use crate::filter;
use crate::radial::{pie, ArcShape, Point};
use crate::scale::{BandScale, Color, LinearScale, OrdinalColorScale};
use crate::selection::{FocusListener, RadarPanel};
use crate::state::{DashboardState, Page};
use crate::types::Datasets;
use serde::{Deserialize, Serialize};

/// Pixel size of one chart container
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
        }
    }
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Drawable area inside a margin, never negative
    pub fn inner(&self, margin: &Margin) -> (f64, f64) {
        (
            (self.width - margin.left - margin.right).max(0.0),
            (self.height - margin.top - margin.bottom).max(0.0),
        )
    }

    /// Radius of a centered radial chart leaving `padding` around it
    pub fn radius(&self, padding: f64) -> f64 {
        (self.width.min(self.height) / 2.0 - padding).max(0.0)
    }
}

/// Space reserved around a cartesian plot for axes and labels
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

/// Plot area of a cartesian chart: margin plus inner size
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotArea {
    pub margin: Margin,
    pub width: f64,
    pub height: f64,
}

impl PlotArea {
    pub fn new(viewport: &Viewport, margin: Margin) -> Self {
        let (width, height) = viewport.inner(&margin);
        Self {
            margin,
            width,
            height,
        }
    }
}

/// One axis tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub position: f64,
    pub label: String,
}

/// Ticks along one axis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: Option<String>,
    pub ticks: Vec<Tick>,
}

/// Tick count used for every linear axis
pub const AXIS_TICKS: usize = 10;

impl Axis {
    pub fn linear(scale: &LinearScale, count: usize, format: impl Fn(f64) -> String) -> Self {
        Self {
            title: None,
            ticks: scale
                .ticks(count)
                .into_iter()
                .map(|v| Tick {
                    position: scale.scale(v),
                    label: format(v),
                })
                .collect(),
        }
    }

    pub fn band(scale: &BandScale) -> Self {
        Self {
            title: None,
            ticks: scale
                .domain()
                .iter()
                .filter_map(|k| {
                    scale.center(k).map(|position| Tick {
                        position,
                        label: k.clone(),
                    })
                })
                .collect(),
        }
    }

    pub fn titled(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }
}

/// Default tick label: integers without a decimal point
pub fn format_tick(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

pub fn format_percent(value: f64) -> String {
    format!("{}%", format_tick(value))
}

/// Axis-aligned rectangle in plot coordinates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: Color,
}

/// Vertical bar from the baseline (`y_scale` at `base`) up to `value`
pub fn vertical_bar(
    x: f64,
    width: f64,
    base: f64,
    value: f64,
    y_scale: &LinearScale,
    color: Color,
) -> Rect {
    let (top, bottom) = (y_scale.scale(value), y_scale.scale(base));
    Rect {
        x,
        y: top.min(bottom),
        width,
        height: (bottom - top).abs(),
        color,
    }
}

/// Circle mark; `key` identifies the datum it represents
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Circle {
    pub key: String,
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
    pub color: Color,
}

/// One pie/donut slice ready to draw
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArcMark {
    pub label: String,
    pub value: f64,
    /// Share of the total (0-100)
    pub percent: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub color: Color,
    pub centroid: Point,
}

/// Lay out labeled values as arcs, keeping input order
pub fn arc_marks(
    labels: &[String],
    values: &[f64],
    colors: &OrdinalColorScale,
    shape: &ArcShape,
) -> Vec<ArcMark> {
    let total: f64 = values.iter().filter(|v| v.is_finite() && **v > 0.0).sum();
    pie(values)
        .into_iter()
        .zip(labels)
        .map(|(slice, label)| ArcMark {
            label: label.clone(),
            value: slice.value,
            percent: if total > 0.0 {
                slice.value / total * 100.0
            } else {
                0.0
            },
            start_angle: slice.start_angle,
            end_angle: slice.end_angle,
            color: colors.color(label),
            centroid: shape.centroid(&slice),
        })
        .collect()
}

/// Charts of whichever page is active
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "page", rename_all = "lowercase")]
pub enum PageCharts {
    Overview(overview::OverviewPage),
    Behavior(behavior::BehaviorPage),
    Health(health::HealthPage),
    Global(global::GlobalPage),
}

impl PageCharts {
    pub fn page(&self) -> Page {
        match self {
            PageCharts::Overview(_) => Page::Overview,
            PageCharts::Behavior(_) => Page::Behavior,
            PageCharts::Health(_) => Page::Health,
            PageCharts::Global(_) => Page::Global,
        }
    }
}

/// Build every chart of the active page for one state
pub fn render_page(
    datasets: &Datasets,
    state: &DashboardState,
    viewport: Viewport,
) -> Result<PageCharts, DashboardError> {
    log::debug!(
        "rendering {} page at {}x{}",
        state.page.as_str(),
        viewport.width,
        viewport.height
    );

    Ok(match state.page {
        Page::Overview => {
            let mut radar = RadarPanel::new();
            radar.set_subset(&filter::by_occupation(
                &datasets.health,
                &state.filters.occupation,
            ));
            radar.on_focus(state.focus.as_ref());
            PageCharts::Overview(overview::build(
                &datasets.health,
                &state.filters,
                &radar,
                viewport,
            )?)
        }
        Page::Behavior => PageCharts::Behavior(behavior::build(
            &datasets.behavior,
            &state.filters,
            viewport,
        )?),
        Page::Health => {
            PageCharts::Health(health::build(&datasets.social, &state.filters, viewport)?)
        }
        Page::Global => {
            PageCharts::Global(global::build(&datasets.global, &state.filters, viewport)?)
        }
    })
}
