//! Radial layouts
//!
//! Geometry for the radar, 24-hour clock and pie/donut charts. Angles are in
//! radians, measured clockwise from 12 o'clock; points are relative to the
//! chart center with y growing downward.

use crate::aggregate::mean;
use crate::error::DashboardError;
use crate::scale::{domains, LinearScale};
use crate::types::HealthRecord;
use serde::Serialize;
use std::f64::consts::{FRAC_PI_2, TAU};

/// A point relative to the chart center
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Point at `radius` along an angle measured from 12 o'clock
    pub fn polar(angle: f64, radius: f64) -> Self {
        let a = angle - FRAC_PI_2;
        Self {
            x: radius * a.cos(),
            y: radius * a.sin(),
        }
    }
}

/// Radar axes, in drawing order (clockwise from the top)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RadarFeature {
    SleepDuration,
    SleepQuality,
    Stress,
    Activity,
    HeartRate,
}

impl RadarFeature {
    pub const ALL: [RadarFeature; 5] = [
        RadarFeature::SleepDuration,
        RadarFeature::SleepQuality,
        RadarFeature::Stress,
        RadarFeature::Activity,
        RadarFeature::HeartRate,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RadarFeature::SleepDuration => "Sleep Duration",
            RadarFeature::SleepQuality => "Sleep Quality",
            RadarFeature::Stress => "Stress",
            RadarFeature::Activity => "Activity",
            RadarFeature::HeartRate => "Heart Rate",
        }
    }

    pub fn raw(&self, record: &HealthRecord) -> f64 {
        match self {
            RadarFeature::SleepDuration => record.sleep_duration,
            RadarFeature::SleepQuality => record.sleep_quality,
            RadarFeature::Stress => record.stress_level,
            RadarFeature::Activity => record.activity_level,
            RadarFeature::HeartRate => record.heart_rate,
        }
    }

    /// Map a raw metric onto the shared [0, 10] radar scale; larger is better.
    ///
    /// - sleep duration: hours, capped at 10
    /// - sleep quality: already 1-10
    /// - stress: inverted, `10 - stress`
    /// - activity: minutes/day divided by 10
    /// - heart rate: `(80 - |hr - 70|) / 80 * 10`, peaking at 70 bpm
    pub fn normalize(&self, raw: f64) -> f64 {
        let value = match self {
            RadarFeature::SleepDuration => raw,
            RadarFeature::SleepQuality => raw,
            RadarFeature::Stress => 10.0 - raw,
            RadarFeature::Activity => raw / 10.0,
            RadarFeature::HeartRate => (80.0 - (raw - 70.0).abs()) / 80.0 * 10.0,
        };
        value.clamp(domains::RADAR.0, domains::RADAR.1)
    }
}

/// Normalized radar values in [`RadarFeature::ALL`] order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarProfile {
    pub values: Vec<f64>,
}

impl RadarProfile {
    pub fn from_record(record: &HealthRecord) -> Self {
        Self {
            values: RadarFeature::ALL
                .iter()
                .map(|f| f.normalize(f.raw(record)))
                .collect(),
        }
    }

    /// Profile of the per-feature means. `None` for an empty subset.
    pub fn baseline(subset: &[HealthRecord]) -> Option<Self> {
        let values = RadarFeature::ALL
            .iter()
            .map(|f| mean(subset, |r| f.raw(r)).map(|m| f.normalize(m)))
            .collect::<Option<Vec<f64>>>()?;
        Some(Self { values })
    }
}

/// Fixed geometry of the radar chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarLayout {
    pub radius: f64,
    pub angle_step: f64,
    radius_scale: LinearScale,
}

/// Concentric grid rings, in radar units
pub const RADAR_GRID_LEVELS: [f64; 5] = [2.0, 4.0, 6.0, 8.0, 10.0];
/// Axis labels sit just outside the outer ring
pub const RADAR_LABEL_LEVEL: f64 = 12.0;

impl RadarLayout {
    pub fn new(radius: f64) -> Result<Self, DashboardError> {
        Ok(Self {
            radius,
            angle_step: TAU / RadarFeature::ALL.len() as f64,
            radius_scale: LinearScale::new(domains::RADAR, (0.0, radius))?,
        })
    }

    pub fn axis_angle(&self, index: usize) -> f64 {
        self.angle_step * index as f64
    }

    pub fn point(&self, index: usize, value: f64) -> Point {
        Point::polar(self.axis_angle(index), self.radius_scale.scale(value))
    }

    /// Closed polygon vertices for a profile
    pub fn polygon(&self, profile: &RadarProfile) -> Vec<Point> {
        profile
            .values
            .iter()
            .enumerate()
            .map(|(i, v)| self.point(i, *v))
            .collect()
    }

    pub fn grid_radii(&self) -> Vec<f64> {
        RADAR_GRID_LEVELS
            .iter()
            .map(|l| self.radius_scale.scale(*l))
            .collect()
    }

    /// Axis spokes: (feature, outer end, label anchor)
    pub fn axes(&self) -> Vec<RadarAxis> {
        RadarFeature::ALL
            .iter()
            .enumerate()
            .map(|(i, f)| RadarAxis {
                feature: *f,
                label: f.label().to_string(),
                end: self.point(i, domains::RADAR.1),
                label_at: self.point(i, RADAR_LABEL_LEVEL),
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarAxis {
    pub feature: RadarFeature,
    pub label: String,
    pub end: Point,
    pub label_at: Point,
}

/// Hours emphasized on the clock as the late-night window
pub const NIGHT_HOURS: [u32; 6] = [22, 23, 0, 1, 2, 3];

/// 24-hour clock: hour → angle, value → radius
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClockLayout {
    pub radius: f64,
    pub angle_step: f64,
    radius_scale: LinearScale,
}

impl ClockLayout {
    /// `max_value` sets the radial domain `[0, max]`
    pub fn new(radius: f64, max_value: Option<f64>) -> Result<Self, DashboardError> {
        Ok(Self {
            radius,
            angle_step: TAU / 24.0,
            radius_scale: LinearScale::zero_based(max_value, (0.0, radius))?,
        })
    }

    pub fn angle(&self, hour: f64) -> f64 {
        self.angle_step * hour
    }

    pub fn point(&self, hour: f64, value: f64) -> Point {
        Point::polar(self.angle(hour), self.radius_scale.scale(value))
    }

    /// Tick mark from 0.9r to r
    pub fn tick(&self, hour: u32) -> (Point, Point) {
        let angle = self.angle(hour as f64);
        (
            Point::polar(angle, self.radius * 0.9),
            Point::polar(angle, self.radius),
        )
    }

    pub fn label_anchor(&self, hour: u32) -> Point {
        Point::polar(self.angle(hour as f64), self.radius * 1.15)
    }
}

/// One slice of a pie layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    /// Position in the input sequence
    pub index: usize,
    pub value: f64,
    pub start_angle: f64,
    pub end_angle: f64,
}

impl PieSlice {
    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) / 2.0
    }

    /// Share of the full circle (0-1)
    pub fn fraction(&self) -> f64 {
        (self.end_angle - self.start_angle) / TAU
    }
}

/// Lay out slices in input order starting at 12 o'clock.
///
/// Slices are never re-sorted by value. Non-positive and non-finite values get
/// zero width; an all-zero input yields zero-width slices at angle 0.
pub fn pie(values: &[f64]) -> Vec<PieSlice> {
    let weight = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
    let total: f64 = values.iter().map(|v| weight(*v)).sum();
    let k = if total > 0.0 { TAU / total } else { 0.0 };

    let mut angle = 0.0;
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let start_angle = angle;
            angle += weight(*value) * k;
            PieSlice {
                index,
                value: *value,
                start_angle,
                end_angle: angle,
            }
        })
        .collect()
}

/// Annular sector radii
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArcShape {
    pub inner_radius: f64,
    pub outer_radius: f64,
}

/// Extra outer radius applied to a hovered slice
pub const ARC_HOVER_GROWTH: f64 = 8.0;

impl ArcShape {
    /// Full pie (no hole)
    pub fn pie(radius: f64) -> Self {
        Self {
            inner_radius: 0.0,
            outer_radius: radius,
        }
    }

    /// Donut whose hole is `ratio` of the outer radius
    pub fn donut(radius: f64, ratio: f64) -> Self {
        Self {
            inner_radius: radius * ratio,
            outer_radius: radius,
        }
    }

    pub fn hovered(&self) -> Self {
        Self {
            inner_radius: self.inner_radius,
            outer_radius: self.outer_radius + ARC_HOVER_GROWTH,
        }
    }

    /// Midpoint of the slice, halfway between inner and outer radius
    pub fn centroid(&self, slice: &PieSlice) -> Point {
        let r = (self.inner_radius + self.outer_radius) / 2.0;
        Point::polar(slice.mid_angle(), r)
    }
}
