//! Scale and encoding mapping
//!
//! Domain → range mappings consumed by the chart builders:
//! - [`LinearScale`] for axes, positions and radii
//! - [`BandScale`] for categorical axes and bar positions
//! - [`OrdinalColorScale`] for fixed category palettes
//! - [`SequentialColorScale`] for intensity gradients
//!
//! Comparability domains are fixed constants (see [`domains`]) so that a
//! filter change never rescales an axis.

use crate::error::DashboardError;
use serde::{Serialize, Serializer};

/// Fixed comparability domains
pub mod domains {
    /// Physical activity (minutes/day), scatter x axis
    pub const ACTIVITY: (f64, f64) = (20.0, 100.0);
    /// Sleep quality, scatter y axis
    pub const SLEEP_QUALITY: (f64, f64) = (3.0, 10.0);
    /// Stress level
    pub const STRESS: (f64, f64) = (1.0, 10.0);
    /// Common radial scale every radar feature is normalized onto
    pub const RADAR: (f64, f64) = (0.0, 10.0);
    /// Percent shares and rates
    pub const PERCENT: (f64, f64) = (0.0, 100.0);
    /// Ten-point scores (sleep quality score, addiction)
    pub const SCORE: (f64, f64) = (0.0, 10.0);
    /// Country ranking bar length (hours)
    pub const RANKING_SLEEP: (f64, f64) = (0.0, 8.0);
    /// Country ranking color and bubble y axis (hours)
    pub const COUNTRY_SLEEP: (f64, f64) = (6.0, 8.0);
    /// Weekly work hours, bubble x axis
    pub const WORK_HOURS: (f64, f64) = (35.0, 55.0);
    /// Late-night trend x axis; hours after midnight are shifted by +24
    pub const LATE_NIGHT_HOURS: (f64, f64) = (22.0, 27.0);
    /// Bubble radius range for the global bubble chart
    pub const BUBBLE_RADIUS: (f64, f64) = (5.0, 25.0);
}

/// 24-bit RGB color, serialized as `#rrggbb`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` or `rrggbb`
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Per-channel linear interpolation, `t` clamped to [0, 1]
    pub fn lerp(&self, other: &Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Color::rgb(mix(self.r, other.r), mix(self.g, other.g), mix(self.b, other.b))
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Dashboard palette
pub mod palette {
    use super::Color;

    pub const PRIMARY: Color = Color::rgb(0x00, 0xd4, 0xff);
    pub const SECONDARY: Color = Color::rgb(0x7c, 0x3a, 0xed);
    pub const TERTIARY: Color = Color::rgb(0xf5, 0x9e, 0x0b);
    pub const DANGER: Color = Color::rgb(0xef, 0x44, 0x44);
    pub const SUCCESS: Color = Color::rgb(0x10, 0xb9, 0x81);
    pub const PINK: Color = Color::rgb(0xec, 0x48, 0x99);
    pub const BACKGROUND: Color = Color::rgb(0x0a, 0x0e, 0x1a);
    pub const TEXT: Color = Color::rgb(0xf0, 0xf4, 0xf8);
    /// Cold end of the heatmap gradient
    pub const SLATE: Color = Color::rgb(0x1e, 0x29, 0x3b);
    /// Fallback for categories outside a declared palette
    pub const NEUTRAL: Color = Color::rgb(0x64, 0x74, 0x8b);

    /// Good / warning / bad, used by BMI, disorder and stress encodings
    pub const TRAFFIC_LIGHT: [Color; 3] = [SUCCESS, TERTIARY, DANGER];
    /// Five-way categorical palette (regions)
    pub const CATEGORICAL: [Color; 5] = [DANGER, TERTIARY, SECONDARY, PRIMARY, SUCCESS];
}

/// Continuous linear mapping from a domain to a range
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
    clamp: bool,
}

impl LinearScale {
    /// Build a scale; the domain must be finite
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Result<Self, DashboardError> {
        if !domain.0.is_finite() || !domain.1.is_finite() {
            return Err(DashboardError::InvalidDomain(format!(
                "[{}, {}] is not finite",
                domain.0, domain.1
            )));
        }
        if !range.0.is_finite() || !range.1.is_finite() {
            return Err(DashboardError::InvalidDomain(format!(
                "range [{}, {}] is not finite",
                range.0, range.1
            )));
        }
        Ok(Self {
            domain,
            range,
            clamp: false,
        })
    }

    /// Scale over `[0, max]`, falling back to `[0, 1]` when there is no positive maximum
    pub fn zero_based(max: Option<f64>, range: (f64, f64)) -> Result<Self, DashboardError> {
        let upper = max.filter(|m| m.is_finite() && *m > 0.0).unwrap_or(1.0);
        Self::new((0.0, upper), range)
    }

    pub fn clamped(mut self) -> Self {
        self.clamp = true;
        self
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Map a domain value into the range. A degenerate domain maps to the range midpoint.
    pub fn scale(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let mut t = if d1 == d0 {
            0.5
        } else {
            (value - d0) / (d1 - d0)
        };
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        r0 + (r1 - r0) * t
    }

    /// Map a range value back into the domain
    pub fn invert(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let mut t = if r1 == r0 {
            0.5
        } else {
            (value - r0) / (r1 - r0)
        };
        if self.clamp {
            t = t.clamp(0.0, 1.0);
        }
        d0 + (d1 - d0) * t
    }

    /// Roughly `count` round tick values spanning the domain
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count)
    }
}

/// Tick values at 1, 2 or 5 × 10^k steps covering `[start, stop]`
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }

    let reverse = stop < start;
    let (lo, hi) = if reverse { (stop, start) } else { (start, stop) };

    let step = tick_step(lo, hi, count);
    if step == 0.0 || !step.is_finite() {
        return Vec::new();
    }

    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    let mut out: Vec<f64> = (first..=last).map(|i| round_tick(i as f64 * step)).collect();
    if reverse {
        out.reverse();
    }
    out
}

fn tick_step(lo: f64, hi: f64, count: usize) -> f64 {
    let raw = (hi - lo) / count as f64;
    let power = raw.log10().floor();
    let magnitude = 10f64.powf(power);
    let error = raw / magnitude;

    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * magnitude
}

fn round_tick(value: f64) -> f64 {
    (value * 1e10).round() / 1e10
}

/// Evenly spaced, non-overlapping bands for an ordered discrete domain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandScale {
    domain: Vec<String>,
    range: (f64, f64),
    padding_inner: f64,
    padding_outer: f64,
    step: f64,
    bandwidth: f64,
    start: f64,
}

impl BandScale {
    /// Band scale with equal inner and outer padding
    pub fn new(domain: Vec<String>, range: (f64, f64), padding: f64) -> Self {
        Self::with_padding(domain, range, padding, padding)
    }

    pub fn with_padding(
        domain: Vec<String>,
        range: (f64, f64),
        padding_inner: f64,
        padding_outer: f64,
    ) -> Self {
        let mut scale = Self {
            domain: Vec::new(),
            range,
            padding_inner: padding_inner.clamp(0.0, 1.0),
            padding_outer: padding_outer.max(0.0),
            step: 0.0,
            bandwidth: 0.0,
            start: range.0,
        };
        for key in domain {
            if !scale.domain.contains(&key) {
                scale.domain.push(key);
            }
        }
        scale.rescale();
        scale
    }

    fn rescale(&mut self) {
        const ALIGN: f64 = 0.5;
        let n = self.domain.len() as f64;
        let (r0, r1) = self.range;
        let (lo, hi) = if r1 < r0 { (r1, r0) } else { (r0, r1) };

        let step = (hi - lo) / (n - self.padding_inner + self.padding_outer * 2.0).max(1.0);
        let start = lo + (hi - lo - step * (n - self.padding_inner)) * ALIGN;

        self.step = step;
        self.bandwidth = step * (1.0 - self.padding_inner);
        self.start = start;
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Start offset of a band; `None` for keys outside the domain
    pub fn position(&self, key: &str) -> Option<f64> {
        let index = self.domain.iter().position(|k| k == key)?;
        let (r0, r1) = self.range;
        let i = if r1 < r0 {
            self.domain.len() - 1 - index
        } else {
            index
        };
        Some(self.start + self.step * i as f64)
    }

    /// Center of a band
    pub fn center(&self, key: &str) -> Option<f64> {
        self.position(key).map(|p| p + self.bandwidth / 2.0)
    }
}

/// Fixed discrete domain → fixed palette, with a neutral fallback.
///
/// Domain entry `i` always maps to palette entry `i % len`, so a category keeps
/// its color across redraws and filter changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrdinalColorScale {
    domain: Vec<String>,
    palette: Vec<Color>,
    fallback: Color,
}

impl OrdinalColorScale {
    pub fn new<S: AsRef<str>>(domain: &[S], palette: &[Color]) -> Self {
        Self {
            domain: domain.iter().map(|s| s.as_ref().to_string()).collect(),
            palette: palette.to_vec(),
            fallback: palette::NEUTRAL,
        }
    }

    pub fn color(&self, key: &str) -> Color {
        if self.palette.is_empty() {
            return self.fallback;
        }
        match self.domain.iter().position(|k| k == key) {
            Some(i) => self.palette[i % self.palette.len()],
            None => self.fallback,
        }
    }

    pub fn fallback(&self) -> Color {
        self.fallback
    }

    /// Legend entries in domain order
    pub fn legend(&self) -> Vec<LegendEntry> {
        self.domain
            .iter()
            .map(|k| LegendEntry {
                label: k.clone(),
                color: self.color(k),
            })
            .collect()
    }
}

/// One legend swatch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegendEntry {
    pub label: String,
    pub color: Color,
}

/// Continuous domain → two-stop RGB gradient
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequentialColorScale {
    position: LinearScale,
    from: Color,
    to: Color,
    fallback: Color,
}

impl SequentialColorScale {
    pub fn new(domain: (f64, f64), from: Color, to: Color) -> Result<Self, DashboardError> {
        Ok(Self {
            position: LinearScale::new(domain, (0.0, 1.0))?.clamped(),
            from,
            to,
            fallback: palette::NEUTRAL,
        })
    }

    pub fn color(&self, value: f64) -> Color {
        if !value.is_finite() {
            return self.fallback;
        }
        self.from.lerp(&self.to, self.position.scale(value))
    }

    pub fn domain(&self) -> (f64, f64) {
        self.position.domain()
    }

    /// Gradient stops for a legend bar
    pub fn stops(&self) -> [Color; 2] {
        [self.from, self.to]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_linear_scale_maps_and_inverts() {
        let x = LinearScale::new(domains::ACTIVITY, (0.0, 800.0)).unwrap();
        assert_eq!(x.scale(20.0), 0.0);
        assert_eq!(x.scale(60.0), 400.0);
        assert_eq!(x.scale(100.0), 800.0);
        assert_eq!(x.invert(400.0), 60.0);

        // inverted y axis
        let y = LinearScale::new(domains::SLEEP_QUALITY, (350.0, 0.0)).unwrap();
        assert_eq!(y.scale(3.0), 350.0);
        assert_eq!(y.scale(10.0), 0.0);
    }

    #[test]
    fn test_linear_scale_rejects_nan_domain() {
        assert!(LinearScale::new((0.0, f64::NAN), (0.0, 1.0)).is_err());
        assert!(LinearScale::new((f64::INFINITY, 1.0), (0.0, 1.0)).is_err());
    }

    #[test]
    fn test_degenerate_domain_maps_to_midpoint() {
        let s = LinearScale::new((5.0, 5.0), (0.0, 100.0)).unwrap();
        assert_eq!(s.scale(5.0), 50.0);
    }

    #[test]
    fn test_zero_based_fallback() {
        let s = LinearScale::zero_based(None, (0.0, 10.0)).unwrap();
        assert_eq!(s.domain(), (0.0, 1.0));
        let s = LinearScale::zero_based(Some(40.0), (0.0, 10.0)).unwrap();
        assert_eq!(s.domain(), (0.0, 40.0));
    }

    #[test]
    fn test_clamped_scale() {
        let s = LinearScale::new((0.0, 10.0), (0.0, 100.0)).unwrap().clamped();
        assert_eq!(s.scale(20.0), 100.0);
        assert_eq!(s.scale(-1.0), 0.0);
    }

    #[test]
    fn test_ticks() {
        assert_eq!(ticks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(
            ticks(20.0, 100.0, 10),
            vec![20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0]
        );
        assert_eq!(ticks(0.0, 1.0, 5), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(ticks(3.0, 3.0, 5), vec![3.0]);
        assert!(ticks(0.0, 1.0, 0).is_empty());
    }

    #[test]
    fn test_band_scale_layout() {
        let x = BandScale::new(keys(&["Normal", "Overweight", "Obese"]), (0.0, 330.0), 0.3);
        // step = 330 / (3 - 0.3 + 0.6) = 100
        assert!((x.step() - 100.0).abs() < 1e-9);
        assert!((x.bandwidth() - 70.0).abs() < 1e-9);
        assert!((x.position("Normal").unwrap() - 30.0).abs() < 1e-9);
        assert!((x.position("Obese").unwrap() - 230.0).abs() < 1e-9);
        assert_eq!(x.position("Underweight"), None);
    }

    #[test]
    fn test_band_scale_bands_do_not_overlap() {
        let x = BandScale::new(keys(&["a", "b", "c", "d"]), (0.0, 400.0), 0.05);
        let starts: Vec<f64> = x.domain().iter().map(|k| x.position(k).unwrap()).collect();
        for pair in starts.windows(2) {
            assert!(pair[0] + x.bandwidth() <= pair[1] + 1e-9);
        }
    }

    #[test]
    fn test_band_scale_dedups_domain() {
        let x = BandScale::new(keys(&["22", "23", "22"]), (0.0, 100.0), 0.0);
        assert_eq!(x.domain().len(), 2);
        assert_eq!(x.bandwidth(), 50.0);
    }

    #[test]
    fn test_ordinal_color_is_stable_with_fallback() {
        let scale = OrdinalColorScale::new(&["Normal", "Overweight", "Obese"], &palette::TRAFFIC_LIGHT);

        assert_eq!(scale.color("Normal"), palette::SUCCESS);
        assert_eq!(scale.color("Obese"), palette::DANGER);
        assert_eq!(scale.color("Normal"), scale.color("Normal"));
        assert_eq!(scale.color("Underweight"), palette::NEUTRAL);

        let rebuilt = OrdinalColorScale::new(&["Normal", "Overweight", "Obese"], &palette::TRAFFIC_LIGHT);
        assert_eq!(rebuilt.color("Overweight"), scale.color("Overweight"));
    }

    #[test]
    fn test_ordinal_palette_wraps() {
        let scale = OrdinalColorScale::new(&["a", "b", "c"], &[palette::PINK, palette::PRIMARY]);
        assert_eq!(scale.color("c"), palette::PINK);
    }

    #[test]
    fn test_sequential_color_endpoints_and_clamp() {
        let heat = SequentialColorScale::new(domains::PERCENT, palette::SLATE, palette::DANGER).unwrap();
        assert_eq!(heat.color(0.0), palette::SLATE);
        assert_eq!(heat.color(100.0), palette::DANGER);
        assert_eq!(heat.color(150.0), palette::DANGER);
        assert_eq!(heat.color(f64::NAN), palette::NEUTRAL);

        let mid = heat.color(50.0);
        assert_eq!(mid, palette::SLATE.lerp(&palette::DANGER, 0.5));
    }

    #[test]
    fn test_color_hex_round_trip() {
        assert_eq!(Color::from_hex("#00d4ff"), Some(palette::PRIMARY));
        assert_eq!(palette::DANGER.to_hex(), "#ef4444");
        assert_eq!(Color::from_hex("xyz"), None);
        assert_eq!(serde_json::to_string(&palette::SUCCESS).unwrap(), "\"#10b981\"");
    }
}
