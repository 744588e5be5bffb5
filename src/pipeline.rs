//! Pipeline orchestration
//!
//! This module provides the public API for Sleepscope. It wires the loaded
//! datasets through the filter, aggregation and scale stages for the active
//! page, and encodes the result as a [`Frame`].
//!
//! Stages per redraw:
//! 1. Filter Engine - narrow each dataset by the current selection
//! 2. Aggregator - counts, means, buckets, KPIs
//! 3. Scale/Encoding Mapper - positions, radii, colors
//! 4. FrameEncoder - attach producer metadata and serialize

use crate::charts::{render_page, PageCharts, Viewport};
use crate::config::DashboardConfig;
use crate::debounce::{Debouncer, ResizeEvent};
use crate::error::DashboardError;
use crate::filter::by_occupation;
use crate::loader::load_datasets;
use crate::selection::{FocusChannel, RadarPanel};
use crate::state::{reduce, DashboardEvent, DashboardState, Page};
use crate::types::Datasets;
use crate::{PRODUCER_NAME, SLEEPSCOPE_VERSION};
use chrono::Utc;
use serde::Serialize;
use std::time::Instant;
use uuid::Uuid;

/// Who produced a frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Everything a renderer needs to draw the active page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub producer: Producer,
    /// RFC 3339 timestamp
    pub generated_at: String,
    pub page: Page,
    pub title: String,
    pub viewport: Viewport,
    pub state: DashboardState,
    pub charts: PageCharts,
}

/// Stamps page charts with producer metadata
pub struct FrameEncoder {
    instance_id: String,
}

impl Default for FrameEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn encode(&self, state: &DashboardState, viewport: Viewport, charts: PageCharts) -> Frame {
        Frame {
            producer: Producer {
                name: PRODUCER_NAME.to_string(),
                version: SLEEPSCOPE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            generated_at: Utc::now().to_rfc3339(),
            page: state.page,
            title: state.page.title().to_string(),
            viewport,
            state: state.clone(),
            charts,
        }
    }

    pub fn encode_to_json(&self, frame: &Frame) -> Result<String, DashboardError> {
        Ok(serde_json::to_string(frame)?)
    }
}

/// Render one page of in-memory datasets to JSON without keeping any state.
pub fn render_json(
    datasets: &Datasets,
    state: &DashboardState,
    viewport: Viewport,
) -> Result<String, DashboardError> {
    let encoder = FrameEncoder::new();
    let frame = encoder.encode(state, viewport, render_page(datasets, state, viewport)?);
    encoder.encode_to_json(&frame)
}

/// Stateful dashboard session.
///
/// Holds the datasets for the session, applies events through the reducer,
/// keeps the radar baseline cached between focus changes and collapses resize
/// bursts into a single redraw.
pub struct Dashboard {
    datasets: Datasets,
    state: DashboardState,
    viewport: Viewport,
    resize: Debouncer<ResizeEvent>,
    focus: FocusChannel,
    radar: RadarPanel,
    encoder: FrameEncoder,
}

impl Dashboard {
    /// Create a session over already-loaded datasets with default settings
    pub fn new(datasets: Datasets) -> Self {
        Self::with_config(datasets, &DashboardConfig::default())
    }

    pub fn with_config(datasets: Datasets, config: &DashboardConfig) -> Self {
        let state = DashboardState {
            page: config.initial.page,
            filters: config.initial.filters.clone(),
            focus: None,
        };
        let mut radar = RadarPanel::new();
        radar.set_subset(&by_occupation(&datasets.health, &state.filters.occupation));

        Self {
            datasets,
            state,
            viewport: config.viewport,
            resize: Debouncer::new(config.debounce()),
            focus: FocusChannel::new(),
            radar,
            encoder: FrameEncoder::new(),
        }
    }

    /// Load the four CSV sources named by the config and open a session
    pub fn open(config: &DashboardConfig) -> Result<Self, DashboardError> {
        let datasets = load_datasets(&config.dataset_paths())?;
        Ok(Self::with_config(datasets, config))
    }

    pub fn datasets(&self) -> &Datasets {
        &self.datasets
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn radar(&self) -> &RadarPanel {
        &self.radar
    }

    /// Apply one interaction
    pub fn dispatch(&mut self, event: DashboardEvent) {
        log::debug!("dispatch {event:?}");
        let next = reduce(&self.state, event);

        if next.filters.occupation != self.state.filters.occupation {
            self.radar
                .set_subset(&by_occupation(&self.datasets.health, &next.filters.occupation));
        }
        self.focus.publish(next.focus.clone(), &mut [&mut self.radar]);
        self.state = next;
    }

    /// Hover a health record by id
    pub fn focus_record(&mut self, id: &str) -> Result<(), DashboardError> {
        let record = self
            .datasets
            .health_record(id)
            .cloned()
            .ok_or_else(|| DashboardError::UnknownRecord(id.to_string()))?;
        self.dispatch(DashboardEvent::HoverEnter(record));
        Ok(())
    }

    /// Queue a container resize; nothing is redrawn until the window is quiet
    pub fn resize(&mut self, event: ResizeEvent, now: Instant) {
        self.resize.push(event, now);
    }

    /// Advance the clock. Returns a redrawn frame once a resize burst settles.
    pub fn tick(&mut self, now: Instant) -> Result<Option<Frame>, DashboardError> {
        match self.resize.poll(now) {
            Some(event) => {
                self.viewport = Viewport::new(event.width, event.height);
                log::debug!("resize settled at {}x{}", event.width, event.height);
                self.render().map(Some)
            }
            None => Ok(None),
        }
    }

    /// Build the active page from the current state
    pub fn render(&self) -> Result<Frame, DashboardError> {
        let charts = match self.state.page {
            Page::Overview => PageCharts::Overview(crate::charts::overview::build(
                &self.datasets.health,
                &self.state.filters,
                &self.radar,
                self.viewport,
            )?),
            _ => render_page(&self.datasets, &self.state, self.viewport)?,
        };
        Ok(self.encoder.encode(&self.state, self.viewport, charts))
    }

    pub fn render_json(&self) -> Result<String, DashboardError> {
        self.encoder.encode_to_json(&self.render()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Selector;
    use crate::loader::fixtures;
    use std::time::Duration;

    fn make_test_dashboard() -> Dashboard {
        Dashboard::new(fixtures::datasets())
    }

    #[test]
    fn test_render_default_overview() {
        let dashboard = make_test_dashboard();
        let frame = dashboard.render().unwrap();

        assert_eq!(frame.page, Page::Overview);
        assert_eq!(frame.producer.name, PRODUCER_NAME);
        assert_eq!(frame.producer.version, SLEEPSCOPE_VERSION);
        assert!(!frame.producer.instance_id.is_empty());
        assert!(matches!(frame.charts, PageCharts::Overview(_)));
    }

    #[test]
    fn test_focus_flows_to_radar() {
        let mut dashboard = make_test_dashboard();
        dashboard.focus_record("3").unwrap();

        let frame = dashboard.render().unwrap();
        match frame.charts {
            PageCharts::Overview(page) => {
                assert_eq!(page.radar.focus.map(|f| f.id), Some("3".to_string()));
            }
            other => panic!("expected overview, got {other:?}"),
        }
        assert_eq!(dashboard.radar().baseline_updates(), 1);

        dashboard.dispatch(DashboardEvent::HoverExit);
        assert!(dashboard.radar().overlay().is_none());
    }

    #[test]
    fn test_encoder_metadata() {
        let datasets = fixtures::datasets();
        let state = DashboardState::default();
        let charts = render_page(&datasets, &state, Viewport::default()).unwrap();

        let encoder = FrameEncoder::with_instance_id("fixed-instance".to_string());
        let frame = encoder.encode(&state, Viewport::default(), charts);

        assert_eq!(frame.producer.instance_id, "fixed-instance");
        assert_eq!(frame.title, "Overview");
        assert!(chrono::DateTime::parse_from_rfc3339(&frame.generated_at).is_ok());
    }

    #[test]
    fn test_unknown_record() {
        let mut dashboard = make_test_dashboard();
        assert!(matches!(
            dashboard.focus_record("999"),
            Err(DashboardError::UnknownRecord(_))
        ));
    }

    #[test]
    fn test_occupation_change_recomputes_baseline_and_clears_focus() {
        let mut dashboard = make_test_dashboard();
        dashboard.focus_record("1").unwrap();
        dashboard.dispatch(DashboardEvent::SelectOccupation(Selector::parse("Nurse")));

        assert!(dashboard.state().focus.is_none());
        assert!(dashboard.radar().overlay().is_none());
        assert_eq!(dashboard.radar().baseline_updates(), 2);

        let frame = dashboard.render().unwrap();
        match frame.charts {
            PageCharts::Overview(page) => assert_eq!(page.kpis.total, 2),
            other => panic!("expected overview, got {other:?}"),
        }
    }

    #[test]
    fn test_resize_burst_renders_once() {
        let mut dashboard = make_test_dashboard();
        let start = Instant::now();
        let mut frames = Vec::new();

        for i in 0..5u64 {
            let now = start + Duration::from_millis(i * 50);
            dashboard.resize(
                ResizeEvent {
                    width: 700.0 + i as f64,
                    height: 450.0,
                },
                now,
            );
            frames.extend(dashboard.tick(now).unwrap());
        }
        for ms in (250..1000u64).step_by(25) {
            frames.extend(dashboard.tick(start + Duration::from_millis(ms)).unwrap());
        }

        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].viewport, Viewport::new(704.0, 450.0));
        assert_eq!(dashboard.viewport(), Viewport::new(704.0, 450.0));
    }

    #[test]
    fn test_resize_uses_state_at_fire_time() {
        let mut dashboard = make_test_dashboard();
        let start = Instant::now();

        dashboard.resize(
            ResizeEvent {
                width: 500.0,
                height: 400.0,
            },
            start,
        );
        dashboard.dispatch(DashboardEvent::Navigate(Page::Global));

        let frame = dashboard
            .tick(start + Duration::from_millis(300))
            .unwrap()
            .unwrap();
        assert_eq!(frame.page, Page::Global);
    }

    #[test]
    fn test_render_json_is_valid() {
        let mut dashboard = make_test_dashboard();
        for page in Page::ALL {
            dashboard.dispatch(DashboardEvent::Navigate(page));
            let json = dashboard.render_json().unwrap();
            let value: serde_json::Value = serde_json::from_str(&json).unwrap();
            assert_eq!(value["page"], page.as_str());
            assert_eq!(value["charts"]["page"], page.as_str());
        }
    }

    #[test]
    fn test_stateless_render_json() {
        let datasets = fixtures::datasets();
        let state = DashboardState {
            page: Page::Health,
            ..Default::default()
        };
        let json = render_json(&datasets, &state, Viewport::default()).unwrap();
        assert!(json.contains("\"social_impact\""));
    }

    #[test]
    fn test_initial_view_from_config() {
        let config = DashboardConfig::from_json(
            r#"{ "initial": { "page": "global", "filters": { "sort": "descending" } } }"#,
        )
        .unwrap();
        let dashboard = Dashboard::with_config(fixtures::datasets(), &config);

        assert_eq!(dashboard.state().page, Page::Global);
        let frame = dashboard.render().unwrap();
        match frame.charts {
            PageCharts::Global(page) => assert_eq!(page.ranking.bars[0].country, "Netherlands"),
            other => panic!("expected global, got {other:?}"),
        }
    }
}
