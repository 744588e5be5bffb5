//! Cross-chart focus broadcasting
//!
//! Hovering a health record in one chart makes it the dashboard's single
//! focused record. The [`FocusChannel`] holds that record and forwards changes
//! to every [`FocusListener`]; the radar panel is the one listener that ships
//! with the dashboard.

use crate::radial::RadarProfile;
use crate::types::HealthRecord;
use serde::Serialize;

/// Receives focus changes from a [`FocusChannel`]
pub trait FocusListener {
    /// Called with the new focus, or `None` when focus was cleared
    fn on_focus(&mut self, focus: Option<&HealthRecord>);
}

/// Holds at most one focused record; the latest write wins
#[derive(Debug, Clone, Default)]
pub struct FocusChannel {
    current: Option<HealthRecord>,
}

impl FocusChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&HealthRecord> {
        self.current.as_ref()
    }

    /// Replace the focus and notify listeners if it changed.
    ///
    /// Returns whether a notification went out.
    pub fn publish(
        &mut self,
        focus: Option<HealthRecord>,
        listeners: &mut [&mut dyn FocusListener],
    ) -> bool {
        if self.current == focus {
            return false;
        }
        self.current = focus;

        log::debug!(
            "focus -> {}",
            self.current.as_ref().map_or("none", |r| r.id.as_str())
        );
        for listener in listeners.iter_mut() {
            listener.on_focus(self.current.as_ref());
        }
        true
    }

    pub fn clear(&mut self, listeners: &mut [&mut dyn FocusListener]) -> bool {
        self.publish(None, listeners)
    }
}

/// Radar profile of the focused record, drawn over the baseline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FocusOverlay {
    pub id: String,
    pub occupation: String,
    pub profile: RadarProfile,
}

/// State behind the radar chart.
///
/// The baseline depends only on the filtered subset and is cached; a focus
/// change swaps the overlay without touching it.
#[derive(Debug, Clone, Default)]
pub struct RadarPanel {
    baseline: Option<RadarProfile>,
    overlay: Option<FocusOverlay>,
    baseline_updates: usize,
}

impl RadarPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recompute the baseline for a new filtered subset
    pub fn set_subset(&mut self, subset: &[HealthRecord]) {
        self.baseline = RadarProfile::baseline(subset);
        self.baseline_updates += 1;
    }

    pub fn baseline(&self) -> Option<&RadarProfile> {
        self.baseline.as_ref()
    }

    pub fn overlay(&self) -> Option<&FocusOverlay> {
        self.overlay.as_ref()
    }

    /// How many times the baseline has been recomputed
    pub fn baseline_updates(&self) -> usize {
        self.baseline_updates
    }
}

impl FocusListener for RadarPanel {
    fn on_focus(&mut self, focus: Option<&HealthRecord>) {
        self.overlay = focus.map(|record| FocusOverlay {
            id: record.id.clone(),
            occupation: record.occupation.clone(),
            profile: RadarProfile::from_record(record),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::fixtures;

    #[derive(Default)]
    struct Recorder {
        seen: Vec<Option<String>>,
    }

    impl FocusListener for Recorder {
        fn on_focus(&mut self, focus: Option<&HealthRecord>) {
            self.seen.push(focus.map(|r| r.id.clone()));
        }
    }

    #[test]
    fn test_last_write_wins() {
        let datasets = fixtures::datasets();
        let mut channel = FocusChannel::new();
        let mut recorder = Recorder::default();

        channel.publish(Some(datasets.health[0].clone()), &mut [&mut recorder]);
        channel.publish(Some(datasets.health[2].clone()), &mut [&mut recorder]);

        assert_eq!(channel.current().map(|r| r.id.as_str()), Some("3"));
        assert_eq!(
            recorder.seen,
            vec![Some("1".to_string()), Some("3".to_string())]
        );
    }

    #[test]
    fn test_repeated_focus_is_not_rebroadcast() {
        let datasets = fixtures::datasets();
        let mut channel = FocusChannel::new();
        let mut recorder = Recorder::default();

        assert!(channel.publish(Some(datasets.health[1].clone()), &mut [&mut recorder]));
        assert!(!channel.publish(Some(datasets.health[1].clone()), &mut [&mut recorder]));
        assert!(channel.clear(&mut [&mut recorder]));
        assert!(!channel.clear(&mut [&mut recorder]));

        assert_eq!(recorder.seen, vec![Some("2".to_string()), None]);
    }

    #[test]
    fn test_radar_focus_swaps_overlay_only() {
        let datasets = fixtures::datasets();
        let mut channel = FocusChannel::new();
        let mut panel = RadarPanel::new();
        panel.set_subset(&datasets.health);
        let baseline = panel.baseline().cloned();

        channel.publish(Some(datasets.health[3].clone()), &mut [&mut panel]);
        let overlay = panel.overlay().unwrap();
        assert_eq!(overlay.id, "4");
        assert_eq!(overlay.occupation, "Nurse");
        assert_eq!(panel.baseline().cloned(), baseline);
        assert_eq!(panel.baseline_updates(), 1);

        channel.clear(&mut [&mut panel]);
        assert!(panel.overlay().is_none());
        assert!(panel.baseline().is_some());
    }

    #[test]
    fn test_empty_subset_has_no_baseline() {
        let mut panel = RadarPanel::new();
        panel.set_subset(&[]);
        assert!(panel.baseline().is_none());
    }
}
