//! Resize debouncing
//!
//! A burst of resize events collapses into a single redraw once the window has
//! been quiet for the configured interval. Time is passed in explicitly so the
//! debouncer stays deterministic.

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Quiet window before a resize triggers a redraw
pub const DEFAULT_QUIET: Duration = Duration::from_millis(300);

/// New viewport dimensions reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResizeEvent {
    pub width: f64,
    pub height: f64,
}

/// Keeps the latest value and releases it after a quiet period
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Record a value, replacing any pending one and restarting the window
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Release the pending value if the window has elapsed since the last push
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, at)) if now.saturating_duration_since(*at) >= self.quiet => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    /// Drop the pending value without firing
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

impl<T> Default for Debouncer<T> {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_burst_collapses_to_one_redraw() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        let mut redraws = Vec::new();

        for i in 0..5u64 {
            let now = start + Duration::from_millis(i * 50);
            debouncer.push(
                ResizeEvent {
                    width: 800.0 + i as f64 * 10.0,
                    height: 600.0,
                },
                now,
            );
            redraws.extend(debouncer.poll(now));
        }

        // poll every 10ms for a second
        for ms in (200..1200u64).step_by(10) {
            redraws.extend(debouncer.poll(start + Duration::from_millis(ms)));
        }

        assert_eq!(
            redraws,
            vec![ResizeEvent {
                width: 840.0,
                height: 600.0
            }]
        );
    }

    #[test]
    fn test_does_not_fire_inside_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.push(1, start);

        assert_eq!(debouncer.poll(start + Duration::from_millis(299)), None);
        assert!(debouncer.is_pending());
        assert_eq!(debouncer.poll(start + Duration::from_millis(300)), Some(1));
        assert_eq!(debouncer.poll(start + Duration::from_millis(900)), None);
    }

    #[test]
    fn test_push_restarts_window() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        debouncer.push("a", start);
        debouncer.push("b", start + Duration::from_millis(250));

        assert_eq!(debouncer.poll(start + Duration::from_millis(400)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(550)), Some("b"));
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut debouncer = Debouncer::default();
        debouncer.push(1, start);
        debouncer.cancel();
        assert_eq!(debouncer.poll(start + Duration::from_secs(1)), None);
    }
}
