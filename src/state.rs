//! Dashboard state and its reducer
//!
//! All interaction flows through [`reduce`]: a pure function from the current
//! state and one event to the next state. Nothing else mutates the selection.

use crate::error::DashboardError;
use crate::filter::{Selector, SortOrder};
use crate::types::{DayType, HealthRecord};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The four dashboard pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Overview,
    Behavior,
    Health,
    Global,
}

impl Page {
    pub const ALL: [Page; 4] = [Page::Overview, Page::Behavior, Page::Health, Page::Global];

    pub fn as_str(&self) -> &'static str {
        match self {
            Page::Overview => "overview",
            Page::Behavior => "behavior",
            Page::Health => "health",
            Page::Global => "global",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Page::Overview => "Overview",
            Page::Behavior => "Late-Night Behavior",
            Page::Health => "Health & Social Media",
            Page::Global => "Global Comparison",
        }
    }
}

impl FromStr for Page {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "overview" => Ok(Page::Overview),
            "behavior" | "behaviour" => Ok(Page::Behavior),
            "health" => Ok(Page::Health),
            "global" => Ok(Page::Global),
            other => Err(DashboardError::UnknownPage(other.to_string())),
        }
    }
}

/// Current value of every filter control
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSelection {
    pub occupation: Selector,
    pub age_group: Selector,
    pub day_type: DayType,
    pub sort: SortOrder,
}

/// Everything a redraw depends on besides the datasets
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DashboardState {
    pub page: Page,
    pub filters: FilterSelection,
    /// Record hovered in a health chart, if any
    pub focus: Option<HealthRecord>,
}

/// User interactions
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    Navigate(Page),
    SelectOccupation(Selector),
    SelectAgeGroup(Selector),
    SelectDayType(DayType),
    Sort(SortOrder),
    HoverEnter(HealthRecord),
    HoverExit,
}

/// Apply one event.
///
/// Changing the occupation filter drops the focus, since the focused record
/// may no longer be in the visible subset. Navigating away from the overview
/// drops it too.
pub fn reduce(state: &DashboardState, event: DashboardEvent) -> DashboardState {
    let mut next = state.clone();
    match event {
        DashboardEvent::Navigate(page) => {
            if page != next.page {
                next.focus = None;
            }
            next.page = page;
        }
        DashboardEvent::SelectOccupation(selector) => {
            if selector != next.filters.occupation {
                next.focus = None;
            }
            next.filters.occupation = selector;
        }
        DashboardEvent::SelectAgeGroup(selector) => next.filters.age_group = selector,
        DashboardEvent::SelectDayType(day_type) => next.filters.day_type = day_type,
        DashboardEvent::Sort(order) => next.filters.sort = order,
        DashboardEvent::HoverEnter(record) => next.focus = Some(record),
        DashboardEvent::HoverExit => next.focus = None,
    }
    next
}
