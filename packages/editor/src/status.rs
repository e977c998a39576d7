//! Save status indicator: idle → saving → success | error → idle.
//!
//! Success and error clear back to idle after a fixed delay. The indicator
//! is independent of the unsaved-changes flag.

use serde::Serialize;
use std::time::{Duration, Instant};

/// Default delay before success/error fall back to idle
pub const DEFAULT_CLEAR_AFTER: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "camelCase")]
pub enum SaveStatus {
    Idle,
    Saving,
    Success,
    Error(String),
}

impl SaveStatus {
    /// Success and error are transient
    fn clears(&self) -> bool {
        matches!(self, SaveStatus::Success | SaveStatus::Error(_))
    }
}

#[derive(Debug, Clone)]
pub struct StatusIndicator {
    status: SaveStatus,
    changed_at: Instant,
    clear_after: Duration,
}

impl StatusIndicator {
    pub fn new(clear_after: Duration) -> Self {
        Self {
            status: SaveStatus::Idle,
            changed_at: Instant::now(),
            clear_after,
        }
    }

    pub fn set(&mut self, status: SaveStatus, now: Instant) {
        self.status = status;
        self.changed_at = now;
    }

    /// Status as seen at `now`
    pub fn at(&self, now: Instant) -> SaveStatus {
        let expired = now.saturating_duration_since(self.changed_at) >= self.clear_after;
        if self.status.clears() && expired {
            SaveStatus::Idle
        } else {
            self.status.clone()
        }
    }

    pub fn clear_after(&self) -> Duration {
        self.clear_after
    }
}

impl Default for StatusIndicator {
    fn default() -> Self {
        Self::new(DEFAULT_CLEAR_AFTER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_clears_after_delay() {
        let start = Instant::now();
        let mut indicator = StatusIndicator::new(Duration::from_millis(500));

        indicator.set(SaveStatus::Success, start);

        assert_eq!(indicator.at(start + Duration::from_millis(499)), SaveStatus::Success);
        assert_eq!(indicator.at(start + Duration::from_millis(500)), SaveStatus::Idle);
    }

    #[test]
    fn test_error_clears_too() {
        let start = Instant::now();
        let mut indicator = StatusIndicator::new(Duration::from_secs(1));

        indicator.set(SaveStatus::Error("boom".to_string()), start);

        assert_eq!(indicator.at(start), SaveStatus::Error("boom".to_string()));
        assert_eq!(indicator.at(start + Duration::from_secs(2)), SaveStatus::Idle);
    }

    #[test]
    fn test_saving_never_clears() {
        let start = Instant::now();
        let mut indicator = StatusIndicator::new(Duration::from_millis(10));

        indicator.set(SaveStatus::Saving, start);

        assert_eq!(indicator.at(start + Duration::from_secs(60)), SaveStatus::Saving);
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(SaveStatus::Error("offline".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "error", "message": "offline" }));
    }
}
