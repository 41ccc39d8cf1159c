//! crates/biblia_core/src/progress.rs
//!
//! Persistence for the user's reading-plan progress. The completed-day set is
//! a JSON array of integers under one fixed key in the key/value port; plan
//! progress is always device-local, even for logged-in users.

use std::sync::Arc;

use crate::plan::CompletedDays;
use crate::ports::{KeyValueStorage, PortResult};

/// Storage key for the completed-days array.
pub const PLAN_PROGRESS_KEY: &str = "bible_plan_final";

#[derive(Clone)]
pub struct PlanProgressStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl PlanProgressStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Loads the completed-day set. A missing or unreadable payload reads as
    /// an empty set rather than an error, so a corrupt entry can never lock
    /// the user out of their plan.
    pub async fn completed(&self) -> PortResult<CompletedDays> {
        let raw = self.storage.get_item(PLAN_PROGRESS_KEY).await?;
        let Some(raw) = raw else {
            return Ok(CompletedDays::new());
        };
        Ok(serde_json::from_str(&raw).unwrap_or_default())
    }

    /// Flips one day and persists the new set. Toggling the same day twice
    /// restores the stored state exactly.
    pub async fn toggle_day(&self, day: u32) -> PortResult<(bool, CompletedDays)> {
        let mut completed = self.completed().await?;
        let now_completed = completed.toggle(day);
        let encoded = serde_json::to_string(&completed)
            .map_err(|e| crate::ports::PortError::Storage(e.to_string()))?;
        self.storage.set_item(PLAN_PROGRESS_KEY, &encoded).await?;
        Ok((now_completed, completed))
    }
}
