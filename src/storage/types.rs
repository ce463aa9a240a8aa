// Saved race record

use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::plan::RacePlan;

/// Maximum length of a saved race name
pub const MAX_RACE_NAME_LEN: usize = 100;

/// A race plan saved to a user's account
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SavedRace {
    /// Unique record identifier
    pub id: Uuid,
    /// Owner of the record
    pub user_id: String,
    /// Name shown in the saved race list, unique per user (case-insensitive)
    pub race_name: String,
    /// Profile, rates, aid stations and the schedule snapshot
    pub plan: RacePlan,
    /// Timestamp when the race was first saved
    pub created_at: SystemTime,
    /// Timestamp when the race was last updated
    pub updated_at: SystemTime,
    /// Incremented on every update
    pub version: u32,
}

impl SavedRace {
    /// Create a new record for `user_id`, named after the plan's race unless
    /// `race_name` is given.
    pub fn new(user_id: impl Into<String>, race_name: Option<String>, plan: RacePlan) -> Self {
        let now = SystemTime::now();
        let race_name = race_name
            .unwrap_or_else(|| plan.profile.race_name.clone())
            .trim()
            .to_string();
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.into(),
            race_name,
            plan,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    /// Update the timestamp and increment version
    pub fn touch(&mut self) {
        self.updated_at = SystemTime::now();
        self.version += 1;
    }

    /// Case-insensitive comparison used for duplicate-name detection
    pub fn has_name(&self, race_name: &str) -> bool {
        self.race_name.trim().to_lowercase() == race_name.trim().to_lowercase()
    }
}

/// Lightweight listing entry
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SavedRaceSummary {
    pub id: Uuid,
    pub race_name: String,
    pub total_distance: f64,
    pub estimated_time_hours: f64,
    pub aid_station_count: usize,
    pub updated_at: SystemTime,
}

impl From<&SavedRace> for SavedRaceSummary {
    fn from(race: &SavedRace) -> Self {
        Self {
            id: race.id,
            race_name: race.race_name.clone(),
            total_distance: race.plan.profile.total_distance,
            estimated_time_hours: race.plan.profile.estimated_time_hours,
            aid_station_count: race.plan.aid_stations.len(),
            updated_at: race.updated_at,
        }
    }
}
