// Saved race plan storage
// Provides creating, listing, fetching, updating and deleting race plans per user

pub mod file_based;
pub mod types;

use uuid::Uuid;

use crate::errors::UltraplanError;

// Re-export commonly used types
pub use file_based::FileBasedStorage;
pub use types::{MAX_RACE_NAME_LEN, SavedRace, SavedRaceSummary};

/// Trait defining the interface for saved race storage operations.
///
/// Records are keyed by user identity and race name: a user cannot hold two races
/// whose names differ only in case or surrounding whitespace.
pub trait RacePlanStorage {
    /// Save a new race. Fails with `DuplicateRaceName` if the user already has one
    /// with the same name.
    fn create(&mut self, race: SavedRace) -> Result<SavedRace, UltraplanError>;

    /// All races owned by a user, sorted by name
    fn list_by_user(&self, user_id: &str) -> Result<Vec<SavedRace>, UltraplanError>;

    /// Load a race by id. Races owned by another user are reported as missing.
    fn fetch_by_id(&self, user_id: &str, id: Uuid) -> Result<Option<SavedRace>, UltraplanError>;

    /// Overwrite an existing race, keeping its id and creation time and bumping its
    /// version.
    fn update(&mut self, race: SavedRace) -> Result<SavedRace, UltraplanError>;

    /// Delete a race. Returns false if there was nothing to delete.
    fn delete(&mut self, user_id: &str, id: Uuid) -> Result<bool, UltraplanError>;

    /// Find a user's race by name (case-insensitive)
    fn find_by_name(
        &self,
        user_id: &str,
        race_name: &str,
    ) -> Result<Option<SavedRace>, UltraplanError> {
        Ok(self
            .list_by_user(user_id)?
            .into_iter()
            .find(|race| race.has_name(race_name)))
    }

    /// Save `race`, replacing the user's existing race of the same name if present.
    ///
    /// This is the "replace existing race?" confirmation path: the stored record
    /// keeps its id and creation time.
    fn replace_by_name(&mut self, race: SavedRace) -> Result<SavedRace, UltraplanError> {
        match self.find_by_name(&race.user_id, &race.race_name)? {
            Some(existing) => self.update(SavedRace {
                id: existing.id,
                created_at: existing.created_at,
                ..race
            }),
            None => self.create(race),
        }
    }
}

/// Checks applied before any write
pub(crate) fn validate_for_save(race: &SavedRace) -> Result<(), UltraplanError> {
    if race.user_id.trim().is_empty() {
        return Err(UltraplanError::StorageValidationError {
            reason: "User id cannot be empty".to_string(),
        });
    }

    if race.race_name.trim().is_empty() {
        return Err(UltraplanError::StorageValidationError {
            reason: "Please enter a race name".to_string(),
        });
    }

    let name_len = race.race_name.chars().count();
    if name_len > MAX_RACE_NAME_LEN {
        return Err(UltraplanError::StorageValidationError {
            reason: format!("Race name too long ({name_len} characters, max {MAX_RACE_NAME_LEN})"),
        });
    }

    race.plan
        .profile
        .validate()
        .map_err(|e| UltraplanError::StorageValidationError {
            reason: format!("Race profile is invalid: {e}"),
        })
}
