// File-based persistence for saved race plans

use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use uuid::Uuid;

use crate::errors::UltraplanError;
use crate::storage::types::SavedRace;
use crate::storage::{RacePlanStorage, validate_for_save};

/// Number of backups kept per race file
const MAX_BACKUPS: usize = 5;

/// Stores each race as `<storage_path>/<user>/<id>.json`.
///
/// Writes go through a temporary file and an atomic rename. The previous version of
/// a file is kept as a timestamped backup and used when the primary file turns out
/// to be unreadable.
pub struct FileBasedStorage {
    /// Base directory for all users' race files
    storage_path: PathBuf,
    /// Races written or read through this instance
    cache: HashMap<Uuid, SavedRace>,
}

impl FileBasedStorage {
    /// Create a new file-based storage instance
    pub fn new(storage_path: PathBuf) -> Result<Self, UltraplanError> {
        if !storage_path.exists() {
            fs::create_dir_all(&storage_path).map_err(|e| {
                error!("Failed to create storage directory {storage_path:?}: {e}");
                UltraplanError::FileOperationError {
                    operation: "create_storage_dir".to_string(),
                    reason: e.to_string(),
                }
            })?;
        } else if !storage_path.is_dir() {
            return Err(UltraplanError::FileOperationError {
                operation: "create_storage_dir".to_string(),
                reason: format!("{storage_path:?} exists and is not a directory"),
            });
        }

        Ok(Self {
            storage_path,
            cache: HashMap::new(),
        })
    }

    /// Create storage in the default application data directory
    pub fn new_default() -> Result<Self, UltraplanError> {
        Self::new(Self::default_storage_path()?)
    }

    pub fn default_storage_path() -> Result<PathBuf, UltraplanError> {
        let app_data_dir = dirs::data_dir().ok_or(UltraplanError::NoConfigDir)?;
        Ok(app_data_dir.join("ultraplan").join("races"))
    }

    /// Clear the in-memory cache
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Get the storage directory path
    pub fn storage_path(&self) -> &Path {
        &self.storage_path
    }

    /// Normalize a user id into a directory name
    fn normalize_user_id(user_id: &str) -> String {
        user_id
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect()
    }

    fn user_dir(&self, user_id: &str) -> PathBuf {
        self.storage_path.join(Self::normalize_user_id(user_id))
    }

    fn file_path_for_race(&self, user_id: &str, id: Uuid) -> PathBuf {
        self.user_dir(user_id).join(format!("{id}.json"))
    }

    /// Backups of a race file, newest first
    fn backup_files(&self, user_id: &str, id: Uuid) -> Result<Vec<PathBuf>, UltraplanError> {
        let dir = self.user_dir(user_id);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir).map_err(|e| UltraplanError::FileOperationError {
            operation: "list_backups".to_string(),
            reason: format!("Cannot read directory: {e}"),
        })?;

        let prefix = format!("{id}.json.backup.");
        let mut backups: Vec<(u128, PathBuf)> = entries
            .flatten()
            .filter_map(|entry| {
                let path = entry.path();
                let stamp = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .and_then(|name| name.strip_prefix(&prefix))
                    .and_then(|stamp| stamp.parse::<u128>().ok())?;
                Some((stamp, path))
            })
            .collect();

        backups.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(backups.into_iter().map(|(_, path)| path).collect())
    }

    fn attempt_load_from_file(&self, file_path: &Path) -> Result<SavedRace, UltraplanError> {
        let content =
            fs::read_to_string(file_path).map_err(|e| UltraplanError::FileOperationError {
                operation: "read_race_file".to_string(),
                reason: format!("Failed to read file: {e}"),
            })?;

        if content.trim().is_empty() {
            return Err(UltraplanError::StorageValidationError {
                reason: "Race file is empty".to_string(),
            });
        }

        serde_json::from_str(&content).map_err(|e| UltraplanError::StorageValidationError {
            reason: format!("Failed to parse JSON: {e}"),
        })
    }

    /// Load a race file, falling back to the newest readable backup
    fn load_from_file_with_recovery(
        &self,
        user_id: &str,
        id: Uuid,
    ) -> Result<Option<SavedRace>, UltraplanError> {
        let file_path = self.file_path_for_race(user_id, id);
        if !file_path.exists() {
            debug!("Race file does not exist: {file_path:?}");
            return Ok(None);
        }

        match self.attempt_load_from_file(&file_path) {
            Ok(race) => Ok(Some(race)),
            Err(e) => {
                warn!("Failed to load {file_path:?}: {e}");

                for backup_path in self.backup_files(user_id, id)? {
                    if let Ok(race) = self.attempt_load_from_file(&backup_path) {
                        warn!("Loaded race {id} from backup {backup_path:?}");
                        return Ok(Some(race));
                    }
                }

                Err(UltraplanError::FileOperationError {
                    operation: "load_race".to_string(),
                    reason: format!("Failed to load race {id} after all recovery attempts: {e}"),
                })
            }
        }
    }

    /// Copy the current file aside before it is overwritten
    fn create_backup_if_exists(&self, race: &SavedRace) -> Result<(), UltraplanError> {
        let file_path = self.file_path_for_race(&race.user_id, race.id);
        if !file_path.exists() {
            return Ok(());
        }

        let timestamp = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map_err(|e| UltraplanError::FileOperationError {
                operation: "create_backup".to_string(),
                reason: format!("Failed to get timestamp: {e}"),
            })?
            .as_millis();

        let backup_path = file_path.with_extension(format!("json.backup.{timestamp}"));
        fs::copy(&file_path, &backup_path).map_err(|e| UltraplanError::FileOperationError {
            operation: "create_backup".to_string(),
            reason: format!("Failed to create backup: {e}"),
        })?;

        debug!("Created backup: {backup_path:?}");
        Ok(())
    }

    fn cleanup_old_backups(&self, race: &SavedRace) -> Result<(), UltraplanError> {
        for old_backup in self
            .backup_files(&race.user_id, race.id)?
            .into_iter()
            .skip(MAX_BACKUPS)
        {
            if let Err(e) = fs::remove_file(&old_backup) {
                warn!("Failed to remove old backup {old_backup:?}: {e}");
            } else {
                debug!("Removed old backup: {old_backup:?}");
            }
        }
        Ok(())
    }

    /// Write through a synced temporary file, then rename into place
    fn save_to_file_with_recovery(&self, race: &SavedRace) -> Result<(), UltraplanError> {
        let dir = self.user_dir(&race.user_id);
        fs::create_dir_all(&dir).map_err(|e| UltraplanError::FileOperationError {
            operation: "create_user_dir".to_string(),
            reason: format!("Failed to create {dir:?}: {e}"),
        })?;

        let file_path = self.file_path_for_race(&race.user_id, race.id);
        let temp_path = file_path.with_extension("json.tmp");

        let content =
            serde_json::to_string_pretty(race).map_err(|e| UltraplanError::FileOperationError {
                operation: "serialize_race".to_string(),
                reason: format!("Failed to serialize race: {e}"),
            })?;

        {
            let mut temp_file =
                fs::File::create(&temp_path).map_err(|e| UltraplanError::FileOperationError {
                    operation: "create_temp_file".to_string(),
                    reason: format!("Failed to create temporary file: {e}"),
                })?;

            temp_file.write_all(content.as_bytes()).map_err(|e| {
                UltraplanError::FileOperationError {
                    operation: "write_temp_file".to_string(),
                    reason: format!("Failed to write to temporary file: {e}"),
                }
            })?;

            temp_file
                .sync_all()
                .map_err(|e| UltraplanError::FileOperationError {
                    operation: "sync_temp_file".to_string(),
                    reason: format!("Failed to sync temporary file: {e}"),
                })?;
        }

        fs::rename(&temp_path, &file_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            UltraplanError::FileOperationError {
                operation: "atomic_move".to_string(),
                reason: format!("Failed to move temporary file to final location: {e}"),
            }
        })
    }

    /// Backup, write, prune backups and refresh the cache
    fn persist(&mut self, race: &SavedRace) -> Result<(), UltraplanError> {
        if let Err(backup_error) = self.create_backup_if_exists(race) {
            warn!("Failed to create backup: {backup_error}");
        }

        if let Err(save_error) = self.save_to_file_with_recovery(race) {
            error!("Failed to save race {}: {save_error}", race.race_name);
            return Err(save_error);
        }

        if let Err(cleanup_error) = self.cleanup_old_backups(race) {
            warn!("Failed to clean up old backups: {cleanup_error}");
        }

        self.cache.insert(race.id, race.clone());
        Ok(())
    }

    fn ensure_name_available(
        &self,
        user_id: &str,
        race_name: &str,
        except: Option<Uuid>,
    ) -> Result<(), UltraplanError> {
        let taken = self
            .list_by_user(user_id)?
            .iter()
            .any(|other| Some(other.id) != except && other.has_name(race_name));
        if taken {
            return Err(UltraplanError::DuplicateRaceName {
                race_name: race_name.to_string(),
            });
        }
        Ok(())
    }
}

impl RacePlanStorage for FileBasedStorage {
    fn create(&mut self, race: SavedRace) -> Result<SavedRace, UltraplanError> {
        info!("Saving race {} for {}", race.race_name, race.user_id);

        if let Err(validation_error) = validate_for_save(&race) {
            error!("Race validation failed: {validation_error}");
            return Err(validation_error);
        }
        self.ensure_name_available(&race.user_id, &race.race_name, None)?;

        self.persist(&race)?;
        Ok(race)
    }

    fn list_by_user(&self, user_id: &str) -> Result<Vec<SavedRace>, UltraplanError> {
        let dir = self.user_dir(user_id);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let entries = fs::read_dir(&dir).map_err(|e| UltraplanError::FileOperationError {
            operation: "list_races".to_string(),
            reason: format!("Cannot read directory: {e}"),
        })?;

        let mut races = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            let Some(id) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(|stem| Uuid::parse_str(stem).ok())
            else {
                continue;
            };

            match self.load_from_file_with_recovery(user_id, id) {
                Ok(Some(race)) if race.user_id == user_id => races.push(race),
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable race file {path:?}: {e}"),
            }
        }

        races.sort_by_key(|race| race.race_name.to_lowercase());
        Ok(races)
    }

    fn fetch_by_id(&self, user_id: &str, id: Uuid) -> Result<Option<SavedRace>, UltraplanError> {
        if let Some(race) = self.cache.get(&id) {
            debug!("Found race {id} in cache");
            return Ok((race.user_id == user_id).then(|| race.clone()));
        }

        Ok(self
            .load_from_file_with_recovery(user_id, id)?
            .filter(|race| race.user_id == user_id))
    }

    fn update(&mut self, race: SavedRace) -> Result<SavedRace, UltraplanError> {
        info!("Updating race {} for {}", race.id, race.user_id);

        validate_for_save(&race)?;
        let existing = self.fetch_by_id(&race.user_id, race.id)?.ok_or_else(|| {
            UltraplanError::RaceNotFound {
                id: race.id.to_string(),
            }
        })?;
        self.ensure_name_available(&race.user_id, &race.race_name, Some(race.id))?;

        let mut updated = SavedRace {
            created_at: existing.created_at,
            version: existing.version,
            ..race
        };
        updated.touch();

        self.persist(&updated)?;
        Ok(updated)
    }

    fn delete(&mut self, user_id: &str, id: Uuid) -> Result<bool, UltraplanError> {
        if self.fetch_by_id(user_id, id)?.is_none() {
            debug!("Nothing to delete for race {id}");
            return Ok(false);
        }

        let file_path = self.file_path_for_race(user_id, id);
        fs::remove_file(&file_path).map_err(|e| UltraplanError::FileOperationError {
            operation: "delete_race".to_string(),
            reason: format!("Failed to remove {file_path:?}: {e}"),
        })?;
        for backup in self.backup_files(user_id, id)? {
            if let Err(e) = fs::remove_file(&backup) {
                warn!("Failed to remove backup {backup:?}: {e}");
            }
        }

        self.cache.remove(&id);
        info!("Deleted race {id}");
        Ok(true)
    }
}
