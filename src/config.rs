use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::UltraplanError;
use crate::nutrition::NutritionRatePlan;
use crate::race::UnitPreferences;
use crate::schedule::AllocationPolicy;

const CONFIG_FILE_NAME: &str = "config.json";

/// User defaults applied to every new plan.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub units: UnitPreferences,
    pub rates: NutritionRatePlan,
    pub policy: AllocationPolicy,
    /// Overrides the default saved race directory
    pub storage_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn config_path() -> Result<PathBuf, UltraplanError> {
        Ok(dirs::config_dir()
            .ok_or(UltraplanError::NoConfigDir)?
            .join("ultraplan")
            .join(CONFIG_FILE_NAME))
    }

    /// Load the user's config file. `None` if it does not exist yet.
    pub fn from_local_file() -> Result<Option<Self>, UltraplanError> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Option<Self>, UltraplanError> {
        if !config_path.exists() {
            return Ok(None);
        }

        let file =
            File::open(config_path).map_err(|e| UltraplanError::ConfigIOError { source: e })?;
        let config: Self = serde_json::from_reader(file)
            .map_err(|e| UltraplanError::ConfigSerializeError { source: e })?;
        config.rates.validate()?;
        Ok(Some(config))
    }

    pub fn save(&self) -> Result<(), UltraplanError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), UltraplanError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| UltraplanError::ConfigIOError { source: e })?;
        }

        let file =
            File::create(config_path).map_err(|e| UltraplanError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| UltraplanError::ConfigSerializeError { source: e })
    }
}
