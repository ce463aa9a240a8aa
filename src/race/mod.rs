// Race profile and aid station types

pub mod units;

use serde::{Deserialize, Serialize};

use crate::errors::UltraplanError;
use crate::gear::Weather;
pub use units::{UnitPreferences, UnitSystem};

/// Static description of a race as entered by the runner.
///
/// All distances (the race itself and every aid station) share the unit selected in
/// `unit_preferences.distance`. The allocator never converts them, it only needs them
/// to agree with each other.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RaceProfile {
    /// Human-readable race name (e.g., "Western States 100")
    pub race_name: String,
    /// Total course distance
    pub total_distance: f64,
    /// Expected finishing time in hours. Written as "HH:MM:SS" when that is exact,
    /// as plain hours otherwise. Both forms are accepted on read.
    #[serde(rename = "estimated_time", with = "hms")]
    pub estimated_time_hours: f64,
    /// Total climbing, display only
    #[serde(default)]
    pub elevation_gain: Option<f64>,
    /// Race day, free text (e.g., "2025-06-28")
    #[serde(default)]
    pub race_date: Option<String>,
    /// Start time of day, free text (e.g., "05:00")
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub unit_preferences: UnitPreferences,
    /// Expected race-day conditions, used for the gear checklist
    #[serde(default)]
    pub weather: Weather,
}

impl RaceProfile {
    /// Create a validated profile with metric display units.
    pub fn new(
        race_name: impl Into<String>,
        total_distance: f64,
        estimated_time_hours: f64,
    ) -> Result<Self, UltraplanError> {
        let profile = Self {
            race_name: race_name.into(),
            total_distance,
            estimated_time_hours,
            elevation_gain: None,
            race_date: None,
            start_time: None,
            unit_preferences: UnitPreferences::default(),
            weather: Weather::default(),
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Build a profile from the raw text a runner types into the race details form.
    pub fn from_form(
        race_name: &str,
        distance: &str,
        estimated_time: &str,
    ) -> Result<Self, UltraplanError> {
        let total_distance = distance.trim().parse::<f64>().map_err(|_| {
            UltraplanError::invalid_input("distance", format!("'{distance}' is not a number"))
        })?;
        let hours = parse_estimated_time(estimated_time)?;
        Self::new(race_name.trim(), total_distance, hours)
    }

    pub fn with_elevation_gain(mut self, elevation_gain: f64) -> Self {
        self.elevation_gain = Some(elevation_gain);
        self
    }

    pub fn with_unit_preferences(mut self, unit_preferences: UnitPreferences) -> Self {
        self.unit_preferences = unit_preferences;
        self
    }

    pub fn with_weather(mut self, weather: Weather) -> Self {
        self.weather = weather;
        self
    }

    pub fn with_schedule(mut self, race_date: Option<String>, start_time: Option<String>) -> Self {
        self.race_date = race_date;
        self.start_time = start_time;
        self
    }

    /// Check the numeric fields the allocator depends on.
    pub fn validate(&self) -> Result<(), UltraplanError> {
        if !self.total_distance.is_finite() || self.total_distance <= 0.0 {
            return Err(UltraplanError::invalid_input(
                "total_distance",
                format!("must be greater than 0, got {}", self.total_distance),
            ));
        }
        if !self.estimated_time_hours.is_finite() || self.estimated_time_hours < 0.0 {
            return Err(UltraplanError::invalid_input(
                "estimated_time",
                format!("must be 0 or more hours, got {}", self.estimated_time_hours),
            ));
        }
        Ok(())
    }

    /// Average pace in hours per distance unit.
    pub fn pace(&self) -> f64 {
        self.estimated_time_hours / self.total_distance
    }
}

/// A checkpoint on the course where the runner can resupply.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AidStation {
    /// Identifier, unique within a race
    pub id: String,
    pub name: String,
    /// Distance from the start, in the race's distance unit
    pub distance: f64,
    /// Optional elevation, display only
    #[serde(default)]
    pub elevation: Option<f64>,
}

impl AidStation {
    pub fn new(id: impl Into<String>, name: impl Into<String>, distance: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            distance,
            elevation: None,
        }
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = Some(elevation);
        self
    }
}

/// Parse an "HH:MM:SS" completion time into fractional hours.
///
/// Minutes and seconds may be omitted ("10" or "10:30") but every component present
/// must be a non-negative integer, with minutes and seconds below 60.
pub fn parse_estimated_time(time: &str) -> Result<f64, UltraplanError> {
    let parts: Vec<&str> = time.trim().split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return Err(UltraplanError::invalid_input(
            "estimated_time",
            format!("'{time}' is not in HH:MM:SS format"),
        ));
    }

    let mut components = [0u32; 3];
    for (slot, part) in components.iter_mut().zip(&parts) {
        *slot = part.trim().parse::<u32>().map_err(|_| {
            UltraplanError::invalid_input(
                "estimated_time",
                format!("'{part}' in '{time}' is not a whole number"),
            )
        })?;
    }

    let [hours, minutes, seconds] = components;
    if minutes >= 60 || seconds >= 60 {
        return Err(UltraplanError::invalid_input(
            "estimated_time",
            format!("minutes and seconds must be below 60 in '{time}'"),
        ));
    }

    Ok(f64::from(hours) + f64::from(minutes) / 60.0 + f64::from(seconds) / 3600.0)
}

/// Format elapsed hours as "HH:MM", truncating partial minutes.
pub fn format_elapsed(hours: f64) -> String {
    let hours = hours.max(0.0);
    let h = hours.floor();
    let m = ((hours - h) * 60.0).floor();
    format!("{:02}:{:02}", h as u64, m as u64)
}

/// Format fractional hours as "HH:MM:SS", rounded to the nearest second.
pub fn format_hms(hours: f64) -> String {
    let total_seconds = (hours.max(0.0) * 3600.0).round() as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total_seconds / 3600,
        (total_seconds % 3600) / 60,
        total_seconds % 60
    )
}

/// Format a pace in hours per distance unit as "M:SS" minutes per unit.
pub fn format_pace(hours_per_unit: f64) -> String {
    let total_seconds = (hours_per_unit.max(0.0) * 3600.0).round() as u64;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Serde adapter for race time.
///
/// Writes "HH:MM:SS" only when parsing it back yields the same hours, so a saved plan
/// reloads bit for bit. Anything finer than a second is written as plain hours.
mod hms {
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTime {
        Text(String),
        Hours(f64),
    }

    pub fn serialize<S: Serializer>(hours: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        let text = super::format_hms(*hours);
        match super::parse_estimated_time(&text) {
            Ok(parsed) if parsed == *hours => serializer.serialize_str(&text),
            _ => serializer.serialize_f64(*hours),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        match RawTime::deserialize(deserializer)? {
            RawTime::Text(text) => super::parse_estimated_time(&text).map_err(D::Error::custom),
            RawTime::Hours(hours) => Ok(hours),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_estimated_time() {
        assert_eq!(parse_estimated_time("10:00:00").unwrap(), 10.0);
        assert_eq!(parse_estimated_time("05:30:00").unwrap(), 5.5);
        assert_eq!(parse_estimated_time("24:15").unwrap(), 24.25);
        assert_eq!(parse_estimated_time("7").unwrap(), 7.0);
        assert!((parse_estimated_time("00:00:36").unwrap() - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_parse_estimated_time_rejects_bad_input() {
        assert!(parse_estimated_time("").is_err());
        assert!(parse_estimated_time("ten:00:00").is_err());
        assert!(parse_estimated_time("10:75:00").is_err());
        assert!(parse_estimated_time("10:00:60").is_err());
        assert!(parse_estimated_time("1:2:3:4").is_err());
        assert!(parse_estimated_time("-1:00:00").is_err());
    }

    #[test]
    fn test_format_elapsed_truncates_minutes() {
        assert_eq!(format_elapsed(0.0), "00:00");
        assert_eq!(format_elapsed(2.0), "02:00");
        assert_eq!(format_elapsed(5.999), "05:59");
        assert_eq!(format_elapsed(26.5), "26:30");
    }

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(10.0), "10:00:00");
        assert_eq!(format_hms(1.5), "01:30:00");
        assert_eq!(format_hms(30.25), "30:15:00");
    }

    #[test]
    fn test_format_pace() {
        assert_eq!(format_pace(0.2), "12:00");
        assert_eq!(format_pace(10.0 / 42.195), "14:13");
        assert_eq!(format_pace(0.0), "0:00");
    }

    #[test]
    fn test_sub_second_time_is_saved_as_hours() {
        let profile = RaceProfile::new("Precise", 80.0, 10.123456).unwrap();
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["estimated_time"], 10.123456);

        let loaded: RaceProfile = serde_json::from_value(json).unwrap();
        assert_eq!(loaded.estimated_time_hours, 10.123456);
        assert_eq!(loaded, profile);
    }

    #[test]
    fn test_profile_validation() {
        assert!(RaceProfile::new("Zero", 0.0, 10.0).is_err());
        assert!(RaceProfile::new("Negative", -5.0, 10.0).is_err());
        assert!(RaceProfile::new("NaN", f64::NAN, 10.0).is_err());
        assert!(RaceProfile::new("Bad time", 50.0, -1.0).is_err());
        assert!(RaceProfile::new("Ok", 50.0, 0.0).is_ok());
    }

    #[test]
    fn test_profile_from_form() {
        let profile = RaceProfile::from_form(" Western States ", "100", "24:30:00").unwrap();
        assert_eq!(profile.race_name, "Western States");
        assert_eq!(profile.total_distance, 100.0);
        assert_eq!(profile.estimated_time_hours, 24.5);

        assert!(RaceProfile::from_form("Race", "100 mi", "24:00:00").is_err());
        assert!(RaceProfile::from_form("Race", "100", "soon").is_err());
    }

    #[test]
    fn test_profile_json_uses_hms_time() {
        let profile = RaceProfile::new("Test 50", 50.0, 10.5).unwrap();
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["estimated_time"], "10:30:00");

        let loaded: RaceProfile = serde_json::from_value(json).unwrap();
        assert_eq!(loaded, profile);

        let numeric: RaceProfile = serde_json::from_str(
            r#"{"race_name":"Numeric","total_distance":42.2,"estimated_time":4.25}"#,
        )
        .unwrap();
        assert_eq!(numeric.estimated_time_hours, 4.25);
        assert_eq!(numeric.unit_preferences, UnitPreferences::default());
        assert_eq!(numeric.weather, Weather::Moderate);
    }
}
