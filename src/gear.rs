// Race-day gear checklist

use serde::{Deserialize, Serialize};

use crate::race::RaceProfile;
use crate::race::units::{UnitSystem, feet_to_meters, miles_to_km};

/// Expected conditions on race day.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Weather {
    Sunny,
    #[default]
    Moderate,
    Rainy,
    Cold,
}

impl std::fmt::Display for Weather {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Weather::Sunny => write!(f, "Sunny"),
            Weather::Moderate => write!(f, "Moderate"),
            Weather::Rainy => write!(f, "Rainy"),
            Weather::Cold => write!(f, "Cold"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GearCategory {
    Footwear,
    Clothing,
    Equipment,
    Safety,
    Weather,
    PersonalCare,
    Accessories,
    Electronics,
}

impl std::fmt::Display for GearCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GearCategory::Footwear => write!(f, "Footwear"),
            GearCategory::Clothing => write!(f, "Clothing"),
            GearCategory::Equipment => write!(f, "Equipment"),
            GearCategory::Safety => write!(f, "Safety"),
            GearCategory::Weather => write!(f, "Weather"),
            GearCategory::PersonalCare => write!(f, "Personal Care"),
            GearCategory::Accessories => write!(f, "Accessories"),
            GearCategory::Electronics => write!(f, "Electronics"),
        }
    }
}

/// One checklist line and whether this race calls for it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GearItem {
    pub name: String,
    pub category: GearCategory,
    pub recommended: bool,
}

/// When an item is worth packing. Thresholds are metric.
#[derive(Clone, Copy, Debug)]
enum Rule {
    Always,
    Never,
    HoursOver(f64),
    KmOver(f64),
    ClimbMetersOver(f64),
    UnlessWeather(Weather),
    InWeather(Weather),
}

const CHECKLIST: &[(&str, GearCategory, Rule)] = &[
    ("Trail Running Shoes", GearCategory::Footwear, Rule::Always),
    ("Running Socks", GearCategory::Footwear, Rule::Always),
    ("Running Shorts/Tights", GearCategory::Clothing, Rule::Always),
    ("Technical T-shirt", GearCategory::Clothing, Rule::Always),
    ("Hydration Pack/Vest", GearCategory::Equipment, Rule::Always),
    ("Headlamp", GearCategory::Equipment, Rule::HoursOver(8.0)),
    ("Backup Batteries", GearCategory::Equipment, Rule::HoursOver(12.0)),
    ("First Aid Kit", GearCategory::Safety, Rule::KmOver(30.0)),
    ("Emergency Blanket", GearCategory::Safety, Rule::KmOver(50.0)),
    ("Whistle", GearCategory::Safety, Rule::KmOver(30.0)),
    ("Rain Jacket", GearCategory::Weather, Rule::UnlessWeather(Weather::Sunny)),
    ("Gloves", GearCategory::Weather, Rule::InWeather(Weather::Cold)),
    ("Sunscreen", GearCategory::PersonalCare, Rule::Always),
    ("Anti-chafing Balm", GearCategory::PersonalCare, Rule::KmOver(20.0)),
    ("Sunglasses", GearCategory::Accessories, Rule::Always),
    ("Running Hat/Cap", GearCategory::Accessories, Rule::Always),
    ("Trekking Poles", GearCategory::Equipment, Rule::ClimbMetersOver(1500.0)),
    ("Compression Sleeves", GearCategory::Accessories, Rule::Never),
    ("GPS Watch", GearCategory::Electronics, Rule::Always),
    ("Phone", GearCategory::Electronics, Rule::Always),
];

/// Build the full gear checklist for a race, flagging the items worth packing.
///
/// Distance and climbing are converted to km and meters first, so an imperial profile
/// gets the same recommendations as the equivalent metric one.
pub fn recommended_gear(profile: &RaceProfile, weather: Weather) -> Vec<GearItem> {
    let units = &profile.unit_preferences;
    let km = match units.distance {
        UnitSystem::Metric => profile.total_distance,
        UnitSystem::Imperial => miles_to_km(profile.total_distance),
    };
    let climb_meters = profile
        .elevation_gain
        .map(|gain| match units.elevation {
            UnitSystem::Metric => gain,
            UnitSystem::Imperial => feet_to_meters(gain),
        })
        .unwrap_or(0.0);
    let hours = profile.estimated_time_hours;

    CHECKLIST
        .iter()
        .map(|(name, category, rule)| {
            let recommended = match *rule {
                Rule::Always => true,
                Rule::Never => false,
                Rule::HoursOver(limit) => hours > limit,
                Rule::KmOver(limit) => km > limit,
                Rule::ClimbMetersOver(limit) => climb_meters > limit,
                Rule::UnlessWeather(excluded) => weather != excluded,
                Rule::InWeather(required) => weather == required,
            };
            GearItem {
                name: (*name).to_string(),
                category: *category,
                recommended,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race::{UnitPreferences, UnitSystem};

    fn recommended_names(profile: &RaceProfile, weather: Weather) -> Vec<String> {
        recommended_gear(profile, weather)
            .into_iter()
            .filter(|item| item.recommended)
            .map(|item| item.name)
            .collect()
    }

    #[test]
    fn test_short_race_gets_the_basics() {
        let profile = RaceProfile::new("Park 10K", 10.0, 1.0).unwrap();
        let names = recommended_names(&profile, Weather::Sunny);

        assert_eq!(recommended_gear(&profile, Weather::Sunny).len(), 20);
        assert_eq!(names.len(), 10);
        assert!(names.contains(&"Trail Running Shoes".to_string()));
        assert!(!names.contains(&"Headlamp".to_string()));
        assert!(!names.contains(&"Rain Jacket".to_string()));
        assert!(!names.contains(&"Compression Sleeves".to_string()));
    }

    #[test]
    fn test_long_mountain_race_in_the_cold() {
        let profile = RaceProfile::new("UTMB", 171.0, 40.0)
            .unwrap()
            .with_elevation_gain(10000.0);
        let names = recommended_names(&profile, Weather::Cold);

        for expected in [
            "Headlamp",
            "Backup Batteries",
            "First Aid Kit",
            "Emergency Blanket",
            "Whistle",
            "Rain Jacket",
            "Gloves",
            "Anti-chafing Balm",
            "Trekking Poles",
        ] {
            assert!(names.contains(&expected.to_string()), "missing {expected}");
        }
        assert_eq!(names.len(), 19);
    }

    #[test]
    fn test_imperial_profile_is_converted_before_thresholds() {
        // 20 mi is about 32 km, 4000 ft is about 1219 m
        let profile = RaceProfile::new("Trail 20", 20.0, 5.0)
            .unwrap()
            .with_elevation_gain(4000.0)
            .with_unit_preferences(UnitPreferences::all(UnitSystem::Imperial));
        let names = recommended_names(&profile, Weather::Moderate);

        assert!(names.contains(&"First Aid Kit".to_string()));
        assert!(!names.contains(&"Emergency Blanket".to_string()));
        assert!(!names.contains(&"Trekking Poles".to_string()));

        let metric = RaceProfile::new("Trail 20", 20.0, 5.0)
            .unwrap()
            .with_elevation_gain(4000.0);
        let metric_names = recommended_names(&metric, Weather::Moderate);
        assert!(!metric_names.contains(&"First Aid Kit".to_string()));
        assert!(metric_names.contains(&"Trekking Poles".to_string()));
    }

    #[test]
    fn test_rain_jacket_follows_weather() {
        let profile = RaceProfile::new("Test 50K", 50.0, 7.0).unwrap();
        assert!(recommended_names(&profile, Weather::Rainy).contains(&"Rain Jacket".to_string()));
        assert!(
            recommended_names(&profile, Weather::Moderate).contains(&"Rain Jacket".to_string())
        );
        assert!(!recommended_names(&profile, Weather::Sunny).contains(&"Rain Jacket".to_string()));
        assert!(!recommended_names(&profile, Weather::Rainy).contains(&"Gloves".to_string()));
    }

    #[test]
    fn test_weather_json_is_lowercase() {
        assert_eq!(serde_json::to_value(Weather::Cold).unwrap(), "cold");
        let parsed: Weather = serde_json::from_str(r#""sunny""#).unwrap();
        assert_eq!(parsed, Weather::Sunny);
    }
}
