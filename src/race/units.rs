// Unit conversion and display formatting for race quantities

use serde::{Deserialize, Serialize};
use uom::si::f64::{Length, Mass, Volume};
use uom::si::length::{foot, kilometer, meter, mile};
use uom::si::mass::{gram, ounce};
use uom::si::volume::{fluid_ounce, milliliter};

/// Measurement system used when displaying a quantity.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl std::fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitSystem::Metric => write!(f, "metric"),
            UnitSystem::Imperial => write!(f, "imperial"),
        }
    }
}

/// Per-quantity display preferences. Each quantity can be switched independently,
/// e.g. kilometers for distance with feet for elevation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnitPreferences {
    #[serde(default)]
    pub distance: UnitSystem,
    #[serde(default)]
    pub elevation: UnitSystem,
    #[serde(default)]
    pub fluid: UnitSystem,
    #[serde(default)]
    pub weight: UnitSystem,
}

impl UnitPreferences {
    pub fn all(system: UnitSystem) -> Self {
        Self {
            distance: system,
            elevation: system,
            fluid: system,
            weight: system,
        }
    }

    pub fn distance_label(&self) -> &'static str {
        match self.distance {
            UnitSystem::Metric => "km",
            UnitSystem::Imperial => "mi",
        }
    }

    pub fn elevation_label(&self) -> &'static str {
        match self.elevation {
            UnitSystem::Metric => "m",
            UnitSystem::Imperial => "ft",
        }
    }
}

pub fn km_to_miles(km: f64) -> f64 {
    Length::new::<kilometer>(km).get::<mile>()
}

pub fn miles_to_km(miles: f64) -> f64 {
    Length::new::<mile>(miles).get::<kilometer>()
}

pub fn meters_to_feet(meters: f64) -> f64 {
    Length::new::<meter>(meters).get::<foot>()
}

pub fn feet_to_meters(feet: f64) -> f64 {
    Length::new::<foot>(feet).get::<meter>()
}

pub fn ml_to_oz(ml: f64) -> f64 {
    Volume::new::<milliliter>(ml).get::<fluid_ounce>()
}

pub fn oz_to_ml(oz: f64) -> f64 {
    Volume::new::<fluid_ounce>(oz).get::<milliliter>()
}

pub fn grams_to_oz(grams: f64) -> f64 {
    Mass::new::<gram>(grams).get::<ounce>()
}

pub fn oz_to_grams(oz: f64) -> f64 {
    Mass::new::<ounce>(oz).get::<gram>()
}

/// Format a distance that is already expressed in `unit`.
pub fn format_distance(value: f64, unit: UnitSystem) -> String {
    match unit {
        UnitSystem::Metric => format!("{value:.1} km"),
        UnitSystem::Imperial => format!("{value:.1} mi"),
    }
}

/// Format an elevation that is already expressed in `unit`, rounded to whole units.
pub fn format_elevation(value: f64, unit: UnitSystem) -> String {
    match unit {
        UnitSystem::Metric => format!("{} m", value.round()),
        UnitSystem::Imperial => format!("{} ft", value.round()),
    }
}

/// Format a fluid volume given in milliliters, converting when `unit` is imperial.
pub fn format_fluid(ml: f64, unit: UnitSystem) -> String {
    match unit {
        UnitSystem::Metric => format!("{ml:.0} ml"),
        UnitSystem::Imperial => format!("{:.1} oz", ml_to_oz(ml)),
    }
}

/// Format a weight given in grams, converting when `unit` is imperial.
pub fn format_weight(grams: f64, unit: UnitSystem) -> String {
    match unit {
        UnitSystem::Metric => format!("{grams:.0} g"),
        UnitSystem::Imperial => format!("{:.1} oz", grams_to_oz(grams)),
    }
}
