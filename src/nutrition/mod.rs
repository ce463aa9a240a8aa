// Hourly nutrition targets and the per-segment doses derived from them

pub mod food;

use std::ops::{Add, AddAssign, RangeInclusive};

use serde::{Deserialize, Serialize};

use crate::errors::UltraplanError;
pub use food::{FoodCategory, FoodItem, consumed_calories, consumed_total, sample_products};

/// Recommended carbohydrate intake in grams per hour
pub const CARBS_RANGE_G_PER_HOUR: RangeInclusive<f64> = 20.0..=120.0;
/// Recommended sodium intake in milligrams per hour
pub const SODIUM_RANGE_MG_PER_HOUR: RangeInclusive<f64> = 200.0..=1000.0;
/// Recommended water intake in milliliters per hour
pub const WATER_RANGE_ML_PER_HOUR: RangeInclusive<f64> = 200.0..=1000.0;
/// Recommended energy intake in kilocalories per hour
pub const CALORIES_RANGE_KCAL_PER_HOUR: RangeInclusive<f64> = 200.0..=300.0;

const DEFAULT_CALORIES_PER_HOUR: f64 = 250.0;

fn default_calories_per_hour() -> f64 {
    DEFAULT_CALORIES_PER_HOUR
}

/// Target hourly intake for the three tracked nutrients.
///
/// The recommended ranges are advisory only. Anything finite and non-negative is
/// accepted by the allocator.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct NutritionRatePlan {
    /// Carbohydrate, grams per hour
    pub carbs_per_hour: f64,
    /// Sodium, milligrams per hour
    pub sodium_per_hour: f64,
    /// Water, milliliters per hour
    pub water_per_hour: f64,
    /// Energy, kilocalories per hour. Reported as a race total, not allocated to
    /// aid stations.
    #[serde(default = "default_calories_per_hour")]
    pub calories_per_hour: f64,
}

impl Default for NutritionRatePlan {
    fn default() -> Self {
        Self {
            carbs_per_hour: 60.0,
            sodium_per_hour: 500.0,
            water_per_hour: 500.0,
            calories_per_hour: DEFAULT_CALORIES_PER_HOUR,
        }
    }
}

impl NutritionRatePlan {
    pub fn new(carbs_per_hour: f64, sodium_per_hour: f64, water_per_hour: f64) -> Self {
        Self {
            carbs_per_hour,
            sodium_per_hour,
            water_per_hour,
            calories_per_hour: DEFAULT_CALORIES_PER_HOUR,
        }
    }

    pub fn with_calories_per_hour(mut self, calories_per_hour: f64) -> Self {
        self.calories_per_hour = calories_per_hour;
        self
    }

    /// Reject rates that would make a dose negative or NaN.
    pub fn validate(&self) -> Result<(), UltraplanError> {
        for (field, rate) in [
            ("carbs_per_hour", self.carbs_per_hour),
            ("sodium_per_hour", self.sodium_per_hour),
            ("water_per_hour", self.water_per_hour),
            ("calories_per_hour", self.calories_per_hour),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(UltraplanError::invalid_input(
                    field,
                    format!("must be a non-negative number, got {rate}"),
                ));
            }
        }
        Ok(())
    }

    /// Names of the rates that fall outside the recommended ranges.
    pub fn outside_recommended_ranges(&self) -> Vec<&'static str> {
        let mut outside = Vec::new();
        if !CARBS_RANGE_G_PER_HOUR.contains(&self.carbs_per_hour) {
            outside.push("carbs_per_hour");
        }
        if !SODIUM_RANGE_MG_PER_HOUR.contains(&self.sodium_per_hour) {
            outside.push("sodium_per_hour");
        }
        if !WATER_RANGE_ML_PER_HOUR.contains(&self.water_per_hour) {
            outside.push("water_per_hour");
        }
        if !CALORIES_RANGE_KCAL_PER_HOUR.contains(&self.calories_per_hour) {
            outside.push("calories_per_hour");
        }
        outside
    }

    /// Dose needed to cover `hours` at these rates, each field rounded independently.
    pub fn dose_for(&self, hours: f64) -> NutritionDose {
        NutritionDose {
            carbs: round_amount(self.carbs_per_hour * hours),
            sodium: round_amount(self.sodium_per_hour * hours),
            water: round_amount(self.water_per_hour * hours),
        }
    }

    /// Whole-race need, rounded once rather than per segment.
    pub fn race_totals(&self, total_hours: f64) -> NutritionDose {
        self.dose_for(total_hours)
    }

    /// Whole-race energy need in kilocalories.
    pub fn total_calories(&self, total_hours: f64) -> u32 {
        round_amount(self.calories_per_hour * total_hours)
    }
}

/// Round half away from zero and clamp into the dose range.
///
/// Negative and NaN inputs map to 0. Callers validate inputs before this point, the
/// clamp only keeps the cast well defined.
fn round_amount(value: f64) -> u32 {
    let rounded = value.round();
    if rounded.is_nan() || rounded <= 0.0 {
        0
    } else {
        rounded as u32
    }
}

/// Whole-unit amounts of each nutrient: grams of carbs, milligrams of sodium,
/// milliliters of water.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct NutritionDose {
    pub carbs: u32,
    pub sodium: u32,
    pub water: u32,
}

impl NutritionDose {
    pub const ZERO: NutritionDose = NutritionDose {
        carbs: 0,
        sodium: 0,
        water: 0,
    };

    pub fn new(carbs: u32, sodium: u32, water: u32) -> Self {
        Self {
            carbs,
            sodium,
            water,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl Add for NutritionDose {
    type Output = NutritionDose;

    fn add(self, rhs: Self) -> Self::Output {
        NutritionDose {
            carbs: self.carbs.saturating_add(rhs.carbs),
            sodium: self.sodium.saturating_add(rhs.sodium),
            water: self.water.saturating_add(rhs.water),
        }
    }
}

impl AddAssign for NutritionDose {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::iter::Sum for NutritionDose {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(NutritionDose::ZERO, |acc, dose| acc + dose)
    }
}

impl std::fmt::Display for NutritionDose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}g carbs, {}mg sodium, {}ml water",
            self.carbs, self.sodium, self.water
        )
    }
}

/// What is still left to take in for a segment after logging consumption.
///
/// Each field is `max(0, target - consumed)`, so eating more than planned for one
/// nutrient never produces a negative value or borrows from another.
pub fn compute_remaining(target: &NutritionDose, consumed: &NutritionDose) -> NutritionDose {
    NutritionDose {
        carbs: target.carbs.saturating_sub(consumed.carbs),
        sodium: target.sodium.saturating_sub(consumed.sodium),
        water: target.water.saturating_sub(consumed.water),
    }
}
