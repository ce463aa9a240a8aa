// Food and drink items a runner logs as consumed during a segment

use serde::{Deserialize, Serialize};

use super::NutritionDose;

/// Broad grouping for logged items.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    Gel,
    Drink,
    Bar,
    Electrolyte,
    RealFood,
    #[default]
    Other,
}

impl std::fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FoodCategory::Gel => write!(f, "Gel"),
            FoodCategory::Drink => write!(f, "Drink"),
            FoodCategory::Bar => write!(f, "Bar"),
            FoodCategory::Electrolyte => write!(f, "Electrolyte"),
            FoodCategory::RealFood => write!(f, "Real Food"),
            FoodCategory::Other => write!(f, "Other"),
        }
    }
}

fn one_serving() -> f64 {
    1.0
}

/// A logged food or drink item.
///
/// Every nutrient field defaults to zero so partially described items (e.g. plain
/// water with no sodium listed) still deserialize.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct FoodItem {
    pub name: String,
    #[serde(default)]
    pub category: FoodCategory,
    /// Grams of carbohydrate per serving
    #[serde(default)]
    pub carbs_per_serving: f64,
    /// Milligrams of sodium per serving
    #[serde(default)]
    pub sodium_per_serving: f64,
    /// Milliliters of water per serving
    #[serde(default)]
    pub water_per_serving: f64,
    /// Kilocalories per serving
    #[serde(default)]
    pub calories_per_serving: f64,
    /// Free-text serving description (e.g., "1 packet")
    #[serde(default)]
    pub serving_size: Option<String>,
    /// Number of servings consumed
    #[serde(default = "one_serving")]
    pub servings: f64,
}

impl FoodItem {
    pub fn new(name: impl Into<String>, category: FoodCategory) -> Self {
        Self {
            name: name.into(),
            category,
            carbs_per_serving: 0.0,
            sodium_per_serving: 0.0,
            water_per_serving: 0.0,
            calories_per_serving: 0.0,
            serving_size: None,
            servings: 1.0,
        }
    }

    pub fn with_nutrients(mut self, carbs: f64, sodium: f64, water: f64) -> Self {
        self.carbs_per_serving = carbs;
        self.sodium_per_serving = sodium;
        self.water_per_serving = water;
        self
    }

    pub fn with_calories(mut self, calories: f64) -> Self {
        self.calories_per_serving = calories;
        self
    }

    pub fn with_serving_size(mut self, serving_size: impl Into<String>) -> Self {
        self.serving_size = Some(serving_size.into());
        self
    }

    pub fn with_servings(mut self, servings: f64) -> Self {
        self.servings = servings;
        self
    }
}

/// Total intake across logged items, rounded once per nutrient after summing.
///
/// Negative or non-finite contributions are ignored.
pub fn consumed_total(items: &[FoodItem]) -> NutritionDose {
    NutritionDose {
        carbs: summed(items, |item| item.carbs_per_serving),
        sodium: summed(items, |item| item.sodium_per_serving),
        water: summed(items, |item| item.water_per_serving),
    }
}

/// Kilocalories across logged items, rounded once after summing.
pub fn consumed_calories(items: &[FoodItem]) -> u32 {
    summed(items, |item| item.calories_per_serving)
}

fn summed(items: &[FoodItem], amount: fn(&FoodItem) -> f64) -> u32 {
    let total: f64 = items
        .iter()
        .map(|item| amount(item) * item.servings)
        .filter(|value| value.is_finite() && *value > 0.0)
        .sum();
    total.round() as u32
}

/// Reference products offered when planning what to carry.
pub fn sample_products() -> Vec<FoodItem> {
    vec![
        FoodItem::new("Energy Gel", FoodCategory::Gel)
            .with_nutrients(25.0, 50.0, 0.0)
            .with_calories(100.0)
            .with_serving_size("1 packet"),
        FoodItem::new("Sports Drink", FoodCategory::Drink)
            .with_nutrients(20.0, 200.0, 500.0)
            .with_calories(80.0)
            .with_serving_size("500ml"),
        FoodItem::new("Energy Bar", FoodCategory::Bar)
            .with_nutrients(40.0, 100.0, 0.0)
            .with_calories(200.0)
            .with_serving_size("1 bar"),
        FoodItem::new("Salt Tablets", FoodCategory::Electrolyte)
            .with_nutrients(0.0, 300.0, 0.0)
            .with_calories(0.0)
            .with_serving_size("1 tablet"),
        FoodItem::new("Banana", FoodCategory::RealFood)
            .with_nutrients(27.0, 1.0, 0.0)
            .with_calories(105.0)
            .with_serving_size("1 medium"),
    ]
}
