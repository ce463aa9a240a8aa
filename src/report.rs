// Printable plain-text race report

use crate::errors::UltraplanError;
use crate::gear::recommended_gear;
use crate::nutrition::NutritionDose;
use crate::plan::RacePlan;
use crate::race::units::{format_distance, format_elevation, format_fluid, format_weight};
use crate::race::{UnitPreferences, UnitSystem, format_elapsed, format_pace};

const NAME_WIDTH: usize = 24;
const COLUMN_WIDTH: usize = 11;

/// Render the report shown at the end of planning.
///
/// Sections: header, race overview, nutrition summary, gear checklist, and the aid
/// station table ending with a finish line row. When the policy leaves the lead
/// uncovered a start row is added so the dose carried from the start line is visible.
pub fn render_report(plan: &RacePlan) -> Result<String, UltraplanError> {
    let profile = &plan.profile;
    let units = &profile.unit_preferences;
    let mut report = String::new();

    report.push_str(&format!("RACE PLAN: {}\n", profile.race_name));
    match (&profile.race_date, &profile.start_time) {
        (Some(date), Some(time)) => report.push_str(&format!("{date} at {time}\n")),
        (Some(date), None) => report.push_str(&format!("{date}\n")),
        (None, Some(time)) => report.push_str(&format!("Start at {time}\n")),
        (None, None) => {}
    }

    report.push_str("\nRace Overview\n");
    report.push_str(&format!(
        "  Distance:        {}\n",
        format_distance(profile.total_distance, units.distance)
    ));
    let elevation = profile
        .elevation_gain
        .map(|gain| format_elevation(gain, units.elevation))
        .unwrap_or_else(|| "-".to_string());
    report.push_str(&format!("  Elevation gain:  {elevation}\n"));
    report.push_str(&format!(
        "  Estimated time:  {}\n",
        format_elapsed(profile.estimated_time_hours)
    ));
    report.push_str(&format!(
        "  Average pace:    {} min/{}\n",
        format_pace(profile.pace()),
        units.distance_label()
    ));
    report.push_str(&format!("  Aid stations:    {}\n", plan.schedule.len()));

    let totals = plan.race_totals();
    report.push_str("\nNutrition Summary\n");
    report.push_str(&format!(
        "  Carbs:   {} g/h (total {})\n",
        plan.rates.carbs_per_hour,
        format_weight(f64::from(totals.carbs), units.weight)
    ));
    report.push_str(&format!(
        "  Sodium:  {} mg/h (total {:.1} g)\n",
        plan.rates.sodium_per_hour,
        f64::from(totals.sodium) / 1000.0
    ));
    report.push_str(&format!(
        "  Water:   {} ml/h (total {})\n",
        plan.rates.water_per_hour,
        format_total_water(totals.water, units)
    ));
    report.push_str(&format!(
        "  Calories: {} kcal/h (total {} kcal)\n",
        plan.rates.calories_per_hour,
        plan.total_calories()
    ));

    report.push_str(&format!("\nGear Checklist ({} weather)\n", profile.weather));
    for item in recommended_gear(profile, profile.weather)
        .iter()
        .filter(|item| item.recommended)
    {
        report.push_str(&format!("  - {} ({})\n", item.name, item.category));
    }

    report.push_str("\nAid Stations\n");
    report.push_str(&format!(
        "{:<NAME_WIDTH$}{:>COLUMN_WIDTH$}{:>COLUMN_WIDTH$}{:>COLUMN_WIDTH$}{:>COLUMN_WIDTH$}{:>COLUMN_WIDTH$}\n",
        "Station", "Distance", "Arrival", "Carbs", "Sodium", "Water"
    ));

    let uncovered = plan.uncovered_segments()?;
    if plan.policy.leaves_lead_uncovered() {
        report.push_str(&table_row(
            "Start",
            &format_distance(0.0, units.distance),
            &format_elapsed(0.0),
            Some(&uncovered.lead),
            units,
        ));
    }

    for timing in &plan.schedule {
        let name = if timing.overridden {
            format!("{} *", timing.station.name)
        } else {
            timing.station.name.clone()
        };
        report.push_str(&table_row(
            &name,
            &format_distance(timing.station.distance, units.distance),
            &format_elapsed(timing.estimated_time),
            Some(&timing.nutrition_needed),
            units,
        ));
    }

    let finish_dose = plan
        .policy
        .leaves_tail_uncovered()
        .then_some(&uncovered.tail);
    report.push_str(&table_row(
        "Finish Line",
        &format_distance(profile.total_distance, units.distance),
        &format_elapsed(profile.estimated_time_hours),
        finish_dose,
        units,
    ));

    if plan.has_overrides() {
        report.push_str("\n* adjusted manually\n");
    }

    Ok(report)
}

fn format_total_water(water_ml: u32, units: &UnitPreferences) -> String {
    let water_ml = f64::from(water_ml);
    match units.fluid {
        UnitSystem::Metric => format!("{:.1} L", water_ml / 1000.0),
        UnitSystem::Imperial => format_fluid(water_ml, units.fluid),
    }
}

fn table_row(
    name: &str,
    distance: &str,
    arrival: &str,
    dose: Option<&NutritionDose>,
    units: &UnitPreferences,
) -> String {
    let (carbs, sodium, water) = match dose {
        Some(dose) => (
            format_weight(f64::from(dose.carbs), units.weight),
            format!("{} mg", dose.sodium),
            format_fluid(f64::from(dose.water), units.fluid),
        ),
        None => ("-".to_string(), "-".to_string(), "-".to_string()),
    };
    format!(
        "{name:<NAME_WIDTH$}{distance:>COLUMN_WIDTH$}{arrival:>COLUMN_WIDTH$}{carbs:>COLUMN_WIDTH$}{sodium:>COLUMN_WIDTH$}{water:>COLUMN_WIDTH$}\n"
    )
}
