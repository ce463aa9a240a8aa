// Hour-by-hour intake timeline

use serde::{Deserialize, Serialize};

use crate::errors::UltraplanError;
use crate::nutrition::NutritionRatePlan;
use crate::race::{AidStation, RaceProfile};

/// Longest race the hourly timeline is built for, about six weeks of running.
pub const MAX_TIMELINE_HOURS: u32 = 1000;

/// Where the runner is expected to be at the end of a race hour.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HourlyCheckpoint {
    /// 1-based hour of the race
    pub hour: u32,
    /// Distance covered by the end of the hour, rounded to 0.1
    pub distance: f64,
    pub rates: NutritionRatePlan,
    /// Furthest aid station already passed, if any
    pub last_aid_station: Option<String>,
}

/// Build the hourly timeline assuming an even pace over the whole course.
///
/// One checkpoint per started hour, the last one clamped to the finish. Fails with
/// `InvalidInput` when the race would need more than [`MAX_TIMELINE_HOURS`] entries.
pub fn hourly_plan(
    profile: &RaceProfile,
    rates: &NutritionRatePlan,
    stations: &[AidStation],
) -> Result<Vec<HourlyCheckpoint>, UltraplanError> {
    profile.validate()?;
    rates.validate()?;

    let total_time = profile.estimated_time_hours;
    if total_time == 0.0 {
        return Ok(Vec::new());
    }

    let started_hours = total_time.ceil();
    if started_hours > f64::from(MAX_TIMELINE_HOURS) {
        return Err(UltraplanError::invalid_input(
            "estimated_time",
            format!(
                "{total_time} hours is too long for an hourly timeline (at most {MAX_TIMELINE_HOURS})"
            ),
        ));
    }
    // In 1..=MAX_TIMELINE_HOURS after the check above
    let hours = started_hours as u32;
    let speed = profile.total_distance / total_time;

    Ok((1..=hours)
        .map(|hour| {
            let distance = (speed * f64::from(hour)).min(profile.total_distance);
            let last_aid_station = stations
                .iter()
                .filter(|station| station.distance <= distance)
                .max_by(|a, b| a.distance.total_cmp(&b.distance))
                .map(|station| station.name.clone());

            HourlyCheckpoint {
                hour,
                distance: (distance * 10.0).round() / 10.0,
                rates: *rates,
                last_aid_station,
            }
        })
        .collect())
}
