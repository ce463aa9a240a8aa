//! Race timing and nutrition allocation.
//!
//! Arrival times are interpolated linearly along the course: a station at 40% of
//! the distance is reached at 40% of the estimated finishing time. Each station is
//! then given the nutrition dose for one course segment, chosen by the
//! [`AllocationPolicy`].
//!
//! Doses are rounded per segment, so the sum over all segments can differ from the
//! whole-race total (rounded once) by up to one unit per segment and nutrient. The
//! per-station numbers are what the runner sees and carries, so they are not
//! adjusted to absorb that drift.

pub mod hourly;

use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::UltraplanError;
use crate::nutrition::{NutritionDose, NutritionRatePlan};
use crate::race::{AidStation, RaceProfile};

pub use hourly::{HourlyCheckpoint, hourly_plan};

/// Which course segment an aid station's nutrition dose covers.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicy {
    /// The dose at a station covers the time since the previous station (or the
    /// start). The stretch from the last station to the finish belongs to no station.
    #[default]
    SegmentFromPrevious,
    /// The dose at a station covers the time until the next station (or the finish).
    /// The stretch from the start to the first station belongs to no station.
    SegmentToNext,
    /// Like `SegmentToNext`, except the last station gets nothing and the stretch
    /// from it to the finish is left uncovered as well. Matches plans made with the
    /// older web planner, which never gave the last station a finish segment.
    SegmentToNextLegacy,
}

impl AllocationPolicy {
    /// Whether the start to first station stretch is left to the runner's own supplies.
    pub fn leaves_lead_uncovered(self) -> bool {
        matches!(
            self,
            AllocationPolicy::SegmentToNext | AllocationPolicy::SegmentToNextLegacy
        )
    }

    /// Whether the last station to finish stretch is left to the runner's own supplies.
    pub fn leaves_tail_uncovered(self) -> bool {
        matches!(
            self,
            AllocationPolicy::SegmentFromPrevious | AllocationPolicy::SegmentToNextLegacy
        )
    }
}

impl std::fmt::Display for AllocationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AllocationPolicy::SegmentFromPrevious => write!(f, "segment from previous"),
            AllocationPolicy::SegmentToNext => write!(f, "segment to next"),
            AllocationPolicy::SegmentToNextLegacy => write!(f, "segment to next (legacy)"),
        }
    }
}

/// An aid station with its projected arrival and nutrition dose.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AidStationTiming {
    #[serde(flatten)]
    pub station: AidStation,
    /// Hours from the race start
    pub estimated_time: f64,
    /// Dose for the segment assigned to this station
    pub nutrition_needed: NutritionDose,
    /// Set once the runner has edited the computed values
    #[serde(default)]
    pub overridden: bool,
}

impl AidStationTiming {
    /// Replace the projected arrival time with one entered by the runner.
    pub fn override_arrival(&mut self, hours: f64) -> Result<(), UltraplanError> {
        if !hours.is_finite() || hours < 0.0 {
            return Err(UltraplanError::invalid_input(
                "estimated_time",
                format!("arrival must be 0 or more hours, got {hours}"),
            ));
        }
        self.estimated_time = hours;
        self.overridden = true;
        Ok(())
    }

    /// Replace the computed nutrition dose with one entered by the runner.
    pub fn override_nutrition(&mut self, dose: NutritionDose) {
        self.nutrition_needed = dose;
        self.overridden = true;
    }
}

/// Project arrival times and per-segment nutrition for every aid station.
///
/// Stations are sorted by distance before processing (ties keep their input order)
/// and returned in that order. Fails with `InvalidInput` when the race distance is
/// not positive, the time or a rate is negative, or a station lies outside
/// `[0, total_distance]`.
pub fn compute_schedule(
    total_distance: f64,
    total_time: f64,
    rates: &NutritionRatePlan,
    stations: &[AidStation],
    policy: AllocationPolicy,
) -> Result<Vec<AidStationTiming>, UltraplanError> {
    let sorted = validate_and_sort(total_distance, total_time, rates, stations)?;
    let arrivals: Vec<f64> = sorted
        .iter()
        .map(|station| arrival_time(station.distance, total_distance, total_time))
        .collect();

    let schedule = sorted
        .into_iter()
        .enumerate()
        .map(|(i, station)| {
            let segment = match policy {
                AllocationPolicy::SegmentFromPrevious => {
                    let previous = if i == 0 { 0.0 } else { arrivals[i - 1] };
                    arrivals[i] - previous
                }
                AllocationPolicy::SegmentToNext => {
                    let next = arrivals.get(i + 1).copied().unwrap_or(total_time);
                    next - arrivals[i]
                }
                AllocationPolicy::SegmentToNextLegacy => match arrivals.get(i + 1) {
                    Some(next) => next - arrivals[i],
                    None => 0.0,
                },
            };

            AidStationTiming {
                station: station.clone(),
                estimated_time: arrivals[i],
                nutrition_needed: rates.dose_for(segment),
                overridden: false,
            }
        })
        .collect();

    Ok(schedule)
}

/// Doses for the stretches of course no station covers.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UncoveredSegments {
    /// Start to the first station
    pub lead: NutritionDose,
    /// Last station to the finish
    pub tail: NutritionDose,
}

impl UncoveredSegments {
    pub fn total(&self) -> NutritionDose {
        self.lead + self.tail
    }
}

/// Split the uncovered stretches into the lead and tail doses under `policy`.
///
/// A stretch the policy gives to a station is zero. With no stations at all the whole
/// race is uncovered and is reported as the lead when the policy leaves the lead
/// uncovered, otherwise as the tail.
pub fn uncovered_segments(
    total_distance: f64,
    total_time: f64,
    rates: &NutritionRatePlan,
    stations: &[AidStation],
    policy: AllocationPolicy,
) -> Result<UncoveredSegments, UltraplanError> {
    let sorted = validate_and_sort(total_distance, total_time, rates, stations)?;

    let (lead_hours, tail_hours) = match (sorted.first(), sorted.last()) {
        (Some(first), Some(last)) => (
            arrival_time(first.distance, total_distance, total_time),
            total_time - arrival_time(last.distance, total_distance, total_time),
        ),
        _ if policy.leaves_lead_uncovered() => (total_time, 0.0),
        _ => (0.0, total_time),
    };

    let dose_if = |uncovered: bool, hours: f64| {
        if uncovered {
            rates.dose_for(hours)
        } else {
            NutritionDose::ZERO
        }
    };
    Ok(UncoveredSegments {
        lead: dose_if(policy.leaves_lead_uncovered(), lead_hours),
        tail: dose_if(policy.leaves_tail_uncovered(), tail_hours),
    })
}

/// Total dose for the course no station covers under `policy`.
///
/// With no stations at all this is the whole race.
pub fn uncovered_segment(
    total_distance: f64,
    total_time: f64,
    rates: &NutritionRatePlan,
    stations: &[AidStation],
    policy: AllocationPolicy,
) -> Result<NutritionDose, UltraplanError> {
    uncovered_segments(total_distance, total_time, rates, stations, policy)
        .map(|segments| segments.total())
}

/// Convenience wrapper taking the distance and time from a profile.
pub fn schedule_for_profile(
    profile: &RaceProfile,
    rates: &NutritionRatePlan,
    stations: &[AidStation],
    policy: AllocationPolicy,
) -> Result<Vec<AidStationTiming>, UltraplanError> {
    compute_schedule(
        profile.total_distance,
        profile.estimated_time_hours,
        rates,
        stations,
        policy,
    )
}

fn arrival_time(distance: f64, total_distance: f64, total_time: f64) -> f64 {
    (distance / total_distance) * total_time
}

fn validate_and_sort<'a>(
    total_distance: f64,
    total_time: f64,
    rates: &NutritionRatePlan,
    stations: &'a [AidStation],
) -> Result<Vec<&'a AidStation>, UltraplanError> {
    if !total_distance.is_finite() || total_distance <= 0.0 {
        return Err(UltraplanError::invalid_input(
            "total_distance",
            format!("must be greater than 0, got {total_distance}"),
        ));
    }
    if !total_time.is_finite() || total_time < 0.0 {
        return Err(UltraplanError::invalid_input(
            "total_time",
            format!("must be 0 or more hours, got {total_time}"),
        ));
    }
    rates.validate()?;

    for station in stations {
        if !station.distance.is_finite()
            || station.distance < 0.0
            || station.distance > total_distance
        {
            return Err(UltraplanError::invalid_input(
                format!("aid_station[{}].distance", station.id),
                format!(
                    "'{}' at {} is outside the course (0 to {total_distance})",
                    station.name, station.distance
                ),
            ));
        }
    }

    let already_sorted = stations
        .iter()
        .tuple_windows()
        .all(|(a, b)| a.distance <= b.distance);
    if !already_sorted {
        debug!(
            "Aid stations were not in course order, sorting {} stations by distance",
            stations.len()
        );
    }

    // Distances are finite at this point so total_cmp agrees with numeric order
    Ok(stations
        .iter()
        .sorted_by(|a, b| a.distance.total_cmp(&b.distance))
        .collect())
}
