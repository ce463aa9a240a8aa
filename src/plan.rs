// A complete race plan: inputs plus the computed schedule snapshot

use serde::{Deserialize, Serialize};

use crate::errors::UltraplanError;
use crate::nutrition::{NutritionDose, NutritionRatePlan};
use crate::race::{AidStation, RaceProfile};
use crate::schedule::{self, AidStationTiming, AllocationPolicy, UncoveredSegments};

/// Everything needed to print or save a plan.
///
/// `schedule` is a snapshot: once computed it may carry manual overrides and is
/// not recomputed implicitly when read back from storage.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct RacePlan {
    pub profile: RaceProfile,
    #[serde(default)]
    pub rates: NutritionRatePlan,
    #[serde(default)]
    pub aid_stations: Vec<AidStation>,
    #[serde(default)]
    pub policy: AllocationPolicy,
    #[serde(default)]
    pub schedule: Vec<AidStationTiming>,
}

impl RacePlan {
    /// Validate the inputs and compute a fresh schedule.
    pub fn compute(
        profile: RaceProfile,
        rates: NutritionRatePlan,
        aid_stations: Vec<AidStation>,
        policy: AllocationPolicy,
    ) -> Result<Self, UltraplanError> {
        let mut plan = Self {
            profile,
            rates,
            aid_stations,
            policy,
            schedule: Vec::new(),
        };
        plan.recompute()?;
        Ok(plan)
    }

    /// Discard the current schedule (including overrides) and compute it again.
    pub fn recompute(&mut self) -> Result<(), UltraplanError> {
        self.profile.validate()?;
        self.schedule = schedule::schedule_for_profile(
            &self.profile,
            &self.rates,
            &self.aid_stations,
            self.policy,
        )?;
        Ok(())
    }

    /// Whole-race nutrition need, rounded once.
    pub fn race_totals(&self) -> NutritionDose {
        self.rates.race_totals(self.profile.estimated_time_hours)
    }

    /// Dose for the segment no aid station covers under this plan's policy.
    pub fn uncovered_segment(&self) -> Result<NutritionDose, UltraplanError> {
        schedule::uncovered_segment(
            self.profile.total_distance,
            self.profile.estimated_time_hours,
            &self.rates,
            &self.aid_stations,
            self.policy,
        )
    }

    /// Lead and tail doses no aid station covers, as shown on the start and finish rows.
    pub fn uncovered_segments(&self) -> Result<UncoveredSegments, UltraplanError> {
        schedule::uncovered_segments(
            self.profile.total_distance,
            self.profile.estimated_time_hours,
            &self.rates,
            &self.aid_stations,
            self.policy,
        )
    }

    /// Whole-race energy need in kilocalories.
    pub fn total_calories(&self) -> u32 {
        self.rates.total_calories(self.profile.estimated_time_hours)
    }

    pub fn has_overrides(&self) -> bool {
        self.schedule.iter().any(|timing| timing.overridden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_plan() -> RacePlan {
        RacePlan::compute(
            RaceProfile::new("Test 50K", 50.0, 10.0).unwrap(),
            NutritionRatePlan::default(),
            vec![
                AidStation::new("1", "Ridge", 10.0),
                AidStation::new("2", "Lake", 25.0),
                AidStation::new("3", "Summit", 40.0),
            ],
            AllocationPolicy::SegmentFromPrevious,
        )
        .unwrap()
    }

    #[test]
    fn test_compute_fills_schedule() {
        let plan = sample_plan();
        assert_eq!(plan.schedule.len(), 3);
        assert_eq!(plan.race_totals(), NutritionDose::new(600, 5000, 5000));
        assert_eq!(
            plan.uncovered_segment().unwrap(),
            NutritionDose::new(120, 1000, 1000)
        );
        assert!(!plan.has_overrides());
        assert_eq!(plan.total_calories(), 2500);
    }

    #[test]
    fn test_legacy_plan_splits_uncovered_lead_and_tail() {
        let mut plan = sample_plan();
        plan.policy = AllocationPolicy::SegmentToNextLegacy;
        plan.recompute().unwrap();

        assert!(plan.schedule[2].nutrition_needed.is_zero());
        let uncovered = plan.uncovered_segments().unwrap();
        assert_eq!(uncovered.lead, NutritionDose::new(120, 1000, 1000));
        assert_eq!(uncovered.tail, NutritionDose::new(120, 1000, 1000));
    }

    #[test]
    fn test_recompute_discards_overrides() {
        let mut plan = sample_plan();
        plan.schedule[1].override_nutrition(NutritionDose::ZERO);
        assert!(plan.has_overrides());

        plan.recompute().unwrap();
        assert!(!plan.has_overrides());
        assert_eq!(plan.schedule[1].nutrition_needed, NutritionDose::new(180, 1500, 1500));
    }

    #[test]
    fn test_compute_rejects_station_past_finish() {
        let result = RacePlan::compute(
            RaceProfile::new("Short", 10.0, 1.0).unwrap(),
            NutritionRatePlan::default(),
            vec![AidStation::new("1", "Too far", 12.0)],
            AllocationPolicy::default(),
        );
        assert!(matches!(result, Err(UltraplanError::InvalidInput { .. })));
    }

    #[test]
    fn test_plan_json_defaults() {
        let plan: RacePlan = serde_json::from_str(
            r#"{
                "profile": {"race_name": "Bare", "total_distance": 21.1, "estimated_time": "02:00:00"},
                "aid_stations": [{"id": "1", "name": "Halfway", "distance": 10.5}]
            }"#,
        )
        .unwrap();
        assert_eq!(plan.rates, NutritionRatePlan::default());
        assert_eq!(plan.policy, AllocationPolicy::SegmentFromPrevious);
        assert!(plan.schedule.is_empty());
    }
}
