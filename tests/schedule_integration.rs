// Integration tests for schedule computation through the public API

use ultraplan::schedule::uncovered_segment;
use ultraplan::{
    AidStation, AllocationPolicy, NutritionDose, NutritionRatePlan, RacePlan, RaceProfile,
    UltraplanError, compute_remaining, compute_schedule, hourly_plan, render_report,
};

fn western_states() -> (RaceProfile, Vec<AidStation>) {
    let profile = RaceProfile::from_form("Western States 100", "161", "24:00")
        .unwrap()
        .with_elevation_gain(5500.0);
    let stations = vec![
        AidStation::new("ls", "Lyon Ridge", 16.6),
        AidStation::new("rf", "Robinson Flat", 48.6),
        AidStation::new("ds", "Devil's Thumb", 76.2),
        AidStation::new("fh", "Foresthill", 100.9),
        AidStation::new("rc", "Rucky Chucky", 126.7),
        AidStation::new("hw", "Highway 49", 150.1),
    ];
    (profile, stations)
}

#[test]
fn test_fifty_k_reference_scenario() {
    let stations = vec![
        AidStation::new("1", "Aid Station 1", 10.0),
        AidStation::new("2", "Aid Station 2", 25.0),
        AidStation::new("3", "Aid Station 3", 40.0),
    ];
    let schedule = compute_schedule(
        50.0,
        10.0,
        &NutritionRatePlan::default(),
        &stations,
        AllocationPolicy::SegmentFromPrevious,
    )
    .unwrap();

    let times: Vec<f64> = schedule.iter().map(|t| t.estimated_time).collect();
    assert_eq!(times, vec![2.0, 5.0, 8.0]);

    let doses: Vec<NutritionDose> = schedule.iter().map(|t| t.nutrition_needed).collect();
    assert_eq!(
        doses,
        vec![
            NutritionDose::new(120, 1000, 1000),
            NutritionDose::new(180, 1500, 1500),
            NutritionDose::new(180, 1500, 1500),
        ]
    );
}

#[test]
fn test_zero_distance_is_rejected() {
    let result = compute_schedule(
        0.0,
        10.0,
        &NutritionRatePlan::default(),
        &[AidStation::new("1", "Anywhere", 0.0)],
        AllocationPolicy::default(),
    );
    assert!(matches!(result, Err(UltraplanError::InvalidInput { .. })));
}

#[test]
fn test_remaining_after_logging_food() {
    let remaining = compute_remaining(
        &NutritionDose::new(120, 1000, 1000),
        &NutritionDose::new(150, 800, 1000),
    );
    assert_eq!(remaining, NutritionDose::new(0, 200, 0));
}

#[test]
fn test_single_station_at_finish_gets_whole_race() {
    let rates = NutritionRatePlan::default();
    let schedule = compute_schedule(
        42.2,
        4.0,
        &rates,
        &[AidStation::new("f", "Finish", 42.2)],
        AllocationPolicy::SegmentFromPrevious,
    )
    .unwrap();

    assert_eq!(schedule[0].estimated_time, 4.0);
    assert_eq!(schedule[0].nutrition_needed, rates.race_totals(4.0));
}

#[test]
fn test_policies_cover_the_same_race() {
    let (profile, stations) = western_states();
    let rates = NutritionRatePlan::new(75.0, 600.0, 650.0);
    let totals = rates.race_totals(profile.estimated_time_hours);

    for policy in [
        AllocationPolicy::SegmentFromPrevious,
        AllocationPolicy::SegmentToNext,
    ] {
        let plan = RacePlan::compute(profile.clone(), rates, stations.clone(), policy).unwrap();
        let allocated: NutritionDose = plan
            .schedule
            .iter()
            .map(|t| t.nutrition_needed)
            .sum::<NutritionDose>()
            + plan.uncovered_segment().unwrap();

        // One unit of drift at most per rounded segment
        let segments = stations.len() as i64 + 1;
        assert!((i64::from(allocated.carbs) - i64::from(totals.carbs)).abs() <= segments);
        assert!((i64::from(allocated.sodium) - i64::from(totals.sodium)).abs() <= segments);
        assert!((i64::from(allocated.water) - i64::from(totals.water)).abs() <= segments);
    }
}

#[test]
fn test_to_next_moves_the_uncovered_segment_to_the_start() {
    let (profile, stations) = western_states();
    let rates = NutritionRatePlan::default();

    let lead = uncovered_segment(
        profile.total_distance,
        profile.estimated_time_hours,
        &rates,
        &stations,
        AllocationPolicy::SegmentToNext,
    )
    .unwrap();
    let first_station_time = 16.6 / 161.0 * 24.0;
    assert_eq!(lead, rates.dose_for(first_station_time));
}

#[test]
fn test_hourly_timeline_matches_schedule() {
    let (profile, stations) = western_states();
    let rates = NutritionRatePlan::default();
    let timeline = hourly_plan(&profile, &rates, &stations).unwrap();

    assert_eq!(timeline.len(), 24);
    assert_eq!(timeline[23].distance, 161.0);
    assert_eq!(timeline[23].last_aid_station.as_deref(), Some("Highway 49"));
    assert!(timeline[0].last_aid_station.is_none());
}

#[test]
fn test_report_for_plan_file() {
    let mut plan: RacePlan = serde_json::from_str(
        r#"{
            "profile": {
                "race_name": "Lavaredo 120",
                "total_distance": 120,
                "estimated_time": "20:00:00",
                "unit_preferences": {"distance": "metric", "fluid": "imperial"}
            },
            "rates": {"carbs_per_hour": 70, "sodium_per_hour": 400, "water_per_hour": 600},
            "aid_stations": [
                {"id": "b", "name": "Auronzo", "distance": 66.0},
                {"id": "a", "name": "Ospitale", "distance": 18.0}
            ],
            "policy": "segment_from_previous"
        }"#,
    )
    .unwrap();
    plan.recompute().unwrap();

    // Stations are reported in course order
    assert_eq!(plan.schedule[0].station.name, "Ospitale");
    assert_eq!(plan.schedule[1].station.name, "Auronzo");

    let report = render_report(&plan).unwrap();
    assert!(report.contains("RACE PLAN: Lavaredo 120"));
    assert!(report.contains("120.0 km"));
    assert!(report.contains("Finish Line"));
    assert!(report.contains(" oz"));
}
