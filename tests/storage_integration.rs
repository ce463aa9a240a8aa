// Integration test for saving and reloading race plans

use ultraplan::storage::SavedRaceSummary;
use ultraplan::{
    AidStation, AllocationPolicy, FileBasedStorage, NutritionRatePlan, RacePlan,
    RacePlanStorage, RaceProfile, SavedRace, UltraplanError,
};
use tempfile::TempDir;

fn plan(name: &str) -> RacePlan {
    RacePlan::compute(
        RaceProfile::new(name, 100.0, 16.0).unwrap(),
        NutritionRatePlan::new(90.0, 700.0, 600.0),
        vec![
            AidStation::new("1", "Aid 1", 25.0).with_elevation(850.0),
            AidStation::new("2", "Aid 2", 50.0),
            AidStation::new("3", "Aid 3", 75.0),
        ],
        AllocationPolicy::SegmentToNext,
    )
    .unwrap()
}

#[test]
fn test_saved_race_survives_reopening_storage() {
    let temp_dir = TempDir::new().unwrap();

    let mut plan = plan("Mozart 100");
    plan.schedule[1].override_arrival(8.5).unwrap();

    let saved = {
        let mut storage = FileBasedStorage::new(temp_dir.path().to_path_buf()).unwrap();
        storage
            .create(SavedRace::new("runner@example.com", None, plan.clone()))
            .unwrap()
    };

    let storage = FileBasedStorage::new(temp_dir.path().to_path_buf()).unwrap();
    let loaded = storage
        .fetch_by_id("runner@example.com", saved.id)
        .unwrap()
        .unwrap();

    // The schedule snapshot is kept as saved, overrides included
    assert_eq!(loaded.plan, plan);
    assert_eq!(loaded.plan.schedule[1].estimated_time, 8.5);
    assert!(loaded.plan.has_overrides());
    assert_eq!(loaded.plan.policy, AllocationPolicy::SegmentToNext);
    assert_eq!(loaded.created_at, saved.created_at);
}

#[test]
fn test_sub_second_race_time_survives_save_and_reload() {
    let temp_dir = TempDir::new().unwrap();
    let plan = RacePlan::compute(
        RaceProfile::new("Precise 80K", 80.0, 10.123456).unwrap(),
        NutritionRatePlan::default(),
        vec![
            AidStation::new("1", "Aid 1", 17.3),
            AidStation::new("2", "Aid 2", 48.9),
        ],
        AllocationPolicy::SegmentFromPrevious,
    )
    .unwrap();

    let saved = {
        let mut storage = FileBasedStorage::new(temp_dir.path().to_path_buf()).unwrap();
        storage
            .create(SavedRace::new("alice", None, plan.clone()))
            .unwrap()
    };

    let storage = FileBasedStorage::new(temp_dir.path().to_path_buf()).unwrap();
    let reloaded = storage.fetch_by_id("alice", saved.id).unwrap().unwrap();
    assert_eq!(reloaded.plan.profile.estimated_time_hours, 10.123456);
    assert_eq!(reloaded.plan, plan);
}

#[test]
fn test_users_are_isolated() {
    let temp_dir = TempDir::new().unwrap();
    let mut storage = FileBasedStorage::new(temp_dir.path().to_path_buf()).unwrap();

    let alice = storage
        .create(SavedRace::new("alice", None, plan("Shared Name")))
        .unwrap();
    let bob = storage
        .create(SavedRace::new("bob", None, plan("Shared Name")))
        .unwrap();

    assert_ne!(alice.id, bob.id);
    assert_eq!(storage.list_by_user("alice").unwrap().len(), 1);
    assert!(storage.fetch_by_id("alice", bob.id).unwrap().is_none());
    assert!(!storage.delete("alice", bob.id).unwrap());
    assert!(storage.fetch_by_id("bob", bob.id).unwrap().is_some());
}

#[test]
fn test_duplicate_and_replace_flow() {
    let temp_dir = TempDir::new().unwrap();
    let mut storage = FileBasedStorage::new(temp_dir.path().to_path_buf()).unwrap();

    let original = storage
        .create(SavedRace::new("alice", None, plan("UTMB")))
        .unwrap();

    let retry = SavedRace::new("alice", Some("utmb ".to_string()), plan("UTMB"));
    match storage.create(retry.clone()) {
        Err(UltraplanError::DuplicateRaceName { race_name }) => assert_eq!(race_name, "utmb"),
        other => panic!("expected duplicate name error, got {other:?}"),
    }

    let replaced = storage.replace_by_name(retry).unwrap();
    assert_eq!(replaced.id, original.id);
    assert_eq!(replaced.created_at, original.created_at);
    assert_eq!(replaced.race_name, "utmb");
    assert_eq!(replaced.version, 2);

    let found = storage.find_by_name("alice", "UTMB").unwrap().unwrap();
    assert_eq!(found.id, original.id);
}

#[test]
fn test_summaries_for_listing() {
    let temp_dir = TempDir::new().unwrap();
    let mut storage = FileBasedStorage::new(temp_dir.path().to_path_buf()).unwrap();

    storage
        .create(SavedRace::new("alice", None, plan("Zegama")))
        .unwrap();
    storage
        .create(SavedRace::new("alice", None, plan("Andorra")))
        .unwrap();

    let summaries: Vec<SavedRaceSummary> = storage
        .list_by_user("alice")
        .unwrap()
        .iter()
        .map(SavedRaceSummary::from)
        .collect();

    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].race_name, "Andorra");
    assert_eq!(summaries[1].race_name, "Zegama");
    assert_eq!(summaries[0].aid_station_count, 3);
    assert_eq!(summaries[0].estimated_time_hours, 16.0);
}
