// Library interface for ultraplan
// This allows integration tests and benches to access internal modules

pub mod config;
pub mod errors;
pub mod gear;
pub mod nutrition;
pub mod plan;
pub mod race;
pub mod report;
pub mod schedule;
pub mod storage;
pub mod wizard;

// Re-export commonly used types
pub use config::AppConfig;
pub use errors::UltraplanError;
pub use gear::{GearItem, Weather, recommended_gear};
pub use nutrition::{NutritionDose, NutritionRatePlan, compute_remaining};
pub use plan::RacePlan;
pub use race::{AidStation, RaceProfile, UnitPreferences, UnitSystem};
pub use report::render_report;
pub use schedule::{
    AidStationTiming, AllocationPolicy, HourlyCheckpoint, UncoveredSegments, compute_schedule,
    hourly_plan, uncovered_segment, uncovered_segments,
};
pub use storage::{FileBasedStorage, RacePlanStorage, SavedRace, SavedRaceSummary};
pub use wizard::{PlannerContext, PlannerWizard, WizardStage};
