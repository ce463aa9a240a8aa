// Step-by-step race planning flow
// Collects race details, nutrition targets and aid stations, then computes the
// schedule for review, reporting and saving.

use log::{debug, info};

use crate::config::AppConfig;
use crate::errors::UltraplanError;
use crate::nutrition::{NutritionDose, NutritionRatePlan};
use crate::plan::RacePlan;
use crate::race::{AidStation, RaceProfile};
use crate::report;
use crate::storage::{RacePlanStorage, SavedRace};

/// Steps of the planning flow, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WizardStage {
    RaceDetails,
    Nutrition,
    AidStations,
    Review,
    Report,
}

impl WizardStage {
    fn previous(self) -> Self {
        match self {
            WizardStage::RaceDetails | WizardStage::Nutrition => WizardStage::RaceDetails,
            WizardStage::AidStations => WizardStage::Nutrition,
            WizardStage::Review => WizardStage::AidStations,
            WizardStage::Report => WizardStage::Review,
        }
    }
}

impl std::fmt::Display for WizardStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WizardStage::RaceDetails => write!(f, "race details"),
            WizardStage::Nutrition => write!(f, "nutrition"),
            WizardStage::AidStations => write!(f, "aid stations"),
            WizardStage::Review => write!(f, "review"),
            WizardStage::Report => write!(f, "report"),
        }
    }
}

/// Who is planning, and which saved race (if any) is being edited.
#[derive(Clone, Debug, Default)]
pub struct PlannerContext {
    pub user_id: Option<String>,
    pub loaded_race: Option<SavedRace>,
}

impl PlannerContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            loaded_race: None,
        }
    }

    /// Edit an existing saved race. The owner becomes the signed-in user.
    pub fn editing(race: SavedRace) -> Self {
        Self {
            user_id: Some(race.user_id.clone()),
            loaded_race: Some(race),
        }
    }
}

pub struct PlannerWizard {
    context: PlannerContext,
    config: AppConfig,
    stage: WizardStage,
    profile: Option<RaceProfile>,
    rates: NutritionRatePlan,
    aid_stations: Vec<AidStation>,
    plan: Option<RacePlan>,
}

impl PlannerWizard {
    /// Start a new flow. When the context carries a saved race its inputs are
    /// pre-filled so each step can be resubmitted as-is.
    pub fn new(context: PlannerContext, config: AppConfig) -> Self {
        let mut wizard = Self {
            context,
            rates: config.rates,
            config,
            stage: WizardStage::RaceDetails,
            profile: None,
            aid_stations: Vec::new(),
            plan: None,
        };

        if let Some(race) = &wizard.context.loaded_race {
            debug!("Pre-filling planner from saved race {}", race.id);
            wizard.profile = Some(race.plan.profile.clone());
            wizard.rates = race.plan.rates;
            wizard.aid_stations = race.plan.aid_stations.clone();
            wizard.config.policy = race.plan.policy;
        }
        wizard
    }

    pub fn stage(&self) -> WizardStage {
        self.stage
    }

    pub fn context(&self) -> &PlannerContext {
        &self.context
    }

    pub fn profile(&self) -> Option<&RaceProfile> {
        self.profile.as_ref()
    }

    pub fn rates(&self) -> &NutritionRatePlan {
        &self.rates
    }

    pub fn aid_stations(&self) -> &[AidStation] {
        &self.aid_stations
    }

    /// The computed plan, available from the review step on.
    pub fn plan(&self) -> Option<&RacePlan> {
        self.plan.as_ref()
    }

    fn require_stage(&self, expected: WizardStage, action: &str) -> Result<(), UltraplanError> {
        if self.stage != expected {
            return Err(UltraplanError::InvalidStageTransition {
                from: self.stage.to_string(),
                action: action.to_string(),
            });
        }
        Ok(())
    }

    fn plan_mut(&mut self, action: &str) -> Result<&mut RacePlan, UltraplanError> {
        let stage = self.stage;
        self.plan
            .as_mut()
            .ok_or_else(|| UltraplanError::InvalidStageTransition {
                from: stage.to_string(),
                action: action.to_string(),
            })
    }

    pub fn submit_race_details(&mut self, profile: RaceProfile) -> Result<(), UltraplanError> {
        self.require_stage(WizardStage::RaceDetails, "submit race details")?;
        profile.validate()?;

        info!("Planning {}", profile.race_name);
        self.profile = Some(profile);
        self.stage = WizardStage::Nutrition;
        Ok(())
    }

    /// Accept the hourly targets. Returns the nutrients outside the recommended
    /// ranges so they can be flagged; those are not errors.
    pub fn submit_nutrition(
        &mut self,
        rates: NutritionRatePlan,
    ) -> Result<Vec<&'static str>, UltraplanError> {
        self.require_stage(WizardStage::Nutrition, "submit nutrition")?;
        rates.validate()?;

        let warnings = rates.outside_recommended_ranges();
        self.rates = rates;
        self.stage = WizardStage::AidStations;
        Ok(warnings)
    }

    /// Accept the aid stations and compute a fresh schedule for review.
    pub fn submit_aid_stations(
        &mut self,
        aid_stations: Vec<AidStation>,
    ) -> Result<&RacePlan, UltraplanError> {
        self.require_stage(WizardStage::AidStations, "submit aid stations")?;
        let profile = self
            .profile
            .clone()
            .ok_or_else(|| UltraplanError::InvalidStageTransition {
                from: self.stage.to_string(),
                action: "submit aid stations without race details".to_string(),
            })?;

        let plan = RacePlan::compute(
            profile,
            self.rates,
            aid_stations.clone(),
            self.config.policy,
        )?;
        self.aid_stations = aid_stations;
        self.stage = WizardStage::Review;
        Ok(self.plan.insert(plan))
    }

    pub fn override_arrival(&mut self, index: usize, hours: f64) -> Result<(), UltraplanError> {
        self.require_stage(WizardStage::Review, "adjust arrival times")?;
        let plan = self.plan_mut("adjust arrival times")?;
        let station_count = plan.schedule.len();
        plan.schedule
            .get_mut(index)
            .ok_or_else(|| {
                UltraplanError::invalid_input(
                    "aid_station",
                    format!("no aid station #{index} (plan has {station_count})"),
                )
            })?
            .override_arrival(hours)
    }

    pub fn override_nutrition(
        &mut self,
        index: usize,
        dose: NutritionDose,
    ) -> Result<(), UltraplanError> {
        self.require_stage(WizardStage::Review, "adjust nutrition")?;
        let plan = self.plan_mut("adjust nutrition")?;
        let station_count = plan.schedule.len();
        plan.schedule
            .get_mut(index)
            .ok_or_else(|| {
                UltraplanError::invalid_input(
                    "aid_station",
                    format!("no aid station #{index} (plan has {station_count})"),
                )
            })?
            .override_nutrition(dose);
        Ok(())
    }

    pub fn confirm_review(&mut self) -> Result<(), UltraplanError> {
        self.require_stage(WizardStage::Review, "confirm the review")?;
        self.stage = WizardStage::Report;
        Ok(())
    }

    /// Go back one step, keeping everything entered so far.
    pub fn back(&mut self) {
        self.stage = self.stage.previous();
    }

    /// Return to the first step and forget everything entered, including the
    /// saved race being edited. The signed-in user is kept.
    pub fn start_over(&mut self) {
        debug!("Starting over from the {} step", self.stage);
        self.context.loaded_race = None;
        self.stage = WizardStage::RaceDetails;
        self.profile = None;
        self.rates = self.config.rates;
        self.aid_stations.clear();
        self.plan = None;
    }

    pub fn render_report(&self) -> Result<String, UltraplanError> {
        self.require_stage(WizardStage::Report, "render the report")?;
        match &self.plan {
            Some(plan) => report::render_report(plan),
            None => Err(UltraplanError::InvalidStageTransition {
                from: self.stage.to_string(),
                action: "render the report without a plan".to_string(),
            }),
        }
    }

    /// Save the plan for the signed-in user.
    ///
    /// A race loaded for editing is updated in place. Otherwise a new record is
    /// created; if the name is taken this fails with `DuplicateRaceName` unless
    /// `replace_existing` is set.
    pub fn save(
        &mut self,
        storage: &mut dyn RacePlanStorage,
        race_name: Option<String>,
        replace_existing: bool,
    ) -> Result<SavedRace, UltraplanError> {
        self.require_stage(WizardStage::Report, "save the race")?;
        let user_id = self
            .context
            .user_id
            .clone()
            .ok_or(UltraplanError::NotSignedIn)?;
        let plan = self.plan_mut("save the race")?.clone();

        let saved = match self.context.loaded_race.clone() {
            Some(mut existing) if existing.user_id == user_id => {
                if let Some(name) = race_name {
                    existing.race_name = name.trim().to_string();
                }
                existing.plan = plan;
                storage.update(existing)?
            }
            _ => {
                let race = SavedRace::new(user_id, race_name, plan);
                if replace_existing {
                    storage.replace_by_name(race)?
                } else {
                    storage.create(race)?
                }
            }
        };

        info!("Saved race {} ({})", saved.race_name, saved.id);
        self.context.loaded_race = Some(saved.clone());
        Ok(saved)
    }
}
