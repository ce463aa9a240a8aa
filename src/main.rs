use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, error, warn};
use serde::Deserialize;
use uuid::Uuid;

use ultraplan::nutrition::{
    NutritionDose, NutritionRatePlan, compute_remaining, sample_products,
};
use ultraplan::race::{AidStation, RaceProfile, format_elapsed};
use ultraplan::schedule::{AllocationPolicy, hourly_plan};
use ultraplan::storage::{FileBasedStorage, RacePlanStorage, SavedRaceSummary};
use ultraplan::wizard::{PlannerContext, PlannerWizard};
use ultraplan::{AppConfig, UltraplanError, render_report};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute aid station timings and nutrition for a race plan file
    Plan(PlanOptions),
    /// Print the hour-by-hour intake timeline for a race plan file
    Hourly {
        #[arg(short, long)]
        input: PathBuf,
    },
    /// What is still left to take at an aid station
    Remaining {
        /// Target dose as carbs,sodium,water
        #[arg(short, long, value_parser = parse_dose)]
        target: NutritionDose,

        /// Consumed so far as carbs,sodium,water
        #[arg(short, long, value_parser = parse_dose)]
        consumed: NutritionDose,
    },
    /// List common race foods and their nutrients per serving
    Foods,
    /// Manage saved races
    Races {
        #[command(subcommand)]
        command: RacesCommand,
    },
    /// Show or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(clap::Args, Debug)]
struct PlanOptions {
    #[arg(short, long)]
    input: PathBuf,

    #[arg(short, long, value_enum)]
    policy: Option<PolicyArg>,

    /// Print the computed plan as JSON instead of the report
    #[arg(long)]
    json: bool,

    /// Save the plan for --user
    #[arg(long, requires = "user")]
    save: bool,

    #[arg(short, long)]
    user: Option<String>,

    /// Name to save under, defaults to the race name
    #[arg(long)]
    name: Option<String>,

    /// Replace a saved race with the same name
    #[arg(long)]
    replace: bool,
}

#[derive(Subcommand, Debug)]
enum RacesCommand {
    List {
        #[arg(short, long)]
        user: String,
    },
    Show {
        #[arg(short, long)]
        user: String,
        #[arg(long)]
        id: Uuid,
    },
    Delete {
        #[arg(short, long)]
        user: String,
        #[arg(long)]
        id: Uuid,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    Show,
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum PolicyArg {
    FromPrevious,
    ToNext,
    /// Last station gets nothing, as in plans from the older web planner
    ToNextLegacy,
}

impl From<PolicyArg> for AllocationPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::FromPrevious => AllocationPolicy::SegmentFromPrevious,
            PolicyArg::ToNext => AllocationPolicy::SegmentToNext,
            PolicyArg::ToNextLegacy => AllocationPolicy::SegmentToNextLegacy,
        }
    }
}

/// Race plan input file. Rates and policy fall back to the config file.
#[derive(Deserialize, Debug)]
struct PlanFile {
    profile: RaceProfile,
    rates: Option<NutritionRatePlan>,
    #[serde(default)]
    aid_stations: Vec<AidStation>,
    policy: Option<AllocationPolicy>,
}

fn parse_dose(value: &str) -> Result<NutritionDose, String> {
    let parts: Vec<&str> = value.split(',').map(str::trim).collect();
    let [carbs, sodium, water] = parts.as_slice() else {
        return Err(format!("expected carbs,sodium,water, got '{value}'"));
    };
    let parse = |part: &str| {
        part.parse::<u32>()
            .map_err(|_| format!("'{part}' is not a whole non-negative number"))
    };
    Ok(NutritionDose::new(parse(carbs)?, parse(sodium)?, parse(water)?))
}

fn load_config() -> Result<AppConfig, UltraplanError> {
    Ok(AppConfig::from_local_file()?.unwrap_or_default())
}

fn open_storage(config: &AppConfig) -> Result<FileBasedStorage, UltraplanError> {
    match &config.storage_dir {
        Some(dir) => FileBasedStorage::new(dir.clone()),
        None => FileBasedStorage::new_default(),
    }
}

fn load_plan_file(input: &Path) -> Result<PlanFile, UltraplanError> {
    let invalid = || UltraplanError::InvalidPlanFile {
        path: format!("{input:?}"),
    };
    if !input.exists() {
        return Err(invalid());
    }

    let content = std::fs::read_to_string(input).map_err(|e| {
        error!("Could not read {input:?}: {e}");
        invalid()
    })?;
    serde_json::from_str(&content).map_err(|e| {
        error!("Could not parse {input:?}: {e}");
        invalid()
    })
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, UltraplanError> {
    serde_json::to_string_pretty(value).map_err(|e| UltraplanError::FileOperationError {
        operation: "serialize_output".to_string(),
        reason: e.to_string(),
    })
}

fn plan(options: &PlanOptions) -> Result<(), UltraplanError> {
    let mut config = load_config()?;
    let plan_file = load_plan_file(&options.input)?;

    if let Some(policy) = options
        .policy
        .map(AllocationPolicy::from)
        .or(plan_file.policy)
    {
        config.policy = policy;
    }
    let rates = plan_file.rates.unwrap_or(config.rates);
    debug!("Planning with {} allocation", config.policy);

    let context = match &options.user {
        Some(user) => PlannerContext::signed_in(user.clone()),
        None => PlannerContext::anonymous(),
    };
    let mut wizard = PlannerWizard::new(context, config.clone());
    wizard.submit_race_details(plan_file.profile)?;
    for nutrient in wizard.submit_nutrition(rates)? {
        warn!("{nutrient} is outside the recommended range");
    }
    wizard.submit_aid_stations(plan_file.aid_stations)?;
    wizard.confirm_review()?;

    if options.json {
        if let Some(plan) = wizard.plan() {
            println!("{}", to_json(plan)?);
        }
    } else {
        print!("{}", wizard.render_report()?);
    }

    if options.save {
        let mut storage = open_storage(&config)?;
        let saved = wizard.save(&mut storage, options.name.clone(), options.replace)?;
        eprintln!("Saved \"{}\" as {} (version {})", saved.race_name, saved.id, saved.version);
    }
    Ok(())
}

fn hourly(input: &Path) -> Result<(), UltraplanError> {
    let config = load_config()?;
    let plan_file = load_plan_file(input)?;
    let rates = plan_file.rates.unwrap_or(config.rates);
    let units = plan_file.profile.unit_preferences;

    let checkpoints = hourly_plan(&plan_file.profile, &rates, &plan_file.aid_stations)?;
    println!(
        "{:>4}  {:>10}  {:>7}  {:>9}  {:>8}  Last aid station",
        "Hour", "Distance", "Carbs", "Sodium", "Water"
    );
    for checkpoint in checkpoints {
        println!(
            "{:>4}  {:>7.1} {:<2}  {:>5} g  {:>6} mg  {:>5} ml  {}",
            checkpoint.hour,
            checkpoint.distance,
            units.distance_label(),
            checkpoint.rates.carbs_per_hour,
            checkpoint.rates.sodium_per_hour,
            checkpoint.rates.water_per_hour,
            checkpoint.last_aid_station.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

fn races(command: &RacesCommand) -> Result<(), UltraplanError> {
    let config = load_config()?;
    let mut storage = open_storage(&config)?;

    match command {
        RacesCommand::List { user } => {
            for race in storage.list_by_user(user)? {
                let summary = SavedRaceSummary::from(&race);
                println!(
                    "{}  {:<30} {:>7.1}  {}  {} aid stations",
                    summary.id,
                    summary.race_name,
                    summary.total_distance,
                    format_elapsed(summary.estimated_time_hours),
                    summary.aid_station_count
                );
            }
        }
        RacesCommand::Show { user, id } => {
            let race = storage
                .fetch_by_id(user, *id)?
                .ok_or_else(|| UltraplanError::RaceNotFound { id: id.to_string() })?;
            print!("{}", render_report(&race.plan)?);
        }
        RacesCommand::Delete { user, id } => {
            if storage.delete(user, *id)? {
                println!("Deleted {id}");
            } else {
                return Err(UltraplanError::RaceNotFound { id: id.to_string() });
            }
        }
    }
    Ok(())
}

fn config(command: &ConfigCommand) -> Result<(), UltraplanError> {
    match command {
        ConfigCommand::Show => println!("{}", to_json(&load_config()?)?),
        ConfigCommand::Init { force } => {
            let path = AppConfig::config_path()?;
            if path.exists() && !force {
                warn!("Config file already exists at {path:?}, use --force to overwrite");
                return Ok(());
            }
            AppConfig::default().save_to(&path)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

fn run(cli: Args) -> Result<(), UltraplanError> {
    match cli.command {
        Commands::Plan(options) => plan(&options),
        Commands::Hourly { input } => hourly(&input),
        Commands::Remaining { target, consumed } => {
            println!("{}", compute_remaining(&target, &consumed));
            Ok(())
        }
        Commands::Foods => {
            for food in sample_products() {
                println!(
                    "{:<16} {:<12} {:>5} g carbs  {:>5} mg sodium  {:>5} ml water  {:>5} kcal  {}",
                    food.name,
                    food.category.to_string(),
                    food.carbs_per_serving,
                    food.sodium_per_serving,
                    food.water_per_serving,
                    food.calories_per_serving,
                    food.serving_size.as_deref().unwrap_or("")
                );
            }
            Ok(())
        }
        Commands::Races { command } => races(&command),
        Commands::Config { command } => config(&command),
    }
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
