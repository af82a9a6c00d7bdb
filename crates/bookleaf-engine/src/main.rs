//! Reading-schedule simulation for the Bookleaf progression engine.
//!
//! Wires the engine to in-memory stores and a manual clock, seeds the
//! starter catalog, and plays out a seeded reading schedule day by day,
//! logging every award, purchase, and plant death along the way.
//!
//! # Usage
//!
//! ```text
//! bookleaf-engine [DAYS] [SEED]
//! ```
//!
//! `DAYS` defaults to 60 and `SEED` to 42.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `bookleaf-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Build the engine and seed the species catalog
//! 4. Run the simulation
//! 5. Log the report

mod catalog;
mod error;
mod simulation;

use std::path::Path;
use std::sync::Arc;

use bookleaf_core::{Engine, EngineConfig, ManualClock};
use chrono::{TimeZone, Utc};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;
use crate::simulation::SimulationPlan;

/// Configuration file looked up in the working directory.
const CONFIG_PATH: &str = "bookleaf-config.yaml";

/// Days simulated when no argument is given.
const DEFAULT_DAYS: u32 = 60;

/// Seed used when no argument is given.
const DEFAULT_SEED: u64 = 42;

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration loading, argument parsing, or any
/// engine operation fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        starting_coins = config.economy.starting_coins,
        coins_per_level = config.economy.coins_per_level,
        plant_price_step = config.economy.plant_price_step,
        max_conflict_retries = config.concurrency.max_conflict_retries,
        "Configuration loaded"
    );

    let plan = parse_plan(std::env::args().skip(1))?;

    // 3. Build the engine.
    let start = Utc
        .with_ymd_and_hms(2026, 1, 5, 8, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);
    let clock = Arc::new(ManualClock::new(start));
    let species = catalog::starter_catalog();
    info!(species = species.len(), "Species catalog seeded");
    let engine = Engine::in_memory(clock.clone(), config, species);

    // 4. Run the simulation.
    info!(days = plan.days, seed = plan.seed, "Simulation starting");
    let report = simulation::run(&engine, &clock, plan)?;

    // 5. Log the report.
    let summary = engine.progression().level_summary()?;
    info!(
        days = report.days,
        sessions = report.sessions,
        streak_sessions = report.streak_sessions,
        books_finished = report.books_finished,
        level_ups = report.level_ups,
        plants_bought = report.plants_bought,
        waterings = report.waterings,
        plants_lost = report.plants_lost,
        events_seen = report.events_seen,
        "Simulation finished"
    );
    info!(
        level = summary.level,
        total_xp = summary.total_xp,
        xp_to_next_level = summary.xp_to_next_level,
        progress = %summary.progress,
        coins = report.final_progression.coins,
        boost = %engine.plants().total_boost()?,
        "Final progression"
    );
    for plant in engine.plants().plants()? {
        info!(
            plant_id = %plant.id,
            level = plant.current_level,
            experience = plant.experience,
            status = %plant.status,
            active = plant.is_active,
            "Plant"
        );
    }

    Ok(())
}

/// Load configuration from `bookleaf-config.yaml`, or use defaults.
fn load_config() -> Result<EngineConfig, AppError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok(EngineConfig::from_file(config_path)?)
    } else {
        let mut config = EngineConfig::default();
        config.logging.apply_env_overrides();
        Ok(config)
    }
}

/// Read `[DAYS] [SEED]` from the command line.
fn parse_plan(mut args: impl Iterator<Item = String>) -> Result<SimulationPlan, AppError> {
    let days = match args.next() {
        Some(raw) => raw.parse().map_err(|e| AppError::Args {
            name: "DAYS",
            message: format!("{raw:?}: {e}"),
        })?,
        None => DEFAULT_DAYS,
    };
    let seed = match args.next() {
        Some(raw) => raw.parse().map_err(|e| AppError::Args {
            name: "SEED",
            message: format!("{raw:?}: {e}"),
        })?,
        None => DEFAULT_SEED,
    };
    Ok(SimulationPlan { days, seed })
}
