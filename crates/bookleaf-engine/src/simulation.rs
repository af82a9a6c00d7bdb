//! Seeded day-by-day reading schedule driven through the engine.
//!
//! Each simulated day the reader may read (with a streak when the previous
//! day also had a session), may finish a book, waters some of the plants
//! that need it, and shops when coins allow. At the end of the day plant
//! health is refreshed and the clock moves forward 24 hours.
//!
//! The same seed always produces the same report.

use chrono::{Duration, NaiveDate};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::TryRecvError;

use bookleaf_core::{Clock, Engine, ManualClock, SessionOutcome};
use bookleaf_progression::streak;
use bookleaf_types::{PlantStatus, ProgressionChanged, ReadingSession, UserProgression};

use crate::error::AppError;

/// Chance the reader opens a book on a given day.
const READ_CHANCE: f64 = 0.8;

/// Chance a reading day also finishes a book.
const FINISH_CHANCE: f64 = 0.1;

/// Chance the reader notices a plant that needs water.
const WATER_CHANCE: f64 = 0.75;

/// What to simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationPlan {
    /// Number of days to run.
    pub days: u32,
    /// Seed for every random choice.
    pub seed: u64,
}

/// Totals gathered over a simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    /// Days simulated.
    pub days: u32,
    /// Reading sessions recorded.
    pub sessions: u32,
    /// Sessions that carried the streak bonus.
    pub streak_sessions: u32,
    /// Books finished.
    pub books_finished: u32,
    /// Level-ups observed (a multi-level jump counts once).
    pub level_ups: u32,
    /// Plants bought.
    pub plants_bought: u32,
    /// Times a plant was watered.
    pub waterings: u32,
    /// Plants that died of neglect.
    pub plants_lost: u32,
    /// Progression change events received.
    pub events_seen: u32,
    /// The progression record at the end.
    pub final_progression: UserProgression,
}

/// Run `plan` against `engine`, advancing `clock` one day at a time.
pub fn run(
    engine: &Engine,
    clock: &ManualClock,
    plan: SimulationPlan,
) -> Result<SimulationReport, AppError> {
    let mut rng = SmallRng::seed_from_u64(plan.seed);
    let mut events = engine.subscribe();
    let mut reading_days: Vec<NaiveDate> = Vec::new();
    let mut report = SimulationReport {
        days: plan.days,
        sessions: 0,
        streak_sessions: 0,
        books_finished: 0,
        level_ups: 0,
        plants_bought: 0,
        waterings: 0,
        plants_lost: 0,
        events_seen: 0,
        final_progression: engine.progression().progression()?,
    };

    for day in 0..plan.days {
        let today = clock.now().date_naive();

        if rng.random_bool(READ_CHANCE) {
            reading_days.push(today);
            read(engine, &mut rng, &reading_days, today, &mut report)?;
        }

        water(engine, &mut rng, &mut report)?;
        shop(engine, &mut report)?;

        let refresh = engine.plants().refresh_statuses()?;
        report.plants_lost = report.plants_lost.saturating_add(refresh.newly_dead);
        report.events_seen = report.events_seen.saturating_add(drain(&mut events));

        tracing::debug!(
            day,
            %today,
            coins = engine.progression().progression()?.coins,
            "Day complete"
        );
        clock.advance(Duration::days(1));
    }

    report.final_progression = engine.progression().progression()?;
    Ok(report)
}

/// Record one reading session and maybe a finished book.
fn read(
    engine: &Engine,
    rng: &mut SmallRng,
    reading_days: &[NaiveDate],
    today: NaiveDate,
    report: &mut SimulationReport,
) -> Result<(), AppError> {
    let has_streak = streak::has_reading_streak(reading_days, today);
    let minutes = rng.random_range(10..=90);
    let pages_read = rng
        .random_bool(0.6)
        .then(|| rng.random_range(5..=40));
    let session = ReadingSession {
        minutes,
        pages_read,
        has_streak,
    };

    let SessionOutcome {
        progression,
        plant_award,
    } = engine.record_session(&session)?;
    let plant_award = plant_award?;
    report.sessions = report.sessions.saturating_add(1);
    if has_streak {
        report.streak_sessions = report.streak_sessions.saturating_add(1);
    }
    if progression.level_up.is_some() {
        report.level_ups = report.level_ups.saturating_add(1);
    }
    tracing::info!(
        minutes,
        pages = pages_read.unwrap_or(0),
        streak = has_streak,
        xp = progression.boosted_xp,
        bonus = progression.bonus_xp(),
        plant_xp = plant_award.as_ref().map_or(0, |a| a.xp_added),
        "Reading session"
    );

    if rng.random_bool(FINISH_CHANCE) {
        let finished = engine.complete_book()?;
        report.books_finished = report.books_finished.saturating_add(1);
        if finished.level_up.is_some() {
            report.level_ups = report.level_ups.saturating_add(1);
        }
        tracing::info!(xp = finished.boosted_xp, "Book finished");
    }
    Ok(())
}

/// Water plants that are due or already drying out, when noticed.
fn water(
    engine: &Engine,
    rng: &mut SmallRng,
    report: &mut SimulationReport,
) -> Result<(), AppError> {
    let due: Vec<_> = engine
        .plants()
        .plants_needing_water()?
        .into_iter()
        .map(|p| p.id)
        .collect();

    for plant in engine.plants().plants()? {
        let dry = matches!(plant.status, PlantStatus::Thirsty | PlantStatus::Wilting);
        if !(dry || due.contains(&plant.id)) || !rng.random_bool(WATER_CHANCE) {
            continue;
        }
        engine.plants().water(plant.id)?;
        report.waterings = report.waterings.saturating_add(1);
    }
    Ok(())
}

/// Buy the cheapest affordable species and keep a living plant active.
fn shop(engine: &Engine, report: &mut SimulationReport) -> Result<(), AppError> {
    let progression = engine.progression().progression()?;
    let mut cheapest = None;

    for species in engine.plants().catalog_for_sale()? {
        if species.unlock_level > progression.level {
            continue;
        }
        let price = engine.plants().purchase_price(species.id)?;
        if price <= progression.coins && cheapest.as_ref().is_none_or(|(p, _)| price < *p) {
            cheapest = Some((price, species.id));
        }
    }

    if let Some((_, species_id)) = cheapest {
        let receipt = engine.plants().purchase(species_id)?;
        report.plants_bought = report.plants_bought.saturating_add(1);

        let active_alive = engine
            .plants()
            .active_plant()?
            .is_some_and(|p| p.status.is_alive());
        if !active_alive {
            engine.plants().set_active(receipt.plant.id)?;
        }
    }
    Ok(())
}

/// Count events waiting on `rx` without blocking.
fn drain(rx: &mut Receiver<ProgressionChanged>) -> u32 {
    let mut seen: u32 = 0;
    loop {
        match rx.try_recv() {
            Ok(_) => seen = seen.saturating_add(1),
            Err(TryRecvError::Lagged(skipped)) => {
                let skipped = u32::try_from(skipped).unwrap_or(u32::MAX);
                seen = seen.saturating_add(skipped);
            }
            Err(TryRecvError::Empty | TryRecvError::Closed) => return seen,
        }
    }
}
