#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives a headless Feed the Beasts round.
//!
//! Stands in for the presentation layer: it pumps the event bus between the
//! authoritative round and the pure systems, logs the broadcast traffic, and
//! plays a scripted deliverer that serves each issued order so a full round
//! exercises every gameplay path.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use feed_the_beasts_core::{Catalog, Command, Difficulty, DifficultyProfiles, Event};
use feed_the_beasts_round::{apply, query, Round};
use feed_the_beasts_system_bonus::BonusSpawning;
use feed_the_beasts_system_happenings::Happenings;
use feed_the_beasts_system_ordering::Ordering;

/// Difficulty selection exposed on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    /// Long round, single-item orders.
    Easy,
    /// Standard round, two-item orders.
    Normal,
    /// Short round, three-item orders.
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(value: DifficultyArg) -> Self {
        match value {
            DifficultyArg::Easy => Difficulty::Easy,
            DifficultyArg::Normal => Difficulty::Normal,
            DifficultyArg::Hard => Difficulty::Hard,
        }
    }
}

/// Runs one headless Feed the Beasts round and reports the final score.
#[derive(Debug, Parser)]
#[command(name = "feed-the-beasts")]
struct Args {
    /// Difficulty governing the round.
    #[arg(long, value_enum, default_value = "normal")]
    difficulty: DifficultyArg,

    /// Seed shared by the deterministic random systems.
    #[arg(long, default_value_t = 0xfeed_beef)]
    seed: u64,

    /// Path to a JSON item catalog; falls back to the built-in one on error.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Deliver one correct item every N ticks; 0 lets the round time out.
    #[arg(long, default_value_t = 2)]
    serve_every: u64,
}

fn load_catalog(path: Option<&Path>) -> Catalog {
    let Some(path) = path else {
        return Catalog::fallback();
    };

    let loaded = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))
        .and_then(|payload| Catalog::from_json_str(&payload).context("parsing catalog"));

    match loaded {
        Ok(catalog) => catalog,
        Err(error) => {
            log::warn!("catalog load failed ({error:#}); using the built-in fallback");
            Catalog::fallback()
        }
    }
}

/// Presentation stand-in that routes bus traffic between round and systems.
struct Driver {
    round: Round,
    ordering: Ordering,
    happenings: Happenings,
    bonuses: BonusSpawning,
}

impl Driver {
    fn new(args: &Args, catalog: Catalog) -> Self {
        let profiles = DifficultyProfiles::default();
        Self {
            round: Round::new(args.difficulty.into(), profiles),
            ordering: Ordering::new(feed_the_beasts_system_ordering::Config::new(
                catalog,
                profiles,
                args.seed,
            )),
            happenings: Happenings::new(feed_the_beasts_system_happenings::Config::new(
                args.seed.wrapping_add(1),
            )),
            bonuses: BonusSpawning::new(feed_the_beasts_system_bonus::Config::new(
                profiles,
                args.seed.wrapping_add(2),
            )),
        }
    }

    /// Broadcasts events until the bus quiesces; handlers run to completion
    /// before the next batch of commands is applied.
    fn pump(&mut self, seed_events: Vec<Event>) {
        let mut frontier = seed_events;
        while !frontier.is_empty() {
            for event in &frontier {
                log_event(event);
            }

            let mut commands = Vec::new();
            self.ordering.handle(&frontier, &mut commands);
            self.happenings.handle(&frontier, &mut commands);
            self.bonuses.handle(&frontier, &mut commands);

            let mut next = Vec::new();
            for command in commands {
                apply(&mut self.round, command, &mut next);
            }
            frontier = next;
        }
    }

    fn submit(&mut self, command: Command) {
        let mut events = Vec::new();
        apply(&mut self.round, command, &mut events);
        self.pump(events);
    }

    /// Scripted deliverer: serves the next outstanding order item and grabs
    /// any bonus floating in the room.
    fn play(&mut self) {
        let next_item = query::current_order(&self.round)
            .iter()
            .find(|item| !query::collected_items(&self.round).contains(item))
            .cloned();
        if let Some(item) = next_item {
            self.submit(Command::CheckObject { item });
        }

        let live = query::bonus_view(&self.round);
        if let Some(bonus) = live.first() {
            self.submit(Command::CollectBonus { id: bonus.id });
        }
    }
}

fn log_event(event: &Event) {
    match event {
        Event::TimeAdvanced { .. } => log::trace!("{event:?}"),
        Event::OrderRequested | Event::HappeningCue => log::debug!("{event:?}"),
        _ => log::info!("{event:?}"),
    }
}

/// Entry point for the Feed the Beasts command-line interface.
fn main() {
    env_logger::init();
    let args = Args::parse();

    let catalog = load_catalog(args.catalog.as_deref());
    log::info!(
        "starting a {:?} round with {} catalog items",
        Difficulty::from(args.difficulty),
        catalog.len()
    );

    let mut driver = Driver::new(&args, catalog);
    driver.submit(Command::StartRound);

    let mut tick_index: u64 = 0;
    while query::is_running(&driver.round) {
        tick_index += 1;
        driver.submit(Command::Tick {
            dt: Duration::from_secs(1),
        });

        if args.serve_every > 0
            && tick_index % args.serve_every == 0
            && query::is_running(&driver.round)
        {
            driver.play();
        }
    }

    println!(
        "final score: {} ({} monsters served on {:?})",
        query::score(&driver.round),
        query::monsters_served(&driver.round),
        query::difficulty(&driver.round)
    );
}
