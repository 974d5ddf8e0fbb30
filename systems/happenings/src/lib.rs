#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic happening scheduler.
//!
//! Answers each [`Event::HappeningCue`] with a uniformly random
//! [`Command::TriggerHappening`]. The round enforces the single-active
//! invariant; this system only decides which perturbation to ask for.

use feed_the_beasts_core::{Command, Event, HappeningKind};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the happening scheduler.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self { rng_seed }
    }
}

/// Pure system that picks a random happening for every interval cue.
#[derive(Debug)]
pub struct Happenings {
    rng: ChaCha8Rng,
}

impl Happenings {
    /// Creates a new scheduler using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Consumes round events and emits trigger commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            if matches!(event, Event::HappeningCue) {
                let index = self.rng.gen_range(0..HappeningKind::ALL.len());
                out.push(Command::TriggerHappening {
                    kind: HappeningKind::ALL[index],
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, Happenings};
    use feed_the_beasts_core::{Command, Event, HappeningKind};

    #[test]
    fn every_cue_yields_exactly_one_trigger() {
        let mut happenings = Happenings::new(Config::new(3));
        let mut commands = Vec::new();

        happenings.handle(&[Event::HappeningCue, Event::HappeningCue], &mut commands);

        assert_eq!(commands.len(), 2);
        for command in &commands {
            assert!(matches!(command, Command::TriggerHappening { .. }));
        }
    }

    #[test]
    fn triggers_are_deterministic_for_one_seed() {
        let run = |seed: u64| {
            let mut happenings = Happenings::new(Config::new(seed));
            let mut commands = Vec::new();
            let cues = vec![Event::HappeningCue; 8];
            happenings.handle(&cues, &mut commands);
            commands
        };

        assert_eq!(run(42), run(42));
    }

    #[test]
    fn unrelated_events_emit_nothing() {
        let mut happenings = Happenings::new(Config::new(3));
        let mut commands = Vec::new();

        happenings.handle(
            &[Event::HappeningStarted {
                id: feed_the_beasts_core::HappeningId::new(0),
                kind: HappeningKind::Fog,
                duration: HappeningKind::Fog.duration(),
            }],
            &mut commands,
        );

        assert!(commands.is_empty());
    }
}
