#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic bonus spawning system.
//!
//! Accumulates round time while a round is active and, once per
//! [`BONUS_CHECK_INTERVAL`], rolls a single uniform value against the
//! difficulty's spawn rate. A successful roll emits one
//! [`Command::SpawnBonus`] with a random kind and a random position inside
//! the room's spawn volume. Instance ownership, lifespans, and collection
//! live in the round; this system only decides when and what to spawn.

use std::time::Duration;

use feed_the_beasts_core::{
    BonusKind, Command, Difficulty, DifficultyProfiles, Event, Position, BONUS_CHECK_INTERVAL,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the bonus spawner.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    profiles: DifficultyProfiles,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration from the injected profiles and seed.
    #[must_use]
    pub const fn new(profiles: DifficultyProfiles, rng_seed: u64) -> Self {
        Self { profiles, rng_seed }
    }
}

/// Pure system that deterministically rolls bonus spawns while a round runs.
#[derive(Debug)]
pub struct BonusSpawning {
    profiles: DifficultyProfiles,
    rng: ChaCha8Rng,
    difficulty: Difficulty,
    accumulator: Duration,
    round_active: bool,
}

impl BonusSpawning {
    /// Creates a new spawner using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            profiles: config.profiles,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            difficulty: Difficulty::Normal,
            accumulator: Duration::ZERO,
            round_active: false,
        }
    }

    /// Consumes round events and emits spawn commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::RoundStarted { difficulty } => {
                    self.difficulty = *difficulty;
                    self.accumulator = Duration::ZERO;
                    self.round_active = true;
                }
                Event::RoundEnded { .. } => {
                    self.round_active = false;
                    self.accumulator = Duration::ZERO;
                }
                Event::TimeAdvanced { dt } => {
                    if self.round_active {
                        self.accumulator = self.accumulator.saturating_add(*dt);
                    }
                }
                _ => {}
            }
        }

        while self.round_active && self.accumulator >= BONUS_CHECK_INTERVAL {
            self.accumulator -= BONUS_CHECK_INTERVAL;
            self.roll_spawn(out);
        }
    }

    fn roll_spawn(&mut self, out: &mut Vec<Command>) {
        let rate = self.profiles.profile(self.difficulty).bonus_spawn_rate();
        if self.rng.gen::<f32>() >= rate {
            return;
        }

        let kind = BonusKind::ALL[self.rng.gen_range(0..BonusKind::ALL.len())];
        let position = self.random_position();
        out.push(Command::SpawnBonus { kind, position });
    }

    // Spawn volume: a band floating above the room floor, clear of walls.
    fn random_position(&mut self) -> Position {
        Position::new(
            self.rng.gen_range(-3.0..3.0),
            self.rng.gen_range(1.5..3.0),
            self.rng.gen_range(-6.0..-2.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{BonusSpawning, Config};
    use feed_the_beasts_core::{
        Command, Difficulty, DifficultyProfile, DifficultyProfiles, Event,
    };
    use std::time::Duration;

    fn advance(system: &mut BonusSpawning, seconds: u64, out: &mut Vec<Command>) {
        for _ in 0..seconds {
            system.handle(
                &[Event::TimeAdvanced {
                    dt: Duration::from_secs(1),
                }],
                out,
            );
        }
    }

    fn certain_profiles() -> DifficultyProfiles {
        // Spawn rate of 1.0 makes every check tick spawn, removing luck
        // from the assertions below.
        DifficultyProfiles::new(
            DifficultyProfile::new(180, 1, 90, 1.0),
            DifficultyProfile::new(120, 2, 60, 1.0),
            DifficultyProfile::new(90, 3, 45, 1.0),
        )
    }

    #[test]
    fn no_spawns_before_a_round_starts() {
        let mut system = BonusSpawning::new(Config::new(certain_profiles(), 1));
        let mut commands = Vec::new();

        advance(&mut system, 60, &mut commands);
        assert!(commands.is_empty());
    }

    #[test]
    fn one_roll_per_check_interval_while_running() {
        let mut system = BonusSpawning::new(Config::new(certain_profiles(), 1));
        let mut commands = Vec::new();

        system.handle(
            &[Event::RoundStarted {
                difficulty: Difficulty::Normal,
            }],
            &mut commands,
        );
        advance(&mut system, 9, &mut commands);
        assert!(commands.is_empty(), "the first window has not closed yet");

        advance(&mut system, 1, &mut commands);
        assert_eq!(commands.len(), 1);
        assert!(matches!(commands[0], Command::SpawnBonus { .. }));

        advance(&mut system, 30, &mut commands);
        assert_eq!(commands.len(), 4, "three more windows closed");
    }

    #[test]
    fn zero_rate_never_spawns() {
        let silent = DifficultyProfiles::new(
            DifficultyProfile::new(180, 1, 90, 0.0),
            DifficultyProfile::new(120, 2, 60, 0.0),
            DifficultyProfile::new(90, 3, 45, 0.0),
        );
        let mut system = BonusSpawning::new(Config::new(silent, 1));
        let mut commands = Vec::new();

        system.handle(
            &[Event::RoundStarted {
                difficulty: Difficulty::Easy,
            }],
            &mut commands,
        );
        advance(&mut system, 120, &mut commands);
        assert!(commands.is_empty());
    }

    #[test]
    fn round_end_stops_the_accumulator() {
        let mut system = BonusSpawning::new(Config::new(certain_profiles(), 1));
        let mut commands = Vec::new();

        system.handle(
            &[Event::RoundStarted {
                difficulty: Difficulty::Normal,
            }],
            &mut commands,
        );
        advance(&mut system, 5, &mut commands);
        system.handle(
            &[Event::RoundEnded {
                score: 0,
                monsters_served: 0,
                difficulty: Difficulty::Normal,
            }],
            &mut commands,
        );
        advance(&mut system, 60, &mut commands);
        assert!(commands.is_empty());
    }

    #[test]
    fn spawn_positions_stay_inside_the_room_volume() {
        let mut system = BonusSpawning::new(Config::new(certain_profiles(), 9));
        let mut commands = Vec::new();

        system.handle(
            &[Event::RoundStarted {
                difficulty: Difficulty::Hard,
            }],
            &mut commands,
        );
        advance(&mut system, 100, &mut commands);

        assert!(!commands.is_empty());
        for command in &commands {
            let Command::SpawnBonus { position, .. } = command else {
                panic!("only spawn commands are emitted");
            };
            assert!((-3.0..3.0).contains(&position.x()));
            assert!((1.5..3.0).contains(&position.y()));
            assert!((-6.0..-2.0).contains(&position.z()));
        }
    }

    #[test]
    fn rolls_are_deterministic_for_one_seed() {
        let run = |seed: u64| {
            let mut system = BonusSpawning::new(Config::new(DifficultyProfiles::default(), seed));
            let mut commands = Vec::new();
            system.handle(
                &[Event::RoundStarted {
                    difficulty: Difficulty::Easy,
                }],
                &mut commands,
            );
            advance(&mut system, 180, &mut commands);
            commands
        };

        assert_eq!(run(17), run(17));
    }
}
