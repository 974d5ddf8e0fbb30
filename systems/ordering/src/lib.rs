#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic ordering system responsible for drawing monster orders.
//!
//! Each [`Event::OrderRequested`] cue answers with one [`Command::SetOrder`]
//! carrying a uniformly random, non-repeating sample from the item catalog.
//! A draw stays pending until the round confirms it with
//! [`Event::OrderIssued`]; cues arriving in between are dropped so two
//! in-flight draws can never race over the shared order state.

use feed_the_beasts_core::{Catalog, Command, Difficulty, DifficultyProfiles, Event, ItemId};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the ordering system.
#[derive(Clone, Debug)]
pub struct Config {
    catalog: Catalog,
    profiles: DifficultyProfiles,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration from the injected catalog and profiles.
    #[must_use]
    pub fn new(catalog: Catalog, profiles: DifficultyProfiles, rng_seed: u64) -> Self {
        Self {
            catalog,
            profiles,
            rng_seed,
        }
    }
}

/// Guard over the draw lifecycle; a pending draw rejects further cues.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DrawState {
    Idle,
    Pending,
}

/// Pure system that deterministically draws orders from the catalog.
#[derive(Debug)]
pub struct Ordering {
    catalog: Catalog,
    profiles: DifficultyProfiles,
    rng: ChaCha8Rng,
    difficulty: Difficulty,
    state: DrawState,
}

impl Ordering {
    /// Creates a new ordering system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            catalog: config.catalog,
            profiles: config.profiles,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            difficulty: Difficulty::Normal,
            state: DrawState::Idle,
        }
    }

    /// Consumes round events and emits draw commands.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::RoundStarted { difficulty } => {
                    self.difficulty = *difficulty;
                    self.state = DrawState::Idle;
                }
                Event::OrderRequested => self.draw_order(out),
                Event::OrderIssued { .. } | Event::RoundEnded { .. } => {
                    self.state = DrawState::Idle;
                }
                _ => {}
            }
        }
    }

    fn draw_order(&mut self, out: &mut Vec<Command>) {
        if self.state == DrawState::Pending {
            return;
        }

        let order_size = self.profiles.profile(self.difficulty).order_size();
        let size = order_size.min(self.catalog.len());
        if size == 0 {
            return;
        }

        let indices = rand::seq::index::sample(&mut self.rng, self.catalog.len(), size);
        let items: Vec<ItemId> = indices
            .iter()
            .map(|index| self.catalog.items()[index].id().clone())
            .collect();

        self.state = DrawState::Pending;
        out.push(Command::SetOrder { items });
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, DrawState, Ordering};
    use feed_the_beasts_core::{Catalog, Command, Difficulty, DifficultyProfiles, Event};

    fn system(seed: u64) -> Ordering {
        Ordering::new(Config::new(
            Catalog::fallback(),
            DifficultyProfiles::default(),
            seed,
        ))
    }

    #[test]
    fn draw_produces_unique_items_of_profile_size() {
        let mut ordering = system(7);
        let mut commands = Vec::new();

        ordering.handle(
            &[
                Event::RoundStarted {
                    difficulty: Difficulty::Hard,
                },
                Event::OrderRequested,
            ],
            &mut commands,
        );

        let [Command::SetOrder { items }] = commands.as_slice() else {
            panic!("expected exactly one draw");
        };
        assert_eq!(items.len(), 3, "hard orders request three items");
        for (index, item) in items.iter().enumerate() {
            assert!(
                !items[..index].contains(item),
                "draws never repeat an item within one order"
            );
        }
    }

    #[test]
    fn pending_draw_rejects_further_cues_until_confirmed() {
        let mut ordering = system(7);
        let mut commands = Vec::new();

        ordering.handle(
            &[
                Event::RoundStarted {
                    difficulty: Difficulty::Normal,
                },
                Event::OrderRequested,
                Event::OrderRequested,
            ],
            &mut commands,
        );
        assert_eq!(commands.len(), 1, "the second cue must be dropped");
        assert_eq!(ordering.state, DrawState::Pending);

        commands.clear();
        ordering.handle(
            &[
                Event::OrderIssued {
                    size: 2,
                    difficulty: Difficulty::Normal,
                },
                Event::OrderRequested,
            ],
            &mut commands,
        );
        assert_eq!(commands.len(), 1, "confirmation re-arms the guard");
    }
}
