#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative round state management for Feed the Beasts.
//!
//! The [`Round`] owns every mutable gameplay fact: timer, score, the current
//! order and its collection progress, the single active happening, and live
//! bonus instances. All mutation flows through [`apply`], which broadcasts
//! [`Event`] values describing what changed. Deferred work (the inter-order
//! delay, bonus lifespans, timed effect reversals) is modelled as cancellable
//! tasks keyed by the entity they affect; every task re-checks liveness at
//! the moment it fires, so a timer outliving its entity is a silent no-op.

use std::time::Duration;

use feed_the_beasts_core::{
    BonusId, BonusKind, Command, Difficulty, DifficultyProfiles, Event, HappeningId,
    HappeningKind, ItemId, Position, BONUS_LIFESPAN, ORDER_DELAY, TIME_BONUS_SECONDS,
};

const SECOND: Duration = Duration::from_secs(1);

/// Represents the authoritative state of one play session.
#[derive(Debug)]
pub struct Round {
    difficulty: Difficulty,
    profiles: DifficultyProfiles,
    is_running: bool,
    is_paused: bool,
    score: u32,
    time_remaining: u32,
    monsters_served: u32,
    current_order: Vec<ItemId>,
    collected: Vec<ItemId>,
    double_points: bool,
    clock: Duration,
    second_accumulator: Duration,
    elapsed_secs: u64,
    active_happening: Option<ActiveHappening>,
    bonuses: Vec<BonusInstance>,
    tasks: TaskQueue,
    next_bonus_id: u32,
    next_happening_id: u32,
}

impl Round {
    /// Creates a new idle round at the provided difficulty.
    #[must_use]
    pub fn new(difficulty: Difficulty, profiles: DifficultyProfiles) -> Self {
        let time_remaining = profiles.profile(difficulty).duration_secs();
        Self {
            difficulty,
            profiles,
            is_running: false,
            is_paused: false,
            score: 0,
            time_remaining,
            monsters_served: 0,
            current_order: Vec::new(),
            collected: Vec::new(),
            double_points: false,
            clock: Duration::ZERO,
            second_accumulator: Duration::ZERO,
            elapsed_secs: 0,
            active_happening: None,
            bonuses: Vec::new(),
            tasks: TaskQueue::new(),
            next_bonus_id: 0,
            next_happening_id: 0,
        }
    }

    fn start(&mut self, out_events: &mut Vec<Event>) {
        self.score = 0;
        self.time_remaining = self.profiles.profile(self.difficulty).duration_secs();
        self.monsters_served = 0;
        self.current_order.clear();
        self.collected.clear();
        self.double_points = false;
        self.clock = Duration::ZERO;
        self.second_accumulator = Duration::ZERO;
        self.elapsed_secs = 0;
        self.active_happening = None;
        self.bonuses.clear();
        self.tasks.clear();
        self.is_paused = false;
        self.is_running = true;

        out_events.push(Event::RoundStarted {
            difficulty: self.difficulty,
        });
        out_events.push(Event::OrderRequested);
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        if !self.is_running || self.is_paused {
            return;
        }

        self.clock = self.clock.saturating_add(dt);
        self.second_accumulator = self.second_accumulator.saturating_add(dt);
        out_events.push(Event::TimeAdvanced { dt });

        while self.second_accumulator >= SECOND {
            self.second_accumulator -= SECOND;
            self.elapsed_secs = self.elapsed_secs.saturating_add(1);
            self.time_remaining = self.time_remaining.saturating_sub(1);

            // End-of-round takes precedence over the happening cue on the
            // same second boundary.
            if self.time_remaining == 0 {
                self.finish(out_events);
                return;
            }

            let interval = self.profiles.profile(self.difficulty).happening_interval_secs();
            if interval > 0 && self.elapsed_secs % interval == 0 {
                out_events.push(Event::HappeningCue);
            }
        }

        for task in self.tasks.drain_due(self.clock) {
            self.fire_task(task, out_events);
        }
    }

    fn fire_task(&mut self, task: Task, out_events: &mut Vec<Event>) {
        match task.kind {
            TaskKind::IssueOrder => {
                if self.is_running {
                    out_events.push(Event::OrderRequested);
                }
            }
            TaskKind::EndHappening(id) => {
                let still_active = self
                    .active_happening
                    .as_ref()
                    .is_some_and(|active| active.id == id);
                if still_active {
                    self.clear_active_happening(out_events);
                }
            }
            TaskKind::ExpireBonus(id) => {
                if let Some(index) = self.bonuses.iter().position(|bonus| bonus.id == id) {
                    let expired = self.bonuses.remove(index);
                    out_events.push(Event::BonusExpired { id: expired.id });
                }
            }
            TaskKind::ClearDoublePoints => {
                self.double_points = false;
            }
        }
    }

    fn check_object(&mut self, item: ItemId, out_events: &mut Vec<Event>) {
        if !self.is_running {
            return;
        }

        let in_order = self.current_order.contains(&item);
        let already_collected = self.collected.contains(&item);

        if in_order && !already_collected {
            self.collected.push(item.clone());
            out_events.push(Event::ItemCorrect { item });
            if self.collected.len() == self.current_order.len() {
                self.complete_order(out_events);
            }
        } else {
            // Resubmitting an already-collected item counts as wrong; there
            // is no dedup-then-accept path.
            out_events.push(Event::ItemWrong { item });
        }
    }

    fn complete_order(&mut self, out_events: &mut Vec<Event>) {
        self.monsters_served = self.monsters_served.saturating_add(1);

        let base = 100 * self.current_order.len() as u32;
        let multiplied =
            (f64::from(base) * f64::from(self.difficulty.multiplier())).floor() as u32;
        let speed_bonus = self.time_remaining / 10;
        let mut earned = multiplied.saturating_add(speed_bonus);
        if self.double_points {
            earned = earned.saturating_mul(2);
        }
        self.score = self.score.saturating_add(earned);

        out_events.push(Event::OrderComplete {
            earned,
            total_score: self.score,
            monsters_served: self.monsters_served,
        });

        self.tasks
            .schedule(self.clock.saturating_add(ORDER_DELAY), TaskKind::IssueOrder);
    }

    fn set_order(&mut self, items: Vec<ItemId>, out_events: &mut Vec<Event>) {
        if !self.is_running || items.is_empty() {
            return;
        }

        self.current_order.clear();
        for item in items {
            if !self.current_order.contains(&item) {
                self.current_order.push(item);
            }
        }
        self.collected.clear();

        out_events.push(Event::OrderIssued {
            size: self.current_order.len(),
            difficulty: self.difficulty,
        });
    }

    fn trigger_happening(&mut self, kind: HappeningKind, out_events: &mut Vec<Event>) {
        if !self.is_running || self.active_happening.is_some() {
            return;
        }

        let id = HappeningId::new(self.next_happening_id);
        self.next_happening_id = self.next_happening_id.wrapping_add(1);
        let duration = kind.duration();

        out_events.push(Event::HappeningStarted { id, kind, duration });

        // Instantaneous happenings never occupy the active slot and emit no
        // end event; the started signal is the whole effect.
        if duration > Duration::ZERO {
            self.active_happening = Some(ActiveHappening { id, kind });
            self.tasks.schedule(
                self.clock.saturating_add(duration),
                TaskKind::EndHappening(id),
            );
        }
    }

    fn clear_active_happening(&mut self, out_events: &mut Vec<Event>) {
        if let Some(active) = self.active_happening.take() {
            self.tasks.cancel(TaskKind::EndHappening(active.id));
            out_events.push(Event::HappeningEnded {
                id: active.id,
                kind: active.kind,
            });
        }
    }

    fn spawn_bonus(&mut self, kind: BonusKind, position: Position, out_events: &mut Vec<Event>) {
        if !self.is_running {
            return;
        }

        let id = BonusId::new(self.next_bonus_id);
        self.next_bonus_id = self.next_bonus_id.wrapping_add(1);

        self.bonuses.push(BonusInstance {
            id,
            kind,
            position,
            spawned_at: self.clock,
        });
        self.tasks.schedule(
            self.clock.saturating_add(BONUS_LIFESPAN),
            TaskKind::ExpireBonus(id),
        );

        out_events.push(Event::BonusSpawned { id, kind, position });
    }

    fn collect_bonus(&mut self, id: BonusId, out_events: &mut Vec<Event>) {
        if !self.is_running {
            return;
        }

        // Collecting an expired or already-collected instance is a no-op.
        let Some(index) = self.bonuses.iter().position(|bonus| bonus.id == id) else {
            return;
        };

        let collected = self.bonuses.remove(index);
        self.tasks.cancel(TaskKind::ExpireBonus(collected.id));
        self.activate_bonus(collected.kind, out_events);
    }

    fn activate_bonus(&mut self, kind: BonusKind, out_events: &mut Vec<Event>) {
        if !self.is_running {
            return;
        }

        match kind {
            BonusKind::TimeBonus => {
                self.time_remaining = self.time_remaining.saturating_add(TIME_BONUS_SECONDS);
            }
            BonusKind::DoublePoints => {
                self.double_points = true;
                // Re-activation extends the window instead of letting the
                // older reversal clear the fresh one early.
                self.tasks.cancel(TaskKind::ClearDoublePoints);
                self.tasks.schedule(
                    self.clock.saturating_add(kind.effect_duration()),
                    TaskKind::ClearDoublePoints,
                );
            }
            BonusKind::Highlight | BonusKind::Enlarge | BonusKind::HideWrong => {
                // Presentation-delegated effects carry no round state beyond
                // the activation broadcast.
            }
        }

        out_events.push(Event::BonusActivated {
            kind,
            duration: kind.effect_duration(),
        });
    }

    fn finish(&mut self, out_events: &mut Vec<Event>) {
        self.is_running = false;
        self.clear_active_happening(out_events);
        self.bonuses.clear();
        self.tasks.clear();

        out_events.push(Event::RoundEnded {
            score: self.score,
            monsters_served: self.monsters_served,
            difficulty: self.difficulty,
        });
    }
}

impl Default for Round {
    fn default() -> Self {
        Self::new(Difficulty::Normal, DifficultyProfiles::default())
    }
}

/// Applies the provided command to the round, mutating state deterministically.
///
/// Every entry point is a total function over the round state: commands with
/// unmet preconditions (acting on an idle round, stale identifiers, repeated
/// pause requests) are silent no-ops rather than errors.
pub fn apply(round: &mut Round, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SetDifficulty { difficulty } => {
            if round.is_running {
                return;
            }
            round.difficulty = difficulty;
            round.time_remaining = round.profiles.profile(difficulty).duration_secs();
        }
        Command::StartRound => round.start(out_events),
        Command::Tick { dt } => round.advance(dt, out_events),
        Command::CheckObject { item } => round.check_object(item, out_events),
        Command::SetOrder { items } => round.set_order(items, out_events),
        Command::TriggerHappening { kind } => round.trigger_happening(kind, out_events),
        Command::SpawnBonus { kind, position } => round.spawn_bonus(kind, position, out_events),
        Command::CollectBonus { id } => round.collect_bonus(id, out_events),
        Command::ActivateBonus { kind } => round.activate_bonus(kind, out_events),
        Command::Pause => {
            if round.is_running && !round.is_paused {
                round.is_paused = true;
                out_events.push(Event::RoundPaused);
            }
        }
        Command::Resume => {
            if round.is_running && round.is_paused {
                round.is_paused = false;
                out_events.push(Event::RoundResumed);
            }
        }
    }
}

/// Query functions that provide read-only access to the round state.
pub mod query {
    use std::time::Duration;

    use super::Round;
    use feed_the_beasts_core::{BonusId, BonusKind, Difficulty, HappeningId, HappeningKind, ItemId, Position};

    /// Reports whether a round is currently in progress.
    #[must_use]
    pub fn is_running(round: &Round) -> bool {
        round.is_running
    }

    /// Reports whether the running round is paused.
    #[must_use]
    pub fn is_paused(round: &Round) -> bool {
        round.is_paused
    }

    /// Difficulty governing the current or next round.
    #[must_use]
    pub fn difficulty(round: &Round) -> Difficulty {
        round.difficulty
    }

    /// Current score.
    #[must_use]
    pub fn score(round: &Round) -> u32 {
        round.score
    }

    /// Whole seconds left on the round timer.
    #[must_use]
    pub fn time_remaining(round: &Round) -> u32 {
        round.time_remaining
    }

    /// Number of monsters served this round.
    #[must_use]
    pub fn monsters_served(round: &Round) -> u32 {
        round.monsters_served
    }

    /// Items the current monster requests, in draw order.
    #[must_use]
    pub fn current_order(round: &Round) -> &[ItemId] {
        &round.current_order
    }

    /// Items collected toward the current order so far.
    #[must_use]
    pub fn collected_items(round: &Round) -> &[ItemId] {
        &round.collected
    }

    /// Reports whether the double-points scoring window is active.
    #[must_use]
    pub fn double_points_active(round: &Round) -> bool {
        round.double_points
    }

    /// Snapshot of the active happening, if one is in progress.
    #[must_use]
    pub fn active_happening(round: &Round) -> Option<HappeningSnapshot> {
        round.active_happening.as_ref().map(|active| HappeningSnapshot {
            id: active.id,
            kind: active.kind,
        })
    }

    /// Captures a read-only view of the live bonus instances.
    #[must_use]
    pub fn bonus_view(round: &Round) -> Vec<BonusSnapshot> {
        let mut snapshots: Vec<BonusSnapshot> = round
            .bonuses
            .iter()
            .map(|bonus| BonusSnapshot {
                id: bonus.id,
                kind: bonus.kind,
                position: bonus.position,
                spawned_at: bonus.spawned_at,
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.id);
        snapshots
    }

    /// Immutable representation of the active happening.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct HappeningSnapshot {
        /// Identifier assigned when the happening started.
        pub id: HappeningId,
        /// Kind of perturbation in progress.
        pub kind: HappeningKind,
    }

    /// Immutable representation of a single live bonus instance.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct BonusSnapshot {
        /// Identifier assigned when the bonus spawned.
        pub id: BonusId,
        /// Kind of the bonus.
        pub kind: BonusKind,
        /// Placement of the bonus in the world.
        pub position: Position,
        /// Round-clock timestamp of the spawn.
        pub spawned_at: Duration,
    }
}

#[derive(Clone, Copy, Debug)]
struct ActiveHappening {
    id: HappeningId,
    kind: HappeningKind,
}

#[derive(Clone, Copy, Debug)]
struct BonusInstance {
    id: BonusId,
    kind: BonusKind,
    position: Position,
    spawned_at: Duration,
}

/// Deferred work owed by the round, keyed by the entity it affects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TaskKind {
    IssueOrder,
    EndHappening(HappeningId),
    ExpireBonus(BonusId),
    ClearDoublePoints,
}

#[derive(Clone, Copy, Debug)]
struct Task {
    due: Duration,
    kind: TaskKind,
}

#[derive(Debug)]
struct TaskQueue {
    tasks: Vec<Task>,
}

impl TaskQueue {
    fn new() -> Self {
        Self { tasks: Vec::new() }
    }

    fn schedule(&mut self, due: Duration, kind: TaskKind) {
        self.tasks.push(Task { due, kind });
    }

    fn cancel(&mut self, kind: TaskKind) {
        self.tasks.retain(|task| task.kind != kind);
    }

    fn drain_due(&mut self, now: Duration) -> Vec<Task> {
        let mut due: Vec<Task> = Vec::new();
        let mut index = 0;
        while index < self.tasks.len() {
            if self.tasks[index].due <= now {
                due.push(self.tasks.remove(index));
            } else {
                index += 1;
            }
        }
        due.sort_by_key(|task| task.due);
        due
    }

    fn clear(&mut self) {
        self.tasks.clear();
    }
}
