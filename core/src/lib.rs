#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Feed the Beasts engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative round, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the round executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems and
//! presentation layers to react to deterministically. Systems consume event
//! streams, query immutable snapshots, and respond exclusively with new
//! command batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Delay between completing one order and requesting the next.
pub const ORDER_DELAY: Duration = Duration::from_millis(1_500);

/// Lifespan of an uncollected bonus before it expires on its own.
pub const BONUS_LIFESPAN: Duration = Duration::from_secs(15);

/// Cadence at which the bonus spawner rolls its spawn chance.
pub const BONUS_CHECK_INTERVAL: Duration = Duration::from_secs(10);

/// Seconds added to the round timer when a time bonus is activated.
pub const TIME_BONUS_SECONDS: u32 = 30;

/// Difficulty settings selectable before a round starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    /// Long rounds with single-item orders and sparse happenings.
    Easy,
    /// Standard rounds with two-item orders.
    Normal,
    /// Short rounds with three-item orders and frequent happenings.
    Hard,
}

impl Difficulty {
    /// All selectable difficulties in ascending order of challenge.
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    /// Score multiplier applied to the base value of a completed order.
    #[must_use]
    pub const fn multiplier(self) -> f32 {
        match self {
            Self::Easy => 1.0,
            Self::Normal => 1.5,
            Self::Hard => 2.0,
        }
    }
}

/// Tuning bundle that shapes a round at one difficulty.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    duration_secs: u32,
    order_size: usize,
    happening_interval_secs: u64,
    bonus_spawn_rate: f32,
}

impl DifficultyProfile {
    /// Creates a new profile from explicit tuning values.
    #[must_use]
    pub const fn new(
        duration_secs: u32,
        order_size: usize,
        happening_interval_secs: u64,
        bonus_spawn_rate: f32,
    ) -> Self {
        Self {
            duration_secs,
            order_size,
            happening_interval_secs,
            bonus_spawn_rate,
        }
    }

    /// Round duration measured in whole seconds.
    #[must_use]
    pub const fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    /// Number of items a monster requests per order.
    #[must_use]
    pub const fn order_size(&self) -> usize {
        self.order_size
    }

    /// Seconds of elapsed round time between forced happening rolls.
    #[must_use]
    pub const fn happening_interval_secs(&self) -> u64 {
        self.happening_interval_secs
    }

    /// Probability that one bonus check tick spawns a bonus.
    #[must_use]
    pub const fn bonus_spawn_rate(&self) -> f32 {
        self.bonus_spawn_rate
    }
}

/// Per-difficulty profile table injected into the round and the systems.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfiles {
    easy: DifficultyProfile,
    normal: DifficultyProfile,
    hard: DifficultyProfile,
}

impl DifficultyProfiles {
    /// Creates a profile table from explicit per-difficulty profiles.
    #[must_use]
    pub const fn new(
        easy: DifficultyProfile,
        normal: DifficultyProfile,
        hard: DifficultyProfile,
    ) -> Self {
        Self { easy, normal, hard }
    }

    /// Retrieves the profile configured for the provided difficulty.
    #[must_use]
    pub const fn profile(&self, difficulty: Difficulty) -> &DifficultyProfile {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Normal => &self.normal,
            Difficulty::Hard => &self.hard,
        }
    }
}

impl Default for DifficultyProfiles {
    fn default() -> Self {
        Self {
            easy: DifficultyProfile::new(180, 1, 90, 0.3),
            normal: DifficultyProfile::new(120, 2, 60, 0.2),
            hard: DifficultyProfile::new(90, 3, 45, 0.1),
        }
    }
}

/// Unique identifier assigned to a collectible item.
///
/// Item identity is an exact string match against the catalog; there is no
/// fuzzy lookup anywhere in the engine.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(String);

impl ItemId {
    /// Creates a new item identifier from the provided string.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Retrieves the string representation of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Visual appearance applied to a catalog item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl ItemColor {
    /// Creates a new item color from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the color.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the color.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the color.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Static definition of a collectible item drawn from the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDef {
    id: ItemId,
    name: String,
    color: ItemColor,
}

impl ItemDef {
    /// Creates a new item definition.
    #[must_use]
    pub fn new(id: ItemId, name: impl Into<String>, color: ItemColor) -> Self {
        Self {
            id,
            name: name.into(),
            color,
        }
    }

    /// Identifier players submit when delivering the item.
    #[must_use]
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Display name shown in order bubbles.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Appearance applied to the item.
    #[must_use]
    pub const fn color(&self) -> ItemColor {
        self.color
    }
}

/// Errors raised while loading an item catalog from external data.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog payload was not valid JSON for a list of item definitions.
    #[error("catalog payload is not a valid item list: {0}")]
    Parse(#[from] serde_json::Error),
    /// The catalog parsed successfully but contains no items.
    #[error("catalog contains no items")]
    Empty,
}

/// Read-only catalog of every collectible item available to order draws.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    items: Vec<ItemDef>,
}

impl Catalog {
    /// Creates a catalog from the provided item definitions.
    #[must_use]
    pub fn new(items: Vec<ItemDef>) -> Self {
        Self { items }
    }

    /// Parses a catalog from a JSON array of item definitions.
    ///
    /// The payload must contain at least one item; callers fall back to
    /// [`Catalog::fallback`] when loading fails so a round can still proceed.
    pub fn from_json_str(payload: &str) -> Result<Self, CatalogError> {
        let items: Vec<ItemDef> = serde_json::from_str(payload)?;
        if items.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { items })
    }

    /// Built-in minimal catalog used when external data cannot be loaded.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            items: vec![
                ItemDef::new(
                    ItemId::new("obj1"),
                    "Rotten Apple",
                    ItemColor::from_rgb(0x8b, 0xc3, 0x4a),
                ),
                ItemDef::new(
                    ItemId::new("obj2"),
                    "Worn Sock",
                    ItemColor::from_rgb(0x9e, 0x9e, 0x9e),
                ),
                ItemDef::new(
                    ItemId::new("obj3"),
                    "Moldy Book",
                    ItemColor::from_rgb(0x79, 0x55, 0x48),
                ),
                ItemDef::new(
                    ItemId::new("obj4"),
                    "Melted Candle",
                    ItemColor::from_rgb(0xff, 0xeb, 0x3b),
                ),
                ItemDef::new(
                    ItemId::new("obj5"),
                    "Rusty Key",
                    ItemColor::from_rgb(0xff, 0x57, 0x22),
                ),
            ],
        }
    }

    /// Item definitions contained in the catalog.
    #[must_use]
    pub fn items(&self) -> &[ItemDef] {
        &self.items
    }

    /// Number of items available to order draws.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Reports whether the catalog contains no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Unique identifier assigned to a live bonus instance by the round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BonusId(u32);

impl BonusId {
    /// Creates a new bonus identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a triggered happening by the round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HappeningId(u32);

impl HappeningId {
    /// Creates a new happening identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Kinds of collectible bonuses the spawner can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BonusKind {
    /// Items belonging to the current order glow for the effect window.
    Highlight,
    /// Items belonging to the current order grow for the effect window.
    Enlarge,
    /// Items outside the current order vanish for the effect window.
    HideWrong,
    /// Adds a flat time credit to the round timer immediately.
    TimeBonus,
    /// Doubles order-completion earnings for the effect window.
    DoublePoints,
}

impl BonusKind {
    /// All bonus kinds eligible for a random spawn.
    pub const ALL: [BonusKind; 5] = [
        BonusKind::Highlight,
        BonusKind::Enlarge,
        BonusKind::HideWrong,
        BonusKind::TimeBonus,
        BonusKind::DoublePoints,
    ];

    /// Duration of the kind's effect window; zero means instantaneous.
    #[must_use]
    pub const fn effect_duration(self) -> Duration {
        match self {
            Self::Highlight | Self::Enlarge | Self::HideWrong => Duration::from_secs(15),
            Self::TimeBonus => Duration::ZERO,
            Self::DoublePoints => Duration::from_secs(20),
        }
    }

    /// Stable label used by presentation layers and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Highlight => "highlight",
            Self::Enlarge => "enlarge",
            Self::HideWrong => "hideWrong",
            Self::TimeBonus => "timeBonus",
            Self::DoublePoints => "doublePoints",
        }
    }
}

/// Kinds of transient world perturbations the scheduler can fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HappeningKind {
    /// The room lights go out for a few seconds.
    LightsOff,
    /// Every loose item instantly changes place.
    ObjectsShuffle,
    /// Vision drops to black and white.
    BlackAndWhite,
    /// Fog rolls into the room.
    Fog,
    /// The room shakes.
    Earthquake,
}

impl HappeningKind {
    /// All happening kinds eligible for a random trigger.
    pub const ALL: [HappeningKind; 5] = [
        HappeningKind::LightsOff,
        HappeningKind::ObjectsShuffle,
        HappeningKind::BlackAndWhite,
        HappeningKind::Fog,
        HappeningKind::Earthquake,
    ];

    /// Duration before the happening auto-reverts; zero means instantaneous.
    #[must_use]
    pub const fn duration(self) -> Duration {
        match self {
            Self::LightsOff => Duration::from_secs(5),
            Self::ObjectsShuffle => Duration::ZERO,
            Self::BlackAndWhite => Duration::from_secs(8),
            Self::Fog => Duration::from_secs(10),
            Self::Earthquake => Duration::from_secs(3),
        }
    }

    /// Stable label used by presentation layers and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::LightsOff => "lightsOff",
            Self::ObjectsShuffle => "objectsShuffle",
            Self::BlackAndWhite => "blackAndWhite",
            Self::Fog => "fog",
            Self::Earthquake => "earthquake",
        }
    }
}

/// World-space position where a spawned bonus appears.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f32,
    y: f32,
    z: f32,
}

impl Position {
    /// Creates a new position from explicit coordinates.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Horizontal coordinate across the room.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Height above the floor.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Depth coordinate into the room.
    #[must_use]
    pub const fn z(&self) -> f32 {
        self.z
    }
}

/// Commands that express all permissible round mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Selects the difficulty for the next round; ignored mid-round.
    SetDifficulty {
        /// Difficulty the round should adopt.
        difficulty: Difficulty,
    },
    /// Resets the round state and begins play at the current difficulty.
    StartRound,
    /// Advances the round clock by the provided delta time.
    Tick {
        /// Duration of logical time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Submits a delivered item for matching against the current order.
    CheckObject {
        /// Identifier of the delivered item.
        item: ItemId,
    },
    /// Installs a freshly drawn order; emitted by the ordering system.
    SetOrder {
        /// Item identifiers the monster requests, in draw order.
        items: Vec<ItemId>,
    },
    /// Requests that a happening of the provided kind begin.
    TriggerHappening {
        /// Kind of perturbation to start.
        kind: HappeningKind,
    },
    /// Requests that a bonus instance appear in the world.
    SpawnBonus {
        /// Kind of bonus to spawn.
        kind: BonusKind,
        /// Placement of the spawned bonus.
        position: Position,
    },
    /// Collects a live bonus instance by identifier.
    CollectBonus {
        /// Identifier of the bonus being collected.
        id: BonusId,
    },
    /// Applies a bonus effect directly by kind, bypassing instance lookup.
    ActivateBonus {
        /// Kind of bonus effect to apply.
        kind: BonusKind,
    },
    /// Suspends the round timer without cancelling pending work.
    Pause,
    /// Resumes a paused round.
    Resume,
}

/// Events broadcast by the round after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that a fresh round began.
    RoundStarted {
        /// Difficulty governing the round.
        difficulty: Difficulty,
    },
    /// Indicates that the round clock advanced while running and unpaused.
    TimeAdvanced {
        /// Duration of logical time that elapsed in the tick.
        dt: Duration,
    },
    /// Asks the ordering system to draw a new order.
    OrderRequested,
    /// Confirms that a new order was installed.
    OrderIssued {
        /// Number of items in the installed order.
        size: usize,
        /// Difficulty governing the round.
        difficulty: Difficulty,
    },
    /// Reports that a delivered item matched the current order.
    ItemCorrect {
        /// Identifier of the matched item.
        item: ItemId,
    },
    /// Reports that a delivered item did not match the current order.
    ItemWrong {
        /// Identifier of the rejected item.
        item: ItemId,
    },
    /// Announces that the current order was fully collected.
    OrderComplete {
        /// Score earned by completing the order.
        earned: u32,
        /// Total score after the completion.
        total_score: u32,
        /// Number of monsters served so far this round.
        monsters_served: u32,
    },
    /// Announces that the round ended.
    RoundEnded {
        /// Final score for the round.
        score: u32,
        /// Total monsters served during the round.
        monsters_served: u32,
        /// Difficulty the round was played at.
        difficulty: Difficulty,
    },
    /// Announces that the round timer was suspended.
    RoundPaused,
    /// Announces that a paused round resumed.
    RoundResumed,
    /// Signals the happening scheduler that an interval boundary passed.
    HappeningCue,
    /// Announces that a happening began.
    HappeningStarted {
        /// Identifier assigned to the happening.
        id: HappeningId,
        /// Kind of perturbation that started.
        kind: HappeningKind,
        /// Duration before the happening auto-reverts; zero is instantaneous.
        duration: Duration,
    },
    /// Announces that a timed happening ended or was force-cleared.
    HappeningEnded {
        /// Identifier of the happening that ended.
        id: HappeningId,
        /// Kind of perturbation that ended.
        kind: HappeningKind,
    },
    /// Announces that a bonus instance appeared in the world.
    BonusSpawned {
        /// Identifier assigned to the instance.
        id: BonusId,
        /// Kind of the spawned bonus.
        kind: BonusKind,
        /// Placement of the spawned bonus.
        position: Position,
    },
    /// Announces that an uncollected bonus instance timed out.
    BonusExpired {
        /// Identifier of the expired instance.
        id: BonusId,
    },
    /// Announces that a bonus effect was applied.
    BonusActivated {
        /// Kind of effect that was applied.
        kind: BonusKind,
        /// Effect window listeners should mirror; zero is instantaneous.
        duration: Duration,
    },
}

#[cfg(test)]
mod tests {
    use super::{
        BonusId, BonusKind, Catalog, CatalogError, Difficulty, DifficultyProfile,
        DifficultyProfiles, HappeningId, HappeningKind, ItemColor, ItemDef, ItemId,
    };
    use serde::{de::DeserializeOwned, Serialize};
    use std::time::Duration;

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn difficulty_multipliers_match_scoring_table() {
        let expected = [1.0, 1.5, 2.0];
        for (difficulty, multiplier) in Difficulty::ALL.into_iter().zip(expected) {
            assert!((difficulty.multiplier() - multiplier).abs() < f32::EPSILON);
        }
    }

    #[test]
    fn default_profiles_match_canonical_table() {
        let profiles = DifficultyProfiles::default();

        let easy = profiles.profile(Difficulty::Easy);
        assert_eq!(easy.duration_secs(), 180);
        assert_eq!(easy.order_size(), 1);
        assert_eq!(easy.happening_interval_secs(), 90);
        assert!((easy.bonus_spawn_rate() - 0.3).abs() < f32::EPSILON);

        let normal = profiles.profile(Difficulty::Normal);
        assert_eq!(normal.duration_secs(), 120);
        assert_eq!(normal.order_size(), 2);
        assert_eq!(normal.happening_interval_secs(), 60);

        let hard = profiles.profile(Difficulty::Hard);
        assert_eq!(hard.duration_secs(), 90);
        assert_eq!(hard.order_size(), 3);
        assert_eq!(hard.happening_interval_secs(), 45);
        assert!((hard.bonus_spawn_rate() - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn bonus_effect_durations_match_catalog() {
        assert_eq!(
            BonusKind::Highlight.effect_duration(),
            Duration::from_secs(15)
        );
        assert_eq!(
            BonusKind::Enlarge.effect_duration(),
            Duration::from_secs(15)
        );
        assert_eq!(
            BonusKind::HideWrong.effect_duration(),
            Duration::from_secs(15)
        );
        assert_eq!(BonusKind::TimeBonus.effect_duration(), Duration::ZERO);
        assert_eq!(
            BonusKind::DoublePoints.effect_duration(),
            Duration::from_secs(20)
        );
    }

    #[test]
    fn happening_durations_match_catalog() {
        assert_eq!(HappeningKind::LightsOff.duration(), Duration::from_secs(5));
        assert_eq!(HappeningKind::ObjectsShuffle.duration(), Duration::ZERO);
        assert_eq!(
            HappeningKind::BlackAndWhite.duration(),
            Duration::from_secs(8)
        );
        assert_eq!(HappeningKind::Fog.duration(), Duration::from_secs(10));
        assert_eq!(HappeningKind::Earthquake.duration(), Duration::from_secs(3));
    }

    #[test]
    fn fallback_catalog_provides_five_items() {
        let catalog = Catalog::fallback();
        assert_eq!(catalog.len(), 5);
        assert!(!catalog.is_empty());
        assert_eq!(catalog.items()[0].id().as_str(), "obj1");
    }

    #[test]
    fn catalog_parses_from_json_item_list() {
        let payload = r#"[
            {"id": "obj1", "name": "Rotten Apple", "color": {"red": 10, "green": 20, "blue": 30}}
        ]"#;
        let catalog = Catalog::from_json_str(payload).expect("parse catalog");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.items()[0].name(), "Rotten Apple");
        assert_eq!(catalog.items()[0].color(), ItemColor::from_rgb(10, 20, 30));
    }

    #[test]
    fn catalog_rejects_empty_item_list() {
        let error = Catalog::from_json_str("[]").expect_err("empty catalog must fail");
        assert!(matches!(error, CatalogError::Empty));
    }

    #[test]
    fn catalog_rejects_malformed_payload() {
        let error = Catalog::from_json_str("not json").expect_err("malformed catalog must fail");
        assert!(matches!(error, CatalogError::Parse(_)));
    }

    #[test]
    fn item_def_round_trips_through_bincode() {
        let item = ItemDef::new(
            ItemId::new("obj7"),
            "Cracked Mirror",
            ItemColor::from_rgb(1, 2, 3),
        );
        assert_round_trip(&item);
    }

    #[test]
    fn profile_table_round_trips_through_bincode() {
        assert_round_trip(&DifficultyProfiles::default());
    }

    #[test]
    fn identifiers_round_trip_through_bincode() {
        assert_round_trip(&BonusId::new(42));
        assert_round_trip(&HappeningId::new(7));
        assert_round_trip(&ItemId::new("obj3"));
    }
}
