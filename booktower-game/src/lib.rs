//! Booktower Game Engine
//!
//! Platform-agnostic core game logic for the Booktower library idle game.
//! This crate provides all simulation mechanics without UI or
//! platform-specific dependencies: the tick orchestrator, the weighted
//! spawn engine, the staged reward pipeline, and capped offline
//! reconciliation.

pub mod achievements;
pub mod catalog;
pub mod clock;
pub mod constants;
pub mod economy;
pub mod error;
pub mod events;
pub mod floors;
pub mod incidents;
pub mod lobby;
pub mod missions;
pub mod numbers;
pub mod prestige;
pub mod rng;
pub mod save;
pub mod spawn;
pub mod staff;
pub mod state;
pub mod store;
pub mod tick;
pub mod weather;

use std::rc::Rc;

// Re-export commonly used types
pub use catalog::{
    AchievementDef, Catalog, CategoryDef, DonationSourceDef, FloorKind, FloorTypeDef, HallEventDef,
    HolidayDef, PerkDef, ReaderArchetypeDef, StaffRole, StaffTypeDef, StarEventDef, SynergyDef,
    TowerSettings, UpgradeDef, VipAbility, VipTypeDef,
};
pub use clock::{Clock, FixedClock, SystemClock};
pub use economy::{RewardBreakdown, RewardStage, resolve_reward};
pub use error::ActionError;
pub use events::{ActiveHallEvent, ActiveStarEvent, Effect, HallEventState, StarEventState};
pub use floors::{
    CategoryStock, Floor, FloorStatus, Restock, VipBoost, build_floor, delete_floor, empty_trash,
    rush_construction, start_restock, upgrade_floor,
};
pub use incidents::{Incident, IncidentKind};
pub use lobby::{Applicant, Lobby, VipGuest, dismiss_applicant};
pub use missions::{
    ActiveFindMission, ActiveMiniQuest, ActiveMission, FindMissionState, MiniQuestState,
    MissionState,
};
pub use prestige::prestige;
pub use rng::RngBundle;
pub use save::{OfflineReport, SAVE_KEY, SaveStore, process_offline_progress};
pub use spawn::{ElevatorState, Reader, admit_vip, cancel_elevator_ride, spawn_reader};
pub use staff::{StaffMember, fire_staff, hire_staff, reassign_staff};
pub use state::{
    AchievementProgress, FloorId, GameState, LobbyEntryId, Notifications, ReaderId, StaffId, Stats,
};
pub use store::{buy_decoration, buy_perk, buy_theme, buy_upgrade, set_holiday};
pub use tick::TickOutcome;
pub use weather::{Season, Weather, WeatherConfig, WeatherState};

/// Trait for abstracting catalog loading operations.
/// Platform-specific implementations should provide this.
pub trait CatalogLoader {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the content catalog from the platform-specific source.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded.
    fn load_catalog(&self) -> Result<Catalog, Self::Error>;
}

/// A running game: mutable state bound to its seeded RNG streams.
#[derive(Debug)]
pub struct TowerSession {
    state: GameState,
    rngs: Rc<RngBundle>,
}

impl TowerSession {
    /// Bind a state to RNG streams derived from its seed.
    #[must_use]
    pub fn new(state: GameState) -> Self {
        let rngs = Rc::new(RngBundle::from_user_seed(state.seed));
        Self { state, rngs }
    }

    /// Borrow the underlying immutable game state.
    #[must_use]
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// Borrow the underlying mutable game state.
    pub const fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    /// Apply a closure to the mutable game state.
    pub fn with_state_mut<R>(&mut self, f: impl FnOnce(&mut GameState) -> R) -> R {
        f(&mut self.state)
    }

    /// The session's RNG streams.
    #[must_use]
    pub fn rngs(&self) -> Rc<RngBundle> {
        Rc::clone(&self.rngs)
    }

    /// Advance the simulation to `now_ms`.
    pub fn tick(&mut self, catalog: &Catalog, now_ms: i64) -> TickOutcome {
        tick::tick(&mut self.state, catalog, &self.rngs, now_ms)
    }

    /// Consume the session, returning the underlying game state.
    #[must_use]
    pub fn into_state(self) -> GameState {
        self.state
    }
}

/// Main engine facade binding catalog, persistence, and clock.
pub struct GameEngine<L, S, C>
where
    L: CatalogLoader,
    S: SaveStore,
    C: Clock,
{
    loader: L,
    store: S,
    clock: C,
    catalog: Catalog,
}

impl<L, S, C> GameEngine<L, S, C>
where
    L: CatalogLoader,
    S: SaveStore,
    C: Clock,
{
    /// Create an engine, loading and validating the catalog once.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be loaded or fails validation.
    pub fn new(loader: L, store: S, clock: C) -> Result<Self, anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let catalog = loader.load_catalog().map_err(Into::into)?;
        catalog.validate().map_err(anyhow::Error::msg)?;
        Ok(Self {
            loader,
            store,
            clock,
            catalog,
        })
    }

    /// The validated content catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Reload the catalog from the platform source.
    ///
    /// # Errors
    ///
    /// Returns an error if loading or validation fails; the previous catalog
    /// stays in place on failure.
    pub fn reload_catalog(&mut self) -> Result<(), anyhow::Error>
    where
        L::Error: Into<anyhow::Error>,
    {
        let catalog = self.loader.load_catalog().map_err(Into::into)?;
        catalog.validate().map_err(anyhow::Error::msg)?;
        self.catalog = catalog;
        Ok(())
    }

    /// Start a fresh game session.
    #[must_use]
    pub fn new_session(&self, seed: u64) -> TowerSession {
        TowerSession::new(GameState::new_game(seed, &self.catalog, self.clock.now_ms()))
    }

    /// Load the saved game, reconciling the offline gap; falls back to a
    /// fresh game (with `fallback_seed`) when no usable save exists.
    pub fn load_session(&self, fallback_seed: u64) -> TowerSession {
        let mut session = match save::load_game(&self.store, &self.catalog) {
            Some(mut gs) => {
                save::process_offline_progress(&mut gs, &self.catalog, self.clock.now_ms());
                TowerSession::new(gs)
            }
            None => self.new_session(fallback_seed),
        };
        self.persist(&mut session);
        session
    }

    /// Advance the session to the current wall clock and write a snapshot.
    pub fn run_tick(&self, session: &mut TowerSession) -> TickOutcome {
        let now_ms = self.clock.now_ms();
        let outcome = session.tick(&self.catalog, now_ms);
        self.persist(session);
        outcome
    }

    /// Run a player action against the session and write a snapshot,
    /// regardless of the action's result.
    pub fn apply<T>(
        &self,
        session: &mut TowerSession,
        action: impl FnOnce(&mut GameState, &Catalog, i64) -> T,
    ) -> T {
        let now_ms = self.clock.now_ms();
        let result = action(&mut session.state, &self.catalog, now_ms);
        self.persist(session);
        result
    }

    /// Write a snapshot; failures are logged and in-memory state stays
    /// authoritative until the next successful write.
    pub fn persist(&self, session: &mut TowerSession) {
        let now_ms = self.clock.now_ms();
        if let Err(error) = save::save_game(&self.store, &mut session.state, now_ms) {
            log::warn!("snapshot write failed: {error}");
        }
    }

    /// Delete the saved game.
    ///
    /// # Errors
    ///
    /// Returns the store's error when the removal fails.
    pub fn delete_save(&self) -> Result<(), S::Error> {
        self.store.remove(SAVE_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::convert::Infallible;

    #[derive(Clone, Copy, Default)]
    struct FixtureLoader;

    impl CatalogLoader for FixtureLoader {
        type Error = Infallible;

        fn load_catalog(&self) -> Result<Catalog, Self::Error> {
            Ok(Catalog::default_catalog())
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        entries: RefCell<HashMap<String, String>>,
    }

    impl SaveStore for MemoryStore {
        type Error = Infallible;

        fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
            self.entries
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
            Ok(self.entries.borrow().get(key).cloned())
        }

        fn remove(&self, key: &str) -> Result<(), Self::Error> {
            self.entries.borrow_mut().remove(key);
            Ok(())
        }
    }

    #[test]
    fn engine_creates_and_roundtrips_state() {
        let clock = FixedClock::at(1_000);
        let engine = GameEngine::new(FixtureLoader, MemoryStore::default(), clock).unwrap();
        let mut session = engine.new_session(0xABCD);
        session.with_state_mut(|state| {
            state.stars = 250;
            state.level = 3;
        });
        engine.persist(&mut session);

        let loaded = engine.load_session(0);
        assert_eq!(loaded.state().stars, 250);
        assert_eq!(loaded.state().level, 3);
        assert_eq!(loaded.state().seed, 0xABCD);
    }

    #[test]
    fn load_session_falls_back_to_fresh_game() {
        let clock = FixedClock::at(1_000);
        let engine = GameEngine::new(FixtureLoader, MemoryStore::default(), clock).unwrap();
        let session = engine.load_session(7);
        assert_eq!(session.state().seed, 7);
        assert_eq!(session.state().floors.len(), 1);
    }

    #[test]
    fn corrupt_save_yields_fresh_game() {
        let store = MemoryStore::default();
        store.set(SAVE_KEY, "garbage").unwrap();
        let engine = GameEngine::new(FixtureLoader, store, FixedClock::at(1_000)).unwrap();
        let session = engine.load_session(9);
        assert_eq!(session.state().seed, 9);
    }

    #[test]
    fn apply_persists_after_player_action() {
        let engine =
            GameEngine::new(FixtureLoader, MemoryStore::default(), FixedClock::at(1_000)).unwrap();
        let mut session = engine.new_session(1);
        let built = engine.apply(&mut session, |gs, catalog, now| {
            floors::build_floor(gs, catalog, "board_books", now)
        });
        assert!(built.is_ok());

        let reloaded = engine.load_session(0);
        assert_eq!(reloaded.state().floors.len(), 2);
        assert_eq!(reloaded.state().stars, session.state().stars);
    }

    #[test]
    fn run_tick_advances_with_the_clock() {
        let clock = FixedClock::at(1_000);
        let engine = GameEngine::new(FixtureLoader, MemoryStore::default(), clock).unwrap();
        let mut session = engine.new_session(1);
        engine
            .apply(&mut session, |gs, catalog, now| {
                floors::build_floor(gs, catalog, "board_books", now)
            })
            .unwrap();
        engine.clock.advance(31_000);
        engine.run_tick(&mut session);
        assert!(session.state().floors.iter().all(Floor::is_ready));
    }
}
