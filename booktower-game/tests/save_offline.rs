//! Persistence round trips and offline reconciliation paths.

use booktower_game::{
    Catalog, CatalogLoader, FixedClock, GameEngine, GameState, SaveStore, StaffMember, floors,
    save,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::convert::Infallible;

const MS_PER_HOUR: i64 = 3_600_000;

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

fn stocked_tower(catalog: &Catalog, now_ms: i64) -> GameState {
    let mut gs = GameState::new_game(21, catalog, now_ms);
    let id = floors::build_floor(&mut gs, catalog, "board_books", now_ms).unwrap();
    floors::complete_due_construction(&mut gs, now_ms + 60_000);
    let mut member = StaffMember::new(gs.alloc_staff_id(), "shelver", "Jo", 3);
    member.assigned_floor = Some(id);
    let floor = gs.floor_mut(id).unwrap();
    floor.staff.push(member);
    floor.stock[0].current_stock = 10;
    gs
}

#[test]
fn round_trip_preserves_everything_but_notifications() {
    let catalog = Catalog::default_catalog();
    let store = MemoryStore::default();
    let mut gs = stocked_tower(&catalog, 0);
    gs.stats.bump("readers.served", 12);
    gs.logs.push(String::from("log.floor.ready"));
    gs.notifications.level_up = Some(4);

    save::save_game(&store, &mut gs, 99_000).unwrap();
    let loaded = save::load_game(&store, &catalog).unwrap();

    let mut expected = gs.clone();
    expected.notifications = Default::default();
    assert_eq!(loaded, expected);
    assert_eq!(loaded.timestamp_ms, 99_000);
    assert!(loaded.notifications.level_up.is_none(), "one-shot flags drop");
}

#[test]
fn offline_gap_is_capped_at_three_hours_by_default() {
    let catalog = Catalog::default_catalog();
    let mut gs = stocked_tower(&catalog, 0);
    gs.timestamp_ms = 0;

    let report = save::process_offline_progress(&mut gs, &catalog, 5 * MS_PER_HOUR).unwrap();
    assert!(report.capped);
    assert_eq!(report.elapsed_ms, 5 * MS_PER_HOUR);
    assert_eq!(report.credited_ms, 3 * MS_PER_HOUR);
    // Only the stocked, staffed category counts: rate 2.
    // floor(10800 / 30) * 2 * 0.5 = 360.
    assert_eq!(report.stars_earned, 360);
}

#[test]
fn offline_earnings_use_only_stocked_staffed_categories() {
    let catalog = Catalog::default_catalog();
    let mut gs = stocked_tower(&catalog, 0);
    // A second, unstaffed floor with stock must not contribute.
    let other = floors::build_floor(&mut gs, &catalog, "poetry", 0).unwrap();
    floors::complete_due_construction(&mut gs, 120_000);
    gs.floor_mut(other).unwrap().stock[0].current_stock = 50;
    gs.timestamp_ms = 0;

    let report = save::process_offline_progress(&mut gs, &catalog, MS_PER_HOUR).unwrap();
    assert!(!report.capped);
    // One eligible category at rate 2: floor(3600/30) * 2 * 0.5 = 120.
    assert_eq!(report.stars_earned, 120);
}

#[test]
fn load_session_reconciles_the_elapsed_gap() {
    let clock = FixedClock::at(10_000);
    let store = MemoryStore::default();
    {
        let engine = GameEngine::new(FixtureLoader, &store, &clock).unwrap();
        let catalog = Catalog::default_catalog();
        let mut session = booktower_game::TowerSession::new(stocked_tower(&catalog, 10_000));
        engine.persist(&mut session);
    }

    clock.advance(5 * MS_PER_HOUR);
    let engine = GameEngine::new(FixtureLoader, &store, &clock).unwrap();
    let mut session = engine.load_session(0);
    let report = session
        .state_mut()
        .notifications
        .take_offline_report()
        .expect("offline report surfaced");
    assert!(report.capped);
    assert_eq!(report.credited_ms, 3 * MS_PER_HOUR);
    assert!(session.state().readers.is_empty());
}

#[test]
fn short_gap_is_a_noop() {
    let catalog = Catalog::default_catalog();
    let mut gs = stocked_tower(&catalog, 0);
    gs.timestamp_ms = 1_000_000;
    let before = gs.clone();
    assert!(save::process_offline_progress(&mut gs, &catalog, 1_000_900).is_none());
    assert_eq!(gs, before);
}
