//! Snapshot persistence and offline reconciliation.
//!
//! Saves are JSON documents under one fixed key in an external key-value
//! store. Loading is defensive: every field defaults independently and a
//! corrupt document is treated as "no save found". Offline replay is a
//! deliberately coarse, capped estimate, not a re-simulation.

use serde::{Deserialize, Serialize};

use crate::achievements::merge_achievements;
use crate::catalog::Catalog;
use crate::constants::{
    LOBBY_SHARED_CAP, LOG_OFFLINE_EARNINGS, MOOD_MAX, OFFLINE_BASE_CAP_HOURS,
    OFFLINE_EARN_FACTOR, OFFLINE_EARN_SLICE_SECS, OFFLINE_MIN_ELAPSED_MS, TRASH_MAX,
};
use crate::floors::{
    complete_due_construction, complete_due_restocks, effective_earning_rate, effective_max_stock,
};
use crate::numbers::{floor_f64_to_i64, i64_to_f64};
use crate::state::GameState;

/// Fixed storage key for the versioned snapshot.
pub const SAVE_KEY: &str = "booktower.save.v1";

const MS_PER_HOUR: i64 = 3_600_000;

/// Key-value persistence abstraction supplied by the platform layer.
pub trait SaveStore {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store a value under a key.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error>;

    /// Fetch a value by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, Self::Error>;

    /// Remove a value by key.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be removed.
    fn remove(&self, key: &str) -> Result<(), Self::Error>;
}

impl<T: SaveStore> SaveStore for &T {
    type Error = T::Error;

    fn set(&self, key: &str, value: &str) -> Result<(), Self::Error> {
        (**self).set(key, value)
    }

    fn get(&self, key: &str) -> Result<Option<String>, Self::Error> {
        (**self).get(key)
    }

    fn remove(&self, key: &str) -> Result<(), Self::Error> {
        (**self).remove(key)
    }
}

/// Result of an offline reconciliation, surfaced to the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfflineReport {
    pub elapsed_ms: i64,
    pub credited_ms: i64,
    /// Whether the elapsed gap exceeded the offline cap.
    pub capped: bool,
    pub stars_earned: i64,
}

/// Serialize the full state under the fixed key, stamping the wall clock.
///
/// # Errors
///
/// Returns an error when serialization or the store write fails; callers
/// log and continue, leaving in-memory state authoritative.
pub fn save_game<S: SaveStore>(store: &S, gs: &mut GameState, now_ms: i64) -> anyhow::Result<()> {
    gs.timestamp_ms = now_ms;
    let document = serde_json::to_string(gs)?;
    store.set(SAVE_KEY, &document)?;
    Ok(())
}

/// Load and normalize a snapshot. Corrupt or missing documents yield `None`
/// (fresh-game initialization is the caller's fallback), never an error.
pub fn load_game<S: SaveStore>(store: &S, catalog: &Catalog) -> Option<GameState> {
    let raw = match store.get(SAVE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(error) => {
            log::warn!("save store read failed: {error}");
            return None;
        }
    };
    let mut gs: GameState = match serde_json::from_str(&raw) {
        Ok(gs) => gs,
        Err(error) => {
            log::warn!("corrupt snapshot treated as no save: {error}");
            return None;
        }
    };
    normalize_loaded(&mut gs, catalog);
    Some(gs)
}

/// Repair structural invariants after a defensive load: legacy staff ids,
/// id counters, bound clamps, achievement merging.
fn normalize_loaded(gs: &mut GameState, catalog: &Catalog) {
    gs.level = gs.level.max(1);
    gs.stars = gs.stars.max(0);
    gs.gems = gs.gems.max(0);
    gs.mood = gs.mood.clamp(0, MOOD_MAX);

    // Id counters must stay ahead of every live entity.
    let min_next_floor = gs
        .floors
        .iter()
        .map(|floor| floor.id)
        .max()
        .map_or(0, |max| max + 1);
    gs.next_floor_id = gs.next_floor_id.max(min_next_floor);
    let min_next_staff = gs
        .floors
        .iter()
        .flat_map(|floor| floor.staff.iter())
        .chain(gs.unassigned_staff.iter())
        .map(|member| member.id)
        .max()
        .map_or(0, |max| max + 1);
    gs.next_staff_id = gs.next_staff_id.max(min_next_staff);
    let min_next_lobby = gs
        .lobby
        .applicants
        .iter()
        .map(|applicant| applicant.id)
        .chain(gs.lobby.vips.iter().map(|vip| vip.id))
        .max()
        .map_or(0, |max| max + 1);
    gs.next_lobby_id = gs.next_lobby_id.max(min_next_lobby);
    let min_next_reader = gs
        .readers
        .iter()
        .map(|reader| reader.id)
        .max()
        .map_or(0, |max| max + 1);
    gs.next_reader_id = gs.next_reader_id.max(min_next_reader);

    // Legacy staff entries carry a zero id; give them real ids and restore
    // the floor back-reference from their containing floor.
    for floor_index in 0..gs.floors.len() {
        let floor_id = gs.floors[floor_index].id;
        for member_index in 0..gs.floors[floor_index].staff.len() {
            let needs_id = gs.floors[floor_index].staff[member_index].id == 0;
            if needs_id {
                let id = gs.alloc_staff_id();
                gs.floors[floor_index].staff[member_index].id = id;
            }
            gs.floors[floor_index].staff[member_index].assigned_floor = Some(floor_id);
        }
    }
    for member in &mut gs.unassigned_staff {
        member.assigned_floor = None;
    }

    // Clamp per-floor bounds against the catalog.
    for floor in &mut gs.floors {
        floor.trash = floor.trash.min(TRASH_MAX);
        let Some(def) = catalog.floor_type(&floor.type_id) else {
            continue;
        };
        floor.stock.resize_with(def.categories.len(), Default::default);
        let slots = def.staff_slots as usize;
        if floor.staff.len() > slots {
            let overflow: Vec<_> = floor.staff.drain(slots..).collect();
            for mut member in overflow {
                member.assigned_floor = None;
                gs.unassigned_staff.push(member);
            }
        }
        for (index, slot) in floor.stock.iter_mut().enumerate() {
            if let Some(category) = def.categories.get(index) {
                slot.current_stock = slot
                    .current_stock
                    .min(effective_max_stock(category, floor.upgrade_level));
            }
        }
    }

    // The shared lobby cap survives schema drift.
    while gs.lobby.occupancy() > LOBBY_SHARED_CAP {
        if gs.lobby.applicants.pop().is_none() && gs.lobby.vips.pop().is_none() {
            break;
        }
    }

    merge_achievements(gs, catalog);
}

/// Replay an elapsed offline gap at coarse fidelity.
///
/// Completes due construction/restock windows, discards transient readers,
/// and credits capped estimated earnings once. Returns `None` for gaps
/// under one second.
pub fn process_offline_progress(
    gs: &mut GameState,
    catalog: &Catalog,
    now_ms: i64,
) -> Option<OfflineReport> {
    let elapsed_ms = now_ms - gs.timestamp_ms;
    if elapsed_ms < OFFLINE_MIN_ELAPSED_MS {
        return None;
    }

    complete_due_construction(gs, now_ms);
    complete_due_restocks(gs, catalog, now_ms);
    gs.readers.clear();

    let cap_ms = (OFFLINE_BASE_CAP_HOURS + i64::from(gs.bonus_offline_hours)) * MS_PER_HOUR;
    let credited_ms = elapsed_ms.min(cap_ms);
    let capped = elapsed_ms > cap_ms;

    let mut rates: Vec<i64> = Vec::new();
    for floor in &gs.floors {
        let Some(def) = catalog.floor_type(&floor.type_id) else {
            continue;
        };
        if !floor.is_ready() {
            continue;
        }
        for (index, slot) in floor.stock.iter().enumerate() {
            if slot.current_stock == 0 || !floor.category_unlocked(index) {
                continue;
            }
            if let Some(category) = def.categories.get(index) {
                rates.push(effective_earning_rate(category, floor.upgrade_level));
            }
        }
    }
    let stars_earned = if rates.is_empty() {
        0
    } else {
        let average = i64_to_f64(rates.iter().sum::<i64>()) / i64_to_f64(rates.len() as i64);
        let slices = credited_ms / 1_000 / OFFLINE_EARN_SLICE_SECS;
        floor_f64_to_i64(i64_to_f64(slices) * average * OFFLINE_EARN_FACTOR)
    };
    gs.earn_stars(stars_earned);

    gs.prime_timers(now_ms);
    gs.last_tick_ms = now_ms;
    gs.logs.push(String::from(LOG_OFFLINE_EARNINGS));
    let report = OfflineReport {
        elapsed_ms,
        credited_ms,
        capped,
        stars_earned,
    };
    gs.notifications.offline_report = Some(report);
    Some(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::floors::build_floor;
    use crate::staff::StaffMember;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::convert::Infallible;

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
    fn save_load_round_trips_persisted_fields() {
        let catalog = Catalog::default_catalog();
        let store = MemoryStore::default();
        let mut gs = GameState::new_game(11, &catalog, 1_000);
        build_floor(&mut gs, &catalog, "board_books", 1_000).unwrap();
        gs.stats.bump("readers.served", 7);
        save_game(&store, &mut gs, 2_000).unwrap();

        let loaded = load_game(&store, &catalog).unwrap();
        assert_eq!(loaded.stars, gs.stars);
        assert_eq!(loaded.floors, gs.floors);
        assert_eq!(loaded.stats, gs.stats);
        assert_eq!(loaded.timestamp_ms, 2_000);
    }

    #[test]
    fn corrupt_snapshot_reads_as_no_save() {
        let catalog = Catalog::default_catalog();
        let store = MemoryStore::default();
        store.set(SAVE_KEY, "{not json").unwrap();
        assert!(load_game(&store, &catalog).is_none());
    }

    #[test]
    fn missing_snapshot_reads_as_no_save() {
        let catalog = Catalog::default_catalog();
        let store = MemoryStore::default();
        assert!(load_game(&store, &catalog).is_none());
    }

    #[test]
    fn load_normalizes_legacy_staff_and_merges_achievements() {
        let catalog = Catalog::default_catalog();
        let store = MemoryStore::default();
        let document = r#"{
            "seed": 3,
            "stars": 500,
            "floors": [
                {"id": 0, "type_id": "basement"},
                {"id": 1, "type_id": "board_books", "staff": ["Old Hand", {"id": 9, "type_id": "shelver", "name": "New", "skill": 2}]}
            ]
        }"#;
        store.set(SAVE_KEY, document).unwrap();
        let loaded = load_game(&store, &catalog).unwrap();
        let floor = loaded.floor(1).unwrap();
        assert_eq!(floor.staff.len(), 2);
        assert_ne!(floor.staff[0].id, 0, "legacy entry got a real id");
        assert_eq!(floor.staff[0].name, "Old Hand");
        assert_eq!(floor.staff[0].assigned_floor, Some(1));
        assert_eq!(floor.stock.len(), 3, "stock slots rebuilt from catalog");
        assert_eq!(loaded.achievements.len(), catalog.achievements.len());
        assert!(loaded.next_staff_id > 9);
    }

    #[test]
    fn offline_noop_under_one_second() {
        let catalog = Catalog::default_catalog();
        let mut gs = GameState::new_game(1, &catalog, 1_000_000);
        gs.timestamp_ms = 1_000_000;
        assert!(process_offline_progress(&mut gs, &catalog, 1_000_500).is_none());
    }

    #[test]
    fn offline_caps_at_base_three_hours() {
        let catalog = Catalog::default_catalog();
        let mut gs = GameState::new_game(1, &catalog, 0);
        let id = build_floor(&mut gs, &catalog, "board_books", 0).unwrap();
        complete_due_construction(&mut gs, 60_000);
        let mut member = StaffMember::new(1, "shelver", "Jo", 3);
        member.assigned_floor = Some(id);
        gs.floor_mut(id).unwrap().staff.push(member);
        gs.floor_mut(id).unwrap().stock[0].current_stock = 10;
        gs.timestamp_ms = 0;

        let five_hours = 5 * MS_PER_HOUR;
        let report = process_offline_progress(&mut gs, &catalog, five_hours).unwrap();
        assert!(report.capped);
        assert_eq!(report.credited_ms, 3 * MS_PER_HOUR);
        // rate 2, one category: floor(10800/30) * 2 * 0.5 = 360.
        assert_eq!(report.stars_earned, 360);
        assert!(gs.readers.is_empty());
        assert_eq!(gs.notifications.take_offline_report(), Some(report));
    }

    #[test]
    fn offline_bonus_hours_raise_the_cap() {
        let catalog = Catalog::default_catalog();
        let mut gs = GameState::new_game(1, &catalog, 0);
        gs.bonus_offline_hours = 2;
        gs.timestamp_ms = 0;
        let report = process_offline_progress(&mut gs, &catalog, 6 * MS_PER_HOUR).unwrap();
        assert!(report.capped);
        assert_eq!(report.credited_ms, 5 * MS_PER_HOUR);
        assert_eq!(report.stars_earned, 0, "no stocked staffed categories");
    }

    #[test]
    fn offline_completes_due_windows_and_discards_readers() {
        let catalog = Catalog::default_catalog();
        let mut gs = GameState::new_game(1, &catalog, 0);
        let id = build_floor(&mut gs, &catalog, "board_books", 0).unwrap();
        gs.readers.push(crate::spawn::Reader {
            id: 1,
            archetype_id: String::from("casual_reader"),
            target_floor: id,
            category_index: 0,
            arrive_ms: 10,
            checkout_ms: 20,
            earning_amount: 4,
            books: 2,
            elevator: crate::spawn::ElevatorState::Waiting,
            is_vip: false,
            vip_ability: None,
        });
        gs.timestamp_ms = 0;
        process_offline_progress(&mut gs, &catalog, 2 * MS_PER_HOUR).unwrap();
        assert!(gs.floor(id).unwrap().is_ready(), "construction completed");
        assert!(gs.readers.is_empty(), "transient readers discarded");
    }
}
