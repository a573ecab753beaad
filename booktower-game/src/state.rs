//! Central mutable game state and its structural invariants.
//!
//! All entities live here; subsystem modules mutate the state through
//! operations that clamp at the mutation site so the invariants in the
//! module docs hold after every call.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::constants::{
    APPLICANT_MIN_GAP_MS, DONATION_MIN_GAP_MS, FIND_MISSION_MIN_GAP_MS, HALL_EVENT_MIN_GAP_MS,
    MINI_QUEST_MIN_GAP_MS, MISSION_MIN_GAP_MS, MOOD_BASELINE, READER_SPAWN_BASE_MS,
    RUSH_HOUR_MIN_GAP_MS, STAR_EVENT_MIN_GAP_MS, STARTING_GEMS, STARTING_STARS, STAT_STARS_EARNED,
    VIP_MIN_GAP_MS, XP_LEVEL_BASE, XP_LEVEL_GROWTH,
};
use crate::events::{HallEventState, StarEventState};
use crate::floors::Floor;
use crate::incidents::IncidentKind;
use crate::lobby::Lobby;
use crate::missions::{FindMissionState, MiniQuestState, MissionState};
use crate::numbers::{floor_f64_to_i64, i64_to_f64};
use crate::save::OfflineReport;
use crate::spawn::Reader;
use crate::staff::StaffMember;
use crate::weather::{Weather, WeatherState};

/// Identifier of a floor within the tower.
pub type FloorId = u32;
/// Identifier of a staff member.
pub type StaffId = u64;
/// Identifier of a transient reader.
pub type ReaderId = u64;
/// Identifier of a lobby entry (applicant or VIP guest).
pub type LobbyEntryId = u64;

/// Monotonic stat counters keyed by stable names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct Stats {
    counters: BTreeMap<String, u64>,
}

impl Stats {
    /// Increase a counter, saturating at the maximum.
    pub fn bump(&mut self, key: &str, amount: u64) {
        let entry = self.counters.entry(key.to_string()).or_insert(0);
        *entry = entry.saturating_add(amount);
    }

    /// Read a counter, defaulting to zero.
    #[must_use]
    pub fn get(&self, key: &str) -> u64 {
        self.counters.get(key).copied().unwrap_or(0)
    }
}

/// Per-achievement unlock progress persisted in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementProgress {
    pub id: String,
    #[serde(default)]
    pub unlocked: bool,
}

/// Rush-hour scheduling state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RushHourState {
    #[serde(default)]
    pub active_until_ms: i64,
    #[serde(default)]
    pub next_ms: i64,
}

impl RushHourState {
    /// Whether rush hour is running at the given instant.
    #[must_use]
    pub const fn is_active(&self, now_ms: i64) -> bool {
        now_ms < self.active_until_ms
    }
}

/// Future-timestamp scheduling for the periodic spawn rolls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SpawnTimers {
    #[serde(default)]
    pub next_reader_ms: i64,
    #[serde(default)]
    pub next_applicant_ms: i64,
    #[serde(default)]
    pub next_vip_ms: i64,
    #[serde(default)]
    pub next_donation_ms: i64,
    #[serde(default)]
    pub next_cleaning_ms: i64,
    #[serde(default)]
    pub next_mood_ms: i64,
}

/// Transient, single-use notification fields for the consumer.
///
/// The engine overwrites rather than queues; the UI takes and clears.
/// Never persisted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Notifications {
    pub weather_changed: Option<Weather>,
    pub achievement_unlocked: Option<String>,
    pub incident_started: Option<(FloorId, IncidentKind)>,
    pub level_up: Option<u32>,
    pub mission_completed: Option<String>,
    pub hall_event_completed: Option<String>,
    pub vip_arrived: Option<String>,
    pub rush_hour_until_ms: Option<i64>,
    pub offline_report: Option<OfflineReport>,
}

impl Notifications {
    /// Take and clear the weather-change notification.
    pub fn take_weather_changed(&mut self) -> Option<Weather> {
        self.weather_changed.take()
    }

    /// Take and clear the achievement notification.
    pub fn take_achievement_unlocked(&mut self) -> Option<String> {
        self.achievement_unlocked.take()
    }

    /// Take and clear the incident notification.
    pub fn take_incident_started(&mut self) -> Option<(FloorId, IncidentKind)> {
        self.incident_started.take()
    }

    /// Take and clear the level-up notification.
    pub fn take_level_up(&mut self) -> Option<u32> {
        self.level_up.take()
    }

    /// Take and clear the offline report.
    pub fn take_offline_report(&mut self) -> Option<OfflineReport> {
        self.offline_report.take()
    }
}

fn default_level() -> u32 {
    1
}

fn default_mood() -> i32 {
    MOOD_BASELINE
}

/// Root simulation state. Every field deserializes independently so older
/// snapshots keep loading as the schema grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct GameState {
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub stars: i64,
    #[serde(default)]
    pub gems: i64,
    #[serde(default = "default_level")]
    pub level: u32,
    #[serde(default)]
    pub xp: i64,
    #[serde(default)]
    pub prestige_tokens: u32,
    #[serde(default)]
    pub floors: Vec<Floor>,
    /// Transient visitors; discarded during offline reconciliation.
    #[serde(default)]
    pub readers: Vec<Reader>,
    #[serde(default)]
    pub unassigned_staff: Vec<StaffMember>,
    #[serde(default)]
    pub lobby: Lobby,
    #[serde(default)]
    pub mission: MissionState,
    #[serde(default)]
    pub find_mission: FindMissionState,
    #[serde(default)]
    pub mini_quest: MiniQuestState,
    #[serde(default)]
    pub hall_event: HallEventState,
    #[serde(default)]
    pub star_event: StarEventState,
    #[serde(default)]
    pub incident_cooldown_until_ms: i64,
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub achievements: Vec<AchievementProgress>,
    #[serde(default)]
    pub perks: Vec<String>,
    #[serde(default)]
    pub decorations: Vec<String>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub upgrades: Vec<String>,
    #[serde(default)]
    pub weather: WeatherState,
    #[serde(default = "default_mood")]
    pub mood: i32,
    #[serde(default)]
    pub rush_hour: RushHourState,
    #[serde(default)]
    pub timers: SpawnTimers,
    #[serde(default)]
    pub active_holiday: Option<String>,
    #[serde(default)]
    pub loyalty_level: u32,
    #[serde(default)]
    pub bonus_offline_hours: u32,
    #[serde(default)]
    pub last_tick_ms: i64,
    /// Wall-clock stamp written at save time, consumed by offline replay.
    #[serde(default)]
    pub timestamp_ms: i64,
    #[serde(default)]
    pub next_floor_id: FloorId,
    #[serde(default)]
    pub next_staff_id: StaffId,
    #[serde(default)]
    pub next_reader_id: ReaderId,
    #[serde(default)]
    pub next_lobby_id: LobbyEntryId,
    #[serde(default)]
    pub logs: Vec<String>,
    #[serde(skip)]
    pub notifications: Notifications,
}

impl GameState {
    /// Construct a fresh game: starting currencies, the basement floor, and
    /// all subsystem timers primed relative to `now_ms`.
    #[must_use]
    pub fn new_game(seed: u64, catalog: &Catalog, now_ms: i64) -> Self {
        let mut gs = Self {
            seed,
            stars: STARTING_STARS,
            gems: STARTING_GEMS,
            level: 1,
            mood: MOOD_BASELINE,
            last_tick_ms: now_ms,
            timestamp_ms: now_ms,
            // Staff id zero is reserved as the legacy-save migration marker.
            next_staff_id: 1,
            ..Self::default()
        };
        if let Some(def) = catalog.floor_type(&catalog.settings.basement_type) {
            let id = gs.alloc_floor_id();
            gs.floors.push(Floor::new_ready(id, def, now_ms));
        }
        crate::achievements::merge_achievements(&mut gs, catalog);
        gs.prime_timers(now_ms);
        gs
    }

    /// Prime all future-timestamp timers relative to `now_ms`. Used by fresh
    /// games and after offline reconciliation so stale timers do not fire in
    /// a burst.
    pub fn prime_timers(&mut self, now_ms: i64) {
        self.timers.next_reader_ms = now_ms + READER_SPAWN_BASE_MS;
        self.timers.next_applicant_ms = now_ms + APPLICANT_MIN_GAP_MS;
        self.timers.next_vip_ms = now_ms + VIP_MIN_GAP_MS;
        self.timers.next_donation_ms = now_ms + DONATION_MIN_GAP_MS;
        self.timers.next_cleaning_ms = now_ms;
        self.timers.next_mood_ms = now_ms;
        self.rush_hour.next_ms = now_ms + RUSH_HOUR_MIN_GAP_MS;
        self.mission.next_trigger_ms = now_ms + MISSION_MIN_GAP_MS;
        self.find_mission.next_trigger_ms = now_ms + FIND_MISSION_MIN_GAP_MS;
        self.mini_quest.next_trigger_ms = now_ms + MINI_QUEST_MIN_GAP_MS;
        self.hall_event.next_trigger_ms = now_ms + HALL_EVENT_MIN_GAP_MS;
        self.star_event.next_trigger_ms = now_ms + STAR_EVENT_MIN_GAP_MS;
        self.weather.next_weather_ms = now_ms;
        self.weather.next_season_ms = now_ms + crate::constants::SEASON_LENGTH_MS;
    }

    /// Allocate the next floor id.
    pub fn alloc_floor_id(&mut self) -> FloorId {
        let id = self.next_floor_id;
        self.next_floor_id += 1;
        id
    }

    /// Allocate the next staff id.
    pub fn alloc_staff_id(&mut self) -> StaffId {
        let id = self.next_staff_id;
        self.next_staff_id += 1;
        id
    }

    /// Allocate the next reader id.
    pub fn alloc_reader_id(&mut self) -> ReaderId {
        let id = self.next_reader_id;
        self.next_reader_id += 1;
        id
    }

    /// Allocate the next lobby entry id.
    pub fn alloc_lobby_id(&mut self) -> LobbyEntryId {
        let id = self.next_lobby_id;
        self.next_lobby_id += 1;
        id
    }

    /// Find a floor by id.
    #[must_use]
    pub fn floor(&self, id: FloorId) -> Option<&Floor> {
        self.floors.iter().find(|floor| floor.id == id)
    }

    /// Find a floor by id, mutably.
    pub fn floor_mut(&mut self, id: FloorId) -> Option<&mut Floor> {
        self.floors.iter_mut().find(|floor| floor.id == id)
    }

    /// Debit stars, failing without mutation when funds are short.
    #[must_use]
    pub fn try_spend_stars(&mut self, cost: i64) -> bool {
        if cost < 0 || self.stars < cost {
            return false;
        }
        self.stars -= cost;
        true
    }

    /// Debit gems, failing without mutation when funds are short.
    #[must_use]
    pub fn try_spend_gems(&mut self, cost: i64) -> bool {
        if cost < 0 || self.gems < cost {
            return false;
        }
        self.gems -= cost;
        true
    }

    /// Credit stars and track the lifetime earnings counter.
    pub fn earn_stars(&mut self, amount: i64) {
        if amount <= 0 {
            return;
        }
        self.stars = self.stars.saturating_add(amount);
        self.stats
            .bump(STAT_STARS_EARNED, u64::try_from(amount).unwrap_or(0));
    }

    /// XP required to advance from the given level to the next.
    #[must_use]
    pub fn xp_to_next(level: u32) -> i64 {
        let exponent = level.saturating_sub(1);
        let scale = XP_LEVEL_GROWTH.powi(i32::try_from(exponent).unwrap_or(i32::MAX));
        floor_f64_to_i64(i64_to_f64(XP_LEVEL_BASE) * scale).max(XP_LEVEL_BASE)
    }

    /// Number of standard (non-utility) floors, the incident gate metric.
    #[must_use]
    pub fn standard_floor_count(&self, catalog: &Catalog) -> usize {
        self.floors
            .iter()
            .filter(|floor| {
                catalog
                    .floor_type(&floor.type_id)
                    .is_some_and(|def| def.kind == crate::catalog::FloorKind::Standard)
            })
            .count()
    }

    /// Whether any incident is active anywhere in the tower.
    #[must_use]
    pub fn any_incident_active(&self) -> bool {
        self.floors.iter().any(|floor| !floor.incidents.is_empty())
    }

    /// Type ids of all `Ready` floors, for synergy matching.
    #[must_use]
    pub fn ready_floor_type_ids(&self) -> Vec<&str> {
        self.floors
            .iter()
            .filter(|floor| floor.is_ready())
            .map(|floor| floor.type_id.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_game_creates_basement_and_grants() {
        let catalog = Catalog::default_catalog();
        let gs = GameState::new_game(1, &catalog, 5_000);
        assert_eq!(gs.stars, STARTING_STARS);
        assert_eq!(gs.gems, STARTING_GEMS);
        assert_eq!(gs.floors.len(), 1);
        assert_eq!(gs.floors[0].type_id, "basement");
        assert!(gs.floors[0].is_ready());
    }

    #[test]
    fn spend_never_goes_negative() {
        let mut gs = GameState::default();
        gs.stars = 10;
        assert!(!gs.try_spend_stars(11));
        assert_eq!(gs.stars, 10);
        assert!(gs.try_spend_stars(10));
        assert_eq!(gs.stars, 0);
        assert!(!gs.try_spend_gems(1));
    }

    #[test]
    fn xp_curve_grows() {
        assert_eq!(GameState::xp_to_next(1), XP_LEVEL_BASE);
        assert!(GameState::xp_to_next(5) > GameState::xp_to_next(4));
    }

    #[test]
    fn stats_bump_saturates() {
        let mut stats = Stats::default();
        stats.bump("x", u64::MAX);
        stats.bump("x", 10);
        assert_eq!(stats.get("x"), u64::MAX);
        assert_eq!(stats.get("missing"), 0);
    }
}
