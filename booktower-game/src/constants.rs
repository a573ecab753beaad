//! Centralized balance and tuning constants for Booktower game logic.
//!
//! These values define the deterministic math for the core simulation.
//! Keeping them together ensures that gameplay can only be adjusted via
//! code changes reviewed in version control, rather than through external
//! JSON assets.

// Logging keys -------------------------------------------------------------
pub(crate) const LOG_FLOOR_BUILT: &str = "log.floor.built";
pub(crate) const LOG_FLOOR_READY: &str = "log.floor.ready";
pub(crate) const LOG_FLOOR_DELETED: &str = "log.floor.deleted";
pub(crate) const LOG_FLOOR_UPGRADED: &str = "log.floor.upgraded";
pub(crate) const LOG_FLOOR_RUSHED: &str = "log.floor.rushed";
pub(crate) const LOG_STAFF_HIRED: &str = "log.staff.hired";
pub(crate) const LOG_STAFF_FIRED: &str = "log.staff.fired";
pub(crate) const LOG_STAFF_REASSIGNED: &str = "log.staff.reassigned";
pub(crate) const LOG_READER_CHECKOUT: &str = "log.reader.checkout";
pub(crate) const LOG_VIP_ARRIVED: &str = "log.vip.arrived";
pub(crate) const LOG_MISSION_COMPLETED: &str = "log.mission.completed";
pub(crate) const LOG_FIND_COMPLETED: &str = "log.find-mission.completed";
pub(crate) const LOG_QUEST_COMPLETED: &str = "log.mini-quest.completed";
pub(crate) const LOG_HALL_EVENT_COMPLETED: &str = "log.hall-event.completed";
pub(crate) const LOG_STAR_EVENT_STARTED: &str = "log.star-event.started";
pub(crate) const LOG_INCIDENT_STARTED: &str = "log.incident.started";
pub(crate) const LOG_INCIDENT_FIXED: &str = "log.incident.fixed";
pub(crate) const LOG_WEATHER_CHANGED: &str = "log.weather.changed";
pub(crate) const LOG_SEASON_CHANGED: &str = "log.season.changed";
pub(crate) const LOG_LEVEL_UP: &str = "log.level.up";
pub(crate) const LOG_ACHIEVEMENT_UNLOCKED: &str = "log.achievement.unlocked";
pub(crate) const LOG_DONATION_RECEIVED: &str = "log.donation.received";
pub(crate) const LOG_PRESTIGE: &str = "log.prestige";
pub(crate) const LOG_OFFLINE_EARNINGS: &str = "log.offline.earnings";
pub(crate) const LOG_RUSH_HOUR: &str = "log.rush-hour";

// Stat counter keys --------------------------------------------------------
pub const STAT_FLOORS_BUILT: &str = "floors.built";
pub const STAT_FLOORS_UPGRADED: &str = "floors.upgraded";
pub const STAT_READERS_SERVED: &str = "readers.served";
pub const STAT_VIPS_SERVED: &str = "vips.served";
pub const STAT_BOOKS_CHECKED_OUT: &str = "books.checked-out";
pub const STAT_STARS_EARNED: &str = "stars.earned";
pub const STAT_STAFF_HIRED: &str = "staff.hired";
pub const STAT_MISSIONS_COMPLETED: &str = "missions.completed";
pub const STAT_FIND_MISSIONS_COMPLETED: &str = "find-missions.completed";
pub const STAT_MINI_QUESTS_COMPLETED: &str = "mini-quests.completed";
pub const STAT_HALL_EVENTS_COMPLETED: &str = "hall-events.completed";
pub const STAT_INCIDENTS_FIXED: &str = "incidents.fixed";
pub const STAT_DONATIONS_RECEIVED: &str = "donations.received";
pub const STAT_TRASH_EMPTIED: &str = "trash.emptied";
pub const STAT_PRESTIGES: &str = "prestiges";

// Currency and progression -------------------------------------------------
pub(crate) const STARTING_STARS: i64 = 1_000;
pub(crate) const STARTING_GEMS: i64 = 5;
pub(crate) const XP_LEVEL_BASE: i64 = 100;
pub(crate) const XP_LEVEL_GROWTH: f64 = 1.15;
pub(crate) const LEVEL_UP_GEM_REWARD: i64 = 1;
pub(crate) const PRESTIGE_MIN_LEVEL: u32 = 20;
pub(crate) const PRESTIGE_TOKEN_LEVEL_DIV: u32 = 10;
pub(crate) const PRESTIGE_EARNING_BONUS: f64 = 0.02;
pub(crate) const LOYALTY_READERS_PER_LEVEL: u64 = 500;
pub(crate) const LOYALTY_MAX_LEVEL: u32 = 5;
pub(crate) const LOYALTY_BONUS_PER_LEVEL: f64 = 0.05;

// Floors and stock ---------------------------------------------------------
pub(crate) const FLOOR_REFUND_RATE: f64 = 0.5;
pub(crate) const UPGRADE_MAX_LEVEL: u8 = 3;
pub(crate) const UPGRADE_LEVEL_MULTS: [f64; 3] = [1.0, 1.25, 1.5];
pub(crate) const UPGRADE_COST_LEVEL_MULT: i64 = 4;
pub(crate) const TRASH_MAX: u8 = 100;
pub(crate) const TRASH_PER_CHECKOUT: u8 = 2;
pub(crate) const TRASH_PENALTY_FREE_LIMIT: u8 = 50;
pub(crate) const CLEANING_INTERVAL_MS: i64 = 15_000;
pub(crate) const RESTOCK_SKILL_DISCOUNT: f64 = 0.04;

// Readers and spawning -----------------------------------------------------
pub(crate) const READER_SPAWN_BASE_MS: i64 = 8_000;
pub(crate) const ELEVATOR_RIDE_MS: i64 = 4_000;
pub(crate) const CHECKOUT_MIN_MS: i64 = 20_000;
pub(crate) const CHECKOUT_MAX_MS: i64 = 45_000;
pub(crate) const PREFERRED_FLOOR_PROB: f64 = 0.7;
pub(crate) const RUSH_HOUR_SPAWN_DIV: i64 = 2;
pub(crate) const RUSH_HOUR_DURATION_MS: i64 = 60_000;
pub(crate) const RUSH_HOUR_MIN_GAP_MS: i64 = 300_000;
pub(crate) const RUSH_HOUR_MAX_GAP_MS: i64 = 900_000;
pub(crate) const VIP_BOOST_DURATION_MS: i64 = 90_000;
pub(crate) const VIP_BOOST_MULT: f64 = 1.5;
pub(crate) const CROWD_DRAW_SPAWN_CUT_MS: i64 = 5_000;

// Lobby --------------------------------------------------------------------
pub(crate) const LOBBY_SHARED_CAP: usize = 3;
pub(crate) const APPLICANT_TTL_MS: i64 = 180_000;
pub(crate) const VIP_GUEST_TTL_MS: i64 = 120_000;
pub(crate) const APPLICANT_MIN_GAP_MS: i64 = 60_000;
pub(crate) const APPLICANT_MAX_GAP_MS: i64 = 180_000;
pub(crate) const VIP_MIN_GAP_MS: i64 = 120_000;
pub(crate) const VIP_MAX_GAP_MS: i64 = 360_000;
pub(crate) const APPLICANT_DREAM_GENRE_PROB: f64 = 0.3;

// Mood ---------------------------------------------------------------------
pub(crate) const MOOD_MAX: i32 = 100;
pub(crate) const MOOD_BASELINE: i32 = 50;
pub(crate) const MOOD_HIGH_THRESHOLD: i32 = 70;
pub(crate) const MOOD_LOW_THRESHOLD: i32 = 30;
pub(crate) const MOOD_BONUS_RATE: f64 = 0.25;
pub(crate) const MOOD_INCIDENT_PENALTY: i32 = 10;
pub(crate) const MOOD_STEP_INTERVAL_MS: i64 = 5_000;

// Missions, events, incidents ----------------------------------------------
pub(crate) const MISSION_MIN_GAP_MS: i64 = 180_000;
pub(crate) const MISSION_MAX_GAP_MS: i64 = 420_000;
pub(crate) const MISSION_DURATION_MS: i64 = 300_000;
pub(crate) const FIND_MISSION_MIN_GAP_MS: i64 = 240_000;
pub(crate) const FIND_MISSION_MAX_GAP_MS: i64 = 600_000;
pub(crate) const FIND_MISSION_DURATION_MS: i64 = 240_000;
pub(crate) const FIND_MISSION_DISCOVERY_PROB: f64 = 0.25;
pub(crate) const MINI_QUEST_MIN_GAP_MS: i64 = 300_000;
pub(crate) const MINI_QUEST_MAX_GAP_MS: i64 = 720_000;
pub(crate) const MINI_QUEST_DURATION_MS: i64 = 360_000;
pub(crate) const HALL_EVENT_MIN_GAP_MS: i64 = 360_000;
pub(crate) const HALL_EVENT_MAX_GAP_MS: i64 = 900_000;
pub(crate) const STAR_EVENT_MIN_GAP_MS: i64 = 600_000;
pub(crate) const STAR_EVENT_MAX_GAP_MS: i64 = 1_500_000;
pub(crate) const RESCHEDULE_RETRY_MS: i64 = 60_000;
pub(crate) const INCIDENT_MIN_STANDARD_FLOORS: usize = 4;
pub(crate) const INCIDENT_COOLDOWN_MS: i64 = 120_000;
pub(crate) const INCIDENT_FIXER_CHANCE_DIV: f64 = 10.0;

// Donations ----------------------------------------------------------------
pub(crate) const DONATION_MIN_GAP_MS: i64 = 240_000;
pub(crate) const DONATION_MAX_GAP_MS: i64 = 600_000;

// Economy ------------------------------------------------------------------
pub(crate) const GEM_BONUS_CHANCE: f64 = 0.1;

// Offline reconciliation ---------------------------------------------------
pub(crate) const OFFLINE_MIN_ELAPSED_MS: i64 = 1_000;
pub(crate) const OFFLINE_BASE_CAP_HOURS: i64 = 3;
pub(crate) const OFFLINE_EARN_SLICE_SECS: i64 = 30;
pub(crate) const OFFLINE_EARN_FACTOR: f64 = 0.5;

// Weather ------------------------------------------------------------------
pub(crate) const WEATHER_MIN_SPELL_MS: i64 = 120_000;
pub(crate) const WEATHER_MAX_SPELL_MS: i64 = 300_000;
pub(crate) const SEASON_LENGTH_MS: i64 = 1_800_000;
