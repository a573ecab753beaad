//! Singleton mission machines: checkout missions, find-missions, and
//! mini-quests.
//!
//! Each machine cycles idle -> active -> completed/expired -> idle with a
//! randomized re-trigger delay, and at most one instance of each kind is
//! active at any time.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::constants::{
    FIND_MISSION_DISCOVERY_PROB, FIND_MISSION_DURATION_MS, FIND_MISSION_MAX_GAP_MS,
    FIND_MISSION_MIN_GAP_MS, LOG_FIND_COMPLETED, LOG_MISSION_COMPLETED, LOG_QUEST_COMPLETED,
    MINI_QUEST_DURATION_MS, MINI_QUEST_MAX_GAP_MS, MINI_QUEST_MIN_GAP_MS, MISSION_DURATION_MS,
    MISSION_MAX_GAP_MS, MISSION_MIN_GAP_MS, RESCHEDULE_RETRY_MS, STAT_FIND_MISSIONS_COMPLETED,
    STAT_MINI_QUESTS_COMPLETED, STAT_MISSIONS_COMPLETED,
};
use crate::spawn::choose_weighted;
use crate::state::{FloorId, GameState};

const MISSION_TARGET_MIN: u32 = 3;
const MISSION_TARGET_MAX: u32 = 8;
const MISSION_REWARD_PER_CHECKOUT: i64 = 40;
const FIND_MISSION_REWARD: i64 = 150;
const MINI_QUEST_TARGET_MIN: u32 = 5;
const MINI_QUEST_TARGET_MAX: u32 = 12;
const MINI_QUEST_REWARD_PER_CHECKOUT: i64 = 30;

/// An active checkout mission bound to one floor and category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveMission {
    pub floor_id: FloorId,
    pub category_index: usize,
    pub target: u32,
    #[serde(default)]
    pub progress: u32,
    pub reward_stars: i64,
    pub expires_ms: i64,
}

/// Singleton checkout-mission machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MissionState {
    #[serde(default)]
    pub active: Option<ActiveMission>,
    #[serde(default)]
    pub next_trigger_ms: i64,
}

/// An active find-mission: a sought item hidden on one floor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveFindMission {
    pub item_id: String,
    pub floor_id: FloorId,
    pub expires_ms: i64,
}

/// Singleton find-mission machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FindMissionState {
    #[serde(default)]
    pub active: Option<ActiveFindMission>,
    #[serde(default)]
    pub next_trigger_ms: i64,
}

/// An active mini-quest counting checkouts anywhere in the tower.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveMiniQuest {
    pub target: u32,
    #[serde(default)]
    pub progress: u32,
    pub reward_stars: i64,
    pub expires_ms: i64,
}

/// Singleton mini-quest machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MiniQuestState {
    #[serde(default)]
    pub active: Option<ActiveMiniQuest>,
    #[serde(default)]
    pub next_trigger_ms: i64,
}

/// Floor/category pairs a mission can target right now.
fn mission_targets(gs: &GameState) -> Vec<(FloorId, usize)> {
    gs.floors
        .iter()
        .filter(|floor| floor.is_operational())
        .flat_map(|floor| {
            floor
                .stock
                .iter()
                .enumerate()
                .filter(|(index, _)| floor.category_unlocked(*index))
                .map(|(index, _)| (floor.id, index))
        })
        .collect()
}

/// Advance all three machines: expiry first, then idle-trigger generation.
pub(crate) fn tick_missions<R: Rng>(gs: &mut GameState, catalog: &Catalog, rng: &mut R, now_ms: i64) {
    tick_mission(gs, rng, now_ms);
    tick_find_mission(gs, catalog, rng, now_ms);
    tick_mini_quest(gs, rng, now_ms);
}

fn tick_mission<R: Rng>(gs: &mut GameState, rng: &mut R, now_ms: i64) {
    if let Some(active) = &gs.mission.active {
        if now_ms >= active.expires_ms {
            gs.mission.active = None;
            gs.mission.next_trigger_ms = now_ms + rng.gen_range(MISSION_MIN_GAP_MS..=MISSION_MAX_GAP_MS);
        }
        return;
    }
    if now_ms < gs.mission.next_trigger_ms {
        return;
    }
    let targets = mission_targets(gs);
    let Some((floor_id, category_index)) = choose_weighted(rng, &targets, |_| 1.0).copied() else {
        gs.mission.next_trigger_ms = now_ms + RESCHEDULE_RETRY_MS;
        return;
    };
    let target = rng.gen_range(MISSION_TARGET_MIN..=MISSION_TARGET_MAX);
    gs.mission.active = Some(ActiveMission {
        floor_id,
        category_index,
        target,
        progress: 0,
        reward_stars: MISSION_REWARD_PER_CHECKOUT * i64::from(target),
        expires_ms: now_ms + MISSION_DURATION_MS,
    });
}

fn tick_find_mission<R: Rng>(gs: &mut GameState, catalog: &Catalog, rng: &mut R, now_ms: i64) {
    if let Some(active) = &gs.find_mission.active {
        if now_ms >= active.expires_ms {
            gs.find_mission.active = None;
            gs.find_mission.next_trigger_ms =
                now_ms + rng.gen_range(FIND_MISSION_MIN_GAP_MS..=FIND_MISSION_MAX_GAP_MS);
        }
        return;
    }
    if now_ms < gs.find_mission.next_trigger_ms {
        return;
    }
    let hosts: Vec<FloorId> = gs
        .floors
        .iter()
        .filter(|floor| floor.is_operational() && !floor.stock.is_empty())
        .map(|floor| floor.id)
        .collect();
    let Some(floor_id) = choose_weighted(rng, &hosts, |_| 1.0).copied() else {
        gs.find_mission.next_trigger_ms = now_ms + RESCHEDULE_RETRY_MS;
        return;
    };
    let Some(item) = choose_weighted(rng, &catalog.mission_items, |_| 1.0) else {
        gs.find_mission.next_trigger_ms = now_ms + RESCHEDULE_RETRY_MS;
        return;
    };
    gs.find_mission.active = Some(ActiveFindMission {
        item_id: item.id.clone(),
        floor_id,
        expires_ms: now_ms + FIND_MISSION_DURATION_MS,
    });
}

fn tick_mini_quest<R: Rng>(gs: &mut GameState, rng: &mut R, now_ms: i64) {
    if let Some(active) = &gs.mini_quest.active {
        if now_ms >= active.expires_ms {
            gs.mini_quest.active = None;
            gs.mini_quest.next_trigger_ms =
                now_ms + rng.gen_range(MINI_QUEST_MIN_GAP_MS..=MINI_QUEST_MAX_GAP_MS);
        }
        return;
    }
    if now_ms < gs.mini_quest.next_trigger_ms {
        return;
    }
    if mission_targets(gs).is_empty() {
        gs.mini_quest.next_trigger_ms = now_ms + RESCHEDULE_RETRY_MS;
        return;
    }
    let target = rng.gen_range(MINI_QUEST_TARGET_MIN..=MINI_QUEST_TARGET_MAX);
    gs.mini_quest.active = Some(ActiveMiniQuest {
        target,
        progress: 0,
        reward_stars: MINI_QUEST_REWARD_PER_CHECKOUT * i64::from(target),
        expires_ms: now_ms + MINI_QUEST_DURATION_MS,
    });
}

/// Feed a resolved checkout into every active machine.
pub(crate) fn on_checkout<R: Rng>(
    gs: &mut GameState,
    rng: &mut R,
    floor_id: FloorId,
    category_index: usize,
    now_ms: i64,
) {
    progress_mission(gs, rng, floor_id, category_index, now_ms);
    progress_find_mission(gs, rng, floor_id, now_ms);
    progress_mini_quest(gs, rng, now_ms);
}

fn progress_mission<R: Rng>(
    gs: &mut GameState,
    rng: &mut R,
    floor_id: FloorId,
    category_index: usize,
    now_ms: i64,
) {
    let Some(active) = &mut gs.mission.active else {
        return;
    };
    if active.floor_id != floor_id || active.category_index != category_index {
        return;
    }
    active.progress += 1;
    if active.progress < active.target {
        return;
    }
    let reward = active.reward_stars;
    gs.mission.active = None;
    gs.mission.next_trigger_ms = now_ms + rng.gen_range(MISSION_MIN_GAP_MS..=MISSION_MAX_GAP_MS);
    gs.earn_stars(reward);
    gs.stats.bump(STAT_MISSIONS_COMPLETED, 1);
    gs.logs.push(String::from(LOG_MISSION_COMPLETED));
    gs.notifications.mission_completed = Some(String::from("mission"));
}

fn progress_find_mission<R: Rng>(gs: &mut GameState, rng: &mut R, floor_id: FloorId, now_ms: i64) {
    let matches = gs
        .find_mission
        .active
        .as_ref()
        .is_some_and(|active| active.floor_id == floor_id);
    if !matches || !rng.gen_bool(FIND_MISSION_DISCOVERY_PROB) {
        return;
    }
    gs.find_mission.active = None;
    gs.find_mission.next_trigger_ms =
        now_ms + rng.gen_range(FIND_MISSION_MIN_GAP_MS..=FIND_MISSION_MAX_GAP_MS);
    gs.earn_stars(FIND_MISSION_REWARD);
    gs.stats.bump(STAT_FIND_MISSIONS_COMPLETED, 1);
    gs.logs.push(String::from(LOG_FIND_COMPLETED));
    gs.notifications.mission_completed = Some(String::from("find-mission"));
}

fn progress_mini_quest<R: Rng>(gs: &mut GameState, rng: &mut R, now_ms: i64) {
    let Some(active) = &mut gs.mini_quest.active else {
        return;
    };
    active.progress += 1;
    if active.progress < active.target {
        return;
    }
    let reward = active.reward_stars;
    gs.mini_quest.active = None;
    gs.mini_quest.next_trigger_ms =
        now_ms + rng.gen_range(MINI_QUEST_MIN_GAP_MS..=MINI_QUEST_MAX_GAP_MS);
    gs.earn_stars(reward);
    gs.stats.bump(STAT_MINI_QUESTS_COMPLETED, 1);
    gs.logs.push(String::from(LOG_QUEST_COMPLETED));
    gs.notifications.mission_completed = Some(String::from("mini-quest"));
}

/// Clear machines whose target floor is being deleted; they re-arm next tick.
pub(crate) fn on_floor_removed(gs: &mut GameState, floor_id: FloorId) {
    if gs
        .mission
        .active
        .as_ref()
        .is_some_and(|active| active.floor_id == floor_id)
    {
        gs.mission.active = None;
        gs.mission.next_trigger_ms = 0;
    }
    if gs
        .find_mission
        .active
        .as_ref()
        .is_some_and(|active| active.floor_id == floor_id)
    {
        gs.find_mission.active = None;
        gs.find_mission.next_trigger_ms = 0;
    }
}
