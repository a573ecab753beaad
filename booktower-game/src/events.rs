//! Global star events and floor-scoped hall events.
//!
//! Event rewards are declarative effect descriptors interpreted by one
//! dispatch function, keeping catalog data testable independent of engine
//! internals.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::constants::{
    HALL_EVENT_MAX_GAP_MS, HALL_EVENT_MIN_GAP_MS, LOG_HALL_EVENT_COMPLETED,
    LOG_STAR_EVENT_STARTED, MOOD_MAX, RESCHEDULE_RETRY_MS, STAR_EVENT_MAX_GAP_MS,
    STAR_EVENT_MIN_GAP_MS, STAT_HALL_EVENTS_COMPLETED,
};
use crate::spawn::choose_weighted;
use crate::state::{FloorId, GameState};

/// Declarative event reward effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Effect {
    GrantStars { amount: i64 },
    GrantGems { amount: i64 },
    MoodBoost { amount: i32 },
    CleanAllFloors,
}

impl Effect {
    /// Star grant constructor used by catalog builders.
    #[must_use]
    pub const fn grant_stars(amount: i64) -> Self {
        Self::GrantStars { amount }
    }

    /// Gem grant constructor used by catalog builders.
    #[must_use]
    pub const fn grant_gems(amount: i64) -> Self {
        Self::GrantGems { amount }
    }

    /// Mood boost constructor used by catalog builders.
    #[must_use]
    pub const fn mood_boost(amount: i32) -> Self {
        Self::MoodBoost { amount }
    }
}

/// Interpret one effect descriptor against the state.
pub fn apply_effect(gs: &mut GameState, effect: Effect) {
    match effect {
        Effect::GrantStars { amount } => gs.earn_stars(amount),
        Effect::GrantGems { amount } => {
            gs.gems = gs.gems.saturating_add(amount.max(0));
        }
        Effect::MoodBoost { amount } => {
            gs.mood = (gs.mood + amount).clamp(0, MOOD_MAX);
        }
        Effect::CleanAllFloors => {
            for floor in &mut gs.floors {
                floor.trash = 0;
            }
        }
    }
}

/// An active global star-multiplier event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveStarEvent {
    pub event_id: String,
    pub multiplier: f64,
    pub ends_ms: i64,
}

/// Singleton machine for the global star event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct StarEventState {
    #[serde(default)]
    pub active: Option<ActiveStarEvent>,
    #[serde(default)]
    pub next_trigger_ms: i64,
}

/// An active hall event bound to one floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveHallEvent {
    pub event_id: String,
    pub floor_id: FloorId,
    pub bonus_mult: f64,
    pub target_checkouts: u32,
    #[serde(default)]
    pub progress: u32,
    pub ends_ms: i64,
}

/// Singleton machine for the hall event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HallEventState {
    #[serde(default)]
    pub active: Option<ActiveHallEvent>,
    #[serde(default)]
    pub next_trigger_ms: i64,
}

/// Advance both event machines: expiry, then idle-trigger generation.
pub(crate) fn tick_events<R: Rng>(gs: &mut GameState, catalog: &Catalog, rng: &mut R, now_ms: i64) {
    tick_star_event(gs, catalog, rng, now_ms);
    tick_hall_event(gs, catalog, rng, now_ms);
}

fn tick_star_event<R: Rng>(gs: &mut GameState, catalog: &Catalog, rng: &mut R, now_ms: i64) {
    if let Some(active) = &gs.star_event.active {
        if now_ms >= active.ends_ms {
            gs.star_event.active = None;
            gs.star_event.next_trigger_ms =
                now_ms + rng.gen_range(STAR_EVENT_MIN_GAP_MS..=STAR_EVENT_MAX_GAP_MS);
        }
        return;
    }
    if now_ms < gs.star_event.next_trigger_ms {
        return;
    }
    let Some(def) = choose_weighted(rng, &catalog.star_events, |_| 1.0) else {
        gs.star_event.next_trigger_ms = now_ms + RESCHEDULE_RETRY_MS;
        return;
    };
    gs.star_event.active = Some(ActiveStarEvent {
        event_id: def.id.clone(),
        multiplier: def.multiplier,
        ends_ms: now_ms + def.duration_ms,
    });
    gs.logs.push(String::from(LOG_STAR_EVENT_STARTED));
}

fn tick_hall_event<R: Rng>(gs: &mut GameState, catalog: &Catalog, rng: &mut R, now_ms: i64) {
    if let Some(active) = &gs.hall_event.active {
        if now_ms >= active.ends_ms {
            // Expired without reaching the target: cleared silently.
            gs.hall_event.active = None;
            gs.hall_event.next_trigger_ms =
                now_ms + rng.gen_range(HALL_EVENT_MIN_GAP_MS..=HALL_EVENT_MAX_GAP_MS);
        }
        return;
    }
    if now_ms < gs.hall_event.next_trigger_ms {
        return;
    }
    let hosts: Vec<FloorId> = gs
        .floors
        .iter()
        .filter(|floor| floor.is_operational() && !floor.stock.is_empty())
        .map(|floor| floor.id)
        .collect();
    let Some(floor_id) = choose_weighted(rng, &hosts, |_| 1.0).copied() else {
        // No eligible host: reschedule the trigger without activating.
        gs.hall_event.next_trigger_ms = now_ms + RESCHEDULE_RETRY_MS;
        return;
    };
    let Some(def) = choose_weighted(rng, &catalog.hall_events, |_| 1.0) else {
        gs.hall_event.next_trigger_ms = now_ms + RESCHEDULE_RETRY_MS;
        return;
    };
    gs.hall_event.active = Some(ActiveHallEvent {
        event_id: def.id.clone(),
        floor_id,
        bonus_mult: def.bonus_mult,
        target_checkouts: def.target_checkouts,
        progress: 0,
        ends_ms: now_ms + def.duration_ms,
    });
}

/// Count a checkout toward an active hall event on the floor; completing
/// the target applies the event's effect descriptors.
pub(crate) fn on_checkout<R: Rng>(
    gs: &mut GameState,
    catalog: &Catalog,
    rng: &mut R,
    floor_id: FloorId,
    now_ms: i64,
) {
    let Some(active) = &mut gs.hall_event.active else {
        return;
    };
    if active.floor_id != floor_id || now_ms >= active.ends_ms {
        return;
    }
    active.progress += 1;
    if active.progress < active.target_checkouts {
        return;
    }
    let event_id = active.event_id.clone();
    gs.hall_event.active = None;
    gs.hall_event.next_trigger_ms =
        now_ms + rng.gen_range(HALL_EVENT_MIN_GAP_MS..=HALL_EVENT_MAX_GAP_MS);
    let effects = catalog
        .hall_events
        .iter()
        .find(|def| def.id == event_id)
        .map(|def| def.effects.clone())
        .unwrap_or_default();
    for effect in effects {
        apply_effect(gs, effect);
    }
    gs.stats.bump(STAT_HALL_EVENTS_COMPLETED, 1);
    gs.logs.push(String::from(LOG_HALL_EVENT_COMPLETED));
    gs.notifications.hall_event_completed = Some(event_id);
}

/// Clear an active hall event bound to a floor being deleted; the machine
/// re-arms on the next tick.
pub(crate) fn on_floor_removed(gs: &mut GameState, floor_id: FloorId) {
    if gs
        .hall_event
        .active
        .as_ref()
        .is_some_and(|active| active.floor_id == floor_id)
    {
        gs.hall_event.active = None;
        gs.hall_event.next_trigger_ms = 0;
    }
}
