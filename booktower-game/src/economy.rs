//! Multi-stage reward pipeline for checkouts.
//!
//! The final reward composes an ordered chain of multipliers, truncating to
//! an integer after every stage. The per-stage truncation is load-bearing:
//! cumulative small rewards round differently than a single final floor, and
//! downstream accounting depends on the staged values.

use rand::Rng;

use crate::catalog::Catalog;
use crate::constants::{
    GEM_BONUS_CHANCE, LOYALTY_BONUS_PER_LEVEL, MOOD_BONUS_RATE, MOOD_HIGH_THRESHOLD,
    MOOD_LOW_THRESHOLD, PRESTIGE_EARNING_BONUS, TRASH_MAX, TRASH_PENALTY_FREE_LIMIT,
};
use crate::numbers::{floor_f64_to_i64, i64_to_f64};
use crate::spawn::Reader;
use crate::state::GameState;

/// One applied pipeline stage: label, multiplier, value after truncation.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardStage {
    pub label: &'static str,
    pub multiplier: f64,
    pub value_after: i64,
}

/// Full account of a resolved reward.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardBreakdown {
    pub base: i64,
    pub stages: Vec<RewardStage>,
    pub final_stars: i64,
    /// XP earned equals the final reward.
    pub xp: i64,
}

fn apply_stage(stages: &mut Vec<RewardStage>, value: i64, label: &'static str, mult: f64) -> i64 {
    let after = floor_f64_to_i64(i64_to_f64(value) * mult).max(0);
    stages.push(RewardStage {
        label,
        multiplier: mult,
        value_after: after,
    });
    after
}

fn synergy_multiplier(gs: &GameState, catalog: &Catalog) -> f64 {
    let present = gs.ready_floor_type_ids();
    catalog
        .synergies
        .iter()
        .filter(|synergy| {
            synergy
                .required_floor_types
                .iter()
                .all(|required| present.iter().any(|type_id| *type_id == required))
        })
        .map(|synergy| synergy.multiplier)
        .product()
}

fn perk_multiplier(gs: &GameState, catalog: &Catalog) -> f64 {
    let perk_bonus: f64 = gs
        .perks
        .iter()
        .filter_map(|id| catalog.perk(id))
        .map(|perk| perk.earning_bonus)
        .sum();
    let prestige_bonus = PRESTIGE_EARNING_BONUS * f64::from(gs.prestige_tokens);
    1.0 + perk_bonus + prestige_bonus
}

fn trash_multiplier(trash: u8) -> f64 {
    if trash <= TRASH_PENALTY_FREE_LIMIT {
        return 1.0;
    }
    let over = f64::from(trash - TRASH_PENALTY_FREE_LIMIT);
    let span = f64::from(TRASH_MAX - TRASH_PENALTY_FREE_LIMIT);
    (1.0 - over / span).max(0.0)
}

/// Resolve the reward for a completed checkout.
///
/// `books_taken` is the stock actually decremented; the base reward is the
/// category earning rate times that count, already computed by the caller.
#[must_use]
pub fn resolve_reward(
    gs: &GameState,
    catalog: &Catalog,
    reader: &Reader,
    base: i64,
    now_ms: i64,
) -> RewardBreakdown {
    let mut stages = Vec::with_capacity(9);
    let mut value = base.max(0);

    let event_mult = gs
        .star_event
        .active
        .as_ref()
        .filter(|event| now_ms < event.ends_ms)
        .map_or(1.0, |event| event.multiplier);
    value = apply_stage(&mut stages, value, "event", event_mult);

    let hall_mult = gs
        .hall_event
        .active
        .as_ref()
        .filter(|event| now_ms < event.ends_ms && event.floor_id == reader.target_floor)
        .map_or(1.0, |event| event.bonus_mult);
    value = apply_stage(&mut stages, value, "hall-event", hall_mult);

    value = apply_stage(&mut stages, value, "synergy", synergy_multiplier(gs, catalog));

    let vip_mult = gs
        .floor(reader.target_floor)
        .and_then(|floor| floor.vip_boost)
        .filter(|boost| now_ms < boost.ends_ms)
        .map_or(1.0, |boost| boost.mult);
    value = apply_stage(&mut stages, value, "vip-boost", vip_mult);

    let mood_mult = if gs.mood >= MOOD_HIGH_THRESHOLD {
        1.0 + MOOD_BONUS_RATE
    } else if gs.mood < MOOD_LOW_THRESHOLD {
        1.0 - MOOD_BONUS_RATE
    } else {
        1.0
    };
    value = apply_stage(&mut stages, value, "mood", mood_mult);

    let trash = gs.floor(reader.target_floor).map_or(0, |floor| floor.trash);
    value = apply_stage(&mut stages, value, "trash", trash_multiplier(trash));

    value = apply_stage(&mut stages, value, "perks", perk_multiplier(gs, catalog));

    let holiday_mult = gs
        .active_holiday
        .as_deref()
        .and_then(|id| catalog.holiday(id))
        .map_or(1.0, |holiday| holiday.multiplier);
    value = apply_stage(&mut stages, value, "holiday", holiday_mult);

    let loyalty_mult = 1.0 + LOYALTY_BONUS_PER_LEVEL * f64::from(gs.loyalty_level);
    value = apply_stage(&mut stages, value, "loyalty", loyalty_mult);

    RewardBreakdown {
        base: base.max(0),
        stages,
        final_stars: value,
        xp: value,
    }
}

/// Roll the independent secondary-currency bonus: under an active star event
/// or high tower mood, a configurable fraction of checkouts award one gem.
pub fn maybe_gem_bonus<R: Rng>(gs: &mut GameState, rng: &mut R, now_ms: i64) -> bool {
    let event_active = gs
        .star_event
        .active
        .as_ref()
        .is_some_and(|event| now_ms < event.ends_ms);
    if !event_active && gs.mood < MOOD_HIGH_THRESHOLD {
        return false;
    }
    if !rng.gen_bool(GEM_BONUS_CHANCE) {
        return false;
    }
    gs.gems = gs.gems.saturating_add(1);
    true
}
