//! Achievement unlocks and the loyalty (library card) tier.
//!
//! Monotonic stat counters drive one-way unlock transitions; an unlocked
//! achievement is never re-locked, even if the catalog definition changes.

use crate::catalog::Catalog;
use crate::constants::{
    LOG_ACHIEVEMENT_UNLOCKED, LOYALTY_MAX_LEVEL, LOYALTY_READERS_PER_LEVEL, STAT_READERS_SERVED,
};
use crate::state::{AchievementProgress, GameState};

/// Ensure every catalog achievement has a progress entry, preserving any
/// unlocks already recorded. Entries for retired ids are kept as-is.
pub(crate) fn merge_achievements(gs: &mut GameState, catalog: &Catalog) {
    for def in &catalog.achievements {
        if !gs.achievements.iter().any(|progress| progress.id == def.id) {
            gs.achievements.push(AchievementProgress {
                id: def.id.clone(),
                unlocked: false,
            });
        }
    }
}

/// Unlock achievements whose stat requirement is met, crediting rewards.
pub(crate) fn check_unlocks(gs: &mut GameState, catalog: &Catalog) {
    for def in &catalog.achievements {
        let met = gs.stats.get(&def.stat_key) >= def.requirement;
        if !met {
            continue;
        }
        let Some(progress) = gs
            .achievements
            .iter_mut()
            .find(|progress| progress.id == def.id)
        else {
            continue;
        };
        if progress.unlocked {
            continue;
        }
        progress.unlocked = true;
        gs.earn_stars(def.reward_stars);
        gs.notifications.achievement_unlocked = Some(def.id.clone());
        gs.logs.push(String::from(LOG_ACHIEVEMENT_UNLOCKED));
    }
}

/// Recompute the loyalty tier from lifetime readers served. Monotonic
/// because the underlying counter is.
pub(crate) fn update_loyalty(gs: &mut GameState) {
    let served = gs.stats.get(STAT_READERS_SERVED);
    let tier = u32::try_from(served / LOYALTY_READERS_PER_LEVEL).unwrap_or(LOYALTY_MAX_LEVEL);
    gs.loyalty_level = tier.min(LOYALTY_MAX_LEVEL).max(gs.loyalty_level);
}
