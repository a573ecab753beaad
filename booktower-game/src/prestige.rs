//! Prestige reset: archive the tower, keep the meta progression.

use crate::catalog::Catalog;
use crate::constants::{
    LOG_PRESTIGE, MOOD_BASELINE, PRESTIGE_MIN_LEVEL, PRESTIGE_TOKEN_LEVEL_DIV, STARTING_STARS,
    STAT_PRESTIGES,
};
use crate::error::ActionError;
use crate::floors::Floor;
use crate::state::GameState;

/// Reset the tower in exchange for prestige tokens.
///
/// The tower (floors, staff, readers, lobby, missions, stars, level) resets
/// to a fresh start; stats, achievements, gems, unlock lists, loyalty, and
/// offline bonuses persist. Each `PRESTIGE_TOKEN_LEVEL_DIV` levels earned
/// converts to one token feeding the perk earning stage.
///
/// # Errors
///
/// `WrongState` below the minimum level.
pub fn prestige(gs: &mut GameState, catalog: &Catalog, now_ms: i64) -> Result<u32, ActionError> {
    if gs.level < PRESTIGE_MIN_LEVEL {
        return Err(ActionError::WrongState);
    }
    let tokens_gained = gs.level / PRESTIGE_TOKEN_LEVEL_DIV;
    gs.prestige_tokens = gs.prestige_tokens.saturating_add(tokens_gained);

    gs.floors.clear();
    gs.next_floor_id = 0;
    if let Some(def) = catalog.floor_type(&catalog.settings.basement_type) {
        let id = gs.alloc_floor_id();
        gs.floors.push(Floor::new_ready(id, def, now_ms));
    }
    gs.readers.clear();
    gs.unassigned_staff.clear();
    gs.lobby.applicants.clear();
    gs.lobby.vips.clear();
    gs.mission.active = None;
    gs.find_mission.active = None;
    gs.mini_quest.active = None;
    gs.hall_event.active = None;
    gs.star_event.active = None;
    gs.incident_cooldown_until_ms = 0;
    gs.stars = STARTING_STARS;
    gs.xp = 0;
    gs.level = 1;
    gs.mood = MOOD_BASELINE;
    gs.rush_hour.active_until_ms = 0;
    gs.active_holiday = None;
    gs.prime_timers(now_ms);
    gs.last_tick_ms = now_ms;

    gs.stats.bump(STAT_PRESTIGES, 1);
    gs.logs.push(String::from(LOG_PRESTIGE));
    Ok(tokens_gained)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::STAT_READERS_SERVED;
    use crate::floors::build_floor;

    #[test]
    fn prestige_requires_minimum_level() {
        let catalog = Catalog::default_catalog();
        let mut gs = GameState::new_game(1, &catalog, 0);
        gs.level = PRESTIGE_MIN_LEVEL - 1;
        assert_eq!(prestige(&mut gs, &catalog, 0), Err(ActionError::WrongState));
    }

    #[test]
    fn prestige_resets_tower_and_keeps_meta() {
        let catalog = Catalog::default_catalog();
        let mut gs = GameState::new_game(1, &catalog, 0);
        build_floor(&mut gs, &catalog, "board_books", 0).unwrap();
        gs.level = 27;
        gs.gems = 9;
        gs.perks.push(String::from("golden_bookmarks"));
        gs.stats.bump(STAT_READERS_SERVED, 42);

        let tokens = prestige(&mut gs, &catalog, 1_000).unwrap();
        assert_eq!(tokens, 2);
        assert_eq!(gs.prestige_tokens, 2);
        assert_eq!(gs.level, 1);
        assert_eq!(gs.stars, STARTING_STARS);
        assert_eq!(gs.floors.len(), 1);
        assert_eq!(gs.floors[0].type_id, "basement");
        assert_eq!(gs.gems, 9, "gems persist");
        assert_eq!(gs.perks.len(), 1, "unlocks persist");
        assert_eq!(gs.stats.get(STAT_READERS_SERVED), 42, "stats persist");
        assert_eq!(gs.stats.get(STAT_PRESTIGES), 1);
    }
}
