//! Purchases of perks, decorations, themes, and tower upgrades, plus
//! holiday activation.

use crate::catalog::Catalog;
use crate::error::ActionError;
use crate::state::GameState;

/// Buy a permanent perk with gems.
///
/// # Errors
///
/// `InvalidType` for unknown ids, `WrongState` when already owned,
/// `InsufficientGems`.
pub fn buy_perk(gs: &mut GameState, catalog: &Catalog, perk_id: &str) -> Result<(), ActionError> {
    let def = catalog.perk(perk_id).ok_or(ActionError::InvalidType)?;
    if gs.perks.iter().any(|id| id == perk_id) {
        return Err(ActionError::WrongState);
    }
    if !gs.try_spend_gems(def.cost_gems) {
        return Err(ActionError::InsufficientGems);
    }
    gs.perks.push(def.id.clone());
    Ok(())
}

/// Buy a decoration with stars.
///
/// # Errors
///
/// `InvalidType`, `WrongState` when already owned, `InsufficientFunds`.
pub fn buy_decoration(
    gs: &mut GameState,
    catalog: &Catalog,
    decoration_id: &str,
) -> Result<(), ActionError> {
    let def = catalog
        .decoration(decoration_id)
        .ok_or(ActionError::InvalidType)?;
    if gs.decorations.iter().any(|id| id == decoration_id) {
        return Err(ActionError::WrongState);
    }
    if !gs.try_spend_stars(def.cost_stars) {
        return Err(ActionError::InsufficientFunds);
    }
    gs.decorations.push(def.id.clone());
    Ok(())
}

/// Buy a cosmetic theme with gems.
///
/// # Errors
///
/// `InvalidType`, `WrongState` when already owned, `InsufficientGems`.
pub fn buy_theme(gs: &mut GameState, catalog: &Catalog, theme_id: &str) -> Result<(), ActionError> {
    let def = catalog.theme(theme_id).ok_or(ActionError::InvalidType)?;
    if gs.themes.iter().any(|id| id == theme_id) {
        return Err(ActionError::WrongState);
    }
    if !gs.try_spend_gems(def.cost_gems) {
        return Err(ActionError::InsufficientGems);
    }
    gs.themes.push(def.id.clone());
    Ok(())
}

/// Buy a tower upgrade with gems; offline-hour grants apply immediately.
///
/// # Errors
///
/// `InvalidType`, `WrongState` when already owned, `InsufficientGems`.
pub fn buy_upgrade(
    gs: &mut GameState,
    catalog: &Catalog,
    upgrade_id: &str,
) -> Result<(), ActionError> {
    let def = catalog.upgrade(upgrade_id).ok_or(ActionError::InvalidType)?;
    if gs.upgrades.iter().any(|id| id == upgrade_id) {
        return Err(ActionError::WrongState);
    }
    if !gs.try_spend_gems(def.cost_gems) {
        return Err(ActionError::InsufficientGems);
    }
    gs.upgrades.push(def.id.clone());
    gs.bonus_offline_hours += def.bonus_offline_hours;
    Ok(())
}

/// Activate (or clear) a holiday; the economy pipeline reads the active id.
///
/// # Errors
///
/// `InvalidType` when the holiday id is unknown.
pub fn set_holiday(
    gs: &mut GameState,
    catalog: &Catalog,
    holiday_id: Option<&str>,
) -> Result<(), ActionError> {
    match holiday_id {
        None => {
            gs.active_holiday = None;
            Ok(())
        }
        Some(id) => {
            catalog.holiday(id).ok_or(ActionError::InvalidType)?;
            gs.active_holiday = Some(id.to_string());
            Ok(())
        }
    }
}

/// Summed spawn-rate bonus from owned upgrades.
#[must_use]
pub(crate) fn spawn_rate_bonus(gs: &GameState, catalog: &Catalog) -> f64 {
    gs.upgrades
        .iter()
        .filter_map(|id| catalog.upgrade(id))
        .map(|def| def.spawn_rate_bonus)
        .sum()
}

/// Summed mood bonus from owned decorations.
#[must_use]
pub(crate) fn decoration_mood_bonus(gs: &GameState, catalog: &Catalog) -> i32 {
    gs.decorations
        .iter()
        .filter_map(|id| catalog.decoration(id))
        .map(|def| def.mood_bonus)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (GameState, Catalog) {
        let catalog = Catalog::default_catalog();
        let gs = GameState::new_game(1, &catalog, 0);
        (gs, catalog)
    }

    #[test]
    fn perk_purchase_spends_gems_once() {
        let (mut gs, catalog) = fixture();
        buy_perk(&mut gs, &catalog, "friendly_fines").unwrap();
        assert_eq!(gs.gems, 3);
        assert_eq!(
            buy_perk(&mut gs, &catalog, "friendly_fines"),
            Err(ActionError::WrongState)
        );
        assert_eq!(
            buy_perk(&mut gs, &catalog, "mystery_perk"),
            Err(ActionError::InvalidType)
        );
    }

    #[test]
    fn upgrade_grants_offline_hours() {
        let (mut gs, catalog) = fixture();
        gs.gems = 10;
        buy_upgrade(&mut gs, &catalog, "night_drop_box").unwrap();
        assert_eq!(gs.bonus_offline_hours, 2);
        assert!((spawn_rate_bonus(&gs, &catalog)).abs() < f64::EPSILON);
        buy_upgrade(&mut gs, &catalog, "revolving_door").unwrap();
        assert!((spawn_rate_bonus(&gs, &catalog) - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn decoration_needs_stars() {
        let (mut gs, catalog) = fixture();
        gs.stars = 10;
        assert_eq!(
            buy_decoration(&mut gs, &catalog, "potted_fern"),
            Err(ActionError::InsufficientFunds)
        );
        gs.stars = 500;
        buy_decoration(&mut gs, &catalog, "potted_fern").unwrap();
        assert_eq!(decoration_mood_bonus(&gs, &catalog), 2);
    }

    #[test]
    fn holiday_round_trips() {
        let (mut gs, catalog) = fixture();
        set_holiday(&mut gs, &catalog, Some("founders_day")).unwrap();
        assert_eq!(gs.active_holiday.as_deref(), Some("founders_day"));
        assert_eq!(
            set_holiday(&mut gs, &catalog, Some("flag_day")),
            Err(ActionError::InvalidType)
        );
        set_holiday(&mut gs, &catalog, None).unwrap();
        assert!(gs.active_holiday.is_none());
    }
}
