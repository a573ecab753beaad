//! Floor incidents: occurrence rolls, fix deadlines, and clearing.
//!
//! Incidents gate on tower size, respect a system-wide cooldown after the
//! last fix, and record their fix deadline at creation so repair time is
//! deterministic regardless of later staffing changes.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::constants::{
    INCIDENT_COOLDOWN_MS, INCIDENT_FIXER_CHANCE_DIV, INCIDENT_MIN_STANDARD_FLOORS,
    LOG_INCIDENT_FIXED, LOG_INCIDENT_STARTED, STAT_INCIDENTS_FIXED,
};
use crate::staff::{role_of, tower_has_role};
use crate::state::{FloorId, GameState};

/// Kinds of incident that can strike a floor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum IncidentKind {
    Leak,
    PowerOutage,
    RowdyPatron,
}

/// One live incident on a floor. The fix deadline is fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    pub start_ms: i64,
    pub fix_deadline_ms: i64,
}

/// Advance the incident subsystem: clear due fixes, then roll at most one
/// new incident when the gates allow.
pub(crate) fn tick_incidents<R: Rng>(
    gs: &mut GameState,
    catalog: &Catalog,
    rng: &mut R,
    now_ms: i64,
) {
    clear_due_incidents(gs, catalog, now_ms);
    maybe_start_incident(gs, catalog, rng, now_ms);
}

fn clear_due_incidents(gs: &mut GameState, catalog: &Catalog, now_ms: i64) {
    let mut fixed = 0;
    for floor_index in 0..gs.floors.len() {
        let due: Vec<IncidentKind> = gs.floors[floor_index]
            .incidents
            .iter()
            .filter(|(_, incident)| now_ms >= incident.fix_deadline_ms)
            .map(|(kind, _)| *kind)
            .collect();
        for kind in due {
            let fixer = catalog.incident(kind).map(|def| def.fixer);
            let has_fixer = fixer.is_some_and(|role| tower_has_role(gs, catalog, role));
            if has_fixer {
                gs.floors[floor_index].incidents.remove(&kind);
                fixed += 1;
            }
        }
    }
    if fixed > 0 {
        gs.incident_cooldown_until_ms = now_ms + INCIDENT_COOLDOWN_MS;
        gs.stats.bump(STAT_INCIDENTS_FIXED, fixed);
        for _ in 0..fixed {
            gs.logs.push(String::from(LOG_INCIDENT_FIXED));
        }
    }
}

fn maybe_start_incident<R: Rng>(gs: &mut GameState, catalog: &Catalog, rng: &mut R, now_ms: i64) {
    if gs.standard_floor_count(catalog) < INCIDENT_MIN_STANDARD_FLOORS {
        return;
    }
    if gs.any_incident_active() || now_ms < gs.incident_cooldown_until_ms {
        return;
    }
    let candidates: Vec<FloorId> = gs
        .floors
        .iter()
        .filter(|floor| floor.is_ready() && !floor.stock.is_empty())
        .map(|floor| floor.id)
        .collect();
    for floor_id in candidates {
        for def in &catalog.incidents {
            let fixer_present = floor_has_role(gs, catalog, floor_id, def.fixer);
            let chance = if fixer_present {
                def.chance / INCIDENT_FIXER_CHANCE_DIV
            } else {
                def.chance
            };
            if !rng.gen_bool(chance.clamp(0.0, 1.0)) {
                continue;
            }
            if let Some(floor) = gs.floor_mut(floor_id) {
                floor.incidents.insert(
                    def.kind,
                    Incident {
                        start_ms: now_ms,
                        fix_deadline_ms: now_ms + def.fix_time_ms,
                    },
                );
            }
            gs.notifications.incident_started = Some((floor_id, def.kind));
            gs.logs.push(String::from(LOG_INCIDENT_STARTED));
            // Only one new incident may begin per pass.
            return;
        }
    }
}

fn floor_has_role(
    gs: &GameState,
    catalog: &Catalog,
    floor_id: FloorId,
    role: crate::catalog::StaffRole,
) -> bool {
    gs.floor(floor_id).is_some_and(|floor| {
        floor
            .staff
            .iter()
            .any(|member| role_of(catalog, member) == Some(role))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::floors::{build_floor, complete_due_construction};
    use crate::staff::StaffMember;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn tower_with_floors(count: usize) -> (GameState, Catalog) {
        let catalog = Catalog::default_catalog();
        let mut gs = GameState::new_game(1, &catalog, 0);
        gs.stars = 1_000_000;
        let types = ["board_books", "poetry", "mystery", "sci_fi", "cookbooks"];
        for type_id in types.iter().take(count) {
            build_floor(&mut gs, &catalog, type_id, 0).unwrap();
        }
        complete_due_construction(&mut gs, 1_000_000);
        (gs, catalog)
    }

    #[test]
    fn no_incidents_below_floor_gate() {
        let (mut gs, catalog) = tower_with_floors(3);
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        for tick in 0..5_000 {
            tick_incidents(&mut gs, &catalog, &mut rng, tick * 1_000);
        }
        assert!(!gs.any_incident_active());
    }

    #[test]
    fn incidents_eventually_start_at_gate() {
        let (mut gs, catalog) = tower_with_floors(4);
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        let mut started = false;
        for tick in 0..2_000 {
            tick_incidents(&mut gs, &catalog, &mut rng, tick * 1_000);
            if gs.any_incident_active() {
                started = true;
                break;
            }
        }
        assert!(started);
        assert!(gs.notifications.incident_started.is_some());
        let active: usize = gs.floors.iter().map(|floor| floor.incidents.len()).sum();
        assert_eq!(active, 1, "at most one new incident begins");
    }

    #[test]
    fn fix_deadline_recorded_at_creation() {
        let (mut gs, catalog) = tower_with_floors(4);
        let floor_id = gs.floors[1].id;
        let def = catalog.incident(IncidentKind::Leak).unwrap().clone();
        gs.floor_mut(floor_id).unwrap().incidents.insert(
            IncidentKind::Leak,
            Incident {
                start_ms: 1_000,
                fix_deadline_ms: 1_000 + def.fix_time_ms,
            },
        );
        // No engineer anywhere: the deadline passes but nothing clears.
        clear_due_incidents(&mut gs, &catalog, 1_000 + def.fix_time_ms);
        assert!(gs.any_incident_active());

        let mut engineer = StaffMember::new(99, "engineer", "Sam", 4);
        engineer.assigned_floor = Some(gs.floors[0].id);
        let basement = gs.floors[0].id;
        gs.floor_mut(basement).unwrap().staff.push(engineer);
        clear_due_incidents(&mut gs, &catalog, 1_000 + def.fix_time_ms);
        assert!(!gs.any_incident_active());
        assert_eq!(gs.stats.get(STAT_INCIDENTS_FIXED), 1);
        assert!(gs.incident_cooldown_until_ms > 0);
    }

    #[test]
    fn no_new_incident_while_one_is_active() {
        let (mut gs, catalog) = tower_with_floors(5);
        let floor_id = gs.floors[1].id;
        gs.floor_mut(floor_id).unwrap().incidents.insert(
            IncidentKind::Leak,
            Incident {
                start_ms: 0,
                fix_deadline_ms: i64::MAX,
            },
        );
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        for tick in 0..2_000 {
            tick_incidents(&mut gs, &catalog, &mut rng, tick * 1_000);
        }
        let active: usize = gs.floors.iter().map(|floor| floor.incidents.len()).sum();
        assert_eq!(active, 1);
    }

    #[test]
    fn fixer_presence_reduces_start_chance() {
        let (mut gs, catalog) = tower_with_floors(4);
        let mut with_fixer = gs.clone();
        for floor_index in 0..with_fixer.floors.len() {
            let id = with_fixer.floors[floor_index].id;
            let mut engineer = StaffMember::new(50 + floor_index as u64, "engineer", "Sam", 3);
            engineer.assigned_floor = Some(id);
            with_fixer.floors[floor_index].staff.push(engineer);
            let mut guard = StaffMember::new(80 + floor_index as u64, "security_guard", "Lee", 3);
            guard.assigned_floor = Some(id);
            with_fixer.floors[floor_index].staff.push(guard);
        }

        let mut bare_starts = 0u32;
        let mut staffed_starts = 0u32;
        let mut rng_one = ChaCha20Rng::seed_from_u64(7);
        let mut rng_two = ChaCha20Rng::seed_from_u64(7);
        for tick in 0..3_000 {
            let now = tick * 1_000;
            maybe_start_incident(&mut gs, &catalog, &mut rng_one, now);
            if gs.any_incident_active() {
                bare_starts += 1;
                for floor in &mut gs.floors {
                    floor.incidents.clear();
                }
                gs.incident_cooldown_until_ms = 0;
            }
            maybe_start_incident(&mut with_fixer, &catalog, &mut rng_two, now);
            if with_fixer.any_incident_active() {
                staffed_starts += 1;
                for floor in &mut with_fixer.floors {
                    floor.incidents.clear();
                }
                with_fixer.incident_cooldown_until_ms = 0;
            }
        }
        assert!(bare_starts > staffed_starts * 2, "{bare_starts} vs {staffed_starts}");
    }
}
