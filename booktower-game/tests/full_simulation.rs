//! Long-running simulation sweep asserting the structural invariants the
//! engine promises after every mutation.

use booktower_game::{
    Catalog, FloorStatus, GameState, TowerSession, constants, floors, staff,
};

const TICK_MS: i64 = 1_000;
const SIM_TICKS: i64 = 3_600; // one simulated hour at one-second ticks

fn assert_invariants(gs: &GameState, catalog: &Catalog) {
    assert!(gs.stars >= 0, "stars must never go negative");
    assert!(gs.gems >= 0, "gems must never go negative");
    assert!((0..=100).contains(&gs.mood));
    assert!(
        gs.lobby.applicants.len() + gs.lobby.vips.len() <= 3,
        "shared lobby cap"
    );
    for floor in &gs.floors {
        assert!(floor.trash <= 100);
        let Some(def) = catalog.floor_type(&floor.type_id) else {
            panic!("floor references unknown type {}", floor.type_id);
        };
        assert!(floor.staff.len() <= def.staff_slots as usize);
        for (index, slot) in floor.stock.iter().enumerate() {
            if let Some(category) = def.categories.get(index) {
                let cap = floors::effective_max_stock(category, floor.upgrade_level);
                assert!(
                    slot.current_stock <= cap,
                    "stock {} above cap {cap}",
                    slot.current_stock
                );
            }
        }
        for member in &floor.staff {
            assert_eq!(member.assigned_floor, Some(floor.id), "back-reference");
        }
    }
    for member in &gs.unassigned_staff {
        assert_eq!(member.assigned_floor, None);
    }
}

#[test]
fn hour_long_run_holds_every_invariant() {
    let catalog = Catalog::default_catalog();
    let mut session = TowerSession::new(GameState::new_game(0xB00C, &catalog, 0));

    // Found the tower: five standard floors, generous funds.
    session.with_state_mut(|gs| gs.stars = 2_000_000);
    for type_id in ["board_books", "poetry", "mystery", "sci_fi", "cookbooks"] {
        session.with_state_mut(|gs| {
            floors::build_floor(gs, &catalog, type_id, 0).unwrap();
        });
    }

    let mut now = 0;
    for _ in 0..SIM_TICKS {
        now += TICK_MS;
        session.tick(&catalog, now);

        // Keep the tower running the way a player would: hire whoever shows
        // up into the first open slot, restock empty unlocked shelves.
        session.with_state_mut(|gs| {
            while let Some(applicant) = gs.lobby.applicants.first().cloned() {
                let target = gs
                    .floors
                    .iter()
                    .filter(|floor| floor.is_ready())
                    .find(|floor| {
                        catalog.floor_type(&floor.type_id).is_some_and(|def| {
                            floor.staff.len() < def.staff_slots as usize
                        })
                    })
                    .map(|floor| floor.id);
                let Some(floor_id) = target else { break };
                if staff::hire_staff(gs, &catalog, floor_id, applicant.id).is_err() {
                    break;
                }
            }
            let floor_ids: Vec<_> = gs.floors.iter().map(|floor| floor.id).collect();
            for floor_id in floor_ids {
                let slots = gs.floor(floor_id).map_or(0, |floor| floor.stock.len());
                for index in 0..slots {
                    let needs_stock = gs.floor(floor_id).is_some_and(|floor| {
                        floor.stock[index].current_stock == 0
                            && floor.stock[index].restocking.is_none()
                    });
                    if needs_stock {
                        let _ = floors::start_restock(gs, &catalog, floor_id, index, now);
                    }
                }
            }
        });

        assert_invariants(session.state(), &catalog);

        // Singleton machines never double up by construction; the invariant
        // worth checking is that active instances carry sane windows.
        let gs = session.state();
        if let Some(active) = &gs.mission.active {
            assert!(active.progress <= active.target);
        }
        if let Some(active) = &gs.hall_event.active {
            assert!(active.progress <= active.target_checkouts);
        }
    }

    let gs = session.state();
    assert!(
        gs.floors.iter().all(|floor| floor.status == FloorStatus::Ready),
        "all construction completed within the hour"
    );
    assert!(
        gs.stats.get(constants::STAT_READERS_SERVED) > 0,
        "readers were served over a simulated hour"
    );
    assert!(
        gs.stats.get(constants::STAT_STARS_EARNED) > 0,
        "checkouts earned stars"
    );
    assert!(
        gs.stats.get(constants::STAT_STAFF_HIRED) > 0,
        "lobby applicants were hired"
    );
}

#[test]
fn same_seed_runs_identically() {
    let catalog = Catalog::default_catalog();
    let mut one = TowerSession::new(GameState::new_game(7, &catalog, 0));
    let mut two = TowerSession::new(GameState::new_game(7, &catalog, 0));
    for session in [&mut one, &mut two] {
        session.with_state_mut(|gs| {
            gs.stars = 50_000;
            floors::build_floor(gs, &catalog, "board_books", 0).unwrap();
        });
    }
    let mut now = 0;
    for _ in 0..600 {
        now += TICK_MS;
        one.tick(&catalog, now);
        two.tick(&catalog, now);
    }
    assert_eq!(one.state(), two.state());
}

#[test]
fn ticking_backward_or_in_place_changes_nothing() {
    let catalog = Catalog::default_catalog();
    let mut session = TowerSession::new(GameState::new_game(3, &catalog, 5_000));
    session.tick(&catalog, 65_000);
    let snapshot = session.state().clone();
    session.tick(&catalog, 65_000);
    assert_eq!(session.state(), &snapshot);
    session.tick(&catalog, 60_000);
    assert_eq!(session.state(), &snapshot);
}
