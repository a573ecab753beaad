//! Tick orchestrator: the single mutating entry point besides player
//! actions.
//!
//! Subsystems run in a fixed order every invocation; "waiting" is always a
//! stored future timestamp compared against `now_ms`, never a blocking call.
//! A tick with zero elapsed wall-clock time is a strict no-op.

use rand::Rng;

use crate::achievements;
use crate::catalog::Catalog;
use crate::constants::{
    CLEANING_INTERVAL_MS, DONATION_MAX_GAP_MS, DONATION_MIN_GAP_MS, LEVEL_UP_GEM_REWARD,
    LOG_DONATION_RECEIVED, LOG_LEVEL_UP, LOG_READER_CHECKOUT, LOG_RUSH_HOUR, LOG_VIP_ARRIVED,
    MOOD_BASELINE, MOOD_INCIDENT_PENALTY, MOOD_MAX, MOOD_STEP_INTERVAL_MS, READER_SPAWN_BASE_MS,
    RUSH_HOUR_DURATION_MS, RUSH_HOUR_MAX_GAP_MS, RUSH_HOUR_MIN_GAP_MS, RUSH_HOUR_SPAWN_DIV,
    STAT_BOOKS_CHECKED_OUT, STAT_DONATIONS_RECEIVED, STAT_READERS_SERVED, STAT_VIPS_SERVED,
    TRASH_PER_CHECKOUT,
};
use crate::economy;
use crate::events;
use crate::floors::{complete_due_construction, complete_due_restocks, effective_earning_rate};
use crate::incidents;
use crate::lobby;
use crate::missions;
use crate::numbers::{floor_f64_to_i64, i64_to_f64};
use crate::rng::RngBundle;
use crate::spawn::{self, ElevatorState};
use crate::staff::role_of;
use crate::state::{GameState, ReaderId};
use crate::store;
use crate::weather;

/// Summary of one tick invocation, for the consumer and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickOutcome {
    pub construction_completed: u32,
    pub restocks_completed: u32,
    pub checkouts: u32,
    pub readers_spawned: u32,
    pub stars_earned: i64,
}

/// Advance the simulation to `now_ms`.
///
/// The caller (engine facade) follows every tick with a snapshot write.
pub fn tick(gs: &mut GameState, catalog: &Catalog, rngs: &RngBundle, now_ms: i64) -> TickOutcome {
    if now_ms <= gs.last_tick_ms {
        return TickOutcome::default();
    }
    let mut outcome = TickOutcome::default();

    // 1. Construction and restock completion.
    outcome.construction_completed = complete_due_construction(gs, now_ms);
    outcome.restocks_completed = complete_due_restocks(gs, catalog, now_ms);
    expire_vip_boosts(gs, now_ms);

    // 2. Visitor elevator and checkout resolution.
    resolve_elevator_arrivals(gs, catalog, now_ms);
    resolve_checkouts(gs, catalog, rngs, now_ms, &mut outcome);

    // 3. Leveling.
    apply_leveling(gs);

    // 4. Rush hour.
    tick_rush_hour(gs, &mut *rngs.spawn(), now_ms);

    // 5. Spawn rolls: readers, lobby arrivals, donations.
    outcome.readers_spawned = roll_reader_spawn(gs, catalog, rngs, now_ms);
    lobby::roll_applicant_arrival(gs, catalog, &mut *rngs.lobby(), now_ms);
    lobby::roll_vip_arrival(gs, catalog, &mut *rngs.lobby(), now_ms);
    roll_donation(gs, catalog, &mut *rngs.economy(), now_ms);

    // 6. Lobby queue expiry.
    gs.lobby.expire(now_ms);

    // 7. Mission, event, and incident lifecycles.
    missions::tick_missions(gs, catalog, &mut *rngs.mission(), now_ms);
    events::tick_events(gs, catalog, &mut *rngs.mission(), now_ms);
    incidents::tick_incidents(gs, catalog, &mut *rngs.incident(), now_ms);

    // 8. Weather and season.
    weather::process_weather(gs, &catalog.weather, &mut *rngs.weather(), now_ms);

    // 9. Mood drift.
    update_mood(gs, catalog, now_ms);

    // 10. Cleaning.
    run_cleaning(gs, catalog, now_ms);

    // 11. Achievements and loyalty.
    achievements::check_unlocks(gs, catalog);
    achievements::update_loyalty(gs);

    gs.last_tick_ms = now_ms;
    outcome
}

fn expire_vip_boosts(gs: &mut GameState, now_ms: i64) {
    for floor in &mut gs.floors {
        if floor.vip_boost.is_some_and(|boost| now_ms >= boost.ends_ms) {
            floor.vip_boost = None;
        }
    }
}

fn resolve_elevator_arrivals(gs: &mut GameState, catalog: &Catalog, now_ms: i64) {
    let arrivals: Vec<ReaderId> = gs
        .readers
        .iter()
        .filter(|reader| reader.elevator == ElevatorState::Waiting && now_ms >= reader.arrive_ms)
        .map(|reader| reader.id)
        .collect();
    for reader_id in arrivals {
        let Some(reader) = gs.readers.iter_mut().find(|reader| reader.id == reader_id) else {
            continue;
        };
        reader.elevator = ElevatorState::Arrived;
        let floor_id = reader.target_floor;
        let vip_ability = reader.vip_ability;
        if let Some(ability) = vip_ability {
            spawn::apply_vip_arrival(gs, catalog, floor_id, ability, now_ms);
            gs.logs.push(String::from(LOG_VIP_ARRIVED));
        }
    }
}

fn resolve_checkouts(
    gs: &mut GameState,
    catalog: &Catalog,
    rngs: &RngBundle,
    now_ms: i64,
    outcome: &mut TickOutcome,
) {
    let due: Vec<ReaderId> = gs
        .readers
        .iter()
        .filter(|reader| now_ms >= reader.checkout_ms)
        .map(|reader| reader.id)
        .collect();
    for reader_id in due {
        let Some(index) = gs.readers.iter().position(|reader| reader.id == reader_id) else {
            continue;
        };
        let reader = gs.readers.remove(index);

        let taken = gs
            .floor_mut(reader.target_floor)
            .filter(|floor| floor.is_ready())
            .and_then(|floor| floor.stock.get_mut(reader.category_index))
            .map_or(0, |slot| {
                let taken = slot.current_stock.min(reader.books);
                slot.current_stock -= taken;
                taken
            });
        if taken == 0 {
            // The shelf drained before checkout; the reader leaves quietly.
            continue;
        }

        let rate = gs
            .floor(reader.target_floor)
            .and_then(|floor| {
                catalog
                    .floor_type(&floor.type_id)
                    .and_then(|def| def.categories.get(reader.category_index))
                    .map(|category| effective_earning_rate(category, floor.upgrade_level))
            })
            .unwrap_or(0);
        let base = rate.saturating_mul(i64::from(taken));
        let breakdown = economy::resolve_reward(gs, catalog, &reader, base, now_ms);
        gs.earn_stars(breakdown.final_stars);
        gs.xp = gs.xp.saturating_add(breakdown.xp);
        outcome.stars_earned += breakdown.final_stars;
        outcome.checkouts += 1;

        if let Some(floor) = gs.floor_mut(reader.target_floor) {
            floor.add_trash(TRASH_PER_CHECKOUT);
        }
        gs.stats.bump(STAT_READERS_SERVED, 1);
        gs.stats.bump(STAT_BOOKS_CHECKED_OUT, u64::from(taken));
        if reader.is_vip {
            gs.stats.bump(STAT_VIPS_SERVED, 1);
        }
        gs.logs.push(String::from(LOG_READER_CHECKOUT));

        economy::maybe_gem_bonus(gs, &mut *rngs.economy(), now_ms);
        missions::on_checkout(
            gs,
            &mut *rngs.mission(),
            reader.target_floor,
            reader.category_index,
            now_ms,
        );
        events::on_checkout(gs, catalog, &mut *rngs.mission(), reader.target_floor, now_ms);
    }
}

fn apply_leveling(gs: &mut GameState) {
    loop {
        let needed = GameState::xp_to_next(gs.level);
        if gs.xp < needed {
            break;
        }
        gs.xp -= needed;
        gs.level += 1;
        gs.gems = gs.gems.saturating_add(LEVEL_UP_GEM_REWARD);
        gs.notifications.level_up = Some(gs.level);
        gs.logs.push(String::from(LOG_LEVEL_UP));
    }
}

fn tick_rush_hour<R: Rng>(gs: &mut GameState, rng: &mut R, now_ms: i64) {
    if gs.rush_hour.is_active(now_ms) || now_ms < gs.rush_hour.next_ms {
        return;
    }
    gs.rush_hour.active_until_ms = now_ms + RUSH_HOUR_DURATION_MS;
    gs.rush_hour.next_ms = now_ms + rng.gen_range(RUSH_HOUR_MIN_GAP_MS..=RUSH_HOUR_MAX_GAP_MS);
    gs.notifications.rush_hour_until_ms = Some(gs.rush_hour.active_until_ms);
    gs.logs.push(String::from(LOG_RUSH_HOUR));
}

fn roll_reader_spawn(gs: &mut GameState, catalog: &Catalog, rngs: &RngBundle, now_ms: i64) -> u32 {
    if now_ms < gs.timers.next_reader_ms {
        return 0;
    }
    let weather_mult = catalog.weather.spawn_interval_mult(gs.weather.today);
    let upgrade_mult = 1.0 / (1.0 + store::spawn_rate_bonus(gs, catalog));
    let mut interval =
        floor_f64_to_i64(i64_to_f64(READER_SPAWN_BASE_MS) * weather_mult * upgrade_mult).max(500);
    if gs.rush_hour.is_active(now_ms) {
        interval /= RUSH_HOUR_SPAWN_DIV;
    }
    gs.timers.next_reader_ms = now_ms + interval;

    let spawned = spawn::spawn_reader(gs, catalog, &mut *rngs.spawn(), now_ms);
    u32::from(spawned.is_some())
}

fn roll_donation<R: Rng>(gs: &mut GameState, catalog: &Catalog, rng: &mut R, now_ms: i64) {
    if now_ms < gs.timers.next_donation_ms {
        return;
    }
    gs.timers.next_donation_ms = now_ms + rng.gen_range(DONATION_MIN_GAP_MS..=DONATION_MAX_GAP_MS);
    let Some(source) = spawn::choose_weighted(rng, &catalog.donation_sources, |_| 1.0) else {
        return;
    };
    gs.earn_stars(source.stars);
    gs.stats.bump(STAT_DONATIONS_RECEIVED, 1);
    gs.logs.push(String::from(LOG_DONATION_RECEIVED));
}

fn update_mood(gs: &mut GameState, catalog: &Catalog, now_ms: i64) {
    if now_ms < gs.timers.next_mood_ms {
        return;
    }
    gs.timers.next_mood_ms = now_ms + MOOD_STEP_INTERVAL_MS;

    let incident_count = gs
        .floors
        .iter()
        .map(|floor| i32::try_from(floor.incidents.len()).unwrap_or(i32::MAX))
        .sum::<i32>();
    let floor_count = gs.floors.len().max(1);
    let avg_trash = gs
        .floors
        .iter()
        .map(|floor| i32::from(floor.trash))
        .sum::<i32>()
        / i32::try_from(floor_count).unwrap_or(1);
    let target = MOOD_BASELINE + store::decoration_mood_bonus(gs, catalog)
        + catalog.weather.mood_delta(gs.weather.today)
        - incident_count * MOOD_INCIDENT_PENALTY
        - avg_trash / 10;
    let target = target.clamp(0, MOOD_MAX);
    gs.mood += (target - gs.mood).signum();
    gs.mood = gs.mood.clamp(0, MOOD_MAX);
}

fn run_cleaning(gs: &mut GameState, catalog: &Catalog, now_ms: i64) {
    if now_ms < gs.timers.next_cleaning_ms {
        return;
    }
    gs.timers.next_cleaning_ms = now_ms + CLEANING_INTERVAL_MS;

    let janitor_power: u32 = gs
        .floors
        .iter()
        .flat_map(|floor| floor.staff.iter())
        .filter(|member| role_of(catalog, member) == Some(crate::catalog::StaffRole::Janitor))
        .map(|member| u32::from(member.skill))
        .sum();
    if janitor_power == 0 {
        return;
    }
    let sweep = u8::try_from(janitor_power.min(100)).unwrap_or(100);
    for floor in &mut gs.floors {
        floor.remove_trash(sweep);
    }
}
