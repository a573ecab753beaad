//! Weighted spawn engine: the shared weighted-choice primitive and the
//! visitor creation paths built on it.
//!
//! Spawn attempts that find no eligible target return nothing and mutate
//! nothing; an empty tower is not an error.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, FloorKind, ReaderArchetypeDef, VipAbility};
use crate::constants::{
    CHECKOUT_MAX_MS, CHECKOUT_MIN_MS, CROWD_DRAW_SPAWN_CUT_MS, ELEVATOR_RIDE_MS,
    PREFERRED_FLOOR_PROB, VIP_BOOST_DURATION_MS, VIP_BOOST_MULT,
};
use crate::error::ActionError;
use crate::floors::{VipBoost, effective_earning_rate, effective_max_stock};
use crate::state::{FloorId, GameState, LobbyEntryId, ReaderId};

/// Select a candidate by weight: uniform draw in `[0, total)`, cumulative
/// scan, first candidate as the floating-point fallback. Candidates with
/// non-positive weight are skipped; returns `None` when no weight is
/// positive.
pub fn choose_weighted<'a, T, R, F>(rng: &mut R, items: &'a [T], weight: F) -> Option<&'a T>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> f64,
{
    let total: f64 = items.iter().map(&weight).filter(|w| *w > 0.0).sum();
    if total <= 0.0 {
        return None;
    }
    let roll = rng.gen_range(0.0..total);
    let mut cumulative = 0.0;
    for item in items {
        let item_weight = weight(item);
        if item_weight <= 0.0 {
            continue;
        }
        cumulative += item_weight;
        if roll < cumulative {
            return Some(item);
        }
    }
    items.first()
}

/// Weighted selection against a unit roll: weights are fractions of one
/// draw and may sum below 1. A roll landing past the last weight falls back
/// to the first candidate.
pub fn choose_weighted_in_unit<'a, T, R, F>(rng: &mut R, items: &'a [T], weight: F) -> Option<&'a T>
where
    R: Rng + ?Sized,
    F: Fn(&T) -> f64,
{
    if items.is_empty() {
        return None;
    }
    let roll = rng.gen_range(0.0..1.0);
    let mut cumulative = 0.0;
    for item in items {
        let item_weight = weight(item);
        if item_weight <= 0.0 {
            continue;
        }
        cumulative += item_weight;
        if roll < cumulative {
            return Some(item);
        }
    }
    items.first()
}

/// Elevator progress of a visitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ElevatorState {
    #[default]
    Waiting,
    Arrived,
}

/// A transient visitor. Created by the spawn engine, destroyed exactly once
/// by the tick at `checkout_ms`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reader {
    pub id: ReaderId,
    pub archetype_id: String,
    pub target_floor: FloorId,
    pub category_index: usize,
    pub arrive_ms: i64,
    pub checkout_ms: i64,
    /// Spawn-time earning estimate (`earning_rate x books`).
    pub earning_amount: i64,
    pub books: u32,
    #[serde(default)]
    pub elevator: ElevatorState,
    #[serde(default)]
    pub is_vip: bool,
    #[serde(default)]
    pub vip_ability: Option<VipAbility>,
}

/// Floors a visitor may be routed to: ready, not buried in trash, no active
/// incidents, and structurally able to stock books.
fn eligible_floor_ids(gs: &GameState, catalog: &Catalog) -> Vec<FloorId> {
    gs.floors
        .iter()
        .filter(|floor| floor.is_operational())
        .filter(|floor| {
            catalog
                .floor_type(&floor.type_id)
                .is_some_and(|def| def.kind == FloorKind::Standard && !def.categories.is_empty())
        })
        .map(|floor| floor.id)
        .collect()
}

/// Categories on a floor that can serve a checkout right now.
fn sellable_categories(gs: &GameState, floor_id: FloorId) -> Vec<usize> {
    gs.floor(floor_id).map_or_else(Vec::new, |floor| {
        floor
            .stock
            .iter()
            .enumerate()
            .filter(|(index, slot)| slot.current_stock > 0 && floor.category_unlocked(*index))
            .map(|(index, _)| index)
            .collect()
    })
}

fn pick_target<R: Rng>(
    gs: &GameState,
    catalog: &Catalog,
    archetype: &ReaderArchetypeDef,
    rng: &mut R,
) -> Option<(FloorId, usize)> {
    let eligible = eligible_floor_ids(gs, catalog);
    if eligible.is_empty() {
        return None;
    }

    let mut pool = eligible.clone();
    if !archetype.preferred_floor_types.is_empty() && rng.gen_bool(PREFERRED_FLOOR_PROB) {
        let preferred: Vec<FloorId> = eligible
            .iter()
            .copied()
            .filter(|id| {
                gs.floor(*id)
                    .is_some_and(|floor| archetype.preferred_floor_types.contains(&floor.type_id))
            })
            .collect();
        if !preferred.is_empty() {
            pool = preferred;
        }
    }

    let floor_id = *choose_weighted(rng, &pool, |_| 1.0)?;
    let categories = sellable_categories(gs, floor_id);
    let category = *choose_weighted(rng, &categories, |_| 1.0)?;
    Some((floor_id, category))
}

fn make_reader<R: Rng>(
    gs: &mut GameState,
    catalog: &Catalog,
    archetype: &ReaderArchetypeDef,
    rng: &mut R,
    now_ms: i64,
) -> Option<ReaderId> {
    let (floor_id, category_index) = pick_target(gs, catalog, archetype, rng)?;
    let floor = gs.floor(floor_id)?;
    let def = catalog.floor_type(&floor.type_id)?;
    let category = def.categories.get(category_index)?;
    let rate = effective_earning_rate(category, floor.upgrade_level);
    let books = rng.gen_range(archetype.books_min..=archetype.books_max.max(archetype.books_min));
    let id = gs.alloc_reader_id();
    gs.readers.push(Reader {
        id,
        archetype_id: archetype.id.clone(),
        target_floor: floor_id,
        category_index,
        arrive_ms: now_ms + ELEVATOR_RIDE_MS,
        checkout_ms: now_ms + rng.gen_range(CHECKOUT_MIN_MS..=CHECKOUT_MAX_MS),
        earning_amount: rate.saturating_mul(i64::from(books)),
        books,
        elevator: ElevatorState::Waiting,
        is_vip: false,
        vip_ability: None,
    });
    Some(id)
}

/// Spawn one regular reader. Returns `None` without mutation when no
/// archetype or eligible target exists.
pub fn spawn_reader<R: Rng>(
    gs: &mut GameState,
    catalog: &Catalog,
    rng: &mut R,
    now_ms: i64,
) -> Option<ReaderId> {
    let archetype =
        choose_weighted(rng, &catalog.reader_archetypes, |def| f64::from(def.weight))?.clone();
    make_reader(gs, catalog, &archetype, rng, now_ms)
}

/// Admit a waiting VIP guest: routes them like a reader and tags the VIP
/// ability for arrival.
///
/// # Errors
///
/// `InvalidId` for unknown guests, `NoEligibleTarget` when no floor can
/// receive them (the guest keeps waiting).
pub fn admit_vip<R: Rng>(
    gs: &mut GameState,
    catalog: &Catalog,
    rng: &mut R,
    guest_id: LobbyEntryId,
    now_ms: i64,
) -> Result<ReaderId, ActionError> {
    let guest_index = gs
        .lobby
        .vips
        .iter()
        .position(|guest| guest.id == guest_id)
        .ok_or(ActionError::InvalidId)?;
    let vip_type = catalog
        .vip_type(&gs.lobby.vips[guest_index].vip_type_id)
        .ok_or(ActionError::InvalidType)?;
    let ability = vip_type.ability;

    // VIPs route like the broadest archetype: no preference restriction.
    let archetype = ReaderArchetypeDef {
        id: vip_type.id.clone(),
        name: vip_type.name.clone(),
        weight: 1,
        preferred_floor_types: Vec::new(),
        books_min: 1,
        books_max: 3,
    };
    let reader_id = make_reader(gs, catalog, &archetype, rng, now_ms)
        .ok_or(ActionError::NoEligibleTarget)?;
    if let Some(reader) = gs.readers.iter_mut().find(|reader| reader.id == reader_id) {
        reader.is_vip = true;
        reader.vip_ability = Some(ability);
    }
    gs.lobby.vips.remove(guest_index);
    Ok(reader_id)
}

/// Remove a reader still waiting in the elevator.
///
/// # Errors
///
/// `InvalidId` for unknown readers, `WrongState` once they have arrived.
pub fn cancel_elevator_ride(gs: &mut GameState, reader_id: ReaderId) -> Result<(), ActionError> {
    let index = gs
        .readers
        .iter()
        .position(|reader| reader.id == reader_id)
        .ok_or(ActionError::InvalidId)?;
    if gs.readers[index].elevator != ElevatorState::Waiting {
        return Err(ActionError::WrongState);
    }
    gs.readers.remove(index);
    Ok(())
}

/// Apply a VIP's ability when their elevator arrives at the floor.
pub(crate) fn apply_vip_arrival(
    gs: &mut GameState,
    catalog: &Catalog,
    floor_id: FloorId,
    ability: VipAbility,
    now_ms: i64,
) {
    match ability {
        VipAbility::DoubleEarnings => {
            if let Some(floor) = gs.floor_mut(floor_id) {
                floor.vip_boost = Some(VipBoost {
                    mult: VIP_BOOST_MULT,
                    ends_ms: now_ms + VIP_BOOST_DURATION_MS,
                });
            }
        }
        VipAbility::InstantRestock => {
            let Some(floor) = gs.floor_mut(floor_id) else {
                return;
            };
            let level = floor.upgrade_level;
            let type_id = floor.type_id.clone();
            let unlocked = floor.staff.len();
            if let Some(def) = catalog.floor_type(&type_id) {
                for (index, slot) in floor.stock.iter_mut().enumerate().take(unlocked) {
                    if let Some(category) = def.categories.get(index) {
                        slot.current_stock = effective_max_stock(category, level);
                        slot.restocking = None;
                    }
                }
            }
        }
        VipAbility::TrashSweep => {
            if let Some(floor) = gs.floor_mut(floor_id) {
                floor.trash = 0;
            }
        }
        VipAbility::CrowdDraw => {
            gs.timers.next_reader_ms =
                (gs.timers.next_reader_ms - CROWD_DRAW_SPAWN_CUT_MS).max(now_ms);
        }
    }
}
