//! Floor entities and the construction/stocking state machine.
//!
//! Effective stock and earning values are always derived from the catalog
//! definition times the upgrade multiplier so repeated upgrades never
//! compound stored values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::catalog::{Catalog, CategoryDef, FloorKind, FloorTypeDef};
use crate::constants::{
    FLOOR_REFUND_RATE, LOG_FLOOR_BUILT, LOG_FLOOR_DELETED, LOG_FLOOR_READY, LOG_FLOOR_RUSHED,
    LOG_FLOOR_UPGRADED, RESTOCK_SKILL_DISCOUNT, STAT_FLOORS_BUILT, STAT_FLOORS_UPGRADED,
    STAT_TRASH_EMPTIED, TRASH_MAX, UPGRADE_COST_LEVEL_MULT, UPGRADE_LEVEL_MULTS, UPGRADE_MAX_LEVEL,
};
use crate::error::ActionError;
use crate::incidents::{Incident, IncidentKind};
use crate::numbers::{floor_f64_to_i64, floor_f64_to_u32, i64_to_f64, u32_to_f64};
use crate::staff::StaffMember;
use crate::state::{FloorId, GameState};

/// Construction status of a floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FloorStatus {
    Building,
    #[default]
    Ready,
}

/// An in-flight restock window for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Restock {
    pub start_ms: i64,
    pub end_ms: i64,
}

/// Mutable stock state for one category slot, parallel to the catalog's
/// category list for the floor type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CategoryStock {
    #[serde(default)]
    pub current_stock: u32,
    #[serde(default)]
    pub restocking: Option<Restock>,
}

/// Temporary earning boost left behind by a VIP visit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VipBoost {
    pub mult: f64,
    pub ends_ms: i64,
}

/// A purchasable unit of the tower.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    pub id: FloorId,
    pub type_id: String,
    #[serde(default)]
    pub status: FloorStatus,
    #[serde(default)]
    pub build_start_ms: i64,
    #[serde(default)]
    pub build_end_ms: i64,
    #[serde(default = "default_upgrade_level")]
    pub upgrade_level: u8,
    #[serde(default)]
    pub staff: SmallVec<[StaffMember; 3]>,
    #[serde(default)]
    pub stock: Vec<CategoryStock>,
    #[serde(default)]
    pub trash: u8,
    #[serde(default)]
    pub incidents: BTreeMap<IncidentKind, Incident>,
    #[serde(default)]
    pub vip_boost: Option<VipBoost>,
}

const fn default_upgrade_level() -> u8 {
    1
}

impl Floor {
    /// Create a floor already in `Ready` state (basement, rushed builds).
    #[must_use]
    pub fn new_ready(id: FloorId, def: &FloorTypeDef, now_ms: i64) -> Self {
        Self {
            id,
            type_id: def.id.clone(),
            status: FloorStatus::Ready,
            build_start_ms: now_ms,
            build_end_ms: now_ms,
            upgrade_level: 1,
            staff: SmallVec::new(),
            stock: def.categories.iter().map(|_| CategoryStock::default()).collect(),
            trash: 0,
            incidents: BTreeMap::new(),
            vip_boost: None,
        }
    }

    /// Create a floor under construction.
    #[must_use]
    pub fn new_building(id: FloorId, def: &FloorTypeDef, now_ms: i64, build_ms: i64) -> Self {
        let mut floor = Self::new_ready(id, def, now_ms);
        floor.status = FloorStatus::Building;
        floor.build_end_ms = now_ms + build_ms.max(0);
        floor
    }

    /// Whether the floor has finished construction.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self.status, FloorStatus::Ready)
    }

    /// Whether the floor can serve visitors: ready, not buried in trash,
    /// and free of active incidents.
    #[must_use]
    pub fn is_operational(&self) -> bool {
        self.is_ready() && self.trash < TRASH_MAX && self.incidents.is_empty()
    }

    /// Whether the category at `index` is unlocked by the hired staff.
    #[must_use]
    pub fn category_unlocked(&self, index: usize) -> bool {
        self.staff.len() > index
    }

    /// Add trash, clamping at the maximum.
    pub fn add_trash(&mut self, amount: u8) {
        self.trash = self.trash.saturating_add(amount).min(TRASH_MAX);
    }

    /// Remove trash, clamping at zero.
    pub fn remove_trash(&mut self, amount: u8) {
        self.trash = self.trash.saturating_sub(amount);
    }
}

/// Upgrade multiplier for a level, indexed from the original catalog values.
#[must_use]
pub fn upgrade_mult(level: u8) -> f64 {
    let index = usize::from(level.clamp(1, UPGRADE_MAX_LEVEL) - 1);
    UPGRADE_LEVEL_MULTS[index]
}

/// Effective stock ceiling for a category at an upgrade level.
#[must_use]
pub fn effective_max_stock(def: &CategoryDef, level: u8) -> u32 {
    floor_f64_to_u32(u32_to_f64(def.max_stock) * upgrade_mult(level)).max(1)
}

/// Effective earning rate for a category at an upgrade level.
#[must_use]
pub fn effective_earning_rate(def: &CategoryDef, level: u8) -> i64 {
    floor_f64_to_i64(i64_to_f64(def.earning_rate) * upgrade_mult(level)).max(1)
}

/// Construction-speed multiplier from owned perks.
#[must_use]
pub fn build_speed_mult(gs: &GameState, catalog: &Catalog) -> f64 {
    let bonus: f64 = gs
        .perks
        .iter()
        .filter_map(|id| catalog.perk(id))
        .map(|perk| perk.build_speed_bonus)
        .sum();
    (1.0 + bonus).max(1.0)
}

/// Begin construction of a new floor.
///
/// # Errors
///
/// `InvalidType` for unknown or basement types, `CapacityExceeded` at the
/// tower limit, `InsufficientFunds` when stars are short.
pub fn build_floor(
    gs: &mut GameState,
    catalog: &Catalog,
    type_id: &str,
    now_ms: i64,
) -> Result<FloorId, ActionError> {
    let def = catalog.floor_type(type_id).ok_or(ActionError::InvalidType)?;
    if def.id == catalog.settings.basement_type {
        return Err(ActionError::InvalidType);
    }
    if gs.floors.len() >= catalog.settings.max_floors {
        return Err(ActionError::CapacityExceeded);
    }
    let speed = build_speed_mult(gs, catalog);
    if !gs.try_spend_stars(def.cost) {
        return Err(ActionError::InsufficientFunds);
    }
    let build_ms = floor_f64_to_i64(i64_to_f64(def.build_time_ms) / speed);
    let id = gs.alloc_floor_id();
    gs.floors.push(Floor::new_building(id, def, now_ms, build_ms));
    gs.stats.bump(STAT_FLOORS_BUILT, 1);
    gs.logs.push(String::from(LOG_FLOOR_BUILT));
    Ok(id)
}

/// Demolish a floor, refunding half the build cost and returning its staff
/// to the unassigned pool.
///
/// # Errors
///
/// `InvalidId` for unknown floors, `WrongState` for utility floors,
/// `LastFloor` when it is the only floor left.
pub fn delete_floor(
    gs: &mut GameState,
    catalog: &Catalog,
    id: FloorId,
) -> Result<i64, ActionError> {
    let index = gs
        .floors
        .iter()
        .position(|floor| floor.id == id)
        .ok_or(ActionError::InvalidId)?;
    let def = catalog
        .floor_type(&gs.floors[index].type_id)
        .ok_or(ActionError::InvalidType)?;
    if def.kind == FloorKind::Utility && def.id == catalog.settings.basement_type {
        return Err(ActionError::WrongState);
    }
    if gs.floors.len() <= 1 {
        return Err(ActionError::LastFloor);
    }
    let refund = floor_f64_to_i64(i64_to_f64(def.cost) * FLOOR_REFUND_RATE);
    let mut floor = gs.floors.remove(index);
    for mut member in floor.staff.drain(..) {
        member.assigned_floor = None;
        gs.unassigned_staff.push(member);
    }
    gs.readers.retain(|reader| reader.target_floor != id);
    crate::missions::on_floor_removed(gs, id);
    crate::events::on_floor_removed(gs, id);
    gs.stars = gs.stars.saturating_add(refund);
    gs.logs.push(String::from(LOG_FLOOR_DELETED));
    Ok(refund)
}

/// Spend one gem to force-complete a floor under construction.
///
/// # Errors
///
/// `InvalidId`, `WrongState` when not building, `InsufficientGems`.
pub fn rush_construction(gs: &mut GameState, id: FloorId) -> Result<(), ActionError> {
    let building = gs
        .floor(id)
        .ok_or(ActionError::InvalidId)?
        .status
        == FloorStatus::Building;
    if !building {
        return Err(ActionError::WrongState);
    }
    if !gs.try_spend_gems(1) {
        return Err(ActionError::InsufficientGems);
    }
    if let Some(floor) = gs.floor_mut(id) {
        floor.status = FloorStatus::Ready;
    }
    gs.logs.push(String::from(LOG_FLOOR_RUSHED));
    Ok(())
}

/// Cost of upgrading a floor from its current level.
#[must_use]
pub fn upgrade_cost(def: &FloorTypeDef, current_level: u8) -> i64 {
    def.cost
        .saturating_mul(UPGRADE_COST_LEVEL_MULT)
        .saturating_mul(i64::from(current_level))
}

/// Upgrade a `Ready` floor one level, scaling stock and earnings from the
/// original catalog values.
///
/// # Errors
///
/// `InvalidId`, `WrongState` when building or already at the level cap,
/// `InsufficientFunds`.
pub fn upgrade_floor(
    gs: &mut GameState,
    catalog: &Catalog,
    id: FloorId,
) -> Result<u8, ActionError> {
    let floor = gs.floor(id).ok_or(ActionError::InvalidId)?;
    if !floor.is_ready() || floor.upgrade_level >= UPGRADE_MAX_LEVEL {
        return Err(ActionError::WrongState);
    }
    let def = catalog
        .floor_type(&floor.type_id)
        .ok_or(ActionError::InvalidType)?;
    let cost = upgrade_cost(def, floor.upgrade_level);
    if !gs.try_spend_stars(cost) {
        return Err(ActionError::InsufficientFunds);
    }
    let mut new_level = 0;
    if let Some(floor) = gs.floor_mut(id) {
        floor.upgrade_level += 1;
        new_level = floor.upgrade_level;
    }
    gs.stats.bump(STAT_FLOORS_UPGRADED, 1);
    gs.logs.push(String::from(LOG_FLOOR_UPGRADED));
    Ok(new_level)
}

/// Begin restocking a category. Duration shrinks with the skill of the
/// staff member covering the slot (dream-matched staff count one higher).
///
/// # Errors
///
/// `InvalidId`, `WrongState` for non-ready floors, already-running restocks
/// or full stock, `CategoryLocked` when staffing has not unlocked the slot,
/// `InsufficientFunds`.
pub fn start_restock(
    gs: &mut GameState,
    catalog: &Catalog,
    floor_id: FloorId,
    category_index: usize,
    now_ms: i64,
) -> Result<(), ActionError> {
    let floor = gs.floor(floor_id).ok_or(ActionError::InvalidId)?;
    if !floor.is_ready() {
        return Err(ActionError::WrongState);
    }
    let def = catalog
        .floor_type(&floor.type_id)
        .ok_or(ActionError::InvalidType)?;
    let category = def
        .categories
        .get(category_index)
        .ok_or(ActionError::InvalidId)?;
    if !floor.category_unlocked(category_index) {
        return Err(ActionError::CategoryLocked);
    }
    let slot = floor
        .stock
        .get(category_index)
        .ok_or(ActionError::InvalidId)?;
    if slot.restocking.is_some() {
        return Err(ActionError::WrongState);
    }
    if slot.current_stock >= effective_max_stock(category, floor.upgrade_level) {
        return Err(ActionError::WrongState);
    }
    let skill = floor.staff.get(category_index).map_or(0, |member| {
        u32::from(member.skill) + u32::from(member.is_dream_match)
    });
    if !gs.try_spend_stars(category.stock_cost) {
        return Err(ActionError::InsufficientFunds);
    }
    let discount = (RESTOCK_SKILL_DISCOUNT * f64::from(skill)).min(0.8);
    let duration = floor_f64_to_i64(i64_to_f64(category.stock_time_ms) * (1.0 - discount)).max(1);
    if let Some(floor) = gs.floor_mut(floor_id)
        && let Some(slot) = floor.stock.get_mut(category_index)
    {
        slot.restocking = Some(Restock {
            start_ms: now_ms,
            end_ms: now_ms + duration,
        });
    }
    Ok(())
}

/// Reset a floor's trash to zero.
///
/// # Errors
///
/// `InvalidId` for unknown floors.
pub fn empty_trash(gs: &mut GameState, floor_id: FloorId) -> Result<(), ActionError> {
    let floor = gs.floor_mut(floor_id).ok_or(ActionError::InvalidId)?;
    floor.trash = 0;
    gs.stats.bump(STAT_TRASH_EMPTIED, 1);
    Ok(())
}

/// Flip floors whose construction window has elapsed to `Ready`.
/// Returns how many completed. Invoked by the tick and by offline replay.
pub fn complete_due_construction(gs: &mut GameState, now_ms: i64) -> u32 {
    let mut completed = 0;
    for floor in &mut gs.floors {
        if floor.status == FloorStatus::Building && now_ms >= floor.build_end_ms {
            floor.status = FloorStatus::Ready;
            completed += 1;
        }
    }
    for _ in 0..completed {
        gs.logs.push(String::from(LOG_FLOOR_READY));
    }
    completed
}

/// Fill categories whose restock window has elapsed. Returns how many
/// completed. Invoked by the tick and by offline replay.
pub fn complete_due_restocks(gs: &mut GameState, catalog: &Catalog, now_ms: i64) -> u32 {
    let mut completed = 0;
    for floor in &mut gs.floors {
        let Some(def) = catalog.floor_type(&floor.type_id) else {
            continue;
        };
        let level = floor.upgrade_level;
        for (index, slot) in floor.stock.iter_mut().enumerate() {
            let due = slot
                .restocking
                .is_some_and(|restock| now_ms >= restock.end_ms);
            if due && let Some(category) = def.categories.get(index) {
                slot.current_stock = effective_max_stock(category, level);
                slot.restocking = None;
                completed += 1;
            }
        }
    }
    completed
}
