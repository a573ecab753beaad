//! Staff members and the hiring/assignment operations.
//!
//! Staff are owned by the floor sequence they occupy (or the unassigned
//! pool); the `assigned_floor` id back-reference is maintained in both
//! directions by every operation. Legacy snapshots stored bare name strings
//! for some entries; those normalize to full records at the deserialization
//! boundary.

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, StaffRole};
use crate::constants::{LOG_STAFF_FIRED, LOG_STAFF_HIRED, LOG_STAFF_REASSIGNED, STAT_STAFF_HIRED};
use crate::error::ActionError;
use crate::state::{FloorId, GameState, LobbyEntryId, StaffId};

/// A hired staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaffMember {
    pub id: StaffId,
    pub type_id: String,
    pub name: String,
    pub skill: u8,
    pub dream_genre: Option<String>,
    pub is_dream_match: bool,
    pub assigned_floor: Option<FloorId>,
}

impl StaffMember {
    /// Construct an unassigned member with clamped skill.
    #[must_use]
    pub fn new(id: StaffId, type_id: &str, name: &str, skill: u8) -> Self {
        Self {
            id,
            type_id: type_id.to_string(),
            name: name.to_string(),
            skill: skill.clamp(1, 5),
            dream_genre: None,
            is_dream_match: false,
            assigned_floor: None,
        }
    }
}

/// Serde mirror of [`StaffMember`] used by the untagged legacy decoder.
#[derive(Deserialize)]
struct StaffMemberRecord {
    #[serde(default)]
    id: StaffId,
    type_id: String,
    name: String,
    #[serde(default = "default_skill")]
    skill: u8,
    #[serde(default)]
    dream_genre: Option<String>,
    #[serde(default)]
    is_dream_match: bool,
    #[serde(default)]
    assigned_floor: Option<FloorId>,
}

const fn default_skill() -> u8 {
    1
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StaffEntry {
    /// Legacy representation: a bare name string.
    Legacy(String),
    Member(StaffMemberRecord),
}

impl<'de> Deserialize<'de> for StaffMember {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let entry = StaffEntry::deserialize(deserializer)?;
        Ok(match entry {
            // Legacy entries get a zero id; load-time normalization assigns
            // a real one and restores the floor back-reference.
            StaffEntry::Legacy(name) => Self::new(0, "shelver", &name, 1),
            StaffEntry::Member(record) => Self {
                id: record.id,
                type_id: record.type_id,
                name: record.name,
                skill: record.skill.clamp(1, 5),
                dream_genre: record.dream_genre,
                is_dream_match: record.is_dream_match,
                assigned_floor: record.assigned_floor,
            },
        })
    }
}

/// The catalog role of a staff member, if its type still exists.
#[must_use]
pub fn role_of(catalog: &Catalog, member: &StaffMember) -> Option<StaffRole> {
    catalog.staff_type(&member.type_id).map(|def| def.role)
}

/// Whether any staff member anywhere in the tower carries the role.
#[must_use]
pub fn tower_has_role(gs: &GameState, catalog: &Catalog, role: StaffRole) -> bool {
    gs.floors
        .iter()
        .flat_map(|floor| floor.staff.iter())
        .chain(gs.unassigned_staff.iter())
        .any(|member| role_of(catalog, member) == Some(role))
}

/// Hire a lobby applicant onto a floor.
///
/// # Errors
///
/// `InvalidId` for unknown applicant or floor, `WrongState` for floors still
/// under construction, `SlotsFull` when no slot is free, `CategoryLocked`
/// when the type's staffing threshold is unmet, `InsufficientFunds`.
pub fn hire_staff(
    gs: &mut GameState,
    catalog: &Catalog,
    floor_id: FloorId,
    applicant_id: LobbyEntryId,
) -> Result<StaffId, ActionError> {
    let applicant_index = gs
        .lobby
        .applicants
        .iter()
        .position(|applicant| applicant.id == applicant_id)
        .ok_or(ActionError::InvalidId)?;
    let type_id = gs.lobby.applicants[applicant_index].staff_type_id.clone();
    let staff_type = catalog.staff_type(&type_id).ok_or(ActionError::InvalidType)?;
    let floor = gs.floor(floor_id).ok_or(ActionError::InvalidId)?;
    if !floor.is_ready() {
        return Err(ActionError::WrongState);
    }
    let floor_def = catalog
        .floor_type(&floor.type_id)
        .ok_or(ActionError::InvalidType)?;
    if floor.staff.len() >= floor_def.staff_slots as usize {
        return Err(ActionError::SlotsFull);
    }
    if (floor.staff.len() as u32) < staff_type.requires_staff {
        return Err(ActionError::CategoryLocked);
    }
    if !gs.try_spend_stars(staff_type.hire_cost) {
        return Err(ActionError::InsufficientFunds);
    }

    let applicant = gs.lobby.applicants.remove(applicant_index);
    let id = gs.alloc_staff_id();
    let floor_type = gs.floor(floor_id).map(|f| f.type_id.clone());
    let mut member = StaffMember::new(id, &applicant.staff_type_id, &applicant.name, applicant.skill);
    member.dream_genre = applicant.dream_genre;
    member.is_dream_match = member
        .dream_genre
        .as_deref()
        .is_some_and(|genre| floor_type.as_deref() == Some(genre));
    member.assigned_floor = Some(floor_id);
    if let Some(floor) = gs.floor_mut(floor_id) {
        floor.staff.push(member);
    }
    gs.stats.bump(STAT_STAFF_HIRED, 1);
    gs.logs.push(String::from(LOG_STAFF_HIRED));
    Ok(id)
}

/// Dismiss a staff member permanently, wherever they are.
///
/// # Errors
///
/// `InvalidId` when no member carries the id.
pub fn fire_staff(gs: &mut GameState, staff_id: StaffId) -> Result<(), ActionError> {
    for floor in &mut gs.floors {
        if let Some(index) = floor.staff.iter().position(|member| member.id == staff_id) {
            floor.staff.remove(index);
            gs.logs.push(String::from(LOG_STAFF_FIRED));
            return Ok(());
        }
    }
    if let Some(index) = gs
        .unassigned_staff
        .iter()
        .position(|member| member.id == staff_id)
    {
        gs.unassigned_staff.remove(index);
        gs.logs.push(String::from(LOG_STAFF_FIRED));
        return Ok(());
    }
    Err(ActionError::InvalidId)
}

/// Move a staff member (from a floor or the unassigned pool) onto another
/// floor, keeping both back-references consistent.
///
/// # Errors
///
/// `InvalidId`, `WrongState` for non-ready targets, `SlotsFull`, and
/// `CategoryLocked` mirror the hiring rules.
pub fn reassign_staff(
    gs: &mut GameState,
    catalog: &Catalog,
    staff_id: StaffId,
    to_floor: FloorId,
) -> Result<(), ActionError> {
    let target = gs.floor(to_floor).ok_or(ActionError::InvalidId)?;
    if !target.is_ready() {
        return Err(ActionError::WrongState);
    }
    let target_def = catalog
        .floor_type(&target.type_id)
        .ok_or(ActionError::InvalidType)?;
    let target_slots = target_def.staff_slots as usize;
    let target_type = target.type_id.clone();
    let target_len = target.staff.len();
    if target.staff.iter().any(|member| member.id == staff_id) {
        return Err(ActionError::WrongState);
    }
    if target_len >= target_slots {
        return Err(ActionError::SlotsFull);
    }

    let mut member = take_member(gs, staff_id).ok_or(ActionError::InvalidId)?;
    let staff_type = catalog.staff_type(&member.type_id);
    let requires = staff_type.map_or(0, |def| def.requires_staff);
    if (target_len as u32) < requires {
        // Put the member back where a failed move leaves no trace.
        restore_member(gs, member);
        return Err(ActionError::CategoryLocked);
    }
    member.assigned_floor = Some(to_floor);
    member.is_dream_match = member
        .dream_genre
        .as_deref()
        .is_some_and(|genre| genre == target_type);
    if let Some(floor) = gs.floor_mut(to_floor) {
        floor.staff.push(member);
    }
    gs.logs.push(String::from(LOG_STAFF_REASSIGNED));
    Ok(())
}

fn take_member(gs: &mut GameState, staff_id: StaffId) -> Option<StaffMember> {
    for floor in &mut gs.floors {
        if let Some(index) = floor.staff.iter().position(|member| member.id == staff_id) {
            return Some(floor.staff.remove(index));
        }
    }
    gs.unassigned_staff
        .iter()
        .position(|member| member.id == staff_id)
        .map(|index| gs.unassigned_staff.remove(index))
}

fn restore_member(gs: &mut GameState, mut member: StaffMember) {
    if let Some(floor_id) = member.assigned_floor
        && let Some(floor) = gs.floor_mut(floor_id)
    {
        floor.staff.push(member);
        return;
    }
    member.assigned_floor = None;
    gs.unassigned_staff.push(member);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::floors::{build_floor, complete_due_construction};
    use crate::lobby::Applicant;

    fn fixture_with_floor() -> (GameState, Catalog, FloorId) {
        let catalog = Catalog::default_catalog();
        let mut gs = GameState::new_game(3, &catalog, 0);
        let id = build_floor(&mut gs, &catalog, "board_books", 0).unwrap();
        complete_due_construction(&mut gs, 60_000);
        (gs, catalog, id)
    }

    fn push_applicant(gs: &mut GameState, type_id: &str) -> LobbyEntryId {
        let id = gs.alloc_lobby_id();
        gs.lobby.applicants.push(Applicant {
            id,
            staff_type_id: type_id.to_string(),
            name: String::from("Robin"),
            skill: 3,
            dream_genre: Some(String::from("board_books")),
            expires_ms: i64::MAX,
        });
        id
    }

    #[test]
    fn hire_from_lobby_sets_both_references() {
        let (mut gs, catalog, floor_id) = fixture_with_floor();
        let applicant_id = push_applicant(&mut gs, "shelver");
        let staff_id = hire_staff(&mut gs, &catalog, floor_id, applicant_id).unwrap();
        let floor = gs.floor(floor_id).unwrap();
        assert_eq!(floor.staff.len(), 1);
        assert_eq!(floor.staff[0].id, staff_id);
        assert_eq!(floor.staff[0].assigned_floor, Some(floor_id));
        assert!(floor.staff[0].is_dream_match);
        assert!(gs.lobby.applicants.is_empty());
    }

    #[test]
    fn hire_enforces_staffing_threshold() {
        let (mut gs, catalog, floor_id) = fixture_with_floor();
        let applicant_id = push_applicant(&mut gs, "curator");
        let stars = gs.stars;
        assert_eq!(
            hire_staff(&mut gs, &catalog, floor_id, applicant_id),
            Err(ActionError::CategoryLocked)
        );
        assert_eq!(gs.stars, stars);
        assert_eq!(gs.lobby.applicants.len(), 1);
    }

    #[test]
    fn hire_rejects_building_floor() {
        let catalog = Catalog::default_catalog();
        let mut gs = GameState::new_game(3, &catalog, 0);
        let floor_id = build_floor(&mut gs, &catalog, "board_books", 0).unwrap();
        let applicant_id = {
            let id = gs.alloc_lobby_id();
            gs.lobby.applicants.push(Applicant {
                id,
                staff_type_id: String::from("shelver"),
                name: String::from("Kim"),
                skill: 2,
                dream_genre: None,
                expires_ms: i64::MAX,
            });
            id
        };
        assert_eq!(
            hire_staff(&mut gs, &catalog, floor_id, applicant_id),
            Err(ActionError::WrongState)
        );
    }

    #[test]
    fn fire_removes_member_everywhere() {
        let (mut gs, catalog, floor_id) = fixture_with_floor();
        let applicant_id = push_applicant(&mut gs, "shelver");
        let staff_id = hire_staff(&mut gs, &catalog, floor_id, applicant_id).unwrap();
        fire_staff(&mut gs, staff_id).unwrap();
        assert!(gs.floor(floor_id).unwrap().staff.is_empty());
        assert_eq!(fire_staff(&mut gs, staff_id), Err(ActionError::InvalidId));
    }

    #[test]
    fn reassign_moves_and_rechecks_dream_match() {
        let (mut gs, catalog, board_books) = fixture_with_floor();
        let poetry = build_floor(&mut gs, &catalog, "poetry", 0).unwrap();
        complete_due_construction(&mut gs, 120_000);
        let applicant_id = push_applicant(&mut gs, "shelver");
        let staff_id = hire_staff(&mut gs, &catalog, board_books, applicant_id).unwrap();
        assert!(gs.floor(board_books).unwrap().staff[0].is_dream_match);

        reassign_staff(&mut gs, &catalog, staff_id, poetry).unwrap();
        assert!(gs.floor(board_books).unwrap().staff.is_empty());
        let moved = &gs.floor(poetry).unwrap().staff[0];
        assert_eq!(moved.assigned_floor, Some(poetry));
        assert!(!moved.is_dream_match);
    }

    #[test]
    fn legacy_string_entries_normalize_to_records() {
        let member: StaffMember = serde_json::from_str("\"Dusty\"").unwrap();
        assert_eq!(member.name, "Dusty");
        assert_eq!(member.id, 0);
        assert_eq!(member.type_id, "shelver");
        assert_eq!(member.skill, 1);

        let record: StaffMember = serde_json::from_str(
            r#"{"id":4,"type_id":"janitor","name":"Mop","skill":9}"#,
        )
        .unwrap();
        assert_eq!(record.id, 4);
        assert_eq!(record.skill, 5, "skill clamps into 1..=5");
    }
}
