//! Lobby queues for job applicants and waiting VIP guests.
//!
//! Both queues share one capacity: applicants plus VIPs never exceed the
//! shared cap. Entries expire independently on stored timestamps.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::constants::{
    APPLICANT_DREAM_GENRE_PROB, APPLICANT_MAX_GAP_MS, APPLICANT_MIN_GAP_MS, APPLICANT_TTL_MS,
    LOBBY_SHARED_CAP, VIP_GUEST_TTL_MS, VIP_MAX_GAP_MS, VIP_MIN_GAP_MS,
};
use crate::error::ActionError;
use crate::spawn::choose_weighted;
use crate::state::{GameState, LobbyEntryId};

/// A staff candidate waiting in the lobby.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub id: LobbyEntryId,
    pub staff_type_id: String,
    pub name: String,
    pub skill: u8,
    #[serde(default)]
    pub dream_genre: Option<String>,
    pub expires_ms: i64,
}

/// A VIP waiting to be admitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VipGuest {
    pub id: LobbyEntryId,
    pub vip_type_id: String,
    pub expires_ms: i64,
}

/// The shared lobby with its two bounded queues.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Lobby {
    #[serde(default)]
    pub applicants: Vec<Applicant>,
    #[serde(default)]
    pub vips: Vec<VipGuest>,
}

impl Lobby {
    /// Total occupancy against the shared cap.
    #[must_use]
    pub fn occupancy(&self) -> usize {
        self.applicants.len() + self.vips.len()
    }

    /// Whether one more entry fits under the shared cap.
    #[must_use]
    pub fn has_capacity(&self) -> bool {
        self.occupancy() < LOBBY_SHARED_CAP
    }

    /// Drop entries whose expiry has passed.
    pub fn expire(&mut self, now_ms: i64) {
        self.applicants.retain(|applicant| now_ms < applicant.expires_ms);
        self.vips.retain(|vip| now_ms < vip.expires_ms);
    }
}

const APPLICANT_NAMES: [&str; 8] = [
    "Avery", "Blake", "Casey", "Devon", "Ellis", "Frankie", "Gray", "Harper",
];

/// Roll a new applicant into the lobby if the shared cap allows.
/// Reschedules the arrival timer either way.
pub(crate) fn roll_applicant_arrival<R: Rng>(
    gs: &mut GameState,
    catalog: &Catalog,
    rng: &mut R,
    now_ms: i64,
) {
    if now_ms < gs.timers.next_applicant_ms {
        return;
    }
    gs.timers.next_applicant_ms = now_ms + rng.gen_range(APPLICANT_MIN_GAP_MS..=APPLICANT_MAX_GAP_MS);
    if !gs.lobby.has_capacity() || catalog.staff_types.is_empty() {
        return;
    }
    let Some(staff_type) = choose_weighted(rng, &catalog.staff_types, |_| 1.0) else {
        return;
    };
    let dream_genre = if rng.gen_bool(APPLICANT_DREAM_GENRE_PROB) {
        choose_weighted(rng, &catalog.floor_types, |def| {
            if def.categories.is_empty() { 0.0 } else { 1.0 }
        })
        .map(|def| def.id.clone())
    } else {
        None
    };
    let name = APPLICANT_NAMES[rng.gen_range(0..APPLICANT_NAMES.len())];
    let id = gs.alloc_lobby_id();
    gs.lobby.applicants.push(Applicant {
        id,
        staff_type_id: staff_type.id.clone(),
        name: name.to_string(),
        skill: rng.gen_range(1..=5),
        dream_genre,
        expires_ms: now_ms + APPLICANT_TTL_MS,
    });
}

/// Roll a new VIP guest into the lobby if the shared cap allows.
/// VIP sub-type weights sum below one; a miss falls back to the first type.
pub(crate) fn roll_vip_arrival<R: Rng>(
    gs: &mut GameState,
    catalog: &Catalog,
    rng: &mut R,
    now_ms: i64,
) {
    if now_ms < gs.timers.next_vip_ms {
        return;
    }
    gs.timers.next_vip_ms = now_ms + rng.gen_range(VIP_MIN_GAP_MS..=VIP_MAX_GAP_MS);
    if !gs.lobby.has_capacity() || catalog.vip_types.is_empty() {
        return;
    }
    let Some(vip_type) = crate::spawn::choose_weighted_in_unit(rng, &catalog.vip_types, |def| def.weight)
    else {
        return;
    };
    let id = gs.alloc_lobby_id();
    gs.lobby.vips.push(VipGuest {
        id,
        vip_type_id: vip_type.id.clone(),
        expires_ms: now_ms + VIP_GUEST_TTL_MS,
    });
    gs.notifications.vip_arrived = Some(vip_type.id.clone());
}

/// Remove an applicant from the lobby.
///
/// # Errors
///
/// `InvalidId` when the applicant is not waiting.
pub fn dismiss_applicant(gs: &mut GameState, applicant_id: LobbyEntryId) -> Result<(), ActionError> {
    let index = gs
        .lobby
        .applicants
        .iter()
        .position(|applicant| applicant.id == applicant_id)
        .ok_or(ActionError::InvalidId)?;
    gs.lobby.applicants.remove(index);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn shared_cap_counts_both_queues() {
        let mut lobby = Lobby::default();
        for id in 0..2 {
            lobby.applicants.push(Applicant {
                id,
                staff_type_id: String::from("shelver"),
                name: String::from("A"),
                skill: 1,
                dream_genre: None,
                expires_ms: 100,
            });
        }
        lobby.vips.push(VipGuest {
            id: 9,
            vip_type_id: String::from("book_collector"),
            expires_ms: 100,
        });
        assert_eq!(lobby.occupancy(), 3);
        assert!(!lobby.has_capacity());
    }

    #[test]
    fn expiry_drops_stale_entries() {
        let mut lobby = Lobby::default();
        lobby.applicants.push(Applicant {
            id: 1,
            staff_type_id: String::from("shelver"),
            name: String::from("A"),
            skill: 1,
            dream_genre: None,
            expires_ms: 50,
        });
        lobby.vips.push(VipGuest {
            id: 2,
            vip_type_id: String::from("book_collector"),
            expires_ms: 500,
        });
        lobby.expire(50);
        assert!(lobby.applicants.is_empty());
        assert_eq!(lobby.vips.len(), 1);
    }

    #[test]
    fn arrivals_respect_the_cap() {
        let catalog = Catalog::default_catalog();
        let mut gs = GameState::new_game(5, &catalog, 0);
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        // Force the lobby full.
        for id in 0..3 {
            gs.lobby.vips.push(VipGuest {
                id,
                vip_type_id: String::from("book_collector"),
                expires_ms: i64::MAX,
            });
        }
        gs.timers.next_applicant_ms = 0;
        roll_applicant_arrival(&mut gs, &catalog, &mut rng, 1);
        assert!(gs.lobby.applicants.is_empty());
        assert!(gs.timers.next_applicant_ms > 1, "timer still reschedules");
    }

    #[test]
    fn vip_arrival_notifies() {
        let catalog = Catalog::default_catalog();
        let mut gs = GameState::new_game(5, &catalog, 0);
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        gs.timers.next_vip_ms = 0;
        roll_vip_arrival(&mut gs, &catalog, &mut rng, 1);
        assert_eq!(gs.lobby.vips.len(), 1);
        assert!(gs.notifications.vip_arrived.is_some());
    }

    #[test]
    fn dismiss_unknown_applicant_fails() {
        let catalog = Catalog::default_catalog();
        let mut gs = GameState::new_game(5, &catalog, 0);
        assert_eq!(dismiss_applicant(&mut gs, 77), Err(ActionError::InvalidId));
    }
}
