//! Typed domain failures for player actions.
//!
//! Every player-facing operation returns `Result<_, ActionError>`; expected
//! failures (not enough stars, wrong floor state, full lobby) are values,
//! never panics.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Discriminated failure reasons for player actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionError {
    /// Not enough stars to pay the cost.
    #[error("insufficient funds")]
    InsufficientFunds,
    /// Not enough gems to pay the premium cost.
    #[error("insufficient gems")]
    InsufficientGems,
    /// The referenced catalog type id does not exist.
    #[error("invalid type")]
    InvalidType,
    /// The referenced entity id does not exist.
    #[error("invalid id")]
    InvalidId,
    /// The entity exists but is in the wrong state for this operation.
    #[error("wrong state")]
    WrongState,
    /// The tower has reached its maximum floor count.
    #[error("capacity exceeded")]
    CapacityExceeded,
    /// The staff type requires more staff on the floor than are present.
    #[error("category locked")]
    CategoryLocked,
    /// The floor has no free staff slot.
    #[error("slots full")]
    SlotsFull,
    /// The last remaining floor cannot be deleted.
    #[error("last floor")]
    LastFloor,
    /// A cooldown or level gate is still active.
    #[error("cooldown active")]
    CooldownActive,
    /// The shared lobby capacity is exhausted.
    #[error("lobby full")]
    LobbyFull,
    /// No eligible floor or category exists for the request.
    #[error("no eligible target")]
    NoEligibleTarget,
}
