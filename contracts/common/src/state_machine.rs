//! Verification lifecycle of a medical record.
//!
//! Every record starts `Unverified`. The only legal transition is
//! `Unverified → Verified`; `Verified` is terminal. Re-applying
//! `Verified` to a verified record is accepted and reported as unchanged so
//! callers can treat verification as idempotent.

use soroban_sdk::{contracterror, contracttype};

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RecordState {
    Unverified,
    Verified,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum TransitionError {
    InvalidTransition = 1,
}

impl RecordState {
    pub fn from_verified(verified: bool) -> Self {
        if verified {
            RecordState::Verified
        } else {
            RecordState::Unverified
        }
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, RecordState::Verified)
    }

    pub fn is_terminal(&self) -> bool {
        self.is_verified()
    }
}

/// Checks a requested transition.
///
/// Returns `Ok(true)` when the state changes, `Ok(false)` when the record is
/// already in the requested terminal state.
pub fn advance(from: RecordState, to: RecordState) -> Result<bool, TransitionError> {
    match (from, to) {
        (RecordState::Unverified, RecordState::Verified) => Ok(true),
        (RecordState::Verified, RecordState::Verified) => Ok(false),
        _ => Err(TransitionError::InvalidTransition),
    }
}
