//! Record verification workflow.
//!
//! Holds no state of its own: it authorizes the caller as a Validator, checks
//! the index against the patient's record count, and drives the record through
//! the `Unverified → Verified` state machine. Verifying an already verified
//! record succeeds without touching storage or emitting an event.

use ledger_common::state_machine::{self, RecordState};
use soroban_sdk::{log, Address, Env, String};

use crate::errors::LedgerError;
use crate::events;
use crate::records;
use crate::roles;
use crate::sequence;
use crate::types::Role;

/// Marks record `index` of `patient_id` as verified.
///
/// Returns `true` when the record changed state.
pub fn verify(
    env: &Env,
    caller: &Address,
    patient_id: &String,
    index: u32,
) -> Result<bool, LedgerError> {
    roles::require_role(env, caller, Role::Validator)?;

    if index >= records::record_count(env, patient_id) {
        return Err(LedgerError::InvalidIndex);
    }
    let mut record = records::load(env, patient_id, index).ok_or(LedgerError::InvalidIndex)?;

    let changed = state_machine::advance(
        RecordState::from_verified(record.verified),
        RecordState::Verified,
    )?;
    if !changed {
        return Ok(false);
    }

    record.verified = true;
    records::store(env, patient_id, index, &record);

    let seq = sequence::bump(env, patient_id);
    events::publish_record_verified(env, patient_id, index, caller, seq);
    log!(env, "record verified", patient_id.clone(), index);

    Ok(true)
}
