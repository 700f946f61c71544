//! Per-patient permission registry.
//!
//! A grant is a boolean `(patient_id, principal) → allowed` with
//! last-write-wins semantics. Revocation deletes the entry, so an absent key
//! and a revoked grant are indistinguishable and both fail closed. No history
//! is kept; the audit log is the only durable trace of past access.

use ledger_common::ttl;
use soroban_sdk::{log, Address, Env, String};

use crate::errors::LedgerError;
use crate::events;
use crate::roles;
use crate::sequence;
use crate::types::{DataKey, Role};

fn grant_key(patient_id: &String, principal: &Address) -> DataKey {
    DataKey::Permission(patient_id.clone(), principal.clone())
}

pub fn is_permitted(env: &Env, patient_id: &String, principal: &Address) -> bool {
    env.storage()
        .persistent()
        .get(&grant_key(patient_id, principal))
        .unwrap_or(false)
}

pub fn require_permitted(
    env: &Env,
    patient_id: &String,
    principal: &Address,
) -> Result<(), LedgerError> {
    if !is_permitted(env, patient_id, principal) {
        log!(env, "permission denied", patient_id.clone(), principal.clone());
        return Err(LedgerError::PermissionDenied);
    }
    Ok(())
}

/// Grants `principal` access to `patient_id`. Admin only; idempotent.
///
/// Returns `true` when the grant was newly created.
pub fn grant(
    env: &Env,
    caller: &Address,
    patient_id: &String,
    principal: &Address,
) -> Result<bool, LedgerError> {
    roles::require_role(env, caller, Role::Admin)?;
    if patient_id.len() == 0 {
        return Err(LedgerError::InvalidInput);
    }

    if is_permitted(env, patient_id, principal) {
        return Ok(false);
    }

    ttl::set_persistent(env, &grant_key(patient_id, principal), &true);
    let seq = sequence::bump(env, patient_id);
    events::publish_access_granted(env, patient_id, principal, seq);
    Ok(true)
}

/// Revokes `principal`'s access to `patient_id`. Admin only; idempotent.
///
/// Returns `true` when an existing grant was removed.
pub fn revoke(
    env: &Env,
    caller: &Address,
    patient_id: &String,
    principal: &Address,
) -> Result<bool, LedgerError> {
    roles::require_role(env, caller, Role::Admin)?;
    if patient_id.len() == 0 {
        return Err(LedgerError::InvalidInput);
    }

    if !is_permitted(env, patient_id, principal) {
        return Ok(false);
    }

    env.storage()
        .persistent()
        .remove(&grant_key(patient_id, principal));
    let seq = sequence::bump(env, patient_id);
    events::publish_access_revoked(env, patient_id, principal, seq);
    Ok(true)
}
