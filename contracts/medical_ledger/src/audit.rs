//! Per-patient audit log of record reads.
//!
//! Entries are append-only and immutable. Each patient's log is also a hash
//! chain: the head starts as 32 zero bytes and every append replaces it with
//! `sha256(head || xdr(entry))`. Rewriting or dropping a stored entry makes
//! [`verify_chain`] fail.
//!
//! ## Storage keys
//!
//! - `AuditEntry(patient_id, index)` → `AccessLogEntry`
//! - `AuditHead(patient_id)` → `AuditHead { count, head_hash }`

use ledger_common::ttl;
use soroban_sdk::{xdr::ToXdr, Address, Bytes, BytesN, Env, String, Vec};

use crate::errors::LedgerError;
use crate::roles;
use crate::types::{AccessLogEntry, AuditHead, DataKey, Role};

fn genesis(env: &Env) -> AuditHead {
    AuditHead {
        count: 0,
        head_hash: BytesN::from_array(env, &[0u8; 32]),
    }
}

pub fn head(env: &Env, patient_id: &String) -> AuditHead {
    env.storage()
        .persistent()
        .get(&DataKey::AuditHead(patient_id.clone()))
        .unwrap_or_else(|| genesis(env))
}

fn chain(env: &Env, prev: &BytesN<32>, entry: &AccessLogEntry) -> BytesN<32> {
    let mut buf: Bytes = prev.clone().into();
    buf.append(&entry.clone().to_xdr(env));
    env.crypto().sha256(&buf).to_bytes()
}

/// Appends an entry. Callers must have confirmed the read was permitted.
#[allow(clippy::arithmetic_side_effects)]
pub fn append(
    env: &Env,
    patient_id: &String,
    accessed_by: &Address,
    purpose: &String,
) -> AccessLogEntry {
    let entry = AccessLogEntry {
        accessed_by: accessed_by.clone(),
        timestamp: env.ledger().timestamp(),
        purpose: purpose.clone(),
    };

    let current = head(env, patient_id);
    ttl::set_persistent(
        env,
        &DataKey::AuditEntry(patient_id.clone(), current.count),
        &entry,
    );
    let next = AuditHead {
        count: current.count + 1,
        head_hash: chain(env, &current.head_hash, &entry),
    };
    ttl::set_persistent(env, &DataKey::AuditHead(patient_id.clone()), &next);

    entry
}

/// All entries for `patient_id` in append order, without an authorization
/// check.
#[allow(clippy::arithmetic_side_effects)]
pub fn entries(env: &Env, patient_id: &String) -> Vec<AccessLogEntry> {
    let count = head(env, patient_id).count;
    let mut out = Vec::new(env);
    let mut index = 0u32;
    while index < count {
        if let Some(entry) = env
            .storage()
            .persistent()
            .get::<_, AccessLogEntry>(&DataKey::AuditEntry(patient_id.clone(), index))
        {
            out.push_back(entry);
        }
        index += 1;
    }
    out
}

pub fn read_all(
    env: &Env,
    caller: &Address,
    patient_id: &String,
) -> Result<Vec<AccessLogEntry>, LedgerError> {
    roles::require_role(env, caller, Role::Admin)?;
    Ok(entries(env, patient_id))
}

pub fn head_for(env: &Env, caller: &Address, patient_id: &String) -> Result<AuditHead, LedgerError> {
    roles::require_role(env, caller, Role::Admin)?;
    Ok(head(env, patient_id))
}

/// Recomputes the hash chain from stored entries and compares it with the
/// stored head. A missing entry counts as a broken chain.
#[allow(clippy::arithmetic_side_effects)]
pub fn verify_chain(env: &Env, caller: &Address, patient_id: &String) -> Result<bool, LedgerError> {
    roles::require_role(env, caller, Role::Admin)?;

    let stored = head(env, patient_id);
    let mut running = genesis(env).head_hash;
    let mut index = 0u32;
    while index < stored.count {
        let Some(entry) = env
            .storage()
            .persistent()
            .get::<_, AccessLogEntry>(&DataKey::AuditEntry(patient_id.clone(), index))
        else {
            return Ok(false);
        };
        running = chain(env, &running, &entry);
        index += 1;
    }

    Ok(running == stored.head_hash)
}
