//! Append-only record store.
//!
//! Records for a patient are stored one entry per index under
//! `Record(patient_id, index)` with a dense counter in
//! `RecordCount(patient_id)`. Indices are handed out as `count` and are never
//! reused, reordered, or compacted: the verification workflow addresses
//! records by index.
//!
//! Reads are never bare queries. [`read_all`] and [`read_page`] append an
//! audit entry and publish `DataAccessed` inside the same invocation, so no
//! caller can observe record contents without a matching audit trail.

use ledger_common::ttl;
use soroban_sdk::{log, Address, Env, String, Vec};

use crate::audit;
use crate::config;
use crate::errors::LedgerError;
use crate::events;
use crate::permissions;
use crate::sequence;
use crate::types::{DataKey, MedicalRecord};

pub fn record_count(env: &Env, patient_id: &String) -> u32 {
    env.storage()
        .persistent()
        .get(&DataKey::RecordCount(patient_id.clone()))
        .unwrap_or(0)
}

pub fn load(env: &Env, patient_id: &String, index: u32) -> Option<MedicalRecord> {
    env.storage()
        .persistent()
        .get(&DataKey::Record(patient_id.clone(), index))
}

pub(crate) fn store(env: &Env, patient_id: &String, index: u32, record: &MedicalRecord) {
    ttl::set_persistent(env, &DataKey::Record(patient_id.clone(), index), record);
}

/// Collects up to `limit` records starting at `start`, without auditing.
///
/// Only for internal use by the audited read paths and for test harnesses
/// that inspect state from inside the contract context.
#[allow(clippy::arithmetic_side_effects)]
pub fn load_range(env: &Env, patient_id: &String, start: u32, limit: u32) -> Vec<MedicalRecord> {
    let count = record_count(env, patient_id);
    let end = start.saturating_add(limit).min(count);
    let mut out = Vec::new(env);
    let mut index = start;
    while index < end {
        if let Some(record) = load(env, patient_id, index) {
            out.push_back(record);
        }
        index += 1;
    }
    out
}

/// Appends an unverified record and returns its index.
#[allow(clippy::arithmetic_side_effects)]
pub fn append(
    env: &Env,
    caller: &Address,
    patient_id: &String,
    data_hash: &String,
    diagnosis_label: &String,
) -> Result<u32, LedgerError> {
    permissions::require_permitted(env, patient_id, caller)?;
    if patient_id.len() == 0 || data_hash.len() == 0 {
        return Err(LedgerError::InvalidInput);
    }

    let index = record_count(env, patient_id);
    let record = MedicalRecord {
        patient_id: patient_id.clone(),
        data_hash: data_hash.clone(),
        diagnosis_label: diagnosis_label.clone(),
        created_at: env.ledger().timestamp(),
        created_by: caller.clone(),
        verified: false,
    };

    store(env, patient_id, index, &record);
    ttl::set_persistent(env, &DataKey::RecordCount(patient_id.clone()), &(index + 1));

    let seq = sequence::bump(env, patient_id);
    events::publish_record_added(env, patient_id, data_hash, index, caller, seq);
    log!(env, "record appended", patient_id.clone(), index);

    Ok(index)
}

/// Returns every record of `patient_id` and audits the read.
///
/// A patient without records yields an empty vector; the read is still
/// audited because the caller was permitted and asked.
pub fn read_all(
    env: &Env,
    caller: &Address,
    patient_id: &String,
    purpose: Option<String>,
) -> Result<Vec<MedicalRecord>, LedgerError> {
    permissions::require_permitted(env, patient_id, caller)?;
    let purpose = resolve_purpose(env, purpose)?;

    let records = load_range(env, patient_id, 0, record_count(env, patient_id));
    audit_read(env, caller, patient_id, purpose);
    Ok(records)
}

/// Returns up to `limit` records starting at `start` and audits the read.
pub fn read_page(
    env: &Env,
    caller: &Address,
    patient_id: &String,
    purpose: Option<String>,
    start: u32,
    limit: u32,
) -> Result<Vec<MedicalRecord>, LedgerError> {
    permissions::require_permitted(env, patient_id, caller)?;
    let purpose = resolve_purpose(env, purpose)?;
    if limit == 0 || limit > config::load(env)?.max_page_size {
        return Err(LedgerError::InvalidInput);
    }

    let records = load_range(env, patient_id, start, limit);
    audit_read(env, caller, patient_id, purpose);
    Ok(records)
}

fn resolve_purpose(env: &Env, purpose: Option<String>) -> Result<String, LedgerError> {
    match purpose {
        Some(purpose) if purpose.len() == 0 => Err(LedgerError::InvalidInput),
        Some(purpose) => Ok(purpose),
        None => Ok(config::load(env)?.default_purpose),
    }
}

fn audit_read(env: &Env, caller: &Address, patient_id: &String, purpose: String) {
    audit::append(env, patient_id, caller, &purpose);
    let seq = sequence::bump(env, patient_id);
    events::publish_data_accessed(env, patient_id, caller, &purpose, seq);
}
