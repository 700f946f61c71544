//! Per-patient operation sequence.
//!
//! Incremented once by every successful operation that changes a patient's
//! state or appends to its audit log. Events carry the value, so a consumer can
//! order everything that happened to one patient without relying on ledger
//! timestamps (several operations may share a ledger).

use ledger_common::ttl;
use soroban_sdk::{Env, String};

use crate::types::DataKey;

pub fn current(env: &Env, patient_id: &String) -> u64 {
    env.storage()
        .persistent()
        .get(&DataKey::PatientSeq(patient_id.clone()))
        .unwrap_or(0)
}

#[allow(clippy::arithmetic_side_effects)]
pub fn bump(env: &Env, patient_id: &String) -> u64 {
    let next = current(env, patient_id) + 1;
    ttl::set_persistent(env, &DataKey::PatientSeq(patient_id.clone()), &next);
    next
}
