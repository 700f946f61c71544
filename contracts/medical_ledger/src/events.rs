//! Ledger notifications.
//!
//! Every notification is published twice from the same invocation:
//!
//! 1. as a Soroban contract event with topics `(SYMBOL, patient_id)`, for
//!    off-chain indexers;
//! 2. into the on-ledger journal of its [`EventKind`] (see
//!    [`crate::subscription`]), but only while that kind has active
//!    subscriptions.
//!
//! | Kind             | Topic symbol | Payload                   |
//! |------------------|--------------|---------------------------|
//! | `RecordAdded`    | `REC_ADD`    | [`RecordAddedEvent`]      |
//! | `RecordVerified` | `REC_VER`    | [`RecordVerifiedEvent`]   |
//! | `AccessGranted`  | `ACC_GRT`    | [`AccessGrantedEvent`]    |
//! | `AccessRevoked`  | `ACC_REV`    | [`AccessRevokedEvent`]    |
//! | `DataAccessed`   | `DATA_ACC`   | [`DataAccessedEvent`]     |

#![allow(deprecated)]

use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol};

use crate::subscription;
use crate::types::Role;

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventKind {
    RecordAdded,
    RecordVerified,
    AccessGranted,
    AccessRevoked,
    DataAccessed,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::RecordAdded,
        EventKind::RecordVerified,
        EventKind::AccessGranted,
        EventKind::AccessRevoked,
        EventKind::DataAccessed,
    ];
}

/// Published when a record is appended. Carries the index so an automated
/// validator can verify it without reading the record.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordAddedEvent {
    pub patient_id: String,
    pub data_hash: String,
    pub index: u32,
    pub created_by: Address,
    pub patient_seq: u64,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordVerifiedEvent {
    pub patient_id: String,
    pub index: u32,
    pub validator: Address,
    pub patient_seq: u64,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessGrantedEvent {
    pub patient_id: String,
    pub principal: Address,
    pub patient_seq: u64,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessRevokedEvent {
    pub patient_id: String,
    pub principal: Address,
    pub patient_seq: u64,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DataAccessedEvent {
    pub patient_id: String,
    pub accessed_by: Address,
    pub purpose: String,
    pub patient_seq: u64,
    pub timestamp: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EventPayload {
    RecordAdded(RecordAddedEvent),
    RecordVerified(RecordVerifiedEvent),
    AccessGranted(AccessGrantedEvent),
    AccessRevoked(AccessRevokedEvent),
    DataAccessed(DataAccessedEvent),
}

impl EventPayload {
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::RecordAdded(_) => EventKind::RecordAdded,
            EventPayload::RecordVerified(_) => EventKind::RecordVerified,
            EventPayload::AccessGranted(_) => EventKind::AccessGranted,
            EventPayload::AccessRevoked(_) => EventKind::AccessRevoked,
            EventPayload::DataAccessed(_) => EventKind::DataAccessed,
        }
    }
}

fn emit(env: &Env, topic: Symbol, patient_id: &String, payload: EventPayload) {
    env.events()
        .publish((topic, patient_id.clone()), payload.clone());
    subscription::enqueue(env, payload);
}

pub fn publish_initialized(env: &Env, admin: &Address, validator: &Address) {
    env.events().publish(
        (symbol_short!("INIT"),),
        (admin.clone(), validator.clone()),
    );
}

pub fn publish_role_changed(env: &Env, principal: &Address, role: Role, assigned: bool) {
    env.events()
        .publish((symbol_short!("ROLE"), principal.clone()), (role, assigned));
}

/// Topics `(COMPACT, kind)`, data `(floor, removed)`.
pub fn publish_journal_compacted(env: &Env, kind: EventKind, floor: u64, removed: u32) {
    env.events()
        .publish((symbol_short!("COMPACT"), kind), (floor, removed));
}

pub fn publish_record_added(
    env: &Env,
    patient_id: &String,
    data_hash: &String,
    index: u32,
    created_by: &Address,
    patient_seq: u64,
) {
    let payload = EventPayload::RecordAdded(RecordAddedEvent {
        patient_id: patient_id.clone(),
        data_hash: data_hash.clone(),
        index,
        created_by: created_by.clone(),
        patient_seq,
        timestamp: env.ledger().timestamp(),
    });
    emit(env, symbol_short!("REC_ADD"), patient_id, payload);
}

pub fn publish_record_verified(
    env: &Env,
    patient_id: &String,
    index: u32,
    validator: &Address,
    patient_seq: u64,
) {
    let payload = EventPayload::RecordVerified(RecordVerifiedEvent {
        patient_id: patient_id.clone(),
        index,
        validator: validator.clone(),
        patient_seq,
        timestamp: env.ledger().timestamp(),
    });
    emit(env, symbol_short!("REC_VER"), patient_id, payload);
}

pub fn publish_access_granted(env: &Env, patient_id: &String, principal: &Address, patient_seq: u64) {
    let payload = EventPayload::AccessGranted(AccessGrantedEvent {
        patient_id: patient_id.clone(),
        principal: principal.clone(),
        patient_seq,
        timestamp: env.ledger().timestamp(),
    });
    emit(env, symbol_short!("ACC_GRT"), patient_id, payload);
}

pub fn publish_access_revoked(env: &Env, patient_id: &String, principal: &Address, patient_seq: u64) {
    let payload = EventPayload::AccessRevoked(AccessRevokedEvent {
        patient_id: patient_id.clone(),
        principal: principal.clone(),
        patient_seq,
        timestamp: env.ledger().timestamp(),
    });
    emit(env, symbol_short!("ACC_REV"), patient_id, payload);
}

pub fn publish_data_accessed(
    env: &Env,
    patient_id: &String,
    accessed_by: &Address,
    purpose: &String,
    patient_seq: u64,
) {
    let payload = EventPayload::DataAccessed(DataAccessedEvent {
        patient_id: patient_id.clone(),
        accessed_by: accessed_by.clone(),
        purpose: purpose.clone(),
        patient_seq,
        timestamp: env.ledger().timestamp(),
    });
    emit(env, symbol_short!("DATA_ACC"), patient_id, payload);
}
