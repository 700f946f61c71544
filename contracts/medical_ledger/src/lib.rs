//! # Medical Ledger
//!
//! Append-only medical record ledger with per-patient access grants, a
//! one-way verification workflow, and a mandatory audit trail of every read.
//!
//! ## Module layout
//!
//! | Module           | Purpose                                                 |
//! |------------------|---------------------------------------------------------|
//! | [`roles`]        | Role registry (`Admin`, `Validator`, `Subscriber`)      |
//! | [`permissions`]  | `(patient, principal) → bool` grant matrix              |
//! | [`records`]      | Append-only record store and audited reads              |
//! | [`verification`] | `Unverified → Verified` workflow                        |
//! | [`audit`]        | Hash-chained per-patient access log                     |
//! | [`events`]       | Contract events and payload types                       |
//! | [`subscription`] | Journal and cursor-based subscriptions                  |
//!
//! Every entry point runs as one Soroban invocation: all checks happen before
//! the first write, so a rejected call leaves storage untouched. Per-patient
//! state lives under keys that embed the patient id, which keeps operations on
//! different patients on disjoint ledger entries.

#![no_std]

pub mod audit;
pub mod config;
pub mod errors;
pub mod events;
pub mod permissions;
pub mod records;
pub mod roles;
pub mod sequence;
pub mod subscription;
pub mod types;
pub mod verification;


use ledger_common::ttl;
use soroban_sdk::{contract, contractimpl, log, Address, Env, String, Vec};

pub use errors::LedgerError;
pub use events::{EventKind, EventPayload};
pub use subscription::{JournalEntry, Subscription};
pub use types::{AccessLogEntry, AuditHead, LedgerConfig, MedicalRecord, Role};

use types::DataKey;

#[contract]
pub struct MedicalLedgerContract;

#[contractimpl]
impl MedicalLedgerContract {
    /// Initialize the ledger with its first Admin and Validator.
    pub fn initialize(env: Env, admin: Address, validator: Address) -> Result<(), LedgerError> {
        if env.storage().instance().has(&DataKey::Initialized) {
            return Err(LedgerError::AlreadyInitialized);
        }
        admin.require_auth();

        config::store(&env, &config::defaults(&env));
        env.storage().instance().set(&DataKey::Initialized, &true);
        roles::assign(&env, &admin, Role::Admin);
        roles::assign(&env, &validator, Role::Validator);
        ttl::extend_instance(&env);

        events::publish_initialized(&env, &admin, &validator);
        log!(&env, "ledger initialized", admin, validator);

        Ok(())
    }

    /// Check if the contract is initialized
    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&DataKey::Initialized)
    }

    /// Contract version
    pub fn version() -> u32 {
        1
    }

    // ======================== Configuration ========================

    pub fn get_config(env: Env) -> Result<LedgerConfig, LedgerError> {
        config::load(&env)
    }

    pub fn update_config(
        env: Env,
        caller: Address,
        new_config: LedgerConfig,
    ) -> Result<(), LedgerError> {
        caller.require_auth();
        Self::require_initialized(&env)?;
        roles::require_role(&env, &caller, Role::Admin)?;
        config::validate(&new_config)?;

        config::store(&env, &new_config);
        ttl::extend_instance(&env);
        Ok(())
    }

    // ======================== Role Registry ========================

    /// Give `principal` an additional role. Admin only.
    pub fn assign_role(
        env: Env,
        caller: Address,
        principal: Address,
        role: Role,
    ) -> Result<(), LedgerError> {
        caller.require_auth();
        Self::require_initialized(&env)?;
        roles::require_role(&env, &caller, Role::Admin)?;

        if roles::assign(&env, &principal, role) {
            events::publish_role_changed(&env, &principal, role, true);
        }
        Ok(())
    }

    /// Take a role away from `principal`. Admin only; the last Admin and the
    /// last Validator cannot be removed.
    pub fn remove_role(
        env: Env,
        caller: Address,
        principal: Address,
        role: Role,
    ) -> Result<(), LedgerError> {
        caller.require_auth();
        Self::require_initialized(&env)?;
        roles::require_role(&env, &caller, Role::Admin)?;

        if roles::remove(&env, &principal, role)? {
            events::publish_role_changed(&env, &principal, role, false);
            subscription::release(&env, &principal);
        }
        Ok(())
    }

    pub fn has_role(env: Env, principal: Address, role: Role) -> bool {
        roles::has_role(&env, &principal, role)
    }

    pub fn get_roles(env: Env, principal: Address) -> Vec<Role> {
        roles::get_roles(&env, &principal)
    }

    // ======================== Permission Registry ========================

    pub fn grant_access(
        env: Env,
        caller: Address,
        patient_id: String,
        principal: Address,
    ) -> Result<(), LedgerError> {
        caller.require_auth();
        Self::require_initialized(&env)?;
        permissions::grant(&env, &caller, &patient_id, &principal)?;
        Ok(())
    }

    pub fn revoke_access(
        env: Env,
        caller: Address,
        patient_id: String,
        principal: Address,
    ) -> Result<(), LedgerError> {
        caller.require_auth();
        Self::require_initialized(&env)?;
        permissions::revoke(&env, &caller, &patient_id, &principal)?;
        Ok(())
    }

    pub fn is_permitted(env: Env, patient_id: String, principal: Address) -> bool {
        permissions::is_permitted(&env, &patient_id, &principal)
    }

    // ======================== Record Store ========================

    /// Append an unverified record for `patient_id` and return its index.
    pub fn add_record(
        env: Env,
        caller: Address,
        patient_id: String,
        data_hash: String,
        diagnosis_label: String,
    ) -> Result<u32, LedgerError> {
        caller.require_auth();
        Self::require_initialized(&env)?;
        records::append(&env, &caller, &patient_id, &data_hash, &diagnosis_label)
    }

    /// Read every record of a patient. The read is audited with the
    /// configured default purpose.
    pub fn get_records(
        env: Env,
        caller: Address,
        patient_id: String,
    ) -> Result<Vec<MedicalRecord>, LedgerError> {
        caller.require_auth();
        Self::require_initialized(&env)?;
        records::read_all(&env, &caller, &patient_id, None)
    }

    /// Same as `get_records`, recording `purpose` in the audit entry.
    pub fn get_records_for_purpose(
        env: Env,
        caller: Address,
        patient_id: String,
        purpose: String,
    ) -> Result<Vec<MedicalRecord>, LedgerError> {
        caller.require_auth();
        Self::require_initialized(&env)?;
        records::read_all(&env, &caller, &patient_id, Some(purpose))
    }

    /// Read a window of records. Audited like `get_records`.
    pub fn get_records_page(
        env: Env,
        caller: Address,
        patient_id: String,
        purpose: Option<String>,
        start: u32,
        limit: u32,
    ) -> Result<Vec<MedicalRecord>, LedgerError> {
        caller.require_auth();
        Self::require_initialized(&env)?;
        records::read_page(&env, &caller, &patient_id, purpose, start, limit)
    }

    pub fn record_count(env: Env, patient_id: String) -> u32 {
        records::record_count(&env, &patient_id)
    }

    pub fn patient_seq(env: Env, patient_id: String) -> u64 {
        sequence::current(&env, &patient_id)
    }

    // ======================== Verification ========================

    pub fn verify_record(
        env: Env,
        caller: Address,
        patient_id: String,
        index: u32,
    ) -> Result<(), LedgerError> {
        caller.require_auth();
        Self::require_initialized(&env)?;
        verification::verify(&env, &caller, &patient_id, index)?;
        Ok(())
    }

    // ======================== Audit Log ========================

    pub fn get_access_logs(
        env: Env,
        caller: Address,
        patient_id: String,
    ) -> Result<Vec<AccessLogEntry>, LedgerError> {
        caller.require_auth();
        Self::require_initialized(&env)?;
        audit::read_all(&env, &caller, &patient_id)
    }

    pub fn get_audit_head(
        env: Env,
        caller: Address,
        patient_id: String,
    ) -> Result<AuditHead, LedgerError> {
        caller.require_auth();
        Self::require_initialized(&env)?;
        audit::head_for(&env, &caller, &patient_id)
    }

    pub fn verify_audit_chain(
        env: Env,
        caller: Address,
        patient_id: String,
    ) -> Result<bool, LedgerError> {
        caller.require_auth();
        Self::require_initialized(&env)?;
        audit::verify_chain(&env, &caller, &patient_id)
    }

    // ======================== Event Channel ========================

    pub fn subscribe(env: Env, subscriber: Address, kind: EventKind) -> Result<u64, LedgerError> {
        subscriber.require_auth();
        Self::require_initialized(&env)?;
        subscription::subscribe(&env, &subscriber, kind)
    }

    /// Cancels a subscription. `caller` is its owner or an Admin.
    pub fn unsubscribe(env: Env, caller: Address, subscription_id: u64) -> Result<(), LedgerError> {
        caller.require_auth();
        Self::require_initialized(&env)?;
        subscription::unsubscribe(&env, &caller, subscription_id)
    }

    /// Entries after the subscription cursor. Does not acknowledge them.
    pub fn poll_events(
        env: Env,
        subscriber: Address,
        subscription_id: u64,
        limit: u32,
    ) -> Result<Vec<JournalEntry>, LedgerError> {
        subscriber.require_auth();
        Self::require_initialized(&env)?;
        subscription::poll(&env, &subscriber, subscription_id, limit)
    }

    pub fn ack_events(
        env: Env,
        subscriber: Address,
        subscription_id: u64,
        up_to_seq: u64,
    ) -> Result<(), LedgerError> {
        subscriber.require_auth();
        Self::require_initialized(&env)?;
        subscription::ack(&env, &subscriber, subscription_id, up_to_seq)
    }

    pub fn get_subscription(env: Env, subscription_id: u64) -> Result<Subscription, LedgerError> {
        subscription::get(&env, subscription_id)
    }

    pub fn journal_head(env: Env, kind: EventKind) -> u64 {
        subscription::journal_head(&env, kind)
    }

    /// Last journal sequence of `kind` removed by compaction.
    pub fn journal_floor(env: Env, kind: EventKind) -> u64 {
        subscription::journal_floor(&env, kind)
    }

    /// Admin only. Deletes journal entries every active subscription has
    /// acknowledged and returns how many were removed.
    pub fn compact_journal(env: Env, caller: Address, kind: EventKind) -> Result<u32, LedgerError> {
        caller.require_auth();
        Self::require_initialized(&env)?;
        subscription::compact(&env, &caller, kind)
    }

    // ======================== Internal helpers ========================

    fn require_initialized(env: &Env) -> Result<(), LedgerError> {
        if !env.storage().instance().has(&DataKey::Initialized) {
            return Err(LedgerError::NotInitialized);
        }
        Ok(())
    }
}
