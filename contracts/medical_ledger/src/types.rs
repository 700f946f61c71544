//! Storage keys and the data model persisted by the ledger.

use soroban_sdk::{contracttype, Address, BytesN, String};

use crate::events::EventKind;

/// Purpose recorded on audit entries when the reader does not supply one.
pub const DEFAULT_PURPOSE: &str = "Clinical review";
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 50;

/// Storage keys.
///
/// Every per-patient key embeds the patient id so that operations on
/// different patients touch disjoint ledger entries.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Initialized,
    Config,
    Roles(Address),
    RoleCount(Role),
    Permission(String, Address),
    RecordCount(String),
    Record(String, u32),
    AuditEntry(String, u32),
    AuditHead(String),
    PatientSeq(String),
    SubscriptionCounter,
    Subscription(u64),
    ActiveSubscriptions(EventKind),
    JournalHead(EventKind),
    JournalFloor(EventKind),
    Journal(EventKind, u64),
}

#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    /// Grants and revokes access, reads audit logs, manages roles.
    Admin,
    /// Verifies records.
    Validator,
    /// May consume the event channel.
    Subscriber,
}

/// A medical record entry. `data_hash` addresses the off-ledger payload.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MedicalRecord {
    pub patient_id: String,
    pub data_hash: String,
    pub diagnosis_label: String,
    pub created_at: u64,
    pub created_by: Address,
    pub verified: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessLogEntry {
    pub accessed_by: Address,
    pub timestamp: u64,
    pub purpose: String,
}

/// Tip of a patient's audit hash chain.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuditHead {
    pub count: u32,
    pub head_hash: BytesN<32>,
}

/// Runtime configuration, stored in instance storage.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LedgerConfig {
    pub default_purpose: String,
    /// Upper bound for paged reads and event polls.
    pub max_page_size: u32,
}
