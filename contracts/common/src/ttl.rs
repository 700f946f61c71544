//! Storage TTL policy shared by the ledger contracts.
//!
//! Ledger entries are never deleted by the contract (apart from revoked
//! grants), so every write also bumps the entry's TTL to keep records and
//! audit entries live on the network.

use soroban_sdk::{Env, IntoVal, Val};

/// ~30 days of ledgers at 5s close time.
pub const PERSISTENT_TTL_THRESHOLD: u32 = 518_400;
/// ~60 days of ledgers at 5s close time.
pub const PERSISTENT_TTL_EXTEND_TO: u32 = 1_036_800;

pub const INSTANCE_TTL_THRESHOLD: u32 = 518_400;
pub const INSTANCE_TTL_EXTEND_TO: u32 = 1_036_800;

/// Writes `value` under `key` in persistent storage and extends its TTL.
pub fn set_persistent<K, V>(env: &Env, key: &K, value: &V)
where
    K: IntoVal<Env, Val>,
    V: IntoVal<Env, Val>,
{
    env.storage().persistent().set(key, value);
    extend_persistent(env, key);
}

/// Extends the TTL of an existing persistent entry.
pub fn extend_persistent<K>(env: &Env, key: &K)
where
    K: IntoVal<Env, Val>,
{
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_TTL_THRESHOLD, PERSISTENT_TTL_EXTEND_TO);
}

pub fn extend_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_TTL_THRESHOLD, INSTANCE_TTL_EXTEND_TO);
}
