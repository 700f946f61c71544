//! Cursor-based subscriptions over the per-kind event journal.
//!
//! Each [`EventKind`] owns a journal: a dense sequence of [`JournalEntry`]
//! values numbered from 1, with the last assigned number in
//! `JournalHead(kind)`. A notification is only journaled while its kind has
//! at least one active subscription, so publishing never writes shared state
//! for kinds nobody consumes.
//!
//! A subscription starts at the journal head as it was when it was created:
//! history is not replayed. Consumers read with [`poll`] and confirm with
//! [`ack`]. Polling never moves the cursor, so anything not acknowledged is
//! delivered again on the next poll (at-least-once).
//!
//! A subscription ends when its owner or an Admin cancels it, or when its
//! owner loses the last consumer role. Admins reclaim storage with
//! [`compact`], which deletes every entry all active subscriptions have
//! acknowledged.
//!
//! ## Storage keys
//!
//! - `SubscriptionCounter` (instance) → `u64`
//! - `Subscription(id)` → [`Subscription`]
//! - `ActiveSubscriptions(kind)` → `Vec<u64>`
//! - `JournalHead(kind)` → `u64`
//! - `JournalFloor(kind)` → `u64`, last sequence removed by compaction
//! - `Journal(kind, seq)` → [`JournalEntry`]

use ledger_common::ttl;
use soroban_sdk::{contracttype, log, Address, Env, Vec};

use crate::config;
use crate::errors::LedgerError;
use crate::events::{self, EventKind, EventPayload};
use crate::roles;
use crate::types::{DataKey, Role};

/// Roles allowed to consume the event channel.
const CONSUMER_ROLES: [Role; 3] = [Role::Admin, Role::Validator, Role::Subscriber];

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Subscription {
    pub id: u64,
    pub subscriber: Address,
    pub kind: EventKind,
    /// Sequence number of the last acknowledged journal entry.
    pub cursor: u64,
    pub created_at: u64,
    pub active: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct JournalEntry {
    pub seq: u64,
    pub kind: EventKind,
    pub payload: EventPayload,
    pub ledger_ts: u64,
}

// ── Journal ──────────────────────────────────────────────────────────────────

pub fn journal_head(env: &Env, kind: EventKind) -> u64 {
    env.storage()
        .persistent()
        .get(&DataKey::JournalHead(kind))
        .unwrap_or(0)
}

pub fn journal_floor(env: &Env, kind: EventKind) -> u64 {
    env.storage()
        .persistent()
        .get(&DataKey::JournalFloor(kind))
        .unwrap_or(0)
}

fn active_ids(env: &Env, kind: EventKind) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&DataKey::ActiveSubscriptions(kind))
        .unwrap_or(Vec::new(env))
}

pub fn subscriber_count(env: &Env, kind: EventKind) -> u32 {
    active_ids(env, kind).len()
}

/// Appends `payload` to its kind's journal if anyone is listening.
#[allow(clippy::arithmetic_side_effects)]
pub fn enqueue(env: &Env, payload: EventPayload) {
    let kind = payload.kind();
    if subscriber_count(env, kind) == 0 {
        return;
    }

    let seq = journal_head(env, kind) + 1;
    let entry = JournalEntry {
        seq,
        kind,
        payload,
        ledger_ts: env.ledger().timestamp(),
    };
    ttl::set_persistent(env, &DataKey::Journal(kind, seq), &entry);
    ttl::set_persistent(env, &DataKey::JournalHead(kind), &seq);
}

// ── Subscription lifecycle ───────────────────────────────────────────────────

#[allow(clippy::arithmetic_side_effects)]
fn next_subscription_id(env: &Env) -> u64 {
    let next = env
        .storage()
        .instance()
        .get::<_, u64>(&DataKey::SubscriptionCounter)
        .unwrap_or(0)
        + 1;
    env.storage()
        .instance()
        .set(&DataKey::SubscriptionCounter, &next);
    next
}

pub fn get(env: &Env, subscription_id: u64) -> Result<Subscription, LedgerError> {
    env.storage()
        .persistent()
        .get(&DataKey::Subscription(subscription_id))
        .ok_or(LedgerError::NotFound)
}

/// Loads an active subscription owned by `subscriber` whose owner still holds
/// a consumer role.
fn owned_active(
    env: &Env,
    subscriber: &Address,
    subscription_id: u64,
) -> Result<Subscription, LedgerError> {
    let sub = get(env, subscription_id)?;
    if sub.subscriber != *subscriber {
        return Err(LedgerError::Unauthorized);
    }
    if !sub.active {
        return Err(LedgerError::NotFound);
    }
    roles::require_any_role(env, subscriber, &CONSUMER_ROLES)?;
    Ok(sub)
}

pub fn subscribe(env: &Env, subscriber: &Address, kind: EventKind) -> Result<u64, LedgerError> {
    roles::require_any_role(env, subscriber, &CONSUMER_ROLES)?;

    let id = next_subscription_id(env);
    let sub = Subscription {
        id,
        subscriber: subscriber.clone(),
        kind,
        cursor: journal_head(env, kind),
        created_at: env.ledger().timestamp(),
        active: true,
    };
    ttl::set_persistent(env, &DataKey::Subscription(id), &sub);
    let mut active = active_ids(env, kind);
    active.push_back(id);
    ttl::set_persistent(env, &DataKey::ActiveSubscriptions(kind), &active);

    log!(env, "subscription created", id, kind);
    Ok(id)
}

fn deactivate(env: &Env, mut sub: Subscription) {
    sub.active = false;
    ttl::set_persistent(env, &DataKey::Subscription(sub.id), &sub);

    let mut active = active_ids(env, sub.kind);
    if let Some(position) = active.first_index_of(sub.id) {
        active.remove(position);
    }
    ttl::set_persistent(env, &DataKey::ActiveSubscriptions(sub.kind), &active);
    log!(env, "subscription closed", sub.id, sub.kind);
}

/// Cancels a subscription. Allowed for its owner and for any Admin.
/// Cancelling an inactive subscription is a no-op.
pub fn unsubscribe(env: &Env, caller: &Address, subscription_id: u64) -> Result<(), LedgerError> {
    let sub = get(env, subscription_id)?;
    if sub.subscriber != *caller {
        roles::require_role(env, caller, Role::Admin)?;
    }
    if sub.active {
        deactivate(env, sub);
    }
    Ok(())
}

/// Closes every active subscription owned by `principal` once it holds no
/// consumer role. Returns the number closed.
#[allow(clippy::arithmetic_side_effects)]
pub fn release(env: &Env, principal: &Address) -> u32 {
    if roles::require_any_role(env, principal, &CONSUMER_ROLES).is_ok() {
        return 0;
    }

    let mut closed = 0u32;
    for kind in EventKind::ALL {
        for id in active_ids(env, kind).iter() {
            if let Ok(sub) = get(env, id) {
                if sub.subscriber == *principal {
                    deactivate(env, sub);
                    closed += 1;
                }
            }
        }
    }
    closed
}

// ── Compaction ───────────────────────────────────────────────────────────────

/// Deletes journal entries of `kind` that every active subscription has
/// acknowledged, or the whole journal when nobody is subscribed. The head
/// is preserved so sequence numbers never repeat. Returns the number of
/// entries removed.
#[allow(clippy::arithmetic_side_effects)]
pub fn compact(env: &Env, caller: &Address, kind: EventKind) -> Result<u32, LedgerError> {
    roles::require_role(env, caller, Role::Admin)?;

    let mut target = journal_head(env, kind);
    for id in active_ids(env, kind).iter() {
        let sub = get(env, id)?;
        target = target.min(sub.cursor);
    }

    let floor = journal_floor(env, kind);
    if target <= floor {
        return Ok(0);
    }

    let mut removed = 0u32;
    let mut seq = floor + 1;
    while seq <= target {
        let key = DataKey::Journal(kind, seq);
        if env.storage().persistent().has(&key) {
            env.storage().persistent().remove(&key);
            removed += 1;
        }
        seq += 1;
    }
    ttl::set_persistent(env, &DataKey::JournalFloor(kind), &target);

    log!(env, "journal compacted", kind, target, removed);
    events::publish_journal_compacted(env, kind, target, removed);
    Ok(removed)
}

// ── Consumption ──────────────────────────────────────────────────────────────

/// Returns up to `limit` entries after the subscription's cursor.
#[allow(clippy::arithmetic_side_effects)]
pub fn poll(
    env: &Env,
    subscriber: &Address,
    subscription_id: u64,
    limit: u32,
) -> Result<Vec<JournalEntry>, LedgerError> {
    let sub = owned_active(env, subscriber, subscription_id)?;
    if limit == 0 || limit > config::load(env)?.max_page_size {
        return Err(LedgerError::InvalidInput);
    }

    let head = journal_head(env, sub.kind);
    let end = sub.cursor.saturating_add(limit as u64).min(head);
    let mut out = Vec::new(env);
    let mut seq = sub.cursor + 1;
    while seq <= end {
        if let Some(entry) = env
            .storage()
            .persistent()
            .get::<_, JournalEntry>(&DataKey::Journal(sub.kind, seq))
        {
            out.push_back(entry);
        }
        seq += 1;
    }
    Ok(out)
}

/// Moves the cursor to `up_to_seq`, which must lie between the current cursor
/// and the journal head.
pub fn ack(
    env: &Env,
    subscriber: &Address,
    subscription_id: u64,
    up_to_seq: u64,
) -> Result<(), LedgerError> {
    let mut sub = owned_active(env, subscriber, subscription_id)?;
    if up_to_seq < sub.cursor || up_to_seq > journal_head(env, sub.kind) {
        return Err(LedgerError::InvalidInput);
    }

    sub.cursor = up_to_seq;
    ttl::set_persistent(env, &DataKey::Subscription(subscription_id), &sub);
    Ok(())
}
