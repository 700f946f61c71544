//! Role registry: principal → role set.
//!
//! The ledger is seeded with exactly one `Admin` and one `Validator` at
//! initialization. Admins may assign further holders or rotate roles, but the
//! last holder of `Admin` or `Validator` can never be removed, so the ledger
//! always has someone able to grant access and someone able to verify.
//!
//! ## Storage keys
//!
//! - `Roles(principal)` → `Vec<Role>`
//! - `RoleCount(role)` → `u32`

use ledger_common::ttl;
use soroban_sdk::{log, Address, Env, Vec};

use crate::errors::LedgerError;
use crate::types::{DataKey, Role};

pub fn get_roles(env: &Env, principal: &Address) -> Vec<Role> {
    env.storage()
        .persistent()
        .get(&DataKey::Roles(principal.clone()))
        .unwrap_or(Vec::new(env))
}

pub fn has_role(env: &Env, principal: &Address, role: Role) -> bool {
    get_roles(env, principal).contains(role)
}

pub fn role_count(env: &Env, role: Role) -> u32 {
    env.storage()
        .persistent()
        .get(&DataKey::RoleCount(role))
        .unwrap_or(0)
}

pub fn require_role(env: &Env, caller: &Address, role: Role) -> Result<(), LedgerError> {
    if !has_role(env, caller, role) {
        log!(env, "role check failed", caller.clone(), role);
        return Err(LedgerError::Unauthorized);
    }
    Ok(())
}

/// Passes when `caller` holds at least one of `roles`.
pub fn require_any_role(env: &Env, caller: &Address, roles: &[Role]) -> Result<(), LedgerError> {
    let held = get_roles(env, caller);
    if roles.iter().any(|role| held.contains(*role)) {
        return Ok(());
    }
    Err(LedgerError::Unauthorized)
}

/// Adds `role` to `principal`. Returns `false` if it was already held.
#[allow(clippy::arithmetic_side_effects)]
pub fn assign(env: &Env, principal: &Address, role: Role) -> bool {
    let mut roles = get_roles(env, principal);
    if roles.contains(role) {
        return false;
    }
    roles.push_back(role);
    ttl::set_persistent(env, &DataKey::Roles(principal.clone()), &roles);
    ttl::set_persistent(env, &DataKey::RoleCount(role), &(role_count(env, role) + 1));
    true
}

/// Removes `role` from `principal`. Returns `false` if it was not held.
#[allow(clippy::arithmetic_side_effects)]
pub fn remove(env: &Env, principal: &Address, role: Role) -> Result<bool, LedgerError> {
    let roles = get_roles(env, principal);
    let Some(position) = roles.first_index_of(role) else {
        return Ok(false);
    };

    let count = role_count(env, role);
    if matches!(role, Role::Admin | Role::Validator) && count <= 1 {
        return Err(LedgerError::LastRoleHolder);
    }

    let mut roles = roles;
    roles.remove(position);
    ttl::set_persistent(env, &DataKey::Roles(principal.clone()), &roles);
    ttl::set_persistent(env, &DataKey::RoleCount(role), &count.saturating_sub(1));
    Ok(true)
}
