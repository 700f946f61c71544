//! Runtime configuration kept in instance storage.

use soroban_sdk::{Env, String};

use crate::errors::LedgerError;
use crate::types::{DataKey, LedgerConfig, DEFAULT_MAX_PAGE_SIZE, DEFAULT_PURPOSE};

pub fn defaults(env: &Env) -> LedgerConfig {
    LedgerConfig {
        default_purpose: String::from_str(env, DEFAULT_PURPOSE),
        max_page_size: DEFAULT_MAX_PAGE_SIZE,
    }
}

pub fn load(env: &Env) -> Result<LedgerConfig, LedgerError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(LedgerError::NotInitialized)
}

pub fn validate(config: &LedgerConfig) -> Result<(), LedgerError> {
    if config.default_purpose.len() == 0 || config.max_page_size == 0 {
        return Err(LedgerError::InvalidInput);
    }
    Ok(())
}

pub fn store(env: &Env, config: &LedgerConfig) {
    env.storage().instance().set(&DataKey::Config, config);
}
