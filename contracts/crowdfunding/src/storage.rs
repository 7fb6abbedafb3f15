//! # Storage
//!
//! Typed helpers over the two Soroban storage tiers used by a campaign.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key      | Type             | Description                    |
//! |----------|------------------|--------------------------------|
//! | `Config` | `CampaignConfig` | Immutable campaign parameters  |
//! | `State`  | `CampaignState`  | Status and aggregate totals    |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                     | Type   | Description                  |
//! |-------------------------|--------|------------------------------|
//! | `Contribution(address)` | `i128` | Recorded amount per account  |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.
//! A zero amount is never stored: withdrawn entries are removed and a missing
//! entry reads as 0.

use soroban_sdk::{contracttype, Address, Env};

use crate::types::{CampaignConfig, CampaignState};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Immutable campaign parameters (Instance).
    Config,
    /// Mutable campaign bookkeeping (Instance).
    State,
    /// Recorded contribution of one account (Persistent).
    Contribution(Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

/// Write the config and the initial state of a freshly created campaign.
pub fn save_campaign(env: &Env, config: &CampaignConfig, state: &CampaignState) {
    env.storage().instance().set(&DataKey::Config, config);
    env.storage().instance().set(&DataKey::State, state);
    bump_instance(env);
}

pub fn load_config(env: &Env) -> Result<CampaignConfig, Error> {
    let config = env
        .storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)?;
    bump_instance(env);
    Ok(config)
}

pub fn load_state(env: &Env) -> Result<CampaignState, Error> {
    let state = env
        .storage()
        .instance()
        .get(&DataKey::State)
        .ok_or(Error::NotInitialized)?;
    bump_instance(env);
    Ok(state)
}

/// Load config and state together (the common read pattern of every operation).
pub fn load_campaign_pair(env: &Env) -> Result<(CampaignConfig, CampaignState), Error> {
    Ok((load_config(env)?, load_state(env)?))
}

pub fn save_state(env: &Env, state: &CampaignState) {
    env.storage().instance().set(&DataKey::State, state);
    bump_instance(env);
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Recorded contribution of `contributor`, or 0 if none.
pub fn contribution_of(env: &Env, contributor: &Address) -> i128 {
    let key = DataKey::Contribution(contributor.clone());
    match env.storage().persistent().get::<_, i128>(&key) {
        Some(amount) => {
            bump_persistent(env, &key);
            amount
        }
        None => 0,
    }
}

/// Store `amount` for `contributor`; a zero amount removes the entry.
pub fn set_contribution(env: &Env, contributor: &Address, amount: i128) {
    let key = DataKey::Contribution(contributor.clone());
    if amount == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &amount);
        bump_persistent(env, &key);
    }
}
