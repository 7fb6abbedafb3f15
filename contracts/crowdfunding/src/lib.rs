//! # Crowdfunding Campaign Contract
//!
//! A single deadline-bound campaign per contract instance. Contributors pledge
//! the campaign token until the deadline; afterwards anyone may finalize, and
//! the outcome unlocks exactly one kind of settlement:
//!
//! | Phase        | Entry Point(s)                                   |
//! |--------------|--------------------------------------------------|
//! | Bootstrap    | [`CrowdfundingCampaign::init`]                   |
//! | Funding      | [`CrowdfundingCampaign::contribute`]             |
//! | Finalization | [`CrowdfundingCampaign::finalize`]               |
//! | Settlement   | [`CrowdfundingCampaign::collect`], [`CrowdfundingCampaign::withdraw`] |
//! | Queries      | `get_campaign`, `state`, `total_collected`, `amount_of`, ... |
//!
//! ## Architecture
//!
//! The state machine lives in [`ledger`] and only sees the host through the
//! [`host::Clock`] and [`host::ValueTransfer`] traits. Storage access is
//! delegated to [`storage`]. This file contains the public entry points,
//! authorization, and the wiring of the on-chain capabilities.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, Address, Env, String};

pub mod events;
pub mod host;
pub mod ledger;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;
#[cfg(test)]
mod testutils;

use host::{LedgerClock, TokenTransfer};
use ledger::CampaignLedger;
pub use types::{Campaign, CampaignStatus};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    InvalidParameters = 1,
    CampaignClosed = 2,
    DeadlinePassed = 3,
    TooEarly = 4,
    AlreadyFinalized = 5,
    NotBeneficiary = 6,
    InvalidState = 7,
    InvalidAmount = 8,
    Overflow = 9,
    AlreadyInitialized = 10,
    NotInitialized = 11,
}

#[contract]
pub struct CrowdfundingCampaign;

#[contractimpl]
impl CrowdfundingCampaign {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Create the campaign. Must be called exactly once, right after deployment.
    ///
    /// - `creator` must authorize the call and is recorded with the campaign.
    /// - `token` is the asset contributions are made in.
    /// - `target_amount` must be positive.
    /// - The deadline is `duration_in_minutes` (must be positive) after the
    ///   current ledger timestamp.
    pub fn init(
        env: Env,
        creator: Address,
        name: String,
        token: Address,
        target_amount: i128,
        duration_in_minutes: u64,
        beneficiary: Address,
    ) -> Result<Campaign, Error> {
        creator.require_auth();
        let ledger = CampaignLedger::new(
            &env,
            LedgerClock::new(&env),
            TokenTransfer::new(&env, token.clone()),
        );
        ledger.create(
            creator,
            name,
            token,
            target_amount,
            duration_in_minutes,
            beneficiary,
        )
    }

    // ─────────────────────────────────────────────────────────
    // Campaign lifecycle
    // ─────────────────────────────────────────────────────────

    /// Contribute `amount` of the campaign token.
    ///
    /// `contributor` must authorize; the tokens move into the contract in the
    /// same invocation. Returns the contributor's recorded total.
    pub fn contribute(env: Env, contributor: Address, amount: i128) -> Result<i128, Error> {
        contributor.require_auth();
        Self::on_chain(&env)?.contribute(&contributor, amount)
    }

    /// Close the campaign after the deadline. Callable by anyone.
    pub fn finalize(env: Env) -> Result<CampaignStatus, Error> {
        Self::on_chain(&env)?.finalize()
    }

    /// Pay the collected funds to the beneficiary of a succeeded campaign.
    pub fn collect(env: Env, caller: Address) -> Result<i128, Error> {
        caller.require_auth();
        Self::on_chain(&env)?.collect(&caller)
    }

    /// Refund the caller's contribution from a failed campaign.
    ///
    /// Returns 0 without error when nothing is recorded for `caller`.
    pub fn withdraw(env: Env, caller: Address) -> Result<i128, Error> {
        caller.require_auth();
        Self::on_chain(&env)?.withdraw(&caller)
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    /// Parameters and current bookkeeping in one view.
    pub fn get_campaign(env: Env) -> Result<Campaign, Error> {
        let (config, state) = storage::load_campaign_pair(&env)?;
        Ok(Campaign::from_parts(config, state))
    }

    /// Account that created the campaign.
    pub fn creator(env: Env) -> Result<Address, Error> {
        Ok(storage::load_config(&env)?.creator)
    }

    /// Display name given at creation.
    pub fn name(env: Env) -> Result<String, Error> {
        Ok(storage::load_config(&env)?.name)
    }

    /// Asset contributions are made in.
    pub fn token(env: Env) -> Result<Address, Error> {
        Ok(storage::load_config(&env)?.token)
    }

    /// Amount that must be reached by the deadline.
    pub fn target_amount(env: Env) -> Result<i128, Error> {
        Ok(storage::load_config(&env)?.target_amount)
    }

    /// Ledger timestamp at which funding closes.
    pub fn funding_deadline(env: Env) -> Result<u64, Error> {
        Ok(storage::load_config(&env)?.funding_deadline)
    }

    /// Account paid on success.
    pub fn beneficiary(env: Env) -> Result<Address, Error> {
        Ok(storage::load_config(&env)?.beneficiary)
    }

    /// Current lifecycle state.
    pub fn state(env: Env) -> Result<CampaignStatus, Error> {
        Ok(storage::load_state(&env)?.status)
    }

    /// Sum currently held for the campaign.
    pub fn total_collected(env: Env) -> Result<i128, Error> {
        Ok(storage::load_state(&env)?.total_collected)
    }

    /// Distinct accounts that have contributed.
    pub fn contributor_count(env: Env) -> Result<u32, Error> {
        Ok(storage::load_state(&env)?.contributor_count)
    }

    /// Recorded contribution of `contributor` (0 if none or refunded).
    pub fn amount_of(env: Env, contributor: Address) -> i128 {
        storage::contribution_of(&env, &contributor)
    }

    /// `true` while the ledger timestamp is before the funding deadline.
    pub fn before_deadline(env: Env) -> Result<bool, Error> {
        Self::on_chain(&env)?.before_deadline()
    }

    // ─────────────────────────────────────────────────────────
    // Internal Helpers
    // ─────────────────────────────────────────────────────────

    fn on_chain(env: &Env) -> Result<CampaignLedger<'_, LedgerClock<'_>, TokenTransfer<'_>>, Error> {
        let config = storage::load_config(env)?;
        Ok(CampaignLedger::new(
            env,
            LedgerClock::new(env),
            TokenTransfer::new(env, config.token),
        ))
    }
}
