//! # Campaign ledger
//!
//! The campaign state machine. Each operation loads the campaign, checks its
//! preconditions, commits the new bookkeeping, and only then touches value
//! through the injected [`ValueTransfer`] (checks, effects, interactions).
//! Code re-entering from inside `receive` or `transfer` therefore always
//! observes the state the outer call has already committed.
//!
//! An `Err` return leaves storage untouched: every check runs before the
//! first write.

use soroban_sdk::{Address, Env, String};

use crate::events;
use crate::host::{Clock, ValueTransfer};
use crate::storage;
use crate::types::{Campaign, CampaignConfig, CampaignState, CampaignStatus};
use crate::Error;

const SECONDS_PER_MINUTE: u64 = 60;

pub struct CampaignLedger<'a, C, T> {
    env: &'a Env,
    clock: C,
    custody: T,
}

impl<'a, C: Clock, T: ValueTransfer> CampaignLedger<'a, C, T> {
    pub fn new(env: &'a Env, clock: C, custody: T) -> Self {
        CampaignLedger {
            env,
            clock,
            custody,
        }
    }

    /// Create the campaign with its deadline `duration_in_minutes` from now.
    pub fn create(
        &self,
        creator: Address,
        name: String,
        token: Address,
        target_amount: i128,
        duration_in_minutes: u64,
        beneficiary: Address,
    ) -> Result<Campaign, Error> {
        if storage::is_initialized(self.env) {
            return Err(Error::AlreadyInitialized);
        }
        if target_amount <= 0 || duration_in_minutes == 0 {
            return Err(Error::InvalidParameters);
        }
        let funding_deadline = duration_in_minutes
            .checked_mul(SECONDS_PER_MINUTE)
            .and_then(|secs| self.clock.now().checked_add(secs))
            .ok_or(Error::InvalidParameters)?;

        let config = CampaignConfig {
            creator,
            name,
            token,
            target_amount,
            funding_deadline,
            beneficiary,
        };
        let state = CampaignState::new();
        storage::save_campaign(self.env, &config, &state);

        events::emit_campaign_created(
            self.env,
            config.beneficiary.clone(),
            config.token.clone(),
            target_amount,
            funding_deadline,
        );
        Ok(Campaign::from_parts(config, state))
    }

    /// Record `amount` from `contributor`. Returns the contributor's new total.
    pub fn contribute(&self, contributor: &Address, amount: i128) -> Result<i128, Error> {
        let (config, mut state) = storage::load_campaign_pair(self.env)?;

        if !state.status.accepts_contributions() {
            return Err(Error::CampaignClosed);
        }
        if self.clock.now() >= config.funding_deadline {
            return Err(Error::DeadlinePassed);
        }
        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let previous = storage::contribution_of(self.env, contributor);
        let recorded = previous.checked_add(amount).ok_or(Error::Overflow)?;
        state.total_collected = state
            .total_collected
            .checked_add(amount)
            .ok_or(Error::Overflow)?;
        if previous == 0 {
            state.contributor_count = state
                .contributor_count
                .checked_add(1)
                .ok_or(Error::Overflow)?;
        }

        storage::set_contribution(self.env, contributor, recorded);
        storage::save_state(self.env, &state);
        events::emit_contribution_received(
            self.env,
            contributor.clone(),
            amount,
            state.total_collected,
        );

        // A failed pull traps and rolls the writes above back.
        self.custody.receive(contributor, amount);
        Ok(recorded)
    }

    /// Close the campaign once the deadline has passed. Permissionless.
    pub fn finalize(&self) -> Result<CampaignStatus, Error> {
        let (config, mut state) = storage::load_campaign_pair(self.env)?;

        if state.status.is_finalized() {
            return Err(Error::AlreadyFinalized);
        }
        if self.clock.now() < config.funding_deadline {
            return Err(Error::TooEarly);
        }

        let succeeded = state.total_collected >= config.target_amount;
        state.status = state.status.finish(succeeded)?;
        storage::save_state(self.env, &state);

        events::emit_campaign_finished(self.env, state.total_collected, succeeded);
        Ok(state.status)
    }

    /// Pay the whole collected amount to the beneficiary. Returns the amount paid.
    pub fn collect(&self, caller: &Address) -> Result<i128, Error> {
        let (config, mut state) = storage::load_campaign_pair(self.env)?;

        if *caller != config.beneficiary {
            return Err(Error::NotBeneficiary);
        }
        state.status = state.status.pay_out()?;
        let amount = state.total_collected;

        // PaidOut must be durable before value leaves custody.
        storage::save_state(self.env, &state);
        self.custody.transfer(&config.beneficiary, amount);

        events::emit_funds_collected(self.env, config.beneficiary, amount);
        Ok(amount)
    }

    /// Refund the caller's recorded contribution. Returns the amount refunded,
    /// 0 when nothing is recorded.
    pub fn withdraw(&self, caller: &Address) -> Result<i128, Error> {
        let mut state = storage::load_state(self.env)?;

        if !state.status.allows_refunds() {
            return Err(Error::InvalidState);
        }

        let amount = storage::contribution_of(self.env, caller);
        if amount == 0 {
            return Ok(0);
        }
        state.total_collected = state
            .total_collected
            .checked_sub(amount)
            .ok_or(Error::Overflow)?;

        // Zero the claim before value leaves custody.
        storage::set_contribution(self.env, caller, 0);
        storage::save_state(self.env, &state);
        self.custody.transfer(caller, amount);

        events::emit_contribution_refunded(self.env, caller.clone(), amount);
        Ok(amount)
    }

    pub fn before_deadline(&self) -> Result<bool, Error> {
        let config = storage::load_config(self.env)?;
        Ok(self.clock.now() < config.funding_deadline)
    }
}
