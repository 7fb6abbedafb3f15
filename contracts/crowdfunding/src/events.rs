//! # Events
//!
//! Every externally visible transition publishes one event. The topic vector
//! starts with a short symbol; per-account events carry the account as the
//! second topic so indexers can filter on it.
//!
//! | Topic                      | Payload                 |
//! |----------------------------|-------------------------|
//! | `("created",)`             | [`CampaignCreated`]      |
//! | `("contrib", contributor)` | [`ContributionReceived`] |
//! | `("finished",)`            | [`CampaignFinished`]     |
//! | `("collected",)`           | [`FundsCollected`]       |
//! | `("refunded", contributor)`| [`ContributionRefunded`] |

use soroban_sdk::{contracttype, symbol_short, Address, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignCreated {
    pub beneficiary: Address,
    pub token: Address,
    pub target_amount: i128,
    pub funding_deadline: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContributionReceived {
    pub contributor: Address,
    pub amount: i128,
    /// Campaign total after this contribution.
    pub total_collected: i128,
}

/// Published exactly once, by the call that finalizes the campaign.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignFinished {
    pub total_collected: i128,
    pub succeeded: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FundsCollected {
    pub beneficiary: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContributionRefunded {
    pub contributor: Address,
    pub amount: i128,
}

pub fn emit_campaign_created(
    env: &Env,
    beneficiary: Address,
    token: Address,
    target_amount: i128,
    funding_deadline: u64,
) {
    env.events().publish(
        (symbol_short!("created"),),
        CampaignCreated {
            beneficiary,
            token,
            target_amount,
            funding_deadline,
        },
    );
}

pub fn emit_contribution_received(
    env: &Env,
    contributor: Address,
    amount: i128,
    total_collected: i128,
) {
    env.events().publish(
        (symbol_short!("contrib"), contributor.clone()),
        ContributionReceived {
            contributor,
            amount,
            total_collected,
        },
    );
}

pub fn emit_campaign_finished(env: &Env, total_collected: i128, succeeded: bool) {
    env.events().publish(
        (symbol_short!("finished"),),
        CampaignFinished {
            total_collected,
            succeeded,
        },
    );
}

pub fn emit_funds_collected(env: &Env, beneficiary: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("collected"),),
        FundsCollected {
            beneficiary,
            amount,
        },
    );
}

pub fn emit_contribution_refunded(env: &Env, contributor: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("refunded"), contributor.clone()),
        ContributionRefunded {
            contributor,
            amount,
        },
    );
}
