//! # Types
//!
//! Data structures shared by the ledger, storage, and entry points.
//!
//! ## Config / State split
//!
//! A campaign is stored as two instance entries:
//!
//! - [`CampaignConfig`] - written once by `init`; never mutated.
//! - [`CampaignState`] - rewritten on every contribution, on finalization,
//!   on payout and on each refund.
//!
//! The public API exposes the reconstructed [`Campaign`].
//!
//! ## Status as a Finite-State Machine
//!
//! ```text
//! Ongoing ──finish(true)──► Succeeded ──pay_out──► PaidOut
//!    └─────finish(false)──► Failed
//! ```
//!
//! Every other transition is rejected by the transition functions below.

use soroban_sdk::{contracttype, Address, String};

use crate::Error;

/// Lifecycle status of the campaign.
///
/// Discriminants are part of the public interface (`state()` returns them).
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CampaignStatus {
    /// Accepting contributions until the deadline.
    Ongoing = 0,
    /// Deadline passed below target; contributors may withdraw.
    Failed = 1,
    /// Deadline passed at or above target; beneficiary may collect.
    Succeeded = 2,
    /// Beneficiary collected the funds. Terminal.
    PaidOut = 3,
}

impl CampaignStatus {
    /// Finalization: `Ongoing` moves to `Succeeded` or `Failed`.
    pub fn finish(self, succeeded: bool) -> Result<Self, Error> {
        match self {
            CampaignStatus::Ongoing if succeeded => Ok(CampaignStatus::Succeeded),
            CampaignStatus::Ongoing => Ok(CampaignStatus::Failed),
            CampaignStatus::Failed | CampaignStatus::Succeeded | CampaignStatus::PaidOut => {
                Err(Error::AlreadyFinalized)
            }
        }
    }

    /// Payout: only `Succeeded` moves to `PaidOut`.
    pub fn pay_out(self) -> Result<Self, Error> {
        match self {
            CampaignStatus::Succeeded => Ok(CampaignStatus::PaidOut),
            CampaignStatus::Ongoing | CampaignStatus::Failed | CampaignStatus::PaidOut => {
                Err(Error::InvalidState)
            }
        }
    }

    pub fn accepts_contributions(self) -> bool {
        matches!(self, CampaignStatus::Ongoing)
    }

    pub fn allows_refunds(self) -> bool {
        matches!(self, CampaignStatus::Failed)
    }

    pub fn is_finalized(self) -> bool {
        !matches!(self, CampaignStatus::Ongoing)
    }
}

/// Immutable campaign parameters, written once at creation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignConfig {
    /// Account that authorized `init`.
    pub creator: Address,
    pub name: String,
    /// Stellar Asset Contract used for every contribution and settlement.
    pub token: Address,
    pub target_amount: i128,
    /// Absolute ledger timestamp (seconds).
    pub funding_deadline: u64,
    pub beneficiary: Address,
}

/// Mutable campaign bookkeeping.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignState {
    pub status: CampaignStatus,
    /// Sum of recorded contributions while `Ongoing`/`Failed`; frozen from
    /// `Succeeded` on.
    pub total_collected: i128,
    /// Distinct contributors ever recorded. Never decreases.
    pub contributor_count: u32,
}

impl CampaignState {
    pub fn new() -> Self {
        CampaignState {
            status: CampaignStatus::Ongoing,
            total_collected: 0,
            contributor_count: 0,
        }
    }
}

impl Default for CampaignState {
    fn default() -> Self {
        Self::new()
    }
}

/// Full view of the campaign returned by `get_campaign`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Campaign {
    pub creator: Address,
    pub name: String,
    pub token: Address,
    pub target_amount: i128,
    pub funding_deadline: u64,
    pub beneficiary: Address,
    pub status: CampaignStatus,
    pub total_collected: i128,
    pub contributor_count: u32,
}

impl Campaign {
    pub fn from_parts(config: CampaignConfig, state: CampaignState) -> Self {
        Campaign {
            creator: config.creator,
            name: config.name,
            token: config.token,
            target_amount: config.target_amount,
            funding_deadline: config.funding_deadline,
            beneficiary: config.beneficiary,
            status: state.status,
            total_collected: state.total_collected,
            contributor_count: state.contributor_count,
        }
    }

    /// True once no settlement action can move value any more.
    pub fn is_settled(&self) -> bool {
        match self.status {
            CampaignStatus::PaidOut => true,
            CampaignStatus::Failed => self.total_collected == 0,
            CampaignStatus::Ongoing | CampaignStatus::Succeeded => false,
        }
    }
}
