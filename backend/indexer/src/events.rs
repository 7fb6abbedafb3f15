//! Event types emitted by the crowdfunding campaign contract, plus the
//! per-campaign read model derived from them.
//!
//! These mirror the contract events defined in
//! `contracts/crowdfunding/src/events.rs`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::errors::{IndexerError, Result};

/// All recognised event kinds from the campaign contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The campaign was initialised (`created` topic).
    CampaignCreated,
    /// A contribution was recorded (`contrib` topic).
    ContributionReceived,
    /// The campaign was finalized (`finished` topic).
    CampaignFinished,
    /// The beneficiary collected the funds (`collected` topic).
    FundsCollected,
    /// A contributor was refunded (`refunded` topic).
    ContributionRefunded,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    const ALL: [EventKind; 6] = [
        Self::CampaignCreated,
        Self::ContributionReceived,
        Self::CampaignFinished,
        Self::FundsCollected,
        Self::ContributionRefunded,
        Self::Unknown,
    ];

    /// Parse the leading topic symbol of a contract event.
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "created" => Self::CampaignCreated,
            "contrib" => Self::ContributionReceived,
            "finished" => Self::CampaignFinished,
            "collected" => Self::FundsCollected,
            "refunded" => Self::ContributionRefunded,
            _ => Self::Unknown,
        }
    }

    /// Identifier stored in the `event_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CampaignCreated => "campaign_created",
            Self::ContributionReceived => "contribution_received",
            Self::CampaignFinished => "campaign_finished",
            Self::FundsCollected => "funds_collected",
            Self::ContributionRefunded => "contribution_refunded",
            Self::Unknown => "unknown",
        }
    }

    /// Inverse of [`EventKind::as_str`].
    pub fn from_stored(event_type: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == event_type)
            .unwrap_or(Self::Unknown)
    }
}

/// A decoded campaign event, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CampaignEvent {
    /// Unique id assigned by the RPC (`<toid>-<index>`).
    pub event_id: String,
    pub event_type: String,
    /// Address of the campaign contract that emitted the event.
    pub campaign_id: String,
    /// Contributor or beneficiary, depending on the kind.
    pub actor: Option<String>,
    /// Token amount in the smallest unit, as a decimal string (i128 range).
    pub amount: Option<String>,
    /// Outcome flag of `campaign_finished`.
    pub succeeded: Option<bool>,
    pub ledger: i64,
    pub timestamp: i64,
    pub tx_hash: Option<String>,
}

/// An event row as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: String,
    pub event_type: String,
    pub campaign_id: String,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub succeeded: Option<bool>,
    pub ledger: i64,
    pub timestamp: i64,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}

impl EventRecord {
    pub fn kind(&self) -> EventKind {
        EventKind::from_stored(&self.event_type)
    }

    fn amount_value(&self) -> Result<i128> {
        let raw = self.amount.as_deref().ok_or_else(|| {
            IndexerError::EventParse(format!("event {} has no amount", self.id))
        })?;
        Ok(raw.parse::<i128>()?)
    }
}

/// Campaign lifecycle as reconstructed from its events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignPhase {
    Ongoing,
    Failed,
    Succeeded,
    PaidOut,
}

/// Read model served by `GET /campaigns/:id/summary`.
///
/// Amounts are decimal strings so i128 values survive JSON clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CampaignSummary {
    pub campaign_id: String,
    pub phase: CampaignPhase,
    pub beneficiary: Option<String>,
    pub target_amount: Option<String>,
    pub total_contributed: String,
    pub total_refunded: String,
    pub paid_out: String,
    /// Value still held by the contract.
    pub held: String,
    pub contributors: usize,
    pub event_count: usize,
    pub last_ledger: i64,
}

impl CampaignSummary {
    /// Fold the campaign's events, in ledger order, into a summary.
    pub fn from_events(campaign_id: &str, records: &[EventRecord]) -> Result<Self> {
        let mut phase = CampaignPhase::Ongoing;
        let mut beneficiary = None;
        let mut target_amount = None;
        let mut contributed: i128 = 0;
        let mut refunded: i128 = 0;
        let mut paid_out: i128 = 0;
        let mut contributors = BTreeSet::new();
        let mut last_ledger = 0;
        let mut event_count = 0;

        for record in records.iter().filter(|r| r.campaign_id == campaign_id) {
            event_count += 1;
            last_ledger = last_ledger.max(record.ledger);
            match record.kind() {
                EventKind::CampaignCreated => {
                    beneficiary = record.actor.clone();
                    target_amount = record.amount.clone();
                }
                EventKind::ContributionReceived => {
                    contributed = checked(contributed.checked_add(record.amount_value()?))?;
                    if let Some(actor) = &record.actor {
                        contributors.insert(actor.clone());
                    }
                }
                EventKind::CampaignFinished => {
                    phase = match record.succeeded {
                        Some(true) => CampaignPhase::Succeeded,
                        Some(false) => CampaignPhase::Failed,
                        None => {
                            return Err(IndexerError::EventParse(format!(
                                "finish event {} has no outcome",
                                record.id
                            )))
                        }
                    };
                }
                EventKind::FundsCollected => {
                    paid_out = checked(paid_out.checked_add(record.amount_value()?))?;
                    phase = CampaignPhase::PaidOut;
                }
                EventKind::ContributionRefunded => {
                    refunded = checked(refunded.checked_add(record.amount_value()?))?;
                }
                EventKind::Unknown => {}
            }
        }

        let held = checked(
            contributed
                .checked_sub(refunded)
                .and_then(|v| v.checked_sub(paid_out)),
        )?;

        Ok(CampaignSummary {
            campaign_id: campaign_id.to_string(),
            phase,
            beneficiary,
            target_amount,
            total_contributed: contributed.to_string(),
            total_refunded: refunded.to_string(),
            paid_out: paid_out.to_string(),
            held: held.to_string(),
            contributors: contributors.len(),
            event_count,
            last_ledger,
        })
    }
}

fn checked(value: Option<i128>) -> Result<i128> {
    value.ok_or_else(|| IndexerError::EventParse("amount overflow".to_string()))
}
