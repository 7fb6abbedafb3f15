//! Soroban RPC client: pages campaign events out of `getEvents` and decodes
//! them into [`CampaignEvent`]s.
//!
//! ## Resilience
//!
//! * Exponential back-off from [`INITIAL_BACKOFF_SECS`] up to
//!   [`MAX_BACKOFF_SECS`] on transport errors, HTTP 429 and soft RPC errors.
//! * Hard JSON-RPC errors (invalid request, unknown method) are returned
//!   immediately; retrying them cannot succeed.
//!
//! ## Encodings
//!
//! Current RPC versions send topics and values as base64 XDR `ScVal`s, which
//! [`crate::xdr`] decodes. Older ones sent JSON objects
//! (`{"type":"symbol","value":"finished"}`); both are understood.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{CampaignEvent, EventKind};
use crate::xdr::{self, ScValue};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

/// `getEvents` limit on contract IDs per filter.
const CONTRACTS_PER_FILTER: usize = 5;

/// JSON-RPC codes for which a retry is pointless.
const HARD_ERROR_CODES: [i64; 2] = [-32600, -32601];

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawEvent {
    pub id: Option<String>,
    pub topic: Vec<String>,
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
}

/// One page of `getEvents` output.
#[derive(Debug)]
pub struct EventsPage {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    pub latest_ledger: Option<u64>,
}

// ─────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────

struct Backoff {
    current: u64,
}

impl Backoff {
    fn new() -> Self {
        Backoff {
            current: INITIAL_BACKOFF_SECS,
        }
    }

    /// Delay to wait now; doubles the next one up to the cap.
    fn next_delay(&mut self) -> Duration {
        let delay = Duration::from_secs(self.current);
        self.current = (self.current * 2).min(MAX_BACKOFF_SECS);
        delay
    }
}

pub struct RpcClient {
    http: Client,
    url: String,
}

impl RpcClient {
    pub fn new(http: Client, url: impl Into<String>) -> Self {
        RpcClient {
            http,
            url: url.into(),
        }
    }

    /// Fetch one page of events for `contract_ids`.
    ///
    /// With a `cursor` the page continues a previous one; otherwise scanning
    /// starts at `start_ledger` (inclusive).
    pub async fn fetch_events(
        &self,
        contract_ids: &[String],
        start_ledger: u32,
        cursor: Option<&str>,
        limit: u32,
    ) -> Result<EventsPage> {
        let mut backoff = Backoff::new();
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getEvents",
            "params": build_params(contract_ids, start_ledger, cursor, limit),
        });

        loop {
            let resp = match self.http.post(&self.url).json(&body).send().await {
                Ok(resp) => resp,
                Err(e) => {
                    let delay = backoff.next_delay();
                    warn!("RPC request failed (will retry in {delay:?}): {e}");
                    tokio::time::sleep(delay).await;
                    continue;
                }
            };

            if resp.status() == StatusCode::TOO_MANY_REQUESTS {
                let delay = backoff.next_delay();
                warn!("Rate-limited by RPC (will retry in {delay:?})");
                tokio::time::sleep(delay).await;
                continue;
            }

            let parsed: RpcResponse = resp.json().await?;

            if let Some(err) = parsed.error {
                if HARD_ERROR_CODES.contains(&err.code) {
                    return Err(IndexerError::Rpc(format!(
                        "hard error {}: {}",
                        err.code, err.message
                    )));
                }
                let delay = backoff.next_delay();
                warn!(
                    "RPC soft error (will retry in {delay:?}): {} {}",
                    err.code, err.message
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            let result = parsed
                .result
                .ok_or_else(|| IndexerError::Rpc("empty result from getEvents".to_string()))?;

            debug!(
                "Fetched {} events (latest_ledger={:?})",
                result.events.len(),
                result.latest_ledger
            );

            return Ok(EventsPage {
                events: result.events,
                cursor: result.cursor,
                latest_ledger: result.latest_ledger,
            });
        }
    }
}

fn build_params(
    contract_ids: &[String],
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Value {
    let filters: Vec<Value> = contract_ids
        .chunks(CONTRACTS_PER_FILTER)
        .map(|chunk| json!({ "type": "contract", "contractIds": chunk }))
        .collect();

    let mut params = json!({
        "filters": filters,
        "pagination": { "limit": limit },
    });

    match cursor {
        Some(cur) => params["pagination"]["cursor"] = json!(cur),
        None => params["startLedger"] = json!(start_ledger),
    }
    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode raw RPC events. Events from failed contract calls are dropped.
pub fn decode_events(raw: &[RawEvent]) -> Vec<CampaignEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call != Some(false))
        .filter_map(decode_single)
        .collect()
}

fn decode_single(raw: &RawEvent) -> Option<CampaignEvent> {
    let Some(event_id) = raw.id.clone() else {
        debug!("Skipping event without id in ledger {:?}", raw.ledger);
        return None;
    };
    let campaign_id = raw.contract_id.clone()?;
    let kind = EventKind::from_topic(&extract_symbol(raw.topic.first()?));

    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let (actor, amount, succeeded) = decode_data(&payload(&raw.value), kind);
    // Per-account events also carry the account as their second topic.
    let actor = actor.or_else(|| match kind {
        EventKind::ContributionReceived | EventKind::ContributionRefunded => {
            raw.topic.get(1).and_then(|t| extract_topic_value(t))
        }
        _ => None,
    });

    Some(CampaignEvent {
        event_id,
        event_type: kind.as_str().to_string(),
        campaign_id,
        actor,
        amount,
        succeeded,
        ledger: raw.ledger.unwrap_or(0) as i64,
        timestamp,
        tx_hash: raw.tx_hash.as_deref().and_then(normalize_tx_hash),
    })
}

/// The event value as JSON: base64 XDR is decoded, JSON passes through.
fn payload(value: &Value) -> Value {
    let raw = match value {
        Value::String(raw) => raw,
        Value::Object(obj) => match obj.get("xdr").and_then(Value::as_str) {
            Some(raw) => raw,
            None => return value.clone(),
        },
        _ => return value.clone(),
    };
    match xdr::decode_base64(raw) {
        Some(decoded) => decoded.into_json(),
        None => {
            debug!("Undecodable event value {raw:?}");
            Value::Null
        }
    }
}

/// Pull `(actor, amount, succeeded)` out of the decoded event payload.
fn decode_data(value: &Value, kind: EventKind) -> (Option<String>, Option<String>, Option<bool>) {
    match kind {
        EventKind::CampaignCreated => (
            extract_field(value, &["beneficiary"]),
            extract_field(value, &["target_amount"]),
            None,
        ),
        EventKind::ContributionReceived | EventKind::ContributionRefunded => (
            extract_field(value, &["contributor", "address"]),
            extract_field(value, &["amount"]),
            None,
        ),
        EventKind::CampaignFinished => (
            None,
            extract_field(value, &["total_collected"]),
            value.get("succeeded").and_then(Value::as_bool),
        ),
        EventKind::FundsCollected => (
            extract_field(value, &["beneficiary", "address"]),
            extract_field(value, &["amount"]),
            None,
        ),
        EventKind::Unknown => (None, None, None),
    }
}

fn extract_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match value.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Extract the leading Symbol of a topic, whatever its encoding.
fn extract_symbol(raw: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        if let Some(s) = v.get("value").and_then(Value::as_str) {
            return s.to_string();
        }
    }
    if let Some(symbol) = xdr::decode_base64(raw).as_ref().and_then(ScValue::as_symbol) {
        return symbol.to_string();
    }
    raw.to_string()
}

/// Extract a scalar topic (addresses, numbers), whatever its encoding.
fn extract_topic_value(raw: &str) -> Option<String> {
    let v = match serde_json::from_str::<Value>(raw) {
        Ok(v) => v.get("value")?.clone(),
        Err(_) => xdr::decode_base64(raw)?.into_json(),
    };
    match v {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Lower-case a 32-byte hex transaction hash; anything else is dropped.
fn normalize_tx_hash(raw: &str) -> Option<String> {
    match hex::decode(raw.trim()) {
        Ok(bytes) if bytes.len() == 32 => Some(hex::encode(bytes)),
        _ => {
            debug!("Ignoring malformed tx hash {raw:?}");
            None
        }
    }
}

/// Parse an RFC 3339 timestamp into Unix seconds.
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
