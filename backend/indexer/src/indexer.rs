//! Background task that polls the Soroban RPC and writes decoded campaign
//! events to the database until it is cancelled.

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Config;
use crate::db::{self, Cursor};
use crate::errors::Result;
use crate::rpc::{self, RpcClient};

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub rpc: RpcClient,
}

/// Run the poll loop until `shutdown` is cancelled.
pub async fn run(state: Arc<IndexerState>, shutdown: CancellationToken) {
    info!(
        "Indexer starting, following {} campaign(s)",
        state.config.contract_ids.len()
    );

    // Fall back to the configured start ledger when nothing is persisted yet.
    let mut cursor = match db::load_cursor(&state.pool).await {
        Ok(saved) if saved.last_ledger > 0 => saved,
        Ok(_) => Cursor {
            last_ledger: i64::from(state.config.start_ledger),
            last_cursor: None,
        },
        Err(e) => {
            error!("Could not load indexer cursor, starting from config: {e}");
            Cursor {
                last_ledger: i64::from(state.config.start_ledger),
                last_cursor: None,
            }
        }
    };

    info!("Resuming from ledger {}", cursor.last_ledger);

    loop {
        match poll_once(&state, &cursor).await {
            Ok(next) => cursor = next,
            Err(e) => error!("Indexer poll error: {e}"),
        }

        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = tokio::time::sleep(Duration::from_secs(state.config.poll_interval_secs)) => {}
        }
    }

    info!("Indexer stopped at ledger {}", cursor.last_ledger);
}

/// Fetch, decode and store one page, then persist and return the next cursor.
async fn poll_once(state: &IndexerState, cursor: &Cursor) -> Result<Cursor> {
    let start_ledger = u32::try_from(cursor.last_ledger).unwrap_or(u32::MAX);
    let page = state
        .rpc
        .fetch_events(
            &state.config.contract_ids,
            start_ledger,
            cursor.last_cursor.as_deref(),
            state.config.events_per_page,
        )
        .await?;

    if !page.events.is_empty() {
        let decoded = rpc::decode_events(&page.events);
        let inserted = db::insert_events(&state.pool, &decoded).await?;
        info!(
            "Polled {} raw events → {} new records stored",
            page.events.len(),
            inserted
        );
    }

    let next = advance(cursor, page.latest_ledger, page.cursor);

    // Persist so restarts are deterministic.
    db::save_cursor(&state.pool, &next).await?;
    Ok(next)
}

/// The ledger never moves backwards; the pagination cursor is whatever the
/// RPC handed back for the next page.
fn advance(current: &Cursor, latest_ledger: Option<u64>, next_cursor: Option<String>) -> Cursor {
    let last_ledger = latest_ledger
        .and_then(|l| i64::try_from(l).ok())
        .map(|l| l.max(current.last_ledger))
        .unwrap_or(current.last_ledger);
    Cursor {
        last_ledger,
        last_cursor: next_cursor,
    }
}
