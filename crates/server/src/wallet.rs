//! Wallet API endpoints

use api_types::wallet::{
    HistoryEntry, HistoryQuery, HistoryResponse, SyncReceipt, WalletSync, WalletView,
};
use axum::{
    Json,
    extract::{Query, State},
};
use engine::Amount;

use crate::{ServerError, server::ServerState, transactions::clamp_limit, views::transaction_view};

const RECENT_TRANSACTIONS: u64 = 10;

pub async fn get(State(state): State<ServerState>) -> Result<Json<WalletView>, ServerError> {
    let wallet = state.engine.wallet().await?;
    let recent_transactions = state
        .engine
        .list_transactions(RECENT_TRANSACTIONS)
        .await?
        .into_iter()
        .map(|summary| transaction_view(summary.transaction, Some(summary.split_count)))
        .collect();

    Ok(Json(WalletView {
        balance_minor: wallet.current_balance.minor(),
        last_updated: wallet.last_updated,
        recent_transactions,
    }))
}

pub async fn sync(
    State(state): State<ServerState>,
    Json(payload): Json<WalletSync>,
) -> Result<Json<SyncReceipt>, ServerError> {
    let receipt = state
        .engine
        .manual_sync(Amount::from_minor(payload.balance_minor))
        .await?;
    Ok(Json(SyncReceipt {
        transaction_id: receipt.transaction_id,
        external_reference: receipt.external_reference,
        previous_balance_minor: receipt.previous_balance.minor(),
        new_balance_minor: receipt.new_balance.minor(),
        delta_minor: receipt.delta.minor(),
    }))
}

pub async fn history(
    State(state): State<ServerState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<HistoryResponse>, ServerError> {
    let entries = state
        .engine
        .wallet_history(clamp_limit(query.limit))
        .await?
        .into_iter()
        .map(|entry| HistoryEntry {
            transaction_id: entry.transaction_id,
            external_reference: entry.external_reference,
            source: entry.source.as_str().to_string(),
            occurred_at: entry.occurred_at,
            locked_at: entry.locked_at,
            previous_balance_minor: entry.previous_balance.minor(),
            balance_minor: entry.new_balance.minor(),
            delta_minor: entry.delta.minor(),
            fee_minor: entry.fee.minor(),
        })
        .collect();
    Ok(Json(HistoryResponse { entries }))
}
