//! Transactions API endpoints

use api_types::transaction::{
    BalanceView, OpenTransactionResponse, SplitsAdded, SplitsNew, TransactionListQuery,
    TransactionListResponse, TransactionLocked, TransactionNew, TransactionOpened,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::{Amount, OpenTransactionCmd, SplitInput};

use crate::{
    ServerError,
    server::ServerState,
    views::{balance_view, open_transaction_view, transaction_view},
};

const DEFAULT_LIST_LIMIT: u64 = 50;
const MAX_LIST_LIMIT: u64 = 500;

pub(crate) fn clamp_limit(limit: Option<u64>) -> u64 {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).clamp(1, MAX_LIST_LIMIT)
}

pub(crate) fn opened(opened: engine::OpenedTransaction) -> TransactionOpened {
    TransactionOpened {
        transaction_id: opened.transaction_id,
        delta_minor: opened.delta.minor(),
        fee_minor: opened.fee.minor(),
        remaining_to_classify_minor: opened.remaining_to_classify.minor(),
    }
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<TransactionListQuery>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let transactions = state
        .engine
        .list_transactions(clamp_limit(query.limit))
        .await?
        .into_iter()
        .map(|summary| transaction_view(summary.transaction, Some(summary.split_count)))
        .collect();

    Ok(Json(TransactionListResponse { transactions }))
}

/// Manual entry of a movement.
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<TransactionNew>,
) -> Result<(StatusCode, Json<TransactionOpened>), ServerError> {
    let mut cmd = OpenTransactionCmd::manual(
        payload.external_reference,
        Amount::from_minor(payload.previous_balance_minor),
        Amount::from_minor(payload.new_balance_minor),
        payload.occurred_at.with_timezone(&Utc),
    );
    if let Some(reference) = payload.provider_reference {
        cmd = cmd.provider_reference(reference);
    }
    if let Some(raw) = payload.raw_payload {
        cmd = cmd.raw_payload(raw.to_string());
    }

    let result = state.engine.open_transaction(cmd).await?;
    Ok((StatusCode::CREATED, Json(opened(result))))
}

pub async fn open_detail(
    State(state): State<ServerState>,
) -> Result<Json<OpenTransactionResponse>, ServerError> {
    let open_transaction = state
        .engine
        .open_transaction_detail()
        .await?
        .map(open_transaction_view);
    Ok(Json(OpenTransactionResponse { open_transaction }))
}

pub async fn add_splits(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<SplitsNew>,
) -> Result<(StatusCode, Json<SplitsAdded>), ServerError> {
    let inputs = payload
        .splits
        .into_iter()
        .map(|s| SplitInput {
            category_id: s.category_id,
            amount: Amount::from_minor(s.amount_minor),
            description: s.description,
        })
        .collect();

    let added = state.engine.add_splits(id, inputs).await?;
    Ok((
        StatusCode::CREATED,
        Json(SplitsAdded {
            transaction_id: added.transaction_id,
            inserted: added.inserted,
            classified_total_minor: added.classified_total.minor(),
            remaining_minor: added.remaining.minor(),
            balanced: added.balanced,
        }),
    ))
}

pub async fn delete_split(
    State(state): State<ServerState>,
    Path(split_id): Path<i64>,
) -> Result<Json<BalanceView>, ServerError> {
    let check = state.engine.delete_split(split_id).await?;
    Ok(Json(balance_view(check)))
}

pub async fn balance(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<BalanceView>, ServerError> {
    let check = state.engine.check_balance(id).await?;
    Ok(Json(balance_view(check)))
}

pub async fn lock(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<TransactionLocked>, ServerError> {
    let receipt = state.engine.lock_transaction(id).await?;
    Ok(Json(TransactionLocked {
        transaction_id: receipt.transaction_id,
        wallet_balance_minor: receipt.wallet_balance.minor(),
        locked_at: receipt.locked_at,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_limit_defaults_and_is_bounded() {
        assert_eq!(clamp_limit(None), DEFAULT_LIST_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(10_000)), MAX_LIST_LIMIT);
    }
}
