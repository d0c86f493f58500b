//! System status, health and the administrator override.

use api_types::system::{ForceUnlock, Health, SystemStatus, UnlockReceipt};
use axum::{Json, extract::State, http::StatusCode};
use engine::ForceUnlockCmd;

use crate::{ServerError, server::ServerState, views::open_transaction_view};

pub async fn status(State(state): State<ServerState>) -> Result<Json<SystemStatus>, ServerError> {
    let status = state.engine.status().await?;
    Ok(Json(SystemStatus {
        is_locked: status.is_locked,
        open_transaction: status.open_transaction.map(open_transaction_view),
        wallet_balance_minor: status.wallet.current_balance.minor(),
        wallet_last_updated: status.wallet.last_updated,
    }))
}

pub async fn health(State(state): State<ServerState>) -> (StatusCode, Json<Health>) {
    let health = state.engine.health().await;
    let (code, label) = if health.is_healthy() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    (
        code,
        Json(Health {
            status: label.to_string(),
            database: health.database,
            wallet: health.wallet,
            categories: health.categories,
            system_state: health.system_state,
        }),
    )
}

pub async fn force_unlock(
    State(state): State<ServerState>,
    Json(payload): Json<ForceUnlock>,
) -> Result<Json<UnlockReceipt>, ServerError> {
    let audit = state
        .engine
        .force_unlock(ForceUnlockCmd::new(payload.reason, payload.admin_code))
        .await?;
    Ok(Json(UnlockReceipt {
        transaction_id: audit.transaction_id,
        external_reference: audit.external_reference,
        reason: audit.reason,
        unlocked_at: audit.unlocked_at,
    }))
}
