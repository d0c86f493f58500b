use chrono::Utc;
use sea_orm::TransactionTrait;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    Access, Amount, EngineError, ResultEngine, TransactionSource, TransactionStatus, store,
    transactions::NewTransaction,
};

use super::{Engine, with_tx};

/// Prefix of the references given to manual sync records.
pub const MANUAL_SYNC_PREFIX: &str = "MANUAL_SYNC_";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SyncReceipt {
    pub transaction_id: i64,
    pub external_reference: String,
    pub previous_balance: Amount,
    pub new_balance: Amount,
    pub delta: Amount,
}

impl Engine {
    /// Overwrites the wallet balance with an externally observed one.
    ///
    /// Refused while a transaction is open. The correction is kept as an
    /// already locked `SYNC` transaction with no fee and no splits.
    pub async fn manual_sync(&self, new_balance: Amount) -> ResultEngine<SyncReceipt> {
        if new_balance.is_negative() {
            return Err(EngineError::Validation(
                "balance must not be negative".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            store::gate(&db_tx)
                .await?
                .check(Access::Mutate { target: None })?;

            let previous_balance =
                Amount::from_minor(store::wallet(&db_tx).await?.current_balance_minor);
            let external_reference = format!("{MANUAL_SYNC_PREFIX}{}", Uuid::new_v4().simple());
            let payload = serde_json::json!({
                "type": "manual_sync",
                "previous_balance_minor": previous_balance.minor(),
                "new_balance_minor": new_balance.minor(),
            });
            let tx = store::create_transaction(
                &db_tx,
                &NewTransaction {
                    external_reference: external_reference.clone(),
                    provider_reference: None,
                    source: TransactionSource::Sync,
                    previous_balance,
                    new_balance,
                    fee: Amount::ZERO,
                    occurred_at: Utc::now(),
                    status: TransactionStatus::Locked,
                    raw_payload: Some(payload.to_string()),
                },
            )
            .await?;
            store::set_wallet_balance(&db_tx, new_balance).await?;

            tracing::info!(
                transaction_id = tx.id,
                previous = %previous_balance,
                new = %new_balance,
                "wallet balance synced manually"
            );
            Ok(SyncReceipt {
                transaction_id: tx.id,
                external_reference,
                previous_balance,
                new_balance,
                delta: tx.delta,
            })
        })
    }
}
