use chrono::{DateTime, Utc};
use sea_orm::TransactionTrait;
use serde::Serialize;

use crate::{
    Access, Amount, Classification, EngineError, ResultEngine, splits::classified_total, store,
};

use super::{Engine, with_tx};

/// Classification progress of a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BalanceCheck {
    pub transaction_id: i64,
    pub balanced: bool,
    pub remaining: Amount,
    pub classified_total: Amount,
    pub classifiable_total: Amount,
}

impl BalanceCheck {
    pub(crate) fn new(transaction_id: i64, classification: Classification) -> Self {
        Self {
            transaction_id,
            balanced: classification.is_balanced(),
            remaining: classification.remaining(),
            classified_total: classification.classified_total,
            classifiable_total: classification.classifiable_total,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LockReceipt {
    pub transaction_id: i64,
    pub wallet_balance: Amount,
    pub locked_at: DateTime<Utc>,
}

impl Engine {
    /// Reports how much of a transaction is still unclassified. Read only.
    pub async fn check_balance(&self, transaction_id: i64) -> ResultEngine<BalanceCheck> {
        with_tx!(self, |db_tx| {
            let tx = store::transaction(&db_tx, transaction_id).await?;
            let splits = store::splits_of(&db_tx, transaction_id).await?;
            Ok(BalanceCheck::new(
                transaction_id,
                tx.classification(classified_total(&splits)),
            ))
        })
    }

    /// Finalizes a balanced transaction.
    ///
    /// In one unit: the transaction becomes `Locked`, the wallet takes its new
    /// balance and the system is unlocked for the next movement.
    pub async fn lock_transaction(&self, transaction_id: i64) -> ResultEngine<LockReceipt> {
        with_tx!(self, |db_tx| {
            let tx = store::transaction(&db_tx, transaction_id).await?;
            if !tx.is_open() {
                return Err(EngineError::AlreadyLocked(transaction_id));
            }
            store::gate(&db_tx).await?.check(Access::Mutate {
                target: Some(transaction_id),
            })?;

            let splits = store::splits_of(&db_tx, transaction_id).await?;
            let classification = tx.classification(classified_total(&splits));
            if !classification.is_balanced() {
                return Err(EngineError::NotBalanced {
                    remaining: classification.remaining(),
                });
            }

            let locked_at = store::lock_transaction(&db_tx, &tx).await?;
            tracing::info!(
                transaction_id,
                wallet_balance = %tx.new_balance,
                "transaction locked, system unlocked"
            );
            Ok(LockReceipt {
                transaction_id,
                wallet_balance: tx.new_balance,
                locked_at,
            })
        })
    }
}
