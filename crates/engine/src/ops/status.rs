use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, prelude::*,
};
use serde::Serialize;

use crate::{
    Amount, ResultEngine, Split, Transaction, TransactionSource, TransactionStatus, Wallet,
    categories, splits, splits::classified_total, store, system_state, transactions, wallets,
};

use super::{Engine, lock::BalanceCheck, with_tx};

/// A split with the name of its category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SplitView {
    #[serde(flatten)]
    pub split: Split,
    pub category_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OpenTransactionDetail {
    pub transaction: Transaction,
    pub splits: Vec<SplitView>,
    pub balance: BalanceCheck,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SystemStatus {
    pub is_locked: bool,
    pub open_transaction: Option<OpenTransactionDetail>,
    pub wallet: Wallet,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransactionSummary {
    #[serde(flatten)]
    pub transaction: Transaction,
    pub split_count: usize,
}

/// One wallet balance change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub transaction_id: i64,
    pub external_reference: String,
    pub source: TransactionSource,
    pub occurred_at: DateTime<Utc>,
    pub locked_at: Option<DateTime<Utc>>,
    pub previous_balance: Amount,
    pub new_balance: Amount,
    pub delta: Amount,
    pub fee: Amount,
}

impl From<Transaction> for HistoryEntry {
    fn from(tx: Transaction) -> Self {
        Self {
            transaction_id: tx.id,
            external_reference: tx.external_reference,
            source: tx.source,
            occurred_at: tx.occurred_at,
            locked_at: tx.locked_at,
            previous_balance: tx.previous_balance,
            new_balance: tx.new_balance,
            delta: tx.delta,
            fee: tx.fee,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Health {
    pub database: bool,
    pub wallet: bool,
    pub categories: bool,
    pub system_state: bool,
}

impl Health {
    pub fn is_healthy(&self) -> bool {
        self.database && self.wallet && self.categories && self.system_state
    }
}

impl Engine {
    /// Lock flag, open transaction and wallet balance.
    pub async fn status(&self) -> ResultEngine<SystemStatus> {
        with_tx!(self, |db_tx| {
            let open_transaction = open_detail(&db_tx).await?;
            let wallet = Wallet::from(store::wallet(&db_tx).await?);
            Ok(SystemStatus {
                is_locked: open_transaction.is_some(),
                open_transaction,
                wallet,
            })
        })
    }

    /// The open transaction with its splits, if any.
    pub async fn open_transaction_detail(&self) -> ResultEngine<Option<OpenTransactionDetail>> {
        with_tx!(self, |db_tx| open_detail(&db_tx).await)
    }

    pub async fn wallet(&self) -> ResultEngine<Wallet> {
        with_tx!(self, |db_tx| Ok(Wallet::from(store::wallet(&db_tx).await?)))
    }

    /// Most recent transactions first, with their split counts.
    pub async fn list_transactions(&self, limit: u64) -> ResultEngine<Vec<TransactionSummary>> {
        with_tx!(self, |db_tx| {
            let models = transactions::Entity::find()
                .order_by_desc(transactions::Column::OccurredAt)
                .order_by_desc(transactions::Column::Id)
                .limit(limit)
                .all(&db_tx)
                .await?;
            let ids: Vec<i64> = models.iter().map(|m| m.id).collect();
            let mut counts: HashMap<i64, usize> = HashMap::new();
            for split in splits::Entity::find()
                .filter(splits::Column::TransactionId.is_in(ids))
                .all(&db_tx)
                .await?
            {
                *counts.entry(split.transaction_id).or_default() += 1;
            }
            models
                .into_iter()
                .map(|model| {
                    let split_count = counts.get(&model.id).copied().unwrap_or_default();
                    Ok(TransactionSummary {
                        transaction: Transaction::try_from(model)?,
                        split_count,
                    })
                })
                .collect()
        })
    }

    /// Locked balance changes, newest first.
    pub async fn wallet_history(&self, limit: u64) -> ResultEngine<Vec<HistoryEntry>> {
        with_tx!(self, |db_tx| {
            transactions::Entity::find()
                .filter(transactions::Column::Status.eq(TransactionStatus::Locked.as_str()))
                .order_by_desc(transactions::Column::LockedAt)
                .order_by_desc(transactions::Column::Id)
                .limit(limit)
                .all(&db_tx)
                .await?
                .into_iter()
                .map(|model| Transaction::try_from(model).map(HistoryEntry::from))
                .collect()
        })
    }

    /// Checks that the database answers and the singleton rows exist.
    ///
    /// Never fails: every check that errors is reported as unhealthy.
    pub async fn health(&self) -> Health {
        let check = async {
            let mut health = Health {
                database: self.database.ping().await.is_ok(),
                ..Health::default()
            };
            if !health.database {
                return Ok(health);
            }
            health.wallet = matches!(
                wallets::Entity::find_by_id(wallets::WALLET_ID)
                    .one(&self.database)
                    .await,
                Ok(Some(_))
            );
            health.categories = matches!(
                categories::Entity::find().count(&self.database).await,
                Ok(n) if n > 0
            );
            health.system_state = matches!(
                system_state::Entity::find_by_id(system_state::SYSTEM_STATE_ID)
                    .one(&self.database)
                    .await,
                Ok(Some(_))
            );
            Ok(health)
        };
        let health = self.bounded(check).await.unwrap_or_default();
        if !health.is_healthy() {
            tracing::warn!(?health, "health check failed");
        }
        health
    }
}

async fn open_detail(db_tx: &DatabaseTransaction) -> ResultEngine<Option<OpenTransactionDetail>> {
    let Some(transaction) = store::open_transaction(db_tx).await? else {
        return Ok(None);
    };
    let splits = store::splits_of(db_tx, transaction.id).await?;
    let names: HashMap<i64, String> =
        store::categories_by_ids(db_tx, splits.iter().map(|s| s.category_id).collect())
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();
    let balance = BalanceCheck::new(
        transaction.id,
        transaction.classification(classified_total(&splits)),
    );
    let splits = splits
        .into_iter()
        .map(|split| SplitView {
            category_name: names.get(&split.category_id).cloned().unwrap_or_default(),
            split,
        })
        .collect();
    Ok(Some(OpenTransactionDetail {
        transaction,
        splits,
        balance,
    }))
}
