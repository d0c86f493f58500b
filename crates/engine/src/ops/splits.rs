use std::collections::BTreeSet;

use sea_orm::TransactionTrait;
use serde::Serialize;

use crate::{
    Access, Amount, EngineError, ResultEngine, SplitInput, splits, store,
    splits::classified_total,
};

use super::{Engine, lock::BalanceCheck, normalize_optional_text, with_tx};

/// Classification state after `add_splits`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SplitsAdded {
    pub transaction_id: i64,
    pub inserted: usize,
    pub classified_total: Amount,
    pub remaining: Amount,
    pub balanced: bool,
}

impl Engine {
    /// Allocates parts of the open transaction to categories.
    ///
    /// All or nothing: either every split is inserted or none is. The total of
    /// user splits may exceed the classifiable total by at most one cent.
    pub async fn add_splits(
        &self,
        transaction_id: i64,
        inputs: Vec<SplitInput>,
    ) -> ResultEngine<SplitsAdded> {
        if inputs.is_empty() {
            return Err(EngineError::Validation(
                "at least one split is required".to_string(),
            ));
        }
        if let Some(bad) = inputs.iter().find(|s| !s.amount.is_positive()) {
            return Err(EngineError::Validation(format!(
                "split amount must be positive, got {}",
                bad.amount
            )));
        }
        let attempted = inputs
            .iter()
            .try_fold(Amount::ZERO, |acc, s| acc.checked_add(s.amount))
            .ok_or_else(|| EngineError::Validation("split amounts are too large".to_string()))?;

        with_tx!(self, |db_tx| {
            let tx = store::transaction(&db_tx, transaction_id).await?;
            if !tx.is_open() {
                return Err(EngineError::InvalidState(format!(
                    "transaction {transaction_id} is not open"
                )));
            }
            store::gate(&db_tx).await?.check(Access::Mutate {
                target: Some(transaction_id),
            })?;

            let requested: BTreeSet<i64> = inputs.iter().map(|s| s.category_id).collect();
            let found = store::categories_by_ids(&db_tx, requested.iter().copied().collect())
                .await?;
            // System categories are not assignable, so they count as unknown.
            let missing: Vec<i64> = requested
                .iter()
                .copied()
                .filter(|id| !found.iter().any(|c| c.id == *id && !c.is_system))
                .collect();
            if !missing.is_empty() {
                return Err(EngineError::UnknownCategory(missing));
            }

            let existing = store::splits_of(&db_tx, transaction_id).await?;
            let classification = tx.classification(classified_total(&existing));
            if !classification.accepts(attempted) {
                return Err(EngineError::OverAllocation {
                    max_allowed: classification.classifiable_total,
                    current_total: classification.classified_total,
                    attempted,
                });
            }

            let rows = inputs
                .iter()
                .map(|s| {
                    splits::ActiveModel::new_split(
                        transaction_id,
                        s.category_id,
                        s.amount,
                        normalize_optional_text(s.description.as_deref()),
                        false,
                    )
                })
                .collect();
            store::insert_splits(&db_tx, rows).await?;

            let after = tx.classification(classification.classified_total + attempted);
            tracing::debug!(
                transaction_id,
                count = inputs.len(),
                remaining = %after.remaining(),
                "splits added"
            );
            Ok(SplitsAdded {
                transaction_id,
                inserted: inputs.len(),
                classified_total: after.classified_total,
                remaining: after.remaining(),
                balanced: after.is_balanced(),
            })
        })
    }

    /// Removes one user split from the open transaction.
    pub async fn delete_split(&self, split_id: i64) -> ResultEngine<BalanceCheck> {
        with_tx!(self, |db_tx| {
            let split = store::split(&db_tx, split_id).await?;
            let tx = store::transaction(&db_tx, split.transaction_id).await?;
            if !tx.is_open() {
                return Err(EngineError::InvalidState(format!(
                    "transaction {} is locked, its splits are immutable",
                    tx.id
                )));
            }
            if split.is_fee {
                return Err(EngineError::InvalidState(
                    "the fee split cannot be deleted".to_string(),
                ));
            }
            store::gate(&db_tx).await?.check(Access::Mutate {
                target: Some(tx.id),
            })?;

            store::delete_split(&db_tx, split_id).await?;
            let remaining = store::splits_of(&db_tx, tx.id).await?;
            tracing::debug!(split_id, transaction_id = tx.id, "split deleted");
            Ok(BalanceCheck::new(
                tx.id,
                tx.classification(classified_total(&remaining)),
            ))
        })
    }
}
