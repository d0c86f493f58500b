use chrono::Utc;
use sea_orm::{DatabaseTransaction, TransactionTrait};
use serde::Serialize;

use crate::{
    Access, Amount, EngineError, MovementCmd, OpenTransactionCmd, ResultEngine, TransactionSource,
    TransactionStatus, fee_for, splits, store,
    transactions::NewTransaction,
};

use super::{Engine, normalize_optional_text, normalize_required_text, with_tx};

/// Outcome of opening a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct OpenedTransaction {
    pub transaction_id: i64,
    pub delta: Amount,
    pub fee: Amount,
    /// `|delta| - fee`, what must still be split across categories.
    pub remaining_to_classify: Amount,
}

impl Engine {
    /// Records a new movement from its before/after balances and locks the
    /// system until it is classified.
    ///
    /// Fails with `Validation` on an empty reference, a negative balance or,
    /// for manual entries, a date in the future; with `DuplicateTransaction`
    /// when the reference is already recorded; with `SystemLocked` while
    /// another transaction is open.
    pub async fn open_transaction(
        &self,
        cmd: OpenTransactionCmd,
    ) -> ResultEngine<OpenedTransaction> {
        let external_reference =
            normalize_required_text(&cmd.external_reference, "external reference")?;
        if cmd.previous_balance.is_negative() || cmd.new_balance.is_negative() {
            return Err(EngineError::Validation(
                "balances must not be negative".to_string(),
            ));
        }
        if cmd.source == TransactionSource::Manual && cmd.occurred_at > Utc::now() {
            return Err(EngineError::Validation(
                "transaction date must not be in the future".to_string(),
            ));
        }
        let new = NewTransaction {
            external_reference,
            provider_reference: normalize_optional_text(cmd.provider_reference.as_deref()),
            source: cmd.source,
            previous_balance: cmd.previous_balance,
            new_balance: cmd.new_balance,
            fee: fee_for(cmd.new_balance - cmd.previous_balance),
            occurred_at: cmd.occurred_at,
            status: TransactionStatus::Open,
            raw_payload: cmd.raw_payload,
        };

        with_tx!(self, |db_tx| open_in(&db_tx, new).await)
    }

    /// Records a movement given by its amount and direction.
    ///
    /// The previous balance is the wallet balance read in the same DB
    /// transaction; the new balance applies the movement to it.
    pub async fn open_movement(&self, cmd: MovementCmd) -> ResultEngine<OpenedTransaction> {
        let external_reference =
            normalize_required_text(&cmd.external_reference, "external reference")?;
        if cmd.amount.is_negative() {
            return Err(EngineError::Validation(
                "movement amount must not be negative".to_string(),
            ));
        }

        with_tx!(self, |db_tx| {
            let previous_balance =
                Amount::from_minor(store::wallet(&db_tx).await?.current_balance_minor);
            let new_balance = previous_balance
                .checked_add(cmd.signed_amount())
                .ok_or_else(|| EngineError::Validation("movement amount too large".to_string()))?;
            if new_balance.is_negative() {
                return Err(EngineError::Validation(format!(
                    "withdrawal of {} exceeds wallet balance {previous_balance}",
                    cmd.amount
                )));
            }
            let new = NewTransaction {
                external_reference,
                provider_reference: normalize_optional_text(cmd.provider_reference.as_deref()),
                source: cmd.source,
                previous_balance,
                new_balance,
                fee: fee_for(cmd.amount),
                occurred_at: cmd.occurred_at,
                status: TransactionStatus::Open,
                raw_payload: cmd.raw_payload,
            };
            open_in(&db_tx, new).await
        })
    }
}

async fn open_in(db_tx: &DatabaseTransaction, new: NewTransaction) -> ResultEngine<OpenedTransaction> {
    if let Some(existing_id) =
        store::transaction_id_by_reference(db_tx, &new.external_reference).await?
    {
        return Err(EngineError::DuplicateTransaction {
            external_reference: new.external_reference,
            existing_id: Some(existing_id),
        });
    }
    store::gate(db_tx)
        .await?
        .check(Access::Mutate { target: None })?;

    let tx = store::create_transaction(db_tx, &new).await?;
    if tx.fee.is_positive() {
        let fee_category_id = store::fee_category_id(db_tx).await?;
        store::insert_splits(
            db_tx,
            vec![splits::ActiveModel::new_split(
                tx.id,
                fee_category_id,
                tx.fee,
                Some(splits::FEE_SPLIT_DESCRIPTION.to_string()),
                true,
            )],
        )
        .await?;
    }
    store::set_open_transaction(db_tx, tx.id).await?;

    let remaining_to_classify = tx.classification(Amount::ZERO).remaining();
    tracing::info!(
        transaction_id = tx.id,
        reference = %tx.external_reference,
        source = tx.source.as_str(),
        delta = %tx.delta,
        fee = %tx.fee,
        "transaction opened, system locked"
    );
    Ok(OpenedTransaction {
        transaction_id: tx.id,
        delta: tx.delta,
        fee: tx.fee,
        remaining_to_classify,
    })
}
