//! Ledger store.
//!
//! Reads and writes of the wallet, transactions, splits and the system
//! pointer. Every function runs on the caller's `DatabaseTransaction`, so a
//! whole engine operation commits or rolls back as one unit.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, DbErr, QueryFilter, QueryOrder, SqlErr, prelude::*,
    sea_query::Expr,
};

use crate::{
    Amount, EngineError, ResultEngine, Transaction, TransactionStatus,
    categories::{self, FEE_CATEGORY_NAME},
    gate::LockGate,
    splits::{self, Split},
    system_state::{self, SYSTEM_STATE_ID},
    transactions::{self, NewTransaction},
    unlock_audit::{self, UnlockAudit},
    wallets::{self, WALLET_ID},
};

pub(crate) async fn system_state(db: &DatabaseTransaction) -> ResultEngine<system_state::Model> {
    system_state::Entity::find_by_id(SYSTEM_STATE_ID)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("system state not initialized".to_string()))
}

/// The lock gate as of now, read inside `db`.
pub(crate) async fn gate(db: &DatabaseTransaction) -> ResultEngine<LockGate> {
    Ok(LockGate::from(&system_state(db).await?))
}

pub(crate) async fn wallet(db: &DatabaseTransaction) -> ResultEngine<wallets::Model> {
    wallets::Entity::find_by_id(WALLET_ID)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound("wallet not initialized".to_string()))
}

pub(crate) async fn set_wallet_balance(
    db: &DatabaseTransaction,
    balance: Amount,
) -> ResultEngine<()> {
    let model = wallets::ActiveModel {
        id: ActiveValue::Unchanged(WALLET_ID),
        current_balance_minor: ActiveValue::Set(balance.minor()),
        last_updated: ActiveValue::Set(Utc::now()),
    };
    model.update(db).await?;
    Ok(())
}

pub(crate) async fn transaction(db: &DatabaseTransaction, id: i64) -> ResultEngine<Transaction> {
    let model = transactions::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| EngineError::KeyNotFound(format!("transaction {id}")))?;
    Transaction::try_from(model)
}

/// The open transaction, found through the system pointer.
pub(crate) async fn open_transaction(
    db: &DatabaseTransaction,
) -> ResultEngine<Option<Transaction>> {
    match system_state(db).await?.open_transaction_id {
        Some(id) => transaction(db, id).await.map(Some),
        None => Ok(None),
    }
}

pub(crate) async fn transaction_id_by_reference(
    db: &DatabaseTransaction,
    external_reference: &str,
) -> ResultEngine<Option<i64>> {
    Ok(transactions::Entity::find()
        .filter(transactions::Column::ExternalReference.eq(external_reference))
        .one(db)
        .await?
        .map(|model| model.id))
}

/// Inserts a transaction row.
///
/// A reference that slipped past the caller's lookup still hits the unique
/// index and is reported as a duplicate.
pub(crate) async fn create_transaction(
    db: &DatabaseTransaction,
    new: &NewTransaction,
) -> ResultEngine<Transaction> {
    let model = transactions::ActiveModel::from(new)
        .insert(db)
        .await
        .map_err(|err| duplicate_or_db(err, &new.external_reference))?;
    Transaction::try_from(model)
}

fn duplicate_or_db(err: DbErr, external_reference: &str) -> EngineError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => EngineError::DuplicateTransaction {
            external_reference: external_reference.to_string(),
            existing_id: None,
        },
        _ => EngineError::from(err),
    }
}

/// Points the system at `transaction_id`, only if nothing is open.
pub(crate) async fn set_open_transaction(
    db: &DatabaseTransaction,
    transaction_id: i64,
) -> ResultEngine<()> {
    let result = system_state::Entity::update_many()
        .col_expr(
            system_state::Column::OpenTransactionId,
            Expr::value(transaction_id),
        )
        .filter(system_state::Column::Id.eq(SYSTEM_STATE_ID))
        .filter(system_state::Column::OpenTransactionId.is_null())
        .exec(db)
        .await?;
    if result.rows_affected == 1 {
        return Ok(());
    }
    let state = system_state(db).await?;
    Err(match state.open_transaction_id {
        Some(open_transaction_id) => EngineError::SystemLocked {
            open_transaction_id,
        },
        None => EngineError::InvalidState("system state pointer not updated".to_string()),
    })
}

/// Clears the pointer, only if it still names `transaction_id`.
async fn clear_open_transaction(
    db: &DatabaseTransaction,
    transaction_id: i64,
) -> ResultEngine<()> {
    let result = system_state::Entity::update_many()
        .col_expr(
            system_state::Column::OpenTransactionId,
            Expr::value(Option::<i64>::None),
        )
        .filter(system_state::Column::Id.eq(SYSTEM_STATE_ID))
        .filter(system_state::Column::OpenTransactionId.eq(transaction_id))
        .exec(db)
        .await?;
    if result.rows_affected != 1 {
        return Err(EngineError::InvalidState(format!(
            "transaction {transaction_id} is not the open transaction"
        )));
    }
    Ok(())
}

pub(crate) async fn splits_of(
    db: &DatabaseTransaction,
    transaction_id: i64,
) -> ResultEngine<Vec<Split>> {
    let models = splits::Entity::find()
        .filter(splits::Column::TransactionId.eq(transaction_id))
        .order_by_asc(splits::Column::Id)
        .all(db)
        .await?;
    Ok(models.into_iter().map(Split::from).collect())
}

pub(crate) async fn split(db: &DatabaseTransaction, split_id: i64) -> ResultEngine<Split> {
    splits::Entity::find_by_id(split_id)
        .one(db)
        .await?
        .map(Split::from)
        .ok_or_else(|| EngineError::KeyNotFound(format!("split {split_id}")))
}

pub(crate) async fn insert_splits(
    db: &DatabaseTransaction,
    rows: Vec<splits::ActiveModel>,
) -> ResultEngine<()> {
    if rows.is_empty() {
        return Ok(());
    }
    splits::Entity::insert_many(rows).exec(db).await?;
    Ok(())
}

pub(crate) async fn delete_split(db: &DatabaseTransaction, split_id: i64) -> ResultEngine<()> {
    splits::Entity::delete_by_id(split_id).exec(db).await?;
    Ok(())
}

/// Category rows for `ids`, in no particular order.
pub(crate) async fn categories_by_ids(
    db: &DatabaseTransaction,
    ids: Vec<i64>,
) -> ResultEngine<Vec<categories::Model>> {
    Ok(categories::Entity::find()
        .filter(categories::Column::Id.is_in(ids))
        .all(db)
        .await?)
}

pub(crate) async fn fee_category_id(db: &DatabaseTransaction) -> ResultEngine<i64> {
    categories::Entity::find()
        .filter(categories::Column::IsSystem.eq(true))
        .filter(categories::Column::Name.eq(FEE_CATEGORY_NAME))
        .one(db)
        .await?
        .map(|model| model.id)
        .ok_or_else(|| EngineError::KeyNotFound(format!("category {FEE_CATEGORY_NAME}")))
}

/// Moves `tx` to `Locked`, sets the wallet to its new balance and releases the
/// system pointer.
pub(crate) async fn lock_transaction(
    db: &DatabaseTransaction,
    tx: &Transaction,
) -> ResultEngine<DateTime<Utc>> {
    let locked_at = Utc::now();
    let result = transactions::Entity::update_many()
        .col_expr(
            transactions::Column::Status,
            Expr::value(TransactionStatus::Locked.as_str()),
        )
        .col_expr(transactions::Column::LockedAt, Expr::value(locked_at))
        .filter(transactions::Column::Id.eq(tx.id))
        .filter(transactions::Column::Status.eq(TransactionStatus::Open.as_str()))
        .exec(db)
        .await?;
    if result.rows_affected != 1 {
        return Err(EngineError::AlreadyLocked(tx.id));
    }
    set_wallet_balance(db, tx.new_balance).await?;
    clear_open_transaction(db, tx.id).await?;
    Ok(locked_at)
}

/// Discards the open transaction `tx` with its splits and records why.
pub(crate) async fn force_clear_open_transaction(
    db: &DatabaseTransaction,
    tx: &Transaction,
    reason: String,
) -> ResultEngine<UnlockAudit> {
    clear_open_transaction(db, tx.id).await?;
    splits::Entity::delete_many()
        .filter(splits::Column::TransactionId.eq(tx.id))
        .exec(db)
        .await?;
    transactions::Entity::delete_by_id(tx.id).exec(db).await?;
    let audit = unlock_audit::ActiveModel::record(tx.id, tx.external_reference.clone(), reason)
        .insert(db)
        .await?;
    Ok(UnlockAudit::from(audit))
}
