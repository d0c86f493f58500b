//! Category allocations of a transaction.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::Serialize;

use crate::Amount;

/// Description of the split recording a transaction's fee.
pub const FEE_SPLIT_DESCRIPTION: &str = "auto-classified fee";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Split {
    pub id: i64,
    pub transaction_id: i64,
    pub category_id: i64,
    pub amount: Amount,
    pub description: Option<String>,
    /// The audit record of the fee; never counted as classified.
    pub is_fee: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "splits")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub transaction_id: i64,
    pub category_id: i64,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub is_fee: bool,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::TransactionId",
        to = "super::transactions::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Transaction,
    #[sea_orm(
        belongs_to = "super::categories::Entity",
        from = "Column::CategoryId",
        to = "super::categories::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Category,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn new_split(
        transaction_id: i64,
        category_id: i64,
        amount: Amount,
        description: Option<String>,
        is_fee: bool,
    ) -> Self {
        Self {
            id: ActiveValue::NotSet,
            transaction_id: ActiveValue::Set(transaction_id),
            category_id: ActiveValue::Set(category_id),
            amount_minor: ActiveValue::Set(amount.minor()),
            description: ActiveValue::Set(description),
            is_fee: ActiveValue::Set(is_fee),
            created_at: ActiveValue::Set(Utc::now()),
        }
    }
}

impl From<Model> for Split {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            transaction_id: model.transaction_id,
            category_id: model.category_id,
            amount: Amount::from_minor(model.amount_minor),
            description: model.description,
            is_fee: model.is_fee,
            created_at: model.created_at,
        }
    }
}

/// Sum of the user splits, the fee split excluded.
pub fn classified_total<'a>(splits: impl IntoIterator<Item = &'a Split>) -> Amount {
    splits
        .into_iter()
        .filter(|split| !split.is_fee)
        .map(|split| split.amount)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(amount: i64, is_fee: bool) -> Split {
        Split {
            id: 0,
            transaction_id: 1,
            category_id: 2,
            amount: Amount::from_units(amount),
            description: None,
            is_fee,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn fee_split_is_not_classified() {
        let splits = [split(13, true), split(300, false), split(187, false)];
        assert_eq!(classified_total(&splits), Amount::from_units(487));
    }
}
