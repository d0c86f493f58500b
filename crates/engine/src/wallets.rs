//! The module contains the petty-cash `Wallet`.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::Serialize;

use crate::Amount;

/// Id of the single wallet row.
pub const WALLET_ID: i64 = 1;

/// The petty-cash wallet.
///
/// There is exactly one. Its balance moves only when a transaction is locked
/// or when an operator syncs it manually.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Wallet {
    pub current_balance: Amount,
    pub last_updated: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "wallet")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    pub current_balance_minor: i64,
    pub last_updated: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Wallet {
    fn from(model: Model) -> Self {
        Self {
            current_balance: Amount::from_minor(model.current_balance_minor),
            last_updated: model.last_updated,
        }
    }
}
