//! Audit trail of administrator force unlocks.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UnlockAudit {
    pub id: i64,
    /// Id of the deleted transaction. Not a foreign key: the row is gone.
    pub transaction_id: i64,
    pub external_reference: String,
    pub reason: String,
    pub unlocked_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "unlock_audit")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub transaction_id: i64,
    pub external_reference: String,
    pub reason: String,
    pub unlocked_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn record(transaction_id: i64, external_reference: String, reason: String) -> Self {
        Self {
            id: ActiveValue::NotSet,
            transaction_id: ActiveValue::Set(transaction_id),
            external_reference: ActiveValue::Set(external_reference),
            reason: ActiveValue::Set(reason),
            unlocked_at: ActiveValue::Set(Utc::now()),
        }
    }
}

impl From<Model> for UnlockAudit {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            transaction_id: model.transaction_id,
            external_reference: model.external_reference,
            reason: model.reason,
            unlocked_at: model.unlocked_at,
        }
    }
}
