//! Singleton row holding the system lock pointer.

use sea_orm::entity::prelude::*;

/// Id of the single system state row.
pub const SYSTEM_STATE_ID: i64 = 1;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "system_state")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i64,
    /// The open transaction, if any. The system is locked while set.
    pub open_transaction_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transactions::Entity",
        from = "Column::OpenTransactionId",
        to = "super::transactions::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    OpenTransaction,
}

impl Related<super::transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OpenTransaction.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
