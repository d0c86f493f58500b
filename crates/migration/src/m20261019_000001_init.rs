//! Initial schema.
//!
//! - `wallet`: the single petty-cash wallet
//! - `categories`: two-level expense category tree
//! - `transactions`: mobile-money movements, OPEN until classified
//! - `splits`: category allocations of a transaction
//! - `system_state`: pointer to the open transaction (the system lock)
//! - `unlock_audit`: administrator force unlocks

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Wallet {
    Table,
    Id,
    CurrentBalanceMinor,
    LastUpdated,
}

#[derive(Iden)]
pub enum Categories {
    Table,
    Id,
    ParentId,
    Name,
    IsSystem,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    ExternalReference,
    ProviderReference,
    Source,
    PreviousBalanceMinor,
    NewBalanceMinor,
    DeltaMinor,
    FeeMinor,
    OccurredAt,
    Status,
    LockedAt,
    RawPayload,
    CreatedAt,
}

#[derive(Iden)]
enum Splits {
    Table,
    Id,
    TransactionId,
    CategoryId,
    AmountMinor,
    Description,
    IsFee,
    CreatedAt,
}

#[derive(Iden)]
pub enum SystemState {
    Table,
    Id,
    OpenTransactionId,
}

#[derive(Iden)]
enum UnlockAudit {
    Table,
    Id,
    TransactionId,
    ExternalReference,
    Reason,
    UnlockedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Wallet::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Wallet::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Wallet::CurrentBalanceMinor)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Wallet::LastUpdated).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::ParentId).integer())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(
                        ColumnDef::new(Categories::IsSystem)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-categories-parent_id")
                            .from(Categories::Table, Categories::ParentId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Transactions::ExternalReference)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::ProviderReference).string())
                    .col(ColumnDef::new(Transactions::Source).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::PreviousBalanceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::NewBalanceMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::DeltaMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::FeeMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::OccurredAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Status).string().not_null())
                    .col(ColumnDef::new(Transactions::LockedAt).timestamp())
                    .col(ColumnDef::new(Transactions::RawPayload).text())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-external_reference-unique")
                    .table(Transactions::Table)
                    .col(Transactions::ExternalReference)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-status")
                    .table(Transactions::Table)
                    .col(Transactions::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Splits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Splits::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Splits::TransactionId).integer().not_null())
                    .col(ColumnDef::new(Splits::CategoryId).integer().not_null())
                    .col(ColumnDef::new(Splits::AmountMinor).big_integer().not_null())
                    .col(ColumnDef::new(Splits::Description).string())
                    .col(
                        ColumnDef::new(Splits::IsFee)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Splits::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-splits-transaction_id")
                            .from(Splits::Table, Splits::TransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-splits-category_id")
                            .from(Splits::Table, Splits::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-splits-transaction_id")
                    .table(Splits::Table)
                    .col(Splits::TransactionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SystemState::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SystemState::Id)
                            .big_integer()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SystemState::OpenTransactionId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-system_state-open_transaction_id")
                            .from(SystemState::Table, SystemState::OpenTransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UnlockAudit::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UnlockAudit::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UnlockAudit::TransactionId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UnlockAudit::ExternalReference)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(UnlockAudit::Reason).string().not_null())
                    .col(
                        ColumnDef::new(UnlockAudit::UnlockedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UnlockAudit::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SystemState::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Splits::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Wallet::Table).to_owned())
            .await
    }
}
