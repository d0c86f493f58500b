//! Seed rows: the wallet, the system state and the default category tree.

use chrono::Utc;
use sea_orm::ConnectionTrait;
use sea_orm_migration::prelude::*;

use super::m20261019_000001_init::{Categories, SystemState, Wallet};

#[derive(DeriveMigrationName)]
pub struct Migration;

/// `(id, parent_id, name, is_system)`.
const CATEGORIES: &[(i64, Option<i64>, &str, bool)] = &[
    (1, None, "M-Pesa Fees", true),
    (2, None, "Office Supplies", false),
    (3, Some(2), "Stationery", false),
    (4, Some(2), "Printing", false),
    (5, Some(2), "Cleaning Supplies", false),
    (6, None, "Transport", false),
    (7, Some(6), "Fuel", false),
    (8, Some(6), "Fares", false),
    (9, Some(6), "Deliveries", false),
    (10, None, "Meals & Refreshments", false),
    (11, Some(10), "Staff Meals", false),
    (12, Some(10), "Guest Refreshments", false),
    (13, None, "Utilities", false),
    (14, Some(13), "Electricity", false),
    (15, Some(13), "Water", false),
    (16, Some(13), "Airtime & Data", false),
    (17, None, "Repairs & Maintenance", false),
    (18, None, "Miscellaneous", false),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();

        let wallet = Query::insert()
            .into_table(Wallet::Table)
            .columns([Wallet::Id, Wallet::CurrentBalanceMinor, Wallet::LastUpdated])
            .values_panic([1i64.into(), 0i64.into(), Utc::now().into()])
            .to_owned();
        db.execute(backend.build(&wallet)).await?;

        let mut categories = Query::insert()
            .into_table(Categories::Table)
            .columns([
                Categories::Id,
                Categories::ParentId,
                Categories::Name,
                Categories::IsSystem,
            ])
            .to_owned();
        for (id, parent_id, name, is_system) in CATEGORIES {
            categories.values_panic([
                (*id).into(),
                (*parent_id).into(),
                (*name).into(),
                (*is_system).into(),
            ]);
        }
        db.execute(backend.build(&categories)).await?;

        let state = Query::insert()
            .into_table(SystemState::Table)
            .columns([SystemState::Id, SystemState::OpenTransactionId])
            .values_panic([1i64.into(), None::<i64>.into()])
            .to_owned();
        db.execute(backend.build(&state)).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        let backend = db.get_database_backend();
        for stmt in [
            Query::delete().from_table(SystemState::Table).to_owned(),
            Query::delete().from_table(Categories::Table).to_owned(),
            Query::delete().from_table(Wallet::Table).to_owned(),
        ] {
            db.execute(backend.build(&stmt)).await?;
        }
        Ok(())
    }
}
