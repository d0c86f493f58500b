#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use sea_orm::{Database, DatabaseConnection, EntityTrait, PaginatorTrait};

use engine::{Amount, Engine, OpenTransactionCmd, OpenedTransaction};
use migration::MigratorTrait;

pub const ADMIN_CODE: &str = "letmein";
pub const FEE_CATEGORY: i64 = 1;
pub const STATIONERY: i64 = 3;
pub const FUEL: i64 = 7;
pub const WATER: i64 = 15;

pub async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .admin_code(Some(ADMIN_CODE.to_string()))
        .build()
        .await
        .unwrap();
    (engine, db)
}

pub async fn engine_with_file_db() -> (Engine, DatabaseConnection, std::path::PathBuf) {
    let root =
        std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();

    let path = root.join(format!("engine_{}.db", uuid::Uuid::new_v4()));
    let url = format!("sqlite:{}?mode=rwc", path.display());

    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .admin_code(Some(ADMIN_CODE.to_string()))
        .build()
        .await
        .unwrap();
    (engine, db, path)
}

pub fn units(v: i64) -> Amount {
    Amount::from_units(v)
}

pub fn yesterday() -> DateTime<Utc> {
    Utc::now() - Duration::days(1)
}

pub async fn open(
    engine: &Engine,
    reference: &str,
    previous: i64,
    new: i64,
) -> OpenedTransaction {
    engine
        .open_transaction(OpenTransactionCmd::manual(
            reference,
            units(previous),
            units(new),
            yesterday(),
        ))
        .await
        .unwrap()
}

pub async fn transaction_count(db: &DatabaseConnection) -> u64 {
    engine::transactions::Entity::find().count(db).await.unwrap()
}

pub async fn split_count(db: &DatabaseConnection) -> u64 {
    engine::splits::Entity::find().count(db).await.unwrap()
}
