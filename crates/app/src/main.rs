use std::{net::SocketAddr, time::Duration};

use migration::{Migrator, MigratorTrait};
use sea_orm::ConnectOptions;
use settings::{Database, EngineSettings};

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;
    let mut tasks = tokio::task::JoinSet::new();

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "pettycash={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let Some(server) = settings.server else {
        tracing::warn!("no [server] section configured, nothing to run");
        return Ok(());
    };
    let engine_settings = settings.engine;

    tasks.spawn(async move {
        tracing::info!("Found server settings...");
        let db = match parse_database(&server.database, &engine_settings).await {
            Ok(db) => db,
            Err(err) => {
                tracing::error!("failed to initialize database: {err}");
                return;
            }
        };

        let engine = match engine::Engine::builder()
            .database(db)
            .admin_code(engine_settings.admin_code)
            .operation_timeout(Duration::from_millis(engine_settings.operation_timeout_ms))
            .build()
            .await
        {
            Ok(engine) => engine,
            Err(err) => {
                tracing::error!("failed to build engine from database: {err}");
                return;
            }
        };

        let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
        let addr: SocketAddr = match format!("{}:{}", bind, server.port).parse() {
            Ok(addr) => addr,
            Err(err) => {
                tracing::error!("invalid bind address {bind}: {err}");
                return;
            }
        };
        server::run(engine, addr).await;
    });

    while tasks.join_next().await.is_some() {
        tasks.shutdown().await;
    }

    Ok(())
}

async fn parse_database(
    config: &Database,
    engine: &EngineSettings,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let mut options = ConnectOptions::new(url);
    options
        .acquire_timeout(Duration::from_millis(engine.acquire_timeout_ms))
        .sqlx_logging(false);

    let database = sea_orm::Database::connect(options).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
