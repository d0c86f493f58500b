use axum::{
    Router,
    routing::{delete, get, post},
};

use std::{net::SocketAddr, sync::Arc};

use crate::{categories, daraja, system, transactions, wallet};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

pub fn router(engine: Arc<Engine>) -> Router {
    let state = ServerState { engine };

    Router::new()
        .route("/api/system/status", get(system::status))
        .route("/api/system/health", get(system::health))
        .route("/api/system/force-unlock", post(system::force_unlock))
        .route("/api/wallet", get(wallet::get))
        .route("/api/wallet/sync", post(wallet::sync))
        .route("/api/wallet/history", get(wallet::history))
        .route(
            "/api/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route("/api/transactions/open", get(transactions::open_detail))
        .route(
            "/api/transactions/{id}/splits",
            post(transactions::add_splits),
        )
        .route("/api/transactions/{id}/balance", get(transactions::balance))
        .route("/api/transactions/{id}/lock", post(transactions::lock))
        .route(
            "/api/transactions/splits/{split_id}",
            delete(transactions::delete_split),
        )
        .route("/api/categories", get(categories::tree))
        .route("/api/categories/dropdown", get(categories::dropdown))
        .route("/api/categories/stats", get(categories::stats))
        .route("/api/daraja/callback", post(daraja::callback))
        .with_state(state)
}

pub async fn run(engine: Engine, addr: SocketAddr) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(Arc::new(engine))).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
