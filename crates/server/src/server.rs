use axum::{
    Router,
    routing::{get, post},
};

use std::sync::Arc;

use crate::{transactions, user, wallets};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/transaction/deposit", post(transactions::deposit_new))
        .route(
            "/transaction/withdrawal",
            post(transactions::withdrawal_new),
        )
        .route("/transaction/transfer", post(transactions::transfer_new))
        .route("/transaction/payment", post(transactions::payment_new))
        .route("/transaction/refund", post(transactions::refund_new))
        .route("/transaction/{id}", get(transactions::get_by_id))
        .route("/transaction/{id}/process", post(transactions::process))
        .route("/transaction/{id}/cancel", post(transactions::cancel))
        .route("/transactions", get(transactions::list))
        .route("/wallet/{user_id}", get(wallets::get_by_user))
        .route("/wallet/{user_id}/block", post(wallets::block))
        .route("/wallet/{user_id}/unblock", post(wallets::unblock))
        .route("/user", post(user::register))
        .route("/user/{id}", get(user::get_by_id))
        .route("/user/{id}/activate", post(user::activate))
        .route("/user/{id}/deactivate", post(user::deactivate))
        .with_state(state)
}

pub async fn run(engine: Engine) {
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:3000").await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
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

    let state = ServerState {
        engine: Arc::new(engine),
    };

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
