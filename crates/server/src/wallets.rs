//! Wallet API endpoints

use api_types::wallet::WalletView;
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn view(wallet: engine::Wallet) -> WalletView {
    WalletView {
        id: wallet.id,
        user_id: wallet.user_id,
        balance_minor: wallet.balance_minor,
        blocked: wallet.blocked,
        updated_at: wallet.updated_at,
    }
}

pub async fn get_by_user(
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<WalletView>, ServerError> {
    let wallet = state.engine.wallet_for_user(user_id).await?;
    Ok(Json(view(wallet)))
}

pub async fn block(
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<WalletView>, ServerError> {
    let wallet = state.engine.set_wallet_blocked(user_id, true).await?;
    Ok(Json(view(wallet)))
}

pub async fn unblock(
    State(state): State<ServerState>,
    Path(user_id): Path<Uuid>,
) -> Result<Json<WalletView>, ServerError> {
    let wallet = state.engine.set_wallet_blocked(user_id, false).await?;
    Ok(Json(view(wallet)))
}
