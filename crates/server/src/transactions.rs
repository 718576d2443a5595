//! Transactions API endpoints

use api_types::transaction::{
    RefundNew, SingleParty, TransactionCancel, TransactionKind as ApiKind, TransactionList,
    TransactionListResponse, TransactionStatus as ApiStatus, TransactionView, TwoParty,
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn map_kind(kind: engine::TransactionKind) -> ApiKind {
    match kind {
        engine::TransactionKind::Deposit => ApiKind::Deposit,
        engine::TransactionKind::Withdrawal => ApiKind::Withdrawal,
        engine::TransactionKind::Transfer => ApiKind::Transfer,
        engine::TransactionKind::Payment => ApiKind::Payment,
        engine::TransactionKind::Refund => ApiKind::Refund,
    }
}

fn unmap_kind(kind: ApiKind) -> engine::TransactionKind {
    match kind {
        ApiKind::Deposit => engine::TransactionKind::Deposit,
        ApiKind::Withdrawal => engine::TransactionKind::Withdrawal,
        ApiKind::Transfer => engine::TransactionKind::Transfer,
        ApiKind::Payment => engine::TransactionKind::Payment,
        ApiKind::Refund => engine::TransactionKind::Refund,
    }
}

fn map_status(status: engine::TransactionStatus) -> ApiStatus {
    match status {
        engine::TransactionStatus::Pending => ApiStatus::Pending,
        engine::TransactionStatus::Completed => ApiStatus::Completed,
        engine::TransactionStatus::Failed => ApiStatus::Failed,
        engine::TransactionStatus::Cancelled => ApiStatus::Cancelled,
    }
}

fn unmap_status(status: ApiStatus) -> engine::TransactionStatus {
    match status {
        ApiStatus::Pending => engine::TransactionStatus::Pending,
        ApiStatus::Completed => engine::TransactionStatus::Completed,
        ApiStatus::Failed => engine::TransactionStatus::Failed,
        ApiStatus::Cancelled => engine::TransactionStatus::Cancelled,
    }
}

fn view(tx: engine::Transaction) -> TransactionView {
    TransactionView {
        id: tx.id,
        sender_id: tx.sender_id,
        receiver_id: tx.receiver_id,
        amount_minor: tx.amount_minor,
        fee_minor: tx.fee_minor,
        kind: map_kind(tx.kind),
        status: map_status(tx.status),
        description: tx.description,
        created_at: tx.created_at,
        completed_at: tx.completed_at,
        failure_reason: tx.failure_reason,
        refunded_transaction_id: tx.refunded_transaction_id,
    }
}

pub async fn deposit_new(
    State(state): State<ServerState>,
    Json(payload): Json<SingleParty>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let mut cmd = engine::DepositCmd::new(
        payload.user_id,
        payload.amount_minor,
        payload.description.unwrap_or_default(),
    );
    if let Some(score) = payload.risk_score {
        cmd = cmd.risk_score(score);
    }
    let tx = state.engine.create_deposit(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(tx))))
}

pub async fn withdrawal_new(
    State(state): State<ServerState>,
    Json(payload): Json<SingleParty>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let mut cmd = engine::WithdrawalCmd::new(
        payload.user_id,
        payload.amount_minor,
        payload.description.unwrap_or_default(),
    );
    if let Some(score) = payload.risk_score {
        cmd = cmd.risk_score(score);
    }
    let tx = state.engine.create_withdrawal(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(tx))))
}

pub async fn transfer_new(
    State(state): State<ServerState>,
    Json(payload): Json<TwoParty>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let mut cmd = engine::TransferCmd::new(
        payload.sender_id,
        payload.receiver_id,
        payload.amount_minor,
        payload.description.unwrap_or_default(),
    );
    if let Some(score) = payload.risk_score {
        cmd = cmd.risk_score(score);
    }
    let tx = state.engine.create_transfer(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(tx))))
}

pub async fn payment_new(
    State(state): State<ServerState>,
    Json(payload): Json<TwoParty>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let mut cmd = engine::PaymentCmd::new(
        payload.sender_id,
        payload.receiver_id,
        payload.amount_minor,
        payload.description.unwrap_or_default(),
    );
    if let Some(score) = payload.risk_score {
        cmd = cmd.risk_score(score);
    }
    let tx = state.engine.create_payment(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(tx))))
}

pub async fn refund_new(
    State(state): State<ServerState>,
    Json(payload): Json<RefundNew>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let cmd = engine::RefundCmd::new(payload.original_transaction_id, payload.reason);
    let tx = state.engine.create_refund(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(tx))))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.transaction(id).await?;
    Ok(Json(view(tx)))
}

pub async fn process(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.process(id).await?;
    Ok(Json(view(tx)))
}

pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransactionCancel>,
) -> Result<Json<TransactionView>, ServerError> {
    let tx = state.engine.cancel(id, &payload.reason).await?;
    Ok(Json(view(tx)))
}

pub async fn list(
    State(state): State<ServerState>,
    Query(payload): Query<TransactionList>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let limit = payload.limit.unwrap_or(50);

    let filter = engine::TransactionListFilter {
        sender_id: payload.sender_id,
        receiver_id: payload.receiver_id,
        user_id: payload.user_id,
        status: payload.status.map(unmap_status),
        kinds: payload.kind.map(|k| vec![unmap_kind(k)]),
        from: payload.from,
        to: payload.to,
    };

    let (txs, next_cursor) = state
        .engine
        .list_transactions_page(&filter, limit, payload.cursor.as_deref())
        .await?;

    Ok(Json(TransactionListResponse {
        transactions: txs.into_iter().map(view).collect(),
        next_cursor,
    }))
}
