//! User API endpoints

use api_types::user::{UserNew, UserView};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

fn view(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        name: user.name,
        email: user.email,
        document: user.document,
        phone_number: user.phone_number,
        active: user.active,
        created_at: user.created_at,
    }
}

pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserNew>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let user = state
        .engine
        .register_user(engine::RegisterUserCmd::new(
            payload.name,
            payload.email,
            payload.document,
            payload.phone_number,
        ))
        .await?;
    Ok((StatusCode::CREATED, Json(view(user))))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserView>, ServerError> {
    let user = state.engine.user(id).await?;
    Ok(Json(view(user)))
}

pub async fn activate(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.set_user_active(id, true).await?;
    Ok(StatusCode::OK)
}

pub async fn deactivate(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.set_user_active(id, false).await?;
    Ok(StatusCode::OK)
}
