use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::instrument;

use crate::error::ApiResult;
use crate::state::AppState;

use super::dto::{CreateUserRequest, Pagination, UserResponse};

#[instrument(skip(state, req))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = state.users.create_user(req).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state.users.list_users(page.skip, page.limit).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<UserResponse>> {
    let user = state.users.get_user(id).await?;
    Ok(Json(user.into()))
}
