//! User API handlers
//!
//! Thin wrappers around `UserService`. Every failure is answered with
//! `{"error": "..."}` via [`ApiError`].

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::dto::{RegisteredUserResponse, UserDto, UserPayload};
use crate::application::UserService;
use crate::interfaces::http::common::{ClientIp, ErrorBody, ValidatedJson};
use crate::interfaces::http::ApiError;

#[derive(Clone)]
pub struct UserHandlerState {
    pub user_service: Arc<UserService>,
}

/// Parse a path id. Only plain decimal digits are accepted.
pub fn parse_user_id(raw: &str) -> Result<i64, ApiError> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ApiError::BadRequest("Invalid user ID".to_string()));
    }
    raw.parse::<i64>()
        .map_err(|_| ApiError::BadRequest("Invalid user ID".to_string()))
}

#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body = UserPayload,
    responses(
        (status = 201, description = "User registered; location metadata of the caller plus `usedId`", body = RegisteredUserResponse),
        (status = 400, description = "Malformed or invalid body", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn create_user(
    State(state): State<UserHandlerState>,
    ClientIp(ip): ClientIp,
    ValidatedJson(payload): ValidatedJson<UserPayload>,
) -> Result<(StatusCode, Json<RegisteredUserResponse>), ApiError> {
    let result = state
        .user_service
        .register_user(payload.into_create_dto(), &ip)
        .await?;
    Ok((StatusCode::CREATED, Json(RegisteredUserResponse(result))))
}

#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses(
        (status = 200, description = "All users ordered by id", body = Vec<UserDto>),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
) -> Result<Json<Vec<UserDto>>, ApiError> {
    let users = state.user_service.list_users().await?;
    Ok(Json(users.into_iter().map(UserDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = UserDto),
        (status = 400, description = "Invalid user ID", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
pub async fn get_user(
    State(state): State<UserHandlerState>,
    Path(id): Path<String>,
) -> Result<Json<UserDto>, ApiError> {
    let id = parse_user_id(&id)?;
    let user = state.user_service.get_user_by_id(id).await?;
    Ok(Json(UserDto::from(user)))
}

#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UserPayload,
    responses(
        (status = 200, description = "User replaced"),
        (status = 400, description = "Invalid user ID or body", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody)
    )
)]
pub async fn update_user(
    State(state): State<UserHandlerState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UserPayload>,
) -> Result<StatusCode, ApiError> {
    let id = parse_user_id(&id)?;
    state.user_service.update_user(payload.into_user(id)).await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted (or never existed)"),
        (status = 400, description = "Invalid user ID", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn delete_user(
    State(state): State<UserHandlerState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_user_id(&id)?;
    state.user_service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
