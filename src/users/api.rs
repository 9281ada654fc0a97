//! Employee Management API (admin only)

use crate::auth::{
    models::{is_valid_email, normalize_email, Claims, UserResponse, UserRole, UserStatus},
    password::{check_strength, hash_password},
    user_store::NewUser,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::validation::{clean_optional, parse_id};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;

/// Create user request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<UserRole>,
    pub department: Option<String>,
}

/// Partial update; absent fields are left alone, a blank department clears it
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub department: Option<String>,
    pub role: Option<UserRole>,
    pub status: Option<UserStatus>,
    pub password: Option<String>,
}

/// List all users - GET /users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = state.users.list_users()?;
    Ok(Json(users.iter().map(UserResponse::from_user).collect()))
}

/// Create user - POST /users
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let email = normalize_email(&payload.email);
    let name = payload.name.trim().to_string();

    if name.is_empty() {
        return Err(ApiError::validation("Name is required"));
    }
    if !is_valid_email(&email) {
        return Err(ApiError::validation("A valid email is required"));
    }
    check_strength(&payload.password).map_err(ApiError::Validation)?;

    let password_hash = hash_password(&payload.password, state.bcrypt_cost).await?;
    let user = state
        .users
        .create_user(NewUser {
            email,
            password_hash,
            role: payload.role.unwrap_or(UserRole::Employee),
            name,
            department: clean_optional(payload.department),
        })?
        .ok_or_else(|| ApiError::validation("User already exists"))?;

    Ok((StatusCode::CREATED, Json(UserResponse::from_user(&user))))
}

/// Get user - GET /users/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let uuid = parse_id(&user_id)?;
    let user = state
        .users
        .get_user_by_id(&uuid)?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(Json(UserResponse::from_user(&user)))
}

/// Update user - PUT /users/:id
pub async fn update_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let uuid = parse_id(&user_id)?;
    let mut user = state
        .users
        .get_user_by_id(&uuid)?
        .ok_or(ApiError::NotFound("User"))?;

    let is_self = uuid.to_string() == claims.sub;
    if is_self && payload.role.is_some_and(|role| role != UserRole::Admin) {
        return Err(ApiError::validation("Cannot remove your own admin role"));
    }
    if is_self && payload.status == Some(UserStatus::Inactive) {
        return Err(ApiError::validation("Cannot deactivate your own account"));
    }

    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::validation("Name must not be empty"));
        }
        user.name = name;
    }
    if payload.department.is_some() {
        user.department = clean_optional(payload.department);
    }
    if let Some(role) = payload.role {
        user.role = role;
    }
    if let Some(status) = payload.status {
        user.status = status;
    }
    if let Some(password) = payload.password {
        check_strength(&password).map_err(ApiError::Validation)?;
        user.password_hash = hash_password(&password, state.bcrypt_cost).await?;
    }

    if !state.users.update_user(&mut user)? {
        return Err(ApiError::NotFound("User"));
    }

    info!("✏️  User updated: {} by {}", user.email, claims.email);

    Ok(Json(UserResponse::from_user(&user)))
}

/// Delete user - DELETE /users/:id
///
/// The deleted account's candidates and clients move to the acting admin.
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<String>,
) -> ApiResult<StatusCode> {
    let uuid = parse_id(&user_id)?;

    // Don't allow deleting yourself
    if uuid.to_string() == claims.sub {
        return Err(ApiError::validation("Cannot delete your own account"));
    }

    let admin_id = claims.user_id().ok_or(ApiError::InvalidToken)?;
    if !state.users.delete_user(&uuid, &admin_id)? {
        return Err(ApiError::NotFound("User"));
    }

    Ok(StatusCode::NO_CONTENT)
}
