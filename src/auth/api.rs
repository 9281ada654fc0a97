//! Authentication API Endpoints
//! Mission: Registration, login, token verification and password change

use crate::auth::{
    middleware::{authenticate, bearer_token, refresh_if_needed},
    models::{
        is_valid_email, normalize_email, AuthResponse, ChangePasswordRequest, Claims,
        LoginRequest, RegisterRequest, UserResponse, UserRole, VerifyTokenResponse,
    },
    password::{check_strength, hash_password, verify_password},
    user_store::NewUser,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::validation::clean_optional;
use axum::{extract::State, http::HeaderMap, http::StatusCode, Extension, Json};
use serde_json::{json, Value};
use tracing::{info, warn};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Register endpoint - POST /auth/register
///
/// Self-service accounts are always employees; admins are seeded or created
/// through `/users`.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let email = normalize_email(&payload.email);
    let name = payload.name.trim().to_string();

    if name.is_empty() {
        return Err(ApiError::validation("Name is required"));
    }
    if !is_valid_email(&email) {
        return Err(ApiError::validation("A valid email is required"));
    }
    check_strength(&payload.password).map_err(ApiError::Validation)?;

    if state.users.get_user_by_email(&email)?.is_some() {
        return Err(ApiError::validation("User already exists"));
    }

    let password_hash = hash_password(&payload.password, state.bcrypt_cost).await?;
    let user = state
        .users
        .create_user(NewUser {
            email,
            password_hash,
            role: UserRole::Employee,
            name,
            department: clean_optional(payload.department),
        })?
        .ok_or_else(|| ApiError::validation("User already exists"))?;

    let (token, expires_in) = state.jwt_handler.generate_token(&user)?;

    info!("✅ Registered: {} ({})", user.email, user.role.as_str());

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            expires_in,
            user: UserResponse::from_user(&user),
        }),
    ))
}

/// Login endpoint - POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let email = normalize_email(&payload.email);
    info!("🔐 Login attempt: {}", email);

    let Some(user) = state.users.get_user_by_email(&email)? else {
        verify_password(&payload.password, state.dummy_hash().await?).await?;
        warn!("❌ Failed login attempt: {}", email);
        return Err(ApiError::validation(INVALID_CREDENTIALS));
    };

    if !verify_password(&payload.password, &user.password_hash).await? {
        warn!("❌ Failed login attempt: {}", email);
        return Err(ApiError::validation(INVALID_CREDENTIALS));
    }

    if !user.is_active() {
        warn!("Login refused for inactive account: {}", email);
        return Err(ApiError::Forbidden("Account is inactive"));
    }

    let (token, expires_in) = state.jwt_handler.generate_token(&user)?;

    info!("✅ Login successful: {} ({})", user.email, user.role.as_str());

    Ok(Json(AuthResponse {
        token,
        expires_in,
        user: UserResponse::from_user(&user),
    }))
}

/// Verify token endpoint - POST /auth/verify-token
///
/// Returns a replacement token in the body when the presented one has less
/// than a day left. The replacement reflects the stored account, so the
/// reported identity and role are those of the new token.
pub async fn verify_token(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<Json<VerifyTokenResponse>> {
    let token = bearer_token(&headers).ok_or(ApiError::MissingToken)?;
    let claims = authenticate(&state.jwt_handler, &token)?;

    let (claims, token) = match refresh_if_needed(&state.auth(), &claims)? {
        Some((token, fresh)) => (fresh, Some(token)),
        None => (claims, None),
    };

    Ok(Json(VerifyTokenResponse {
        valid: true,
        expires_at: claims.expires_at(),
        user_id: claims.sub,
        email: claims.email,
        role: claims.role,
        refreshed: token.is_some(),
        token,
    }))
}

/// Change password - PUT /auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<ChangePasswordRequest>,
) -> ApiResult<Json<Value>> {
    if payload.new_password != payload.confirm_password {
        return Err(ApiError::validation(
            "New password and confirmation do not match",
        ));
    }
    check_strength(&payload.new_password).map_err(ApiError::Validation)?;

    let user_id = claims.user_id().ok_or(ApiError::InvalidToken)?;
    let mut user = state
        .users
        .get_user_by_id(&user_id)?
        .ok_or(ApiError::NotFound("User"))?;

    if !verify_password(&payload.current_password, &user.password_hash).await? {
        warn!("Password change with wrong current password: {}", user.email);
        return Err(ApiError::validation("Current password is incorrect"));
    }

    user.password_hash = hash_password(&payload.new_password, state.bcrypt_cost).await?;
    if !state.users.update_user(&mut user)? {
        return Err(ApiError::NotFound("User"));
    }

    info!("🔑 Password changed: {}", user.email);

    Ok(Json(json!({ "message": "Password updated successfully" })))
}

/// Current user - GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<UserResponse>> {
    let user_id = claims.user_id().ok_or(ApiError::InvalidToken)?;
    let user = state
        .users
        .get_user_by_id(&user_id)?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(Json(UserResponse::from_user(&user)))
}
