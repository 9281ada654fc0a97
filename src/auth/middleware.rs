//! Authentication Middleware
//! Mission: Protect API endpoints with JWT validation and role gates

use crate::auth::{
    jwt::{JwtHandler, TokenError},
    models::{Claims, UserRole},
    user_store::UserStore,
};
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use std::sync::Arc;
use tracing::warn;

/// Response header carrying a re-minted token when the presented one was close to expiry
pub const REFRESHED_TOKEN_HEADER: &str = "x-refreshed-token";

/// Pull the token out of `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().to_string())
}

/// Validate a token, mapping failures onto API errors
pub fn authenticate(jwt_handler: &JwtHandler, token: &str) -> Result<Claims, ApiError> {
    jwt_handler.validate_token(token).map_err(|err| match err {
        TokenError::Expired { expired_at } => {
            warn!("Rejected expired token (expired at {})", expired_at.to_rfc3339());
            ApiError::TokenExpired { expired_at }
        }
        TokenError::Invalid => {
            warn!("Rejected invalid token");
            ApiError::InvalidToken
        }
    })
}

/// What token verification needs: the signing keys, plus the account store
/// consulted when a token is re-minted
#[derive(Clone)]
pub struct AuthState {
    pub jwt_handler: Arc<JwtHandler>,
    pub users: UserStore,
}

/// Replace a token with less than a day left.
///
/// The replacement is minted from the stored account: deleted accounts get
/// 401, deactivated ones 403, and the role is whatever the account holds now.
/// Returns the new token with its claims, or `None` when no refresh is due.
pub fn refresh_if_needed(
    auth: &AuthState,
    claims: &Claims,
) -> Result<Option<(String, Claims)>, ApiError> {
    if !auth.jwt_handler.needs_refresh(claims) {
        return Ok(None);
    }

    let user = match claims.user_id() {
        Some(id) => auth.users.get_user_by_id(&id)?,
        None => None,
    };
    let Some(user) = user else {
        warn!("Refresh refused: account {} no longer exists", claims.sub);
        return Err(ApiError::InvalidToken);
    };
    if !user.is_active() {
        warn!("Refresh refused: account {} is inactive", user.email);
        return Err(ApiError::Forbidden("Account is inactive"));
    }

    Ok(Some(auth.jwt_handler.reissue(&user)?))
}

/// Auth middleware that validates JWT tokens
///
/// Valid claims are placed in the request extensions for handlers. A token
/// with less than a day left is replaced transparently via
/// [`REFRESHED_TOKEN_HEADER`], and the request proceeds with the
/// replacement's claims.
pub async fn auth_middleware(
    State(auth): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers()).ok_or(ApiError::MissingToken)?;
    let claims = authenticate(&auth.jwt_handler, &token)?;

    let refreshed = match refresh_if_needed(&auth, &claims)? {
        Some((token, fresh)) => {
            req.extensions_mut().insert(fresh);
            Some(token)
        }
        None => {
            req.extensions_mut().insert(claims);
            None
        }
    };

    let mut response = next.run(req).await;

    if let Some(token) = refreshed {
        if let Ok(value) = HeaderValue::from_str(&token) {
            response.headers_mut().insert(REFRESHED_TOKEN_HEADER, value);
        }
    }

    Ok(response)
}

/// Allow-list of roles for a group of routes
#[derive(Debug, Clone, Copy)]
pub struct RoleGate {
    allowed: &'static [UserRole],
}

impl RoleGate {
    pub const fn new(allowed: &'static [UserRole]) -> Self {
        Self { allowed }
    }

    pub fn admin_only() -> Self {
        Self::new(&[UserRole::Admin])
    }

    pub fn allows(&self, role: UserRole) -> bool {
        self.allowed.contains(&role)
    }
}

/// Role gate middleware; must run after [`auth_middleware`]
pub async fn role_gate(
    State(gate): State<RoleGate>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or(ApiError::MissingToken)?;

    if !gate.allows(claims.role) {
        warn!(
            "Forbidden: user {} with role {} hit {}",
            claims.sub,
            claims.role.as_str(),
            req.uri().path()
        );
        return Err(ApiError::Forbidden("Insufficient permissions"));
    }

    Ok(next.run(req).await)
}
