//! Candidate API Endpoints
//!
//! Employees work only with candidates they created; admins see everyone's.
//! Anything outside the caller's scope is reported as not found.

use crate::auth::models::{is_valid_email, Claims};
use crate::candidates::models::{
    normalize_skills, Candidate, CandidateQuery, CandidateStatus, CreateCandidateRequest,
    UpdateCandidateRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use crate::validation::{clean_optional, parse_id, required};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

/// GET /candidates
pub async fn list_candidates(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<CandidateQuery>,
) -> ApiResult<Json<Vec<Candidate>>> {
    let candidates = state
        .candidates
        .list(&claims.scope(), query.status, query.q.as_deref())?;
    Ok(Json(candidates))
}

/// POST /candidates
pub async fn create_candidate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateCandidateRequest>,
) -> ApiResult<(StatusCode, Json<Candidate>)> {
    let owner_id = claims.user_id().ok_or(ApiError::InvalidToken)?;

    let name = required(payload.name, "Name")?;
    let position = required(payload.position, "Position")?;
    let email = payload.email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::validation("A valid email is required"));
    }
    if let Some(client_id) = payload.client_id {
        ensure_client_visible(&state, &claims, &client_id)?;
    }

    let now = Utc::now();
    let candidate = Candidate {
        id: Uuid::new_v4(),
        name,
        email,
        phone: clean_optional(payload.phone),
        position,
        status: payload.status.unwrap_or(CandidateStatus::New),
        skills: normalize_skills(payload.skills),
        notes: clean_optional(payload.notes),
        client_id: payload.client_id,
        owner_id,
        created_at: now,
        updated_at: now,
    };
    state.candidates.create(&candidate)?;

    Ok((StatusCode::CREATED, Json(candidate)))
}

/// GET /candidates/:id
pub async fn get_candidate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> ApiResult<Json<Candidate>> {
    let id = parse_id(&id)?;
    let candidate = state
        .candidates
        .get(&id, &claims.scope())?
        .ok_or(ApiError::NotFound("Candidate"))?;
    Ok(Json(candidate))
}

/// PUT /candidates/:id
pub async fn update_candidate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCandidateRequest>,
) -> ApiResult<Json<Candidate>> {
    let id = parse_id(&id)?;
    let mut candidate = state
        .candidates
        .get(&id, &claims.scope())?
        .ok_or(ApiError::NotFound("Candidate"))?;

    if let Some(name) = payload.name {
        candidate.name = required(name, "Name")?;
    }
    if let Some(position) = payload.position {
        candidate.position = required(position, "Position")?;
    }
    if let Some(email) = payload.email {
        let email = email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(ApiError::validation("A valid email is required"));
        }
        candidate.email = email;
    }
    if payload.phone.is_some() {
        candidate.phone = clean_optional(payload.phone);
    }
    if payload.notes.is_some() {
        candidate.notes = clean_optional(payload.notes);
    }
    if let Some(status) = payload.status {
        candidate.status = status;
    }
    if let Some(skills) = payload.skills {
        candidate.skills = normalize_skills(skills);
    }
    match payload.client_id {
        Some(Some(client_id)) => {
            ensure_client_visible(&state, &claims, &client_id)?;
            candidate.client_id = Some(client_id);
        }
        Some(None) => candidate.client_id = None,
        None => {}
    }

    if !state.candidates.update(&mut candidate)? {
        return Err(ApiError::NotFound("Candidate"));
    }

    Ok(Json(candidate))
}

/// DELETE /candidates/:id
pub async fn delete_candidate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    if !state.candidates.delete(&id, &claims.scope())? {
        return Err(ApiError::NotFound("Candidate"));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn ensure_client_visible(state: &AppState, claims: &Claims, client_id: &Uuid) -> ApiResult<()> {
    match state.clients.get(client_id, &claims.scope())? {
        Some(_) => Ok(()),
        None => Err(ApiError::validation("Unknown client")),
    }
}
