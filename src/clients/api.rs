//! Client API Endpoints

use crate::auth::models::{is_valid_email, Claims};
use crate::clients::models::{
    Client, ClientQuery, ClientStatus, CreateClientRequest, UpdateClientRequest,
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

/// GET /clients
pub async fn list_clients(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ClientQuery>,
) -> ApiResult<Json<Vec<Client>>> {
    let clients = state
        .clients
        .list(&claims.scope(), query.status, query.q.as_deref())?;
    Ok(Json(clients))
}

/// POST /clients
pub async fn create_client(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateClientRequest>,
) -> ApiResult<(StatusCode, Json<Client>)> {
    let owner_id = claims.user_id().ok_or(ApiError::InvalidToken)?;

    let company_name = required(payload.company_name, "Company name")?;
    let contact_name = required(payload.contact_name, "Contact name")?;
    let contact_email = contact_email(payload.contact_email)?;

    let now = Utc::now();
    let client = Client {
        id: Uuid::new_v4(),
        company_name,
        contact_name,
        contact_email,
        phone: clean_optional(payload.phone),
        industry: clean_optional(payload.industry),
        status: payload.status.unwrap_or(ClientStatus::Prospect),
        notes: clean_optional(payload.notes),
        owner_id,
        created_at: now,
        updated_at: now,
    };
    state.clients.create(&client)?;

    Ok((StatusCode::CREATED, Json(client)))
}

/// GET /clients/:id
pub async fn get_client(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> ApiResult<Json<Client>> {
    let id = parse_id(&id)?;
    let client = state
        .clients
        .get(&id, &claims.scope())?
        .ok_or(ApiError::NotFound("Client"))?;
    Ok(Json(client))
}

/// PUT /clients/:id
pub async fn update_client(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateClientRequest>,
) -> ApiResult<Json<Client>> {
    let id = parse_id(&id)?;
    let mut client = state
        .clients
        .get(&id, &claims.scope())?
        .ok_or(ApiError::NotFound("Client"))?;

    if let Some(company_name) = payload.company_name {
        client.company_name = required(company_name, "Company name")?;
    }
    if let Some(contact_name) = payload.contact_name {
        client.contact_name = required(contact_name, "Contact name")?;
    }
    if let Some(email) = payload.contact_email {
        client.contact_email = contact_email(email)?;
    }
    if payload.phone.is_some() {
        client.phone = clean_optional(payload.phone);
    }
    if payload.industry.is_some() {
        client.industry = clean_optional(payload.industry);
    }
    if payload.notes.is_some() {
        client.notes = clean_optional(payload.notes);
    }
    if let Some(status) = payload.status {
        client.status = status;
    }

    if !state.clients.update(&mut client)? {
        return Err(ApiError::NotFound("Client"));
    }

    Ok(Json(client))
}

/// DELETE /clients/:id
pub async fn delete_client(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_id(&id)?;
    if !state.clients.delete(&id, &claims.scope())? {
        return Err(ApiError::NotFound("Client"));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn contact_email(raw: String) -> ApiResult<String> {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(ApiError::validation("A valid contact email is required"));
    }
    Ok(email)
}
