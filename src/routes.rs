//! HTTP routing
//!
//! Public auth endpoints, bearer-protected resource routes, and the
//! admin-gated employee routes nested inside the protected group.

use crate::auth::{api as auth_api, auth_middleware, role_gate, RoleGate};
use crate::candidates::api as candidates_api;
use crate::clients::api as clients_api;
use crate::dashboard;
use crate::middleware::request_logging;
use crate::state::AppState;
use crate::users::api as users_api;
use axum::{
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;

pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(auth_api::register))
        .route("/auth/login", post(auth_api::login))
        .route("/auth/verify-token", post(auth_api::verify_token));

    // Employee management (Admin only)
    let admin_routes = Router::new()
        .route(
            "/users",
            get(users_api::list_users).post(users_api::create_user),
        )
        .route(
            "/users/:id",
            get(users_api::get_user)
                .put(users_api::update_user)
                .delete(users_api::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(
            RoleGate::admin_only(),
            role_gate,
        ));

    let protected_routes = Router::new()
        .route("/auth/change-password", put(auth_api::change_password))
        .route("/auth/me", get(auth_api::me))
        .route(
            "/candidates",
            get(candidates_api::list_candidates).post(candidates_api::create_candidate),
        )
        .route(
            "/candidates/:id",
            get(candidates_api::get_candidate)
                .put(candidates_api::update_candidate)
                .delete(candidates_api::delete_candidate),
        )
        .route(
            "/clients",
            get(clients_api::list_clients).post(clients_api::create_client),
        )
        .route(
            "/clients/:id",
            get(clients_api::get_client)
                .put(clients_api::update_client)
                .delete(clients_api::delete_client),
        )
        .route("/dashboard/stats", get(dashboard::get_stats))
        .merge(admin_routes)
        .route_layer(middleware::from_fn_with_state(state.auth(), auth_middleware));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(middleware::from_fn(request_logging))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
