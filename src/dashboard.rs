//! Dashboard statistics
//!
//! Aggregate counts for the landing page, scoped like the resource routers:
//! employees see numbers for their own records, admins for the whole office.

use crate::auth::models::{Claims, UserRole};
use crate::candidates::CandidateStatus;
use crate::clients::ClientStatus;
use crate::error::ApiResult;
use crate::state::AppState;
use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub candidates: CandidateStats,
    pub clients: ClientStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employees: Option<EmployeeStats>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateStats {
    pub total: i64,
    /// Not yet hired or rejected
    pub open: i64,
    pub by_status: BTreeMap<&'static str, i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientStats {
    pub total: i64,
    pub by_status: BTreeMap<&'static str, i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeStats {
    pub total: i64,
    pub active: i64,
    pub admins: i64,
}

/// GET /dashboard/stats
pub async fn get_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<Json<DashboardStats>> {
    let scope = claims.scope();

    let candidate_counts = state.candidates.count_by_status(&scope)?;
    let mut candidates = CandidateStats {
        total: 0,
        open: 0,
        by_status: BTreeMap::new(),
    };
    for status in CandidateStatus::ALL {
        let count = candidate_counts.get(&status).copied().unwrap_or(0);
        candidates.total += count;
        if status.is_open() {
            candidates.open += count;
        }
        candidates.by_status.insert(status.as_str(), count);
    }

    let client_counts = state.clients.count_by_status(&scope)?;
    let mut clients = ClientStats {
        total: 0,
        by_status: BTreeMap::new(),
    };
    for status in [
        ClientStatus::Prospect,
        ClientStatus::Active,
        ClientStatus::Inactive,
    ] {
        let count = client_counts.get(&status).copied().unwrap_or(0);
        clients.total += count;
        clients.by_status.insert(status.as_str(), count);
    }

    let employees = if claims.role == UserRole::Admin {
        let users = state.users.list_users()?;
        Some(EmployeeStats {
            total: users.len() as i64,
            active: users.iter().filter(|u| u.is_active()).count() as i64,
            admins: users.iter().filter(|u| u.role == UserRole::Admin).count() as i64,
        })
    } else {
        None
    };

    Ok(Json(DashboardStats {
        candidates,
        clients,
        employees,
        generated_at: Utc::now(),
    }))
}
