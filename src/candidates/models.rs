//! Candidate Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person in the recruiting pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: String,
    pub status: CandidateStatus,
    pub skills: Vec<String>,
    pub notes: Option<String>,
    pub client_id: Option<Uuid>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Candidate {
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Pipeline stage
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CandidateStatus {
    New,
    Screening,
    Interview,
    Offer,
    Hired,
    Rejected,
}

impl CandidateStatus {
    pub const ALL: [CandidateStatus; 6] = [
        CandidateStatus::New,
        CandidateStatus::Screening,
        CandidateStatus::Interview,
        CandidateStatus::Offer,
        CandidateStatus::Hired,
        CandidateStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateStatus::New => "new",
            CandidateStatus::Screening => "screening",
            CandidateStatus::Interview => "interview",
            CandidateStatus::Offer => "offer",
            CandidateStatus::Hired => "hired",
            CandidateStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// Still moving through the pipeline
    pub fn is_open(&self) -> bool {
        !matches!(self, CandidateStatus::Hired | CandidateStatus::Rejected)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCandidateRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: String,
    pub status: Option<CandidateStatus>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub notes: Option<String>,
    pub client_id: Option<Uuid>,
}

/// Partial update; absent fields are left alone
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCandidateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub status: Option<CandidateStatus>,
    pub skills: Option<Vec<String>>,
    pub notes: Option<String>,
    /// `null` unlinks the client
    #[serde(default, deserialize_with = "crate::validation::double_option")]
    pub client_id: Option<Option<Uuid>>,
}

/// Query string for `GET /candidates`
#[derive(Debug, Default, Deserialize)]
pub struct CandidateQuery {
    pub status: Option<CandidateStatus>,
    pub q: Option<String>,
}

/// Trim skills, drop blanks and case-insensitive duplicates, keep order
pub fn normalize_skills(skills: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(skills.len());
    for skill in skills {
        let skill = skill.trim();
        if skill.is_empty() {
            continue;
        }
        if out.iter().any(|s| s.eq_ignore_ascii_case(skill)) {
            continue;
        }
        out.push(skill.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_through_strings() {
        for status in CandidateStatus::ALL {
            assert_eq!(CandidateStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(CandidateStatus::parse("Interview"), Some(CandidateStatus::Interview));
        assert_eq!(CandidateStatus::parse("ghosted"), None);
    }

    #[test]
    fn test_open_statuses() {
        assert!(CandidateStatus::New.is_open());
        assert!(CandidateStatus::Offer.is_open());
        assert!(!CandidateStatus::Hired.is_open());
        assert!(!CandidateStatus::Rejected.is_open());
    }

    #[test]
    fn test_normalize_skills() {
        let skills = vec![
            " Rust ".to_string(),
            "".to_string(),
            "rust".to_string(),
            "SQL".to_string(),
        ];
        assert_eq!(normalize_skills(skills), vec!["Rust", "SQL"]);
    }

    #[test]
    fn test_create_request_defaults() {
        let req: CreateCandidateRequest = serde_json::from_str(
            r#"{"name":"Ada","email":"ada@example.com","position":"Engineer"}"#,
        )
        .unwrap();
        assert!(req.skills.is_empty());
        assert!(req.status.is_none());
        assert!(req.client_id.is_none());
    }

    #[test]
    fn test_update_request_tells_null_client_from_absent() {
        let absent: UpdateCandidateRequest = serde_json::from_str(r#"{"name":"Ada"}"#).unwrap();
        assert_eq!(absent.client_id, None);

        let cleared: UpdateCandidateRequest =
            serde_json::from_str(r#"{"clientId":null}"#).unwrap();
        assert_eq!(cleared.client_id, Some(None));

        let id = Uuid::new_v4();
        let linked: UpdateCandidateRequest =
            serde_json::from_str(&format!(r#"{{"clientId":"{}"}}"#, id)).unwrap();
        assert_eq!(linked.client_id, Some(Some(id)));
    }
}
