//! Client Models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A hiring company the office recruits for
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub company_name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub phone: Option<String>,
    pub industry: Option<String>,
    pub status: ClientStatus,
    pub notes: Option<String>,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Prospect,
    Active,
    Inactive,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Prospect => "prospect",
            ClientStatus::Active => "active",
            ClientStatus::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "prospect" => Some(ClientStatus::Prospect),
            "active" => Some(ClientStatus::Active),
            "inactive" => Some(ClientStatus::Inactive),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    pub company_name: String,
    pub contact_name: String,
    pub contact_email: String,
    pub phone: Option<String>,
    pub industry: Option<String>,
    pub status: Option<ClientStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    pub company_name: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub industry: Option<String>,
    pub status: Option<ClientStatus>,
    pub notes: Option<String>,
}

/// Query string for `GET /clients`
#[derive(Debug, Default, Deserialize)]
pub struct ClientQuery {
    pub status: Option<ClientStatus>,
    pub q: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_status_strings() {
        assert_eq!(ClientStatus::Prospect.as_str(), "prospect");
        assert_eq!(ClientStatus::parse("ACTIVE"), Some(ClientStatus::Active));
        assert_eq!(ClientStatus::parse("churned"), None);
    }

    #[test]
    fn test_client_serializes_camel_case() {
        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4(),
            company_name: "Acme".to_string(),
            contact_name: "Wile E.".to_string(),
            contact_email: "wile@acme.test".to_string(),
            phone: None,
            industry: Some("Manufacturing".to_string()),
            status: ClientStatus::Active,
            notes: None,
            owner_id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_value(&client).unwrap();
        assert_eq!(json["companyName"], "Acme");
        assert_eq!(json["status"], "active");
        assert!(json.get("ownerId").is_some());
    }
}
