//! Shared application state handed to every router

use crate::auth::{AuthState, JwtHandler, UserStore};
use crate::candidates::CandidateStore;
use crate::clients::ClientStore;
use crate::auth::password::hash_password;
use crate::db::Database;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::OnceCell;
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub users: UserStore,
    pub candidates: CandidateStore,
    pub clients: ClientStore,
    pub jwt_handler: Arc<JwtHandler>,
    pub bcrypt_cost: u32,
    dummy_hash: Arc<OnceCell<String>>,
}

impl AppState {
    pub fn new(db: Database, jwt_handler: Arc<JwtHandler>, bcrypt_cost: u32) -> Self {
        Self {
            users: UserStore::new(db.clone()),
            candidates: CandidateStore::new(db.clone()),
            clients: ClientStore::new(db),
            jwt_handler,
            bcrypt_cost,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// A hash at the configured cost that no real password matches. Login
    /// compares against it for unknown emails so both failures cost one
    /// bcrypt verification.
    pub async fn dummy_hash(&self) -> Result<&str> {
        let cost = self.bcrypt_cost;
        let hash = self
            .dummy_hash
            .get_or_try_init(|| async move {
                let unguessable = Uuid::new_v4().to_string();
                hash_password(&unguessable, cost).await
            })
            .await?;
        Ok(hash.as_str())
    }

    /// The slice of state the token middleware works with
    pub fn auth(&self) -> AuthState {
        AuthState {
            jwt_handler: self.jwt_handler.clone(),
            users: self.users.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;

    #[tokio::test]
    async fn test_dummy_hash_uses_configured_cost_and_is_stable() {
        let state = AppState::new(
            Database::in_memory().unwrap(),
            Arc::new(JwtHandler::new("secret")),
            4,
        );

        let first = state.dummy_hash().await.unwrap().to_string();
        assert!(first.starts_with("$2b$04$"));
        assert_eq!(state.dummy_hash().await.unwrap(), first);
        assert!(!verify_password("password123", &first).await.unwrap());
    }
}
