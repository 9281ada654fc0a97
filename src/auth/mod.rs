//! Authentication Module
//! Mission: Secure API access with hashed credentials, JWT tokens and role gates

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod user_store;

pub use jwt::JwtHandler;
pub use middleware::{auth_middleware, role_gate, AuthState, RoleGate};
pub use user_store::UserStore;
