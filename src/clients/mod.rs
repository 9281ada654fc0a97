//! Clients Module
//! Mission: Keep the hiring companies the office works for

pub mod api;
pub mod models;
pub mod store;

pub use models::{Client, ClientStatus};
pub use store::ClientStore;
