//! TalentDesk Backend Library
//!
//! Recruiting back-office API: staff accounts, candidates and clients.
//! The binary in `main.rs` only wires configuration to `routes::build_router`.

pub mod auth;
pub mod candidates;
pub mod clients;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod users;
pub mod validation;
