//! Employee management: admin-only CRUD over staff accounts.
//! Accounts live in the credential store ([`crate::auth::UserStore`]).

pub mod api;
