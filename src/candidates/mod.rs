//! Candidates Module
//! Mission: Track people through the recruiting pipeline

pub mod api;
pub mod models;
pub mod store;

pub use models::{Candidate, CandidateStatus};
pub use store::CandidateStore;
