//! Wire types shared by the ReferHub API and its clients.

pub mod auth;
pub mod candidate;
pub mod error;

pub use auth::{AuthResponse, LoginRequest, SignupRequest, UserProfile};
pub use candidate::{
    Candidate, CandidateQuery, CandidateStats, CandidateStatus, NewCandidate,
    ParseStatusError, StatusUpdate,
};
pub use error::ErrorBody;
