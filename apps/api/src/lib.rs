//! ReferHub API: candidate referral tracking backend.

pub mod auth;
pub mod candidates;
pub mod config;
pub mod db;
pub mod errors;
pub mod extract;
pub mod media;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
