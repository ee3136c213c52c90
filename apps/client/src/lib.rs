//! ReferHub client: API wrapper, persistent session and the auth and
//! dashboard pages, plus the `referhub` command-line shell.

pub mod auth_page;
pub mod cli;
pub mod dashboard;
pub mod http;
pub mod notify;
pub mod render;
pub mod session;
pub mod shell;
