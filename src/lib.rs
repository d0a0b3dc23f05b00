// In src/lib.rs

use chrono::{DateTime, Utc};

// The crate-wide error type. Validation, auth and API variants carry the
// exact message that ends up in front of the user; everything else wraps
// the underlying failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Auth(String),
    #[error("Unsupported file type. Please upload txt, pdf, or docx.")]
    UnsupportedFile,
    #[error(transparent)]
    Extract(#[from] anyhow::Error),
    #[error("{0}")]
    Api(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Keyring(#[from] keyring::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub mod app;
pub mod auth;
pub mod config;
pub mod dispatch;
pub mod extract;
pub mod keychain;
pub mod logger;
pub mod render;
pub mod view;

// === Core session value ===
//
// Created on successful login, dropped on logout. Persistence across runs
// is the identity provider's concern, not ours.
#[derive(Debug, Clone)]
pub struct Session {
    pub email: String,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests;
