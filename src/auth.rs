// src/auth.rs
//!
//! Session management against the hosted identity provider.
//!
//! The provider speaks a GoTrue-style REST API: `signup`, a password
//! grant on the token endpoint, and `logout`. Every request carries the
//! project's public API key; login additionally yields a bearer token
//! held in the [`Session`].

use crate::{Error, Session};
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;

pub struct AuthClient {
    agent: ureq::Agent,
    base: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: UserInfo,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    email: String,
}

impl AuthClient {
    pub fn new(identity_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        let agent = ureq::builder()
            .timeout(Duration::from_secs(30))
            .build();
        Self {
            agent,
            base: identity_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Register a new account. On success the provider sends a
    /// verification email; no session is created here.
    pub fn sign_up(&self, email: &str, password: &str) -> Result<(), Error> {
        let (email, password) = validate_credentials(email, password)?;
        tracing::debug!(%email, "registering account");

        let url = format!("{}/auth/v1/signup", self.base);
        let payload = serde_json::json!({ "email": email, "password": password });
        self.send(&url, payload)?;
        Ok(())
    }

    /// Exchange credentials for a session via the password grant.
    pub fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, Error> {
        let (email, password) = validate_credentials(email, password)?;
        tracing::debug!(%email, "logging in");

        let url = format!("{}/auth/v1/token?grant_type=password", self.base);
        let payload = serde_json::json!({ "email": email, "password": password });
        let response = self.send(&url, payload)?;

        let token: TokenResponse = response
            .into_json()
            .map_err(|e| Error::Auth(format!("malformed login response: {e}")))?;
        Ok(Session {
            email: token.user.email,
            access_token: token.access_token,
            created_at: Utc::now(),
        })
    }

    /// Invalidate the session server-side. Callers revert to anonymous
    /// regardless of whether this succeeds.
    pub fn sign_out(&self, session: &Session) -> Result<(), Error> {
        tracing::debug!(email = %session.email, "logging out");
        let url = format!("{}/auth/v1/logout", self.base);
        let response = self
            .agent
            .post(&url)
            .set("apikey", &self.api_key)
            .set("Authorization", &format!("Bearer {}", session.access_token))
            .call();
        match response {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(code, resp)) => Err(provider_error(code, resp)),
            Err(e) => Err(Error::Auth(format!("failed to reach identity provider: {e}"))),
        }
    }

    fn send(&self, url: &str, payload: serde_json::Value) -> Result<ureq::Response, Error> {
        let response = self
            .agent
            .post(url)
            .set("apikey", &self.api_key)
            .set("Content-Type", "application/json")
            .send_json(payload);
        match response {
            Ok(resp) => Ok(resp),
            Err(ureq::Error::Status(code, resp)) => Err(provider_error(code, resp)),
            Err(e) => Err(Error::Auth(format!("failed to reach identity provider: {e}"))),
        }
    }
}

/// Trim both fields and reject the operation locally when either is
/// empty, before any network call is made.
pub fn validate_credentials(email: &str, password: &str) -> Result<(String, String), Error> {
    let email = email.trim();
    let password = password.trim();
    if email.is_empty() || password.is_empty() {
        return Err(Error::Validation("Email and password required.".to_string()));
    }
    Ok((email.to_string(), password.to_string()))
}

/// Pull the human-readable message out of a provider failure body. The
/// provider is inconsistent about the field name across endpoints.
fn provider_error(code: u16, resp: ureq::Response) -> Error {
    let body: Result<serde_json::Value, _> = resp.into_json();
    let message = body.ok().and_then(|json| {
        ["message", "msg", "error_description", "error"]
            .iter()
            .find_map(|field| json[field].as_str().map(str::to_string))
    });
    Error::Auth(message.unwrap_or_else(|| format!("identity provider returned HTTP {code}")))
}
