// src/app.rs
//!
//! Interactive session controller.
//!
//! Owns the view state, the auth client, the API client and the current
//! session. None of the user-facing operations return an error: every
//! failure becomes a displayed message, and the caller re-renders the
//! view afterwards. Operations run to completion one at a time, so a
//! slow request can never be overwritten by an earlier one.

use crate::auth::AuthClient;
use crate::dispatch::ApiClient;
use crate::view::ViewState;
use crate::{extract, Error, Session};
use std::path::Path;

pub struct App {
    view: ViewState,
    auth: Option<AuthClient>,
    api: ApiClient,
    session: Option<Session>,
}

impl App {
    /// `auth` is `None` when the identity provider is not configured;
    /// auth operations then fail with a configuration hint instead of a
    /// network error.
    pub fn new(auth: Option<AuthClient>, api: ApiClient) -> Self {
        Self {
            view: ViewState::new(),
            auth,
            api,
            session: None,
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn register(&mut self, email: &str, password: &str) {
        let Some(auth) = &self.auth else {
            self.view.set_notice(unconfigured_identity_message());
            return;
        };
        match auth.sign_up(email, password) {
            Ok(()) => self
                .view
                .set_notice("Registered! Please verify your email."),
            Err(e) => self.view.set_notice(e.to_string()),
        }
    }

    pub fn login(&mut self, email: &str, password: &str) {
        let Some(auth) = &self.auth else {
            self.view.set_notice(unconfigured_identity_message());
            return;
        };
        match auth.sign_in_with_password(email, password) {
            Ok(session) => {
                self.view.on_login(&session.email);
                self.session = Some(session);
            }
            Err(e) => self.view.set_notice(e.to_string()),
        }
    }

    /// Sign out with the provider, then revert to anonymous locally even
    /// if the provider call failed.
    pub fn logout(&mut self) {
        if let (Some(auth), Some(session)) = (&self.auth, self.session.take()) {
            if let Err(e) = auth.sign_out(&session) {
                tracing::warn!(error = %e, "provider sign-out failed");
            }
        }
        self.view.on_logout();
    }

    /// Ask a question, optionally grounded in a document file.
    pub fn ask(&mut self, question: &str, file: Option<&Path>) {
        if !self.require_auth() {
            return;
        }
        let question = question.trim();
        if question.is_empty() {
            self.view.set_notice("Please ask a question.");
            return;
        }

        let document = match file.map(extract::extract).transpose() {
            Ok(text) => text,
            Err(e) => {
                self.view.show_failure(reading_failure(&e));
                return;
            }
        };

        self.view
            .show_pending(format!("You asked: {question}"), "AI is thinking...");
        match self.api.answer(question, document.as_deref()) {
            Ok(answer) => self.view.show_answer(answer),
            Err(e) => self.view.show_failure(e.to_string()),
        }
    }

    /// Ask the backend to summarize a web page.
    pub fn summarize(&mut self, url: &str) {
        if !self.require_auth() {
            return;
        }
        let url = url.trim();
        if url.is_empty() {
            self.view.set_notice("Please enter a URL.");
            return;
        }

        self.view.show_pending(
            format!("You asked to summarize: {url}"),
            "AI is summarizing the webpage...",
        );
        match self.api.summarize_url(url) {
            Ok(summary) => self.view.show_summary(summary),
            Err(e) => self.view.show_failure(e.to_string()),
        }
    }

    /// The question and summary features sit behind login, mirroring the
    /// protected region of the page this client replaces.
    fn require_auth(&mut self) -> bool {
        if self.view.is_authenticated() {
            return true;
        }
        self.view.set_notice("Please log in first.");
        false
    }
}

fn unconfigured_identity_message() -> String {
    "Identity provider not configured; set ASKDOC_IDENTITY_URL and ASKDOC_IDENTITY_KEY."
        .to_string()
}

fn reading_failure(error: &Error) -> String {
    match error {
        Error::UnsupportedFile => error.to_string(),
        other => format!("Error reading file: {other}"),
    }
}
