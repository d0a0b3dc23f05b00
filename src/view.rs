// src/view.rs
//!
//! Explicit view state owned by the UI layer.
//!
//! Extraction and dispatch stay pure; every visible change goes through a
//! transition on [`ViewState`], and rendering the state to text is a
//! separate step. At most one output is held at a time: a new result
//! overwrites whatever was displayed before.

use crate::render;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated { email: String },
}

/// The single result slot below the query echo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Pending(String),
    Answer(String),
    Summary(String),
    Failure(String),
}

#[derive(Debug, Clone)]
pub struct ViewState {
    pub auth: AuthState,
    /// One-line status from the last auth action ("Logged in as ...").
    pub notice: Option<String>,
    /// Welcome banner shown while authenticated.
    pub welcome: Option<String>,
    /// Echo of what the user asked for.
    pub query_echo: Option<String>,
    pub output: Option<Output>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            auth: AuthState::Anonymous,
            notice: None,
            welcome: None,
            query_echo: None,
            output: None,
        }
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.auth, AuthState::Authenticated { .. })
    }

    pub fn set_notice(&mut self, message: impl Into<String>) {
        self.notice = Some(message.into());
    }

    pub fn on_login(&mut self, email: &str) {
        self.auth = AuthState::Authenticated {
            email: email.to_string(),
        };
        self.notice = Some(format!("Logged in as {email}"));
        self.welcome = Some(format!("Welcome, {email}!"));
    }

    pub fn on_logout(&mut self) {
        self.auth = AuthState::Anonymous;
        self.notice = Some("Logged out.".to_string());
        self.welcome = None;
    }

    pub fn show_pending(&mut self, echo: impl Into<String>, placeholder: impl Into<String>) {
        self.query_echo = Some(echo.into());
        self.output = Some(Output::Pending(placeholder.into()));
    }

    pub fn show_answer(&mut self, markdown: impl Into<String>) {
        self.output = Some(Output::Answer(markdown.into()));
    }

    pub fn show_summary(&mut self, markdown: impl Into<String>) {
        self.output = Some(Output::Summary(markdown.into()));
    }

    pub fn show_failure(&mut self, message: impl Into<String>) {
        self.output = Some(Output::Failure(message.into()));
    }

    /// Render the whole state to displayable text. Markdown is expanded
    /// here and nowhere else.
    pub fn render(&self) -> String {
        let mut lines = Vec::new();
        if let Some(notice) = &self.notice {
            lines.push(notice.clone());
        }
        if let Some(welcome) = &self.welcome {
            lines.push(welcome.clone());
        }
        if let Some(echo) = &self.query_echo {
            lines.push(echo.clone());
        }
        match &self.output {
            Some(Output::Pending(placeholder)) => lines.push(placeholder.clone()),
            Some(Output::Answer(md)) => {
                lines.push("AI answered:".to_string());
                lines.push(render::render_markdown(md));
            }
            Some(Output::Summary(md)) => {
                lines.push("AI summarized:".to_string());
                lines.push(render::render_markdown(md));
            }
            Some(Output::Failure(message)) => lines.push(render::render_error(message)),
            None => {}
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_then_logout_round_trips_auth_state() {
        let mut view = ViewState::new();
        assert!(!view.is_authenticated());

        view.on_login("user@example.com");
        assert_eq!(
            view.auth,
            AuthState::Authenticated {
                email: "user@example.com".to_string()
            }
        );
        assert_eq!(view.welcome.as_deref(), Some("Welcome, user@example.com!"));

        view.on_logout();
        assert_eq!(view.auth, AuthState::Anonymous);
        assert!(view.welcome.is_none());
        assert_eq!(view.notice.as_deref(), Some("Logged out."));
    }

    #[test]
    fn new_output_overwrites_prior_output() {
        let mut view = ViewState::new();
        view.show_pending("You asked: a", "AI is thinking...");
        view.show_answer("first");
        view.show_failure("backend down");
        assert_eq!(view.output, Some(Output::Failure("backend down".to_string())));
    }

    #[test]
    fn render_includes_failure_block() {
        let mut view = ViewState::new();
        view.show_failure("model unavailable");
        assert!(view.render().contains("model unavailable"));
    }
}
