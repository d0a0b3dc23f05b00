// src/dispatch.rs
//!
//! Query dispatch to the local answer/summary backend.
//!
//! Both operations share one shape: a single JSON POST, no retry, no
//! caching. A non-2xx status carries a JSON body whose `error` field is
//! the user-visible message and is propagated verbatim.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct ApiClient {
    agent: ureq::Agent,
    base: String,
}

#[derive(Debug, Serialize)]
struct SummarizeRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct SummarizeResponse {
    summary: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AnswerRequest<'a> {
    user_question: &'a str,
    document_content: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct AnswerResponse {
    answer: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiClient {
    pub fn new(api_base: impl Into<String>) -> Self {
        let agent = ureq::builder()
            .timeout(Duration::from_secs(120))
            .build();
        Self {
            agent,
            base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Ask the backend to fetch and summarize a web page. Returns the
    /// summary as a markdown string.
    pub fn summarize_url(&self, url: &str) -> Result<String, Error> {
        tracing::debug!(%url, "dispatching summarize request");
        let body = self.post("/api/summarize_url", &SummarizeRequest { url })?;
        let parsed: SummarizeResponse = serde_json::from_value(body)
            .map_err(|e| Error::Api(format!("malformed summary response: {e}")))?;
        Ok(parsed.summary)
    }

    /// Ask a question, optionally grounded in previously extracted
    /// document text. Returns the answer as a markdown string.
    pub fn answer(&self, question: &str, document: Option<&str>) -> Result<String, Error> {
        tracing::debug!(with_document = document.is_some(), "dispatching question");
        let body = self.post(
            "/api/data",
            &AnswerRequest {
                user_question: question,
                document_content: document,
            },
        )?;
        let parsed: AnswerResponse = serde_json::from_value(body)
            .map_err(|e| Error::Api(format!("malformed answer response: {e}")))?;
        Ok(parsed.answer)
    }

    fn post(&self, endpoint: &str, payload: &impl Serialize) -> Result<serde_json::Value, Error> {
        let url = format!("{}{endpoint}", self.base);
        let response = self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_json(payload);
        match response {
            Ok(resp) => resp
                .into_json()
                .map_err(|e| Error::Api(format!("malformed response body: {e}"))),
            Err(ureq::Error::Status(code, resp)) => {
                let message = resp
                    .into_json::<ErrorBody>()
                    .map(|body| body.error)
                    .unwrap_or_else(|_| format!("backend returned HTTP {code}"));
                Err(Error::Api(message))
            }
            Err(e) => Err(Error::Api(format!("failed to reach backend: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_request_uses_backend_field_names() {
        let body = serde_json::to_value(AnswerRequest {
            user_question: "what is this?",
            document_content: None,
        })
        .unwrap();
        assert_eq!(body["userQuestion"], "what is this?");
        assert_eq!(body["documentContent"], serde_json::Value::Null);
    }

    #[test]
    fn unreachable_backend_reports_transport_failure() {
        let client = ApiClient::new("http://127.0.0.1:9");
        let err = client.summarize_url("https://example.com").unwrap_err();
        assert!(err.to_string().contains("failed to reach backend"));
    }
}
