//! reqwest-backed transport.

use crate::config::{Credential, DEFAULT_BASE_URL};
use crate::error::{MediaError, Result};
use crate::transport::{InferenceCall, InferenceTransport, MediaResponse};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Builder for HttpTransport.
#[derive(Debug, Clone)]
pub struct HttpTransportBuilder {
    base_url: String,
    timeout: Option<Duration>,
}

impl Default for HttpTransportBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: None,
        }
    }
}

impl HttpTransportBuilder {
    /// Creates a new builder pointed at the default router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the endpoint base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets a per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the transport.
    pub fn build(self) -> Result<HttpTransport> {
        let mut client = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            client = client.timeout(timeout);
        }

        Ok(HttpTransport {
            client: client.build()?,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            timeout: self.timeout,
        })
    }
}

/// Sends inference calls over HTTPS.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    timeout: Option<Duration>,
}

impl HttpTransport {
    /// Creates a new `HttpTransportBuilder`.
    pub fn builder() -> HttpTransportBuilder {
        HttpTransportBuilder::new()
    }

    /// Returns the endpoint for a call.
    fn endpoint(&self, call: &InferenceCall) -> String {
        format!("{}/models/{}", self.base_url, call.model.as_str())
    }

    fn map_send_error(&self, e: reqwest::Error) -> MediaError {
        match self.timeout {
            Some(timeout) if e.is_timeout() => MediaError::Timeout(timeout),
            _ => MediaError::Network(e),
        }
    }
}

#[async_trait]
impl InferenceTransport for HttpTransport {
    async fn send(&self, call: &InferenceCall, credential: &Credential) -> Result<MediaResponse> {
        let url = self.endpoint(call);
        tracing::debug!(
            url = %url,
            provider = call.body.provider.as_deref().unwrap_or("auto"),
            "sending inference request"
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(credential.expose())
            .json(&call.body)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        let headers = response.headers().clone();
        let content_type = headers
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(parse_error(status.as_u16(), &text, &headers, credential));
        }

        let data = response
            .bytes()
            .await
            .map_err(|e| self.map_send_error(e))?
            .to_vec();

        // A JSON body on 200 is an error envelope or a shape we cannot render.
        if content_type
            .as_deref()
            .is_some_and(|ct| ct.starts_with("application/json"))
        {
            let text = String::from_utf8_lossy(&data);
            if let Some(message) = extract_error_message(&text) {
                return Err(MediaError::upstream(
                    status.as_u16(),
                    &message,
                    Some(credential.expose()),
                ));
            }
            return Err(MediaError::Decode(
                "expected media bytes, received JSON".into(),
            ));
        }

        Ok(MediaResponse { data, content_type })
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorField {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorField>,
    #[serde(default)]
    message: Option<String>,
}

/// Pulls the human-readable message out of an error body.
///
/// Understands `{"error": "..."}`, `{"error": ["..."]}` and `{"message": "..."}`.
fn extract_error_message(text: &str) -> Option<String> {
    let envelope: ErrorEnvelope = serde_json::from_str(text).ok()?;
    match envelope.error {
        Some(ErrorField::One(message)) => Some(message),
        Some(ErrorField::Many(messages)) if !messages.is_empty() => Some(messages.join("; ")),
        _ => envelope.message,
    }
}

fn parse_retry_after(headers: &reqwest::header::HeaderMap) -> Option<u64> {
    headers
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

fn parse_error(
    status: u16,
    text: &str,
    headers: &reqwest::header::HeaderMap,
    credential: &Credential,
) -> MediaError {
    if status == 429 {
        return MediaError::RateLimited {
            retry_after: parse_retry_after(headers).map(Duration::from_secs),
        };
    }

    let message = extract_error_message(text).unwrap_or_else(|| text.to_string());
    MediaError::upstream(status, &message, Some(credential.expose()))
}
