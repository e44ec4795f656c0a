//! Error types for prompt dispatch.

use std::time::Duration;

/// Phrases the inference router uses when a request may not be routed
/// through the requested provider. Matched case-insensitively as literal
/// substrings of the upstream message.
pub const PROVIDER_REJECTION_PHRASES: &[&str] = &["not allowed to post", "not allowed to route"];

/// A rejection phrase only counts when the message also names a provider.
const PROVIDER_WORD: &str = "provider";

/// Upstream messages longer than this are truncated before being stored.
const MAX_MESSAGE_LEN: usize = 500;

const REDACTED: &str = "[redacted]";

/// Errors that can occur while dispatching a generation request.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// Token rejected by the inference API.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Sanitized upstream message.
        message: String,
    },

    /// The router refused to serve the request through the requested provider.
    #[error("provider rejected: {status} - {message}")]
    ProviderRejected {
        /// HTTP status code.
        status: u16,
        /// Sanitized upstream message.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Delay suggested by the `Retry-After` header.
        retry_after: Option<Duration>,
    },

    /// Request exceeded the configured transport timeout.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// Invalid request parameters (e.g. empty prompt).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Model identifier is not in the supported allow-list.
    #[error("unsupported model: {0}")]
    UnsupportedModel(String),

    /// Network or HTTP error.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body could not be interpreted as media.
    #[error("failed to decode: {0}")]
    Decode(String),

    /// I/O error (e.g., saving file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MediaError {
    /// Classifies an upstream error message.
    ///
    /// The provider-rejection check runs on the raw text, before `secret` and
    /// other bearer tokens are scrubbed and the message is truncated.
    pub fn upstream(status: u16, raw_message: &str, secret: Option<&str>) -> Self {
        let rejected = message_indicates_provider_rejection(raw_message);
        let message = sanitize_error_message(raw_message, secret);

        if rejected {
            Self::ProviderRejected { status, message }
        } else if status == 401 {
            Self::Auth(message)
        } else {
            Self::Api { status, message }
        }
    }

    /// Returns the message reported by the upstream service, if any.
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. }
            | Self::ProviderRejected { message, .. }
            | Self::Auth(message) => Some(message.as_str()),
            _ => None,
        }
    }

    /// Returns true if the upstream refused to route via the requested provider.
    ///
    /// This is the only failure that warrants a second attempt (without the
    /// provider hint).
    pub fn is_provider_rejection(&self) -> bool {
        matches!(self, Self::ProviderRejected { .. })
    }
}

/// Checks a raw upstream message for a provider-rejection phrase.
///
/// The message must contain one of [`PROVIDER_REJECTION_PHRASES`] and the
/// word "provider", so a plain access denial on a gated model does not match.
pub fn message_indicates_provider_rejection(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains(PROVIDER_WORD)
        && PROVIDER_REJECTION_PHRASES
            .iter()
            .any(|phrase| lower.contains(phrase))
}

/// Scrubs credentials and caps the length of an upstream error message.
///
/// Every occurrence of `secret` is replaced first. Then any `hf_` token and
/// the first word after `Bearer` (quoted or not) are redacted.
fn sanitize_error_message(text: &str, secret: Option<&str>) -> String {
    let text = match secret.map(str::trim).filter(|s| !s.is_empty()) {
        Some(secret) => text.replace(secret, REDACTED),
        None => text.to_string(),
    };

    let mut out = String::with_capacity(text.len().min(MAX_MESSAGE_LEN));
    let mut redact_next = false;

    for word in text.split_inclusive(char::is_whitespace) {
        let trimmed = word.trim_end();
        if trimmed.is_empty() {
            out.push_str(word);
            continue;
        }

        let core = token_core(trimmed);
        if core.is_empty() {
            out.push_str(word);
            continue;
        }
        if redact_next || (core.starts_with("hf_") && core.len() > 8) {
            redact_next = false;
            if trimmed.contains(REDACTED) {
                out.push_str(word);
                continue;
            }
            let lead = trimmed.len() - trimmed.trim_start_matches(is_wrapper).len();
            let tail = trimmed.len() - trimmed.trim_end_matches(is_wrapper).len();
            out.push_str(&trimmed[..lead]);
            out.push_str(REDACTED);
            out.push_str(&trimmed[trimmed.len() - tail..]);
            out.push_str(&word[trimmed.len()..]);
            continue;
        }

        out.push_str(word);
        redact_next = core.eq_ignore_ascii_case("bearer");
    }

    let out = out.trim().to_string();
    if out.chars().count() > MAX_MESSAGE_LEN {
        let cut: String = out.chars().take(MAX_MESSAGE_LEN).collect();
        format!("{cut}…")
    } else {
        out
    }
}

fn is_wrapper(c: char) -> bool {
    matches!(c, '\'' | '"' | '`' | ',' | ';' | ':' | '(' | ')' | '[' | ']' | '{' | '}')
}

/// Strips surrounding quotes and punctuation from a word.
fn token_core(word: &str) -> &str {
    word.trim_matches(is_wrapper)
}

/// Result type alias for dispatch operations.
pub type Result<T> = std::result::Result<T, MediaError>;
