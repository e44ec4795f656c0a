//! Process-level settings sourced from the environment.

use std::path::PathBuf;
use std::time::Duration;

/// Default inference router endpoint.
pub const DEFAULT_BASE_URL: &str = "https://router.huggingface.co/hf-inference";

/// Environment variable holding the bearer token.
pub const TOKEN_ENV: &str = "HF_TOKEN";
/// Environment variable holding the default provider hint.
pub const PROVIDER_ENV: &str = "HF_PROVIDER";
/// Environment variable overriding the endpoint base URL.
pub const BASE_URL_ENV: &str = "HF_INFERENCE_URL";
/// Environment variable pointing at a placeholder override.
pub const PLACEHOLDER_ENV: &str = "HF_PLACEHOLDER";
/// Environment variable setting a request timeout in seconds.
pub const TIMEOUT_ENV: &str = "HF_TIMEOUT_SECS";

/// Bearer token for the inference API.
///
/// The value is never printed: `Debug` is redacted and there is no `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wraps a token. Blank tokens are treated as absent.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        let trimmed = token.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    /// Returns the raw token for the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Dispatcher configuration.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Bearer token; `None` selects demo mode.
    pub credential: Option<Credential>,
    /// Default provider hint applied when a request names none.
    pub provider: Option<String>,
    /// Endpoint base URL; model ids are appended as `/models/{id}`.
    pub base_url: String,
    /// Placeholder override for demo mode.
    pub placeholder_path: Option<PathBuf>,
    /// Per-request timeout. `None` keeps the HTTP client default.
    pub timeout: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            credential: None,
            provider: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            placeholder_path: None,
            timeout: None,
        }
    }
}

impl Settings {
    /// Reads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let timeout = non_blank(TIMEOUT_ENV).and_then(|raw| match raw.parse::<u64>() {
            Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
            _ => {
                tracing::warn!(value = %raw, "ignoring invalid {TIMEOUT_ENV}");
                None
            }
        });

        Self {
            credential: lookup(TOKEN_ENV).and_then(Credential::new),
            provider: non_blank(PROVIDER_ENV),
            base_url: non_blank(BASE_URL_ENV).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            placeholder_path: non_blank(PLACEHOLDER_ENV).map(PathBuf::from),
            timeout,
        }
    }

    /// Returns true when no credential is configured.
    pub fn is_demo(&self) -> bool {
        self.credential.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let cred = Credential::new("hf_secretsecret").unwrap();
        assert_eq!(format!("{cred:?}"), "Credential(***)");
        assert_eq!(cred.expose(), "hf_secretsecret");
    }

    #[test]
    fn test_blank_credential_is_absent() {
        assert!(Credential::new("").is_none());
        assert!(Credential::new("   ").is_none());
    }

    #[test]
    fn test_from_lookup_defaults() {
        let settings = Settings::from_lookup(lookup(&[]));
        assert!(settings.is_demo());
        assert!(settings.provider.is_none());
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert!(settings.placeholder_path.is_none());
        assert!(settings.timeout.is_none());
    }

    #[test]
    fn test_from_lookup_reads_values() {
        let settings = Settings::from_lookup(lookup(&[
            (TOKEN_ENV, "hf_abc123"),
            (PROVIDER_ENV, " novita "),
            (BASE_URL_ENV, "http://localhost:8080"),
            (PLACEHOLDER_ENV, "/srv/demo.png"),
            (TIMEOUT_ENV, "90"),
        ]));
        assert!(!settings.is_demo());
        assert_eq!(settings.provider.as_deref(), Some("novita"));
        assert_eq!(settings.base_url, "http://localhost:8080");
        assert_eq!(settings.placeholder_path, Some(PathBuf::from("/srv/demo.png")));
        assert_eq!(settings.timeout, Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_invalid_timeout_ignored() {
        let settings = Settings::from_lookup(lookup(&[(TIMEOUT_ENV, "soon")]));
        assert!(settings.timeout.is_none());
        let settings = Settings::from_lookup(lookup(&[(TIMEOUT_ENV, "0")]));
        assert!(settings.timeout.is_none());
    }

    #[test]
    fn test_blank_token_selects_demo() {
        let settings = Settings::from_lookup(lookup(&[(TOKEN_ENV, "  ")]));
        assert!(settings.is_demo());
    }
}
