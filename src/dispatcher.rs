//! Request dispatch: clamping, the provider-fallback retry, and demo mode.

use crate::clamp::ClampTable;
use crate::config::{Credential, Settings};
use crate::error::Result;
use crate::media::{GeneratedMedia, GenerationMetadata, Placeholder};
use crate::request::GenerationRequest;
use crate::transport::{HttpTransport, InferenceBody, InferenceCall, InferenceTransport};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Outcome of a successful dispatch.
#[derive(Debug, Clone)]
#[must_use = "generated media should be saved or displayed"]
pub enum Generation {
    /// No credential was configured; this is the placeholder asset.
    Demo(GeneratedMedia),
    /// Media returned by the inference API.
    Live(GeneratedMedia),
}

impl Generation {
    /// Returns the media regardless of origin.
    pub fn media(&self) -> &GeneratedMedia {
        match self {
            Self::Demo(media) | Self::Live(media) => media,
        }
    }

    /// Consumes the outcome, returning the media.
    pub fn into_media(self) -> GeneratedMedia {
        match self {
            Self::Demo(media) | Self::Live(media) => media,
        }
    }

    /// Returns true for placeholder output.
    pub fn is_demo(&self) -> bool {
        matches!(self, Self::Demo(_))
    }
}

/// Builder for RequestDispatcher.
#[derive(Default)]
pub struct RequestDispatcherBuilder {
    settings: Settings,
    clamps: ClampTable,
    transport: Option<Arc<dyn InferenceTransport>>,
}

impl RequestDispatcherBuilder {
    /// Creates a new builder with default settings and the built-in clamp table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all settings at once.
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the bearer token. Blank tokens leave demo mode enabled.
    pub fn credential(mut self, token: impl Into<String>) -> Self {
        self.settings.credential = Credential::new(token);
        self
    }

    /// Sets the provider used when a request names none.
    pub fn default_provider(mut self, provider: impl Into<String>) -> Self {
        let provider = provider.into();
        let trimmed = provider.trim();
        self.settings.provider = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Sets the endpoint base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.settings.base_url = url.into();
        self
    }

    /// Sets the HTTP request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.settings.timeout = Some(timeout);
        self
    }

    /// Overrides the demo-mode asset.
    pub fn placeholder(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.settings.placeholder_path = Some(path.into());
        self
    }

    /// Replaces the clamp table.
    pub fn clamp_table(mut self, table: ClampTable) -> Self {
        self.clamps = table;
        self
    }

    /// Uses a custom transport instead of HTTP.
    pub fn transport(mut self, transport: Arc<dyn InferenceTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the dispatcher.
    pub fn build(self) -> Result<RequestDispatcher> {
        let Settings {
            credential,
            provider,
            base_url,
            placeholder_path,
            timeout,
        } = self.settings;

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let mut http = HttpTransport::builder().base_url(base_url);
                if let Some(timeout) = timeout {
                    http = http.timeout(timeout);
                }
                Arc::new(http.build()?)
            }
        };

        let placeholder = match placeholder_path {
            Some(path) => Placeholder::from_path(path),
            None => Placeholder::bundled(),
        };

        Ok(RequestDispatcher {
            transport,
            credential,
            default_provider: provider,
            clamps: self.clamps,
            placeholder,
        })
    }
}

/// Turns generation requests into media.
pub struct RequestDispatcher {
    transport: Arc<dyn InferenceTransport>,
    credential: Option<Credential>,
    default_provider: Option<String>,
    clamps: ClampTable,
    placeholder: Placeholder,
}

impl RequestDispatcher {
    /// Creates a new `RequestDispatcherBuilder`.
    pub fn builder() -> RequestDispatcherBuilder {
        RequestDispatcherBuilder::new()
    }

    /// Builds a dispatcher from [`Settings::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::builder().settings(Settings::from_env()).build()
    }

    /// Returns true when dispatches will return the placeholder.
    pub fn is_demo(&self) -> bool {
        self.credential.is_none()
    }

    /// Returns the clamp table in effect.
    pub fn clamp_table(&self) -> &ClampTable {
        &self.clamps
    }

    /// Generates media for `request`.
    ///
    /// Without a credential this returns [`Generation::Demo`] and makes no
    /// network call. Otherwise parameters are clamped and the call is made
    /// once; if the upstream refuses the provider route and a provider was
    /// set, it is repeated once without the provider.
    pub async fn dispatch(&self, request: &GenerationRequest) -> Result<Generation> {
        let Some(credential) = &self.credential else {
            tracing::info!(model = %request.model, "no credential configured, returning placeholder");
            return Ok(Generation::Demo(
                self.placeholder.load(request.model.as_str()),
            ));
        };

        request.validate()?;
        let start = Instant::now();

        let mut parameters = request.parameters.clone();
        let clamped = self.clamps.apply(request.model, &mut parameters);
        if !clamped.is_empty() {
            tracing::debug!(
                model = %request.model,
                clamped = ?clamped,
                "reduced parameters to model limits"
            );
        }

        let mut call = InferenceCall {
            model: request.model,
            body: InferenceBody {
                inputs: request.trimmed_prompt().to_string(),
                parameters,
                provider: request
                    .provider
                    .as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .or_else(|| self.default_provider.clone()),
            },
        };

        let first = self.transport.send(&call, credential).await;
        let (response, retried) = match first {
            Ok(response) => (response, false),
            Err(e) if e.is_provider_rejection() && call.body.provider.is_some() => {
                tracing::warn!(
                    model = %request.model,
                    provider = call.body.provider.as_deref().unwrap_or_default(),
                    "provider route rejected, retrying without provider: {e}"
                );
                call.body.provider = None;
                (self.transport.send(&call, credential).await?, true)
            }
            Err(e) => return Err(e),
        };

        let metadata = GenerationMetadata {
            model: Some(request.model.as_str().to_string()),
            provider: call.body.provider,
            duration_ms: Some(start.elapsed().as_millis() as u64),
            clamped: clamped.iter().map(|p| p.as_str().to_string()).collect(),
            retried_without_provider: retried,
        };

        let media = GeneratedMedia::from_response(
            response.data,
            response.content_type.as_deref(),
            metadata,
        )?;

        if media.kind() != request.model.kind() {
            tracing::warn!(
                model = %request.model,
                expected = %request.model.kind(),
                received = %media.kind(),
                "upstream returned unexpected media kind"
            );
        }
        tracing::debug!(
            model = %request.model,
            size = media.size(),
            mime = media.mime_type(),
            "generation complete"
        );

        Ok(Generation::Live(media))
    }
}
