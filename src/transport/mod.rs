//! Outbound calls to the inference API.

mod http;

use crate::config::Credential;
use crate::error::Result;
use crate::models::ModelId;
use crate::request::InferenceParameters;
use async_trait::async_trait;
use serde::Serialize;

pub use http::{HttpTransport, HttpTransportBuilder};

/// JSON body of one inference call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceBody {
    /// The prompt.
    pub inputs: String,
    /// Clamped model parameters.
    #[serde(skip_serializing_if = "InferenceParameters::is_empty")]
    pub parameters: InferenceParameters,
    /// Provider routing hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// One attempt against one model.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceCall {
    /// Model addressed by the call.
    pub model: ModelId,
    /// Request body.
    pub body: InferenceBody,
}

/// Raw successful response.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaResponse {
    /// Response body bytes.
    pub data: Vec<u8>,
    /// Value of the `Content-Type` header, if sent.
    pub content_type: Option<String>,
}

/// Sends inference calls.
///
/// Implementations perform exactly one request per `send`; the dispatcher owns
/// the retry decision.
#[async_trait]
pub trait InferenceTransport: Send + Sync {
    /// Performs one call, authenticating with `credential`.
    async fn send(&self, call: &InferenceCall, credential: &Credential) -> Result<MediaResponse>;
}
