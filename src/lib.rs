#![warn(missing_docs)]
//! hfgen - prompt-to-media dispatch for hosted inference APIs.
//!
//! Sends a text prompt to a text-to-image or text-to-video model behind an
//! inference router and returns the media bytes. Three rules shape every
//! call:
//!
//! - **Clamping**: numeric parameters above a model's limit are reduced to
//!   the limit (see [`ClampTable`]).
//! - **Provider fallback**: if the router refuses the requested provider,
//!   the call is repeated once without it.
//! - **Demo mode**: with no token configured, a bundled placeholder is
//!   returned and nothing is sent.
//!
//! # Quick Start
//!
//! ```no_run
//! use hfgen::{GenerationRequest, ModelId, RequestDispatcher};
//!
//! #[tokio::main]
//! async fn main() -> hfgen::Result<()> {
//!     // Reads HF_TOKEN / HF_PROVIDER from the environment.
//!     let dispatcher = RequestDispatcher::from_env()?;
//!     let request = GenerationRequest::new("a red bicycle", ModelId::FluxSchnell)
//!         .with_steps(40)
//!         .with_size(768, 768);
//!
//!     let outcome = dispatcher.dispatch(&request).await?;
//!     if outcome.is_demo() {
//!         eprintln!("demo mode: set HF_TOKEN to generate with a real model");
//!     }
//!     outcome.media().save("bicycle.png")?;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `cli` (default): the `hfgen` command-line front-end.

mod clamp;
mod config;
mod dispatcher;
mod error;
pub mod media;
mod models;
mod request;
pub mod transport;

pub use clamp::{ClampRule, ClampTable, Parameter};
pub use config::{Credential, Settings, DEFAULT_BASE_URL};
pub use dispatcher::{Generation, RequestDispatcher, RequestDispatcherBuilder};
pub use error::{message_indicates_provider_rejection, MediaError, Result};
pub use media::{GeneratedMedia, GenerationMetadata, MediaFormat, MediaKind};
pub use models::ModelId;
pub use request::{GenerationRequest, InferenceParameters};

/// Environment variable names read by [`Settings::from_env`].
pub mod env {
    pub use crate::config::{BASE_URL_ENV, PLACEHOLDER_ENV, PROVIDER_ENV, TIMEOUT_ENV, TOKEN_ENV};
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::dispatcher::{Generation, RequestDispatcher};
    pub use crate::error::{MediaError, Result};
    pub use crate::media::GeneratedMedia;
    pub use crate::models::ModelId;
    pub use crate::request::GenerationRequest;
}
