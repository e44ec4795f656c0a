//! Static media returned in demo mode.

use crate::media::types::{GeneratedMedia, GenerationMetadata, MediaFormat};
use std::path::{Path, PathBuf};

/// PNG compiled into the crate and used when no override is configured.
pub const BUNDLED_PLACEHOLDER: &[u8] = include_bytes!("../../assets/placeholder.png");

/// Source of the demo-mode asset.
///
/// Loading never fails: an unreadable or unrecognized override falls back to
/// [`BUNDLED_PLACEHOLDER`].
#[derive(Debug, Clone, Default)]
pub struct Placeholder {
    path: Option<PathBuf>,
}

impl Placeholder {
    /// Uses the bundled PNG.
    pub fn bundled() -> Self {
        Self::default()
    }

    /// Uses the file at `path`, falling back to the bundled PNG.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Returns the override path, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Reads the asset and wraps it as media tagged with `model`.
    pub fn load(&self, model: &str) -> GeneratedMedia {
        let metadata = GenerationMetadata {
            model: Some(model.to_string()),
            ..Default::default()
        };

        if let Some(path) = &self.path {
            match std::fs::read(path) {
                Ok(data) => match MediaFormat::from_magic_bytes(&data) {
                    Some(format) => return GeneratedMedia::new(data, format, metadata),
                    None => tracing::warn!(
                        path = %path.display(),
                        "placeholder override is not a recognized media file, using bundled asset"
                    ),
                },
                Err(e) => tracing::warn!(
                    path = %path.display(),
                    "failed to read placeholder override, using bundled asset: {e}"
                ),
            }
        }

        GeneratedMedia::new(BUNDLED_PLACEHOLDER.to_vec(), MediaFormat::Png, metadata)
    }
}
