//! Core types for returned media.

use crate::error::{MediaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Broad category of media a model produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    /// Still image.
    Image,
    /// Video clip.
    Video,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
        }
    }
}

/// Supported media formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaFormat {
    /// PNG format (lossless).
    #[default]
    Png,
    /// JPEG format (lossy).
    Jpeg,
    /// WebP format.
    WebP,
    /// MPEG-4 video.
    Mp4,
    /// WebM video.
    WebM,
}

impl MediaFormat {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::WebP => "webp",
            Self::Mp4 => "mp4",
            Self::WebM => "webm",
        }
    }

    /// Returns the MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::WebP => "image/webp",
            Self::Mp4 => "video/mp4",
            Self::WebM => "video/webm",
        }
    }

    /// Returns whether this is an image or a video format.
    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Png | Self::Jpeg | Self::WebP => MediaKind::Image,
            Self::Mp4 | Self::WebM => MediaKind::Video,
        }
    }

    /// Attempts to detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::WebP),
            "mp4" => Some(Self::Mp4),
            "webm" => Some(Self::WebM),
            _ => None,
        }
    }

    /// Parses a `Content-Type` header value, ignoring parameters.
    pub fn from_mime_type(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_lowercase().as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::WebP),
            "video/mp4" => Some(Self::Mp4),
            "video/webm" => Some(Self::WebM),
            _ => None,
        }
    }

    /// Detects media format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.starts_with(b"RIFF") && &data[8..12] == b"WEBP" {
            return Some(Self::WebP);
        }

        // MP4: ....ftyp
        if &data[4..8] == b"ftyp" {
            return Some(Self::Mp4);
        }

        // WebM (EBML): 1A 45 DF A3
        if data.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
            return Some(Self::WebM);
        }

        None
    }
}

/// Metadata about how a result was produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationMetadata {
    /// Model the request was addressed to.
    pub model: Option<String>,
    /// Provider the successful attempt was routed through, if any.
    pub provider: Option<String>,
    /// Wall-clock duration of the dispatch in milliseconds.
    pub duration_ms: Option<u64>,
    /// Names of parameters that were reduced to their model limit.
    pub clamped: Vec<String>,
    /// Whether the provider hint was dropped after a routing rejection.
    pub retried_without_provider: bool,
}

/// Media bytes returned by the inference API or the demo fallback.
#[derive(Debug, Clone)]
#[must_use = "generated media should be saved or displayed"]
pub struct GeneratedMedia {
    /// Raw media bytes.
    pub data: Vec<u8>,
    /// Media format.
    pub format: MediaFormat,
    /// Generation metadata.
    pub metadata: GenerationMetadata,
}

impl GeneratedMedia {
    /// Creates a new media value.
    pub fn new(data: Vec<u8>, format: MediaFormat, metadata: GenerationMetadata) -> Self {
        Self {
            data,
            format,
            metadata,
        }
    }

    /// Creates a media value from a response body.
    ///
    /// The declared content type wins; magic bytes are the fallback for
    /// `application/octet-stream` and missing headers.
    pub fn from_response(
        data: Vec<u8>,
        content_type: Option<&str>,
        metadata: GenerationMetadata,
    ) -> Result<Self> {
        let format = content_type
            .and_then(MediaFormat::from_mime_type)
            .or_else(|| MediaFormat::from_magic_bytes(&data))
            .ok_or_else(|| {
                MediaError::Decode(format!(
                    "unrecognized media (content type: {})",
                    content_type.unwrap_or("none")
                ))
            })?;
        Ok(Self::new(data, format, metadata))
    }

    /// Returns the MIME type of the payload.
    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// Returns whether the payload is an image or a video.
    pub fn kind(&self) -> MediaKind {
        self.format.kind()
    }

    /// Returns the size of the media data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Saves the media to the specified path.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, &self.data)?;
        Ok(())
    }

    /// Encodes the media data as base64.
    pub fn to_base64(&self) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Returns the media as a data URL, ready for an `<img>` or `<video>` tag.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), self.to_base64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: [u8; 12] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
    const JPEG_MAGIC: [u8; 12] = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0, 0, 0, 0, 0, 0, 0];
    const WEBP_MAGIC: [u8; 12] = *b"RIFF\x00\x00\x00\x00WEBP";
    const MP4_MAGIC: [u8; 12] = *b"\x00\x00\x00\x18ftypisom";
    const WEBM_MAGIC: [u8; 12] = [0x1A, 0x45, 0xDF, 0xA3, 0, 0, 0, 0, 0, 0, 0, 0];

    #[test]
    fn test_format_from_magic_bytes() {
        assert_eq!(
            MediaFormat::from_magic_bytes(&PNG_MAGIC),
            Some(MediaFormat::Png)
        );
        assert_eq!(
            MediaFormat::from_magic_bytes(&JPEG_MAGIC),
            Some(MediaFormat::Jpeg)
        );
        assert_eq!(
            MediaFormat::from_magic_bytes(&WEBP_MAGIC),
            Some(MediaFormat::WebP)
        );
        assert_eq!(
            MediaFormat::from_magic_bytes(&MP4_MAGIC),
            Some(MediaFormat::Mp4)
        );
        assert_eq!(
            MediaFormat::from_magic_bytes(&WEBM_MAGIC),
            Some(MediaFormat::WebM)
        );
        assert_eq!(MediaFormat::from_magic_bytes(b"short"), None);
    }

    #[test]
    fn test_format_from_mime_type() {
        assert_eq!(
            MediaFormat::from_mime_type("image/jpeg"),
            Some(MediaFormat::Jpeg)
        );
        assert_eq!(
            MediaFormat::from_mime_type("video/mp4; codecs=avc1"),
            Some(MediaFormat::Mp4)
        );
        assert_eq!(MediaFormat::from_mime_type("application/json"), None);
    }

    #[test]
    fn test_format_kind() {
        assert_eq!(MediaFormat::Png.kind(), MediaKind::Image);
        assert_eq!(MediaFormat::WebM.kind(), MediaKind::Video);
        assert_eq!(MediaFormat::from_extension("MP4"), Some(MediaFormat::Mp4));
    }

    #[test]
    fn test_from_response_prefers_content_type() {
        let media = GeneratedMedia::from_response(
            PNG_MAGIC.to_vec(),
            Some("image/jpeg"),
            GenerationMetadata::default(),
        )
        .unwrap();
        assert_eq!(media.format, MediaFormat::Jpeg);
    }

    #[test]
    fn test_from_response_sniffs_octet_stream() {
        let media = GeneratedMedia::from_response(
            MP4_MAGIC.to_vec(),
            Some("application/octet-stream"),
            GenerationMetadata::default(),
        )
        .unwrap();
        assert_eq!(media.format, MediaFormat::Mp4);
        assert_eq!(media.kind(), MediaKind::Video);
    }

    #[test]
    fn test_from_response_unknown_fails() {
        let result = GeneratedMedia::from_response(
            b"{\"ok\":true}".to_vec(),
            None,
            GenerationMetadata::default(),
        );
        assert!(matches!(result, Err(MediaError::Decode(_))));
    }

    #[test]
    fn test_data_url() {
        let media = GeneratedMedia::new(
            vec![1, 2, 3],
            MediaFormat::Png,
            GenerationMetadata::default(),
        );
        assert_eq!(media.to_data_url(), "data:image/png;base64,AQID");
    }
}
