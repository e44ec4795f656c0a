//! Supported inference models.

use crate::error::MediaError;
use crate::media::MediaKind;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Models the dispatcher is allowed to address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ModelId {
    /// FLUX.1 [schnell] - fast distilled text-to-image.
    #[default]
    FluxSchnell,
    /// FLUX.1 [dev] - guidance-distilled text-to-image.
    FluxDev,
    /// Stable Diffusion 2.1.
    StableDiffusion21,
    /// Stable Diffusion XL base 1.0.
    StableDiffusionXl,
    /// LTX-Video text-to-video.
    LtxVideo,
    /// Wan 2.1 text-to-video (1.3B).
    Wan21T2v,
}

impl ModelId {
    /// Every supported model, in display order.
    pub const ALL: [ModelId; 6] = [
        Self::FluxSchnell,
        Self::FluxDev,
        Self::StableDiffusion21,
        Self::StableDiffusionXl,
        Self::LtxVideo,
        Self::Wan21T2v,
    ];

    /// Returns the full repository identifier used in the endpoint path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FluxSchnell => "black-forest-labs/FLUX.1-schnell",
            Self::FluxDev => "black-forest-labs/FLUX.1-dev",
            Self::StableDiffusion21 => "stabilityai/stable-diffusion-2-1",
            Self::StableDiffusionXl => "stabilityai/stable-diffusion-xl-base-1.0",
            Self::LtxVideo => "Lightricks/LTX-Video",
            Self::Wan21T2v => "Wan-AI/Wan2.1-T2V-1.3B",
        }
    }

    /// Returns the repository name without its owner (e.g. `FLUX.1-schnell`).
    pub fn short_name(&self) -> &'static str {
        let id = self.as_str();
        id.rsplit('/').next().unwrap_or(id)
    }

    /// Returns the kind of media this model produces.
    pub fn kind(&self) -> MediaKind {
        match self {
            Self::FluxSchnell | Self::FluxDev | Self::StableDiffusion21 | Self::StableDiffusionXl => {
                MediaKind::Image
            }
            Self::LtxVideo | Self::Wan21T2v => MediaKind::Video,
        }
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelId {
    type Err = MediaError;

    /// Accepts the full repository id or the short name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|model| {
                model.as_str().eq_ignore_ascii_case(wanted)
                    || model.short_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| MediaError::UnsupportedModel(wanted.to_string()))
    }
}

impl TryFrom<String> for ModelId {
    type Error = MediaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ModelId> for String {
    fn from(model: ModelId) -> Self {
        model.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_and_short_names() {
        assert_eq!(
            "black-forest-labs/FLUX.1-schnell".parse::<ModelId>().unwrap(),
            ModelId::FluxSchnell
        );
        assert_eq!(
            "FLUX.1-schnell".parse::<ModelId>().unwrap(),
            ModelId::FluxSchnell
        );
        assert_eq!(
            "stable-diffusion-2-1".parse::<ModelId>().unwrap(),
            ModelId::StableDiffusion21
        );
        assert_eq!(
            "  ltx-video ".parse::<ModelId>().unwrap(),
            ModelId::LtxVideo
        );
    }

    #[test]
    fn test_parse_unknown_model() {
        let err = "acme/imagegen-9000".parse::<ModelId>().unwrap_err();
        assert!(matches!(err, MediaError::UnsupportedModel(ref m) if m == "acme/imagegen-9000"));
    }

    #[test]
    fn test_model_kind() {
        assert_eq!(ModelId::FluxDev.kind(), MediaKind::Image);
        assert_eq!(ModelId::Wan21T2v.kind(), MediaKind::Video);
    }

    #[test]
    fn test_short_name() {
        assert_eq!(ModelId::FluxSchnell.short_name(), "FLUX.1-schnell");
        assert_eq!(ModelId::Wan21T2v.short_name(), "Wan2.1-T2V-1.3B");
    }

    #[test]
    fn test_serde_uses_repository_id() {
        let json = serde_json::to_string(&ModelId::StableDiffusionXl).unwrap();
        assert_eq!(json, "\"stabilityai/stable-diffusion-xl-base-1.0\"");
        let back: ModelId = serde_json::from_str("\"FLUX.1-dev\"").unwrap();
        assert_eq!(back, ModelId::FluxDev);
    }
}
