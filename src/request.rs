//! Generation requests and their tunable parameters.

use crate::error::{MediaError, Result};
use crate::models::ModelId;
use serde::{Deserialize, Serialize};

/// Numeric and textual knobs forwarded to the model.
///
/// Field names match the wire names of the inference API. Unset fields are
/// omitted from the request body so the model's own defaults apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InferenceParameters {
    /// Number of denoising steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_inference_steps: Option<u32>,
    /// Output width in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Output height in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Classifier-free guidance scale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance_scale: Option<f32>,
    /// What the model should avoid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_prompt: Option<String>,
    /// Seed for deterministic generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Frame count for video models.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_frames: Option<u32>,
}

impl InferenceParameters {
    /// Returns true if no parameter is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A request to generate media from a prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// The text prompt describing the desired media.
    pub prompt: String,
    /// Target model.
    pub model: ModelId,
    /// Routing hint naming the compute partner that should serve the request.
    pub provider: Option<String>,
    /// Model parameters (clamped before sending).
    #[serde(default)]
    pub parameters: InferenceParameters,
}

impl GenerationRequest {
    /// Creates a new request for the given prompt and model.
    pub fn new(prompt: impl Into<String>, model: ModelId) -> Self {
        Self {
            prompt: prompt.into(),
            model,
            provider: None,
            parameters: InferenceParameters::default(),
        }
    }

    /// Sets the provider routing hint. Blank names are ignored.
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        let provider = provider.into();
        let trimmed = provider.trim();
        self.provider = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    /// Sets the number of inference steps.
    pub fn with_steps(mut self, steps: u32) -> Self {
        self.parameters.num_inference_steps = Some(steps);
        self
    }

    /// Sets the desired dimensions.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.parameters.width = Some(width);
        self.parameters.height = Some(height);
        self
    }

    /// Sets the guidance scale.
    pub fn with_guidance_scale(mut self, scale: f32) -> Self {
        self.parameters.guidance_scale = Some(scale);
        self
    }

    /// Sets the negative prompt. Blank text clears it.
    pub fn with_negative_prompt(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.parameters.negative_prompt = (!text.trim().is_empty()).then_some(text);
        self
    }

    /// Sets the seed. Negative values mean "random" and clear it.
    pub fn with_seed(mut self, seed: i64) -> Self {
        self.parameters.seed = u64::try_from(seed).ok();
        self
    }

    /// Sets the number of video frames.
    pub fn with_frames(mut self, frames: u32) -> Self {
        self.parameters.num_frames = Some(frames);
        self
    }

    /// Returns the prompt with surrounding whitespace removed.
    pub fn trimmed_prompt(&self) -> &str {
        self.prompt.trim()
    }

    /// Checks the request invariants that clamping cannot repair.
    pub fn validate(&self) -> Result<()> {
        if self.trimmed_prompt().is_empty() {
            return Err(MediaError::InvalidRequest("prompt must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_parameters() {
        let req = GenerationRequest::new("a red bicycle", ModelId::FluxSchnell)
            .with_steps(40)
            .with_size(768, 512)
            .with_guidance_scale(7.5)
            .with_frames(49);

        assert_eq!(req.parameters.num_inference_steps, Some(40));
        assert_eq!(req.parameters.width, Some(768));
        assert_eq!(req.parameters.height, Some(512));
        assert_eq!(req.parameters.guidance_scale, Some(7.5));
        assert_eq!(req.parameters.num_frames, Some(49));
    }

    #[test]
    fn test_negative_seed_means_random() {
        let req = GenerationRequest::new("x", ModelId::FluxSchnell).with_seed(-1);
        assert_eq!(req.parameters.seed, None);

        let req = GenerationRequest::new("x", ModelId::FluxSchnell).with_seed(42);
        assert_eq!(req.parameters.seed, Some(42));
    }

    #[test]
    fn test_blank_optionals_are_dropped() {
        let req = GenerationRequest::new("x", ModelId::FluxSchnell)
            .with_provider("  ")
            .with_negative_prompt("");
        assert!(req.provider.is_none());
        assert!(req.parameters.negative_prompt.is_none());
        assert!(req.parameters.is_empty());

        let req = GenerationRequest::new("x", ModelId::FluxSchnell).with_provider(" novita ");
        assert_eq!(req.provider.as_deref(), Some("novita"));
    }

    #[test]
    fn test_validate_rejects_blank_prompt() {
        let req = GenerationRequest::new("   \n", ModelId::StableDiffusion21);
        assert!(matches!(req.validate(), Err(MediaError::InvalidRequest(_))));

        let req = GenerationRequest::new("  a lighthouse  ", ModelId::StableDiffusion21);
        assert!(req.validate().is_ok());
        assert_eq!(req.trimmed_prompt(), "a lighthouse");
    }

    #[test]
    fn test_parameters_serialize_without_unset_fields() {
        let params = InferenceParameters {
            num_inference_steps: Some(16),
            width: Some(768),
            ..Default::default()
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "num_inference_steps": 16, "width": 768 })
        );
    }
}
