//! Per-model parameter limits.
//!
//! Values above a limit are reduced to it before the request is sent; nothing
//! is rejected.

use crate::models::ModelId;
use crate::request::InferenceParameters;
use serde::Serialize;

/// A clampable numeric parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Parameter {
    /// `num_inference_steps`
    NumInferenceSteps,
    /// `width`
    Width,
    /// `height`
    Height,
    /// `guidance_scale`
    GuidanceScale,
    /// `num_frames`
    NumFrames,
}

impl Parameter {
    /// Returns the wire name of the parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NumInferenceSteps => "num_inference_steps",
            Self::Width => "width",
            Self::Height => "height",
            Self::GuidanceScale => "guidance_scale",
            Self::NumFrames => "num_frames",
        }
    }
}

impl std::fmt::Display for Parameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upper bound for one parameter of one model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClampRule {
    /// Model the rule applies to.
    pub model: ModelId,
    /// Parameter being limited.
    pub parameter: Parameter,
    /// Largest value that may be sent.
    pub max_value: f64,
}

impl ClampRule {
    /// Creates a rule.
    pub const fn new(model: ModelId, parameter: Parameter, max_value: f64) -> Self {
        Self {
            model,
            parameter,
            max_value,
        }
    }
}

const IMAGE_MAX_SIDE: f64 = 1024.0;
const IMAGE_MAX_GUIDANCE: f64 = 12.0;

/// Built-in limits.
const BUILTIN_RULES: &[ClampRule] = &[
    ClampRule::new(ModelId::FluxSchnell, Parameter::NumInferenceSteps, 16.0),
    ClampRule::new(ModelId::FluxSchnell, Parameter::Width, IMAGE_MAX_SIDE),
    ClampRule::new(ModelId::FluxSchnell, Parameter::Height, IMAGE_MAX_SIDE),
    ClampRule::new(ModelId::FluxSchnell, Parameter::GuidanceScale, IMAGE_MAX_GUIDANCE),
    ClampRule::new(ModelId::FluxDev, Parameter::NumInferenceSteps, 50.0),
    ClampRule::new(ModelId::FluxDev, Parameter::Width, IMAGE_MAX_SIDE),
    ClampRule::new(ModelId::FluxDev, Parameter::Height, IMAGE_MAX_SIDE),
    ClampRule::new(ModelId::FluxDev, Parameter::GuidanceScale, IMAGE_MAX_GUIDANCE),
    ClampRule::new(ModelId::StableDiffusion21, Parameter::NumInferenceSteps, 50.0),
    ClampRule::new(ModelId::StableDiffusion21, Parameter::Width, IMAGE_MAX_SIDE),
    ClampRule::new(ModelId::StableDiffusion21, Parameter::Height, IMAGE_MAX_SIDE),
    ClampRule::new(ModelId::StableDiffusion21, Parameter::GuidanceScale, IMAGE_MAX_GUIDANCE),
    ClampRule::new(ModelId::StableDiffusionXl, Parameter::NumInferenceSteps, 50.0),
    ClampRule::new(ModelId::StableDiffusionXl, Parameter::Width, IMAGE_MAX_SIDE),
    ClampRule::new(ModelId::StableDiffusionXl, Parameter::Height, IMAGE_MAX_SIDE),
    ClampRule::new(ModelId::StableDiffusionXl, Parameter::GuidanceScale, IMAGE_MAX_GUIDANCE),
    ClampRule::new(ModelId::LtxVideo, Parameter::NumInferenceSteps, 50.0),
    ClampRule::new(ModelId::LtxVideo, Parameter::Width, 1280.0),
    ClampRule::new(ModelId::LtxVideo, Parameter::Height, 720.0),
    ClampRule::new(ModelId::LtxVideo, Parameter::NumFrames, 161.0),
    ClampRule::new(ModelId::Wan21T2v, Parameter::NumInferenceSteps, 50.0),
    ClampRule::new(ModelId::Wan21T2v, Parameter::Width, 1280.0),
    ClampRule::new(ModelId::Wan21T2v, Parameter::Height, 720.0),
    ClampRule::new(ModelId::Wan21T2v, Parameter::NumFrames, 81.0),
];

/// Lookup table of clamp rules, built once per dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct ClampTable {
    rules: Vec<ClampRule>,
}

impl Default for ClampTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ClampTable {
    /// Returns the built-in limits.
    pub fn builtin() -> Self {
        Self {
            rules: BUILTIN_RULES.to_vec(),
        }
    }

    /// Returns a table with no rules.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Adds a rule, replacing any existing rule for the same model/parameter.
    pub fn with_rule(mut self, rule: ClampRule) -> Self {
        self.rules
            .retain(|r| !(r.model == rule.model && r.parameter == rule.parameter));
        self.rules.push(rule);
        self
    }

    /// Returns every rule.
    pub fn rules(&self) -> &[ClampRule] {
        &self.rules
    }

    /// Returns the rules for one model.
    pub fn rules_for(&self, model: ModelId) -> impl Iterator<Item = &ClampRule> {
        self.rules.iter().filter(move |r| r.model == model)
    }

    /// Returns the limit for a model/parameter pair, if any.
    pub fn limit(&self, model: ModelId, parameter: Parameter) -> Option<f64> {
        self.rules_for(model)
            .find(|r| r.parameter == parameter)
            .map(|r| r.max_value)
    }

    /// Reduces every over-limit parameter to its maximum.
    ///
    /// Returns the parameters that were changed. Unset parameters stay unset.
    pub fn apply(&self, model: ModelId, params: &mut InferenceParameters) -> Vec<Parameter> {
        let mut clamped = Vec::new();

        for rule in self.rules_for(model) {
            let changed = match rule.parameter {
                Parameter::NumInferenceSteps => {
                    clamp_integer(&mut params.num_inference_steps, rule.max_value)
                }
                Parameter::Width => clamp_integer(&mut params.width, rule.max_value),
                Parameter::Height => clamp_integer(&mut params.height, rule.max_value),
                Parameter::NumFrames => clamp_integer(&mut params.num_frames, rule.max_value),
                Parameter::GuidanceScale => clamp_float(&mut params.guidance_scale, rule.max_value),
            };
            if changed {
                clamped.push(rule.parameter);
            }
        }

        clamped
    }
}

fn clamp_integer(value: &mut Option<u32>, max: f64) -> bool {
    // Saturating cast: negative limits become 0, huge limits become u32::MAX.
    let max = max.floor() as u32;
    match value {
        Some(v) if *v > max => {
            *v = max;
            true
        }
        _ => false,
    }
}

fn clamp_float(value: &mut Option<f32>, max: f64) -> bool {
    let max = max as f32;
    match value {
        Some(v) if *v > max => {
            *v = max;
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flux_schnell_steps_clamped_to_16() {
        let table = ClampTable::builtin();
        let mut params = InferenceParameters {
            num_inference_steps: Some(40),
            ..Default::default()
        };
        let clamped = table.apply(ModelId::FluxSchnell, &mut params);
        assert_eq!(params.num_inference_steps, Some(16));
        assert_eq!(clamped, vec![Parameter::NumInferenceSteps]);
    }

    #[test]
    fn test_every_rule_clamps_to_exact_max() {
        let table = ClampTable::builtin();
        for rule in table.rules() {
            let mut params = InferenceParameters {
                num_inference_steps: Some(100_000),
                width: Some(100_000),
                height: Some(100_000),
                guidance_scale: Some(1_000.0),
                num_frames: Some(100_000),
                ..Default::default()
            };
            table.apply(rule.model, &mut params);

            let effective = match rule.parameter {
                Parameter::NumInferenceSteps => params.num_inference_steps.map(f64::from),
                Parameter::Width => params.width.map(f64::from),
                Parameter::Height => params.height.map(f64::from),
                Parameter::GuidanceScale => params.guidance_scale.map(f64::from),
                Parameter::NumFrames => params.num_frames.map(f64::from),
            };
            assert_eq!(
                effective,
                Some(rule.max_value),
                "{} {} not clamped to max",
                rule.model,
                rule.parameter
            );
        }
    }

    #[test]
    fn test_values_within_limit_untouched() {
        let table = ClampTable::builtin();
        let mut params = InferenceParameters {
            num_inference_steps: Some(16),
            width: Some(768),
            guidance_scale: Some(7.5),
            ..Default::default()
        };
        let original = params.clone();
        let clamped = table.apply(ModelId::FluxSchnell, &mut params);
        assert!(clamped.is_empty());
        assert_eq!(params, original);
    }

    #[test]
    fn test_unset_parameters_stay_unset() {
        let table = ClampTable::builtin();
        let mut params = InferenceParameters::default();
        assert!(table.apply(ModelId::LtxVideo, &mut params).is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn test_model_without_rule_is_not_clamped() {
        let table = ClampTable::builtin();
        let mut params = InferenceParameters {
            num_frames: Some(500),
            ..Default::default()
        };
        // Frame limits only exist for video models.
        table.apply(ModelId::FluxSchnell, &mut params);
        assert_eq!(params.num_frames, Some(500));
    }

    #[test]
    fn test_with_rule_replaces_existing() {
        let table = ClampTable::builtin().with_rule(ClampRule::new(
            ModelId::FluxSchnell,
            Parameter::NumInferenceSteps,
            4.0,
        ));
        assert_eq!(
            table.limit(ModelId::FluxSchnell, Parameter::NumInferenceSteps),
            Some(4.0)
        );
        assert_eq!(
            table
                .rules_for(ModelId::FluxSchnell)
                .filter(|r| r.parameter == Parameter::NumInferenceSteps)
                .count(),
            1
        );
    }
}
