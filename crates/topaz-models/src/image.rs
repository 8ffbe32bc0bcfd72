//! Image operation options and their wire mapping.
//!
//! Each option struct validates against the declared ranges before any
//! network call, and maps to the multipart form fields the API expects.
//! A field only appears on the wire when it differs from a no-op default,
//! keeping the payload surface small.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::params::{self, ParamError, ParamSpec};

/// Supported output image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    Webp,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::Webp => "webp",
        }
    }

    /// MIME type used for Accept negotiation.
    pub fn mime(&self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Webp => "image/webp",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Denoise model presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum DenoiseModel {
    /// Light noise
    #[default]
    Normal,
    /// Moderate noise
    Strong,
    /// Heavy noise
    Extreme,
}

impl DenoiseModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DenoiseModel::Normal => "Normal",
            DenoiseModel::Strong => "Strong",
            DenoiseModel::Extreme => "Extreme",
        }
    }
}

impl fmt::Display for DenoiseModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Standard enhancement models (fast, high fidelity).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum EnhanceModel {
    #[default]
    StandardV2,
    LowResolutionV2,
    Cgi,
    HighFidelityV2,
    TextRefine,
}

impl EnhanceModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnhanceModel::StandardV2 => "Standard V2",
            EnhanceModel::LowResolutionV2 => "Low Resolution V2",
            EnhanceModel::Cgi => "CGI",
            EnhanceModel::HighFidelityV2 => "High Fidelity V2",
            EnhanceModel::TextRefine => "Text Refine",
        }
    }
}

impl fmt::Display for EnhanceModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Generative enhancement models (slower, creative).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
pub enum GenerativeModel {
    #[default]
    Redefine,
    Recovery,
    RecoveryV2,
}

impl GenerativeModel {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerativeModel::Redefine => "Redefine",
            GenerativeModel::Recovery => "Recovery",
            GenerativeModel::RecoveryV2 => "Recovery V2",
        }
    }

    /// Recovery-family models take a `detail` knob instead of the
    /// Redefine prompt controls.
    pub fn is_recovery(&self) -> bool {
        matches!(self, GenerativeModel::Recovery | GenerativeModel::RecoveryV2)
    }
}

impl fmt::Display for GenerativeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for GenerativeModel {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Redefine" => Ok(GenerativeModel::Redefine),
            "Recovery" => Ok(GenerativeModel::Recovery),
            "Recovery V2" => Ok(GenerativeModel::RecoveryV2),
            other => Err(ParamError::UnknownModel(other.to_string())),
        }
    }
}

/// Options for the denoise endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DenoiseOptions {
    #[serde(default)]
    pub model: DenoiseModel,
    /// How aggressive the noise reduction should be.
    #[serde(default = "default_strength")]
    pub strength: f64,
    /// Mild sharpening applied after noise reduction.
    #[serde(default = "default_minor_deblur")]
    pub minor_deblur: f64,
    /// Restore fine texture lost during denoising.
    #[serde(default = "default_original_detail")]
    pub original_detail: f64,
    #[serde(default)]
    pub output_format: OutputFormat,
}

fn default_strength() -> f64 {
    0.5
}
fn default_minor_deblur() -> f64 {
    0.1
}
fn default_original_detail() -> f64 {
    0.5
}

impl Default for DenoiseOptions {
    fn default() -> Self {
        Self {
            model: DenoiseModel::Normal,
            strength: default_strength(),
            minor_deblur: default_minor_deblur(),
            original_detail: default_original_detail(),
            output_format: OutputFormat::Jpeg,
        }
    }
}

impl DenoiseOptions {
    /// Validate all numeric knobs against their declared ranges.
    pub fn validate(&self) -> Result<(), ParamError> {
        params::STRENGTH.check("strength", self.strength)?;
        params::MINOR_DEBLUR.check("minor_deblur", self.minor_deblur)?;
        params::ORIGINAL_DETAIL.check("original_detail", self.original_detail)?;
        Ok(())
    }

    /// Wire-level form fields for the multipart request.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("model", self.model.as_str().to_string()),
            ("strength", self.strength.to_string()),
            ("minor_deblur", self.minor_deblur.to_string()),
            ("original_detail", self.original_detail.to_string()),
            ("output_format", self.output_format.as_str().to_string()),
        ]
    }

    /// Declarative schema for host UI generation.
    pub fn param_specs() -> Vec<ParamSpec> {
        vec![
            ParamSpec::choice("model", "Normal", &["Normal", "Strong", "Extreme"]),
            ParamSpec::float("strength", default_strength(), params::STRENGTH),
            ParamSpec::float("minor_deblur", default_minor_deblur(), params::MINOR_DEBLUR),
            ParamSpec::float(
                "original_detail",
                default_original_detail(),
                params::ORIGINAL_DETAIL,
            ),
            ParamSpec::choice("output_format", "jpeg", &["jpeg", "png", "webp"]),
        ]
    }
}

/// Options for the standard enhance endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Default)]
pub struct EnhanceOptions {
    #[serde(default)]
    pub model: EnhanceModel,
    /// Additional sharpening beyond the model's default. Zero means none.
    #[serde(default)]
    pub sharpen: f64,
    /// Denoising during enhancement. Zero means none.
    #[serde(default)]
    pub denoise: f64,
    /// Fix lossy JPEG compression artifacts. Zero means none.
    #[serde(default)]
    pub fix_compression: f64,
    /// Face-specific detail restoration.
    #[serde(default)]
    pub face_enhancement: bool,
    #[serde(default = "default_face_strength")]
    pub face_enhancement_strength: f64,
    #[serde(default)]
    pub output_format: OutputFormat,
}

fn default_face_strength() -> f64 {
    0.5
}

impl EnhanceOptions {
    pub fn validate(&self) -> Result<(), ParamError> {
        params::SHARPEN.check("sharpen", self.sharpen)?;
        params::DENOISE.check("denoise", self.denoise)?;
        params::FIX_COMPRESSION.check("fix_compression", self.fix_compression)?;
        params::FACE_ENHANCEMENT_STRENGTH
            .check("face_enhancement_strength", self.face_enhancement_strength)?;
        Ok(())
    }

    /// Wire-level form fields. Optional sliders are only sent when they
    /// differ from the zero no-op; face strength only rides along when
    /// face enhancement is on.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("model", self.model.as_str().to_string()),
            ("output_format", self.output_format.as_str().to_string()),
        ];
        if self.sharpen > 0.0 {
            fields.push(("sharpen", self.sharpen.to_string()));
        }
        if self.denoise > 0.0 {
            fields.push(("denoise", self.denoise.to_string()));
        }
        if self.fix_compression > 0.0 {
            fields.push(("fix_compression", self.fix_compression.to_string()));
        }
        if self.face_enhancement {
            fields.push(("face_enhancement", "true".to_string()));
            fields.push((
                "face_enhancement_strength",
                self.face_enhancement_strength.to_string(),
            ));
        }
        fields
    }

    pub fn param_specs() -> Vec<ParamSpec> {
        vec![
            ParamSpec::choice(
                "model",
                "Standard V2",
                &[
                    "Standard V2",
                    "Low Resolution V2",
                    "CGI",
                    "High Fidelity V2",
                    "Text Refine",
                ],
            ),
            ParamSpec::float("sharpen", 0.0, params::SHARPEN),
            ParamSpec::float("denoise", 0.0, params::DENOISE),
            ParamSpec::float("fix_compression", 0.0, params::FIX_COMPRESSION),
            ParamSpec::bool("face_enhancement", false),
            ParamSpec::float(
                "face_enhancement_strength",
                default_face_strength(),
                params::FACE_ENHANCEMENT_STRENGTH,
            ),
            ParamSpec::choice("output_format", "jpeg", &["jpeg", "png", "webp"]),
        ]
    }
}

/// Options for the generative enhance endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreativeOptions {
    #[serde(default)]
    pub model: GenerativeModel,
    /// Text prompt for Redefine. Ignored when autoprompt is on.
    #[serde(default)]
    pub prompt: String,
    /// Let the model describe the image itself.
    #[serde(default = "default_true")]
    pub autoprompt: bool,
    /// How much creative liberty the model takes (Redefine).
    #[serde(default = "default_creativity")]
    pub creativity: i64,
    /// Amount of generated texture (Redefine).
    #[serde(default = "default_texture")]
    pub texture: i64,
    /// Slight post-render sharpening (Redefine).
    #[serde(default)]
    pub sharpen: f64,
    /// Noise reduction before rendering (Redefine).
    #[serde(default)]
    pub denoise: f64,
    /// Level of added detail after rendering (Recovery family).
    #[serde(default = "default_detail")]
    pub detail: f64,
    /// Optional sharpness boost on the in-focus region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub focus_boost: Option<f64>,
    /// Fixed seed for reproducible output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(default)]
    pub output_format: OutputFormat,
}

fn default_true() -> bool {
    true
}
fn default_creativity() -> i64 {
    3
}
// Low texture pairs best with moderate creativity
fn default_texture() -> i64 {
    1
}
fn default_detail() -> f64 {
    0.5
}

impl Default for CreativeOptions {
    fn default() -> Self {
        Self {
            model: GenerativeModel::Redefine,
            prompt: String::new(),
            autoprompt: true,
            creativity: default_creativity(),
            texture: default_texture(),
            sharpen: 0.0,
            denoise: 0.0,
            detail: default_detail(),
            focus_boost: None,
            seed: None,
            output_format: OutputFormat::Jpeg,
        }
    }
}

impl CreativeOptions {
    pub fn validate(&self) -> Result<(), ParamError> {
        params::CREATIVITY.check("creativity", self.creativity as f64)?;
        params::TEXTURE.check("texture", self.texture as f64)?;
        params::SHARPEN.check("sharpen", self.sharpen)?;
        params::DENOISE.check("denoise", self.denoise)?;
        params::ORIGINAL_DETAIL.check("detail", self.detail)?;
        if let Some(focus_boost) = self.focus_boost {
            params::FOCUS_BOOST.check("focus_boost", focus_boost)?;
        }
        if let Some(seed) = self.seed {
            params::SEED.check("seed", seed as f64)?;
        }
        Ok(())
    }

    /// Wire-level form fields, keyed off the model family.
    ///
    /// Booleans go out as lowercase strings; the prompt is only sent when
    /// autoprompt is off and the prompt is non-empty.
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("model", self.model.as_str().to_string()),
            ("output_format", self.output_format.as_str().to_string()),
        ];
        if self.model.is_recovery() {
            fields.push(("detail", self.detail.to_string()));
        } else {
            let prompt = self.prompt.trim();
            if !self.autoprompt && !prompt.is_empty() {
                fields.push(("prompt", prompt.to_string()));
            }
            fields.push(("autoprompt", if self.autoprompt { "true" } else { "false" }.to_string()));
            fields.push(("creativity", self.creativity.to_string()));
            fields.push(("texture", self.texture.to_string()));
            fields.push(("sharpen", self.sharpen.to_string()));
            fields.push(("denoise", self.denoise.to_string()));
            if let Some(focus_boost) = self.focus_boost {
                fields.push(("focus_boost", focus_boost.to_string()));
            }
        }
        if let Some(seed) = self.seed {
            fields.push(("seed", seed.to_string()));
        }
        fields
    }

    pub fn param_specs() -> Vec<ParamSpec> {
        vec![
            ParamSpec::choice("model", "Redefine", &["Redefine", "Recovery", "Recovery V2"]),
            ParamSpec::text("prompt", ""),
            ParamSpec::bool("autoprompt", true),
            ParamSpec::int("creativity", default_creativity(), params::CREATIVITY),
            ParamSpec::int("texture", default_texture(), params::TEXTURE),
            ParamSpec::float("sharpen", 0.0, params::SHARPEN),
            ParamSpec::float("denoise", 0.0, params::DENOISE),
            ParamSpec::float("detail", default_detail(), params::ORIGINAL_DETAIL),
            ParamSpec::choice("output_format", "jpeg", &["jpeg", "png", "webp"]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_denoise_in_range_passes_unchanged() {
        let opts = DenoiseOptions {
            strength: 0.75,
            ..Default::default()
        };
        assert!(opts.validate().is_ok());
        let fields = opts.form_fields();
        assert!(fields.contains(&("strength", "0.75".to_string())));
    }

    #[test]
    fn test_denoise_out_of_range_rejected() {
        let opts = DenoiseOptions {
            strength: 1.5,
            ..Default::default()
        };
        assert!(opts.validate().is_err());
    }

    #[test]
    fn test_enhance_skips_noop_fields() {
        let opts = EnhanceOptions::default();
        let fields = opts.form_fields();
        let names: Vec<_> = fields.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["model", "output_format"]);
    }

    #[test]
    fn test_enhance_face_strength_rides_with_toggle() {
        let opts = EnhanceOptions {
            face_enhancement: true,
            face_enhancement_strength: 0.7,
            ..Default::default()
        };
        let fields = opts.form_fields();
        assert!(fields.contains(&("face_enhancement", "true".to_string())));
        assert!(fields.contains(&("face_enhancement_strength", "0.7".to_string())));
    }

    #[test]
    fn test_creative_prompt_only_without_autoprompt() {
        let opts = CreativeOptions {
            prompt: "a castle".to_string(),
            autoprompt: true,
            ..Default::default()
        };
        assert!(!opts.form_fields().iter().any(|(n, _)| *n == "prompt"));

        let opts = CreativeOptions {
            prompt: "a castle".to_string(),
            autoprompt: false,
            ..opts
        };
        assert!(opts
            .form_fields()
            .contains(&("prompt", "a castle".to_string())));
        assert!(opts
            .form_fields()
            .contains(&("autoprompt", "false".to_string())));
    }

    #[test]
    fn test_creative_recovery_only_sends_detail() {
        let opts = CreativeOptions {
            model: GenerativeModel::RecoveryV2,
            detail: 0.8,
            ..Default::default()
        };
        let fields = opts.form_fields();
        assert!(fields.contains(&("detail", "0.8".to_string())));
        assert!(!fields.iter().any(|(n, _)| *n == "creativity"));
    }

    #[test]
    fn test_creative_defaults() {
        let opts = CreativeOptions::default();
        assert_eq!(opts.creativity, 3);
        assert_eq!(opts.texture, 1);
        assert!(opts.autoprompt);
        let fields = opts.form_fields();
        assert!(fields.contains(&("texture", "1".to_string())));
    }

    #[test]
    fn test_creative_range_bounds() {
        let opts = CreativeOptions {
            creativity: 6,
            texture: 1,
            ..Default::default()
        };
        assert!(opts.validate().is_ok());

        let opts = CreativeOptions {
            creativity: 7,
            ..Default::default()
        };
        assert!(opts.validate().is_err());
    }
}
