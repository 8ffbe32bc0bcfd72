//! Declarative parameter schema and range validation.
//!
//! Every user-facing knob is declared once as a [`ParamSpec`]; the same
//! declaration feeds range validation (before any network call) and UI
//! metadata generation on the host side.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Inclusive numeric range for a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
}

impl ParamRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Check a value against the range, naming the parameter on failure.
    pub fn check(&self, name: &str, value: f64) -> Result<(), ParamError> {
        if value < self.min || value > self.max {
            return Err(ParamError::OutOfRange {
                name: name.to_string(),
                value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

/// Kind of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Float,
    Int,
    Bool,
    Text,
    Choice,
}

/// One declared parameter: name, type, default, and allowed range/choices.
///
/// Serialize-only: this is generated metadata handed to hosts, never
/// read back.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    /// Default rendered as a JSON value so hosts can display it directly.
    pub default: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<ParamRange>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<&'static str>,
}

impl ParamSpec {
    pub fn float(name: &'static str, default: f64, range: ParamRange) -> Self {
        Self {
            name,
            kind: ParamKind::Float,
            default: default.into(),
            range: Some(range),
            choices: Vec::new(),
        }
    }

    pub fn int(name: &'static str, default: i64, range: ParamRange) -> Self {
        Self {
            name,
            kind: ParamKind::Int,
            default: default.into(),
            range: Some(range),
            choices: Vec::new(),
        }
    }

    pub fn bool(name: &'static str, default: bool) -> Self {
        Self {
            name,
            kind: ParamKind::Bool,
            default: default.into(),
            range: None,
            choices: Vec::new(),
        }
    }

    pub fn text(name: &'static str, default: &str) -> Self {
        Self {
            name,
            kind: ParamKind::Text,
            default: default.into(),
            range: None,
            choices: Vec::new(),
        }
    }

    pub fn choice(name: &'static str, default: &'static str, choices: &[&'static str]) -> Self {
        Self {
            name,
            kind: ParamKind::Choice,
            default: default.into(),
            range: None,
            choices: choices.to_vec(),
        }
    }
}

/// Parameter validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParamError {
    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Unknown model: {0}")]
    UnknownModel(String),
}

// Parameter ranges as published by the API.
pub const STRENGTH: ParamRange = ParamRange::new(0.01, 1.0);
pub const MINOR_DEBLUR: ParamRange = ParamRange::new(0.01, 1.0);
pub const ORIGINAL_DETAIL: ParamRange = ParamRange::new(0.0, 1.0);
pub const SHARPEN: ParamRange = ParamRange::new(0.0, 1.0);
pub const DENOISE: ParamRange = ParamRange::new(0.0, 1.0);
pub const FIX_COMPRESSION: ParamRange = ParamRange::new(0.0, 1.0);
pub const FACE_ENHANCEMENT_STRENGTH: ParamRange = ParamRange::new(0.0, 1.0);
pub const CREATIVITY: ParamRange = ParamRange::new(1.0, 6.0);
pub const TEXTURE: ParamRange = ParamRange::new(1.0, 5.0);
pub const FOCUS_BOOST: ParamRange = ParamRange::new(0.25, 1.0);
pub const SEED: ParamRange = ParamRange::new(0.0, 999_999.0);
/// Unit range shared by the video filter sliders.
pub const UNIT: ParamRange = ParamRange::new(0.0, 1.0);
/// Processing timeout in minutes.
pub const TIMEOUT_MINUTES: ParamRange = ParamRange::new(5.0, 180.0);
/// Slow-motion multiplier for frame interpolation.
pub const SLOWMO_FACTOR: ParamRange = ParamRange::new(1.0, 8.0);
