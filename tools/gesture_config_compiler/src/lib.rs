//! Compiles `config/gestures.toml` into the Rust constant the gesture engine
//! uses as its default configuration.
//!
//! The same parser and validator are reused at runtime by host tools that
//! accept a `--config` override.

use std::{fmt, fs, path::Path};

use serde::Deserialize;

const MAX_SLOTS_LIMIT: u32 = 64;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GestureConfigFile {
    pub slots: SlotsSection,
    pub thresholds: ThresholdsSection,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SlotsSection {
    pub max_slots: u32,
    pub pressed_frames_threshold: u32,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ThresholdsSection {
    pub motion: f32,
    pub drag: f32,
    pub pinch: f32,
    pub rotate: f32,
}

#[derive(Debug)]
pub enum ConfigCompilerError {
    Io(String),
    Parse(String),
    Validation(String),
}

impl fmt::Display for ConfigCompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "io error: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::Validation(msg) => write!(f, "validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigCompilerError {}

pub fn parse_config_str(source: &str) -> Result<GestureConfigFile, ConfigCompilerError> {
    toml::from_str(source).map_err(|e| ConfigCompilerError::Parse(e.to_string()))
}

pub fn parse_config_file(path: &Path) -> Result<GestureConfigFile, ConfigCompilerError> {
    let source = fs::read_to_string(path)
        .map_err(|e| ConfigCompilerError::Io(format!("failed to read {}: {e}", path.display())))?;
    parse_config_str(&source).map_err(|err| match err {
        ConfigCompilerError::Parse(msg) => {
            ConfigCompilerError::Parse(format!("{}: {msg}", path.display()))
        }
        other => other,
    })
}

pub fn validate_config(config: &GestureConfigFile) -> Result<(), ConfigCompilerError> {
    let slots = &config.slots;
    if slots.max_slots == 0 || slots.max_slots > MAX_SLOTS_LIMIT {
        return Err(ConfigCompilerError::Validation(format!(
            "slots.max_slots must be in 1..={MAX_SLOTS_LIMIT}, got {}",
            slots.max_slots
        )));
    }

    let t = &config.thresholds;
    for (name, value) in [
        ("motion", t.motion),
        ("drag", t.drag),
        ("pinch", t.pinch),
        ("rotate", t.rotate),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigCompilerError::Validation(format!(
                "thresholds.{name} must be finite and >= 0, got {value}"
            )));
        }
    }

    Ok(())
}

pub fn render_generated_config(config: &GestureConfigFile) -> String {
    let mut out = String::new();
    out.push_str("// @generated by gesture_config_compiler from config/gestures.toml.\n");
    out.push_str("pub const DEFAULT_GESTURE_CONFIG: GestureConfig = GestureConfig {\n");
    out.push_str(&format!("    max_slots: {},\n", config.slots.max_slots));
    out.push_str(&format!(
        "    pressed_frames_threshold: {},\n",
        config.slots.pressed_frames_threshold
    ));
    for (field, value) in [
        ("motion_threshold", config.thresholds.motion),
        ("drag_threshold", config.thresholds.drag),
        ("pinch_threshold", config.thresholds.pinch),
        ("rotate_threshold", config.thresholds.rotate),
    ] {
        out.push_str(&format!("    {field}: {},\n", float_literal(value)));
    }
    out.push_str("};\n");
    out
}

pub fn generate_from_path(path: &Path) -> Result<String, ConfigCompilerError> {
    let config = parse_config_file(path)?;
    validate_config(&config)?;
    Ok(render_generated_config(&config))
}

// `{:?}` keeps a decimal point or exponent, so the output is always a float literal.
fn float_literal(value: f32) -> String {
    format!("{value:?}")
}
