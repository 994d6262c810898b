use std::{fmt, fs, ops::RangeInclusive, path::Path};

use serde::Deserialize;

pub const PINCH_THRESHOLD_RANGE: RangeInclusive<f32> = 0.01..=0.1;
pub const HYSTERESIS_RANGE: RangeInclusive<f32> = 0.005..=0.05;
pub const MIN_TOUCH_DURATION_RANGE: RangeInclusive<f64> = 0.01..=0.5;
pub const MAX_TOUCH_GAP_RANGE: RangeInclusive<f64> = 0.1..=2.0;
pub const MIN_CONFIDENCE_RANGE: RangeInclusive<f32> = 0.1..=1.0;
pub const SMOOTHING_FACTOR_RANGE: RangeInclusive<f32> = 0.1..=1.0;

/// Pinch detection tuning. Replaced as a whole, never patched in place.
///
/// Distances are meters, durations seconds.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TouchDetectionSettings {
    /// Entry threshold for the index/thumb distance.
    pub pinch_threshold: f32,
    /// Margin added to the threshold while in contact.
    pub hysteresis: f32,
    /// A touch younger than this cannot end.
    pub min_touch_duration: f64,
    /// How long `Ended` is held before falling back to `None`.
    pub max_touch_gap: f64,
    /// Samples below this confidence force `None`.
    pub min_confidence: f32,
    /// Exponential smoothing weight of the newest averaged distance.
    pub smoothing_factor: f32,
}

impl Default for TouchDetectionSettings {
    fn default() -> Self {
        Self {
            pinch_threshold: 0.03,
            hysteresis: 0.01,
            min_touch_duration: 0.05,
            max_touch_gap: 0.3,
            min_confidence: 0.7,
            smoothing_factor: 0.8,
        }
    }
}

impl TouchDetectionSettings {
    pub fn entry_threshold(&self) -> f32 {
        self.pinch_threshold
    }

    pub fn exit_threshold(&self) -> f32 {
        self.pinch_threshold + self.hysteresis
    }

    /// Clamps every field into its documented range. Non-finite fields
    /// take the default value.
    pub fn clamped(self) -> Self {
        let defaults = Self::default();
        Self {
            pinch_threshold: clamp_f32(self.pinch_threshold, PINCH_THRESHOLD_RANGE, defaults.pinch_threshold),
            hysteresis: clamp_f32(self.hysteresis, HYSTERESIS_RANGE, defaults.hysteresis),
            min_touch_duration: clamp_f64(
                self.min_touch_duration,
                MIN_TOUCH_DURATION_RANGE,
                defaults.min_touch_duration,
            ),
            max_touch_gap: clamp_f64(self.max_touch_gap, MAX_TOUCH_GAP_RANGE, defaults.max_touch_gap),
            min_confidence: clamp_f32(self.min_confidence, MIN_CONFIDENCE_RANGE, defaults.min_confidence),
            smoothing_factor: clamp_f32(
                self.smoothing_factor,
                SMOOTHING_FACTOR_RANGE,
                defaults.smoothing_factor,
            ),
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        check_f32("pinch_threshold", self.pinch_threshold, PINCH_THRESHOLD_RANGE)?;
        check_f32("hysteresis", self.hysteresis, HYSTERESIS_RANGE)?;
        check_f64("min_touch_duration", self.min_touch_duration, MIN_TOUCH_DURATION_RANGE)?;
        check_f64("max_touch_gap", self.max_touch_gap, MAX_TOUCH_GAP_RANGE)?;
        check_f32("min_confidence", self.min_confidence, MIN_CONFIDENCE_RANGE)?;
        check_f32("smoothing_factor", self.smoothing_factor, SMOOTHING_FACTOR_RANGE)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    Io(String),
    Parse(String),
    Validation(String),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "io error: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::Validation(msg) => write!(f, "validation error: {msg}"),
        }
    }
}

impl std::error::Error for SettingsError {}

/// Parses and validates a TOML settings document. Missing keys keep their
/// defaults.
pub fn parse_settings_str(source: &str) -> Result<TouchDetectionSettings, SettingsError> {
    let settings: TouchDetectionSettings =
        toml::from_str(source).map_err(|e| SettingsError::Parse(e.to_string()))?;
    settings.validate()?;
    Ok(settings)
}

pub fn load_settings(path: &Path) -> Result<TouchDetectionSettings, SettingsError> {
    let source = fs::read_to_string(path)
        .map_err(|e| SettingsError::Io(format!("failed to read {}: {e}", path.display())))?;
    parse_settings_str(&source).map_err(|err| match err {
        SettingsError::Parse(msg) => SettingsError::Parse(format!("{}: {msg}", path.display())),
        SettingsError::Validation(msg) => {
            SettingsError::Validation(format!("{}: {msg}", path.display()))
        }
        other => other,
    })
}

fn clamp_f32(value: f32, range: RangeInclusive<f32>, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(*range.start(), *range.end())
    } else {
        fallback
    }
}

fn clamp_f64(value: f64, range: RangeInclusive<f64>, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(*range.start(), *range.end())
    } else {
        fallback
    }
}

fn check_f32(field: &str, value: f32, range: RangeInclusive<f32>) -> Result<(), SettingsError> {
    if value.is_finite() && range.contains(&value) {
        return Ok(());
    }
    Err(SettingsError::Validation(format!(
        "{field} = {value} is outside [{}, {}]",
        range.start(),
        range.end()
    )))
}

fn check_f64(field: &str, value: f64, range: RangeInclusive<f64>) -> Result<(), SettingsError> {
    if value.is_finite() && range.contains(&value) {
        return Ok(());
    }
    Err(SettingsError::Validation(format!(
        "{field} = {value} is outside [{}, {}]",
        range.start(),
        range.end()
    )))
}
