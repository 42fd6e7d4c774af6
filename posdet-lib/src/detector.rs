use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use strum_macros::{Display, EnumIter, EnumString};
use tracing::debug;

use crate::error::{PosdetError, TagField};
use crate::proto;

/// Carry state reported by the detector. Value 0 ("unknown") is reserved.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    TryFromPrimitive,
    IntoPrimitive,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[repr(i32)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "kebab-case")]
pub enum PositionKind {
    InMotion = 1,
    FaceUpOnTable = 2,
    FaceDownOnTable = 3,
    StationaryUnknown = 4,
}

impl PositionKind {
    pub fn from_wire(value: i32) -> Result<Self, PosdetError> {
        PositionKind::try_from_primitive(value).map_err(|e| PosdetError::malformed(TagField::Position, e.number))
    }

    pub fn is_stationary(&self) -> bool {
        !matches!(self, PositionKind::InMotion)
    }
}

/// Built-in parameter bundle selector. Value 0 ("unspecified") is reserved.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    TryFromPrimitive,
    IntoPrimitive,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[repr(i32)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigPresetKind {
    Default = 1,
    StickyStationary = 2,
}

impl ConfigPresetKind {
    pub fn from_wire(value: i32) -> Result<Self, PosdetError> {
        ConfigPresetKind::try_from_primitive(value).map_err(|e| PosdetError::malformed(TagField::ConfigPreset, e.number))
    }
}

/// Explicit detector tuning.
///
/// The range and ordering constraints documented on the fields are not
/// checked by the codec; call [`ConfigData::advisory_violations`] to see
/// which of them a bundle breaks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfigData {
    /// Length of the analysis window.
    pub window_duration_ns: u64,
    /// How long the device must stay still before a stationary state is reported.
    pub min_stationary_duration_ns: u32,
    /// Expected in `[0.0, 1.0]`.
    pub motion_confidence_threshold: f32,
    /// Expected in `[0.0, 1.0]`.
    pub stationary_confidence_threshold: f32,
    pub var_threshold: f32,
    /// Hysteresis around `var_threshold`; expected not to exceed it.
    pub var_threshold_delta: f32,
}

impl ConfigData {
    pub fn window_duration(&self) -> Duration {
        Duration::from_nanos(self.window_duration_ns)
    }

    pub fn min_stationary_duration(&self) -> Duration {
        Duration::from_nanos(self.min_stationary_duration_ns as u64)
    }

    /// Documented constraints this bundle does not meet. Empty when the
    /// bundle is within all of them.
    pub fn advisory_violations(&self) -> Vec<ThresholdViolation> {
        let mut violations = Vec::new();

        for (field, value) in [
            ("motion_confidence_threshold", self.motion_confidence_threshold),
            ("stationary_confidence_threshold", self.stationary_confidence_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                violations.push(ThresholdViolation::OutsideUnitInterval { field, value });
            }
        }

        // NaN on either side also breaks the ordering.
        let ordered = self.var_threshold_delta <= self.var_threshold;
        if !ordered {
            violations.push(ThresholdViolation::DeltaExceedsThreshold {
                var_threshold: self.var_threshold,
                var_threshold_delta: self.var_threshold_delta,
            });
        }

        violations
    }
}

impl fmt::Display for ConfigData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "window: {:?}, min stationary: {:?}, motion conf: {:.3}, stationary conf: {:.3}, var: {} (±{})",
            self.window_duration(),
            self.min_stationary_duration(),
            self.motion_confidence_threshold,
            self.stationary_confidence_threshold,
            self.var_threshold,
            self.var_threshold_delta
        )
    }
}

impl From<proto::ConfigData> for ConfigData {
    fn from(raw: proto::ConfigData) -> Self {
        ConfigData {
            window_duration_ns: raw.window_duration_ns,
            min_stationary_duration_ns: raw.min_stationary_duration_ns,
            motion_confidence_threshold: raw.motion_confidence_threshold,
            stationary_confidence_threshold: raw.stationary_confidence_threshold,
            var_threshold: raw.var_threshold,
            var_threshold_delta: raw.var_threshold_delta,
        }
    }
}

impl From<ConfigData> for proto::ConfigData {
    fn from(data: ConfigData) -> Self {
        proto::ConfigData {
            window_duration_ns: data.window_duration_ns,
            min_stationary_duration_ns: data.min_stationary_duration_ns,
            motion_confidence_threshold: data.motion_confidence_threshold,
            stationary_confidence_threshold: data.stationary_confidence_threshold,
            var_threshold: data.var_threshold,
            var_threshold_delta: data.var_threshold_delta,
        }
    }
}

/// A documented tuning constraint that a [`ConfigData`] breaks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThresholdViolation {
    OutsideUnitInterval { field: &'static str, value: f32 },
    DeltaExceedsThreshold { var_threshold: f32, var_threshold_delta: f32 },
}

impl fmt::Display for ThresholdViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ThresholdViolation::OutsideUnitInterval { field, value } => {
                write!(f, "{field} = {value} is outside [0.0, 1.0]")
            }
            ThresholdViolation::DeltaExceedsThreshold {
                var_threshold,
                var_threshold_delta,
            } => write!(
                f,
                "var_threshold_delta = {var_threshold_delta} exceeds var_threshold = {var_threshold}"
            ),
        }
    }
}

/// Detector configuration: either a preset or an explicit bundle, never both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectorConfig {
    Preset(ConfigPresetKind),
    Parameters(ConfigData),
}

impl DetectorConfig {
    /// Build from two independently optional sources, such as command-line
    /// flags. Exactly one must be given.
    pub fn from_parts(preset: Option<ConfigPresetKind>, params: Option<ConfigData>) -> Result<Self, PosdetError> {
        match (preset, params) {
            (Some(preset), None) => Ok(DetectorConfig::Preset(preset)),
            (None, Some(params)) => Ok(DetectorConfig::Parameters(params)),
            (None, None) => Err(PosdetError::MalformedUnion { populated: 0 }),
            (Some(_), Some(_)) => Err(PosdetError::MalformedUnion { populated: 2 }),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, PosdetError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a tuning file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PosdetError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading detector config");
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, PosdetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Presets carry no numbers, so only explicit bundles can break a constraint.
    pub fn advisory_violations(&self) -> Vec<ThresholdViolation> {
        match self {
            DetectorConfig::Preset(_) => Vec::new(),
            DetectorConfig::Parameters(params) => params.advisory_violations(),
        }
    }
}

impl fmt::Display for DetectorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectorConfig::Preset(preset) => write!(f, "preset {preset}"),
            DetectorConfig::Parameters(params) => write!(f, "{params}"),
        }
    }
}

impl TryFrom<proto::ConfigureDetector> for DetectorConfig {
    type Error = PosdetError;

    fn try_from(raw: proto::ConfigureDetector) -> Result<Self, Self::Error> {
        match (raw.preset, raw.config_data) {
            (Some(preset), None) => Ok(DetectorConfig::Preset(ConfigPresetKind::from_wire(preset)?)),
            (None, Some(data)) => Ok(DetectorConfig::Parameters(data.into())),
            (None, None) => Err(PosdetError::MalformedUnion { populated: 0 }),
            (Some(_), Some(_)) => Err(PosdetError::MalformedUnion { populated: 2 }),
        }
    }
}

impl From<DetectorConfig> for proto::ConfigureDetector {
    fn from(config: DetectorConfig) -> Self {
        match config {
            DetectorConfig::Preset(preset) => proto::ConfigureDetector {
                preset: Some(preset.into()),
                config_data: None,
            },
            DetectorConfig::Parameters(params) => proto::ConfigureDetector {
                preset: None,
                config_data: Some(params.into()),
            },
        }
    }
}
