//! Tuning for the arcade model. All values are SI (m, kg, s).
//!
//! Every struct is `#[serde(default)]` so a partial JSON file only overrides
//! the fields it names.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::arcade::types::Vec3;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be finite and >= 0 (got {value})")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must be finite and > 0 (got {value})")]
    NonPositive { field: &'static str, value: f32 },
    #[error("world_up must be a non-zero finite vector")]
    DegenerateWorldUp,
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspensionConfig {
    pub rest_length: f32,      // m, ray length at full extension
    pub stiffness: f32,        // N/m
    pub damping: f32,          // N*s/m
    pub wheel_radius: f32,     // m, cosmetic only
    pub visual_smoothing: f32, // 1/s, cosmetic wheel offset approach rate
}

impl Default for SuspensionConfig {
    fn default() -> Self {
        Self {
            rest_length: 0.7,
            stiffness: 50_000.0,
            damping: 1_000.0,
            wheel_radius: 0.35,
            visual_smoothing: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    pub max_speed: f32,          // m/s, no drive force above this
    pub force_magnitude: f32,    // N/kg (scaled by body mass)
    pub ramp_time_constant: f32, // s
    pub decay_on_release: bool,  // opt-in: ramp falls back toward 0 with no throttle
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            max_speed: 25.0,
            force_magnitude: 12.0,
            ramp_time_constant: 0.5,
            decay_on_release: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SteeringAxisMode {
    /// Body up vector; yaw stays consistent on slopes.
    Local,
    /// Fixed world up; flat-ground simplification.
    World,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SteeringConfig {
    pub steer_strength: f32,          // N*m at full input
    pub min_speed_for_steering: f32,  // m/s along body forward
    pub input_deadzone: f32,
    pub axis_mode: SteeringAxisMode,
    pub world_up: Vec3,
}

impl Default for SteeringConfig {
    fn default() -> Self {
        Self {
            steer_strength: 6_000.0,
            min_speed_for_steering: 0.5,
            input_deadzone: 0.1,
            axis_mode: SteeringAxisMode::Local,
            world_up: Vec3::y(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct FrictionConfig {
    pub drag_coefficient: f32, // N*s/m
}

impl Default for FrictionConfig {
    fn default() -> Self {
        Self { drag_coefficient: 250.0 }
    }
}

/// How the four per-wheel contacts collapse into the single grounded flag
/// that gates drive, steering and drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroundPolicy {
    #[default]
    AnyWheel,
    Majority,
    AllWheels,
    /// Rear-wheel contact gates the drivetrain.
    RearAxle,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ArcadeConfig {
    pub suspension: SuspensionConfig,
    pub drive: DriveConfig,
    pub steering: SteeringConfig,
    pub friction: FrictionConfig,
    pub ground_policy: GroundPolicy,
}

impl ArcadeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.suspension;
        positive("suspension.rest_length", s.rest_length)?;
        non_negative("suspension.stiffness", s.stiffness)?;
        non_negative("suspension.damping", s.damping)?;
        non_negative("suspension.wheel_radius", s.wheel_radius)?;
        non_negative("suspension.visual_smoothing", s.visual_smoothing)?;

        let d = &self.drive;
        non_negative("drive.max_speed", d.max_speed)?;
        non_negative("drive.force_magnitude", d.force_magnitude)?;
        non_negative("drive.ramp_time_constant", d.ramp_time_constant)?;

        let st = &self.steering;
        non_negative("steering.steer_strength", st.steer_strength)?;
        non_negative("steering.min_speed_for_steering", st.min_speed_for_steering)?;
        non_negative("steering.input_deadzone", st.input_deadzone)?;
        if !(st.world_up.norm() > 1e-6 && st.world_up.iter().all(|c| c.is_finite())) {
            return Err(ConfigError::DegenerateWorldUp);
        }

        non_negative("friction.drag_coefficient", self.friction.drag_coefficient)?;
        Ok(())
    }
}
