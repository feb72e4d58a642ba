//! Core shared types for `arcade` (engine-agnostic).
// arcade/types.rs
use std::fmt;

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

pub type Vec3 = Vector3<f32>;
pub type Pos3 = Point3<f32>;

// ----- tiny vec helpers -----

/// Unit vector along `v`, or zero when `v` is degenerate.
#[inline]
pub fn safe_normalize(v: Vec3) -> Vec3 {
    let m = v.norm();
    if m > 1e-6 && m.is_finite() { v / m } else { Vec3::zeros() }
}

#[inline]
pub fn is_finite(v: &Vec3) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}

/// Fraction of the remaining gap closed in `dt` by an exponential approach
/// with the given rate (1/s). Frame-rate independent.
#[inline]
pub fn exp_alpha(rate: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    (1.0 - (-rate * dt).exp()).clamp(0.0, 1.0)
}

// ============================================
// Wheel identification
// ============================================

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum WheelId { FL, FR, RL, RR }

impl WheelId {
    /// Processing order for the suspension pass.
    pub const ALL: [WheelId; 4] = [WheelId::FL, WheelId::FR, WheelId::RL, WheelId::RR];

    pub fn index(&self) -> usize {
        match self {
            WheelId::FL => 0,
            WheelId::FR => 1,
            WheelId::RL => 2,
            WheelId::RR => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WheelId::FL => "FL",
            WheelId::FR => "FR",
            WheelId::RL => "RL",
            WheelId::RR => "RR",
        }
    }

    pub fn is_rear(&self) -> bool {
        matches!(self, WheelId::RL | WheelId::RR)
    }
}

impl fmt::Display for WheelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================
// Wheel mount (transient, read each tick)
// ============================================

/// World-space pose of one suspension mount, sampled from the host this tick.
#[derive(Debug, Clone, Copy)]
pub struct WheelMount {
    pub id: WheelId,
    pub position: Pos3,
    /// Suspension axis. The ray is cast along `-up`.
    pub up: Vec3,
}

// ============================================
// ----- per-tick input -----
// ============================================

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThrottleDirection {
    Forward,
    Reverse,
}

impl ThrottleDirection {
    pub fn sign(&self) -> f32 {
        match self {
            ThrottleDirection::Forward => 1.0,
            ThrottleDirection::Reverse => -1.0,
        }
    }
}

/// Input state sampled once per tick and fed to every controller.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputSnapshot {
    pub throttle: Option<ThrottleDirection>,
    pub steer: f32, // -1..1
}

impl InputSnapshot {
    /// Maps raw client axes onto a snapshot. Brake wins over forward throttle.
    pub fn from_axes(throttle: f32, brake: f32, steer: f32, deadzone: f32) -> Self {
        let throttle = if !throttle.is_finite() { 0.0 } else { throttle };
        let brake = if !brake.is_finite() { 0.0 } else { brake };

        let dir = if brake > deadzone || throttle < -deadzone {
            Some(ThrottleDirection::Reverse)
        } else if throttle > deadzone {
            Some(ThrottleDirection::Forward)
        } else {
            None
        };

        let steer = if steer.is_finite() { steer.clamp(-1.0, 1.0) } else { 0.0 };

        Self { throttle: dir, steer }
    }
}
