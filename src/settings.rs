// ==============================================================================
// settings.rs - SERVER CONFIGURATION
// ------------------------------------------------------------------------------
// Load order: defaults -> JSON file at $ARCADE_CONFIG -> env overrides
// (ARCADE_BIND_ADDR, ARCADE_TICK_HZ). Partial files are fine; every struct is
// #[serde(default)].
// ==============================================================================

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::arcade::{ArcadeConfig, WheelId};
use crate::error::ServerError;

pub const CONFIG_ENV: &str = "ARCADE_CONFIG";
pub const BIND_ADDR_ENV: &str = "ARCADE_BIND_ADDR";
pub const TICK_HZ_ENV: &str = "ARCADE_TICK_HZ";

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WheelMountConfig {
    pub id: WheelId,
    pub offset: [f32; 3], // chassis local space
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChassisConfig {
    pub mass: f32,                // kg
    pub half_extents: [f32; 3],   // [hx, hy, hz] meters
    pub com_offset: [f32; 3],     // collider offset from body origin
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub wheels: Vec<WheelMountConfig>,
}

impl Default for ChassisConfig {
    fn default() -> Self {
        let corner = |id: WheelId| {
            let x = if matches!(id, WheelId::FL | WheelId::RL) { -0.8 } else { 0.8 };
            let z = if id.is_rear() { -1.5 } else { 1.5 };
            WheelMountConfig { id, offset: [x, -0.2, z] }
        };
        Self {
            mass: 1350.0,
            half_extents: [1.0, 0.35, 2.1],
            com_offset: [0.0, -0.15, 0.0],
            linear_damping: 0.08,
            angular_damping: 0.6,
            wheels: WheelId::ALL.iter().copied().map(corner).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub bind_addr: String,
    pub tick_hz: u32,
    pub spawn_height: f32,
    /// Client axis magnitude below which throttle/brake count as released.
    pub axis_deadzone: f32,
    pub chassis: ChassisConfig,
    pub arcade: ArcadeConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:9001".to_string(),
            tick_hz: 60,
            spawn_height: 1.3,
            axis_deadzone: 0.05,
            chassis: ChassisConfig::default(),
            arcade: ArcadeConfig::default(),
        }
    }
}

impl Settings {
    pub fn dt(&self) -> f32 {
        1.0 / self.tick_hz as f32
    }

    pub fn from_json(path: &str, text: &str) -> Result<Self, ServerError> {
        serde_json::from_str(text).map_err(|source| ServerError::ConfigParse {
            path: path.to_string(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ServerError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&path.display().to_string(), &text)
    }

    /// Defaults, then `$ARCADE_CONFIG`, then env overrides. Validated.
    pub fn load() -> Result<Self, ServerError> {
        let mut settings = match std::env::var(CONFIG_ENV) {
            Ok(path) => {
                log::info!("Loading settings from {path}");
                Self::from_file(Path::new(&path))?
            }
            Err(_) => Self::default(),
        };

        if let Ok(addr) = std::env::var(BIND_ADDR_ENV) {
            settings.bind_addr = addr;
        }
        if let Ok(hz) = std::env::var(TICK_HZ_ENV) {
            settings.tick_hz = hz
                .parse()
                .map_err(|_| ServerError::InvalidConfig(format!("{TICK_HZ_ENV}={hz} is not an integer")))?;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ServerError> {
        if self.tick_hz == 0 || self.tick_hz > 1000 {
            return Err(ServerError::InvalidConfig(format!("tick_hz out of range: {}", self.tick_hz)));
        }
        if !(self.chassis.mass.is_finite() && self.chassis.mass > 0.0) {
            return Err(ServerError::InvalidConfig(format!("chassis.mass must be > 0: {}", self.chassis.mass)));
        }
        if self.chassis.half_extents.iter().any(|h| !(h.is_finite() && *h > 0.0)) {
            return Err(ServerError::InvalidConfig("chassis.half_extents must be > 0".into()));
        }
        for (i, w) in self.chassis.wheels.iter().enumerate() {
            if self.chassis.wheels[..i].iter().any(|o| o.id == w.id) {
                return Err(ServerError::InvalidConfig(format!("duplicate wheel mount {}", w.id)));
            }
        }
        if self.chassis.wheels.len() < WheelId::ALL.len() {
            log::warn!(
                "Only {} of 4 wheel mounts configured; missing wheels produce no force",
                self.chassis.wheels.len()
            );
        }
        self.arcade.validate()?;
        Ok(())
    }
}
