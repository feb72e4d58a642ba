//! arcade - engine-agnostic arcade car forces (suspension, drive, steering, drag)

pub mod types;
pub mod ports;
pub mod config;
pub mod state;
pub mod telemetry;
pub mod suspension;
pub mod drive;
pub mod steering;
pub mod friction;
pub mod controller;

#[cfg(test)]
pub(crate) mod testing;

pub use config::ArcadeConfig;
pub use controller::ArcadeCar;
pub use ports::{RayHit, RaycastPort, RigidBodyPort, WheelMountProvider};
pub use telemetry::TelemetryEvent;
pub use types::*;
