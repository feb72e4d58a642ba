//! Linear rolling drag: `F = -v * drag_coefficient`, only while grounded.

use crate::arcade::config::FrictionConfig;
use crate::arcade::ports::RigidBodyPort;
use crate::arcade::state::VehicleSimState;
use crate::arcade::telemetry::{Telemetry, TelemetryEvent};
use crate::arcade::types::{Vec3, is_finite, safe_normalize};

/// Drag opposing `velocity`. Zero (not NaN) for a zero or non-finite velocity.
pub fn drag_force(cfg: &FrictionConfig, velocity: Vec3) -> Vec3 {
    if !is_finite(&velocity) {
        return Vec3::zeros();
    }
    let speed = velocity.norm();
    -safe_normalize(velocity) * speed * cfg.drag_coefficient
}

pub fn apply_drag<B>(
    cfg: &FrictionConfig,
    body: &mut B,
    state: &VehicleSimState,
    telemetry: &mut Telemetry,
) -> Option<Vec3>
where
    B: RigidBodyPort + ?Sized,
{
    if !state.grounded {
        return None;
    }

    let force = drag_force(cfg, body.linear_velocity());
    if force == Vec3::zeros() {
        return None;
    }

    body.add_force(force);
    telemetry.record(TelemetryEvent::Drag { force: force.into() });
    Some(force)
}
