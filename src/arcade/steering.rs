// ==============================================================================
// steering.rs - SPEED-GATED YAW TORQUE
// ==============================================================================
// torque = axis * (input * steer_strength)
//
// Gates (all must pass, otherwise nothing is submitted):
// - grounded
// - |dot(v, forward)| > min_speed_for_steering  (no spinning in place)
// - |input| > input_deadzone
//
// axis is the body up (Local) or the configured world up (World).
// ==============================================================================

use crate::arcade::config::{SteeringAxisMode, SteeringConfig};
use crate::arcade::ports::RigidBodyPort;
use crate::arcade::state::VehicleSimState;
use crate::arcade::telemetry::{Telemetry, TelemetryEvent};
use crate::arcade::types::{Vec3, safe_normalize};

pub fn steering_axis<B>(cfg: &SteeringConfig, body: &B) -> Vec3
where
    B: RigidBodyPort + ?Sized,
{
    match cfg.axis_mode {
        SteeringAxisMode::Local => safe_normalize(body.up()),
        SteeringAxisMode::World => safe_normalize(cfg.world_up),
    }
}

pub fn on_steer<B>(
    cfg: &SteeringConfig,
    input: f32,
    body: &mut B,
    state: &VehicleSimState,
    telemetry: &mut Telemetry,
) -> Option<Vec3>
where
    B: RigidBodyPort + ?Sized,
{
    if !state.grounded || !input.is_finite() {
        return None;
    }

    let forward_speed = body.linear_velocity().dot(&safe_normalize(body.forward())).abs();
    if !(forward_speed > cfg.min_speed_for_steering) {
        return None;
    }

    let input = input.clamp(-1.0, 1.0);
    if input.abs() <= cfg.input_deadzone {
        return None;
    }

    let torque = steering_axis(cfg, body) * (input * cfg.steer_strength);
    body.add_torque(torque);
    telemetry.record(TelemetryEvent::Steer { input, torque: torque.into() });

    Some(torque)
}
