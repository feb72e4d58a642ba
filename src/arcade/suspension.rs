// ==============================================================================
// suspension.rs - RAYCAST SPRING-DAMPER SUSPENSION
// ==============================================================================
// Per wheel:
// 1) cast from the mount along -up, length = rest_length
// 2) compression = rest_length - hit distance (unclamped)
// 3) F = k * compression - c * dot(v_body, up)
// 4) apply up * F at the mount point (off-center -> linear + angular response)
//
// A miss contributes zero force and marks the wheel airborne.
// The cosmetic wheel offset is advanced here but never fed back into forces.
// ==============================================================================

use crate::arcade::config::SuspensionConfig;
use crate::arcade::ports::{RaycastPort, RigidBodyPort};
use crate::arcade::state::VehicleSimState;
use crate::arcade::telemetry::{Telemetry, TelemetryEvent};
use crate::arcade::types::{Vec3, WheelMount, exp_alpha, safe_normalize};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelSuspensionResult {
    pub hit: bool,
    pub applied_force: Vec3,
    pub distance: Option<f32>,
    pub compression: f32,
}

impl WheelSuspensionResult {
    pub fn airborne() -> Self {
        Self { hit: false, applied_force: Vec3::zeros(), distance: None, compression: 0.0 }
    }
}

/// Signed spring-damper magnitude along the mount axis.
#[inline]
pub fn suspension_force(cfg: &SuspensionConfig, compression: f32, vertical_velocity: f32) -> f32 {
    let spring = cfg.stiffness * compression; // F_s = k * x
    let damper = cfg.damping * vertical_velocity; // F_d = c * v_n
    spring - damper
}

pub fn update_wheel<R, B>(
    cfg: &SuspensionConfig,
    mount: &WheelMount,
    ray: &R,
    body: &mut B,
    state: &mut VehicleSimState,
    telemetry: &mut Telemetry,
    dt: f32,
) -> WheelSuspensionResult
where
    R: RaycastPort + ?Sized,
    B: RigidBodyPort + ?Sized,
{
    let up = safe_normalize(mount.up);
    let dir = -up;
    let origin = mount.position;
    let rest = cfg.rest_length;

    let hit = if up == Vec3::zeros() { None } else { ray.cast(origin, dir, rest) };

    let result = match hit {
        Some(h) => {
            let compression = rest - h.distance;
            let vertical_velocity = body.linear_velocity().dot(&up);
            let magnitude = suspension_force(cfg, compression, vertical_velocity);

            let force = if magnitude.is_finite() { up * magnitude } else { Vec3::zeros() };
            body.add_force_at_point(force, origin);

            WheelSuspensionResult {
                hit: true,
                applied_force: force,
                distance: Some(h.distance),
                compression,
            }
        }
        None => WheelSuspensionResult::airborne(),
    };

    state.set_contact(mount.id, result.hit);

    // cosmetic wheel travel
    let target = match result.distance {
        Some(d) => -d + cfg.wheel_radius,
        None => -rest + cfg.wheel_radius,
    };
    let offset = &mut state.wheel_offsets[mount.id.index()];
    *offset += (target - *offset) * exp_alpha(cfg.visual_smoothing, dt);

    telemetry.record(TelemetryEvent::WheelContact {
        wheel: mount.id,
        hit: result.hit,
        origin: origin.coords.into(),
        direction: dir.into(),
        ray_length: rest,
        hit_point: hit.map(|h| h.point.coords.into()),
        distance: result.distance,
        compression: result.compression,
        force: result.applied_force.into(),
    });

    result
}
