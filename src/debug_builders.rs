// ==============================================================================
// debug_builders.rs - DEBUG OVERLAY PRIMITIVES (SERVER -> CLIENT)
// ------------------------------------------------------------------------------
// Turns the arcade core's per-tick telemetry into serializable primitives:
// - DebugRay: suspension raycasts (green = hit, red = airborne) and force arrows
// - DebugWheel: per-wheel numeric state (grounded, compression, force)
// - DebugChassis: pose of the chassis box
//
// Purely visualization. Nothing in here feeds back into physics.
// ==============================================================================

use serde::Serialize;

use crate::arcade::{TelemetryEvent, Vec3, safe_normalize};

/// Force arrows are drawn at this many meters per newton.
pub const FORCE_ARROW_SCALE: f32 = 0.001;
/// Torque arrows are drawn at this many meters per newton-meter.
pub const TORQUE_ARROW_SCALE: f32 = 0.0002;

const GREEN: [f32; 3] = [0.0, 1.0, 0.0];
const RED: [f32; 3] = [1.0, 0.0, 0.0];
const BLUE: [f32; 3] = [0.2, 0.4, 1.0];
const YELLOW: [f32; 3] = [1.0, 0.9, 0.1];
const ORANGE: [f32; 3] = [1.0, 0.5, 0.1];
const PURPLE: [f32; 3] = [0.7, 0.2, 1.0];

#[derive(Clone, Debug, Default, Serialize)]
pub struct DebugOverlay {
    pub chassis: Option<DebugChassis>,
    pub suspension_rays: Vec<DebugRay>,
    pub force_arrows: Vec<DebugRay>,
    pub wheels: Vec<DebugWheel>,
    pub grounded: bool,
    pub drive_saturated: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct DebugRay {
    pub origin: [f32; 3],
    pub direction: [f32; 3],
    pub length: f32,
    pub hit: Option<[f32; 3]>,
    pub color: [f32; 3],
}

#[derive(Clone, Debug, Serialize)]
pub struct DebugChassis {
    pub position: [f32; 3],
    pub rotation: [f32; 4], // quaternion
    pub half_extents: [f32; 3],
}

#[derive(Clone, Debug, Serialize)]
pub struct DebugWheel {
    pub id: String, // "FL", "FR", "RL", "RR"
    pub mount: [f32; 3],
    pub grounded: bool,
    pub compression: f32,
    pub normal_force: f32,
}

impl DebugOverlay {
    pub fn clear(&mut self) {
        self.chassis = None;
        self.suspension_rays.clear();
        self.force_arrows.clear();
        self.wheels.clear();
        self.grounded = false;
        self.drive_saturated = false;
    }
}

fn arrow(origin: [f32; 3], v: [f32; 3], scale: f32, color: [f32; 3]) -> Option<DebugRay> {
    let v = Vec3::from(v);
    let direction = safe_normalize(v);
    if direction == Vec3::zeros() {
        return None;
    }
    let len = v.norm() * scale;
    let tip = Vec3::from(origin) + direction * len;
    Some(DebugRay {
        origin,
        direction: direction.into(),
        length: len,
        hit: Some(tip.into()),
        color,
    })
}

/// Rebuilds `overlay` from one tick of telemetry. Body-level arrows
/// (drive, drag, steering) start at `chassis.position`.
pub fn build_overlay(overlay: &mut DebugOverlay, chassis: DebugChassis, events: &[TelemetryEvent]) {
    overlay.clear();
    let center = chassis.position;

    for event in events {
        match event {
            TelemetryEvent::WheelContact {
                wheel, hit, origin, direction, ray_length, hit_point, distance, compression, force,
            } => {
                overlay.suspension_rays.push(DebugRay {
                    origin: *origin,
                    direction: *direction,
                    length: distance.unwrap_or(*ray_length),
                    hit: *hit_point,
                    color: if *hit { GREEN } else { RED },
                });
                overlay.force_arrows.extend(arrow(*origin, *force, FORCE_ARROW_SCALE, BLUE));
                overlay.wheels.push(DebugWheel {
                    id: wheel.to_string(),
                    mount: *origin,
                    grounded: *hit,
                    compression: *compression,
                    normal_force: Vec3::from(*force).norm(),
                });
            }
            TelemetryEvent::WheelMissing { .. } => {}
            TelemetryEvent::Grounded { grounded, .. } => overlay.grounded = *grounded,
            TelemetryEvent::Drive { force, .. } => {
                overlay.force_arrows.extend(arrow(center, *force, FORCE_ARROW_SCALE, YELLOW));
            }
            TelemetryEvent::DriveSaturated { .. } => overlay.drive_saturated = true,
            TelemetryEvent::Steer { torque, .. } => {
                overlay.force_arrows.extend(arrow(center, *torque, TORQUE_ARROW_SCALE, PURPLE));
            }
            TelemetryEvent::Drag { force } => {
                overlay.force_arrows.extend(arrow(center, *force, FORCE_ARROW_SCALE, ORANGE));
            }
        }
    }

    overlay.chassis = Some(chassis);
}
