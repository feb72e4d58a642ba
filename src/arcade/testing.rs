//! In-memory ports for unit tests.

use crate::arcade::ports::{RayHit, RaycastPort, RigidBodyPort};
use crate::arcade::types::{Pos3, Vec3, WheelId, WheelMount};

/// Infinite horizontal plane at `y = height`.
pub struct FlatGround {
    pub height: f32,
}

impl FlatGround {
    pub fn at(height: f32) -> Self {
        Self { height }
    }
}

impl RaycastPort for FlatGround {
    fn cast(&self, origin: Pos3, direction: Vec3, max_distance: f32) -> Option<RayHit> {
        if direction.y >= 0.0 {
            return None;
        }
        let distance = (origin.y - self.height) / -direction.y;
        if !(0.0..=max_distance).contains(&distance) {
            return None;
        }
        Some(RayHit { distance, point: origin + direction * distance })
    }
}

/// Fixed kinematic snapshot that records every submitted force and torque.
pub struct RecordingBody {
    pub velocity: Vec3,
    pub mass: f32,
    pub forward: Vec3,
    pub up: Vec3,
    pub forces: Vec<Vec3>,
    pub point_forces: Vec<(Vec3, Pos3)>,
    pub torques: Vec<Vec3>,
}

impl RecordingBody {
    pub fn at_rest(mass: f32) -> Self {
        Self {
            velocity: Vec3::zeros(),
            mass,
            forward: Vec3::z(),
            up: Vec3::y(),
            forces: Vec::new(),
            point_forces: Vec::new(),
            torques: Vec::new(),
        }
    }
}

impl RigidBodyPort for RecordingBody {
    fn linear_velocity(&self) -> Vec3 { self.velocity }
    fn mass(&self) -> f32 { self.mass }
    fn forward(&self) -> Vec3 { self.forward }
    fn up(&self) -> Vec3 { self.up }

    fn add_force(&mut self, force: Vec3) { self.forces.push(force); }
    fn add_force_at_point(&mut self, force: Vec3, point: Pos3) { self.point_forces.push((force, point)); }
    fn add_torque(&mut self, torque: Vec3) { self.torques.push(torque); }
}

/// Four upright mounts at `height` in a 1.6m x 3m rectangle.
pub fn box_mounts(height: f32) -> [WheelMount; 4] {
    WheelId::ALL.map(|id| {
        let x = if matches!(id, WheelId::FL | WheelId::RL) { -0.8 } else { 0.8 };
        let z = if id.is_rear() { -1.5 } else { 1.5 };
        WheelMount { id, position: Pos3::new(x, height, z), up: Vec3::y() }
    })
}
