// ==============================================================================
// ports.rs - HOST BOUNDARY
// ------------------------------------------------------------------------------
// The core never touches a physics engine directly. Each tick the host hands it:
// - a RaycastPort: spatial query that already ignores the vehicle's own body
// - a RigidBodyPort: read velocity/mass/basis, submit continuous forces/torques
// - a WheelMountProvider: resolves FL/FR/RL/RR to world-space mounts
//
// All calls are synchronous and must complete within the tick.
// ==============================================================================

use crate::arcade::types::{Pos3, Vec3, WheelId, WheelMount};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub distance: f32,
    pub point: Pos3,
}

pub trait RaycastPort {
    /// Casts from `origin` along unit `direction` up to `max_distance`,
    /// excluding the vehicle's own body. `None` means no surface in reach.
    fn cast(&self, origin: Pos3, direction: Vec3, max_distance: f32) -> Option<RayHit>;
}

pub trait RigidBodyPort {
    fn linear_velocity(&self) -> Vec3;
    fn mass(&self) -> f32;
    fn forward(&self) -> Vec3;
    fn up(&self) -> Vec3;

    /// Continuous force through the center of mass.
    fn add_force(&mut self, force: Vec3);
    /// Continuous force at a world point (linear + angular response).
    fn add_force_at_point(&mut self, force: Vec3, point: Pos3);
    fn add_torque(&mut self, torque: Vec3);
}

pub trait WheelMountProvider {
    /// `None` when the mount is unresolved; that wheel contributes nothing.
    fn mount(&self, id: WheelId) -> Option<WheelMount>;
}

impl WheelMountProvider for [WheelMount] {
    fn mount(&self, id: WheelId) -> Option<WheelMount> {
        self.iter().find(|m| m.id == id).copied()
    }
}
