use serde::Serialize;

use crate::arcade::config::GroundPolicy;
use crate::arcade::types::WheelId;

/// Mutable per-vehicle state. One instance per vehicle, never shared.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VehicleSimState {
    /// Contact result of the latest suspension pass, indexed by `WheelId::index`.
    pub contacts: [bool; 4],
    /// `contacts` collapsed through the configured `GroundPolicy`.
    pub grounded: bool,
    /// Throttle ramp, always in [0, 1].
    pub acceleration_ramp: f32,
    /// Cosmetic wheel-mesh offsets along the mount axis. Never read by forces.
    pub wheel_offsets: [f32; 4],
}

impl VehicleSimState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_contact(&mut self, id: WheelId, hit: bool) {
        self.contacts[id.index()] = hit;
    }

    pub fn contact(&self, id: WheelId) -> bool {
        self.contacts[id.index()]
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.iter().filter(|c| **c).count()
    }

    /// Recomputes `grounded` from the per-wheel contacts.
    pub fn resolve_grounded(&mut self, policy: GroundPolicy) -> bool {
        self.grounded = match policy {
            GroundPolicy::AnyWheel => self.contact_count() > 0,
            GroundPolicy::Majority => self.contact_count() > 2,
            GroundPolicy::AllWheels => self.contact_count() == 4,
            GroundPolicy::RearAxle => self.contact(WheelId::RL) || self.contact(WheelId::RR),
        };
        self.grounded
    }
}
