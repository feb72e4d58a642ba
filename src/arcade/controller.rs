// ==============================================================================
// controller.rs - PER-VEHICLE ENTRY POINTS
// ------------------------------------------------------------------------------
// ArcadeCar owns the tuning, the mutable sim state and the tick's telemetry.
// Host entry points:
// - on_tick(dt, ...)            suspension x4 -> grounded policy -> drag
// - on_throttle_triggered(...)  ramped drive (every tick throttle is held)
// - on_steer_triggered(...)     gated yaw torque
// - step(input, dt, ...)        one full tick from a sampled InputSnapshot
// ==============================================================================

use crate::arcade::config::ArcadeConfig;
use crate::arcade::drive;
use crate::arcade::friction;
use crate::arcade::ports::{RaycastPort, RigidBodyPort, WheelMountProvider};
use crate::arcade::state::VehicleSimState;
use crate::arcade::steering;
use crate::arcade::suspension::{self, WheelSuspensionResult};
use crate::arcade::telemetry::{Telemetry, TelemetryEvent};
use crate::arcade::types::{InputSnapshot, ThrottleDirection, Vec3, WheelId};

#[derive(Debug, Clone)]
pub struct ArcadeCar {
    pub config: ArcadeConfig,
    pub state: VehicleSimState,
    pub telemetry: Telemetry,
}

impl ArcadeCar {
    pub fn new(config: ArcadeConfig) -> Self {
        Self {
            config,
            state: VehicleSimState::new(),
            telemetry: Telemetry::default(),
        }
    }

    pub fn is_grounded(&self) -> bool {
        self.state.grounded
    }

    /// Suspension for all four wheels, then drag. Runs every frame regardless of input.
    pub fn on_tick<M, R, B>(
        &mut self,
        dt: f32,
        mounts: &M,
        ray: &R,
        body: &mut B,
    ) -> [WheelSuspensionResult; 4]
    where
        M: WheelMountProvider + ?Sized,
        R: RaycastPort + ?Sized,
        B: RigidBodyPort + ?Sized,
    {
        self.telemetry.clear();

        let mut results = [WheelSuspensionResult::airborne(); 4];
        for id in WheelId::ALL {
            results[id.index()] = match mounts.mount(id) {
                Some(mount) => suspension::update_wheel(
                    &self.config.suspension,
                    &mount,
                    ray,
                    body,
                    &mut self.state,
                    &mut self.telemetry,
                    dt,
                ),
                None => {
                    self.state.set_contact(id, false);
                    self.telemetry.record(TelemetryEvent::WheelMissing { wheel: id });
                    WheelSuspensionResult::airborne()
                }
            };
        }

        let grounded = self.state.resolve_grounded(self.config.ground_policy);
        self.telemetry.record(TelemetryEvent::Grounded {
            grounded,
            contacts: self.state.contact_count() as u8,
        });

        friction::apply_drag(&self.config.friction, body, &self.state, &mut self.telemetry);

        results
    }

    pub fn on_throttle_triggered<B>(
        &mut self,
        direction: ThrottleDirection,
        dt: f32,
        body: &mut B,
    ) -> Option<Vec3>
    where
        B: RigidBodyPort + ?Sized,
    {
        drive::on_throttle(&self.config.drive, direction, body, &mut self.state, &mut self.telemetry, dt)
    }

    pub fn on_steer_triggered<B>(&mut self, input: f32, body: &mut B) -> Option<Vec3>
    where
        B: RigidBodyPort + ?Sized,
    {
        steering::on_steer(&self.config.steering, input, body, &self.state, &mut self.telemetry)
    }

    /// One full tick: the physical pass, then input handlers gated by the fresh
    /// grounded flag.
    pub fn step<M, R, B>(
        &mut self,
        input: &InputSnapshot,
        dt: f32,
        mounts: &M,
        ray: &R,
        body: &mut B,
    ) -> [WheelSuspensionResult; 4]
    where
        M: WheelMountProvider + ?Sized,
        R: RaycastPort + ?Sized,
        B: RigidBodyPort + ?Sized,
    {
        let results = self.on_tick(dt, mounts, ray, body);

        match input.throttle {
            Some(direction) => {
                self.on_throttle_triggered(direction, dt, body);
            }
            None => drive::on_release(&self.config.drive, &mut self.state, dt),
        }

        if input.steer != 0.0 {
            self.on_steer_triggered(input.steer, body);
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcade::config::GroundPolicy;
    use crate::arcade::testing::{FlatGround, RecordingBody, box_mounts};
    use crate::arcade::types::WheelMount;
    use approx::assert_relative_eq;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn four_wheels_on_ground_ground_the_car() {
        let mut car = ArcadeCar::new(ArcadeConfig::default());
        let mut body = RecordingBody::at_rest(1350.0);
        let mounts = box_mounts(0.5);

        let results = car.on_tick(DT, mounts.as_slice(), &FlatGround::at(0.0), &mut body);

        assert!(results.iter().all(|r| r.hit));
        assert!(car.is_grounded());
        assert_eq!(body.point_forces.len(), 4);
        // at rest: no drag
        assert!(body.forces.is_empty());
    }

    #[test]
    fn too_high_means_airborne() {
        let mut car = ArcadeCar::new(ArcadeConfig::default());
        let mut body = RecordingBody::at_rest(1350.0);

        car.on_tick(DT, box_mounts(1.0).as_slice(), &FlatGround::at(0.0), &mut body);

        assert!(!car.is_grounded());
        assert!(body.point_forces.is_empty());
    }

    #[test]
    fn missing_mount_does_not_block_the_others() {
        let mut car = ArcadeCar::new(ArcadeConfig::default());
        let mut body = RecordingBody::at_rest(1350.0);
        let mounts: Vec<WheelMount> = box_mounts(0.5).into_iter().filter(|m| m.id != WheelId::FR).collect();

        let results = car.on_tick(DT, mounts.as_slice(), &FlatGround::at(0.0), &mut body);

        assert!(!results[WheelId::FR.index()].hit);
        assert_eq!(body.point_forces.len(), 3);
        assert!(car.is_grounded());
        assert!(car.telemetry.events().contains(&TelemetryEvent::WheelMissing { wheel: WheelId::FR }));
    }

    #[test]
    fn ground_policy_is_applied_after_all_wheels() {
        // rear wheels over a ledge: only the fronts hit
        let mut mounts = box_mounts(0.5);
        for m in mounts.iter_mut().filter(|m| m.id.is_rear()) {
            m.position.y = 2.0;
        }

        let cfg = ArcadeConfig { ground_policy: GroundPolicy::RearAxle, ..ArcadeConfig::default() };
        let mut car = ArcadeCar::new(cfg);
        let mut body = RecordingBody::at_rest(1350.0);
        car.on_tick(DT, mounts.as_slice(), &FlatGround::at(0.0), &mut body);
        assert!(!car.is_grounded());

        let mut car = ArcadeCar::new(ArcadeConfig::default());
        car.on_tick(DT, mounts.as_slice(), &FlatGround::at(0.0), &mut body);
        assert!(car.is_grounded());
    }

    #[test]
    fn drag_runs_on_tick_while_grounded() {
        let mut cfg = ArcadeConfig::default();
        cfg.friction.drag_coefficient = 0.5;
        let mut car = ArcadeCar::new(cfg);
        let mut body = RecordingBody::at_rest(1350.0);
        body.velocity = Vec3::new(10.0, 0.0, 0.0);

        car.on_tick(DT, box_mounts(0.5).as_slice(), &FlatGround::at(0.0), &mut body);

        assert_eq!(body.forces.len(), 1);
        assert_relative_eq!(body.forces[0], Vec3::new(-5.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn step_feeds_snapshot_to_controllers() {
        let mut config = ArcadeConfig::default();
        config.drive.decay_on_release = true;
        let mut car = ArcadeCar::new(config);
        let mut body = RecordingBody::at_rest(1350.0);
        body.velocity = Vec3::new(0.0, 0.0, 5.0);
        let mounts = box_mounts(0.5);
        let ground = FlatGround::at(0.0);

        let input = InputSnapshot { throttle: Some(ThrottleDirection::Forward), steer: 1.0 };
        car.step(&input, DT, mounts.as_slice(), &ground, &mut body);

        assert!(car.state.acceleration_ramp > 0.0);
        assert_eq!(body.torques.len(), 1);
        // drag + drive
        assert_eq!(body.forces.len(), 2);
        assert!(body.forces[1].z > 0.0);

        let ramp = car.state.acceleration_ramp;
        car.step(&InputSnapshot::default(), DT, mounts.as_slice(), &ground, &mut body);
        assert!(car.state.acceleration_ramp < ramp);
        assert_eq!(body.torques.len(), 1);
    }

    #[test]
    fn ramp_persists_after_release_by_default() {
        let mut car = ArcadeCar::new(ArcadeConfig::default());
        let mut body = RecordingBody::at_rest(1350.0);
        let mounts = box_mounts(0.5);
        let ground = FlatGround::at(0.0);

        let held = InputSnapshot { throttle: Some(ThrottleDirection::Forward), steer: 0.0 };
        for _ in 0..180 {
            car.step(&held, DT, mounts.as_slice(), &ground, &mut body);
        }
        let ramp = car.state.acceleration_ramp;
        assert!(ramp > 0.99);

        for _ in 0..60 {
            car.step(&InputSnapshot::default(), DT, mounts.as_slice(), &ground, &mut body);
        }
        assert_eq!(car.state.acceleration_ramp, ramp);
    }

    #[test]
    fn airborne_step_applies_no_control_forces() {
        let mut car = ArcadeCar::new(ArcadeConfig::default());
        let mut body = RecordingBody::at_rest(1350.0);
        body.velocity = Vec3::new(0.0, 0.0, 5.0);

        let input = InputSnapshot { throttle: Some(ThrottleDirection::Forward), steer: 1.0 };
        car.step(&input, DT, box_mounts(3.0).as_slice(), &FlatGround::at(0.0), &mut body);

        assert!(body.forces.is_empty());
        assert!(body.torques.is_empty());
        assert!(body.point_forces.is_empty());
        assert_eq!(car.state.acceleration_ramp, 0.0);
    }

    #[test]
    fn vehicles_do_not_share_ramp() {
        let mut a = ArcadeCar::new(ArcadeConfig::default());
        let b = ArcadeCar::new(ArcadeConfig::default());
        let mut body = RecordingBody::at_rest(1350.0);

        a.on_tick(DT, box_mounts(0.5).as_slice(), &FlatGround::at(0.0), &mut body);
        for _ in 0..10 {
            a.on_throttle_triggered(ThrottleDirection::Forward, DT, &mut body);
        }
        assert!(a.state.acceleration_ramp > 0.0);
        assert_eq!(b.state.acceleration_ramp, 0.0);
    }
}
