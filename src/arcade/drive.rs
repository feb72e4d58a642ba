// ==============================================================================
// drive.rs - RAMPED FORWARD / REVERSE DRIVE
// ==============================================================================
// Fires every tick the throttle is held:
//   F = forward * force_magnitude * ramp * mass * direction
// applied as a continuous force through the center of mass.
//
// - No-op unless grounded.
// - Above max_speed nothing is applied (the car coasts at the cap).
// - Reverse shares the same ramp as forward; it is reverse drive, not braking.
// - The ramp approaches 1 exponentially with time constant τ:
//     ramp += (1 - ramp) * (1 - e^(-dt/τ))
// ==============================================================================

use crate::arcade::config::DriveConfig;
use crate::arcade::ports::RigidBodyPort;
use crate::arcade::state::VehicleSimState;
use crate::arcade::telemetry::{Telemetry, TelemetryEvent};
use crate::arcade::types::{ThrottleDirection, Vec3, exp_alpha};

/// Ramp after holding throttle for `dt`.
pub fn ramp_up(ramp: f32, time_constant: f32, dt: f32) -> f32 {
    if time_constant <= 0.0 {
        return 1.0;
    }
    let next = ramp + (1.0 - ramp) * exp_alpha(1.0 / time_constant, dt);
    next.clamp(0.0, 1.0)
}

/// Ramp after `dt` with no throttle held.
pub fn ramp_down(ramp: f32, time_constant: f32, dt: f32) -> f32 {
    if time_constant <= 0.0 {
        return 0.0;
    }
    let next = ramp - ramp * exp_alpha(1.0 / time_constant, dt);
    next.clamp(0.0, 1.0)
}

/// Returns the submitted force, or `None` when nothing was applied.
pub fn on_throttle<B>(
    cfg: &DriveConfig,
    direction: ThrottleDirection,
    body: &mut B,
    state: &mut VehicleSimState,
    telemetry: &mut Telemetry,
    dt: f32,
) -> Option<Vec3>
where
    B: RigidBodyPort + ?Sized,
{
    if !state.grounded {
        return None;
    }

    let speed = body.linear_velocity().norm();
    if !speed.is_finite() || speed > cfg.max_speed {
        telemetry.record(TelemetryEvent::DriveSaturated { speed, max_speed: cfg.max_speed });
        return None;
    }

    state.acceleration_ramp = ramp_up(state.acceleration_ramp, cfg.ramp_time_constant, dt);

    let force = body.forward()
        * cfg.force_magnitude
        * state.acceleration_ramp
        * body.mass()
        * direction.sign();

    if !force.iter().all(|c| c.is_finite()) {
        return None;
    }

    body.add_force(force);
    telemetry.record(TelemetryEvent::Drive {
        direction,
        ramp: state.acceleration_ramp,
        force: force.into(),
    });

    Some(force)
}

/// Throttle released this tick.
pub fn on_release(cfg: &DriveConfig, state: &mut VehicleSimState, dt: f32) {
    if cfg.decay_on_release {
        state.acceleration_ramp = ramp_down(state.acceleration_ramp, cfg.ramp_time_constant, dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcade::testing::RecordingBody;
    use approx::assert_relative_eq;

    fn grounded() -> VehicleSimState {
        VehicleSimState { grounded: true, ..VehicleSimState::new() }
    }

    #[test]
    fn ramp_matches_first_order_response() {
        let cfg = DriveConfig { ramp_time_constant: 0.5, ..DriveConfig::default() };
        let mut body = RecordingBody::at_rest(1.0);
        let mut state = grounded();
        let mut telemetry = Telemetry::default();

        let dt = 1.0 / 60.0;
        for _ in 0..30 {
            on_throttle(&cfg, ThrottleDirection::Forward, &mut body, &mut state, &mut telemetry, dt);
        }
        // t = τ
        assert_relative_eq!(state.acceleration_ramp, 1.0 - (-1.0f32).exp(), epsilon = 1e-3);
        assert_relative_eq!(state.acceleration_ramp, 0.63, epsilon = 0.01);
    }

    #[test]
    fn ramp_is_monotone_and_bounded() {
        let mut ramp = 0.0;
        for i in 0..2000 {
            let dt = if i % 3 == 0 { 0.1 } else { 1.0 / 144.0 };
            let next = ramp_up(ramp, 0.5, dt);
            assert!(next >= ramp);
            assert!((0.0..=1.0).contains(&next));
            ramp = next;
        }
        assert_relative_eq!(ramp, 1.0, epsilon = 1e-5);
        assert_eq!(ramp_up(0.2, 0.0, 0.016), 1.0);
        assert_eq!(ramp_up(0.2, 0.5, 1e6), 1.0);
    }

    #[test]
    fn release_decays_toward_zero_when_enabled() {
        let cfg = DriveConfig { decay_on_release: true, ..DriveConfig::default() };
        let mut state = VehicleSimState { acceleration_ramp: 0.8, ..grounded() };
        on_release(&cfg, &mut state, 0.5);
        assert_relative_eq!(state.acceleration_ramp, 0.8 * (-1.0f32).exp(), epsilon = 1e-5);
    }

    #[test]
    fn release_holds_ramp_by_default() {
        let cfg = DriveConfig::default();
        assert!(!cfg.decay_on_release);
        let mut state = VehicleSimState { acceleration_ramp: 0.8, ..grounded() };
        on_release(&cfg, &mut state, 0.5);
        assert_eq!(state.acceleration_ramp, 0.8);
    }

    #[test]
    fn force_scales_with_mass_ramp_and_direction() {
        let cfg = DriveConfig { force_magnitude: 10.0, ramp_time_constant: 0.0, ..DriveConfig::default() };
        let mut body = RecordingBody::at_rest(1200.0);
        let mut state = grounded();
        let mut telemetry = Telemetry::default();

        let f = on_throttle(&cfg, ThrottleDirection::Reverse, &mut body, &mut state, &mut telemetry, 0.016).unwrap();
        assert_relative_eq!(f, Vec3::new(0.0, 0.0, -12_000.0));
        assert_eq!(body.forces, vec![f]);
    }

    #[test]
    fn reverse_shares_forward_ramp() {
        let cfg = DriveConfig::default();
        let mut body = RecordingBody::at_rest(1.0);
        let mut state = grounded();
        let mut telemetry = Telemetry::default();

        on_throttle(&cfg, ThrottleDirection::Forward, &mut body, &mut state, &mut telemetry, 0.1);
        let after_forward = state.acceleration_ramp;
        on_throttle(&cfg, ThrottleDirection::Reverse, &mut body, &mut state, &mut telemetry, 0.1);
        assert!(state.acceleration_ramp > after_forward);
    }

    #[test]
    fn nothing_above_max_speed() {
        let cfg = DriveConfig::default();
        let mut body = RecordingBody::at_rest(1350.0);
        body.velocity = Vec3::new(0.0, 0.0, cfg.max_speed + 0.01);
        let mut state = VehicleSimState { acceleration_ramp: 1.0, ..grounded() };
        let mut telemetry = Telemetry::default();

        let f = on_throttle(&cfg, ThrottleDirection::Forward, &mut body, &mut state, &mut telemetry, 0.016);
        assert!(f.is_none());
        assert!(body.forces.is_empty());
        assert!(matches!(telemetry.events()[0], TelemetryEvent::DriveSaturated { .. }));
    }

    #[test]
    fn drives_at_exactly_max_speed() {
        let cfg = DriveConfig::default();
        let mut body = RecordingBody::at_rest(1350.0);
        body.velocity = Vec3::new(0.0, 0.0, cfg.max_speed);
        assert_eq!(body.velocity.norm(), cfg.max_speed);
        let mut state = VehicleSimState { acceleration_ramp: 1.0, ..grounded() };
        let mut telemetry = Telemetry::default();

        let f = on_throttle(&cfg, ThrottleDirection::Forward, &mut body, &mut state, &mut telemetry, 0.016);
        assert!(f.is_some());
        assert_eq!(body.forces.len(), 1);
        assert!(body.forces[0].z > 0.0);
    }

    #[test]
    fn airborne_is_a_no_op() {
        let cfg = DriveConfig::default();
        let mut body = RecordingBody::at_rest(1350.0);
        let mut state = VehicleSimState::new();
        let mut telemetry = Telemetry::default();

        assert!(on_throttle(&cfg, ThrottleDirection::Forward, &mut body, &mut state, &mut telemetry, 0.016).is_none());
        assert_eq!(state.acceleration_ramp, 0.0);
        assert!(body.forces.is_empty());
    }
}
