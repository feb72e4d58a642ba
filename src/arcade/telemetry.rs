// ==============================================================================
// telemetry.rs - STRUCTURED PER-TICK EVENTS
// ------------------------------------------------------------------------------
// The core records what it did each tick instead of drawing anything. The host
// drains the buffer and hands it to an observability collaborator
// (debug_builders.rs) that turns events into client-side debug primitives.
// ==============================================================================

use serde::Serialize;

use crate::arcade::types::{ThrottleDirection, WheelId};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TelemetryEvent {
    WheelContact {
        wheel: WheelId,
        hit: bool,
        origin: [f32; 3],
        direction: [f32; 3],
        ray_length: f32,
        hit_point: Option<[f32; 3]>,
        distance: Option<f32>,
        compression: f32,
        force: [f32; 3],
    },
    WheelMissing {
        wheel: WheelId,
    },
    Grounded {
        grounded: bool,
        contacts: u8,
    },
    Drive {
        direction: ThrottleDirection,
        ramp: f32,
        force: [f32; 3],
    },
    DriveSaturated {
        speed: f32,
        max_speed: f32,
    },
    Steer {
        input: f32,
        torque: [f32; 3],
    },
    Drag {
        force: [f32; 3],
    },
}

#[derive(Debug, Clone, Default)]
pub struct Telemetry {
    events: Vec<TelemetryEvent>,
}

impl Telemetry {
    pub fn record(&mut self, event: TelemetryEvent) {
        log::trace!("{event:?}");
        self.events.push(event);
    }

    pub fn events(&self) -> &[TelemetryEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
