use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use tokio::sync::mpsc::UnboundedSender;

use crate::arcade::InputSnapshot;
use crate::physics::{PhysicsWorld, VehicleSnapshot};

/// Raw client axes, as last received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Axes {
    pub throttle: f32, // -1..1
    #[serde(default)]
    pub brake: f32,    // 0..1
    pub steer: f32,    // -1..1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityInput {
    pub tick: u64,
    pub axes: Axes,
}

pub struct Entity {
    pub id: String,
    pub slot: usize,
    pub last_input: Option<EntityInput>,
}

impl Entity {
    /// Input snapshot for this tick. No input received yet means idle.
    pub fn input_snapshot(&self, deadzone: f32) -> InputSnapshot {
        match &self.last_input {
            Some(input) => {
                let a = input.axes;
                InputSnapshot::from_axes(a.throttle, a.brake, a.steer, deadzone)
            }
            None => InputSnapshot::default(),
        }
    }

    /// Players are lined up along x, 5 m apart.
    pub fn spawn_position(&self) -> [f32; 3] {
        let lane = self.slot as f32 - 2.0;
        [lane * 5.0, 0.0, 0.0]
    }
}

#[derive(Serialize)]
#[serde(tag = "type", rename = "snapshot")]
pub struct Snapshot {
    pub tick: u64,
    pub players: Vec<VehicleSnapshot>,
}

pub struct SharedGameState {
    pub tick: u64,
    pub clients: Vec<UnboundedSender<String>>,
    pub entities: HashMap<String, Entity>,
}

impl SharedGameState {
    pub fn new() -> Self {
        Self {
            tick: 0,
            clients: Vec::new(),
            entities: HashMap::new(),
        }
    }

    pub fn register_client(&mut self, tx: UnboundedSender<String>) {
        self.clients.push(tx);
    }

    /// Lowest lane not taken by a connected player.
    fn free_slot(&self) -> usize {
        (0..)
            .find(|slot| !self.entities.values().any(|e| e.slot == *slot))
            .unwrap_or_default()
    }

    pub fn add_entity(&mut self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let slot = self.free_slot();
        self.entities.insert(
            id.clone(),
            Entity { id: id.clone(), slot, last_input: None },
        );
        id
    }

    pub fn remove_entity(&mut self, id: &str) {
        self.entities.remove(id);
    }

    pub fn update_input(&mut self, id: &str, axes: Axes) {
        let tick = self.tick;
        if let Some(entity) = self.entities.get_mut(id) {
            entity.last_input = Some(EntityInput { tick, axes });
        }
    }

    /// Spawns missing vehicles, drops orphaned ones and pushes this tick's input.
    pub fn sync_physics(&self, physics: &mut PhysicsWorld, deadzone: f32) {
        physics.retain_vehicles(|id| self.entities.contains_key(id));

        for entity in self.entities.values() {
            if !physics.has_vehicle(&entity.id) {
                physics.spawn_vehicle_for_player(&entity.id, entity.spawn_position());
            }
            physics.set_input(&entity.id, entity.input_snapshot(deadzone));
        }
    }

    pub fn snapshot(&self, physics: &PhysicsWorld) -> Snapshot {
        let players = self
            .entities
            .keys()
            .filter_map(|id| physics.vehicle_snapshot(id))
            .collect();
        Snapshot { tick: self.tick, players }
    }

    /// Build and send a snapshot of all entities to all clients.
    /// Clients whose channel has closed are dropped.
    pub fn broadcast_snapshot(&mut self, physics: &PhysicsWorld) {
        let json = match serde_json::to_string(&self.snapshot(physics)) {
            Ok(json) => json,
            Err(e) => {
                log::warn!("Failed to serialize snapshot at tick {}: {e}", self.tick);
                return;
            }
        };

        self.clients.retain(|tx| tx.send(json.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcade::ThrottleDirection;
    use crate::settings::Settings;

    #[test]
    fn entities_get_vehicles_and_input() {
        let mut game = SharedGameState::new();
        let mut physics = PhysicsWorld::new(&Settings::default());

        let id = game.add_entity();
        game.update_input(&id, Axes { throttle: 1.0, brake: 0.0, steer: -0.4 });
        game.sync_physics(&mut physics, 0.05);

        assert!(physics.has_vehicle(&id));
        let input = physics.vehicles[&id].input;
        assert_eq!(input.throttle, Some(ThrottleDirection::Forward));
        assert_eq!(input.steer, -0.4);

        game.remove_entity(&id);
        game.sync_physics(&mut physics, 0.05);
        assert!(!physics.has_vehicle(&id));
    }

    #[test]
    fn snapshot_serializes_with_type_tag() {
        let mut game = SharedGameState::new();
        let mut physics = PhysicsWorld::new(&Settings::default());
        game.add_entity();
        game.sync_physics(&mut physics, 0.05);
        physics.step(1.0 / 60.0);

        let json = serde_json::to_value(game.snapshot(&physics)).unwrap();
        assert_eq!(json["type"], "snapshot");
        assert_eq!(json["players"].as_array().unwrap().len(), 1);
        assert!(json["players"][0]["debug"]["suspension_rays"].is_array());
    }

    #[test]
    fn players_never_share_a_lane() {
        let mut game = SharedGameState::new();
        let ids: Vec<String> = (0..6).map(|_| game.add_entity()).collect();

        let mut slots: Vec<usize> = game.entities.values().map(|e| e.slot).collect();
        slots.sort_unstable();
        assert_eq!(slots, vec![0, 1, 2, 3, 4, 5]);
        assert_ne!(game.entities[&ids[0]].spawn_position(), game.entities[&ids[5]].spawn_position());

        // a freed lane is handed to the next player
        let freed = game.entities[&ids[2]].slot;
        game.remove_entity(&ids[2]);
        let id = game.add_entity();
        assert_eq!(game.entities[&id].slot, freed);
    }

    #[test]
    fn closed_clients_are_dropped() {
        let mut game = SharedGameState::new();
        let physics = PhysicsWorld::new(&Settings::default());
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let (tx_dead, rx_dead) = tokio::sync::mpsc::unbounded_channel();
        game.register_client(tx);
        game.register_client(tx_dead);
        drop(rx_dead);

        game.broadcast_snapshot(&physics);

        assert_eq!(game.clients.len(), 1);
        drop(rx);
    }
}
