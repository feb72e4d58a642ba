mod arcade;
mod debug_builders;
mod error;
mod net;
mod physics;
mod settings;
mod state;

use crate::error::ServerError;
use crate::net::start_websocket_server;
use crate::physics::PhysicsWorld;
use crate::settings::Settings;
use crate::state::SharedGameState;

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{interval, Duration, MissedTickBehavior};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let settings = Settings::load()?;
    log::info!("Starting arcade car server ({} Hz)", settings.tick_hz);

    let state = Arc::new(Mutex::new(SharedGameState::new()));
    let physics = Arc::new(Mutex::new(PhysicsWorld::new(&settings)));

    // Start WebSocket server
    let server = tokio::spawn(start_websocket_server(
        Arc::clone(&state),
        settings.bind_addr.clone(),
    ));

    // Fixed timestep
    let dt = settings.dt();
    let mut ticker = interval(Duration::from_secs_f32(dt));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        if server.is_finished() {
            let result = server.await.inspect_err(|e| log::error!("WebSocket task failed: {e}"))?;
            return result;
        }

        let mut phys = physics.lock().await;
        let mut game = state.lock().await;

        // Sample input once per tick and hand it to each vehicle
        game.sync_physics(&mut phys, settings.axis_deadzone);

        // Step physics
        phys.step(dt);

        // Advance tick + broadcast snapshot
        game.tick += 1;
        game.broadcast_snapshot(&phys);

        if game.tick % (settings.tick_hz as u64 * 10) == 0 {
            log::debug!("tick {}: {} vehicles, {} clients", game.tick, phys.vehicles.len(), game.clients.len());
        }
    }
}
