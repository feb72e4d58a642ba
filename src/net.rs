use std::sync::Arc;
use futures::{StreamExt, SinkExt};
use serde::{Deserialize, Serialize};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tokio::sync::{Mutex, mpsc};

use crate::error::ServerError;
use crate::state::{Axes, SharedGameState};

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    Input {
        #[serde(default)]
        throttle: f32,
        #[serde(default)]
        brake: f32,
        #[serde(default)]
        steer: f32,
    },
    Ping,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerMessage<'a> {
    Welcome { player_id: &'a str },
    Pong,
}

impl ServerMessage<'_> {
    fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

pub async fn start_websocket_server(
    state: Arc<Mutex<SharedGameState>>,
    bind_addr: String,
) -> Result<(), ServerError> {
    let listener = TcpListener::bind(&bind_addr).await?;

    log::info!("WebSocket listening on ws://{bind_addr}");

    loop {
        let (raw, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                log::warn!("Accept failed: {e}");
                continue;
            }
        };
        let state_clone = Arc::clone(&state);

        tokio::spawn(async move {
            if let Err(e) = handle_client(raw, state_clone).await {
                log::warn!("Client {peer} dropped: {e}");
            }
        });
    }
}

async fn handle_client(
    raw: TcpStream,
    state: Arc<Mutex<SharedGameState>>,
) -> Result<(), ServerError> {
    let ws = accept_async(raw).await?;
    let (mut write, mut read) = ws.split();

    // -------------------------------
    // 1) Create outgoing message channel
    // -------------------------------
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    // -------------------------------
    // 2) Spawn send-loop task
    // -------------------------------
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if write.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    // -------------------------------
    // 3) Register client + entity (vehicle is spawned by the tick loop)
    // -------------------------------
    let player_id = {
        let mut game = state.lock().await;
        game.register_client(tx.clone());
        game.add_entity()
    };

    log::info!("Player connected: {player_id}");

    if let Some(welcome) = (ServerMessage::Welcome { player_id: &player_id }).to_json() {
        let _ = tx.send(welcome);
    }

    // -------------------------------
    // 4) Main receive loop
    // -------------------------------
    while let Some(msg) = read.next().await {
        let msg = match msg {
            Ok(m) => m,
            Err(e) => {
                log::debug!("Read error for {player_id}: {e}");
                break;
            }
        };

        let Message::Text(text) = msg else { continue };

        match serde_json::from_str::<ClientMessage>(&text) {
            Ok(ClientMessage::Ping) => {
                if let Some(pong) = ServerMessage::Pong.to_json() {
                    let _ = tx.send(pong);
                }
            }
            Ok(ClientMessage::Input { throttle, brake, steer }) => {
                let mut game = state.lock().await;
                game.update_input(&player_id, Axes { throttle, brake, steer });
            }
            Err(e) => log::warn!("Ignoring malformed message from {player_id}: {e}"),
        }
    }

    log::info!("Player disconnected: {player_id}");
    let mut game = state.lock().await;
    game.remove_entity(&player_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_client_messages() {
        let input: ClientMessage =
            serde_json::from_str(r#"{"type":"input","throttle":0.5,"steer":-1.0}"#).unwrap();
        assert_eq!(input, ClientMessage::Input { throttle: 0.5, brake: 0.0, steer: -1.0 });

        let ping: ClientMessage = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(ping, ClientMessage::Ping);

        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"teleport"}"#).is_err());
    }

    #[test]
    fn server_messages_are_tagged() {
        let welcome = ServerMessage::Welcome { player_id: "abc" }.to_json().unwrap();
        assert_eq!(welcome, r#"{"type":"welcome","player_id":"abc"}"#);
        assert_eq!(ServerMessage::Pong.to_json().unwrap(), r#"{"type":"pong"}"#);
    }
}
