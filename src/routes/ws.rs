//! WebSocket gateway — one connection, one participant, one seat.
//!
//! DESIGN
//! ======
//! On upgrade, mints a participant identity, registers the connection, and
//! joins the matchmaking queue, then enters a `select!` loop:
//! - Incoming socket frames -> parse + dispatch to the router
//! - Messages queued by peers or the matchmaker -> forward to the socket
//!
//! Handlers never write to the socket of another participant; everything
//! outbound to a peer travels through that peer's own mpsc channel.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade -> register connection, join queue (queues `game_status`)
//! 2. Client sends `move` frames -> router validates, applies, fans out
//! 3. Malformed input is logged and ignored; the connection stays open
//! 4. Close -> remove participant -> matchmaker disconnect handling

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::services::{matchmaker, registry};
use crate::state::AppState;

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    // Per-connection channel; peers and the matchmaker queue messages here.
    let (client_tx, mut client_rx) = mpsc::channel::<ServerMessage>(256);

    let participant_id = registry::register_connection(&state, client_tx).await;
    let assignment = matchmaker::join_queue(&state, participant_id).await;
    info!(
        %participant_id,
        session_id = %assignment.session_id,
        player = assignment.seat.number(),
        phase = ?assignment.phase,
        "ws: participant connected"
    );

    'conn: loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        for reply in process_inbound_text(&state, participant_id, text.as_str()).await {
                            if send_message(&mut socket, &reply).await.is_err() {
                                break 'conn;
                            }
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(message) = client_rx.recv() => {
                if send_message(&mut socket, &message).await.is_err() {
                    break;
                }
            }
        }
    }

    registry::remove_participant(&state, participant_id).await;
    info!(%participant_id, "ws: participant disconnected");
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Parse and process one inbound text frame, returning replies for the
/// sender. Split from the socket loop so tests can exercise dispatch
/// without a live websocket.
async fn process_inbound_text(state: &AppState, participant_id: Uuid, text: &str) -> Vec<ServerMessage> {
    let message: ClientMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            // Not a user-visible error: drop the frame, keep the connection.
            warn!(%participant_id, error = %e, "ws: malformed message ignored");
            return Vec::new();
        }
    };

    match message {
        ClientMessage::Move { column } => {
            info!(%participant_id, column, "ws: move request");
            vec![registry::route_move(state, participant_id, column).await]
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

async fn send_message(socket: &mut WebSocket, message: &ServerMessage) -> Result<(), ()> {
    let json = match serde_json::to_string(message) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize message");
            return Err(());
        }
    };
    socket.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
