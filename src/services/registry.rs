//! Session registry and router.
//!
//! DESIGN
//! ======
//! The lobby keeps an explicit participant -> (session, seat) index updated
//! transactionally with matchmaking, so locating a participant's game is a
//! map lookup rather than a scan over all sessions.
//!
//! `route_move` owns the outbound fan-out: an applied move is broadcast to
//! both seats as a `game_update`, while errors travel only back to the
//! requester. Both-seat senders are collected before the session lock is
//! taken (seat assignments are immutable once a match starts), keeping the
//! lobby-before-session lock order intact.

use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::protocol::{GameState, ServerMessage};
use crate::services::engine::Seat;
use crate::services::matchmaker;
use crate::services::session::{SessionError, SessionUpdate};
use crate::state::{AppState, Participant, SessionHandle};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    #[error("game not found")]
    GameNotFound,
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// A located participant: their session and seat.
pub struct Located {
    pub session_id: Uuid,
    pub seat: Seat,
    pub(crate) handle: SessionHandle,
}

// =============================================================================
// CONNECTION LIFECYCLE
// =============================================================================

/// Register a new connection and mint its participant identity.
pub async fn register_connection(state: &AppState, tx: mpsc::Sender<ServerMessage>) -> Uuid {
    let participant_id = Uuid::new_v4();
    state
        .lobby
        .write()
        .await
        .participants
        .insert(participant_id, Participant { tx, assignment: None });
    participant_id
}

/// Drop a participant's mapping on disconnect and hand their session over
/// to the matchmaker's disconnect handling, all in one critical section.
pub async fn remove_participant(state: &AppState, participant_id: Uuid) {
    let mut lobby = state.lobby.write().await;
    let Some(participant) = lobby.participants.remove(&participant_id) else {
        return;
    };
    matchmaker::session_disconnect(&mut lobby, participant_id, participant.assignment).await;
}

// =============================================================================
// ROUTING
// =============================================================================

/// Look up the session and seat for a participant. `None` covers stale
/// identities and post-cleanup lookups.
pub async fn locate(state: &AppState, participant_id: Uuid) -> Option<Located> {
    let lobby = state.lobby.read().await;
    let (session_id, seat) = lobby.participants.get(&participant_id)?.assignment?;
    let handle = lobby.sessions.get(&session_id)?.clone();
    Some(Located { session_id, seat, handle })
}

/// Route a move request to the participant's session and fan out the result.
///
/// Returns the reply for the requester. On success the new snapshot has
/// already been broadcast to both seats; on failure nothing is broadcast and
/// the error becomes a `success: false` reply.
pub async fn route_move(state: &AppState, participant_id: Uuid, column: i64) -> ServerMessage {
    let Some(located) = locate(state, participant_id).await else {
        warn!(%participant_id, "move from participant without a session");
        return ServerMessage::move_rejected(RouteError::GameNotFound.to_string(), None);
    };

    let (reply, broadcast) = {
        let mut session = located.handle.lock().await;
        match session.submit_move(located.seat, column) {
            Ok(update) => (ServerMessage::move_ok(&update), Some((update, session.occupants()))),
            Err(err) => {
                let snapshot = GameState::from_update(&session.update());
                let reply = ServerMessage::move_rejected(RouteError::from(err).to_string(), Some(snapshot));
                (reply, None)
            }
        }
    };

    if let Some((update, occupants)) = broadcast {
        broadcast_update(state, &occupants, &update).await;
    }
    reply
}

/// Deliver a snapshot to every listed occupant still connected. Best-effort:
/// a full or gone channel just skips that recipient, like any slow client.
pub async fn broadcast_update(state: &AppState, occupants: &[(Seat, Uuid)], update: &SessionUpdate) {
    let lobby = state.lobby.read().await;
    for (_, participant_id) in occupants {
        if let Some(participant) = lobby.participants.get(participant_id) {
            let _ = participant.tx.try_send(ServerMessage::game_update(update));
        }
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
