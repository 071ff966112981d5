//! Matchmaker — pairs incoming participants into sessions.
//!
//! DESIGN
//! ======
//! At most one session is ever waiting for an opponent. A joiner either
//! becomes seat one of a fresh waiting session or seat two of the waiting
//! one; reading and clearing the waiting slot happens inside a single lobby
//! write-lock critical section, so two simultaneous joins can never both
//! claim seat two nor both open new sessions when they should pair.
//!
//! Disconnects route through here as well: a waiting session whose sole
//! occupant leaves is discarded, an in-progress session is abandoned in
//! favor of the remaining seat, and a session with no connected occupant
//! left is evicted from the table.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::protocol::{MatchPhase, ServerMessage};
use crate::services::engine::Seat;
use crate::services::session::{GameSession, SessionStatus};
use crate::state::{AppState, Lobby};

// =============================================================================
// TYPES
// =============================================================================

/// Outcome of `join_queue`, from the joiner's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatAssignment {
    pub session_id: Uuid,
    pub seat: Seat,
    pub phase: MatchPhase,
}

// =============================================================================
// JOIN
// =============================================================================

/// Assign a freshly connected participant to a session.
///
/// Pushes the `game_status` notification into the affected participants'
/// outbound channels: only the joiner when a new waiting session opens, both
/// seats when the match starts.
pub async fn join_queue(state: &AppState, participant_id: Uuid) -> SeatAssignment {
    let mut lobby = state.lobby.write().await;

    if let Some(waiting_id) = lobby.waiting.take() {
        // The waiting id can outlive a joinable session: the reaper may have
        // evicted it already, or marked it terminal under the session lock
        // just before this join won the lobby lock. Pair only into a session
        // that is still waiting; otherwise fall through and open a fresh one.
        if let Some(handle) = lobby.sessions.get(&waiting_id).cloned() {
            let mut session = handle.lock().await;
            if session.status() == SessionStatus::WaitingForSecondPlayer {
                session.add_second_player(participant_id);
                let first_id = session.participant(Seat::One);
                drop(session);

                if let Some(joiner) = lobby.participants.get_mut(&participant_id) {
                    joiner.assignment = Some((waiting_id, Seat::Two));
                    let _ = joiner
                        .tx
                        .try_send(ServerMessage::game_status(MatchPhase::Started, Seat::Two, waiting_id));
                }
                if let Some(first) = first_id.and_then(|id| lobby.participants.get(&id)) {
                    let _ = first
                        .tx
                        .try_send(ServerMessage::game_status(MatchPhase::Started, Seat::One, waiting_id));
                }

                info!(session_id = %waiting_id, %participant_id, "session started with two players");
                return SeatAssignment { session_id: waiting_id, seat: Seat::Two, phase: MatchPhase::Started };
            }
        }
    }

    let session_id = Uuid::new_v4();
    let session = GameSession::new(session_id, participant_id);
    lobby.sessions.insert(session_id, Arc::new(Mutex::new(session)));
    lobby.waiting = Some(session_id);

    if let Some(joiner) = lobby.participants.get_mut(&participant_id) {
        joiner.assignment = Some((session_id, Seat::One));
        let _ = joiner
            .tx
            .try_send(ServerMessage::game_status(MatchPhase::Waiting, Seat::One, session_id));
    }

    info!(%session_id, %participant_id, "participant opened a waiting session");
    SeatAssignment { session_id, seat: Seat::One, phase: MatchPhase::Waiting }
}

// =============================================================================
// DISCONNECT
// =============================================================================

/// Tear down a departed participant's session assignment. The caller has
/// already removed the participant entry and still holds the lobby write
/// lock, so the whole path is one critical section.
pub(crate) async fn session_disconnect(
    lobby: &mut Lobby,
    participant_id: Uuid,
    assignment: Option<(Uuid, Seat)>,
) {
    let Some((session_id, seat)) = assignment else { return };
    let Some(handle) = lobby.sessions.get(&session_id).cloned() else {
        return;
    };

    // Sole occupant of the waiting slot: discard the session entirely.
    if lobby.waiting == Some(session_id) {
        lobby.waiting = None;
        lobby.sessions.remove(&session_id);
        info!(%session_id, %participant_id, "waiting session discarded after disconnect");
        return;
    }

    let mut session = handle.lock().await;
    let remaining = seat.other();

    if session.status() == SessionStatus::InProgress {
        session.abandon(remaining);
        let update = session.update();
        if let Some(peer) = session
            .participant(remaining)
            .and_then(|id| lobby.participants.get(&id))
        {
            let _ = peer.tx.try_send(ServerMessage::game_update(&update));
        }
        info!(%session_id, remaining_player = remaining.number(), "session abandoned after disconnect");
    }

    let peer_connected = session
        .participant(remaining)
        .is_some_and(|id| lobby.participants.contains_key(&id));
    drop(session);

    if !peer_connected {
        lobby.sessions.remove(&session_id);
        info!(%session_id, "session evicted, no occupants remain");
    }
}

#[cfg(test)]
#[path = "matchmaker_test.rs"]
mod tests;
