//! Idle-session reaper — optional background eviction.
//!
//! DESIGN
//! ======
//! Turns have no deadline, so a session stuck waiting for an opponent or for
//! a move that never comes would otherwise live until its players hang up.
//! When `IDLE_SESSION_TIMEOUT_SECS` is set, this task sweeps the session
//! table and evicts anything with no activity inside the window. Occupants
//! that are still connected get a final terminal update (game over, no
//! winner) and their assignment is cleared, so a late move resolves to
//! "game not found" instead of dangling.
//!
//! Disabled by default: the sweep only runs when the operator opts in.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use crate::protocol::ServerMessage;
use crate::state::AppState;

/// Spawn the background reaper task. Returns a handle for shutdown.
pub fn spawn_reaper(state: AppState, timeout: Duration, sweep_interval: Duration) -> JoinHandle<()> {
    info!(timeout_secs = timeout.as_secs(), sweep_secs = sweep_interval.as_secs(), "idle session reaper enabled");
    tokio::spawn(async move {
        loop {
            sweep_idle_sessions(&state, timeout).await;
            tokio::time::sleep(sweep_interval).await;
        }
    })
}

/// Evict every session idle for at least `timeout`. Returns the number of
/// sessions removed.
pub async fn sweep_idle_sessions(state: &AppState, timeout: Duration) -> usize {
    // Snapshot handles first; session locks are taken without the lobby held.
    let handles: Vec<_> = {
        let lobby = state.lobby.read().await;
        lobby.sessions.iter().map(|(id, handle)| (*id, handle.clone())).collect()
    };

    let mut evicted = 0;
    for (session_id, handle) in handles {
        let (notify, update, occupants) = {
            let mut session = handle.lock().await;
            if session.idle_for() < timeout {
                continue;
            }
            // Occupants of an already-terminal session saw their final
            // update when it ended; only a live session owes a notification.
            let notify = session.expire();
            (notify, session.update(), session.occupants())
        };

        let mut lobby = state.lobby.write().await;
        if lobby.waiting == Some(session_id) {
            lobby.waiting = None;
        }
        // Assignments into the removed session are cleared either way.
        for (seat, participant_id) in &occupants {
            if let Some(participant) = lobby.participants.get_mut(participant_id) {
                if participant.assignment == Some((session_id, *seat)) {
                    participant.assignment = None;
                }
                if notify {
                    let _ = participant.tx.try_send(ServerMessage::game_update(&update));
                }
            }
        }
        lobby.sessions.remove(&session_id);
        evicted += 1;
        info!(%session_id, "idle session evicted");
    }
    evicted
}

#[cfg(test)]
#[path = "reaper_test.rs"]
mod tests;
