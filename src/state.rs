//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! owns the lobby: the session table, the participant table, and the single
//! waiting slot. The lobby lock serializes matchmaking and table maintenance;
//! each session additionally carries its own mutex so move application is
//! serialized per session without holding the lobby.
//!
//! Lock order: lobby before session, and never the lobby while a session
//! lock is held.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, mpsc};
use uuid::Uuid;

use crate::protocol::ServerMessage;
use crate::services::engine::Seat;
use crate::services::session::GameSession;

/// A session behind its per-session lock. The lobby session table is the
/// sole owner of session lifetime; everything else holds clones of this
/// handle only transiently.
pub type SessionHandle = Arc<Mutex<GameSession>>;

// =============================================================================
// PARTICIPANT
// =============================================================================

/// One connected player: the outbound channel for their connection and their
/// current session assignment. Removed when the connection closes.
pub struct Participant {
    /// Sender for outgoing messages, drained by the connection's ws loop.
    pub tx: mpsc::Sender<ServerMessage>,
    /// `(session_id, seat)` once matched.
    pub assignment: Option<(Uuid, Seat)>,
}

// =============================================================================
// LOBBY
// =============================================================================

/// Process-wide mutable registries. Created at startup, torn down with the
/// process.
#[derive(Default)]
pub struct Lobby {
    /// Live sessions keyed by session id.
    pub sessions: HashMap<Uuid, SessionHandle>,
    /// Connected participants keyed by participant id.
    pub participants: HashMap<Uuid, Participant>,
    /// The single session currently short one participant.
    pub waiting: Option<Uuid>,
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; the lobby is Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub lobby: Arc<RwLock<Lobby>>,
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self { lobby: Arc::new(RwLock::new(Lobby::default())) }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
