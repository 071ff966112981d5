//! Wire protocol — the JSON messages exchanged over the websocket.
//!
//! DESIGN
//! ======
//! Three server-to-client shapes and one client-to-server shape, all tagged
//! with a `type` field:
//! - `game_status`: matchmaking outcome (`waiting` or `started`) with the
//!   recipient's player number and the game id.
//! - `game_update`: the authoritative board snapshot, broadcast to both
//!   seats after every applied move or terminal transition.
//! - `move_result`: the direct reply to a `move` request. On rule errors the
//!   snapshot fields are included when the session was located, and omitted
//!   when there is no game to report on.
//!
//! Cell encoding: 0 = empty, 1 = player one's piece, 2 = player two's.
//! An abandoned game is reported as a win for the remaining player.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::engine::{Grid, Seat};
use crate::services::session::{SessionStatus, SessionUpdate};

// =============================================================================
// CLIENT -> SERVER
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Drop a piece into `column`. Taken as `i64` so out-of-range values
    /// reach move validation instead of failing deserialization.
    Move { column: i64 },
}

// =============================================================================
// SERVER -> CLIENT
// =============================================================================

/// Matchmaking phase reported in `game_status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPhase {
    Waiting,
    Started,
}

/// Snapshot fields shared by `game_update` and successful `move_result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub board: Grid,
    pub current_player: u8,
    pub game_over: bool,
    pub winner: Option<u8>,
}

impl GameState {
    #[must_use]
    pub fn from_update(update: &SessionUpdate) -> Self {
        let winner = match update.status {
            SessionStatus::Won(seat) | SessionStatus::Abandoned(seat) => Some(seat.number()),
            _ => None,
        };
        Self {
            board: update.grid,
            current_player: update.turn.number(),
            game_over: update.status.is_terminal(),
            winner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    GameStatus {
        status: MatchPhase,
        player_number: u8,
        game_id: Uuid,
    },
    GameUpdate {
        #[serde(flatten)]
        state: GameState,
    },
    MoveResult {
        success: bool,
        message: String,
        #[serde(flatten)]
        state: Option<GameState>,
    },
}

// =============================================================================
// CONSTRUCTORS
// =============================================================================

impl ServerMessage {
    #[must_use]
    pub fn game_status(phase: MatchPhase, seat: Seat, game_id: Uuid) -> Self {
        Self::GameStatus { status: phase, player_number: seat.number(), game_id }
    }

    #[must_use]
    pub fn game_update(update: &SessionUpdate) -> Self {
        Self::GameUpdate { state: GameState::from_update(update) }
    }

    /// Reply for an applied move. The same snapshot also goes out to both
    /// seats as a `game_update`.
    #[must_use]
    pub fn move_ok(update: &SessionUpdate) -> Self {
        Self::MoveResult {
            success: true,
            message: "move applied".into(),
            state: Some(GameState::from_update(update)),
        }
    }

    /// Reply for a rejected move. `state` carries the untouched snapshot
    /// when the session was located.
    #[must_use]
    pub fn move_rejected(message: impl Into<String>, state: Option<GameState>) -> Self {
        Self::MoveResult { success: false, message: message.into(), state }
    }
}

#[cfg(test)]
#[path = "protocol_test.rs"]
mod tests;
