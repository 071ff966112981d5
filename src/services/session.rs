//! Game session — one match's authoritative state machine.
//!
//! DESIGN
//! ======
//! A session wraps a board together with the seat roster, whose turn it is,
//! and the terminal outcome. Moves are validated here in a fixed order
//! (active status, then turn ownership) before the board engine is consulted,
//! so a rejected move never mutates anything.
//!
//! State machine:
//! `WaitingForSecondPlayer -> InProgress -> Won | Drawn | Abandoned | Expired`.
//! No transition ever leaves a terminal state.

use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::services::engine::{Board, Grid, MoveError, MoveOutcome, Seat};

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    WaitingForSecondPlayer,
    InProgress,
    Won(Seat),
    Drawn,
    /// A participant disconnected mid-game; the remaining seat takes the win.
    Abandoned(Seat),
    /// Evicted by the idle-session reaper. No winner.
    Expired,
}

impl SessionStatus {
    /// Terminal statuses freeze the session: no further moves are accepted.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionStatus::Won(_) | SessionStatus::Drawn | SessionStatus::Abandoned(_) | SessionStatus::Expired
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("game is not active")]
    NotActive,
    #[error("not your turn")]
    NotYourTurn,
    #[error(transparent)]
    Move(#[from] MoveError),
}

/// Snapshot broadcast to both seats after every state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionUpdate {
    pub grid: Grid,
    pub turn: Seat,
    pub status: SessionStatus,
}

// =============================================================================
// SESSION
// =============================================================================

pub struct GameSession {
    pub id: Uuid,
    pub(crate) board: Board,
    pub(crate) turn: Seat,
    pub(crate) status: SessionStatus,
    /// Participant ids keyed by seat index. Fixed once assigned.
    seats: [Option<Uuid>; 2],
    last_activity: Instant,
}

impl GameSession {
    /// Create a session with the first participant in seat one, waiting for
    /// an opponent.
    #[must_use]
    pub fn new(id: Uuid, first_participant: Uuid) -> Self {
        Self {
            id,
            board: Board::new(),
            turn: Seat::One,
            status: SessionStatus::WaitingForSecondPlayer,
            seats: [Some(first_participant), None],
            last_activity: Instant::now(),
        }
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Participant occupying `seat`, if assigned.
    #[must_use]
    pub fn participant(&self, seat: Seat) -> Option<Uuid> {
        self.seats[seat.index()]
    }

    /// Seat held by `participant_id`, if any.
    #[must_use]
    pub fn seat_of(&self, participant_id: Uuid) -> Option<Seat> {
        match (self.seats[0], self.seats[1]) {
            (Some(id), _) if id == participant_id => Some(Seat::One),
            (_, Some(id)) if id == participant_id => Some(Seat::Two),
            _ => None,
        }
    }

    /// All assigned seats with their participants.
    #[must_use]
    pub fn occupants(&self) -> Vec<(Seat, Uuid)> {
        [Seat::One, Seat::Two]
            .into_iter()
            .filter_map(|seat| self.participant(seat).map(|id| (seat, id)))
            .collect()
    }

    /// Seat the second participant and start the match. Seat one moves first.
    pub fn add_second_player(&mut self, participant_id: Uuid) {
        self.seats[Seat::Two.index()] = Some(participant_id);
        self.status = SessionStatus::InProgress;
        self.turn = Seat::One;
        self.touch();
    }

    /// Validate and apply a move from `seat`.
    ///
    /// Preconditions are checked in order: the session must be in progress
    /// (`NotActive` covers waiting and all terminal states), then the seat
    /// must own the current turn. Board errors propagate unchanged. On a
    /// winning move the turn is left as-is; it is meaningless once terminal.
    ///
    /// # Errors
    ///
    /// `NotActive`, `NotYourTurn`, or a propagated `MoveError`. No state
    /// changes on any error path.
    pub fn submit_move(&mut self, seat: Seat, column: i64) -> Result<SessionUpdate, SessionError> {
        if self.status != SessionStatus::InProgress {
            return Err(SessionError::NotActive);
        }
        if seat != self.turn {
            return Err(SessionError::NotYourTurn);
        }

        match self.board.apply_move(seat, column)? {
            MoveOutcome::Won(winner) => self.status = SessionStatus::Won(winner),
            MoveOutcome::Drawn => self.status = SessionStatus::Drawn,
            MoveOutcome::Continue => self.turn = self.turn.other(),
        }
        self.touch();
        Ok(self.update())
    }

    /// Current state snapshot.
    #[must_use]
    pub fn update(&self) -> SessionUpdate {
        SessionUpdate { grid: self.board.grid(), turn: self.turn, status: self.status }
    }

    /// Terminate an in-progress match because the other seat disconnected.
    /// The remaining seat is credited with the win. No-op once terminal.
    pub fn abandon(&mut self, remaining: Seat) {
        if self.status == SessionStatus::InProgress {
            self.status = SessionStatus::Abandoned(remaining);
            self.touch();
        }
    }

    /// Mark the session expired. Returns false if it was already terminal.
    pub(crate) fn expire(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = SessionStatus::Expired;
        true
    }

    /// Time since the last seat assignment or applied move.
    #[must_use]
    pub fn idle_for(&self) -> Duration {
        self.last_activity.elapsed()
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
