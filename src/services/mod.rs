//! Domain services used by the websocket gateway.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the game and matchmaking logic so the gateway can
//! stay focused on protocol translation and connection plumbing. `engine`
//! and `session` are pure state machines; `matchmaker`, `registry`, and
//! `reaper` operate on the shared lobby.

pub mod engine;
pub mod matchmaker;
pub mod reaper;
pub mod registry;
pub mod session;
