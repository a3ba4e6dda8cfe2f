//! Live quiz channel client.
//!
//! [`GameChannelClient`] opens one WebSocket connection per quiz id; each
//! [`ChannelHandle`] owns its connection and its own copy of the game state
//! slices.

mod client;
mod state;

pub use client::{ChannelHandle, GameChannelClient, SendOutcome};
pub use state::{BuzzerState, ConnectionState, GameState, PhaseState, ScoreSnapshot, TimerState};
