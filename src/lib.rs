//! # qzman-client
//!
//! Client library for the qzman quiz-hosting platform: a typed REST
//! data-access layer and a live game-state channel client.
//!
//! The live channel is the interesting part. Each quiz has one logical event
//! stream; [`channel::GameChannelClient`] opens a WebSocket connection to it,
//! decodes `{type, data}` envelopes into four independent state slices
//! (phase, scores, buzzer, timer), and republishes them to observers.
//! Outbound intents (advance question, submit answer, buzz) are serialized
//! onto the same connection.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use qzman_client::channel::GameChannelClient;
//! use qzman_client::config::ClientConfig;
//! use qzman_client::protocol::OutboundIntent;
//!
//! #[tokio::main]
//! async fn main() {
//!     let client = GameChannelClient::new(ClientConfig::from_env());
//!     let handle = client.connect(3).await;
//!
//!     handle
//!         .on_phase_change(|phase| println!("phase is now {:?}", phase.phase))
//!         .await;
//!
//!     handle
//!         .send(OutboundIntent::SubmitAnswer {
//!             answer: "Paris".into(),
//!             team_id: 7,
//!             team_name: "Alpha".into(),
//!         })
//!         .await;
//! }
//! ```

pub mod api;
pub mod channel;
pub mod config;
pub mod models;
pub mod protocol;
pub mod session;

pub use api::{ApiClient, ApiError};
pub use channel::{ChannelHandle, ConnectionState, GameChannelClient, GameState, SendOutcome};
pub use config::ClientConfig;
pub use protocol::{GameEvent, OutboundIntent, Phase};
pub use session::{Role, SessionContext};
