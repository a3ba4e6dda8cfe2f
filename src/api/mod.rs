//! REST data-access client for the quiz backend.
//!
//! Request/response only; live game state flows through
//! [`crate::channel::GameChannelClient`] instead.

mod client;

pub use client::{ApiClient, ApiError};
