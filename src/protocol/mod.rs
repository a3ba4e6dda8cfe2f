//! Wire protocol for the per-quiz live event channel.
//!
//! All frames are JSON text messages shaped as `{"type": ..., "data": ...}`.

mod messages;

pub use messages::{
    GameEvent, OutboundFrame, OutboundIntent, Phase, PhaseChangeData, QuestionPayload, TeamScore,
    BUZZ_ANSWER,
};
