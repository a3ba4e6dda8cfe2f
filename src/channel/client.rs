//! WebSocket client for the per-quiz live channel.

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::protocol::{GameEvent, OutboundFrame, OutboundIntent};

use super::state::{BuzzerState, ConnectionState, GameState, PhaseState, ScoreSnapshot, TimerState};

/// Observer callback for one state slice.
type Handler<T> = Box<dyn Fn(&T) + Send + 'static>;

/// Registered observers, one list per slice.
#[derive(Default)]
struct Observers {
    phase: Vec<Handler<PhaseState>>,
    scores: Vec<Handler<ScoreSnapshot>>,
    buzzer: Vec<Handler<BuzzerState>>,
    timer: Vec<Handler<TimerState>>,
}

/// State shared between the handle and its reader/writer tasks.
struct ChannelShared {
    game: GameState,
    connection: ConnectionState,
    status: String,
    observers: Observers,
}

type SharedChannel = Arc<Mutex<ChannelShared>>;

/// Outcome of [`ChannelHandle::send`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The frame was handed to the transport.
    Sent,
    /// The connection was not open; the frame was discarded.
    Dropped,
}

/// Factory for per-quiz channel connections.
///
/// Each call to [`connect`](Self::connect) yields an independent
/// [`ChannelHandle`] with its own transport and its own state slices.
/// Views that watch the same quiz each open their own handle.
pub struct GameChannelClient {
    config: ClientConfig,
}

impl GameChannelClient {
    /// Create a client from resolved configuration.
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    /// Open a connection to the live channel of `quiz_id`.
    ///
    /// A transport failure does not surface as an error: the returned handle
    /// is in [`ConnectionState::Failed`] with a displayable status string,
    /// and the failure is logged. There is no automatic retry.
    pub async fn connect(&self, quiz_id: i64) -> ChannelHandle {
        let url = self.config.channel_url(quiz_id);
        let connection_id = Uuid::new_v4();

        let shared: SharedChannel = Arc::new(Mutex::new(ChannelShared {
            game: GameState::default(),
            connection: ConnectionState::Connecting,
            status: "Connecting...".to_string(),
            observers: Observers::default(),
        }));

        let (tx, mut rx) = mpsc::unbounded_channel::<OutboundFrame>();

        let ws_stream = match tokio_tungstenite::connect_async(&url).await {
            Ok((stream, _)) => stream,
            Err(err) => {
                warn!(%connection_id, quiz_id, %url, error = %err, "channel connect failed");
                let mut guard = shared.lock().await;
                guard.connection = ConnectionState::Failed;
                guard.status = format!("Connection error: {}", err);
                return ChannelHandle {
                    quiz_id,
                    connection_id,
                    shared: Arc::clone(&shared),
                    outbound: tx,
                    tasks: Vec::new(),
                };
            }
        };

        info!(%connection_id, quiz_id, %url, "channel connected");
        {
            let mut guard = shared.lock().await;
            guard.connection = ConnectionState::Open;
            guard.status = "Connected".to_string();
        }

        let (mut ws_sender, mut ws_receiver) = ws_stream.split();

        // Writer: drain queued frames onto the transport.
        let writer_shared = Arc::clone(&shared);
        let writer = tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                let json = match serde_json::to_string(&frame) {
                    Ok(json) => json,
                    Err(err) => {
                        warn!(%connection_id, error = %err, "failed to encode outbound frame");
                        continue;
                    }
                };
                if let Err(err) = ws_sender.send(Message::Text(json.into())).await {
                    mark_failed(&writer_shared, format!("Connection error: {}", err)).await;
                    break;
                }
            }
        });

        // Reader: decode frames and mirror them into the state slices.
        let reader_shared = Arc::clone(&shared);
        let reader = tokio::spawn(async move {
            while let Some(msg) = ws_receiver.next().await {
                let text = match msg {
                    Ok(Message::Text(text)) => text.to_string(),
                    Ok(Message::Close(_)) => {
                        mark_failed(&reader_shared, "Connection closed by server".to_string())
                            .await;
                        break;
                    }
                    Err(err) => {
                        mark_failed(&reader_shared, format!("Connection error: {}", err)).await;
                        break;
                    }
                    _ => continue,
                };

                let event: GameEvent = match serde_json::from_str(&text) {
                    Ok(event) => event,
                    Err(err) => {
                        // Malformed or unknown frame; drop it, keep reading.
                        warn!(%connection_id, error = %err, "dropping undecodable frame");
                        continue;
                    }
                };

                dispatch(&reader_shared, event).await;
            }
            // Stream ended without a close frame (e.g. peer vanished).
            mark_failed(&reader_shared, "Connection closed by server".to_string()).await;
        });

        ChannelHandle {
            quiz_id,
            connection_id,
            shared,
            outbound: tx,
            tasks: vec![writer, reader],
        }
    }
}

/// Transition to `Failed` with a displayable status. Only an open connection
/// can fail; a released or already-failed one keeps its state and status.
async fn mark_failed(shared: &SharedChannel, status: String) {
    let mut guard = shared.lock().await;
    if guard.connection != ConnectionState::Open {
        return;
    }
    debug!(status = %status, "channel lost");
    guard.connection = ConnectionState::Failed;
    guard.status = status;
}

/// Apply an event to the shared state and fire the observers of the slice
/// it touched.
async fn dispatch(shared: &SharedChannel, event: GameEvent) {
    let mut guard = shared.lock().await;
    let shared = &mut *guard;
    shared.game.apply(event.clone());

    match event {
        GameEvent::PhaseChange(_) => {
            for handler in &shared.observers.phase {
                handler(&shared.game.phase);
            }
        }
        GameEvent::ScoreUpdate { .. } => {
            for handler in &shared.observers.scores {
                handler(&shared.game.scores);
            }
        }
        GameEvent::BuzzerUpdate { .. } => {
            for handler in &shared.observers.buzzer {
                handler(&shared.game.buzzer);
            }
        }
        GameEvent::TimerUpdate { .. } => {
            for handler in &shared.observers.timer {
                handler(&shared.game.timer);
            }
        }
    }
}

/// One live connection scoped to a quiz id.
///
/// The handle owns the transport and the mirrored state. Dropping it tears
/// the connection down, so navigating away from a view releases its channel.
pub struct ChannelHandle {
    quiz_id: i64,
    connection_id: Uuid,
    shared: SharedChannel,
    outbound: mpsc::UnboundedSender<OutboundFrame>,
    tasks: Vec<JoinHandle<()>>,
}

impl ChannelHandle {
    /// Quiz this handle is subscribed to.
    pub fn quiz_id(&self) -> i64 {
        self.quiz_id
    }

    /// Connection identity, for log correlation.
    pub fn connection_id(&self) -> Uuid {
        self.connection_id
    }

    /// Current transport state.
    pub async fn connection_state(&self) -> ConnectionState {
        self.shared.lock().await.connection
    }

    /// Human-readable connection status for display ("Connected",
    /// "Connection closed by server", ...).
    pub async fn status(&self) -> String {
        self.shared.lock().await.status.clone()
    }

    /// Latest value of all four state slices.
    pub async fn snapshot(&self) -> GameState {
        self.shared.lock().await.game.clone()
    }

    /// Observe phase changes.
    pub async fn on_phase_change<F>(&self, handler: F)
    where
        F: Fn(&PhaseState) + Send + 'static,
    {
        self.shared.lock().await.observers.phase.push(Box::new(handler));
    }

    /// Observe scoreboard replacements.
    pub async fn on_score_update<F>(&self, handler: F)
    where
        F: Fn(&ScoreSnapshot) + Send + 'static,
    {
        self.shared.lock().await.observers.scores.push(Box::new(handler));
    }

    /// Observe buzzer transitions.
    pub async fn on_buzzer_update<F>(&self, handler: F)
    where
        F: Fn(&BuzzerState) + Send + 'static,
    {
        self.shared.lock().await.observers.buzzer.push(Box::new(handler));
    }

    /// Observe countdown ticks.
    pub async fn on_timer_update<F>(&self, handler: F)
    where
        F: Fn(&TimerState) + Send + 'static,
    {
        self.shared.lock().await.observers.timer.push(Box::new(handler));
    }

    /// Serialize an intent onto the connection.
    ///
    /// Fire-and-forget: a frame queued on an open connection reports
    /// [`SendOutcome::Sent`] without waiting for delivery. If the connection
    /// is not open the intent is discarded and [`SendOutcome::Dropped`]
    /// returned; nothing is mutated and nothing panics.
    pub async fn send(&self, intent: OutboundIntent) -> SendOutcome {
        let guard = self.shared.lock().await;
        if guard.connection != ConnectionState::Open {
            debug!(
                connection_id = %self.connection_id,
                state = ?guard.connection,
                "dropping intent on non-open channel"
            );
            return SendOutcome::Dropped;
        }
        drop(guard);

        match self.outbound.send(intent.into_frame()) {
            Ok(()) => SendOutcome::Sent,
            Err(_) => SendOutcome::Dropped,
        }
    }

    /// Release the connection. Idempotent; the handle ends in
    /// [`ConnectionState::Closed`] regardless of how many times this runs.
    pub async fn close(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
        let mut guard = self.shared.lock().await;
        guard.connection = ConnectionState::Closed;
        guard.status = "Closed".to_string();
    }
}

impl Drop for ChannelHandle {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}
