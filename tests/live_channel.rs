//! Integration tests for the live channel client, against an in-process
//! WebSocket server standing in for the quiz backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use qzman_client::channel::{ChannelHandle, ConnectionState, GameState};
use qzman_client::config::ClientConfig;
use qzman_client::protocol::OutboundIntent;
use qzman_client::{GameChannelClient, Phase, SendOutcome};

/// How the stub backend drives each accepted connection.
#[derive(Clone)]
struct Feeder {
    /// Frames sent to the client, verbatim text.
    frames: Vec<String>,
    /// Hold back the frames until the client has sent something first.
    wait_for_inbound: bool,
    /// Finish with a proper close handshake instead of holding the
    /// connection open.
    close_after: bool,
}

impl Feeder {
    fn frames(frames: &[Value]) -> Self {
        Self {
            frames: frames.iter().map(|f| f.to_string()).collect(),
            wait_for_inbound: false,
            close_after: false,
        }
    }
}

/// Stub backend: accepts any number of connections and runs the feeder
/// script on each. Returns the ws base URL and a receiver of every text
/// frame the clients send.
async fn spawn_backend(feeder: Feeder) -> (ClientConfig, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let feeder = feeder.clone();
            let inbound_tx = inbound_tx.clone();
            tokio::spawn(async move {
                let mut ws = match tokio_tungstenite::accept_async(stream).await {
                    Ok(ws) => ws,
                    Err(_) => return,
                };

                if feeder.wait_for_inbound {
                    match ws.next().await {
                        Some(Ok(Message::Text(text))) => {
                            let _ = inbound_tx.send(text.to_string());
                        }
                        _ => return,
                    }
                }

                for frame in &feeder.frames {
                    if ws.send(Message::Text(frame.clone().into())).await.is_err() {
                        return;
                    }
                }

                if feeder.close_after {
                    let _ = ws.close(None).await;
                    return;
                }

                // Hold the connection open, forwarding whatever arrives.
                while let Some(Ok(msg)) = ws.next().await {
                    if let Message::Text(text) = msg {
                        let _ = inbound_tx.send(text.to_string());
                    }
                }
            });
        }
    });

    (
        ClientConfig::new("http://unused.invalid/api", format!("ws://{}", addr)),
        inbound_rx,
    )
}

/// Poll the handle until the snapshot satisfies `pred` or time runs out.
async fn wait_for_state(
    handle: &ChannelHandle,
    pred: impl Fn(&GameState) -> bool,
) -> GameState {
    for _ in 0..250 {
        let state = handle.snapshot().await;
        if pred(&state) {
            return state;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("state condition not reached: {:?}", handle.snapshot().await);
}

async fn wait_for_connection(handle: &ChannelHandle, wanted: ConnectionState) {
    for _ in 0..250 {
        if handle.connection_state().await == wanted {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "connection never reached {:?}, is {:?}",
        wanted,
        handle.connection_state().await
    );
}

fn scenario_frames() -> Vec<Value> {
    vec![
        json!({"type": "PHASE_CHANGE", "data": {
            "phase": "Question", "questionIndex": 0,
            "question": {"text": "Capital of France?", "category": "Geography",
                          "difficulty": "EASY", "type": "MCQ",
                          "options": ["Paris", "Lyon", "Nice", "Dijon"]}}}),
        json!({"type": "TIMER_UPDATE", "data": {"remaining": 45}}),
        json!({"type": "BUZZER_UPDATE", "data": {"active": true, "team": "Alpha", "time": "3.2s"}}),
    ]
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let (config, _inbound) = spawn_backend(Feeder::frames(&scenario_frames())).await;
    let client = GameChannelClient::new(config);
    let mut handle = client.connect(3).await;
    assert_eq!(handle.connection_state().await, ConnectionState::Open);
    assert_eq!(handle.quiz_id(), 3);

    let state = wait_for_state(&handle, |s| s.buzzer.active).await;
    assert_eq!(state.phase.phase, Phase::Question);
    assert_eq!(state.phase.question_index, Some(0));
    assert_eq!(
        state.phase.question.as_ref().map(|q| q.text.as_str()),
        Some("Capital of France?")
    );
    assert_eq!(state.timer.remaining, 45);
    assert_eq!(state.buzzer.holder.as_deref(), Some("Alpha"));
    assert_eq!(state.buzzer.response_time.as_deref(), Some("3.2s"));

    handle.close().await;
}

#[tokio::test]
async fn test_observers_fire_per_slice() {
    let mut feeder = Feeder::frames(&scenario_frames());
    feeder.wait_for_inbound = true;
    let (config, _inbound) = spawn_backend(feeder).await;

    let client = GameChannelClient::new(config);
    let mut handle = client.connect(3).await;

    let phase_hits = Arc::new(AtomicUsize::new(0));
    let timer_hits = Arc::new(AtomicUsize::new(0));
    let buzzer_hits = Arc::new(AtomicUsize::new(0));
    let score_hits = Arc::new(AtomicUsize::new(0));

    {
        let hits = Arc::clone(&phase_hits);
        handle
            .on_phase_change(move |phase| {
                assert_eq!(phase.phase, Phase::Question);
                hits.fetch_add(1, Ordering::SeqCst);
            })
            .await;
    }
    {
        let hits = Arc::clone(&timer_hits);
        handle
            .on_timer_update(move |timer| {
                assert_eq!(timer.remaining, 45);
                hits.fetch_add(1, Ordering::SeqCst);
            })
            .await;
    }
    {
        let hits = Arc::clone(&buzzer_hits);
        handle
            .on_buzzer_update(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
            .await;
    }
    {
        let hits = Arc::clone(&score_hits);
        handle
            .on_score_update(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
            .await;
    }

    // Unblock the feeder now that the observers are in place.
    assert_eq!(
        handle
            .send(OutboundIntent::Buzz {
                team_id: 1,
                team_name: "Alpha".into(),
            })
            .await,
        SendOutcome::Sent
    );

    wait_for_state(&handle, |s| s.buzzer.active).await;
    assert_eq!(phase_hits.load(Ordering::SeqCst), 1);
    assert_eq!(timer_hits.load(Ordering::SeqCst), 1);
    assert_eq!(buzzer_hits.load(Ordering::SeqCst), 1);
    // No SCORE_UPDATE was fed; that slice's observers stay silent.
    assert_eq!(score_hits.load(Ordering::SeqCst), 0);

    handle.close().await;
}

#[tokio::test]
async fn test_independent_handles_reach_identical_state() {
    let (config, _inbound) = spawn_backend(Feeder::frames(&scenario_frames())).await;
    let client = GameChannelClient::new(config);

    let mut first = client.connect(3).await;
    let mut second = client.connect(3).await;
    assert_ne!(first.connection_id(), second.connection_id());

    let state_a = wait_for_state(&first, |s| s.buzzer.active).await;
    let state_b = wait_for_state(&second, |s| s.buzzer.active).await;
    assert_eq!(state_a, state_b);

    // Closing one handle leaves the other untouched.
    first.close().await;
    assert_eq!(second.connection_state().await, ConnectionState::Open);
    assert_eq!(second.snapshot().await, state_b);

    second.close().await;
}

#[tokio::test]
async fn test_send_on_failed_connection_is_dropped() {
    // Grab a port that nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let config = ClientConfig::new("http://unused.invalid/api", format!("ws://{}", addr));
    let mut handle = GameChannelClient::new(config).connect(3).await;

    assert_eq!(handle.connection_state().await, ConnectionState::Failed);
    assert!(handle.status().await.starts_with("Connection error"));

    let outcome = handle
        .send(OutboundIntent::SubmitAnswer {
            answer: "Paris".into(),
            team_id: 7,
            team_name: "Alpha".into(),
        })
        .await;
    assert_eq!(outcome, SendOutcome::Dropped);

    // A dropped intent leaves every slice untouched.
    assert_eq!(handle.snapshot().await, GameState::default());

    handle.close().await;
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let (config, _inbound) = spawn_backend(Feeder::frames(&[])).await;
    let mut handle = GameChannelClient::new(config).connect(3).await;
    assert_eq!(handle.connection_state().await, ConnectionState::Open);

    handle.close().await;
    assert_eq!(handle.connection_state().await, ConnectionState::Closed);

    handle.close().await;
    assert_eq!(handle.connection_state().await, ConnectionState::Closed);

    // And a closed channel drops intents rather than queueing them.
    assert_eq!(
        handle.send(OutboundIntent::RevealAnswer).await,
        SendOutcome::Dropped
    );
}

#[tokio::test]
async fn test_submit_answer_produces_exact_frame() {
    let mut feeder = Feeder::frames(&[]);
    feeder.wait_for_inbound = true;
    let (config, mut inbound) = spawn_backend(feeder).await;

    let mut handle = GameChannelClient::new(config).connect(3).await;
    assert_eq!(
        handle
            .send(OutboundIntent::SubmitAnswer {
                answer: "Paris".into(),
                team_id: 7,
                team_name: "Alpha".into(),
            })
            .await,
        SendOutcome::Sent
    );

    let frame = tokio::time::timeout(Duration::from_secs(5), inbound.recv())
        .await
        .expect("no frame within timeout")
        .expect("backend hung up");
    let value: Value = serde_json::from_str(&frame).unwrap();
    assert_eq!(
        value,
        json!({
            "type": "SUBMIT_ANSWER",
            "data": {"answer": "Paris", "team_id": 7, "team_name": "Alpha"}
        })
    );

    // Exactly one frame went out.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(inbound.try_recv().is_err());

    handle.close().await;
}

#[tokio::test]
async fn test_bad_frames_are_dropped_without_killing_the_reader() {
    let mut feeder = Feeder::frames(&[
        // Valid JSON, unknown type.
        json!({"type": "ADMIN_ANSWER_REVEAL", "data": {"answer": "Paris"}}),
        // Valid frame after the garbage.
        json!({"type": "TIMER_UPDATE", "data": {"remaining": 45}}),
    ]);
    // Not JSON at all; goes out ahead of the rest.
    feeder.frames.insert(0, "{not json".to_string());
    let (config, _inbound) = spawn_backend(feeder).await;

    let mut handle = GameChannelClient::new(config).connect(3).await;
    let state = wait_for_state(&handle, |s| s.timer.remaining == 45).await;

    // Only the timer slice moved; the garbage changed nothing.
    assert_eq!(state.phase, GameState::default().phase);
    assert_eq!(state.scores, GameState::default().scores);
    assert_eq!(state.buzzer, GameState::default().buzzer);
    assert_eq!(handle.connection_state().await, ConnectionState::Open);

    handle.close().await;
}

#[tokio::test]
async fn test_server_close_lands_in_failed_with_status() {
    let mut feeder = Feeder::frames(&[json!({"type": "TIMER_UPDATE", "data": {"remaining": 10}})]);
    feeder.close_after = true;
    let (config, _inbound) = spawn_backend(feeder).await;

    let mut handle = GameChannelClient::new(config).connect(3).await;
    wait_for_connection(&handle, ConnectionState::Failed).await;
    assert_eq!(handle.status().await, "Connection closed by server");

    // State received before the close survives for display.
    assert_eq!(handle.snapshot().await.timer.remaining, 10);

    // Closing after a failure still ends in Closed.
    handle.close().await;
    assert_eq!(handle.connection_state().await, ConnectionState::Closed);
}
