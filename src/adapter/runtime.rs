//! Simulation runtime - the single authority over scene state
//!
//! One task owns the [`TurnEngine`] and the capture bridge. Transport tasks
//! send it [`SimRequest`]s over a bounded channel and await the oneshot
//! reply; because a client does not read the next batch until the reply
//! arrives, at most one batch is ever in flight per connection and turns run
//! strictly one at a time, in arrival order.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};

use crate::capture::{CaptureBridge, SceneSnapshot};
use crate::core::config::PuzzleConfig;
use crate::core::turn::{AckPacket, TurnEngine};

/// Request into the simulation task.
#[derive(Debug)]
pub enum SimRequest {
    /// Process one batch of raw prompts and answer with the ack and frame.
    Turn {
        batch: Vec<String>,
        reply: oneshot::Sender<TurnReply>,
    },
    /// Render the current scene without processing any commands.
    Frame { reply: oneshot::Sender<TurnReply> },
    /// Replace the running puzzle with a new configuration.
    Setup {
        config: Box<PuzzleConfig>,
        reply: oneshot::Sender<SetupReply>,
    },
}

/// Reply for a processed turn. `frame` is None exactly when the capture
/// bridge did not respond within the timeout.
#[derive(Debug)]
pub struct TurnReply {
    pub ack: AckPacket,
    pub frame: Option<Vec<u8>>,
    pub capture_timed_out: bool,
}

#[derive(Debug)]
pub struct SetupReply {
    pub result: Result<(), String>,
}

/// Run the simulation authority until every request sender is dropped.
///
/// The await on the capture receiver is the only suspend point in turn
/// processing; it is bounded by `capture_timeout` so a stalled renderer
/// cannot wedge the transport. A solved turn resets the scene after the
/// reply is handed off, so the next turn starts fresh.
pub async fn run_simulation(
    mut engine: TurnEngine,
    capture: Arc<dyn CaptureBridge>,
    mut rx: mpsc::Receiver<SimRequest>,
    capture_timeout: Duration,
) {
    while let Some(request) = rx.recv().await {
        match request {
            SimRequest::Turn { batch, reply } => {
                let ack = engine.process_turn(&batch);
                let solved = ack.solved;
                let (frame, timed_out) =
                    capture_frame(&engine, capture.as_ref(), capture_timeout).await;
                let _ = reply.send(TurnReply {
                    ack,
                    frame,
                    capture_timed_out: timed_out,
                });
                if solved {
                    println!("[Sim] puzzle solved, resetting scene");
                    engine.reset();
                }
            }
            SimRequest::Frame { reply } => {
                let ack = AckPacket {
                    object_status: engine.object_status(),
                    log: Vec::new(),
                    evaluated: false,
                    solved: false,
                };
                let (frame, timed_out) =
                    capture_frame(&engine, capture.as_ref(), capture_timeout).await;
                let _ = reply.send(TurnReply {
                    ack,
                    frame,
                    capture_timed_out: timed_out,
                });
            }
            SimRequest::Setup { config, reply } => {
                let result = match TurnEngine::new(*config) {
                    Ok(next) => {
                        engine = next;
                        println!("[Sim] new configuration loaded");
                        Ok(())
                    }
                    Err(e) => Err(e.to_string()),
                };
                let _ = reply.send(SetupReply { result });
            }
        }
    }
}

async fn capture_frame(
    engine: &TurnEngine,
    capture: &dyn CaptureBridge,
    timeout: Duration,
) -> (Option<Vec<u8>>, bool) {
    let receiver = capture.request_frame(SceneSnapshot::of(engine));
    match tokio::time::timeout(timeout, receiver).await {
        Ok(Ok(frame)) => (Some(frame), false),
        Ok(Err(_)) => {
            eprintln!("[Sim] capture bridge dropped the frame sender");
            (None, true)
        }
        Err(_) => {
            eprintln!("[Sim] frame capture timed out after {timeout:?}");
            (None, true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{BoardRenderer, StalledCapture};
    use crate::core::config::{ObjectConfig, StateConfig};

    fn config() -> PuzzleConfig {
        PuzzleConfig {
            experiment_id: "test".to_string(),
            experiment_type: String::new(),
            grid_size: 5,
            grid_label: Default::default(),
            board_data: vec![ObjectConfig {
                body: "cube".to_string(),
                color: "red".to_string(),
                geom_nr: None,
                start_state: StateConfig {
                    x_coordinate: 0,
                    z_coordinate: 0,
                    orientation: 1,
                    on_board: true,
                },
                goal_state: StateConfig {
                    x_coordinate: 4,
                    z_coordinate: 4,
                    orientation: 1,
                    on_board: true,
                },
            }],
            flip_transitions: None,
        }
    }

    async fn request_turn(tx: &mpsc::Sender<SimRequest>, batch: &[&str]) -> TurnReply {
        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send(SimRequest::Turn {
            batch: batch.iter().map(|s| s.to_string()).collect(),
            reply: reply_tx,
        })
        .await
        .unwrap();
        reply_rx.await.unwrap()
    }

    #[tokio::test]
    async fn test_turn_reply_carries_frame() {
        let engine = TurnEngine::new(config()).unwrap();
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(run_simulation(
            engine,
            Arc::new(BoardRenderer),
            rx,
            Duration::from_secs(1),
        ));

        let reply = request_turn(&tx, &["start"]).await;
        assert!(!reply.capture_timed_out);
        assert!(reply.frame.unwrap().starts_with(b"P6\n"));
        assert_eq!(reply.ack.log.len(), 1);
    }

    #[tokio::test]
    async fn test_capture_timeout_is_reported() {
        let engine = TurnEngine::new(config()).unwrap();
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(run_simulation(
            engine,
            Arc::new(StalledCapture::new()),
            rx,
            Duration::from_millis(20),
        ));

        let reply = request_turn(&tx, &["start"]).await;
        assert!(reply.capture_timed_out);
        assert!(reply.frame.is_none());
        // the turn itself still processed
        assert_eq!(reply.ack.log.len(), 1);
    }

    #[tokio::test]
    async fn test_solved_turn_resets_for_next_turn() {
        let engine = TurnEngine::new(config()).unwrap();
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(run_simulation(
            engine,
            Arc::new(BoardRenderer),
            rx,
            Duration::from_secs(1),
        ));

        let solved = request_turn(
            &tx,
            &["start", "move red cube right 4", "move red cube up 4", "done"],
        )
        .await;
        assert!(solved.ack.solved);

        // scene was reset: the object shows its goal state, uninitialized,
        // so a bare move is rejected again
        let next = request_turn(&tx, &["move red cube left"]).await;
        assert_eq!(
            next.ack.log[0].validity,
            "you can not move before start action"
        );
        assert_eq!(next.ack.object_status, vec!["red cube is at (4,4)".to_string()]);
    }

    #[tokio::test]
    async fn test_setup_swaps_configuration() {
        let engine = TurnEngine::new(config()).unwrap();
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(run_simulation(
            engine,
            Arc::new(BoardRenderer),
            rx,
            Duration::from_secs(1),
        ));

        let mut next = config();
        next.board_data[0].color = "blue".to_string();
        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send(SimRequest::Setup {
            config: Box::new(next),
            reply: reply_tx,
        })
        .await
        .unwrap();
        assert!(reply_rx.await.unwrap().result.is_ok());

        let reply = request_turn(&tx, &["start"]).await;
        assert_eq!(
            reply.ack.object_status,
            vec!["blue cube is at (0,0)".to_string()]
        );
    }

    #[tokio::test]
    async fn test_setup_rejects_bad_configuration() {
        let engine = TurnEngine::new(config()).unwrap();
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(run_simulation(
            engine,
            Arc::new(BoardRenderer),
            rx,
            Duration::from_secs(1),
        ));

        let mut bad = config();
        bad.grid_size = 0;
        let (reply_tx, reply_rx) = oneshot::channel();
        tx.send(SimRequest::Setup {
            config: Box::new(bad),
            reply: reply_tx,
        })
        .await
        .unwrap();
        assert!(reply_rx.await.unwrap().result.is_err());

        // the previous scene is still running
        let reply = request_turn(&tx, &["start"]).await;
        assert_eq!(
            reply.ack.object_status,
            vec!["red cube is at (0,0)".to_string()]
        );
    }
}
