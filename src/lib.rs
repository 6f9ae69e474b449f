//! Remotely controlled grid puzzle simulation.
//!
//! An external agent drives a board of manipulable objects over a socket:
//! each inbound batch of text commands is decoded, applied to the board in
//! order, and answered with exactly one acknowledgment packet carrying the
//! per-object status, the turn's validity log, a solved flag, and a rendered
//! frame of the scene.
//!
//! Module layout:
//!
//! - [`core`]: pure simulation logic (board, objects, decoder, turn engine)
//! - [`capture`]: asynchronous frame capture bridge + headless renderer
//! - [`adapter`]: wire protocol and TCP transport

pub mod adapter;
pub mod capture;
pub mod core;
pub mod types;

pub use crate::core::board::Board;
pub use crate::core::command::{decode, Command, Decoded};
pub use crate::core::config::{GridLabel, ObjectConfig, PuzzleConfig, StateConfig};
pub use crate::core::error::{ActionError, ConfigError};
pub use crate::core::object::PuzzleObject;
pub use crate::core::orientation::FlipGraph;
pub use crate::core::turn::{AckPacket, ActionRecord, TurnEngine};
