//! Core module - pure simulation logic with no external dependencies
//!
//! This module contains the board occupancy model, the per-object state
//! machine, the command decoder, and the turn engine. It has zero
//! dependencies on networking, rendering, or I/O.

pub mod board;
pub mod command;
pub mod config;
pub mod error;
pub mod object;
pub mod orientation;
pub mod turn;

pub use board::Board;
pub use command::{decode, Command, Decoded};
pub use config::PuzzleConfig;
pub use error::{ActionError, ConfigError};
pub use object::PuzzleObject;
pub use orientation::FlipGraph;
pub use turn::TurnEngine;
