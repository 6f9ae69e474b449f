//! Error taxonomy for the simulation.
//!
//! Per-command failures are recovered locally: they become validity messages
//! in the turn log and never abort a batch. Configuration errors are fatal
//! at load time, before any turn is accepted.

use thiserror::Error;

use crate::types::ObjectId;

/// Failure of a single action against the board.
///
/// The `Display` strings are the validity messages seen by the remote agent,
/// so they are phrased for humans rather than for programs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("you can not {0} before start action")]
    NotInitialized(&'static str),

    #[error("destination out of bounds")]
    OutOfBounds,

    #[error("destination occupied")]
    Occupied,

    #[error("invalid action since object position is occupied")]
    CellOccupied,

    #[error("invalid action since object already exists on the board")]
    AlreadyPresent,

    #[error("invalid action since object does not exist on the board")]
    NotPresent,

    #[error("no flip transition from orientation {orientation} going {direction}")]
    NoTransition { orientation: u8, direction: &'static str },
}

/// Fatal configuration defect detected while loading a puzzle.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("grid size must be positive, got {0}")]
    DegenerateBoard(i64),

    #[error("grid size {size} exceeds the supported maximum of {max}")]
    BoardTooLarge { size: u32, max: u32 },

    #[error("object '{label}' {which} position ({x},{z}) is outside the {size}x{size} board")]
    PositionOutOfBounds {
        label: String,
        which: &'static str,
        x: i32,
        z: i32,
        size: u32,
    },

    #[error("object '{label}' {which} orientation {orientation} is not in 1..=12")]
    OrientationOutOfRange {
        label: String,
        which: &'static str,
        orientation: u8,
    },

    #[error("objects '{first}' and '{second}' derive the same id {id}")]
    DuplicateId {
        first: String,
        second: String,
        id: ObjectId,
    },

    #[error("objects '{first}' and '{second}' share {which} cell ({x},{z})")]
    DuplicateCell {
        first: String,
        second: String,
        which: &'static str,
        x: i32,
        z: i32,
    },

    #[error("flip transition graph is missing an entry for orientation {orientation} going {direction}")]
    IncompleteFlipGraph { orientation: u8, direction: String },

    #[error("flip transition for orientation {orientation} going {direction} leads to invalid orientation {target}")]
    InvalidFlipTarget {
        orientation: u8,
        direction: String,
        target: u8,
    },

    #[error("could not parse puzzle configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}
