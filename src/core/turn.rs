//! TurnEngine - batch command processing over the board
//!
//! One turn is one batch of raw prompts processed strictly in order and
//! answered with exactly one [`AckPacket`]. Per-command failures never abort
//! a batch: each becomes a validity message in the turn log and processing
//! continues with the next command. `reset` is the one exception, it
//! truncates the remainder of the batch after rebuilding the scene.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::board::Board;
use crate::core::command::{decode, Command, TargetRef};
use crate::core::config::{GridLabel, PuzzleConfig};
use crate::core::error::{ActionError, ConfigError};
use crate::core::object::PuzzleObject;
use crate::core::orientation::FlipGraph;
use crate::types::{AddRemove, ObjectId};

/// One log entry: which prompt, which step within it, and how it went.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Position of the prompt within the batch.
    pub command_index: usize,
    /// Step within the prompt (repeat iterations of a `move` each log one).
    pub action_index: usize,
    pub prompt: String,
    pub validity: String,
}

/// The result of one turn, before a frame is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckPacket {
    /// One status line per object, in configuration order.
    pub object_status: Vec<String>,
    pub log: Vec<ActionRecord>,
    /// True iff the batch contained a `done` command.
    pub evaluated: bool,
    pub solved: bool,
}

const LEGAL_MOVE: &str = "was legal move";
const NO_OP: &str = "nothing to do";
const NOT_LEGAL: &str = "not a legal command";
const START_OK: &str = "valid command. start of experiment";
const DONE_OK: &str = "valid command. evaluating the board";
const RESET_OK: &str = "valid command. resetting the board";

/// Owns the board and every object; the single authority over scene state.
pub struct TurnEngine {
    config: PuzzleConfig,
    graph: FlipGraph,
    board: Board,
    objects: Vec<PuzzleObject>,
    index: HashMap<ObjectId, usize>,
    log: Vec<ActionRecord>,
}

impl TurnEngine {
    /// Build the scene from a validated configuration.
    pub fn new(config: PuzzleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let graph = config.flip_graph()?;
        let mut engine = Self {
            graph,
            board: Board::new(config.grid_size, config.grid_size),
            objects: Vec::new(),
            index: HashMap::new(),
            log: Vec::new(),
            config,
        };
        engine.rebuild();
        Ok(engine)
    }

    /// Rebuild board and objects from the original configuration. Scene
    /// construction shows every object at its goal state; validation
    /// guarantees goal cells are distinct and in bounds, so re-registering
    /// occupancy cannot conflict.
    pub fn reset(&mut self) {
        self.rebuild();
        self.log.clear();
    }

    fn rebuild(&mut self) {
        self.board = Board::new(self.config.grid_size, self.config.grid_size);
        self.objects = self.config.build_objects();
        self.index = self
            .objects
            .iter()
            .enumerate()
            .map(|(i, o)| (o.id(), i))
            .collect();
        for object in &self.objects {
            let _ = object.register_occupancy(&mut self.board);
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn objects(&self) -> &[PuzzleObject] {
        &self.objects
    }

    /// Process one batch of raw prompts and build the acknowledgment.
    ///
    /// The log is cleared unconditionally on the way out; every call starts
    /// from an empty log regardless of how the previous turn ended.
    pub fn process_turn(&mut self, batch: &[String]) -> AckPacket {
        let mut evaluated = false;
        let mut solved = false;

        for (command_index, raw) in batch.iter().enumerate() {
            let decoded = decode(raw);
            if let Some(warning) = decoded.warning {
                self.record(command_index, 0, raw, warning);
            }
            match decoded.command {
                Command::Start => {
                    // two phases: free every displayed cell before placing
                    // any start state, since one object's start cell may be
                    // another object's still-displayed goal cell
                    for object in &self.objects {
                        let _ = object.clear_occupancy(&mut self.board);
                    }
                    for object in &mut self.objects {
                        let _ = object.apply_start(&mut self.board);
                    }
                    self.record(command_index, 0, raw, START_OK.to_string());
                }
                Command::Done => {
                    evaluated = true;
                    // uninitialized objects still display their goal state,
                    // so a board that never started does not count as solved
                    solved = self
                        .objects
                        .iter()
                        .fold(true, |acc, o| acc && o.is_initialized() && o.evaluate_goal());
                    self.record(command_index, 0, raw, DONE_OK.to_string());
                }
                Command::Reset => {
                    self.rebuild();
                    self.log.clear();
                    self.record(command_index, 0, raw, RESET_OK.to_string());
                    break;
                }
                Command::Move {
                    target,
                    direction,
                    repeat,
                } => {
                    let Some(slot) = self.lookup(command_index, raw, &target) else {
                        continue;
                    };
                    if repeat == 0 {
                        self.record(command_index, 0, raw, NO_OP.to_string());
                        continue;
                    }
                    for action_index in 0..repeat as usize {
                        let outcome =
                            self.objects[slot].step(&mut self.board, direction);
                        let stop = outcome.is_err();
                        self.record_outcome(command_index, action_index, raw, outcome);
                        if stop {
                            break;
                        }
                    }
                }
                Command::Rotate { target, direction } => {
                    let Some(slot) = self.lookup(command_index, raw, &target) else {
                        continue;
                    };
                    let outcome = self.objects[slot].pivot(&mut self.board, direction);
                    self.record_outcome(command_index, 0, raw, outcome);
                }
                Command::Flip { target, direction } => {
                    let Some(slot) = self.lookup(command_index, raw, &target) else {
                        continue;
                    };
                    let outcome = self.objects[slot].flip(&self.graph, direction);
                    self.record_outcome(command_index, 0, raw, outcome);
                }
                Command::AddRemove { target, action } => {
                    let Some(slot) = self.lookup(command_index, raw, &target) else {
                        continue;
                    };
                    let present = action == AddRemove::Add;
                    let outcome = self.objects[slot].set_on_board(&mut self.board, present);
                    self.record_outcome(command_index, 0, raw, outcome);
                }
                Command::SetPosition { target, x, z } => {
                    let Some(slot) = self.lookup(command_index, raw, &target) else {
                        continue;
                    };
                    let outcome = self.objects[slot].set_position(&mut self.board, x, z);
                    self.record_outcome(command_index, 0, raw, outcome);
                }
                Command::Unrecognized(_) => {
                    self.record(command_index, 0, raw, NOT_LEGAL.to_string());
                }
            }
        }

        AckPacket {
            object_status: self.object_status(),
            log: std::mem::take(&mut self.log),
            evaluated,
            solved,
        }
    }

    /// One status line per object, in configuration order.
    pub fn object_status(&self) -> Vec<String> {
        self.objects
            .iter()
            .map(|object| match self.config.grid_label {
                GridLabel::Edge => object.chess_status(&self.board),
                GridLabel::Grid => object.grid_status(),
            })
            .collect()
    }

    fn lookup(&mut self, command_index: usize, raw: &str, target: &TargetRef) -> Option<usize> {
        match self.index.get(&target.id) {
            Some(&slot) => Some(slot),
            None => {
                self.record(
                    command_index,
                    0,
                    raw,
                    format!("{} is not a valid object", target.label),
                );
                None
            }
        }
    }

    fn record_outcome(
        &mut self,
        command_index: usize,
        action_index: usize,
        raw: &str,
        outcome: Result<(), ActionError>,
    ) {
        let validity = match outcome {
            Ok(()) => LEGAL_MOVE.to_string(),
            Err(e) => e.to_string(),
        };
        self.record(command_index, action_index, raw, validity);
    }

    fn record(&mut self, command_index: usize, action_index: usize, raw: &str, validity: String) {
        self.log.push(ActionRecord {
            command_index,
            action_index,
            prompt: raw.to_string(),
            validity,
        });
    }

    /// Check that occupancy and object positions agree; test support.
    #[cfg(test)]
    fn occupancy_consistent(&self) -> bool {
        for (x, z, id) in self.board.occupied_cells() {
            let Some(&slot) = self.index.get(&id) else {
                return false;
            };
            let state = self.objects[slot].state();
            if !state.on_board || state.x != x || state.z != z {
                return false;
            }
        }
        self.objects.iter().all(|o| {
            !o.state().on_board
                || self.board.occupant_at(o.state().x, o.state().z) == Ok(Some(o.id()))
        })
    }
}
