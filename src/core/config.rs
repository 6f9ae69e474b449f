//! Puzzle configuration - the data model a scene is built from
//!
//! Configurations arrive as JSON (from a file at startup or inside a Setup
//! packet) and are validated before the first turn: a degenerate board, an
//! out-of-range state, a partial flip graph, or colliding object ids must
//! fail loudly at load time rather than corrupt a session later.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::core::error::ConfigError;
use crate::core::object::{ObjectState, PuzzleObject};
use crate::core::orientation::FlipGraph;
use crate::types::{ObjectId, ORIENTATION_COUNT};

/// Largest accepted board edge. Configurations arrive over the network, so
/// the bound keeps cell and frame buffer sizes sane; real scenes use single
/// digit grids.
pub const MAX_GRID_SIZE: u32 = 64;

/// Which coordinate style status lines use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridLabel {
    /// `"red cube is at (4,4)"`
    #[default]
    Grid,
    /// `"e5 red cube"` (board edges carry chess-style labels)
    Edge,
}

/// One object's position, orientation, and presence in a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateConfig {
    pub x_coordinate: i32,
    pub z_coordinate: i32,
    pub orientation: u8,
    pub on_board: bool,
}

impl From<StateConfig> for ObjectState {
    fn from(s: StateConfig) -> Self {
        ObjectState {
            x: s.x_coordinate,
            z: s.z_coordinate,
            orientation: s.orientation,
            on_board: s.on_board,
        }
    }
}

/// One manipulable object in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectConfig {
    pub body: String,
    pub color: String,
    /// Distinguishes tiles that share body and color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geom_nr: Option<String>,
    pub start_state: StateConfig,
    pub goal_state: StateConfig,
}

impl ObjectConfig {
    /// The label object ids derive from: `"<color> <body>"`, or
    /// `"<body> <geom_nr>"` for tiles.
    pub fn label(&self) -> String {
        match (self.body.to_lowercase().as_str(), &self.geom_nr) {
            ("tile", Some(nr)) => format!("tile {}", nr.to_lowercase()),
            _ => format!("{} {}", self.color.to_lowercase(), self.body.to_lowercase()),
        }
    }
}

/// A complete puzzle configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleConfig {
    pub experiment_id: String,
    #[serde(default)]
    pub experiment_type: String,
    /// Board is grid_size x grid_size.
    pub grid_size: u32,
    #[serde(default)]
    pub grid_label: GridLabel,
    pub board_data: Vec<ObjectConfig>,
    /// Optional override of the built-in flip transition graph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flip_transitions: Option<BTreeMap<String, BTreeMap<String, u8>>>,
}

impl PuzzleConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: PuzzleConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// The flip graph this configuration uses.
    pub fn flip_graph(&self) -> Result<FlipGraph, ConfigError> {
        match &self.flip_transitions {
            Some(entries) => FlipGraph::from_config(entries),
            None => Ok(FlipGraph::canonical()),
        }
    }

    /// Check every load-time invariant. Called before the first turn; a
    /// failure here must prevent the session from accepting any commands.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::DegenerateBoard(self.grid_size as i64));
        }
        if self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::BoardTooLarge {
                size: self.grid_size,
                max: MAX_GRID_SIZE,
            });
        }
        self.flip_graph()?;

        let mut ids: HashMap<ObjectId, String> = HashMap::new();
        let mut start_cells: HashMap<(i32, i32), String> = HashMap::new();
        let mut goal_cells: HashMap<(i32, i32), String> = HashMap::new();

        for object in &self.board_data {
            let label = object.label();
            let id = ObjectId::from_label(&label);
            if let Some(first) = ids.insert(id, label.clone()) {
                return Err(ConfigError::DuplicateId {
                    first,
                    second: label,
                    id,
                });
            }

            for (which, state) in [("start", object.start_state), ("goal", object.goal_state)] {
                if state.on_board && !self.cell_in_bounds(state.x_coordinate, state.z_coordinate) {
                    return Err(ConfigError::PositionOutOfBounds {
                        label: label.clone(),
                        which,
                        x: state.x_coordinate,
                        z: state.z_coordinate,
                        size: self.grid_size,
                    });
                }
                if state.orientation < 1 || state.orientation > ORIENTATION_COUNT {
                    return Err(ConfigError::OrientationOutOfRange {
                        label: label.clone(),
                        which,
                        orientation: state.orientation,
                    });
                }
            }

            for (which, state, cells) in [
                ("start", object.start_state, &mut start_cells),
                ("goal", object.goal_state, &mut goal_cells),
            ] {
                if !state.on_board {
                    continue;
                }
                let cell = (state.x_coordinate, state.z_coordinate);
                if let Some(first) = cells.insert(cell, label.clone()) {
                    return Err(ConfigError::DuplicateCell {
                        first,
                        second: label.clone(),
                        which,
                        x: cell.0,
                        z: cell.1,
                    });
                }
            }
        }
        Ok(())
    }

    fn cell_in_bounds(&self, x: i32, z: i32) -> bool {
        x >= 0 && z >= 0 && (x as u32) < self.grid_size && (z as u32) < self.grid_size
    }

    /// Build the objects this configuration describes, in configuration
    /// order. Assumes `validate` has passed.
    pub fn build_objects(&self) -> Vec<PuzzleObject> {
        self.board_data
            .iter()
            .map(|object| {
                PuzzleObject::new(
                    object.label(),
                    object.body.to_lowercase(),
                    object.color.to_lowercase(),
                    object.geom_nr.clone(),
                    object.start_state.into(),
                    object.goal_state.into(),
                )
            })
            .collect()
    }
}
