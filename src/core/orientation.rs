//! Orientation transition graph for the flip action.
//!
//! Objects rest in one of twelve discrete orientations. Flipping an object
//! over one of its four edges walks a fixed transition graph; the canonical
//! table below matches the poses of the physical reference solid. The graph
//! must be total: a missing (orientation, direction) pair is a configuration
//! defect rejected at load time, never a runtime condition to skip silently.

use std::collections::BTreeMap;

use crate::core::error::{ActionError, ConfigError};
use crate::types::{Direction, ORIENTATION_COUNT};

/// Successor orientations per (orientation - 1), indexed by
/// [`Direction::index`]: up, down, left, right.
const CANONICAL_TRANSITIONS: [[u8; 4]; 12] = [
    [9, 5, 8, 12],  // 1
    [5, 9, 6, 10],  // 2
    [7, 11, 10, 6], // 3
    [11, 7, 12, 8], // 4
    [1, 2, 7, 9],   // 5
    [8, 10, 3, 2],  // 6
    [4, 3, 11, 5],  // 7
    [12, 6, 4, 1],  // 8
    [2, 1, 5, 11],  // 9
    [6, 12, 2, 3],  // 10
    [3, 4, 9, 7],   // 11
    [10, 8, 1, 4],  // 12
];

/// Total mapping (orientation, flip direction) -> orientation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlipGraph {
    table: [[u8; 4]; 12],
}

impl FlipGraph {
    /// The built-in transition table.
    pub fn canonical() -> Self {
        Self {
            table: CANONICAL_TRANSITIONS,
        }
    }

    /// Build a graph from a configuration override.
    ///
    /// Keys are orientations as strings ("1".."12"), values map direction
    /// names to successor orientations. The map must cover every pair.
    pub fn from_config(
        entries: &BTreeMap<String, BTreeMap<String, u8>>,
    ) -> Result<Self, ConfigError> {
        let mut table = [[0u8; 4]; 12];
        for orientation in 1..=ORIENTATION_COUNT {
            let row = entries.get(&orientation.to_string()).ok_or_else(|| {
                ConfigError::IncompleteFlipGraph {
                    orientation,
                    direction: "any".to_string(),
                }
            })?;
            for direction in [
                Direction::Up,
                Direction::Down,
                Direction::Left,
                Direction::Right,
            ] {
                let target = *row.get(direction.as_str()).ok_or_else(|| {
                    ConfigError::IncompleteFlipGraph {
                        orientation,
                        direction: direction.as_str().to_string(),
                    }
                })?;
                if target < 1 || target > ORIENTATION_COUNT {
                    return Err(ConfigError::InvalidFlipTarget {
                        orientation,
                        direction: direction.as_str().to_string(),
                        target,
                    });
                }
                table[(orientation - 1) as usize][direction.index()] = target;
            }
        }
        Ok(Self { table })
    }

    /// Successor orientation after flipping.
    ///
    /// Validated graphs are total, so for 1..=12 this cannot fail; the error
    /// branch covers orientations that never entered through validation.
    pub fn next(&self, orientation: u8, direction: Direction) -> Result<u8, ActionError> {
        if orientation < 1 || orientation > ORIENTATION_COUNT {
            return Err(ActionError::NoTransition {
                orientation,
                direction: direction.as_str(),
            });
        }
        Ok(self.table[(orientation - 1) as usize][direction.index()])
    }
}

impl Default for FlipGraph {
    fn default() -> Self {
        Self::canonical()
    }
}
