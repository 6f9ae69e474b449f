//! PuzzleObject - the per-object state machine
//!
//! One manipulable entity: a body with a color (or geometry number for
//! tiles), a cell position, one of twelve orientations, and an on/off-board
//! flag. Objects are constructed showing their goal state and move to their
//! start state when the `start` command is processed; until then every other
//! mutating action is rejected with `NotInitialized`.
//!
//! All occupancy changes go through the [`Board`] passed into each method;
//! the object never touches occupancy behind the board's back.

use crate::core::board::Board;
use crate::core::error::ActionError;
use crate::core::orientation::FlipGraph;
use crate::types::{Diagonal, Direction, ObjectId};

/// Position, orientation, and presence at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectState {
    pub x: i32,
    pub z: i32,
    pub orientation: u8,
    pub on_board: bool,
}

/// One manipulable entity and its start/goal targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PuzzleObject {
    id: ObjectId,
    /// Lowercase label the id was derived from, e.g. "red cube" or "tile 4".
    label: String,
    body: String,
    color: String,
    geom_nr: Option<String>,

    state: ObjectState,
    start: ObjectState,
    goal: ObjectState,
    initialized: bool,
}

impl PuzzleObject {
    /// Construct an object from configuration.
    ///
    /// The object initially displays its goal state (the scene shows the
    /// solved puzzle until `start` arrives); the caller registers goal
    /// occupancy via [`PuzzleObject::register_occupancy`].
    pub fn new(
        label: String,
        body: String,
        color: String,
        geom_nr: Option<String>,
        start: ObjectState,
        goal: ObjectState,
    ) -> Self {
        Self {
            id: ObjectId::from_label(&label),
            label,
            body,
            color,
            geom_nr,
            state: goal,
            start,
            goal,
            initialized: false,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn geom_nr(&self) -> Option<&str> {
        self.geom_nr.as_deref()
    }

    pub fn state(&self) -> ObjectState {
        self.state
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Mark this object's current cell on the board, if it is on board.
    pub fn register_occupancy(&self, board: &mut Board) -> Result<(), ActionError> {
        if self.state.on_board {
            board.set_occupant(self.state.x, self.state.z, self.id)?;
        }
        Ok(())
    }

    /// Release this object's occupancy mark, if it is on board.
    ///
    /// First phase of the `start` broadcast: every displayed cell is freed
    /// before any start state is placed, since one object's start cell may
    /// be another object's still-displayed goal cell.
    pub fn clear_occupancy(&self, board: &mut Board) -> Result<(), ActionError> {
        if self.state.on_board {
            board.clear_cell(self.state.x, self.state.z)?;
        }
        Ok(())
    }

    /// Move to the start state and become commandable.
    ///
    /// Second phase of the `start` broadcast. The caller has already freed
    /// every object's displayed cell via [`PuzzleObject::clear_occupancy`].
    pub fn apply_start(&mut self, board: &mut Board) -> Result<(), ActionError> {
        self.state = self.start;
        self.initialized = true;
        if self.state.on_board {
            board.set_occupant(self.state.x, self.state.z, self.id)?;
        }
        Ok(())
    }

    /// One step along an axis. Part of a `move` repeat loop; each step is
    /// checked independently and a failed step leaves the object where the
    /// previous steps put it.
    pub fn step(&mut self, board: &mut Board, direction: Direction) -> Result<(), ActionError> {
        if !self.initialized {
            return Err(ActionError::NotInitialized("move"));
        }
        let (dx, dz) = direction.offset();
        self.relocate(board, self.state.x + dx, self.state.z + dz)
    }

    /// One diagonal step, used by the `rotate` command: the object pivots
    /// around the corner it shares with the destination cell. Legality rules
    /// are the same as for `move`.
    pub fn pivot(&mut self, board: &mut Board, diagonal: Diagonal) -> Result<(), ActionError> {
        if !self.initialized {
            return Err(ActionError::NotInitialized("rotate"));
        }
        let (dx, dz) = diagonal.offset();
        self.relocate(board, self.state.x + dx, self.state.z + dz)
    }

    /// Teleport to an absolute cell (`setpos`), subject to the same bounds
    /// and occupancy rules as movement.
    pub fn set_position(&mut self, board: &mut Board, x: i32, z: i32) -> Result<(), ActionError> {
        if !self.initialized {
            return Err(ActionError::NotInitialized("set the position of an object"));
        }
        self.relocate(board, x, z)
    }

    fn relocate(&mut self, board: &mut Board, x: i32, z: i32) -> Result<(), ActionError> {
        if !self.state.on_board {
            return Err(ActionError::NotPresent);
        }
        if board.is_occupied(x, z)? {
            return Err(ActionError::Occupied);
        }
        board.clear_cell(self.state.x, self.state.z)?;
        self.state.x = x;
        self.state.z = z;
        board.set_occupant(x, z, self.id)?;
        Ok(())
    }

    /// Flip over an edge, following the orientation transition graph.
    pub fn flip(&mut self, graph: &FlipGraph, direction: Direction) -> Result<(), ActionError> {
        if !self.initialized {
            return Err(ActionError::NotInitialized("flip"));
        }
        self.state.orientation = graph.next(self.state.orientation, direction)?;
        Ok(())
    }

    /// Put the object onto or take it off the board (`addremove`).
    pub fn set_on_board(&mut self, board: &mut Board, present: bool) -> Result<(), ActionError> {
        if !self.initialized {
            return Err(ActionError::NotInitialized("add or remove an object"));
        }
        if present {
            if self.state.on_board {
                return Err(ActionError::AlreadyPresent);
            }
            if board.is_occupied(self.state.x, self.state.z)? {
                return Err(ActionError::CellOccupied);
            }
            board.set_occupant(self.state.x, self.state.z, self.id)?;
            self.state.on_board = true;
        } else {
            if !self.state.on_board {
                return Err(ActionError::NotPresent);
            }
            board.clear_cell(self.state.x, self.state.z)?;
            self.state.on_board = false;
        }
        Ok(())
    }

    /// True iff position, orientation, and presence all match the goal.
    /// Pure: never mutates and never touches the board.
    pub fn evaluate_goal(&self) -> bool {
        self.state.x == self.goal.x
            && self.state.z == self.goal.z
            && self.state.orientation == self.goal.orientation
            && self.state.on_board == self.goal.on_board
    }

    /// Status sentence with grid coordinates: `"red cube is at (4,4)"`.
    pub fn grid_status(&self) -> String {
        format!("{} is at ({},{})", self.label, self.state.x, self.state.z)
    }

    /// Status line with a chess-style coordinate: `"e5 red cube"`.
    pub fn chess_status(&self, board: &Board) -> String {
        format!(
            "{} {}",
            board.chess_coordinate(self.state.x, self.state.z),
            self.label
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(start: ObjectState, goal: ObjectState) -> PuzzleObject {
        PuzzleObject::new(
            "red cube".to_string(),
            "cube".to_string(),
            "red".to_string(),
            None,
            start,
            goal,
        )
    }

    fn state(x: i32, z: i32) -> ObjectState {
        ObjectState {
            x,
            z,
            orientation: 1,
            on_board: true,
        }
    }

    #[test]
    fn test_object_shows_goal_state_before_start() {
        let obj = object(state(0, 0), state(3, 3));
        assert_eq!(obj.state().x, 3);
        assert!(!obj.is_initialized());
    }

    #[test]
    fn test_move_before_start_is_rejected() {
        let mut board = Board::new(5, 5);
        let mut obj = object(state(0, 0), state(3, 3));
        obj.register_occupancy(&mut board).unwrap();

        assert_eq!(
            obj.step(&mut board, Direction::Up),
            Err(ActionError::NotInitialized("move"))
        );
        assert_eq!(obj.state(), state(3, 3));
    }

    #[test]
    fn test_apply_start_moves_occupancy() {
        let mut board = Board::new(5, 5);
        let mut obj = object(state(0, 0), state(3, 3));
        obj.register_occupancy(&mut board).unwrap();

        obj.clear_occupancy(&mut board).unwrap();
        obj.apply_start(&mut board).unwrap();
        assert!(obj.is_initialized());
        assert_eq!(obj.state(), state(0, 0));
        assert_eq!(board.is_occupied(0, 0), Ok(true));
        assert_eq!(board.is_occupied(3, 3), Ok(false));
    }

    #[test]
    fn test_step_updates_board_and_stops_at_edges() {
        let mut board = Board::new(2, 2);
        let mut obj = object(state(0, 0), state(1, 1));
        obj.register_occupancy(&mut board).unwrap();
        obj.clear_occupancy(&mut board).unwrap();
        obj.apply_start(&mut board).unwrap();

        obj.step(&mut board, Direction::Right).unwrap();
        assert_eq!(obj.state().x, 1);
        assert_eq!(board.is_occupied(0, 0), Ok(false));
        assert_eq!(board.is_occupied(1, 0), Ok(true));

        assert_eq!(
            obj.step(&mut board, Direction::Right),
            Err(ActionError::OutOfBounds)
        );
        assert_eq!(obj.state().x, 1);
    }

    #[test]
    fn test_step_into_occupied_cell_fails() {
        let mut board = Board::new(3, 1);
        let mut a = object(state(0, 0), state(0, 0));
        let mut b = PuzzleObject::new(
            "blue cube".to_string(),
            "cube".to_string(),
            "blue".to_string(),
            None,
            state(1, 0),
            state(1, 0),
        );
        a.register_occupancy(&mut board).unwrap();
        b.register_occupancy(&mut board).unwrap();
        a.apply_start(&mut board).unwrap();
        b.apply_start(&mut board).unwrap();

        assert_eq!(
            a.step(&mut board, Direction::Right),
            Err(ActionError::Occupied)
        );
        assert_eq!(board.occupant_at(0, 0), Ok(Some(a.id())));
        assert_eq!(board.occupant_at(1, 0), Ok(Some(b.id())));
    }

    #[test]
    fn test_flip_follows_graph() {
        let mut board = Board::new(3, 3);
        let graph = FlipGraph::canonical();
        let mut obj = object(state(0, 0), state(0, 0));
        obj.register_occupancy(&mut board).unwrap();
        obj.apply_start(&mut board).unwrap();

        obj.flip(&graph, Direction::Up).unwrap();
        assert_eq!(obj.state().orientation, 9);
        obj.flip(&graph, Direction::Down).unwrap();
        assert_eq!(obj.state().orientation, 1);
    }

    #[test]
    fn test_add_remove_transitions() {
        let mut board = Board::new(3, 3);
        let mut obj = object(state(1, 1), state(1, 1));
        obj.register_occupancy(&mut board).unwrap();
        obj.apply_start(&mut board).unwrap();

        assert_eq!(
            obj.set_on_board(&mut board, true),
            Err(ActionError::AlreadyPresent)
        );
        obj.set_on_board(&mut board, false).unwrap();
        assert_eq!(board.is_occupied(1, 1), Ok(false));
        assert_eq!(
            obj.set_on_board(&mut board, false),
            Err(ActionError::NotPresent)
        );
        obj.set_on_board(&mut board, true).unwrap();
        assert_eq!(board.is_occupied(1, 1), Ok(true));
    }

    #[test]
    fn test_evaluate_goal_is_pure() {
        let mut board = Board::new(5, 5);
        let mut obj = object(state(0, 0), state(0, 0));
        obj.register_occupancy(&mut board).unwrap();
        obj.apply_start(&mut board).unwrap();

        let first = obj.evaluate_goal();
        let second = obj.evaluate_goal();
        assert!(first);
        assert_eq!(first, second);
        assert_eq!(obj.state(), state(0, 0));
    }

    #[test]
    fn test_status_lines() {
        let board = Board::new(5, 5);
        let obj = object(state(0, 0), state(4, 4));
        assert_eq!(obj.grid_status(), "red cube is at (4,4)");
        assert_eq!(obj.chess_status(&board), "e5 red cube");
    }
}
