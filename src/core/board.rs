//! Board module - the grid occupancy model
//!
//! The board is a width x height grid where each cell is either empty or
//! holds exactly one object id. It is the single source of truth for
//! collision checks: no other component mutates occupancy directly.
//! Coordinates: (x, z) with x in 0..width (left to right) and z in
//! 0..height (near to far).

use crate::core::error::ActionError;
use crate::types::ObjectId;

/// The puzzle board - a flat occupancy grid in row-major order (z * width + x)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: u32,
    height: u32,
    cells: Vec<Option<ObjectId>>,
}

impl Board {
    /// Create a new empty board. Dimensions must already be validated.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; width as usize * height as usize],
        }
    }

    fn index(&self, x: i32, z: i32) -> Option<usize> {
        if x < 0 || x >= self.width as i32 || z < 0 || z >= self.height as i32 {
            return None;
        }
        Some((z as usize) * (self.width as usize) + (x as usize))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// True when (x, z) lies inside the board.
    pub fn in_bounds(&self, x: i32, z: i32) -> bool {
        self.index(x, z).is_some()
    }

    /// Whether the cell holds an object. Out-of-bounds coordinates are an
    /// error, not `false`: callers must distinguish collision from the edge.
    pub fn is_occupied(&self, x: i32, z: i32) -> Result<bool, ActionError> {
        self.index(x, z)
            .map(|idx| self.cells[idx].is_some())
            .ok_or(ActionError::OutOfBounds)
    }

    /// The occupant of the cell, if any.
    pub fn occupant_at(&self, x: i32, z: i32) -> Result<Option<ObjectId>, ActionError> {
        self.index(x, z)
            .map(|idx| self.cells[idx])
            .ok_or(ActionError::OutOfBounds)
    }

    /// Place an occupant. The caller is responsible for having checked the
    /// cell first; overwriting a different occupant is a logic error.
    pub fn set_occupant(&mut self, x: i32, z: i32, id: ObjectId) -> Result<(), ActionError> {
        let idx = self.index(x, z).ok_or(ActionError::OutOfBounds)?;
        debug_assert!(
            self.cells[idx].is_none() || self.cells[idx] == Some(id),
            "cell ({x},{z}) already occupied by a different object"
        );
        self.cells[idx] = Some(id);
        Ok(())
    }

    /// Empty a cell.
    pub fn clear_cell(&mut self, x: i32, z: i32) -> Result<(), ActionError> {
        let idx = self.index(x, z).ok_or(ActionError::OutOfBounds)?;
        self.cells[idx] = None;
        Ok(())
    }

    /// Chess-style coordinate label for a cell: columns a.., rows 1..
    ///
    /// Used by the edge-labelled status format, e.g. `(4,4)` on a 5x5 board
    /// is `e5`. Columns past `z` continue spreadsheet-style (`aa`, `ab`, ..)
    /// so labels stay unique on wide boards.
    pub fn chess_coordinate(&self, x: i32, z: i32) -> String {
        debug_assert!(self.in_bounds(x, z));
        let mut col = String::new();
        let mut n = x;
        loop {
            col.insert(0, (b'a' + (n % 26) as u8) as char);
            n = n / 26 - 1;
            if n < 0 {
                break;
            }
        }
        format!("{}{}", col, z + 1)
    }

    /// Occupied cells with their occupants, for snapshots and invariants.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (i32, i32, ObjectId)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(idx, cell)| {
            cell.map(|id| {
                let x = (idx % self.width as usize) as i32;
                let z = (idx / self.width as usize) as i32;
                (x, z, id)
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(label: &str) -> ObjectId {
        ObjectId::from_label(label)
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new(4, 3);
        for z in 0..3 {
            for x in 0..4 {
                assert_eq!(board.is_occupied(x, z), Ok(false));
            }
        }
    }

    #[test]
    fn test_out_of_bounds_is_an_error() {
        let board = Board::new(4, 3);
        assert_eq!(board.is_occupied(-1, 0), Err(ActionError::OutOfBounds));
        assert_eq!(board.is_occupied(4, 0), Err(ActionError::OutOfBounds));
        assert_eq!(board.is_occupied(0, 3), Err(ActionError::OutOfBounds));
        assert_eq!(board.occupant_at(0, -1), Err(ActionError::OutOfBounds));
    }

    #[test]
    fn test_set_and_clear_occupant() {
        let mut board = Board::new(5, 5);
        board.set_occupant(2, 3, id("red cube")).unwrap();
        assert_eq!(board.is_occupied(2, 3), Ok(true));
        assert_eq!(board.occupant_at(2, 3), Ok(Some(id("red cube"))));

        board.clear_cell(2, 3).unwrap();
        assert_eq!(board.is_occupied(2, 3), Ok(false));
    }

    #[test]
    fn test_chess_coordinates() {
        let board = Board::new(8, 8);
        assert_eq!(board.chess_coordinate(0, 0), "a1");
        assert_eq!(board.chess_coordinate(4, 4), "e5");
        assert_eq!(board.chess_coordinate(7, 0), "h1");
    }

    #[test]
    fn test_chess_columns_stay_unique_past_z() {
        let board = Board::new(60, 1);
        assert_eq!(board.chess_coordinate(25, 0), "z1");
        assert_eq!(board.chess_coordinate(26, 0), "aa1");
        assert_eq!(board.chess_coordinate(27, 0), "ab1");
        assert_eq!(board.chess_coordinate(51, 0), "az1");
        assert_eq!(board.chess_coordinate(52, 0), "ba1");

        let labels: std::collections::HashSet<_> =
            (0..60).map(|x| board.chess_coordinate(x, 0)).collect();
        assert_eq!(labels.len(), 60);
    }

    #[test]
    fn test_occupied_cells_iteration() {
        let mut board = Board::new(3, 3);
        board.set_occupant(0, 0, id("red cube")).unwrap();
        board.set_occupant(2, 1, id("blue sphere")).unwrap();

        let cells: Vec<_> = board.occupied_cells().collect();
        assert_eq!(cells.len(), 2);
        assert!(cells.contains(&(0, 0, id("red cube"))));
        assert!(cells.contains(&(2, 1, id("blue sphere"))));
    }
}
