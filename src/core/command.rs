//! Command decoder - turns raw prompt strings into typed actions
//!
//! Recognition is substring-based on a fixed keyword priority: the first
//! keyword found anywhere in the prompt decides the command kind, which lets
//! agents embed commands in longer sentences. Decoding never fails; anything
//! that matches no keyword (or is missing required arguments) becomes
//! [`Command::Unrecognized`].

use arrayvec::ArrayVec;

use crate::types::{AddRemove, Diagonal, Direction, ObjectId};

/// Reference to a command's target object: the derived id plus the label it
/// was derived from, kept for "not a valid object" messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRef {
    pub id: ObjectId,
    pub label: String,
}

impl TargetRef {
    fn from_tokens(first: &str, second: &str) -> Self {
        let label = format!("{} {}", first.to_lowercase(), second.to_lowercase());
        Self {
            id: ObjectId::from_label(&label),
            label,
        }
    }
}

/// One decoded action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Move {
        target: TargetRef,
        direction: Direction,
        repeat: u32,
    },
    Rotate {
        target: TargetRef,
        direction: Diagonal,
    },
    Flip {
        target: TargetRef,
        direction: Direction,
    },
    AddRemove {
        target: TargetRef,
        action: AddRemove,
    },
    SetPosition {
        target: TargetRef,
        x: i32,
        z: i32,
    },
    Start,
    Done,
    Reset,
    Unrecognized(String),
}

/// Decoder output: the command plus an optional non-fatal warning (for
/// argument defects the decoder recovered from with a default).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub command: Command,
    pub warning: Option<String>,
}

impl Decoded {
    fn ok(command: Command) -> Self {
        Self {
            command,
            warning: None,
        }
    }

    fn with_warning(command: Command, warning: String) -> Self {
        Self {
            command,
            warning: Some(warning),
        }
    }

    fn unrecognized(raw: &str) -> Self {
        Self {
            command: Command::Unrecognized(raw.to_string()),
            warning: None,
        }
    }
}

/// Keyword priority: the first keyword contained in the prompt wins.
/// "addremove" is checked before "move", which it contains as a substring.
const KEYWORDS: [&str; 8] = [
    "addremove", "move", "start", "done", "reset", "rotate", "flip", "setpos",
];

/// Decode one raw prompt. Tokenizes on whitespace; every input produces some
/// command, possibly `Unrecognized`.
pub fn decode(raw: &str) -> Decoded {
    let lowered = raw.to_lowercase();
    let keyword = KEYWORDS.iter().find(|kw| lowered.contains(**kw));
    // only the first five tokens carry meaning, the rest is free text
    let tokens: ArrayVec<&str, 5> = lowered.split_whitespace().take(5).collect();

    match keyword {
        Some(&"move") => decode_move(raw, &tokens),
        Some(&"start") => Decoded::ok(Command::Start),
        Some(&"done") => Decoded::ok(Command::Done),
        Some(&"reset") => Decoded::ok(Command::Reset),
        Some(&"rotate") => decode_rotate(raw, &tokens),
        Some(&"flip") => decode_flip(raw, &tokens),
        Some(&"addremove") => decode_addremove(raw, &tokens),
        Some(&"setpos") => decode_setpos(raw, &tokens),
        _ => Decoded::unrecognized(raw),
    }
}

/// `move <color> <body> <direction> [repeat]` - a bad repeat token is
/// recovered with the default of 1 and surfaced as a decode warning.
fn decode_move(raw: &str, tokens: &[&str]) -> Decoded {
    let (Some(first), Some(second), Some(dir)) = (tokens.get(1), tokens.get(2), tokens.get(3))
    else {
        return Decoded::unrecognized(raw);
    };
    let Some(direction) = Direction::from_token(dir) else {
        return Decoded::unrecognized(raw);
    };
    let target = TargetRef::from_tokens(first, second);

    match tokens.get(4) {
        None => Decoded::ok(Command::Move {
            target,
            direction,
            repeat: 1,
        }),
        Some(count) => match count.parse::<u32>() {
            Ok(repeat) => Decoded::ok(Command::Move {
                target,
                direction,
                repeat,
            }),
            Err(_) => Decoded::with_warning(
                Command::Move {
                    target,
                    direction,
                    repeat: 1,
                },
                format!("repeat count '{count}' is not an integer, defaulting to 1"),
            ),
        },
    }
}

fn decode_rotate(raw: &str, tokens: &[&str]) -> Decoded {
    let (Some(first), Some(second), Some(dir)) = (tokens.get(1), tokens.get(2), tokens.get(3))
    else {
        return Decoded::unrecognized(raw);
    };
    let Some(direction) = Diagonal::from_token(dir) else {
        return Decoded::unrecognized(raw);
    };
    Decoded::ok(Command::Rotate {
        target: TargetRef::from_tokens(first, second),
        direction,
    })
}

fn decode_flip(raw: &str, tokens: &[&str]) -> Decoded {
    let (Some(first), Some(second), Some(dir)) = (tokens.get(1), tokens.get(2), tokens.get(3))
    else {
        return Decoded::unrecognized(raw);
    };
    let Some(direction) = Direction::from_token(dir) else {
        return Decoded::unrecognized(raw);
    };
    Decoded::ok(Command::Flip {
        target: TargetRef::from_tokens(first, second),
        direction,
    })
}

fn decode_addremove(raw: &str, tokens: &[&str]) -> Decoded {
    let (Some(first), Some(second), Some(act)) = (tokens.get(1), tokens.get(2), tokens.get(3))
    else {
        return Decoded::unrecognized(raw);
    };
    let Some(action) = AddRemove::from_token(act) else {
        return Decoded::unrecognized(raw);
    };
    Decoded::ok(Command::AddRemove {
        target: TargetRef::from_tokens(first, second),
        action,
    })
}

/// `setpos <color> <body> <x>,<z>`
fn decode_setpos(raw: &str, tokens: &[&str]) -> Decoded {
    let (Some(first), Some(second), Some(pos)) = (tokens.get(1), tokens.get(2), tokens.get(3))
    else {
        return Decoded::unrecognized(raw);
    };
    let Some((x_str, z_str)) = pos.split_once(',') else {
        return Decoded::unrecognized(raw);
    };
    let (Ok(x), Ok(z)) = (x_str.trim().parse::<i32>(), z_str.trim().parse::<i32>()) else {
        return Decoded::unrecognized(raw);
    };
    Decoded::ok(Command::SetPosition {
        target: TargetRef::from_tokens(first, second),
        x,
        z,
    })
}
