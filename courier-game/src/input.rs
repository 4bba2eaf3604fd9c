//! Discrete input symbols consumed by the engine, one per tick.
use serde::{Deserialize, Serialize};

use crate::grid::Direction;

const KEY_ESCAPE: char = '\u{1b}';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Input {
    Move(Direction),
    Pickup,
    Drop,
    /// Select a package by its 1-based label.
    Select(u8),
    /// Enter: confirm at the exit.
    Confirm,
    /// Escape: pause, or leave the pause prompt.
    Escape,
    /// Pause prompt answers.
    Yes,
    No,
}

impl Input {
    /// Map a terminal key to an input. Unrecognized keys map to `None`.
    #[must_use]
    pub fn from_key(key: char) -> Option<Self> {
        let input = match key.to_ascii_lowercase() {
            'w' | 'k' => Self::Move(Direction::Up),
            's' | 'j' => Self::Move(Direction::Down),
            'a' | 'h' => Self::Move(Direction::Left),
            'd' | 'l' => Self::Move(Direction::Right),
            'e' => Self::Pickup,
            'q' => Self::Drop,
            'y' => Self::Yes,
            'n' => Self::No,
            '\n' | '\r' => Self::Confirm,
            KEY_ESCAPE => Self::Escape,
            digit @ '1'..='9' => Self::Select(u8::try_from(digit).ok()? - b'0'),
            _ => return None,
        };
        Some(input)
    }
}
