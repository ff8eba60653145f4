use std::fmt::Display;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One of the two edited derivatives of the base text.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    #[must_use]
    pub fn other(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    #[must_use]
    pub fn role(self) -> TextRole {
        match self {
            Side::Left => TextRole::Left,
            Side::Right => TextRole::Right,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Left => write!(f, "Left"),
            Side::Right => write!(f, "Right"),
        }
    }
}

/// The three texts taking part in a merge.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextRole {
    Left,
    Base,
    Right,
}

impl TextRole {
    pub const ALL: [TextRole; 3] = [TextRole::Left, TextRole::Base, TextRole::Right];

    /// The branch side of the role, `None` for the base text.
    #[must_use]
    pub fn side(self) -> Option<Side> {
        match self {
            TextRole::Left => Some(Side::Left),
            TextRole::Base => None,
            TextRole::Right => Some(Side::Right),
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            TextRole::Left => 0,
            TextRole::Base => 1,
            TextRole::Right => 2,
        }
    }
}

impl From<Side> for TextRole {
    fn from(side: Side) -> Self { side.role() }
}

impl Display for TextRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextRole::Left => write!(f, "Left"),
            TextRole::Base => write!(f, "Base"),
            TextRole::Right => write!(f, "Right"),
        }
    }
}
