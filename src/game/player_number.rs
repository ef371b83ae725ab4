//! Definition of the [`PlayerNumber`] structure.

use std::ops::Not;

/// Enumeration of the two player slots of a match.
///
/// The [`Not`] trait is implemented to get the opponent's slot using `!n` syntax.
///
/// Conversions to and from [`u8`] are implemented in [`crate::protocol`]. They follow the Protocol.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash)]
pub enum PlayerNumber {
    /// Defends the left goal.
    One,
    /// Defends the right goal.
    Two,
}

impl PlayerNumber {
    /// Both slots, in assignment order.
    pub const ALL: [PlayerNumber; 2] = [PlayerNumber::One, PlayerNumber::Two];

    /// Position of this slot in per-player arrays.
    pub fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }
}

impl Not for PlayerNumber {
    type Output = PlayerNumber;
    fn not(self) -> Self::Output {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }
}
