//! Protocol-compliant serialization/deserialization for [`PlayerNumber`].

use crate::game::PlayerNumber;

/// Errors encountered when making a [`PlayerNumber`] out of a [`u8`].
#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum PlayerNumberError {
    #[error("A player number is either 1 or 2 - got `{0}`")]
    InvalidInteger(u8),
}

impl TryFrom<u8> for PlayerNumber {
    type Error = PlayerNumberError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            n => Err(Self::Error::InvalidInteger(n)),
        }
    }
}

impl From<PlayerNumber> for u8 {
    fn from(value: PlayerNumber) -> Self {
        match value {
            PlayerNumber::One => 1,
            PlayerNumber::Two => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    #[test]
    fn player_number_to_u8() {
        assert_eq!(u8::from(PlayerNumber::One), 1u8);
        assert_eq!(u8::from(PlayerNumber::Two), 2u8);
    }

    #[test]
    fn u8_to_player_number() {
        // Ok
        assert_eq!(PlayerNumber::try_from(1u8), Ok(PlayerNumber::One));
        assert_eq!(PlayerNumber::try_from(2u8), Ok(PlayerNumber::Two));

        // Err
        assert_eq!(
            PlayerNumber::try_from(0u8),
            Err(PlayerNumberError::InvalidInteger(0u8))
        );
        let invalid_u8 = rand::thread_rng().gen_range(3u8..=u8::MAX);
        assert_eq!(
            PlayerNumber::try_from(invalid_u8),
            Err(PlayerNumberError::InvalidInteger(invalid_u8))
        );
    }
}
