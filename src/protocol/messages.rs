//! Protocol-compliant text encoding and decoding of the messages exchanged with clients.
//!
//! Every message is a keyword, a single space, comma-separated decimal fields and the [`TERMINATOR`]. Encoding goes
//! through [`std::fmt::Display`], decoding through [`std::str::FromStr`].

use std::fmt;
use std::str::FromStr;

use crate::game::{PlayerNumber, Vec2};
use crate::protocol::player_number::PlayerNumberError;

/// The sentinel byte ending every message.
pub const TERMINATOR: u8 = b'#';

const PLAYER_ASSIGNMENT: &str = "PLAYER";
const PADDLE_POSITION: &str = "PADDLE";
const BALL_POSITION: &str = "BALLPOS";
const BALL_ADD: &str = "BALLADD";
const BALL_REMOVE: &str = "BALLREM";
const SCORE_UPDATE: &str = "SCORE";

/// Enum wrapping the six messages of the Protocol, in both directions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Message {
    /// Tells a freshly connected client which slot it occupies.
    PlayerAssignment(PlayerNumber),
    /// Top-left corner of a player's paddle.
    PaddlePosition {
        player: PlayerNumber,
        position: Vec2,
    },
    /// Center of a live ball.
    BallPosition { ball: u32, position: Vec2 },
    /// A ball entering play, with its signed per-tick speed.
    BallAdd {
        ball: u32,
        position: Vec2,
        radius: i32,
        speed: Vec2,
    },
    BallRemove(u32),
    /// Scores of player 1 and player 2, in that order.
    ScoreUpdate([u32; 2]),
}

/// Errors encountered while decoding a message.
#[derive(thiserror::Error, Debug, Eq, PartialEq)]
pub enum MessageParseError {
    #[error("message is not terminated by `#`")]
    MissingTerminator,

    #[error("unknown message keyword `{0}`")]
    UnknownKeyword(String),

    #[error("expected {expected} fields, got {got}")]
    FieldCount { expected: usize, got: usize },

    #[error("invalid integer field `{0}`")]
    InvalidInteger(String),

    #[error("invalid player number : {0}")]
    PlayerNumber(#[from] PlayerNumberError),
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let terminator = char::from(TERMINATOR);
        match self {
            Self::PlayerAssignment(player) => {
                write!(f, "{PLAYER_ASSIGNMENT} {}{terminator}", u8::from(*player))
            }
            Self::PaddlePosition { player, position } => write!(
                f,
                "{PADDLE_POSITION} {},{},{}{terminator}",
                u8::from(*player),
                position.x,
                position.y
            ),
            Self::BallPosition { ball, position } => write!(
                f,
                "{BALL_POSITION} {ball},{},{}{terminator}",
                position.x, position.y
            ),
            Self::BallAdd {
                ball,
                position,
                radius,
                speed,
            } => write!(
                f,
                "{BALL_ADD} {ball},{},{},{radius},{},{}{terminator}",
                position.x, position.y, speed.x, speed.y
            ),
            Self::BallRemove(ball) => write!(f, "{BALL_REMOVE} {ball}{terminator}"),
            Self::ScoreUpdate([p1, p2]) => write!(f, "{SCORE_UPDATE} {p1},{p2}{terminator}"),
        }
    }
}

impl FromStr for Message {
    type Err = MessageParseError;

    /// Decode one whole message, terminator included. Surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .strip_suffix(char::from(TERMINATOR))
            .ok_or(MessageParseError::MissingTerminator)
            .and_then(Message::decode_body)
    }
}

impl Message {
    /// Decode the text of a message found between two terminators.
    pub(super) fn decode_body(body: &str) -> Result<Self, MessageParseError> {
        let body = body.trim();
        let (keyword, fields) = body.split_once(' ').unwrap_or((body, ""));
        if keyword.eq_ignore_ascii_case(PLAYER_ASSIGNMENT) {
            let [player] = split_fields(fields)?;
            Ok(Self::PlayerAssignment(player_number(player)?))
        } else if keyword.eq_ignore_ascii_case(PADDLE_POSITION) {
            let [player, x, y] = split_fields(fields)?;
            Ok(Self::PaddlePosition {
                player: player_number(player)?,
                position: Vec2::new(unsigned(x)?, unsigned(y)?),
            })
        } else if keyword.eq_ignore_ascii_case(BALL_POSITION) {
            let [ball, x, y] = split_fields(fields)?;
            Ok(Self::BallPosition {
                ball: unsigned(ball)?,
                position: Vec2::new(unsigned(x)?, unsigned(y)?),
            })
        } else if keyword.eq_ignore_ascii_case(BALL_ADD) {
            let [ball, x, y, radius, speed_x, speed_y] = split_fields(fields)?;
            Ok(Self::BallAdd {
                ball: unsigned(ball)?,
                position: Vec2::new(unsigned(x)?, unsigned(y)?),
                radius: unsigned(radius)?,
                speed: Vec2::new(signed(speed_x)?, signed(speed_y)?),
            })
        } else if keyword.eq_ignore_ascii_case(BALL_REMOVE) {
            let [ball] = split_fields(fields)?;
            Ok(Self::BallRemove(unsigned(ball)?))
        } else if keyword.eq_ignore_ascii_case(SCORE_UPDATE) {
            let [p1, p2] = split_fields(fields)?;
            Ok(Self::ScoreUpdate([unsigned(p1)?, unsigned(p2)?]))
        } else {
            Err(MessageParseError::UnknownKeyword(String::from(keyword)))
        }
    }
}

/// Split the comma-separated fields, checking there are exactly `N` of them.
fn split_fields<const N: usize>(fields: &str) -> Result<[&str; N], MessageParseError> {
    let fields: Vec<&str> = fields.split(',').collect();
    let got = fields.len();
    fields
        .try_into()
        .map_err(|_| MessageParseError::FieldCount { expected: N, got })
}

/// Parse a field made of decimal digits only.
fn unsigned<T: FromStr>(field: &str) -> Result<T, MessageParseError> {
    if !is_decimal(field) {
        return Err(MessageParseError::InvalidInteger(String::from(field)));
    }
    field
        .parse()
        .map_err(|_| MessageParseError::InvalidInteger(String::from(field)))
}

/// Parse a field made of decimal digits, optionally preceded by a minus sign.
fn signed(field: &str) -> Result<i32, MessageParseError> {
    if !is_decimal(field.strip_prefix('-').unwrap_or(field)) {
        return Err(MessageParseError::InvalidInteger(String::from(field)));
    }
    field
        .parse()
        .map_err(|_| MessageParseError::InvalidInteger(String::from(field)))
}

fn is_decimal(field: &str) -> bool {
    !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit())
}

fn player_number(field: &str) -> Result<PlayerNumber, MessageParseError> {
    Ok(PlayerNumber::try_from(unsigned::<u8>(field)?)?)
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    fn decode(s: &str) -> Result<Message, MessageParseError> {
        s.parse()
    }

    #[test]
    fn exact_encoding() {
        assert_eq!(
            Message::PlayerAssignment(PlayerNumber::Two).to_string(),
            "PLAYER 2#"
        );
        assert_eq!(
            Message::PaddlePosition {
                player: PlayerNumber::One,
                position: Vec2::new(5, 10),
            }
            .to_string(),
            "PADDLE 1,5,10#"
        );
        assert_eq!(
            Message::BallPosition {
                ball: 3,
                position: Vec2::new(512, 384),
            }
            .to_string(),
            "BALLPOS 3,512,384#"
        );
        assert_eq!(
            Message::BallAdd {
                ball: 1,
                position: Vec2::new(512, 384),
                radius: 31,
                speed: Vec2::new(-8, 8),
            }
            .to_string(),
            "BALLADD 1,512,384,31,-8,8#"
        );
        assert_eq!(Message::BallRemove(7).to_string(), "BALLREM 7#");
        assert_eq!(Message::ScoreUpdate([4, 0]).to_string(), "SCORE 4,0#");
    }

    #[test]
    fn decode_what_is_encoded() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let position = Vec2::new(rng.gen_range(0..=i32::MAX), rng.gen_range(0..=i32::MAX));
            let speed = Vec2::new(rng.gen(), rng.gen());
            let messages = [
                Message::PlayerAssignment(PlayerNumber::One),
                Message::PlayerAssignment(PlayerNumber::Two),
                Message::PaddlePosition {
                    player: PlayerNumber::Two,
                    position,
                },
                Message::BallPosition {
                    ball: rng.gen(),
                    position,
                },
                Message::BallAdd {
                    ball: rng.gen(),
                    position,
                    radius: rng.gen_range(0..=i32::MAX),
                    speed,
                },
                Message::BallRemove(rng.gen()),
                Message::ScoreUpdate([rng.gen(), rng.gen()]),
            ];
            for message in messages {
                assert_eq!(decode(&message.to_string()), Ok(message));
            }
        }
    }

    #[test]
    fn negative_speeds() {
        assert_eq!(
            decode("BALLADD 2,10,20,25,-8,-8#"),
            Ok(Message::BallAdd {
                ball: 2,
                position: Vec2::new(10, 20),
                radius: 25,
                speed: Vec2::new(-8, -8),
            })
        );
        assert_eq!(
            decode("BALLADD 2,10,20,25,-2147483648,0#").map(|_| ()),
            Ok(())
        );
    }

    #[test]
    fn lenient_on_case_and_surrounding_whitespace() {
        let expected = Ok(Message::PaddlePosition {
            player: PlayerNumber::One,
            position: Vec2::new(5, 10),
        });
        assert_eq!(decode("paddle 1,5,10#"), expected);
        assert_eq!(decode("PADDLE 1,5,10#\r\n"), expected);
        assert_eq!(decode("  PADDLE 1,5,10# "), expected);
    }

    #[test]
    fn malformed_messages() {
        assert_eq!(
            decode("PLAYER 1"),
            Err(MessageParseError::MissingTerminator)
        );
        assert_eq!(
            decode("HELLO 1#"),
            Err(MessageParseError::UnknownKeyword(String::from("HELLO")))
        );
        assert_eq!(
            decode("PADDLE 1,5#"),
            Err(MessageParseError::FieldCount {
                expected: 3,
                got: 2
            })
        );
        assert_eq!(
            decode("PADDLE 3,5,10#"),
            Err(MessageParseError::PlayerNumber(
                PlayerNumberError::InvalidInteger(3)
            ))
        );
        assert_eq!(
            decode("BALLPOS 1,-5,10#"),
            Err(MessageParseError::InvalidInteger(String::from("-5")))
        );
        assert_eq!(
            decode("SCORE 1, 2#"),
            Err(MessageParseError::InvalidInteger(String::from(" 2")))
        );
        assert_eq!(
            decode("BALLREM +4#"),
            Err(MessageParseError::InvalidInteger(String::from("+4")))
        );
        assert_eq!(
            decode("BALLADD 1,1,1,1,--1,1#"),
            Err(MessageParseError::InvalidInteger(String::from("--1")))
        );
        assert!(decode("BALLREM 99999999999#").is_err());
        assert!(decode("PLAYER#").is_err());
        assert!(decode("#").is_err());
    }
}
