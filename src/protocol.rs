//! Implementation of the client-server pong communication protocol
//!
//! The Protocol is plain ASCII text over TCP. Each message is a keyword followed by comma-separated decimal fields and
//! terminated by a `#`, for instance `PADDLE 1,5,10#`. Messages can arrive glued together or cut anywhere across
//! reads.
//!
//! This module provides :
//! * [`Message`], the six messages of the Protocol, encoded with [`std::fmt::Display`] and decoded with
//!   [`std::str::FromStr`].
//! * [`Accumulator`], which buffers the bytes of a connection and hands out the complete messages they contain.
//! * The [`constants`] shared with clients.
//!
//! Text that doesn't decode is dropped without notice to the sender.

pub use framing::Accumulator;
pub use messages::Message;

pub mod constants;
mod framing;
mod messages;
mod player_number;
