//! Constants corresponding to aspects of the game shared with clients through the Protocol.

use std::net::{IpAddr, Ipv4Addr};

pub const SERVER_IP: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);
pub const SERVER_PORT: u16 = 11000;
pub const LISTEN_BACKLOG: u32 = 100;

/// Size of a single read from a client socket.
pub const BUFFER_SIZE: usize = 1024;
/// Unterminated bytes a client may leave pending before they are thrown away.
pub const MAX_PENDING_BYTES: usize = 4 * BUFFER_SIZE;
/// Frames queued towards a client before new ones are dropped, a few seconds of ticks.
pub const OUTBOX_CAPACITY: usize = 256;

pub const WINDOW_WIDTH: i32 = 1024;
pub const WINDOW_HEIGHT: i32 = 768;
pub const PADDLE_WIDTH: i32 = 20;
pub const PADDLE_HEIGHT: i32 = 100;

pub const MIN_BALLS: usize = 1;
pub const MAX_BALLS: usize = 5;
pub const BALL_DEFAULT_RADIUS: i32 = 25;
pub const BALL_RADIUS_BAND: i32 = 25;
/// The smallest radius handed out, so that a ball bouncing off a wall never reports a negative center.
pub const BALL_MIN_RADIUS: i32 = BALL_SPEED;
pub const BALL_SPEED: i32 = 8;
pub const BALL_SPAWN_X: i32 = WINDOW_WIDTH / 2;
pub const BALL_SPAWN_Y: i32 = WINDOW_HEIGHT / 2;

// Run at 30 ticks per second
pub const MS_PER_TICK: u64 = 1000 / 30;
