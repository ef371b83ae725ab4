//! The life of one seated connection : receiving the player's messages, and writing out what is queued for them.
//!
//! A [`Session`] is built by [`crate::accept_tasks::SeatAcceptor`] right after the player has been seated, its
//! assignment already queued. Running it drives two halves concurrently until the client goes away :
//! * the receive path reads into an [`Accumulator`], decodes complete messages and handles them in arrival order,
//! * the writer drains the player's [`Outbox`](crate::game::Outbox) queue onto the socket.
//!
//! When the receive path stops - zero-length read or error - the slot is freed. This drops the outbox, which in turn
//! ends the writer. A session dropped without being run, or aborted, frees its slot as well.

use std::fmt::Display;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::mpsc;

use crate::game::{Dispatcher, PlayerNumber, SharedMatch};
use crate::protocol::constants::BUFFER_SIZE;
use crate::protocol::{Accumulator, Message};

/// A player slot taken in the match, given back once released or dropped.
struct Seat {
    shared: Arc<SharedMatch>,
    player: PlayerNumber,
    taken: bool,
}

impl Seat {
    fn release(&mut self) {
        if std::mem::take(&mut self.taken) {
            self.shared.leave(self.player);
        }
    }
}

impl Drop for Seat {
    fn drop(&mut self) {
        self.release();
    }
}

/// A seated connection, ready to be run in its own task.
pub struct Session {
    log_id: String,
    seat: Seat,
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
    frames: mpsc::Receiver<String>,
}

impl Session {
    /// Bundle a connection seated as `player`. From now on the slot is owned by the [`Session`].
    ///
    /// `frames` must be the receiving end of the outbox the player was seated with.
    pub fn new(
        log_id: String,
        player: PlayerNumber,
        reader: OwnedReadHalf,
        writer: OwnedWriteHalf,
        frames: mpsc::Receiver<String>,
        shared: Arc<SharedMatch>,
    ) -> Session {
        Session {
            log_id,
            seat: Seat {
                shared,
                player,
                taken: true,
            },
            reader,
            writer,
            frames,
        }
    }

    /// Serve the player until the connection closes or fails, then free its slot.
    pub async fn run(self) {
        let Session {
            log_id,
            mut seat,
            reader,
            writer,
            frames,
        } = self;
        let player = seat.player;
        tokio::join!(
            async {
                receive_messages(reader, player, &seat.shared, &log_id).await;
                seat.release();
            },
            write_outgoing(writer, frames, &log_id),
        );
        log::info!("{log_id}: Session of player {} done.", u8::from(player));
    }
}

/// Read from the connection until it closes or fails, handling every complete message as soon as it's decoded.
async fn receive_messages<D: Display>(
    mut reader: OwnedReadHalf,
    player: PlayerNumber,
    shared: &SharedMatch,
    log_id: &D,
) {
    let mut accumulator = Accumulator::new();
    let mut buffer = [0u8; BUFFER_SIZE];
    loop {
        match reader.read(&mut buffer).await {
            Ok(0) => {
                log::info!("{log_id}: Player {} disconnected.", u8::from(player));
                return;
            }
            Ok(read) => {
                accumulator.extend(&buffer[..read]);
                for message in accumulator.drain_messages() {
                    handle_message(shared, player, message, log_id);
                }
            }
            Err(e) => {
                log::info!(
                    "{log_id}: Connection with player {} lost : {e}.",
                    u8::from(player)
                );
                return;
            }
        }
    }
}

/// Apply a message received from `sender`.
///
/// Only paddle positions are meaningful coming from a client. The new position is stored, pulled back inside the window
/// if needed, then relayed to the opponent alone. A paddle position for a player other than the sender, or for an empty
/// slot, changes nothing.
pub fn handle_message<D: Display>(
    shared: &SharedMatch,
    sender: PlayerNumber,
    message: Message,
    log_id: &D,
) {
    match message {
        Message::PaddlePosition { player, position } if player == sender => {
            let (position, dispatcher) = {
                let mut state = shared.lock();
                let position = match state.player_mut(player) {
                    Some(seated) => seated.move_paddle(position),
                    None => return,
                };
                (position, Dispatcher::snapshot(&state))
            };
            log::trace!(
                "{log_id}: Paddle {} moved to ({}, {}).",
                u8::from(player),
                position.x,
                position.y
            );
            dispatcher.unicast(!player, &Message::PaddlePosition { player, position });
        }
        Message::PaddlePosition { player, .. } => log::debug!(
            "{log_id}: Player {} sent a position for paddle {}, ignored.",
            u8::from(sender),
            u8::from(player)
        ),
        other => log::debug!("{log_id}: Ignoring a server-only message : {other:?}."),
    }
}

/// Write the queued frames to the connection, in queuing order, until the queue closes.
///
/// A failed write stops the writer, and whatever is queued afterwards is discarded. Noticing the disconnection is
/// left to the receive path.
async fn write_outgoing<D: Display>(
    mut writer: OwnedWriteHalf,
    mut frames: mpsc::Receiver<String>,
    log_id: &D,
) {
    while let Some(frame) = frames.recv().await {
        if let Err(e) = writer.write_all(frame.as_bytes()).await {
            log::warn!("{log_id}: Failed to send `{frame}` : {e}.");
            return;
        }
    }
}
