//! Implementation of the logic of the Pong match.
//!
//! This mod owns the authoritative state of the match behind [`SharedMatch`], and exposes the simulation loop
//! [`run_simulation_loop`] as well as the [`Dispatcher`] used to push messages to the players.
//!
//! All reads and writes of the [`MatchState`] go through [`SharedMatch::lock`]. The guard is only ever held for
//! in-memory work : messages are formatted and queued once it's released.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::protocol::Message;

pub use dispatch::{outbox_channel, Dispatcher, Outbox};
pub use player_number::PlayerNumber;
pub use simulation::run_simulation_loop;
pub use store::{Ball, MatchState};

mod dispatch;
mod engine;
mod player_number;
mod simulation;
mod store;

/// Integer 2D vector, used for positions as well as speeds.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Default, Hash)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A server-wide structure holding the one [`MatchState`] of this server, shared by the accept loop, the sessions and
/// the simulation loop.
///
/// Besides the mutex, it publishes the number of occupied player slots so that the simulation loop can sleep until
/// both players are there.
pub struct SharedMatch {
    state: Mutex<MatchState>,
    occupied_slots: watch::Sender<usize>,
}

impl SharedMatch {
    /// Creates a [`SharedMatch`] with both slots free and no ball.
    pub fn new() -> SharedMatch {
        let (occupied_slots, _) = watch::channel(0);
        SharedMatch {
            state: Mutex::new(MatchState::new()),
            occupied_slots,
        }
    }

    /// Lock the match state.
    ///
    /// Every critical section leaves the state consistent, so a poisoned lock is simply taken over.
    pub fn lock(&self) -> MutexGuard<'_, MatchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seat a new player in the first free slot, and return its number. Returns [`None`] if both slots are taken.
    ///
    /// The player's [`Message::PlayerAssignment`] is queued on its outbox before the lock is released, so that it
    /// precedes anything the simulation loop sends.
    pub fn join(&self, outbox: Outbox) -> Option<PlayerNumber> {
        let mut state = self.lock();
        let number = state.add_player(outbox.clone())?;
        if outbox
            .try_send(Message::PlayerAssignment(number).to_string())
            .is_err()
        {
            log::debug!("Player {} is gone before being told its number.", u8::from(number));
        }
        self.occupied_slots.send_replace(state.occupied_slots());
        Some(number)
    }

    /// Free the slot of the given player.
    pub fn leave(&self, number: PlayerNumber) {
        let mut state = self.lock();
        if let Some(player) = state.remove_player(number) {
            log::info!("Player {} left, slot freed.", u8::from(player.number()));
        }
        self.occupied_slots.send_replace(state.occupied_slots());
    }

    /// Wait until both player slots are occupied.
    pub async fn wait_for_both_players(&self) {
        let mut occupied_slots = self.occupied_slots.subscribe();
        // The sender lives in self, so the channel can't close while we wait.
        let _ = occupied_slots
            .wait_for(|&count| count == PlayerNumber::ALL.len())
            .await;
    }
}

impl Default for SharedMatch {
    fn default() -> Self {
        Self::new()
    }
}
