//! Pushing encoded messages to one or both players without waiting on their sockets.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::game::{MatchState, PlayerNumber};
use crate::protocol::constants::OUTBOX_CAPACITY;
use crate::protocol::Message;

/// Sending end of the queue drained by a connection's writer task. It carries encoded messages.
pub type Outbox = mpsc::Sender<String>;

/// Fresh queue for a connection about to be seated, holding up to [`OUTBOX_CAPACITY`] frames.
pub fn outbox_channel() -> (Outbox, mpsc::Receiver<String>) {
    mpsc::channel(OUTBOX_CAPACITY)
}

/// Copy of the players' [`Outbox`]es taken while the match is locked, so that sending can happen after the lock is
/// released.
///
/// Queuing never blocks. A full queue, meaning a client that stopped reading, loses the message. A queue whose writer is
/// gone swallows it too : the receive path of that connection is the one in charge of freeing the slot.
#[derive(Clone, Debug, Default)]
pub struct Dispatcher {
    outboxes: [Option<Outbox>; 2],
}

impl Dispatcher {
    /// Snapshot the outboxes of the players currently seated.
    pub fn snapshot(state: &MatchState) -> Dispatcher {
        Dispatcher {
            outboxes: PlayerNumber::ALL.map(|n| state.player(n).map(|p| p.outbox().clone())),
        }
    }

    /// Send the message to the given player, if seated.
    pub fn unicast(&self, player: PlayerNumber, message: &Message) {
        self.send(player, message.to_string());
    }

    /// Send the message to player 1, then to player 2.
    pub fn broadcast(&self, message: &Message) {
        let frame = message.to_string();
        for player in PlayerNumber::ALL {
            self.send(player, frame.clone());
        }
    }

    fn send(&self, player: PlayerNumber, frame: String) {
        let Some(outbox) = &self.outboxes[player.index()] else {
            return;
        };
        match outbox.try_send(frame) {
            Ok(()) => {}
            Err(TrySendError::Full(frame)) => log::warn!(
                "Player {} isn't keeping up, dropped `{frame}`.",
                u8::from(player)
            ),
            Err(TrySendError::Closed(_)) => log::trace!(
                "Dropped a message for player {} : its connection is closing.",
                u8::from(player)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::game::Vec2;

    use super::*;

    #[test]
    fn unicast_reaches_only_the_target() {
        let mut state = MatchState::new();
        let (outbox_1, mut frames_1) = outbox_channel();
        let (outbox_2, mut frames_2) = outbox_channel();
        state.add_player(outbox_1);
        state.add_player(outbox_2);

        let message = Message::PaddlePosition {
            player: PlayerNumber::One,
            position: Vec2::new(5, 10),
        };
        Dispatcher::snapshot(&state).unicast(PlayerNumber::Two, &message);
        assert_eq!(frames_2.try_recv().as_deref(), Ok("PADDLE 1,5,10#"));
        assert!(frames_1.try_recv().is_err());
    }

    #[test]
    fn broadcast_reaches_both_in_order() {
        let mut state = MatchState::new();
        let (outbox_1, mut frames_1) = outbox_channel();
        let (outbox_2, mut frames_2) = outbox_channel();
        state.add_player(outbox_1);
        state.add_player(outbox_2);

        let dispatcher = Dispatcher::snapshot(&state);
        dispatcher.broadcast(&Message::BallRemove(1));
        dispatcher.broadcast(&Message::ScoreUpdate([0, 1]));
        for frames in [&mut frames_1, &mut frames_2] {
            assert_eq!(frames.try_recv().as_deref(), Ok("BALLREM 1#"));
            assert_eq!(frames.try_recv().as_deref(), Ok("SCORE 0,1#"));
            assert!(frames.try_recv().is_err());
        }
    }

    #[test]
    fn empty_slot_or_closed_queue_is_a_no_op() {
        let mut state = MatchState::new();
        let (outbox_1, frames_1) = outbox_channel();
        state.add_player(outbox_1);
        drop(frames_1);

        let dispatcher = Dispatcher::snapshot(&state);
        dispatcher.unicast(PlayerNumber::Two, &Message::BallRemove(1));
        dispatcher.broadcast(&Message::BallRemove(1));
    }

    #[test]
    fn full_queue_drops_instead_of_blocking() {
        let mut state = MatchState::new();
        let (outbox_1, mut frames_1) = outbox_channel();
        let (outbox_2, mut frames_2) = outbox_channel();
        state.add_player(outbox_1);
        state.add_player(outbox_2);

        let dispatcher = Dispatcher::snapshot(&state);
        for ball in 0..OUTBOX_CAPACITY as u32 {
            dispatcher.unicast(PlayerNumber::One, &Message::BallRemove(ball));
        }
        dispatcher.broadcast(&Message::ScoreUpdate([1, 1]));

        for ball in 0..OUTBOX_CAPACITY as u32 {
            assert_eq!(frames_1.try_recv(), Ok(format!("BALLREM {ball}#")));
        }
        assert!(frames_1.try_recv().is_err());
        assert_eq!(frames_2.try_recv().as_deref(), Ok("SCORE 1,1#"));
    }
}
