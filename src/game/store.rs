//! The authoritative state of the match : two player slots and the set of live balls.

use rand::Rng;

use crate::game::engine::BallGenerator;
use crate::game::{Outbox, PlayerNumber, Vec2};
use crate::protocol::constants::{
    MAX_BALLS, PADDLE_HEIGHT, PADDLE_WIDTH, WINDOW_HEIGHT, WINDOW_WIDTH,
};

/// A seated player.
#[derive(Debug)]
pub struct Player {
    number: PlayerNumber,
    /// Top-left corner of the paddle.
    pub position: Vec2,
    pub score: u32,
    outbox: Outbox,
}

impl Player {
    fn new(number: PlayerNumber, outbox: Outbox) -> Player {
        let position = match number {
            PlayerNumber::One => Vec2::new(0, WINDOW_HEIGHT / 2),
            PlayerNumber::Two => Vec2::new(WINDOW_WIDTH - PADDLE_WIDTH, WINDOW_HEIGHT / 2),
        };
        Player {
            number,
            position,
            score: 0,
            outbox,
        }
    }

    pub fn number(&self) -> PlayerNumber {
        self.number
    }

    /// Move the paddle, keeping it inside the window. Returns where it ended up.
    pub fn move_paddle(&mut self, position: Vec2) -> Vec2 {
        self.position = Vec2::new(
            position.x.clamp(0, WINDOW_WIDTH - PADDLE_WIDTH),
            position.y.clamp(0, WINDOW_HEIGHT - PADDLE_HEIGHT),
        );
        self.position
    }

    /// Queue towards this player's connection.
    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }
}

/// A live ball.
#[derive(Eq, PartialEq, Clone, Debug)]
pub struct Ball {
    pub number: u32,
    /// Center of the ball.
    pub position: Vec2,
    pub radius: i32,
    /// Movement per tick.
    pub speed: Vec2,
}

/// The two player slots - [`None`] while waiting for that player - and the live balls.
#[derive(Debug, Default)]
pub struct MatchState {
    players: [Option<Player>; 2],
    balls: Vec<Ball>,
    ball_generator: BallGenerator,
}

impl MatchState {
    pub fn new() -> MatchState {
        MatchState::default()
    }

    /// Seat a player in the first free slot. Returns [`None`] if both are taken.
    pub fn add_player(&mut self, outbox: Outbox) -> Option<PlayerNumber> {
        let number = PlayerNumber::ALL
            .into_iter()
            .find(|n| self.players[n.index()].is_none())?;
        self.players[number.index()] = Some(Player::new(number, outbox));
        Some(number)
    }

    pub fn player(&self, number: PlayerNumber) -> Option<&Player> {
        self.players[number.index()].as_ref()
    }

    pub fn player_mut(&mut self, number: PlayerNumber) -> Option<&mut Player> {
        self.players[number.index()].as_mut()
    }

    /// Free the slot, returning whoever sat there.
    pub fn remove_player(&mut self, number: PlayerNumber) -> Option<Player> {
        self.players[number.index()].take()
    }

    pub fn has_both_players(&self) -> bool {
        self.players.iter().all(Option::is_some)
    }

    pub fn occupied_slots(&self) -> usize {
        self.players.iter().filter(|p| p.is_some()).count()
    }

    /// Spawn a ball numbered one above the highest live number, or 1 if there is none. Returns [`None`] once
    /// [`MAX_BALLS`] are live.
    pub fn add_ball<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<&Ball> {
        if self.balls.len() >= MAX_BALLS {
            return None;
        }
        let number = self.balls.iter().map(|b| b.number).max().unwrap_or(0) + 1;
        let ball = self.ball_generator.gen_ball(number, rng);
        self.balls.push(ball);
        self.balls.last()
    }

    pub fn ball(&self, number: u32) -> Option<&Ball> {
        self.balls.iter().find(|b| b.number == number)
    }

    pub fn remove_ball(&mut self, number: u32) -> Option<Ball> {
        let index = self.balls.iter().position(|b| b.number == number)?;
        Some(self.balls.remove(index))
    }

    /// Live balls, in spawn order.
    pub fn balls(&self) -> &[Ball] {
        &self.balls
    }

    pub(super) fn balls_mut(&mut self) -> &mut [Ball] {
        &mut self.balls
    }

    /// Put a hand-made ball in play.
    #[cfg(test)]
    pub(crate) fn insert_ball(&mut self, ball: Ball) {
        assert!(self.ball(ball.number).is_none());
        self.balls.push(ball);
    }
}
