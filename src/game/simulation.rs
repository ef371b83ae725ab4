//! The fixed-tick simulation of the match.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::time::MissedTickBehavior;

use crate::game::engine::{bounce_off_horizontal_edges, bounce_off_paddles, scorer_of_ball};
use crate::game::{Dispatcher, MatchState, PlayerNumber, SharedMatch};
use crate::protocol::constants::{MIN_BALLS, MS_PER_TICK};
use crate::protocol::Message;

/// Run the match forever, one tick every [`MS_PER_TICK`] milliseconds while both players are seated.
///
/// Late ticks are not caught up on : a slow tick only pushes the next one back. Whenever a player is missing the loop
/// sleeps until the slot is filled again.
pub async fn run_simulation_loop(shared: Arc<SharedMatch>) {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(MS_PER_TICK));
    tick_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let both_seated = shared.lock().has_both_players();
        if !both_seated {
            log::info!("Waiting for both players before running the match.");
            shared.wait_for_both_players().await;
            log::info!("Both players are seated, the match is running.");
            tick_interval.reset();
        }
        tick_interval.tick().await;

        let (messages, dispatcher) = {
            let mut state = shared.lock();
            if !state.has_both_players() {
                continue;
            }
            let messages = run_tick(&mut state, &mut rand::thread_rng());
            (messages, Dispatcher::snapshot(&state))
        };
        for message in &messages {
            dispatcher.broadcast(message);
        }
    }
}

/// Advance the match by one tick, returning the messages to broadcast, in order.
///
/// Does nothing unless both players are seated. Otherwise, in this order :
/// 1. spawns balls up to [`MIN_BALLS`],
/// 2. bounces balls off the top and bottom walls and off the paddles,
/// 3. removes the balls that reached a goal line and credits the scorers,
/// 4. reports the position of the remaining balls,
/// 5. moves the balls, so that clients are shown the positions reported just before.
pub(super) fn run_tick<R: Rng + ?Sized>(state: &mut MatchState, rng: &mut R) -> Vec<Message> {
    let mut messages = Vec::new();
    let (l_paddle, r_paddle) = match (
        state.player(PlayerNumber::One),
        state.player(PlayerNumber::Two),
    ) {
        (Some(p1), Some(p2)) => (p1.position, p2.position),
        _ => return messages,
    };

    while state.balls().len() < MIN_BALLS {
        let Some(ball) = state.add_ball(rng) else {
            break;
        };
        log::debug!("Ball {} enters play.", ball.number);
        messages.push(Message::BallAdd {
            ball: ball.number,
            position: ball.position,
            radius: ball.radius,
            speed: ball.speed,
        });
    }

    for ball in state.balls_mut() {
        ball.speed.y = bounce_off_horizontal_edges(ball.position.y, ball.radius, ball.speed.y);
        ball.speed.x =
            bounce_off_paddles(ball.position, ball.radius, ball.speed.x, l_paddle, r_paddle);
    }

    let scored: Vec<(u32, PlayerNumber)> = state
        .balls()
        .iter()
        .filter_map(|b| scorer_of_ball(b.position.x, b.radius).map(|scorer| (b.number, scorer)))
        .collect();
    if !scored.is_empty() {
        for &(number, scorer) in &scored {
            if let Some(player) = state.player_mut(scorer) {
                player.score += 1;
            }
            messages.push(Message::BallRemove(number));
            state.remove_ball(number);
            log::debug!("Ball {number} scored for player {}.", u8::from(scorer));
        }
        let scores = PlayerNumber::ALL.map(|n| state.player(n).map_or(0, |p| p.score));
        log::info!("Score is now {} - {}.", scores[0], scores[1]);
        messages.push(Message::ScoreUpdate(scores));
    }

    for ball in state.balls() {
        messages.push(Message::BallPosition {
            ball: ball.number,
            position: ball.position,
        });
    }

    for ball in state.balls_mut() {
        ball.position.x += ball.speed.x;
        ball.position.y += ball.speed.y;
    }

    messages
}
