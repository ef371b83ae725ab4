//! Implementation of the randomness and collisions needed to run a Pong match.

use rand::distributions::{Distribution, Standard, Uniform};

use crate::game::{Ball, PlayerNumber, Vec2};
use crate::protocol::constants::{
    BALL_DEFAULT_RADIUS, BALL_MIN_RADIUS, BALL_RADIUS_BAND, BALL_SPAWN_X, BALL_SPAWN_Y, BALL_SPEED,
    PADDLE_HEIGHT, PADDLE_WIDTH, WINDOW_HEIGHT, WINDOW_WIDTH,
};

/// Preemptively built distributions needed to generate new balls.
#[derive(Clone, Debug)]
pub(super) struct BallGenerator {
    radius_distribution: Uniform<i32>,
    direction_distribution: Standard,
}

impl BallGenerator {
    /// Create a new [`BallGenerator`] handing out radii within the configured band around the default radius.
    ///
    /// The band is cut below at [`BALL_MIN_RADIUS`] rather than reaching down to `BALL_DEFAULT_RADIUS -
    /// BALL_RADIUS_BAND`. A ball thinner than one tick of movement would cross a wall before bouncing and report a
    /// negative center.
    pub(super) fn new() -> BallGenerator {
        let smallest = i32::max(BALL_MIN_RADIUS, BALL_DEFAULT_RADIUS - BALL_RADIUS_BAND);
        BallGenerator {
            radius_distribution: Uniform::new_inclusive(
                smallest,
                BALL_DEFAULT_RADIUS + BALL_RADIUS_BAND,
            ),
            direction_distribution: Standard,
        }
    }

    /// Generates a ball at the spawn point, with a random radius and both speed components independently going one way
    /// or the other.
    pub(super) fn gen_ball<R: rand::Rng + ?Sized>(&self, number: u32, rng: &mut R) -> Ball {
        let mut gen_component = || match self.direction_distribution.sample(rng) {
            true => BALL_SPEED,
            false => -BALL_SPEED,
        };
        let speed = Vec2::new(gen_component(), gen_component());
        Ball {
            number,
            position: Vec2::new(BALL_SPAWN_X, BALL_SPAWN_Y),
            radius: self.radius_distribution.sample(rng),
            speed,
        }
    }
}

impl Default for BallGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Computes whether the ball touches one of the goal lines.
/// * If so, returns the [`PlayerNumber`] of the player scoring : the left goal is defended by player 1, the right goal
///   by player 2.
/// * If not, returns [`None`].
pub(super) fn scorer_of_ball(ball_x: i32, radius: i32) -> Option<PlayerNumber> {
    if ball_x - radius <= 0 {
        Some(PlayerNumber::Two)
    } else if ball_x + radius >= WINDOW_WIDTH {
        Some(PlayerNumber::One)
    } else {
        None
    }
}

/// Computes collisions of the ball with the top and bottom walls. Returns the vertical speed after the bounce, which is
/// the input one if no collision occurred.
pub(super) fn bounce_off_horizontal_edges(ball_y: i32, radius: i32, speed_y: i32) -> i32 {
    if ball_y - radius <= 0 || ball_y + radius >= WINDOW_HEIGHT {
        -speed_y
    } else {
        speed_y
    }
}

/// Computes collisions of the ball with the paddles. Returns the horizontal speed after the bounce, which is the input
/// one if no collision occurred.
///
/// A ball only bounces off a paddle it is heading to, so that it can't get stuck flipping back and forth while
/// overlapping it.
pub(super) fn bounce_off_paddles(
    ball: Vec2,
    radius: i32,
    speed_x: i32,
    l_paddle: Vec2,
    r_paddle: Vec2,
) -> i32 {
    let hits_left = speed_x < 0
        && within_paddle_span(ball.y, l_paddle)
        && ball.x.saturating_sub(radius) <= l_paddle.x.saturating_add(PADDLE_WIDTH)
        && ball.x >= l_paddle.x;
    let hits_right = speed_x > 0
        && within_paddle_span(ball.y, r_paddle)
        && ball.x.saturating_add(radius) >= r_paddle.x
        && ball.x <= r_paddle.x.saturating_add(PADDLE_WIDTH);
    if hits_left || hits_right {
        -speed_x
    } else {
        speed_x
    }
}

fn within_paddle_span(ball_y: i32, paddle: Vec2) -> bool {
    paddle.y <= ball_y && ball_y <= paddle.y.saturating_add(PADDLE_HEIGHT)
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use super::*;

    const L_PADDLE: Vec2 = Vec2::new(0, 300);
    const R_PADDLE: Vec2 = Vec2::new(WINDOW_WIDTH - PADDLE_WIDTH, 300);

    #[test]
    fn generated_balls() {
        let generator = BallGenerator::new();
        let mut thread_rng = rand::thread_rng();
        for number in 1..=50 {
            let ball = generator.gen_ball(number, &mut thread_rng);
            assert_eq!(ball.number, number);
            assert_eq!(ball.position, Vec2::new(BALL_SPAWN_X, BALL_SPAWN_Y));
            assert!(BALL_MIN_RADIUS <= ball.radius);
            assert!(ball.radius >= BALL_DEFAULT_RADIUS - BALL_RADIUS_BAND);
            assert!(ball.radius <= BALL_DEFAULT_RADIUS + BALL_RADIUS_BAND);
            assert_eq!(ball.speed.x.abs(), BALL_SPEED);
            assert_eq!(ball.speed.y.abs(), BALL_SPEED);
        }
    }

    #[test]
    fn goal_lines() {
        assert_eq!(scorer_of_ball(25, 25), Some(PlayerNumber::Two));
        assert_eq!(scorer_of_ball(-3, 25), Some(PlayerNumber::Two));
        assert_eq!(
            scorer_of_ball(WINDOW_WIDTH - 25, 25),
            Some(PlayerNumber::One)
        );
        assert_eq!(scorer_of_ball(26, 25), None);
        assert_eq!(scorer_of_ball(WINDOW_WIDTH - 26, 25), None);
        let ball_x_valid_rand = rand::thread_rng().gen_range(26..(WINDOW_WIDTH - 26));
        assert_eq!(scorer_of_ball(ball_x_valid_rand, 25), None);
    }

    #[test]
    fn horizontal_bounces() {
        assert_eq!(bounce_off_horizontal_edges(20, 20, -8), 8);
        assert_eq!(bounce_off_horizontal_edges(WINDOW_HEIGHT - 20, 20, 8), -8);
        assert_eq!(bounce_off_horizontal_edges(10, 20, -8), 8);
        assert_eq!(bounce_off_horizontal_edges(21, 20, -8), -8);
        assert_eq!(bounce_off_horizontal_edges(WINDOW_HEIGHT / 2, 20, 8), 8);
    }

    #[test]
    fn paddle_bounces() {
        // Touching the right edge of the left paddle while heading left
        let ball = Vec2::new(PADDLE_WIDTH + 20, 350);
        assert_eq!(bounce_off_paddles(ball, 20, -8, L_PADDLE, R_PADDLE), 8);
        // Same spot, already going away
        assert_eq!(bounce_off_paddles(ball, 20, 8, L_PADDLE, R_PADDLE), 8);
        // Above the paddle's span
        let ball = Vec2::new(PADDLE_WIDTH + 20, 299);
        assert_eq!(bounce_off_paddles(ball, 20, -8, L_PADDLE, R_PADDLE), -8);
        // Paddle edges are inclusive
        let ball = Vec2::new(PADDLE_WIDTH + 20, 400);
        assert_eq!(bounce_off_paddles(ball, 20, -8, L_PADDLE, R_PADDLE), 8);

        // Right paddle
        let ball = Vec2::new(R_PADDLE.x - 20, 320);
        assert_eq!(bounce_off_paddles(ball, 20, 8, L_PADDLE, R_PADDLE), -8);
        let ball = Vec2::new(R_PADDLE.x - 21, 320);
        assert_eq!(bounce_off_paddles(ball, 20, 8, L_PADDLE, R_PADDLE), 8);

        // Mid-field
        let ball = Vec2::new(WINDOW_WIDTH / 2, 350);
        assert_eq!(bounce_off_paddles(ball, 20, -8, L_PADDLE, R_PADDLE), -8);
    }

    #[test]
    fn paddles_at_the_integer_limits() {
        let ball = Vec2::new(BALL_SPAWN_X, BALL_SPAWN_Y);
        let far = Vec2::new(i32::MAX, i32::MAX - 10);
        let low = Vec2::new(i32::MIN, BALL_SPAWN_Y - 40);
        assert_eq!(bounce_off_paddles(ball, 25, -8, far, far), -8);
        assert_eq!(bounce_off_paddles(ball, 25, 8, low, far), 8);
        let ball = Vec2::new(i32::MIN + 1, BALL_SPAWN_Y);
        assert_eq!(bounce_off_paddles(ball, 25, -8, low, R_PADDLE), 8);
        let ball = Vec2::new(PADDLE_WIDTH + 20, i32::MAX);
        let top = Vec2::new(0, i32::MAX - 10);
        assert_eq!(bounce_off_paddles(ball, 20, -8, top, R_PADDLE), 8);
    }
}
