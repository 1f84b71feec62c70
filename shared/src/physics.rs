//! The authoritative physics and rules engine.
//!
//! All functions here are pure with respect to I/O: they mutate a
//! [`GameState`] in place and report what happened. The server's tick loop
//! and the client's offline mode drive the exact same code, so a point is
//! scored the same way everywhere. One call to [`advance`] is one 60 Hz unit
//! step; pacing is the caller's concern.

use crate::{
    Difficulty, GameState, Side, BALL_RADIUS, CANVAS_HEIGHT, CANVAS_WIDTH, LEFT_PADDLE_X,
    PADDLE_HEIGHT, PADDLE_WIDTH, RIGHT_PADDLE_X, WINNING_SCORE,
};
use rand::Rng;

/// Exit angles off a paddle span ±30° around horizontal, scaled by the hit
/// offset from the paddle center. Serves use the same spread.
const ANGLE_SPREAD: f32 = std::f32::consts::PI / 3.0;

/// Post-score serves ramp up 8% per total point but never start above 60%
/// of the difficulty's speed cap.
const SERVE_RAMP: f32 = 0.08;
const SERVE_CAP: f32 = 0.6;

/// Result of one paddle sweep test: the fractional tick time of the crossing
/// and the ball-center Y interpolated at that instant.
#[derive(Debug, Clone, Copy)]
pub struct PaddleHit {
    pub t: f32,
    pub hit_y: f32,
}

/// Creates the state both players see at match start: everything centered,
/// serve direction and angle random, speed taken from the difficulty.
pub fn initial_state(difficulty: Difficulty) -> GameState {
    let profile = difficulty.profile();
    let mut rng = rand::thread_rng();
    let direction = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    let angle = (rng.gen::<f32>() - 0.5) * ANGLE_SPREAD;

    GameState {
        ball_x: CANVAS_WIDTH / 2.0,
        ball_y: CANVAS_HEIGHT / 2.0,
        ball_vx: profile.ball_speed * direction * angle.cos(),
        ball_vy: profile.ball_speed * angle.sin(),
        left_paddle_y: CANVAS_HEIGHT / 2.0 - PADDLE_HEIGHT / 2.0,
        right_paddle_y: CANVAS_HEIGHT / 2.0 - PADDLE_HEIGHT / 2.0,
        left_score: 0,
        right_score: 0,
    }
}

/// Re-centers the ball for the serve after a point. `direction` is the sign
/// of the new horizontal velocity. Serve speed grows with the total score so
/// late-game rallies start faster, capped well below the in-play maximum.
pub fn reset_ball(state: &mut GameState, direction: f32, difficulty: Difficulty) {
    let profile = difficulty.profile();
    let total_score = (state.left_score + state.right_score) as f32;
    let progress_bonus = 1.0 + total_score * SERVE_RAMP;
    let start_speed = (profile.ball_speed * progress_bonus).min(profile.max_speed * SERVE_CAP);
    let angle = (rand::thread_rng().gen::<f32>() - 0.5) * ANGLE_SPREAD;

    state.ball_x = CANVAS_WIDTH / 2.0;
    state.ball_y = CANVAS_HEIGHT / 2.0;
    state.ball_vx = start_speed * direction * angle.cos();
    state.ball_vy = start_speed * angle.sin();
}

/// Swept collision test against one paddle's facing edge.
///
/// Interpolates the ball's leading edge between its previous and next
/// position and reports the fractional time `t` at which it crosses the
/// paddle face, provided the interpolated ball center lies within the paddle
/// span at that instant. A ball fast enough to pass the whole paddle within
/// one step still crosses the face at some `t`, so this cannot tunnel the
/// way an end-of-step overlap test would.
pub fn paddle_sweep(
    prev_x: f32,
    prev_y: f32,
    next_x: f32,
    next_y: f32,
    paddle_x: f32,
    paddle_y: f32,
    moving_left: bool,
) -> Option<PaddleHit> {
    let paddle_edge = if moving_left {
        paddle_x + PADDLE_WIDTH
    } else {
        paddle_x
    };
    let ball_edge = if moving_left {
        -BALL_RADIUS
    } else {
        BALL_RADIUS
    };

    let prev_ball_edge = prev_x + ball_edge;
    let next_ball_edge = next_x + ball_edge;

    // No crossing of the face this step.
    if moving_left {
        if prev_ball_edge <= paddle_edge || next_ball_edge > paddle_edge {
            return None;
        }
    } else if prev_ball_edge >= paddle_edge || next_ball_edge < paddle_edge {
        return None;
    }

    let t = (paddle_edge - prev_ball_edge) / (next_ball_edge - prev_ball_edge);
    if !(0.0..=1.0).contains(&t) {
        return None;
    }

    let hit_y = prev_y + t * (next_y - prev_y);
    if hit_y >= paddle_y && hit_y <= paddle_y + PADDLE_HEIGHT {
        Some(PaddleHit { t, hit_y })
    } else {
        None
    }
}

/// Advances the ball by one unit step and reports who scored, if anyone.
///
/// Order of resolution: wall reflection on the projected position, then the
/// swept paddle test on whichever paddle the ball is approaching, then the
/// position write, then the score check on the written center X. At most one
/// side can score per step.
pub fn advance(state: &mut GameState, difficulty: Difficulty) -> Option<Side> {
    let profile = difficulty.profile();

    let prev_x = state.ball_x;
    let prev_y = state.ball_y;
    let mut next_x = prev_x + state.ball_vx;
    let mut next_y = prev_y + state.ball_vy;

    if next_y - BALL_RADIUS <= 0.0 {
        next_y = BALL_RADIUS;
        state.ball_vy = -state.ball_vy;
    } else if next_y + BALL_RADIUS >= CANVAS_HEIGHT {
        next_y = CANVAS_HEIGHT - BALL_RADIUS;
        state.ball_vy = -state.ball_vy;
    }

    if state.ball_vx < 0.0 {
        if let Some(hit) = paddle_sweep(
            prev_x,
            prev_y,
            next_x,
            next_y,
            LEFT_PADDLE_X,
            state.left_paddle_y,
            true,
        ) {
            // Snap to the face so the ball never embeds in the paddle.
            next_x = LEFT_PADDLE_X + PADDLE_WIDTH + BALL_RADIUS;
            next_y = hit.hit_y;

            let current_speed = (state.ball_vx * state.ball_vx + state.ball_vy * state.ball_vy).sqrt();
            let new_speed = (current_speed * profile.speed_increment).min(profile.max_speed);
            let hit_offset = (hit.hit_y - state.left_paddle_y) / PADDLE_HEIGHT - 0.5;
            let angle = hit_offset * ANGLE_SPREAD;
            state.ball_vx = new_speed * angle.cos();
            state.ball_vy = new_speed * angle.sin();
        }
    }

    if state.ball_vx > 0.0 {
        if let Some(hit) = paddle_sweep(
            prev_x,
            prev_y,
            next_x,
            next_y,
            RIGHT_PADDLE_X,
            state.right_paddle_y,
            false,
        ) {
            next_x = RIGHT_PADDLE_X - BALL_RADIUS;
            next_y = hit.hit_y;

            let current_speed = (state.ball_vx * state.ball_vx + state.ball_vy * state.ball_vy).sqrt();
            let new_speed = (current_speed * profile.speed_increment).min(profile.max_speed);
            let hit_offset = (hit.hit_y - state.right_paddle_y) / PADDLE_HEIGHT - 0.5;
            let angle = hit_offset * ANGLE_SPREAD;
            state.ball_vx = -new_speed * angle.cos();
            state.ball_vy = new_speed * angle.sin();
        }
    }

    state.ball_x = next_x;
    state.ball_y = next_y;

    if state.ball_x < 0.0 {
        Some(Side::Right)
    } else if state.ball_x > CANVAS_WIDTH {
        Some(Side::Left)
    } else {
        None
    }
}

/// What one full rules step produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    pub scored: Option<Side>,
    pub winner: Option<Side>,
}

/// One complete rules step: advance the ball, apply any point, and either
/// declare the winner or serve toward the conceding side. The winning point
/// does not reset the ball — the final state stands as the last snapshot.
pub fn step(state: &mut GameState, difficulty: Difficulty) -> StepOutcome {
    let scored = advance(state, difficulty);
    let mut winner = None;

    match scored {
        Some(Side::Right) => {
            state.right_score += 1;
            if state.right_score >= WINNING_SCORE {
                winner = Some(Side::Right);
            } else {
                reset_ball(state, 1.0, difficulty);
            }
        }
        Some(Side::Left) => {
            state.left_score += 1;
            if state.left_score >= WINNING_SCORE {
                winner = Some(Side::Left);
            } else {
                reset_ball(state, -1.0, difficulty);
            }
        }
        None => {}
    }

    StepOutcome { scored, winner }
}
