//! Paddle input with change detection for rate-limited network sends

use macroquad::prelude::*;
use shared::{PADDLE_HEIGHT, PADDLE_MAX_Y};

/// Keyboard paddle movement in units per frame.
pub const PADDLE_SPEED: f32 = 8.0;

/// Minimum movement since the last send before another `PaddleUpdate` goes
/// out. Bounds the outbound rate without visibly delaying the paddle.
const SEND_THRESHOLD: f32 = 2.0;

/// Tracks the locally predicted paddle and decides when its position is
/// worth telling the server about.
pub struct InputManager {
    paddle_y: f32,
    last_sent_y: f32,
    last_mouse_y: f32,
}

impl InputManager {
    pub fn new() -> Self {
        let centered = PADDLE_MAX_Y / 2.0;
        Self {
            paddle_y: centered,
            last_sent_y: centered,
            last_mouse_y: f32::NAN,
        }
    }

    /// Samples keyboard and mouse, moves the paddle, and returns the new
    /// position plus a network update when it drifted past the threshold.
    pub fn update(&mut self) -> (f32, Option<f32>) {
        if is_key_down(KeyCode::W) || is_key_down(KeyCode::Up) {
            self.paddle_y -= PADDLE_SPEED;
        }
        if is_key_down(KeyCode::S) || is_key_down(KeyCode::Down) {
            self.paddle_y += PADDLE_SPEED;
        }

        // Mouse only steers while it is actually moving, so the keyboard
        // isn't fighting a parked cursor.
        let (_, mouse_y) = mouse_position();
        if mouse_y != self.last_mouse_y {
            if !self.last_mouse_y.is_nan() {
                self.paddle_y = mouse_y - PADDLE_HEIGHT / 2.0;
            }
            self.last_mouse_y = mouse_y;
        }

        self.paddle_y = self.paddle_y.clamp(0.0, PADDLE_MAX_Y);

        let to_send = if should_send(self.paddle_y, self.last_sent_y) {
            self.last_sent_y = self.paddle_y;
            Some(self.paddle_y)
        } else {
            None
        };

        (self.paddle_y, to_send)
    }

    pub fn paddle_y(&self) -> f32 {
        self.paddle_y
    }

    /// Re-centers the paddle, e.g. for a restarted match.
    pub fn reset(&mut self) {
        self.paddle_y = PADDLE_MAX_Y / 2.0;
        self.last_sent_y = self.paddle_y;
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

fn should_send(current: f32, last_sent: f32) -> bool {
    (current - last_sent).abs() > SEND_THRESHOLD
}
