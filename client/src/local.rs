//! Offline variant: the same match engine against a scripted opponent.
//!
//! No authority, no sockets — the display loop advances `shared::physics`
//! directly, one unit step per rendered frame. The player drives the left
//! paddle; the right paddle follows the ball at the difficulty's AI speed
//! with a small deadzone so it wobbles less than a perfect tracker.

use crate::input::InputManager;
use crate::rendering::Renderer;
use macroquad::prelude::{is_key_pressed, next_frame, KeyCode};
use shared::{physics, Difficulty, GameState, Side, PADDLE_HEIGHT, PADDLE_MAX_Y};

pub struct LocalGame {
    state: GameState,
    difficulty: Difficulty,
    winner: Option<Side>,
}

impl LocalGame {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            state: physics::initial_state(difficulty),
            difficulty,
            winner: None,
        }
    }

    /// One display frame: apply the player's paddle, move the opponent,
    /// step the rules engine. Latches the winner; further updates are
    /// no-ops until [`LocalGame::restart`].
    pub fn update(&mut self, left_paddle_y: f32) {
        if self.winner.is_some() {
            return;
        }

        self.state.left_paddle_y = left_paddle_y.clamp(0.0, PADDLE_MAX_Y);
        self.drive_opponent();

        let outcome = physics::step(&mut self.state, self.difficulty);
        if let Some(winner) = outcome.winner {
            self.winner = Some(winner);
        }
    }

    fn drive_opponent(&mut self) {
        let ai_speed = self.difficulty.profile().ai_speed;
        let paddle_center = self.state.right_paddle_y + PADDLE_HEIGHT / 2.0;
        let diff = self.state.ball_y - paddle_center;
        if diff.abs() > ai_speed {
            self.state.right_paddle_y += ai_speed * diff.signum();
        }
        self.state.right_paddle_y = self.state.right_paddle_y.clamp(0.0, PADDLE_MAX_Y);
    }

    pub fn restart(&mut self) {
        self.state = physics::initial_state(self.difficulty);
        self.winner = None;
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }
}

/// Display loop for the offline mode. Returns when the player hits Escape.
pub async fn run(difficulty: Difficulty) {
    let mut game = LocalGame::new(difficulty);
    let mut input = InputManager::new();
    let renderer = Renderer::new();

    loop {
        let (paddle_y, _) = input.update();
        game.update(paddle_y);
        renderer.draw_match(game.state(), Some(Side::Left), game.state().left_paddle_y);

        if let Some(winner) = game.winner() {
            let headline = match winner {
                Side::Left => "You win!",
                Side::Right => "Computer wins",
            };
            renderer.draw_overlay(headline, "Enter to restart, Esc to leave");
            if is_key_pressed(KeyCode::Enter) {
                game.restart();
                input.reset();
            }
        }

        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        next_frame().await;
    }
}
