use macroquad::prelude::*;
use shared::{
    GameState, Side, BALL_RADIUS, CANVAS_HEIGHT, CANVAS_WIDTH, LEFT_PADDLE_X, PADDLE_HEIGHT,
    PADDLE_WIDTH, RIGHT_PADDLE_X,
};

const COURT_BG: Color = Color::new(0.04, 0.04, 0.07, 1.0);
const NET_COLOR: Color = Color::new(1.0, 1.0, 1.0, 0.15);
const LEFT_COLOR: Color = Color::new(1.0, 0.42, 0.42, 1.0);
const RIGHT_COLOR: Color = Color::new(0.31, 0.8, 0.77, 1.0);

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Renderer
    }

    /// Draws one frame of the court. `own_side` highlights the local
    /// paddle, which is rendered from the local prediction rather than the
    /// snapshot.
    pub fn draw_match(&self, state: &GameState, own_side: Option<Side>, local_paddle_y: f32) {
        clear_background(COURT_BG);
        self.draw_net();

        let (left_y, right_y) = match own_side {
            Some(Side::Left) => (local_paddle_y, state.right_paddle_y),
            Some(Side::Right) => (state.left_paddle_y, local_paddle_y),
            None => (state.left_paddle_y, state.right_paddle_y),
        };

        draw_rectangle(LEFT_PADDLE_X, left_y, PADDLE_WIDTH, PADDLE_HEIGHT, LEFT_COLOR);
        draw_rectangle(
            RIGHT_PADDLE_X,
            right_y,
            PADDLE_WIDTH,
            PADDLE_HEIGHT,
            RIGHT_COLOR,
        );
        draw_circle(state.ball_x, state.ball_y, BALL_RADIUS, WHITE);

        self.draw_scores(state.left_score, state.right_score);
    }

    pub fn draw_waiting(&self, room_id: Option<&str>, error: Option<&str>) {
        clear_background(COURT_BG);
        self.draw_centered("Waiting for opponent...", CANVAS_HEIGHT / 2.0 - 20.0, 30.0, WHITE);
        if let Some(room_id) = room_id {
            let invite = format!("Room code: {}", room_id);
            self.draw_centered(&invite, CANVAS_HEIGHT / 2.0 + 20.0, 30.0, RIGHT_COLOR);
        }
        if let Some(error) = error {
            self.draw_centered(error, CANVAS_HEIGHT / 2.0 + 60.0, 24.0, LEFT_COLOR);
        }
    }

    pub fn draw_overlay(&self, headline: &str, hint: &str) {
        draw_rectangle(
            0.0,
            0.0,
            CANVAS_WIDTH,
            CANVAS_HEIGHT,
            Color::new(0.0, 0.0, 0.0, 0.6),
        );
        self.draw_centered(headline, CANVAS_HEIGHT / 2.0 - 10.0, 40.0, WHITE);
        self.draw_centered(hint, CANVAS_HEIGHT / 2.0 + 30.0, 22.0, NET_COLOR);
    }

    fn draw_net(&self) {
        let mut y = 0.0;
        while y < CANVAS_HEIGHT {
            draw_rectangle(CANVAS_WIDTH / 2.0 - 2.0, y, 4.0, 12.0, NET_COLOR);
            y += 24.0;
        }
    }

    fn draw_scores(&self, left: u16, right: u16) {
        let left_text = format!("{}", left);
        let right_text = format!("{}", right);
        draw_text(&left_text, CANVAS_WIDTH / 2.0 - 80.0, 50.0, 48.0, LEFT_COLOR);
        draw_text(&right_text, CANVAS_WIDTH / 2.0 + 60.0, 50.0, 48.0, RIGHT_COLOR);
    }

    fn draw_centered(&self, text: &str, y: f32, size: f32, color: Color) {
        let dims = measure_text(text, None, size as u16, 1.0);
        draw_text(text, (CANVAS_WIDTH - dims.width) / 2.0, y, size, color);
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
