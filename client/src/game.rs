//! Client-side view of a networked match.
//!
//! The server is the only source of truth; this module's job is to make its
//! 30 Hz snapshots look smooth at display rate. The ball is extrapolated
//! with the last authoritative velocity and pulled toward the authoritative
//! position a fixed fraction per frame, except across large discontinuities
//! (match start, restart, long gaps) where it snaps outright — blending
//! across a big gap reads as warping. Scores and the opposing paddle come
//! verbatim from the latest snapshot.

use shared::{GameState, Side, BALL_RADIUS, CANVAS_HEIGHT, CANVAS_WIDTH};

/// Positional error beyond which the shadow ball snaps to the authority
/// instead of blending.
const SNAP_THRESHOLD: f32 = 100.0;

/// Fraction of the remaining error removed per rendered frame.
const BLEND_FACTOR: f32 = 0.2;

/// Why the match stopped, from this client's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchEnd {
    Won(Side),
    OpponentLeft,
}

/// Non-authoritative display state, rebuilt from every snapshot.
pub struct ClientGameState {
    server: Option<GameState>,
    ball_x: f32,
    ball_y: f32,
    ball_vx: f32,
    ball_vy: f32,
}

impl ClientGameState {
    pub fn new() -> Self {
        Self {
            server: None,
            ball_x: CANVAS_WIDTH / 2.0,
            ball_y: CANVAS_HEIGHT / 2.0,
            ball_vx: 0.0,
            ball_vy: 0.0,
        }
    }

    /// Adopts the match-start state wholesale; there is nothing sensible to
    /// blend from before the first snapshot.
    pub fn begin_match(&mut self, state: GameState) {
        self.server = Some(state);
        self.ball_x = state.ball_x;
        self.ball_y = state.ball_y;
        self.ball_vx = state.ball_vx;
        self.ball_vy = state.ball_vy;
    }

    /// Stores the newest authoritative snapshot. Last value wins; the frame
    /// loop reads it on its own schedule.
    pub fn apply_snapshot(&mut self, state: GameState) {
        self.server = Some(state);
    }

    /// One display-frame of dead reckoning against the latest snapshot.
    pub fn reconcile(&mut self) {
        let Some(server) = self.server else {
            return;
        };

        let error_x = server.ball_x - self.ball_x;
        let error_y = server.ball_y - self.ball_y;
        let error_dist = (error_x * error_x + error_y * error_y).sqrt();

        if error_dist > SNAP_THRESHOLD {
            self.ball_x = server.ball_x;
            self.ball_y = server.ball_y;
            self.ball_vx = server.ball_vx;
            self.ball_vy = server.ball_vy;
        } else {
            self.ball_vx = server.ball_vx;
            self.ball_vy = server.ball_vy;
            self.ball_x += self.ball_vx + error_x * BLEND_FACTOR;
            self.ball_y += self.ball_vy + error_y * BLEND_FACTOR;
        }

        // Mirror the server's wall bound; the client never resolves
        // bounces itself, it only extrapolates.
        self.ball_y = self.ball_y.clamp(BALL_RADIUS, CANVAS_HEIGHT - BALL_RADIUS);
    }

    /// The latest snapshot with the blended ball substituted in, ready to
    /// render. `None` until the first snapshot arrives.
    pub fn display_state(&self) -> Option<GameState> {
        self.server.map(|mut state| {
            state.ball_x = self.ball_x;
            state.ball_y = self.ball_y;
            state
        })
    }

    pub fn scores(&self) -> (u16, u16) {
        self.server
            .map(|s| (s.left_score, s.right_score))
            .unwrap_or((0, 0))
    }

    #[cfg(test)]
    fn ball(&self) -> (f32, f32) {
        (self.ball_x, self.ball_y)
    }
}

impl Default for ClientGameState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn snapshot_at(x: f32, y: f32) -> GameState {
        GameState {
            ball_x: x,
            ball_y: y,
            ball_vx: 0.0,
            ball_vy: 0.0,
            left_paddle_y: 200.0,
            right_paddle_y: 200.0,
            left_score: 0,
            right_score: 0,
        }
    }

    #[test]
    fn test_large_error_snaps_immediately() {
        let mut game = ClientGameState::new();
        game.begin_match(snapshot_at(400.0, 250.0));

        // 150 units of error: way past the snap threshold.
        game.apply_snapshot(snapshot_at(550.0, 250.0));
        game.reconcile();
        assert_eq!(game.ball(), (550.0, 250.0));
    }

    #[test]
    fn test_small_error_converges_geometrically() {
        let mut game = ClientGameState::new();
        game.begin_match(snapshot_at(400.0, 250.0));
        game.apply_snapshot(snapshot_at(410.0, 250.0));

        // With zero authoritative velocity each frame removes 20% of the
        // remaining error and never overshoots the authority.
        let mut expected_error = 10.0;
        for _ in 0..10 {
            game.reconcile();
            expected_error *= 0.8;
            let (x, _) = game.ball();
            assert_approx_eq!(410.0 - x, expected_error, 1e-3);
            assert!(x <= 410.0);
        }
        assert!(410.0 - game.ball().0 < 1.5);
    }

    #[test]
    fn test_extrapolates_with_authoritative_velocity() {
        let mut game = ClientGameState::new();
        let mut state = snapshot_at(400.0, 250.0);
        game.begin_match(state);

        state.ball_vx = 5.0;
        state.ball_vy = -2.0;
        game.apply_snapshot(state);

        game.reconcile();
        let (x, y) = game.ball();
        assert_approx_eq!(x, 405.0, 1e-3);
        assert_approx_eq!(y, 248.0, 1e-3);
    }

    #[test]
    fn test_shadow_ball_clamped_to_canvas() {
        let mut game = ClientGameState::new();
        let mut state = snapshot_at(400.0, 10.0);
        game.begin_match(state);

        state.ball_vy = -20.0;
        game.apply_snapshot(state);
        game.reconcile();
        assert_eq!(game.ball().1, BALL_RADIUS);

        let mut state = snapshot_at(400.0, 490.0);
        game.begin_match(state);
        state.ball_vy = 20.0;
        game.apply_snapshot(state);
        game.reconcile();
        assert_eq!(game.ball().1, CANVAS_HEIGHT - BALL_RADIUS);
    }

    #[test]
    fn test_no_snapshot_means_nothing_to_display() {
        let mut game = ClientGameState::new();
        game.reconcile();
        assert!(game.display_state().is_none());
        assert_eq!(game.scores(), (0, 0));
    }

    #[test]
    fn test_display_state_substitutes_shadow_ball() {
        let mut game = ClientGameState::new();
        game.begin_match(snapshot_at(400.0, 250.0));
        game.apply_snapshot(snapshot_at(410.0, 250.0));
        game.reconcile();

        let display = game.display_state().unwrap();
        // Paddles and scores come from the snapshot, the ball from the blend.
        assert_eq!(display.left_paddle_y, 200.0);
        assert!(display.ball_x > 400.0 && display.ball_x < 410.0);
    }
}
