//! Game logic and wire protocol shared by the authority and its clients.
//!
//! Everything in this crate is deterministic, synchronous and free of I/O:
//! the physics and rules engine, the fixed-size snapshot codec, and the
//! control-packet enum. The server and client crates build their event loops
//! around these pieces; neither ever reimplements game rules locally.

use serde::{Deserialize, Serialize};

pub mod codec;
pub mod physics;
pub mod protocol;

pub const CANVAS_WIDTH: f32 = 800.0;
pub const CANVAS_HEIGHT: f32 = 500.0;
pub const PADDLE_WIDTH: f32 = 12.0;
pub const PADDLE_HEIGHT: f32 = 100.0;
pub const BALL_SIZE: f32 = 14.0;
pub const BALL_RADIUS: f32 = BALL_SIZE / 2.0;
pub const WINNING_SCORE: u16 = 10;

/// X of the left paddle's left edge; the ball bounces off its right face.
pub const LEFT_PADDLE_X: f32 = 20.0;
/// X of the right paddle's left edge, mirrored from the right wall.
pub const RIGHT_PADDLE_X: f32 = CANVAS_WIDTH - 20.0 - PADDLE_WIDTH;
/// Largest legal paddle-top Y; paddles clamp to `[0, PADDLE_MAX_Y]`.
pub const PADDLE_MAX_Y: f32 = CANVAS_HEIGHT - PADDLE_HEIGHT;

/// One side of the court. Doubles as the player slot (the room creator is
/// always `Left`, the joiner `Right`) and as the scored/winner annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opponent(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// The synchronized subset of a match. This is exactly what the snapshot
/// codec carries over the wire, so every field must stay fixed-width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub ball_x: f32,
    pub ball_y: f32,
    pub ball_vx: f32,
    pub ball_vy: f32,
    pub left_paddle_y: f32,
    pub right_paddle_y: f32,
    pub left_score: u16,
    pub right_score: u16,
}

/// Match difficulty, fixed at room creation and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
    Extreme,
}

/// Speed constants for one difficulty level. `speed_increment` is the
/// per-paddle-hit multiplier and is always > 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifficultyProfile {
    pub ball_speed: f32,
    pub max_speed: f32,
    pub speed_increment: f32,
    pub ai_speed: f32,
}

impl Difficulty {
    pub const fn profile(self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                ball_speed: 4.0,
                max_speed: 12.0,
                speed_increment: 1.03,
                ai_speed: 3.0,
            },
            Difficulty::Normal => DifficultyProfile {
                ball_speed: 5.0,
                max_speed: 16.0,
                speed_increment: 1.05,
                ai_speed: 5.0,
            },
            Difficulty::Hard => DifficultyProfile {
                ball_speed: 7.0,
                max_speed: 22.0,
                speed_increment: 1.08,
                ai_speed: 7.0,
            },
            Difficulty::Extreme => DifficultyProfile {
                ball_speed: 10.0,
                max_speed: 30.0,
                speed_increment: 1.12,
                ai_speed: 10.0,
            },
        }
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "normal" => Ok(Difficulty::Normal),
            "hard" => Ok(Difficulty::Hard),
            "extreme" => Ok(Difficulty::Extreme),
            other => Err(format!(
                "unknown difficulty '{}' (expected easy, normal, hard or extreme)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_profiles() {
        assert_eq!(Difficulty::Easy.profile().ball_speed, 4.0);
        assert_eq!(Difficulty::Normal.profile().max_speed, 16.0);
        assert_eq!(Difficulty::Hard.profile().ai_speed, 7.0);
        assert_eq!(Difficulty::Extreme.profile().speed_increment, 1.12);

        for difficulty in [
            Difficulty::Easy,
            Difficulty::Normal,
            Difficulty::Hard,
            Difficulty::Extreme,
        ] {
            let profile = difficulty.profile();
            assert!(profile.speed_increment > 1.0);
            assert!(profile.max_speed > profile.ball_speed);
        }
    }

    #[test]
    fn test_difficulty_from_str() {
        assert_eq!("normal".parse::<Difficulty>(), Ok(Difficulty::Normal));
        assert_eq!("EXTREME".parse::<Difficulty>(), Ok(Difficulty::Extreme));
        assert!("impossible".parse::<Difficulty>().is_err());
    }

    #[test]
    fn test_side_opponent() {
        assert_eq!(Side::Left.opponent(), Side::Right);
        assert_eq!(Side::Right.opponent(), Side::Left);
    }

    #[test]
    fn test_paddle_geometry() {
        assert_eq!(RIGHT_PADDLE_X, 768.0);
        assert_eq!(PADDLE_MAX_Y, 400.0);
        assert_eq!(BALL_RADIUS, 7.0);
    }
}
