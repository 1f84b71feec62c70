//! Fixed-size binary snapshot codec.
//!
//! One snapshot is 28 bytes, little-endian: six `f32` fields at offsets
//! 0/4/8/12/16/20 followed by the two `u16` scores at 24/26. The layout is a
//! compatibility surface in its own right, so it is written out by hand
//! rather than derived — round-trips are bit-exact.

use crate::GameState;
use thiserror::Error;

/// Exact length of an encoded snapshot in bytes.
pub const FRAME_LEN: usize = 28;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The buffer is not exactly one snapshot long. Decoding never reads
    /// past the end of what it was given.
    #[error("malformed snapshot frame: got {0} bytes, expected 28")]
    MalformedFrame(usize),
}

pub fn encode(state: &GameState) -> [u8; FRAME_LEN] {
    let mut frame = [0u8; FRAME_LEN];
    frame[0..4].copy_from_slice(&state.ball_x.to_le_bytes());
    frame[4..8].copy_from_slice(&state.ball_y.to_le_bytes());
    frame[8..12].copy_from_slice(&state.ball_vx.to_le_bytes());
    frame[12..16].copy_from_slice(&state.ball_vy.to_le_bytes());
    frame[16..20].copy_from_slice(&state.left_paddle_y.to_le_bytes());
    frame[20..24].copy_from_slice(&state.right_paddle_y.to_le_bytes());
    frame[24..26].copy_from_slice(&state.left_score.to_le_bytes());
    frame[26..28].copy_from_slice(&state.right_score.to_le_bytes());
    frame
}

pub fn decode(frame: &[u8]) -> Result<GameState, CodecError> {
    if frame.len() != FRAME_LEN {
        return Err(CodecError::MalformedFrame(frame.len()));
    }

    Ok(GameState {
        ball_x: f32_at(frame, 0),
        ball_y: f32_at(frame, 4),
        ball_vx: f32_at(frame, 8),
        ball_vy: f32_at(frame, 12),
        left_paddle_y: f32_at(frame, 16),
        right_paddle_y: f32_at(frame, 20),
        left_score: u16_at(frame, 24),
        right_score: u16_at(frame, 26),
    })
}

fn f32_at(frame: &[u8], offset: usize) -> f32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&frame[offset..offset + 4]);
    f32::from_le_bytes(raw)
}

fn u16_at(frame: &[u8], offset: usize) -> u16 {
    let mut raw = [0u8; 2];
    raw.copy_from_slice(&frame[offset..offset + 2]);
    u16::from_le_bytes(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> GameState {
        GameState {
            ball_x: 400.5,
            ball_y: 249.25,
            ball_vx: -6.125,
            ball_vy: 2.75,
            left_paddle_y: 180.0,
            right_paddle_y: 220.0,
            left_score: 3,
            right_score: 9,
        }
    }

    #[test]
    fn test_roundtrip_exact() {
        let state = sample_state();
        let decoded = decode(&encode(&state)).unwrap();
        assert_eq!(decoded, state);
    }

    #[test]
    fn test_roundtrip_bit_exact_for_awkward_floats() {
        let mut state = sample_state();
        state.ball_x = -0.0;
        state.ball_y = f32::MIN_POSITIVE;
        state.ball_vx = 1.0e-40; // subnormal
        state.ball_vy = -3.402_823_5e38;

        let decoded = decode(&encode(&state)).unwrap();
        assert_eq!(decoded.ball_x.to_bits(), state.ball_x.to_bits());
        assert_eq!(decoded.ball_y.to_bits(), state.ball_y.to_bits());
        assert_eq!(decoded.ball_vx.to_bits(), state.ball_vx.to_bits());
        assert_eq!(decoded.ball_vy.to_bits(), state.ball_vy.to_bits());
    }

    #[test]
    fn test_score_field_offsets() {
        let frame = encode(&sample_state());
        assert_eq!(u16::from_le_bytes([frame[24], frame[25]]), 3);
        assert_eq!(u16::from_le_bytes([frame[26], frame[27]]), 9);
    }

    #[test]
    fn test_malformed_lengths_rejected() {
        for len in [0usize, 1, 27, 29, 36, 256] {
            let buf = vec![0u8; len];
            assert_eq!(decode(&buf), Err(CodecError::MalformedFrame(len)));
        }
    }

    #[test]
    fn test_max_scores_roundtrip() {
        let mut state = sample_state();
        state.left_score = u16::MAX;
        state.right_score = 10;
        assert_eq!(decode(&encode(&state)).unwrap(), state);
    }
}
