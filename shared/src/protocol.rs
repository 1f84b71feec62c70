//! Control packets exchanged between clients and the authority.
//!
//! Requests and lifecycle notifications travel as bincode-encoded [`Packet`]
//! values; the high-rate state snapshot rides inside [`Packet::Snapshot`] as
//! the raw frame produced by [`crate::codec`]. Every event is one variant of
//! a closed enum, so dispatch on either end is an exhaustive `match`.

use crate::{Difficulty, GameState, Side};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub enum Packet {
    // client -> authority
    Create {
        difficulty: Difficulty,
    },
    Join {
        room_id: String,
    },
    PaddleUpdate {
        y: f32,
    },
    Restart,
    Leave,

    // authority -> client
    RoomCreated {
        room_id: String,
        side: Side,
    },
    RoomJoined {
        room_id: String,
        side: Side,
        difficulty: Difficulty,
    },
    MatchStart {
        state: GameState,
        difficulty: Difficulty,
    },
    Snapshot {
        frame: Vec<u8>,
    },
    MatchOver {
        winner: Side,
    },
    ParticipantLeft,
    Error {
        message: String,
    },
}

/// How hard the sender should try. Request/response traffic is `Reliable`;
/// snapshots are `BestEffort` — a lost one is superseded by the next tick
/// and is not worth retransmitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Reliable,
    BestEffort,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::physics;

    #[test]
    fn test_packet_serialization_create() {
        let packet = Packet::Create {
            difficulty: Difficulty::Hard,
        };
        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::Create { difficulty } => assert_eq!(difficulty, Difficulty::Hard),
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_packet_serialization_join_roundtrip() {
        let packet = Packet::Join {
            room_id: "AB12CD".to_string(),
        };
        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::Join { room_id } => assert_eq!(room_id, "AB12CD"),
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_packet_serialization_snapshot_preserves_frame() {
        let state = physics::initial_state(Difficulty::Normal);
        let frame = codec::encode(&state).to_vec();
        let packet = Packet::Snapshot {
            frame: frame.clone(),
        };

        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::Snapshot { frame: decoded } => {
                assert_eq!(decoded, frame);
                assert_eq!(codec::decode(&decoded).unwrap(), state);
            }
            _ => panic!("Wrong packet type after deserialization"),
        }
    }

    #[test]
    fn test_packet_serialization_match_over() {
        let packet = Packet::MatchOver { winner: Side::Left };
        let serialized = bincode::serialize(&packet).unwrap();
        let deserialized: Packet = bincode::deserialize(&serialized).unwrap();

        match deserialized {
            Packet::MatchOver { winner } => assert_eq!(winner, Side::Left),
            _ => panic!("Wrong packet type after deserialization"),
        }
    }
}
