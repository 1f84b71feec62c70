//! Room bookkeeping for the authority.
//!
//! This module owns the mapping from room codes to room records and from
//! connected participants to their rooms, including:
//! - Room lifecycle (create, join, leave, teardown when empty)
//! - Capacity enforcement (exactly two participants per room)
//! - Collision-free room-code generation
//!
//! The registry is plain data owned by the serving component; it never
//! touches the network and never spawns tasks, which keeps every lifecycle
//! transition unit-testable.

use crate::room::RoomHandle;
use log::info;
use rand::Rng;
use shared::{Difficulty, Side};
use std::collections::HashMap;
use std::net::SocketAddr;
use thiserror::Error;

/// Rooms hold exactly one match: two participants, no spectators.
pub const ROOM_CAPACITY: usize = 2;

const CODE_LEN: usize = 6;
const CODE_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RoomError {
    #[error("Room not found")]
    RoomNotFound,
    #[error("Room is full")]
    RoomFull,
    #[error("Both players must be present")]
    NotEnoughParticipants,
}

/// One active or waiting match.
///
/// A room is created with a single participant and no running match; the
/// second join fills it and the serving component spawns the match actor,
/// parking its handle here. Slot assignment is fixed at join time: slot 0
/// plays the left paddle, slot 1 the right, and a participant keeps their
/// slot for as long as they stay — a departure leaves a hole rather than
/// shifting the survivor.
pub struct Room {
    pub id: String,
    pub slots: [Option<SocketAddr>; ROOM_CAPACITY],
    pub difficulty: Difficulty,
    pub handle: Option<RoomHandle>,
}

impl Room {
    /// The side a participant controls, fixed at join time.
    pub fn slot_of(&self, addr: SocketAddr) -> Option<Side> {
        match self.slots.iter().position(|s| *s == Some(addr)) {
            Some(0) => Some(Side::Left),
            Some(1) => Some(Side::Right),
            _ => None,
        }
    }

    pub fn occupants(&self) -> Vec<SocketAddr> {
        self.slots.iter().flatten().copied().collect()
    }

    pub fn occupant_count(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }
}

/// What a departure left behind, so the caller can notify survivors.
#[derive(Debug)]
pub struct Departure {
    pub room_id: String,
    /// Empty when the room was torn down with the departing participant.
    pub remaining: Vec<SocketAddr>,
}

/// All rooms known to this authority process.
///
/// Owned and injected by the serving component — there is no global room
/// table. The `members` map mirrors room membership by address so in-flight
/// packets from departed participants resolve to a silent no-op instead of
/// an error.
pub struct RoomRegistry {
    rooms: HashMap<String, Room>,
    members: HashMap<SocketAddr, String>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            rooms: HashMap::new(),
            members: HashMap::new(),
        }
    }

    /// Creates a room with the given participant in the left slot and
    /// returns the generated room code.
    pub fn create_room(&mut self, addr: SocketAddr, difficulty: Difficulty) -> String {
        let id = self.generate_room_id();
        let room = Room {
            id: id.clone(),
            slots: [Some(addr), None],
            difficulty,
            handle: None,
        };
        self.rooms.insert(id.clone(), room);
        self.members.insert(addr, id.clone());
        info!("Room {} created by {} ({:?})", id, addr, difficulty);
        id
    }

    /// Adds a participant to the first free slot of an existing room. Room
    /// codes are matched case-insensitively. Filling the second slot is the
    /// caller's signal to start the match.
    pub fn join_room(
        &mut self,
        room_id: &str,
        addr: SocketAddr,
    ) -> Result<(String, Side, Difficulty), RoomError> {
        let id = room_id.to_ascii_uppercase();
        let room = self.rooms.get_mut(&id).ok_or(RoomError::RoomNotFound)?;
        let free = room
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(RoomError::RoomFull)?;

        room.slots[free] = Some(addr);
        self.members.insert(addr, id.clone());
        let side = if free == 0 { Side::Left } else { Side::Right };
        info!("{} joined room {} as {:?}", addr, id, side);
        Ok((id, side, room.difficulty))
    }

    /// Removes a participant from whatever room they occupy. Tears the room
    /// down entirely when it empties. Returns `None` when the address is not
    /// in any room (e.g. a leave raced an earlier teardown).
    pub fn leave(&mut self, addr: SocketAddr) -> Option<Departure> {
        let room_id = self.members.remove(&addr)?;
        let room = self.rooms.get_mut(&room_id)?;
        for slot in room.slots.iter_mut() {
            if *slot == Some(addr) {
                *slot = None;
            }
        }

        let remaining = room.occupants();
        if remaining.is_empty() {
            self.rooms.remove(&room_id);
            info!("Room {} destroyed", room_id);
        } else {
            info!("{} left room {}", addr, room_id);
        }
        Some(Departure { room_id, remaining })
    }

    pub fn get_mut(&mut self, room_id: &str) -> Option<&mut Room> {
        self.rooms.get_mut(room_id)
    }

    /// Resolves the room a participant currently occupies.
    pub fn room_of(&self, addr: SocketAddr) -> Option<&Room> {
        self.rooms.get(self.members.get(&addr)?)
    }

    pub fn room_of_mut(&mut self, addr: SocketAddr) -> Option<&mut Room> {
        let room_id = self.members.get(&addr)?.clone();
        self.rooms.get_mut(&room_id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Draws random codes until one is unused. Collisions are vanishingly
    /// rare at this key space (36^6) but cost one map probe to rule out.
    fn generate_room_id(&self) -> String {
        let mut rng = rand::thread_rng();
        loop {
            let id: String = (0..CODE_LEN)
                .map(|_| CODE_CHARS[rng.gen_range(0..CODE_CHARS.len())] as char)
                .collect();
            if !self.rooms.contains_key(&id) {
                return id;
            }
        }
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}
