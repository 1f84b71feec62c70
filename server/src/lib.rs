//! # Match Authority Library
//!
//! This library implements the authoritative side of the networked
//! ball-and-paddle game. It owns the only trusted simulation of every
//! match, accepts room and input requests from clients, and broadcasts
//! compact state snapshots that clients render from.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! Every match is advanced exclusively on the server, using the physics and
//! rules engine from the `shared` crate. Clients only ever extrapolate from
//! what the server tells them; nothing a client sends can move the ball.
//!
//! ### Room Lifecycle
//! Players meet through six-character room codes. A room is created with
//! one participant, starts its match the moment the second one joins, and
//! is torn down when the last participant leaves. Restarts are accepted
//! only while both participants are present.
//!
//! ### State Broadcasting
//! Thirty times per second each live room encodes its state into a fixed
//! 28-byte frame and fans it out to both participants as best-effort
//! traffic. Lifecycle events (match start, match over, opponent left) go
//! out reliably.
//!
//! ## Architecture Design
//!
//! ### Sequential Request Handling
//! All client requests funnel through one handler loop, so registry
//! operations never race each other and need no locks.
//!
//! ### One Actor Per Room
//! Each running match lives in its own tokio task that owns the
//! `GameState` outright. Paddle moves, restarts and departures reach it as
//! channel commands processed between interval firings, which guarantees
//! that nothing mutates a room concurrently with its own tick.
//!
//! ### Catch-Up Stepping
//! The tick loop measures real elapsed time and converts it to 60 Hz unit
//! steps, clamped to three per firing, so scheduling hiccups slow the game
//! down briefly instead of teleporting the ball.
//!
//! ## Module Organization
//!
//! ### Registry Module (`registry`)
//! Room records, participant-to-room resolution, code generation and the
//! join/leave/teardown lifecycle.
//!
//! ### Room Module (`room`)
//! The per-room match actor: command channel, tick pacing, win detection
//! and snapshot broadcasting.
//!
//! ### Network Module (`network`)
//! UDP socket management, packet (de)serialization, the outbound send
//! queue with its reliable/best-effort split, and the request handler.

pub mod network;
pub mod registry;
pub mod room;
