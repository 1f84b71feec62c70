//! # Display Client Library
//!
//! This library implements everything the player-facing process needs: a
//! networked session against the authority, and an offline mode against a
//! scripted opponent, both rendered with macroquad at display rate.
//!
//! ## Architecture Overview
//!
//! The networked mode is built around dead reckoning rather than
//! prediction-and-rollback. The authority broadcasts a compact snapshot
//! thirty times per second; the client extrapolates the ball between
//! snapshots using the last authoritative velocity and bleeds off the
//! accumulated error a fixed fraction per frame, snapping outright when the
//! gap is too large to blend through. The client never resolves collisions
//! itself — a bounce only changes the rendered trajectory once the
//! authority says so.
//!
//! ### Optimistic Local Paddle
//! The player's own paddle is applied to the screen immediately and sent to
//! the authority only when it has moved meaningfully, so input feels
//! instant while the outbound packet rate stays bounded. The opposing
//! paddle is drawn verbatim from the latest snapshot.
//!
//! ### Frame Loop vs Socket
//! macroquad owns the frame loop, so sockets live on a background thread
//! with a small tokio runtime. Packets cross between the two on unbounded
//! channels; the frame loop drains its inbox every frame and the newest
//! snapshot always wins.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! The reconciliation engine: snapshot storage, extrapolation, blending,
//! snap correction and the terminal match outcome.
//!
//! ### Input Module (`input`)
//! Keyboard and mouse paddle control with change-threshold gating for
//! outgoing paddle updates.
//!
//! ### Network Module (`network`)
//! The socket pump thread, the session state machine (waiting, playing,
//! terminal) and the display-rate session loop.
//!
//! ### Local Module (`local`)
//! The offline variant: same rules engine, scripted opponent, no sockets.
//!
//! ### Rendering Module (`rendering`)
//! Court, paddles, ball, scores and overlay text.

pub mod game;
pub mod input;
pub mod local;
pub mod network;
pub mod rendering;
