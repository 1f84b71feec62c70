//! Per-room match actor: the authoritative tick loop.
//!
//! Each full room gets one tokio task that owns its `GameState` outright.
//! Paddle moves, restarts and departures arrive as [`RoomCommand`] values on
//! the same task that fires the 30 Hz interval, so nothing else can ever
//! touch the state concurrently and no locking is needed. Physics runs in
//! 60 Hz unit steps derived from measured wall-clock time, capped so a
//! stalled process cannot replay a burst of steps and teleport the ball.

use crate::network::OutboundMessage;
use log::{debug, info};
use shared::protocol::{Delivery, Packet};
use shared::{codec, physics, Difficulty, GameState, PADDLE_MAX_Y};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval, Instant, MissedTickBehavior};

/// Broadcast rate of the authoritative loop.
pub const TICK_RATE: u32 = 30;

/// One physics unit step is 1/60 s of simulated time.
const STEP_MS: f32 = 1000.0 / 60.0;

/// Upper bound on catch-up steps per firing. Keeps a scheduling stall from
/// flushing dozens of steps in one burst.
const MAX_CATCH_UP_STEPS: u32 = 3;

/// Input events delivered to a match actor.
#[derive(Debug)]
pub enum RoomCommand {
    Paddle { addr: SocketAddr, y: f32 },
    Restart,
    Leave { addr: SocketAddr },
}

/// Cheap handle for feeding commands to a match actor. Dropping the last
/// handle closes the channel and the actor winds down on its own.
#[derive(Debug)]
pub struct RoomHandle {
    tx: mpsc::UnboundedSender<RoomCommand>,
}

impl RoomHandle {
    /// Sending to a finished actor is a silent no-op; the effect simply no
    /// longer has a destination.
    pub fn send(&self, cmd: RoomCommand) {
        let _ = self.tx.send(cmd);
    }
}

/// Number of 60 Hz unit steps covered by `elapsed` wall-clock time, rounded
/// to the nearest step and clamped to [`MAX_CATCH_UP_STEPS`].
pub fn catch_up_steps(elapsed: Duration) -> u32 {
    let steps = (elapsed.as_secs_f32() * 1000.0 / STEP_MS).round() as u32;
    steps.min(MAX_CATCH_UP_STEPS)
}

/// Spawns the match actor for a freshly filled room. The actor immediately
/// broadcasts `MatchStart` with the initial state and begins ticking.
pub fn spawn(
    room_id: String,
    difficulty: Difficulty,
    members: [SocketAddr; 2],
    out: mpsc::UnboundedSender<OutboundMessage>,
) -> RoomHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    let room = MatchRoom::new(room_id, difficulty, members, out, rx);
    tokio::spawn(room.run());
    RoomHandle { tx }
}

struct MatchRoom {
    id: String,
    difficulty: Difficulty,
    /// Slot-aligned members: index 0 drives the left paddle, 1 the right.
    members: [Option<SocketAddr>; 2],
    state: GameState,
    ticking: bool,
    last_fire: Instant,
    out: mpsc::UnboundedSender<OutboundMessage>,
    rx: mpsc::UnboundedReceiver<RoomCommand>,
}

impl MatchRoom {
    fn new(
        id: String,
        difficulty: Difficulty,
        members: [SocketAddr; 2],
        out: mpsc::UnboundedSender<OutboundMessage>,
        rx: mpsc::UnboundedReceiver<RoomCommand>,
    ) -> Self {
        Self {
            id,
            difficulty,
            members: [Some(members[0]), Some(members[1])],
            state: physics::initial_state(difficulty),
            ticking: true,
            last_fire: Instant::now(),
            out,
            rx,
        }
    }

    async fn run(mut self) {
        info!("Room {}: match started ({:?})", self.id, self.difficulty);
        self.broadcast(
            Packet::MatchStart {
                state: self.state,
                difficulty: self.difficulty,
            },
            Delivery::Reliable,
        );

        let mut ticker = interval(Duration::from_secs_f32(1.0 / TICK_RATE as f32));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; consume it so elapsed time
        // measures real inter-tick gaps.
        ticker.tick().await;
        self.last_fire = Instant::now();

        loop {
            tokio::select! {
                cmd = self.rx.recv() => {
                    match cmd {
                        Some(cmd) => {
                            if !self.handle_command(cmd) {
                                break;
                            }
                        }
                        // Registry dropped the handle: room torn down.
                        None => break,
                    }
                }
                _ = ticker.tick(), if self.ticking => {
                    let now = Instant::now();
                    let elapsed = now - self.last_fire;
                    self.last_fire = now;
                    self.fire(elapsed);
                }
            }
        }

        debug!("Room {}: actor stopped", self.id);
    }

    /// Returns false when the actor should stop.
    fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Paddle { addr, y } => {
                let y = y.clamp(0.0, PADDLE_MAX_Y);
                if self.members[0] == Some(addr) {
                    self.state.left_paddle_y = y;
                } else if self.members[1] == Some(addr) {
                    self.state.right_paddle_y = y;
                }
                true
            }
            RoomCommand::Restart => {
                // A fresh state object, not a field reset of the old one.
                self.state = physics::initial_state(self.difficulty);
                self.ticking = true;
                self.last_fire = Instant::now();
                info!("Room {}: match restarted", self.id);
                self.broadcast(
                    Packet::MatchStart {
                        state: self.state,
                        difficulty: self.difficulty,
                    },
                    Delivery::Reliable,
                );
                true
            }
            RoomCommand::Leave { addr } => {
                for slot in self.members.iter_mut() {
                    if *slot == Some(addr) {
                        *slot = None;
                    }
                }
                // A match cannot continue one-sided.
                self.ticking = false;
                false
            }
        }
    }

    /// One timer firing: run the owed unit steps, settle any point after
    /// each individual step, then broadcast a snapshot if the match is
    /// still live.
    fn fire(&mut self, elapsed: Duration) {
        if self.members.iter().any(Option::is_none) {
            // A departure raced the timer; stop driving the match.
            self.ticking = false;
            return;
        }

        for _ in 0..catch_up_steps(elapsed) {
            let outcome = physics::step(&mut self.state, self.difficulty);
            if let Some(winner) = outcome.winner {
                info!(
                    "Room {}: {:?} wins {}-{}",
                    self.id, winner, self.state.left_score, self.state.right_score
                );
                self.broadcast(Packet::MatchOver { winner }, Delivery::Reliable);
                // Timer stops here; the last broadcast state stays final.
                self.ticking = false;
                return;
            }
        }

        let frame = codec::encode(&self.state).to_vec();
        self.broadcast(Packet::Snapshot { frame }, Delivery::BestEffort);
    }

    fn broadcast(&self, packet: Packet, delivery: Delivery) {
        let addrs: Vec<SocketAddr> = self.members.iter().flatten().copied().collect();
        let _ = self.out.send(OutboundMessage::Broadcast {
            packet,
            addrs,
            delivery,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{Side, WINNING_SCORE};
    use std::net::{IpAddr, Ipv4Addr};

    fn addr(port: u16) -> SocketAddr {
        SocketAddr::new(IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1)), port)
    }

    fn test_room() -> (
        MatchRoom,
        mpsc::UnboundedReceiver<OutboundMessage>,
        mpsc::UnboundedSender<RoomCommand>,
    ) {
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let room = MatchRoom::new(
            "TEST01".to_string(),
            Difficulty::Normal,
            [addr(1000), addr(1001)],
            out_tx,
            cmd_rx,
        );
        (room, out_rx, cmd_tx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<OutboundMessage>) -> Vec<OutboundMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    #[test]
    fn test_catch_up_steps_rounding() {
        assert_eq!(catch_up_steps(Duration::from_millis(5)), 0);
        assert_eq!(catch_up_steps(Duration::from_millis(17)), 1);
        assert_eq!(catch_up_steps(Duration::from_millis(33)), 2);
        assert_eq!(catch_up_steps(Duration::from_millis(50)), 3);
    }

    #[test]
    fn test_catch_up_steps_clamped() {
        assert_eq!(catch_up_steps(Duration::from_millis(500)), 3);
        assert_eq!(catch_up_steps(Duration::from_secs(60)), 3);
    }

    #[test]
    fn test_paddle_command_clamps_and_routes() {
        let (mut room, _out, _tx) = test_room();

        room.handle_command(RoomCommand::Paddle {
            addr: addr(1000),
            y: -50.0,
        });
        assert_eq!(room.state.left_paddle_y, 0.0);

        room.handle_command(RoomCommand::Paddle {
            addr: addr(1001),
            y: 9999.0,
        });
        assert_eq!(room.state.right_paddle_y, PADDLE_MAX_Y);

        // Unknown sender moves nothing.
        room.handle_command(RoomCommand::Paddle {
            addr: addr(9999),
            y: 123.0,
        });
        assert_eq!(room.state.left_paddle_y, 0.0);
        assert_eq!(room.state.right_paddle_y, PADDLE_MAX_Y);
    }

    #[test]
    fn test_fire_broadcasts_snapshot() {
        let (mut room, mut out, _tx) = test_room();
        room.fire(Duration::from_millis(33));

        let messages = drain(&mut out);
        assert_eq!(messages.len(), 1);
        match &messages[0] {
            OutboundMessage::Broadcast {
                packet: Packet::Snapshot { frame },
                addrs,
                delivery,
            } => {
                assert_eq!(frame.len(), codec::FRAME_LEN);
                assert_eq!(addrs.len(), 2);
                assert_eq!(*delivery, Delivery::BestEffort);
            }
            other => panic!("Expected best-effort snapshot, got {:?}", other),
        }
    }

    #[test]
    fn test_winning_point_ends_match_exactly_once() {
        let (mut room, mut out, _tx) = test_room();
        // Ball about to exit on the left with the score at match point.
        room.state.right_score = WINNING_SCORE - 1;
        room.state.ball_x = 3.0;
        room.state.ball_y = 400.0;
        room.state.ball_vx = -10.0;
        room.state.ball_vy = 0.0;
        room.state.left_paddle_y = 0.0;

        room.fire(Duration::from_millis(33));
        assert!(!room.ticking);
        assert_eq!(room.state.right_score, WINNING_SCORE);

        let messages = drain(&mut out);
        let match_overs: Vec<_> = messages
            .iter()
            .filter(|m| {
                matches!(
                    m,
                    OutboundMessage::Broadcast {
                        packet: Packet::MatchOver {
                            winner: Side::Right
                        },
                        delivery: Delivery::Reliable,
                        ..
                    }
                )
            })
            .collect();
        assert_eq!(match_overs.len(), 1);
        // No snapshot follows the terminal notification.
        assert_eq!(messages.len(), 1);
    }

    #[test]
    fn test_restart_replaces_state_and_rebroadcasts() {
        let (mut room, mut out, _tx) = test_room();
        room.state.left_score = 7;
        room.ticking = false;

        assert!(room.handle_command(RoomCommand::Restart));
        assert!(room.ticking);
        assert_eq!(room.state.left_score, 0);
        assert_eq!(room.state.ball_x, 400.0);

        let messages = drain(&mut out);
        assert!(matches!(
            messages.as_slice(),
            [OutboundMessage::Broadcast {
                packet: Packet::MatchStart { .. },
                delivery: Delivery::Reliable,
                ..
            }]
        ));
    }

    #[test]
    fn test_leave_stops_actor() {
        let (mut room, _out, _tx) = test_room();
        let keep_running = room.handle_command(RoomCommand::Leave { addr: addr(1000) });
        assert!(!keep_running);
        assert!(!room.ticking);
        assert_eq!(room.members[0], None);
        assert_eq!(room.members[1], Some(addr(1001)));
    }

    #[test]
    fn test_fire_stops_when_member_missing() {
        let (mut room, mut out, _tx) = test_room();
        room.members[1] = None;

        room.fire(Duration::from_millis(33));
        assert!(!room.ticking);
        assert!(drain(&mut out).is_empty());
    }
}
