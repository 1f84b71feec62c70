//! Networked match client: socket pump and the display-rate session loop.
//!
//! macroquad owns the frame loop, so the UDP socket lives on its own thread
//! inside a small tokio runtime. The two halves meet over unbounded
//! channels: the frame loop drains every packet that arrived since the last
//! frame (so the newest snapshot always wins) and queues sends without ever
//! blocking on I/O.

use crate::game::{ClientGameState, MatchEnd};
use crate::input::InputManager;
use crate::rendering::Renderer;
use bincode::{deserialize, serialize};
use log::{error, info, warn};
use macroquad::prelude::{is_key_pressed, next_frame, KeyCode};
use shared::protocol::Packet;
use shared::{codec, Difficulty, Side};
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

/// How a session enters a room.
pub enum SessionMode {
    Create { difficulty: Difficulty },
    Join { room_id: String },
}

#[derive(Clone, Copy)]
enum Phase {
    Waiting,
    Playing,
    Over(MatchEnd),
}

pub struct Client {
    to_server: mpsc::UnboundedSender<Packet>,
    from_server: mpsc::UnboundedReceiver<Packet>,

    game: ClientGameState,
    input: InputManager,
    renderer: Renderer,

    side: Option<Side>,
    room_id: Option<String>,
    error: Option<String>,
    phase: Phase,
}

impl Client {
    /// Binds a socket on a background thread and wires up the channels.
    pub fn connect(server_addr: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let server_addr: SocketAddr = server_addr.parse()?;
        let (to_server, out_rx) = mpsc::unbounded_channel::<Packet>();
        let (in_tx, from_server) = mpsc::unbounded_channel::<Packet>();

        std::thread::spawn(move || socket_pump(server_addr, out_rx, in_tx));

        Ok(Client {
            to_server,
            from_server,
            game: ClientGameState::new(),
            input: InputManager::new(),
            renderer: Renderer::new(),
            side: None,
            room_id: None,
            error: None,
            phase: Phase::Waiting,
        })
    }

    fn send(&self, packet: Packet) {
        let _ = self.to_server.send(packet);
    }

    fn handle_packet(&mut self, packet: Packet) {
        match packet {
            Packet::RoomCreated { room_id, side } => {
                info!("Room {} created, we play {:?}", room_id, side);
                self.room_id = Some(room_id);
                self.side = Some(side);
            }
            Packet::RoomJoined {
                room_id,
                side,
                difficulty,
            } => {
                info!("Joined room {} as {:?} ({:?})", room_id, side, difficulty);
                self.room_id = Some(room_id);
                self.side = Some(side);
            }
            Packet::MatchStart { state, .. } => {
                info!("Match started");
                self.game.begin_match(state);
                self.input.reset();
                self.error = None;
                self.phase = Phase::Playing;
            }
            Packet::Snapshot { frame } => match codec::decode(&frame) {
                Ok(state) => self.game.apply_snapshot(state),
                // Fail closed: keep showing the last good snapshot.
                Err(e) => warn!("Dropping snapshot: {}", e),
            },
            Packet::MatchOver { winner } => {
                info!("Match over, {:?} wins", winner);
                self.phase = Phase::Over(MatchEnd::Won(winner));
            }
            Packet::ParticipantLeft => {
                info!("Opponent left the room");
                self.phase = Phase::Over(MatchEnd::OpponentLeft);
            }
            Packet::Error { message } => {
                error!("Server: {}", message);
                self.error = Some(message);
            }
            _ => warn!("Unexpected packet from server"),
        }
    }

    fn overlay_headline(&self, end: MatchEnd) -> &'static str {
        match end {
            MatchEnd::OpponentLeft => "Opponent left",
            MatchEnd::Won(winner) => {
                if self.side == Some(winner) {
                    "You win!"
                } else {
                    "Opponent wins"
                }
            }
        }
    }

    /// Runs the session until the player backs out with Escape.
    pub async fn run(&mut self, mode: SessionMode) -> Result<(), Box<dyn std::error::Error>> {
        match mode {
            SessionMode::Create { difficulty } => self.send(Packet::Create { difficulty }),
            SessionMode::Join { room_id } => self.send(Packet::Join { room_id }),
        }

        loop {
            while let Ok(packet) = self.from_server.try_recv() {
                self.handle_packet(packet);
            }

            match self.phase {
                Phase::Waiting => {
                    self.renderer
                        .draw_waiting(self.room_id.as_deref(), self.error.as_deref());
                }
                Phase::Playing => {
                    let (paddle_y, to_send) = self.input.update();
                    if let Some(y) = to_send {
                        self.send(Packet::PaddleUpdate { y });
                    }

                    self.game.reconcile();
                    if let Some(state) = self.game.display_state() {
                        self.renderer.draw_match(&state, self.side, paddle_y);
                    }
                }
                Phase::Over(end) => {
                    if let Some(state) = self.game.display_state() {
                        self.renderer
                            .draw_match(&state, self.side, self.input.paddle_y());
                    }
                    let hint = match end {
                        MatchEnd::OpponentLeft => "Esc to leave",
                        MatchEnd::Won(_) => "Enter to restart, Esc to leave",
                    };
                    self.renderer.draw_overlay(self.overlay_headline(end), hint);

                    if matches!(end, MatchEnd::Won(_)) && is_key_pressed(KeyCode::Enter) {
                        self.send(Packet::Restart);
                    }
                }
            }

            if is_key_pressed(KeyCode::Escape) {
                self.send(Packet::Leave);
                break;
            }

            next_frame().await;
        }

        Ok(())
    }
}

/// Socket side of the bridge: forwards queued packets to the server and
/// decoded packets back to the frame loop until either channel closes.
fn socket_pump(
    server_addr: SocketAddr,
    mut out_rx: mpsc::UnboundedReceiver<Packet>,
    in_tx: mpsc::UnboundedSender<Packet>,
) {
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to build network runtime: {}", e);
            return;
        }
    };

    runtime.block_on(async move {
        let socket = match UdpSocket::bind("0.0.0.0:0").await {
            Ok(socket) => socket,
            Err(e) => {
                error!("Failed to bind client socket: {}", e);
                return;
            }
        };

        let mut buf = [0u8; 2048];
        loop {
            tokio::select! {
                outgoing = out_rx.recv() => {
                    match outgoing {
                        Some(packet) => match serialize(&packet) {
                            Ok(data) => {
                                if let Err(e) = socket.send_to(&data, server_addr).await {
                                    error!("Send failed: {}", e);
                                }
                            }
                            Err(e) => error!("Failed to serialize packet: {}", e),
                        },
                        // Frame loop dropped the client.
                        None => break,
                    }
                }
                result = socket.recv_from(&mut buf) => {
                    match result {
                        Ok((len, _)) => {
                            if let Ok(packet) = deserialize::<Packet>(&buf[0..len]) {
                                if in_tx.send(packet).is_err() {
                                    break;
                                }
                            } else {
                                warn!("Undecodable packet from server");
                            }
                        }
                        Err(e) => error!("Error receiving packet: {}", e),
                    }
                }
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{physics, GameState};

    fn test_client() -> Client {
        let (to_server, _out_rx) = mpsc::unbounded_channel();
        let (_in_tx, from_server) = mpsc::unbounded_channel();
        Client {
            to_server,
            from_server,
            game: ClientGameState::new(),
            input: InputManager::new(),
            renderer: Renderer::new(),
            side: None,
            room_id: None,
            error: None,
            phase: Phase::Waiting,
        }
    }

    fn started_state() -> GameState {
        physics::initial_state(Difficulty::Normal)
    }

    #[test]
    fn test_room_created_stores_identity() {
        let mut client = test_client();
        client.handle_packet(Packet::RoomCreated {
            room_id: "AB12CD".to_string(),
            side: Side::Left,
        });
        assert_eq!(client.room_id.as_deref(), Some("AB12CD"));
        assert_eq!(client.side, Some(Side::Left));
        assert!(matches!(client.phase, Phase::Waiting));
    }

    #[test]
    fn test_match_start_enters_play() {
        let mut client = test_client();
        client.handle_packet(Packet::MatchStart {
            state: started_state(),
            difficulty: Difficulty::Normal,
        });
        assert!(matches!(client.phase, Phase::Playing));
        assert!(client.game.display_state().is_some());
    }

    #[test]
    fn test_malformed_snapshot_keeps_last_good_state() {
        let mut client = test_client();
        let state = started_state();
        client.handle_packet(Packet::MatchStart {
            state,
            difficulty: Difficulty::Normal,
        });

        client.handle_packet(Packet::Snapshot {
            frame: vec![0u8; 5],
        });
        let shown = client.game.display_state().unwrap();
        assert_eq!(shown.left_paddle_y, state.left_paddle_y);
        assert_eq!((shown.left_score, shown.right_score), (0, 0));
    }

    #[test]
    fn test_match_over_and_participant_left_are_terminal() {
        let mut client = test_client();
        client.side = Some(Side::Right);
        client.handle_packet(Packet::MatchOver { winner: Side::Right });
        match client.phase {
            Phase::Over(end) => {
                assert_eq!(end, MatchEnd::Won(Side::Right));
                assert_eq!(client.overlay_headline(end), "You win!");
            }
            _ => panic!("Expected terminal phase"),
        }

        client.handle_packet(Packet::ParticipantLeft);
        assert!(matches!(client.phase, Phase::Over(MatchEnd::OpponentLeft)));
    }

    #[test]
    fn test_server_error_is_surfaced_not_fatal() {
        let mut client = test_client();
        client.handle_packet(Packet::Error {
            message: "Room is full".to_string(),
        });
        assert_eq!(client.error.as_deref(), Some("Room is full"));
        assert!(matches!(client.phase, Phase::Waiting));
    }
}
