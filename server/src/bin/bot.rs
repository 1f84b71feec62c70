//! Headless exerciser: joins or creates a room and plays by chasing the
//! ball, printing everything the authority sends back. Useful for driving
//! the full wire path without a display, or as a stand-in opponent.

use bincode::{deserialize, serialize};
use clap::Parser;
use shared::protocol::Packet;
use shared::{codec, Difficulty, GameState, Side, PADDLE_HEIGHT, PADDLE_MAX_Y};
use std::net::SocketAddr;
use tokio::net::UdpSocket;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = "127.0.0.1:8080")]
    server: String,

    /// Join an existing room instead of creating one
    #[arg(short, long)]
    join: Option<String>,

    /// Difficulty when creating a room
    #[arg(short, long, default_value = "normal")]
    difficulty: Difficulty,

    /// Paddle speed in units per snapshot
    #[arg(long, default_value = "6.0")]
    paddle_speed: f32,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    println!("Bot socket bound to {}", socket.local_addr()?);

    let server_addr = args.server.parse::<SocketAddr>()?;
    let request = match &args.join {
        Some(code) => Packet::Join {
            room_id: code.clone(),
        },
        None => Packet::Create {
            difficulty: args.difficulty,
        },
    };
    socket.send_to(&serialize(&request)?, server_addr).await?;

    let mut side = Side::Left;
    let mut paddle_y = PADDLE_MAX_Y / 2.0;
    let mut last_scores = (0u16, 0u16);
    let mut buf = [0u8; 2048];

    loop {
        let (len, _) = socket.recv_from(&mut buf).await?;
        let packet = match deserialize::<Packet>(&buf[0..len]) {
            Ok(packet) => packet,
            Err(e) => {
                println!("Undecodable packet from server: {}", e);
                continue;
            }
        };

        match packet {
            Packet::RoomCreated {
                room_id,
                side: assigned,
            } => {
                side = assigned;
                println!("Room {} created, waiting for an opponent...", room_id);
                println!("Share this code to let them join: {}", room_id);
            }
            Packet::RoomJoined {
                room_id,
                side: assigned,
                difficulty,
            } => {
                side = assigned;
                println!("Joined room {} as {:?} ({:?})", room_id, assigned, difficulty);
            }
            Packet::MatchStart { state, difficulty } => {
                paddle_y = PADDLE_MAX_Y / 2.0;
                last_scores = (state.left_score, state.right_score);
                println!("Match started ({:?}), playing {:?}", difficulty, side);
            }
            Packet::Snapshot { frame } => {
                let state = match codec::decode(&frame) {
                    Ok(state) => state,
                    Err(e) => {
                        println!("Bad snapshot: {}", e);
                        continue;
                    }
                };

                let scores = (state.left_score, state.right_score);
                if scores != last_scores {
                    println!("Score: {} - {}", scores.0, scores.1);
                    last_scores = scores;
                }

                if let Some(y) = steer(&state, paddle_y, args.paddle_speed) {
                    paddle_y = y;
                    socket
                        .send_to(&serialize(&Packet::PaddleUpdate { y })?, server_addr)
                        .await?;
                }
            }
            Packet::MatchOver { winner } => {
                let verdict = if winner == side { "Bot wins!" } else { "Bot loses." };
                println!(
                    "Match over: {:?} takes it {} - {}. {}",
                    winner, last_scores.0, last_scores.1, verdict
                );
                socket
                    .send_to(&serialize(&Packet::Leave)?, server_addr)
                    .await?;
                break;
            }
            Packet::ParticipantLeft => {
                println!("Opponent left, shutting down");
                socket
                    .send_to(&serialize(&Packet::Leave)?, server_addr)
                    .await?;
                break;
            }
            Packet::Error { message } => {
                println!("Server error: {}", message);
                break;
            }
            other => println!("Unexpected packet: {:?}", other),
        }
    }

    println!("Bot finished");
    Ok(())
}

/// Moves the paddle toward the ball center at a bounded speed. Returns the
/// new position, or `None` when close enough that sending isn't worth it.
fn steer(state: &GameState, current_y: f32, speed: f32) -> Option<f32> {
    let target = (state.ball_y - PADDLE_HEIGHT / 2.0).clamp(0.0, PADDLE_MAX_Y);
    let diff = target - current_y;
    if diff.abs() < 2.0 {
        return None;
    }
    Some((current_y + diff.clamp(-speed, speed)).clamp(0.0, PADDLE_MAX_Y))
}
