//! Server network layer handling UDP communications and room coordination

use crate::registry::{RoomError, RoomRegistry};
use crate::room::{self, RoomCommand};
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::protocol::{Delivery, Packet};
use shared::Side;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

/// Messages sent from network tasks to the main server loop
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived {
        packet: Packet,
        addr: SocketAddr,
    },
    #[allow(dead_code)]
    Shutdown,
}

/// Messages queued for the socket sender task
#[derive(Debug)]
pub enum OutboundMessage {
    Send {
        packet: Packet,
        addr: SocketAddr,
    },
    Broadcast {
        packet: Packet,
        addrs: Vec<SocketAddr>,
        delivery: Delivery,
    },
}

/// Main server coordinating the socket, the room registry and the per-room
/// match actors.
///
/// All request handling runs sequentially on this loop, so registry
/// mutations never race each other; per-room state lives inside the room
/// actors and is reached only through their command channels.
pub struct Server {
    socket: Arc<UdpSocket>,
    registry: RoomRegistry,

    // Communication channels
    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
}

impl Server {
    pub async fn new(addr: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("Server listening on {}", addr);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();

        Ok(Server {
            socket,
            registry: RoomRegistry::new(),
            server_tx,
            server_rx,
            out_tx,
            out_rx,
        })
    }

    /// Spawns the task that continuously listens for incoming packets
    fn spawn_network_receiver(&self) {
        let socket = Arc::clone(&self.socket);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut buffer = [0u8; 2048];

            loop {
                match socket.recv_from(&mut buffer).await {
                    Ok((len, addr)) => {
                        if let Ok(packet) = deserialize::<Packet>(&buffer[0..len]) {
                            if server_tx
                                .send(ServerMessage::PacketReceived { packet, addr })
                                .is_err()
                            {
                                break;
                            }
                        } else {
                            warn!("Failed to deserialize packet from {}", addr);
                        }
                    }
                    Err(e) => {
                        error!("Error receiving packet: {}", e);
                        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns the task that drains the outgoing queue. Reliable sends log
    /// failures as errors; best-effort sends are dropped quietly — the next
    /// tick supersedes them anyway.
    fn spawn_network_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let mut out_rx = std::mem::replace(&mut self.out_rx, mpsc::unbounded_channel().1);

        tokio::spawn(async move {
            while let Some(message) = out_rx.recv().await {
                match message {
                    OutboundMessage::Send { packet, addr } => {
                        if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                            error!("Failed to send packet to {}: {}", addr, e);
                        }
                    }
                    OutboundMessage::Broadcast {
                        packet,
                        addrs,
                        delivery,
                    } => {
                        for addr in addrs {
                            if let Err(e) = Self::send_packet_impl(&socket, &packet, addr).await {
                                match delivery {
                                    Delivery::Reliable => {
                                        error!("Failed to send to {}: {}", addr, e);
                                    }
                                    Delivery::BestEffort => {
                                        debug!("Dropped best-effort packet to {}: {}", addr, e);
                                    }
                                }
                            }
                        }
                    }
                }
            }
        });
    }

    async fn send_packet_impl(
        socket: &UdpSocket,
        packet: &Packet,
        addr: SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        socket.send_to(&data, addr).await?;
        Ok(())
    }

    fn send(&self, packet: Packet, addr: SocketAddr) {
        let _ = self.out_tx.send(OutboundMessage::Send { packet, addr });
    }

    /// Processes one request on the sequential handler loop.
    fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        match packet {
            Packet::Create { difficulty } => {
                let room_id = self.registry.create_room(addr, difficulty);
                self.send(
                    Packet::RoomCreated {
                        room_id,
                        side: Side::Left,
                    },
                    addr,
                );
            }

            Packet::Join { room_id } => match self.registry.join_room(&room_id, addr) {
                Ok((room_id, side, difficulty)) => {
                    self.send(
                        Packet::RoomJoined {
                            room_id: room_id.clone(),
                            side,
                            difficulty,
                        },
                        addr,
                    );
                    self.start_match(&room_id);
                }
                Err(e) => {
                    self.send(
                        Packet::Error {
                            message: e.to_string(),
                        },
                        addr,
                    );
                }
            },

            Packet::PaddleUpdate { y } => {
                // Senders whose room already vanished fall through silently.
                if let Some(room) = self.registry.room_of(addr) {
                    if let Some(handle) = &room.handle {
                        handle.send(RoomCommand::Paddle { addr, y });
                    }
                }
            }

            Packet::Restart => {
                let Some(room) = self.registry.room_of(addr) else {
                    return;
                };
                if !room.is_full() {
                    self.send(
                        Packet::Error {
                            message: RoomError::NotEnoughParticipants.to_string(),
                        },
                        addr,
                    );
                    return;
                }
                if let Some(handle) = &room.handle {
                    handle.send(RoomCommand::Restart);
                }
            }

            Packet::Leave => self.handle_leave(addr),

            _ => {
                warn!("Unexpected packet type from client at {}", addr);
            }
        }
    }

    /// Spawns the match actor once a room has both participants. An earlier
    /// actor for the same room (left over from a departed opponent) is
    /// dropped with its handle and winds down on its own.
    fn start_match(&mut self, room_id: &str) {
        let out_tx = self.out_tx.clone();
        if let Some(room) = self.registry.get_mut(room_id) {
            if let (Some(left), Some(right)) = (room.slots[0], room.slots[1]) {
                let handle = room::spawn(room.id.clone(), room.difficulty, [left, right], out_tx);
                room.handle = Some(handle);
            }
        }
    }

    fn handle_leave(&mut self, addr: SocketAddr) {
        let Some(departure) = self.registry.leave(addr) else {
            return;
        };

        if departure.remaining.is_empty() {
            // The room record went with the departing participant; its actor
            // sees the closed channel and stops.
            return;
        }

        if let Some(room) = self.registry.get_mut(&departure.room_id) {
            if let Some(handle) = room.handle.take() {
                handle.send(RoomCommand::Leave { addr });
            }
        }
        for member in departure.remaining {
            self.send(Packet::ParticipantLeft, member);
        }
    }

    /// Main server loop: consume inbound packets until shutdown.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.spawn_network_receiver();
        self.spawn_network_sender();

        info!("Server started successfully");

        while let Some(message) = self.server_rx.recv().await {
            match message {
                ServerMessage::PacketReceived { packet, addr } => {
                    self.handle_packet(packet, addr);
                }
                ServerMessage::Shutdown => {
                    info!("Server shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}
