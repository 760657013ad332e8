//! UDP relay loop: packet dispatch, broadcasts and the authoritative tick.

use crate::game::GameState;
use crate::registry::Registry;
use bincode::{deserialize, serialize};
use log::{debug, error, info, warn};
use shared::{now_millis, Packet, BULLET_DAMAGE};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, RwLock};
use tokio::time::interval;

/// Messages sent from network tasks to the main server loop.
#[derive(Debug)]
pub enum ServerMessage {
    PacketReceived {
        packet: Packet,
        addr: SocketAddr,
    },
    ClientTimeout {
        client_id: u32,
    },
    #[allow(dead_code)]
    Shutdown,
}

/// Messages sent from the main loop to the outgoing-packet task.
#[derive(Debug)]
pub enum RelayMessage {
    Send {
        packet: Packet,
        addr: SocketAddr,
    },
    Broadcast {
        packet: Packet,
        exclude: Option<u32>,
    },
}

/// The relay server: owns the socket, the connection registry and the
/// authoritative game state. All state mutation happens inside the single
/// `run` loop; the spawned tasks only move bytes.
pub struct Server {
    socket: Arc<UdpSocket>,
    registry: Arc<RwLock<Registry>>,
    game: GameState,
    tick_duration: Duration,

    server_tx: mpsc::UnboundedSender<ServerMessage>,
    server_rx: mpsc::UnboundedReceiver<ServerMessage>,
    relay_tx: mpsc::UnboundedSender<RelayMessage>,
    relay_rx: mpsc::UnboundedReceiver<RelayMessage>,
}

impl Server {
    pub async fn new(
        addr: &str,
        tick_duration: Duration,
        max_clients: usize,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let socket = Arc::new(UdpSocket::bind(addr).await?);
        info!("server listening on {}", addr);

        let (server_tx, server_rx) = mpsc::unbounded_channel();
        let (relay_tx, relay_rx) = mpsc::unbounded_channel();

        Ok(Server {
            socket,
            registry: Arc::new(RwLock::new(Registry::new(max_clients))),
            game: GameState::new(),
            tick_duration,
            server_tx,
            server_rx,
            relay_tx,
            relay_rx,
        })
    }

    /// Spawns the task that listens for incoming datagrams.
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
                            warn!("malformed packet from {}, dropping", addr);
                        }
                    }
                    Err(e) => {
                        error!("error receiving packet: {}", e);
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                }
            }
        });
    }

    /// Spawns the task that drains the outgoing-packet queue.
    fn spawn_network_sender(&mut self) {
        let socket = Arc::clone(&self.socket);
        let registry = Arc::clone(&self.registry);
        let mut relay_rx = std::mem::replace(&mut self.relay_rx, mpsc::unbounded_channel().1);

        tokio::spawn(async move {
            while let Some(message) = relay_rx.recv().await {
                match message {
                    RelayMessage::Send { packet, addr } => {
                        if let Err(e) = Self::send_impl(&socket, &packet, addr).await {
                            error!("failed to send to {}: {}", addr, e);
                        }
                    }
                    RelayMessage::Broadcast { packet, exclude } => {
                        let addrs = {
                            let registry = registry.read().await;
                            registry.addrs()
                        };

                        for (client_id, addr) in addrs {
                            if Some(client_id) == exclude {
                                continue;
                            }
                            if let Err(e) = Self::send_impl(&socket, &packet, addr).await {
                                error!("failed to send to client {}: {}", client_id, e);
                            }
                        }
                    }
                }
            }
        });
    }

    /// Spawns the task that watches for silent connections.
    fn spawn_timeout_checker(&self) {
        let registry = Arc::clone(&self.registry);
        let server_tx = self.server_tx.clone();

        tokio::spawn(async move {
            let mut check_interval = interval(Duration::from_secs(1));

            loop {
                check_interval.tick().await;

                let timed_out = {
                    let mut registry = registry.write().await;
                    registry.check_timeouts()
                };

                for client_id in timed_out {
                    if server_tx
                        .send(ServerMessage::ClientTimeout { client_id })
                        .is_err()
                    {
                        return;
                    }
                }
            }
        });
    }

    async fn send_impl(
        socket: &UdpSocket,
        packet: &Packet,
        addr: SocketAddr,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let data = serialize(packet)?;
        socket.send_to(&data, addr).await?;
        Ok(())
    }

    fn send(&self, packet: Packet, addr: SocketAddr) {
        if self
            .relay_tx
            .send(RelayMessage::Send { packet, addr })
            .is_err()
        {
            error!("outgoing queue closed");
        }
    }

    fn broadcast(&self, packet: Packet, exclude: Option<u32>) {
        if self
            .relay_tx
            .send(RelayMessage::Broadcast { packet, exclude })
            .is_err()
        {
            error!("outgoing queue closed");
        }
    }

    /// Dispatches one packet. The sender's participant id is always resolved
    /// from its socket address; payload fields never decide identity.
    async fn handle_packet(&mut self, packet: Packet, addr: SocketAddr) {
        match packet {
            Packet::Connect { client_version } => {
                info!("connection from {} (version {})", addr, client_version);
                self.handle_connect(addr).await;
            }

            Packet::Movement { position, rotation } => {
                let sender = self.resolve_sender(addr).await;
                if let Some(id) = sender {
                    if self.game.update_transform(id, position, rotation) {
                        self.broadcast(
                            Packet::PlayerMoved {
                                id,
                                position,
                                rotation,
                            },
                            Some(id),
                        );
                    }
                }
            }

            Packet::Fire {
                shot_id,
                position,
                direction,
            } => {
                let sender = self.resolve_sender(addr).await;
                if let Some(id) = sender {
                    if self.game.register_shot(shot_id, id, now_millis()) {
                        self.broadcast(
                            Packet::BulletSpawned {
                                shot_id,
                                position,
                                direction,
                            },
                            Some(id),
                        );
                    }
                }
            }

            Packet::HitClaim {
                shot_id,
                victim_id,
                damage,
            } => {
                let sender = self.resolve_sender(addr).await;
                if sender.is_none() {
                    return;
                }

                if damage != BULLET_DAMAGE {
                    warn!(
                        "hit claim from {} with damage {} (expected {}), dropping",
                        addr, damage, BULLET_DAMAGE
                    );
                    return;
                }

                if let Some(applied) = self.game.apply_hit(shot_id, victim_id, damage, now_millis())
                {
                    self.broadcast(
                        Packet::HealthUpdate {
                            victim_id: applied.victim_id,
                            shooter_id: applied.shooter_id,
                            shot_id: applied.shot_id,
                            health: applied.health,
                            alive: applied.alive,
                        },
                        None,
                    );
                }
            }

            Packet::CollisionReport {
                other_id,
                impulse,
                spin,
            } => {
                let sender = self.resolve_sender(addr).await;
                if let Some(from_id) = sender {
                    // Relay the inverse impulse to the other vehicle only.
                    // A stale target id is a no-op.
                    let target = {
                        let registry = self.registry.read().await;
                        registry.addr_of(other_id)
                    };
                    if let Some(target_addr) = target {
                        self.send(
                            Packet::CollisionImpulse {
                                from_id,
                                impulse,
                                spin,
                            },
                            target_addr,
                        );
                    }
                }
            }

            Packet::Disconnect => {
                let sender = {
                    let registry = self.registry.read().await;
                    registry.find_by_addr(addr)
                };
                if let Some(id) = sender {
                    self.drop_participant(id).await;
                }
            }

            _ => {
                warn!("unexpected packet type from {}", addr);
            }
        }
    }

    /// Admits a connection: allocates id and spawn point, answers with the
    /// full snapshot and announces the newcomer to everyone else.
    async fn handle_connect(&mut self, addr: SocketAddr) {
        // A reconnect from the same address replaces the old participant.
        let existing = {
            let registry = self.registry.read().await;
            registry.find_by_addr(addr)
        };
        if let Some(id) = existing {
            info!("replacing existing participant {} from {}", id, addr);
            self.drop_participant(id).await;
        }

        let client_id = {
            let mut registry = self.registry.write().await;
            registry.add_connection(addr)
        };

        match client_id {
            Some(id) => {
                let position = self.game.add_participant(id);
                let players = self.game.snapshot();

                self.send(
                    Packet::Welcome {
                        client_id: id,
                        position,
                        players,
                    },
                    addr,
                );

                if let Some(player) = self.game.participants.get(&id) {
                    self.broadcast(
                        Packet::PlayerJoined {
                            player: player.snapshot(),
                        },
                        Some(id),
                    );
                }
            }
            None => {
                self.send(
                    Packet::Rejected {
                        reason: "server full".to_string(),
                    },
                    addr,
                );
            }
        }
    }

    /// Removes a participant everywhere and tells the survivors.
    async fn drop_participant(&mut self, id: u32) {
        {
            let mut registry = self.registry.write().await;
            registry.remove_connection(&id);
        }
        self.game.remove_participant(&id);
        self.broadcast(Packet::PlayerLeft { id }, None);
    }

    /// Looks up the sender and refreshes its liveness. Unknown senders get
    /// their packet dropped.
    async fn resolve_sender(&self, addr: SocketAddr) -> Option<u32> {
        let mut registry = self.registry.write().await;
        let id = registry.find_by_addr(addr);
        match id {
            Some(id) => {
                registry.refresh(id);
                Some(id)
            }
            None => {
                debug!("packet from unknown address {}, dropping", addr);
                None
            }
        }
    }

    /// Main server loop: packet dispatch and the periodic authority tick.
    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        self.spawn_network_receiver();
        self.spawn_network_sender();
        self.spawn_timeout_checker();

        let mut tick_interval = interval(self.tick_duration);
        let mut tick_count: u64 = 0;

        info!("server started");

        loop {
            tokio::select! {
                message = self.server_rx.recv() => {
                    match message {
                        Some(ServerMessage::PacketReceived { packet, addr }) => {
                            self.handle_packet(packet, addr).await;
                        },
                        Some(ServerMessage::ClientTimeout { client_id }) => {
                            info!("participant {} timed out", client_id);
                            // The registry entry is already gone; clean up the rest.
                            self.game.remove_participant(&client_id);
                            self.broadcast(Packet::PlayerLeft { id: client_id }, None);
                        },
                        Some(ServerMessage::Shutdown) | None => {
                            info!("server shutting down");
                            break;
                        }
                    }
                },

                _ = tick_interval.tick() => {
                    let now = now_millis();

                    for (id, position) in self.game.tick(now) {
                        self.broadcast(Packet::Respawned { id, position }, None);
                    }

                    tick_count += 1;
                    if tick_count % 300 == 0 {
                        let clients = {
                            let registry = self.registry.read().await;
                            registry.len()
                        };
                        if clients > 0 {
                            debug!("tick {}: {} participants", tick_count, clients);
                        }
                    }
                },
            }
        }

        Ok(())
    }
}
