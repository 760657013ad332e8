//! Client networking: a background thread owns the UDP socket on its own
//! single-threaded tokio runtime, and exchanges decoded packets with the
//! frame loop over unbounded channels. The frame loop never blocks on the
//! network and the socket task never touches game state.

use bincode::{deserialize, serialize};
use log::{error, warn};
use shared::Packet;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::sleep;

pub struct NetworkHandle {
    incoming: mpsc::UnboundedReceiver<Packet>,
    outgoing: mpsc::UnboundedSender<Packet>,
}

impl NetworkHandle {
    /// Starts the socket thread. `fake_ping_ms` adds artificial latency,
    /// split between the send and receive paths, for protocol experiments.
    pub fn connect(
        server_addr: &str,
        fake_ping_ms: u64,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let server_addr: SocketAddr = server_addr.parse()?;

        let (in_tx, in_rx) = mpsc::unbounded_channel();
        let (out_tx, out_rx) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name("network".to_string())
            .spawn(move || {
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(e) => {
                        error!("failed to build network runtime: {}", e);
                        return;
                    }
                };
                runtime.block_on(socket_loop(server_addr, fake_ping_ms, in_tx, out_rx));
            })?;

        Ok(Self {
            incoming: in_rx,
            outgoing: out_tx,
        })
    }

    /// Queues a packet for sending. Fire-and-forget.
    pub fn send(&self, packet: Packet) {
        if self.outgoing.send(packet).is_err() {
            error!("network thread is gone, dropping outgoing packet");
        }
    }

    /// Drains one received packet, if any.
    pub fn poll(&mut self) -> Option<Packet> {
        self.incoming.try_recv().ok()
    }
}

async fn socket_loop(
    server_addr: SocketAddr,
    fake_ping_ms: u64,
    in_tx: mpsc::UnboundedSender<Packet>,
    mut out_rx: mpsc::UnboundedReceiver<Packet>,
) {
    let socket = match UdpSocket::bind("0.0.0.0:0").await {
        Ok(socket) => socket,
        Err(e) => {
            error!("failed to bind client socket: {}", e);
            return;
        }
    };

    let mut buffer = [0u8; 2048];

    loop {
        tokio::select! {
            result = socket.recv_from(&mut buffer) => {
                match result {
                    Ok((len, from)) => {
                        if from != server_addr {
                            continue;
                        }
                        if fake_ping_ms > 0 {
                            sleep(Duration::from_millis(fake_ping_ms / 2)).await;
                        }
                        match deserialize::<Packet>(&buffer[0..len]) {
                            Ok(packet) => {
                                if in_tx.send(packet).is_err() {
                                    // Frame loop is gone; shut down.
                                    return;
                                }
                            }
                            Err(_) => warn!("malformed packet from server, dropping"),
                        }
                    }
                    Err(e) => {
                        error!("error receiving packet: {}", e);
                        sleep(Duration::from_millis(10)).await;
                    }
                }
            },

            command = out_rx.recv() => {
                match command {
                    Some(packet) => {
                        if fake_ping_ms > 0 {
                            sleep(Duration::from_millis(fake_ping_ms / 2)).await;
                        }
                        match serialize(&packet) {
                            Ok(data) => {
                                if let Err(e) = socket.send_to(&data, server_addr).await {
                                    error!("failed to send packet: {}", e);
                                }
                            }
                            Err(e) => error!("failed to encode packet: {}", e),
                        }
                    }
                    None => return,
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_address_is_an_error() {
        assert!(NetworkHandle::connect("not an address", 0).is_err());
    }

    #[test]
    fn test_connect_does_not_require_a_listening_server() {
        // UDP binds locally; the handle comes up even with nobody there.
        let mut handle = NetworkHandle::connect("127.0.0.1:9", 0).unwrap();
        handle.send(Packet::Connect { client_version: 1 });
        assert!(handle.poll().is_none());
    }
}
