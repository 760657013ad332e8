//! Connection bookkeeping for the relay server.
//!
//! The registry maps socket addresses to participant ids and watches
//! connection health. It deliberately knows nothing about gameplay: health,
//! spawn points and transforms live in [`crate::game::GameState`], keyed by
//! the ids handed out here. Resolving the sender through the address (rather
//! than trusting an id field in the payload) is what keeps one connection
//! from mutating another participant's record.

use log::info;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

/// How long a connection may stay silent before it is dropped.
pub const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// One connected client.
#[derive(Debug)]
pub struct Connection {
    pub id: u32,
    pub addr: SocketAddr,
    /// Last time any packet arrived from this address.
    pub last_seen: Instant,
}

impl Connection {
    pub fn new(id: u32, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            last_seen: Instant::now(),
        }
    }

    pub fn is_timed_out(&self, timeout: Duration) -> bool {
        self.last_seen.elapsed() > timeout
    }
}

/// All connected clients, indexed by participant id.
pub struct Registry {
    connections: HashMap<u32, Connection>,
    next_id: u32,
    max_clients: usize,
}

impl Registry {
    pub fn new(max_clients: usize) -> Self {
        Self {
            connections: HashMap::new(),
            next_id: 1,
            max_clients,
        }
    }

    /// Admits a new connection, returning its fresh participant id, or None
    /// when the server is at capacity.
    pub fn add_connection(&mut self, addr: SocketAddr) -> Option<u32> {
        if self.connections.len() >= self.max_clients {
            return None;
        }

        let id = self.next_id;
        self.next_id += 1;

        info!("participant {} connected from {}", id, addr);
        self.connections.insert(id, Connection::new(id, addr));
        Some(id)
    }

    /// Removes a connection. Returns false if it was already gone, which is
    /// normal when a timeout races an explicit disconnect.
    pub fn remove_connection(&mut self, id: &u32) -> bool {
        if let Some(conn) = self.connections.remove(id) {
            info!("participant {} disconnected", conn.id);
            true
        } else {
            false
        }
    }

    /// Resolves the participant id behind a socket address.
    pub fn find_by_addr(&self, addr: SocketAddr) -> Option<u32> {
        self.connections
            .iter()
            .find(|(_, conn)| conn.addr == addr)
            .map(|(id, _)| *id)
    }

    /// Marks the connection as alive. Called for every packet received.
    pub fn refresh(&mut self, id: u32) {
        if let Some(conn) = self.connections.get_mut(&id) {
            conn.last_seen = Instant::now();
        }
    }

    pub fn addr_of(&self, id: u32) -> Option<SocketAddr> {
        self.connections.get(&id).map(|conn| conn.addr)
    }

    /// All (id, addr) pairs, for broadcasting.
    pub fn addrs(&self) -> Vec<(u32, SocketAddr)> {
        self.connections
            .iter()
            .map(|(id, conn)| (*id, conn.addr))
            .collect()
    }

    /// Drops and returns every connection that has gone silent.
    pub fn check_timeouts(&mut self) -> Vec<u32> {
        let timed_out: Vec<u32> = self
            .connections
            .iter()
            .filter(|(_, conn)| conn.is_timed_out(CONNECTION_TIMEOUT))
            .map(|(id, _)| *id)
            .collect();

        for id in &timed_out {
            self.remove_connection(id);
        }

        timed_out
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}
