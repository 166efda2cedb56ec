//! The relay: registration, user-list broadcast and targeted frame routing.
//!
//! Each accepted connection gets a reader thread (this side parses client
//! lines) and a writer thread that drains an mpsc outbox.  All routing
//! decisions go through one [`Registry`] behind a mutex.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use hand_landmarks::Landmark;
use tracing::{debug, info, warn};

use crate::error::RelayError;
use crate::protocol::{self, ClientMessage, ServerMessage};

// ════════════════════════════════════════════════════════════════════════════
// RelayConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct RelayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl RelayConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Registry
// ════════════════════════════════════════════════════════════════════════════

type ConnId = u64;

struct Connection {
    id:       ConnId,
    username: Option<String>,
    outbox:   Sender<ServerMessage>,
}

/// Live connections in accept order.
#[derive(Default)]
pub struct Registry {
    next_id: ConnId,
    conns:   Vec<Connection>,
}

impl Registry {
    fn add(&mut self, outbox: Sender<ServerMessage>) -> ConnId {
        let id = self.next_id;
        self.next_id += 1;
        self.conns.push(Connection { id, username: None, outbox });
        id
    }

    /// Usernames of registered connections, in connection order.
    pub fn usernames(&self) -> Vec<String> {
        self.conns.iter().filter_map(|c| c.username.clone()).collect()
    }

    fn username_of(&self, id: ConnId) -> Option<&str> {
        self.conns.iter().find(|c| c.id == id)?.username.as_deref()
    }

    fn send_to(&self, id: ConnId, msg: ServerMessage) {
        if let Some(c) = self.conns.iter().find(|c| c.id == id) {
            let _ = c.outbox.send(msg);
        }
    }

    fn broadcast_user_list(&self) {
        let users = self.usernames();
        for c in &self.conns {
            let _ = c.outbox.send(ServerMessage::UserList { users: users.clone() });
        }
    }

    /// Name `id`, confirm to it, and tell everyone the new user list.
    fn register(&mut self, id: ConnId, username: String) {
        let Some(conn) = self.conns.iter_mut().find(|c| c.id == id) else { return };
        conn.username = Some(username.clone());
        self.send_to(id, ServerMessage::Registered { username });
        self.broadcast_user_list();
    }

    /// Deliver to the first connection registered as `target`.  Returns
    /// whether anything was sent.
    fn route(&self, from: ConnId, target: &str, landmarks: Vec<Landmark>) -> bool {
        let Some(sender) = self.username_of(from) else { return false };
        let Some(dest) = self.conns.iter().find(|c| c.username.as_deref() == Some(target)) else {
            return false;
        };
        dest.outbox
            .send(ServerMessage::Landmarks { sender: sender.to_string(), landmarks })
            .is_ok()
    }

    /// Forget `id`; re-broadcast the user list if it had registered.
    fn remove(&mut self, id: ConnId) {
        let Some(pos) = self.conns.iter().position(|c| c.id == id) else { return };
        let conn = self.conns.remove(pos);
        if conn.username.is_some() {
            self.broadcast_user_list();
        }
    }
}

fn lock(registry: &Mutex<Registry>) -> MutexGuard<'_, Registry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

// ════════════════════════════════════════════════════════════════════════════
// RelayServer
// ════════════════════════════════════════════════════════════════════════════

pub struct RelayServer {
    listener: TcpListener,
    registry: Arc<Mutex<Registry>>,
}

impl RelayServer {
    pub fn bind(cfg: &RelayConfig) -> Result<Self, RelayError> {
        let addr = cfg.addr();
        let listener = TcpListener::bind(&addr)
            .map_err(|source| RelayError::Bind { addr, source })?;
        Ok(RelayServer {
            listener,
            registry: Arc::new(Mutex::new(Registry::default())),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, RelayError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever.
    pub fn run(self) -> Result<(), RelayError> {
        info!(addr = %self.local_addr()?, "relay listening");
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let registry = self.registry.clone();
                    thread::Builder::new()
                        .name("relay-conn".into())
                        .spawn(move || handle_connection(stream, registry))?;
                }
                Err(e) => warn!(error = %e, "accept failed"),
            }
        }
        Ok(())
    }

    /// Run the accept loop on a background thread.
    pub fn spawn(self) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            if let Err(e) = self.run() {
                warn!(error = %e, "relay stopped");
            }
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Per-connection threads
// ════════════════════════════════════════════════════════════════════════════

fn handle_connection(stream: TcpStream, registry: Arc<Mutex<Registry>>) {
    let peer = stream.peer_addr().map(|a| a.to_string()).unwrap_or_else(|_| "?".into());
    let writer = match stream.try_clone() {
        Ok(w) => w,
        Err(e) => {
            warn!(%peer, error = %e, "could not clone connection");
            return;
        }
    };

    let (tx, rx) = mpsc::channel::<ServerMessage>();
    let id = lock(&registry).add(tx);
    info!(%peer, id, "client connected");

    thread::spawn(move || writer_thread(writer, rx));

    let reader = BufReader::new(stream);
    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                debug!(id, error = %e, "read failed");
                break;
            }
        };
        if line.trim().is_empty() { continue; }

        match protocol::decode_client(&line) {
            Ok(ClientMessage::Register { username }) => {
                info!(id, %username, "registered");
                lock(&registry).register(id, username);
            }
            Ok(ClientMessage::Landmarks { target_user, landmarks }) => {
                if !lock(&registry).route(id, &target_user, landmarks) {
                    debug!(id, to = %target_user, "landmarks dropped: no such target");
                }
            }
            Err(e) => warn!(id, error = %e, "undecodable line skipped"),
        }
    }

    // Dropping the outbox sender ends the writer thread.
    lock(&registry).remove(id);
    info!(%peer, id, "client disconnected");
}

fn writer_thread(mut stream: TcpStream, rx: Receiver<ServerMessage>) {
    for msg in rx {
        let line = match protocol::encode_line(&msg) {
            Ok(l) => l,
            Err(e) => {
                warn!(error = %e, "could not encode message");
                continue;
            }
        };
        if stream.write_all(line.as_bytes()).is_err() {
            break;
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn join(reg: &mut Registry) -> (ConnId, Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel();
        (reg.add(tx), rx)
    }

    fn drain(rx: &Receiver<ServerMessage>) -> Vec<ServerMessage> {
        rx.try_iter().collect()
    }

    #[test]
    fn register_confirms_then_broadcasts() {
        let mut reg = Registry::default();
        let (a, rx_a) = join(&mut reg);
        let (_b, rx_b) = join(&mut reg);

        reg.register(a, "alice".into());

        assert_eq!(drain(&rx_a), vec![
            ServerMessage::Registered { username: "alice".into() },
            ServerMessage::UserList { users: vec!["alice".into()] },
        ]);
        assert_eq!(drain(&rx_b), vec![ServerMessage::UserList { users: vec!["alice".into()] }]);
    }

    #[test]
    fn routes_to_target_with_sender_name() {
        let mut reg = Registry::default();
        let (a, _rx_a) = join(&mut reg);
        let (b, rx_b) = join(&mut reg);
        reg.register(a, "alice".into());
        reg.register(b, "bob".into());
        drain(&rx_b);

        let joints = vec![Landmark::new(0.1, 0.2, 0.3); 21];
        assert!(reg.route(a, "bob", joints.clone()));
        assert_eq!(drain(&rx_b), vec![ServerMessage::Landmarks { sender: "alice".into(), landmarks: joints }]);
    }

    #[test]
    fn unknown_target_and_anonymous_sender_are_dropped() {
        let mut reg = Registry::default();
        let (a, _rx_a) = join(&mut reg);
        let (b, _rx_b) = join(&mut reg);
        reg.register(b, "bob".into());

        assert!(!reg.route(a, "bob", vec![]), "unregistered sender");
        assert!(!reg.route(b, "carol", vec![]), "unknown target");
    }

    #[test]
    fn duplicate_names_route_to_first() {
        let mut reg = Registry::default();
        let (a, _rx_a) = join(&mut reg);
        let (b1, rx_b1) = join(&mut reg);
        let (b2, rx_b2) = join(&mut reg);
        reg.register(a, "alice".into());
        reg.register(b1, "bob".into());
        reg.register(b2, "bob".into());
        drain(&rx_b1);
        drain(&rx_b2);

        reg.route(a, "bob", vec![]);
        assert_eq!(drain(&rx_b1).len(), 1);
        assert!(drain(&rx_b2).is_empty());
    }

    #[test]
    fn removing_a_registered_user_rebroadcasts() {
        let mut reg = Registry::default();
        let (a, rx_a) = join(&mut reg);
        let (b, _rx_b) = join(&mut reg);
        reg.register(a, "alice".into());
        reg.register(b, "bob".into());
        drain(&rx_a);

        reg.remove(b);
        assert_eq!(drain(&rx_a), vec![ServerMessage::UserList { users: vec!["alice".into()] }]);
        assert_eq!(reg.usernames(), vec!["alice".to_string()]);
    }

    #[test]
    fn removing_an_anonymous_connection_is_quiet() {
        let mut reg = Registry::default();
        let (a, rx_a) = join(&mut reg);
        let (b, _rx_b) = join(&mut reg);
        reg.register(a, "alice".into());
        drain(&rx_a);

        reg.remove(b);
        assert!(drain(&rx_a).is_empty());
    }
}
