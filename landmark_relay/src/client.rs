//! `TcpTransport`, the participant side of the relay protocol.

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{Shutdown, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use duel_sync::{
    ConnectionCallback, PeerListCallback, ReceiveCallback, Transport, TransportError,
};
use hand_landmarks::{Landmark, LandmarkFrame};
use tracing::{debug, info, warn};

use crate::protocol::{self, ClientMessage, ServerMessage};

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

type ReceiveSlot    = Mutex<Option<Arc<dyn Fn(String, Vec<Landmark>) + Send + Sync>>>;
type PeersSlot      = Mutex<Option<Arc<dyn Fn(Vec<String>) + Send + Sync>>>;
type ConnectionSlot = Mutex<Option<Arc<dyn Fn(bool) + Send + Sync>>>;

#[derive(Default)]
struct Callbacks {
    receive:    ReceiveSlot,
    peers:      PeersSlot,
    connection: ConnectionSlot,
}

impl Callbacks {
    fn connection_changed(&self, up: bool) {
        let cb = lock(&self.connection).clone();
        if let Some(cb) = cb { cb(up); }
    }
}

/// State shared between the transport handle and its reader thread.
#[derive(Default)]
struct Link {
    /// Write half of the current connection, tagged with its generation.
    writer:     Mutex<Option<(u64, TcpStream)>>,
    generation: AtomicU64,
    callbacks:  Callbacks,
}

// ════════════════════════════════════════════════════════════════════════════
// TcpTransport
// ════════════════════════════════════════════════════════════════════════════

/// Relay client.  Dials lazily on [`Transport::register`]; every redial
/// starts a new generation so a stale reader thread can't tear down a
/// newer connection.
pub struct TcpTransport {
    addr: String,
    link: Arc<Link>,
}

impl TcpTransport {
    pub fn new(addr: impl Into<String>) -> Self {
        TcpTransport {
            addr: addr.into(),
            link: Arc::new(Link::default()),
        }
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }

    pub fn is_open(&self) -> bool {
        lock(&self.link.writer).is_some()
    }

    fn dial(&self) -> Result<(u64, TcpStream), TransportError> {
        let stream = TcpStream::connect(&self.addr)?;
        stream.set_nodelay(true)?;
        let reader = stream.try_clone()?;
        let generation = self.link.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let link = self.link.clone();
        thread::Builder::new()
            .name("relay-reader".into())
            .spawn(move || read_loop(reader, generation, link))?;

        info!(addr = %self.addr, generation, "dialed relay");
        Ok((generation, stream))
    }

    fn write(&self, msg: &ClientMessage) -> Result<(), TransportError> {
        let line = protocol::encode_line(msg).map_err(|e| TransportError::Codec(e.to_string()))?;
        let mut guard = lock(&self.link.writer);
        let Some((_, stream)) = guard.as_mut() else {
            return Err(TransportError::NotConnected);
        };
        if let Err(e) = stream.write_all(line.as_bytes()) {
            if let Some((_, s)) = guard.take() {
                let _ = s.shutdown(Shutdown::Both);
            }
            return Err(match e.kind() {
                ErrorKind::BrokenPipe | ErrorKind::ConnectionReset => TransportError::Closed,
                _ => e.into(),
            });
        }
        Ok(())
    }
}

impl Transport for TcpTransport {
    fn register(&self, identity: &str) -> Result<(), TransportError> {
        let open = lock(&self.link.writer).is_some();
        if !open {
            let conn = self.dial()?;
            *lock(&self.link.writer) = Some(conn);
        }
        self.write(&ClientMessage::Register { username: identity.to_string() })
    }

    fn send(&self, target: &str, frame: &LandmarkFrame) -> Result<(), TransportError> {
        self.write(&ClientMessage::Landmarks {
            target_user: target.to_string(),
            landmarks:   frame.to_vec(),
        })
    }

    fn on_receive(&self, callback: ReceiveCallback) {
        *lock(&self.link.callbacks.receive) = Some(Arc::from(callback));
    }

    fn on_peer_list_changed(&self, callback: PeerListCallback) {
        *lock(&self.link.callbacks.peers) = Some(Arc::from(callback));
    }

    fn on_connection_state_changed(&self, callback: ConnectionCallback) {
        *lock(&self.link.callbacks.connection) = Some(Arc::from(callback));
    }

    /// Reports the drop synchronously; the old reader thread is retired
    /// first so it can't report it again over a later connection.
    fn disconnect(&self) {
        let taken = lock(&self.link.writer).take();
        let Some((_, stream)) = taken else { return };
        self.link.generation.fetch_add(1, Ordering::SeqCst);
        let _ = stream.shutdown(Shutdown::Both);
        info!(addr = %self.addr, "disconnected from relay");
        self.link.callbacks.connection_changed(false);
    }
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.disconnect();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Reader thread
// ════════════════════════════════════════════════════════════════════════════

fn read_loop(stream: TcpStream, generation: u64, link: Arc<Link>) {
    let reader = BufReader::new(stream);
    for line in reader.lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                debug!(generation, error = %e, "relay read failed");
                break;
            }
        };
        if line.trim().is_empty() { continue; }
        // Lines buffered before a disconnect belong to a retired link.
        if !is_current(&link, generation) {
            debug!(generation, "retired link; buffered lines discarded");
            return;
        }

        match protocol::decode_server(&line) {
            Ok(msg) => dispatch(&link.callbacks, msg),
            Err(e) => warn!(error = %e, "undecodable relay line skipped"),
        }
    }

    // Only the current generation may report the link as down.
    if !is_current(&link, generation) {
        return;
    }
    {
        let mut writer = lock(&link.writer);
        if matches!(writer.as_ref(), Some((g, _)) if *g == generation) {
            writer.take();
        }
    }
    info!(generation, "relay connection closed");
    link.callbacks.connection_changed(false);
}

fn is_current(link: &Link, generation: u64) -> bool {
    link.generation.load(Ordering::SeqCst) == generation
}

fn dispatch(callbacks: &Callbacks, msg: ServerMessage) {
    match msg {
        ServerMessage::Registered { username } => {
            debug!(%username, "registration confirmed");
            callbacks.connection_changed(true);
        }
        ServerMessage::UserList { users } => {
            let cb = lock(&callbacks.peers).clone();
            if let Some(cb) = cb { cb(users); }
        }
        ServerMessage::Landmarks { sender, landmarks } => {
            let cb = lock(&callbacks.receive).clone();
            if let Some(cb) = cb { cb(sender, landmarks); }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn send_before_register_is_not_connected() {
        let t = TcpTransport::new("127.0.0.1:9");
        let frame = LandmarkFrame::new([Landmark::default(); 21]);
        assert!(matches!(t.send("bob", &frame), Err(TransportError::NotConnected)));
        assert!(!t.is_open());
    }

    #[test]
    fn dispatch_routes_each_message_kind() {
        let callbacks = Callbacks::default();
        let (tx, rx) = mpsc::channel::<String>();

        let t1 = tx.clone();
        *lock(&callbacks.connection) = Some(Arc::new(move |up: bool| { let _ = t1.send(format!("conn {up}")); }));
        let t2 = tx.clone();
        *lock(&callbacks.peers) = Some(Arc::new(move |users: Vec<String>| { let _ = t2.send(users.join(",")); }));
        let t3 = tx;
        *lock(&callbacks.receive) = Some(Arc::new(move |sender: String, lm: Vec<Landmark>| {
            let _ = t3.send(format!("{sender}:{}", lm.len()));
        }));

        dispatch(&callbacks, ServerMessage::Registered { username: "a".into() });
        dispatch(&callbacks, ServerMessage::UserList { users: vec!["a".into(), "b".into()] });
        dispatch(&callbacks, ServerMessage::Landmarks { sender: "b".into(), landmarks: vec![Landmark::default(); 3] });

        let got: Vec<String> = rx.try_iter().collect();
        assert_eq!(got, vec!["conn true", "a,b", "b:3"]);
    }

    #[test]
    fn retired_reader_drops_buffered_frames() {
        use std::net::TcpListener;
        use std::time::Duration;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let mut relay_side = TcpStream::connect(addr).unwrap();
        let (client_side, _) = listener.accept().unwrap();

        let link = Arc::new(Link::default());
        let (tx, rx) = mpsc::channel::<String>();
        *lock(&link.callbacks.receive) = Some(Arc::new(move |sender: String, _: Vec<Landmark>| {
            let _ = tx.send(sender);
        }));
        let (conn_tx, conn_rx) = mpsc::channel::<bool>();
        *lock(&link.callbacks.connection) = Some(Arc::new(move |up: bool| { let _ = conn_tx.send(up); }));

        // The link was disconnected (generation bumped) before the reader
        // got to the frame already sitting in its socket buffer.
        link.generation.store(2, Ordering::SeqCst);
        let line = protocol::encode_line(&ServerMessage::Landmarks {
            sender:    "bob".into(),
            landmarks: vec![Landmark::default(); 21],
        }).unwrap();
        relay_side.write_all(line.as_bytes()).unwrap();
        drop(relay_side);

        let reader = {
            let link = link.clone();
            thread::spawn(move || read_loop(client_side, 1, link))
        };
        reader.join().unwrap();

        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err(), "stale frame delivered");
        assert!(conn_rx.try_recv().is_err(), "retired reader reported the link");
    }
}
