//! Session state shared by the capture and receive paths.

use hand_landmarks::LandmarkFrame;

/// Relay connection lifecycle.
///
/// ```text
/// Disconnected ──connect──► Connecting ──registered──► Connected
///       ▲                        │                         │
///       └──────── failure ───────┴──────── disconnect ─────┘
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Most recent local and remote frames plus connectivity.
///
/// Plain data; the coordinator serializes all access behind one mutex.
#[derive(Clone, Debug, Default)]
pub struct PeerState {
    local:         Option<LandmarkFrame>,
    remote:        Option<LandmarkFrame>,
    remote_sender: Option<String>,
    connection:    ConnectionState,
}

impl PeerState {
    pub fn new() -> Self {
        Self::default()
    }

    // ── frames ────────────────────────────────────────────────────────────

    pub fn local_frame(&self)   -> Option<&LandmarkFrame> { self.local.as_ref() }
    pub fn remote_frame(&self)  -> Option<&LandmarkFrame> { self.remote.as_ref() }
    pub fn remote_sender(&self) -> Option<&str>           { self.remote_sender.as_deref() }

    pub fn set_local(&mut self, frame: Option<LandmarkFrame>) {
        self.local = frame;
    }

    pub fn set_remote(&mut self, sender: &str, frame: LandmarkFrame) {
        self.remote = Some(frame);
        self.remote_sender = Some(sender.to_string());
    }

    /// Drop both frames back to absent.
    pub fn clear_frames(&mut self) {
        self.local = None;
        self.remote = None;
        self.remote_sender = None;
    }

    // ── connectivity ──────────────────────────────────────────────────────

    pub fn connection(&self) -> ConnectionState { self.connection }

    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Connected
    }

    /// Start (or restart) a connection attempt.
    pub fn begin_connecting(&mut self) {
        self.connection = ConnectionState::Connecting;
    }

    /// Registration confirmed.  Only meaningful while connecting; returns
    /// whether the state changed.
    pub fn confirm_registered(&mut self) -> bool {
        if self.connection == ConnectionState::Connecting {
            self.connection = ConnectionState::Connected;
            true
        } else {
            false
        }
    }

    /// Any disconnect or transport failure.  Frames are cleared, not left
    /// stale.  Returns whether the state changed.
    pub fn mark_disconnected(&mut self) -> bool {
        let changed = self.connection != ConnectionState::Disconnected;
        self.connection = ConnectionState::Disconnected;
        self.clear_frames();
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poses;

    #[test]
    fn starts_disconnected_and_empty() {
        let s = PeerState::new();
        assert_eq!(s.connection(), ConnectionState::Disconnected);
        assert!(s.local_frame().is_none());
        assert!(s.remote_frame().is_none());
    }

    #[test]
    fn registration_only_completes_a_pending_connect() {
        let mut s = PeerState::new();
        assert!(!s.confirm_registered());
        assert_eq!(s.connection(), ConnectionState::Disconnected);

        s.begin_connecting();
        assert!(s.confirm_registered());
        assert!(s.is_connected());
        assert!(!s.confirm_registered());
    }

    #[test]
    fn disconnect_clears_frames() {
        let mut s = PeerState::new();
        s.begin_connecting();
        s.confirm_registered();
        s.set_local(Some(poses::fist()));
        s.set_remote("bob", poses::scissors());

        assert!(s.mark_disconnected());
        assert!(s.local_frame().is_none());
        assert!(s.remote_frame().is_none());
        assert!(s.remote_sender().is_none());
        assert!(!s.mark_disconnected());
    }

    #[test]
    fn reconnect_restarts_at_connecting() {
        let mut s = PeerState::new();
        s.begin_connecting();
        s.confirm_registered();
        s.mark_disconnected();
        s.begin_connecting();
        assert_eq!(s.connection(), ConnectionState::Connecting);
    }
}
