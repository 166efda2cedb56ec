//! Collaborator seams: the transport, the display and the pose source.
//!
//! Everything outside the synchronization core plugs in through these
//! traits.  Implementations live in `landmark_relay` (TCP transport) and
//! `leap_duel` (pose sources and the visualizer).

use std::io;

use hand_landmarks::{HandObservation, Landmark, LandmarkFrame};
use thiserror::Error;

use crate::arbiter::MatchOutcome;

// ════════════════════════════════════════════════════════════════════════════
// Transport
// ════════════════════════════════════════════════════════════════════════════

/// Delivery failures.  None of these are fatal to a session.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("not connected to a relay")]
    NotConnected,

    #[error("connection closed by the relay")]
    Closed,

    #[error("transport I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("could not encode message: {0}")]
    Codec(String),
}

/// Called with the sender's identity and its raw, unvalidated joint list.
pub type ReceiveCallback    = Box<dyn Fn(String, Vec<Landmark>) + Send + Sync>;
/// Called with the full list of registered identities.
pub type PeerListCallback   = Box<dyn Fn(Vec<String>) + Send + Sync>;
/// `true` once registration is confirmed, `false` on any disconnect.
pub type ConnectionCallback = Box<dyn Fn(bool) + Send + Sync>;

/// Relay connection that carries frames between named participants.
///
/// Registering a callback replaces any previous one of the same kind.
pub trait Transport: Send + Sync {
    /// Announce `identity` to the relay.  Completion is reported later
    /// through the connection-state callback.
    fn register(&self, identity: &str) -> Result<(), TransportError>;

    /// Fire-and-forget delivery of `frame` to `target`.
    fn send(&self, target: &str, frame: &LandmarkFrame) -> Result<(), TransportError>;

    fn on_receive(&self, callback: ReceiveCallback);

    fn on_peer_list_changed(&self, callback: PeerListCallback);

    fn on_connection_state_changed(&self, callback: ConnectionCallback);

    /// Drop the connection.  The connection-state callback fires with `false`.
    fn disconnect(&self);
}

// ════════════════════════════════════════════════════════════════════════════
// Display
// ════════════════════════════════════════════════════════════════════════════

/// Whose hand a frame belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Local,
    Remote,
}

/// Consumer of state changes.  Owns all rendering; never owns session state.
pub trait DisplaySink: Send + Sync {
    /// The primary frame for `role` changed.  `None` means no hand.
    fn show_landmarks(&self, frame: Option<&LandmarkFrame>, role: Role);

    /// Exactly one call per arbitration.
    fn show_outcome(&self, outcome: MatchOutcome);

    /// Every hand seen in the latest local poll, with side tags.
    fn show_local_hands(&self, _hands: &[HandObservation]) {}
}

// ════════════════════════════════════════════════════════════════════════════
// Pose source
// ════════════════════════════════════════════════════════════════════════════

/// Capture + pose estimation, polled at a fixed cadence.
///
/// Returns every detected hand; an empty vec means no hand this poll.
/// Implementations must return promptly and report failures as "no hand".
/// Sources are built on the thread that polls them, so device handles
/// need not be `Send`.
pub trait PoseSource {
    fn poll(&mut self) -> Vec<HandObservation>;
}
