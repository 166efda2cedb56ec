//! `SyncCoordinator`: the two entry points that mutate session state.
//!
//! The capture producer calls [`SyncCoordinator::on_local_hands`] on a fixed
//! cadence; the transport's reader thread calls
//! [`SyncCoordinator::on_remote_frame`] whenever a frame arrives.  Both go
//! through one mutex around [`PeerState`]; arbitration works on a snapshot
//! taken under that lock and runs after it is released.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hand_landmarks::{FrameError, HandObservation, Landmark, LandmarkFrame};
use tracing::{debug, info, trace, warn};

use crate::arbiter::MatchArbiter;
use crate::collab::{DisplaySink, Role, Transport, TransportError};
use crate::peer::{ConnectionState, PeerState};

/// Whether incoming frames trigger a rock-paper-scissors round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionMode {
    /// Mirror hands only.
    Share,
    /// Mirror hands and arbitrate on every remote frame.
    #[default]
    Duel,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ════════════════════════════════════════════════════════════════════════════
// SyncCoordinator
// ════════════════════════════════════════════════════════════════════════════

pub struct SyncCoordinator {
    state:     Mutex<PeerState>,
    target:    Mutex<Option<String>>,
    mode:      SessionMode,
    transport: Arc<dyn Transport>,
    display:   Arc<dyn DisplaySink>,
    arbiter:   MatchArbiter,
}

impl SyncCoordinator {
    pub fn new(
        mode:      SessionMode,
        transport: Arc<dyn Transport>,
        display:   Arc<dyn DisplaySink>,
    ) -> Self {
        SyncCoordinator {
            state: Mutex::new(PeerState::new()),
            target: Mutex::new(None),
            mode,
            transport,
            arbiter: MatchArbiter::new(display.clone()),
            display,
        }
    }

    /// Route the transport's receive and connection callbacks into this
    /// coordinator.  Callbacks hold weak references, so dropping the last
    /// `Arc` ends delivery.
    pub fn attach(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        self.transport.on_receive(Box::new(move |sender: String, joints: Vec<Landmark>| {
            if let Some(coord) = weak.upgrade() {
                // Rejections are logged inside; nothing to propagate to the reader.
                let _ = coord.on_remote_frame(&sender, joints);
            }
        }));

        let weak = Arc::downgrade(self);
        self.transport.on_connection_state_changed(Box::new(move |up: bool| {
            if let Some(coord) = weak.upgrade() {
                coord.on_connection_changed(up);
            }
        }));
    }

    pub fn mode(&self) -> SessionMode { self.mode }

    // ── local path ────────────────────────────────────────────────────────

    /// One capture poll's worth of hands.  Every hand is shown; the last
    /// one becomes the local frame and is forwarded.
    pub fn on_local_hands(&self, hands: &[HandObservation]) {
        if !hands.is_empty() {
            self.display.show_local_hands(hands);
        }
        self.on_local_frame(hands.last().map(|h| h.frame));
    }

    /// Store the local frame and forward it to the targeted peer.
    ///
    /// Never arbitrates.  While disconnected, or with no target, forwarding
    /// is a silent no-op.
    pub fn on_local_frame(&self, frame: Option<LandmarkFrame>) {
        let connected = {
            let mut state = lock(&self.state);
            state.set_local(frame);
            state.is_connected()
        };
        self.display.show_landmarks(frame.as_ref(), Role::Local);

        let Some(frame) = frame else { return };
        if !connected {
            trace!("not connected; local frame not forwarded");
            return;
        }
        let Some(target) = self.target() else { return };

        match self.transport.send(&target, &frame) {
            Ok(()) => trace!(peer = %target, "local frame forwarded"),
            Err(TransportError::NotConnected) => trace!("transport unavailable; frame dropped"),
            Err(e) => debug!(peer = %target, error = %e, "frame dropped"),
        }
    }

    // ── remote path ───────────────────────────────────────────────────────

    /// Validate and store a remote frame, then arbitrate in duel mode.
    ///
    /// A joint list that is not a valid frame is rejected and the previous
    /// remote frame is kept.  Frames that arrive while not connected are
    /// dropped: a disconnect has already cleared the remote side.
    pub fn on_remote_frame(&self, sender: &str, joints: Vec<Landmark>) -> Result<(), FrameError> {
        let frame = match LandmarkFrame::try_from(joints) {
            Ok(f) => f,
            Err(e) => {
                warn!(%sender, error = %e, "rejected remote frame");
                return Err(e);
            }
        };

        let local = {
            let mut state = lock(&self.state);
            if !state.is_connected() {
                debug!(%sender, "not connected; late remote frame dropped");
                return Ok(());
            }
            state.set_remote(sender, frame);
            state.local_frame().copied()
        };
        self.display.show_landmarks(Some(&frame), Role::Remote);

        if self.mode == SessionMode::Duel {
            self.arbiter.arbitrate_frames(local.as_ref(), Some(&frame));
        }
        Ok(())
    }

    // ── connectivity ──────────────────────────────────────────────────────

    /// Begin a (re)connection by registering `identity` with the transport.
    pub fn connect(&self, identity: &str) -> Result<(), TransportError> {
        lock(&self.state).begin_connecting();
        info!(%identity, "connecting");
        match self.transport.register(identity) {
            Ok(()) => Ok(()),
            Err(e) => {
                warn!(error = %e, "registration failed");
                self.on_connection_changed(false);
                Err(e)
            }
        }
    }

    /// Transport-reported connectivity change.
    pub fn on_connection_changed(&self, up: bool) {
        if up {
            if lock(&self.state).confirm_registered() {
                info!("registered with relay");
            }
            return;
        }

        let changed = lock(&self.state).mark_disconnected();
        if changed {
            info!("disconnected from relay");
        }
        self.display.show_landmarks(None, Role::Remote);
    }

    /// Close the transport.  A transport that reports the drop through its
    /// connection callback has already reset the state; otherwise it is
    /// reset here.
    pub fn disconnect(&self) {
        self.transport.disconnect();
        if self.connection() != ConnectionState::Disconnected {
            self.on_connection_changed(false);
        }
    }

    pub fn connection(&self) -> ConnectionState {
        lock(&self.state).connection()
    }

    // ── targeting ─────────────────────────────────────────────────────────

    pub fn set_target(&self, peer: Option<String>) {
        info!(target_peer = ?peer, "transmission target changed");
        *lock(&self.target) = peer;
    }

    pub fn target(&self) -> Option<String> {
        lock(&self.target).clone()
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> PeerState {
        lock(&self.state).clone()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
