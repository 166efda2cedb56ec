//! Top-level application state and the main loop.
//!
//! `AppState` is what the window shows: the latest hands, the peer list,
//! the outcome banner and the sparkle field.  It is fed only by
//! [`DisplayEvent`]s and by the user's own key presses; the session itself
//! lives in the [`SyncCoordinator`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::TryRecvError;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use duel_sync::{
    ConnectionState, GestureLabel, MatchOutcome, PoseSource, Role, SessionMode, SyncCoordinator,
    Transport,
};
use hand_landmarks::{HandObservation, LandmarkFrame, Mirror};
use landmark_relay::TcpTransport;
use tracing::{info, warn};

use crate::capture::{spawn_producer, SimPoseSource, SimSelection};
use crate::display::{ChannelDisplay, DisplayEvent};
use crate::particles::ParticleField;
use crate::visualizer::{self, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Relay address, `host:port`.
    pub server:   String,
    pub username: String,
    pub mode:     SessionMode,
    /// Applied to local hands at the capture boundary.
    pub mirror:   Mirror,
    /// Pose polling interval.
    pub cadence:  Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server:   "127.0.0.1:3000".to_string(),
            username: "player".to_string(),
            mode:     SessionMode::Duel,
            mirror:   Mirror::Horizontal,
            cadence:  Duration::from_millis(10),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// OutcomeBanner
// ════════════════════════════════════════════════════════════════════════════

/// The last verdict on screen.  Only a real verdict replaces it; an
/// indeterminate round leaves the previous one standing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutcomeBanner {
    shown: Option<MatchOutcome>,
}

impl OutcomeBanner {
    /// Returns whether the banner changed.
    pub fn apply(&mut self, outcome: MatchOutcome) -> bool {
        if !outcome.is_verdict() || self.shown == Some(outcome) {
            return false;
        }
        self.shown = Some(outcome);
        true
    }

    pub fn shown(&self) -> Option<MatchOutcome> {
        self.shown
    }

    pub fn clear(&mut self) {
        self.shown = None;
    }
}

// ════════════════════════════════════════════════════════════════════════════
// UiAction
// ════════════════════════════════════════════════════════════════════════════

/// What the user asked for this frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiAction {
    /// Simulated hand pose; `None` takes the hand out of view.
    Pose(Option<GestureLabel>),
    /// 1-based index into [`AppState::opponents`].
    SelectPeer(usize),
    ClearTarget,
    Reconnect,
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// AppState
// ════════════════════════════════════════════════════════════════════════════

pub struct AppState {
    username: String,
    mode:     SessionMode,

    // ── hands ─────────────────────────────────────────────────────────────
    local_hands: Vec<HandObservation>,
    local:       Option<LandmarkFrame>,
    remote:      Option<LandmarkFrame>,

    // ── relay ─────────────────────────────────────────────────────────────
    peers:    Vec<String>,
    selected: Option<String>,

    // ── presentation ──────────────────────────────────────────────────────
    banner:     OutcomeBanner,
    particles:  ParticleField,
    pub status: String,
}

impl AppState {
    pub fn new(username: &str, mode: SessionMode) -> Self {
        AppState {
            username:    username.to_string(),
            mode,
            local_hands: Vec::new(),
            local:       None,
            remote:      None,
            peers:       Vec::new(),
            selected:    None,
            banner:      OutcomeBanner::default(),
            particles:   ParticleField::default(),
            status:      format!("{username}: connecting"),
        }
    }

    pub fn handle(&mut self, event: DisplayEvent) {
        match event {
            DisplayEvent::LocalHands(hands) => self.local_hands = hands,
            DisplayEvent::Landmarks { role: Role::Local, frame } => {
                self.local = frame;
                if frame.is_none() {
                    self.local_hands.clear();
                }
            }
            DisplayEvent::Landmarks { role: Role::Remote, frame } => self.remote = frame,
            DisplayEvent::Outcome(outcome) => {
                self.banner.apply(outcome);
            }
            DisplayEvent::Peers(peers) => {
                if let Some(sel) = &self.selected {
                    if !peers.contains(sel) {
                        self.status = format!("{sel} left");
                    }
                }
                self.peers = peers;
            }
        }
    }

    /// Everyone on the relay except us, in relay order.
    pub fn opponents(&self) -> Vec<&str> {
        self.peers
            .iter()
            .map(String::as_str)
            .filter(|p| *p != self.username)
            .collect()
    }

    /// Pick the `n`th opponent (1-based).  Returns the name if it exists.
    pub fn select(&mut self, n: usize) -> Option<String> {
        let name = self.opponents().get(n.checked_sub(1)?)?.to_string();
        self.selected = Some(name.clone());
        self.banner.clear();
        self.status = format!("target: {name}");
        Some(name)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.remote = None;
        self.banner.clear();
        self.status = "no target".to_string();
    }

    /// Screen-space collision sparkles, then particle aging.
    pub fn tick(&mut self) {
        if let Some(remote) = &self.remote {
            let local: Vec<(f32, f32)> = self
                .local_hands
                .iter()
                .flat_map(|h| h.frame.joints().iter().map(visualizer::project))
                .collect();
            let remote: Vec<(f32, f32)> = remote.joints().iter().map(visualizer::project).collect();
            self.particles.collide(&local, &remote, &mut rand::rng());
        }
        self.particles.tick();
    }

    // ── Accessors for the render loop ─────────────────────────────────────

    pub fn username(&self)    -> &str                 { &self.username }
    pub fn mode(&self)        -> SessionMode          { self.mode }
    pub fn local_hands(&self) -> &[HandObservation]   { &self.local_hands }
    pub fn local(&self)       -> Option<&LandmarkFrame> { self.local.as_ref() }
    pub fn remote(&self)      -> Option<&LandmarkFrame> { self.remote.as_ref() }
    pub fn selected(&self)    -> Option<&str>         { self.selected.as_deref() }
    pub fn banner(&self)      -> &OutcomeBanner       { &self.banner }
    pub fn particles(&self)   -> &ParticleField       { &self.particles }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): the main application loop
// ════════════════════════════════════════════════════════════════════════════

/// Connect, start capture and drive the window at ~60 fps until it closes.
pub fn run(cfg: AppConfig) -> Result<()> {
    // ── Session wiring ────────────────────────────────────────────────────
    let transport = Arc::new(TcpTransport::new(cfg.server.clone()));
    let (display, events) = ChannelDisplay::new();

    let peers_tx = display.sender();
    transport.on_peer_list_changed(Box::new(move |users| {
        let _ = peers_tx.send(DisplayEvent::Peers(users));
    }));

    let coord = Arc::new(SyncCoordinator::new(cfg.mode, transport.clone(), Arc::new(display)));
    coord.attach();

    let mut app = AppState::new(&cfg.username, cfg.mode);
    if let Err(e) = coord.connect(&cfg.username) {
        warn!(server = %cfg.server, error = %e, "relay unreachable");
        app.status = format!("relay {} unreachable (C to retry)", cfg.server);
    }

    // ── Capture ───────────────────────────────────────────────────────────
    let selection = SimSelection::default();
    let stop = Arc::new(AtomicBool::new(false));
    let producer = {
        let selection = selection.clone();
        spawn_producer(
            move || pose_source(selection),
            cfg.mirror,
            cfg.cadence,
            coord.clone(),
            stop.clone(),
        )?
    };

    // ── Window ────────────────────────────────────────────────────────────
    let mut vis = Visualizer::new().map_err(|e| anyhow!("could not open window: {e}"))?;
    info!(user = %cfg.username, mode = ?cfg.mode, "session started");

    // ── Main loop ─────────────────────────────────────────────────────────
    'frame: while vis.is_open() {
        for action in vis.poll_input() {
            match action {
                UiAction::Quit => break 'frame,
                UiAction::Pose(label) => selection.set(label),
                UiAction::SelectPeer(n) => {
                    if let Some(name) = app.select(n) {
                        coord.set_target(Some(name));
                    }
                }
                UiAction::ClearTarget => {
                    app.clear_selection();
                    coord.set_target(None);
                }
                UiAction::Reconnect => {
                    coord.disconnect();
                    match coord.connect(&cfg.username) {
                        Ok(()) => app.status = "reconnecting".to_string(),
                        Err(e) => app.status = format!("reconnect failed: {e}"),
                    }
                }
            }
        }

        loop {
            match events.try_recv() {
                Ok(event) => app.handle(event),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => break 'frame,
            }
        }

        app.tick();
        vis.render(&app, coord.connection());
    }

    // ── Shutdown ──────────────────────────────────────────────────────────
    stop.store(true, Ordering::Relaxed);
    coord.disconnect();
    if producer.join().is_err() {
        warn!("pose producer panicked");
    }
    info!("session ended");
    Ok(())
}

/// Hardware when built with `leap` and a device answers, otherwise the
/// keyboard simulator.
fn pose_source(selection: SimSelection) -> Box<dyn PoseSource> {
    #[cfg(feature = "leap")]
    {
        match crate::capture::LeapPoseSource::open() {
            Ok(source) => {
                info!("capturing from LeapMotion");
                return Box::new(source);
            }
            Err(e) => warn!(error = %e, "falling back to keyboard simulation"),
        }
    }
    Box::new(SimPoseSource::new(selection))
}

/// Status-bar text for the connection.
pub fn connection_label(state: ConnectionState) -> &'static str {
    match state {
        ConnectionState::Disconnected => "offline",
        ConnectionState::Connecting   => "connecting",
        ConnectionState::Connected    => "online",
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
