//! Pose sources and the fixed-cadence producer thread.
//!
//! The producer polls a [`PoseSource`], applies the capture-side [`Mirror`]
//! and hands the result to the coordinator.  It is the only caller of
//! [`SyncCoordinator::on_local_hands`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use duel_sync::{poses, GestureLabel, PoseSource, SyncCoordinator};
use hand_landmarks::{HandObservation, Handedness, Mirror};
use thiserror::Error;
use tracing::debug;

/// Capture could not start.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("LeapMotion unavailable: {0}")]
    Device(String),
}

// ════════════════════════════════════════════════════════════════════════════
// SimPoseSource: keyboard simulation (always available)
// ════════════════════════════════════════════════════════════════════════════

/// The pose the simulated hand is holding, shared with the window's key
/// handler.  `None` means the hand is out of view.
#[derive(Clone, Debug)]
pub struct SimSelection(Arc<Mutex<Option<GestureLabel>>>);

impl Default for SimSelection {
    fn default() -> Self {
        SimSelection(Arc::new(Mutex::new(Some(GestureLabel::Rock))))
    }
}

impl SimSelection {
    pub fn set(&self, label: Option<GestureLabel>) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = label;
    }

    pub fn get(&self) -> Option<GestureLabel> {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Canonical pose for the selected label, swaying gently so the remote
/// side sees a live hand.
pub struct SimPoseSource {
    selection: SimSelection,
    tick:      u32,
}

impl SimPoseSource {
    const SWAY: f32 = 0.03;

    pub fn new(selection: SimSelection) -> Self {
        SimPoseSource { selection, tick: 0 }
    }
}

impl PoseSource for SimPoseSource {
    fn poll(&mut self) -> Vec<HandObservation> {
        self.tick = self.tick.wrapping_add(1);
        let Some(frame) = self.selection.get().and_then(poses::for_label) else {
            return Vec::new();
        };
        let phase = self.tick as f32 * 0.05;
        // A uniform shift preserves fingertip ordering, so the label holds.
        let frame = frame.translated(Self::SWAY * phase.sin(), 0.5 * Self::SWAY * phase.cos());
        vec![HandObservation { side: Handedness::Right, frame }]
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapPoseSource: real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Polls a LeapMotion controller and converts each tracked hand into 21
/// normalized landmarks (wrist, then four joints per digit, thumb first).
///
/// Leap reports millimetres with `y` pointing up; landmarks use image
/// space with `y` pointing down, so the interaction box below is flipped
/// vertically on conversion.
#[cfg(feature = "leap")]
pub struct LeapPoseSource {
    connection: leaprs::Connection,
    last:       Vec<HandObservation>,
}

#[cfg(feature = "leap")]
impl LeapPoseSource {
    const X_RANGE: (f32, f32) = (-200.0, 200.0);
    const Y_RANGE: (f32, f32) = (50.0, 450.0);
    const Z_SCALE: f32        = 400.0;
    const MAX_HANDS: usize    = 2;

    pub fn open() -> Result<Self, CaptureError> {
        use leaprs::*;
        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| CaptureError::Device(format!("{e:?}")))?;
        connection.open().map_err(|e| CaptureError::Device(format!("{e:?}")))?;
        Ok(LeapPoseSource { connection, last: Vec::new() })
    }

    fn normalize(x: f32, y: f32, z: f32) -> hand_landmarks::Landmark {
        let (x0, x1) = Self::X_RANGE;
        let (y0, y1) = Self::Y_RANGE;
        hand_landmarks::Landmark::new(
            ((x - x0) / (x1 - x0)).clamp(0.0, 1.0),
            (1.0 - (y - y0) / (y1 - y0)).clamp(0.0, 1.0),
            z / Self::Z_SCALE,
        )
    }

    fn convert(hand: &leaprs::Hand) -> Option<HandObservation> {
        use hand_landmarks::{Landmark, LandmarkFrame, JOINT_COUNT};
        use leaprs::HandType;

        let digits: Vec<_> = hand.digits().collect();
        if digits.len() < 5 { return None; }

        let mut joints = [Landmark::default(); JOINT_COUNT];
        let w = digits[2].metacarpal().prev_joint();
        joints[0] = Self::normalize(w.x, w.y, w.z);

        for (d, digit) in digits.iter().take(5).enumerate() {
            let base = 1 + 4 * d;
            let points = [
                digit.proximal().prev_joint(),
                digit.intermediate().prev_joint(),
                digit.distal().prev_joint(),
                digit.distal().next_joint(),
            ];
            for (k, p) in points.iter().enumerate() {
                joints[base + k] = Self::normalize(p.x, p.y, p.z);
            }
        }

        let side = if hand.hand_type() == HandType::Left {
            Handedness::Left
        } else {
            Handedness::Right
        };
        Some(HandObservation { side, frame: LandmarkFrame::new(joints) })
    }
}

#[cfg(feature = "leap")]
impl PoseSource for LeapPoseSource {
    fn poll(&mut self) -> Vec<HandObservation> {
        use leaprs::Event;

        match self.connection.poll(5) {
            Ok(msg) => {
                if let Event::Tracking(frame) = msg.event() {
                    self.last = frame
                        .hands()
                        .filter_map(|h| Self::convert(&h))
                        .take(Self::MAX_HANDS)
                        .collect();
                }
            }
            // A poll timeout just means no new frame yet.
            Err(e) => debug!(error = ?e, "leap poll returned no frame"),
        }
        self.last.clone()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Producer thread
// ════════════════════════════════════════════════════════════════════════════

/// Build a source on a dedicated thread and poll it every `cadence` until
/// `stop` is raised.
pub fn spawn_producer<F>(
    make:    F,
    mirror:  Mirror,
    cadence: Duration,
    coord:   Arc<SyncCoordinator>,
    stop:    Arc<AtomicBool>,
) -> std::io::Result<JoinHandle<()>>
where
    F: FnOnce() -> Box<dyn PoseSource> + Send + 'static,
{
    thread::Builder::new()
        .name("pose-producer".into())
        .spawn(move || {
            let mut source = make();
            debug!(?mirror, cadence_ms = cadence.as_millis() as u64, "pose producer started");
            while !stop.load(Ordering::Relaxed) {
                let hands = mirrored(source.poll(), mirror);
                coord.on_local_hands(&hands);
                thread::sleep(cadence);
            }
            debug!("pose producer stopped");
        })
}

fn mirrored(hands: Vec<HandObservation>, mirror: Mirror) -> Vec<HandObservation> {
    hands
        .into_iter()
        .map(|h| HandObservation { side: h.side, frame: mirror.apply(&h.frame) })
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use duel_sync::{
        classify_frame, ConnectionCallback, DisplaySink, MatchOutcome, PeerListCallback,
        ReceiveCallback, Role, SessionMode, Transport, TransportError,
    };
    use hand_landmarks::LandmarkFrame;

    #[test]
    fn sim_source_holds_its_label_while_swaying() {
        let sel = SimSelection::default();
        let mut src = SimPoseSource::new(sel.clone());
        for label in [GestureLabel::Rock, GestureLabel::Paper, GestureLabel::Scissors] {
            sel.set(Some(label));
            for _ in 0..200 {
                let hands = src.poll();
                assert_eq!(hands.len(), 1);
                assert_eq!(classify_frame(&hands[0].frame), label);
            }
        }
    }

    #[test]
    fn sim_source_hides_hand_on_none() {
        let sel = SimSelection::default();
        let mut src = SimPoseSource::new(sel.clone());
        sel.set(None);
        assert!(src.poll().is_empty());
    }

    #[test]
    fn mirroring_keeps_side_and_flips_x() {
        let hands = vec![HandObservation { side: Handedness::Left, frame: poses::fist() }];
        let out = mirrored(hands, Mirror::Horizontal);
        assert_eq!(out[0].side, Handedness::Left);
        let before = poses::fist().joint(0).x;
        assert!((out[0].frame.joint(0).x - (1.0 - before)).abs() < 1e-6);
    }

    // ── producer ─────────────────────────────────────────────────────────

    struct Idle;
    impl Transport for Idle {
        fn register(&self, _: &str) -> Result<(), TransportError> { Ok(()) }
        fn send(&self, _: &str, _: &LandmarkFrame) -> Result<(), TransportError> {
            Err(TransportError::NotConnected)
        }
        fn on_receive(&self, _: ReceiveCallback) {}
        fn on_peer_list_changed(&self, _: PeerListCallback) {}
        fn on_connection_state_changed(&self, _: ConnectionCallback) {}
        fn disconnect(&self) {}
    }

    struct Quiet;
    impl DisplaySink for Quiet {
        fn show_landmarks(&self, _: Option<&LandmarkFrame>, _: Role) {}
        fn show_outcome(&self, _: MatchOutcome) {}
    }

    #[test]
    fn producer_feeds_the_coordinator_until_stopped() {
        let coord = Arc::new(SyncCoordinator::new(SessionMode::Duel, Arc::new(Idle), Arc::new(Quiet)));
        let stop = Arc::new(AtomicBool::new(false));
        let sel = SimSelection::default();
        sel.set(Some(GestureLabel::Paper));

        let handle = spawn_producer(
            move || -> Box<dyn PoseSource> { Box::new(SimPoseSource::new(sel)) },
            Mirror::None,
            Duration::from_millis(1),
            coord.clone(),
            stop.clone(),
        )
        .unwrap();

        let mut seen = false;
        for _ in 0..500 {
            if let Some(f) = coord.snapshot().local_frame() {
                assert_eq!(classify_frame(f), GestureLabel::Paper);
                seen = true;
                break;
            }
            thread::sleep(Duration::from_millis(2));
        }
        stop.store(true, Ordering::Relaxed);
        handle.join().unwrap();
        assert!(seen, "producer never delivered a frame");
    }
}
