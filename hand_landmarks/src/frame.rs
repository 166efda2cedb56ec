//! `Landmark`, `LandmarkFrame` and the capture-side tags that travel with them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::topology::{Finger, JOINT_COUNT};

// ════════════════════════════════════════════════════════════════════════════
// FrameError
// ════════════════════════════════════════════════════════════════════════════

/// Why a joint list could not become a [`LandmarkFrame`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("malformed frame: expected 21 joints, got {count}")]
    Malformed { count: usize },

    #[error("malformed frame: joint {index} has a non-finite coordinate")]
    NonFinite { index: usize },

    #[error("malformed frame: joint {index} lies outside the image band")]
    OutOfRange { index: usize },
}

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// Accepted range for normalized `x`/`y`.  Estimators report joints slightly
/// outside the image; anything past one image-width is garbage.
pub const IMAGE_BAND: std::ops::RangeInclusive<f32> = -1.0..=2.0;

/// One joint position in normalized image space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    /// `x` and `y` within [`IMAGE_BAND`].  Depth is not projected.
    fn in_band(&self) -> bool {
        IMAGE_BAND.contains(&self.x) && IMAGE_BAND.contains(&self.y)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkFrame
// ════════════════════════════════════════════════════════════════════════════

/// The complete set of 21 landmarks for one hand at one instant.
///
/// The array length is the invariant: a `LandmarkFrame` cannot be partial.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LandmarkFrame {
    joints: [Landmark; JOINT_COUNT],
}

impl LandmarkFrame {
    pub fn new(joints: [Landmark; JOINT_COUNT]) -> Self {
        LandmarkFrame { joints }
    }

    /// Validate an untrusted joint list.
    pub fn from_slice(joints: &[Landmark]) -> Result<Self, FrameError> {
        if joints.len() != JOINT_COUNT {
            return Err(FrameError::Malformed { count: joints.len() });
        }
        if let Some(index) = joints.iter().position(|j| !j.is_finite()) {
            return Err(FrameError::NonFinite { index });
        }
        if let Some(index) = joints.iter().position(|j| !j.in_band()) {
            return Err(FrameError::OutOfRange { index });
        }
        let mut out = [Landmark::default(); JOINT_COUNT];
        out.copy_from_slice(joints);
        Ok(LandmarkFrame { joints: out })
    }

    pub fn joints(&self) -> &[Landmark; JOINT_COUNT] {
        &self.joints
    }

    /// Joint by landmark index.  Panics if `index >= 21`, which only a
    /// programming error can produce.
    pub fn joint(&self, index: usize) -> Landmark {
        self.joints[index]
    }

    pub fn tip(&self, finger: Finger) -> Landmark {
        self.joints[finger.tip()]
    }

    pub fn to_vec(&self) -> Vec<Landmark> {
        self.joints.to_vec()
    }

    /// Shift every joint in the image plane.
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        let mut joints = self.joints;
        for j in joints.iter_mut() {
            j.x += dx;
            j.y += dy;
        }
        LandmarkFrame { joints }
    }
}

impl TryFrom<Vec<Landmark>> for LandmarkFrame {
    type Error = FrameError;

    fn try_from(joints: Vec<Landmark>) -> Result<Self, Self::Error> {
        LandmarkFrame::from_slice(&joints)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Mirror: capture-boundary coordinate convention
// ════════════════════════════════════════════════════════════════════════════

/// How the capture side presents its own hand.
///
/// `Horizontal` maps `x → 1 - x`, giving the local user a natural
/// mirror-image view.  Gesture classification reads only `y`, so frames
/// produced under either convention classify identically.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mirror {
    None,
    #[default]
    Horizontal,
}

impl Mirror {
    pub fn apply(self, frame: &LandmarkFrame) -> LandmarkFrame {
        match self {
            Mirror::None => *frame,
            Mirror::Horizontal => {
                let mut joints = frame.joints;
                for j in joints.iter_mut() {
                    j.x = 1.0 - j.x;
                }
                LandmarkFrame { joints }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Handedness / HandObservation
// ════════════════════════════════════════════════════════════════════════════

/// Side tag reported by the pose estimator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Parse a pose-estimator label ("Left" / "Right", any case).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "left"  => Some(Handedness::Left),
            "right" => Some(Handedness::Right),
            _       => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Handedness::Left  => "Left",
            Handedness::Right => "Right",
        }
    }
}

/// One detected hand from a single capture poll.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandObservation {
    pub side:  Handedness,
    pub frame: LandmarkFrame,
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
