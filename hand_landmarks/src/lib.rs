//! # hand_landmarks
//!
//! The shared data model for per-frame hand pose exchange: a [`LandmarkFrame`]
//! is an immutable snapshot of the 21 joints of one tracked hand, in
//! normalized image space (`x`, `y` in `0.0..=1.0`, `y` grows downward).
//!
//! ## Joint topology
//!
//! | Index | Joint |
//! |---|---|
//! | 0 | Wrist |
//! | 1–4 | Thumb (CMC, MCP, IP, tip) |
//! | 5–8 | Index (MCP, PIP, DIP, tip) |
//! | 9–12 | Middle |
//! | 13–16 | Ring |
//! | 17–20 | Pinky |
//!
//! A frame is either absent (`Option::None` at the call site) or fully
//! populated.  Anything arriving from outside the process goes through
//! [`LandmarkFrame::from_slice`], which rejects partial or non-finite data
//! instead of letting it be indexed.
//!
//! ## Mirroring
//!
//! Capture code may present the local user with a mirror image.  That choice
//! is made once, at the capture boundary, with [`Mirror`]; nothing downstream
//! assumes either convention.

pub mod frame;
pub mod topology;

pub use frame::{FrameError, HandObservation, Handedness, Landmark, LandmarkFrame, Mirror, IMAGE_BAND};
pub use topology::{Finger, HAND_CONNECTIONS, JOINT_COUNT};
