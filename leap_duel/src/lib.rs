//! # leap_duel
//!
//! Two people, two machines, one relay: each side sees both hands live,
//! and in duel mode every incoming frame settles a round of
//! rock-paper-scissors.
//!
//! ## Data flow
//!
//! ```text
//! PoseSource ─► pose-producer thread ─► SyncCoordinator ─► TcpTransport ─► relay
//!                                            │    ▲
//!                        ChannelDisplay ◄────┘    └──── relay-reader thread
//!                              │
//!                              ▼
//!                    AppState ─► Visualizer (main thread)
//! ```
//!
//! ## Feature flags
//!
//! * (default): **Simulation mode**: the keyboard chooses a canonical pose.
//! * `leap`: **Hardware mode**: polls a real LeapMotion controller via LeapC,
//!   falling back to simulation when no device answers.
//!
//! ### Keys
//!
//! | Key | Action |
//! |---|---|
//! | `R` / `P` / `S` | Hold rock / paper / scissors (simulation) |
//! | `N` | Take the simulated hand out of view |
//! | `1`–`9` | Send frames to that peer |
//! | `0` | Stop sending |
//! | `C` | Reconnect to the relay |
//! | `Q` | Quit |

pub mod app;
pub mod capture;
pub mod display;
pub mod particles;
pub mod visualizer;
