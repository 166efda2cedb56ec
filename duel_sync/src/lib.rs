//! # duel_sync
//!
//! Keeps a local and a remote hand in step and, in a duel session, decides
//! a rock-paper-scissors round every time a remote frame lands.
//!
//! ## Data flow
//!
//! ```text
//! PoseSource ──► SyncCoordinator::on_local_hands ──► PeerState.local ──► Transport::send
//!                                                          │
//! Transport ───► SyncCoordinator::on_remote_frame ─► PeerState.remote
//!                                                          │
//!                                   snapshot(local, remote)│
//!                                                          ▼
//!                          classify × 2 ──► MatchArbiter ──► DisplaySink::show_outcome
//! ```
//!
//! ## Dominance
//!
//! | Local | Remote | Outcome |
//! |---|---|---|
//! | Rock | Scissors | `SelfWin` |
//! | Paper | Rock | `SelfWin` |
//! | Scissors | Paper | `SelfWin` |
//! | reversed pairs | | `OpponentWin` |
//! | equal labels | | `Draw` |
//! | anything with `Unknown` or an absent frame | | `Indeterminate` |
//!
//! The classifier, arbiter and coordinator never fail the session: missing
//! hands, unrecognized shapes and a dropped transport all degrade to
//! `Unknown`, `Indeterminate` or a no-op.  The one hard check is at
//! ingestion, where a remote joint list that is not exactly 21 finite
//! points is refused.

pub mod arbiter;
pub mod collab;
pub mod coordinator;
pub mod gesture;
pub mod peer;
pub mod poses;

pub use arbiter::{decide, MatchArbiter, MatchOutcome};
pub use collab::{
    ConnectionCallback, DisplaySink, PeerListCallback, PoseSource, ReceiveCallback, Role,
    Transport, TransportError,
};
pub use coordinator::{SessionMode, SyncCoordinator};
pub use gesture::{classify, classify_frame, GestureLabel};
pub use peer::{ConnectionState, PeerState};
