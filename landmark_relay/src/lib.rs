//! # landmark_relay
//!
//! A small relay that lets named participants push hand frames at each
//! other, and the client side that plugs into `duel_sync` as its
//! [`Transport`](duel_sync::Transport).
//!
//! ## Protocol
//!
//! One JSON object per line, tagged by `"type"`:
//!
//! | Direction | Message |
//! |---|---|
//! | client → relay | `{"type":"register","username":"alice"}` |
//! | client → relay | `{"type":"landmarks","targetUser":"bob","landmarks":[{"x":..,"y":..,"z":..}, ..]}` |
//! | relay → client | `{"type":"registered","username":"alice"}` |
//! | relay → all    | `{"type":"userList","users":["alice","bob"]}` |
//! | relay → target | `{"type":"landmarks","sender":"alice","landmarks":[..]}` |
//!
//! The relay forwards joint lists as-is; receivers validate them.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use landmark_relay::{RelayConfig, RelayServer};
//!
//! let server = RelayServer::bind(&RelayConfig::default()).unwrap();
//! server.run().unwrap();
//! ```

pub mod client;
pub mod error;
pub mod protocol;
pub mod server;

pub use client::TcpTransport;
pub use error::RelayError;
pub use protocol::{ClientMessage, ServerMessage};
pub use server::{RelayConfig, RelayServer};
