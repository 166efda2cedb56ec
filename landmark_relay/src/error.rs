use std::io;

use thiserror::Error;

/// Relay server failures.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("failed to bind relay on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("relay I/O error: {0}")]
    Io(#[from] io::Error),
}
