use std::io;
use std::num::ParseIntError;

use thiserror::Error;

use crate::config::Endpoint;

/// Failures that terminate a [`Session`](crate::Session).
///
/// Every variant is terminal; a session never recovers or reconnects.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The connection could not be established. Covers refused and
    /// unreachable peers as well as host resolution failures.
    #[error("failed to connect to {endpoint}: {source}")]
    Connect {
        endpoint: Endpoint,
        #[source]
        source: io::Error,
    },

    /// The established connection failed while writing or reading.
    #[error("transport error: {0}")]
    Transport(#[source] io::Error),

    /// The payload could not be encoded. Raised before anything is written.
    #[error("failed to serialize payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Invalid command line configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid port {value:?}: {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: ParseIntError,
    },
}
