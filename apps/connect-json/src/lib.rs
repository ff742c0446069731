//! A one-shot TCP client.
//!
//! A [`Session`] connects to an [`Endpoint`], writes a single JSON encoded
//! payload, shuts down its write half and then reports every chunk the peer
//! sends back until the peer closes its side of the stream.
//!
//! To try it against a peer that echoes input back, start one in another
//! terminal:
//!
//! ```text
//! ncat -l 3000 -k -c 'cat'
//! ```
//!
//! And run the client:
//!
//! ```text
//! cargo run -p connect-json -- 127.0.0.1 3000
//! ```

#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod payload;
pub mod report;
pub mod session;

pub use config::{Endpoint, DEFAULT_HOST, DEFAULT_PORT};
pub use error::{ConfigError, SessionError};
pub use payload::Point;
pub use report::ConsoleReporter;
pub use session::{Event, Handler, Session, SessionState};
