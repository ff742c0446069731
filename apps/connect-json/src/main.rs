//! Connects to a peer, sends `{"x":1,"y":2}` and logs whatever comes back.
//!
//! To start a peer that echoes input in another terminal:
//!
//!     ncat -l 3000 -k -c 'cat'
//!
//! And run this client, optionally passing a host and port:
//!
//!     cargo run -p connect-json -- 127.0.0.1 3000

#![warn(rust_2018_idioms)]

use connect_json::{ConsoleReporter, Endpoint, Point, Session};
use tracing_subscriber::EnvFilter;

use std::env;
use std::error::Error;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let endpoint = Endpoint::from_args(env::args().skip(1))?;

    let session = Session::open(endpoint, Point::default());
    session.run(&mut ConsoleReporter::default()).await?;

    Ok(())
}
