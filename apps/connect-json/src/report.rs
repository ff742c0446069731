use std::net::SocketAddr;

use tracing::{debug, error, info};

use crate::error::SessionError;
use crate::session::Handler;

/// Logs everything a session reports.
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    chunks: usize,
}

impl ConsoleReporter {
    /// Number of inbound chunks reported so far.
    pub fn chunks(&self) -> usize {
        self.chunks
    }
}

impl Handler for ConsoleReporter {
    fn on_connected(&mut self, peer: SocketAddr) {
        info!(%peer, "connected to server");
    }

    fn on_write_closed(&mut self, sent: usize) {
        debug!(sent, "request sent");
    }

    fn on_data(&mut self, text: &str) {
        self.chunks += 1;
        info!("received: {}", text);
    }

    fn on_end(&mut self) {
        info!(chunks = self.chunks, "disconnected from server");
    }

    fn on_error(&mut self, err: &SessionError) {
        error!(error = %err, "connection failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_each_chunk() {
        let mut reporter = ConsoleReporter::default();
        reporter.on_data("AB");
        reporter.on_data("CD");
        reporter.on_end();
        assert_eq!(reporter.chunks(), 2);
    }
}
