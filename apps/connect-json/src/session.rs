//! The connection session.
//!
//! [`Session::open`] spawns a task that drives one TCP connection through
//! connect, send, half-close and receive. Progress is reported back as a
//! sequence of [`Event`]s over a channel, so the caller observes the whole
//! lifecycle on a single timeline:
//!
//! ```text
//! Connected -> WriteClosed -> Data* -> End
//!          \             \         \-> Error
//!           \             \-> Error
//!            \-> Error
//! Error (connect failed)
//! ```
//!
//! At most one of `End` or `Error` is delivered and nothing follows it.

use std::io;
use std::net::SocketAddr;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{BytesCodec, FramedRead, FramedWrite};
use tracing::{debug, info_span, warn, Instrument};

use crate::config::Endpoint;
use crate::error::SessionError;
use crate::payload;

/// Events buffered between the connection task and the session handle.
const EVENT_BUFFER: usize = 32;

/// A lifecycle notification produced by a session.
#[derive(Debug)]
pub enum Event {
    /// The handshake completed.
    Connected { peer: SocketAddr },
    /// The payload was written and the write half shut down.
    WriteClosed { sent: usize },
    /// One chunk of inbound bytes, exactly as read from the socket.
    Data(Bytes),
    /// The peer closed its side of the stream.
    End,
    /// The session failed.
    Error(SessionError),
}

impl Event {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::End | Event::Error(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Connected,
    WriteHalfClosed,
    Ended,
    Errored,
}

impl SessionState {
    /// Returns the state reached after observing `event`.
    ///
    /// Terminal states absorb every event. Events that do not apply to the
    /// current state leave it unchanged.
    pub fn on(self, event: &Event) -> SessionState {
        use SessionState::*;

        match (self, event) {
            (Ended | Errored, _) => self,
            (_, Event::Error(_)) => Errored,
            (Connecting, Event::Connected { .. }) => Connected,
            (Connected, Event::WriteClosed { .. }) => WriteHalfClosed,
            (WriteHalfClosed, Event::End) => Ended,
            _ => self,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Ended | SessionState::Errored)
    }
}

/// Receives the notifications of a session driven by [`Session::run`].
///
/// Only inbound data has to be handled; the other notifications default to
/// doing nothing.
pub trait Handler {
    fn on_connected(&mut self, _peer: SocketAddr) {}

    fn on_write_closed(&mut self, _sent: usize) {}

    /// Called once per inbound chunk with the chunk decoded as UTF-8.
    /// Invalid sequences are replaced, chunks are never joined.
    fn on_data(&mut self, text: &str);

    fn on_end(&mut self) {}

    fn on_error(&mut self, _err: &SessionError) {}
}

/// Handle to one outbound connection.
#[derive(Debug)]
pub struct Session {
    endpoint: Endpoint,
    state: SessionState,
    events: mpsc::Receiver<Event>,
}

impl Session {
    /// Starts connecting to `endpoint` and returns immediately.
    ///
    /// Once connected, `payload` is encoded as JSON, written, and the write
    /// half of the socket is shut down. Host resolution and connect failures
    /// are delivered as an [`Event::Error`], never returned from here.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn open<T>(endpoint: Endpoint, payload: T) -> Session
    where
        T: serde::Serialize + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let span = info_span!("session", %endpoint);
        tokio::spawn(drive(endpoint.clone(), payload, tx).instrument(span));

        Session {
            endpoint,
            state: SessionState::Connecting,
            events: rx,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The state implied by the events delivered so far.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Waits for the next event.
    ///
    /// Returns `None` once a terminal event has been delivered.
    pub async fn next_event(&mut self) -> Option<Event> {
        if self.state.is_terminal() {
            return None;
        }

        let event = match self.events.recv().await {
            Some(event) => event,
            // The task only goes away without a terminal event if it panicked.
            None => Event::Error(SessionError::Transport(io::Error::new(
                io::ErrorKind::Other,
                "session task stopped unexpectedly",
            ))),
        };
        self.state = self.state.on(&event);

        Some(event)
    }

    /// Dispatches every event to `handler` until the session terminates.
    ///
    /// Returns the error that terminated the session, if any.
    pub async fn run<H: Handler>(mut self, handler: &mut H) -> Result<(), SessionError> {
        while let Some(event) = self.next_event().await {
            match event {
                Event::Connected { peer } => handler.on_connected(peer),
                Event::WriteClosed { sent } => handler.on_write_closed(sent),
                Event::Data(chunk) => handler.on_data(&String::from_utf8_lossy(&chunk)),
                Event::End => {
                    handler.on_end();
                    return Ok(());
                }
                Event::Error(err) => {
                    handler.on_error(&err);
                    return Err(err);
                }
            }
        }

        Ok(())
    }
}

/// Why the connection task stopped before the peer closed the stream.
enum Stop {
    /// The session handle was dropped; nobody is listening any more.
    Detached,
    Failed(SessionError),
}

impl From<SessionError> for Stop {
    fn from(err: SessionError) -> Stop {
        Stop::Failed(err)
    }
}

async fn drive<T>(endpoint: Endpoint, payload: T, events: mpsc::Sender<Event>)
where
    T: serde::Serialize,
{
    let last = match exchange(&endpoint, payload, &events).await {
        Ok(()) => {
            debug!("peer closed the stream");
            Event::End
        }
        Err(Stop::Failed(err)) => {
            warn!(error = %err, "session failed");
            Event::Error(err)
        }
        Err(Stop::Detached) => {
            debug!("session handle dropped");
            return;
        }
    };

    let _ = events.send(last).await;
}

async fn exchange<T>(
    endpoint: &Endpoint,
    payload: T,
    events: &mpsc::Sender<Event>,
) -> Result<(), Stop>
where
    T: serde::Serialize,
{
    let mut stream = TcpStream::connect((endpoint.host(), endpoint.port()))
        .await
        .map_err(|source| SessionError::Connect {
            endpoint: endpoint.clone(),
            source,
        })?;
    let peer = stream.peer_addr().map_err(SessionError::Transport)?;
    debug!(%peer, "connected");
    emit(events, Event::Connected { peer }).await?;

    // Encoding happens before anything touches the socket, so a failure
    // here closes the connection without writing.
    let bytes = payload::encode(&payload).map_err(SessionError::from)?;
    drop(payload);
    let sent = bytes.len();

    let (r, w) = stream.split();

    // Closing the sink flushes the payload and then shuts down the write half.
    let mut sink = FramedWrite::new(w, BytesCodec::new());
    sink.send(bytes).await.map_err(SessionError::Transport)?;
    // `BytesCodec` encodes `BytesMut` too, so the sink item is named here.
    SinkExt::<Bytes>::close(&mut sink).await.map_err(SessionError::Transport)?;
    debug!(sent, "payload sent, write half closed");
    emit(events, Event::WriteClosed { sent }).await?;

    // `BytesCodec` yields whatever a single read produced.
    let mut inbound = FramedRead::new(r, BytesCodec::new());
    while let Some(chunk) = inbound.next().await {
        let chunk = chunk.map_err(SessionError::Transport)?;
        debug!(len = chunk.len(), "received chunk");
        emit(events, Event::Data(chunk.freeze())).await?;
    }

    Ok(())
}

async fn emit(events: &mpsc::Sender<Event>, event: Event) -> Result<(), Stop> {
    events.send(event).await.map_err(|_| Stop::Detached)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connected() -> Event {
        Event::Connected {
            peer: "127.0.0.1:3000".parse().unwrap(),
        }
    }

    fn failure() -> Event {
        Event::Error(SessionError::Transport(io::ErrorKind::ConnectionReset.into()))
    }

    #[test]
    fn happy_path_transitions() {
        let state = SessionState::Connecting
            .on(&connected())
            .on(&Event::WriteClosed { sent: 13 });
        assert_eq!(state, SessionState::WriteHalfClosed);

        let state = state.on(&Event::Data(Bytes::from_static(b"AB")));
        assert_eq!(state, SessionState::WriteHalfClosed);

        let state = state.on(&Event::End);
        assert_eq!(state, SessionState::Ended);
        assert!(state.is_terminal());
    }

    #[test]
    fn errors_are_reachable_from_every_live_state() {
        for state in [
            SessionState::Connecting,
            SessionState::Connected,
            SessionState::WriteHalfClosed,
        ] {
            assert_eq!(state.on(&failure()), SessionState::Errored);
        }
    }

    #[test]
    fn terminal_states_absorb_events() {
        assert_eq!(SessionState::Ended.on(&failure()), SessionState::Ended);
        assert_eq!(SessionState::Errored.on(&Event::End), SessionState::Errored);
        assert_eq!(SessionState::Errored.on(&connected()), SessionState::Errored);
    }

    #[test]
    fn out_of_order_events_are_ignored() {
        assert_eq!(
            SessionState::Connecting.on(&Event::End),
            SessionState::Connecting
        );
        assert_eq!(
            SessionState::Connected.on(&Event::Data(Bytes::new())),
            SessionState::Connected
        );
    }

    #[test]
    fn only_end_and_error_are_terminal_events() {
        assert!(Event::End.is_terminal());
        assert!(failure().is_terminal());
        assert!(!connected().is_terminal());
        assert!(!Event::Data(Bytes::new()).is_terminal());
    }
}
