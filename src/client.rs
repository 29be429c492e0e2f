//! Outbound connection to the gesture backend.
//!
//! Length-delimited frames over TCP, one JSON payload per frame. The client
//! is a small state machine (Closed -> Connecting -> Open -> Closed); the
//! reader task owns inbound frames and connection teardown, and reports both
//! through a single-consumer event channel. Backend responses are advisory
//! text only; the core never acts on their content.

use bytes::Bytes;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::codec::{Framed, LengthDelimitedCodec};

pub type MessageStream = Framed<TcpStream, LengthDelimitedCodec>;

/// Create a framed message stream with length-delimited framing.
pub fn message_stream(stream: TcpStream) -> MessageStream {
    let codec = LengthDelimitedCodec::builder()
        .max_frame_length(16 * 1024 * 1024) // 16MB: base64 JPEG fits comfortably
        .new_codec();
    Framed::new(stream, codec)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    Closed = 0,
    Connecting = 1,
    Open = 2,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            2 => Self::Open,
            1 => Self::Connecting,
            _ => Self::Closed,
        }
    }
}

/// Connection-lifecycle notifications, consumed by the hosting binary.
#[derive(Debug)]
pub enum StreamEvent {
    Opened,
    /// Advisory text from the backend.
    Message(String),
    Error(String),
    Closed,
}

/// Result of a send attempt. A send racing a close is a dropped sample,
/// never a crash or a pipeline halt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    Dropped,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

pub struct StreamClient {
    sink: SplitSink<MessageStream, Bytes>,
    state: Arc<AtomicU8>,
    events: mpsc::UnboundedSender<StreamEvent>,
}

impl StreamClient {
    /// Connect to the backend. On success the client is Open and an `Opened`
    /// event has been emitted; on failure no client exists (Closed).
    pub async fn connect(
        addr: &str,
    ) -> Result<(Self, mpsc::UnboundedReceiver<StreamEvent>), ClientError> {
        let state = Arc::new(AtomicU8::new(ConnectionState::Connecting as u8));

        let stream = match TcpStream::connect(addr).await {
            Ok(s) => s,
            Err(source) => {
                state.store(ConnectionState::Closed as u8, Ordering::SeqCst);
                return Err(ClientError::Connect {
                    addr: addr.to_string(),
                    source,
                });
            }
        };

        let (sink, reader) = message_stream(stream).split();
        let (events, rx) = mpsc::unbounded_channel();

        state.store(ConnectionState::Open as u8, Ordering::SeqCst);
        let _ = events.send(StreamEvent::Opened);

        tokio::spawn(read_loop(reader, Arc::clone(&state), events.clone()));

        Ok((
            Self {
                sink,
                state,
                events,
            },
            rx,
        ))
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Send one payload as one discrete frame. Valid only in Open; anything
    /// else drops the sample. A transport error during the send also closes
    /// the connection and drops the sample.
    pub async fn send(&mut self, text: &str) -> SendOutcome {
        if !self.is_open() {
            return SendOutcome::Dropped;
        }
        match self.sink.send(Bytes::from(text.to_owned())).await {
            Ok(()) => SendOutcome::Sent,
            Err(e) => {
                let _ = self.events.send(StreamEvent::Error(e.to_string()));
                emit_closed_once(&self.state, &self.events);
                SendOutcome::Dropped
            }
        }
    }

    /// Graceful shutdown; safe to call in any state, repeatedly.
    pub async fn close(&mut self) {
        let prev = self
            .state
            .swap(ConnectionState::Closed as u8, Ordering::SeqCst);
        if prev != ConnectionState::Closed as u8 {
            let _ = self.sink.close().await;
            let _ = self.events.send(StreamEvent::Closed);
        }
    }
}

/// Transition to Closed and emit the event, but only if this caller actually
/// performed the transition. Consumers see exactly one `Closed` regardless of
/// which side (user close, failed send, reader EOF) noticed first.
fn emit_closed_once(state: &AtomicU8, events: &mpsc::UnboundedSender<StreamEvent>) {
    let prev = state.swap(ConnectionState::Closed as u8, Ordering::SeqCst);
    if prev != ConnectionState::Closed as u8 {
        let _ = events.send(StreamEvent::Closed);
    }
}

async fn read_loop(
    mut reader: SplitStream<MessageStream>,
    state: Arc<AtomicU8>,
    events: mpsc::UnboundedSender<StreamEvent>,
) {
    loop {
        match reader.next().await {
            Some(Ok(bytes)) => {
                let text = String::from_utf8_lossy(&bytes).into_owned();
                // Observer may be gone; that does not close the connection.
                let _ = events.send(StreamEvent::Message(text));
            }
            Some(Err(e)) => {
                let _ = events.send(StreamEvent::Error(e.to_string()));
                break;
            }
            None => break,
        }
    }
    emit_closed_once(&state, &events);
}
