//! Duplex socket connection to the daemon
//!
//! A [`Connection`] owns one WebSocket. Its events are pulled with
//! [`Connection::next_event`]:
//!
//! ```text
//! Opened, FrameReceived*, (ClosedByPeer | ClosedLocally | TransportError)
//! ```
//!
//! after which it only yields `None`.

use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use pt_core::{SessionDescriptor, SessionError};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::ORIGIN;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Handshake options
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// Value for the `Origin` header, if any
    pub origin: Option<String>,
    /// Upper bound for TCP connect plus handshake
    pub timeout: Duration,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            origin: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// Event produced by a [`Connection`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionEvent {
    /// Handshake completed
    Opened,
    /// One text frame
    FrameReceived(String),
    /// Daemon closed the socket
    ClosedByPeer,
    /// Socket finished after a local close
    ClosedLocally,
    /// Socket failed
    TransportError(String),
}

impl ConnectionEvent {
    /// Whether this is the connection's last event
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConnectionEvent::ClosedByPeer
                | ConnectionEvent::ClosedLocally
                | ConnectionEvent::TransportError(_)
        )
    }
}

/// An open console socket
pub struct Connection {
    sink: SplitSink<WsStream, Message>,
    stream: SplitStream<WsStream>,
    opened_reported: bool,
    close_requested: bool,
    close_received: bool,
    finished: bool,
}

impl Connection {
    /// Open a socket to the descriptor's endpoint
    pub async fn open(
        descriptor: &SessionDescriptor,
        options: &ConnectOptions,
    ) -> Result<Self, SessionError> {
        let mut request = descriptor
            .endpoint
            .as_str()
            .into_client_request()
            .map_err(|e| SessionError::Transport(format!("Invalid endpoint: {}", e)))?;

        if let Some(origin) = &options.origin {
            let value = HeaderValue::from_str(origin)
                .map_err(|e| SessionError::Transport(format!("Invalid origin: {}", e)))?;
            request.headers_mut().insert(ORIGIN, value);
        }

        tracing::debug!("Connecting to {}", descriptor.endpoint);

        let (socket, response) = tokio::time::timeout(options.timeout, connect_async(request))
            .await
            .map_err(|_| {
                SessionError::Transport(format!(
                    "Timed out connecting to {} after {:?}",
                    descriptor.endpoint, options.timeout
                ))
            })?
            .map_err(|e| SessionError::Transport(format!("Handshake failed: {}", e)))?;

        tracing::debug!("Socket open (status {})", response.status());

        let (sink, stream) = socket.split();
        Ok(Self {
            sink,
            stream,
            opened_reported: false,
            close_requested: false,
            close_received: false,
            finished: false,
        })
    }

    /// Whether the connection can still carry outbound frames
    pub fn is_open(&self) -> bool {
        !self.finished && !self.close_requested
    }

    /// Pull the next event. Cancel-safe.
    pub async fn next_event(&mut self) -> Option<ConnectionEvent> {
        if self.finished {
            return None;
        }
        if !self.opened_reported {
            self.opened_reported = true;
            return Some(ConnectionEvent::Opened);
        }
        if self.close_received {
            return Some(self.finish_close().await);
        }

        loop {
            let event = match self.stream.next().await {
                Some(Ok(Message::Text(text))) => ConnectionEvent::FrameReceived(text),
                Some(Ok(Message::Binary(data))) => {
                    ConnectionEvent::FrameReceived(String::from_utf8_lossy(&data).into_owned())
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => continue,
                Some(Ok(Message::Close(frame))) => {
                    tracing::debug!("Received close frame: {:?}", frame);
                    self.close_received = true;
                    return Some(self.finish_close().await);
                }
                None => self.closed_event(),
                Some(Err(e)) if self.close_requested => {
                    tracing::debug!("Socket error after local close: {}", e);
                    ConnectionEvent::ClosedLocally
                }
                Some(Err(e)) => ConnectionEvent::TransportError(e.to_string()),
            };

            if event.is_terminal() {
                self.finished = true;
            }
            return Some(event);
        }
    }

    /// Write out the queued close reply, then report the close
    async fn finish_close(&mut self) -> ConnectionEvent {
        if let Err(e) = self.sink.flush().await {
            tracing::debug!("Failed to flush close reply: {}", e);
        }
        self.finished = true;
        self.closed_event()
    }

    fn closed_event(&self) -> ConnectionEvent {
        if self.close_requested {
            ConnectionEvent::ClosedLocally
        } else {
            ConnectionEvent::ClosedByPeer
        }
    }

    /// Send one text frame
    pub async fn send(&mut self, text: String) -> Result<(), SessionError> {
        if !self.is_open() {
            return Err(SessionError::ConnectionClosed);
        }
        self.sink
            .send(Message::Text(text))
            .await
            .map_err(|e| SessionError::Transport(format!("Send failed: {}", e)))
    }

    /// Start the closing handshake. Repeated calls are no-ops.
    pub async fn close(&mut self) {
        if self.close_requested || self.finished {
            return;
        }
        self.close_requested = true;
        if let Err(e) = self.sink.send(Message::Close(None)).await {
            tracing::debug!("Failed to send close frame: {}", e);
        }
    }
}
