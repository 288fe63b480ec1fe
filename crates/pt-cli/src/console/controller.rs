//! Console session controller
//!
//! Runs one console session on the current task: fetch a descriptor, open
//! the socket, authenticate, then multiplex socket frames, key presses and
//! the output flush timer in a single `select!` loop until the session
//! reaches a terminal state.

use std::pin::Pin;
use std::time::Duration;

use crossterm::event::KeyEvent;
use pt_core::config::ConsoleConfig;
use pt_core::{DescriptorSource, ServerId, SessionError};
use pt_protocol::{InboundMessage, OutboundMessage};
use tokio::sync::mpsc;
use tokio::time::{sleep, Sleep};

use super::coalescer::Coalescer;
use super::connection::{ConnectOptions, Connection, ConnectionEvent};
use super::lifecycle::{EndReason, Lifecycle, SessionOutcome};
use super::line_reader::{LineEvent, LineReader};
use super::terminal::{InputSource, Screen};

/// Notice shown when a command is typed while the socket is not ready
pub const NOT_CONNECTED_NOTICE: &str = "not connected; command not sent\n";

/// One interactive console session
pub struct ConsoleSession {
    connect: ConnectOptions,
    close_grace: Duration,
    lifecycle: Lifecycle,
    connection: Option<Connection>,
    coalescer: Coalescer,
    reader: LineReader,
    input: Box<dyn InputSource>,
    keys: Option<mpsc::Receiver<KeyEvent>>,
    screen: Box<dyn Screen>,
    close_deadline: Option<Pin<Box<Sleep>>>,
}

impl ConsoleSession {
    /// Create a session. `origin` is sent as the socket `Origin` header when
    /// the config allows it.
    pub fn new(
        config: &ConsoleConfig,
        origin: Option<String>,
        input: Box<dyn InputSource>,
        screen: Box<dyn Screen>,
    ) -> Self {
        Self {
            connect: ConnectOptions {
                origin: origin.filter(|_| config.send_origin),
                timeout: config.connect_timeout,
            },
            close_grace: config.close_grace,
            lifecycle: Lifecycle::new(),
            connection: None,
            coalescer: Coalescer::new(config.debounce),
            reader: LineReader::new(config.prompt.clone(), config.exit_token.clone()),
            input,
            keys: None,
            screen,
            close_deadline: None,
        }
    }

    /// Run the session to completion
    pub async fn run(mut self, broker: &dyn DescriptorSource, server: &ServerId) -> SessionOutcome {
        let descriptor = match broker.acquire_descriptor(server).await {
            Ok(descriptor) => descriptor,
            Err(e) => {
                tracing::debug!("Failed to acquire console descriptor for {}: {}", server, e);
                self.lifecycle
                    .fail(SessionError::UpstreamUnavailable(e.to_string()));
                return self.teardown().await;
            }
        };

        match Connection::open(&descriptor, &self.connect).await {
            Ok(connection) => self.connection = Some(connection),
            Err(e) => {
                tracing::debug!("Failed to open console socket: {}", e);
                self.lifecycle.fail(e);
                return self.teardown().await;
            }
        }
        let token = descriptor.token;

        while !self.lifecycle.state().is_terminal() {
            tokio::select! {
                biased;

                _ = self.coalescer.due() => self.flush(),

                event = next_connection_event(&mut self.connection) => {
                    self.on_connection_event(event, &token).await;
                }

                key = next_key(&mut self.keys) => self.on_key(key).await,

                _ = grace_elapsed(&mut self.close_deadline) => {
                    tracing::debug!("Close not acknowledged within {:?}", self.close_grace);
                    self.close_deadline = None;
                    self.lifecycle.connection_closed();
                }
            }
        }

        self.teardown().await
    }

    async fn on_connection_event(&mut self, event: ConnectionEvent, token: &str) {
        match event {
            ConnectionEvent::Opened => {
                self.lifecycle.opened();
                let auth = OutboundMessage::Authenticate {
                    token: token.to_string(),
                };
                if let Err(e) = self.send(auth).await {
                    self.lifecycle.fail(e);
                    return;
                }
                self.lifecycle.authenticated();
                if let Err(e) = self.screen.activate() {
                    self.lifecycle.fail(SessionError::Terminal(e.to_string()));
                    return;
                }
                self.keys = Some(self.input.start());
                self.redraw_prompt();
            }
            ConnectionEvent::FrameReceived(text) => {
                if !self.lifecycle.state().accepts_frames() {
                    tracing::trace!("Dropping frame in state {}", self.lifecycle.state());
                    return;
                }
                match InboundMessage::classify(&text) {
                    InboundMessage::Status => {}
                    InboundMessage::Other { event } => {
                        tracing::debug!("Discarding '{}' frame", event);
                    }
                    InboundMessage::ConsoleOutput(text) | InboundMessage::Raw(text) => {
                        self.coalescer.append(text);
                    }
                }
            }
            ConnectionEvent::ClosedByPeer | ConnectionEvent::ClosedLocally => {
                tracing::debug!("Console socket closed ({:?})", event);
                self.lifecycle.connection_closed();
            }
            ConnectionEvent::TransportError(detail) => {
                tracing::debug!("Console socket failed: {}", detail);
                self.lifecycle.fail(SessionError::Transport(detail));
            }
        }
    }

    async fn on_key(&mut self, key: Option<KeyEvent>) {
        let Some(key) = key else {
            tracing::debug!("Key stream ended");
            self.keys = None;
            self.begin_close(EndReason::InputClosed).await;
            return;
        };

        match self.reader.handle_key(key) {
            LineEvent::Edited | LineEvent::Empty => self.redraw_prompt(),
            LineEvent::Command(text) => {
                if self.lifecycle.state().can_send_commands() {
                    if let Err(e) = self.send(OutboundMessage::SubmitCommand { text }).await {
                        self.lifecycle.fail(e);
                        return;
                    }
                } else {
                    tracing::debug!("Dropping command in state {}", self.lifecycle.state());
                    self.coalescer.append(NOT_CONNECTED_NOTICE);
                }
                self.redraw_prompt();
            }
            LineEvent::Exit => self.begin_close(EndReason::ExitRequested).await,
            LineEvent::Closed => self.begin_close(EndReason::InputClosed).await,
            LineEvent::Ignored => {}
        }
    }

    async fn send(&mut self, message: OutboundMessage) -> Result<(), SessionError> {
        match self.connection.as_mut() {
            Some(connection) => connection.send(message.encode()).await,
            None => Err(SessionError::ConnectionClosed),
        }
    }

    async fn begin_close(&mut self, reason: EndReason) {
        if !self.lifecycle.request_close(reason) {
            return;
        }
        tracing::debug!("Closing console session: {}", reason);

        self.input.stop();
        self.keys = None;
        if let Some(connection) = self.connection.as_mut() {
            connection.close().await;
        }
        self.close_deadline = Some(Box::pin(sleep(self.close_grace)));
    }

    fn flush(&mut self) {
        if let Err(e) = self.coalescer.flush(self.screen.as_mut(), &self.reader.view()) {
            tracing::warn!("Failed to draw console output: {}", e);
        }
    }

    fn redraw_prompt(&mut self) {
        if let Err(e) = self.screen.redraw_prompt(&self.reader.view()) {
            tracing::warn!("Failed to draw prompt: {}", e);
        }
    }

    async fn teardown(mut self) -> SessionOutcome {
        // Timer first, so nothing fires against a released socket
        self.coalescer.cancel();
        if self.coalescer.pending_chunks() > 0 {
            self.flush();
        }

        self.input.stop();
        self.keys = None;
        self.close_deadline = None;
        if let Some(mut connection) = self.connection.take() {
            connection.close().await;
        }

        let outcome = self.lifecycle.outcome().unwrap_or_else(|| {
            SessionOutcome::Failed(SessionError::Transport("session ended early".to_string()))
        });
        tracing::info!("Console session ended: {:?}", outcome);
        outcome
    }
}

async fn next_connection_event(connection: &mut Option<Connection>) -> ConnectionEvent {
    if let Some(connection) = connection.as_mut() {
        if let Some(event) = connection.next_event().await {
            return event;
        }
    }
    std::future::pending().await
}

async fn next_key(keys: &mut Option<mpsc::Receiver<KeyEvent>>) -> Option<KeyEvent> {
    match keys.as_mut() {
        Some(keys) => keys.recv().await,
        None => std::future::pending().await,
    }
}

async fn grace_elapsed(deadline: &mut Option<Pin<Box<Sleep>>>) {
    match deadline.as_mut() {
        Some(deadline) => deadline.as_mut().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::coalescer::tests::RecordingScreen;
    use crate::console::terminal::ChannelInput;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn session() -> ConsoleSession {
        let (_tx, input) = ChannelInput::pair();
        ConsoleSession::new(
            &ConsoleConfig::default(),
            None,
            Box::new(input),
            Box::new(RecordingScreen::default()),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_command_before_active_shows_notice() {
        let mut session = session();
        for c in "list".chars() {
            session
                .on_key(Some(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)))
                .await;
        }
        session
            .on_key(Some(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)))
            .await;

        assert!(session.lifecycle.outcome().is_none());
        assert_eq!(session.coalescer.pending_chunks(), 1);

        let mut screen = RecordingScreen::default();
        session
            .coalescer
            .flush(&mut screen, &session.reader.view())
            .unwrap();
        assert_eq!(screen.writes, vec![NOT_CONNECTED_NOTICE.to_string()]);
    }
}
