//! Console session tests against an in-process daemon socket
//!
//! Each test binds a local WebSocket server, points a stub descriptor source
//! at it, and drives the session with scripted key presses.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{accept_async, WebSocketStream};

use paneltty::console::{
    ChannelInput, ConsoleSession, EndReason, PromptView, Screen, SessionOutcome,
};
use pt_core::config::ConsoleConfig;
use pt_core::{ApiError, DescriptorSource, ServerId, SessionDescriptor, SessionError};
use pt_protocol::Frame;

#[derive(Default)]
struct Recorded {
    writes: Vec<String>,
    prompts: Vec<String>,
    activations: usize,
}

#[derive(Clone, Default)]
struct SharedScreen(Arc<Mutex<Recorded>>);

impl SharedScreen {
    fn output(&self) -> String {
        self.0.lock().unwrap().writes.concat()
    }

    fn prompt_count(&self) -> usize {
        self.0.lock().unwrap().prompts.len()
    }

    fn activations(&self) -> usize {
        self.0.lock().unwrap().activations
    }
}

impl Screen for SharedScreen {
    fn activate(&mut self) -> std::io::Result<()> {
        self.0.lock().unwrap().activations += 1;
        Ok(())
    }

    fn write_output(&mut self, text: &str) -> std::io::Result<()> {
        self.0.lock().unwrap().writes.push(text.to_string());
        Ok(())
    }

    fn redraw_prompt(&mut self, view: &PromptView<'_>) -> std::io::Result<()> {
        self.0
            .lock()
            .unwrap()
            .prompts
            .push(format!("{}{}", view.prompt, view.line));
        Ok(())
    }
}

struct StubBroker {
    descriptor: Option<SessionDescriptor>,
    calls: AtomicUsize,
}

impl StubBroker {
    fn serving(descriptor: SessionDescriptor) -> Self {
        Self {
            descriptor: Some(descriptor),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            descriptor: None,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DescriptorSource for StubBroker {
    async fn acquire_descriptor(&self, _server: &ServerId) -> Result<SessionDescriptor, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.descriptor
            .clone()
            .ok_or_else(|| ApiError::UpstreamUnavailable("panel returned 502".to_string()))
    }
}

fn config() -> ConsoleConfig {
    ConsoleConfig {
        debounce: Duration::from_millis(100),
        connect_timeout: Duration::from_secs(2),
        close_grace: Duration::from_millis(500),
        send_origin: false,
        ..ConsoleConfig::default()
    }
}

async fn daemon() -> (TcpListener, SessionDescriptor) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let descriptor = SessionDescriptor {
        endpoint: format!("ws://{}/api/servers/abc/ws", listener.local_addr().unwrap()),
        token: "jwt-token".to_string(),
    };
    (listener, descriptor)
}

async fn accept(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = listener.accept().await.unwrap();
    accept_async(stream).await.unwrap()
}

/// Next text frame, or `None` once the client closes
async fn next_text(ws: &mut WebSocketStream<TcpStream>) -> Option<String> {
    while let Some(Ok(message)) = ws.next().await {
        match message {
            Message::Text(text) => return Some(text),
            Message::Close(_) => return None,
            _ => {}
        }
    }
    None
}

async fn expect_auth(ws: &mut WebSocketStream<TcpStream>) {
    let frame = Frame::parse(&next_text(ws).await.unwrap()).unwrap();
    assert_eq!(frame.event, "auth");
    assert_eq!(frame.text_arg(0), Some("jwt-token"));
}

async fn type_line(tx: &mpsc::Sender<KeyEvent>, line: &str) {
    for c in line.chars() {
        tx.send(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
            .await
            .unwrap();
    }
    tx.send(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE))
        .await
        .unwrap();
}

async fn run_session(
    session: ConsoleSession,
    broker: &StubBroker,
) -> SessionOutcome {
    tokio::time::timeout(
        Duration::from_secs(5),
        session.run(broker, &ServerId::from("abc")),
    )
    .await
    .expect("session did not finish")
}

#[tokio::test]
async fn test_output_coalesced_and_command_sent() {
    let (listener, descriptor) = daemon().await;
    let daemon = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        expect_auth(&mut ws).await;

        ws.feed(Message::Text(r#"{"event":"status","args":["running"]}"#.into()))
            .await
            .unwrap();
        for chunk in ["A", "B\\n", "C"] {
            let frame = format!(r#"{{"event":"console output","args":["{}"]}}"#, chunk);
            ws.feed(Message::Text(frame)).await.unwrap();
        }
        ws.flush().await.unwrap();

        let command = Frame::parse(&next_text(&mut ws).await.unwrap()).unwrap();
        // Let the debounce window pass before hanging up
        tokio::time::sleep(Duration::from_millis(300)).await;
        ws.close(None).await.unwrap();
        while let Some(Ok(_)) = ws.next().await {}
        command
    });

    let screen = SharedScreen::default();
    let (tx, input) = ChannelInput::pair();
    type_line(&tx, "  list ").await;

    let session = ConsoleSession::new(&config(), None, Box::new(input), Box::new(screen.clone()));
    let broker = StubBroker::serving(descriptor);
    let outcome = run_session(session, &broker).await;

    assert_eq!(outcome, SessionOutcome::Ended(EndReason::ClosedByPeer));
    let command = daemon.await.unwrap();
    assert_eq!(command.event, "send command");
    assert_eq!(command.text_arg(0), Some("list"));

    assert_eq!(screen.output(), "AB\nC\n");
    assert_eq!(screen.0.lock().unwrap().writes.len(), 1);
    assert!(!screen.output().contains("running"));
    assert_eq!(broker.calls.load(Ordering::SeqCst), 1);
    assert_eq!(screen.activations(), 1);
    drop(tx);
}

#[tokio::test]
async fn test_exit_token_closes_without_sending() {
    let (listener, descriptor) = daemon().await;
    let daemon = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        expect_auth(&mut ws).await;
        let after_auth = next_text(&mut ws).await;
        while let Some(Ok(_)) = ws.next().await {}
        after_auth
    });

    let (tx, input) = ChannelInput::pair();
    type_line(&tx, " !EXIT ").await;

    let session = ConsoleSession::new(
        &config(),
        None,
        Box::new(input),
        Box::new(SharedScreen::default()),
    );
    let outcome = run_session(session, &StubBroker::serving(descriptor)).await;

    assert_eq!(outcome, SessionOutcome::Ended(EndReason::ExitRequested));
    assert_eq!(daemon.await.unwrap(), None);
    drop(tx);
}

#[tokio::test]
async fn test_key_stream_end_closes_session() {
    let (listener, descriptor) = daemon().await;
    let daemon = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        expect_auth(&mut ws).await;
        while let Some(Ok(_)) = ws.next().await {}
    });

    let (tx, input) = ChannelInput::pair();
    drop(tx);

    let session = ConsoleSession::new(
        &config(),
        None,
        Box::new(input),
        Box::new(SharedScreen::default()),
    );
    let outcome = run_session(session, &StubBroker::serving(descriptor)).await;

    assert_eq!(outcome, SessionOutcome::Ended(EndReason::InputClosed));
    daemon.await.unwrap();
}

#[tokio::test]
async fn test_unacknowledged_close_ends_after_grace() {
    let (listener, descriptor) = daemon().await;
    let daemon = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        expect_auth(&mut ws).await;
        // Stop reading so the close frame is never answered
        tokio::time::sleep(Duration::from_secs(3)).await;
        drop(ws);
    });

    let (tx, input) = ChannelInput::pair();
    type_line(&tx, "!exit").await;

    let session = ConsoleSession::new(
        &config(),
        None,
        Box::new(input),
        Box::new(SharedScreen::default()),
    );
    let started = Instant::now();
    let outcome = run_session(session, &StubBroker::serving(descriptor)).await;

    assert_eq!(outcome, SessionOutcome::Ended(EndReason::ExitRequested));
    assert!(started.elapsed() < Duration::from_secs(2));
    daemon.abort();
    drop(tx);
}

#[tokio::test]
async fn test_unstructured_text_is_displayed_verbatim() {
    let raw = "container@pterodactyl~ Server marked as starting...\r\n";
    let (listener, descriptor) = daemon().await;
    let daemon = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        expect_auth(&mut ws).await;
        ws.feed(Message::Text(raw.to_string())).await.unwrap();
        ws.feed(Message::Text(r#"{"event":"stats","args":["{}"]}"#.into()))
            .await
            .unwrap();
        ws.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;
        ws.close(None).await.unwrap();
        while let Some(Ok(_)) = ws.next().await {}
    });

    let screen = SharedScreen::default();
    let (tx, input) = ChannelInput::pair();
    let session = ConsoleSession::new(&config(), None, Box::new(input), Box::new(screen.clone()));
    let outcome = run_session(session, &StubBroker::serving(descriptor)).await;

    assert_eq!(outcome, SessionOutcome::Ended(EndReason::ClosedByPeer));
    assert_eq!(screen.output(), raw);
    daemon.await.unwrap();
    drop(tx);
}

#[tokio::test]
async fn test_broker_failure_never_connects() {
    let screen = SharedScreen::default();
    let (tx, input) = ChannelInput::pair();
    let session = ConsoleSession::new(&config(), None, Box::new(input), Box::new(screen.clone()));
    let broker = StubBroker::failing();

    let outcome = run_session(session, &broker).await;

    assert!(matches!(
        outcome,
        SessionOutcome::Failed(SessionError::UpstreamUnavailable(_))
    ));
    assert_eq!(broker.calls.load(Ordering::SeqCst), 1);
    // The terminal is untouched until the socket is authenticated
    assert_eq!(screen.activations(), 0);
    assert_eq!(screen.prompt_count(), 0);
    assert!(screen.output().is_empty());
    drop(tx);
}

#[tokio::test]
async fn test_refused_socket_is_transport_failure() {
    let (listener, descriptor) = daemon().await;
    drop(listener);

    let screen = SharedScreen::default();
    let (tx, input) = ChannelInput::pair();
    let session = ConsoleSession::new(&config(), None, Box::new(input), Box::new(screen.clone()));
    let outcome = run_session(session, &StubBroker::serving(descriptor)).await;

    assert!(matches!(
        outcome,
        SessionOutcome::Failed(SessionError::Transport(_))
    ));
    assert_eq!(screen.activations(), 0);
    drop(tx);
}

struct NoTtyScreen;

impl Screen for NoTtyScreen {
    fn activate(&mut self) -> std::io::Result<()> {
        Err(std::io::Error::new(std::io::ErrorKind::Other, "not a terminal"))
    }

    fn write_output(&mut self, _text: &str) -> std::io::Result<()> {
        Ok(())
    }

    fn redraw_prompt(&mut self, _view: &PromptView<'_>) -> std::io::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn test_terminal_setup_failure_ends_session() {
    let (listener, descriptor) = daemon().await;
    let daemon = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        expect_auth(&mut ws).await;
        while let Some(Ok(_)) = ws.next().await {}
    });

    let (tx, input) = ChannelInput::pair();
    let session = ConsoleSession::new(&config(), None, Box::new(input), Box::new(NoTtyScreen));
    let outcome = run_session(session, &StubBroker::serving(descriptor)).await;

    assert!(matches!(
        outcome,
        SessionOutcome::Failed(SessionError::Terminal(_))
    ));
    daemon.await.unwrap();
    drop(tx);
}
