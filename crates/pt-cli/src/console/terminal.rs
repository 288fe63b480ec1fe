//! Terminal rendering and keyboard input

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::cursor::MoveToColumn;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::style::Print;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, Clear, ClearType};
use crossterm::queue;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Snapshot of the operator's unsubmitted input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptView<'a> {
    /// Prompt text drawn before the line
    pub prompt: &'a str,
    /// Unsubmitted line
    pub line: &'a str,
    /// Cursor position in characters
    pub cursor: usize,
}

/// Render target for the console
pub trait Screen: Send {
    /// Prepare the terminal for interactive use. Called once, when the
    /// session starts taking input.
    fn activate(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Erase the current line and write `text` from column 0
    fn write_output(&mut self, text: &str) -> io::Result<()>;

    /// Erase the current line and draw the prompt with the pending input
    fn redraw_prompt(&mut self, view: &PromptView<'_>) -> io::Result<()>;
}

/// [`Screen`] on the process stdout
///
/// Raw mode is entered on [`Screen::activate`] and restored on drop, so the
/// terminal stays cooked while the session is still connecting.
pub struct CrosstermScreen {
    out: Stdout,
    raw: bool,
}

impl CrosstermScreen {
    /// Create a screen on stdout without touching the terminal mode
    pub fn new() -> Self {
        Self {
            out: io::stdout(),
            raw: false,
        }
    }

    /// Whether raw mode is currently enabled by this screen
    pub fn is_raw(&self) -> bool {
        self.raw
    }
}

impl Default for CrosstermScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CrosstermScreen {
    fn drop(&mut self) {
        if !self.raw {
            return;
        }
        let _ = queue!(self.out, MoveToColumn(0), Clear(ClearType::CurrentLine));
        let _ = self.out.flush();
        let _ = disable_raw_mode();
    }
}

impl Screen for CrosstermScreen {
    fn activate(&mut self) -> io::Result<()> {
        if !self.raw {
            enable_raw_mode()?;
            self.raw = true;
        }
        Ok(())
    }

    fn write_output(&mut self, text: &str) -> io::Result<()> {
        // Raw mode does not translate line feeds
        let text = text.replace("\r\n", "\n").replace('\n', "\r\n");
        queue!(
            self.out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(text)
        )?;
        self.out.flush()
    }

    fn redraw_prompt(&mut self, view: &PromptView<'_>) -> io::Result<()> {
        let column = view.prompt.chars().count() + view.cursor;
        queue!(
            self.out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(view.prompt),
            Print(view.line),
            MoveToColumn(u16::try_from(column).unwrap_or(u16::MAX))
        )?;
        self.out.flush()
    }
}

/// Source of key presses for the line reader
///
/// The receiver returned by [`InputSource::start`] closing means the key
/// stream ended.
pub trait InputSource: Send {
    /// Begin reading keys
    fn start(&mut self) -> mpsc::Receiver<KeyEvent>;

    /// Stop reading keys. Safe to call more than once.
    fn stop(&mut self);
}

/// Key presses from the controlling terminal
#[derive(Default)]
pub struct TerminalInput {
    cancel: CancellationToken,
    reader: Option<JoinHandle<()>>,
}

impl TerminalInput {
    /// Create an idle input source
    pub fn new() -> Self {
        Self::default()
    }
}

impl InputSource for TerminalInput {
    fn start(&mut self) -> mpsc::Receiver<KeyEvent> {
        let (tx, rx) = mpsc::channel(64);
        let cancel = self.cancel.clone();

        self.reader = Some(tokio::task::spawn_blocking(move || {
            while !cancel.is_cancelled() {
                match event::poll(Duration::from_millis(10)) {
                    Ok(true) => match event::read() {
                        Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                            if tx.blocking_send(key).is_err() {
                                break;
                            }
                        }
                        Ok(_) => {}
                        Err(e) => {
                            tracing::warn!("Failed to read terminal event: {}", e);
                            break;
                        }
                    },
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!("Failed to poll terminal: {}", e);
                        break;
                    }
                }
            }
            tracing::debug!("Terminal reader stopped");
        }));

        rx
    }

    fn stop(&mut self) {
        self.cancel.cancel();
        // The poll loop notices the token within one poll interval
        self.reader.take();
    }
}

impl Drop for TerminalInput {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Input source fed from a channel, for driving a session without a terminal
pub struct ChannelInput {
    rx: Option<mpsc::Receiver<KeyEvent>>,
    started: bool,
    stopped: bool,
}

impl ChannelInput {
    /// Wrap a receiver of key presses
    pub fn new(rx: mpsc::Receiver<KeyEvent>) -> Self {
        Self {
            rx: Some(rx),
            started: false,
            stopped: false,
        }
    }

    /// Create a source and the sender that feeds it
    pub fn pair() -> (mpsc::Sender<KeyEvent>, Self) {
        let (tx, rx) = mpsc::channel(64);
        (tx, Self::new(rx))
    }

    /// Whether `start` was called
    pub fn started(&self) -> bool {
        self.started
    }

    /// Whether `stop` was called
    pub fn stopped(&self) -> bool {
        self.stopped
    }
}

impl InputSource for ChannelInput {
    fn start(&mut self) -> mpsc::Receiver<KeyEvent> {
        self.started = true;
        match self.rx.take() {
            Some(rx) => rx,
            None => mpsc::channel(1).1,
        }
    }

    fn stop(&mut self) {
        self.stopped = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn test_crossterm_screen_starts_cooked() {
        let screen = CrosstermScreen::new();
        assert!(!screen.is_raw());
        // Dropping an inactive screen leaves the terminal alone
        drop(screen);
    }

    #[tokio::test]
    async fn test_channel_input_forwards_keys() {
        let (tx, mut input) = ChannelInput::pair();
        let mut rx = input.start();
        assert!(input.started());

        tx.send(KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE))
            .await
            .unwrap();
        drop(tx);

        assert_eq!(rx.recv().await.map(|k| k.code), Some(KeyCode::Char('a')));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_channel_input_second_start_is_closed() {
        let (_tx, mut input) = ChannelInput::pair();
        let _first = input.start();
        let mut second = input.start();
        assert_eq!(second.recv().await, None);
        input.stop();
        input.stop();
        assert!(input.stopped());
    }
}
