//! Output coalescing with a trailing debounce
//!
//! Console output often arrives as bursts of small frames. Each chunk is
//! buffered and a flush is scheduled `delay` after the most recent chunk, so
//! a burst is drawn with one write and one prompt redraw.

use std::io;
use std::pin::Pin;
use std::time::Duration;

use tokio::time::{sleep, Instant, Sleep};

use super::terminal::{PromptView, Screen};

/// Buffer of pending console output plus its flush timer
pub struct Coalescer {
    buffer: Vec<String>,
    pending: Option<Pin<Box<Sleep>>>,
    delay: Duration,
}

impl Coalescer {
    /// Create an empty coalescer flushing `delay` after the last chunk
    pub fn new(delay: Duration) -> Self {
        Self {
            buffer: Vec::new(),
            pending: None,
            delay,
        }
    }

    /// Buffer a chunk and restart the debounce window
    pub fn append(&mut self, chunk: impl Into<String>) {
        self.buffer.push(chunk.into());
        self.cancel();
        self.pending = Some(Box::pin(sleep(self.delay)));
    }

    /// Drop the pending flush, if any. Buffered text is kept.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    /// Whether a flush is scheduled
    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// When the scheduled flush fires
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|sleep| sleep.deadline())
    }

    /// Number of buffered chunks
    pub fn pending_chunks(&self) -> usize {
        self.buffer.len()
    }

    /// Resolves when the scheduled flush is due; never resolves while
    /// nothing is scheduled. Cancel-safe.
    pub async fn due(&mut self) {
        match self.pending.as_mut() {
            Some(timer) => timer.as_mut().await,
            None => std::future::pending::<()>().await,
        }
    }

    /// Draw buffered output above the prompt, then redraw the prompt
    pub fn flush(&mut self, screen: &mut dyn Screen, prompt: &PromptView<'_>) -> io::Result<()> {
        self.pending = None;

        if !self.buffer.is_empty() {
            let mut text: String = self.buffer.drain(..).collect();
            if !text.ends_with('\n') {
                text.push('\n');
            }
            screen.write_output(&text)?;
        }

        screen.redraw_prompt(prompt)
    }
}
