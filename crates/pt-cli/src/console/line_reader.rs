//! Single-line editor for console commands

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tui_input::{Input, InputRequest};

use super::terminal::PromptView;

/// Result of feeding one key to the [`LineReader`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// The line or cursor changed; redraw the prompt
    Edited,
    /// A trimmed, non-empty command was submitted
    Command(String),
    /// The exit token was submitted
    Exit,
    /// An empty line was submitted
    Empty,
    /// The operator closed input (Ctrl+C, or Ctrl+D on an empty line)
    Closed,
    /// Key has no binding
    Ignored,
}

/// Editable prompt line with per-session history
pub struct LineReader {
    input: Input,
    prompt: String,
    exit_token: String,
    history: Vec<String>,
    history_index: Option<usize>,
    draft: String,
}

impl LineReader {
    /// Create a reader drawing `prompt` and ending the session on `exit_token`
    pub fn new(prompt: impl Into<String>, exit_token: impl Into<String>) -> Self {
        Self {
            input: Input::default(),
            prompt: prompt.into(),
            exit_token: exit_token.into().trim().to_string(),
            history: Vec::new(),
            history_index: None,
            draft: String::new(),
        }
    }

    /// Current prompt, line and cursor
    pub fn view(&self) -> PromptView<'_> {
        PromptView {
            prompt: &self.prompt,
            line: self.input.value(),
            cursor: self.input.cursor(),
        }
    }

    /// Submitted commands, oldest first
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Apply one key press
    pub fn handle_key(&mut self, key: KeyEvent) -> LineEvent {
        if key.kind == KeyEventKind::Release {
            return LineEvent::Ignored;
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let request = match key.code {
            KeyCode::Enter => return self.submit(),
            KeyCode::Char('c') if ctrl => return LineEvent::Closed,
            KeyCode::Char('d') if ctrl => {
                if self.input.value().is_empty() {
                    return LineEvent::Closed;
                }
                InputRequest::DeleteNextChar
            }
            KeyCode::Char('a') if ctrl => InputRequest::GoToStart,
            KeyCode::Char('e') if ctrl => InputRequest::GoToEnd,
            KeyCode::Char('u') if ctrl => InputRequest::DeleteLine,
            KeyCode::Char('k') if ctrl => InputRequest::DeleteTillEnd,
            KeyCode::Char('w') if ctrl => InputRequest::DeletePrevWord,
            KeyCode::Char(_) if ctrl => return LineEvent::Ignored,
            KeyCode::Char(c) => InputRequest::InsertChar(c),
            KeyCode::Backspace => InputRequest::DeletePrevChar,
            KeyCode::Delete => InputRequest::DeleteNextChar,
            KeyCode::Left if ctrl => InputRequest::GoToPrevWord,
            KeyCode::Right if ctrl => InputRequest::GoToNextWord,
            KeyCode::Left => InputRequest::GoToPrevChar,
            KeyCode::Right => InputRequest::GoToNextChar,
            KeyCode::Home => InputRequest::GoToStart,
            KeyCode::End => InputRequest::GoToEnd,
            KeyCode::Up => return self.history_prev(),
            KeyCode::Down => return self.history_next(),
            _ => return LineEvent::Ignored,
        };

        self.input.handle(request);
        LineEvent::Edited
    }

    fn submit(&mut self) -> LineEvent {
        let line = self.input.value().trim().to_string();
        self.input.reset();
        self.history_index = None;
        self.draft.clear();

        if line.is_empty() {
            return LineEvent::Empty;
        }
        if line.eq_ignore_ascii_case(&self.exit_token) {
            return LineEvent::Exit;
        }

        if self.history.last() != Some(&line) {
            self.history.push(line.clone());
        }
        LineEvent::Command(line)
    }

    fn history_prev(&mut self) -> LineEvent {
        let index = match self.history_index {
            _ if self.history.is_empty() => return LineEvent::Ignored,
            None => {
                self.draft = self.input.value().to_string();
                self.history.len() - 1
            }
            Some(index) => index.saturating_sub(1),
        };
        self.history_index = Some(index);
        self.input = Input::new(self.history[index].clone());
        LineEvent::Edited
    }

    fn history_next(&mut self) -> LineEvent {
        let Some(index) = self.history_index else {
            return LineEvent::Ignored;
        };
        if index + 1 < self.history.len() {
            self.history_index = Some(index + 1);
            self.input = Input::new(self.history[index + 1].clone());
        } else {
            self.history_index = None;
            self.input = Input::new(std::mem::take(&mut self.draft));
        }
        LineEvent::Edited
    }
}
