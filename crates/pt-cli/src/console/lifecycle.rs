//! Console session lifecycle state machine
//!
//! ```text
//! Connecting -> Authenticating -> Active -> Closing -> Closed
//!      \______________\______________\_________\_____-> Errored
//! ```
//!
//! `Closed` and `Errored` are terminal. Transitions only happen through
//! [`Lifecycle`], which also remembers why the session ended so the
//! controller can report exactly one outcome.

use std::fmt;

use pt_core::SessionError;

/// Connection lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Descriptor requested, socket not yet open
    Connecting,
    /// Socket open, `auth` being sent
    Authenticating,
    /// Commands may be sent
    Active,
    /// Close requested, waiting for the socket to finish
    Closing,
    /// Ended normally
    Closed,
    /// Ended by a failure
    Errored,
}

impl ConnectionState {
    /// Whether no further transitions are possible
    pub fn is_terminal(self) -> bool {
        matches!(self, ConnectionState::Closed | ConnectionState::Errored)
    }

    /// Whether inbound frames should still be processed
    pub fn accepts_frames(self) -> bool {
        !matches!(
            self,
            ConnectionState::Closing | ConnectionState::Closed | ConnectionState::Errored
        )
    }

    /// Whether outbound command frames may be sent
    pub fn can_send_commands(self) -> bool {
        self == ConnectionState::Active
    }

    /// Whether `self -> next` is a legal transition
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;

        match (self, next) {
            (Connecting, Authenticating) => true,
            (Authenticating, Active) => true,
            (Connecting | Authenticating | Active, Closing) => true,
            (Closing, Closed) => true,
            (from, Errored) => !from.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Authenticating => write!(f, "authenticating"),
            ConnectionState::Active => write!(f, "active"),
            ConnectionState::Closing => write!(f, "closing"),
            ConnectionState::Closed => write!(f, "closed"),
            ConnectionState::Errored => write!(f, "errored"),
        }
    }
}

/// Why a session ended normally
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Operator typed the exit token
    ExitRequested,
    /// Input ended (Ctrl+C, Ctrl+D, or the key stream closed)
    InputClosed,
    /// Daemon closed the socket
    ClosedByPeer,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EndReason::ExitRequested => write!(f, "exit requested"),
            EndReason::InputClosed => write!(f, "input closed"),
            EndReason::ClosedByPeer => write!(f, "closed by server"),
        }
    }
}

/// Final result of a console session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Session closed normally
    Ended(EndReason),
    /// Session failed
    Failed(SessionError),
}

impl SessionOutcome {
    /// Whether the session ended in failure
    pub fn is_failure(&self) -> bool {
        matches!(self, SessionOutcome::Failed(_))
    }
}

/// Owner of the session's [`ConnectionState`]
#[derive(Debug)]
pub struct Lifecycle {
    state: ConnectionState,
    end_reason: Option<EndReason>,
    failure: Option<SessionError>,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    /// Start in `Connecting`
    pub fn new() -> Self {
        Self {
            state: ConnectionState::Connecting,
            end_reason: None,
            failure: None,
        }
    }

    /// Current state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    fn transition(&mut self, next: ConnectionState) -> bool {
        if !self.state.can_transition_to(next) {
            tracing::debug!("Ignoring transition {} -> {}", self.state, next);
            return false;
        }
        tracing::debug!("Session state {} -> {}", self.state, next);
        self.state = next;
        true
    }

    /// Socket opened
    pub fn opened(&mut self) -> bool {
        self.transition(ConnectionState::Authenticating)
    }

    /// `auth` frame sent
    pub fn authenticated(&mut self) -> bool {
        self.transition(ConnectionState::Active)
    }

    /// Request a close. Returns `true` only for the request that started
    /// closing; later requests are no-ops.
    pub fn request_close(&mut self, reason: EndReason) -> bool {
        if !self.transition(ConnectionState::Closing) {
            return false;
        }
        self.end_reason = Some(reason);
        true
    }

    /// The connection delivered its terminal close event
    pub fn connection_closed(&mut self) -> bool {
        if self.state.accepts_frames() {
            self.request_close(EndReason::ClosedByPeer);
        }
        self.transition(ConnectionState::Closed)
    }

    /// Record a failure. Only the first failure of a live session is kept.
    pub fn fail(&mut self, error: SessionError) -> bool {
        if !self.transition(ConnectionState::Errored) {
            return false;
        }
        self.failure = Some(error);
        true
    }

    /// Outcome, once the state is terminal
    pub fn outcome(&self) -> Option<SessionOutcome> {
        match self.state {
            ConnectionState::Closed => Some(SessionOutcome::Ended(
                self.end_reason.unwrap_or(EndReason::ClosedByPeer),
            )),
            ConnectionState::Errored => Some(SessionOutcome::Failed(
                self.failure
                    .clone()
                    .unwrap_or_else(|| SessionError::Transport("unknown failure".to_string())),
            )),
            _ => None,
        }
    }
}
