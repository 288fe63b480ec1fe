//! Interactive console session
//!
//! [`ConsoleSession`] drives one live console: it fetches a descriptor from
//! a [`pt_core::DescriptorSource`], opens a [`Connection`], and renders
//! daemon output through the [`Coalescer`] while the [`LineReader`] turns
//! key presses into commands.

mod coalescer;
mod connection;
mod controller;
mod lifecycle;
mod line_reader;
mod terminal;

pub use coalescer::Coalescer;
pub use connection::{ConnectOptions, Connection, ConnectionEvent};
pub use controller::{ConsoleSession, NOT_CONNECTED_NOTICE};
pub use lifecycle::{ConnectionState, EndReason, Lifecycle, SessionOutcome};
pub use line_reader::{LineEvent, LineReader};
pub use terminal::{ChannelInput, CrosstermScreen, InputSource, PromptView, Screen, TerminalInput};
