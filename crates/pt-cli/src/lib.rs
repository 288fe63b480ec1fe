//! paneltty: Terminal client for game server panels
//!
//! Provides the `paneltty` CLI: a live server console over the daemon's
//! WebSocket, plus power control and file management through the panel's
//! client API.

pub mod commands;
pub mod console;
pub mod output;
