//! pt-core: Core abstractions and configuration for paneltty
//!
//! This crate provides the shared types, error taxonomy, configuration
//! structures and the panel HTTP client used by the CLI and the console
//! session.

pub mod api;
pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use api::PanelClient;
pub use error::{ApiError, PtError, SessionError};
pub use traits::DescriptorSource;
pub use types::{PowerSignal, ServerId, SessionDescriptor};
