//! Panel client API
//!
//! Thin typed wrapper over the panel's client HTTP API. Every call is a
//! single request/response with no ordering concerns; failures come back as
//! [`ApiError`](crate::error::ApiError) carrying the panel's error detail.

mod client;
mod files;
mod models;

pub use client::{PanelClient, ACCEPT_HEADER};
