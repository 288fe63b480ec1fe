//! Session token broker trait

use async_trait::async_trait;

use crate::error::ApiError;
use crate::types::{ServerId, SessionDescriptor};

/// Source of one-time console connection descriptors
///
/// Implementations make a single outbound request and keep no state
/// between calls. The console session calls this exactly once, before
/// opening its connection.
#[async_trait]
pub trait DescriptorSource: Send + Sync {
    /// Acquire a fresh descriptor for `server`
    ///
    /// Fails with [`ApiError::UpstreamUnavailable`] when the panel cannot be
    /// reached or does not answer with a usable descriptor.
    async fn acquire_descriptor(&self, server: &ServerId) -> Result<SessionDescriptor, ApiError>;
}
