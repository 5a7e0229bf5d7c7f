//! Frame acquisition boundary.

use async_trait::async_trait;
use bytes::Bytes;

use crate::Result;

/// Supplies encoded image frames on demand.
///
/// An `Err` (conventionally [`crate::Error::Acquisition`]) or an empty frame
/// makes the current sampling tick a no-op.
#[async_trait]
pub trait FrameSource: Send + Sync {
    async fn acquire(&self) -> Result<Bytes>;
}
