//! Frame source double.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use signdrill_core::{Error, FrameSource, Result};

#[derive(Debug)]
struct Inner {
    frame: Mutex<Bytes>,
    failing: AtomicBool,
    acquisitions: AtomicU64,
}

/// A [`FrameSource`] returning a fixed frame, or failing on demand.
#[derive(Debug, Clone)]
pub struct ScriptedFrames {
    inner: Arc<Inner>,
}

impl Default for ScriptedFrames {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedFrames {
    pub fn new() -> Self {
        Self::with_frame(Bytes::from_static(b"\xff\xd8\xff\xe0fake-jpeg"))
    }

    pub fn with_frame(frame: Bytes) -> Self {
        Self {
            inner: Arc::new(Inner {
                frame: Mutex::new(frame),
                failing: AtomicBool::new(false),
                acquisitions: AtomicU64::new(0),
            }),
        }
    }

    pub fn set_frame(&self, frame: Bytes) {
        *self
            .inner
            .frame
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = frame;
    }

    pub fn set_failing(&self, failing: bool) {
        self.inner.failing.store(failing, Ordering::SeqCst);
    }

    pub fn acquisitions(&self) -> u64 {
        self.inner.acquisitions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FrameSource for ScriptedFrames {
    async fn acquire(&self) -> Result<Bytes> {
        self.inner.acquisitions.fetch_add(1, Ordering::SeqCst);
        if self.inner.failing.load(Ordering::SeqCst) {
            return Err(Error::Acquisition {
                message: "camera unavailable".to_string(),
            });
        }
        Ok(self
            .inner
            .frame
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }
}
