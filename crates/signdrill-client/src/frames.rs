//! Frames replayed from a directory of encoded images.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, info};

use signdrill_core::{Error, FrameSource, Result};

const FRAME_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

fn is_frame(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| FRAME_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Cycles through the image files of a directory in name order.
#[derive(Debug)]
pub struct DirectoryFrameSource {
    frames: Vec<PathBuf>,
    next: AtomicUsize,
}

impl DirectoryFrameSource {
    /// Collect the image files in `dir`. Fails when there are none.
    pub async fn open(dir: &Path) -> Result<Self> {
        let mut entries = tokio::fs::read_dir(dir).await.map_err(|e| Error::Acquisition {
            message: format!("cannot read frame directory {}: {}", dir.display(), e),
        })?;

        let mut frames = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && is_frame(&path) {
                frames.push(path);
            }
        }
        frames.sort();

        if frames.is_empty() {
            return Err(Error::Acquisition {
                message: format!("no JPEG or PNG frames in {}", dir.display()),
            });
        }

        info!(dir = %dir.display(), count = frames.len(), "Loaded frame directory");
        Ok(Self {
            frames,
            next: AtomicUsize::new(0),
        })
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[async_trait]
impl FrameSource for DirectoryFrameSource {
    async fn acquire(&self) -> Result<Bytes> {
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.frames.len();
        let path = &self.frames[index];
        let data = tokio::fs::read(path).await.map_err(|e| Error::Acquisition {
            message: format!("failed to read {}: {}", path.display(), e),
        })?;
        debug!(path = %path.display(), len = data.len(), "Frame acquired");
        Ok(Bytes::from(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn cycles_frames_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"second").unwrap();
        std::fs::write(dir.path().join("a.JPG"), b"first").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let source = DirectoryFrameSource::open(dir.path()).await.unwrap();
        assert_eq!(source.len(), 2);
        assert_eq!(source.acquire().await.unwrap().as_ref(), b"first");
        assert_eq!(source.acquire().await.unwrap().as_ref(), b"second");
        assert_eq!(source.acquire().await.unwrap().as_ref(), b"first");
    }

    #[tokio::test]
    async fn empty_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("readme.md"), b"no frames").unwrap();
        let err = DirectoryFrameSource::open(dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::Acquisition { .. }));
    }

    #[tokio::test]
    async fn missing_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(DirectoryFrameSource::open(&missing).await.is_err());
    }

    #[tokio::test]
    async fn deleted_frame_fails_acquisition() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("only.png");
        std::fs::write(&path, b"png").unwrap();
        let source = DirectoryFrameSource::open(dir.path()).await.unwrap();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(
            source.acquire().await,
            Err(Error::Acquisition { .. })
        ));
    }
}
