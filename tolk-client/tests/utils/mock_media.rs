use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tolk_client::{LocalMedia, LocalTrack, MediaError};

/// Capture device that hands out a dummy track, or fails when told to.
#[derive(Clone, Default)]
pub struct MockMedia {
    acquired: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
    deny: Arc<AtomicBool>,
}

impl MockMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn denied() -> Self {
        let media = Self::default();
        media.deny.store(true, Ordering::SeqCst);
        media
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocalMedia for MockMedia {
    async fn acquire(&self) -> Result<LocalTrack, MediaError> {
        if self.deny.load(Ordering::SeqCst) {
            return Err(MediaError::PermissionDenied);
        }
        let n = self.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(LocalTrack::new(format!("mic-{}", n), Arc::new(())))
    }

    async fn release(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}
