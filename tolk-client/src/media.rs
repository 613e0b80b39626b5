use crate::error::MediaError;
use async_trait::async_trait;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Opaque handle to a captured local audio track. The session backend downcasts it to
/// its own track type.
#[derive(Clone)]
pub struct LocalTrack {
    id: String,
    handle: Arc<dyn Any + Send + Sync>,
}

impl LocalTrack {
    pub fn new<T: Any + Send + Sync>(id: impl Into<String>, handle: Arc<T>) -> Self {
        Self {
            id: id.into(),
            handle,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.handle.clone().downcast::<T>().ok()
    }
}

impl fmt::Debug for LocalTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTrack").field("id", &self.id).finish()
    }
}

/// Capture device for the local participant's voice.
#[async_trait]
pub trait LocalMedia: Send + Sync {
    async fn acquire(&self) -> Result<LocalTrack, MediaError>;

    /// Stop capturing. Called once per successful `acquire` that was not reused.
    async fn release(&self);
}

/// Lazily acquired local track, shared by every outbound session of one participant.
#[derive(Default)]
pub struct MediaSlot {
    source: Option<Arc<dyn LocalMedia>>,
    track: Option<LocalTrack>,
}

impl MediaSlot {
    pub fn new(source: Option<Arc<dyn LocalMedia>>) -> Self {
        Self {
            source,
            track: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.track.is_some()
    }

    pub async fn ensure(&mut self) -> Result<LocalTrack, MediaError> {
        if let Some(track) = &self.track {
            return Ok(track.clone());
        }
        let Some(source) = &self.source else {
            return Err(MediaError::NoDevice);
        };
        let track = source.acquire().await?;
        info!("Local audio track {} acquired", track.id());
        self.track = Some(track.clone());
        Ok(track)
    }

    pub async fn stop(&mut self) {
        let Some(track) = self.track.take() else {
            return;
        };
        debug!("Releasing local audio track {}", track.id());
        if let Some(source) = &self.source {
            source.release().await;
        }
    }
}
