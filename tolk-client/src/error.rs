use thiserror::Error;

/// Local media could not be acquired. Recoverable: only the current call attempt is
/// abandoned.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MediaError {
    #[error("microphone permission denied")]
    PermissionDenied,
    #[error("no audio capture device available")]
    NoDevice,
    #[error("media error: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Rtc(#[from] webrtc::Error),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error("local track is not usable by this session backend")]
    IncompatibleTrack,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(String),
    #[error("orchestrator is not running")]
    Stopped,
}
