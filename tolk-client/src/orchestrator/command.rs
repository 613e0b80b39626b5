use crate::error::MediaError;
use tolk_core::PeerKey;

#[derive(Debug, Clone, PartialEq)]
pub enum OrchestratorCommand {
    /// Hard reset onto another language: the target for listeners and relays, the
    /// source for speakers.
    SwitchLanguage(String),
    Shutdown,
}

/// Notifications for the embedding application.
#[derive(Debug, Clone, PartialEq)]
pub enum OrchestratorEvent {
    LanguagesChosen {
        src: Option<String>,
        tgt: Option<String>,
    },
    PeerConnected(PeerKey),
    PeerClosed(PeerKey),
    RemoteTrack {
        peer: PeerKey,
        track_id: String,
    },
    /// Local capture failed; only the affected call attempt was abandoned.
    MediaUnavailable(MediaError),
}
