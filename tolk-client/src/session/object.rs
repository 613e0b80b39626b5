use crate::error::SessionError;
use crate::media::LocalTrack;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tolk_core::{IceCandidate, IceServerConfig, PeerKey, SdpType};

/// Identifies one session object; a peer key reused after teardown gets a new id.
pub type SessionId = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionDescription {
    pub sdp_type: SdpType,
    pub sdp: String,
}

impl SessionDescription {
    pub fn offer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Offer,
            sdp: sdp.into(),
        }
    }

    pub fn answer(sdp: impl Into<String>) -> Self {
        Self {
            sdp_type: SdpType::Answer,
            sdp: sdp.into(),
        }
    }

    pub fn rollback() -> Self {
        Self {
            sdp_type: SdpType::Rollback,
            sdp: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalingState {
    Stable,
    HaveLocalOffer,
    HaveRemoteOffer,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    New,
    Connecting,
    Connected,
    Disconnected,
    Failed,
    Closed,
}

impl ConnectionState {
    /// States after which the session object is unusable and must be torn down.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ConnectionState::Disconnected | ConnectionState::Failed | ConnectionState::Closed
        )
    }
}

/// Media direction of a session from the local participant's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lane {
    /// We receive audio (listener from relay/speaker, relay from speaker).
    Upstream,
    /// We send the local track.
    Downstream,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEventKind {
    CandidateGenerated(IceCandidate),
    TrackArrived { track_id: String },
    StateChanged(ConnectionState),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionEvent {
    pub peer: PeerKey,
    pub session_id: SessionId,
    pub kind: SessionEventKind,
}

/// Handed to a session backend so it can report callbacks as queued events.
#[derive(Clone)]
pub struct SessionEventSender {
    peer: PeerKey,
    session_id: SessionId,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionEventSender {
    pub fn new(peer: PeerKey, session_id: SessionId, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self {
            peer,
            session_id,
            tx,
        }
    }

    pub fn peer(&self) -> &PeerKey {
        &self.peer
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn emit(&self, kind: SessionEventKind) {
        let _ = self.tx.send(SessionEvent {
            peer: self.peer.clone(),
            session_id: self.session_id,
            kind,
        });
    }

    pub fn candidate(&self, candidate: IceCandidate) {
        self.emit(SessionEventKind::CandidateGenerated(candidate));
    }

    pub fn track(&self, track_id: impl Into<String>) {
        self.emit(SessionEventKind::TrackArrived {
            track_id: track_id.into(),
        });
    }

    pub fn state(&self, state: ConnectionState) {
        self.emit(SessionEventKind::StateChanged(state));
    }
}

/// The media transport's peer session, driven by the negotiation state machine.
#[async_trait]
pub trait SessionObject: Send + Sync {
    /// Attach the local track, replacing the one already sent if any.
    async fn set_local_track(&self, track: &LocalTrack) -> Result<(), SessionError>;

    async fn create_offer(&self) -> Result<SessionDescription, SessionError>;

    async fn create_answer(&self) -> Result<SessionDescription, SessionError>;

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), SessionError>;

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), SessionError>;

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), SessionError>;

    fn signaling_state(&self) -> SignalingState;

    async fn close(&self) -> Result<(), SessionError>;
}

#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn create(
        &self,
        peer: &PeerKey,
        lane: Lane,
        events: SessionEventSender,
    ) -> Result<Box<dyn SessionObject>, SessionError>;

    /// ICE servers pushed by the signaling server; applies to sessions created later.
    fn update_ice_servers(&self, _servers: Vec<IceServerConfig>) {}
}
