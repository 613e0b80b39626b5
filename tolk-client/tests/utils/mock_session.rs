use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tolk_client::{
    ConnectionState, Lane, LocalTrack, SessionDescription, SessionError, SessionEventSender,
    SessionFactory, SessionObject, SignalingState,
};
use tolk_core::{IceCandidate, PeerKey, SdpType};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCall {
    SetTrack(String),
    CreateOffer,
    CreateAnswer,
    SetLocal(SdpType),
    SetRemote(SdpType),
    AddCandidate(String),
    Close,
}

/// Shared view of one session the factory created.
#[derive(Clone)]
pub struct CreatedSession {
    pub peer: PeerKey,
    pub lane: Lane,
    pub events: SessionEventSender,
    calls: Arc<Mutex<Vec<SessionCall>>>,
}

impl CreatedSession {
    pub fn calls(&self) -> Vec<SessionCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn is_closed(&self) -> bool {
        self.calls().contains(&SessionCall::Close)
    }

    pub fn candidate(&self, candidate: &str) {
        self.events.candidate(IceCandidate::new(candidate));
    }

    pub fn connected(&self) {
        self.events.state(ConnectionState::Connected);
    }

    pub fn failed(&self) {
        self.events.state(ConnectionState::Failed);
    }

    pub fn disconnected(&self) {
        self.events.state(ConnectionState::Disconnected);
    }

    pub fn closed(&self) {
        self.events.state(ConnectionState::Closed);
    }
}

/// Session backend that records every call and follows the offer/answer signaling states.
#[derive(Clone, Default)]
pub struct MockSessionFactory {
    created: Arc<Mutex<Vec<CreatedSession>>>,
}

impl MockSessionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&self) -> Vec<CreatedSession> {
        self.created.lock().unwrap().clone()
    }

    /// Most recent session created for `peer`.
    pub fn session_for(&self, peer: &str) -> Option<CreatedSession> {
        self.created()
            .into_iter()
            .rev()
            .find(|s| s.peer.as_str() == peer)
    }

    pub fn count_for(&self, peer: &str) -> usize {
        self.created()
            .iter()
            .filter(|s| s.peer.as_str() == peer)
            .count()
    }
}

#[async_trait]
impl SessionFactory for MockSessionFactory {
    async fn create(
        &self,
        peer: &PeerKey,
        lane: Lane,
        events: SessionEventSender,
    ) -> Result<Box<dyn SessionObject>, SessionError> {
        let calls = Arc::new(Mutex::new(Vec::new()));
        self.created.lock().unwrap().push(CreatedSession {
            peer: peer.clone(),
            lane,
            events: events.clone(),
            calls: calls.clone(),
        });
        Ok(Box::new(MockSession {
            id: events.session_id(),
            calls,
            state: Mutex::new(SignalingState::Stable),
        }))
    }
}

pub struct MockSession {
    id: u64,
    calls: Arc<Mutex<Vec<SessionCall>>>,
    state: Mutex<SignalingState>,
}

impl MockSession {
    fn record(&self, call: SessionCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn set_state(&self, state: SignalingState) {
        *self.state.lock().unwrap() = state;
    }
}

#[async_trait]
impl SessionObject for MockSession {
    async fn set_local_track(&self, track: &LocalTrack) -> Result<(), SessionError> {
        self.record(SessionCall::SetTrack(track.id().to_owned()));
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription, SessionError> {
        self.record(SessionCall::CreateOffer);
        Ok(SessionDescription::offer(format!("offer-{}", self.id)))
    }

    async fn create_answer(&self) -> Result<SessionDescription, SessionError> {
        self.record(SessionCall::CreateAnswer);
        Ok(SessionDescription::answer(format!("answer-{}", self.id)))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), SessionError> {
        self.record(SessionCall::SetLocal(desc.sdp_type));
        match desc.sdp_type {
            SdpType::Offer => self.set_state(SignalingState::HaveLocalOffer),
            _ => self.set_state(SignalingState::Stable),
        }
        Ok(())
    }

    async fn set_remote_description(&self, desc: SessionDescription) -> Result<(), SessionError> {
        self.record(SessionCall::SetRemote(desc.sdp_type));
        match desc.sdp_type {
            SdpType::Offer => self.set_state(SignalingState::HaveRemoteOffer),
            _ => self.set_state(SignalingState::Stable),
        }
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), SessionError> {
        self.record(SessionCall::AddCandidate(candidate.candidate));
        Ok(())
    }

    fn signaling_state(&self) -> SignalingState {
        *self.state.lock().unwrap()
    }

    async fn close(&self) -> Result<(), SessionError> {
        self.record(SessionCall::Close);
        self.set_state(SignalingState::Closed);
        Ok(())
    }
}
