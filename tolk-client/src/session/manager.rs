use super::object::{
    ConnectionState, Lane, SessionDescription, SessionEvent, SessionEventKind, SessionEventSender,
    SessionFactory, SessionId, SignalingState,
};
use super::state::{NegotiationPhase, NegotiationSession};
use crate::error::SessionError;
use crate::media::LocalTrack;
use crate::signaling::SignalingOutput;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tolk_core::{
    CandidateMessage, DescriptionMessage, IceCandidate, OfferMeta, PeerKey, RoomName, SdpType,
    SignalMessage,
};
use tracing::{debug, info, warn};

/// Outbound call to one peer.
#[derive(Debug, Clone)]
pub struct DialRequest {
    pub peer: PeerKey,
    pub room: RoomName,
    pub lane: Lane,
    pub meta: OfferMeta,
    pub track: Option<LocalTrack>,
}

/// How an accepted inbound offer is answered.
#[derive(Debug, Clone)]
pub struct AnswerPlan {
    /// Room the answer and our candidates are sent in.
    pub room: RoomName,
    pub lane: Lane,
    pub meta: OfferMeta,
    pub track: Option<LocalTrack>,
    /// A polite side abandons its own pending offer on collision.
    pub polite: bool,
}

/// Session changes the orchestrator reacts to.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    Connected(PeerKey),
    Closed { peer: PeerKey, failed: bool },
    RemoteTrack { peer: PeerKey, track_id: String },
}

/// Owns every negotiation session of one participant, keyed by remote peer.
pub struct SessionManager {
    sessions: HashMap<PeerKey, NegotiationSession>,
    factory: Arc<dyn SessionFactory>,
    signaling: Arc<dyn SignalingOutput>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    next_id: SessionId,
}

impl SessionManager {
    pub fn new(
        factory: Arc<dyn SessionFactory>,
        signaling: Arc<dyn SignalingOutput>,
        events_tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            sessions: HashMap::new(),
            factory,
            signaling,
            events_tx,
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, peer: &PeerKey) -> bool {
        self.sessions.contains_key(peer)
    }

    pub fn get(&self, peer: &PeerKey) -> Option<&NegotiationSession> {
        self.sessions.get(peer)
    }

    pub fn phase(&self, peer: &PeerKey) -> Option<NegotiationPhase> {
        self.sessions.get(peer).map(NegotiationSession::phase)
    }

    pub fn connected_count(&self) -> usize {
        self.sessions.values().filter(|s| s.is_connected()).count()
    }

    pub fn has_lane(&self, lane: Lane) -> bool {
        self.sessions.values().any(|s| s.lane() == lane)
    }

    pub fn peers(&self) -> Vec<PeerKey> {
        self.sessions.keys().cloned().collect()
    }

    /// Places an offer to `req.peer` unless a session with that peer already exists.
    /// Returns whether an offer went out.
    pub async fn dial(&mut self, req: DialRequest) -> Result<bool, SessionError> {
        if self.sessions.contains_key(&req.peer) {
            debug!("Session with {} already exists, not dialing", req.peer);
            return Ok(false);
        }

        self.open(&req.peer, req.lane, req.room.clone()).await?;
        if let Err(e) = self.send_offer(&req).await {
            self.close_session(&req.peer, NegotiationPhase::Failed).await;
            return Err(e);
        }
        info!("Offer sent to {} in {}", req.peer, req.room);
        Ok(true)
    }

    async fn send_offer(&mut self, req: &DialRequest) -> Result<(), SessionError> {
        let Some(session) = self.sessions.get_mut(&req.peer) else {
            return Ok(());
        };
        if let Some(track) = &req.track {
            session.object().set_local_track(track).await?;
        }
        let offer = session.object().create_offer().await?;
        session
            .object()
            .set_local_description(offer.clone())
            .await?;
        session.set_phase(NegotiationPhase::Offering);

        self.signaling
            .send(SignalMessage::Offer(DescriptionMessage::new(
                req.room.clone(),
                req.peer.clone(),
                offer.sdp,
                SdpType::Offer,
                req.meta.clone(),
            )))
            .await;
        Ok(())
    }

    /// Applies an inbound offer and answers it per `plan`. On a collision with our own
    /// pending offer the impolite side keeps its offer and drops this one.
    pub async fn accept_offer(
        &mut self,
        from: &PeerKey,
        sdp: String,
        plan: AnswerPlan,
    ) -> Result<(), SessionError> {
        match self.sessions.get(from).map(NegotiationSession::phase) {
            Some(NegotiationPhase::Offering) if !plan.polite => {
                info!("Offer collision with {}, keeping our offer", from);
                return Ok(());
            }
            Some(_) => {}
            None => self.open(from, plan.lane, plan.room.clone()).await?,
        }

        if let Err(e) = self.send_answer(from, sdp, &plan).await {
            self.close_session(from, NegotiationPhase::Failed).await;
            return Err(e);
        }
        info!("Answer sent to {} in {}", from, plan.room);
        Ok(())
    }

    async fn send_answer(
        &mut self,
        from: &PeerKey,
        sdp: String,
        plan: &AnswerPlan,
    ) -> Result<(), SessionError> {
        let Some(session) = self.sessions.get_mut(from) else {
            return Ok(());
        };

        if session.object().signaling_state() == SignalingState::HaveLocalOffer {
            info!("Offer collision with {}, rolling back our offer", from);
            session
                .object()
                .set_local_description(SessionDescription::rollback())
                .await?;
        }
        if session.object().signaling_state() != SignalingState::HaveRemoteOffer {
            session
                .object()
                .set_remote_description(SessionDescription::offer(sdp))
                .await?;
        }
        session.set_phase(NegotiationPhase::HaveRemoteOffer);

        if let Some(track) = &plan.track {
            session.object().set_local_track(track).await?;
        }
        let answer = session.object().create_answer().await?;
        session
            .object()
            .set_local_description(answer.clone())
            .await?;
        session.set_room(plan.room.clone());
        session.set_phase(NegotiationPhase::Answering);
        let pending = session.mark_ready();

        self.signaling
            .send(SignalMessage::Answer(DescriptionMessage::new(
                plan.room.clone(),
                from.clone(),
                answer.sdp,
                SdpType::Answer,
                plan.meta.clone(),
            )))
            .await;
        self.send_candidates(from, &plan.room, pending).await;
        Ok(())
    }

    /// Applies an answer to our outstanding offer. Answers in any other phase are
    /// duplicates or stale and are dropped.
    pub async fn accept_answer(&mut self, from: &PeerKey, sdp: String) -> Result<(), SessionError> {
        let Some(session) = self.sessions.get_mut(from) else {
            debug!("Answer from {} without a session, dropping", from);
            return Ok(());
        };
        if session.phase() != NegotiationPhase::Offering {
            debug!(
                "Answer from {} in phase {:?}, dropping",
                from,
                session.phase()
            );
            return Ok(());
        }

        let applied = session
            .object()
            .set_remote_description(SessionDescription::answer(sdp))
            .await;
        if let Err(e) = applied {
            self.close_session(from, NegotiationPhase::Failed).await;
            return Err(e);
        }

        let Some(session) = self.sessions.get_mut(from) else {
            return Ok(());
        };
        session.set_phase(NegotiationPhase::Negotiating);
        let pending = session.mark_ready();
        let room = session.room().clone();
        self.send_candidates(from, &room, pending).await;
        Ok(())
    }

    pub async fn add_remote_candidate(&mut self, from: &PeerKey, candidate: Option<IceCandidate>) {
        let Some(candidate) = candidate.filter(|c| !c.is_empty()) else {
            return;
        };
        let Some(session) = self.sessions.get(from) else {
            debug!("Candidate from {} without a session, dropping", from);
            return;
        };
        let Err(e) = session.object().add_ice_candidate(candidate).await else {
            return;
        };
        warn!("Failed to add ICE candidate for {}: {}", from, e);
    }

    /// Handles a callback from a session object. Events carrying the id of a session
    /// that has since been replaced are ignored.
    pub async fn handle_event(&mut self, event: SessionEvent) -> Option<SessionUpdate> {
        let session = self.sessions.get_mut(&event.peer)?;
        if session.id() != event.session_id {
            debug!(
                "Ignoring event for stale session {} of {}",
                event.session_id, event.peer
            );
            return None;
        }

        match event.kind {
            SessionEventKind::CandidateGenerated(candidate) => {
                let ready = session.route_candidate(candidate)?;
                let room = session.room().clone();
                self.send_candidates(&event.peer, &room, vec![ready]).await;
                None
            }
            SessionEventKind::TrackArrived { track_id } => {
                info!("Remote track {} from {}", track_id, event.peer);
                Some(SessionUpdate::RemoteTrack {
                    peer: event.peer,
                    track_id,
                })
            }
            SessionEventKind::StateChanged(ConnectionState::Connected) => {
                if session.is_connected() {
                    return None;
                }
                session.set_phase(NegotiationPhase::Connected);
                info!("Connected to {}", event.peer);
                Some(SessionUpdate::Connected(event.peer))
            }
            SessionEventKind::StateChanged(state) if state.is_terminal() => {
                let failed = state == ConnectionState::Failed;
                let phase = if failed {
                    NegotiationPhase::Failed
                } else {
                    NegotiationPhase::Closed
                };
                info!("Session with {} ended ({:?})", event.peer, state);
                self.close_session(&event.peer, phase).await;
                Some(SessionUpdate::Closed {
                    peer: event.peer,
                    failed,
                })
            }
            SessionEventKind::StateChanged(_) => None,
        }
    }

    /// Closes and forgets the session with `peer`. Returns whether one existed.
    pub async fn teardown(&mut self, peer: &PeerKey) -> bool {
        self.close_session(peer, NegotiationPhase::Closed).await
    }

    /// Closes every session, telling each peer with a `bye` first when `notify` is set.
    pub async fn close_all(&mut self, notify: bool) -> Vec<PeerKey> {
        let peers = self.peers();
        for peer in &peers {
            if notify && let Some(session) = self.sessions.get(peer) {
                self.signaling
                    .send(SignalMessage::Bye {
                        room: Some(session.room().clone()),
                        to: Some(peer.clone()),
                        from: None,
                    })
                    .await;
            }
            self.close_session(peer, NegotiationPhase::Closed).await;
        }
        peers
    }

    /// Drops offers that have gone unanswered for `timeout` so the dialer can retry.
    pub async fn expire_stalled(&mut self, timeout: Duration) -> Vec<PeerKey> {
        let now = Instant::now();
        let stalled: Vec<PeerKey> = self
            .sessions
            .values()
            .filter(|s| s.is_stalled(timeout, now))
            .map(|s| s.peer().clone())
            .collect();
        for peer in &stalled {
            info!("Offer to {} unanswered after {:?}, giving up", peer, timeout);
            self.close_session(peer, NegotiationPhase::Failed).await;
        }
        stalled
    }

    async fn open(&mut self, peer: &PeerKey, lane: Lane, room: RoomName) -> Result<(), SessionError> {
        let id = self.next_id;
        self.next_id += 1;

        let events = SessionEventSender::new(peer.clone(), id, self.events_tx.clone());
        let object = self.factory.create(peer, lane, events).await?;
        debug!("Session {} opened with {} ({:?})", id, peer, lane);
        self.sessions.insert(
            peer.clone(),
            NegotiationSession::new(peer.clone(), id, lane, room, object),
        );
        Ok(())
    }

    async fn close_session(&mut self, peer: &PeerKey, phase: NegotiationPhase) -> bool {
        let Some(mut session) = self.sessions.remove(peer) else {
            return false;
        };
        session.set_phase(phase);
        debug!("Session {} with {} closed ({:?})", session.id(), peer, phase);
        if let Err(e) = session.object().close().await {
            debug!("Error closing session with {}: {}", peer, e);
        }
        true
    }

    async fn send_candidates(&self, peer: &PeerKey, room: &RoomName, candidates: Vec<IceCandidate>) {
        for candidate in candidates {
            self.signaling
                .send(SignalMessage::IceCandidate(CandidateMessage {
                    room: room.clone(),
                    to: Some(peer.clone()),
                    from: None,
                    candidate: Some(candidate),
                    meta: None,
                }))
                .await;
        }
    }
}
