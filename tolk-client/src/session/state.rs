use super::object::{Lane, SessionId, SessionObject};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tolk_core::{IceCandidate, PeerKey, RoomName};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationPhase {
    Idle,
    /// Local offer sent, waiting for the answer.
    Offering,
    HaveRemoteOffer,
    /// Answer sent, media path not up yet.
    Answering,
    /// Answer applied, media path not up yet.
    Negotiating,
    Connected,
    Closed,
    Failed,
}

impl NegotiationPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, NegotiationPhase::Closed | NegotiationPhase::Failed)
    }
}

/// Per-peer negotiation state wrapped around one session object.
pub struct NegotiationSession {
    peer: PeerKey,
    id: SessionId,
    lane: Lane,
    room: RoomName,
    phase: NegotiationPhase,
    phase_since: Instant,
    object: Box<dyn SessionObject>,
    candidate_queue: VecDeque<IceCandidate>,
    peer_ready: bool,
}

impl NegotiationSession {
    pub fn new(
        peer: PeerKey,
        id: SessionId,
        lane: Lane,
        room: RoomName,
        object: Box<dyn SessionObject>,
    ) -> Self {
        Self {
            peer,
            id,
            lane,
            room,
            phase: NegotiationPhase::Idle,
            phase_since: Instant::now(),
            object,
            candidate_queue: VecDeque::new(),
            peer_ready: false,
        }
    }

    pub fn peer(&self) -> &PeerKey {
        &self.peer
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn lane(&self) -> Lane {
        self.lane
    }

    /// Room that outbound candidates and answers for this peer are addressed in.
    pub fn room(&self) -> &RoomName {
        &self.room
    }

    pub fn set_room(&mut self, room: RoomName) {
        self.room = room;
    }

    pub fn phase(&self) -> NegotiationPhase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: NegotiationPhase) {
        if self.phase != phase {
            self.phase = phase;
            self.phase_since = Instant::now();
        }
    }

    pub fn is_connected(&self) -> bool {
        self.phase == NegotiationPhase::Connected
    }

    pub fn object(&self) -> &dyn SessionObject {
        self.object.as_ref()
    }

    pub fn is_peer_ready(&self) -> bool {
        self.peer_ready
    }

    pub fn queued_candidates(&self) -> usize {
        self.candidate_queue.len()
    }

    /// Returns the candidate back if it may be sent right away, otherwise holds it
    /// until the remote side has our description.
    pub fn route_candidate(&mut self, candidate: IceCandidate) -> Option<IceCandidate> {
        if self.peer_ready {
            Some(candidate)
        } else {
            self.candidate_queue.push_back(candidate);
            None
        }
    }

    /// Flips `peer_ready` and hands back the held candidates in generation order.
    /// Only the first call drains anything.
    pub fn mark_ready(&mut self) -> Vec<IceCandidate> {
        if self.peer_ready {
            return Vec::new();
        }
        self.peer_ready = true;
        self.candidate_queue.drain(..).collect()
    }

    /// An offer that has waited longer than `timeout` for its answer.
    pub fn is_stalled(&self, timeout: Duration, now: Instant) -> bool {
        self.phase == NegotiationPhase::Offering && now.duration_since(self.phase_since) >= timeout
    }
}

impl fmt::Debug for NegotiationSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NegotiationSession")
            .field("peer", &self.peer)
            .field("id", &self.id)
            .field("lane", &self.lane)
            .field("room", &self.room)
            .field("phase", &self.phase)
            .field("peer_ready", &self.peer_ready)
            .field("queued", &self.candidate_queue.len())
            .finish()
    }
}
