use crate::orchestrator::{JoinedRooms, RoomMembers};
use crate::roles::RolePolicy;
use crate::session::{Lane, SessionManager};
use std::collections::HashSet;
use std::future;
use std::time::Duration;
use tokio::time::{self, Instant};
use tolk_core::{PeerKey, RoomName};

/// A member that should be called, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialTarget {
    pub peer: PeerKey,
    /// Room the member was seen in; the offer is addressed there.
    pub room: RoomName,
    pub lane: Lane,
}

/// Members of the joined rooms that the local role must call and has no session with.
/// Rooms are visited in join order and each peer is returned once.
pub fn dial_targets(
    policy: &dyn RolePolicy,
    me: &PeerKey,
    joined: &JoinedRooms,
    members: &RoomMembers,
    sessions: &SessionManager,
) -> Vec<DialTarget> {
    if !policy.may_dial(sessions) {
        return Vec::new();
    }

    let mut seen = HashSet::new();
    let mut targets = Vec::new();
    for room in joined.iter() {
        for member in members.get(room) {
            let peer = member.peer_key();
            if peer.as_str().is_empty() || &peer == me || sessions.contains(&peer) {
                continue;
            }
            let Some(lane) = policy.dial_lane(me, member) else {
                continue;
            };
            if seen.insert(peer.clone()) {
                targets.push(DialTarget {
                    peer,
                    room: room.clone(),
                    lane,
                });
            }
        }
    }
    targets
}

/// Retry timer for the dial pass: fires once after the initial delay, then at a fixed
/// interval until disarmed.
#[derive(Debug)]
pub struct DialTimer {
    initial_delay: Duration,
    interval: Duration,
    next: Option<Instant>,
}

impl DialTimer {
    pub fn new(initial_delay: Duration, interval: Duration) -> Self {
        Self {
            initial_delay,
            interval,
            next: None,
        }
    }

    pub fn arm(&mut self) {
        self.next = Some(Instant::now() + self.initial_delay);
    }

    pub fn disarm(&mut self) {
        self.next = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next.is_some()
    }

    /// Resolves at the next deadline. Never resolves while disarmed. Cancel-safe: the
    /// deadline only moves once a tick has been delivered.
    pub async fn tick(&mut self) {
        let Some(at) = self.next else {
            return future::pending().await;
        };
        time::sleep_until(at).await;
        self.next = Some(Instant::now() + self.interval);
    }
}
