use crate::registry::{PeerMeta, RoomRegistry};
use axum::extract::ws::Message;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tolk_core::{IceServerConfig, OfferMeta, PeerKey, RoomName, SignalMessage};
use tracing::{debug, error, info, warn};

struct SignalingInner {
    peers: DashMap<PeerKey, mpsc::UnboundedSender<Message>>,
    registry: RoomRegistry,
    ice_servers: Vec<IceServerConfig>,
}

/// Shared state behind every `/signal` socket: outbound queues, room membership and
/// the routing rules between them.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
                registry: RoomRegistry::new(),
                ice_servers,
            }),
        }
    }

    pub fn ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.inner.registry
    }

    pub fn peer_count(&self) -> usize {
        self.inner.peers.len()
    }

    /// Registers a new connection and returns the key it is addressed by.
    pub fn add_peer(&self, tx: mpsc::UnboundedSender<Message>) -> PeerKey {
        let key = PeerKey::new();
        self.inner.registry.register(key.clone());
        self.inner.peers.insert(key.clone(), tx);
        key
    }

    /// Drops the connection and tells every room it was in.
    pub fn remove_peer(&self, key: &PeerKey) {
        self.inner.peers.remove(key);
        let Some((member, rooms)) = self.inner.registry.unregister(key) else {
            return;
        };
        for room in &rooms {
            self.broadcast(
                room,
                &SignalMessage::PeerLeft {
                    member: member.clone(),
                },
                None,
            );
            self.broadcast(room, &self.room_info(room), None);
        }
        info!("Peer {} disconnected, left {} room(s)", key, rooms.len());
    }

    pub fn handle_message(&self, from: &PeerKey, msg: SignalMessage) {
        match msg {
            SignalMessage::Join(req) => {
                let room = req.room.clone();
                let added = self.inner.registry.join(from, &req);
                let size = self.inner.registry.room_peers(&room).len();
                info!(
                    "Peer {} joined '{}' as {} (room size {})",
                    from, room, req.role, size
                );

                self.send_signal(from, self.room_info(&room));
                if added && let Some(member) = self.inner.registry.member(from) {
                    self.broadcast(&room, &SignalMessage::PeerJoined { member }, Some(from));
                }
                self.broadcast(&room, &self.room_info(&room), Some(from));
            }
            SignalMessage::Leave { room } => {
                let member = self.inner.registry.member(from);
                if !self.inner.registry.leave(from, &room) {
                    debug!("Peer {} left '{}' without being in it", from, room);
                    return;
                }
                info!("Peer {} left '{}'", from, room);
                if let Some(member) = member {
                    self.broadcast(&room, &SignalMessage::PeerLeft { member }, None);
                }
                self.broadcast(&room, &self.room_info(&room), None);
            }
            SignalMessage::UpdateMeta(update) => {
                let rooms = self.inner.registry.update_meta(from, &update);
                debug!("Peer {} updated meta: {:?}", from, update);
                for room in &rooms {
                    self.broadcast(room, &self.room_info(room), None);
                }
            }
            SignalMessage::ListMembers { room } => {
                self.send_signal(from, self.room_info(&room));
            }
            SignalMessage::Offer(mut desc) => {
                desc.from = Some(from.clone());
                self.augment(from, &mut desc.meta);
                let (room, to) = (desc.room.clone(), desc.to.clone());
                self.route(from, &room, to.as_ref(), SignalMessage::Offer(desc));
            }
            SignalMessage::Answer(mut desc) => {
                desc.from = Some(from.clone());
                self.augment(from, &mut desc.meta);
                let (room, to) = (desc.room.clone(), desc.to.clone());
                self.route(from, &room, to.as_ref(), SignalMessage::Answer(desc));
            }
            SignalMessage::IceCandidate(mut cand) => {
                cand.from = Some(from.clone());
                if let Some(meta) = cand.meta.as_mut() {
                    self.augment(from, meta);
                }
                let (room, to) = (cand.room.clone(), cand.to.clone());
                self.route(from, &room, to.as_ref(), SignalMessage::IceCandidate(cand));
            }
            SignalMessage::Bye { room, to, .. } => {
                let msg = SignalMessage::Bye {
                    room: room.clone(),
                    to: to.clone(),
                    from: Some(from.clone()),
                };
                match (room, to) {
                    (Some(room), to) => self.route(from, &room, to.as_ref(), msg),
                    (None, Some(to)) => {
                        self.send_signal(&to, msg);
                    }
                    (None, None) => debug!("Dropping bye from {} with no address", from),
                }
            }
            other => debug!("Ignoring server-only op '{}' from {}", other.op(), from),
        }
    }

    /// Serializes and queues one message. Returns `false` if the peer is gone.
    pub fn send_signal(&self, key: &PeerKey, msg: SignalMessage) -> bool {
        let Some(peer) = self.inner.peers.get(key) else {
            warn!("Attempted to send '{}' to disconnected peer {}", msg.op(), key);
            return false;
        };
        match serde_json::to_string(&msg) {
            Ok(json) => {
                if let Err(e) = peer.send(Message::Text(json.into())) {
                    error!("Failed to send WS message to {}: {:?}", key, e);
                    return false;
                }
                true
            }
            Err(e) => {
                error!("Failed to serialize signal message: {}", e);
                false
            }
        }
    }

    pub fn broadcast(&self, room: &RoomName, msg: &SignalMessage, except: Option<&PeerKey>) {
        for key in self.inner.registry.room_peers(room) {
            if Some(&key) != except {
                self.send_signal(&key, msg.clone());
            }
        }
    }

    pub fn room_info(&self, room: &RoomName) -> SignalMessage {
        let members = self.inner.registry.members(room);
        SignalMessage::RoomInfo {
            room: room.clone(),
            room_size: members.len(),
            members,
        }
    }

    fn route(&self, from: &PeerKey, room: &RoomName, to: Option<&PeerKey>, msg: SignalMessage) {
        match to {
            Some(to) if self.inner.registry.contains(room, to) => {
                debug!("Routing '{}' {} -> {} in '{}'", msg.op(), from, to, room);
                self.send_signal(to, msg);
            }
            Some(to) => {
                warn!(
                    "Dropping '{}' from {}: target {} is not in '{}'",
                    msg.op(),
                    from,
                    to,
                    room
                );
            }
            None => {
                debug!("Broadcasting '{}' from {} to '{}'", msg.op(), from, room);
                self.broadcast(room, &msg, Some(from));
            }
        }
    }

    /// Fills the sender's announced role and languages into fields it left empty.
    fn augment(&self, from: &PeerKey, meta: &mut OfferMeta) {
        let Some(PeerMeta { role, src, tgt, .. }) = self.inner.registry.meta(from) else {
            return;
        };
        if meta.from_role.is_none() {
            meta.from_role = Some(role);
        }
        if meta.src.is_none() {
            meta.src = src;
        }
        if meta.tgt.is_none() {
            meta.tgt = tgt;
        }
    }
}
