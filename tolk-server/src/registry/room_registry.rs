use super::peer_meta::PeerMeta;
use dashmap::DashMap;
use tolk_core::{JoinRequest, Member, MetaUpdate, PeerKey, RoomName};

#[derive(Debug, Default)]
struct PeerEntry {
    meta: PeerMeta,
    rooms: Vec<RoomName>,
}

/// Room membership of every live connection.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    peers: DashMap<PeerKey, PeerEntry>,
    rooms: DashMap<RoomName, Vec<PeerKey>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, key: PeerKey) {
        self.peers.insert(key, PeerEntry::default());
    }

    /// Removes the connection from every room. Returns its last public view and the
    /// rooms it was in.
    pub fn unregister(&self, key: &PeerKey) -> Option<(Member, Vec<RoomName>)> {
        let (_, entry) = self.peers.remove(key)?;
        for room in &entry.rooms {
            self.remove_from_room(room, key);
        }
        Some((entry.meta.member(key), entry.rooms))
    }

    /// Records the join and the metadata it carries. Returns `false` if the connection
    /// was already in the room.
    pub fn join(&self, key: &PeerKey, req: &JoinRequest) -> bool {
        let Some(mut entry) = self.peers.get_mut(key) else {
            return false;
        };
        entry.meta.apply_join(req);
        if entry.rooms.contains(&req.room) {
            return false;
        }
        entry.rooms.push(req.room.clone());
        drop(entry);

        self.rooms
            .entry(req.room.clone())
            .or_default()
            .push(key.clone());
        true
    }

    pub fn leave(&self, key: &PeerKey, room: &RoomName) -> bool {
        let Some(mut entry) = self.peers.get_mut(key) else {
            return false;
        };
        let before = entry.rooms.len();
        entry.rooms.retain(|r| r != room);
        let was_in = entry.rooms.len() != before;
        drop(entry);

        if was_in {
            self.remove_from_room(room, key);
        }
        was_in
    }

    /// Applies a metadata update and returns the rooms that must see it.
    pub fn update_meta(&self, key: &PeerKey, update: &MetaUpdate) -> Vec<RoomName> {
        let Some(mut entry) = self.peers.get_mut(key) else {
            return Vec::new();
        };
        entry.meta.apply_update(update);
        entry.rooms.clone()
    }

    pub fn contains(&self, room: &RoomName, key: &PeerKey) -> bool {
        self.rooms
            .get(room)
            .is_some_and(|peers| peers.contains(key))
    }

    pub fn room_peers(&self, room: &RoomName) -> Vec<PeerKey> {
        self.rooms
            .get(room)
            .map(|peers| peers.clone())
            .unwrap_or_default()
    }

    pub fn members(&self, room: &RoomName) -> Vec<Member> {
        self.room_peers(room)
            .iter()
            .filter_map(|key| self.member(key))
            .collect()
    }

    pub fn member(&self, key: &PeerKey) -> Option<Member> {
        self.peers.get(key).map(|entry| entry.meta.member(key))
    }

    pub fn meta(&self, key: &PeerKey) -> Option<PeerMeta> {
        self.peers.get(key).map(|entry| entry.meta.clone())
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn remove_from_room(&self, room: &RoomName, key: &PeerKey) {
        let now_empty = match self.rooms.get_mut(room) {
            Some(mut peers) => {
                peers.retain(|k| k != key);
                peers.is_empty()
            }
            None => false,
        };
        if now_empty {
            self.rooms.remove_if(room, |_, peers| peers.is_empty());
        }
    }
}
