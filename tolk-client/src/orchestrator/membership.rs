use std::collections::HashMap;
use tolk_core::{Member, RoomName};

/// Rooms this participant has sent `join` for, in join order. Guards against emitting a
/// second `join` for a room that was never left.
#[derive(Debug, Default)]
pub struct JoinedRooms {
    rooms: Vec<RoomName>,
}

impl JoinedRooms {
    /// Returns `false` if the room is already joined.
    pub fn insert(&mut self, room: RoomName) -> bool {
        if self.rooms.contains(&room) {
            return false;
        }
        self.rooms.push(room);
        true
    }

    pub fn contains(&self, room: &RoomName) -> bool {
        self.rooms.contains(room)
    }

    pub fn remove(&mut self, room: &RoomName) -> bool {
        let before = self.rooms.len();
        self.rooms.retain(|r| r != room);
        self.rooms.len() != before
    }

    /// Forgets every room not in `keep` and returns them.
    pub fn retain_only(&mut self, keep: &[RoomName]) -> Vec<RoomName> {
        let (kept, dropped): (Vec<_>, Vec<_>) = self.rooms.drain(..).partition(|r| keep.contains(r));
        self.rooms = kept;
        dropped
    }

    pub fn drain(&mut self) -> Vec<RoomName> {
        std::mem::take(&mut self.rooms)
    }

    pub fn clear(&mut self) {
        self.rooms.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &RoomName> {
        self.rooms.iter()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

/// Last `room-info` snapshot per room.
#[derive(Debug, Default)]
pub struct RoomMembers {
    rooms: HashMap<RoomName, Vec<Member>>,
}

impl RoomMembers {
    pub fn replace(&mut self, room: RoomName, members: Vec<Member>) {
        self.rooms.insert(room, members);
    }

    pub fn get(&self, room: &RoomName) -> &[Member] {
        self.rooms.get(room).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn remove(&mut self, room: &RoomName) {
        self.rooms.remove(room);
    }

    pub fn clear(&mut self) {
        self.rooms.clear();
    }
}
