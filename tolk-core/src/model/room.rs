use crate::utils::SUB_ROOM_SEPARATOR;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical signaling room: a base room code, optionally followed by `::lang`.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct RoomName(pub String);

impl RoomName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Room code without the language suffix.
    pub fn base(&self) -> &str {
        match self.0.split_once(SUB_ROOM_SEPARATOR) {
            Some((base, _)) => base,
            None => &self.0,
        }
    }

    /// Language suffix, `None` for a base room.
    pub fn language(&self) -> Option<&str> {
        self.0
            .split_once(SUB_ROOM_SEPARATOR)
            .map(|(_, lang)| lang)
            .filter(|lang| !lang.is_empty())
    }

    pub fn is_sub_room(&self) -> bool {
        self.language().is_some()
    }
}

impl From<&str> for RoomName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for RoomName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
