use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Signaling address of one negotiated session: the transport session id when the
/// server assigned one, otherwise the member id.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[serde(transparent)]
pub struct PeerKey(pub String);

impl PeerKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PeerKey {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for PeerKey {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for PeerKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for PeerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
