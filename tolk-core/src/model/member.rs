use crate::model::details::{EntityId, LanguagePair};
use crate::model::peer::PeerKey;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Speaker,
    Relay,
    Translator,
    /// Audience member. Announced on the wire as `user`.
    #[serde(rename = "user", alias = "listener")]
    Listener,
    Admin,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Role {
    /// Media precedence used to settle offer collisions: the lower rank yields.
    pub fn rank(self) -> u8 {
        match self {
            Role::Speaker => 3,
            Role::Relay | Role::Translator => 2,
            Role::Listener => 1,
            Role::Admin | Role::Unknown => 0,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Speaker => "speaker",
            Role::Relay => "relay",
            Role::Translator => "translator",
            Role::Listener => "user",
            Role::Admin => "admin",
            Role::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// One participant as announced by the signaling server in `room-info`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Member {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    #[serde(default)]
    pub role: Role,
    #[serde(default, alias = "source", skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(
        default,
        alias = "want",
        alias = "target",
        skip_serializing_if = "Option::is_none"
    )]
    pub tgt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pairs: Vec<LanguagePair>,
}

impl Member {
    pub fn new(id: &str, role: Role) -> Self {
        Self {
            id: EntityId::Text(id.to_owned()),
            sid: None,
            role,
            src: None,
            tgt: None,
            pairs: Vec::new(),
        }
    }

    pub fn with_sid(mut self, sid: &str) -> Self {
        self.sid = Some(sid.to_owned());
        self
    }

    pub fn with_src(mut self, src: &str) -> Self {
        self.src = Some(src.to_owned());
        self
    }

    pub fn with_tgt(mut self, tgt: &str) -> Self {
        self.tgt = Some(tgt.to_owned());
        self
    }

    /// Signaling address for this member: `sid ?? id`.
    pub fn peer_key(&self) -> PeerKey {
        match self.sid.as_deref().filter(|sid| !sid.is_empty()) {
            Some(sid) => PeerKey::from(sid),
            None => PeerKey(self.id.to_string()),
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.src.as_deref().filter(|s| !s.is_empty())
    }

    pub fn target(&self) -> Option<&str> {
        self.tgt.as_deref().filter(|s| !s.is_empty())
    }
}
