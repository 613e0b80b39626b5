use crate::model::details::LanguagePair;
use crate::model::member::{Member, Role};
use crate::model::peer::PeerKey;
use crate::model::room::RoomName;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// Trickle ICE candidate in the browser `RTCIceCandidateInit` JSON shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IceCandidate {
    #[serde(default)]
    pub candidate: String,
    #[serde(default)]
    pub sdp_mid: Option<String>,
    #[serde(default)]
    pub sdp_m_line_index: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username_fragment: Option<String>,
}

impl IceCandidate {
    pub fn new(candidate: &str) -> Self {
        Self {
            candidate: candidate.to_owned(),
            sdp_mid: None,
            sdp_m_line_index: None,
            username_fragment: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.candidate.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SdpType {
    Offer,
    Answer,
    Pranswer,
    Rollback,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SelfRef {
    #[serde(default)]
    pub id: Option<String>,
}

/// Sender metadata attached to offers and answers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct OfferMeta {
    #[serde(default, alias = "role", skip_serializing_if = "Option::is_none")]
    pub from_role: Option<Role>,
    #[serde(default, alias = "source", skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, alias = "target", skip_serializing_if = "Option::is_none")]
    pub tgt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub me: Option<SelfRef>,
}

impl OfferMeta {
    pub fn new(role: Role, me: Option<&str>) -> Self {
        Self {
            from_role: Some(role),
            src: None,
            tgt: None,
            me: Some(SelfRef {
                id: me.map(str::to_owned),
            }),
        }
    }

    pub fn with_src(mut self, src: Option<&str>) -> Self {
        self.src = src.filter(|s| !s.is_empty()).map(str::to_owned);
        self
    }

    pub fn with_tgt(mut self, tgt: Option<&str>) -> Self {
        self.tgt = tgt.filter(|s| !s.is_empty()).map(str::to_owned);
        self
    }

    pub fn role(&self) -> Role {
        self.from_role.unwrap_or_default()
    }

    /// Language the sender is offering audio in: a speaker announces its source
    /// language, everyone else the target language they emit.
    pub fn offered_language(&self) -> Option<&str> {
        let lang = match self.from_role {
            Some(Role::Speaker) => self.src.as_deref(),
            _ => self.tgt.as_deref(),
        };
        lang.filter(|l| !l.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JoinRequest {
    pub room: RoomName,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tgt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pairs: Vec<LanguagePair>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct MetaUpdate {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default, alias = "want", alias = "target")]
    pub tgt: Option<String>,
    #[serde(default)]
    pub pairs: Option<Vec<LanguagePair>>,
}

/// Offer or answer. `sdp` and the addresses stay optional so that a malformed
/// payload still decodes and can be dropped by the receiver.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DescriptionMessage {
    pub room: RoomName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<PeerKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<PeerKey>,
    #[serde(default)]
    pub sdp: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub sdp_type: Option<SdpType>,
    #[serde(default)]
    pub meta: OfferMeta,
}

impl DescriptionMessage {
    pub fn new(room: RoomName, to: PeerKey, sdp: String, sdp_type: SdpType, meta: OfferMeta) -> Self {
        Self {
            room,
            to: Some(to),
            from: None,
            sdp: Some(sdp),
            sdp_type: Some(sdp_type),
            meta,
        }
    }

    pub fn sdp(&self) -> Option<&str> {
        self.sdp.as_deref().filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateMessage {
    pub room: RoomName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<PeerKey>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<PeerKey>,
    #[serde(default)]
    pub candidate: Option<IceCandidate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<OfferMeta>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum SignalMessage {
    Welcome {
        peer_key: PeerKey,
    },
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    Join(JoinRequest),
    Leave {
        room: RoomName,
    },
    UpdateMeta(MetaUpdate),
    ListMembers {
        room: RoomName,
    },
    RoomInfo {
        room: RoomName,
        #[serde(default)]
        room_size: usize,
        #[serde(default)]
        members: Vec<Member>,
    },
    PeerJoined {
        member: Member,
    },
    PeerLeft {
        member: Member,
    },
    Offer(DescriptionMessage),
    Answer(DescriptionMessage),
    IceCandidate(CandidateMessage),
    Bye {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room: Option<RoomName>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        to: Option<PeerKey>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<PeerKey>,
    },
}

impl SignalMessage {
    /// Wire name of the event, as carried in the `op` field.
    pub fn op(&self) -> &'static str {
        match self {
            SignalMessage::Welcome { .. } => "welcome",
            SignalMessage::IceConfig { .. } => "ice-config",
            SignalMessage::Join(_) => "join",
            SignalMessage::Leave { .. } => "leave",
            SignalMessage::UpdateMeta(_) => "update-meta",
            SignalMessage::ListMembers { .. } => "list-members",
            SignalMessage::RoomInfo { .. } => "room-info",
            SignalMessage::PeerJoined { .. } => "peer-joined",
            SignalMessage::PeerLeft { .. } => "peer-left",
            SignalMessage::Offer(_) => "offer",
            SignalMessage::Answer(_) => "answer",
            SignalMessage::IceCandidate(_) => "ice-candidate",
            SignalMessage::Bye { .. } => "bye",
        }
    }
}
