mod listener;
mod relay;
mod speaker;

pub use listener::*;
pub use relay::*;
pub use speaker::*;

use crate::session::{Lane, SessionManager};
use tolk_core::{JoinRequest, Member, MetaUpdate, OfferMeta, PeerKey, Role, RoomName};

/// Identity and language choice of the local participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub role: Role,
    /// Base room code `R`.
    pub room: String,
    /// Application-level user id announced in `join` and `meta.me`.
    pub id: Option<String>,
    pub src: Option<String>,
    pub tgt: Option<String>,
}

impl Participant {
    pub fn new(role: Role, room: &str) -> Self {
        Self {
            role,
            room: room.to_owned(),
            id: None,
            src: None,
            tgt: None,
        }
    }

    pub fn with_id(mut self, id: Option<&str>) -> Self {
        self.id = id.filter(|s| !s.is_empty()).map(str::to_owned);
        self
    }

    pub fn with_src(mut self, src: Option<&str>) -> Self {
        self.src = src.filter(|s| !s.is_empty()).map(str::to_owned);
        self
    }

    pub fn with_tgt(mut self, tgt: Option<&str>) -> Self {
        self.tgt = tgt.filter(|s| !s.is_empty()).map(str::to_owned);
        self
    }

    pub fn source(&self) -> Option<&str> {
        self.src.as_deref()
    }

    pub fn target(&self) -> Option<&str> {
        self.tgt.as_deref()
    }
}

/// Where and how an accepted offer is answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRoute {
    pub room: RoomName,
    pub lane: Lane,
}

/// Role-specific rules of one participant: which rooms it joins, whom it calls and which
/// offers it takes.
pub trait RolePolicy: Send + Sync {
    fn participant(&self) -> &Participant;

    /// Rooms to be in, in join order.
    fn rooms(&self) -> Vec<RoomName>;

    /// Lane of the session to open toward `member`, or `None` if it is not ours to call.
    fn dial_lane(&self, me: &PeerKey, member: &Member) -> Option<Lane>;

    /// Gate evaluated before each dial pass.
    fn may_dial(&self, _sessions: &SessionManager) -> bool {
        true
    }

    /// Route for answering an offer carrying `meta`, or `None` to ignore the offer.
    fn answer_route(&self, meta: &OfferMeta) -> Option<AnswerRoute>;

    /// The language a switch command changes.
    fn switchable_language(&self) -> Option<&str>;

    fn set_language(&mut self, language: &str);

    fn keeps_media_on_switch(&self) -> bool {
        true
    }

    fn role(&self) -> Role {
        self.participant().role
    }

    fn offer_meta(&self) -> OfferMeta {
        let p = self.participant();
        OfferMeta::new(p.role, p.id.as_deref())
            .with_src(p.source())
            .with_tgt(p.target())
    }

    fn join_request(&self, room: &RoomName) -> JoinRequest {
        let p = self.participant();
        JoinRequest {
            room: room.clone(),
            role: p.role,
            id: p.id.clone(),
            src: p.src.clone(),
            tgt: p.tgt.clone(),
            pairs: Vec::new(),
        }
    }

    fn meta_update(&self) -> MetaUpdate {
        let p = self.participant();
        MetaUpdate {
            role: Some(p.role),
            src: p.src.clone(),
            tgt: p.tgt.clone(),
            pairs: None,
        }
    }
}

/// Whether the local side yields on an offer collision with `remote`. The lower-ranked
/// role is polite; on equal rank the larger peer key is.
pub fn is_polite(local_role: Role, me: &PeerKey, remote_role: Role, remote: &PeerKey) -> bool {
    match local_role.rank().cmp(&remote_role.rank()) {
        std::cmp::Ordering::Less => true,
        std::cmp::Ordering::Greater => false,
        std::cmp::Ordering::Equal => me > remote,
    }
}
