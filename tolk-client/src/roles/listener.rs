use super::{AnswerRoute, Participant, RolePolicy};
use crate::session::Lane;
use tolk_core::topology::{default_listener_language, sub_room_name};
use tolk_core::{Member, OfferMeta, PeerKey, Role, RoomDetails, RoomName};

/// Receive-only audience member tuned to one target language.
#[derive(Debug, Clone)]
pub struct ListenerPolicy {
    participant: Participant,
}

impl ListenerPolicy {
    pub fn new(room: &str, id: Option<&str>, tgt: Option<&str>) -> Self {
        Self {
            participant: Participant::new(Role::Listener, room)
                .with_id(id)
                .with_tgt(tgt),
        }
    }

    pub fn from_details(details: &RoomDetails, id: Option<&str>, explicit: Option<&str>) -> Self {
        let tgt = default_listener_language(details, explicit);
        Self::new(&details.code, id, tgt.as_deref())
    }
}

impl RolePolicy for ListenerPolicy {
    fn participant(&self) -> &Participant {
        &self.participant
    }

    fn rooms(&self) -> Vec<RoomName> {
        let p = &self.participant;
        let base = RoomName::from(p.room.as_str());
        match p.target() {
            Some(tgt) => vec![base, sub_room_name(&p.room, tgt)],
            None => vec![base],
        }
    }

    fn dial_lane(&self, me: &PeerKey, member: &Member) -> Option<Lane> {
        let tgt = self.participant.target();
        let eligible = match member.role {
            Role::Relay => member.target().is_none() || member.target() == tgt,
            // One side of each listener pair calls.
            Role::Listener => tgt.is_some() && member.target() == tgt && member.peer_key() > *me,
            _ => false,
        };
        eligible.then_some(Lane::Upstream)
    }

    fn answer_route(&self, meta: &OfferMeta) -> Option<AnswerRoute> {
        let p = &self.participant;
        let offered = meta.offered_language();
        if offered.is_some() && p.target().is_some() && offered != p.target() {
            return None;
        }
        let lang = offered.or(p.target()).unwrap_or_default();
        Some(AnswerRoute {
            room: sub_room_name(&p.room, lang),
            lane: Lane::Upstream,
        })
    }

    fn switchable_language(&self) -> Option<&str> {
        self.participant.target()
    }

    fn set_language(&mut self, language: &str) {
        self.participant.tgt = Some(language.to_owned()).filter(|l| !l.is_empty());
    }

    fn keeps_media_on_switch(&self) -> bool {
        false
    }
}
