use super::{AnswerRoute, Participant, RolePolicy};
use crate::session::Lane;
use tolk_core::topology::{choose_auto_source_language, room_for_role};
use tolk_core::{Member, OfferMeta, PeerKey, Role, RoomDetails, RoomName};

/// Broadcasts the local track into its source-language room. Never answers offers.
#[derive(Debug, Clone)]
pub struct SpeakerPolicy {
    participant: Participant,
}

impl SpeakerPolicy {
    pub fn new(room: &str, id: Option<&str>, src: Option<&str>) -> Self {
        Self {
            participant: Participant::new(Role::Speaker, room)
                .with_id(id)
                .with_src(src),
        }
    }

    /// Uses `explicit` as the source language, falling back to the automatic choice.
    pub fn from_details(details: &RoomDetails, id: Option<&str>, explicit: Option<&str>) -> Self {
        let src = explicit
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .or_else(|| choose_auto_source_language(details));
        Self::new(&details.code, id, src.as_deref())
    }
}

impl RolePolicy for SpeakerPolicy {
    fn participant(&self) -> &Participant {
        &self.participant
    }

    fn rooms(&self) -> Vec<RoomName> {
        let p = &self.participant;
        vec![room_for_role(&p.room, p.role, p.source(), p.target())]
    }

    fn dial_lane(&self, _me: &PeerKey, member: &Member) -> Option<Lane> {
        let src = self.participant.source();
        let eligible = match member.role {
            Role::Relay => member.source().is_none() || member.source() == src,
            Role::Translator => src.is_some() && member.source() == src,
            // Listeners that have not picked a language get the original.
            Role::Listener => src.is_some() && (member.target().is_none() || member.target() == src),
            _ => false,
        };
        eligible.then_some(Lane::Downstream)
    }

    fn answer_route(&self, _meta: &OfferMeta) -> Option<AnswerRoute> {
        None
    }

    fn switchable_language(&self) -> Option<&str> {
        self.participant.source()
    }

    fn set_language(&mut self, language: &str) {
        self.participant.src = Some(language.to_owned()).filter(|l| !l.is_empty());
    }
}
