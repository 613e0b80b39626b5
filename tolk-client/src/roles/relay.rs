use super::{AnswerRoute, Participant, RolePolicy};
use crate::session::{Lane, SessionManager};
use tolk_core::topology::{
    choose_auto_source_language, choose_auto_target_language, relay_rooms, sub_room_name,
};
use tolk_core::{Member, OfferMeta, PeerKey, Role, RoomDetails, RoomName};

/// Receives the speaker in the source room and re-emits its own track to listeners in
/// the target room.
#[derive(Debug, Clone)]
pub struct RelayPolicy {
    participant: Participant,
}

impl RelayPolicy {
    pub fn new(room: &str, id: Option<&str>, src: Option<&str>, tgt: Option<&str>) -> Self {
        Self {
            participant: Participant::new(Role::Relay, room)
                .with_id(id)
                .with_src(src)
                .with_tgt(tgt),
        }
    }

    /// Explicit languages win; missing ones are chosen from the room's translator pairs.
    pub fn from_details(
        details: &RoomDetails,
        id: Option<&str>,
        src: Option<&str>,
        tgt: Option<&str>,
    ) -> Self {
        let src = src
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .or_else(|| choose_auto_source_language(details));
        let tgt = tgt
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .or_else(|| choose_auto_target_language(details, src.as_deref().unwrap_or_default()));
        Self::new(&details.code, id, src.as_deref(), tgt.as_deref())
    }
}

impl RolePolicy for RelayPolicy {
    fn participant(&self) -> &Participant {
        &self.participant
    }

    fn rooms(&self) -> Vec<RoomName> {
        let p = &self.participant;
        let (upstream, downstream) = relay_rooms(&p.room, p.source(), p.target());
        if upstream == downstream {
            vec![upstream]
        } else {
            vec![upstream, downstream]
        }
    }

    fn dial_lane(&self, _me: &PeerKey, member: &Member) -> Option<Lane> {
        let tgt = self.participant.target()?;
        (member.role == Role::Listener && member.target() == Some(tgt)).then_some(Lane::Downstream)
    }

    /// Listeners are only called once the speaker's audio is coming in.
    fn may_dial(&self, sessions: &SessionManager) -> bool {
        sessions.has_lane(Lane::Upstream)
    }

    fn answer_route(&self, meta: &OfferMeta) -> Option<AnswerRoute> {
        let p = &self.participant;
        match meta.role() {
            Role::Speaker => Some(AnswerRoute {
                room: sub_room_name(&p.room, meta.src.as_deref().unwrap_or_default()),
                lane: Lane::Upstream,
            }),
            Role::Listener => {
                let wanted = meta.tgt.as_deref().filter(|t| !t.is_empty());
                if wanted.is_some() && wanted != p.target() {
                    return None;
                }
                Some(AnswerRoute {
                    room: sub_room_name(&p.room, p.target().unwrap_or_default()),
                    lane: Lane::Downstream,
                })
            }
            _ => None,
        }
    }

    fn switchable_language(&self) -> Option<&str> {
        self.participant.target()
    }

    fn set_language(&mut self, language: &str) {
        self.participant.tgt = Some(language.to_owned()).filter(|l| !l.is_empty());
    }
}
