mod details;
mod member;
mod peer;
mod room;
mod signaling;

pub use details::{EntityId, Language, LanguagePair, RoomDetails, Speaker, Translator};
pub use member::{Member, Role};
pub use peer::PeerKey;
pub use room::RoomName;
pub use signaling::{
    CandidateMessage, DescriptionMessage, IceCandidate, IceServerConfig, JoinRequest,
    MetaUpdate, OfferMeta, SdpType, SelfRef, SignalMessage,
};
