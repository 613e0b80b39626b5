use std::time::Duration;
use tokio::sync::mpsc;
use tolk_core::{
    CandidateMessage, DescriptionMessage, IceCandidate, Member, OfferMeta, PeerKey, RoomName,
    SdpType, SignalMessage,
};

/// Timeout for waiting on a single outbound signal.
pub const SIGNAL_TIMEOUT: Duration = Duration::from_secs(2);

/// Waits for the first outbound message matching `pred`, skipping others.
pub async fn wait_for_signal<F>(
    rx: &mut mpsc::UnboundedReceiver<SignalMessage>,
    mut pred: F,
) -> Option<SignalMessage>
where
    F: FnMut(&SignalMessage) -> bool,
{
    tokio::time::timeout(SIGNAL_TIMEOUT, async {
        while let Some(msg) = rx.recv().await {
            if pred(&msg) {
                return Some(msg);
            }
        }
        None
    })
    .await
    .ok()
    .flatten()
}

/// Asserts nothing matching `pred` is sent within `within`.
pub async fn expect_no_signal<F>(
    rx: &mut mpsc::UnboundedReceiver<SignalMessage>,
    within: Duration,
    mut pred: F,
) -> bool
where
    F: FnMut(&SignalMessage) -> bool,
{
    let found = tokio::time::timeout(within, async {
        while let Some(msg) = rx.recv().await {
            if pred(&msg) {
                return true;
            }
        }
        false
    })
    .await;
    !matches!(found, Ok(true))
}

pub fn is_offer_to(msg: &SignalMessage, peer: &str) -> bool {
    matches!(msg, SignalMessage::Offer(d) if d.to.as_ref().is_some_and(|to| to.as_str() == peer))
}

pub fn is_answer_to(msg: &SignalMessage, peer: &str) -> bool {
    matches!(msg, SignalMessage::Answer(d) if d.to.as_ref().is_some_and(|to| to.as_str() == peer))
}

pub fn room_info(room: &str, members: Vec<Member>) -> SignalMessage {
    SignalMessage::RoomInfo {
        room: RoomName::from(room),
        room_size: members.len(),
        members,
    }
}

pub fn offer_from(from: &str, room: &str, meta: OfferMeta) -> SignalMessage {
    SignalMessage::Offer(DescriptionMessage {
        room: RoomName::from(room),
        to: None,
        from: Some(PeerKey::from(from)),
        sdp: Some(format!("remote-offer-{}", from)),
        sdp_type: Some(SdpType::Offer),
        meta,
    })
}

pub fn answer_from(from: &str, room: &str) -> SignalMessage {
    SignalMessage::Answer(DescriptionMessage {
        room: RoomName::from(room),
        to: None,
        from: Some(PeerKey::from(from)),
        sdp: Some(format!("remote-answer-{}", from)),
        sdp_type: Some(SdpType::Answer),
        meta: OfferMeta::default(),
    })
}

pub fn candidate_from(from: &str, room: &str, candidate: &str) -> SignalMessage {
    SignalMessage::IceCandidate(CandidateMessage {
        room: RoomName::from(room),
        to: None,
        from: Some(PeerKey::from(from)),
        candidate: Some(IceCandidate::new(candidate)),
        meta: None,
    })
}

pub fn bye_from(from: &str) -> SignalMessage {
    SignalMessage::Bye {
        room: None,
        to: None,
        from: Some(PeerKey::from(from)),
    }
}
