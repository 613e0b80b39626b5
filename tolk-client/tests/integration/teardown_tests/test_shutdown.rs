use tolk_client::RelayPolicy;
use tolk_core::{Member, OfferMeta, Role, RoomName, SignalMessage};

use crate::integration::{init_tracing, settle, spawn_participant};
use crate::utils::{MockMedia, is_answer_to, is_offer_to, offer_from, room_info, wait_for_signal};

#[tokio::test]
async fn test_shutdown_leaves_rooms_and_closes_everything() {
    init_tracing();

    let mut p = spawn_participant(
        Box::new(RelayPolicy::new("R", None, Some("en"), Some("fr"))),
        MockMedia::new(),
    );
    p.connect("relay-1").await;
    p.deliver(offer_from(
        "speaker-1",
        "R::en",
        OfferMeta::new(Role::Speaker, None).with_src(Some("en")),
    ))
    .await;
    wait_for_signal(&mut p.signals, |m| is_answer_to(m, "speaker-1"))
        .await
        .expect("answer to speaker");
    p.deliver(room_info(
        "R::fr",
        vec![Member::new("l", Role::Listener).with_sid("listener-a").with_tgt("fr")],
    ))
    .await;
    wait_for_signal(&mut p.signals, |m| is_offer_to(m, "listener-a"))
        .await
        .expect("offer to listener");

    p.handle.shutdown().await.unwrap();
    settle().await;

    let sent = p.signaling.sent().await;
    let left: Vec<RoomName> = sent
        .iter()
        .filter_map(|m| match m {
            SignalMessage::Leave { room } => Some(room.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(left, [RoomName::from("R::en"), RoomName::from("R::fr")]);

    let mut byes: Vec<String> = sent
        .iter()
        .filter_map(|m| match m {
            SignalMessage::Bye { to: Some(to), .. } => Some(to.0.clone()),
            _ => None,
        })
        .collect();
    byes.sort();
    assert_eq!(byes, ["listener-a", "speaker-1"]);

    assert!(p.factory.created().iter().all(|s| s.is_closed()));
    assert_eq!(p.media.acquired(), 1);
    assert_eq!(p.media.released(), 1);
    assert!(p.handle.shutdown().await.is_err());
}
