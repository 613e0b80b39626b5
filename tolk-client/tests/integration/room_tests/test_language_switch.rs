use tolk_client::{ListenerPolicy, OrchestratorEvent, RelayPolicy};
use tolk_core::{Member, OfferMeta, Role, RoomName, SignalMessage};

use crate::integration::{init_tracing, settle, spawn_participant, wait_for_event};
use crate::utils::{
    MockMedia, answer_from, is_answer_to, is_offer_to, offer_from, room_info, wait_for_signal,
};

#[tokio::test]
async fn test_switch_closes_sessions_before_joining_new_room() {
    init_tracing();

    let mut p = spawn_participant(
        Box::new(ListenerPolicy::new("R", None, Some("fr"))),
        MockMedia::new(),
    );
    p.connect("listener-a").await;
    p.deliver(room_info(
        "R::fr",
        vec![Member::new("relay-1", Role::Relay).with_tgt("fr")],
    ))
    .await;
    wait_for_signal(&mut p.signals, |m| is_offer_to(m, "relay-1"))
        .await
        .expect("offer to relay");
    p.deliver(answer_from("relay-1", "R::fr")).await;
    settle().await;

    p.handle.switch_language("es").await.unwrap();
    let chosen = wait_for_event(&mut p.handle, |e| {
        matches!(e, OrchestratorEvent::LanguagesChosen { tgt: Some(t), .. } if t == "es")
    })
    .await;
    assert!(chosen.is_some());
    settle().await;

    let sent = p.signaling.sent().await;
    let bye = sent
        .iter()
        .position(|m| matches!(m, SignalMessage::Bye { to: Some(to), .. } if to.as_str() == "relay-1"))
        .expect("bye to relay");
    let leave = sent
        .iter()
        .position(|m| matches!(m, SignalMessage::Leave { room } if room.as_str() == "R::fr"))
        .expect("leave R::fr");
    let join = sent
        .iter()
        .position(|m| matches!(m, SignalMessage::Join(req) if req.room.as_str() == "R::es"))
        .expect("join R::es");
    assert!(bye < join);
    assert!(leave < join);

    // The base room was never left, so it is not joined again.
    assert_eq!(
        p.signaling.joined_rooms().await,
        [RoomName::from("R"), RoomName::from("R::fr"), RoomName::from("R::es")]
    );
    assert!(p.factory.session_for("relay-1").unwrap().is_closed());
}

#[tokio::test]
async fn test_switch_to_current_language_is_ignored() {
    init_tracing();

    let p = spawn_participant(
        Box::new(ListenerPolicy::new("R", None, Some("fr"))),
        MockMedia::new(),
    );
    p.connect("listener-a").await;
    settle().await;

    p.handle.switch_language("fr").await.unwrap();
    settle().await;

    let ops = p.signaling.sent_ops().await;
    assert_eq!(ops, ["join", "join"]);
}

#[tokio::test]
async fn test_relay_switch_keeps_source_room() {
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

    p.handle.switch_language("es").await.unwrap();
    wait_for_event(&mut p.handle, |e| {
        matches!(e, OrchestratorEvent::LanguagesChosen { tgt: Some(t), .. } if t == "es")
    })
    .await
    .expect("new target announced");
    settle().await;

    let sent = p.signaling.sent().await;
    let bye = sent
        .iter()
        .position(|m| matches!(m, SignalMessage::Bye { to: Some(to), .. } if to.as_str() == "speaker-1"))
        .expect("bye to speaker");
    let meta = sent
        .iter()
        .position(|m| matches!(m, SignalMessage::UpdateMeta(u) if u.tgt.as_deref() == Some("es")))
        .expect("update-meta with new target");
    let join = sent
        .iter()
        .position(|m| matches!(m, SignalMessage::Join(req) if req.room.as_str() == "R::es"))
        .expect("join R::es");
    assert!(bye < join);
    assert!(meta < join);

    let left: Vec<&str> = sent
        .iter()
        .filter_map(|m| match m {
            SignalMessage::Leave { room } => Some(room.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(left, ["R::fr"]);
    assert_eq!(
        p.signaling.joined_rooms().await,
        [RoomName::from("R::en"), RoomName::from("R::fr"), RoomName::from("R::es")]
    );
    assert!(p.factory.session_for("speaker-1").unwrap().is_closed());
}
