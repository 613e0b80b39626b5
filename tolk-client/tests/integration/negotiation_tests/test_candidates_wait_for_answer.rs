use tolk_client::ListenerPolicy;
use tolk_core::{Member, Role, SignalMessage};

use crate::integration::{init_tracing, settle, spawn_participant};
use crate::utils::{
    MockMedia, SessionCall, answer_from, candidate_from, is_offer_to, room_info, wait_for_signal,
};

#[tokio::test]
async fn test_candidates_are_held_until_the_answer_arrives() {
    init_tracing();

    let mut p = spawn_participant(
        Box::new(ListenerPolicy::new("R", Some("u1"), Some("fr"))),
        MockMedia::new(),
    );
    p.connect("listener-a").await;
    p.deliver(room_info(
        "R::fr",
        vec![
            Member::new("relay-1", Role::Relay).with_tgt("fr"),
            Member::new("u1", Role::Listener).with_sid("listener-a").with_tgt("fr"),
        ],
    ))
    .await;

    let offer = wait_for_signal(&mut p.signals, |m| is_offer_to(m, "relay-1"))
        .await
        .expect("offer to relay");
    let SignalMessage::Offer(offer) = offer else {
        unreachable!()
    };
    assert_eq!(offer.room.as_str(), "R::fr");
    assert_eq!(offer.meta.role(), Role::Listener);
    assert_eq!(offer.meta.tgt.as_deref(), Some("fr"));
    assert_eq!(offer.meta.me.and_then(|me| me.id).as_deref(), Some("u1"));

    let session = p.factory.session_for("relay-1").unwrap();
    session.candidate("c1");
    session.candidate("c2");
    settle().await;
    assert!(p.signaling.candidates_sent().await.is_empty());

    p.deliver(answer_from("relay-1", "R::fr")).await;
    settle().await;
    assert_eq!(p.signaling.candidates_sent().await, ["c1", "c2"]);

    session.candidate("c3");
    settle().await;
    assert_eq!(p.signaling.candidates_sent().await, ["c1", "c2", "c3"]);

    // Remote candidates reach the session object; empty ones are dropped.
    p.deliver(candidate_from("relay-1", "R::fr", "r1")).await;
    p.deliver(candidate_from("relay-1", "R::fr", "")).await;
    settle().await;
    let added: Vec<_> = session
        .calls()
        .into_iter()
        .filter(|c| matches!(c, SessionCall::AddCandidate(_)))
        .collect();
    assert_eq!(added, [SessionCall::AddCandidate("r1".into())]);
}

#[tokio::test]
async fn test_duplicate_answer_is_dropped() {
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
    p.deliver(answer_from("relay-1", "R::fr")).await;
    p.deliver(answer_from("stranger", "R::fr")).await;
    settle().await;

    let session = p.factory.session_for("relay-1").unwrap();
    let applied = session
        .calls()
        .iter()
        .filter(|c| matches!(c, SessionCall::SetRemote(_)))
        .count();
    assert_eq!(applied, 1);
    assert!(!session.is_closed());
}
