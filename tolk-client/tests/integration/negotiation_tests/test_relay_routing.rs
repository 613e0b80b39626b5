use tolk_client::{Lane, RelayPolicy};
use tolk_core::{OfferMeta, Role, SignalMessage};

use crate::integration::{init_tracing, settle, spawn_participant};
use crate::utils::{MockMedia, is_answer_to, offer_from, wait_for_signal};

#[tokio::test]
async fn test_relay_answers_speaker_in_the_source_room() {
    init_tracing();

    let mut p = spawn_participant(
        Box::new(RelayPolicy::new("R", Some("9"), Some("en"), Some("fr"))),
        MockMedia::new(),
    );
    p.connect("relay-1").await;

    // Arrives on the target room; the metadata decides where the answer goes.
    p.deliver(offer_from(
        "speaker-1",
        "R::fr",
        OfferMeta::new(Role::Speaker, Some("7")).with_src(Some("en")),
    ))
    .await;

    let answer = wait_for_signal(&mut p.signals, |m| is_answer_to(m, "speaker-1"))
        .await
        .expect("answer to speaker");
    let SignalMessage::Answer(answer) = answer else {
        unreachable!()
    };
    assert_eq!(answer.room.as_str(), "R::en");
    assert_eq!(answer.meta.role(), Role::Relay);
    assert_eq!(answer.meta.tgt.as_deref(), Some("fr"));

    let session = p.factory.session_for("speaker-1").unwrap();
    assert_eq!(session.lane, Lane::Upstream);
    assert_eq!(p.media.acquired(), 0);

    session.candidate("c1");
    settle().await;
    let rooms: Vec<String> = p
        .signaling
        .sent()
        .await
        .into_iter()
        .filter_map(|m| match m {
            SignalMessage::IceCandidate(c) => Some(c.room.0),
            _ => None,
        })
        .collect();
    assert_eq!(rooms, ["R::en"]);
}

#[tokio::test]
async fn test_relay_answers_listener_with_its_track() {
    init_tracing();

    let mut p = spawn_participant(
        Box::new(RelayPolicy::new("R", None, Some("en"), Some("fr"))),
        MockMedia::new(),
    );
    p.connect("relay-1").await;
    p.deliver(offer_from(
        "listener-a",
        "R::fr",
        OfferMeta::new(Role::Listener, None).with_tgt(Some("fr")),
    ))
    .await;

    let answer = wait_for_signal(&mut p.signals, |m| is_answer_to(m, "listener-a"))
        .await
        .expect("answer to listener");
    let SignalMessage::Answer(answer) = answer else {
        unreachable!()
    };
    assert_eq!(answer.room.as_str(), "R::fr");
    assert_eq!(p.factory.session_for("listener-a").unwrap().lane, Lane::Downstream);
    assert_eq!(p.media.acquired(), 1);
}
