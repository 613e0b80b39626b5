use tolk_client::ListenerPolicy;
use tolk_core::{Member, Role};

use crate::integration::{init_tracing, spawn_participant};
use crate::utils::{MockMedia, is_offer_to, room_info, wait_for_signal};

#[tokio::test]
async fn test_unanswered_offer_is_replaced() {
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
        .expect("first offer");
    let first = p.factory.session_for("relay-1").unwrap();

    wait_for_signal(&mut p.signals, |m| is_offer_to(m, "relay-1"))
        .await
        .expect("offer after timeout");
    assert!(first.is_closed());
    assert_eq!(p.factory.count_for("relay-1"), 2);
}
