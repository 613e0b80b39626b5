use anyhow::Result;
use tolk_core::{Role, SignalMessage};

use crate::integration::init_tracing;
use crate::utils::{TestSocket, spawn_server};

#[tokio::test]
async fn test_disconnect_leaves_every_room() -> Result<()> {
    init_tracing();
    let addr = spawn_server().await?;
    let mut relay = TestSocket::connect(addr).await?;
    let mut listener = TestSocket::connect(addr).await?;
    let mut speaker = TestSocket::connect(addr).await?;

    relay.join("R", Role::Relay, Some("en"), Some("fr")).await?;
    relay.join("R::fr", Role::Relay, None, None).await?;
    listener.join("R::fr", Role::Listener, None, Some("fr")).await?;
    speaker.join("R", Role::Speaker, Some("en"), None).await?;
    listener.recv_op("room-info").await?;
    speaker.recv_op("room-info").await?;

    let relay_key = relay.peer_key.clone();
    relay.close().await?;

    for socket in [&mut listener, &mut speaker] {
        let SignalMessage::PeerLeft { member } = socket.recv_op("peer-left").await? else {
            unreachable!();
        };
        assert_eq!(member.peer_key(), relay_key);

        let SignalMessage::RoomInfo { room_size, members, .. } = socket.recv_op("room-info").await? else {
            unreachable!();
        };
        assert_eq!(room_size, 1);
        assert!(members.iter().all(|m| m.peer_key() != relay_key));
    }
    Ok(())
}

#[tokio::test]
async fn test_leave_notifies_remaining_members() -> Result<()> {
    init_tracing();
    let addr = spawn_server().await?;
    let mut a = TestSocket::connect(addr).await?;
    let mut b = TestSocket::connect(addr).await?;
    a.join("R::fr", Role::Listener, None, Some("fr")).await?;
    b.join("R::fr", Role::Listener, None, Some("fr")).await?;
    a.recv_op("peer-joined").await?;

    b.send(SignalMessage::Leave { room: "R::fr".into() }).await?;

    let SignalMessage::PeerLeft { member } = a.recv_op("peer-left").await? else {
        unreachable!();
    };
    assert_eq!(member.peer_key(), b.peer_key);
    assert!(matches!(
        a.recv_op("room-info").await?,
        SignalMessage::RoomInfo { room_size: 1, .. }
    ));
    Ok(())
}
