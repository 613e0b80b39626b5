use anyhow::Result;
use tolk_core::{MetaUpdate, Role, SignalMessage};

use crate::integration::init_tracing;
use crate::utils::{TestSocket, spawn_server};

#[tokio::test]
async fn test_update_meta_rebroadcasts_room_info() -> Result<()> {
    init_tracing();
    let addr = spawn_server().await?;
    let mut speaker = TestSocket::connect(addr).await?;
    let mut relay = TestSocket::connect(addr).await?;
    speaker.join("R", Role::Speaker, Some("en"), None).await?;
    relay.join("R", Role::Relay, Some("en"), Some("fr")).await?;
    speaker.recv_op("peer-joined").await?;
    speaker.recv_op("room-info").await?;

    relay
        .send(SignalMessage::UpdateMeta(MetaUpdate {
            tgt: Some("es".into()),
            ..MetaUpdate::default()
        }))
        .await?;

    let SignalMessage::RoomInfo { members, .. } = speaker.recv_op("room-info").await? else {
        unreachable!();
    };
    let updated = members
        .iter()
        .find(|m| m.peer_key() == relay.peer_key)
        .map(|m| m.target().map(str::to_owned));
    assert_eq!(updated, Some(Some("es".to_owned())));
    Ok(())
}
