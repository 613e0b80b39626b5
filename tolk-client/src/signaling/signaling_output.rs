use async_trait::async_trait;
use tolk_core::SignalMessage;

/// Outbound half of the signaling channel. Sending is best-effort: failures are logged
/// by the implementation and recovered by the dialer's next pass.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    async fn send(&self, msg: SignalMessage);
}

/// Inbound events of a signaling channel, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// A (re)connection succeeded; server-side state starts empty.
    Connected,
    /// The connection dropped; the channel is retrying in the background.
    Disconnected,
    Message(SignalMessage),
}
