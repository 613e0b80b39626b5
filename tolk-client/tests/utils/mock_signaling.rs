use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tolk_client::SignalingOutput;
use tolk_core::{RoomName, SignalMessage};

/// Mock SignalingOutput that captures all outgoing messages.
#[derive(Clone)]
pub struct MockSignalingOutput {
    tx: mpsc::UnboundedSender<SignalMessage>,
    sent: Arc<Mutex<Vec<SignalMessage>>>,
}

impl MockSignalingOutput {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SignalMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let signaling = Self {
            tx,
            sent: Arc::new(Mutex::new(Vec::new())),
        };
        (signaling, rx)
    }

    /// Everything sent so far, in order.
    pub async fn sent(&self) -> Vec<SignalMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_ops(&self) -> Vec<&'static str> {
        self.sent.lock().await.iter().map(SignalMessage::op).collect()
    }

    pub async fn joined_rooms(&self) -> Vec<RoomName> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|m| match m {
                SignalMessage::Join(req) => Some(req.room.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn candidates_sent(&self) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter_map(|m| match m {
                SignalMessage::IceCandidate(c) => c.candidate.as_ref().map(|c| c.candidate.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl SignalingOutput for MockSignalingOutput {
    async fn send(&self, msg: SignalMessage) {
        tracing::debug!("[MockSignaling] {}", msg.op());
        self.sent.lock().await.push(msg.clone());
        let _ = self.tx.send(msg);
    }
}
