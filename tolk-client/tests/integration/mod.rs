pub mod negotiation_tests;
pub mod teardown_tests;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::Level;

use tolk_client::{ChannelEvent, ClientConfig, Orchestrator, OrchestratorHandle, RolePolicy};
use tolk_core::{PeerKey, SignalMessage};

use crate::utils::{MockMedia, MockSessionFactory, MockSignalingOutput};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Short timers so retries happen within a test's lifetime.
pub fn test_config() -> ClientConfig {
    ClientConfig {
        initial_dial_delay: Duration::from_millis(20),
        dial_interval: Duration::from_millis(60),
        negotiation_timeout: Duration::from_millis(300),
        ..ClientConfig::default()
    }
}

pub struct TestParticipant {
    pub channel: mpsc::Sender<ChannelEvent>,
    pub signals: mpsc::UnboundedReceiver<SignalMessage>,
    pub signaling: MockSignalingOutput,
    pub factory: MockSessionFactory,
    pub media: MockMedia,
    pub handle: OrchestratorHandle,
}

impl TestParticipant {
    /// Simulates the server greeting: connection up, then the assigned peer key.
    pub async fn connect(&self, peer_key: &str) {
        self.channel.send(ChannelEvent::Connected).await.unwrap();
        self.deliver(SignalMessage::Welcome {
            peer_key: PeerKey::from(peer_key),
        })
        .await;
    }

    pub async fn deliver(&self, msg: SignalMessage) {
        self.channel.send(ChannelEvent::Message(msg)).await.unwrap();
    }
}

pub fn spawn_participant(policy: Box<dyn RolePolicy>, media: MockMedia) -> TestParticipant {
    let (channel_tx, channel_rx) = mpsc::channel(64);
    let (signaling, signals) = MockSignalingOutput::new();
    let factory = MockSessionFactory::new();

    let (orchestrator, handle) = Orchestrator::new(
        policy,
        &test_config(),
        Arc::new(signaling.clone()),
        channel_rx,
        Arc::new(factory.clone()),
        Some(Arc::new(media.clone())),
    );
    tokio::spawn(async move {
        orchestrator.run().await;
    });

    TestParticipant {
        channel: channel_tx,
        signals,
        signaling,
        factory,
        media,
        handle,
    }
}

/// Lets the orchestrator drain its queues.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

/// Waits for the first orchestrator event matching `pred`.
pub async fn wait_for_event<F>(
    handle: &mut OrchestratorHandle,
    mut pred: F,
) -> Option<tolk_client::OrchestratorEvent>
where
    F: FnMut(&tolk_client::OrchestratorEvent) -> bool,
{
    tokio::time::timeout(crate::utils::SIGNAL_TIMEOUT, async {
        while let Some(evt) = handle.next_event().await {
            if pred(&evt) {
                return Some(evt);
            }
        }
        None
    })
    .await
    .ok()
    .flatten()
}
