use crate::config::ClientConfig;
use crate::signaling::{ChannelEvent, SignalingOutput};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tolk_core::SignalMessage;
use tracing::{debug, error, info, warn};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

enum PumpExit {
    /// Every handle was dropped; stop for good.
    Shutdown,
    /// Socket lost; reconnect.
    Lost,
}

/// Reconnecting WebSocket connection to the signaling server.
///
/// Outbound messages issued while the socket is down are dropped, not replayed: the
/// orchestrator rejoins its rooms on [`ChannelEvent::Connected`] and the dialer redoes
/// any negotiation that was in flight.
#[derive(Clone)]
pub struct SignalingChannel {
    tx: mpsc::UnboundedSender<SignalMessage>,
}

impl SignalingChannel {
    pub fn connect(config: &ClientConfig) -> (Self, mpsc::Receiver<ChannelEvent>) {
        let (tx, outbound_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::channel(256);

        tokio::spawn(Self::run(
            config.signaling_url.clone(),
            outbound_rx,
            events_tx,
            config.reconnect_delay,
            config.max_reconnect_delay,
        ));

        (Self { tx }, events_rx)
    }

    async fn run(
        url: String,
        mut outbound_rx: mpsc::UnboundedReceiver<SignalMessage>,
        events_tx: mpsc::Sender<ChannelEvent>,
        base_delay: Duration,
        max_delay: Duration,
    ) {
        let mut delay = base_delay;

        loop {
            loop {
                match outbound_rx.try_recv() {
                    Ok(msg) => debug!("Dropping '{}' queued while offline", msg.op()),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }

            match connect_async(url.as_str()).await {
                Ok((ws, _)) => {
                    info!("Connected to signaling server {}", url);
                    delay = base_delay;

                    if events_tx.send(ChannelEvent::Connected).await.is_err() {
                        return;
                    }
                    if let PumpExit::Shutdown = Self::pump(ws, &mut outbound_rx, &events_tx).await {
                        return;
                    }
                    warn!("Signaling connection lost, reconnecting");
                    if events_tx.send(ChannelEvent::Disconnected).await.is_err() {
                        return;
                    }
                }
                Err(e) => warn!("Failed to connect to {}: {}", url, e),
            }

            tokio::time::sleep(delay).await;
            delay = (delay * 2).min(max_delay);
        }
    }

    async fn pump(
        ws: WsStream,
        outbound_rx: &mut mpsc::UnboundedReceiver<SignalMessage>,
        events_tx: &mpsc::Sender<ChannelEvent>,
    ) -> PumpExit {
        let (mut write, mut read) = ws.split();

        loop {
            tokio::select! {
                outbound = outbound_rx.recv() => {
                    let Some(msg) = outbound else {
                        let _ = write.send(Message::Close(None)).await;
                        return PumpExit::Shutdown;
                    };
                    let json = match serde_json::to_string(&msg) {
                        Ok(json) => json,
                        Err(e) => {
                            error!("Failed to serialize signal message: {}", e);
                            continue;
                        }
                    };
                    if let Err(e) = write.send(Message::Text(json.into())).await {
                        error!("Failed to send WS message: {}", e);
                        return PumpExit::Lost;
                    }
                }

                frame = read.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => {
                            match serde_json::from_str::<SignalMessage>(text.as_str()) {
                                Ok(msg) => {
                                    if events_tx.send(ChannelEvent::Message(msg)).await.is_err() {
                                        return PumpExit::Shutdown;
                                    }
                                }
                                Err(e) => warn!("Invalid SignalMessage: {}", e),
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => return PumpExit::Lost,
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            warn!("WebSocket error: {}", e);
                            return PumpExit::Lost;
                        }
                    }
                }
            }
        }
    }
}

#[async_trait]
impl SignalingOutput for SignalingChannel {
    async fn send(&self, msg: SignalMessage) {
        if self.tx.send(msg).is_err() {
            warn!("Signaling channel task is gone, message dropped");
        }
    }
}
