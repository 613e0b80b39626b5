mod command;
mod membership;

pub use command::*;
pub use membership::*;

use crate::config::ClientConfig;
use crate::dialer::{DialTarget, DialTimer, dial_targets};
use crate::error::{ClientError, MediaError};
use crate::media::{LocalMedia, LocalTrack, MediaSlot};
use crate::roles::{RolePolicy, is_polite};
use crate::session::{
    AnswerPlan, DialRequest, Lane, SessionEvent, SessionFactory, SessionManager, SessionUpdate,
};
use crate::signaling::{ChannelEvent, SignalingOutput};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tolk_core::{CandidateMessage, DescriptionMessage, PeerKey, RoomName, SignalMessage};
use tracing::{debug, info, warn};

/// Drives one participant: room joins, dialing, offer handling and teardown, all on a
/// single event loop.
pub struct Orchestrator {
    policy: Box<dyn RolePolicy>,
    me: Option<PeerKey>,
    joined: JoinedRooms,
    members: RoomMembers,
    sessions: SessionManager,
    media: MediaSlot,
    dialer: DialTimer,
    negotiation_timeout: Duration,
    signaling: Arc<dyn SignalingOutput>,
    factory: Arc<dyn SessionFactory>,
    channel_rx: mpsc::Receiver<ChannelEvent>,
    session_rx: mpsc::UnboundedReceiver<SessionEvent>,
    command_rx: mpsc::Receiver<OrchestratorCommand>,
    events_tx: mpsc::UnboundedSender<OrchestratorEvent>,
}

impl Orchestrator {
    pub fn new(
        policy: Box<dyn RolePolicy>,
        config: &ClientConfig,
        signaling: Arc<dyn SignalingOutput>,
        channel_rx: mpsc::Receiver<ChannelEvent>,
        factory: Arc<dyn SessionFactory>,
        media: Option<Arc<dyn LocalMedia>>,
    ) -> (Self, OrchestratorHandle) {
        let (session_tx, session_rx) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::channel(32);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let orchestrator = Self {
            policy,
            me: None,
            joined: JoinedRooms::default(),
            members: RoomMembers::default(),
            sessions: SessionManager::new(factory.clone(), signaling.clone(), session_tx),
            media: MediaSlot::new(media),
            dialer: DialTimer::new(config.initial_dial_delay, config.dial_interval),
            negotiation_timeout: config.negotiation_timeout,
            signaling,
            factory,
            channel_rx,
            session_rx,
            command_rx,
            events_tx,
        };
        let handle = OrchestratorHandle {
            commands: command_tx,
            events: events_rx,
        };
        (orchestrator, handle)
    }

    pub async fn run(mut self) {
        info!(
            "{} orchestrator started for room {}",
            self.policy.role(),
            self.policy.participant().room
        );
        self.announce_languages();

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(OrchestratorCommand::SwitchLanguage(language)) => {
                            self.switch_language(&language).await
                        }
                        Some(OrchestratorCommand::Shutdown) => break,
                        None => {
                            info!("Command channel closed. Shutting down orchestrator.");
                            break;
                        }
                    }
                }

                evt = self.channel_rx.recv() => {
                    match evt {
                        Some(e) => self.handle_channel_event(e).await,
                        None => {
                            warn!("Signaling channel closed unexpectedly");
                            break;
                        }
                    }
                }

                Some(evt) = self.session_rx.recv() => self.handle_session_event(evt).await,

                _ = self.dialer.tick() => self.on_dial_tick().await,
            }
        }

        self.shutdown().await;
        info!("Orchestrator event loop finished");
    }

    async fn handle_channel_event(&mut self, event: ChannelEvent) {
        match event {
            ChannelEvent::Connected => {
                // The server keeps no membership across connections.
                self.joined.clear();
                self.members.clear();
                self.join_rooms().await;
            }
            ChannelEvent::Disconnected => {
                info!("Signaling lost, waiting for reconnect");
                self.joined.clear();
                self.members.clear();
                self.dialer.disarm();
                // Peers drop us on `peer-left`; the next dial pass rebuilds.
                self.drop_sessions().await;
            }
            ChannelEvent::Message(msg) => self.handle_signal(msg).await,
        }
    }

    async fn handle_signal(&mut self, msg: SignalMessage) {
        match msg {
            SignalMessage::Welcome { peer_key } => {
                info!("Signaling assigned peer key {}", peer_key);
                if self.me.as_ref().is_some_and(|me| *me != peer_key) {
                    self.drop_sessions().await;
                }
                self.me = Some(peer_key);
            }
            SignalMessage::IceConfig { ice_servers } => {
                debug!("Received {} ICE server entries", ice_servers.len());
                self.factory.update_ice_servers(ice_servers);
            }
            SignalMessage::RoomInfo { room, members, .. } => {
                if !self.joined.contains(&room) {
                    debug!("room-info for {} which we are not in, ignoring", room);
                    return;
                }
                debug!("{} now has {} members", room, members.len());
                self.members.replace(room, members);
                self.sessions.expire_stalled(self.negotiation_timeout).await;
                self.dial_pass().await;
            }
            SignalMessage::PeerJoined { member } => {
                debug!("{} {} joined", member.role, member.peer_key());
            }
            SignalMessage::PeerLeft { member } => {
                let peer = member.peer_key();
                if self.sessions.teardown(&peer).await {
                    info!("{} left, session closed", peer);
                    self.on_peer_closed(peer);
                }
            }
            SignalMessage::Offer(desc) => self.handle_offer(desc).await,
            SignalMessage::Answer(desc) => {
                let (Some(from), Some(sdp)) = (desc.from.clone(), desc.sdp()) else {
                    debug!("Dropping answer without sender or sdp");
                    return;
                };
                if let Err(e) = self.sessions.accept_answer(&from, sdp.to_owned()).await {
                    warn!("Failed to apply answer from {}: {}", from, e);
                    self.on_peer_closed(from);
                }
            }
            SignalMessage::IceCandidate(CandidateMessage {
                from, candidate, ..
            }) => {
                let Some(from) = from else {
                    debug!("Dropping candidate without sender");
                    return;
                };
                self.sessions.add_remote_candidate(&from, candidate).await;
            }
            SignalMessage::Bye { from, .. } => {
                let Some(from) = from else {
                    return;
                };
                if self.sessions.teardown(&from).await {
                    info!("{} said bye", from);
                    self.on_peer_closed(from);
                }
            }
            other => debug!("Ignoring unexpected {} message", other.op()),
        }
    }

    async fn handle_offer(&mut self, desc: DescriptionMessage) {
        let (Some(from), Some(sdp)) = (desc.from.clone(), desc.sdp()) else {
            debug!("Dropping offer without sender or sdp");
            return;
        };
        let Some(route) = self.policy.answer_route(&desc.meta) else {
            debug!(
                "Not answering offer from {} ({}) as {}",
                from,
                desc.meta.role(),
                self.policy.role()
            );
            return;
        };

        let Ok(track) = self.track_for(route.lane).await else {
            return;
        };
        let polite = match &self.me {
            Some(me) => is_polite(self.policy.role(), me, desc.meta.role(), &from),
            None => true,
        };
        let plan = AnswerPlan {
            room: route.room,
            lane: route.lane,
            meta: self.policy.offer_meta(),
            track,
            polite,
        };
        if let Err(e) = self.sessions.accept_offer(&from, sdp.to_owned(), plan).await {
            warn!("Failed to answer offer from {}: {}", from, e);
            self.on_peer_closed(from);
        }
    }

    async fn handle_session_event(&mut self, event: SessionEvent) {
        let Some(update) = self.sessions.handle_event(event).await else {
            return;
        };
        match update {
            SessionUpdate::Connected(peer) => {
                self.dialer.disarm();
                self.emit(OrchestratorEvent::PeerConnected(peer));
                // A relay's listener calls wait for the upstream session.
                self.dial_pass().await;
            }
            SessionUpdate::Closed { peer, .. } => self.on_peer_closed(peer),
            SessionUpdate::RemoteTrack { peer, track_id } => {
                self.emit(OrchestratorEvent::RemoteTrack { peer, track_id })
            }
        }
    }

    async fn on_dial_tick(&mut self) {
        self.sessions.expire_stalled(self.negotiation_timeout).await;
        if self.sessions.connected_count() > 0 {
            debug!("Peer connected, stopping dial retries");
            self.dialer.disarm();
            return;
        }
        self.dial_pass().await;
    }

    async fn dial_pass(&mut self) {
        let Some(me) = self.me.clone() else {
            return;
        };
        let targets = dial_targets(
            self.policy.as_ref(),
            &me,
            &self.joined,
            &self.members,
            &self.sessions,
        );
        for target in targets {
            self.dial(target).await;
        }
    }

    async fn dial(&mut self, target: DialTarget) {
        let Ok(track) = self.track_for(target.lane).await else {
            return;
        };
        let req = DialRequest {
            peer: target.peer,
            room: target.room,
            lane: target.lane,
            meta: self.policy.offer_meta(),
            track,
        };
        let peer = req.peer.clone();
        if let Err(e) = self.sessions.dial(req).await {
            warn!("Failed to dial {}: {}", peer, e);
        }
    }

    /// Local track for a session on `lane`. Capture failures are reported and abort only
    /// the current attempt.
    async fn track_for(&mut self, lane: Lane) -> Result<Option<LocalTrack>, MediaError> {
        if lane != Lane::Downstream {
            return Ok(None);
        }
        match self.media.ensure().await {
            Ok(track) => Ok(Some(track)),
            Err(e) => {
                warn!("Local media unavailable: {}", e);
                self.emit(OrchestratorEvent::MediaUnavailable(e.clone()));
                Err(e)
            }
        }
    }

    async fn join_rooms(&mut self) {
        for room in self.policy.rooms() {
            self.join(room).await;
        }
        self.dialer.arm();
    }

    async fn join(&mut self, room: RoomName) {
        if !self.joined.insert(room.clone()) {
            debug!("Already in {}, not joining again", room);
            return;
        }
        info!("Joining {} as {}", room, self.policy.role());
        let request = self.policy.join_request(&room);
        self.signaling.send(SignalMessage::Join(request)).await;
    }

    async fn leave(&mut self, room: RoomName) {
        info!("Leaving {}", room);
        self.members.remove(&room);
        self.signaling.send(SignalMessage::Leave { room }).await;
    }

    async fn switch_language(&mut self, language: &str) {
        let previous = self.policy.switchable_language().map(str::to_owned);
        if previous.as_deref() == Some(language) {
            debug!("Already on language {}", language);
            return;
        }
        info!(
            "Switching language {} -> {}",
            previous.as_deref().unwrap_or("-"),
            language
        );

        self.dialer.disarm();
        for peer in self.sessions.close_all(true).await {
            self.emit(OrchestratorEvent::PeerClosed(peer));
        }

        self.policy.set_language(language);
        let rooms = self.policy.rooms();
        for room in self.joined.retain_only(&rooms) {
            self.leave(room).await;
        }
        if !self.policy.keeps_media_on_switch() {
            self.media.stop().await;
        }

        self.signaling
            .send(SignalMessage::UpdateMeta(self.policy.meta_update()))
            .await;
        self.announce_languages();
        self.join_rooms().await;
    }

    async fn shutdown(&mut self) {
        info!("Shutting down {} orchestrator", self.policy.role());
        for room in self.joined.drain() {
            self.leave(room).await;
        }
        self.members.clear();
        for peer in self.sessions.close_all(true).await {
            self.emit(OrchestratorEvent::PeerClosed(peer));
        }
        self.media.stop().await;
        self.dialer.disarm();
    }

    /// Closes every session without `bye`, for when the signaling address is gone.
    async fn drop_sessions(&mut self) {
        let closed = self.sessions.close_all(false).await;
        if !closed.is_empty() {
            info!("Dropped {} session(s) from the previous connection", closed.len());
        }
        for peer in closed {
            self.emit(OrchestratorEvent::PeerClosed(peer));
        }
    }

    fn on_peer_closed(&mut self, peer: PeerKey) {
        if self.sessions.connected_count() == 0 && !self.joined.is_empty() {
            self.dialer.arm();
        }
        self.emit(OrchestratorEvent::PeerClosed(peer));
    }

    fn announce_languages(&self) {
        let p = self.policy.participant();
        self.emit(OrchestratorEvent::LanguagesChosen {
            src: p.src.clone(),
            tgt: p.tgt.clone(),
        });
    }

    fn emit(&self, event: OrchestratorEvent) {
        let _ = self.events_tx.send(event);
    }
}

/// Control side of a running [`Orchestrator`].
pub struct OrchestratorHandle {
    commands: mpsc::Sender<OrchestratorCommand>,
    events: mpsc::UnboundedReceiver<OrchestratorEvent>,
}

impl OrchestratorHandle {
    pub async fn switch_language(&self, language: &str) -> Result<(), ClientError> {
        self.send(OrchestratorCommand::SwitchLanguage(language.to_owned()))
            .await
    }

    pub async fn shutdown(&self) -> Result<(), ClientError> {
        self.send(OrchestratorCommand::Shutdown).await
    }

    pub async fn next_event(&mut self) -> Option<OrchestratorEvent> {
        self.events.recv().await
    }

    pub fn try_next_event(&mut self) -> Option<OrchestratorEvent> {
        self.events.try_recv().ok()
    }

    async fn send(&self, cmd: OrchestratorCommand) -> Result<(), ClientError> {
        self.commands
            .send(cmd)
            .await
            .map_err(|_| ClientError::Stopped)
    }
}
