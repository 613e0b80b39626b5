use crate::error::{MediaError, SessionError};
use crate::media::{LocalMedia, LocalTrack};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;
use webrtc::api::media_engine::MIME_TYPE_OPUS;
use webrtc::media::Sample;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

/// One 20 ms Opus frame of silence.
pub const OPUS_SILENCE_FRAME: [u8; 3] = [0xf8, 0xff, 0xfe];
pub const OPUS_FRAME_DURATION: Duration = Duration::from_millis(20);

/// Local audio source exposed as an Opus sample track. Frames are written by the
/// application; encoding happens outside this crate.
pub struct RtcAudioSource {
    track: Arc<TrackLocalStaticSample>,
    active: AtomicBool,
}

impl RtcAudioSource {
    pub fn new(stream_id: &str) -> Self {
        let track = TrackLocalStaticSample::new(
            RTCRtpCodecCapability {
                mime_type: MIME_TYPE_OPUS.to_owned(),
                clock_rate: 48000,
                channels: 2,
                ..Default::default()
            },
            "audio".to_owned(),
            stream_id.to_owned(),
        );
        Self {
            track: Arc::new(track),
            active: AtomicBool::new(false),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Writes one encoded frame to every session the track is attached to.
    pub async fn write_frame(&self, data: Bytes, duration: Duration) -> Result<(), SessionError> {
        if !self.is_active() {
            return Ok(());
        }
        self.track
            .write_sample(&Sample {
                data,
                duration,
                ..Default::default()
            })
            .await?;
        Ok(())
    }

    /// Keeps the track alive with silence frames while the source is active.
    pub fn spawn_silence(self: &Arc<Self>) -> JoinHandle<()> {
        let source = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(OPUS_FRAME_DURATION);
            loop {
                ticker.tick().await;
                let frame = Bytes::from_static(&OPUS_SILENCE_FRAME);
                if let Err(e) = source.write_frame(frame, OPUS_FRAME_DURATION).await {
                    debug!("Silence frame not written: {}", e);
                }
            }
        })
    }
}

#[async_trait]
impl LocalMedia for RtcAudioSource {
    async fn acquire(&self) -> Result<LocalTrack, MediaError> {
        self.active.store(true, Ordering::Release);
        Ok(LocalTrack::new(self.track.id(), self.track.clone()))
    }

    async fn release(&self) {
        self.active.store(false, Ordering::Release);
    }
}
