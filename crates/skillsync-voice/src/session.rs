//! Interview session controller.
//!
//! Owns the `Idle → Connecting → Configured → Active → Closing → Idle`
//! lifecycle around one streaming-agent connection: connects through the
//! injected factory, starts microphone capture, runs a single event pump
//! that demultiplexes agent events, and tears everything down on `end`.
//!
//! `start` never panics and never throws past its boundary: microphone
//! denial, connection failure and handshake timeout all come back as
//! `false`, with the taxonomy preserved in the logs.

use crate::agent::{AgentConnection, AgentEvent, AgentSettings, ConnectionFactory, SpeakerRole};
use crate::audio::{AudioConfig, CaptureHandle, CapturePort, PlaybackPort};
use crate::error::{VoiceError, VoiceResult};
use crate::pcm;
use crate::prompt::{interview_greeting, interview_prompt, InterviewKind};
use chrono::{DateTime, Utc};
use skillsync_core::{SkillSyncConfig, UserProfile};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Tunables for one session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub audio: AudioConfig,
    /// Ceiling for connect plus configuration handshake.
    pub connect_timeout: Duration,
    /// Delay before the silent greeting-trigger frame; zero disables it.
    pub greeting_trigger_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            audio: AudioConfig::default(),
            connect_timeout: Duration::from_secs(10),
            greeting_trigger_delay: Duration::from_secs(1),
        }
    }
}

impl SessionConfig {
    pub fn from_config(config: &SkillSyncConfig) -> Self {
        Self {
            audio: AudioConfig::default(),
            connect_timeout: config.connect_timeout(),
            greeting_trigger_delay: config.greeting_trigger_delay(),
        }
    }
}

/// Session lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connecting,
    Configured,
    Active,
    Closing,
}

/// Connection/listening status reported to the UI callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionStatus {
    pub is_connected: bool,
    pub is_listening: bool,
}

/// One classified transcript line with its arrival time.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTurn {
    pub role: SpeakerRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// What `end` returns. `end` before any `start` yields the zero summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewSummary {
    pub duration: Duration,
    pub kind: Option<InterviewKind>,
    pub completed: bool,
}

impl InterviewSummary {
    fn empty() -> Self {
        Self {
            duration: Duration::ZERO,
            kind: None,
            completed: false,
        }
    }
}

type TranscriptSink = Box<dyn Fn(ConversationTurn) + Send>;
type StatusSink = Arc<dyn Fn(SessionStatus) + Send + Sync>;

struct SessionMeta {
    kind: InterviewKind,
    user_id: String,
    started: Instant,
}

/// The voice-interview session controller. One instance runs at most one
/// interview at a time; overlapping `start` calls are rejected.
pub struct InterviewSession {
    config: SessionConfig,
    factory: Arc<dyn ConnectionFactory>,
    capture: Box<dyn CapturePort>,
    playback: Arc<dyn PlaybackPort>,
    state: Arc<Mutex<SessionState>>,
    live: Arc<AtomicBool>,
    cancel: Option<CancellationToken>,
    pump: Option<JoinHandle<()>>,
    meta: Option<SessionMeta>,
}

impl InterviewSession {
    pub fn new(
        config: SessionConfig,
        factory: Arc<dyn ConnectionFactory>,
        capture: Box<dyn CapturePort>,
        playback: Arc<dyn PlaybackPort>,
    ) -> Self {
        Self {
            config,
            factory,
            capture,
            playback,
            state: Arc::new(Mutex::new(SessionState::Idle)),
            live: Arc::new(AtomicBool::new(false)),
            cancel: None,
            pump: None,
            meta: None,
        }
    }

    /// Session over real devices: WebSocket transport, default microphone,
    /// default speaker.
    pub fn from_config(config: &SkillSyncConfig) -> VoiceResult<Self> {
        let api_key = config
            .agent_api_key
            .clone()
            .ok_or_else(|| VoiceError::Config("agent API key is not set".to_string()))?;
        let factory = Arc::new(crate::agent::VoiceAgentFactory::new(
            config.agent_ws_url.clone(),
            api_key,
        ));
        let playback = Arc::new(crate::audio::SpeakerPlayback::new()?);
        Ok(Self::new(
            SessionConfig::from_config(config),
            factory,
            Box::new(crate::audio::MicCapture::new()),
            playback,
        ))
    }

    pub fn state(&self) -> SessionState {
        *lock_unpoisoned(&self.state)
    }

    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    /// Start an interview. Returns `true` once the session is Active with
    /// the agent configured and the microphone streaming; returns `false`
    /// on microphone denial, connection failure, handshake timeout, or when
    /// a session is already running (state is left untouched in that case).
    pub async fn start(
        &mut self,
        kind: InterviewKind,
        user_id: &str,
        on_transcript: impl Fn(ConversationTurn) + Send + 'static,
        on_status: impl Fn(SessionStatus) + Send + Sync + 'static,
        profile: Option<&UserProfile>,
    ) -> bool {
        let on_status: StatusSink = Arc::new(on_status);
        match self
            .start_inner(kind, user_id, Box::new(on_transcript), &on_status, profile)
            .await
        {
            Ok(()) => {
                info!("🎙️ {} interview active for user {}", kind, user_id);
                (on_status)(SessionStatus {
                    is_connected: true,
                    is_listening: true,
                });
                true
            }
            Err(VoiceError::AlreadyActive) => {
                warn!("Interview start rejected: a session is already running");
                false
            }
            Err(e) => {
                error!("Failed to start interview: {}", e);
                *lock_unpoisoned(&self.state) = SessionState::Idle;
                false
            }
        }
    }

    async fn start_inner(
        &mut self,
        kind: InterviewKind,
        user_id: &str,
        on_transcript: TranscriptSink,
        on_status: &StatusSink,
        profile: Option<&UserProfile>,
    ) -> VoiceResult<()> {
        {
            let mut state = lock_unpoisoned(&self.state);
            if *state != SessionState::Idle || self.meta.is_some() {
                return Err(VoiceError::AlreadyActive);
            }
            *state = SessionState::Connecting;
        }

        let settings = AgentSettings::for_interview(
            &self.config.audio,
            interview_prompt(kind, profile),
            interview_greeting(kind, profile),
        );

        let conn = match tokio::time::timeout(self.config.connect_timeout, self.factory.connect())
            .await
        {
            Ok(Ok(conn)) => conn,
            Ok(Err(e)) => return Err(e),
            Err(_) => return Err(VoiceError::HandshakeTimeout(self.config.connect_timeout)),
        };

        let (frame_tx, frame_rx) = mpsc::unbounded_channel();
        let capture_handle = match self
            .capture
            .start(&self.config.audio, frame_tx, Arc::clone(&self.live))
        {
            Ok(handle) => handle,
            Err(e) => {
                let mut conn = conn;
                conn.close().await;
                return Err(e);
            }
        };

        let cancel = CancellationToken::new();
        let (ready_tx, ready_rx) = oneshot::channel();
        let pump = EventPump {
            conn,
            capture: capture_handle,
            frame_rx,
            settings,
            playback: Arc::clone(&self.playback),
            cancel: cancel.clone(),
            live: Arc::clone(&self.live),
            state: Arc::clone(&self.state),
            on_transcript,
            on_status: Arc::clone(on_status),
            ready_tx: Some(ready_tx),
            trigger_delay: self.config.greeting_trigger_delay,
            output_rate: self.config.audio.output_sample_rate,
        };
        let pump_handle = tokio::spawn(pump.run());

        match tokio::time::timeout(self.config.connect_timeout, ready_rx).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => {
                // Pump dropped the readiness signal: configuration failed or
                // the connection died mid-handshake.
                cancel.cancel();
                let _ = pump_handle.await;
                return Err(VoiceError::Connection(
                    "connection lost during handshake".to_string(),
                ));
            }
            Err(_) => {
                cancel.cancel();
                let _ = pump_handle.await;
                return Err(VoiceError::HandshakeTimeout(self.config.connect_timeout));
            }
        }

        *lock_unpoisoned(&self.state) = SessionState::Active;
        self.live.store(true, Ordering::SeqCst);
        self.cancel = Some(cancel);
        self.pump = Some(pump_handle);
        self.meta = Some(SessionMeta {
            kind,
            user_id: user_id.to_string(),
            started: Instant::now(),
        });
        Ok(())
    }

    /// End the interview and return its summary. Idempotent: with no session
    /// running this is a no-op returning the zero summary. Waits for the
    /// event pump to fully quiesce, so the microphone and connection are
    /// released by the time this returns.
    pub async fn end(&mut self) -> InterviewSummary {
        let meta = match self.meta.take() {
            Some(meta) => meta,
            None => {
                debug!("end() with no active interview");
                return InterviewSummary::empty();
            }
        };

        *lock_unpoisoned(&self.state) = SessionState::Closing;
        self.live.store(false, Ordering::SeqCst);
        if let Some(cancel) = self.cancel.take() {
            cancel.cancel();
        }
        if let Some(pump) = self.pump.take() {
            let _ = pump.await;
        }
        *lock_unpoisoned(&self.state) = SessionState::Idle;

        let summary = InterviewSummary {
            duration: meta.started.elapsed(),
            kind: Some(meta.kind),
            completed: true,
        };
        info!(
            "🏁 {} interview for user {} ended after {:.1}s",
            meta.kind,
            meta.user_id,
            summary.duration.as_secs_f64()
        );
        summary
    }
}

/// The single task demultiplexing one session's traffic: microphone frames
/// out, agent events in, greeting trigger on schedule, cancellation from
/// `end`. Owns the connection and the capture handle so every exit path
/// releases both.
struct EventPump {
    conn: Box<dyn AgentConnection>,
    capture: Box<dyn CaptureHandle>,
    frame_rx: mpsc::UnboundedReceiver<Vec<u8>>,
    settings: AgentSettings,
    playback: Arc<dyn PlaybackPort>,
    cancel: CancellationToken,
    live: Arc<AtomicBool>,
    state: Arc<Mutex<SessionState>>,
    on_transcript: TranscriptSink,
    on_status: StatusSink,
    ready_tx: Option<oneshot::Sender<()>>,
    trigger_delay: Duration,
    output_rate: u32,
}

/// One wakeup of the pump loop. The select only picks the source; acting on
/// it happens afterwards so the connection is free to use in every case.
enum Wakeup {
    Cancelled,
    GreetingTrigger,
    MicFrame(Option<Vec<u8>>),
    Agent(Option<AgentEvent>),
}

impl EventPump {
    async fn run(mut self) {
        let mut speech_buf: Vec<u8> = Vec::new();
        let mut trigger_at: Option<tokio::time::Instant> = None;
        let mut mic_done = false;

        loop {
            let wakeup = tokio::select! {
                _ = self.cancel.cancelled() => Wakeup::Cancelled,
                _ = tokio::time::sleep_until(
                    trigger_at.unwrap_or_else(far_future)
                ), if trigger_at.is_some() => Wakeup::GreetingTrigger,
                frame = self.frame_rx.recv(), if !mic_done => Wakeup::MicFrame(frame),
                event = self.conn.next_event() => Wakeup::Agent(event),
            };

            match wakeup {
                Wakeup::Cancelled => break,

                Wakeup::GreetingTrigger => {
                    trigger_at = None;
                    let frame = pcm::silent_frame(pcm::GREETING_TRIGGER_BYTES);
                    match self.conn.send_audio(&frame).await {
                        Ok(()) => debug!("Sent silent frame to trigger the greeting"),
                        Err(e) => warn!("Greeting trigger frame failed: {}", e),
                    }
                }

                Wakeup::MicFrame(Some(frame)) => {
                    if self.live.load(Ordering::SeqCst) {
                        if let Err(e) = self.conn.send_audio(&frame).await {
                            warn!("Microphone frame send failed: {}", e);
                        }
                    }
                }
                Wakeup::MicFrame(None) => mic_done = true,

                Wakeup::Agent(Some(AgentEvent::Ready)) => {
                    if let Some(ready_tx) = self.ready_tx.take() {
                        if let Err(e) = self.conn.configure(&self.settings).await {
                            // Dropping ready_tx tells start() the handshake
                            // is dead.
                            error!("Agent configuration failed: {}", e);
                            break;
                        }
                        *lock_unpoisoned(&self.state) = SessionState::Configured;
                        if !self.trigger_delay.is_zero() {
                            trigger_at =
                                Some(tokio::time::Instant::now() + self.trigger_delay);
                        }
                        let _ = ready_tx.send(());
                    } else {
                        debug!("Duplicate Ready event ignored");
                    }
                }
                Wakeup::Agent(Some(AgentEvent::Transcript { role, content })) => {
                    (self.on_transcript)(ConversationTurn {
                        role,
                        content,
                        timestamp: Utc::now(),
                    });
                }
                Wakeup::Agent(Some(AgentEvent::AudioChunk(bytes))) => {
                    speech_buf.extend_from_slice(&bytes);
                }
                Wakeup::Agent(Some(AgentEvent::SpeechFinished)) => {
                    if !speech_buf.is_empty() {
                        if let Err(e) = self.playback.play(&speech_buf, self.output_rate) {
                            warn!("Agent speech playback failed: {}", e);
                        }
                        speech_buf.clear();
                    }
                }
                Wakeup::Agent(Some(AgentEvent::Error(message))) => {
                    warn!("Agent error: {}", message);
                    self.mark_disconnected();
                    break;
                }
                Wakeup::Agent(Some(AgentEvent::Closed)) | Wakeup::Agent(None) => {
                    info!("Agent connection closed");
                    self.mark_disconnected();
                    break;
                }
            }
        }

        self.conn.close().await;
        self.capture.stop();
    }

    fn mark_disconnected(&self) {
        self.live.store(false, Ordering::SeqCst);
        *lock_unpoisoned(&self.state) = SessionState::Idle;
        (self.on_status)(SessionStatus {
            is_connected: false,
            is_listening: false,
        });
    }
}

fn far_future() -> tokio::time::Instant {
    tokio::time::Instant::now() + Duration::from_secs(86_400)
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
