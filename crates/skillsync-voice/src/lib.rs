//! # SkillSync Voice - Streaming Interview Sessions
//!
//! Real-time voice interviews against a streaming conversational agent:
//! microphone PCM up, agent speech and transcripts down, with the whole
//! lifecycle owned by one session controller.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Interview Session                          │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐     │
//! │  │  Mic Capture │→ │  PCM Encode  │→ │  Agent Conn  │     │
//! │  │    (cpal)    │  │ (f32→i16 LE) │  │ (WebSocket)  │     │
//! │  └──────────────┘  └──────────────┘  └──────┬───────┘     │
//! │         ↓                                    ↓              │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐     │
//! │  │   Playback   │← │  PCM Decode  │← │  Event Pump  │     │
//! │  │   (rodio)    │  │ (i16 LE→f32) │  │  (select!)   │     │
//! │  └──────────────┘  └──────────────┘  └──────────────┘     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod agent;
pub mod audio;
pub mod error;
pub mod pcm;
pub mod prompt;
pub mod session;

pub use agent::{
    AgentConnection, AgentEvent, AgentSettings, ConnectionFactory, FailingFactory,
    ScriptedConnection, ScriptedFactory, SentMessage, SpeakerRole, VoiceAgentFactory,
    VoiceAgentTransport,
};
pub use audio::{
    AudioConfig, CaptureHandle, CapturePort, DeniedCapture, MicCapture, NullCapture,
    PlaybackPort, SinkPlayback, SpeakerPlayback,
};
pub use error::{VoiceError, VoiceResult};
pub use pcm::{decode_frame, encode_frame, silent_frame, GREETING_TRIGGER_BYTES};
pub use prompt::{interview_greeting, interview_prompt, InterviewKind};
pub use session::{
    ConversationTurn, InterviewSession, InterviewSummary, SessionConfig, SessionState,
    SessionStatus,
};
