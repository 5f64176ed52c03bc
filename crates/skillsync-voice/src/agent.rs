//! Typed streaming-agent connection.
//!
//! The session controller only ever sees [`AgentEvent`] values and the
//! [`AgentConnection`] / [`ConnectionFactory`] traits; the WebSocket wire
//! protocol lives entirely in [`VoiceAgentTransport`]. Tests script the same
//! traits with [`ScriptedConnection`].

use crate::audio::AudioConfig;
use crate::error::{VoiceError, VoiceResult};
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

/// Who produced a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeakerRole {
    Interviewer,
    Candidate,
}

/// Events the agent connection can emit, already demultiplexed and typed.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// Handshake complete; the connection accepts a settings message.
    Ready,
    /// The remote side closed the connection.
    Closed,
    /// One finished transcript line.
    Transcript { role: SpeakerRole, content: String },
    /// A chunk of agent speech (raw 16-bit LE PCM).
    AudioChunk(Vec<u8>),
    /// The agent finished its utterance; buffered audio can play.
    SpeechFinished,
    /// Remote-reported error.
    Error(String),
}

/// Session configuration message, sent exactly once after `Ready`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSettings {
    #[serde(rename = "type")]
    pub kind: String,
    pub audio: AudioSettings,
    pub agent: AgentBehavior,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioSettings {
    pub input: AudioFormat,
    pub output: AudioOutputFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioFormat {
    pub encoding: String,
    pub sample_rate: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AudioOutputFormat {
    pub encoding: String,
    pub sample_rate: u32,
    pub container: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentBehavior {
    pub language: String,
    pub listen: ListenSettings,
    pub think: ThinkSettings,
    pub speak: SpeakSettings,
    pub greeting: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListenSettings {
    pub provider: Provider,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThinkSettings {
    pub provider: Provider,
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeakSettings {
    pub provider: Provider,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Provider {
    #[serde(rename = "type")]
    pub kind: String,
    pub model: String,
}

impl AgentSettings {
    /// Settings for one interview: linear16 both ways at the configured
    /// sample rates, with the rendered prompt and greeting.
    pub fn for_interview(audio: &AudioConfig, prompt: String, greeting: String) -> Self {
        Self {
            kind: "Settings".to_string(),
            audio: AudioSettings {
                input: AudioFormat {
                    encoding: "linear16".to_string(),
                    sample_rate: audio.input_sample_rate,
                },
                output: AudioOutputFormat {
                    encoding: "linear16".to_string(),
                    sample_rate: audio.output_sample_rate,
                    container: "wav".to_string(),
                },
            },
            agent: AgentBehavior {
                language: "en".to_string(),
                listen: ListenSettings {
                    provider: Provider {
                        kind: "deepgram".to_string(),
                        model: "nova-3".to_string(),
                    },
                },
                think: ThinkSettings {
                    provider: Provider {
                        kind: "open_ai".to_string(),
                        model: "gpt-4o-mini".to_string(),
                    },
                    prompt,
                },
                speak: SpeakSettings {
                    provider: Provider {
                        kind: "deepgram".to_string(),
                        model: "aura-2-thalia-en".to_string(),
                    },
                },
                greeting,
            },
        }
    }
}

/// One live connection to the streaming agent.
#[async_trait]
pub trait AgentConnection: Send {
    /// Send the settings message. Valid once, after `Ready`.
    async fn configure(&mut self, settings: &AgentSettings) -> VoiceResult<()>;

    /// Stream one frame of microphone PCM to the agent.
    async fn send_audio(&mut self, pcm_bytes: &[u8]) -> VoiceResult<()>;

    /// Next inbound event; `None` once the connection is finished.
    async fn next_event(&mut self) -> Option<AgentEvent>;

    /// Close the connection. Idempotent; closing a dead connection is fine.
    async fn close(&mut self);
}

/// Opens agent connections. Injected into the session so tests can swap in
/// scripted connections.
#[async_trait]
pub trait ConnectionFactory: Send + Sync {
    async fn connect(&self) -> VoiceResult<Box<dyn AgentConnection>>;
}

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, WsMessage>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// WebSocket transport speaking the converse protocol: JSON text messages
/// for control, binary frames for PCM in both directions.
pub struct VoiceAgentTransport {
    sink: WsSink,
    source: WsSource,
    closed: bool,
}

/// Connects [`VoiceAgentTransport`]s with token auth.
pub struct VoiceAgentFactory {
    url: String,
    api_key: String,
}

impl VoiceAgentFactory {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl ConnectionFactory for VoiceAgentFactory {
    async fn connect(&self) -> VoiceResult<Box<dyn AgentConnection>> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| VoiceError::Connection(e.to_string()))?;
        let token = format!("Token {}", self.api_key);
        request.headers_mut().insert(
            AUTHORIZATION,
            token
                .parse()
                .map_err(|_| VoiceError::Connection("invalid API key header".to_string()))?,
        );

        info!("🔌 Connecting to voice agent at {}", self.url);
        let (stream, _response) = connect_async(request).await?;
        let (sink, source) = stream.split();
        Ok(Box::new(VoiceAgentTransport {
            sink,
            source,
            closed: false,
        }))
    }
}

#[derive(Debug, Deserialize)]
struct InboundControl {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

impl VoiceAgentTransport {
    fn demux_text(text: &str) -> Option<AgentEvent> {
        let control: InboundControl = match serde_json::from_str(text) {
            Ok(control) => control,
            Err(e) => {
                debug!("Unparseable agent control message: {}", e);
                return None;
            }
        };
        match control.kind.as_str() {
            "Welcome" => Some(AgentEvent::Ready),
            "ConversationText" => {
                let role = match control.role.as_deref() {
                    Some("assistant") => SpeakerRole::Interviewer,
                    Some("user") => SpeakerRole::Candidate,
                    other => {
                        debug!("Transcript with unknown role {:?} dropped", other);
                        return None;
                    }
                };
                Some(AgentEvent::Transcript {
                    role,
                    content: control.content.unwrap_or_default(),
                })
            }
            "AgentAudioDone" => Some(AgentEvent::SpeechFinished),
            "Error" => Some(AgentEvent::Error(
                control
                    .description
                    .unwrap_or_else(|| "unspecified agent error".to_string()),
            )),
            other => {
                debug!("Ignoring agent control message type {}", other);
                None
            }
        }
    }
}

#[async_trait]
impl AgentConnection for VoiceAgentTransport {
    async fn configure(&mut self, settings: &AgentSettings) -> VoiceResult<()> {
        let payload = serde_json::to_string(settings)?;
        self.sink.send(WsMessage::Text(payload)).await?;
        info!("⚙️  Agent configured");
        Ok(())
    }

    async fn send_audio(&mut self, pcm_bytes: &[u8]) -> VoiceResult<()> {
        self.sink
            .send(WsMessage::Binary(pcm_bytes.to_vec()))
            .await?;
        Ok(())
    }

    async fn next_event(&mut self) -> Option<AgentEvent> {
        loop {
            match self.source.next().await? {
                Ok(WsMessage::Text(text)) => {
                    if let Some(event) = Self::demux_text(&text) {
                        return Some(event);
                    }
                }
                Ok(WsMessage::Binary(bytes)) => {
                    return Some(AgentEvent::AudioChunk(bytes));
                }
                Ok(WsMessage::Close(_)) => {
                    return Some(AgentEvent::Closed);
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Agent socket error: {}", e);
                    return Some(AgentEvent::Error(e.to_string()));
                }
            }
        }
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        // Close errors on an already-dead socket are expected during teardown.
        let _ = self.sink.send(WsMessage::Close(None)).await;
    }
}

/// What a scripted connection saw go out, for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum SentMessage {
    Settings(AgentSettings),
    Audio(Vec<u8>),
    Close,
}

/// Scripted connection: replays a queued event script and records everything
/// sent through it.
pub struct ScriptedConnection {
    events: mpsc::UnboundedReceiver<AgentEvent>,
    sent: Arc<Mutex<Vec<SentMessage>>>,
}

impl ScriptedConnection {
    pub fn new(
        events: mpsc::UnboundedReceiver<AgentEvent>,
        sent: Arc<Mutex<Vec<SentMessage>>>,
    ) -> Self {
        Self { events, sent }
    }
}

#[async_trait]
impl AgentConnection for ScriptedConnection {
    async fn configure(&mut self, settings: &AgentSettings) -> VoiceResult<()> {
        self.sent
            .lock()
            .expect("sent log lock")
            .push(SentMessage::Settings(settings.clone()));
        Ok(())
    }

    async fn send_audio(&mut self, pcm_bytes: &[u8]) -> VoiceResult<()> {
        self.sent
            .lock()
            .expect("sent log lock")
            .push(SentMessage::Audio(pcm_bytes.to_vec()));
        Ok(())
    }

    async fn next_event(&mut self) -> Option<AgentEvent> {
        self.events.recv().await
    }

    async fn close(&mut self) {
        self.sent
            .lock()
            .expect("sent log lock")
            .push(SentMessage::Close);
    }
}

/// Hands out one scripted connection, then fails further connects.
pub struct ScriptedFactory {
    connection: Mutex<Option<ScriptedConnection>>,
}

impl ScriptedFactory {
    /// Builds the factory plus the script sender and outbound log to drive
    /// and inspect the session from a test.
    pub fn scripted() -> (
        Self,
        mpsc::UnboundedSender<AgentEvent>,
        Arc<Mutex<Vec<SentMessage>>>,
    ) {
        let (script_tx, script_rx) = mpsc::unbounded_channel();
        let sent = Arc::new(Mutex::new(Vec::new()));
        let factory = Self {
            connection: Mutex::new(Some(ScriptedConnection::new(script_rx, Arc::clone(&sent)))),
        };
        (factory, script_tx, sent)
    }
}

#[async_trait]
impl ConnectionFactory for ScriptedFactory {
    async fn connect(&self) -> VoiceResult<Box<dyn AgentConnection>> {
        let connection = self
            .connection
            .lock()
            .expect("scripted connection lock")
            .take()
            .ok_or_else(|| VoiceError::Connection("scripted connection already taken".to_string()))?;
        Ok(Box::new(connection))
    }
}

/// Factory whose every connect fails, for failure-path tests.
pub struct FailingFactory;

#[async_trait]
impl ConnectionFactory for FailingFactory {
    async fn connect(&self) -> VoiceResult<Box<dyn AgentConnection>> {
        Err(VoiceError::Connection("agent unreachable".to_string()))
    }
}
