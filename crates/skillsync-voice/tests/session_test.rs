//! End-to-end session tests over scripted agent connections.
//!
//! No real microphone, speaker or network: the connection factory hands out
//! a scripted connection whose inbound events the test drives, and the audio
//! ports are the capture/playback doubles.

use skillsync_voice::{
    AgentEvent, ConversationTurn, DeniedCapture, InterviewKind, InterviewSession, NullCapture,
    ScriptedFactory, SentMessage, SessionConfig, SessionState, SessionStatus, SinkPlayback,
    SpeakerRole, GREETING_TRIGGER_BYTES,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

struct Harness {
    session: InterviewSession,
    script: tokio::sync::mpsc::UnboundedSender<AgentEvent>,
    sent: Arc<Mutex<Vec<SentMessage>>>,
    playback: Arc<SinkPlayback>,
    capture_stopped: Arc<std::sync::atomic::AtomicBool>,
    turns: Arc<Mutex<Vec<ConversationTurn>>>,
    statuses: Arc<Mutex<Vec<SessionStatus>>>,
}

fn harness(trigger_delay: Duration) -> Harness {
    let (factory, script, sent) = ScriptedFactory::scripted();
    let capture = NullCapture::new();
    let capture_stopped = capture.stop_flag();
    let playback = Arc::new(SinkPlayback::new());
    let config = SessionConfig {
        connect_timeout: Duration::from_secs(2),
        greeting_trigger_delay: trigger_delay,
        ..SessionConfig::default()
    };
    let session = InterviewSession::new(
        config,
        Arc::new(factory),
        Box::new(capture),
        Arc::clone(&playback) as Arc<dyn skillsync_voice::PlaybackPort>,
    );
    Harness {
        session,
        script,
        sent,
        playback,
        capture_stopped,
        turns: Arc::new(Mutex::new(Vec::new())),
        statuses: Arc::new(Mutex::new(Vec::new())),
    }
}

impl Harness {
    async fn start(&mut self, kind: InterviewKind) -> bool {
        let turns = Arc::clone(&self.turns);
        let statuses = Arc::clone(&self.statuses);
        self.session
            .start(
                kind,
                "user-42",
                move |turn| turns.lock().unwrap().push(turn),
                move |status| statuses.lock().unwrap().push(status),
                None,
            )
            .await
    }

    fn settings_sends(&self) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| matches!(m, SentMessage::Settings(_)))
            .count()
    }

    fn audio_sends(&self) -> Vec<Vec<u8>> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter_map(|m| match m {
                SentMessage::Audio(bytes) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }
}

#[tokio::test]
async fn full_interview_round_trip() {
    let mut h = harness(Duration::from_millis(50));

    // Handshake is queued before start so the pump sees it immediately.
    h.script.send(AgentEvent::Ready).unwrap();
    assert!(h.start(InterviewKind::Technical).await);
    assert_eq!(h.session.state(), SessionState::Active);
    assert_eq!(
        h.statuses.lock().unwrap().as_slice(),
        &[SessionStatus {
            is_connected: true,
            is_listening: true
        }]
    );

    // Exactly one configuration message, even if Ready repeats.
    h.script.send(AgentEvent::Ready).unwrap();
    sleep(Duration::from_millis(20)).await;
    assert_eq!(h.settings_sends(), 1);

    // The delayed silent trigger frame goes out once.
    sleep(Duration::from_millis(80)).await;
    let audio = h.audio_sends();
    assert_eq!(audio.len(), 1);
    assert_eq!(audio[0].len(), GREETING_TRIGGER_BYTES);
    assert!(audio[0].iter().all(|&b| b == 0));

    // Transcripts are classified and forwarded.
    h.script
        .send(AgentEvent::Transcript {
            role: SpeakerRole::Interviewer,
            content: "Walk me through your last project.".to_string(),
        })
        .unwrap();
    h.script
        .send(AgentEvent::Transcript {
            role: SpeakerRole::Candidate,
            content: "It was a data pipeline.".to_string(),
        })
        .unwrap();

    // Agent speech accumulates across chunks and plays once when finished.
    h.script.send(AgentEvent::AudioChunk(vec![1, 2])).unwrap();
    h.script.send(AgentEvent::AudioChunk(vec![3, 4])).unwrap();
    h.script.send(AgentEvent::SpeechFinished).unwrap();
    sleep(Duration::from_millis(50)).await;

    {
        let turns = h.turns.lock().unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, SpeakerRole::Interviewer);
        assert_eq!(turns[1].role, SpeakerRole::Candidate);
        assert_eq!(turns[1].content, "It was a data pipeline.");
    }
    let played = h.playback.played();
    assert_eq!(played.len(), 1);
    assert_eq!(played[0].0, vec![1, 2, 3, 4]);
    assert_eq!(played[0].1, 16_000);

    // The accumulation buffer resets between utterances.
    h.script.send(AgentEvent::AudioChunk(vec![9, 9])).unwrap();
    h.script.send(AgentEvent::SpeechFinished).unwrap();
    sleep(Duration::from_millis(50)).await;
    let played = h.playback.played();
    assert_eq!(played.len(), 2);
    assert_eq!(played[1].0, vec![9, 9]);

    // A speech-finished with nothing buffered plays nothing.
    h.script.send(AgentEvent::SpeechFinished).unwrap();
    sleep(Duration::from_millis(50)).await;
    assert_eq!(h.playback.played().len(), 2);

    let summary = h.session.end().await;
    assert!(summary.completed);
    assert_eq!(summary.kind, Some(InterviewKind::Technical));
    assert!(summary.duration > Duration::ZERO);
    assert_eq!(h.session.state(), SessionState::Idle);
    assert!(h
        .capture_stopped
        .load(std::sync::atomic::Ordering::SeqCst));
    assert_eq!(h.sent.lock().unwrap().last(), Some(&SentMessage::Close));
}

#[tokio::test]
async fn denied_microphone_fails_start_and_closes_connection() {
    let (factory, _script, sent) = ScriptedFactory::scripted();
    let mut session = InterviewSession::new(
        SessionConfig::default(),
        Arc::new(factory),
        Box::new(DeniedCapture),
        Arc::new(SinkPlayback::new()),
    );

    let statuses: Arc<Mutex<Vec<SessionStatus>>> = Arc::new(Mutex::new(Vec::new()));
    let statuses_sink = Arc::clone(&statuses);
    let started = session
        .start(
            InterviewKind::Technical,
            "user-42",
            |_turn| {},
            move |status| statuses_sink.lock().unwrap().push(status),
            None,
        )
        .await;

    assert!(!started);
    assert_eq!(session.state(), SessionState::Idle);
    assert!(statuses.lock().unwrap().is_empty());

    // The connection opened before the microphone failed was released, and
    // nothing else went out on it.
    assert_eq!(sent.lock().unwrap().as_slice(), &[SentMessage::Close]);

    // No session was established, so end() is the zero-summary no-op.
    let summary = session.end().await;
    assert!(!summary.completed);
    assert_eq!(summary.kind, None);
}

#[tokio::test]
async fn overlapping_start_is_rejected() {
    let mut h = harness(Duration::ZERO);
    h.script.send(AgentEvent::Ready).unwrap();
    assert!(h.start(InterviewKind::Hr).await);
    assert_eq!(h.session.state(), SessionState::Active);

    // Second start fails and leaves the running session untouched.
    assert!(!h.start(InterviewKind::Technical).await);
    assert_eq!(h.session.state(), SessionState::Active);
    assert_eq!(h.settings_sends(), 1);

    let summary = h.session.end().await;
    assert_eq!(summary.kind, Some(InterviewKind::Hr));
    assert!(summary.completed);
}

#[tokio::test]
async fn zero_trigger_delay_sends_no_silent_frame() {
    let mut h = harness(Duration::ZERO);
    h.script.send(AgentEvent::Ready).unwrap();
    assert!(h.start(InterviewKind::Behavioral).await);

    sleep(Duration::from_millis(100)).await;
    assert!(h.audio_sends().is_empty());

    h.session.end().await;
}

#[tokio::test]
async fn abrupt_close_reports_disconnect_and_releases_capture() {
    let mut h = harness(Duration::ZERO);
    h.script.send(AgentEvent::Ready).unwrap();
    assert!(h.start(InterviewKind::SystemDesign).await);

    h.script.send(AgentEvent::Closed).unwrap();
    sleep(Duration::from_millis(50)).await;

    assert_eq!(h.session.state(), SessionState::Idle);
    assert!(h
        .capture_stopped
        .load(std::sync::atomic::Ordering::SeqCst));
    let statuses = h.statuses.lock().unwrap().clone();
    assert_eq!(
        statuses.last(),
        Some(&SessionStatus {
            is_connected: false,
            is_listening: false
        })
    );

    // The summary is still collectable afterwards.
    let summary = h.session.end().await;
    assert!(summary.completed);
    assert_eq!(summary.kind, Some(InterviewKind::SystemDesign));
}

#[tokio::test]
async fn remote_error_tears_the_session_down() {
    let mut h = harness(Duration::ZERO);
    h.script.send(AgentEvent::Ready).unwrap();
    assert!(h.start(InterviewKind::Technical).await);

    h.script
        .send(AgentEvent::Error("quota exceeded".to_string()))
        .unwrap();
    sleep(Duration::from_millis(50)).await;

    assert_eq!(h.session.state(), SessionState::Idle);
    let statuses = h.statuses.lock().unwrap().clone();
    assert_eq!(
        statuses.last(),
        Some(&SessionStatus {
            is_connected: false,
            is_listening: false
        })
    );
}
