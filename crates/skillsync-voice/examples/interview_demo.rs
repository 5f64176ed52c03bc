//! Live voice interview against the real agent endpoint.
//!
//! Requires SKILLSYNC_AGENT_API_KEY (or DEEPGRAM_API_KEY) plus a working
//! microphone and speaker. Press Enter to end the interview.
//!
//! ```bash
//! cargo run -p skillsync-voice --example interview_demo
//! ```

use skillsync_core::SkillSyncConfig;
use skillsync_voice::{InterviewKind, InterviewSession, VoiceResult};
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() -> VoiceResult<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skillsync_voice=info".into()),
        )
        .init();

    let config = SkillSyncConfig::from_env();
    let mut session = InterviewSession::from_config(&config)?;

    println!("🎙️  SkillSync voice interview demo");
    println!("   Starting a technical interview. Press Enter to end.\n");

    let started = session
        .start(
            InterviewKind::Technical,
            "demo-user",
            |turn| println!("[{:?}] {}", turn.role, turn.content),
            |status| {
                println!(
                    "   status: connected={} listening={}",
                    status.is_connected, status.is_listening
                )
            },
            None,
        )
        .await;
    if !started {
        eprintln!("Could not start the interview (check API key, microphone, network).");
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let _ = lines.next_line().await;

    let summary = session.end().await;
    println!(
        "\n🏁 Interview over: kind={:?} duration={:.1}s completed={}",
        summary.kind,
        summary.duration.as_secs_f64(),
        summary.completed
    );
    Ok(())
}
