//! AI-generated learning tasks for the dashboard.
//!
//! Tasks come back from the mentor LLM as `Title|Type|Duration` lines; when
//! the call fails or parsing yields nothing, the fixed fallback templates are
//! used so the dashboard never renders empty.

use crate::mentor::MentorBridge;
use crate::types::{LearningTask, TaskKind, UserProfile};
use tracing::warn;

/// Generate up to five learning tasks tailored to the user's profile.
pub async fn generate_learning_tasks(
    bridge: &MentorBridge,
    profile: &UserProfile,
) -> Vec<LearningTask> {
    let prompt = task_prompt(profile);
    match bridge.generate(&prompt).await {
        Ok(response) => {
            let tasks = parse_tasks(&response);
            if tasks.is_empty() {
                warn!("task generation returned no parseable lines, using fallback");
                fallback_tasks()
            } else {
                tasks
            }
        }
        Err(e) => {
            warn!("task generation failed, using fallback: {}", e);
            fallback_tasks()
        }
    }
}

fn task_prompt(profile: &UserProfile) -> String {
    let skills = serde_json::to_string(&profile.skills).unwrap_or_else(|_| "{}".to_string());
    let interests = if profile.interests.is_empty() {
        "General programming".to_string()
    } else {
        profile.interests.join(", ")
    };
    let goals = profile
        .career_goals
        .as_deref()
        .unwrap_or("Software development");
    format!(
        "Generate 5 diverse learning tasks for a user with:\n\
         Skills: {}\n\
         Interests: {}\n\
         Career Goals: {}\n\n\
         Create varied tasks: build specific projects, practice different \
         aspects (algorithms, debugging), learn new concepts or frameworks, \
         real-world applications, interview preparation.\n\n\
         Format each as: \"TaskTitle|Type|Duration\"\n\
         Types: project, practice, study, interview, research\n\
         Durations: 30min, 1hour, 2hours, 3-4hours",
        skills, interests, goals
    )
}

/// Parse `Title|Type|Duration` lines out of an LLM response. Leading list
/// numbering on titles is stripped; malformed lines are skipped.
pub fn parse_tasks(response: &str) -> Vec<LearningTask> {
    let base_id = chrono::Utc::now().timestamp_millis();
    response
        .lines()
        .filter(|line| line.contains('|'))
        .take(5)
        .enumerate()
        .filter_map(|(i, line)| {
            let mut parts = line.splitn(3, '|').map(str::trim);
            let title = strip_numbering(parts.next()?);
            let kind = parts.next()?;
            let duration = parts.next()?;
            if title.is_empty() || kind.is_empty() || duration.is_empty() {
                return None;
            }
            Some(LearningTask {
                id: base_id + i as i64,
                title: title.to_string(),
                kind: TaskKind::parse(kind),
                duration: duration.to_string(),
                completed: false,
                ai_generated: true,
            })
        })
        .collect()
}

fn strip_numbering(title: &str) -> &str {
    let rest = title.trim_start_matches(|c: char| c.is_ascii_digit());
    if rest.len() < title.len() {
        rest.trim_start_matches(['.', ')']).trim_start()
    } else {
        title.trim()
    }
}

/// Fixed task templates used when generation fails.
pub fn fallback_tasks() -> Vec<LearningTask> {
    let base_id = chrono::Utc::now().timestamp_millis();
    let templates = [
        ("Build a REST API with authentication", TaskKind::Project, "4-5 hours"),
        ("Solve 10 algorithm challenges", TaskKind::Practice, "2 hours"),
        ("Create a responsive web dashboard", TaskKind::Project, "3-4 hours"),
        ("Learn advanced debugging techniques", TaskKind::Study, "1 hour"),
        ("Practice system design interviews", TaskKind::Interview, "1.5 hours"),
    ];
    templates
        .iter()
        .enumerate()
        .map(|(i, (title, kind, duration))| LearningTask {
            id: base_id + i as i64,
            title: title.to_string(),
            kind: *kind,
            duration: duration.to_string(),
            completed: false,
            ai_generated: true,
        })
        .collect()
}
