//! Interview prompt and greeting builder.
//!
//! Pure string rendering: given an interview kind and an optional user
//! profile, produce the think-prompt and the spoken greeting for the agent
//! settings message. The prompt tells the agent what it already knows so it
//! does not re-ask profile facts.

use serde::{Deserialize, Serialize};
use skillsync_core::UserProfile;

/// The four supported interview formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterviewKind {
    Technical,
    Behavioral,
    Hr,
    SystemDesign,
}

impl InterviewKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewKind::Technical => "technical",
            InterviewKind::Behavioral => "behavioral",
            InterviewKind::Hr => "hr",
            InterviewKind::SystemDesign => "system-design",
        }
    }

    /// Unrecognized kinds fall back to a technical interview.
    pub fn parse(value: &str) -> Self {
        match value {
            "behavioral" => InterviewKind::Behavioral,
            "hr" => InterviewKind::Hr,
            "system-design" => InterviewKind::SystemDesign,
            _ => InterviewKind::Technical,
        }
    }
}

impl std::fmt::Display for InterviewKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn skills_list(profile: Option<&UserProfile>) -> String {
    match profile {
        Some(p) if !p.skills.is_empty() => p.skill_names().join(", "),
        _ => "various skills".to_string(),
    }
}

fn leading_skills(profile: Option<&UserProfile>) -> String {
    match profile {
        Some(p) if !p.skills.is_empty() => p
            .skill_names()
            .into_iter()
            .take(2)
            .collect::<Vec<_>>()
            .join(" and "),
        _ => "your skills".to_string(),
    }
}

fn candidate_summary(profile: Option<&UserProfile>, skills: &str) -> String {
    match profile {
        Some(p) => {
            let name = p
                .name
                .as_deref()
                .filter(|n| !n.is_empty())
                .unwrap_or("the candidate");
            let experience = p
                .experience
                .as_deref()
                .filter(|e| !e.is_empty())
                .unwrap_or("not specified");
            format!(
                "The candidate's name is {}. Their skills include: {}. Their experience level is {}.",
                name, skills, experience
            )
        }
        None => String::new(),
    }
}

/// The think-prompt for the given interview kind, personalized when a
/// profile is available and generic otherwise.
pub fn interview_prompt(kind: InterviewKind, profile: Option<&UserProfile>) -> String {
    let skills = skills_list(profile);
    let summary = candidate_summary(profile, &skills);
    match kind {
        InterviewKind::Technical => format!(
            "You are conducting a technical interview. {} Since you already know their skills ({}), \
             start by introducing yourself, then ask specific technical questions about their \
             strongest skill or a challenging project they've worked on. Don't ask them to repeat \
             their background. Keep responses under 25 words.",
            summary, skills
        ),
        InterviewKind::Behavioral => format!(
            "You are conducting a behavioral interview. {} Since you know their background, \
             introduce yourself then ask about a specific challenging situation they faced in \
             their work. Don't ask them to repeat their experience. Keep responses brief.",
            summary
        ),
        InterviewKind::Hr => format!(
            "You are an HR interviewer. {} Since you know their background, introduce yourself \
             then ask about their motivation for this specific role and career goals. Don't ask \
             them to repeat their experience. Keep responses conversational.",
            summary
        ),
        InterviewKind::SystemDesign => format!(
            "You are conducting a system design interview. {} Since you know their skills ({}), \
             introduce yourself then present a system design problem matching their skill level. \
             Don't ask about their background. Guide them through the process.",
            summary, skills
        ),
    }
}

/// The spoken greeting for the given interview kind. Interpolates the
/// candidate's name and up to two skills when a profile is available.
pub fn interview_greeting(kind: InterviewKind, profile: Option<&UserProfile>) -> String {
    let name = match profile.and_then(|p| p.name.as_deref()) {
        Some(n) if !n.is_empty() => format!(" {}", n),
        _ => String::new(),
    };
    let skills = leading_skills(profile);
    match kind {
        InterviewKind::Technical => format!(
            "Hello{}! I'm your technical interviewer. I can see you have experience with {}. \
             Let's dive into a technical challenge - can you walk me through a complex problem \
             you solved using {}?",
            name, skills, skills
        ),
        InterviewKind::Behavioral => format!(
            "Hi{}! I'm conducting your behavioral interview. I see you have {} in your profile. \
             Can you tell me about a time when you had to learn a new technology quickly under \
             pressure?",
            name, skills
        ),
        InterviewKind::Hr => format!(
            "Hello{}! I'm your HR interviewer. Looking at your background with {}, what drives \
             your passion for technology and where do you see yourself in 3 years?",
            name, skills
        ),
        InterviewKind::SystemDesign => format!(
            "Hi{}! I'm your system design interviewer. Given your experience with {}, let's \
             design a scalable web application. How would you approach building a social media \
             platform?",
            name, skills
        ),
    }
}
