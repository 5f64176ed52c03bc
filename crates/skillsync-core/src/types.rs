//! Shared document types for the SkillSync user profile store.
//!
//! Field names serialize in camelCase to match the remote document schema
//! (`daysStreak`, `careerGoals`, ...). Everything is `#[serde(default)]` so
//! partial documents written by older clients still deserialize.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Progress record for one named skill. Levels are percentages in 0–100;
/// `current` never exceeds `target` once the rule engine has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillRecord {
    pub current: u8,
    pub target: u8,
}

impl Default for SkillRecord {
    fn default() -> Self {
        Self {
            current: 0,
            target: 100,
        }
    }
}

/// Kind of learning task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    Project,
    Practice,
    Study,
    Interview,
    Research,
    Video,
    Apply,
    #[serde(other)]
    Other,
}

impl TaskKind {
    /// Parse the lowercase wire form; anything unrecognized maps to `Other`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "project" => TaskKind::Project,
            "practice" => TaskKind::Practice,
            "study" => TaskKind::Study,
            "interview" => TaskKind::Interview,
            "research" => TaskKind::Research,
            "video" => TaskKind::Video,
            "apply" => TaskKind::Apply,
            _ => TaskKind::Other,
        }
    }
}

/// A single learning task on the user's dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningTask {
    pub id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub duration: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub ai_generated: bool,
}

/// Record of the most recent skill-progress update, stored on the profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillActivity {
    pub skill: String,
    pub activity: String,
    pub points_earned: i32,
    pub progress_gained: i32,
    pub timestamp: DateTime<Utc>,
}

/// The user profile document as stored in the remote document store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub skills: BTreeMap<String, SkillRecord>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub career_goals: Option<String>,
    #[serde(default)]
    pub job_readiness: Option<u8>,
    #[serde(default)]
    pub days_streak: u32,
    #[serde(default)]
    pub interviews_passed: u32,
    #[serde(default)]
    pub skills_mastered: u32,
    #[serde(default)]
    pub total_skills: u32,
    #[serde(default)]
    pub tasks: Vec<LearningTask>,
    #[serde(default)]
    pub last_skill_update: Option<SkillActivity>,
    #[serde(default)]
    pub last_active: Option<DateTime<Utc>>,
    #[serde(default)]
    pub skills_setup: bool,
}

impl UserProfile {
    /// Skill names in document order.
    pub fn skill_names(&self) -> Vec<&str> {
        self.skills.keys().map(String::as_str).collect()
    }

    /// The skill with the highest current level, if any skills are recorded.
    pub fn strongest_skill(&self) -> Option<(&str, SkillRecord)> {
        self.skills
            .iter()
            .max_by_key(|(_, rec)| rec.current)
            .map(|(name, rec)| (name.as_str(), *rec))
    }

    /// The skill with the lowest current level, if any skills are recorded.
    pub fn weakest_skill(&self) -> Option<(&str, SkillRecord)> {
        self.skills
            .iter()
            .min_by_key(|(_, rec)| rec.current)
            .map(|(name, rec)| (name.as_str(), *rec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_document_deserializes() {
        let profile: UserProfile = serde_json::from_str(
            r#"{"name":"Ana","skills":{"Python":{"current":40,"target":90}},"daysStreak":3}"#,
        )
        .unwrap();
        assert_eq!(profile.name.as_deref(), Some("Ana"));
        assert_eq!(profile.days_streak, 3);
        assert_eq!(profile.skills["Python"].current, 40);
        assert!(profile.tasks.is_empty());
    }

    #[test]
    fn strongest_and_weakest() {
        let mut profile = UserProfile::default();
        assert!(profile.strongest_skill().is_none());
        profile.skills.insert(
            "Python".into(),
            SkillRecord {
                current: 40,
                target: 90,
            },
        );
        profile.skills.insert(
            "SQL".into(),
            SkillRecord {
                current: 70,
                target: 80,
            },
        );
        assert_eq!(profile.strongest_skill().unwrap().0, "SQL");
        assert_eq!(profile.weakest_skill().unwrap().0, "Python");
    }

    #[test]
    fn task_kind_parses_unknown_to_other() {
        assert_eq!(TaskKind::parse("Project"), TaskKind::Project);
        assert_eq!(TaskKind::parse("whatever"), TaskKind::Other);
    }
}
