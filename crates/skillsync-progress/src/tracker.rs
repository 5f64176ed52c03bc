//! Skill tracker: applies rule-engine deltas through the profile store.

use crate::rules::{apply_delta, compute_delta, leveled_up, ActivityType};
use chrono::Utc;
use serde_json::{json, Map};
use skillsync_core::error::CoreResult;
use skillsync_core::profile::ProfileStore;
use skillsync_core::types::SkillActivity;
use std::sync::Arc;
use tracing::info;

/// Result of one progress update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub new_progress: u8,
    pub points_earned: i32,
    pub progress_gained: i32,
    pub leveled_up: bool,
}

/// Applies learning-activity deltas to the persisted profile. The store is
/// injected so tests run against `MemoryProfileStore`.
pub struct SkillTracker {
    store: Arc<dyn ProfileStore>,
}

impl SkillTracker {
    pub fn new(store: Arc<dyn ProfileStore>) -> Self {
        Self { store }
    }

    /// Record an activity against a skill: compute the delta, clamp to the
    /// skill's target, and patch the profile document.
    pub async fn update_skill_progress(
        &self,
        user_id: &str,
        skill: &str,
        activity: ActivityType,
        bonus_points: i32,
    ) -> CoreResult<ProgressUpdate> {
        let profile = self.store.get_stats(user_id).await?;
        let record = profile.skills.get(skill).copied().unwrap_or_default();

        let points_earned = activity.points() + bonus_points;
        let progress_gained = compute_delta(activity, record.current, bonus_points);
        let new_progress = apply_delta(record.current, progress_gained, record.target);

        let update = SkillActivity {
            skill: skill.to_string(),
            activity: activity.as_str().to_string(),
            points_earned,
            progress_gained,
            timestamp: Utc::now(),
        };
        let mut fields = Map::new();
        fields.insert(format!("skills.{}.current", skill), json!(new_progress));
        if !profile.skills.contains_key(skill) {
            fields.insert(format!("skills.{}.target", skill), json!(record.target));
        }
        fields.insert(
            "lastSkillUpdate".to_string(),
            serde_json::to_value(&update)?,
        );
        self.store.update(user_id, fields).await?;

        let result = ProgressUpdate {
            new_progress,
            points_earned,
            progress_gained,
            leveled_up: leveled_up(record.current, new_progress),
        };
        info!(
            user_id,
            skill,
            activity = activity.as_str(),
            new_progress = result.new_progress,
            leveled_up = result.leveled_up,
            "skill progress updated"
        );
        Ok(result)
    }

    /// Bump the daily learning streak and last-active timestamp.
    pub async fn increment_streak(&self, user_id: &str) -> CoreResult<u32> {
        let profile = self.store.get_stats(user_id).await?;
        let streak = profile.days_streak + 1;
        let mut fields = Map::new();
        fields.insert("daysStreak".to_string(), json!(streak));
        fields.insert("lastActive".to_string(), json!(Utc::now()));
        self.store.update(user_id, fields).await?;
        Ok(streak)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skillsync_core::profile::MemoryProfileStore;
    use skillsync_core::types::{SkillRecord, UserProfile};

    async fn store_with_skill(skill: &str, current: u8, target: u8) -> Arc<MemoryProfileStore> {
        let store = Arc::new(MemoryProfileStore::new());
        let mut profile = UserProfile::default();
        profile
            .skills
            .insert(skill.to_string(), SkillRecord { current, target });
        store.insert_profile("u1", &profile).await.unwrap();
        store
    }

    #[tokio::test]
    async fn records_progress_and_activity() {
        let store = store_with_skill("Python", 40, 90).await;
        let tracker = SkillTracker::new(store.clone());
        // (10 + 0) * 0.5 * 1.2 = 6
        let update = tracker
            .update_skill_progress("u1", "Python", ActivityType::ChallengeSolved, 0)
            .await
            .unwrap();
        assert_eq!(update.progress_gained, 6);
        assert_eq!(update.new_progress, 46);
        assert!(!update.leveled_up);

        let profile = store.get_stats("u1").await.unwrap();
        assert_eq!(profile.skills["Python"].current, 46);
        let activity = profile.last_skill_update.unwrap();
        assert_eq!(activity.skill, "Python");
        assert_eq!(activity.activity, "challenge_solved");
        assert_eq!(activity.points_earned, 10);
    }

    #[tokio::test]
    async fn clamps_to_target() {
        let store = store_with_skill("SQL", 78, 80).await;
        let tracker = SkillTracker::new(store.clone());
        let update = tracker
            .update_skill_progress("u1", "SQL", ActivityType::ProjectSubmission, 0)
            .await
            .unwrap();
        assert_eq!(update.new_progress, 80);
        assert!(update.leveled_up);
    }

    #[tokio::test]
    async fn unknown_skill_starts_from_default_record() {
        let store = Arc::new(MemoryProfileStore::new());
        let tracker = SkillTracker::new(store.clone());
        // (5 + 0) * 0.5 * 1.2 = 3
        let update = tracker
            .update_skill_progress("u1", "Go", ActivityType::TaskCompletion, 0)
            .await
            .unwrap();
        assert_eq!(update.new_progress, 3);
        let profile = store.get_stats("u1").await.unwrap();
        assert_eq!(profile.skills["Go"].current, 3);
    }

    #[tokio::test]
    async fn streak_increments() {
        let store = Arc::new(MemoryProfileStore::new());
        let tracker = SkillTracker::new(store.clone());
        // Default document starts at streak 1.
        assert_eq!(tracker.increment_streak("u1").await.unwrap(), 2);
        assert_eq!(tracker.increment_streak("u1").await.unwrap(), 3);
    }
}
