//! Skill-progress rule engine.
//!
//! Pure, total functions mapping learning activities to bounded skill-level
//! deltas. All arithmetic is deterministic; callers pre-validate that levels
//! are in 0–100.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Learning activity, with a fixed base points value per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    TaskCompletion,
    ProjectSubmission,
    ChallengeSolved,
    InterviewPractice,
    HelpRequest,
    ResearchCompleted,
    StreakBonus,
    /// Unrecognized activity strings land here and earn no points.
    #[serde(other)]
    Unknown,
}

impl ActivityType {
    /// Base points for this activity.
    pub fn points(self) -> i32 {
        match self {
            ActivityType::TaskCompletion => 5,
            ActivityType::ProjectSubmission => 15,
            ActivityType::ChallengeSolved => 10,
            ActivityType::InterviewPractice => 8,
            ActivityType::HelpRequest => 3,
            ActivityType::ResearchCompleted => 6,
            ActivityType::StreakBonus => 2,
            ActivityType::Unknown => 0,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ActivityType::TaskCompletion => "Completed a learning task",
            ActivityType::ProjectSubmission => "Submitted a project",
            ActivityType::ChallengeSolved => "Solved a coding challenge",
            ActivityType::InterviewPractice => "Practiced interview questions",
            ActivityType::HelpRequest => "Asked for help and learned",
            ActivityType::ResearchCompleted => "Completed research task",
            ActivityType::StreakBonus => "Daily learning streak bonus",
            ActivityType::Unknown => "Unknown activity",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivityType::TaskCompletion => "task_completion",
            ActivityType::ProjectSubmission => "project_submission",
            ActivityType::ChallengeSolved => "challenge_solved",
            ActivityType::InterviewPractice => "interview_practice",
            ActivityType::HelpRequest => "help_request",
            ActivityType::ResearchCompleted => "research_completed",
            ActivityType::StreakBonus => "streak_bonus",
            ActivityType::Unknown => "unknown",
        }
    }

    /// Parse the snake_case wire form; unrecognized strings map to `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "task_completion" => ActivityType::TaskCompletion,
            "project_submission" => ActivityType::ProjectSubmission,
            "challenge_solved" => ActivityType::ChallengeSolved,
            "interview_practice" => ActivityType::InterviewPractice,
            "help_request" => ActivityType::HelpRequest,
            "research_completed" => ActivityType::ResearchCompleted,
            "streak_bonus" => ActivityType::StreakBonus,
            _ => ActivityType::Unknown,
        }
    }
}

/// Progress delta for an activity at the given current level.
///
/// `(base points + bonus) * 0.5`, scaled by a level multiplier - early levels
/// (<50) progress faster, late levels (>=80) slower - and rounded to the
/// nearest integer.
pub fn compute_delta(activity: ActivityType, current_level: u8, bonus_points: i32) -> i32 {
    let points = activity.points() + bonus_points;
    let base = points as f64 * 0.5;
    let multiplier = if current_level < 50 {
        1.2
    } else if current_level < 80 {
        0.8
    } else {
        0.5
    };
    (base * multiplier).round() as i32
}

/// Apply a delta, clamped so progress never exceeds the skill's target.
pub fn apply_delta(current: u8, delta: i32, target: u8) -> u8 {
    (current as i32 + delta).clamp(0, target as i32) as u8
}

/// Whether the update crossed a 20-point level boundary.
pub fn leveled_up(old_value: u8, new_value: u8) -> bool {
    new_value / 20 > old_value / 20
}

/// Difficulty tier derived from a skill's current level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Difficulty {
    /// Thresholds at 30, 60, and 80.
    pub fn for_level(current_level: u8) -> Self {
        if current_level < 30 {
            Difficulty::Beginner
        } else if current_level < 60 {
            Difficulty::Intermediate
        } else if current_level < 80 {
            Difficulty::Advanced
        } else {
            Difficulty::Expert
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
            Difficulty::Expert => "Expert",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_table() {
        assert_eq!(ActivityType::TaskCompletion.points(), 5);
        assert_eq!(ActivityType::ProjectSubmission.points(), 15);
        assert_eq!(ActivityType::ChallengeSolved.points(), 10);
        assert_eq!(ActivityType::InterviewPractice.points(), 8);
        assert_eq!(ActivityType::HelpRequest.points(), 3);
        assert_eq!(ActivityType::ResearchCompleted.points(), 6);
        assert_eq!(ActivityType::StreakBonus.points(), 2);
        assert_eq!(ActivityType::parse("no_such_activity").points(), 0);
    }

    #[test]
    fn delta_applies_level_multiplier() {
        // 10 points * 0.5 = 5, then x1.2 / x0.8 / x0.5.
        assert_eq!(compute_delta(ActivityType::ChallengeSolved, 20, 0), 6);
        assert_eq!(compute_delta(ActivityType::ChallengeSolved, 60, 0), 4);
        assert_eq!(compute_delta(ActivityType::ChallengeSolved, 90, 0), 3);
    }

    #[test]
    fn delta_includes_bonus_points() {
        // (10 + 10) * 0.5 * 1.2 = 12
        assert_eq!(compute_delta(ActivityType::ChallengeSolved, 0, 10), 12);
    }

    #[test]
    fn delta_is_non_negative_for_non_negative_inputs() {
        for level in [0u8, 30, 49, 50, 79, 80, 100] {
            for bonus in [0, 1, 5, 50] {
                assert!(compute_delta(ActivityType::HelpRequest, level, bonus) >= 0);
            }
        }
    }

    #[test]
    fn apply_never_exceeds_target() {
        assert_eq!(apply_delta(48, 5, 50), 50);
        assert_eq!(apply_delta(48, 1, 50), 49);
        assert_eq!(apply_delta(48, 0, 50), 48);
    }

    #[test]
    fn apply_never_decreases_with_non_negative_delta() {
        for delta in 0..20 {
            assert!(apply_delta(40, delta, 100) >= 40);
        }
    }

    #[test]
    fn level_up_boundaries() {
        assert!(!leveled_up(22, 39));
        assert!(leveled_up(19, 20));
        assert!(leveled_up(39, 40));
        assert!(!leveled_up(40, 40));
    }

    #[test]
    fn difficulty_thresholds() {
        assert_eq!(Difficulty::for_level(29), Difficulty::Beginner);
        assert_eq!(Difficulty::for_level(30), Difficulty::Intermediate);
        assert_eq!(Difficulty::for_level(59), Difficulty::Intermediate);
        assert_eq!(Difficulty::for_level(60), Difficulty::Advanced);
        assert_eq!(Difficulty::for_level(79), Difficulty::Advanced);
        assert_eq!(Difficulty::for_level(80), Difficulty::Expert);
    }

    #[test]
    fn activity_round_trips_through_strings() {
        for activity in [
            ActivityType::TaskCompletion,
            ActivityType::ProjectSubmission,
            ActivityType::StreakBonus,
        ] {
            assert_eq!(ActivityType::parse(activity.as_str()), activity);
        }
    }
}
