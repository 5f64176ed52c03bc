//! Personalized 7-day learning plans.
//!
//! Plans come from the mentor LLM as loosely structured text; the parser
//! splits on `Day` headers and collects task lines. Generation shares the
//! mentor bridge's fallback contract: any failure yields the fixed plan.

use serde::{Deserialize, Serialize};
use skillsync_core::mentor::MentorBridge;
use skillsync_core::types::UserProfile;
use tracing::warn;

/// One day of the learning plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDay {
    pub day: String,
    pub tasks: Vec<String>,
}

/// Generate a 7-day plan from the user's skill profile, falling back to the
/// fixed plan when the call or parsing fails.
pub async fn personalized_plan(bridge: &MentorBridge, profile: &UserProfile) -> Vec<PlanDay> {
    let skills = serde_json::to_string(&profile.skills).unwrap_or_else(|_| "{}".to_string());
    let prompt = format!(
        "Based on user's current skills: {}, generate a personalized 7-day \
         learning plan. Include daily tasks, challenges, and milestones. \
         Focus on weakest skills and provide progressive difficulty.",
        skills
    );
    match bridge.generate(&prompt).await {
        Ok(response) => {
            let days = parse_learning_plan(&response);
            if days.is_empty() {
                warn!("learning plan response had no Day sections, using fallback");
                fallback_plan()
            } else {
                days
            }
        }
        Err(e) => {
            warn!("learning plan generation failed, using fallback: {}", e);
            fallback_plan()
        }
    }
}

/// Split an LLM response into days: a line mentioning `Day`/`day` opens a new
/// section, every following non-empty line is one of its tasks.
pub fn parse_learning_plan(text: &str) -> Vec<PlanDay> {
    let mut days: Vec<PlanDay> = Vec::new();
    let mut current: Option<PlanDay> = None;
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.contains("Day") || line.contains("day") {
            if let Some(day) = current.take() {
                days.push(day);
            }
            current = Some(PlanDay {
                day: line.to_string(),
                tasks: Vec::new(),
            });
        } else if let Some(day) = current.as_mut() {
            day.tasks.push(line.to_string());
        }
    }
    if let Some(day) = current {
        days.push(day);
    }
    days
}

/// The fixed 7-day plan used when generation fails.
pub fn fallback_plan() -> Vec<PlanDay> {
    let days = [
        (
            "Day 1: Foundation Building",
            ["Review basic concepts", "Complete 2 easy challenges", "Watch tutorial videos"],
        ),
        (
            "Day 2: Hands-on Practice",
            ["Build a small project", "Practice coding problems", "Join community discussion"],
        ),
        (
            "Day 3: Advanced Concepts",
            ["Learn advanced topics", "Solve medium challenges", "Read documentation"],
        ),
        (
            "Day 4: Project Development",
            ["Start portfolio project", "Apply best practices", "Get code review"],
        ),
        (
            "Day 5: Testing & Debugging",
            ["Write unit tests", "Debug existing code", "Learn testing frameworks"],
        ),
        (
            "Day 6: Performance & Optimization",
            ["Optimize code performance", "Learn profiling tools", "Study algorithms"],
        ),
        (
            "Day 7: Review & Assessment",
            ["Complete skill assessment", "Review weekly progress", "Plan next week"],
        ),
    ];
    days.iter()
        .map(|(day, tasks)| PlanDay {
            day: day.to_string(),
            tasks: tasks.iter().map(|t| t.to_string()).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_day_sections() {
        let text = "Day 1: Basics\n- Read the intro\n- Do exercises\n\n\
                    Day 2: Practice\n- Build something\n";
        let plan = parse_learning_plan(text);
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].day, "Day 1: Basics");
        assert_eq!(plan[0].tasks.len(), 2);
        assert_eq!(plan[1].tasks, vec!["- Build something"]);
    }

    #[test]
    fn preamble_before_first_day_is_dropped() {
        let text = "Here is your plan:\nDay 1: Start\n- Task one\n";
        let plan = parse_learning_plan(text);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].tasks, vec!["- Task one"]);
    }

    #[test]
    fn empty_text_yields_no_days() {
        assert!(parse_learning_plan("").is_empty());
        assert!(parse_learning_plan("no structure here").is_empty());
    }

    #[test]
    fn fallback_covers_seven_days() {
        let plan = fallback_plan();
        assert_eq!(plan.len(), 7);
        assert!(plan.iter().all(|d| d.tasks.len() == 3));
        assert!(plan[6].day.contains("Review"));
    }
}
