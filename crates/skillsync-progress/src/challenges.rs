//! Difficulty-keyed coding-challenge catalog.
//!
//! Challenges are generated locally from a fixed table; the AI mentor only
//! guides the user through them. Skills outside the catalog fall back to the
//! JavaScript track.

use crate::rules::Difficulty;
use serde::{Deserialize, Serialize};

/// A concrete practice challenge for one skill at one difficulty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub id: String,
    pub skill: String,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub estimated_time: String,
    pub points: String,
}

/// Build the challenge for a skill at the user's current level.
pub fn challenge_for(skill: &str, current_level: u8) -> Challenge {
    let difficulty = Difficulty::for_level(current_level);
    Challenge {
        id: format!(
            "{}_{}_1",
            skill.replace(' ', "_"),
            chrono::Utc::now().timestamp_millis()
        ),
        skill: skill.to_string(),
        title: title_for(skill, difficulty).to_string(),
        description: description_for(skill, difficulty).to_string(),
        difficulty,
        estimated_time: estimated_time(difficulty).to_string(),
        points: point_range(difficulty).to_string(),
    }
}

/// Opening chat message for a practice session on `skill`.
pub fn challenge_intro(skill: &str, current_level: u8) -> String {
    let difficulty = Difficulty::for_level(current_level);
    format!(
        "🎯 **{} Challenge - {} Level**\n\n\
         I see you want to practice {}. Your current level is {}% ({}).\n\n\
         What would you like to work on today? Tell me a specific topic, \
         describe a project idea, or ask me to suggest something based on \
         your interests. Once you pick, I'll create a personalized challenge, \
         give you step-by-step guidance, and test your understanding.",
        skill, difficulty, skill, current_level, difficulty
    )
}

fn track_for(skill: &str) -> &'static str {
    match skill {
        "Python" => "Python",
        "Java" => "Java",
        _ => "JavaScript",
    }
}

fn title_for(skill: &str, difficulty: Difficulty) -> &'static str {
    match (track_for(skill), difficulty) {
        ("Python", Difficulty::Beginner) => "Number Guessing Game",
        ("Python", Difficulty::Intermediate) => "Web Scraper Tool",
        ("Python", Difficulty::Advanced) => "REST API with Database",
        ("Python", Difficulty::Expert) => "Machine Learning Model",
        ("Java", Difficulty::Beginner) => "Student Grade Calculator",
        ("Java", Difficulty::Intermediate) => "Library Management System",
        ("Java", Difficulty::Advanced) => "Multi-threaded Server",
        ("Java", Difficulty::Expert) => "Custom Collection Framework",
        (_, Difficulty::Beginner) => "Simple Calculator App",
        (_, Difficulty::Intermediate) => "Todo List with Local Storage",
        (_, Difficulty::Advanced) => "Real-time Chat Application",
        (_, Difficulty::Expert) => "Custom Framework Component",
    }
}

fn description_for(skill: &str, difficulty: Difficulty) -> &'static str {
    match (track_for(skill), difficulty) {
        ("Python", Difficulty::Beginner) => {
            "• Generate random numbers\n• Handle user guesses\n• Track attempts and score"
        }
        ("Python", Difficulty::Intermediate) => {
            "• Extract data from websites\n• Parse HTML content\n• Save results to CSV"
        }
        ("Python", Difficulty::Advanced) => {
            "• CRUD operations\n• Authentication middleware\n• Database integration"
        }
        ("Python", Difficulty::Expert) => {
            "• Data preprocessing\n• Model training\n• Prediction accuracy metrics"
        }
        ("Java", Difficulty::Beginner) => {
            "• Calculate GPA from grades\n• Handle multiple students\n• Generate grade reports"
        }
        ("Java", Difficulty::Intermediate) => {
            "• Book checkout system\n• Member management\n• Search functionality"
        }
        ("Java", Difficulty::Advanced) => {
            "• Handle concurrent requests\n• Thread pool management\n• Client-server communication"
        }
        ("Java", Difficulty::Expert) => {
            "• Generic type system\n• Iterator implementation\n• Performance optimization"
        }
        (_, Difficulty::Beginner) => {
            "• Create basic arithmetic operations\n• Handle user input validation\n• Display results dynamically"
        }
        (_, Difficulty::Intermediate) => {
            "• Add, edit, delete tasks\n• Save data to localStorage\n• Filter completed/pending tasks"
        }
        (_, Difficulty::Advanced) => {
            "• Real-time messaging\n• User authentication\n• WebSocket connections"
        }
        (_, Difficulty::Expert) => {
            "• Custom state management\n• Virtual DOM implementation\n• Component lifecycle hooks"
        }
    }
}

/// Code-quality expectations per difficulty tier.
pub fn requirements(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Beginner => {
            "• Clean, readable code\n• Basic error handling\n• Simple user interface"
        }
        Difficulty::Intermediate => {
            "• Modular code structure\n• Input validation\n• Responsive design"
        }
        Difficulty::Advanced => {
            "• Design patterns\n• Unit testing\n• Performance optimization"
        }
        Difficulty::Expert => {
            "• Advanced algorithms\n• Comprehensive testing\n• Documentation"
        }
    }
}

fn estimated_time(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Beginner => "30-45 minutes",
        Difficulty::Intermediate => "1-2 hours",
        Difficulty::Advanced => "2-3 hours",
        Difficulty::Expert => "3-4 hours",
    }
}

fn point_range(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Beginner => "10-15 points",
        Difficulty::Intermediate => "15-25 points",
        Difficulty::Advanced => "25-35 points",
        Difficulty::Expert => "35-50 points",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_selects_difficulty_tier() {
        let c = challenge_for("Python", 10);
        assert_eq!(c.difficulty, Difficulty::Beginner);
        assert_eq!(c.title, "Number Guessing Game");
        assert_eq!(c.estimated_time, "30-45 minutes");

        let c = challenge_for("Python", 85);
        assert_eq!(c.difficulty, Difficulty::Expert);
        assert_eq!(c.title, "Machine Learning Model");
    }

    #[test]
    fn unknown_skill_uses_javascript_track() {
        let c = challenge_for("Haskell", 45);
        assert_eq!(c.title, "Todo List with Local Storage");
        assert_eq!(c.skill, "Haskell");
    }

    #[test]
    fn intro_names_skill_and_difficulty() {
        let intro = challenge_intro("Python", 40);
        assert!(intro.contains("Python Challenge - Intermediate Level"));
        assert!(intro.contains("40%"));
    }
}
