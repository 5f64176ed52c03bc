//! # SkillSync Core
//!
//! Shared foundation for the SkillSync learning platform: profile documents,
//! environment configuration, the profile-store client, the AI mentor bridge
//! (chat with an explicit timeout + fallback contract), and AI learning-task
//! generation.
//!
//! The voice-interview subsystem lives in `skillsync-voice` and the
//! skill-progress rule engine in `skillsync-progress`; both build on the
//! types and stores defined here.

pub mod config;
pub mod error;
pub mod mentor;
pub mod profile;
pub mod tasks;
pub mod types;

pub use config::SkillSyncConfig;
pub use error::{CoreError, CoreResult};
pub use mentor::{build_user_context, fallback_response, MentorBridge, MentorReply};
pub use profile::{default_stats, MemoryProfileStore, ProfileStore, RestProfileStore};
pub use tasks::{fallback_tasks, generate_learning_tasks, parse_tasks};
pub use types::{LearningTask, SkillActivity, SkillRecord, TaskKind, UserProfile};
