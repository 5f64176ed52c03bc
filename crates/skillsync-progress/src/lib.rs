//! # SkillSync Progress
//!
//! Deterministic skill-progress rules and the services built on them:
//!
//! - [`rules`] - the pure rule engine (activity points, level-scaled deltas,
//!   level-up detection, difficulty tiers).
//! - [`tracker`] - applies deltas through the injected profile store.
//! - [`challenges`] - the difficulty-keyed practice-challenge catalog.
//! - [`plan`] - 7-day learning plans with a fixed fallback.

pub mod challenges;
pub mod plan;
pub mod rules;
pub mod tracker;

pub use challenges::{challenge_for, challenge_intro, requirements, Challenge};
pub use plan::{fallback_plan, parse_learning_plan, personalized_plan, PlanDay};
pub use rules::{apply_delta, compute_delta, leveled_up, ActivityType, Difficulty};
pub use tracker::{ProgressUpdate, SkillTracker};
