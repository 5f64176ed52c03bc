//! SkillSync configuration loaded from the environment (`.env` friendly).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Runtime configuration for the SkillSync services.
///
/// | Env | Default | Description |
/// |-----|---------|-------------|
/// | SKILLSYNC_AGENT_API_KEY (or DEEPGRAM_API_KEY) | - | API key for the streaming voice agent. |
/// | SKILLSYNC_AGENT_WS_URL | wss://agent.deepgram.com/v1/agent/converse | Voice agent WebSocket endpoint. |
/// | SKILLSYNC_LLM_API_KEY (or OPENROUTER_API_KEY) | - | API key for the mentor LLM. |
/// | SKILLSYNC_LLM_BASE_URL | https://openrouter.ai/api/v1 | OpenAI-compatible chat endpoint base. |
/// | SKILLSYNC_LLM_MODEL | nvidia/nemotron-nano-12b-v2-vl:free | Mentor chat model. |
/// | SKILLSYNC_PROFILE_API_URL | - | Base URL of the user profile document store. |
/// | SKILLSYNC_CONNECT_TIMEOUT_MS | 10000 | Voice agent connect + handshake timeout. |
/// | SKILLSYNC_GREETING_TRIGGER_MS | 1000 | Delay before the silent greeting-trigger frame; 0 disables it. |
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillSyncConfig {
    pub agent_api_key: Option<String>,
    pub agent_ws_url: String,
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub profile_api_url: Option<String>,
    pub connect_timeout_ms: u64,
    pub greeting_trigger_ms: u64,
}

impl Default for SkillSyncConfig {
    fn default() -> Self {
        Self {
            agent_api_key: None,
            agent_ws_url: "wss://agent.deepgram.com/v1/agent/converse".to_string(),
            llm_api_key: None,
            llm_base_url: "https://openrouter.ai/api/v1".to_string(),
            llm_model: "nvidia/nemotron-nano-12b-v2-vl:free".to_string(),
            profile_api_url: None,
            connect_timeout_ms: 10_000,
            greeting_trigger_ms: 1_000,
        }
    }
}

impl SkillSyncConfig {
    /// Load from environment. Unset or invalid values fall back to defaults
    /// (see the struct-level env table).
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            agent_api_key: env_opt_string("SKILLSYNC_AGENT_API_KEY")
                .or_else(|| env_opt_string("DEEPGRAM_API_KEY")),
            agent_ws_url: env_opt_string("SKILLSYNC_AGENT_WS_URL")
                .unwrap_or(defaults.agent_ws_url),
            llm_api_key: env_opt_string("SKILLSYNC_LLM_API_KEY")
                .or_else(|| env_opt_string("OPENROUTER_API_KEY")),
            llm_base_url: env_opt_string("SKILLSYNC_LLM_BASE_URL")
                .unwrap_or(defaults.llm_base_url),
            llm_model: env_opt_string("SKILLSYNC_LLM_MODEL").unwrap_or(defaults.llm_model),
            profile_api_url: env_opt_string("SKILLSYNC_PROFILE_API_URL"),
            connect_timeout_ms: env_u64("SKILLSYNC_CONNECT_TIMEOUT_MS", 10_000),
            greeting_trigger_ms: env_u64("SKILLSYNC_GREETING_TRIGGER_MS", 1_000),
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn greeting_trigger_delay(&self) -> Duration {
        Duration::from_millis(self.greeting_trigger_ms)
    }
}

fn env_opt_string(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(v) => {
            let v = v.trim().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        }
        Err(_) => None,
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let cfg = SkillSyncConfig::default();
        assert_eq!(cfg.connect_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.greeting_trigger_delay(), Duration::from_secs(1));
        assert!(cfg.agent_ws_url.starts_with("wss://"));
    }
}
